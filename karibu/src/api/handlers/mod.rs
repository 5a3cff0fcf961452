//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`bookings`]: admin booking registry, audit history and direct assignment
//! - [`claims`]: the owner-facing surface (open bookings, claim lifecycle)
//! - [`claims_windows`]: claims-window open/update/close, status and sweeping
//!
//! # Authentication
//!
//! Every handler requires a proxy-supplied identity header. The
//! [`crate::auth`] module provides the extractors ([`crate::auth::RequireAdmin`]
//! and [`crate::auth::RequireOwner`]) that enforce the role split.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! the appropriate HTTP status code with a plain-text, user-safe message.

pub mod bookings;
pub mod claims;
pub mod claims_windows;
