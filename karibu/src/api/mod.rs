//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! The API is divided into two surfaces:
//!
//! - **Admin** (`/admin/api/v1/*`): booking registry, owner assignment, claims
//!   window lifecycle and claim acceptance, restricted to back-office staff
//! - **Owner** (`/owner/api/v1/*`): open-booking discovery, claim submission and
//!   withdrawal, assignment acknowledgement, restricted to property owners
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/admin/docs` when the server is running.

pub mod handlers;
pub mod models;
