//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Validation**: Models use serde for deserialization; semantic validation
//!   (ranges, vocabularies) happens in the handlers and coordinators
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! - [`bookings`]: Group booking intake, list filters, responses, assignment
//! - [`claims_windows`]: Claims window open/close/status payloads
//! - [`claims`]: Owner claim submission and responses
//! - [`audits`]: Read-only audit trail entries
//! - [`users`]: Roles and the authenticated caller
//! - [`pagination`]: Shared offset-based pagination for list endpoints

pub mod audits;
pub mod bookings;
pub mod claims;
pub mod claims_windows;
pub mod pagination;
pub mod users;
