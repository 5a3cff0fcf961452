//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to
//! database table rows. Repositories return these from queries and accept
//! them for inserts and updates.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: each `*DBResponse` struct matches its table and
//!   derives `sqlx::FromRow` for runtime query mapping
//! - **Separation**: database models are distinct from API models so storage
//!   and API representations can evolve independently
//! - **Typed Requests**: inserts and updates go through `*DBRequest` structs,
//!   never loose column maps
//!
//! # Conversion to API Models
//!
//! API response types implement `From` over the `*DBResponse` types:
//!
//! ```ignore
//! use karibu::api::models::bookings::GroupBookingResponse;
//! use karibu::db::models::bookings::GroupBookingDBResponse;
//!
//! let db_row: GroupBookingDBResponse = /* ... */;
//! let api: GroupBookingResponse = db_row.into();
//! ```

pub mod audits;
pub mod bookings;
pub mod claims;
pub mod properties;
pub mod users;
pub mod window_configs;
