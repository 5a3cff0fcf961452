//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the
//! system. Repositories follow a consistent pattern and, where the entity
//! has a full CRUD surface, implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a `&mut PgConnection`, so it composes with transactions
//! - Provides strongly-typed operations; state transitions are dedicated
//!   methods, never generic partial updates
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: actors (admins and property owners)
//! - [`Properties`]: the read-mostly property directory
//! - [`GroupBookings`]: the booking aggregate and its window transitions
//! - [`Claims`]: owner claims and their lifecycle
//! - [`ClaimsWindowConfigs`]: versioned window settings (append-only)
//! - [`Audits`]: the append-only audit trail
//!
//! # Common Pattern
//!
//! ```ignore
//! use karibu::db::handlers::{GroupBookings, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = GroupBookings::new(&mut tx);
//!     let booking = repo.get_by_id(id).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod audits;
pub mod bookings;
pub mod claims;
pub mod properties;
pub mod repository;
pub mod users;
pub mod window_configs;

pub use audits::Audits;
pub use bookings::GroupBookings;
pub use claims::Claims;
pub use properties::Properties;
pub use repository::Repository;
pub use users::Users;
pub use window_configs::ClaimsWindowConfigs;
