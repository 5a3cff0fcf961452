//! Identity and role gating.
//!
//! karibu never verifies credentials. A trusted fronting proxy authenticates
//! the caller and forwards their email in a configurable header
//! (`auth.user_header_name`, default `x-karibu-user`); this module resolves
//! that email against the `users` table and enforces the ADMIN/OWNER split.
//!
//! # Modules
//!
//! - [`current_user`]: extractors resolving and role-gating the calling user
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use karibu::auth::RequireAdmin;
//!
//! async fn admin_handler(RequireAdmin(user): RequireAdmin) -> String {
//!     format!("hello, {}", user.email)
//! }
//! ```

pub mod current_user;

pub use current_user::{RequireAdmin, RequireOwner};
