//! Common type definitions shared across the crate.
//!
//! This module defines:
//! - Type aliases for entity IDs (BookingId, ClaimId, etc.)
//! - The system actor used on automated audit rows
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety:
//!
//! - [`UserId`]: Account identifier (admins and property owners)
//! - [`OwnerId`]: Alias used where a user is acting as a property owner
//! - [`PropertyId`]: Property directory identifier
//! - [`BookingId`]: Group booking identifier
//! - [`ClaimId`]: Claim identifier
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type OwnerId = Uuid;
pub type PropertyId = Uuid;
pub type BookingId = Uuid;
pub type ClaimId = Uuid;

/// Actor recorded on audit rows written by automated transitions (the expiry
/// sweeper). Never a row in `users`.
pub const SYSTEM_ACTOR: Uuid = Uuid::nil();

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
