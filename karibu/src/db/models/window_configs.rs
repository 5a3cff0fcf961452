//! Database models for versioned claims-window configuration.
//!
//! Each open or settings-update pushes a new `(booking, version)` row; the
//! highest version is the active config. The audit trail records that a
//! change happened, this table records what the settings are.

use crate::types::{BookingId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for pushing a new config version. The version number is
/// assigned inside the insert, never by the caller.
#[derive(Debug, Clone)]
pub struct ClaimsWindowConfigCreateDBRequest {
    pub group_booking_id: BookingId,
    pub deadline: Option<DateTime<Utc>>,
    pub min_discount_percent: Option<Decimal>,
    /// Stored as text; window settings use the numeric labels "1".."5".
    pub min_hotel_star_label: Option<String>,
    pub notes: Option<String>,
    pub created_by: UserId,
}

/// Database response for a claims-window config version
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimsWindowConfigDBResponse {
    pub group_booking_id: BookingId,
    pub version: i32,
    pub deadline: Option<DateTime<Utc>>,
    pub min_discount_percent: Option<Decimal>,
    pub min_hotel_star_label: Option<String>,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}
