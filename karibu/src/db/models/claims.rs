//! Database models for owner claims.

use crate::api::models::claims::ClaimStatus;
use crate::types::{BookingId, ClaimId, OwnerId, PropertyId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for inserting a claim.
///
/// Built by the submission coordinator, which derives `total_amount` and
/// copies `currency` from the booking; handlers never construct this
/// directly from the wire payload.
#[derive(Debug, Clone)]
pub struct ClaimCreateDBRequest {
    pub group_booking_id: BookingId,
    pub owner_id: OwnerId,
    pub property_id: PropertyId,
    pub price_per_night: Decimal,
    pub discount_percent: Option<Decimal>,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: ClaimStatus,
    pub special_offers: Option<String>,
    pub notes: Option<String>,
}

/// Database request for updating a claim's descriptive fields.
///
/// Status never moves through here; lifecycle transitions use the typed
/// methods on the claims repository.
#[derive(Debug, Clone, Default)]
pub struct ClaimUpdateDBRequest {
    pub special_offers: Option<String>,
    pub notes: Option<String>,
}

/// Database response for a claim
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimDBResponse {
    pub id: ClaimId,
    pub group_booking_id: BookingId,
    pub owner_id: OwnerId,
    pub property_id: PropertyId,
    pub price_per_night: Decimal,
    pub discount_percent: Option<Decimal>,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: ClaimStatus,
    pub special_offers: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
