//! API models for owner claims.

use super::pagination::Pagination;
use crate::db::models::claims::ClaimDBResponse;
use crate::types::{BookingId, ClaimId, OwnerId, PropertyId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Claim lifecycle. The partial uniqueness rule counts every status except
/// `Withdrawn` as live, so withdrawing frees the owner's slot on a booking.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, ToSchema)]
#[sqlx(type_name = "claim_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

/// Owner submission payload for a claim on an open booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimCreate {
    #[schema(value_type = String, format = "uuid")]
    pub group_booking_id: BookingId,
    #[schema(value_type = String, format = "uuid")]
    pub property_id: PropertyId,
    /// Offered price per room per night, in the booking's currency.
    #[schema(value_type = String)]
    pub price_per_night: Decimal,
    /// Offered discount in percent, 0..=100.
    #[schema(value_type = Option<String>)]
    pub discount_percent: Option<Decimal>,
    pub special_offers: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ClaimId,
    #[schema(value_type = String, format = "uuid")]
    pub group_booking_id: BookingId,
    #[schema(value_type = String, format = "uuid")]
    pub owner_id: OwnerId,
    #[schema(value_type = String, format = "uuid")]
    pub property_id: PropertyId,
    #[schema(value_type = String)]
    pub price_per_night: Decimal,
    #[schema(value_type = Option<String>)]
    pub discount_percent: Option<Decimal>,
    /// `price_per_night * nights * rooms_needed`, derived at submit time.
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub currency: String,
    pub status: ClaimStatus,
    pub special_offers: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClaimDBResponse> for ClaimResponse {
    fn from(db: ClaimDBResponse) -> Self {
        Self {
            id: db.id,
            group_booking_id: db.group_booking_id,
            owner_id: db.owner_id,
            property_id: db.property_id,
            price_per_night: db.price_per_night,
            discount_percent: db.discount_percent,
            total_amount: db.total_amount,
            currency: db.currency,
            status: db.status,
            special_offers: db.special_offers,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing claims.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListClaimsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by claim status
    pub status: Option<ClaimStatus>,
}
