//! API models for group bookings.

use super::pagination::Pagination;
use crate::db::models::bookings::GroupBookingDBResponse;
use crate::types::{BookingId, OwnerId, PropertyId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Lifecycle of a group booking. `Completed` and `Canceled` are terminal for
/// the claims engine: no window can be opened and no claim submitted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, ToSchema)]
#[sqlx(type_name = "group_booking_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Canceled,
}

/// Admin intake payload for a new group booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupBookingCreate {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub region: String,
    pub district: Option<String>,
    pub location: Option<String>,
    pub accommodation_type: String,
    pub headcount: i32,
    pub rooms_needed: i32,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    /// Defaults to "TZS" when omitted.
    pub currency: Option<String>,
    /// The customer's star floor, e.g. "moderate" or "4".
    pub min_hotel_star_label: Option<String>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupBookingResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BookingId,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub status: BookingStatus,
    pub region: String,
    pub district: Option<String>,
    pub location: Option<String>,
    pub accommodation_type: String,
    pub headcount: i32,
    pub rooms_needed: i32,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub currency: String,
    pub min_hotel_star_label: Option<String>,
    pub special_requests: Option<String>,
    pub is_open_for_claims: bool,
    pub opened_for_claims_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub assigned_owner_id: Option<OwnerId>,
    pub owner_assigned_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub confirmed_property_id: Option<PropertyId>,
    #[schema(value_type = Vec<String>)]
    pub recommended_property_ids: Vec<PropertyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupBookingDBResponse> for GroupBookingResponse {
    fn from(db: GroupBookingDBResponse) -> Self {
        Self {
            id: db.id,
            customer_name: db.customer_name,
            customer_phone: db.customer_phone,
            status: db.status,
            region: db.region,
            district: db.district,
            location: db.location,
            accommodation_type: db.accommodation_type,
            headcount: db.headcount,
            rooms_needed: db.rooms_needed,
            check_in: db.check_in,
            check_out: db.check_out,
            currency: db.currency,
            min_hotel_star_label: db.min_hotel_star_label,
            special_requests: db.special_requests,
            is_open_for_claims: db.is_open_for_claims,
            opened_for_claims_at: db.opened_for_claims_at,
            assigned_owner_id: db.assigned_owner_id,
            owner_assigned_at: db.owner_assigned_at,
            confirmed_property_id: db.confirmed_property_id,
            recommended_property_ids: db.recommended_property_ids,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing group bookings.
///
/// `assigned=true` doubles as the "assignments" listing: bookings an admin has
/// routed to a specific owner outside the claims flow.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListBookingsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by booking status
    pub status: Option<BookingStatus>,

    /// Filter by claims-window flag
    pub open_for_claims: Option<bool>,

    /// Filter by presence of a directly assigned owner
    pub assigned: Option<bool>,

    /// Filter by destination region (exact match)
    pub region: Option<String>,
}

/// Admin request to hand a booking to a specific owner outside the claims
/// flow. Mutually exclusive with an open claims window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignOwnerRequest {
    #[schema(value_type = String, format = "uuid")]
    pub owner_id: OwnerId,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub recommended_property_ids: Vec<PropertyId>,
    /// Free-text message relayed to the owner (recorded in the audit trail;
    /// delivery is out of scope).
    pub message: Option<String>,
}
