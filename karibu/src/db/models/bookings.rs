//! Database models for group bookings.

use crate::api::models::bookings::{BookingStatus, GroupBookingCreate};
use crate::types::{BookingId, OwnerId, PropertyId};
use chrono::{DateTime, NaiveDate, Utc};

/// Database request for creating a group booking
#[derive(Debug, Clone)]
pub struct GroupBookingCreateDBRequest {
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
}

impl From<GroupBookingCreate> for GroupBookingCreateDBRequest {
    fn from(api: GroupBookingCreate) -> Self {
        Self {
            customer_name: api.customer_name,
            customer_phone: api.customer_phone,
            status: BookingStatus::Pending, // intake always starts PENDING
            region: api.region,
            district: api.district,
            location: api.location,
            accommodation_type: api.accommodation_type,
            headcount: api.headcount,
            rooms_needed: api.rooms_needed,
            check_in: api.check_in,
            check_out: api.check_out,
            currency: api.currency.unwrap_or_else(|| "TZS".to_string()),
            min_hotel_star_label: api.min_hotel_star_label,
            special_requests: api.special_requests,
        }
    }
}

/// Database request for updating a booking's intake fields.
///
/// Claims-window state, assignment and the confirmed property are not
/// updatable here; those move only through the typed transition methods
/// on the bookings repository.
#[derive(Debug, Clone, Default)]
pub struct GroupBookingUpdateDBRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub status: Option<BookingStatus>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub location: Option<String>,
    pub accommodation_type: Option<String>,
    pub headcount: Option<i32>,
    pub rooms_needed: Option<i32>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub min_hotel_star_label: Option<String>,
    pub special_requests: Option<String>,
}

/// Database response for a group booking
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupBookingDBResponse {
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
    pub assigned_owner_id: Option<OwnerId>,
    pub owner_assigned_at: Option<DateTime<Utc>>,
    pub confirmed_property_id: Option<PropertyId>,
    pub recommended_property_ids: Vec<PropertyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupBookingDBResponse {
    /// COMPLETED and CANCELED bookings are closed to the claims engine.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, BookingStatus::Completed | BookingStatus::Canceled)
    }
}
