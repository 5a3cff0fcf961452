//! Repository for group bookings.
//!
//! Claims-window state, assignment and confirmation never move through the
//! generic `update`; they have dedicated transition methods so every
//! reachable state change is spelled out here, and the open-excludes-confirmed
//! CHECK constraint backs the ones that matter.

use std::collections::HashMap;

use crate::api::models::bookings::BookingStatus;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::bookings::{
        GroupBookingCreateDBRequest, GroupBookingDBResponse, GroupBookingUpdateDBRequest,
    },
};
use crate::types::{BookingId, OwnerId, PropertyId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing group bookings
#[derive(Debug, Clone)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub open_for_claims: Option<bool>,
    /// `Some(true)` restricts to bookings with a directly assigned owner.
    pub assigned: Option<bool>,
    pub region: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl BookingFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            status: None,
            open_for_claims: None,
            assigned: None,
            region: None,
            skip,
            limit,
        }
    }
}

pub struct GroupBookings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> GroupBookings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Total rows matching a filter, for paginated responses.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &BookingFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM group_bookings
            WHERE ($1::group_booking_status IS NULL OR status = $1)
              AND ($2::boolean IS NULL OR is_open_for_claims = $2)
              AND ($3::boolean IS NULL OR (assigned_owner_id IS NOT NULL) = $3)
              AND ($4::text IS NULL OR region = $4)
            "#,
        )
        .bind(&filter.status)
        .bind(filter.open_for_claims)
        .bind(filter.assigned)
        .bind(&filter.region)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }

    /// Bookings currently advertised to owners, newest-opened first.
    #[instrument(skip(self), err)]
    pub async fn list_open_for_claims(&mut self, skip: i64, limit: i64) -> Result<Vec<GroupBookingDBResponse>> {
        let bookings = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            SELECT id, customer_name, customer_phone, status, region, district, location,
                   accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                   min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                   assigned_owner_id, owner_assigned_at, confirmed_property_id,
                   recommended_property_ids, created_at, updated_at
            FROM group_bookings
            WHERE is_open_for_claims
            ORDER BY opened_for_claims_at DESC NULLS LAST, id DESC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(bookings)
    }

    /// Open the claims window. The CHECK constraint rejects this on a booking
    /// that already has a confirmed property.
    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_open(&mut self, id: BookingId, opened_at: DateTime<Utc>) -> Result<GroupBookingDBResponse> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            UPDATE group_bookings
            SET is_open_for_claims = TRUE,
                opened_for_claims_at = $2,
                updated_at = now()
            WHERE id = $1
            RETURNING id, customer_name, customer_phone, status, region, district, location,
                      accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                      min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                      assigned_owner_id, owner_assigned_at, confirmed_property_id,
                      recommended_property_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(opened_at)
        .fetch_optional(&mut *self.db)
        .await?;

        booking.ok_or(DbError::NotFound)
    }

    /// Close the claims window. The open timestamp is kept as history of the
    /// most recent open.
    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_closed(&mut self, id: BookingId) -> Result<GroupBookingDBResponse> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            UPDATE group_bookings
            SET is_open_for_claims = FALSE,
                updated_at = now()
            WHERE id = $1
            RETURNING id, customer_name, customer_phone, status, region, district, location,
                      accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                      min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                      assigned_owner_id, owner_assigned_at, confirmed_property_id,
                      recommended_property_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        booking.ok_or(DbError::NotFound)
    }

    /// Hand the booking to a specific owner outside the claims flow.
    #[instrument(
        skip(self, recommended_property_ids),
        fields(group_booking_id = %abbrev_uuid(&id), owner_id = %abbrev_uuid(&owner_id)),
        err
    )]
    pub async fn assign_owner(
        &mut self,
        id: BookingId,
        owner_id: OwnerId,
        recommended_property_ids: &[PropertyId],
        assigned_at: DateTime<Utc>,
    ) -> Result<GroupBookingDBResponse> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            UPDATE group_bookings
            SET assigned_owner_id = $2,
                owner_assigned_at = $3,
                recommended_property_ids = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, customer_name, customer_phone, status, region, district, location,
                      accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                      min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                      assigned_owner_id, owner_assigned_at, confirmed_property_id,
                      recommended_property_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(assigned_at)
        .bind(recommended_property_ids)
        .fetch_optional(&mut *self.db)
        .await?;

        booking.ok_or(DbError::NotFound)
    }

    /// Undo a direct assignment (the re-advertise path; runs in the same
    /// transaction as the re-open).
    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&id)), err)]
    pub async fn clear_assignment(&mut self, id: BookingId) -> Result<GroupBookingDBResponse> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            UPDATE group_bookings
            SET assigned_owner_id = NULL,
                owner_assigned_at = NULL,
                recommended_property_ids = '{}',
                updated_at = now()
            WHERE id = $1
            RETURNING id, customer_name, customer_phone, status, region, district, location,
                      accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                      min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                      assigned_owner_id, owner_assigned_at, confirmed_property_id,
                      recommended_property_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        booking.ok_or(DbError::NotFound)
    }

    /// Confirm the booking against a property and its owner. One statement
    /// closes the window, records the outcome and flips the status, so the
    /// open-excludes-confirmed constraint holds at every point in time.
    #[instrument(
        skip(self),
        fields(group_booking_id = %abbrev_uuid(&id), property_id = %abbrev_uuid(&property_id)),
        err
    )]
    pub async fn confirm_property(
        &mut self,
        id: BookingId,
        property_id: PropertyId,
        owner_id: OwnerId,
        confirmed_at: DateTime<Utc>,
    ) -> Result<GroupBookingDBResponse> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            UPDATE group_bookings
            SET status = 'CONFIRMED',
                confirmed_property_id = $2,
                assigned_owner_id = $3,
                owner_assigned_at = $4,
                is_open_for_claims = FALSE,
                updated_at = now()
            WHERE id = $1
            RETURNING id, customer_name, customer_phone, status, region, district, location,
                      accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                      min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                      assigned_owner_id, owner_assigned_at, confirmed_property_id,
                      recommended_property_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(property_id)
        .bind(owner_id)
        .bind(confirmed_at)
        .fetch_optional(&mut *self.db)
        .await?;

        booking.ok_or(DbError::NotFound)
    }

    /// Auto-close every open window whose effective deadline lies before
    /// `now`, nulling the open timestamp.
    ///
    /// The effective deadline is the active config's explicit deadline, else
    /// the open timestamp plus the default window; a window with neither
    /// never expires here. The `is_open_for_claims` guard hands each expiring
    /// booking to exactly one caller, which makes concurrent sweeps safe: the
    /// auto-close audit is written once per booking by whoever got it.
    #[instrument(skip(self), err)]
    pub async fn close_expired_windows(
        &mut self,
        now: DateTime<Utc>,
        default_window: std::time::Duration,
    ) -> Result<Vec<BookingId>> {
        let closed = sqlx::query_scalar::<_, BookingId>(
            r#"
            UPDATE group_bookings gb
            SET is_open_for_claims = FALSE,
                opened_for_claims_at = NULL,
                updated_at = now()
            WHERE gb.is_open_for_claims
              AND COALESCE(
                    (SELECT c.deadline
                       FROM claims_window_configs c
                      WHERE c.group_booking_id = gb.id
                      ORDER BY c.version DESC
                      LIMIT 1),
                    gb.opened_for_claims_at + make_interval(secs => $2)
                  ) < $1
            RETURNING gb.id
            "#,
        )
        .bind(now)
        .bind(default_window.as_secs_f64())
        .fetch_all(&mut *self.db)
        .await?;

        Ok(closed)
    }
}

#[async_trait::async_trait]
impl Repository for GroupBookings<'_> {
    type CreateRequest = GroupBookingCreateDBRequest;
    type UpdateRequest = GroupBookingUpdateDBRequest;
    type Response = GroupBookingDBResponse;
    type Id = BookingId;
    type Filter = BookingFilter;

    #[instrument(skip(self, request), fields(region = %request.region), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            INSERT INTO group_bookings
                (customer_name, customer_phone, status, region, district, location,
                 accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                 min_hotel_star_label, special_requests)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, customer_name, customer_phone, status, region, district, location,
                      accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                      min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                      assigned_owner_id, owner_assigned_at, confirmed_property_id,
                      recommended_property_ids, created_at, updated_at
            "#,
        )
        .bind(&request.customer_name)
        .bind(&request.customer_phone)
        .bind(&request.status)
        .bind(&request.region)
        .bind(&request.district)
        .bind(&request.location)
        .bind(&request.accommodation_type)
        .bind(request.headcount)
        .bind(request.rooms_needed)
        .bind(request.check_in)
        .bind(request.check_out)
        .bind(&request.currency)
        .bind(&request.min_hotel_star_label)
        .bind(&request.special_requests)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(booking)
    }

    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            SELECT id, customer_name, customer_phone, status, region, district, location,
                   accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                   min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                   assigned_owner_id, owner_assigned_at, confirmed_property_id,
                   recommended_property_ids, created_at, updated_at
            FROM group_bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(booking)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let bookings = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            SELECT id, customer_name, customer_phone, status, region, district, location,
                   accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                   min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                   assigned_owner_id, owner_assigned_at, confirmed_property_id,
                   recommended_property_ids, created_at, updated_at
            FROM group_bookings
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(bookings.into_iter().map(|b| (b.id, b)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let bookings = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            SELECT id, customer_name, customer_phone, status, region, district, location,
                   accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                   min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                   assigned_owner_id, owner_assigned_at, confirmed_property_id,
                   recommended_property_ids, created_at, updated_at
            FROM group_bookings
            WHERE ($1::group_booking_status IS NULL OR status = $1)
              AND ($2::boolean IS NULL OR is_open_for_claims = $2)
              AND ($3::boolean IS NULL OR (assigned_owner_id IS NOT NULL) = $3)
              AND ($4::text IS NULL OR region = $4)
            ORDER BY created_at DESC, id DESC
            OFFSET $5
            LIMIT $6
            "#,
        )
        .bind(&filter.status)
        .bind(filter.open_for_claims)
        .bind(filter.assigned)
        .bind(&filter.region)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(bookings)
    }

    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(group_booking_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let booking = sqlx::query_as::<_, GroupBookingDBResponse>(
            r#"
            UPDATE group_bookings
            SET customer_name = COALESCE($2, customer_name),
                customer_phone = COALESCE($3, customer_phone),
                status = COALESCE($4, status),
                region = COALESCE($5, region),
                district = COALESCE($6, district),
                location = COALESCE($7, location),
                accommodation_type = COALESCE($8, accommodation_type),
                headcount = COALESCE($9, headcount),
                rooms_needed = COALESCE($10, rooms_needed),
                check_in = COALESCE($11, check_in),
                check_out = COALESCE($12, check_out),
                min_hotel_star_label = COALESCE($13, min_hotel_star_label),
                special_requests = COALESCE($14, special_requests),
                updated_at = now()
            WHERE id = $1
            RETURNING id, customer_name, customer_phone, status, region, district, location,
                      accommodation_type, headcount, rooms_needed, check_in, check_out, currency,
                      min_hotel_star_label, special_requests, is_open_for_claims, opened_for_claims_at,
                      assigned_owner_id, owner_assigned_at, confirmed_property_id,
                      recommended_property_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.customer_name)
        .bind(&request.customer_phone)
        .bind(&request.status)
        .bind(&request.region)
        .bind(&request.district)
        .bind(&request.location)
        .bind(&request.accommodation_type)
        .bind(request.headcount)
        .bind(request.rooms_needed)
        .bind(request.check_in)
        .bind(request.check_out)
        .bind(&request.min_hotel_star_label)
        .bind(&request.special_requests)
        .fetch_optional(&mut *self.db)
        .await?;

        booking.ok_or(DbError::NotFound)
    }
}
