//! Repository for versioned claims-window configuration.
//!
//! Append-only like the audit trail, so it does not implement the generic
//! [`Repository`](super::Repository) surface: versions are pushed, never
//! edited, and the highest version is the active config. Two concurrent
//! pushes collide on the `(booking, version)` primary key and one of them
//! surfaces as a conflict for the caller to retry.

use crate::db::{
    errors::Result,
    models::window_configs::{ClaimsWindowConfigCreateDBRequest, ClaimsWindowConfigDBResponse},
};
use crate::types::{BookingId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct ClaimsWindowConfigs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ClaimsWindowConfigs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Push the next config version for a booking. The version number is
    /// computed inside the statement, so callers never pick one.
    #[instrument(
        skip(self, request),
        fields(group_booking_id = %abbrev_uuid(&request.group_booking_id)),
        err
    )]
    pub async fn push(
        &mut self,
        request: &ClaimsWindowConfigCreateDBRequest,
    ) -> Result<ClaimsWindowConfigDBResponse> {
        let config = sqlx::query_as::<_, ClaimsWindowConfigDBResponse>(
            r#"
            INSERT INTO claims_window_configs
                (group_booking_id, version, deadline, min_discount_percent, min_hotel_star_label,
                 notes, created_by)
            SELECT $1, COALESCE(MAX(version), 0) + 1, $2, $3, $4, $5, $6
            FROM claims_window_configs
            WHERE group_booking_id = $1
            RETURNING group_booking_id, version, deadline, min_discount_percent,
                      min_hotel_star_label, notes, created_by, created_at
            "#,
        )
        .bind(request.group_booking_id)
        .bind(request.deadline)
        .bind(request.min_discount_percent)
        .bind(&request.min_hotel_star_label)
        .bind(&request.notes)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(config)
    }

    /// The active (highest-version) config for a booking, if any was ever
    /// pushed.
    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&group_booking_id)), err)]
    pub async fn active(&mut self, group_booking_id: BookingId) -> Result<Option<ClaimsWindowConfigDBResponse>> {
        let config = sqlx::query_as::<_, ClaimsWindowConfigDBResponse>(
            r#"
            SELECT group_booking_id, version, deadline, min_discount_percent,
                   min_hotel_star_label, notes, created_by, created_at
            FROM claims_window_configs
            WHERE group_booking_id = $1
            ORDER BY version DESC
            LIMIT 1
            "#,
        )
        .bind(group_booking_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(config)
    }
}
