//! Repository for owner claims.
//!
//! The partial unique index `group_booking_claims_one_live_per_owner` is the
//! authority on duplicate submissions; the pre-check in the submission
//! coordinator only exists to produce a friendly error. Status moves through
//! the typed transition methods, never through `update`.

use std::collections::HashMap;

use crate::api::models::claims::ClaimStatus;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::claims::{ClaimCreateDBRequest, ClaimDBResponse, ClaimUpdateDBRequest},
};
use crate::types::{BookingId, ClaimId, OwnerId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing claims
#[derive(Debug, Clone)]
pub struct ClaimFilter {
    pub group_booking_id: Option<BookingId>,
    pub owner_id: Option<OwnerId>,
    pub status: Option<ClaimStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl ClaimFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            group_booking_id: None,
            owner_id: None,
            status: None,
            skip,
            limit,
        }
    }
}

pub struct Claims<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Claims<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// The owner's live (non-withdrawn) claim on a booking, if any. This is
    /// the friendly-error probe; the unique index decides races.
    #[instrument(
        skip(self),
        fields(group_booking_id = %abbrev_uuid(&group_booking_id), owner_id = %abbrev_uuid(&owner_id)),
        err
    )]
    pub async fn find_live_for_owner(
        &mut self,
        group_booking_id: BookingId,
        owner_id: OwnerId,
    ) -> Result<Option<ClaimDBResponse>> {
        let claim = sqlx::query_as::<_, ClaimDBResponse>(
            r#"
            SELECT id, group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                   total_amount, currency, status, special_offers, notes, created_at, updated_at
            FROM group_booking_claims
            WHERE group_booking_id = $1
              AND owner_id = $2
              AND status <> 'WITHDRAWN'
            "#,
        )
        .bind(group_booking_id)
        .bind(owner_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(claim)
    }

    /// Move a claim out of PENDING. Returns `None` when the claim is missing
    /// or no longer pending, so two concurrent transitions resolve to one
    /// winner without a separate lock.
    #[instrument(skip(self), fields(claim_id = %abbrev_uuid(&id)), err)]
    pub async fn transition_pending(
        &mut self,
        id: ClaimId,
        new_status: ClaimStatus,
    ) -> Result<Option<ClaimDBResponse>> {
        let claim = sqlx::query_as::<_, ClaimDBResponse>(
            r#"
            UPDATE group_booking_claims
            SET status = $2,
                updated_at = now()
            WHERE id = $1
              AND status = 'PENDING'
            RETURNING id, group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                      total_amount, currency, status, special_offers, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(new_status)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(claim)
    }

    /// Reject every still-pending competitor of an accepted claim.
    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&group_booking_id)), err)]
    pub async fn reject_pending_except(
        &mut self,
        group_booking_id: BookingId,
        accepted_claim_id: ClaimId,
    ) -> Result<Vec<ClaimId>> {
        let rejected = sqlx::query_scalar::<_, ClaimId>(
            r#"
            UPDATE group_booking_claims
            SET status = 'REJECTED',
                updated_at = now()
            WHERE group_booking_id = $1
              AND id <> $2
              AND status = 'PENDING'
            RETURNING id
            "#,
        )
        .bind(group_booking_id)
        .bind(accepted_claim_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rejected)
    }
}

#[async_trait::async_trait]
impl Repository for Claims<'_> {
    type CreateRequest = ClaimCreateDBRequest;
    type UpdateRequest = ClaimUpdateDBRequest;
    type Response = ClaimDBResponse;
    type Id = ClaimId;
    type Filter = ClaimFilter;

    #[instrument(
        skip(self, request),
        fields(group_booking_id = %abbrev_uuid(&request.group_booking_id), owner_id = %abbrev_uuid(&request.owner_id)),
        err
    )]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let claim = sqlx::query_as::<_, ClaimDBResponse>(
            r#"
            INSERT INTO group_booking_claims
                (group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                 total_amount, currency, status, special_offers, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                      total_amount, currency, status, special_offers, notes, created_at, updated_at
            "#,
        )
        .bind(request.group_booking_id)
        .bind(request.owner_id)
        .bind(request.property_id)
        .bind(request.price_per_night)
        .bind(request.discount_percent)
        .bind(request.total_amount)
        .bind(&request.currency)
        .bind(&request.status)
        .bind(&request.special_offers)
        .bind(&request.notes)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(claim)
    }

    #[instrument(skip(self), fields(claim_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let claim = sqlx::query_as::<_, ClaimDBResponse>(
            r#"
            SELECT id, group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                   total_amount, currency, status, special_offers, notes, created_at, updated_at
            FROM group_booking_claims
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(claim)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let claims = sqlx::query_as::<_, ClaimDBResponse>(
            r#"
            SELECT id, group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                   total_amount, currency, status, special_offers, notes, created_at, updated_at
            FROM group_booking_claims
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(claims.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let claims = sqlx::query_as::<_, ClaimDBResponse>(
            r#"
            SELECT id, group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                   total_amount, currency, status, special_offers, notes, created_at, updated_at
            FROM group_booking_claims
            WHERE ($1::uuid IS NULL OR group_booking_id = $1)
              AND ($2::uuid IS NULL OR owner_id = $2)
              AND ($3::claim_status IS NULL OR status = $3)
            ORDER BY created_at DESC, id DESC
            OFFSET $4
            LIMIT $5
            "#,
        )
        .bind(filter.group_booking_id)
        .bind(filter.owner_id)
        .bind(&filter.status)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(claims)
    }

    #[instrument(skip(self), fields(claim_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_booking_claims WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(claim_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let claim = sqlx::query_as::<_, ClaimDBResponse>(
            r#"
            UPDATE group_booking_claims
            SET special_offers = COALESCE($2, special_offers),
                notes = COALESCE($3, notes),
                updated_at = now()
            WHERE id = $1
            RETURNING id, group_booking_id, owner_id, property_id, price_per_night, discount_percent,
                      total_amount, currency, status, special_offers, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.special_offers)
        .bind(&request.notes)
        .fetch_optional(&mut *self.db)
        .await?;

        claim.ok_or(DbError::NotFound)
    }
}
