//! Repository for the append-only booking audit trail.
//!
//! Deliberately not a [`Repository`](super::Repository) implementation: the
//! trail has no update or delete surface at any layer. Each write also emits
//! a `pg_notify` event so downstream consumers (notification senders,
//! dashboards) can subscribe without the engine depending on their delivery.

use crate::config::AUDIT_EVENTS_CHANNEL;
use crate::db::{
    errors::{DbError, Result},
    models::audits::{AuditCreateDBRequest, AuditDBResponse},
};
use crate::types::{BookingId, abbrev_uuid};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use tracing::{instrument, warn};

pub struct Audits<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Audits<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Append one audit entry and notify subscribers. When called inside a
    /// transaction the NOTIFY is delivered on commit, never for rolled-back
    /// state.
    #[instrument(
        skip(self, request),
        fields(group_booking_id = %abbrev_uuid(&request.group_booking_id), action = %request.action),
        err
    )]
    pub async fn record(&mut self, request: &AuditCreateDBRequest) -> Result<AuditDBResponse> {
        let audit = sqlx::query_as::<_, AuditDBResponse>(
            r#"
            INSERT INTO group_booking_audits (group_booking_id, actor_id, action, description, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, group_booking_id, actor_id, action, description, metadata, created_at
            "#,
        )
        .bind(request.group_booking_id)
        .bind(request.actor_id)
        .bind(request.action.as_str())
        .bind(&request.description)
        .bind(&request.metadata)
        .fetch_one(&mut *self.db)
        .await?;

        let payload = json!({
            "id": audit.id,
            "group_booking_id": audit.group_booking_id,
            "actor_id": audit.actor_id,
            "action": audit.action,
            "created_at": audit.created_at,
        });
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(AUDIT_EVENTS_CHANNEL)
            .bind(payload.to_string())
            .execute(&mut *self.db)
            .await?;

        Ok(audit)
    }

    /// Post-commit audit write that never propagates failure. The primary
    /// state change has already committed; losing the audit row is the
    /// documented acceptable inconsistency, logged at WARN.
    pub async fn record_best_effort(pool: &PgPool, request: AuditCreateDBRequest) {
        let result = async {
            let mut conn = pool.acquire().await.map_err(DbError::from)?;
            Audits::new(&mut conn).record(&request).await
        }
        .await;

        if let Err(error) = result {
            warn!(
                %error,
                group_booking_id = %request.group_booking_id,
                action = %request.action,
                "failed to write audit entry for committed state change"
            );
        }
    }

    /// Audit history for a booking, newest first.
    #[instrument(skip(self), fields(group_booking_id = %abbrev_uuid(&group_booking_id)), err)]
    pub async fn list_for_booking(
        &mut self,
        group_booking_id: BookingId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AuditDBResponse>> {
        let audits = sqlx::query_as::<_, AuditDBResponse>(
            r#"
            SELECT id, group_booking_id, actor_id, action, description, metadata, created_at
            FROM group_booking_audits
            WHERE group_booking_id = $1
            ORDER BY created_at DESC, id DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(group_booking_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(audits)
    }
}
