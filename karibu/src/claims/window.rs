//! Claims window expiry.
//!
//! A window's effective deadline is the active config's explicit deadline,
//! falling back to the open timestamp plus the configured default length.
//! Expiry is enforced in three places that all funnel through
//! [`sweep_expired`] or the same UPDATE it wraps: lazily on read paths, by
//! the periodic background sweeper, and on demand via the admin sweep
//! endpoint.

use crate::api::models::claims_windows::{CloseReason, CloseReasonCode};
use crate::config::ClaimsConfig;
use crate::db::handlers::{Audits, GroupBookings};
use crate::db::models::audits::{AuditAction, AuditCreateDBRequest};
use crate::db::models::window_configs::ClaimsWindowConfigDBResponse;
use crate::errors::{Error, Result};
use crate::types::SYSTEM_ACTOR;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Effective deadline for a window. `None` means the window never expires
/// on its own (it was never opened and no explicit deadline exists).
pub fn compute_deadline(
    opened_at: Option<DateTime<Utc>>,
    config: Option<&ClaimsWindowConfigDBResponse>,
    default_window: std::time::Duration,
) -> Option<DateTime<Utc>> {
    if let Some(deadline) = config.and_then(|c| c.deadline) {
        return Some(deadline);
    }
    opened_at.map(|at| at + chrono::Duration::seconds(default_window.as_secs() as i64))
}

/// Close every window whose effective deadline has passed and write one
/// auto-close audit entry per closed booking. Returns how many were closed.
///
/// The closes commit before any audit rows are written; the audit writes are
/// best-effort. Concurrent sweeps are safe because the UPDATE hands each
/// expiring booking to exactly one caller.
pub async fn sweep_expired(pool: &PgPool, claims: &ClaimsConfig) -> Result<u64> {
    let now = Utc::now();
    let closed = {
        let mut conn = pool.acquire().await.map_err(|e| Error::Database(e.into()))?;
        GroupBookings::new(&mut conn)
            .close_expired_windows(now, claims.default_window)
            .await?
    };

    if !closed.is_empty() {
        info!(count = closed.len(), "Closed expired claims windows");
    }
    let reason = CloseReason::Coded {
        code: CloseReasonCode::DeadlineReached,
        details: None,
    };
    for booking_id in &closed {
        Audits::record_best_effort(
            pool,
            AuditCreateDBRequest {
                group_booking_id: *booking_id,
                actor_id: SYSTEM_ACTOR,
                action: AuditAction::ClosedForClaims,
                description: Some("Claims window deadline passed".to_string()),
                metadata: reason.audit_metadata(),
            },
        )
        .await;
    }

    Ok(closed.len() as u64)
}

/// Periodic expiry sweeper, run alongside the HTTP server.
pub async fn run_window_sweeper(pool: PgPool, claims: ClaimsConfig, shutdown: CancellationToken) {
    info!(
        interval = ?claims.sweeper.interval,
        default_window = ?claims.default_window,
        "Starting claims window sweeper"
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(claims.sweeper.interval) => {}
            _ = shutdown.cancelled() => {
                info!("Claims window sweeper shutting down");
                return;
            }
        }

        if let Err(e) = sweep_expired(&pool, &claims).await {
            error!(error = %e, "Claims window sweep failed");
        }
    }
}
