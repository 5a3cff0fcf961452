//! Admin handlers for claims-window transitions.
//!
//! Opening, updating and closing a window all go through here. Settings are
//! versioned: every open/update pushes a new row to `claims_window_configs`
//! and the highest version is the one submissions are checked against, so
//! the knobs for past windows stay reconstructable without mining the audit
//! trail.

use crate::api::models::claims_windows::{
    ClaimsWindowConfigResponse, ClaimsWindowStatusResponse, CloseClaimsWindowRequest, OpenClaimsWindowRequest,
    SweepResponse,
};
use crate::auth::RequireAdmin;
use crate::claims::window;
use crate::db::handlers::{Audits, ClaimsWindowConfigs, GroupBookings, Repository};
use crate::db::models::audits::{AuditAction, AuditCreateDBRequest};
use crate::db::models::window_configs::ClaimsWindowConfigCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::BookingId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::Acquire;

#[utoipa::path(
    post,
    path = "/bookings/{booking_id}/claims-window",
    tag = "claims-windows",
    summary = "Open claims window or update its settings",
    description = "Opens the competitive claims window on a closed booking, or pushes a new \
                   settings version when the window is already open. Re-opening a booking that \
                   was handed to an owner directly requires `re_advertise`, which clears the \
                   assignment.",
    request_body = OpenClaimsWindowRequest,
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID")
    ),
    responses(
        (status = 200, description = "Window state after the change", body = ClaimsWindowStatusResponse),
        (status = 400, description = "Invalid settings or re-advertise misuse"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is no longer active"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn open_claims_window(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<OpenClaimsWindowRequest>,
) -> Result<Json<ClaimsWindowStatusResponse>> {
    if let Some(star) = request.min_hotel_star
        && !(1..=5).contains(&star)
    {
        return Err(Error::BadRequest {
            message: "min_hotel_star must be between 1 and 5".to_string(),
        });
    }
    if let Some(discount) = request.min_discount_percent
        && !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&discount)
    {
        return Err(Error::BadRequest {
            message: "min_discount_percent must be between 0 and 100".to_string(),
        });
    }
    let now = Utc::now();
    if let Some(deadline) = request.deadline
        && deadline <= now
    {
        return Err(Error::BadRequest {
            message: "deadline must be in the future".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let booking;
    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        booking = match repo.get_by_id(booking_id).await? {
            Some(booking) => booking,
            None => {
                return Err(Error::NotFound {
                    resource: "Group booking".to_string(),
                    id: booking_id.to_string(),
                });
            }
        };
    }

    if booking.is_terminal() {
        return Err(Error::Conflict {
            message: format!("Booking {booking_id} is no longer active"),
        });
    }
    // Pre-empt the CHECK constraint with its own message.
    if booking.confirmed_property_id.is_some() {
        return Err(Error::BadRequest {
            message: "A booking with a confirmed property cannot be open for claims".to_string(),
        });
    }

    let admin_handled = booking.assigned_owner_id.is_some() || !booking.recommended_property_ids.is_empty();
    if booking.is_open_for_claims {
        if request.re_advertise {
            return Err(Error::BadRequest {
                message: format!("Booking {booking_id} already has an open claims window"),
            });
        }
    } else if request.re_advertise {
        if !admin_handled {
            return Err(Error::BadRequest {
                message: format!("Booking {booking_id} has no owner assignment to clear"),
            });
        }
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.clear_assignment(booking_id).await?;
    } else if admin_handled {
        return Err(Error::BadRequest {
            message: format!("Booking {booking_id} was handed to an owner directly; set re_advertise to reopen it"),
        });
    }

    let config;
    {
        let mut repo = ClaimsWindowConfigs::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        config = repo
            .push(&ClaimsWindowConfigCreateDBRequest {
                group_booking_id: booking_id,
                deadline: request.deadline,
                min_discount_percent: request.min_discount_percent,
                min_hotel_star_label: request.min_hotel_star.map(|star| star.to_string()),
                notes: request.notes.clone(),
                created_by: admin.id,
            })
            .await?;
    }

    let updated;
    let action;
    if booking.is_open_for_claims {
        // Settings update: the flag and the open timestamp stay untouched.
        updated = booking;
        action = AuditAction::UpdatedClaimsSettings;
    } else {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        updated = repo.mark_open(booking_id, now).await?;
        action = AuditAction::OpenedForClaims;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Audits::record_best_effort(
        &state.db,
        AuditCreateDBRequest {
            group_booking_id: booking_id,
            actor_id: admin.id,
            action,
            description: None,
            metadata: json!({
                "config_version": config.version,
                "deadline": config.deadline,
                "min_discount_percent": config.min_discount_percent,
                "min_hotel_star": request.min_hotel_star,
                "notes": config.notes,
                "re_advertised": request.re_advertise,
            }),
        },
    )
    .await;

    let effective_deadline =
        window::compute_deadline(updated.opened_for_claims_at, Some(&config), state.config.claims.default_window);

    Ok(Json(ClaimsWindowStatusResponse {
        group_booking_id: booking_id,
        is_open_for_claims: updated.is_open_for_claims,
        opened_for_claims_at: updated.opened_for_claims_at,
        effective_deadline,
        config: Some(ClaimsWindowConfigResponse::from(config)),
    }))
}

#[utoipa::path(
    post,
    path = "/bookings/{booking_id}/claims-window/close",
    tag = "claims-windows",
    summary = "Close claims window",
    description = "Closes an open claims window with a structured reason code (or a legacy \
                   free-text reason). Pending claims stay pending and can still be accepted.",
    request_body = CloseClaimsWindowRequest,
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID")
    ),
    responses(
        (status = 200, description = "Window state after the close", body = ClaimsWindowStatusResponse),
        (status = 400, description = "Missing or invalid close reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Window is not open"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn close_claims_window(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CloseClaimsWindowRequest>,
) -> Result<Json<ClaimsWindowStatusResponse>> {
    let reason = request.reason().map_err(|e| Error::BadRequest { message: e.to_string() })?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let booking = match repo.get_by_id(booking_id).await? {
            Some(booking) => booking,
            None => {
                return Err(Error::NotFound {
                    resource: "Group booking".to_string(),
                    id: booking_id.to_string(),
                });
            }
        };
        if !booking.is_open_for_claims {
            return Err(Error::Conflict {
                message: format!("Booking {booking_id} is not open for claims"),
            });
        }
    }

    let updated;
    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        updated = repo.mark_closed(booking_id).await?;
    }
    let config;
    {
        let mut repo = ClaimsWindowConfigs::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        config = repo.active(booking_id).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Audits::record_best_effort(
        &state.db,
        AuditCreateDBRequest {
            group_booking_id: booking_id,
            actor_id: admin.id,
            action: AuditAction::ClosedForClaims,
            description: None,
            metadata: reason.audit_metadata(),
        },
    )
    .await;

    let effective_deadline =
        window::compute_deadline(updated.opened_for_claims_at, config.as_ref(), state.config.claims.default_window);

    Ok(Json(ClaimsWindowStatusResponse {
        group_booking_id: booking_id,
        is_open_for_claims: updated.is_open_for_claims,
        opened_for_claims_at: updated.opened_for_claims_at,
        effective_deadline,
        config: config.map(ClaimsWindowConfigResponse::from),
    }))
}

#[utoipa::path(
    get,
    path = "/bookings/{booking_id}/claims-window",
    tag = "claims-windows",
    summary = "Get claims window status",
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID")
    ),
    responses(
        (status = 200, description = "Current window state and active settings", body = ClaimsWindowStatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Booking not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_claims_window_status(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ClaimsWindowStatusResponse>> {
    // A window past its deadline must never be reported open.
    window::sweep_expired(&state.db, &state.config.claims).await?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let booking;
    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        booking = match repo.get_by_id(booking_id).await? {
            Some(booking) => booking,
            None => {
                return Err(Error::NotFound {
                    resource: "Group booking".to_string(),
                    id: booking_id.to_string(),
                });
            }
        };
    }
    let config;
    {
        let mut repo = ClaimsWindowConfigs::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        config = repo.active(booking_id).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let effective_deadline =
        window::compute_deadline(booking.opened_for_claims_at, config.as_ref(), state.config.claims.default_window);

    Ok(Json(ClaimsWindowStatusResponse {
        group_booking_id: booking_id,
        is_open_for_claims: booking.is_open_for_claims,
        opened_for_claims_at: booking.opened_for_claims_at,
        effective_deadline,
        config: config.map(ClaimsWindowConfigResponse::from),
    }))
}

#[utoipa::path(
    post,
    path = "/claims-windows/sweep",
    tag = "claims-windows",
    summary = "Sweep expired claims windows",
    description = "Closes every open window whose effective deadline has passed. The background \
                   sweeper runs the same operation periodically; this endpoint exists for \
                   operators and cron-style schedulers.",
    responses(
        (status = 200, description = "Sweep result", body = SweepResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn sweep_claims_windows(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<SweepResponse>> {
    let closed_count = window::sweep_expired(&state.db, &state.config.claims).await?;
    Ok(Json(SweepResponse { closed_count }))
}
