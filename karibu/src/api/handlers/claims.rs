//! Owner-facing handlers: open bookings, claim lifecycle and assignment
//! acknowledgement.
//!
//! Everything here is scoped to the authenticated owner. Claims on other
//! owners' behalf do not exist as far as this surface is concerned; foreign
//! claim ids read as absent rather than forbidden.

use crate::api::models::bookings::GroupBookingResponse;
use crate::api::models::claims::{ClaimCreate, ClaimResponse, ClaimStatus, ListClaimsQuery};
use crate::api::models::pagination::Pagination;
use crate::auth::RequireOwner;
use crate::claims::{submission, window};
use crate::db::handlers::{Audits, Claims, GroupBookings, Repository, claims::ClaimFilter};
use crate::db::models::audits::{AuditAction, AuditCreateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{BookingId, ClaimId};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use sqlx::Acquire;

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "claims",
    summary = "List bookings open for claims",
    params(Pagination),
    responses(
        (status = 200, description = "Bookings currently open for claims, newest first", body = Vec<GroupBookingResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Property owner role required"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_open_bookings(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    RequireOwner(_owner): RequireOwner,
) -> Result<Json<Vec<GroupBookingResponse>>> {
    // Owners must never see a window that is past its deadline.
    window::sweep_expired(&state.db, &state.config.claims).await?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = GroupBookings::new(&mut pool_conn);
    let bookings = repo.list_open_for_claims(pagination.skip(), pagination.limit()).await?;

    Ok(Json(bookings.into_iter().map(GroupBookingResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/claims",
    tag = "claims",
    summary = "Submit a claim",
    description = "Submit a competitive claim on an open booking with one of your approved \
                   properties. The offer is checked against the booking's requirements and the \
                   active window settings; one live claim per owner per booking.",
    request_body = ClaimCreate,
    responses(
        (status = 201, description = "Claim submitted", body = ClaimResponse),
        (status = 400, description = "Offer fails the booking's requirements"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Property owner role required"),
        (status = 404, description = "Booking or property not found"),
        (status = 409, description = "Window closed, deadline passed, or a live claim already exists"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_claim(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Json(request): Json<ClaimCreate>,
) -> Result<(StatusCode, Json<ClaimResponse>)> {
    let claim = submission::submit(&state.db, &state.config.claims, owner.id, request).await?;
    Ok((StatusCode::CREATED, Json(ClaimResponse::from(claim))))
}

#[utoipa::path(
    get,
    path = "/claims",
    tag = "claims",
    summary = "List my claims",
    params(ListClaimsQuery),
    responses(
        (status = 200, description = "The caller's claims", body = Vec<ClaimResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Property owner role required"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_my_claims(
    State(state): State<AppState>,
    Query(query): Query<ListClaimsQuery>,
    RequireOwner(owner): RequireOwner,
) -> Result<Json<Vec<ClaimResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Claims::new(&mut pool_conn);

    let (skip, limit) = query.pagination.params();
    let filter = ClaimFilter {
        group_booking_id: None,
        owner_id: Some(owner.id),
        status: query.status,
        skip,
        limit,
    };
    let claims = repo.list(&filter).await?;

    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/claims/{claim_id}/withdraw",
    tag = "claims",
    summary = "Withdraw a claim",
    description = "Withdraw your pending claim. Withdrawing frees your one-live-claim slot on \
                   the booking, so a corrected claim can be submitted afterwards.",
    params(
        ("claim_id" = uuid::Uuid, Path, description = "Claim ID")
    ),
    responses(
        (status = 200, description = "Claim withdrawn", body = ClaimResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Property owner role required"),
        (status = 404, description = "Claim not found"),
        (status = 409, description = "Claim is not pending"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn withdraw_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<ClaimId>,
    RequireOwner(owner): RequireOwner,
) -> Result<Json<ClaimResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let withdrawn;
    {
        let mut repo = Claims::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let claim = match repo.get_by_id(claim_id).await? {
            Some(claim) if claim.owner_id == owner.id => claim,
            _ => {
                return Err(Error::NotFound {
                    resource: "Claim".to_string(),
                    id: claim_id.to_string(),
                });
            }
        };
        if claim.status != ClaimStatus::Pending {
            return Err(Error::Conflict {
                message: format!("Claim {claim_id} is not pending"),
            });
        }
        withdrawn = match repo.transition_pending(claim_id, ClaimStatus::Withdrawn).await? {
            Some(claim) => claim,
            None => {
                return Err(Error::Conflict {
                    message: format!("Claim {claim_id} is not pending"),
                });
            }
        };
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Audits::record_best_effort(
        &state.db,
        AuditCreateDBRequest {
            group_booking_id: withdrawn.group_booking_id,
            actor_id: owner.id,
            action: AuditAction::ClaimWithdrawn,
            description: None,
            metadata: json!({
                "claim_id": claim_id,
                "property_id": withdrawn.property_id,
            }),
        },
    )
    .await;

    Ok(Json(ClaimResponse::from(withdrawn)))
}

#[utoipa::path(
    post,
    path = "/bookings/{booking_id}/assignment/accept",
    tag = "claims",
    summary = "Accept a direct assignment",
    description = "Acknowledge a booking the admin handed to you directly. This records the \
                   acceptance in the audit trail; confirming the booking against a property \
                   stays an admin action.",
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID")
    ),
    responses(
        (status = 200, description = "Assignment acknowledged", body = GroupBookingResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Booking is not assigned to the caller"),
        (status = 404, description = "Booking not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn accept_assignment(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    RequireOwner(owner): RequireOwner,
) -> Result<Json<GroupBookingResponse>> {
    let booking;
    {
        let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut repo = GroupBookings::new(&mut pool_conn);
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
    if booking.assigned_owner_id != Some(owner.id) {
        return Err(Error::Forbidden {
            message: "Booking is not assigned to you".to_string(),
        });
    }

    Audits::record_best_effort(
        &state.db,
        AuditCreateDBRequest {
            group_booking_id: booking_id,
            actor_id: owner.id,
            action: AuditAction::OwnerAcceptedAssignment,
            description: None,
            metadata: json!({ "owner_id": owner.id }),
        },
    )
    .await;

    Ok(Json(GroupBookingResponse::from(booking)))
}
