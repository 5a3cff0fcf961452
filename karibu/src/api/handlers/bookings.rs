//! Admin handlers for the group-booking registry.
//!
//! Bookings are created and listed here, handed to a specific owner outside
//! the claims flow, and confirmed by accepting one of their claims. Read
//! paths sweep expired claims windows first so callers never observe a
//! window that is past its deadline but still flagged open.

use crate::api::models::audits::AuditResponse;
use crate::api::models::bookings::{
    AssignOwnerRequest, BookingStatus, GroupBookingCreate, GroupBookingResponse, ListBookingsQuery,
};
use crate::api::models::claims::{ClaimResponse, ClaimStatus, ListClaimsQuery};
use crate::api::models::claims_windows::{CloseReason, CloseReasonCode};
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::api::models::users::Role;
use crate::auth::RequireAdmin;
use crate::claims::window;
use crate::db::handlers::{
    Audits, Claims, GroupBookings, Repository, Users, bookings::BookingFilter, claims::ClaimFilter,
};
use crate::db::models::audits::{AuditAction, AuditCreateDBRequest};
use crate::db::models::bookings::GroupBookingCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::{BookingId, ClaimId};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::json;
use sqlx::Acquire;

#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    summary = "Create group booking",
    request_body = GroupBookingCreate,
    responses(
        (status = 201, description = "Booking created", body = GroupBookingResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_booking(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(create): Json<GroupBookingCreate>,
) -> Result<(StatusCode, Json<GroupBookingResponse>)> {
    if create.headcount <= 0 {
        return Err(Error::BadRequest {
            message: "headcount must be positive".to_string(),
        });
    }
    if create.rooms_needed <= 0 {
        return Err(Error::BadRequest {
            message: "rooms_needed must be positive".to_string(),
        });
    }
    if let (Some(check_in), Some(check_out)) = (create.check_in, create.check_out)
        && check_out <= check_in
    {
        return Err(Error::BadRequest {
            message: "check_out must be after check_in".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = GroupBookings::new(&mut pool_conn);

    let request = GroupBookingCreateDBRequest {
        customer_name: create.customer_name,
        customer_phone: create.customer_phone,
        status: BookingStatus::Pending,
        region: create.region,
        district: create.district,
        location: create.location,
        accommodation_type: create.accommodation_type,
        headcount: create.headcount,
        rooms_needed: create.rooms_needed,
        check_in: create.check_in,
        check_out: create.check_out,
        currency: create.currency.unwrap_or_else(|| "TZS".to_string()),
        min_hotel_star_label: create.min_hotel_star_label,
        special_requests: create.special_requests,
    };

    let booking = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(GroupBookingResponse::from(booking))))
}

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    summary = "List group bookings",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "Paginated bookings", body = PaginatedResponse<GroupBookingResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<PaginatedResponse<GroupBookingResponse>>> {
    // Expiry is enforced lazily on reads as well as by the sweeper.
    window::sweep_expired(&state.db, &state.config.claims).await?;

    let (skip, limit) = query.pagination.params();
    let filter = BookingFilter {
        status: query.status,
        open_for_claims: query.open_for_claims,
        assigned: query.assigned,
        region: query.region,
        skip,
        limit,
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let total_count;
    let bookings;
    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        total_count = repo.count(&filter).await?;
        bookings = repo.list(&filter).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let data = bookings.into_iter().map(GroupBookingResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

#[utoipa::path(
    get,
    path = "/bookings/{booking_id}",
    tag = "bookings",
    summary = "Get group booking",
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = GroupBookingResponse),
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
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<GroupBookingResponse>> {
    window::sweep_expired(&state.db, &state.config.claims).await?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = GroupBookings::new(&mut pool_conn);

    match repo.get_by_id(booking_id).await? {
        Some(booking) => Ok(Json(GroupBookingResponse::from(booking))),
        None => Err(Error::NotFound {
            resource: "Group booking".to_string(),
            id: booking_id.to_string(),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/bookings/{booking_id}/audits",
    tag = "bookings",
    summary = "List booking audit trail",
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID"),
        Pagination
    ),
    responses(
        (status = 200, description = "Audit entries, newest first", body = Vec<AuditResponse>),
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
pub async fn list_booking_audits(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    Query(pagination): Query<Pagination>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AuditResponse>>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        if repo.get_by_id(booking_id).await?.is_none() {
            return Err(Error::NotFound {
                resource: "Group booking".to_string(),
                id: booking_id.to_string(),
            });
        }
    }

    let audits;
    {
        let mut repo = Audits::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        audits = repo
            .list_for_booking(booking_id, pagination.skip(), pagination.limit())
            .await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(audits.into_iter().map(AuditResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/bookings/{booking_id}/claims",
    tag = "bookings",
    summary = "List claims on a booking",
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID"),
        ListClaimsQuery
    ),
    responses(
        (status = 200, description = "Claims on the booking", body = Vec<ClaimResponse>),
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
pub async fn list_booking_claims(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    Query(query): Query<ListClaimsQuery>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<ClaimResponse>>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        if repo.get_by_id(booking_id).await?.is_none() {
            return Err(Error::NotFound {
                resource: "Group booking".to_string(),
                id: booking_id.to_string(),
            });
        }
    }

    let claims;
    {
        let mut repo = Claims::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let (skip, limit) = query.pagination.params();
        let filter = ClaimFilter {
            group_booking_id: Some(booking_id),
            owner_id: None,
            status: query.status,
            skip,
            limit,
        };
        claims = repo.list(&filter).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/bookings/{booking_id}/assignment",
    tag = "bookings",
    summary = "Assign booking to an owner",
    description = "Hand the booking to a specific owner outside the claims flow, with optional \
                   recommended properties and a message recorded in the audit trail.",
    request_body = AssignOwnerRequest,
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID")
    ),
    responses(
        (status = 200, description = "Booking assigned", body = GroupBookingResponse),
        (status = 400, description = "Assignee is not a property owner"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking has an open claims window or is already settled"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn assign_owner(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<AssignOwnerRequest>,
) -> Result<Json<GroupBookingResponse>> {
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

        // Direct assignment and the claims window are mutually exclusive.
        if booking.is_open_for_claims {
            return Err(Error::Conflict {
                message: format!("Booking {booking_id} has an open claims window; close it before assigning an owner"),
            });
        }
        if booking.is_terminal() {
            return Err(Error::Conflict {
                message: format!("Booking {booking_id} is no longer active"),
            });
        }
        if booking.confirmed_property_id.is_some() {
            return Err(Error::Conflict {
                message: format!("Booking {booking_id} already has a confirmed property"),
            });
        }
    }

    {
        let mut repo = Users::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        match repo.get_by_id(request.owner_id).await? {
            Some(user) if user.role == Role::Owner => {}
            _ => {
                return Err(Error::BadRequest {
                    message: format!("User {} is not a property owner", request.owner_id),
                });
            }
        }
    }

    let booking;
    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        booking = repo
            .assign_owner(booking_id, request.owner_id, &request.recommended_property_ids, Utc::now())
            .await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Audits::record_best_effort(
        &state.db,
        AuditCreateDBRequest {
            group_booking_id: booking_id,
            actor_id: admin.id,
            action: AuditAction::OwnerMessageSent,
            description: request.message.clone(),
            metadata: json!({
                "owner_id": request.owner_id,
                "recommended_property_ids": request.recommended_property_ids,
                "message": request.message,
            }),
        },
    )
    .await;

    Ok(Json(GroupBookingResponse::from(booking)))
}

#[utoipa::path(
    post,
    path = "/bookings/{booking_id}/claims/{claim_id}/accept",
    tag = "bookings",
    summary = "Accept a claim",
    description = "Accept one pending claim: the booking is confirmed against the claim's \
                   property and owner, every competing pending claim is rejected, and the \
                   claims window closes.",
    params(
        ("booking_id" = uuid::Uuid, Path, description = "Group booking ID"),
        ("claim_id" = uuid::Uuid, Path, description = "Claim ID")
    ),
    responses(
        (status = 200, description = "Claim accepted and booking confirmed", body = ClaimResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Booking or claim not found"),
        (status = 409, description = "Claim is not pending or booking is already settled"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("X-Karibu-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn accept_claim(
    State(state): State<AppState>,
    Path((booking_id, claim_id)): Path<(BookingId, ClaimId)>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<ClaimResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let window_was_open;
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
        if booking.is_terminal() {
            return Err(Error::Conflict {
                message: format!("Booking {booking_id} is no longer active"),
            });
        }
        if booking.confirmed_property_id.is_some() {
            return Err(Error::Conflict {
                message: format!("Booking {booking_id} already has a confirmed property"),
            });
        }
        window_was_open = booking.is_open_for_claims;
    }

    let accepted;
    let rejected;
    {
        let mut repo = Claims::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let claim = match repo.get_by_id(claim_id).await? {
            Some(claim) if claim.group_booking_id == booking_id => claim,
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

        // The guarded UPDATE decides a race with a concurrent withdraw or
        // accept; losing it reads as the claim no longer being pending.
        accepted = match repo.transition_pending(claim_id, ClaimStatus::Accepted).await? {
            Some(claim) => claim,
            None => {
                return Err(Error::Conflict {
                    message: format!("Claim {claim_id} is not pending"),
                });
            }
        };
        rejected = repo.reject_pending_except(booking_id, claim_id).await?;
    }

    {
        let mut repo = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.confirm_property(booking_id, accepted.property_id, accepted.owner_id, Utc::now())
            .await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Audits::record_best_effort(
        &state.db,
        AuditCreateDBRequest {
            group_booking_id: booking_id,
            actor_id: admin.id,
            action: AuditAction::ClaimAccepted,
            description: Some("Claim accepted and booking confirmed".to_string()),
            metadata: json!({
                "claim_id": claim_id,
                "property_id": accepted.property_id,
                "owner_id": accepted.owner_id,
                "rejected_claim_ids": rejected,
            }),
        },
    )
    .await;
    if window_was_open {
        Audits::record_best_effort(
            &state.db,
            AuditCreateDBRequest {
                group_booking_id: booking_id,
                actor_id: admin.id,
                action: AuditAction::ClosedForClaims,
                description: None,
                metadata: CloseReason::Coded {
                    code: CloseReasonCode::OwnerConfirmed,
                    details: None,
                }
                .audit_metadata(),
            },
        )
        .await;
    }

    Ok(Json(ClaimResponse::from(accepted)))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{
            audits::AuditResponse,
            bookings::{BookingStatus, GroupBookingResponse},
            claims::{ClaimResponse, ClaimStatus},
            users::Role,
        },
        db::{
            handlers::{Claims, GroupBookings, Repository},
            models::{bookings::GroupBookingDBResponse, claims::ClaimCreateDBRequest},
        },
        test_utils::*,
        types::{OwnerId, PropertyId},
    };
    use axum::http::StatusCode;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;
    use uuid::Uuid;

    async fn seed_claim(
        pool: &PgPool,
        booking: &GroupBookingDBResponse,
        owner_id: OwnerId,
        property_id: PropertyId,
    ) -> crate::db::models::claims::ClaimDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        Claims::new(&mut conn)
            .create(&ClaimCreateDBRequest {
                group_booking_id: booking.id,
                owner_id,
                property_id,
                price_per_night: Decimal::new(50_000, 0),
                discount_percent: Some(Decimal::new(10, 0)),
                total_amount: Decimal::new(150_000, 0),
                currency: booking.currency.clone(),
                status: ClaimStatus::Pending,
                special_offers: None,
                notes: None,
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_booking_and_get(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;

        let response = app
            .post("/admin/api/v1/bookings")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&json!({
                "customer_name": "Neema Swai",
                "customer_phone": "+255700111222",
                "region": "Arusha",
                "district": "Arusha District",
                "accommodation_type": "hostel",
                "headcount": 18,
                "rooms_needed": 3,
                "check_in": "2026-09-10",
                "check_out": "2026-09-12",
                "min_hotel_star_label": "moderate",
                "special_requests": "ground-floor rooms"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let booking: GroupBookingResponse = response.json();
        assert_eq!(booking.customer_name, "Neema Swai");
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.currency, "TZS");
        assert!(!booking.is_open_for_claims);
        assert!(booking.assigned_owner_id.is_none());

        let response = app
            .get(&format!("/admin/api/v1/bookings/{}", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let fetched: GroupBookingResponse = response.json();
        assert_eq!(fetched.id, booking.id);
        assert_eq!(fetched.headcount, 18);

        let response = app
            .get(&format!("/admin/api/v1/bookings/{}", Uuid::new_v4()))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_booking_rejects_bad_payloads(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;

        let base = json!({
            "customer_name": "Neema Swai",
            "region": "Arusha",
            "accommodation_type": "hostel",
            "headcount": 18,
            "rooms_needed": 3
        });

        let mut zero_headcount = base.clone();
        zero_headcount["headcount"] = json!(0);
        let response = app
            .post("/admin/api/v1/bookings")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&zero_headcount)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let mut zero_rooms = base.clone();
        zero_rooms["rooms_needed"] = json!(-1);
        let response = app
            .post("/admin/api/v1/bookings")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&zero_rooms)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let mut inverted_dates = base.clone();
        inverted_dates["check_in"] = json!("2026-09-12");
        inverted_dates["check_out"] = json!("2026-09-12");
        let response = app
            .post("/admin/api/v1/bookings")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&inverted_dates)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_bookings_filters_and_pagination(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let owner = create_test_user(&pool, Role::Owner).await;

        let open_booking = create_test_booking(&pool).await;
        let assigned_booking = create_test_booking(&pool).await;
        let _plain_booking = create_test_booking(&pool).await;

        open_window_for(&pool, open_booking.id).await;
        let mut conn = pool.acquire().await.unwrap();
        GroupBookings::new(&mut conn)
            .assign_owner(assigned_booking.id, owner.id, &[], Utc::now())
            .await
            .unwrap();

        let response = app
            .get("/admin/api/v1/bookings")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let page: crate::api::models::pagination::PaginatedResponse<GroupBookingResponse> = response.json();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.data.len(), 3);

        let response = app
            .get("/admin/api/v1/bookings?open_for_claims=true")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let page: crate::api::models::pagination::PaginatedResponse<GroupBookingResponse> = response.json();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].id, open_booking.id);

        let response = app
            .get("/admin/api/v1/bookings?assigned=true")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let page: crate::api::models::pagination::PaginatedResponse<GroupBookingResponse> = response.json();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].id, assigned_booking.id);
        assert_eq!(page.data[0].assigned_owner_id, Some(owner.id));

        let response = app
            .get("/admin/api/v1/bookings?limit=2")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let page: crate::api::models::pagination::PaginatedResponse<GroupBookingResponse> = response.json();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.data.len(), 2);

        let response = app
            .get("/admin/api/v1/bookings?region=Dodoma")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let page: crate::api::models::pagination::PaginatedResponse<GroupBookingResponse> = response.json();
        assert_eq!(page.total_count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_booking_registry_requires_admin(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let owner = create_test_user(&pool, Role::Owner).await;

        let response = app
            .get("/admin/api/v1/bookings")
            .add_header(add_auth_headers(&owner).0, add_auth_headers(&owner).1)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = app
            .post("/admin/api/v1/bookings")
            .add_header(add_auth_headers(&owner).0, add_auth_headers(&owner).1)
            .json(&json!({
                "customer_name": "Neema Swai",
                "region": "Arusha",
                "accommodation_type": "hostel",
                "headcount": 18,
                "rooms_needed": 3
            }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // No identity header at all
        let response = app.get("/admin/api/v1/bookings").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_assign_owner_records_message(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let owner = create_test_user(&pool, Role::Owner).await;
        let property = create_test_property(&pool, owner.id).await;
        let booking = create_test_booking(&pool).await;

        let response = app
            .post(&format!("/admin/api/v1/bookings/{}/assignment", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&json!({
                "owner_id": owner.id,
                "recommended_property_ids": [property.id],
                "message": "Customer prefers a quiet compound"
            }))
            .await;
        response.assert_status_ok();
        let assigned: GroupBookingResponse = response.json();
        assert_eq!(assigned.assigned_owner_id, Some(owner.id));
        assert_eq!(assigned.recommended_property_ids, vec![property.id]);
        assert!(assigned.owner_assigned_at.is_some());

        let response = app
            .get(&format!("/admin/api/v1/bookings/{}/audits", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let audits: Vec<AuditResponse> = response.json();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].action, "OWNER_MESSAGE_SENT");
        assert_eq!(audits[0].actor_id, admin.id);
        assert_eq!(audits[0].description.as_deref(), Some("Customer prefers a quiet compound"));
        assert_eq!(audits[0].metadata["owner_id"], json!(owner.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_assign_owner_validates_state_and_assignee(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let owner = create_test_user(&pool, Role::Owner).await;

        // Unknown booking
        let response = app
            .post(&format!("/admin/api/v1/bookings/{}/assignment", Uuid::new_v4()))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&json!({ "owner_id": owner.id }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // Admins cannot be assignees
        let booking = create_test_booking(&pool).await;
        let response = app
            .post(&format!("/admin/api/v1/bookings/{}/assignment", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&json!({ "owner_id": admin.id }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Nor can unknown users
        let response = app
            .post(&format!("/admin/api/v1/bookings/{}/assignment", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&json!({ "owner_id": Uuid::new_v4() }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // An open claims window blocks direct assignment
        open_window_for(&pool, booking.id).await;
        let response = app
            .post(&format!("/admin/api/v1/bookings/{}/assignment", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&json!({ "owner_id": owner.id }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_accept_claim_confirms_booking_and_rejects_rest(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let first_owner = create_test_user(&pool, Role::Owner).await;
        let second_owner = create_test_user(&pool, Role::Owner).await;
        let first_property = create_test_property(&pool, first_owner.id).await;
        let second_property = create_test_property(&pool, second_owner.id).await;

        let booking = create_test_booking(&pool).await;
        open_window_for(&pool, booking.id).await;
        let winner = seed_claim(&pool, &booking, first_owner.id, first_property.id).await;
        let loser = seed_claim(&pool, &booking, second_owner.id, second_property.id).await;

        let response = app
            .post(&format!("/admin/api/v1/bookings/{}/claims/{}/accept", booking.id, winner.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let accepted: ClaimResponse = response.json();
        assert_eq!(accepted.id, winner.id);
        assert_eq!(accepted.status, ClaimStatus::Accepted);

        // Competing pending claim was rejected
        let mut conn = pool.acquire().await.unwrap();
        let loser_now = Claims::new(&mut conn).get_by_id(loser.id).await.unwrap().unwrap();
        assert_eq!(loser_now.status, ClaimStatus::Rejected);

        // Booking confirmed against the winning property, window closed
        let response = app
            .get(&format!("/admin/api/v1/bookings/{}", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let confirmed: GroupBookingResponse = response.json();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.confirmed_property_id, Some(first_property.id));
        assert_eq!(confirmed.assigned_owner_id, Some(first_owner.id));
        assert!(!confirmed.is_open_for_claims);

        let response = app
            .get(&format!("/admin/api/v1/bookings/{}/audits", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let audits: Vec<AuditResponse> = response.json();
        let actions: Vec<&str> = audits.iter().map(|a| a.action.as_str()).collect();
        assert!(actions.contains(&"CLAIM_ACCEPTED"));
        assert!(actions.contains(&"CLOSED_FOR_CLAIMS"));
        let close = audits.iter().find(|a| a.action == "CLOSED_FOR_CLAIMS").unwrap();
        assert_eq!(close.metadata["close_reason_code"], "OWNER_CONFIRMED");
        let accept = audits.iter().find(|a| a.action == "CLAIM_ACCEPTED").unwrap();
        assert_eq!(accept.metadata["rejected_claim_ids"], json!([loser.id]));

        // The losing claim can no longer be accepted
        let response = app
            .post(&format!("/admin/api/v1/bookings/{}/claims/{}/accept", booking.id, loser.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_accept_claim_requires_matching_booking(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let owner = create_test_user(&pool, Role::Owner).await;
        let property = create_test_property(&pool, owner.id).await;

        let booking = create_test_booking(&pool).await;
        let other_booking = create_test_booking(&pool).await;
        open_window_for(&pool, booking.id).await;
        let claim = seed_claim(&pool, &booking, owner.id, property.id).await;

        // Claim exists but belongs to another booking
        let response = app
            .post(&format!(
                "/admin/api/v1/bookings/{}/claims/{}/accept",
                other_booking.id, claim.id
            ))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // Unknown claim id
        let response = app
            .post(&format!(
                "/admin/api/v1/bookings/{}/claims/{}/accept",
                booking.id,
                Uuid::new_v4()
            ))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_booking_claims_with_status_filter(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let first_owner = create_test_user(&pool, Role::Owner).await;
        let second_owner = create_test_user(&pool, Role::Owner).await;
        let first_property = create_test_property(&pool, first_owner.id).await;
        let second_property = create_test_property(&pool, second_owner.id).await;

        let booking = create_test_booking(&pool).await;
        open_window_for(&pool, booking.id).await;
        let kept = seed_claim(&pool, &booking, first_owner.id, first_property.id).await;
        let withdrawn = seed_claim(&pool, &booking, second_owner.id, second_property.id).await;
        let mut conn = pool.acquire().await.unwrap();
        Claims::new(&mut conn)
            .transition_pending(withdrawn.id, ClaimStatus::Withdrawn)
            .await
            .unwrap()
            .unwrap();

        let response = app
            .get(&format!("/admin/api/v1/bookings/{}/claims", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let claims: Vec<ClaimResponse> = response.json();
        assert_eq!(claims.len(), 2);

        let response = app
            .get(&format!("/admin/api/v1/bookings/{}/claims?status=PENDING", booking.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_ok();
        let claims: Vec<ClaimResponse> = response.json();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id, kept.id);

        let response = app
            .get(&format!("/admin/api/v1/bookings/{}/claims", Uuid::new_v4()))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
