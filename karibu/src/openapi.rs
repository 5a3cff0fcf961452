//! OpenAPI documentation configuration.
//!
//! This module provides OpenAPI documentation for the two API surfaces:
//! - [`AdminApiDoc`]: Back-office API at `/admin/api/v1/*`
//! - [`OwnerApiDoc`]: Property-owner API at `/owner/api/v1/*`

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Security scheme for both surfaces: the identity header injected by the
/// fronting proxy.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "X-Karibu-User".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-karibu-user",
                    "Email of the authenticated caller, injected by the trusted fronting proxy. \
                     The engine resolves it against the users table; it never verifies credentials itself.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/admin/api/v1", description = "Admin API server")
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::bookings::create_booking,
        api::handlers::bookings::list_bookings,
        api::handlers::bookings::get_booking,
        api::handlers::bookings::list_booking_audits,
        api::handlers::bookings::list_booking_claims,
        api::handlers::bookings::assign_owner,
        api::handlers::bookings::accept_claim,
        api::handlers::claims_windows::open_claims_window,
        api::handlers::claims_windows::close_claims_window,
        api::handlers::claims_windows::get_claims_window_status,
        api::handlers::claims_windows::sweep_claims_windows,
    ),
    components(
        schemas(
            api::models::bookings::BookingStatus,
            api::models::bookings::GroupBookingCreate,
            api::models::bookings::GroupBookingResponse,
            api::models::bookings::ListBookingsQuery,
            api::models::bookings::AssignOwnerRequest,
            api::models::claims::ClaimStatus,
            api::models::claims::ClaimResponse,
            api::models::claims::ListClaimsQuery,
            api::models::claims_windows::CloseReasonCode,
            api::models::claims_windows::OpenClaimsWindowRequest,
            api::models::claims_windows::CloseClaimsWindowRequest,
            api::models::claims_windows::ClaimsWindowStatusResponse,
            api::models::claims_windows::ClaimsWindowConfigResponse,
            api::models::claims_windows::SweepResponse,
            api::models::audits::AuditResponse,
            api::models::users::Role,
            api::models::pagination::PaginatedResponse<api::models::bookings::GroupBookingResponse>,
        )
    ),
    tags(
        (name = "bookings", description = "Group booking registry and lifecycle.

Bookings enter as phone-intake records, get advertised to owners through a claims window or
handed to an owner directly, and settle as confirmed or canceled. Every state transition is
recorded on the booking's audit trail."),
        (name = "claims-windows", description = "Competitive claims window lifecycle.

Opening a window advertises a booking to property owners; each open (or settings update) pushes
a new immutable config version carrying the deadline and eligibility floors. Windows close
explicitly with a structured reason, automatically when an owner's claim is accepted, or by the
expiry sweep once the deadline passes."),
    ),
    info(
        title = "Karibu Admin API",
        version = "3.2.0",
        description = "Back-office API for the group-stay competitive claims engine.

## Authentication

All endpoints require the identity header set by the fronting proxy:

```
x-karibu-user: admin@example.com
```

The caller must resolve to a user with the `ADMIN` role.

## Errors

Errors are returned as plain-text bodies with a matching status code: `400` for invalid
payloads, `404` for unknown resources, `409` for state conflicts (already-settled bookings,
non-pending claims, concurrent modifications).",
    ),
)]
pub struct AdminApiDoc;

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/owner/api/v1", description = "Owner API server")
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::claims::list_open_bookings,
        api::handlers::claims::submit_claim,
        api::handlers::claims::list_my_claims,
        api::handlers::claims::withdraw_claim,
        api::handlers::claims::accept_assignment,
    ),
    components(
        schemas(
            api::models::bookings::BookingStatus,
            api::models::bookings::GroupBookingResponse,
            api::models::claims::ClaimStatus,
            api::models::claims::ClaimCreate,
            api::models::claims::ClaimResponse,
            api::models::claims::ListClaimsQuery,
            api::models::users::Role,
        )
    ),
    tags(
        (name = "claims", description = "Owner-side claim submission and discovery.

Owners browse bookings with open claims windows, submit one live claim per booking from one of
their approved properties, and may withdraw a pending claim to submit a different offer. A claim
accepted by the back office confirms the booking and rejects all rival claims."),
    ),
    info(
        title = "Karibu Owner API",
        version = "3.2.0",
        description = "Property-owner API for the group-stay competitive claims engine.

## Authentication

All endpoints require the identity header set by the fronting proxy:

```
x-karibu-user: owner@example.com
```

The caller must resolve to a user with the `OWNER` role. Claims belonging to other owners read
as absent, not forbidden.

## Errors

Errors are returned as plain-text bodies with a matching status code: `400` for ineligible
claims (closed window, region mismatch, below the discount floor), `404` for unknown or foreign
resources, `409` for duplicate live claims and settled-claim transitions.",
    ),
)]
pub struct OwnerApiDoc;
