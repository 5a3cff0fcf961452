//! Claim submission coordinator.
//!
//! One short transaction re-reads every fact it depends on (booking state,
//! active window config, property directory row) instead of trusting
//! anything the caller fetched earlier, runs the eligibility rules, derives
//! the money fields and inserts the PENDING claim. The partial unique index
//! on `(group_booking_id, owner_id)` backstops the duplicate probe: under a
//! concurrent double-submit exactly one insert commits and the loser maps to
//! the same conflict the probe would have produced.

use crate::api::models::claims::{ClaimCreate, ClaimStatus};
use crate::claims::{eligibility, window};
use crate::config::ClaimsConfig;
use crate::db::errors::DbError;
use crate::db::handlers::{Audits, Claims, ClaimsWindowConfigs, GroupBookings, Properties, Repository};
use crate::db::models::audits::{AuditAction, AuditCreateDBRequest};
use crate::db::models::claims::{ClaimCreateDBRequest, ClaimDBResponse};
use crate::db::models::properties::PropertyStatus;
use crate::errors::{Error, Result};
use crate::types::OwnerId;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Acquire, PgPool};

const DUPLICATE_CLAIM_MESSAGE: &str = "A live claim for this booking already exists";

/// Submit an owner's claim against an open booking.
///
/// Everything up to the insert happens in one transaction; the audit entry
/// is written best-effort after commit.
pub async fn submit(
    pool: &PgPool,
    claims_config: &ClaimsConfig,
    owner_id: OwnerId,
    request: ClaimCreate,
) -> Result<ClaimDBResponse> {
    if request.price_per_night <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "price_per_night must be greater than zero".to_string(),
        });
    }
    if let Some(discount) = request.discount_percent
        && !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&discount)
    {
        return Err(Error::BadRequest {
            message: "discount_percent must be between 0 and 100".to_string(),
        });
    }

    let now = Utc::now();
    let mut tx = pool.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut bookings = GroupBookings::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
    let booking = match bookings.get_by_id(request.group_booking_id).await? {
        Some(booking) => booking,
        None => {
            return Err(Error::NotFound {
                resource: "Group booking".to_string(),
                id: request.group_booking_id.to_string(),
            });
        }
    };
    if booking.is_terminal() || !booking.is_open_for_claims {
        return Err(Error::Conflict {
            message: format!("Booking {} is not open for claims", booking.id),
        });
    }

    let mut configs = ClaimsWindowConfigs::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
    let config = configs.active(booking.id).await?;
    let deadline = window::compute_deadline(booking.opened_for_claims_at, config.as_ref(), claims_config.default_window);

    let mut claims = Claims::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
    if claims.find_live_for_owner(booking.id, owner_id).await?.is_some() {
        return Err(Error::Conflict {
            message: DUPLICATE_CLAIM_MESSAGE.to_string(),
        });
    }

    let mut properties = Properties::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
    let property = match properties.get_by_id(request.property_id).await? {
        // A property that exists but belongs to someone else, or is not
        // approved, reads as absent rather than leaking directory state.
        Some(property) if property.owner_id == owner_id && property.status == PropertyStatus::Approved => property,
        _ => {
            return Err(Error::NotFound {
                resource: "Property".to_string(),
                id: request.property_id.to_string(),
            });
        }
    };

    eligibility::evaluate(&booking, config.as_ref(), &property, request.discount_percent, deadline, now).map_err(
        |rejection| {
            if rejection.is_deadline() {
                Error::Conflict {
                    message: rejection.to_string(),
                }
            } else {
                Error::BadRequest {
                    message: rejection.to_string(),
                }
            }
        },
    )?;

    // ceil over whole dates is the plain difference; flexible-date bookings
    // price as a single night
    let nights = match (booking.check_in, booking.check_out) {
        (Some(check_in), Some(check_out)) => (check_out - check_in).num_days().max(1),
        _ => 1,
    };
    let total_amount = request.price_per_night * Decimal::from(nights) * Decimal::from(booking.rooms_needed);

    let mut claims = Claims::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
    let claim = claims
        .create(&ClaimCreateDBRequest {
            group_booking_id: booking.id,
            owner_id,
            property_id: property.id,
            price_per_night: request.price_per_night,
            discount_percent: request.discount_percent,
            total_amount,
            currency: booking.currency.clone(),
            status: ClaimStatus::Pending,
            special_offers: request.special_offers,
            notes: request.notes,
        })
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation { .. } => Error::Conflict {
                message: DUPLICATE_CLAIM_MESSAGE.to_string(),
            },
            e => Error::Database(e),
        })?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Audits::record_best_effort(
        pool,
        AuditCreateDBRequest {
            group_booking_id: claim.group_booking_id,
            actor_id: owner_id,
            action: AuditAction::ClaimSubmitted,
            description: Some(format!("Claim submitted for property \"{}\"", property.name)),
            metadata: json!({
                "claim_id": claim.id,
                "property_id": claim.property_id,
                "price_per_night": claim.price_per_night,
                "discount_percent": claim.discount_percent,
                "total_amount": claim.total_amount,
            }),
        },
    )
    .await;

    Ok(claim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::bookings::BookingStatus;
    use crate::api::models::users::Role;
    use crate::db::models::bookings::GroupBookingCreateDBRequest;
    use crate::db::models::properties::PropertyCreateDBRequest;
    use crate::db::models::users::UserCreateDBRequest;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use sqlx::{PgConnection, PgPool};
    use uuid::Uuid;

    async fn seed_owner(conn: &mut PgConnection, email: &str) -> OwnerId {
        crate::db::handlers::Users::new(conn)
            .create(&UserCreateDBRequest {
                email: email.to_string(),
                display_name: None,
                role: Role::Owner,
            })
            .await
            .unwrap()
            .id
    }

    fn property_request(owner_id: OwnerId) -> PropertyCreateDBRequest {
        PropertyCreateDBRequest {
            owner_id,
            name: "Uhuru Lodge".to_string(),
            property_type: "Guest House".to_string(),
            region: Some("Arusha".to_string()),
            district: None,
            hotel_star_label: Some("moderate".to_string()),
            capability_tags: vec!["Group Stay".to_string()],
            status: PropertyStatus::Approved,
        }
    }

    async fn create_property(conn: &mut PgConnection, request: &PropertyCreateDBRequest) -> Uuid {
        Properties::new(conn).create(request).await.unwrap().id
    }

    async fn seed_open_booking(
        conn: &mut PgConnection,
        opened_at: DateTime<Utc>,
        check_in: Option<NaiveDate>,
        check_out: Option<NaiveDate>,
    ) -> Uuid {
        let mut repo = GroupBookings::new(conn);
        let booking = repo
            .create(&GroupBookingCreateDBRequest {
                customer_name: "Baraka Mushi".to_string(),
                customer_phone: Some("+255754000111".to_string()),
                status: BookingStatus::Pending,
                region: "Arusha".to_string(),
                district: None,
                location: None,
                accommodation_type: "hostel".to_string(),
                headcount: 18,
                rooms_needed: 3,
                check_in,
                check_out,
                currency: "TZS".to_string(),
                min_hotel_star_label: None,
                special_requests: None,
            })
            .await
            .unwrap();
        repo.mark_open(booking.id, opened_at).await.unwrap();
        booking.id
    }

    fn claim_request(booking_id: Uuid, property_id: Uuid, price: Decimal) -> ClaimCreate {
        ClaimCreate {
            group_booking_id: booking_id,
            property_id,
            price_per_night: price,
            discount_percent: None,
            special_offers: None,
            notes: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_total_amount_for_dated_stay(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let owner = seed_owner(&mut conn, "neema@example.com").await;
        let property_req = property_request(owner);
        let property = create_property(&mut conn, &property_req).await;
        // 2 nights, 3 rooms
        let booking = seed_open_booking(
            &mut conn,
            Utc::now(),
            NaiveDate::from_ymd_opt(2026, 9, 1),
            NaiveDate::from_ymd_opt(2026, 9, 3),
        )
        .await;
        drop(conn);

        let claim = submit(&pool, &config, owner, claim_request(booking, property, Decimal::new(50_000, 0)))
            .await
            .unwrap();

        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.total_amount, Decimal::new(300_000, 0));
        assert_eq!(claim.currency, "TZS");
        assert_eq!(claim.owner_id, owner);

        let mut conn = pool.acquire().await.unwrap();
        let history = Audits::new(&mut conn).list_for_booking(booking, 0, 50).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, "CLAIM_SUBMITTED");
        assert_eq!(history[0].actor_id, owner);
        assert_eq!(history[0].metadata["claim_id"], json!(claim.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_flexible_dates_price_one_night(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let owner = seed_owner(&mut conn, "neema@example.com").await;
        let property_req = property_request(owner);
        let property = create_property(&mut conn, &property_req).await;
        let booking = seed_open_booking(&mut conn, Utc::now(), None, None).await;
        drop(conn);

        let claim = submit(&pool, &config, owner, claim_request(booking, property, Decimal::new(80_000, 0)))
            .await
            .unwrap();
        // 1 night x 3 rooms
        assert_eq!(claim.total_amount, Decimal::new(240_000, 0));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_claim_rejected_until_withdrawn(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let owner = seed_owner(&mut conn, "neema@example.com").await;
        let first_property = create_property(&mut conn, &property_request(owner)).await;
        let mut second_req = property_request(owner);
        second_req.name = "Uhuru Lodge Annex".to_string();
        let second_property = create_property(&mut conn, &second_req).await;
        let booking = seed_open_booking(&mut conn, Utc::now(), None, None).await;
        drop(conn);

        let first = submit(&pool, &config, owner, claim_request(booking, first_property, Decimal::new(60_000, 0)))
            .await
            .unwrap();

        let err = submit(&pool, &config, owner, claim_request(booking, second_property, Decimal::new(55_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(err.user_message(), DUPLICATE_CLAIM_MESSAGE);

        // Withdrawing the live claim frees the slot
        let mut conn = pool.acquire().await.unwrap();
        Claims::new(&mut conn)
            .transition_pending(first.id, ClaimStatus::Withdrawn)
            .await
            .unwrap()
            .unwrap();
        drop(conn);

        let second = submit(&pool, &config, owner, claim_request(booking, second_property, Decimal::new(55_000, 0)))
            .await
            .unwrap();
        assert_eq!(second.property_id, second_property);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_two_owners_can_both_claim(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let first_owner = seed_owner(&mut conn, "neema@example.com").await;
        let second_owner = seed_owner(&mut conn, "juma@example.com").await;
        let first_property = create_property(&mut conn, &property_request(first_owner)).await;
        let second_property = create_property(&mut conn, &property_request(second_owner)).await;
        let booking = seed_open_booking(&mut conn, Utc::now(), None, None).await;
        drop(conn);

        submit(&pool, &config, first_owner, claim_request(booking, first_property, Decimal::new(60_000, 0)))
            .await
            .unwrap();
        submit(&pool, &config, second_owner, claim_request(booking, second_property, Decimal::new(58_000, 0)))
            .await
            .unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_property_must_be_callers_and_approved(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let owner = seed_owner(&mut conn, "neema@example.com").await;
        let other = seed_owner(&mut conn, "juma@example.com").await;
        let others_property = create_property(&mut conn, &property_request(other)).await;
        let mut suspended_req = property_request(owner);
        suspended_req.status = PropertyStatus::Suspended;
        let suspended = create_property(&mut conn, &suspended_req).await;
        let booking = seed_open_booking(&mut conn, Utc::now(), None, None).await;
        drop(conn);

        let err = submit(&pool, &config, owner, claim_request(booking, others_property, Decimal::new(60_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let err = submit(&pool, &config, owner, claim_request(booking, suspended, Decimal::new(60_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let err = submit(&pool, &config, owner, claim_request(booking, Uuid::new_v4(), Decimal::new(60_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_closed_booking_conflicts(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let owner = seed_owner(&mut conn, "neema@example.com").await;
        let property = create_property(&mut conn, &property_request(owner)).await;
        let booking = seed_open_booking(&mut conn, Utc::now(), None, None).await;
        GroupBookings::new(&mut conn).mark_closed(booking).await.unwrap();
        drop(conn);

        let err = submit(&pool, &config, owner, claim_request(booking, property, Decimal::new(60_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert!(err.user_message().contains("not open for claims"));

        let err = submit(&pool, &config, owner, claim_request(Uuid::new_v4(), property, Decimal::new(60_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_stale_open_flag_still_honors_deadline(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let owner = seed_owner(&mut conn, "neema@example.com").await;
        let property = create_property(&mut conn, &property_request(owner)).await;
        // Opened well past the default window, sweeper has not run
        let booking = seed_open_booking(&mut conn, Utc::now() - Duration::days(10), None, None).await;
        drop(conn);

        let err = submit(&pool, &config, owner, claim_request(booking, property, Decimal::new(60_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert!(err.user_message().contains("deadline has passed"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_eligibility_rejection_surfaces_reason(pool: PgPool) {
        let config = ClaimsConfig::default();
        let mut conn = pool.acquire().await.unwrap();
        let owner = seed_owner(&mut conn, "neema@example.com").await;
        let mut dodoma_req = property_request(owner);
        dodoma_req.region = Some("Dodoma".to_string());
        let property = create_property(&mut conn, &dodoma_req).await;
        let booking = seed_open_booking(&mut conn, Utc::now(), None, None).await;
        drop(conn);

        let err = submit(&pool, &config, owner, claim_request(booking, property, Decimal::new(60_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
        assert!(err.user_message().contains("region mismatch"));

        // Nothing was written
        let mut conn = pool.acquire().await.unwrap();
        let history = Audits::new(&mut conn).list_for_booking(booking, 0, 50).await.unwrap();
        assert!(history.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_payload_validation(pool: PgPool) {
        let config = ClaimsConfig::default();
        let owner = Uuid::new_v4();
        let booking = Uuid::new_v4();
        let property = Uuid::new_v4();

        let err = submit(&pool, &config, owner, claim_request(booking, property, Decimal::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));

        let mut request = claim_request(booking, property, Decimal::new(60_000, 0));
        request.discount_percent = Some(Decimal::new(150, 0));
        let err = submit(&pool, &config, owner, request).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
        assert!(err.user_message().contains("between 0 and 100"));

        let mut request = claim_request(booking, property, Decimal::new(60_000, 0));
        request.discount_percent = Some(Decimal::new(-5, 0));
        let err = submit(&pool, &config, owner, request).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }
}
