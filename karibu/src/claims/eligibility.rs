//! Eligibility rules for owner claims.
//!
//! Pure and synchronous: the submission coordinator hands in freshly-read
//! booking, property and window-config rows and gets back `Ok` or the first
//! failing rule. Rules run in a fixed order and short-circuit.
//!
//! The [`Rejection`] display strings are part of the API contract; they
//! surface verbatim in error responses, so owners can see exactly which rule
//! turned their claim away.

use crate::db::models::bookings::GroupBookingDBResponse;
use crate::db::models::properties::PropertyDBResponse;
use crate::db::models::window_configs::ClaimsWindowConfigDBResponse;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// The capability tag (after normalization) that marks a property as able to
/// host group stays.
pub const GROUP_STAY_TAG: &str = "group stay";

/// Why a claim was turned away. Ordered like the rules that produce them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("property is missing the \"group stay\" capability tag")]
    MissingGroupStayTag,
    #[error("accommodation type mismatch: booking requires \"{requested}\", property offers \"{offered}\"")]
    AccommodationTypeMismatch { requested: String, offered: String },
    #[error("property has no region on record; booking is for \"{requested}\"")]
    MissingRegion { requested: String },
    #[error("region mismatch: booking is for \"{requested}\", property is in \"{actual}\"")]
    RegionMismatch { requested: String, actual: String },
    #[error("property has no district on record; booking requires \"{requested}\"")]
    MissingDistrict { requested: String },
    #[error("district mismatch: booking requires \"{requested}\", property is in \"{actual}\"")]
    DistrictMismatch { requested: String, actual: String },
    #[error("a minimum discount of {required}% is required and the claim offers none")]
    DiscountMissing { required: Decimal },
    #[error("offered discount {offered}% is below the required minimum of {required}%")]
    DiscountBelowMinimum { required: Decimal, offered: Decimal },
    #[error("property has no usable star level; this booking requires at least {required}")]
    StarMissing { required: u8 },
    #[error("property star level \"{label}\" is below the required minimum of {required}")]
    StarBelowMinimum { required: u8, label: String },
    #[error("the claims window deadline has passed")]
    DeadlinePassed,
}

impl Rejection {
    /// Deadline rejections are conflicts (409); every other rule failure is
    /// a validation error (400).
    pub fn is_deadline(&self) -> bool {
        matches!(self, Rejection::DeadlinePassed)
    }
}

/// Lowercase and collapse runs of whitespace to single spaces.
fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Lower-snake key for accommodation types: "Guest House" -> "guest_house".
fn type_key(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

/// Type equality with the two legacy equivalences the directory still
/// carries: a requested "hostel" is satisfied by hotels and guest houses,
/// and the one-word "guesthouse" spelling by "guest_house".
fn type_matches(requested: &str, offered: &str) -> bool {
    if requested == offered {
        return true;
    }
    match requested {
        "hostel" => matches!(offered, "hotel" | "guest_house"),
        "guesthouse" => offered == "guest_house",
        _ => false,
    }
}

/// District comparison ignores the literal word "district", so the directory
/// value "Arusha District" matches a requested "Arusha".
fn district_key(value: &str) -> String {
    value
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("district"))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map a star label to its numeric level. The directory uses the word
/// vocabulary; window settings use the numeric strings. Anything else is
/// unusable.
pub fn star_level(label: &str) -> Option<u8> {
    match normalize(label).as_str() {
        "basic" | "1" => Some(1),
        "simple" | "2" => Some(2),
        "moderate" | "3" => Some(3),
        "high" | "4" => Some(4),
        "luxury" | "5" => Some(5),
        _ => None,
    }
}

/// Evaluate every rule in order against live data; first failure wins.
///
/// `deadline` is the effective deadline from
/// [`compute_deadline`](crate::claims::window::compute_deadline). Checking it
/// here as the final rule keeps a submission honest even when the caller's
/// window state was stale.
pub fn evaluate(
    booking: &GroupBookingDBResponse,
    config: Option<&ClaimsWindowConfigDBResponse>,
    property: &PropertyDBResponse,
    offered_discount: Option<Decimal>,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    // Rule 1: group-stay capability
    if !property.capability_tags.iter().any(|tag| normalize(tag) == GROUP_STAY_TAG) {
        return Err(Rejection::MissingGroupStayTag);
    }

    // Rule 2: accommodation type
    let requested = type_key(&booking.accommodation_type);
    let offered = type_key(&property.property_type);
    if !type_matches(&requested, &offered) {
        return Err(Rejection::AccommodationTypeMismatch { requested, offered });
    }

    // Rule 3: destination. Incomplete directory data is a hard failure, not
    // a silent pass.
    match property.region.as_deref() {
        None => {
            return Err(Rejection::MissingRegion {
                requested: booking.region.clone(),
            });
        }
        Some(region) if normalize(region) != normalize(&booking.region) => {
            return Err(Rejection::RegionMismatch {
                requested: booking.region.clone(),
                actual: region.to_string(),
            });
        }
        Some(_) => {}
    }
    if let Some(district) = booking.district.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        match property.district.as_deref() {
            None => {
                return Err(Rejection::MissingDistrict {
                    requested: district.to_string(),
                });
            }
            Some(actual) if district_key(actual) != district_key(district) => {
                return Err(Rejection::DistrictMismatch {
                    requested: district.to_string(),
                    actual: actual.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    // Rule 4: commercial minimums from the window config and the customer
    if let Some(required) = config.and_then(|c| c.min_discount_percent) {
        match offered_discount {
            None => return Err(Rejection::DiscountMissing { required }),
            Some(offered) if offered < required => {
                return Err(Rejection::DiscountBelowMinimum { required, offered });
            }
            Some(_) => {}
        }
    }
    // The floor is the stricter of the customer's and the admin's label;
    // unusable requirement labels are treated as absent.
    let star_floor = [
        booking.min_hotel_star_label.as_deref(),
        config.and_then(|c| c.min_hotel_star_label.as_deref()),
    ]
    .into_iter()
    .flatten()
    .filter_map(star_level)
    .max();
    if let Some(required) = star_floor {
        match property.hotel_star_label.as_deref().map(|label| (label, star_level(label))) {
            None | Some((_, None)) => return Err(Rejection::StarMissing { required }),
            Some((label, Some(actual))) if actual < required => {
                return Err(Rejection::StarBelowMinimum {
                    required,
                    label: label.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    // Rule 5: deadline, in case the stored open flag is stale
    if let Some(deadline) = deadline
        && now > deadline
    {
        return Err(Rejection::DeadlinePassed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::bookings::BookingStatus;
    use crate::db::models::properties::PropertyStatus;
    use chrono::Duration;
    use uuid::Uuid;

    fn booking() -> GroupBookingDBResponse {
        GroupBookingDBResponse {
            id: Uuid::new_v4(),
            customer_name: "Halima Nnko".to_string(),
            customer_phone: None,
            status: BookingStatus::Pending,
            region: "Arusha".to_string(),
            district: None,
            location: None,
            accommodation_type: "hostel".to_string(),
            headcount: 18,
            rooms_needed: 7,
            check_in: None,
            check_out: None,
            currency: "TZS".to_string(),
            min_hotel_star_label: None,
            special_requests: None,
            is_open_for_claims: true,
            opened_for_claims_at: Some(Utc::now()),
            assigned_owner_id: None,
            owner_assigned_at: None,
            confirmed_property_id: None,
            recommended_property_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn property() -> PropertyDBResponse {
        PropertyDBResponse {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Meru Guest House".to_string(),
            property_type: "Guest House".to_string(),
            region: Some("Arusha".to_string()),
            district: None,
            hotel_star_label: None,
            capability_tags: vec!["Group Stay".to_string()],
            status: PropertyStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn config() -> ClaimsWindowConfigDBResponse {
        ClaimsWindowConfigDBResponse {
            group_booking_id: Uuid::new_v4(),
            version: 1,
            deadline: None,
            min_discount_percent: None,
            min_hotel_star_label: None,
            notes: None,
            created_by: Uuid::nil(),
            created_at: Utc::now(),
        }
    }

    fn check(
        booking: &GroupBookingDBResponse,
        config: Option<&ClaimsWindowConfigDBResponse>,
        property: &PropertyDBResponse,
        discount: Option<Decimal>,
    ) -> Result<(), Rejection> {
        evaluate(booking, config, property, discount, None, Utc::now())
    }

    #[test]
    fn test_hostel_booking_accepts_guest_house() {
        // Requested "hostel", offered "Guest House", same region, tagged
        assert_eq!(check(&booking(), None, &property(), None), Ok(()));
    }

    #[test]
    fn test_region_mismatch_names_both_regions() {
        let mut property = property();
        property.region = Some("Dodoma".to_string());

        let rejection = check(&booking(), None, &property, None).unwrap_err();
        assert_eq!(
            rejection,
            Rejection::RegionMismatch {
                requested: "Arusha".to_string(),
                actual: "Dodoma".to_string(),
            }
        );
        let message = rejection.to_string();
        assert!(message.contains("region mismatch"));
        assert!(message.contains("Arusha") && message.contains("Dodoma"));
    }

    #[test]
    fn test_discount_floor() {
        let mut config = config();
        config.min_discount_percent = Some(Decimal::new(15, 0));

        let too_low = check(&booking(), Some(&config), &property(), Some(Decimal::new(10, 0)));
        assert_eq!(
            too_low,
            Err(Rejection::DiscountBelowMinimum {
                required: Decimal::new(15, 0),
                offered: Decimal::new(10, 0),
            })
        );
        let message = too_low.unwrap_err().to_string();
        assert!(message.contains("10") && message.contains("15"));

        assert_eq!(
            check(&booking(), Some(&config), &property(), Some(Decimal::new(20, 0))),
            Ok(())
        );
        assert_eq!(
            check(&booking(), Some(&config), &property(), None),
            Err(Rejection::DiscountMissing {
                required: Decimal::new(15, 0)
            })
        );
    }

    #[test]
    fn test_group_stay_tag_is_mandatory() {
        let mut property = property();
        property.capability_tags = vec!["Conference".to_string(), "Honeymoon".to_string()];
        // Everything else matches perfectly; the tag still decides
        assert_eq!(check(&booking(), None, &property, None), Err(Rejection::MissingGroupStayTag));
    }

    #[test]
    fn test_group_stay_tag_is_normalized() {
        let mut property = property();
        property.capability_tags = vec!["  GROUP   stay ".to_string()];
        assert_eq!(check(&booking(), None, &property, None), Ok(()));
    }

    #[test]
    fn test_type_equivalences() {
        let mut request = booking();
        let mut offer = property();

        // guesthouse (one word) only matches guest_house
        request.accommodation_type = "guesthouse".to_string();
        offer.property_type = "Guest House".to_string();
        assert_eq!(check(&request, None, &offer, None), Ok(()));
        offer.property_type = "Hotel".to_string();
        assert!(matches!(
            check(&request, None, &offer, None),
            Err(Rejection::AccommodationTypeMismatch { .. })
        ));

        // hostel matches hotel as well
        request.accommodation_type = "Hostel".to_string();
        assert_eq!(check(&request, None, &offer, None), Ok(()));

        // exact keys always match, case- and whitespace-insensitively
        request.accommodation_type = "guest  house".to_string();
        offer.property_type = "Guest House".to_string();
        assert_eq!(check(&request, None, &offer, None), Ok(()));

        // no reverse equivalence: hotel is not satisfied by guest_house
        request.accommodation_type = "Hotel".to_string();
        assert!(matches!(
            check(&request, None, &offer, None),
            Err(Rejection::AccommodationTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_property_without_region_is_rejected() {
        let mut property = property();
        property.region = None;
        assert_eq!(
            check(&booking(), None, &property, None),
            Err(Rejection::MissingRegion {
                requested: "Arusha".to_string()
            })
        );
    }

    #[test]
    fn test_district_comparison_strips_the_word_district() {
        let mut request = booking();
        request.district = Some("Kinondoni".to_string());

        let mut offer = property();
        offer.district = Some("Kinondoni District".to_string());
        assert_eq!(check(&request, None, &offer, None), Ok(()));

        offer.district = Some("Ilala".to_string());
        assert_eq!(
            check(&request, None, &offer, None),
            Err(Rejection::DistrictMismatch {
                requested: "Kinondoni".to_string(),
                actual: "Ilala".to_string(),
            })
        );

        offer.district = None;
        assert_eq!(
            check(&request, None, &offer, None),
            Err(Rejection::MissingDistrict {
                requested: "Kinondoni".to_string()
            })
        );
    }

    #[test]
    fn test_district_rule_only_applies_when_requested() {
        let mut offer = property();
        offer.district = None;
        // Booking has no district, so the property needs none
        assert_eq!(check(&booking(), None, &offer, None), Ok(()));
    }

    #[test]
    fn test_star_floor_is_the_stricter_of_customer_and_admin() {
        let mut request = booking();
        request.min_hotel_star_label = Some("moderate".to_string()); // 3
        let mut config = config();
        config.min_hotel_star_label = Some("4".to_string());

        let mut offer = property();
        offer.hotel_star_label = Some("high".to_string()); // 4
        assert_eq!(check(&request, Some(&config), &offer, None), Ok(()));

        offer.hotel_star_label = Some("3".to_string());
        assert_eq!(
            check(&request, Some(&config), &offer, None),
            Err(Rejection::StarBelowMinimum {
                required: 4,
                label: "3".to_string(),
            })
        );

        offer.hotel_star_label = None;
        assert_eq!(
            check(&request, Some(&config), &offer, None),
            Err(Rejection::StarMissing { required: 4 })
        );

        // An unusable property label is as bad as a missing one
        offer.hotel_star_label = Some("fancy".to_string());
        assert_eq!(
            check(&request, Some(&config), &offer, None),
            Err(Rejection::StarMissing { required: 4 })
        );
    }

    #[test]
    fn test_unusable_requirement_labels_are_ignored() {
        let mut request = booking();
        request.min_hotel_star_label = Some("whatever the best is".to_string());
        let mut offer = property();
        offer.hotel_star_label = None;
        // No usable floor means no star rule at all
        assert_eq!(check(&request, None, &offer, None), Ok(()));
    }

    #[test]
    fn test_deadline_is_the_last_line_of_defense() {
        let now = Utc::now();
        let passed = evaluate(
            &booking(),
            None,
            &property(),
            None,
            Some(now - Duration::minutes(5)),
            now,
        )
        .unwrap_err();
        assert_eq!(passed, Rejection::DeadlinePassed);
        assert!(passed.is_deadline());

        assert_eq!(
            evaluate(&booking(), None, &property(), None, Some(now + Duration::minutes(5)), now),
            Ok(())
        );
        assert_eq!(evaluate(&booking(), None, &property(), None, None, now), Ok(()));
        assert!(!Rejection::MissingGroupStayTag.is_deadline());
    }

    #[test]
    fn test_star_level_vocabulary() {
        assert_eq!(star_level("basic"), Some(1));
        assert_eq!(star_level("Simple"), Some(2));
        assert_eq!(star_level(" moderate "), Some(3));
        assert_eq!(star_level("HIGH"), Some(4));
        assert_eq!(star_level("luxury"), Some(5));
        assert_eq!(star_level("2"), Some(2));
        assert_eq!(star_level("5"), Some(5));
        assert_eq!(star_level("0"), None);
        assert_eq!(star_level("6"), None);
        assert_eq!(star_level("five-ish"), None);
    }
}
