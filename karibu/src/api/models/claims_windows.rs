//! API models for claims-window transitions.
//!
//! The open/close payloads carry the admin-facing knobs of the competitive
//! claims window. Close reasons are a small structured vocabulary (with a
//! legacy free-text fallback) so the audit trail stays queryable.

use crate::db::models::window_configs::ClaimsWindowConfigDBResponse;
use crate::types::{BookingId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Structured vocabulary for closing a claims window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseReasonCode {
    /// An owner's claim was accepted and the booking confirmed.
    OwnerConfirmed,
    /// The window deadline passed (the sweeper's reason).
    DeadlineReached,
    /// The window produced no acceptable claims.
    NoValidOffers,
    /// Closed by operator decision; requires `reason_details`.
    PolicyDecision,
}

impl CloseReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReasonCode::OwnerConfirmed => "OWNER_CONFIRMED",
            CloseReasonCode::DeadlineReached => "DEADLINE_REACHED",
            CloseReasonCode::NoValidOffers => "NO_VALID_OFFERS",
            CloseReasonCode::PolicyDecision => "POLICY_DECISION",
        }
    }

    /// `POLICY_DECISION` is meaningless without operator-supplied details.
    pub fn requires_details(&self) -> bool {
        matches!(self, CloseReasonCode::PolicyDecision)
    }
}

impl std::fmt::Display for CloseReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open a claims window, or update its settings when already open.
///
/// Calling this on an already-open window leaves the flag and the open
/// timestamp untouched and pushes a new config version instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OpenClaimsWindowRequest {
    /// Explicit deadline; overrides the default window length.
    pub deadline: Option<DateTime<Utc>>,
    /// Minimum discount (percent, 0..=100) a claim must offer.
    #[schema(value_type = Option<String>)]
    pub min_discount_percent: Option<Decimal>,
    /// Admin star floor for this window, an integer 1..=5.
    pub min_hotel_star: Option<i32>,
    pub notes: Option<String>,
    /// Required to re-open a booking that was handed to an owner directly;
    /// clears the assignment as part of the open.
    #[serde(default)]
    pub re_advertise: bool,
}

/// Close an open claims window. Either a structured `reason_code` or a
/// legacy non-empty free-text `reason` must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CloseClaimsWindowRequest {
    pub reason_code: Option<CloseReasonCode>,
    pub reason_details: Option<String>,
    /// Legacy free-text close reason, kept for older operator tooling.
    pub reason: Option<String>,
}

/// A validated close reason, ready for the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseReason {
    Coded {
        code: CloseReasonCode,
        details: Option<String>,
    },
    Legacy(String),
}

impl CloseReason {
    /// Metadata keys carried on the `CLOSED_FOR_CLAIMS` audit row.
    pub fn audit_metadata(&self) -> serde_json::Value {
        match self {
            CloseReason::Coded { code, details } => json!({
                "close_reason_code": code.as_str(),
                "close_reason_details": details,
            }),
            CloseReason::Legacy(reason) => json!({ "reason": reason }),
        }
    }
}

/// Why a close payload failed validation. The `Display` strings surface
/// verbatim in 400 responses.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidCloseReason {
    #[error("closing a claims window requires a reason_code or a non-empty reason")]
    Missing,
    #[error("reason_code POLICY_DECISION requires reason_details")]
    DetailsRequired,
}

impl CloseClaimsWindowRequest {
    /// Validate the payload into a [`CloseReason`].
    ///
    /// A structured `reason_code` wins over the legacy text when both are
    /// present. Whitespace-only details and reasons count as absent.
    pub fn reason(&self) -> Result<CloseReason, InvalidCloseReason> {
        let details = self
            .reason_details
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        if let Some(code) = self.reason_code {
            if code.requires_details() && details.is_none() {
                return Err(InvalidCloseReason::DetailsRequired);
            }
            return Ok(CloseReason::Coded { code, details });
        }

        match self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => Ok(CloseReason::Legacy(reason.to_string())),
            None => Err(InvalidCloseReason::Missing),
        }
    }
}

/// Live claims-window state for a booking, with the active config version.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimsWindowStatusResponse {
    #[schema(value_type = String, format = "uuid")]
    pub group_booking_id: BookingId,
    pub is_open_for_claims: bool,
    pub opened_for_claims_at: Option<DateTime<Utc>>,
    /// The deadline submissions are checked against: the active config's
    /// explicit deadline, else open timestamp plus the default window.
    pub effective_deadline: Option<DateTime<Utc>>,
    /// The active (highest-version) window configuration, if any exists.
    pub config: Option<ClaimsWindowConfigResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimsWindowConfigResponse {
    pub version: i32,
    pub deadline: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub min_discount_percent: Option<Decimal>,
    pub min_hotel_star_label: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<ClaimsWindowConfigDBResponse> for ClaimsWindowConfigResponse {
    fn from(db: ClaimsWindowConfigDBResponse) -> Self {
        Self {
            version: db.version,
            deadline: db.deadline,
            min_discount_percent: db.min_discount_percent,
            min_hotel_star_label: db.min_hotel_star_label,
            notes: db.notes,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}

/// Result of an expired-window sweep.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SweepResponse {
    /// Number of windows auto-closed by this sweep.
    pub closed_count: u64,
}
