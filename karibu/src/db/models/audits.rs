//! Database models for the append-only booking audit trail.

use crate::types::{BookingId, UserId};
use chrono::{DateTime, Utc};

/// The actions the engine writes today. Stored as TEXT so the trail can
/// carry actions this build does not know about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuditAction {
    OpenedForClaims,
    UpdatedClaimsSettings,
    ClosedForClaims,
    OwnerMessageSent,
    OwnerAcceptedAssignment,
    ClaimSubmitted,
    ClaimWithdrawn,
    ClaimAccepted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::OpenedForClaims => "OPENED_FOR_CLAIMS",
            AuditAction::UpdatedClaimsSettings => "UPDATED_CLAIMS_SETTINGS",
            AuditAction::ClosedForClaims => "CLOSED_FOR_CLAIMS",
            AuditAction::OwnerMessageSent => "OWNER_MESSAGE_SENT",
            AuditAction::OwnerAcceptedAssignment => "OWNER_ACCEPTED_ASSIGNMENT",
            AuditAction::ClaimSubmitted => "CLAIM_SUBMITTED",
            AuditAction::ClaimWithdrawn => "CLAIM_WITHDRAWN",
            AuditAction::ClaimAccepted => "CLAIM_ACCEPTED",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database request for appending an audit entry
#[derive(Debug, Clone)]
pub struct AuditCreateDBRequest {
    pub group_booking_id: BookingId,
    /// Nil UUID for system-initiated transitions.
    pub actor_id: UserId,
    pub action: AuditAction,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
}

/// Database response for an audit entry
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditDBResponse {
    pub id: i64,
    pub group_booking_id: BookingId,
    pub actor_id: UserId,
    pub action: String,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
