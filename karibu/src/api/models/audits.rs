//! API models for the booking audit trail (read-only).

use crate::db::models::audits::AuditDBResponse;
use crate::types::{BookingId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One append-only audit entry on a group booking. `actor_id` is the nil
/// UUID for system-initiated transitions such as deadline auto-closes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditResponse {
    pub id: i64,
    #[schema(value_type = String, format = "uuid")]
    pub group_booking_id: BookingId,
    #[schema(value_type = String, format = "uuid")]
    pub actor_id: UserId,
    pub action: String,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<AuditDBResponse> for AuditResponse {
    fn from(db: AuditDBResponse) -> Self {
        Self {
            id: db.id,
            group_booking_id: db.group_booking_id,
            actor_id: db.actor_id,
            action: db.action,
            description: db.description,
            metadata: db.metadata,
            created_at: db.created_at,
        }
    }
}
