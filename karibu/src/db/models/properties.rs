//! Database models for the property directory.
//!
//! Property rows are reference data owned by the marketplace directory;
//! the claims engine reads them for ownership and eligibility checks and
//! never mutates them outside fixtures.

use crate::types::{OwnerId, PropertyId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of a directory property. Only `Approved` properties can
/// back a claim.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyStatus {
    Pending,
    Approved,
    Suspended,
}

/// Database request for creating a property (fixtures and ops tooling)
#[derive(Debug, Clone)]
pub struct PropertyCreateDBRequest {
    pub owner_id: OwnerId,
    pub name: String,
    pub property_type: String,
    pub region: Option<String>,
    pub district: Option<String>,
    /// Directory star label, e.g. "moderate" or "4".
    pub hotel_star_label: Option<String>,
    pub capability_tags: Vec<String>,
    pub status: PropertyStatus,
}

/// Database request for updating a property
#[derive(Debug, Clone, Default)]
pub struct PropertyUpdateDBRequest {
    pub name: Option<String>,
    pub property_type: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub hotel_star_label: Option<String>,
    pub capability_tags: Option<Vec<String>>,
    pub status: Option<PropertyStatus>,
}

/// Database response for a property
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyDBResponse {
    pub id: PropertyId,
    pub owner_id: OwnerId,
    pub name: String,
    pub property_type: String,
    pub region: Option<String>,
    pub district: Option<String>,
    pub hotel_star_label: Option<String>,
    pub capability_tags: Vec<String>,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
