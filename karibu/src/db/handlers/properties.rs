//! Repository for the property directory.
//!
//! The directory is reference data: the engine reads it for ownership and
//! eligibility checks. Writes exist for fixtures and ops tooling only; there
//! is no HTTP surface over this repository.

use std::collections::HashMap;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::properties::{
        PropertyCreateDBRequest, PropertyDBResponse, PropertyStatus, PropertyUpdateDBRequest,
    },
};
use crate::types::{OwnerId, PropertyId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing properties
#[derive(Debug, Clone)]
pub struct PropertyFilter {
    pub owner_id: Option<OwnerId>,
    pub status: Option<PropertyStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl PropertyFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            owner_id: None,
            status: None,
            skip,
            limit,
        }
    }
}

pub struct Properties<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Properties<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl Repository for Properties<'_> {
    type CreateRequest = PropertyCreateDBRequest;
    type UpdateRequest = PropertyUpdateDBRequest;
    type Response = PropertyDBResponse;
    type Id = PropertyId;
    type Filter = PropertyFilter;

    #[instrument(skip(self, request), fields(owner_id = %abbrev_uuid(&request.owner_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let property = sqlx::query_as::<_, PropertyDBResponse>(
            r#"
            INSERT INTO properties
                (owner_id, name, property_type, region, district, hotel_star_label, capability_tags, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_id, name, property_type, region, district, hotel_star_label,
                      capability_tags, status, created_at, updated_at
            "#,
        )
        .bind(request.owner_id)
        .bind(&request.name)
        .bind(&request.property_type)
        .bind(&request.region)
        .bind(&request.district)
        .bind(&request.hotel_star_label)
        .bind(&request.capability_tags)
        .bind(&request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(property)
    }

    #[instrument(skip(self), fields(property_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let property = sqlx::query_as::<_, PropertyDBResponse>(
            r#"
            SELECT id, owner_id, name, property_type, region, district, hotel_star_label,
                   capability_tags, status, created_at, updated_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(property)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let properties = sqlx::query_as::<_, PropertyDBResponse>(
            r#"
            SELECT id, owner_id, name, property_type, region, district, hotel_star_label,
                   capability_tags, status, created_at, updated_at
            FROM properties
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(properties.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let properties = sqlx::query_as::<_, PropertyDBResponse>(
            r#"
            SELECT id, owner_id, name, property_type, region, district, hotel_star_label,
                   capability_tags, status, created_at, updated_at
            FROM properties
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::property_status IS NULL OR status = $2)
            ORDER BY created_at ASC, id ASC
            OFFSET $3
            LIMIT $4
            "#,
        )
        .bind(filter.owner_id)
        .bind(&filter.status)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(properties)
    }

    #[instrument(skip(self), fields(property_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(property_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let property = sqlx::query_as::<_, PropertyDBResponse>(
            r#"
            UPDATE properties
            SET name = COALESCE($2, name),
                property_type = COALESCE($3, property_type),
                region = COALESCE($4, region),
                district = COALESCE($5, district),
                hotel_star_label = COALESCE($6, hotel_star_label),
                capability_tags = COALESCE($7, capability_tags),
                status = COALESCE($8, status),
                updated_at = now()
            WHERE id = $1
            RETURNING id, owner_id, name, property_type, region, district, hotel_star_label,
                      capability_tags, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.property_type)
        .bind(&request.region)
        .bind(&request.district)
        .bind(&request.hotel_star_label)
        .bind(&request.capability_tags)
        .bind(&request.status)
        .fetch_optional(&mut *self.db)
        .await?;

        property.ok_or(DbError::NotFound)
    }
}
