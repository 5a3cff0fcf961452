//! Test utilities for integration testing (available with `test-utils` feature).

use crate::api::models::bookings::BookingStatus;
use crate::api::models::users::Role;
use crate::config::{AuthConfig, ClaimsConfig, Config, DatabaseConfig, PoolSettings, SweeperConfig};
use crate::db::{
    handlers::{GroupBookings, Properties, Repository, Users},
    models::{
        bookings::{GroupBookingCreateDBRequest, GroupBookingDBResponse},
        properties::{PropertyCreateDBRequest, PropertyDBResponse, PropertyStatus},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use crate::types::{BookingId, OwnerId};
use axum_test::TestServer;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_test_app(pool: PgPool) -> (TestServer, crate::BackgroundServices) {
    let config = create_test_config();

    let app = crate::Application::with_pool(config, pool)
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        database: DatabaseConfig {
            // #[sqlx::test] provisions the database and runs migrations itself
            run_migrations: false,
            pool: PoolSettings {
                max_connections: 1,
                min_connections: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        auth: AuthConfig::default(),
        claims: ClaimsConfig {
            sweeper: SweeperConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        },
        cors: crate::config::CorsConfig::default(),
    }
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let email = format!("testuser_{}@example.com", Uuid::new_v4().simple());

    let user_create = UserCreateDBRequest {
        email,
        display_name: Some("Test User".to_string()),
        role,
    };

    users_repo.create(&user_create).await.expect("Failed to create test user")
}

pub async fn create_test_property(pool: &PgPool, owner_id: OwnerId) -> PropertyDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut properties_repo = Properties::new(&mut conn);

    let property_create = PropertyCreateDBRequest {
        owner_id,
        name: format!("Test Lodge {}", Uuid::new_v4().simple()),
        property_type: "Guest House".to_string(),
        region: Some("Arusha".to_string()),
        district: None,
        hotel_star_label: Some("moderate".to_string()),
        capability_tags: vec!["Group Stay".to_string()],
        status: PropertyStatus::Approved,
    };

    properties_repo
        .create(&property_create)
        .await
        .expect("Failed to create test property")
}

pub async fn create_test_booking(pool: &PgPool) -> GroupBookingDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut bookings_repo = GroupBookings::new(&mut conn);

    let booking_create = GroupBookingCreateDBRequest {
        customer_name: "Test Customer".to_string(),
        customer_phone: Some("+255700000001".to_string()),
        status: BookingStatus::Pending,
        region: "Arusha".to_string(),
        district: None,
        location: None,
        accommodation_type: "Guest House".to_string(),
        headcount: 18,
        rooms_needed: 3,
        check_in: None,
        check_out: None,
        currency: "TZS".to_string(),
        min_hotel_star_label: None,
        special_requests: None,
    };

    bookings_repo
        .create(&booking_create)
        .await
        .expect("Failed to create test booking")
}

/// Open a claims window on the booking with no explicit settings row, so the
/// configured default window length applies.
pub async fn open_window_for(pool: &PgPool, booking_id: BookingId) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    GroupBookings::new(&mut conn)
        .mark_open(booking_id, Utc::now())
        .await
        .expect("Failed to open claims window");
}

pub fn add_auth_headers(user: &UserDBResponse) -> (String, String) {
    let config = AuthConfig::default();
    (config.user_header_name, user.email.clone())
}
