//! # karibu: Group-Stay Claims Engine
//!
//! `karibu` is the marketplace engine that matches large group-stay bookings with property
//! owners through competitive claims. It provides a RESTful back-office API for managing
//! bookings and claims windows, and an owner-facing API for discovering open bookings and
//! submitting claims.
//!
//! ## Overview
//!
//! Group bookings arrive through phone intake: a customer needs rooms for a wedding party,
//! a conference delegation or a safari group, and an operator records the headcount, the
//! region and the room count. Rather than calling hotels one by one, the back office opens
//! a **claims window** on the booking. Every property owner on the platform can then see
//! the booking and claim it with a priced offer from one of their approved properties. When
//! the window produces a good offer, an admin accepts it: the booking is confirmed against
//! that property, every rival claim is rejected, and the window closes.
//!
//! The engine also supports the traditional path. A booking can be handed to a chosen owner
//! directly, with recommended properties and a message, without ever being advertised. Both
//! paths feed one append-only audit trail per booking, which is the operational history the
//! back office works from.
//!
//! ### What It Does
//!
//! At its core, `karibu` enforces the claims-window state machine: windows open with
//! versioned settings (deadline, minimum discount, star floor), claims are validated against
//! the active settings at submission time, expiry is enforced by deadline, and exactly one
//! claim can win. Uniqueness and state-exclusion rules are backed by database constraints,
//! so concurrent admins and owners cannot race the engine into an inconsistent state.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer
//! and uses PostgreSQL for all persistence needs. It sits behind a trusted authenticating
//! proxy which injects the caller's email into a request header; the engine resolves that
//! email to a user and applies role-based authorization (`ADMIN` for the back office,
//! `OWNER` for property owners).
//!
//! ### Request Flow
//!
//! Requests to the **admin surface** (`/admin/api/v1/*`) cover the booking registry, claims
//! window transitions, direct assignment and claim acceptance. Requests to the **owner
//! surface** (`/owner/api/v1/*`) cover open-booking discovery, claim submission and
//! withdrawal, and assignment acknowledgement. Handlers interact with the database through
//! repository interfaces; multi-step transitions (accepting a claim, re-advertising an
//! assigned booking) run in a single transaction so partial outcomes never become visible.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes the two surfaces with RESTful conventions and OpenAPI
//! documentation. The **authentication layer** ([`auth`]) resolves the proxy identity header
//! and enforces roles via extractors. The **database layer** ([`db`]) uses the repository
//! pattern to abstract data access; each entity (bookings, claims, window configs, audits,
//! users, properties) has a corresponding repository. The **claims coordinators** ([`claims`])
//! hold the submission pipeline, the eligibility rules and the window expiry logic.
//!
//! **Background services** run alongside the HTTP server: a periodic sweeper closes claims
//! windows whose deadline has passed and records the auto-close on the audit trail. Expiry
//! is additionally enforced lazily on read paths, so a disabled sweeper only delays audit
//! rows for windows nobody is reading.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use karibu::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = karibu::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     karibu::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and runs migrations on startup by default:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! // Run migrations
//! karibu::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod claims;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::openapi::{AdminApiDoc, OwnerApiDoc};
use axum::http::HeaderValue;
use axum::{
    Json, Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{BookingId, ClaimId, OwnerId, PropertyId, UserId};

/// Application state shared across all request handlers.
///
/// This struct contains the shared resources needed by the API handlers:
/// the database connection pool and the application configuration.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the karibu database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors.allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::new().allow_origin(AllowOrigin::any()));
    }

    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new().allow_origin(origins))
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Admin API routes (booking registry, claims windows, claim acceptance)
/// - Owner API routes (open-booking discovery, claim submission)
/// - OpenAPI documentation (Scalar UI plus raw JSON specs)
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Admin surface: booking registry and claims-window lifecycle
    let admin_routes = Router::new()
        .route("/bookings", post(api::handlers::bookings::create_booking))
        .route("/bookings", get(api::handlers::bookings::list_bookings))
        .route("/bookings/{booking_id}", get(api::handlers::bookings::get_booking))
        .route(
            "/bookings/{booking_id}/audits",
            get(api::handlers::bookings::list_booking_audits),
        )
        .route(
            "/bookings/{booking_id}/claims",
            get(api::handlers::bookings::list_booking_claims),
        )
        .route(
            "/bookings/{booking_id}/assignment",
            post(api::handlers::bookings::assign_owner),
        )
        .route(
            "/bookings/{booking_id}/claims/{claim_id}/accept",
            post(api::handlers::bookings::accept_claim),
        )
        // Claims window transitions
        .route(
            "/bookings/{booking_id}/claims-window",
            post(api::handlers::claims_windows::open_claims_window),
        )
        .route(
            "/bookings/{booking_id}/claims-window",
            get(api::handlers::claims_windows::get_claims_window_status),
        )
        .route(
            "/bookings/{booking_id}/claims-window/close",
            post(api::handlers::claims_windows::close_claims_window),
        )
        .route(
            "/claims-windows/sweep",
            post(api::handlers::claims_windows::sweep_claims_windows),
        )
        .with_state(state.clone());

    // Owner surface: discovery, claims, assignment acknowledgement
    let owner_routes = Router::new()
        .route("/bookings", get(api::handlers::claims::list_open_bookings))
        .route("/claims", post(api::handlers::claims::submit_claim))
        .route("/claims", get(api::handlers::claims::list_my_claims))
        .route(
            "/claims/{claim_id}/withdraw",
            post(api::handlers::claims::withdraw_claim),
        )
        .route(
            "/bookings/{booking_id}/assignment/accept",
            post(api::handlers::claims::accept_assignment),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route(
            "/admin/openapi.json",
            get(|| async { Json(AdminApiDoc::openapi()) }),
        )
        .route(
            "/owner/openapi.json",
            get(|| async { Json(OwnerApiDoc::openapi()) }),
        )
        .nest("/admin/api/v1", admin_routes)
        .nest("/owner/api/v1", owner_routes)
        .merge(Scalar::with_url("/admin/docs", AdminApiDoc::openapi()))
        .merge(Scalar::with_url("/owner/docs", OwnerApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Container for background services and their lifecycle management.
///
/// The only background task is the claims window sweeper, which closes windows
/// whose deadline has passed and records the auto-close on the audit trail.
///
/// # Graceful Shutdown
///
/// The struct provides a [`shutdown`](BackgroundServices::shutdown) method to gracefully
/// stop all background tasks. When dropped, the `drop_guard` will automatically cancel
/// the shutdown token, signaling all tasks to stop.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: tokio_util::sync::CancellationToken,
    // Pub so that we can disarm it if we want to
    pub drop_guard: Option<tokio_util::sync::DropGuard>,
}

impl BackgroundServices {
    /// Gracefully shutdown all background tasks
    pub async fn shutdown(self) {
        // Signal all background tasks to shutdown
        self.shutdown_token.cancel();

        // Wait for all background tasks to complete
        for handle in self.background_tasks {
            let _ = handle.await;
        }
    }
}

/// Setup background services (claims window sweeper)
fn setup_background_services(
    pool: PgPool,
    config: &Config,
    shutdown_token: tokio_util::sync::CancellationToken,
) -> BackgroundServices {
    let drop_guard = shutdown_token.clone().drop_guard();
    // Track all background task handles for graceful shutdown
    let mut background_tasks = Vec::new();

    if config.claims.sweeper.enabled {
        let handle = tokio::spawn(claims::window::run_window_sweeper(
            pool,
            config.claims.clone(),
            shutdown_token.clone(),
        ));
        background_tasks.push(handle);
    } else {
        info!("Claims window sweeper disabled; expiry is enforced lazily on read paths");
    }

    BackgroundServices {
        background_tasks,
        shutdown_token,
        drop_guard: Some(drop_guard),
    }
}

/// Main application struct that owns all resources and lifecycle.
///
/// This is the top-level container for the entire application, managing:
/// - HTTP server and routing
/// - Database connection pool
/// - Application configuration
/// - Background services (claims window sweeper)
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations and
///    starts background services
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, gracefully stops all services
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting claims engine with configuration: {:#?}", config);

        let pool = PgPoolOptions::new()
            .max_connections(config.database.pool.max_connections)
            .min_connections(config.database.pool.min_connections)
            .acquire_timeout(config.database.pool.acquire_timeout)
            .connect(&config.database.url)
            .await?;

        Self::with_pool(config, pool).await
    }

    /// Create an application on an existing pool (tests inject theirs here)
    pub async fn with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        if config.database.run_migrations {
            migrator().run(&pool).await?;
        }

        // Create a shutdown token for coordinating graceful shutdown of background tasks
        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let bg_services = setup_background_services(pool.clone(), &config, shutdown_token);

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> (axum_test::TestServer, BackgroundServices) {
        let server = axum_test::TestServer::new(self.router).expect("Failed to create test server");
        (server, self.bg_services)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Claims engine listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        // Shutdown background services and wait for tasks to complete
        self.bg_services.shutdown().await;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::create_test_app;
    use sqlx::PgPool;

    #[tokio::test]
    async fn test_openapi_json_endpoints() {
        // Create a test router with both OpenAPI endpoints
        let router = axum::Router::new()
            .route("/admin/openapi.json", get(|| async { Json(AdminApiDoc::openapi()) }))
            .route("/owner/openapi.json", get(|| async { Json(OwnerApiDoc::openapi()) }))
            .merge(Scalar::with_url("/admin/docs", AdminApiDoc::openapi()))
            .merge(Scalar::with_url("/owner/docs", OwnerApiDoc::openapi()));

        let server = axum_test::TestServer::new(router).expect("Failed to create test server");

        // Admin API spec
        let admin_response = server.get("/admin/openapi.json").await;
        assert_eq!(admin_response.status_code().as_u16(), 200);
        let admin_content = admin_response.text();
        assert!(admin_content.contains("\"openapi\""));
        assert!(admin_content.contains("Karibu Admin API"));
        assert!(admin_content.contains("/bookings/{booking_id}/claims-window"));

        // Owner API spec
        let owner_response = server.get("/owner/openapi.json").await;
        assert_eq!(owner_response.status_code().as_u16(), 200);
        let owner_content = owner_response.text();
        assert!(owner_content.contains("Karibu Owner API"));
        assert!(owner_content.contains("/claims/{claim_id}/withdraw"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_healthz(pool: PgPool) {
        let (app, _bg_services) = create_test_app(pool).await;

        let response = app.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[test]
    fn test_create_cors_layer_accepts_wildcard_and_urls() {
        // Default config allows any origin
        assert!(create_cors_layer(&Config::default()).is_ok());

        let mut config = Config::default();
        config.cors.allowed_origins = vec!["https://ops.karibu.example".to_string()];
        assert!(create_cors_layer(&config).is_ok());
    }

    #[test]
    fn test_create_cors_layer_rejects_bad_origin() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec!["https://ops.karibu.example\nevil".to_string()];
        assert!(create_cors_layer(&config).is_err());
    }
}
