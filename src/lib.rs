//! # milkbook: delivery tracking and billing for small milk rounds
//!
//! `milkbook` is a multi-tenant backend for household and small-business
//! milk delivery operators. It records one delivery status per customer per
//! calendar day, resolves the rate each delivery is billed at, and turns a
//! date range into an invoice-ready statement. Data can round-trip through
//! JSON and CSV snapshots.
//!
//! ## Overview
//!
//! Each tenant is an *account* owning its *customers* and *delivery
//! records*. A delivery record captures what happened on one date for one
//! customer identity — a specific customer, or "no customer" for the
//! operator's own round — with a status of `delivered`, `absent`, `mixed`,
//! or `no_entry`. At most one record exists per (account, date, customer
//! identity); writes go through a create-or-overwrite protocol backed by a
//! unique index, so concurrent writers cannot duplicate a day.
//!
//! Billing resolves each delivered record's rate by strict precedence —
//! record-level override, then the customer's default, then zero — and sums
//! quantities and amounts into a period statement (see [`billing`]). The
//! engine is a pure function over resolved rows, kept separate from the SQL
//! that fetches them.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence.
//!
//! - The **API layer** ([`api`]) exposes RESTful endpoints for auth,
//!   customers, deliveries, monthly summaries, bills, and export/import.
//!   Every response uses the `{success, data?, message?, error?}` envelope.
//! - The **authentication layer** ([`auth`]) hashes credentials with
//!   Argon2id and issues stateless JWT bearer tokens. Handlers receive the
//!   tenant through an extractor; every query is scoped by the account id.
//! - The **database layer** ([`db`]) uses the repository pattern over SQLx.
//!   Constraint violations are classified into a [`db::errors::DbError`]
//!   taxonomy and surface as 409/400 responses rather than crashes.
//!
//! Handlers are stateless and share nothing across requests beyond the
//! connection pool; the database's unique constraints are the final arbiter
//! for racing writes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use milkbook::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = milkbook::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     milkbook::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup; [`migrator`] exposes the SQLx migrator directly.

pub mod api;
pub mod auth;
pub mod billing;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::openapi::ApiDoc;
use axum::{
    Router, http,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AccountId, CustomerId, DeliveryId};

/// Application state shared across all request handlers.
///
/// Cloned per request; holds only the connection pool and the immutable
/// configuration, so there is no cross-request mutable state.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the milkbook database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .expose_headers(vec![http::header::CONTENT_DISPOSITION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        // Authentication
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        // Account profile
        .route(
            "/account",
            get(api::handlers::accounts::get_account).put(api::handlers::accounts::update_account),
        )
        // Customer management
        .route(
            "/customers",
            get(api::handlers::customers::list_customers).post(api::handlers::customers::create_customer),
        )
        .route(
            "/customers/{id}",
            put(api::handlers::customers::update_customer).delete(api::handlers::customers::delete_customer),
        )
        // Delivery records (the upsert protocol lives behind POST)
        .route(
            "/deliveries",
            get(api::handlers::deliveries::list_deliveries).post(api::handlers::deliveries::upsert_delivery),
        )
        .route("/deliveries/{id}", delete(api::handlers::deliveries::delete_delivery))
        // Monthly summaries and analytics
        .route("/summary/analytics/report", get(api::handlers::summary::get_analytics_report))
        .route("/summary/{period}", get(api::handlers::summary::get_monthly_summary))
        .route("/summary/{period}/rate", put(api::handlers::summary::update_monthly_rate))
        // Period statement builder
        .route("/bill", get(api::handlers::bills::generate_bill))
        // Snapshot export / import
        .route("/export/json", get(api::handlers::export::export_json))
        .route("/export/csv", get(api::handlers::export::export_csv))
        .route("/export/import", post(api::handlers::export::import_json))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations,
///    and builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPool::connect(&config.database.url).await?;
        migrator().run(&pool).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("milkbook listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
