//! Shared fixtures for endpoint tests.

use crate::{AppState, Config, build_router};
use axum::http::StatusCode;
use axum_test::TestServer;
use sqlx::PgPool;

/// Config with a throwaway JWT secret; everything else is defaults.
pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        ..Default::default()
    }
}

/// Spin up a test server over a migrated pool (as provided by `#[sqlx::test]`).
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let state = AppState::builder().db(pool).config(create_test_config()).build();
    let router = build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Register a fresh account and return its bearer token.
pub async fn register_account(server: &TestServer, handle: &str) -> String {
    let response = server
        .post("/auth/register")
        .json(&serde_json::json!({
            "handle": handle,
            "display_name": format!("Account {handle}"),
            "address": "1 Dairy Lane",
            "password": "round-starts-at-5am",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["data"]["token"].as_str().expect("token in register response").to_string()
}

/// Record a customer-less delivery; the period tag is derived from the date.
pub async fn record_delivery(server: &TestServer, token: &str, date: &str, quantity: &str, status: &str) {
    let response = server
        .post("/deliveries")
        .authorization_bearer(token)
        .json(&serde_json::json!({
            "delivery_date": date,
            "quantity": quantity,
            "status": status,
            "month_year": &date[..7],
        }))
        .await;
    assert!(
        response.status_code() == StatusCode::CREATED || response.status_code() == StatusCode::OK,
        "recording delivery failed: {}",
        response.text()
    );
}
