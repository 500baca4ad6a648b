use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        accounts::CurrentAccount,
        bills::{ALL_CUSTOMERS_LABEL, BillAccount, BillData, BillQuery, BillResponse},
    },
    billing,
    db::handlers::{Accounts, Customers, Deliveries, Repository},
    errors::Error,
    types::CustomerId,
};

/// Build an invoice-ready statement for a date range.
///
/// `customer_id=all` (or no filter) spans every record including
/// customer-less ones; a specific customer narrows to their records. An
/// unknown customer id yields an empty statement under the "All Customers"
/// label rather than an error.
#[utoipa::path(
    get,
    path = "/bill",
    tag = "bill",
    params(BillQuery),
    responses(
        (status = 200, description = "Statement for the period", body = BillResponse),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn generate_bill(
    State(state): State<AppState>,
    account: CurrentAccount,
    Query(query): Query<BillQuery>,
) -> Result<Json<ApiResponse<BillResponse>>, Error> {
    let (period_start, period_end) = match (query.period_start, query.period_end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(Error::BadRequest {
                message: "Period start and end dates are required".to_string(),
            });
        }
    };
    if period_start > period_end {
        return Err(Error::BadRequest {
            message: "Period start must not be after period end".to_string(),
        });
    }

    let customer_filter: Option<CustomerId> = match query.customer_id.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(raw.parse().map_err(|_| Error::BadRequest {
            message: format!("Invalid customer id '{raw}'"),
        })?),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut accounts = Accounts::new(&mut conn);
    let issuer = accounts.get_by_id(account.id).await?.ok_or_else(|| Error::NotFound {
        resource: "Account".to_string(),
    })?;

    let mut deliveries = Deliveries::new(&mut conn);
    let rows = deliveries
        .list_rated_for_period(account.id, customer_filter, period_start, period_end)
        .await?;
    let statement = billing::build_statement(&rows);

    // Customer letterhead details when one was selected; the sentinel label
    // otherwise, including for an id that matches nothing.
    let mut customer_name = ALL_CUSTOMERS_LABEL.to_string();
    let mut customer_address = None;
    let mut customer_contact = None;
    if let Some(customer_id) = customer_filter {
        let mut customers = Customers::new(&mut conn);
        if let Some(customer) = customers.get_by_id((account.id, customer_id)).await? {
            customer_name = customer.name;
            customer_address = customer.address;
            customer_contact = customer.contact;
        }
    }

    Ok(Json(ApiResponse::ok(BillResponse {
        bill: BillData {
            customer_name,
            customer_address,
            customer_contact,
            period_start,
            period_end,
            deliveries: statement.deliveries,
            absent_days: statement.absent_days,
            summary: statement.summary,
        },
        account: BillAccount {
            name: issuer.display_name,
            address: issuer.address,
        },
    })))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, register_account};
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    // Numeric scale varies with the arithmetic that produced a value, so
    // compare numerically rather than on the serialized string.
    fn decimal(value: &serde_json::Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    async fn seed_customer(server: &axum_test::TestServer, token: &str, name: &str, rate: &str) -> i64 {
        let body: serde_json::Value = server
            .post("/customers")
            .authorization_bearer(token)
            .json(&json!({"name": name, "rate_per_litre": rate}))
            .await
            .json();
        body["data"]["id"].as_i64().unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bill_prices_with_rate_precedence(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;
        let customer_id = seed_customer(&server, &token, "Asha", "50.00").await;

        // Customer default applies
        server
            .post("/deliveries")
            .authorization_bearer(&token)
            .json(&json!({
                "customer_id": customer_id,
                "delivery_date": "2026-03-01",
                "quantity": "2",
                "status": "delivered",
                "month_year": "2026-03"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        // Record override wins
        server
            .post("/deliveries")
            .authorization_bearer(&token)
            .json(&json!({
                "customer_id": customer_id,
                "delivery_date": "2026-03-02",
                "quantity": "3",
                "status": "delivered",
                "month_year": "2026-03",
                "rate_per_litre": "60.00"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        // Absent day
        server
            .post("/deliveries")
            .authorization_bearer(&token)
            .json(&json!({
                "customer_id": customer_id,
                "delivery_date": "2026-03-03",
                "status": "absent",
                "month_year": "2026-03"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get("/bill")
            .authorization_bearer(&token)
            .add_query_param("customer_id", customer_id)
            .add_query_param("period_start", "2026-03-01")
            .add_query_param("period_end", "2026-03-31")
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let bill = &body["data"]["bill"];

        assert_eq!(bill["customer_name"], "Asha");
        assert_eq!(bill["deliveries"].as_array().unwrap().len(), 2);
        assert_eq!(bill["absent_days"].as_array().unwrap().len(), 1);
        assert_eq!(bill["summary"]["total_delivered_days"], 2);
        assert_eq!(bill["summary"]["total_absent_days"], 1);
        // 2 x 50 + 3 x 60
        assert_eq!(decimal(&bill["summary"]["total_amount"]), Decimal::new(280, 0));
        // (50 + 60) / 2
        assert_eq!(decimal(&bill["summary"]["average_rate"]), Decimal::new(55, 0));

        assert_eq!(body["data"]["account"]["name"], "Account hilltop");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_period_is_rejected(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let response = server.get("/bill").authorization_bearer(&token).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Period start and end dates are required");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inverted_period_is_rejected_before_querying(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let response = server
            .get("/bill")
            .authorization_bearer(&token)
            .add_query_param("period_start", "2026-03-31")
            .add_query_param("period_end", "2026-03-01")
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_customer_falls_back_to_empty_statement(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let response = server
            .get("/bill")
            .authorization_bearer(&token)
            .add_query_param("customer_id", 9999)
            .add_query_param("period_start", "2026-03-01")
            .add_query_param("period_end", "2026-03-31")
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let bill = &body["data"]["bill"];
        assert_eq!(bill["customer_name"], "All Customers");
        assert!(bill["deliveries"].as_array().unwrap().is_empty());
        assert_eq!(decimal(&bill["summary"]["total_amount"]), Decimal::ZERO);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_customer_less_records_price_at_zero_in_all_bill(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        server
            .post("/deliveries")
            .authorization_bearer(&token)
            .json(&json!({
                "delivery_date": "2026-03-01",
                "quantity": "4",
                "status": "delivered",
                "month_year": "2026-03"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get("/bill")
            .authorization_bearer(&token)
            .add_query_param("period_start", "2026-03-01")
            .add_query_param("period_end", "2026-03-31")
            .await;
        let body: serde_json::Value = response.json();
        let bill = &body["data"]["bill"];

        assert_eq!(bill["summary"]["total_delivered_days"], 1);
        assert_eq!(decimal(&bill["summary"]["total_litres"]), Decimal::new(4, 0));
        // No customer, no override: rate resolves to zero and stays out of the average
        assert_eq!(decimal(&bill["summary"]["average_rate"]), Decimal::ZERO);
        assert_eq!(decimal(&bill["summary"]["total_amount"]), Decimal::ZERO);
    }
}
