use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::warn;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        accounts::{AccountResponse, CurrentAccount},
        customers::CustomerResponse,
        deliveries::{DeliveryResponse, DeliveryStatus, validate_month_tag},
        export::{ExportData, ImportCustomer, ImportDelivery, ImportOutcome, ImportRequest},
    },
    db::{
        handlers::{Accounts, Customers, Deliveries, Repository, customers::CustomerFilter, deliveries::DeliveryFilter},
        models::{
            customers::{CustomerCreateDBRequest, CustomerUpdateDBRequest},
            deliveries::DeliveryUpsertDBRequest,
        },
    },
    errors::Error,
    types::AccountId,
};

/// Export the account's full snapshot as JSON
#[utoipa::path(
    get,
    path = "/export/json",
    tag = "export",
    responses(
        (status = 200, description = "Full data snapshot", body = ExportData),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn export_json(State(state): State<AppState>, account: CurrentAccount) -> Result<Json<ApiResponse<ExportData>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut accounts = Accounts::new(&mut conn);
    let exported_account = accounts.get_by_id(account.id).await?.ok_or_else(|| Error::NotFound {
        resource: "Account".to_string(),
    })?;

    let mut deliveries_repo = Deliveries::new(&mut conn);
    let deliveries = deliveries_repo.list(&DeliveryFilter::new(account.id, None)).await?;

    let mut customers_repo = Customers::new(&mut conn);
    let customers = customers_repo.list(&CustomerFilter::new(account.id)).await?;

    Ok(Json(ApiResponse::ok(ExportData {
        account: AccountResponse::from(exported_account),
        deliveries: deliveries.into_iter().map(DeliveryResponse::from).collect(),
        customers: customers.into_iter().map(CustomerResponse::from).collect(),
        exported_at: Utc::now(),
    })))
}

/// Export the account's deliveries as CSV
#[utoipa::path(
    get,
    path = "/export/csv",
    tag = "export",
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn export_csv(State(state): State<AppState>, account: CurrentAccount) -> Result<impl IntoResponse, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Deliveries::new(&mut conn);
    let rows = repo.list_for_export(account.id).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "delivery_date",
            "customer_name",
            "quantity",
            "status",
            "rate_per_litre",
            "month_year",
            "customer_contact",
        ])
        .map_err(|e| Error::Internal {
            operation: format!("write CSV header: {e}"),
        })?;

    for row in &rows {
        writer
            .write_record([
                row.delivery_date.to_string(),
                row.customer_name.clone().unwrap_or_default(),
                row.quantity.to_string(),
                row.status.clone(),
                row.rate_per_litre.map(|r| r.to_string()).unwrap_or_default(),
                row.month_year.clone(),
                row.customer_contact.clone().unwrap_or_default(),
            ])
            .map_err(|e| Error::Internal {
                operation: format!("write CSV row: {e}"),
            })?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Internal {
        operation: format!("flush CSV writer: {e}"),
    })?;
    let body = String::from_utf8(bytes).map_err(|e| Error::Internal {
        operation: format!("encode CSV: {e}"),
    })?;

    let filename = format!("milk-data-{}-{}.csv", account.handle, Utc::now().date_naive());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={filename}")),
        ],
        body,
    ))
}

async fn reconcile_customer(
    conn: &mut sqlx::PgConnection,
    account_id: AccountId,
    customer: &ImportCustomer,
) -> Result<bool, Error> {
    if customer.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Customer name must not be empty".to_string(),
        });
    }
    if customer.rate_per_litre <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "rate_per_litre must be positive".to_string(),
        });
    }

    let mut repo = Customers::new(conn);
    match repo.get_by_name(account_id, &customer.name).await? {
        Some(existing) => {
            repo.update(
                (account_id, existing.id),
                &CustomerUpdateDBRequest {
                    name: None,
                    address: customer.address.clone(),
                    contact: customer.contact.clone(),
                    rate_per_litre: Some(customer.rate_per_litre),
                },
            )
            .await?;
            Ok(false)
        }
        None => {
            repo.create(&CustomerCreateDBRequest {
                account_id,
                name: customer.name.clone(),
                address: customer.address.clone(),
                contact: customer.contact.clone(),
                rate_per_litre: customer.rate_per_litre,
            })
            .await?;
            Ok(true)
        }
    }
}

async fn reconcile_delivery(
    conn: &mut sqlx::PgConnection,
    account_id: AccountId,
    delivery: &ImportDelivery,
) -> Result<bool, Error> {
    let status: DeliveryStatus = delivery.status.parse().map_err(|_| Error::BadRequest {
        message: format!("Invalid delivery status '{}'", delivery.status),
    })?;
    validate_month_tag(&delivery.month_year).map_err(|message| Error::BadRequest { message })?;

    let quantity = delivery.quantity.unwrap_or(Decimal::ZERO);
    if quantity < Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "quantity must be non-negative".to_string(),
        });
    }

    // A row may only reference a customer of the importing account; ids from
    // someone else's export are an error for that row, not the batch.
    if let Some(customer_id) = delivery.customer_id {
        let mut customers = Customers::new(&mut *conn);
        if customers.get_by_id((account_id, customer_id)).await?.is_none() {
            return Err(Error::BadRequest {
                message: format!("Unknown customer id {customer_id}"),
            });
        }
    }

    let mut repo = Deliveries::new(conn);
    let (_, created) = repo
        .upsert(&DeliveryUpsertDBRequest {
            account_id,
            customer_id: delivery.customer_id,
            delivery_date: delivery.delivery_date,
            quantity,
            status,
            month_year: delivery.month_year.clone(),
            rate_per_litre: delivery.rate_per_litre,
        })
        .await?;
    Ok(created)
}

/// Reconcile an external snapshot into the account.
///
/// Customers first (keyed by name), then deliveries (keyed by
/// date + customer identity, the same key the upsert protocol uses). Each
/// entity succeeds or fails alone; the response reports exact counts.
#[utoipa::path(
    post,
    path = "/export/import",
    tag = "export",
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Import completed", body = ImportOutcome),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn import_json(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ApiResponse<ImportOutcome>>, Error> {
    let Some(deliveries) = request.deliveries else {
        return Err(Error::BadRequest {
            message: "Invalid data format. Expected { deliveries: [], customers: [] }".to_string(),
        });
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut outcome = ImportOutcome::default();

    // Customers first so deliveries can resolve newly imported customers
    for customer in request.customers.as_deref().unwrap_or_default() {
        match reconcile_customer(&mut conn, account.id, customer).await {
            Ok(true) => outcome.imported += 1,
            Ok(false) => outcome.updated += 1,
            Err(e) => {
                warn!("Skipping customer '{}' during import: {}", customer.name, e.user_message());
                outcome.errors += 1;
            }
        }
    }

    for delivery in &deliveries {
        match reconcile_delivery(&mut conn, account.id, delivery).await {
            Ok(true) => outcome.imported += 1,
            Ok(false) => outcome.updated += 1,
            Err(e) => {
                warn!("Skipping delivery on {} during import: {}", delivery.delivery_date, e.user_message());
                outcome.errors += 1;
            }
        }
    }

    let message = format!(
        "Import completed: {} created, {} updated, {} errors",
        outcome.imported, outcome.updated, outcome.errors
    );
    Ok(Json(ApiResponse::ok_with_message(outcome, message)))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, register_account};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_import_reconciles_customers_then_deliveries(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let response = server
            .post("/export/import")
            .authorization_bearer(&token)
            .json(&json!({
                "customers": [
                    {"name": "Asha", "rate_per_litre": "50.00"}
                ],
                "deliveries": [
                    {"delivery_date": "2026-03-01", "quantity": "2", "status": "delivered", "month_year": "2026-03"}
                ]
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["imported"], 2);
        assert_eq!(body["data"]["updated"], 0);
        assert_eq!(body["data"]["errors"], 0);

        // Re-importing the same snapshot updates instead of duplicating
        let response = server
            .post("/export/import")
            .authorization_bearer(&token)
            .json(&json!({
                "customers": [
                    {"name": "Asha", "rate_per_litre": "52.00"}
                ],
                "deliveries": [
                    {"delivery_date": "2026-03-01", "quantity": "3", "status": "delivered", "month_year": "2026-03"}
                ]
            }))
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["imported"], 0);
        assert_eq!(body["data"]["updated"], 2);
        assert_eq!(body["data"]["errors"], 0);

        let listed: serde_json::Value = server.get("/deliveries").authorization_bearer(&token).await.json();
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
        assert_eq!(listed["data"][0]["quantity"], "3.00");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_import_partial_failure_persists_valid_rows(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let response = server
            .post("/export/import")
            .authorization_bearer(&token)
            .json(&json!({
                "deliveries": [
                    {"delivery_date": "2026-03-01", "quantity": "2", "status": "delivered", "month_year": "2026-03"},
                    {"delivery_date": "2026-03-02", "quantity": "1", "status": "delivered", "month_year": "2026-03",
                     "customer_id": 4242},
                    {"delivery_date": "2026-03-03", "quantity": "3", "status": "delivered", "month_year": "2026-03"}
                ]
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["imported"], 2);
        assert_eq!(body["data"]["errors"], 1);
        assert_eq!(body["message"], "Import completed: 2 created, 0 updated, 1 errors");

        let listed: serde_json::Value = server.get("/deliveries").authorization_bearer(&token).await.json();
        assert_eq!(listed["data"].as_array().unwrap().len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_import_without_deliveries_array_is_rejected(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let response = server
            .post("/export/import")
            .authorization_bearer(&token)
            .json(&json!({"customers": []}))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_export_json_snapshot_shape(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        server
            .post("/customers")
            .authorization_bearer(&token)
            .json(&json!({"name": "Asha", "rate_per_litre": "50.00"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server.get("/export/json").authorization_bearer(&token).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["account"]["handle"], "hilltop");
        assert_eq!(body["data"]["customers"].as_array().unwrap().len(), 1);
        assert!(body["data"]["deliveries"].as_array().unwrap().is_empty());
        assert!(body["data"]["exported_at"].is_string());
        assert!(body["data"]["account"].get("password_hash").is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_export_csv_layout(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        server
            .post("/deliveries")
            .authorization_bearer(&token)
            .json(&json!({
                "delivery_date": "2026-03-01",
                "quantity": "2",
                "status": "delivered",
                "month_year": "2026-03"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server.get("/export/csv").authorization_bearer(&token).await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/csv");
        assert!(
            response
                .header("content-disposition")
                .to_str()
                .unwrap()
                .starts_with("attachment; filename=milk-data-hilltop-")
        );

        let body = response.text();
        let mut lines = body.lines();
        assert_eq!(
            lines.next().unwrap(),
            "delivery_date,customer_name,quantity,status,rate_per_litre,month_year,customer_contact"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2026-03-01,"));
        assert!(row.contains("delivered"));
    }
}
