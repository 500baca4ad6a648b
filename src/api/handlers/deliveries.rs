use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        accounts::CurrentAccount,
        deliveries::{DeliveryResponse, DeliveryUpsert, ListDeliveriesQuery, validate_month_tag},
    },
    db::{
        handlers::{Customers, Deliveries, Repository, deliveries::DeliveryFilter},
        models::deliveries::DeliveryUpsertDBRequest,
    },
    errors::Error,
    types::DeliveryId,
};

/// List the account's deliveries, newest first, optionally narrowed to one period
#[utoipa::path(
    get,
    path = "/deliveries",
    tag = "deliveries",
    params(ListDeliveriesQuery),
    responses(
        (status = 200, description = "List of deliveries", body = Vec<DeliveryResponse>),
        (status = 400, description = "Invalid period tag"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_deliveries(
    State(state): State<AppState>,
    account: CurrentAccount,
    Query(query): Query<ListDeliveriesQuery>,
) -> Result<Json<ApiResponse<Vec<DeliveryResponse>>>, Error> {
    if let Some(month_year) = &query.month_year {
        validate_month_tag(month_year).map_err(|message| Error::BadRequest { message })?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Deliveries::new(&mut conn);

    let deliveries = repo.list(&DeliveryFilter::new(account.id, query.month_year)).await?;
    Ok(Json(ApiResponse::ok(deliveries.into_iter().map(DeliveryResponse::from).collect())))
}

/// Create or overwrite the delivery record for (date, customer-or-none).
///
/// Responds 201 when a record was created and 200 when an existing one was
/// overwritten. A concurrent writer racing for the same key loses to the
/// unique index and gets a 409.
#[utoipa::path(
    post,
    path = "/deliveries",
    tag = "deliveries",
    request_body = DeliveryUpsert,
    responses(
        (status = 200, description = "Delivery updated successfully", body = DeliveryResponse),
        (status = 201, description = "Delivery created successfully", body = DeliveryResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Delivery already exists for this date and customer"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upsert_delivery(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(request): Json<DeliveryUpsert>,
) -> Result<(StatusCode, Json<ApiResponse<DeliveryResponse>>), Error> {
    validate_month_tag(&request.month_year).map_err(|message| Error::BadRequest { message })?;

    let quantity = request.quantity.unwrap_or(Decimal::ZERO);
    if quantity < Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "quantity must be non-negative".to_string(),
        });
    }
    if let Some(rate) = request.rate_per_litre
        && rate < Decimal::ZERO
    {
        return Err(Error::BadRequest {
            message: "rate_per_litre must be non-negative".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // A record may only reference a customer of the same account
    if let Some(customer_id) = request.customer_id {
        let mut customers = Customers::new(&mut conn);
        if customers.get_by_id((account.id, customer_id)).await?.is_none() {
            return Err(Error::BadRequest {
                message: "Unknown customer".to_string(),
            });
        }
    }

    let mut repo = Deliveries::new(&mut conn);
    let (record, created) = repo
        .upsert(&DeliveryUpsertDBRequest {
            account_id: account.id,
            customer_id: request.customer_id,
            delivery_date: request.delivery_date,
            quantity,
            status: request.status,
            month_year: request.month_year,
            rate_per_litre: request.rate_per_litre,
        })
        .await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Delivery created successfully")
    } else {
        (StatusCode::OK, "Delivery updated successfully")
    };

    Ok((status, Json(ApiResponse::ok_with_message(DeliveryResponse::from(record), message))))
}

/// Delete a delivery record
#[utoipa::path(
    delete,
    path = "/deliveries/{id}",
    tag = "deliveries",
    params(("id" = i32, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Delivery not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_delivery(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(delivery_id): Path<DeliveryId>,
) -> Result<Json<ApiResponse<()>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Deliveries::new(&mut conn);

    if repo.delete(account.id, delivery_id).await? {
        Ok(Json(ApiResponse::message_only("Delivery deleted successfully")))
    } else {
        Err(Error::NotFound {
            resource: "Delivery".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, register_account};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_creates_then_overwrites(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let payload = json!({
            "delivery_date": "2026-03-14",
            "quantity": "2",
            "status": "delivered",
            "month_year": "2026-03"
        });
        let first = server.post("/deliveries").authorization_bearer(&token).json(&payload).await;
        first.assert_status(axum::http::StatusCode::CREATED);

        let payload = json!({
            "delivery_date": "2026-03-14",
            "quantity": "3",
            "status": "delivered",
            "month_year": "2026-03"
        });
        let second = server.post("/deliveries").authorization_bearer(&token).json(&payload).await;
        second.assert_status_ok();
        let body: serde_json::Value = second.json();
        assert_eq!(body["message"], "Delivery updated successfully");
        assert_eq!(body["data"]["quantity"], "3.00");

        let listed: serde_json::Value = server.get("/deliveries").authorization_bearer(&token).await.json();
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_rejects_foreign_customer(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token_a = register_account(&server, "hilltop").await;
        let token_b = register_account(&server, "valley").await;

        let created: serde_json::Value = server
            .post("/customers")
            .authorization_bearer(&token_a)
            .json(&json!({"name": "Asha", "rate_per_litre": "50.00"}))
            .await
            .json();
        let foreign_id = created["data"]["id"].as_i64().unwrap();

        let response = server
            .post("/deliveries")
            .authorization_bearer(&token_b)
            .json(&json!({
                "customer_id": foreign_id,
                "delivery_date": "2026-03-14",
                "quantity": "2",
                "status": "delivered",
                "month_year": "2026-03"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_invalid_month_tag_rejected_before_storage(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token = register_account(&server, "hilltop").await;

        let response = server
            .post("/deliveries")
            .authorization_bearer(&token)
            .json(&json!({
                "delivery_date": "2026-03-14",
                "quantity": "2",
                "status": "delivered",
                "month_year": "14-03-2026"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);

        let listed: serde_json::Value = server.get("/deliveries").authorization_bearer(&token).await.json();
        assert!(listed["data"].as_array().unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_tenant_cannot_list_or_delete_others_records(pool: PgPool) {
        let server = create_test_app(pool).await;
        let token_a = register_account(&server, "hilltop").await;
        let token_b = register_account(&server, "valley").await;

        let created: serde_json::Value = server
            .post("/deliveries")
            .authorization_bearer(&token_a)
            .json(&json!({
                "delivery_date": "2026-03-14",
                "quantity": "2",
                "status": "delivered",
                "month_year": "2026-03"
            }))
            .await
            .json();
        let id = created["data"]["id"].as_i64().unwrap();

        let listed: serde_json::Value = server.get("/deliveries").authorization_bearer(&token_b).await.json();
        assert!(listed["data"].as_array().unwrap().is_empty());

        let response = server.delete(&format!("/deliveries/{id}")).authorization_bearer(&token_b).await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
