use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        accounts::CurrentAccount,
        customers::{CustomerCreate, CustomerResponse, CustomerUpdate},
    },
    db::{
        errors::DbError,
        handlers::{Customers, Repository, customers::CustomerFilter},
        models::customers::{CustomerCreateDBRequest, CustomerUpdateDBRequest},
    },
    errors::Error,
    types::CustomerId,
};

/// List the account's customers, ordered by name
#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    responses(
        (status = 200, description = "List of customers", body = Vec<CustomerResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_customers(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<Json<ApiResponse<Vec<CustomerResponse>>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Customers::new(&mut conn);

    let customers = repo.list(&CustomerFilter::new(account.id)).await?;
    Ok(Json(ApiResponse::ok(customers.into_iter().map(CustomerResponse::from).collect())))
}

/// Create a customer
#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    request_body = CustomerCreate,
    responses(
        (status = 201, description = "Customer created successfully", body = CustomerResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Customer with this name already exists"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_customer(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(create): Json<CustomerCreate>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerResponse>>), Error> {
    if create.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Customer name must not be empty".to_string(),
        });
    }
    if create.rate_per_litre <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "rate_per_litre must be positive".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Customers::new(&mut conn);

    if repo.get_by_name(account.id, &create.name).await?.is_some() {
        return Err(Error::Conflict {
            message: "Customer with this name already exists".to_string(),
        });
    }

    // The (account, name) unique constraint backstops a racing create
    let customer = repo.create(&CustomerCreateDBRequest::new(account.id, create)).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            CustomerResponse::from(customer),
            "Customer created successfully",
        )),
    ))
}

/// Edit a customer; absent fields are left unchanged
#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customers",
    request_body = CustomerUpdate,
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer updated successfully", body = CustomerResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Customer with this name already exists"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_customer(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(customer_id): Path<CustomerId>,
    Json(update): Json<CustomerUpdate>,
) -> Result<Json<ApiResponse<CustomerResponse>>, Error> {
    if let Some(rate) = update.rate_per_litre
        && rate <= Decimal::ZERO
    {
        return Err(Error::BadRequest {
            message: "rate_per_litre must be positive".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Customers::new(&mut conn);

    let customer = repo
        .update((account.id, customer_id), &CustomerUpdateDBRequest::from(update))
        .await
        .map_err(|e| match e {
            DbError::NotFound => Error::NotFound {
                resource: "Customer".to_string(),
            },
            other => Error::Database(other),
        })?;

    Ok(Json(ApiResponse::ok_with_message(
        CustomerResponse::from(customer),
        "Customer updated successfully",
    )))
}

/// Delete a customer; their delivery records stay behind with the customer
/// reference nulled
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_customer(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<ApiResponse<()>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Customers::new(&mut conn);

    if repo.delete((account.id, customer_id)).await? {
        Ok(Json(ApiResponse::message_only("Customer deleted successfully")))
    } else {
        Err(Error::NotFound {
            resource: "Customer".to_string(),
        })
    }
}
