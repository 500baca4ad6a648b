use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        accounts::{AccountResponse, AccountUpdate, CurrentAccount},
    },
    db::{handlers::Accounts, models::accounts::AccountUpdateDBRequest},
    errors::Error,
};

/// Fetch the authenticated account's profile
#[utoipa::path(
    get,
    path = "/account",
    tag = "account",
    responses(
        (status = 200, description = "Account profile", body = AccountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_account(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<Json<ApiResponse<AccountResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut accounts = Accounts::new(&mut conn);

    match accounts.get_by_id(account.id).await? {
        Some(db_account) => Ok(Json(ApiResponse::ok(AccountResponse::from(db_account)))),
        None => Err(Error::NotFound {
            resource: "Account".to_string(),
        }),
    }
}

/// Update the authenticated account's display name and address
#[utoipa::path(
    put,
    path = "/account",
    tag = "account",
    request_body = AccountUpdate,
    responses(
        (status = 200, description = "Account updated successfully", body = AccountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_account(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<ApiResponse<AccountResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut accounts = Accounts::new(&mut conn);

    let updated = accounts
        .update_profile(
            account.id,
            &AccountUpdateDBRequest {
                display_name: update.display_name,
                address: update.address,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "Account".to_string(),
            },
            other => Error::Database(other),
        })?;

    Ok(Json(ApiResponse::ok_with_message(
        AccountResponse::from(updated),
        "Account updated successfully",
    )))
}
