use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        accounts::{AccountResponse, CurrentAccount},
        auth::{AuthData, LoginRequest, RegisterRequest},
    },
    auth::{password, session},
    db::{handlers::Accounts, models::accounts::AccountCreateDBRequest},
    errors::Error,
};

/// Register a new tenant account and issue a bearer token
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 201, description = "Account registered successfully", body = AuthData),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Handle already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), Error> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "Registration is disabled".to_string(),
        });
    }

    if request.handle.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Handle must not be empty".to_string(),
        });
    }

    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut accounts = Accounts::new(&mut conn);

    if accounts.get_by_handle(&request.handle).await?.is_some() {
        return Err(Error::Conflict {
            message: "Handle already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let raw_password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&raw_password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    // The unique handle constraint is the final arbiter if two registrations
    // race; the loser surfaces as a 409.
    let created = accounts
        .create(&AccountCreateDBRequest {
            handle: request.handle,
            display_name: request.display_name,
            address: request.address,
            password_hash: Some(password_hash),
        })
        .await?;

    let account_response = AccountResponse::from(created);
    let current: CurrentAccount = account_response.clone().into();
    let token = session::create_session_token(&current, &state.config)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            AuthData {
                account: account_response,
                token,
            },
            "Registration successful",
        )),
    ))
}

/// Login with handle and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthData),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<ApiResponse<AuthData>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut accounts = Accounts::new(&mut conn);

    // Same message for an unknown handle and a wrong password
    let account = accounts
        .get_by_handle(&request.handle)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid handle or password".to_string()),
        })?;

    let password_hash = account.password_hash.clone().ok_or_else(|| Error::BadRequest {
        message: "Legacy account found. Please re-register this handle with a password.".to_string(),
    })?;

    // Verify the password on a blocking thread to avoid blocking the async runtime
    let raw_password = request.password.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&raw_password, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid handle or password".to_string()),
        });
    }

    let account_response = AccountResponse::from(account);
    let current: CurrentAccount = account_response.clone().into();
    let token = session::create_session_token(&current, &state.config)?;

    Ok(Json(ApiResponse::ok_with_message(
        AuthData {
            account: account_response,
            token,
        },
        "Login successful",
    )))
}
