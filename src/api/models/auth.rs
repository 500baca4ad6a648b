//! API models for registration and login.

use crate::api::models::accounts::AccountResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub handle: String,
    pub display_name: String,
    pub address: String,
    pub password: String,
}

/// Login payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

/// Successful authentication: the account plus its bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthData {
    pub account: AccountResponse,
    pub token: String,
}
