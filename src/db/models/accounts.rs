//! Database models for tenant accounts.

use crate::types::AccountId;
use chrono::{DateTime, Utc};

/// Database request for creating a new account
#[derive(Debug, Clone)]
pub struct AccountCreateDBRequest {
    pub handle: String,
    pub display_name: String,
    pub address: String,
    pub password_hash: Option<String>,
}

/// Database request for updating an account's profile
#[derive(Debug, Clone)]
pub struct AccountUpdateDBRequest {
    pub display_name: Option<String>,
    pub address: Option<String>,
}

/// Database response for an account
#[derive(Debug, Clone)]
pub struct AccountDBResponse {
    pub id: AccountId,
    pub handle: String,
    pub display_name: String,
    pub address: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
