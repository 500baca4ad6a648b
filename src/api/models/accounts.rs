//! API models for tenant accounts.

use crate::{db::models::accounts::AccountDBResponse, types::AccountId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authenticated tenant, as carried in the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccount {
    pub id: AccountId,
    pub handle: String,
}

/// Public view of an account. The credential hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: AccountId,
    pub handle: String,
    pub display_name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl From<AccountDBResponse> for AccountResponse {
    fn from(db: AccountDBResponse) -> Self {
        Self {
            id: db.id,
            handle: db.handle,
            display_name: db.display_name,
            address: db.address,
            created_at: db.created_at,
        }
    }
}

impl From<AccountResponse> for CurrentAccount {
    fn from(account: AccountResponse) -> Self {
        Self {
            id: account.id,
            handle: account.handle,
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AccountUpdate {
    pub display_name: Option<String>,
    pub address: Option<String>,
}
