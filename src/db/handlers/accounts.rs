//! Database repository for tenant accounts.

use crate::{
    db::{
        errors::{DbError, Result},
        models::accounts::{AccountCreateDBRequest, AccountDBResponse, AccountUpdateDBRequest},
    },
    types::AccountId,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct AccountRow {
    pub id: AccountId,
    pub handle: String,
    pub display_name: String,
    pub address: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRow> for AccountDBResponse {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            handle: row.handle,
            display_name: row.display_name,
            address: row.address,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct Accounts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Accounts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(handle = %request.handle), err)]
    pub async fn create(&mut self, request: &AccountCreateDBRequest) -> Result<AccountDBResponse> {
        let row: AccountRow = sqlx::query_as(
            r#"
            INSERT INTO accounts (handle, display_name, address, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.handle)
        .bind(&request.display_name)
        .bind(&request.address)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: AccountId) -> Result<Option<AccountDBResponse>> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, handle), err)]
    pub async fn get_by_handle(&mut self, handle: &str) -> Result<Option<AccountDBResponse>> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE handle = $1")
            .bind(handle)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Update the editable profile fields. Handle and credentials are
    /// immutable on this path.
    #[instrument(skip(self, request), err)]
    pub async fn update_profile(&mut self, id: AccountId, request: &AccountUpdateDBRequest) -> Result<AccountDBResponse> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            UPDATE accounts SET
                display_name = COALESCE($2, display_name),
                address = COALESCE($3, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.display_name)
        .bind(&request.address)
        .fetch_optional(&mut *self.db)
        .await?;

        row.map(Into::into).ok_or(DbError::NotFound)
    }

    /// Delete an account. Customers and deliveries go with it via the
    /// ON DELETE CASCADE foreign keys.
    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
