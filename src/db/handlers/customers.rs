//! Database repository for customers.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::customers::{CustomerCreateDBRequest, CustomerDBResponse, CustomerUpdateDBRequest},
    },
    types::{AccountId, CustomerId},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing customers; the account scope is mandatory.
#[derive(Debug, Clone)]
pub struct CustomerFilter {
    pub account_id: AccountId,
}

impl CustomerFilter {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct CustomerRow {
    pub id: CustomerId,
    pub account_id: AccountId,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerDBResponse {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            name: row.name,
            address: row.address,
            contact: row.contact,
            rate_per_litre: row.rate_per_litre,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct Customers<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Customers<'c> {
    type CreateRequest = CustomerCreateDBRequest;
    type UpdateRequest = CustomerUpdateDBRequest;
    type Response = CustomerDBResponse;
    // Lookups are always (owning account, customer) so no query can cross a
    // tenant boundary.
    type Id = (AccountId, CustomerId);
    type Filter = CustomerFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row: CustomerRow = sqlx::query_as(
            r#"
            INSERT INTO customers (account_id, name, address, contact, rate_per_litre)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.account_id)
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.contact)
        .bind(request.rate_per_litre)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, (account_id, id): Self::Id) -> Result<Option<Self::Response>> {
        let row: Option<CustomerRow> = sqlx::query_as("SELECT * FROM customers WHERE account_id = $1 AND id = $2")
            .bind(account_id)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, filter), fields(account_id = filter.account_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows: Vec<CustomerRow> = sqlx::query_as("SELECT * FROM customers WHERE account_id = $1 ORDER BY name ASC")
            .bind(filter.account_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Deleting a customer soft-detaches their deliveries: the FK is
    /// ON DELETE SET NULL, so records survive without a customer reference.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, (account_id, id): Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE account_id = $1 AND id = $2")
            .bind(account_id)
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, (account_id, id): Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            UPDATE customers SET
                name = COALESCE($3, name),
                address = COALESCE($4, address),
                contact = COALESCE($5, contact),
                rate_per_litre = COALESCE($6, rate_per_litre),
                updated_at = NOW()
            WHERE account_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(account_id)
        .bind(id)
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.contact)
        .bind(request.rate_per_litre)
        .fetch_optional(&mut *self.db)
        .await?;

        row.map(Into::into).ok_or(DbError::NotFound)
    }
}

impl<'c> Customers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Natural-key lookup used by import reconciliation.
    #[instrument(skip(self, name), err)]
    pub async fn get_by_name(&mut self, account_id: AccountId, name: &str) -> Result<Option<CustomerDBResponse>> {
        let row: Option<CustomerRow> = sqlx::query_as("SELECT * FROM customers WHERE account_id = $1 AND name = $2")
            .bind(account_id)
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Accounts, models::accounts::AccountCreateDBRequest};
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    async fn create_account(conn: &mut PgConnection, handle: &str) -> AccountId {
        let mut repo = Accounts::new(conn);
        repo.create(&AccountCreateDBRequest {
            handle: handle.to_string(),
            display_name: "Dairy".to_string(),
            address: "somewhere".to_string(),
            password_hash: None,
        })
        .await
        .unwrap()
        .id
    }

    fn create_request(account_id: AccountId, name: &str) -> CustomerCreateDBRequest {
        CustomerCreateDBRequest {
            account_id,
            name: name.to_string(),
            address: Some("4 Elm Street".to_string()),
            contact: Some("555-0142".to_string()),
            rate_per_litre: Decimal::new(5000, 2), // 50.00
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_list_ordered_by_name(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let account_id = create_account(&mut conn, "hilltop").await;

        let mut repo = Customers::new(&mut conn);
        repo.create(&create_request(account_id, "Zara")).await.unwrap();
        repo.create(&create_request(account_id, "Asha")).await.unwrap();

        let listed = repo.list(&CustomerFilter::new(account_id)).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Asha", "Zara"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_name_within_account_conflicts(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let account_id = create_account(&mut conn, "hilltop").await;

        let mut repo = Customers::new(&mut conn);
        repo.create(&create_request(account_id, "Asha")).await.unwrap();
        let err = repo.create(&create_request(account_id, "Asha")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_same_name_in_other_account_is_fine(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let account_a = create_account(&mut conn, "hilltop").await;
        let account_b = create_account(&mut conn, "valley").await;

        let mut repo = Customers::new(&mut conn);
        repo.create(&create_request(account_a, "Asha")).await.unwrap();
        repo.create(&create_request(account_b, "Asha")).await.unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_non_positive_rate_is_check_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let account_id = create_account(&mut conn, "hilltop").await;

        let mut repo = Customers::new(&mut conn);
        let mut request = create_request(account_id, "Asha");
        request.rate_per_litre = Decimal::ZERO;
        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_by_id_is_tenant_scoped(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let account_a = create_account(&mut conn, "hilltop").await;
        let account_b = create_account(&mut conn, "valley").await;

        let mut repo = Customers::new(&mut conn);
        let created = repo.create(&create_request(account_a, "Asha")).await.unwrap();

        assert!(repo.get_by_id((account_a, created.id)).await.unwrap().is_some());
        assert!(repo.get_by_id((account_b, created.id)).await.unwrap().is_none());
    }
}
