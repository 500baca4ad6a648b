//! Database repository for delivery records.
//!
//! Holds the create-or-overwrite protocol keyed by (account, date,
//! customer-or-none) plus the range and aggregate queries behind bills,
//! monthly summaries, and exports. The
//! `deliveries_account_date_customer_unique` index is the final arbiter when
//! two writers race for the same key; the loser surfaces as
//! [`DbError::UniqueViolation`].

use crate::{
    api::models::deliveries::DeliveryStatus,
    db::{
        errors::{DbError, Result},
        models::deliveries::{
            DeliveryDBResponse, DeliveryUpsertDBRequest, DeliveryWithCustomerDBResponse, MonthAggregateDBResponse,
            MonthTrendDBResponse, RatedDeliveryDBResponse,
        },
    },
    types::{AccountId, CustomerId, DeliveryId},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing deliveries; the account scope is mandatory, the period
/// tag optional.
#[derive(Debug, Clone)]
pub struct DeliveryFilter {
    pub account_id: AccountId,
    pub month_year: Option<String>,
}

impl DeliveryFilter {
    pub fn new(account_id: AccountId, month_year: Option<String>) -> Self {
        Self { account_id, month_year }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct DeliveryRow {
    pub id: DeliveryId,
    pub account_id: AccountId,
    pub customer_id: Option<CustomerId>,
    pub delivery_date: NaiveDate,
    pub quantity: Decimal,
    pub status: String,
    pub month_year: String,
    pub rate_per_litre: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Delivery row with the customer's name joined in
#[derive(Debug, Clone, FromRow)]
struct DeliveryWithCustomerRow {
    pub id: DeliveryId,
    pub account_id: AccountId,
    pub customer_id: Option<CustomerId>,
    pub delivery_date: NaiveDate,
    pub quantity: Decimal,
    pub status: String,
    pub month_year: String,
    pub rate_per_litre: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct RatedDeliveryRow {
    pub delivery_date: NaiveDate,
    pub quantity: Decimal,
    pub status: String,
    pub record_rate: Option<Decimal>,
    pub customer_rate: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow)]
struct MonthAggregateRow {
    pub total_litres: Decimal,
    pub total_delivered_days: i64,
    pub total_absent_days: i64,
    pub average_rate: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow)]
struct MonthTrendRow {
    pub month_year: String,
    pub total_litres: Decimal,
    pub total_days: i64,
    pub absent_days: i64,
    pub average_daily_delivery: Option<Decimal>,
}

/// Delivery joined with customer name and contact, for CSV export
#[derive(Debug, Clone, FromRow)]
pub struct ExportDeliveryRow {
    pub delivery_date: NaiveDate,
    pub customer_name: Option<String>,
    pub quantity: Decimal,
    pub status: String,
    pub rate_per_litre: Option<Decimal>,
    pub month_year: String,
    pub customer_contact: Option<String>,
}

// The status column is constrained by a CHECK; anything unparseable here
// means the schema and the enum have drifted apart.
fn parse_status(status: &str) -> Result<DeliveryStatus> {
    status.parse::<DeliveryStatus>().map_err(DbError::Other)
}

impl TryFrom<DeliveryRow> for DeliveryDBResponse {
    type Error = DbError;

    fn try_from(row: DeliveryRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            account_id: row.account_id,
            customer_id: row.customer_id,
            delivery_date: row.delivery_date,
            quantity: row.quantity,
            status: parse_status(&row.status)?,
            month_year: row.month_year,
            rate_per_litre: row.rate_per_litre,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DeliveryWithCustomerRow> for DeliveryWithCustomerDBResponse {
    type Error = DbError;

    fn try_from(row: DeliveryWithCustomerRow) -> Result<Self> {
        Ok(Self {
            delivery: DeliveryDBResponse {
                id: row.id,
                account_id: row.account_id,
                customer_id: row.customer_id,
                delivery_date: row.delivery_date,
                quantity: row.quantity,
                status: parse_status(&row.status)?,
                month_year: row.month_year,
                rate_per_litre: row.rate_per_litre,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            customer_name: row.customer_name,
        })
    }
}

pub struct Deliveries<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Deliveries<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Create a new record or overwrite the one holding the same
    /// (account, date, customer-or-none) key.
    ///
    /// Returns the saved record and whether it was created (`true`) or
    /// overwritten (`false`). The existence check and the write are separate
    /// statements; a concurrent insert for the same key is rejected by the
    /// unique index and must be handled by the caller as a conflict.
    #[instrument(skip(self, request), fields(account_id = request.account_id, date = %request.delivery_date), err)]
    pub async fn upsert(&mut self, request: &DeliveryUpsertDBRequest) -> Result<(DeliveryDBResponse, bool)> {
        let existing: Option<DeliveryRow> = sqlx::query_as(
            r#"
            SELECT * FROM deliveries
            WHERE account_id = $1
              AND delivery_date = $2
              AND COALESCE(customer_id, 0) = COALESCE($3, 0)
            "#,
        )
        .bind(request.account_id)
        .bind(request.delivery_date)
        .bind(request.customer_id)
        .fetch_optional(&mut *self.db)
        .await?;

        match existing {
            Some(current) => {
                let row: DeliveryRow = sqlx::query_as(
                    r#"
                    UPDATE deliveries
                    SET quantity = $1,
                        status = $2,
                        rate_per_litre = $3,
                        customer_id = $4,
                        month_year = $5,
                        updated_at = NOW()
                    WHERE id = $6 AND account_id = $7
                    RETURNING *
                    "#,
                )
                .bind(request.quantity)
                .bind(request.status.as_str())
                .bind(request.rate_per_litre)
                .bind(request.customer_id)
                .bind(&request.month_year)
                .bind(current.id)
                .bind(request.account_id)
                .fetch_one(&mut *self.db)
                .await?;

                Ok((row.try_into()?, false))
            }
            None => {
                let row: DeliveryRow = sqlx::query_as(
                    r#"
                    INSERT INTO deliveries
                        (account_id, customer_id, delivery_date, quantity, status, month_year, rate_per_litre)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING *
                    "#,
                )
                .bind(request.account_id)
                .bind(request.customer_id)
                .bind(request.delivery_date)
                .bind(request.quantity)
                .bind(request.status.as_str())
                .bind(&request.month_year)
                .bind(request.rate_per_litre)
                .fetch_one(&mut *self.db)
                .await?;

                Ok((row.try_into()?, true))
            }
        }
    }

    /// List an account's deliveries, newest first, with customer names
    /// joined in. Optionally narrowed to one period tag.
    #[instrument(skip(self, filter), fields(account_id = filter.account_id), err)]
    pub async fn list(&mut self, filter: &DeliveryFilter) -> Result<Vec<DeliveryWithCustomerDBResponse>> {
        let rows: Vec<DeliveryWithCustomerRow> = sqlx::query_as(
            r#"
            SELECT d.*, c.name AS customer_name
            FROM deliveries d
            LEFT JOIN customers c ON d.customer_id = c.id
            WHERE d.account_id = $1
              AND ($2::varchar IS NULL OR d.month_year = $2)
            ORDER BY d.delivery_date DESC, d.id DESC
            "#,
        )
        .bind(filter.account_id)
        .bind(&filter.month_year)
        .fetch_all(&mut *self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, account_id: AccountId, id: DeliveryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deliveries WHERE account_id = $1 AND id = $2")
            .bind(account_id)
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch the rows the billing engine prices: deliveries in an inclusive
    /// date range joined with their customer's current default rate.
    ///
    /// With a customer filter the join is inner (customer-less records are
    /// out of scope for a per-customer bill); without one it is a left join
    /// so customer-less records price at the record override or zero.
    #[instrument(skip(self), fields(account_id), err)]
    pub async fn list_rated_for_period(
        &mut self,
        account_id: AccountId,
        customer_id: Option<CustomerId>,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<RatedDeliveryDBResponse>> {
        let rows: Vec<RatedDeliveryRow> = match customer_id {
            Some(customer_id) => {
                sqlx::query_as(
                    r#"
                    SELECT d.delivery_date,
                           d.quantity,
                           d.status,
                           d.rate_per_litre AS record_rate,
                           c.rate_per_litre AS customer_rate
                    FROM deliveries d
                    INNER JOIN customers c ON d.customer_id = c.id
                    WHERE d.account_id = $1
                      AND d.customer_id = $2
                      AND d.delivery_date >= $3
                      AND d.delivery_date <= $4
                    ORDER BY d.delivery_date ASC
                    "#,
                )
                .bind(account_id)
                .bind(customer_id)
                .bind(period_start)
                .bind(period_end)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT d.delivery_date,
                           d.quantity,
                           d.status,
                           d.rate_per_litre AS record_rate,
                           c.rate_per_litre AS customer_rate
                    FROM deliveries d
                    LEFT JOIN customers c ON d.customer_id = c.id
                    WHERE d.account_id = $1
                      AND d.delivery_date >= $2
                      AND d.delivery_date <= $3
                    ORDER BY d.delivery_date ASC
                    "#,
                )
                .bind(account_id)
                .bind(period_start)
                .bind(period_end)
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        rows.into_iter()
            .map(|row| {
                Ok(RatedDeliveryDBResponse {
                    delivery_date: row.delivery_date,
                    quantity: row.quantity,
                    status: parse_status(&row.status)?,
                    record_rate: row.record_rate,
                    customer_rate: row.customer_rate,
                })
            })
            .collect()
    }

    /// One-pass SQL aggregation over a single period tag.
    #[instrument(skip(self), err)]
    pub async fn month_aggregate(&mut self, account_id: AccountId, month_year: &str) -> Result<MonthAggregateDBResponse> {
        let row: MonthAggregateRow = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'delivered' THEN quantity ELSE 0 END), 0) AS total_litres,
                COUNT(CASE WHEN status = 'delivered' THEN 1 END) AS total_delivered_days,
                COUNT(CASE WHEN status = 'absent' THEN 1 END) AS total_absent_days,
                AVG(rate_per_litre) AS average_rate
            FROM deliveries
            WHERE account_id = $1 AND month_year = $2
            "#,
        )
        .bind(account_id)
        .bind(month_year)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(MonthAggregateDBResponse {
            total_litres: row.total_litres,
            total_delivered_days: row.total_delivered_days,
            total_absent_days: row.total_absent_days,
            average_rate: row.average_rate,
        })
    }

    /// Per-month trend rows for the analytics report, oldest month first.
    #[instrument(skip(self), err)]
    pub async fn month_trends(&mut self, account_id: AccountId) -> Result<Vec<MonthTrendDBResponse>> {
        let rows: Vec<MonthTrendRow> = sqlx::query_as(
            r#"
            SELECT
                month_year,
                COALESCE(SUM(CASE WHEN status = 'delivered' THEN quantity ELSE 0 END), 0) AS total_litres,
                COUNT(*) AS total_days,
                COUNT(CASE WHEN status = 'absent' THEN 1 END) AS absent_days,
                AVG(CASE WHEN status = 'delivered' THEN quantity ELSE 0 END) AS average_daily_delivery
            FROM deliveries
            WHERE account_id = $1
            GROUP BY month_year
            ORDER BY month_year ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MonthTrendDBResponse {
                month_year: row.month_year,
                total_litres: row.total_litres,
                total_days: row.total_days,
                absent_days: row.absent_days,
                average_daily_delivery: row.average_daily_delivery,
            })
            .collect())
    }

    /// Overall (row count, delivered litres) for one account.
    #[instrument(skip(self), err)]
    pub async fn overall_totals(&mut self, account_id: AccountId) -> Result<(i64, Decimal)> {
        let row: (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN status = 'delivered' THEN quantity ELSE 0 END), 0)
            FROM deliveries
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    /// Overwrite the record-level rate on every delivery of one period.
    /// Returns the number of rows touched.
    #[instrument(skip(self), err)]
    pub async fn set_month_rate(&mut self, account_id: AccountId, month_year: &str, rate_per_litre: Decimal) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE deliveries
            SET rate_per_litre = $3, updated_at = NOW()
            WHERE account_id = $1 AND month_year = $2
            "#,
        )
        .bind(account_id)
        .bind(month_year)
        .bind(rate_per_litre)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// All deliveries with customer name and contact joined in, newest first,
    /// in the column order the CSV export writes.
    #[instrument(skip(self), err)]
    pub async fn list_for_export(&mut self, account_id: AccountId) -> Result<Vec<ExportDeliveryRow>> {
        let rows: Vec<ExportDeliveryRow> = sqlx::query_as(
            r#"
            SELECT d.delivery_date,
                   c.name AS customer_name,
                   d.quantity,
                   d.status,
                   d.rate_per_litre,
                   d.month_year,
                   c.contact AS customer_contact
            FROM deliveries d
            LEFT JOIN customers c ON d.customer_id = c.id
            WHERE d.account_id = $1
            ORDER BY d.delivery_date DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }
}
