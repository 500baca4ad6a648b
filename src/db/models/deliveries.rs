//! Database models for delivery records.

use crate::api::models::deliveries::DeliveryStatus;
use crate::types::{AccountId, CustomerId, DeliveryId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Database request for the create-or-overwrite path.
///
/// The identity key is (account_id, delivery_date, customer_id-or-none);
/// everything else is a mutable field that the upsert overwrites.
#[derive(Debug, Clone)]
pub struct DeliveryUpsertDBRequest {
    pub account_id: AccountId,
    pub customer_id: Option<CustomerId>,
    pub delivery_date: NaiveDate,
    pub quantity: Decimal,
    pub status: DeliveryStatus,
    pub month_year: String,
    pub rate_per_litre: Option<Decimal>,
}

/// Database response for a delivery record
#[derive(Debug, Clone)]
pub struct DeliveryDBResponse {
    pub id: DeliveryId,
    pub account_id: AccountId,
    pub customer_id: Option<CustomerId>,
    pub delivery_date: NaiveDate,
    pub quantity: Decimal,
    pub status: DeliveryStatus,
    pub month_year: String,
    pub rate_per_litre: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Delivery row joined with the customer's display name, for listings
#[derive(Debug, Clone)]
pub struct DeliveryWithCustomerDBResponse {
    pub delivery: DeliveryDBResponse,
    pub customer_name: Option<String>,
}

/// One delivery joined with the rates needed to price it: the record-level
/// override and the owning customer's current default. Input to the billing
/// engine.
#[derive(Debug, Clone)]
pub struct RatedDeliveryDBResponse {
    pub delivery_date: NaiveDate,
    pub quantity: Decimal,
    pub status: DeliveryStatus,
    pub record_rate: Option<Decimal>,
    pub customer_rate: Option<Decimal>,
}

/// Aggregated figures for one month of one account
#[derive(Debug, Clone)]
pub struct MonthAggregateDBResponse {
    pub total_litres: Decimal,
    pub total_delivered_days: i64,
    pub total_absent_days: i64,
    pub average_rate: Option<Decimal>,
}

/// One month's row in the per-account trend report
#[derive(Debug, Clone)]
pub struct MonthTrendDBResponse {
    pub month_year: String,
    pub total_litres: Decimal,
    pub total_days: i64,
    pub absent_days: i64,
    pub average_daily_delivery: Option<Decimal>,
}
