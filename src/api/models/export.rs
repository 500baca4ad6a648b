//! API models for snapshot export and reconciling import.

use crate::api::models::{accounts::AccountResponse, customers::CustomerResponse, deliveries::DeliveryResponse};
use crate::types::CustomerId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Full snapshot of one account's data, as returned by `GET /export/json`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExportData {
    pub account: AccountResponse,
    pub deliveries: Vec<DeliveryResponse>,
    pub customers: Vec<CustomerResponse>,
    pub exported_at: DateTime<Utc>,
}

/// One customer in an import payload.
///
/// Identity is the name within the importing account; ids from a foreign
/// system are ignored for customers.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportCustomer {
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Decimal,
}

/// One delivery in an import payload.
///
/// Deliberately loosely typed: each row is validated individually so one bad
/// row fails alone instead of aborting the batch. `customer_id` is only
/// meaningful when the payload came from a prior export of the same system.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportDelivery {
    pub customer_id: Option<CustomerId>,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    pub status: String,
    pub month_year: String,
    pub rate_per_litre: Option<Decimal>,
}

/// Import payload: `deliveries` is required, `customers` optional.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportRequest {
    pub customers: Option<Vec<ImportCustomer>>,
    pub deliveries: Option<Vec<ImportDelivery>>,
}

/// Per-entity counters for a completed import
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImportOutcome {
    pub imported: u32,
    pub updated: u32,
    pub errors: u32,
}
