//! API models for delivery records.

use crate::{
    db::models::deliveries::{DeliveryDBResponse, DeliveryWithCustomerDBResponse},
    types::{CustomerId, DeliveryId},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// What happened on one calendar date for one customer identity.
///
/// Only `delivered` and `absent` participate in billing counters; `mixed`
/// and `no_entry` are recorded but informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Absent,
    Mixed,
    NoEntry,
}

impl DeliveryStatus {
    /// The stored (and wire) spelling; matches the status CHECK constraint.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Absent => "absent",
            DeliveryStatus::Mixed => "mixed",
            DeliveryStatus::NoEntry => "no_entry",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivered" => Ok(DeliveryStatus::Delivered),
            "absent" => Ok(DeliveryStatus::Absent),
            "mixed" => Ok(DeliveryStatus::Mixed),
            "no_entry" => Ok(DeliveryStatus::NoEntry),
            other => Err(anyhow::anyhow!("unknown delivery status: {other}")),
        }
    }
}

/// Check a period tag is a real `YYYY-MM` month.
pub fn validate_month_tag(tag: &str) -> Result<(), String> {
    let valid = tag.len() == 7 && NaiveDate::parse_from_str(&format!("{tag}-01"), "%Y-%m-%d").is_ok();
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid month tag '{tag}', expected YYYY-MM"))
    }
}

/// Payload for the create-or-overwrite protocol
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeliveryUpsert {
    pub customer_id: Option<CustomerId>,
    pub delivery_date: NaiveDate,
    /// Litres delivered; defaults to zero for non-delivered statuses
    #[serde(default)]
    pub quantity: Option<Decimal>,
    pub status: DeliveryStatus,
    pub month_year: String,
    pub rate_per_litre: Option<Decimal>,
}

/// Query parameters for listing deliveries
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListDeliveriesQuery {
    /// Restrict the listing to one `YYYY-MM` period
    pub month_year: Option<String>,
}

/// Public view of a delivery record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryResponse {
    pub id: DeliveryId,
    pub customer_id: Option<CustomerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub delivery_date: NaiveDate,
    pub quantity: Decimal,
    pub status: DeliveryStatus,
    pub month_year: String,
    pub rate_per_litre: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeliveryDBResponse> for DeliveryResponse {
    fn from(db: DeliveryDBResponse) -> Self {
        Self {
            id: db.id,
            customer_id: db.customer_id,
            customer_name: None,
            delivery_date: db.delivery_date,
            quantity: db.quantity,
            status: db.status,
            month_year: db.month_year,
            rate_per_litre: db.rate_per_litre,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<DeliveryWithCustomerDBResponse> for DeliveryResponse {
    fn from(db: DeliveryWithCustomerDBResponse) -> Self {
        let mut response = Self::from(db.delivery);
        response.customer_name = db.customer_name;
        response
    }
}
