//! API models for the period statement (bill) builder.

use crate::billing::{AbsentDay, LineItem, PeriodSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Label used when a bill spans every customer (or an unknown one).
pub const ALL_CUSTOMERS_LABEL: &str = "All Customers";

/// Query parameters for the bill builder.
///
/// `customer_id` is either a customer id or the literal `all` (absent means
/// `all` too).
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct BillQuery {
    pub customer_id: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

/// An invoice-ready statement for one period
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BillData {
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub customer_contact: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub deliveries: Vec<LineItem>,
    pub absent_days: Vec<AbsentDay>,
    pub summary: PeriodSummary,
}

/// The issuing account's letterhead details
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BillAccount {
    pub name: String,
    pub address: String,
}

/// Bill plus the issuing account, as returned by `GET /bill`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BillResponse {
    pub bill: BillData,
    pub account: BillAccount,
}
