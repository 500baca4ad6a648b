//! API models for monthly summaries and the analytics report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One month's aggregate for the calendar header.
///
/// `average_rate` here is the plain SQL average over record-level rates in
/// the month (absent/mixed rows included when they carry one), and
/// `total_bill` is `total_litres x average_rate` — a quick estimate, unlike
/// the per-record pricing the bill builder does.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlySummary {
    pub month_year: String,
    pub total_litres: Decimal,
    pub total_delivered_days: i64,
    pub total_absent_days: i64,
    pub average_rate: Decimal,
    pub total_bill: Decimal,
}

/// Payload for the bulk per-month rate overwrite
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MonthlyRateUpdate {
    pub rate_per_litre: Decimal,
}

/// Result of the bulk rate overwrite
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyRateUpdateResult {
    pub updated_deliveries: u64,
}

/// One month's row in the trend report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTrend {
    pub month_year: String,
    pub total_litres: Decimal,
    pub total_days: i64,
    pub absent_days: i64,
    pub average_daily_delivery: Decimal,
}

/// Whole-history analytics for one account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsReport {
    pub monthly_trends: Vec<MonthlyTrend>,
    pub total_deliveries: i64,
    pub total_litres: Decimal,
}
