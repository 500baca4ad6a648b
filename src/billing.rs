//! Rate resolution and period aggregation.
//!
//! Turns raw delivery rows (status, quantity, optional record-level rate,
//! optional customer default rate) into priced line items and a period
//! summary. Pure and deterministic: no I/O, no clock, no randomness — the
//! natural unit-test target for the billing rules.
//!
//! # Rate resolution
//!
//! Strict precedence per record:
//!
//! 1. the record's own rate, when present (a zero override is still an
//!    override);
//! 2. the customer's current default rate, when the record has a customer;
//! 3. zero.
//!
//! # Status handling
//!
//! `delivered` records are priced and counted; `absent` records are listed
//! and counted separately with no amount. `mixed` and `no_entry` records are
//! carried in the input but contribute to no totals. Zero-rate delivered
//! records count toward days and litres but are left out of the average rate
//! so they cannot drag it toward zero.

use crate::{api::models::deliveries::DeliveryStatus, db::models::deliveries::RatedDeliveryDBResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One priced delivered day on a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub status: DeliveryStatus,
}

/// One recorded absence on a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AbsentDay {
    pub date: NaiveDate,
}

/// Totals for a statement period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PeriodSummary {
    pub total_litres: Decimal,
    pub total_delivered_days: i64,
    pub total_absent_days: i64,
    pub average_rate: Decimal,
    pub total_amount: Decimal,
}

/// Line items, absences, and totals for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PeriodStatement {
    pub deliveries: Vec<LineItem>,
    pub absent_days: Vec<AbsentDay>,
    pub summary: PeriodSummary,
}

/// Resolve the rate a record is priced at: record override, else customer
/// default, else zero.
pub fn effective_rate(record_rate: Option<Decimal>, customer_rate: Option<Decimal>) -> Decimal {
    record_rate.or(customer_rate).unwrap_or(Decimal::ZERO)
}

/// Build a statement from resolved rows in one pass.
///
/// Rows are consumed in input order; callers wanting date-ordered line items
/// pass date-ordered rows.
pub fn build_statement(rows: &[RatedDeliveryDBResponse]) -> PeriodStatement {
    let mut deliveries = Vec::new();
    let mut absent_days = Vec::new();
    let mut total_litres = Decimal::ZERO;
    let mut total_amount = Decimal::ZERO;
    let mut delivered_days = 0i64;
    let mut rate_sum = Decimal::ZERO;
    let mut rate_count = 0i64;

    for row in rows {
        match row.status {
            DeliveryStatus::Delivered => {
                let rate = effective_rate(row.record_rate, row.customer_rate);
                let amount = row.quantity * rate;

                deliveries.push(LineItem {
                    date: row.delivery_date,
                    quantity: row.quantity,
                    rate,
                    amount,
                    status: row.status,
                });

                total_litres += row.quantity;
                total_amount += amount;
                delivered_days += 1;

                if rate > Decimal::ZERO {
                    rate_sum += rate;
                    rate_count += 1;
                }
            }
            DeliveryStatus::Absent => {
                absent_days.push(AbsentDay { date: row.delivery_date });
            }
            // Informational only; no counter wants these.
            DeliveryStatus::Mixed | DeliveryStatus::NoEntry => {}
        }
    }

    let average_rate = if rate_count > 0 {
        rate_sum / Decimal::from(rate_count)
    } else {
        Decimal::ZERO
    };

    PeriodStatement {
        summary: PeriodSummary {
            total_litres,
            total_delivered_days: delivered_days,
            total_absent_days: absent_days.len() as i64,
            average_rate,
            total_amount,
        },
        deliveries,
        absent_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        day: u32,
        status: DeliveryStatus,
        quantity: i64,
        record_rate: Option<i64>,
        customer_rate: Option<i64>,
    ) -> RatedDeliveryDBResponse {
        RatedDeliveryDBResponse {
            delivery_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            quantity: Decimal::new(quantity, 0),
            status,
            record_rate: record_rate.map(|r| Decimal::new(r, 0)),
            customer_rate: customer_rate.map(|r| Decimal::new(r, 0)),
        }
    }

    #[test]
    fn test_rate_precedence() {
        // Override beats the customer default
        assert_eq!(
            effective_rate(Some(Decimal::new(60, 0)), Some(Decimal::new(50, 0))),
            Decimal::new(60, 0)
        );
        // No override falls back to the customer default
        assert_eq!(effective_rate(None, Some(Decimal::new(50, 0))), Decimal::new(50, 0));
        // No customer either: zero
        assert_eq!(effective_rate(None, None), Decimal::ZERO);
        // A zero override is still an override
        assert_eq!(effective_rate(Some(Decimal::ZERO), Some(Decimal::new(50, 0))), Decimal::ZERO);
    }

    #[test]
    fn test_statement_worked_example() {
        // delivered 2L@50, delivered 3L@60, absent, mixed
        let rows = vec![
            row(1, DeliveryStatus::Delivered, 2, None, Some(50)),
            row(2, DeliveryStatus::Delivered, 3, Some(60), Some(50)),
            row(3, DeliveryStatus::Absent, 0, None, Some(50)),
            row(4, DeliveryStatus::Mixed, 1, None, Some(50)),
        ];

        let statement = build_statement(&rows);

        assert_eq!(statement.summary.total_litres, Decimal::new(5, 0));
        assert_eq!(statement.summary.total_delivered_days, 2);
        assert_eq!(statement.summary.total_absent_days, 1);
        assert_eq!(statement.summary.total_amount, Decimal::new(280, 0)); // 2*50 + 3*60
        assert_eq!(statement.summary.average_rate, Decimal::new(55, 0)); // (50 + 60) / 2

        assert_eq!(statement.deliveries.len(), 2);
        assert_eq!(statement.deliveries[0].amount, Decimal::new(100, 0));
        assert_eq!(statement.deliveries[1].amount, Decimal::new(180, 0));
        assert_eq!(statement.absent_days, vec![AbsentDay {
            date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
        }]);
    }

    #[test]
    fn test_zero_rate_excluded_from_average_but_not_counts() {
        let rows = vec![
            row(1, DeliveryStatus::Delivered, 2, None, Some(50)),
            // Customer-less record resolves to rate 0
            row(2, DeliveryStatus::Delivered, 4, None, None),
        ];

        let statement = build_statement(&rows);

        assert_eq!(statement.summary.total_delivered_days, 2);
        assert_eq!(statement.summary.total_litres, Decimal::new(6, 0));
        // Only the rated record participates in the average
        assert_eq!(statement.summary.average_rate, Decimal::new(50, 0));
        assert_eq!(statement.summary.total_amount, Decimal::new(100, 0));
    }

    #[test]
    fn test_mixed_and_no_entry_touch_no_counters() {
        let rows = vec![
            row(1, DeliveryStatus::Mixed, 3, Some(60), None),
            row(2, DeliveryStatus::NoEntry, 0, None, None),
        ];

        let statement = build_statement(&rows);

        assert!(statement.deliveries.is_empty());
        assert!(statement.absent_days.is_empty());
        assert_eq!(statement.summary.total_delivered_days, 0);
        assert_eq!(statement.summary.total_absent_days, 0);
        assert_eq!(statement.summary.total_litres, Decimal::ZERO);
        assert_eq!(statement.summary.total_amount, Decimal::ZERO);
        assert_eq!(statement.summary.average_rate, Decimal::ZERO);
    }

    #[test]
    fn test_empty_input_yields_zeroed_summary() {
        let statement = build_statement(&[]);
        assert_eq!(statement.summary, PeriodSummary {
            total_litres: Decimal::ZERO,
            total_delivered_days: 0,
            total_absent_days: 0,
            average_rate: Decimal::ZERO,
            total_amount: Decimal::ZERO,
        });
    }

    #[test]
    fn test_fractional_quantities_and_rates() {
        let rows = vec![
            row(1, DeliveryStatus::Delivered, 0, None, Some(50)), // 0L day still delivered
            RatedDeliveryDBResponse {
                delivery_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                quantity: Decimal::new(15, 1), // 1.5 L
                status: DeliveryStatus::Delivered,
                record_rate: Some(Decimal::new(5250, 2)), // 52.50
                customer_rate: None,
            },
        ];

        let statement = build_statement(&rows);

        assert_eq!(statement.summary.total_delivered_days, 2);
        assert_eq!(statement.summary.total_litres, Decimal::new(15, 1));
        assert_eq!(statement.summary.total_amount, Decimal::new(78_7500, 4)); // 1.5 * 52.50
    }
}
