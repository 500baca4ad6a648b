use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        accounts::CurrentAccount,
        deliveries::validate_month_tag,
        summary::{AnalyticsReport, MonthlyRateUpdate, MonthlyRateUpdateResult, MonthlySummary, MonthlyTrend},
    },
    db::handlers::Deliveries,
    errors::Error,
};

/// Aggregate one month of the account's records
#[utoipa::path(
    get,
    path = "/summary/{period}",
    tag = "summary",
    params(("period" = String, Path, description = "Period tag, YYYY-MM")),
    responses(
        (status = 200, description = "Monthly summary", body = MonthlySummary),
        (status = 400, description = "Invalid period tag"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(period): Path<String>,
) -> Result<Json<ApiResponse<MonthlySummary>>, Error> {
    validate_month_tag(&period).map_err(|message| Error::BadRequest { message })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Deliveries::new(&mut conn);

    let aggregate = repo.month_aggregate(account.id, &period).await?;
    // AVG() comes back with postgres' full numeric scale; 2 dp is plenty
    let average_rate = aggregate.average_rate.unwrap_or(Decimal::ZERO).round_dp(2);
    // A coarse estimate: litres x average record rate. The bill builder is
    // the authority for per-record pricing.
    let total_bill = (aggregate.total_litres * average_rate).round_dp(2);

    Ok(Json(ApiResponse::ok(MonthlySummary {
        month_year: period,
        total_litres: aggregate.total_litres,
        total_delivered_days: aggregate.total_delivered_days,
        total_absent_days: aggregate.total_absent_days,
        average_rate,
        total_bill,
    })))
}

/// Overwrite the record-level rate on every delivery of one month
#[utoipa::path(
    put,
    path = "/summary/{period}/rate",
    tag = "summary",
    request_body = MonthlyRateUpdate,
    params(("period" = String, Path, description = "Period tag, YYYY-MM")),
    responses(
        (status = 200, description = "Rate updated", body = MonthlyRateUpdateResult),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_monthly_rate(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(period): Path<String>,
    Json(update): Json<MonthlyRateUpdate>,
) -> Result<Json<ApiResponse<MonthlyRateUpdateResult>>, Error> {
    validate_month_tag(&period).map_err(|message| Error::BadRequest { message })?;
    if update.rate_per_litre < Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "rate_per_litre must be non-negative".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Deliveries::new(&mut conn);

    let updated = repo.set_month_rate(account.id, &period, update.rate_per_litre).await?;

    Ok(Json(ApiResponse::ok_with_message(
        MonthlyRateUpdateResult { updated_deliveries: updated },
        format!("Rate updated for {updated} deliveries"),
    )))
}

/// Whole-history trends and totals for the account
#[utoipa::path(
    get,
    path = "/summary/analytics/report",
    tag = "summary",
    responses(
        (status = 200, description = "Analytics report", body = AnalyticsReport),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_analytics_report(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<Json<ApiResponse<AnalyticsReport>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Deliveries::new(&mut conn);

    let trends = repo.month_trends(account.id).await?;
    let (total_deliveries, total_litres) = repo.overall_totals(account.id).await?;

    Ok(Json(ApiResponse::ok(AnalyticsReport {
        monthly_trends: trends
            .into_iter()
            .map(|t| MonthlyTrend {
                month_year: t.month_year,
                total_litres: t.total_litres,
                total_days: t.total_days,
                absent_days: t.absent_days,
                average_daily_delivery: t.average_daily_delivery.unwrap_or(Decimal::ZERO).round_dp(2),
            })
            .collect(),
        total_deliveries,
        total_litres,
    })))
}
