//! OpenAPI documentation configuration.
//!
//! The rendered documentation is served at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::{handlers, models},
    billing,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::accounts::get_account,
        handlers::accounts::update_account,
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::deliveries::list_deliveries,
        handlers::deliveries::upsert_delivery,
        handlers::deliveries::delete_delivery,
        handlers::summary::get_monthly_summary,
        handlers::summary::update_monthly_rate,
        handlers::summary::get_analytics_report,
        handlers::bills::generate_bill,
        handlers::export::export_json,
        handlers::export::export_csv,
        handlers::export::import_json,
    ),
    components(schemas(
        models::accounts::AccountResponse,
        models::accounts::AccountUpdate,
        models::auth::RegisterRequest,
        models::auth::LoginRequest,
        models::auth::AuthData,
        models::customers::CustomerCreate,
        models::customers::CustomerUpdate,
        models::customers::CustomerResponse,
        models::deliveries::DeliveryStatus,
        models::deliveries::DeliveryUpsert,
        models::deliveries::DeliveryResponse,
        models::summary::MonthlySummary,
        models::summary::MonthlyRateUpdate,
        models::summary::MonthlyRateUpdateResult,
        models::summary::MonthlyTrend,
        models::summary::AnalyticsReport,
        models::bills::BillData,
        models::bills::BillAccount,
        models::bills::BillResponse,
        models::export::ExportData,
        models::export::ImportCustomer,
        models::export::ImportDelivery,
        models::export::ImportRequest,
        models::export::ImportOutcome,
        billing::LineItem,
        billing::AbsentDay,
        billing::PeriodSummary,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "account", description = "The authenticated tenant's profile"),
        (name = "customers", description = "Tenant-scoped customer CRUD"),
        (name = "deliveries", description = "Daily delivery records"),
        (name = "summary", description = "Monthly aggregates and analytics"),
        (name = "bill", description = "Period statement builder"),
        (name = "export", description = "Snapshot export and import"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
