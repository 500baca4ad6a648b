//! API models for customers.

use crate::{db::models::customers::CustomerDBResponse, types::CustomerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payload for creating a customer
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomerCreate {
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Decimal,
}

/// Payload for editing a customer; absent fields are left unchanged
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Option<Decimal>,
}

/// Public view of a customer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerDBResponse> for CustomerResponse {
    fn from(db: CustomerDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            address: db.address,
            contact: db.contact,
            rate_per_litre: db.rate_per_litre,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
