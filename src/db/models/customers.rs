//! Database models for customers.

use crate::api::models::customers::{CustomerCreate, CustomerUpdate};
use crate::types::{AccountId, CustomerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a new customer
#[derive(Debug, Clone)]
pub struct CustomerCreateDBRequest {
    pub account_id: AccountId,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Decimal,
}

impl CustomerCreateDBRequest {
    pub fn new(account_id: AccountId, api: CustomerCreate) -> Self {
        Self {
            account_id,
            name: api.name,
            address: api.address,
            contact: api.contact,
            rate_per_litre: api.rate_per_litre,
        }
    }
}

/// Database request for updating a customer
#[derive(Debug, Clone)]
pub struct CustomerUpdateDBRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Option<Decimal>,
}

impl From<CustomerUpdate> for CustomerUpdateDBRequest {
    fn from(api: CustomerUpdate) -> Self {
        Self {
            name: api.name,
            address: api.address,
            contact: api.contact,
            rate_per_litre: api.rate_per_litre,
        }
    }
}

/// Database response for a customer
#[derive(Debug, Clone)]
pub struct CustomerDBResponse {
    pub id: CustomerId,
    pub account_id: AccountId,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub rate_per_litre: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
