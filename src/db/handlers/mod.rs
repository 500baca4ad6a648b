//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection`, provides strongly-typed
//! operations for one table, and returns models from [`crate::db::models`].
//! Constraint violations surface as [`crate::db::errors::DbError`] variants
//! that the API layer translates into HTTP statuses.
//!
//! # Available Repositories
//!
//! - [`Accounts`]: tenant account management and authentication lookups
//! - [`Customers`]: billing counterparties (implements [`Repository`])
//! - [`Deliveries`]: delivery records, the upsert protocol, and the
//!   period/aggregate queries behind bills and summaries

pub mod accounts;
pub mod customers;
pub mod deliveries;
pub mod repository;

pub use accounts::Accounts;
pub use customers::Customers;
pub use deliveries::Deliveries;
pub use repository::Repository;
