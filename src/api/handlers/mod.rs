//! Axum route handlers.
//!
//! Handlers validate at the boundary, borrow a pooled connection, delegate to
//! the repositories in [`crate::db::handlers`], and wrap results in the
//! uniform envelope. Constraint violations bubble up as
//! [`crate::errors::Error`] and become 409/400 responses rather than 500s.

pub mod accounts;
pub mod auth;
pub mod bills;
pub mod customers;
pub mod deliveries;
pub mod export;
pub mod summary;
