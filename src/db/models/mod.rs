//! Database record models matching table schemas.
//!
//! Structs here correspond to database rows and to the request shapes the
//! repositories accept. They are distinct from the API models in
//! [`crate::api::models`] so storage and API representations can evolve
//! independently.

pub mod accounts;
pub mod customers;
pub mod deliveries;
