//! Common type definitions.
//!
//! All entity IDs are `SERIAL` columns wrapped in type aliases for readability:
//!
//! - [`AccountId`]: tenant account identifier
//! - [`CustomerId`]: billing counterparty identifier
//! - [`DeliveryId`]: delivery record identifier

// Type aliases for IDs
pub type AccountId = i32;
pub type CustomerId = i32;
pub type DeliveryId = i32;
