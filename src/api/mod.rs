//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/auth/*`): registration and login, issuing bearer
//!   tokens
//! - **Account** (`/account`): the authenticated tenant's own profile
//! - **Customers** (`/customers/*`): tenant-scoped counterparty CRUD
//! - **Deliveries** (`/deliveries/*`): the daily record upsert protocol
//! - **Summary** (`/summary/*`): monthly aggregates, bulk rate overwrite,
//!   and the analytics report
//! - **Bill** (`/bill`): the period statement builder
//! - **Export** (`/export/*`): JSON/CSV snapshot export and reconciling
//!   import
//!
//! Every JSON response uses the uniform envelope
//! `{"success": bool, "data"?, "message"?, "error"?}` — see
//! [`models::ApiResponse`] and the error path in [`crate::errors`].
//!
//! # OpenAPI Documentation
//!
//! All endpoints carry `utoipa` annotations; the rendered documentation is
//! served at `/docs`.

pub mod handlers;
pub mod models;
