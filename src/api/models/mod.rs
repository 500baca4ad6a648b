//! API request and response data models.
//!
//! These structures define the public API contract. They are distinct from
//! the database models so storage and API representations can evolve
//! independently, and all of them carry `utoipa` annotations for the
//! generated documentation.

use serde::Serialize;
use utoipa::ToSchema;

pub mod accounts;
pub mod auth;
pub mod bills;
pub mod customers;
pub mod deliveries;
pub mod export;
pub mod summary;

/// The uniform response envelope every endpoint answers with.
///
/// Success responses set `success: true` with `data` and sometimes a
/// human-readable `message`; failures set `success: false` with `error`
/// (produced by the [`crate::errors::Error`] response path, not here).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success with a message but no payload (e.g. deletions).
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }
}
