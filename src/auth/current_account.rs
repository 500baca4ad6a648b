//! Extractor for the authenticated tenant account.

use crate::{AppState, api::models::accounts::CurrentAccount, auth::session, errors::Error};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::trace;

/// Pull the bearer token out of the Authorization header, if any.
///
/// Returns:
/// - `None`: no Authorization header, or not a Bearer scheme
/// - `Some(Err(error))`: header present but not valid UTF-8
/// - `Some(Ok(token))`: the raw token
fn bearer_token(parts: &Parts) -> Option<Result<&str, Error>> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let value = match header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    value.strip_prefix("Bearer ").map(Ok)
}

impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = Error;

    /// Authenticate the request from its bearer token.
    ///
    /// Sessions are stateless JWTs, so no database round-trip happens here;
    /// handlers scope every query by the extracted account id, which is the
    /// tenant isolation boundary.
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts) {
            Some(Ok(token)) => token,
            Some(Err(e)) => return Err(e),
            None => {
                return Err(Error::Unauthenticated {
                    message: Some("Unauthorized".to_string()),
                });
            }
        };

        let account = session::verify_session_token(token, &state.config)?;
        trace!("Authenticated account: {}", account.handle);
        Ok(account)
    }
}
