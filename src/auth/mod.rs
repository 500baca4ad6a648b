//! Authentication for the management API.
//!
//! Two pieces:
//!
//! - **Credentials**: passwords hashed with Argon2id ([`password`]); hashes
//!   live on the account row and are never serialized outward.
//! - **Sessions**: stateless JWT bearer tokens ([`session`]) carrying the
//!   account id and handle, signed with the configured secret key. Handlers
//!   receive the authenticated tenant via the [`current_account`] extractor;
//!   a missing or invalid token is rejected before any handler logic runs.
//!
//! There is no server-side session store — each request is authenticated
//! independently from its bearer token.

pub mod current_account;
pub mod password;
pub mod session;
