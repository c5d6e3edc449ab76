//! Who is calling: user identifiers, bearer-token resolution and stored profiles.
//!
//! Sign-in itself happens at a federated provider. This module only turns the resulting
//! session token back into a [`CurrentUser`].

pub mod profile;
pub mod session;

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

pub use profile::{Profile, ProfileRepository};
pub use session::{SessionError, SignedSessionProvider};

/// Identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Boundary to the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the token does not identify anyone (expired, forged, revoked).
    fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, IdentityError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller from request headers; a missing token is simply "signed out".
pub fn resolve_caller<I>(
    provider: &I,
    headers: &HeaderMap,
) -> Result<Option<CurrentUser>, IdentityError>
where
    I: IdentityProvider + ?Sized,
{
    match bearer_token(headers) {
        Some(token) => provider.resolve(token),
        None => Ok(None),
    }
}
