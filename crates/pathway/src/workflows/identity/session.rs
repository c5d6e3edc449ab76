use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{CurrentUser, IdentityError, IdentityProvider, UserId};

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_SESSION_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("session expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    exp: i64,
}

/// HMAC-SHA256 signed session tokens: `base64url(claims).base64url(mac)`.
#[derive(Clone)]
pub struct SignedSessionProvider {
    key: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for SignedSessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedSessionProvider")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SignedSessionProvider {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
            ttl: Duration::hours(DEFAULT_SESSION_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.key).map_err(|_| SessionError::Invalid)
    }

    pub fn issue(&self, user: &CurrentUser, now: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = SessionClaims {
            sub: user.id.0.clone(),
            email: user.email.clone(),
            name: user.full_name.clone(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| SessionError::Invalid)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<CurrentUser, SessionError> {
        let (payload_part, signature_part) =
            token.split_once('.').ok_or(SessionError::Invalid)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| SessionError::Invalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_part)
            .map_err(|_| SessionError::Invalid)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::Signature)?;

        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| SessionError::Invalid)?;
        if now.timestamp() > claims.exp {
            return Err(SessionError::Expired);
        }

        Ok(CurrentUser {
            id: UserId(claims.sub),
            email: claims.email,
            full_name: claims.name,
        })
    }
}

impl IdentityProvider for SignedSessionProvider {
    fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, IdentityError> {
        match self.verify(token, Utc::now()) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::debug!(error = %err, "rejected session token");
                Ok(None)
            }
        }
    }
}
