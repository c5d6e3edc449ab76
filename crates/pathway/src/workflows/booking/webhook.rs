//! Signed payment-processor callbacks.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac-sha256>`, where the MAC covers
//! `"{t}.{raw body}"`. Several `v1` entries may be present during secret rotation.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::payments::IntentStatus;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "payment-signature";
const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("signature header missing or malformed")]
    MalformedHeader,
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("unreadable event payload: {0}")]
    Payload(String),
}

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
    tolerance: Duration,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECONDS),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn mac(&self, timestamp: i64, body: &[u8]) -> Result<HmacSha256, WebhookError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| WebhookError::MalformedHeader)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }

    /// Produce a header value for `body`; used by tests and local tooling.
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> Result<String, WebhookError> {
        let signature = self.mac(timestamp, body)?.finalize().into_bytes();
        Ok(format!("t={timestamp},v1={}", hex::encode(signature)))
    }

    pub fn verify(
        &self,
        header: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), WebhookError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = value.parse::<i64>().ok();
                }
                Some(("v1", value)) => {
                    if let Ok(bytes) = hex::decode(value) {
                        signatures.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
        if signatures.is_empty() {
            return Err(WebhookError::MalformedHeader);
        }
        if now.timestamp().abs_diff(timestamp) > self.tolerance.num_seconds().unsigned_abs() {
            return Err(WebhookError::StaleTimestamp);
        }

        let matched = signatures.iter().any(|signature| {
            self.mac(timestamp, body)
                .map(|mac| mac.verify_slice(signature).is_ok())
                .unwrap_or(false)
        });
        if matched {
            Ok(())
        } else {
            Err(WebhookError::SignatureMismatch)
        }
    }
}

/// What a verified callback tells us about one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub event_type: String,
    pub payment_intent_id: String,
    pub outcome: Option<IntentStatus>,
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: EventObject,
}

#[derive(Debug, Deserialize)]
struct EventObject {
    id: String,
}

impl PaymentEvent {
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let envelope: EventEnvelope =
            serde_json::from_slice(body).map_err(|err| WebhookError::Payload(err.to_string()))?;

        let outcome = match envelope.event_type.as_str() {
            "payment_intent.succeeded" => Some(IntentStatus::Succeeded),
            "payment_intent.payment_failed" => Some(IntentStatus::Failed),
            "payment_intent.canceled" => Some(IntentStatus::Canceled),
            _ => None,
        };

        Ok(Self {
            event_type: envelope.event_type,
            payment_intent_id: envelope.data.object.id,
            outcome,
        })
    }
}
