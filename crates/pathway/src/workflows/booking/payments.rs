use serde::{Deserialize, Serialize};

/// Intent created at the processor; the client secret lets the browser collect card details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount_cents: u64,
    pub currency: String,
    pub status: IntentStatus,
}

/// Processor-side lifecycle of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

impl IntentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Failed => "failed",
        }
    }

    /// The intent can still collect or is collecting money.
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            IntentStatus::RequiresPaymentMethod
                | IntentStatus::RequiresConfirmation
                | IntentStatus::RequiresAction
                | IntentStatus::Processing
        )
    }
}

/// Result the browser reports after running the processor's confirm step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_intent_id: String,
    pub status: IntentStatus,
}

/// Boundary to the external payment processor.
pub trait PaymentProcessor: Send + Sync {
    fn create_intent(&self, amount_cents: u64, currency: &str)
        -> Result<PaymentIntent, PaymentError>;
    /// Authoritative state of an intent, used to check what a client claims and to
    /// resume an intent that is still open.
    fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment intent {0} is unknown to the processor")]
    UnknownIntent(String),
    #[error("payment rejected: {0}")]
    Rejected(String),
    #[error("payment processor unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unsettled_intents_are_open() {
        assert!(IntentStatus::RequiresPaymentMethod.is_open());
        assert!(IntentStatus::RequiresAction.is_open());
        assert!(IntentStatus::Processing.is_open());
        assert!(!IntentStatus::Succeeded.is_open());
        assert!(!IntentStatus::Canceled.is_open());
        assert!(!IntentStatus::Failed.is_open());
    }
}
