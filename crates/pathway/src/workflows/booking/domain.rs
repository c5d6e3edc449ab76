use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::AssessmentId;
use crate::workflows::identity::UserId;

/// Identifier wrapper for booking rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookingId(pub String);

/// Payment state of a booking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Forward-only: `paid` is terminal and a failed intent may only be retried as pending.
    pub const fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Failed, PaymentStatus::Pending)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("payment status cannot move from {} to {}", .from.label(), .to.label())]
pub struct PaymentTransitionError {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

/// A visitor's purchase of one service, from payment through scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub service_type: String,
    pub amount_cents: u64,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub scheduling_event_id: Option<String>,
    pub assessment_id: Option<AssessmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn transition(
        &mut self,
        next: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), PaymentTransitionError> {
        if !self.payment_status.can_transition_to(next) {
            return Err(PaymentTransitionError {
                from: self.payment_status,
                to: next,
            });
        }
        self.payment_status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Record a processor-verified success for the booking's current intent.
    ///
    /// A decline marks the booking failed while the intent stays open at the processor,
    /// so a later success on that same intent reopens the booking before settling it.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<(), PaymentTransitionError> {
        if self.payment_status == PaymentStatus::Failed {
            self.transition(PaymentStatus::Pending, now)?;
        }
        self.transition(PaymentStatus::Paid, now)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn view(&self) -> BookingView {
        BookingView {
            booking_id: self.id.clone(),
            service_type: self.service_type.clone(),
            amount_cents: self.amount_cents,
            currency: self.currency.clone(),
            payment_status: self.payment_status.label(),
            scheduled_at: self.scheduled_at,
        }
    }
}

/// Booking fields safe to return to the booking's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingView {
    pub booking_id: BookingId,
    pub service_type: String,
    pub amount_cents: u64,
    pub currency: String,
    pub payment_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_only_move_forward() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Pending));
    }

    fn booking(status: PaymentStatus) -> Booking {
        let created = Utc::now();
        Booking {
            id: BookingId("bkg-000001".to_string()),
            user_id: UserId("user-ana".to_string()),
            service_type: "consultation-case-specific".to_string(),
            amount_cents: 25_000,
            currency: "CAD".to_string(),
            payment_status: status,
            payment_intent_id: Some("pi_1".to_string()),
            scheduled_at: None,
            scheduling_event_id: None,
            assessment_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn verified_success_settles_declined_booking() {
        let mut declined = booking(PaymentStatus::Failed);
        declined.mark_paid(Utc::now()).expect("declined intent can still settle");
        assert!(declined.is_paid());

        let mut pending = booking(PaymentStatus::Pending);
        pending.mark_paid(Utc::now()).expect("pending settles");
        assert!(pending.is_paid());

        let mut paid = booking(PaymentStatus::Paid);
        assert_eq!(
            paid.mark_paid(Utc::now()),
            Err(PaymentTransitionError {
                from: PaymentStatus::Paid,
                to: PaymentStatus::Paid,
            })
        );
    }
}
