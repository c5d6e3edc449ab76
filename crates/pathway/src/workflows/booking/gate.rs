//! Four-stage booking gate.
//!
//! The active stage is a pure function of three observed facts. Nothing here remembers a
//! previous stage: callers refresh the facts after every mutation and derive again, so a
//! reload, a second tab or a back-navigation always lands on the stage persisted data
//! supports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Booking, PaymentStatus};

/// An input to the gate as observed at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Fact<T> {
    /// Not loaded yet. Distinct from `false`.
    Unknown,
    /// The lookup failed; the reason is surfaced, never guessed around.
    Unavailable(String),
    Known(T),
}

impl<T> Fact<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Fact::Known(value),
            Err(err) => Fact::Unavailable(err.to_string()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fact<U> {
        match self {
            Fact::Unknown => Fact::Unknown,
            Fact::Unavailable(reason) => Fact::Unavailable(reason),
            Fact::Known(value) => Fact::Known(f(value)),
        }
    }
}

/// Payment progress for the requested service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentFact {
    None,
    /// A booking exists but is not paid; `session_open` when an intent is awaiting confirmation.
    Pending { session_open: bool },
    Paid { scheduled_at: Option<DateTime<Utc>> },
}

impl PaymentFact {
    /// A failed intent reads as pending without an open session: the visitor pays again.
    pub fn from_booking(booking: Option<&Booking>) -> Self {
        match booking {
            None => PaymentFact::None,
            Some(booking) => match booking.payment_status {
                PaymentStatus::Paid => PaymentFact::Paid {
                    scheduled_at: booking.scheduled_at,
                },
                PaymentStatus::Pending => PaymentFact::Pending {
                    session_open: booking.payment_intent_id.is_some(),
                },
                PaymentStatus::Failed => PaymentFact::Pending {
                    session_open: false,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateFacts {
    pub authenticated: Fact<bool>,
    pub has_assessment: Fact<bool>,
    pub payment: Fact<PaymentFact>,
}

impl GateFacts {
    pub fn unknown() -> Self {
        Self {
            authenticated: Fact::Unknown,
            has_assessment: Fact::Unknown,
            payment: Fact::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPhase {
    Uninitiated,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum GateStage {
    AwaitingAuth,
    AwaitingAssessment,
    AwaitingPayment { phase: PaymentPhase },
    AwaitingSchedule { scheduled_at: Option<DateTime<Utc>> },
}

impl GateStage {
    /// 1-based position in the flow, for step indicators.
    pub const fn step(&self) -> u8 {
        match self {
            GateStage::AwaitingAuth => 1,
            GateStage::AwaitingAssessment => 2,
            GateStage::AwaitingPayment { .. } => 3,
            GateStage::AwaitingSchedule { .. } => 4,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            GateStage::AwaitingAuth => "awaiting_auth",
            GateStage::AwaitingAssessment => "awaiting_assessment",
            GateStage::AwaitingPayment { .. } => "awaiting_payment",
            GateStage::AwaitingSchedule { .. } => "awaiting_schedule",
        }
    }

    /// The one action the visitor can take from this stage.
    pub const fn next_action(&self) -> NextAction {
        match self {
            GateStage::AwaitingAuth => NextAction::SignIn,
            GateStage::AwaitingAssessment => NextAction::StartAssessment,
            GateStage::AwaitingPayment {
                phase: PaymentPhase::Uninitiated,
            } => NextAction::StartPayment,
            GateStage::AwaitingPayment {
                phase: PaymentPhase::InProgress,
            } => NextAction::ConfirmPayment,
            GateStage::AwaitingSchedule { .. } => NextAction::OpenScheduler,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    SignIn,
    StartAssessment,
    StartPayment,
    ConfirmPayment,
    OpenScheduler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Authentication,
    Assessment,
    Payment,
}

impl FactKind {
    pub const fn label(self) -> &'static str {
        match self {
            FactKind::Authentication => "authentication",
            FactKind::Assessment => "assessment",
            FactKind::Payment => "payment",
        }
    }
}

/// Why no stage could be derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GateBlock {
    Loading { fact: FactKind },
    Error { fact: FactKind, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    Ready(GateStage),
    Blocked(GateBlock),
}

impl GateOutcome {
    pub fn stage(&self) -> Option<&GateStage> {
        match self {
            GateOutcome::Ready(stage) => Some(stage),
            GateOutcome::Blocked(_) => None,
        }
    }
}

fn require<T: Clone>(fact: &Fact<T>, kind: FactKind) -> Result<T, GateBlock> {
    match fact {
        Fact::Unknown => Err(GateBlock::Loading { fact: kind }),
        Fact::Unavailable(detail) => Err(GateBlock::Error {
            fact: kind,
            detail: detail.clone(),
        }),
        Fact::Known(value) => Ok(value.clone()),
    }
}

/// Facts are consulted in stage order; a later fact only matters once every earlier gate
/// is satisfied, so signing out always wins over assessment or payment state.
pub fn derive_stage(facts: &GateFacts) -> GateOutcome {
    match derive(facts) {
        Ok(stage) => GateOutcome::Ready(stage),
        Err(block) => GateOutcome::Blocked(block),
    }
}

fn derive(facts: &GateFacts) -> Result<GateStage, GateBlock> {
    if !require(&facts.authenticated, FactKind::Authentication)? {
        return Ok(GateStage::AwaitingAuth);
    }
    if !require(&facts.has_assessment, FactKind::Assessment)? {
        return Ok(GateStage::AwaitingAssessment);
    }

    let stage = match require(&facts.payment, FactKind::Payment)? {
        PaymentFact::None => GateStage::AwaitingPayment {
            phase: PaymentPhase::Uninitiated,
        },
        PaymentFact::Pending { session_open } => GateStage::AwaitingPayment {
            phase: if session_open {
                PaymentPhase::InProgress
            } else {
                PaymentPhase::Uninitiated
            },
        },
        PaymentFact::Paid { scheduled_at } => GateStage::AwaitingSchedule { scheduled_at },
    };
    Ok(stage)
}
