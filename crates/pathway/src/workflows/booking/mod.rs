//! Paid consultation booking: catalog, four-stage gate, payment and scheduling.

pub mod catalog;
pub mod domain;
pub mod gate;
pub mod payments;
pub mod repository;
pub mod router;
pub mod service;
pub mod webhook;

#[cfg(test)]
mod tests;

pub use catalog::{ServiceCatalog, ServiceOffering};
pub use domain::{Booking, BookingId, BookingView, PaymentStatus, PaymentTransitionError};
pub use gate::{
    derive_stage, Fact, FactKind, GateBlock, GateFacts, GateOutcome, GateStage, NextAction,
    PaymentFact, PaymentPhase,
};
pub use payments::{
    IntentStatus, PaymentConfirmation, PaymentError, PaymentIntent, PaymentProcessor,
};
pub use repository::BookingRepository;
pub use router::{booking_router, BookingRouterState};
pub use service::{
    BookingService, BookingServiceError, GateReport, PaymentSession, ScheduleConfirmation,
    SchedulerPrefill,
};
pub use webhook::{PaymentEvent, WebhookError, WebhookVerifier, SIGNATURE_HEADER};
