use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::{ServiceCatalog, ServiceOffering};
use super::domain::{Booking, BookingId, BookingView, PaymentStatus, PaymentTransitionError};
use super::gate::{derive_stage, Fact, GateFacts, GateOutcome, GateStage, NextAction, PaymentFact};
use super::payments::{
    IntentStatus, PaymentConfirmation, PaymentError, PaymentIntent, PaymentProcessor,
};
use super::repository::BookingRepository;
use super::webhook::PaymentEvent;
use crate::workflows::eligibility::{AssessmentId, AssessmentRepository};
use crate::workflows::identity::{CurrentUser, IdentityError};
use crate::workflows::repository::{IdSequence, RepositoryError};

static BOOKING_SEQUENCE: IdSequence = IdSequence::new("bkg");

/// Drives a visitor from sign-in to a scheduled consultation.
///
/// Every mutation is followed by a fresh read of the persisted rows and a new gate
/// derivation; callers only ever see the stage the stored data supports.
pub struct BookingService<A, B, P> {
    catalog: ServiceCatalog,
    currency: String,
    assessments: Arc<A>,
    bookings: Arc<B>,
    payments: Arc<P>,
}

impl<A, B, P> BookingService<A, B, P>
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    pub fn new(
        catalog: ServiceCatalog,
        currency: impl Into<String>,
        assessments: Arc<A>,
        bookings: Arc<B>,
        payments: Arc<P>,
    ) -> Self {
        Self {
            catalog,
            currency: currency.into(),
            assessments,
            bookings,
            payments,
        }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Re-read everything the gate depends on. Facts that cannot matter yet stay `Unknown`.
    pub fn refresh_facts(
        &self,
        caller: &Result<Option<CurrentUser>, IdentityError>,
        offering: &ServiceOffering,
    ) -> (GateFacts, Option<Booking>) {
        let user = match caller {
            Err(err) => {
                let mut facts = GateFacts::unknown();
                facts.authenticated = Fact::Unavailable(err.to_string());
                return (facts, None);
            }
            Ok(None) => {
                let mut facts = GateFacts::unknown();
                facts.authenticated = Fact::Known(false);
                return (facts, None);
            }
            Ok(Some(user)) => user,
        };

        let has_assessment = Fact::from_result(
            self.assessments
                .latest_for_user(&user.id)
                .map(|record| record.is_some()),
        );

        let booking = self.bookings.latest_for(&user.id, &offering.slug);
        let payment = Fact::from_result(
            booking
                .as_ref()
                .map(|row| PaymentFact::from_booking(row.as_ref())),
        );

        let facts = GateFacts {
            authenticated: Fact::Known(true),
            has_assessment,
            payment,
        };
        (facts, booking.ok().flatten())
    }

    /// Derive the current stage for `raw_service` from freshly loaded facts.
    pub fn gate(
        &self,
        caller: &Result<Option<CurrentUser>, IdentityError>,
        raw_service: &str,
    ) -> GateReport {
        let offering = self.catalog.resolve(Some(raw_service));
        self.report(caller, offering)
    }

    fn report(
        &self,
        caller: &Result<Option<CurrentUser>, IdentityError>,
        offering: &ServiceOffering,
    ) -> GateReport {
        let (facts, booking) = self.refresh_facts(caller, offering);
        let outcome = derive_stage(&facts);

        let scheduler = match (outcome.stage(), caller) {
            (Some(GateStage::AwaitingSchedule { .. }), Ok(Some(user))) => Some(SchedulerPrefill {
                url: offering.scheduling_url.clone(),
                email: user.email.clone(),
                name: user.full_name.clone(),
            }),
            _ => None,
        };

        debug!(
            service = %offering.slug,
            stage = outcome.stage().map(GateStage::label).unwrap_or("blocked"),
            "gate derived"
        );

        GateReport {
            service: offering.clone(),
            next_action: outcome.stage().map(GateStage::next_action),
            return_to: format!("/book/{}", offering.slug),
            facts,
            outcome,
            booking: booking.as_ref().map(Booking::view),
            scheduler,
        }
    }

    /// Open a payment session, creating the pending booking on first use.
    ///
    /// An intent the processor still considers open is handed back instead of a new one,
    /// so a second tab or a retry after a decline pays against the same intent. A fresh
    /// intent is only created when there is none or the previous one is closed. The booking
    /// is persisted without an intent id before the processor is called, so a processor
    /// failure leaves the visitor at the start of the payment stage.
    pub fn start_payment(
        &self,
        user: &CurrentUser,
        raw_service: &str,
    ) -> Result<PaymentSession, BookingServiceError> {
        let offering = self.catalog.resolve(Some(raw_service));
        let assessment = self
            .assessments
            .latest_for_user(&user.id)?
            .ok_or(BookingServiceError::AssessmentRequired)?;
        let now = Utc::now();

        let mut booking = match self.bookings.latest_for(&user.id, &offering.slug)? {
            Some(existing) => existing,
            None => self.open_booking(user, offering, &assessment.id, now)?,
        };
        if booking.is_paid() {
            return Err(BookingServiceError::AlreadyPaid(offering.slug.clone()));
        }

        if let Some(intent) = self.resumable_intent(&booking)? {
            if intent.status == IntentStatus::Succeeded {
                booking.mark_paid(now)?;
                let booking = self.bookings.update(booking)?;
                info!(booking_id = %booking.id.0, "booking paid by settled intent");
                return Err(BookingServiceError::AlreadyPaid(offering.slug.clone()));
            }
            if booking.payment_status == PaymentStatus::Failed {
                booking.transition(PaymentStatus::Pending, now)?;
                booking = self.bookings.update(booking)?;
            }
            info!(
                booking_id = %booking.id.0,
                payment_intent_id = %intent.id,
                "payment session resumed"
            );
            return Ok(PaymentSession {
                booking: booking.view(),
                intent,
                report: self.report(&Ok(Some(user.clone())), offering),
            });
        }

        if booking.payment_status == PaymentStatus::Failed {
            booking.transition(PaymentStatus::Pending, now)?;
        }
        booking.payment_intent_id = None;
        booking.updated_at = now;
        let booking = self.bookings.update(booking)?;

        let intent = self
            .payments
            .create_intent(booking.amount_cents, &booking.currency)
            .map_err(|err| {
                warn!(booking_id = %booking.id.0, error = %err, "payment intent creation failed");
                err
            })?;

        let mut booking = booking;
        booking.payment_intent_id = Some(intent.id.clone());
        booking.updated_at = Utc::now();
        let booking = self.bookings.update(booking)?;
        info!(
            booking_id = %booking.id.0,
            payment_intent_id = %intent.id,
            "payment session opened"
        );

        Ok(PaymentSession {
            booking: booking.view(),
            intent,
            report: self.report(&Ok(Some(user.clone())), offering),
        })
    }

    /// Insert the pending booking, or adopt the row a concurrent request stored first.
    fn open_booking(
        &self,
        user: &CurrentUser,
        offering: &ServiceOffering,
        assessment_id: &AssessmentId,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingServiceError> {
        let inserted = self.bookings.insert(Booking {
            id: BookingId(BOOKING_SEQUENCE.next_id()),
            user_id: user.id.clone(),
            service_type: offering.slug.clone(),
            amount_cents: offering.amount_cents,
            currency: self.currency.clone(),
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            scheduled_at: None,
            scheduling_event_id: None,
            assessment_id: Some(assessment_id.clone()),
            created_at: now,
            updated_at: now,
        });

        match inserted {
            Ok(created) => {
                info!(
                    user_id = %user.id.0,
                    booking_id = %created.id.0,
                    service = %created.service_type,
                    "booking created"
                );
                Ok(created)
            }
            Err(RepositoryError::Conflict) => {
                debug!(
                    user_id = %user.id.0,
                    service = %offering.slug,
                    "booking already created by a concurrent request"
                );
                self.bookings
                    .latest_for(&user.id, &offering.slug)?
                    .ok_or(BookingServiceError::Repository(RepositoryError::Conflict))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The booking's current intent when it is still open or already settled.
    fn resumable_intent(
        &self,
        booking: &Booking,
    ) -> Result<Option<PaymentIntent>, BookingServiceError> {
        let Some(intent_id) = booking.payment_intent_id.as_deref() else {
            return Ok(None);
        };
        match self.payments.retrieve_intent(intent_id) {
            Ok(intent) if intent.status.is_open() || intent.status == IntentStatus::Succeeded => {
                Ok(Some(intent))
            }
            Ok(intent) => {
                debug!(
                    booking_id = %booking.id.0,
                    status = intent.status.label(),
                    "previous payment intent is closed"
                );
                Ok(None)
            }
            Err(PaymentError::UnknownIntent(_)) => {
                warn!(
                    booking_id = %booking.id.0,
                    payment_intent_id = %intent_id,
                    "previous payment intent unknown to processor"
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Apply a client-side confirmation after checking it with the processor.
    pub fn confirm_payment(
        &self,
        user: &CurrentUser,
        raw_service: &str,
        confirmation: PaymentConfirmation,
    ) -> Result<GateReport, BookingServiceError> {
        let offering = self.catalog.resolve(Some(raw_service));
        let mut booking = self
            .bookings
            .latest_for(&user.id, &offering.slug)?
            .ok_or_else(|| BookingServiceError::NoBooking(offering.slug.clone()))?;

        if booking.payment_intent_id.as_deref() != Some(confirmation.payment_intent_id.as_str()) {
            return Err(BookingServiceError::IntentMismatch);
        }
        if booking.is_paid() {
            return Ok(self.report(&Ok(Some(user.clone())), offering));
        }
        if confirmation.status != IntentStatus::Succeeded {
            info!(
                booking_id = %booking.id.0,
                status = confirmation.status.label(),
                "client reported incomplete payment"
            );
            return Err(BookingServiceError::PaymentIncomplete(confirmation.status));
        }

        let verified = self
            .payments
            .retrieve_intent(&confirmation.payment_intent_id)?
            .status;
        if verified != IntentStatus::Succeeded {
            warn!(
                booking_id = %booking.id.0,
                status = verified.label(),
                "processor did not confirm payment"
            );
            return Err(BookingServiceError::PaymentIncomplete(verified));
        }

        booking.mark_paid(Utc::now())?;
        let booking = self.bookings.update(booking)?;
        info!(booking_id = %booking.id.0, "booking paid");

        Ok(self.report(&Ok(Some(user.clone())), offering))
    }

    /// Apply a verified processor event. Unknown intents and unrelated events are ignored.
    pub fn apply_payment_event(
        &self,
        event: &PaymentEvent,
    ) -> Result<Option<Booking>, BookingServiceError> {
        let Some(outcome) = event.outcome else {
            debug!(event_type = %event.event_type, "ignoring payment event");
            return Ok(None);
        };
        let Some(mut booking) = self.bookings.find_by_intent(&event.payment_intent_id)? else {
            warn!(
                payment_intent_id = %event.payment_intent_id,
                "payment event for unknown intent"
            );
            return Ok(None);
        };

        let now = Utc::now();
        match outcome {
            IntentStatus::Succeeded if !booking.is_paid() => booking.mark_paid(now)?,
            IntentStatus::Failed | IntentStatus::Canceled
                if booking.payment_status == PaymentStatus::Pending =>
            {
                booking.transition(PaymentStatus::Failed, now)?
            }
            _ => return Ok(Some(booking)),
        }
        let booking = self.bookings.update(booking)?;
        info!(
            booking_id = %booking.id.0,
            payment_status = booking.payment_status.label(),
            "payment event applied"
        );
        Ok(Some(booking))
    }

    /// Record the slot the scheduling widget confirmed. Only paid bookings can be scheduled.
    pub fn record_schedule(
        &self,
        user: &CurrentUser,
        raw_service: &str,
        schedule: ScheduleConfirmation,
    ) -> Result<GateReport, BookingServiceError> {
        let offering = self.catalog.resolve(Some(raw_service));
        let mut booking = self
            .bookings
            .latest_for(&user.id, &offering.slug)?
            .ok_or_else(|| BookingServiceError::NoBooking(offering.slug.clone()))?;
        if !booking.is_paid() {
            return Err(BookingServiceError::NotPaid(offering.slug.clone()));
        }

        booking.scheduled_at = Some(schedule.scheduled_at);
        booking.scheduling_event_id = schedule.event_id;
        booking.updated_at = Utc::now();
        let booking = self.bookings.update(booking)?;
        info!(booking_id = %booking.id.0, "booking scheduled");

        Ok(self.report(&Ok(Some(user.clone())), offering))
    }
}

/// Gate result plus everything the booking page renders alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
    pub service: ServiceOffering,
    pub facts: GateFacts,
    pub outcome: GateOutcome,
    pub next_action: Option<NextAction>,
    /// Where sign-in and the assessment send the visitor back to.
    pub return_to: String,
    pub booking: Option<BookingView>,
    pub scheduler: Option<SchedulerPrefill>,
}

impl GateReport {
    pub fn stage(&self) -> Option<&GateStage> {
        self.outcome.stage()
    }
}

/// Scheduling widget link with the visitor's details to prefill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerPrefill {
    pub url: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSession {
    pub booking: BookingView,
    pub intent: PaymentIntent,
    pub report: GateReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfirmation {
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub event_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error("complete the eligibility assessment before booking")]
    AssessmentRequired,
    #[error("no booking exists for {0}")]
    NoBooking(String),
    #[error("booking for {0} is already paid")]
    AlreadyPaid(String),
    #[error("booking for {0} is not paid yet")]
    NotPaid(String),
    #[error("payment intent does not belong to this booking")]
    IntentMismatch,
    #[error("payment not completed: {}", .0.label())]
    PaymentIncomplete(IntentStatus),
    #[error(transparent)]
    Transition(#[from] PaymentTransitionError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
