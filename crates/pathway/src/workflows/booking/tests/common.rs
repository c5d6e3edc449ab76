use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::booking::domain::{Booking, PaymentStatus};
use crate::workflows::booking::payments::{
    IntentStatus, PaymentError, PaymentIntent, PaymentProcessor,
};
use crate::workflows::booking::{
    booking_router, BookingRepository, BookingService, ServiceCatalog, WebhookVerifier,
};
use crate::workflows::eligibility::domain::{
    AssessmentAnswers, AssessmentId, AssessmentRecord, UrgencyTier,
};
use crate::workflows::eligibility::AssessmentRepository;
use crate::workflows::identity::{CurrentUser, IdentityError, IdentityProvider, UserId};
use crate::workflows::repository::RepositoryError;

pub(super) const TOKEN: &str = "token-ana";
pub(super) const WEBHOOK_SECRET: &str = "whsec_test";

pub(super) fn user() -> CurrentUser {
    CurrentUser {
        id: UserId("user-ana".to_string()),
        email: "ana@example.com".to_string(),
        full_name: Some("Ana Silva".to_string()),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAssessments {
    records: Arc<Mutex<Vec<AssessmentRecord>>>,
}

impl MemoryAssessments {
    pub(super) fn seed(&self, user: &CurrentUser) {
        self.records
            .lock()
            .expect("lock poisoned")
            .push(AssessmentRecord {
                id: AssessmentId(format!("asm-{}", user.id.0)),
                user_id: user.id.clone(),
                answers: AssessmentAnswers::default(),
                urgency: UrgencyTier::Strong,
                recommended_service: "consultation-exploratory".to_string(),
                total_score: 40,
                created_at: Utc::now(),
            });
    }
}

impl AssessmentRepository for MemoryAssessments {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        self.records
            .lock()
            .expect("lock poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock poisoned")
            .iter()
            .rev()
            .find(|record| &record.user_id == user_id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(self.records.lock().expect("lock poisoned").clone())
    }

    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("lock poisoned")
            .retain(|record| &record.id != id);
        Ok(())
    }
}

pub(super) struct UnavailableAssessments;

impl AssessmentRepository for UnavailableAssessments {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &AssessmentId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryBookings {
    rows: Arc<Mutex<Vec<Booking>>>,
}

impl MemoryBookings {
    pub(super) fn all(&self) -> Vec<Booking> {
        self.rows.lock().expect("lock poisoned").clone()
    }

    pub(super) fn only(&self) -> Booking {
        let rows = self.all();
        assert_eq!(rows.len(), 1, "expected exactly one booking");
        rows[0].clone()
    }

    /// Overwrite the stored status directly, bypassing transition rules.
    pub(super) fn force_status(&self, status: PaymentStatus) {
        let mut rows = self.rows.lock().expect("lock poisoned");
        for row in rows.iter_mut() {
            row.payment_status = status;
        }
    }
}

impl BookingRepository for MemoryBookings {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut rows = self.rows.lock().expect("lock poisoned");
        if rows.iter().any(|row| {
            row.id == booking.id
                || (row.user_id == booking.user_id && row.service_type == booking.service_type)
        }) {
            return Err(RepositoryError::Conflict);
        }
        rows.push(booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut rows = self.rows.lock().expect("lock poisoned");
        let row = rows
            .iter_mut()
            .find(|row| row.id == booking.id)
            .ok_or(RepositoryError::NotFound)?;
        *row = booking.clone();
        Ok(booking)
    }

    fn latest_for(
        &self,
        user_id: &UserId,
        service_type: &str,
    ) -> Result<Option<Booking>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("lock poisoned")
            .iter()
            .rev()
            .find(|row| &row.user_id == user_id && row.service_type == service_type)
            .cloned())
    }

    fn find_by_intent(&self, payment_intent_id: &str) -> Result<Option<Booking>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|row| row.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned())
    }

    fn list(&self) -> Result<Vec<Booking>, RepositoryError> {
        let mut rows = self.all();
        rows.reverse();
        Ok(rows)
    }
}

/// Bookings whose first `latest_for` misses, as when another request inserts the row
/// between this request's read and its write.
#[derive(Default, Clone)]
pub(super) struct StaleFirstRead {
    pub(super) inner: MemoryBookings,
    missed: Arc<Mutex<bool>>,
}

impl BookingRepository for StaleFirstRead {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        self.inner.insert(booking)
    }

    fn update(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        self.inner.update(booking)
    }

    fn latest_for(
        &self,
        user_id: &UserId,
        service_type: &str,
    ) -> Result<Option<Booking>, RepositoryError> {
        let mut missed = self.missed.lock().expect("lock poisoned");
        if !*missed {
            *missed = true;
            return Ok(None);
        }
        self.inner.latest_for(user_id, service_type)
    }

    fn find_by_intent(&self, payment_intent_id: &str) -> Result<Option<Booking>, RepositoryError> {
        self.inner.find_by_intent(payment_intent_id)
    }

    fn list(&self) -> Result<Vec<Booking>, RepositoryError> {
        self.inner.list()
    }
}

/// Processor fake: intents are numbered, statuses are set by the test.
#[derive(Default, Clone)]
pub(super) struct ScriptedProcessor {
    intents: Arc<Mutex<HashMap<String, PaymentIntent>>>,
    fail_creation: Arc<Mutex<bool>>,
}

impl ScriptedProcessor {
    pub(super) fn set_status(&self, intent_id: &str, status: IntentStatus) {
        self.intents
            .lock()
            .expect("lock poisoned")
            .entry(intent_id.to_string())
            .or_insert_with(|| PaymentIntent {
                id: intent_id.to_string(),
                client_secret: format!("{intent_id}_secret"),
                amount_cents: 0,
                currency: "cad".to_string(),
                status,
            })
            .status = status;
    }

    pub(super) fn fail_next_creation(&self, fail: bool) {
        *self.fail_creation.lock().expect("lock poisoned") = fail;
    }

    pub(super) fn created(&self) -> usize {
        self.intents.lock().expect("lock poisoned").len()
    }
}

impl PaymentProcessor for ScriptedProcessor {
    fn create_intent(
        &self,
        amount_cents: u64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        if *self.fail_creation.lock().expect("lock poisoned") {
            return Err(PaymentError::Unavailable("processor timeout".to_string()));
        }
        let mut intents = self.intents.lock().expect("lock poisoned");
        let id = format!("pi_{}", intents.len() + 1);
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret"),
            id: id.clone(),
            amount_cents,
            currency: currency.to_string(),
            status: IntentStatus::RequiresPaymentMethod,
        };
        intents.insert(id, intent.clone());
        Ok(intent)
    }

    fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError> {
        self.intents
            .lock()
            .expect("lock poisoned")
            .get(intent_id)
            .cloned()
            .ok_or_else(|| PaymentError::UnknownIntent(intent_id.to_string()))
    }
}

pub(super) struct StaticIdentity;

impl IdentityProvider for StaticIdentity {
    fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, IdentityError> {
        Ok((token == TOKEN).then(user))
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<BookingService<MemoryAssessments, MemoryBookings, ScriptedProcessor>>,
    pub(super) assessments: MemoryAssessments,
    pub(super) bookings: MemoryBookings,
    pub(super) processor: ScriptedProcessor,
}

impl Harness {
    pub(super) fn new() -> Self {
        let assessments = MemoryAssessments::default();
        let bookings = MemoryBookings::default();
        let processor = ScriptedProcessor::default();
        let service = Arc::new(BookingService::new(
            ServiceCatalog::standard(),
            "CAD",
            Arc::new(assessments.clone()),
            Arc::new(bookings.clone()),
            Arc::new(processor.clone()),
        ));
        Self {
            service,
            assessments,
            bookings,
            processor,
        }
    }

    pub(super) fn router(&self, webhook: Option<WebhookVerifier>) -> Router {
        booking_router(self.service.clone(), Arc::new(StaticIdentity), webhook)
    }
}

pub(super) fn signed_in() -> Result<Option<CurrentUser>, IdentityError> {
    Ok(Some(user()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("json body")
}
