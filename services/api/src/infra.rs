use metrics_exporter_prometheus::PrometheusHandle;
use pathway::workflows::booking::{
    Booking, BookingRepository, IntentStatus, PaymentError, PaymentIntent, PaymentProcessor,
};
use pathway::workflows::contact::{
    ContactMessage, ContactMessageId, ContactRepository, ContactStatus,
};
use pathway::workflows::eligibility::{AssessmentId, AssessmentRecord, AssessmentRepository};
use pathway::workflows::identity::{Profile, ProfileRepository, UserId};
use pathway::workflows::repository::{IdSequence, RepositoryError};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

/// Rows are kept in insertion order; "latest" scans from the end so later inserts win ties.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<Vec<AssessmentRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .fold(None::<&AssessmentRecord>, |latest, record| match latest {
                Some(current) if current.created_at > record.created_at => Some(current),
                _ => Some(record),
            })
            .cloned())
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let mut records = lock(&self.records)?.clone();
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    profiles: Arc<Mutex<HashMap<UserId, Profile>>>,
}

impl ProfileRepository for InMemoryProfileRepository {
    fn upsert(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        let mut guard = lock(&self.profiles)?;
        let stored = match guard.get(&profile.user_id) {
            Some(existing) => existing.merged_with(profile),
            None => profile,
        };
        guard.insert(stored.user_id.clone(), stored.clone());
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let mut profiles: Vec<Profile> = lock(&self.profiles)?.values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryBookingRepository {
    bookings: Arc<Mutex<Vec<Booking>>>,
}

impl BookingRepository for InMemoryBookingRepository {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut guard = lock(&self.bookings)?;
        if guard.iter().any(|existing| {
            existing.id == booking.id
                || (existing.user_id == booking.user_id
                    && existing.service_type == booking.service_type)
        }) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut guard = lock(&self.bookings)?;
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == booking.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = booking.clone();
        Ok(booking)
    }

    fn latest_for(
        &self,
        user_id: &UserId,
        service_type: &str,
    ) -> Result<Option<Booking>, RepositoryError> {
        let guard = lock(&self.bookings)?;
        Ok(guard
            .iter()
            .rev()
            .find(|booking| &booking.user_id == user_id && booking.service_type == service_type)
            .cloned())
    }

    fn find_by_intent(&self, payment_intent_id: &str) -> Result<Option<Booking>, RepositoryError> {
        let guard = lock(&self.bookings)?;
        Ok(guard
            .iter()
            .find(|booking| booking.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned())
    }

    fn list(&self) -> Result<Vec<Booking>, RepositoryError> {
        let mut bookings = lock(&self.bookings)?.clone();
        bookings.reverse();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryContactRepository {
    messages: Arc<Mutex<Vec<ContactMessage>>>,
}

impl ContactRepository for InMemoryContactRepository {
    fn insert(&self, message: ContactMessage) -> Result<ContactMessage, RepositoryError> {
        lock(&self.messages)?.push(message.clone());
        Ok(message)
    }

    fn list(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let mut messages = lock(&self.messages)?.clone();
        messages.reverse();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    fn set_status(
        &self,
        id: &ContactMessageId,
        status: ContactStatus,
    ) -> Result<ContactMessage, RepositoryError> {
        let mut guard = lock(&self.messages)?;
        let message = guard
            .iter_mut()
            .find(|message| &message.id == id)
            .ok_or(RepositoryError::NotFound)?;
        message.status = status;
        Ok(message.clone())
    }

    fn delete(&self, id: &ContactMessageId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.messages)?;
        let before = guard.len();
        guard.retain(|message| &message.id != id);
        if guard.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

static INTENT_SEQUENCE: IdSequence = IdSequence::new("pi_sim");

/// Local stand-in for the card processor. Intents start awaiting a payment method; `settle`
/// plays the part of the customer completing (or failing) checkout.
#[derive(Default, Clone)]
pub(crate) struct SimulatedPaymentProcessor {
    intents: Arc<Mutex<HashMap<String, PaymentIntent>>>,
}

impl SimulatedPaymentProcessor {
    pub(crate) fn settle(&self, intent_id: &str, status: IntentStatus) -> Result<(), PaymentError> {
        let mut guard = self
            .intents
            .lock()
            .map_err(|_| PaymentError::Unavailable("processor mutex poisoned".to_string()))?;
        match guard.get_mut(intent_id) {
            Some(current) => {
                current.status = status;
                Ok(())
            }
            None => Err(PaymentError::UnknownIntent(intent_id.to_string())),
        }
    }
}

impl PaymentProcessor for SimulatedPaymentProcessor {
    fn create_intent(
        &self,
        amount_cents: u64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount_cents == 0 {
            return Err(PaymentError::Rejected("amount must be positive".to_string()));
        }
        let id = INTENT_SEQUENCE.next_id();
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret"),
            id: id.clone(),
            amount_cents,
            currency: currency.to_ascii_lowercase(),
            status: IntentStatus::RequiresPaymentMethod,
        };
        self.intents
            .lock()
            .map_err(|_| PaymentError::Unavailable("processor mutex poisoned".to_string()))?
            .insert(id, intent.clone());
        Ok(intent)
    }

    fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError> {
        self.intents
            .lock()
            .map_err(|_| PaymentError::Unavailable("processor mutex poisoned".to_string()))?
            .get(intent_id)
            .cloned()
            .ok_or_else(|| PaymentError::UnknownIntent(intent_id.to_string()))
    }
}

/// Every adapter the service runs against, shared between routers.
#[derive(Default, Clone)]
pub(crate) struct Stores {
    pub(crate) assessments: Arc<InMemoryAssessmentRepository>,
    pub(crate) profiles: Arc<InMemoryProfileRepository>,
    pub(crate) bookings: Arc<InMemoryBookingRepository>,
    pub(crate) contacts: Arc<InMemoryContactRepository>,
    pub(crate) payments: Arc<SimulatedPaymentProcessor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathway::workflows::booking::{BookingId, PaymentStatus};

    #[test]
    fn simulated_intents_can_be_settled() {
        let processor = SimulatedPaymentProcessor::default();
        let intent = processor.create_intent(15_000, "CAD").expect("intent");
        assert_eq!(processor.retrieve_intent(&intent.id), Ok(intent.clone()));

        processor
            .settle(&intent.id, IntentStatus::Succeeded)
            .expect("settled");
        assert_eq!(
            processor.retrieve_intent(&intent.id).map(|intent| intent.status),
            Ok(IntentStatus::Succeeded)
        );
        assert!(matches!(
            processor.settle("pi_missing", IntentStatus::Succeeded),
            Err(PaymentError::UnknownIntent(_))
        ));
    }

    fn booking(id: &str, service_type: &str) -> Booking {
        let now = chrono::Utc::now();
        Booking {
            id: BookingId(id.to_string()),
            user_id: UserId("user-rosa".to_string()),
            service_type: service_type.to_string(),
            amount_cents: 15_000,
            currency: "CAD".to_string(),
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            scheduled_at: None,
            scheduling_event_id: None,
            assessment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn one_booking_row_per_user_and_service() {
        let repository = InMemoryBookingRepository::default();
        repository
            .insert(booking("bkg-1", "consultation-exploratory"))
            .expect("first row");
        assert_eq!(
            repository.insert(booking("bkg-2", "consultation-exploratory")),
            Err(RepositoryError::Conflict)
        );
        repository
            .insert(booking("bkg-3", "consultation-case-specific"))
            .expect("other service");
        assert_eq!(repository.list().map(|rows| rows.len()), Ok(2));
    }
}
