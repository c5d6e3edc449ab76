use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{ContactMessage, ContactMessageId, ContactStatus, ContactSubmission};
use super::repository::ContactRepository;
use crate::workflows::repository::{IdSequence, RepositoryError};

static CONTACT_SEQUENCE: IdSequence = IdSequence::new("msg");

pub struct ContactService<R> {
    messages: Arc<R>,
}

impl<R> ContactService<R>
where
    R: ContactRepository + 'static,
{
    pub fn new(messages: Arc<R>) -> Self {
        Self { messages }
    }

    pub fn submit(&self, submission: ContactSubmission) -> Result<ContactMessage, ContactServiceError> {
        let required = [
            ("name", &submission.name),
            ("email", &submission.email),
            ("message", &submission.message),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ContactServiceError::MissingFields(missing));
        }

        let phone = submission.phone.trim();
        let message = self.messages.insert(ContactMessage {
            id: ContactMessageId(CONTACT_SEQUENCE.next_id()),
            name: submission.name.trim().to_string(),
            email: submission.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            message: submission.message.trim().to_string(),
            status: ContactStatus::Unread,
            created_at: Utc::now(),
        })?;
        info!(message_id = %message.id.0, "contact message received");
        Ok(message)
    }

    pub fn list(&self) -> Result<Vec<ContactMessage>, ContactServiceError> {
        Ok(self.messages.list()?)
    }

    pub fn mark_read(&self, id: &ContactMessageId) -> Result<ContactMessage, ContactServiceError> {
        Ok(self.messages.set_status(id, ContactStatus::Read)?)
    }

    pub fn delete(&self, id: &ContactMessageId) -> Result<(), ContactServiceError> {
        self.messages.delete(id)?;
        info!(message_id = %id.0, "contact message deleted");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContactServiceError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
