use super::domain::{ContactMessage, ContactMessageId, ContactStatus};
use crate::workflows::repository::RepositoryError;

pub trait ContactRepository: Send + Sync {
    fn insert(&self, message: ContactMessage) -> Result<ContactMessage, RepositoryError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<ContactMessage>, RepositoryError>;
    fn set_status(
        &self,
        id: &ContactMessageId,
        status: ContactStatus,
    ) -> Result<ContactMessage, RepositoryError>;
    fn delete(&self, id: &ContactMessageId) -> Result<(), RepositoryError>;
}
