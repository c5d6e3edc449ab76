use super::domain::{AssessmentId, AssessmentRecord};
use crate::workflows::identity::UserId;
use crate::workflows::repository::RepositoryError;

/// Storage for submitted assessments. History is kept; the newest row is "current".
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    /// Most recent by creation time, later inserts winning ties.
    fn latest_for_user(&self, user_id: &UserId)
        -> Result<Option<AssessmentRecord>, RepositoryError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError>;
    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError>;
}
