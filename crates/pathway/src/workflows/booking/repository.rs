use super::domain::Booking;
use crate::workflows::identity::UserId;
use crate::workflows::repository::RepositoryError;

/// Storage for bookings; a user holds at most one row per service.
pub trait BookingRepository: Send + Sync {
    /// `Conflict` when the id or the (user, service) pair is already stored. The check and
    /// the write happen atomically so concurrent first payments cannot both insert.
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError>;
    /// Replace the row with the same id; `NotFound` when absent.
    fn update(&self, booking: Booking) -> Result<Booking, RepositoryError>;
    /// Most recent booking for the user and normalized service slug.
    fn latest_for(
        &self,
        user_id: &UserId,
        service_type: &str,
    ) -> Result<Option<Booking>, RepositoryError>;
    fn find_by_intent(&self, payment_intent_id: &str) -> Result<Option<Booking>, RepositoryError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<Booking>, RepositoryError>;
}
