use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::directory::AdminDirectory;
use super::export::{assessments_csv, ExportError};
use crate::workflows::booking::{Booking, BookingRepository, PaymentStatus};
use crate::workflows::contact::{ContactMessage, ContactMessageId, ContactRepository, ContactStatus};
use crate::workflows::eligibility::{AssessmentId, AssessmentRecord, AssessmentRepository};
use crate::workflows::identity::{CurrentUser, Profile, ProfileRepository};
use crate::workflows::repository::RepositoryError;

/// Back-office listings over every store. Each call is gated on the admin allow-list.
pub struct AdminService {
    directory: AdminDirectory,
    assessments: Arc<dyn AssessmentRepository>,
    bookings: Arc<dyn BookingRepository>,
    profiles: Arc<dyn ProfileRepository>,
    contacts: Arc<dyn ContactRepository>,
}

impl AdminService {
    pub fn new(
        directory: AdminDirectory,
        assessments: Arc<dyn AssessmentRepository>,
        bookings: Arc<dyn BookingRepository>,
        profiles: Arc<dyn ProfileRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        Self {
            directory,
            assessments,
            bookings,
            profiles,
            contacts,
        }
    }

    pub fn authorize(&self, user: &CurrentUser) -> Result<(), AdminError> {
        if self.directory.is_admin(user) {
            Ok(())
        } else {
            info!(user_id = %user.id.0, "admin access denied");
            Err(AdminError::Forbidden)
        }
    }

    pub fn assessments(&self, admin: &CurrentUser) -> Result<Vec<AssessmentRecord>, AdminError> {
        self.authorize(admin)?;
        Ok(self.assessments.list()?)
    }

    pub fn assessments_csv(&self, admin: &CurrentUser) -> Result<String, AdminError> {
        let records = self.assessments(admin)?;
        Ok(assessments_csv(&records)?)
    }

    pub fn delete_assessment(
        &self,
        admin: &CurrentUser,
        id: &AssessmentId,
    ) -> Result<(), AdminError> {
        self.authorize(admin)?;
        self.assessments.delete(id)?;
        info!(admin_id = %admin.id.0, assessment_id = %id.0, "assessment deleted");
        Ok(())
    }

    pub fn bookings(&self, admin: &CurrentUser) -> Result<BookingLedger, AdminError> {
        self.authorize(admin)?;
        let bookings = self.bookings.list()?;
        Ok(BookingLedger::from_bookings(bookings))
    }

    pub fn users(&self, admin: &CurrentUser) -> Result<Vec<Profile>, AdminError> {
        self.authorize(admin)?;
        Ok(self.profiles.list()?)
    }

    pub fn contact_messages(&self, admin: &CurrentUser) -> Result<Vec<ContactMessage>, AdminError> {
        self.authorize(admin)?;
        Ok(self.contacts.list()?)
    }

    pub fn mark_contact_read(
        &self,
        admin: &CurrentUser,
        id: &ContactMessageId,
    ) -> Result<ContactMessage, AdminError> {
        self.authorize(admin)?;
        Ok(self.contacts.set_status(id, ContactStatus::Read)?)
    }

    pub fn delete_contact(&self, admin: &CurrentUser, id: &ContactMessageId) -> Result<(), AdminError> {
        self.authorize(admin)?;
        self.contacts.delete(id)?;
        info!(admin_id = %admin.id.0, message_id = %id.0, "contact message deleted");
        Ok(())
    }
}

/// Booking list with the revenue it represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingLedger {
    pub bookings: Vec<Booking>,
    pub revenue: Vec<RevenueLine>,
    pub pending: usize,
    pub paid: usize,
    pub failed: usize,
}

/// Sum of paid bookings in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueLine {
    pub currency: String,
    pub amount_cents: u64,
    pub bookings: usize,
}

impl BookingLedger {
    pub fn from_bookings(bookings: Vec<Booking>) -> Self {
        let mut by_currency: BTreeMap<String, (u64, usize)> = BTreeMap::new();
        let (mut pending, mut paid, mut failed) = (0, 0, 0);

        for booking in &bookings {
            match booking.payment_status {
                PaymentStatus::Pending => pending += 1,
                PaymentStatus::Failed => failed += 1,
                PaymentStatus::Paid => {
                    paid += 1;
                    let entry = by_currency.entry(booking.currency.clone()).or_default();
                    entry.0 = entry.0.saturating_add(booking.amount_cents);
                    entry.1 += 1;
                }
            }
        }

        Self {
            bookings,
            revenue: by_currency
                .into_iter()
                .map(|(currency, (amount_cents, count))| RevenueLine {
                    currency,
                    amount_cents,
                    bookings: count,
                })
                .collect(),
            pending,
            paid,
            failed,
        }
    }
}

#[derive(Debug)]
pub enum AdminError {
    Forbidden,
    Repository(RepositoryError),
    Export(ExportError),
}

impl std::fmt::Display for AdminError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminError::Forbidden => write!(f, "admin access required"),
            AdminError::Repository(err) => write!(f, "{}", err),
            AdminError::Export(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdminError::Forbidden => None,
            AdminError::Repository(err) => Some(err),
            AdminError::Export(err) => Some(err),
        }
    }
}

impl From<RepositoryError> for AdminError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<ExportError> for AdminError {
    fn from(err: ExportError) -> Self {
        Self::Export(err)
    }
}
