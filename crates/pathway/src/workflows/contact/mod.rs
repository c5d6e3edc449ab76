//! Contact-us messages left by visitors and triaged in the back-office.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{ContactMessage, ContactMessageId, ContactStatus, ContactSubmission};
pub use repository::ContactRepository;
pub use router::contact_router;
pub use service::{ContactService, ContactServiceError};
