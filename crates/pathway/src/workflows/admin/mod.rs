//! Back-office: allow-listed staff review assessments, bookings, users and messages.

pub mod directory;
pub mod export;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use directory::AdminDirectory;
pub use export::{assessments_csv, ExportError};
pub use router::{admin_router, AdminRouterState};
pub use service::{AdminError, AdminService, BookingLedger, RevenueLine};
