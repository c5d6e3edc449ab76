use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::workflows::repository::RepositoryError;

/// Contact details kept per user for the back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Fold newer details into an existing row, keeping its creation time and any field
    /// the update leaves blank.
    pub fn merged_with(&self, update: Profile) -> Profile {
        Profile {
            user_id: self.user_id.clone(),
            email: update.email,
            first_name: update.first_name.or_else(|| self.first_name.clone()),
            last_name: update.last_name.or_else(|| self.last_name.clone()),
            phone: update.phone.or_else(|| self.phone.clone()),
            created_at: self.created_at,
            updated_at: update.updated_at,
        }
    }
}

pub trait ProfileRepository: Send + Sync {
    fn upsert(&self, profile: Profile) -> Result<Profile, RepositoryError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<Profile>, RepositoryError>;
}
