use std::collections::BTreeSet;

use crate::workflows::identity::CurrentUser;

/// Email allow-list for back-office access. Comparison ignores case and surrounding spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminDirectory {
    emails: BTreeSet<String>,
}

impl AdminDirectory {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|email| email.as_ref().trim().to_ascii_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    pub fn is_admin(&self, user: &CurrentUser) -> bool {
        self.emails
            .contains(&user.email.trim().to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
