use std::sync::atomic::{AtomicU64, Ordering};

/// Error enumeration shared by every storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Monotonic, prefixed identifiers for rows this service creates.
#[derive(Debug)]
pub struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id:06}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::IdSequence;

    #[test]
    fn ids_are_prefixed_and_increasing() {
        let sequence = IdSequence::new("bkg");
        assert_eq!(sequence.next_id(), "bkg-000001");
        assert_eq!(sequence.next_id(), "bkg-000002");
    }
}
