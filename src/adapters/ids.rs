use crate::domain::ports::IdentifierSource;
use std::sync::atomic::{AtomicU64, Ordering};

/// `prefix-1`, `prefix-2`, ... Deterministic, so tests can predict ids.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdentifierSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdentifierSource for RandomIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new("p");
        assert_eq!(ids.next_id(), "p-1");
        assert_eq!(ids.next_id(), "p-2");
    }

    #[test]
    fn test_random_ids_are_distinct() {
        let ids = RandomIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
