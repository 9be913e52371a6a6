//! Client-side identifiers for nodes created before the store has seen them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// Source of ids for collections and files created from the sidebar.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Millisecond timestamps rendered as decimal strings.
///
/// Two ids requested within the same millisecond are still distinct: the generator never hands
/// out a value lower than or equal to the previous one.
#[derive(Debug, Default)]
pub struct TimestampIds {
    last: AtomicU64,
}

impl TimestampIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for TimestampIds {
    fn next_id(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let next = |last: u64| now.max(last + 1);
        // The closure always returns `Some`, so both arms carry the value it replaced.
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
        {
            Ok(previous) | Err(previous) => previous,
        };
        next(previous).to_string()
    }
}

/// Random id used for artifacts of the merge and insert workflows.
pub fn random_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn timestamp_ids_are_unique_and_increasing() {
        let ids = TimestampIds::new();
        let values: Vec<u64> = (0..1000).map(|_| ids.next_id().parse().unwrap()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn random_ids_are_uuids() {
        let a = random_id();
        let b = random_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
        assert_eq!([a, b].into_iter().collect::<HashSet<_>>().len(), 2);
    }
}
