use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::snapshot::Snapshot;

/// Holder for the currently active snapshot.
///
/// Reload is an atomic reference swap: evaluations that already hold an
/// `Arc<Snapshot>` keep using it, new evaluations pick up the replacement.
/// There are no torn reads because snapshots are never mutated in place.
#[derive(Debug)]
pub struct SnapshotStore {
    inner: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// Create a store with an initial snapshot.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The currently active snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the active snapshot, returning the previous one.
    pub fn swap(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        debug!(rules = next.rules().len(), "swapping active snapshot");
        let mut guard = self.inner.write();
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use wegweiser_core::{MatchType, Rule, Settings};

    use super::*;

    #[test]
    fn swap_replaces_current_but_not_held_references() {
        let first = Snapshot::build(
            vec![Rule::new("/a", MatchType::Exact, "/x")],
            Settings::new(),
        )
        .snapshot;
        let store = SnapshotStore::new(first);

        let held = store.current();
        let version_before = held.rules_version();

        let second = Snapshot::build(
            vec![Rule::new("/b", MatchType::Exact, "/y")],
            Settings::new(),
        )
        .snapshot;
        let previous = store.swap(second);

        // An in-flight evaluation keeps the snapshot it started with.
        assert_eq!(held.rules_version(), version_before);
        assert_eq!(previous.rules_version(), version_before);
        assert_ne!(store.current().rules_version(), version_before);
    }
}
