//! In-memory record store.
//!
//! The store holds the most recently ingested [`RecordSet`]. It has exactly
//! one interesting property: replacement is wholesale and atomic. Readers
//! take an `Arc` snapshot of the current set and can keep matching against
//! it while a new upload swaps the set underneath them; they never observe
//! a half-written set.
//!
//! The store is an explicitly owned, injectable object (typically shared via
//! `Arc`), not process-global state. This keeps tests isolated and leaves
//! room for multiple independent stores later.

use crate::types::RecordSet;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, instrument};

/// Holds the current record set; single writer, wholesale replacement.
///
/// ## Example
///
/// ```rust
/// use riffle_core::{csv, RecordStore};
///
/// let store = RecordStore::new();
/// assert!(store.current().is_empty());
///
/// let set = csv::parse("name\nAlice", ',').unwrap();
/// store.replace(set);
/// assert_eq!(store.current().len(), 1);
/// ```
pub struct RecordStore {
    /// The current record set; empty before any upload
    current: RwLock<Arc<RecordSet>>,

    /// Generation counter, bumped on every replacement
    generation: AtomicU64,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Create a store holding the empty record set.
    pub fn new() -> Self {
        RecordStore {
            current: RwLock::new(Arc::new(RecordSet::empty())),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the stored set wholesale.
    ///
    /// Atomic with respect to [`current`](Self::current): the swap happens
    /// under the write lock, so readers see either the old set or the new
    /// one, never a mixture. No history is retained.
    #[instrument(skip(self, set))]
    pub fn replace(&self, set: RecordSet) {
        info!(
            records = set.len(),
            fields = set.field_count(),
            "Replacing record set"
        );

        *self.current.write() = Arc::new(set);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Get a snapshot of the current record set.
    ///
    /// Returns the empty set before the first upload. The returned `Arc`
    /// stays valid (and unchanged) even if a replacement happens afterwards.
    pub fn current(&self) -> Arc<RecordSet> {
        self.current.read().clone()
    }

    /// Get the current generation (replacement counter).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Number of records in the current set.
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Check if the current set has no records.
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("record_count", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;

    #[test]
    fn test_empty_before_first_upload() {
        let store = RecordStore::new();
        let set = store.current();

        assert!(set.is_empty());
        assert_eq!(set.field_count(), 0);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_replace_and_read() {
        let store = RecordStore::new();
        store.replace(csv::parse("name\nAlice\nBob", ',').unwrap());

        assert_eq!(store.len(), 2);
        assert_eq!(store.current().fields, vec!["name"]);
    }

    #[test]
    fn test_replacement_makes_old_set_unreachable() {
        let store = RecordStore::new();
        store.replace(csv::parse("name\nAlice", ',').unwrap());
        store.replace(csv::parse("city\nParis", ',').unwrap());

        let set = store.current();
        assert_eq!(set.fields, vec!["city"]);
        assert_eq!(set.records[0].values, vec!["Paris"]);
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let store = RecordStore::new();
        store.replace(csv::parse("name\nAlice", ',').unwrap());

        let snapshot = store.current();
        store.replace(csv::parse("name\nBob", ',').unwrap());

        // The old snapshot is stable; the store serves the new set
        assert_eq!(snapshot.records[0].values, vec!["Alice"]);
        assert_eq!(store.current().records[0].values, vec!["Bob"]);
    }

    #[test]
    fn test_generation_increments() {
        let store = RecordStore::new();
        let gen0 = store.generation();

        store.replace(csv::parse("a\n1", ',').unwrap());
        let gen1 = store.generation();

        store.replace(csv::parse("a\n2", ',').unwrap());
        let gen2 = store.generation();

        assert!(gen1 > gen0);
        assert!(gen2 > gen1);
    }

    #[test]
    fn test_concurrent_readers() {
        let store = Arc::new(RecordStore::new());
        store.replace(csv::parse("n\na\nb\nc", ',').unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.current().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 3);
        }
    }
}
