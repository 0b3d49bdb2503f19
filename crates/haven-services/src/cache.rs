//! Identifier cache seam.
//!
//! Upload-path code keeps a set of known identifiers to reject colliding
//! names without a round-trip to the database. The deletion paths must keep
//! that set honest: an identifier is present iff a corresponding `files` row
//! exists, so entries are removed synchronously with DB deletion.

use std::collections::HashSet;
use std::sync::Mutex;

/// The cache interface injected into the deletion services.
///
/// Implementations are shared across tasks; when several bulk operations
/// reference the same cache, mutation should follow a single-writer
/// discipline or use a concurrent set.
pub trait IdentifierCache: Send + Sync {
    fn contains(&self, identifier: &str) -> bool;

    /// Returns true when the identifier was not already present.
    fn insert(&self, identifier: &str) -> bool;

    /// Returns true when an entry was removed.
    fn remove(&self, identifier: &str) -> bool;
}

/// In-memory implementation over a mutex-held set.
#[derive(Debug, Default)]
pub struct MemoryIdentifierCache {
    entries: Mutex<HashSet<String>>,
}

impl MemoryIdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.entries.lock().expect("identifier cache mutex poisoned")
    }
}

impl IdentifierCache for MemoryIdentifierCache {
    fn contains(&self, identifier: &str) -> bool {
        self.lock().contains(identifier)
    }

    fn insert(&self, identifier: &str) -> bool {
        self.lock().insert(identifier.to_string())
    }

    fn remove(&self, identifier: &str) -> bool {
        self.lock().remove(identifier)
    }
}
