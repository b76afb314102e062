//! Caller-owned registry keyed by string id.
//!
//! Built once by the application and passed by reference; there is no
//! process-wide instance.

use indexmap::IndexMap;
use tracing::debug;

/// Insertion-ordered map from id to entry.
#[derive(Debug)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry. Returns the replaced entry.
    ///
    /// A replaced entry keeps its original position.
    pub fn register(&mut self, id: impl Into<String>, entry: T) -> Option<T> {
        let id = id.into();
        debug!(id = %id, "registering entry");
        self.entries.insert(id, entry)
    }

    /// Remove an entry, preserving the order of the rest.
    pub fn unregister(&mut self, id: &str) -> Option<T> {
        self.entries.shift_remove(id)
    }

    /// Look up an entry.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    /// Look up an entry mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    /// Every entry in registration order.
    pub fn get_all(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
