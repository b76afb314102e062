//! Durable storage mirror.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;

use crate::model::StorageError;

/// Identity of one manager instance.
///
/// Storage writes are tagged with the writer so an instance can ignore change
/// notifications caused by its own writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A change made to storage by some instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed.
    pub key: String,
    /// New value, `None` when the key was removed.
    pub new_value: Option<String>,
    /// Instance that made the change.
    pub source: InstanceId,
}

/// Key/value durable storage shared by all instances in a process.
///
/// Mirrors the browser storage contract: string keys and values, writes that
/// may fail (quota, unavailable backend), and an optional change feed.
pub trait Storage {
    /// Read a value.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Write a value on behalf of `source`.
    fn set_item(&self, key: &str, value: &str, source: InstanceId) -> Result<(), StorageError>;

    /// Delete a value on behalf of `source`. Deleting a missing key succeeds.
    fn remove_item(&self, key: &str, source: InstanceId) -> Result<(), StorageError>;

    /// Subscribe to changes made by any instance.
    ///
    /// Backends without change notifications return `None`; managers then
    /// simply run without cross-instance sync.
    fn subscribe(&self) -> Option<Receiver<StorageEvent>> {
        None
    }
}

/// Storage key for a payload namespace and table identity.
///
/// # Examples
///
/// ```
/// # use viewsync::sync::storage_key;
/// assert_eq!(storage_key("column-order", "users"), "column-order-users");
/// ```
pub fn storage_key(namespace: &str, table_id: &str) -> String {
    format!("{namespace}-{table_id}")
}
