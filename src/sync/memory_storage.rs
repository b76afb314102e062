//! In-process storage with change broadcast.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::trace;

use super::storage::{InstanceId, Storage, StorageEvent};
use crate::model::StorageError;

/// In-memory [`Storage`] that notifies every subscriber of each change.
///
/// Several managers for the same table identity share one `MemoryStorage`
/// (behind an `Rc`) and stay in sync through the change feed. An optional
/// byte quota reproduces "storage full" failures.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    subscribers: RefCell<Vec<Sender<StorageEvent>>>,
    quota: Option<usize>,
    unavailable: bool,
}

impl MemoryStorage {
    /// Create an empty, unlimited store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes growing it beyond `bytes`.
    ///
    /// Size is the sum of key and value lengths.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Create a store whose every write fails, like disabled browser storage.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Number of live subscriptions seen at the last broadcast.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Write a raw value without notifying anyone.
    ///
    /// Seeds state the way another process or an older version would have
    /// left it.
    pub fn seed(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
    }

    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        let items = self.items.borrow();
        let others: usize = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }

    fn broadcast(&self, event: StorageEvent) {
        // Dropped receivers belong to unmounted instances; prune them.
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str, source: InstanceId) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }

        if let Some(quota) = self.quota {
            let needed = self.used_bytes_with(key, value);
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    quota,
                });
            }
        }

        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        trace!(key, source = source.get(), "storage set");
        self.broadcast(StorageEvent {
            key: key.to_owned(),
            new_value: Some(value.to_owned()),
            source,
        });
        Ok(())
    }

    fn remove_item(&self, key: &str, source: InstanceId) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }

        let removed = self.items.borrow_mut().remove(key).is_some();
        if removed {
            trace!(key, source = source.get(), "storage remove");
            self.broadcast(StorageEvent {
                key: key.to_owned(),
                new_value: None,
                source,
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<Receiver<StorageEvent>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        Some(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let storage = MemoryStorage::new();
        storage
            .set_item("k", "v", InstanceId::next())
            .expect("unlimited store accepts writes");
        assert_eq!(storage.get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn subscribers_receive_changes_with_source() {
        let storage = MemoryStorage::new();
        let rx = storage.subscribe().expect("memory storage has a change feed");
        let writer = InstanceId::next();

        storage.set_item("k", "v", writer).expect("write");
        storage.remove_item("k", writer).expect("remove");

        let set = rx.try_recv().expect("set event");
        assert_eq!(set.new_value.as_deref(), Some("v"));
        assert_eq!(set.source, writer);
        let removed = rx.try_recv().expect("remove event");
        assert_eq!(removed.new_value, None);
    }

    #[test]
    fn removing_missing_key_is_silent() {
        let storage = MemoryStorage::new();
        let rx = storage.subscribe().expect("feed");
        storage.remove_item("missing", InstanceId::next()).expect("ok");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let storage = MemoryStorage::with_quota(8);
        let id = InstanceId::next();
        storage.set_item("k", "1234", id).expect("fits");

        let err = storage
            .set_item("k", "123456789", id)
            .expect_err("exceeds quota");

        assert!(matches!(err, StorageError::QuotaExceeded { quota: 8, .. }));
        assert_eq!(storage.get_item("k").as_deref(), Some("1234"));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let storage = MemoryStorage::new();
        let rx = storage.subscribe().expect("feed");
        let _kept = storage.subscribe().expect("feed");
        drop(rx);

        storage.set_item("k", "v", InstanceId::next()).expect("write");

        assert_eq!(storage.subscriber_count(), 1);
    }

    #[test]
    fn unavailable_store_fails_every_write() {
        let storage = MemoryStorage::unavailable();
        assert!(storage.set_item("k", "v", InstanceId::next()).is_err());
        assert!(storage.remove_item("k", InstanceId::next()).is_err());
    }
}
