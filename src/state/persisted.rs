//! Storage-backed layout payload shared by the column managers.
//!
//! Holds the in-memory copy (the source of truth), mirrors it to durable
//! storage after each change, and applies change notifications from other
//! instances of the same table identity.

use std::rc::Rc;
use std::sync::mpsc::{Receiver, TryRecvError};
use tracing::{debug, warn};

use crate::codec::{
    decode_column_order, decode_column_sizing, encode_column_order, encode_column_sizing,
};
use crate::model::{CodecError, ColumnOrder, ColumnSizing};
use crate::sync::{InstanceId, Storage, StorageEvent};

/// A value that can be stored under a layout key.
pub trait LayoutPayload: Clone + PartialEq + std::fmt::Debug {
    /// Encode for storage. `None` means the key should be deleted.
    fn encode(&self) -> Option<String>;

    /// Decode a stored value.
    fn decode(raw: &str) -> Result<Self, CodecError>;
}

impl LayoutPayload for ColumnOrder {
    fn encode(&self) -> Option<String> {
        encode_column_order(self)
    }

    fn decode(raw: &str) -> Result<Self, CodecError> {
        decode_column_order(raw)
    }
}

impl LayoutPayload for ColumnSizing {
    fn encode(&self) -> Option<String> {
        encode_column_sizing(self)
    }

    fn decode(raw: &str) -> Result<Self, CodecError> {
        decode_column_sizing(raw)
    }
}

/// In-memory layout value mirrored to one storage key.
///
/// # Invariants
/// - Storage failures never change `value()`.
/// - A value equal to the default is stored as an absent key.
/// - Notifications about this instance's own writes, or about other keys,
///   are ignored.
pub struct PersistedLayout<T> {
    key: String,
    value: T,
    default: T,
    storage: Option<Rc<dyn Storage>>,
    events: Option<Receiver<StorageEvent>>,
    instance: InstanceId,
}

impl<T: LayoutPayload> PersistedLayout<T> {
    /// Load the value stored under `key`, falling back to `default`.
    ///
    /// Malformed stored data is logged and replaced by the default in memory;
    /// the stored bytes are left untouched until the next write.
    pub fn open(key: impl Into<String>, default: T, storage: Option<Rc<dyn Storage>>) -> Self {
        let key = key.into();
        let events = storage.as_deref().and_then(|s| s.subscribe());
        let value = storage
            .as_deref()
            .and_then(|s| s.get_item(&key))
            .and_then(|raw| decode_or_warn::<T>(&key, &raw))
            .unwrap_or_else(|| default.clone());

        debug!(
            key = %key,
            cross_instance = events.is_some(),
            "layout loaded"
        );

        Self {
            key,
            value,
            default,
            storage,
            events,
            instance: InstanceId::next(),
        }
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Value restored by a reset.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Identity tagged on this instance's writes.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Whether change notifications from other instances are delivered.
    pub fn is_subscribed(&self) -> bool {
        self.events.is_some()
    }

    /// Change the default, without touching the current value.
    pub fn set_default(&mut self, default: T) {
        self.default = default;
    }

    /// Replace the value in memory only.
    pub fn replace_in_memory(&mut self, value: T) {
        self.value = value;
    }

    /// Replace the value and mirror it to storage.
    ///
    /// Returns `false` when the value did not change.
    pub fn persist(&mut self, value: T) -> bool {
        if value == self.value {
            return false;
        }
        self.value = value;
        self.write();
        true
    }

    /// Apply pending change notifications from other instances.
    ///
    /// Returns the new value when it changed. Never writes back to storage.
    pub fn sync_storage(&mut self) -> Option<&T> {
        let mut changed = false;

        while let Some(event) = self.next_event() {
            if event.source == self.instance || event.key != self.key {
                continue;
            }
            let next = match event.new_value.as_deref() {
                None => self.default.clone(),
                Some(raw) => match decode_or_warn::<T>(&self.key, raw) {
                    Some(next) => next,
                    None => continue,
                },
            };
            if next != self.value {
                debug!(key = %self.key, source = event.source.get(), "layout changed by another instance");
                self.value = next;
                changed = true;
            }
        }

        changed.then_some(&self.value)
    }

    fn next_event(&mut self) -> Option<StorageEvent> {
        let events = self.events.as_ref()?;
        match events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                debug!(key = %self.key, "storage change feed closed");
                self.events = None;
                None
            }
        }
    }

    fn write(&self) {
        let Some(storage) = self.storage.as_deref() else {
            return;
        };

        let encoded = if self.value == self.default {
            None
        } else {
            self.value.encode()
        };

        let result = match encoded {
            Some(raw) => storage.set_item(&self.key, &raw, self.instance),
            None => storage.remove_item(&self.key, self.instance),
        };

        if let Err(err) = result {
            warn!(key = %self.key, error = %err, "layout not persisted; keeping it for this session");
        }
    }
}

fn decode_or_warn<T: LayoutPayload>(key: &str, raw: &str) -> Option<T> {
    match T::decode(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "ignoring malformed stored layout");
            None
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PersistedLayout<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedLayout")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("default", &self.default)
            .field("instance", &self.instance)
            .field("subscribed", &self.events.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{column_ids, ColumnId, ColumnWidth};
    use crate::sync::MemoryStorage;

    fn storage() -> Rc<MemoryStorage> {
        Rc::new(MemoryStorage::new())
    }

    fn width(px: u32) -> ColumnWidth {
        ColumnWidth::new(px).expect("positive width")
    }

    #[test]
    fn missing_key_loads_default() {
        let store = storage();
        let layout = PersistedLayout::open("k", column_ids(["a", "b"]), Some(store));
        assert_eq!(layout.value(), &column_ids(["a", "b"]));
    }

    #[test]
    fn malformed_value_loads_default() {
        let store = storage();
        store.seed("k", "not json");
        let layout: PersistedLayout<ColumnSizing> =
            PersistedLayout::open("k", ColumnSizing::new(), Some(store));
        assert!(layout.value().is_empty());
    }

    #[test]
    fn default_value_deletes_the_key() {
        let store = storage();
        let default = column_ids(["a", "b"]);
        let mut layout = PersistedLayout::open("k", default.clone(), Some(store.clone()));

        layout.persist(column_ids(["b", "a"]));
        assert_eq!(store.get_item("k").as_deref(), Some(r#"["b","a"]"#));

        layout.persist(default);
        assert_eq!(store.get_item("k"), None);
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let store = Rc::new(MemoryStorage::unavailable());
        let mut layout = PersistedLayout::open("k", ColumnSizing::new(), Some(store));

        let sizes = ColumnSizing::from([(ColumnId::from("a"), width(120))]);
        assert!(layout.persist(sizes.clone()));

        assert_eq!(layout.value(), &sizes);
    }

    #[test]
    fn other_instance_changes_are_applied() {
        let store = storage();
        let mut first = PersistedLayout::open("k", ColumnSizing::new(), Some(store.clone()));
        let mut second = PersistedLayout::open("k", ColumnSizing::new(), Some(store.clone()));

        let sizes = ColumnSizing::from([(ColumnId::from("a"), width(80))]);
        first.persist(sizes.clone());

        assert_eq!(second.sync_storage(), Some(&sizes));
        assert_eq!(first.sync_storage(), None, "own writes are ignored");
    }

    #[test]
    fn removal_by_other_instance_restores_default() {
        let store = storage();
        let default = column_ids(["a", "b"]);
        let mut first = PersistedLayout::open("k", default.clone(), Some(store.clone()));
        let mut second = PersistedLayout::open("k", default.clone(), Some(store.clone()));

        first.persist(column_ids(["b", "a"]));
        second.sync_storage();
        first.persist(default.clone());

        assert_eq!(second.sync_storage(), Some(&default));
    }

    #[test]
    fn other_keys_and_malformed_events_are_ignored() {
        let store = storage();
        let mut layout: PersistedLayout<ColumnOrder> =
            PersistedLayout::open("k", Vec::new(), Some(store.clone()));
        let other = InstanceId::next();

        store.set_item("other", r#"["x"]"#, other).expect("write");
        store.set_item("k", "{broken", other).expect("write");

        assert_eq!(layout.sync_storage(), None);
        assert!(layout.value().is_empty());
    }

    #[test]
    fn works_without_storage() {
        let mut layout = PersistedLayout::open("k", column_ids(["a"]), None);
        assert!(!layout.is_subscribed());
        assert!(layout.persist(Vec::new()));
        assert_eq!(layout.sync_storage(), None);
    }
}
