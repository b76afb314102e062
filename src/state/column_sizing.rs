//! Column sizing manager.
//!
//! Tracks the resize session and the per-column widths. Width computation
//! from pointer movement belongs to the rendering layer; it reports results
//! through [`ColumnSizingState::set_column_width`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use super::persisted::PersistedLayout;
use crate::condition::Condition;
use crate::model::{ColumnId, ColumnSizing, ColumnWidth};
use crate::sync::{storage_key, Storage};

/// Default storage namespace for column widths.
pub const DEFAULT_SIZING_NAMESPACE: &str = "column-sizing";

/// Callback receiving the full width map after each commit.
pub type SizesChanged = Box<dyn FnMut(&ColumnSizing)>;

/// Document-level pointer events that end a resize session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalPointerEvent {
    /// Mouse button released anywhere.
    Up,
    /// Touch lifted anywhere.
    TouchEnd,
    /// Pointer capture lost.
    Cancel,
}

/// Configuration for a [`ColumnSizingState`].
#[derive(Debug, Clone)]
pub struct ColumnSizingOptions {
    /// Table identity; two tables never share a storage key.
    pub table_id: String,
    /// Storage key namespace.
    pub namespace: String,
    /// Widths restored by a reset. Absent ids use the renderer's width.
    pub default_sizes: ColumnSizing,
    /// Whether a column shows a resize handle.
    pub resizable: Condition<ColumnId>,
}

impl ColumnSizingOptions {
    /// Options for `table_id` with default namespace and no default widths.
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            namespace: DEFAULT_SIZING_NAMESPACE.to_string(),
            default_sizes: ColumnSizing::new(),
            resizable: Condition::default(),
        }
    }
}

/// Column sizing manager.
pub struct ColumnSizingState {
    layout: PersistedLayout<ColumnSizing>,
    resizable: Condition<ColumnId>,
    resizing: Option<ColumnId>,
    listening: bool,
    on_change: Option<SizesChanged>,
}

impl fmt::Debug for ColumnSizingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSizingState")
            .field("sizes", self.layout.value())
            .field("resizing", &self.resizing)
            .field("listening", &self.listening)
            .finish()
    }
}

impl ColumnSizingState {
    /// Load stored widths for the table, falling back to the defaults.
    pub fn new(options: ColumnSizingOptions, storage: Option<Rc<dyn Storage>>) -> Self {
        let key = storage_key(&options.namespace, &options.table_id);
        Self {
            layout: PersistedLayout::open(key, options.default_sizes, storage),
            resizable: options.resizable,
            resizing: None,
            listening: false,
            on_change: None,
        }
    }

    /// Register the change callback, replacing any previous one.
    pub fn set_on_change(&mut self, on_change: impl FnMut(&ColumnSizing) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    /// Current widths.
    pub fn sizes(&self) -> &ColumnSizing {
        self.layout.value()
    }

    /// Width of one column, if set.
    pub fn width(&self, id: &ColumnId) -> Option<ColumnWidth> {
        self.layout.value().get(id).copied()
    }

    /// Whether a resize session is active.
    pub fn is_resizing(&self) -> bool {
        self.resizing.is_some()
    }

    /// Column being resized.
    pub fn resizing_column_id(&self) -> Option<&ColumnId> {
        self.resizing.as_ref()
    }

    /// Whether the global pointer listener is attached.
    pub fn is_listening_globally(&self) -> bool {
        self.listening
    }

    /// Whether `id` can be resized.
    pub fn is_resizable(&self, id: &ColumnId) -> bool {
        self.resizable.resolve(id)
    }

    /// Pointer went down on `id`'s resize handle.
    ///
    /// Attaches the global listener. Returns `false` for non-resizable columns.
    pub fn begin_resize(&mut self, id: &ColumnId) -> bool {
        if !self.is_resizable(id) {
            debug!(column = %id, "resize refused");
            return false;
        }
        debug!(column = %id, "resize started");
        self.resizing = Some(id.clone());
        self.listening = true;
        true
    }

    /// Commit a width computed by the renderer.
    ///
    /// Returns `true` when the widths changed.
    pub fn set_column_width(&mut self, id: &ColumnId, width: ColumnWidth) -> bool {
        if !self.is_resizable(id) {
            return false;
        }
        let mut sizes = self.layout.value().clone();
        sizes.insert(id.clone(), width);
        self.commit(sizes)
    }

    /// Replace every width.
    pub fn set_sizes(&mut self, sizes: ColumnSizing) -> bool {
        self.commit(sizes)
    }

    /// Route a document-level pointer event.
    ///
    /// Ends the session wherever the pointer is. Returns `true` if a session
    /// ended.
    pub fn handle_global_pointer(&mut self, event: GlobalPointerEvent) -> bool {
        if !self.listening {
            return false;
        }
        debug!(?event, "global pointer event ends resize");
        self.end_resize();
        true
    }

    /// End the resize session and detach the global listener.
    pub fn end_resize(&mut self) {
        self.resizing = None;
        self.listening = false;
    }

    /// Restore the default widths and delete the stored value.
    pub fn reset_sizes(&mut self) -> bool {
        let defaults = self.layout.default_value().clone();
        self.commit(defaults)
    }

    /// Apply changes made by other instances of the same table.
    ///
    /// Returns `true` when the widths changed.
    pub fn sync_storage(&mut self) -> bool {
        if self.layout.sync_storage().is_none() {
            return false;
        }
        self.notify();
        true
    }

    fn commit(&mut self, sizes: ColumnSizing) -> bool {
        if !self.layout.persist(sizes) {
            return false;
        }
        self.notify();
        true
    }

    fn notify(&mut self) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(self.layout.value());
        }
    }
}

#[cfg(test)]
#[path = "column_sizing_tests.rs"]
mod tests;
