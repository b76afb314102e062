//! Column order manager.
//!
//! Drag-and-drop reordering of a table's columns, persisted per table
//! identity and kept in sync across instances.
//!
//! ```text
//! Idle --drag_start(src)--> Dragging{src, target: None}
//! Dragging --drag_over(t)--> Dragging{src, target: Some(t)}
//! Dragging --drag_leave(t)--> Dragging{src, target: None}
//! Dragging --drop(t)--> Idle            (order committed unless t == src)
//! Dragging --drag_end--> Idle           (order unchanged)
//! ```

use std::fmt;
use std::rc::Rc;
use tracing::debug;

use super::persisted::PersistedLayout;
use crate::condition::Condition;
use crate::model::{ColumnId, ColumnOrder};
use crate::sync::{storage_key, Storage};

/// Default storage namespace for column order.
pub const DEFAULT_ORDER_NAMESPACE: &str = "column-order";

/// Callback receiving the full order after each commit.
pub type OrderChanged = Box<dyn FnMut(&[ColumnId])>;

/// Configuration for a [`ColumnOrderState`].
#[derive(Debug, Clone)]
pub struct ColumnOrderOptions {
    /// Table identity; two tables never share a storage key.
    pub table_id: String,
    /// Storage key namespace.
    pub namespace: String,
    /// Known columns in natural order.
    pub columns: Vec<ColumnId>,
    /// Whether a column can be picked up.
    pub draggable: Condition<ColumnId>,
}

impl ColumnOrderOptions {
    /// Options for `table_id` with default namespace, every column draggable.
    pub fn new(table_id: impl Into<String>, columns: Vec<ColumnId>) -> Self {
        Self {
            table_id: table_id.into(),
            namespace: DEFAULT_ORDER_NAMESPACE.to_string(),
            columns,
            draggable: Condition::default(),
        }
    }
}

/// Column order manager.
///
/// # Invariants
/// - `order()` is always a permutation of the known columns.
/// - Drag hover never changes `order()`; only a drop or an explicit setter
///   commits.
pub struct ColumnOrderState {
    columns: Vec<ColumnId>,
    layout: PersistedLayout<ColumnOrder>,
    draggable: Condition<ColumnId>,
    dragging: Option<ColumnId>,
    drop_target: Option<ColumnId>,
    on_change: Option<OrderChanged>,
}

impl fmt::Debug for ColumnOrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnOrderState")
            .field("order", self.layout.value())
            .field("dragging", &self.dragging)
            .field("drop_target", &self.drop_target)
            .finish()
    }
}

impl ColumnOrderState {
    /// Load the stored order for the table, falling back to natural order.
    ///
    /// Stored ids that are no longer known are dropped; known ids missing
    /// from storage are appended in natural order.
    pub fn new(options: ColumnOrderOptions, storage: Option<Rc<dyn Storage>>) -> Self {
        let key = storage_key(&options.namespace, &options.table_id);
        let mut layout = PersistedLayout::open(key, options.columns.clone(), storage);
        let order = normalize_order(layout.value(), &options.columns);
        layout.replace_in_memory(order);

        Self {
            columns: options.columns,
            layout,
            draggable: options.draggable,
            dragging: None,
            drop_target: None,
            on_change: None,
        }
    }

    /// Register the change callback, replacing any previous one.
    pub fn set_on_change(&mut self, on_change: impl FnMut(&[ColumnId]) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    /// Current order.
    pub fn order(&self) -> &[ColumnId] {
        self.layout.value()
    }

    /// Known columns in natural order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    /// Column being dragged.
    pub fn dragging(&self) -> Option<&ColumnId> {
        self.dragging.as_ref()
    }

    /// Column under the pointer during a drag.
    pub fn drop_target(&self) -> Option<&ColumnId> {
        self.drop_target.as_ref()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Whether `id` can be picked up.
    pub fn is_draggable(&self, id: &ColumnId) -> bool {
        self.columns.contains(id) && self.draggable.resolve(id)
    }

    /// Pick up `id`. Returns `false` for unknown or non-draggable columns.
    pub fn drag_start(&mut self, id: &ColumnId) -> bool {
        if !self.is_draggable(id) {
            debug!(column = %id, "drag refused");
            return false;
        }
        self.dragging = Some(id.clone());
        self.drop_target = None;
        true
    }

    /// Record the hovered drop target. Never reorders.
    pub fn drag_over(&mut self, id: &ColumnId) {
        if self.dragging.is_none() || !self.columns.contains(id) {
            return;
        }
        if self.drop_target.as_ref() != Some(id) {
            self.drop_target = Some(id.clone());
        }
    }

    /// Clear the hovered target if the pointer left it.
    pub fn drag_leave(&mut self, id: &ColumnId) {
        if self.drop_target.as_ref() == Some(id) {
            self.drop_target = None;
        }
    }

    /// Drop the dragged column onto `target`.
    ///
    /// Ends the drag. Returns `true` when the order changed; a drop onto the
    /// dragged column itself is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::state::{ColumnOrderOptions, ColumnOrderState};
    /// # use viewsync::model::{column_ids, ColumnId};
    /// let options = ColumnOrderOptions::new("users", column_ids(["a", "b", "c"]));
    /// let mut order = ColumnOrderState::new(options, None);
    /// order.drag_start(&ColumnId::from("a"));
    /// order.drop(&ColumnId::from("c"));
    /// assert_eq!(order.order(), column_ids(["b", "c", "a"]).as_slice());
    /// ```
    pub fn drop(&mut self, target: &ColumnId) -> bool {
        self.drop_target = None;
        let Some(source) = self.dragging.take() else {
            return false;
        };
        if &source == target {
            return false;
        }
        self.move_column(&source, target)
    }

    /// Abandon the drag without reordering.
    pub fn drag_end(&mut self) {
        self.dragging = None;
        self.drop_target = None;
    }

    /// Move `source` to the position `target` currently occupies.
    ///
    /// Returns `true` when the order changed.
    pub fn move_column(&mut self, source: &ColumnId, target: &ColumnId) -> bool {
        let mut order = self.layout.value().clone();
        let (Some(from), Some(to)) = (
            order.iter().position(|c| c == source),
            order.iter().position(|c| c == target),
        ) else {
            return false;
        };
        if from == to {
            return false;
        }
        let moved = order.remove(from);
        order.insert(to, moved);
        debug!(column = %source, from, to, "column moved");
        self.commit(order)
    }

    /// Replace the order. Unknown ids are dropped and missing ones appended.
    pub fn set_order(&mut self, order: &[ColumnId]) -> bool {
        let order = normalize_order(order, &self.columns);
        self.commit(order)
    }

    /// Restore natural order and delete the stored value.
    pub fn reset_order(&mut self) -> bool {
        self.commit(self.columns.clone())
    }

    /// Change the known columns, keeping the relative order of survivors.
    pub fn set_columns(&mut self, columns: Vec<ColumnId>) -> bool {
        let order = normalize_order(self.layout.value(), &columns);
        self.layout.set_default(columns.clone());
        self.columns = columns;
        if self.dragging.as_ref().is_some_and(|d| !self.columns.contains(d)) {
            self.drag_end();
        }
        self.commit(order)
    }

    /// Apply changes made by other instances of the same table.
    ///
    /// Returns `true` when the order changed.
    pub fn sync_storage(&mut self) -> bool {
        let Some(stored) = self.layout.sync_storage() else {
            return false;
        };
        let order = normalize_order(stored, &self.columns);
        self.layout.replace_in_memory(order);
        self.notify();
        true
    }

    fn commit(&mut self, order: ColumnOrder) -> bool {
        if !self.layout.persist(order) {
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

/// Make `stored` a permutation of `columns`.
fn normalize_order(stored: &[ColumnId], columns: &[ColumnId]) -> ColumnOrder {
    let mut order: ColumnOrder = Vec::with_capacity(columns.len());
    for id in stored {
        if columns.contains(id) && !order.contains(id) {
            order.push(id.clone());
        }
    }
    for id in columns {
        if !order.contains(id) {
            order.push(id.clone());
        }
    }
    order
}

#[cfg(test)]
#[path = "column_order_tests.rs"]
mod tests;
