//! Search state manager.
//!
//! Wraps a [`Debounced`] query string with optional URL mirroring and an
//! optional set of active search columns. Only committed (debounced) values
//! reach the URL and the caller's callback.

use std::fmt;
use std::rc::Rc;
use tracing::debug;

use super::debounce::Debounced;
use crate::codec::{QueryParams, DEFAULT_SEARCH_PARAM};
use crate::model::ColumnId;
use crate::sync::{rewrite_query, History, HistoryMode};

/// Default debounce window.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Callback receiving the committed query and the active columns.
pub type SearchChanged = Box<dyn FnMut(&str, &[ColumnId])>;

/// Configuration for a [`SearchState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Query used when the URL carries none.
    pub initial: String,
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Mirror the committed query into the query string. Off by default.
    pub sync_with_url: bool,
    /// Name of the query parameter.
    pub param_name: String,
    /// Whether URL writes replace or push history entries.
    pub history_mode: HistoryMode,
    /// Columns the query may be scoped to. Empty disables scoping.
    pub searchable_columns: Vec<ColumnId>,
    /// Initially active columns. `None` activates every searchable column.
    pub initial_active_columns: Option<Vec<ColumnId>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            initial: String::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            sync_with_url: false,
            param_name: DEFAULT_SEARCH_PARAM.to_string(),
            history_mode: HistoryMode::Replace,
            searchable_columns: Vec::new(),
            initial_active_columns: None,
        }
    }
}

/// Search state manager.
///
/// # Invariants
/// - `query()` changes only on commit: debounce expiry in [`poll`](Self::poll),
///   [`clear_search`](Self::clear_search) or [`sync_from_url`](Self::sync_from_url).
/// - `active_columns()` is always a subset of the searchable columns, kept
///   in their configured order.
pub struct SearchState {
    query: Debounced<String>,
    active_columns: Vec<ColumnId>,
    options: SearchOptions,
    history: Option<Rc<dyn History>>,
    on_search: Option<SearchChanged>,
}

impl fmt::Debug for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchState")
            .field("query", &self.query)
            .field("active_columns", &self.active_columns)
            .field("options", &self.options)
            .field("has_history", &self.history.is_some())
            .finish()
    }
}

impl SearchState {
    /// Create the manager.
    ///
    /// The initial query comes from the URL when syncing is enabled and the
    /// parameter is present, otherwise from `options.initial`.
    pub fn new(options: SearchOptions, history: Option<Rc<dyn History>>) -> Self {
        let active_columns = match &options.initial_active_columns {
            Some(ids) => options
                .searchable_columns
                .iter()
                .filter(|c| ids.contains(c))
                .cloned()
                .collect(),
            None => options.searchable_columns.clone(),
        };
        let mut state = Self {
            query: Debounced::new(String::new(), options.debounce_ms),
            active_columns,
            options,
            history,
            on_search: None,
        };
        let initial = state.resolve_from_sources();
        state.query = Debounced::new(initial, state.options.debounce_ms);
        state.write_url(HistoryMode::Replace);
        debug!(query = %state.query.committed(), "search state initialized");
        state
    }

    /// Register the search callback, replacing any previous one.
    pub fn set_on_search(&mut self, on_search: impl FnMut(&str, &[ColumnId]) + 'static) {
        self.on_search = Some(Box::new(on_search));
    }

    /// Builder form of [`set_on_search`](Self::set_on_search).
    pub fn with_on_search(mut self, on_search: impl FnMut(&str, &[ColumnId]) + 'static) -> Self {
        self.set_on_search(on_search);
        self
    }

    /// Latest keystroke value.
    pub fn raw(&self) -> &str {
        self.query.raw()
    }

    /// Committed (debounced) query.
    pub fn query(&self) -> &str {
        self.query.committed()
    }

    /// Whether a commit is scheduled.
    pub fn is_pending(&self) -> bool {
        self.query.is_pending()
    }

    /// Whether the committed query is non-empty.
    pub fn has_search(&self) -> bool {
        !self.query.committed().is_empty()
    }

    /// When the host must call [`poll`](Self::poll) next.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.query.deadline_ms()
    }

    /// Currently active search columns.
    pub fn active_columns(&self) -> &[ColumnId] {
        &self.active_columns
    }

    /// Columns the query may be scoped to.
    pub fn searchable_columns(&self) -> &[ColumnId] {
        &self.options.searchable_columns
    }

    /// Record a keystroke at `now_ms`. Commits after the debounce window.
    pub fn set_search(&mut self, value: impl Into<String>, now_ms: u64) {
        self.query.set(value.into(), now_ms);
    }

    /// Empty the query immediately.
    pub fn clear_search(&mut self, now_ms: u64) {
        self.query.set(String::new(), now_ms);
        if self.query.commit_now() {
            self.flush();
        }
    }

    /// Commit the query if its deadline has passed.
    ///
    /// Returns `true` when a commit happened.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.query.poll(now_ms).is_none() {
            return false;
        }
        self.flush();
        true
    }

    /// Activate or deactivate one searchable column.
    ///
    /// Ids outside the searchable set are ignored. The callback runs only
    /// when a query is committed.
    pub fn toggle_column(&mut self, id: &ColumnId) {
        if !self.options.searchable_columns.contains(id) {
            debug!(column = %id, "ignoring toggle of non-searchable column");
            return;
        }
        let next: Vec<ColumnId> = if self.active_columns.contains(id) {
            self.active_columns
                .iter()
                .filter(|c| *c != id)
                .cloned()
                .collect()
        } else {
            self.options
                .searchable_columns
                .iter()
                .filter(|c| *c == id || self.active_columns.contains(c))
                .cloned()
                .collect()
        };
        self.replace_columns(next);
    }

    /// Replace the active column set.
    pub fn set_active_columns(&mut self, ids: &[ColumnId]) {
        let next = self
            .options
            .searchable_columns
            .iter()
            .filter(|c| ids.contains(c))
            .cloned()
            .collect();
        self.replace_columns(next);
    }

    /// Re-read the query from the URL after back/forward navigation.
    ///
    /// Commits immediately without writing the URL.
    pub fn sync_from_url(&mut self) {
        if !(self.options.sync_with_url && self.history.is_some()) {
            return;
        }
        let next = self.resolve_from_sources();
        let changed = next != *self.query.committed();
        self.query = Debounced::new(next, self.options.debounce_ms);
        if changed {
            debug!(query = %self.query.committed(), "search rehydrated from URL");
            self.notify();
        }
    }

    fn resolve_from_sources(&self) -> String {
        if let (true, Some(history)) = (self.options.sync_with_url, &self.history) {
            if let Some(raw) = QueryParams::parse(&history.query()).get(&self.options.param_name) {
                return raw.to_owned();
            }
        }
        self.options.initial.clone()
    }

    fn replace_columns(&mut self, next: Vec<ColumnId>) {
        if next == self.active_columns {
            return;
        }
        self.active_columns = next;
        debug!(columns = ?self.active_columns, "active search columns changed");
        if self.has_search() {
            self.notify();
        }
    }

    fn flush(&mut self) {
        debug!(query = %self.query.committed(), "search committed");
        self.write_url(self.options.history_mode);
        self.notify();
    }

    fn write_url(&self, mode: HistoryMode) {
        let Some(history) = self.history.as_deref().filter(|_| self.options.sync_with_url) else {
            return;
        };
        let value = Some(self.query.committed().clone()).filter(|q| !q.is_empty());
        rewrite_query(history, mode, |params| {
            params.set(&self.options.param_name, value);
        });
    }

    fn notify(&mut self) {
        if let Some(on_search) = self.on_search.as_mut() {
            on_search(self.query.committed(), &self.active_columns);
        }
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
