//! Filter state manager.
//!
//! Owns the active [`FilterMap`]. Initial state merges caller-supplied values
//! with values decoded from the query string (URL wins per key).
//!
//! Single mutations update the map at once but defer the commit: the URL
//! write and the change callback happen on the next [`FilterState::flush`],
//! so a burst of `set_filter` calls within one frame is one transition.
//! `set_multiple_filters` and `batch_update` commit when they return.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use crate::codec::{decode_filters, encode_filters, QueryParams, DEFAULT_FILTER_PREFIX};
use crate::model::{is_cleared, FilterMap};
use crate::sync::{rewrite_query, History, HistoryMode};

/// Callback receiving the full filter map after each commit.
pub type FiltersChanged = Box<dyn FnMut(&FilterMap)>;

/// Configuration for a [`FilterState`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Values applied when neither the URL nor the user supplies one.
    pub initial: FilterMap,
    /// Mirror filters into the query string.
    pub sync_with_url: bool,
    /// Prefix shared by every filter parameter.
    pub param_prefix: String,
    /// Whether URL writes replace or push history entries.
    pub history_mode: HistoryMode,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            initial: FilterMap::new(),
            sync_with_url: true,
            param_prefix: DEFAULT_FILTER_PREFIX.to_string(),
            history_mode: HistoryMode::Replace,
        }
    }
}

/// Filter state manager.
pub struct FilterState {
    filters: FilterMap,
    committed: FilterMap,
    options: FilterOptions,
    history: Option<Rc<dyn History>>,
    on_change: Option<FiltersChanged>,
    batch_depth: usize,
    commit_pending: bool,
}

impl fmt::Debug for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterState")
            .field("filters", &self.filters)
            .field("options", &self.options)
            .field("has_history", &self.history.is_some())
            .field("batch_depth", &self.batch_depth)
            .field("commit_pending", &self.commit_pending)
            .finish()
    }
}

impl FilterState {
    /// Create the manager and mirror the resolved state to the URL.
    ///
    /// Precedence per key: URL value > `options.initial` > absent.
    pub fn new(options: FilterOptions, history: Option<Rc<dyn History>>) -> Self {
        let mut state = Self {
            filters: FilterMap::new(),
            committed: FilterMap::new(),
            options,
            history,
            on_change: None,
            batch_depth: 0,
            commit_pending: false,
        };
        state.filters = state.resolve_from_sources();
        state.committed = state.filters.clone();
        state.write_url(HistoryMode::Replace);
        debug!(filters = ?state.filters, "filter state initialized");
        state
    }

    /// Register the change callback, replacing any previous one.
    pub fn set_on_change(&mut self, on_change: impl FnMut(&FilterMap) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    /// Builder form of [`set_on_change`](Self::set_on_change).
    pub fn with_on_change(mut self, on_change: impl FnMut(&FilterMap) + 'static) -> Self {
        self.set_on_change(on_change);
        self
    }

    /// Current filters.
    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    /// Options this manager was built with.
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Value of one filter.
    pub fn get_filter(&self, key: &str) -> Option<&Value> {
        self.filters.get(key)
    }

    /// Whether any filter is active.
    pub fn has_active_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Upsert one filter. `null`, `None` and `""` delete the key.
    ///
    /// The map changes at once; the commit waits for [`flush`](Self::flush).
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::state::{FilterOptions, FilterState};
    /// let mut filters = FilterState::new(FilterOptions::default(), None);
    /// filters.set_filter("status", "active");
    /// assert!(filters.has_active_filters());
    /// assert!(filters.flush());
    /// filters.set_filter("status", "");
    /// assert!(filters.get_filter("status").is_none());
    /// ```
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if apply_upsert(&mut self.filters, key.into(), value.into()) {
            self.commit();
        }
    }

    /// Apply many upserts and deletes as one transition, committed now.
    ///
    /// Produces at most one URL write and one callback.
    pub fn set_multiple_filters<I, K, V>(&mut self, partial: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.batch_update(|state| {
            for (key, value) in partial {
                if apply_upsert(&mut state.filters, key.into(), value.into()) {
                    state.commit();
                }
            }
        });
    }

    /// Remove one filter.
    pub fn remove_filter(&mut self, key: &str) {
        if self.filters.remove(key).is_some() {
            self.commit();
        }
    }

    /// Remove every filter.
    pub fn clear_filters(&mut self) {
        if !self.filters.is_empty() {
            self.filters.clear();
            self.commit();
        }
    }

    /// Run several mutations with a single commit at the end.
    ///
    /// Nested batches commit once, when the outermost batch finishes, and
    /// only if something changed. A change still pending from before the
    /// batch is committed with it.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.batch_depth = self.batch_depth.saturating_add(1);

        f(self);

        debug_assert!(self.batch_depth > 0, "batch_depth underflow");
        self.batch_depth = self.batch_depth.saturating_sub(1);

        if self.batch_depth == 0 {
            self.flush();
        }
    }

    /// Commit a pending change: one URL write and one callback.
    ///
    /// Hosts call this once per frame (`TableView::tick` does). Returns
    /// `true` if something was committed. Inside a batch the commit waits
    /// for the outermost batch to finish. Changes that cancel out commit
    /// nothing.
    pub fn flush(&mut self) -> bool {
        if self.batch_depth > 0 || !std::mem::take(&mut self.commit_pending) {
            return false;
        }
        if self.filters == self.committed {
            return false;
        }
        self.committed = self.filters.clone();
        debug!(filters = ?self.filters, "filters committed");
        self.write_url(self.options.history_mode);
        self.notify();
        true
    }

    /// Whether a change is waiting for [`flush`](Self::flush).
    pub fn is_pending(&self) -> bool {
        self.commit_pending
    }

    /// Re-read filters from the URL after back/forward navigation.
    ///
    /// Applies the initialization precedence again. Does not write the URL;
    /// fires the callback when the map changed. An uncommitted change is
    /// dropped.
    pub fn sync_from_url(&mut self) {
        if !self.url_enabled() {
            return;
        }
        self.commit_pending = false;
        let next = self.resolve_from_sources();
        self.filters = next.clone();
        if next != self.committed {
            debug!(filters = ?next, "filters rehydrated from URL");
            self.committed = next;
            self.notify();
        }
    }

    fn url_enabled(&self) -> bool {
        self.options.sync_with_url && self.history.is_some()
    }

    fn resolve_from_sources(&self) -> FilterMap {
        let mut filters: FilterMap = self
            .options
            .initial
            .iter()
            .filter(|(_, value)| !is_cleared(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if let (true, Some(history)) = (self.options.sync_with_url, &self.history) {
            let params = QueryParams::parse(&history.query());
            filters.extend(decode_filters(&params, &self.options.param_prefix));
        }
        filters
    }

    fn commit(&mut self) {
        self.commit_pending = true;
    }

    fn write_url(&self, mode: HistoryMode) {
        let Some(history) = self.history.as_deref().filter(|_| self.options.sync_with_url) else {
            return;
        };
        rewrite_query(history, mode, |params| {
            encode_filters(&self.filters, &self.options.param_prefix, params);
        });
    }

    fn notify(&mut self) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&self.filters);
        }
    }
}

/// Upsert or delete `key`. Returns whether the map changed.
fn apply_upsert(filters: &mut FilterMap, key: String, value: Value) -> bool {
    if is_cleared(&value) {
        return filters.remove(&key).is_some();
    }
    if filters.get(&key) == Some(&value) {
        return false;
    }
    filters.insert(key, value);
    true
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
