//! Address-bar query string mirror.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use tracing::trace;

use crate::codec::QueryParams;

/// Access to the host's current query string.
///
/// Methods take `&self`: one history is shared by every manager of a view,
/// so implementations use interior mutability. Writes must not reload the
/// page or move the scroll position.
pub trait History {
    /// Current query string, without a leading `?`.
    fn query(&self) -> String;

    /// Replace the current entry's query string (no new back-button entry).
    fn replace_query(&self, query: &str);

    /// Push a new history entry with this query string.
    fn push_query(&self, query: &str);
}

/// How URL writes land in the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Rewrite the current entry in place.
    #[default]
    Replace,
    /// Add an entry, making each change reachable with the back button.
    Push,
}

/// Edit the query string through `edit` and write it back when it changed.
///
/// Returns `true` if a write happened.
pub fn rewrite_query(
    history: &dyn History,
    mode: HistoryMode,
    edit: impl FnOnce(&mut QueryParams),
) -> bool {
    let before = history.query();
    let mut params = QueryParams::parse(&before);
    edit(&mut params);
    let after = params.to_query_string();

    if after == before.strip_prefix('?').unwrap_or(&before) {
        return false;
    }

    trace!(query = %after, ?mode, "rewriting query string");
    match mode {
        HistoryMode::Replace => history.replace_query(&after),
        HistoryMode::Push => history.push_query(&after),
    }
    true
}

/// In-memory history stack.
///
/// Stands in for a browser history in native hosts and tests; supports
/// `back`/`forward` to simulate navigation.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    cursor: Cell<usize>,
}

impl MemoryHistory {
    /// Create a history with one entry.
    pub fn new(initial_query: &str) -> Self {
        let initial = initial_query
            .strip_prefix('?')
            .unwrap_or(initial_query)
            .to_owned();
        Self {
            entries: RefCell::new(vec![initial]),
            cursor: Cell::new(0),
        }
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Always false: a history has at least one entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the current entry.
    pub fn position(&self) -> usize {
        self.cursor.get()
    }

    /// Move back one entry. Returns `false` at the start of the stack.
    pub fn back(&self) -> bool {
        let cursor = self.cursor.get();
        if cursor == 0 {
            return false;
        }
        self.cursor.set(cursor - 1);
        true
    }

    /// Move forward one entry. Returns `false` at the end of the stack.
    pub fn forward(&self) -> bool {
        let cursor = self.cursor.get();
        if cursor + 1 >= self.len() {
            return false;
        }
        self.cursor.set(cursor + 1);
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl History for MemoryHistory {
    fn query(&self) -> String {
        self.entries
            .borrow()
            .get(self.cursor.get())
            .cloned()
            .unwrap_or_default()
    }

    fn replace_query(&self, query: &str) {
        let mut entries = self.entries.borrow_mut();
        let cursor = self.cursor.get();
        if let Some(entry) = entries.get_mut(cursor) {
            *entry = query.to_owned();
        }
    }

    fn push_query(&self, query: &str) {
        let mut entries = self.entries.borrow_mut();
        let cursor = self.cursor.get();
        entries.truncate(cursor + 1);
        entries.push(query.to_owned());
        self.cursor.set(entries.len() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_keeps_single_entry() {
        let history = MemoryHistory::new("?a=1");
        history.replace_query("a=2");
        assert_eq!(history.len(), 1);
        assert_eq!(history.query(), "a=2");
    }

    #[test]
    fn push_truncates_forward_entries() {
        let history = MemoryHistory::new("");
        history.push_query("a=1");
        history.push_query("a=2");
        assert!(history.back());
        history.push_query("a=3");
        assert_eq!(history.len(), 3);
        assert!(!history.forward());
        assert_eq!(history.query(), "a=3");
    }

    #[test]
    fn back_and_forward_walk_the_stack() {
        let history = MemoryHistory::new("a=0");
        history.push_query("a=1");
        assert!(history.back());
        assert_eq!(history.query(), "a=0");
        assert!(!history.back());
        assert!(history.forward());
        assert_eq!(history.query(), "a=1");
    }

    #[test]
    fn rewrite_skips_identical_query() {
        let history = MemoryHistory::new("a=1");
        let wrote = rewrite_query(&history, HistoryMode::Push, |params| {
            params.set("a", Some("1".to_string()));
        });
        assert!(!wrote);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn rewrite_push_adds_entry() {
        let history = MemoryHistory::new("a=1");
        let wrote = rewrite_query(&history, HistoryMode::Push, |params| {
            params.set("b", Some("2".to_string()));
        });
        assert!(wrote);
        assert_eq!(history.len(), 2);
        assert_eq!(history.query(), "a=1&b=2");
    }
}
