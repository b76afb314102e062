//! Sort state manager.
//!
//! Per-field state machine:
//!
//! ```text
//! Unsorted --toggle--> Ascending --toggle--> Descending --toggle--> Unsorted
//! ```
//!
//! In single mode the whole state is one field's machine, and moving a field
//! out of `Unsorted` evicts every other field. In multi mode each field runs
//! its own machine and leaving `Descending` splices the field out of the
//! ordered list. `set_single_sort`/`add_sort` jump straight to a direction.
//!
//! Transitions apply at once; the URL write and the callback wait for
//! [`SortState::flush`], so several clicks handled in one frame commit once.

use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::codec::{decode_sort, encode_sort, normalize_sort_rules, DEFAULT_SORT_PARAM};
use crate::model::{SortDirection, SortMode, SortRule, SortSpec};
use crate::sync::{rewrite_query, History, HistoryMode};

/// Callback receiving the settled sort after each commit.
pub type SortChanged = Box<dyn FnMut(&SortSpec)>;

/// Configuration for a [`SortState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Sort applied when the URL carries none.
    pub initial: Vec<SortRule>,
    /// Single or multi sort. Fixed for the manager's lifetime.
    pub mode: SortMode,
    /// Mirror the sort into the query string.
    pub sync_with_url: bool,
    /// Name of the query parameter.
    pub param_name: String,
    /// Whether URL writes replace or push history entries.
    pub history_mode: HistoryMode,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            initial: Vec::new(),
            mode: SortMode::Single,
            sync_with_url: true,
            param_name: DEFAULT_SORT_PARAM.to_string(),
            history_mode: HistoryMode::Replace,
        }
    }
}

/// Sort state manager.
pub struct SortState {
    rules: Vec<SortRule>,
    committed: Vec<SortRule>,
    options: SortOptions,
    history: Option<Rc<dyn History>>,
    on_change: Option<SortChanged>,
}

impl fmt::Debug for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortState")
            .field("rules", &self.rules)
            .field("options", &self.options)
            .field("has_history", &self.history.is_some())
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl SortState {
    /// Create the manager and mirror the resolved sort to the URL.
    ///
    /// A valid URL value wins over `options.initial`; a malformed one is
    /// logged and ignored.
    pub fn new(options: SortOptions, history: Option<Rc<dyn History>>) -> Self {
        let mut state = Self {
            rules: Vec::new(),
            committed: Vec::new(),
            options,
            history,
            on_change: None,
        };
        state.rules = state.resolve_from_sources();
        state.committed = state.rules.clone();
        state.write_url(HistoryMode::Replace);
        debug!(rules = ?state.rules, "sort state initialized");
        state
    }

    /// Register the change callback, replacing any previous one.
    pub fn set_on_change(&mut self, on_change: impl FnMut(&SortSpec) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    /// Builder form of [`set_on_change`](Self::set_on_change).
    pub fn with_on_change(mut self, on_change: impl FnMut(&SortSpec) + 'static) -> Self {
        self.set_on_change(on_change);
        self
    }

    /// Configured mode.
    pub fn mode(&self) -> SortMode {
        self.options.mode
    }

    /// Current rules in priority order.
    pub fn rules(&self) -> &[SortRule] {
        &self.rules
    }

    /// Current sort in the shape of the configured mode.
    pub fn spec(&self) -> SortSpec {
        SortSpec::from_rules(self.options.mode, &self.rules)
    }

    /// Replace the whole sort.
    ///
    /// A multi spec handed to a single-mode manager keeps its first rule.
    pub fn set_sort(&mut self, spec: SortSpec) {
        let rules = match spec {
            SortSpec::Single(rule) => rule.into_iter().collect(),
            SortSpec::Multi(rules) => rules,
        };
        self.replace(normalize_sort_rules(rules, self.options.mode));
    }

    /// Sort by exactly one field, dropping every other rule.
    pub fn set_single_sort(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.replace(vec![SortRule::new(field, direction)]);
    }

    /// Advance `field` one step through its state machine.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::state::{SortOptions, SortState};
    /// # use viewsync::model::{SortRule, SortSpec};
    /// let mut sort = SortState::new(SortOptions::default(), None);
    /// sort.toggle_sort("name");
    /// assert_eq!(sort.spec(), SortSpec::Single(Some(SortRule::asc("name"))));
    /// sort.toggle_sort("name");
    /// assert_eq!(sort.spec(), SortSpec::Single(Some(SortRule::desc("name"))));
    /// sort.toggle_sort("name");
    /// assert_eq!(sort.spec(), SortSpec::Single(None));
    /// ```
    pub fn toggle_sort(&mut self, field: &str) {
        let mut rules = self.rules.clone();
        let position = rules.iter().position(|r| r.field == field);

        match (self.options.mode, position) {
            (SortMode::Single, None) => rules = vec![SortRule::asc(field)],
            (SortMode::Multi, None) => rules.push(SortRule::asc(field)),
            (_, Some(i)) => match rules[i].direction {
                SortDirection::Asc => rules[i].direction = SortDirection::Desc,
                SortDirection::Desc => {
                    rules.remove(i);
                }
            },
        }

        self.replace(rules);
    }

    /// Add or update one field in multi mode. No-op in single mode.
    ///
    /// An existing field keeps its priority and takes the new direction; a
    /// new field is appended with the lowest priority.
    pub fn add_sort(&mut self, field: impl Into<String>, direction: SortDirection) {
        if self.options.mode == SortMode::Single {
            debug!("add_sort ignored in single-sort mode");
            return;
        }

        let field = field.into();
        let mut rules = self.rules.clone();
        match rules.iter_mut().find(|r| r.field == field) {
            Some(rule) => rule.direction = direction,
            None => rules.push(SortRule::new(field, direction)),
        }
        self.replace(rules);
    }

    /// Stop sorting by `field`.
    pub fn remove_sort(&mut self, field: &str) {
        let rules = self
            .rules
            .iter()
            .filter(|r| r.field != field)
            .cloned()
            .collect();
        self.replace(rules);
    }

    /// Stop sorting entirely.
    pub fn clear_sort(&mut self) {
        self.replace(Vec::new());
    }

    /// Direction of `field`, if sorted.
    pub fn get_sort_direction(&self, field: &str) -> Option<SortDirection> {
        self.rules
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.direction)
    }

    /// Whether `field` is sorted.
    pub fn is_sorted(&self, field: &str) -> bool {
        self.get_sort_direction(field).is_some()
    }

    /// Whether any field is sorted.
    pub fn has_sort(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Commit the current sort if it differs from the last commit.
    ///
    /// Returns `true` if the URL was mirrored and the callback fired.
    pub fn flush(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.committed = self.rules.clone();
        debug!(rules = ?self.rules, "sort committed");
        self.write_url(self.options.history_mode);
        self.notify();
        true
    }

    /// Whether a transition is waiting for [`flush`](Self::flush).
    pub fn is_pending(&self) -> bool {
        self.rules != self.committed
    }

    /// Re-read the sort from the URL after back/forward navigation.
    ///
    /// Does not write the URL; fires the callback when the sort changed.
    /// An uncommitted transition is dropped.
    pub fn sync_from_url(&mut self) {
        if !(self.options.sync_with_url && self.history.is_some()) {
            return;
        }
        let next = self.resolve_from_sources();
        self.rules = next.clone();
        if next != self.committed {
            debug!(rules = ?next, "sort rehydrated from URL");
            self.committed = next;
            self.notify();
        }
    }

    fn resolve_from_sources(&self) -> Vec<SortRule> {
        let initial = || normalize_sort_rules(self.options.initial.clone(), self.options.mode);

        let Some(history) = self.history.as_deref().filter(|_| self.options.sync_with_url) else {
            return initial();
        };

        let query = history.query();
        let params = crate::codec::QueryParams::parse(&query);
        let Some(raw) = params.get(&self.options.param_name) else {
            return initial();
        };

        match decode_sort(raw, self.options.mode) {
            Ok(rules) => rules,
            Err(err) => {
                warn!(param = %self.options.param_name, error = %err, "ignoring malformed sort parameter");
                initial()
            }
        }
    }

    fn replace(&mut self, rules: Vec<SortRule>) {
        self.rules = rules;
    }

    fn write_url(&self, mode: HistoryMode) {
        let Some(history) = self.history.as_deref().filter(|_| self.options.sync_with_url) else {
            return;
        };
        let encoded = encode_sort(&self.rules, self.options.mode);
        rewrite_query(history, mode, |params| {
            params.set(&self.options.param_name, encoded);
        });
    }

    fn notify(&mut self) {
        let spec = self.spec();
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&spec);
        }
    }
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
