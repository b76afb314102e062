//! Trailing-edge debounced value.
//!
//! Time is injected: callers pass monotonic milliseconds, and the host event
//! loop calls [`Debounced::poll`] when [`Debounced::deadline_ms`] is reached.

/// A rapidly changing value and its settled copy.
///
/// # Invariants
/// - `committed` only changes in `poll` (once the deadline passes) or
///   `commit_now`.
/// - `is_pending()` is true exactly while `raw != committed` and a commit is
///   scheduled.
/// - Only the last value of a burst is ever committed.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    raw: T,
    committed: T,
    delay_ms: u64,
    deadline_ms: Option<u64>,
}

impl<T: Clone + PartialEq> Debounced<T> {
    /// Create a settled value.
    pub fn new(initial: T, delay_ms: u64) -> Self {
        Self {
            raw: initial.clone(),
            committed: initial,
            delay_ms,
            deadline_ms: None,
        }
    }

    /// Record a new raw value at `now_ms`.
    ///
    /// Replaces any scheduled commit with one `delay_ms` from now. A value
    /// equal to the committed one cancels the schedule instead.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::state::Debounced;
    /// let mut search = Debounced::new(String::new(), 300);
    /// search.set("a".to_string(), 0);
    /// search.set("ab".to_string(), 50);
    /// search.set("abc".to_string(), 100);
    /// assert_eq!(search.poll(399), None);
    /// assert_eq!(search.poll(400).map(String::as_str), Some("abc"));
    /// assert!(!search.is_pending());
    /// ```
    pub fn set(&mut self, value: T, now_ms: u64) {
        self.raw = value;
        self.deadline_ms = if self.raw == self.committed {
            None
        } else {
            Some(now_ms.saturating_add(self.delay_ms))
        };
    }

    /// Commit the raw value if its deadline has passed.
    ///
    /// Returns the newly committed value, or `None` if nothing was due.
    pub fn poll(&mut self, now_ms: u64) -> Option<&T> {
        let deadline = self.deadline_ms?;
        if now_ms < deadline {
            return None;
        }
        self.deadline_ms = None;
        self.committed = self.raw.clone();
        Some(&self.committed)
    }

    /// Commit the raw value immediately, cancelling any schedule.
    ///
    /// Returns `true` if the committed value changed.
    pub fn commit_now(&mut self) -> bool {
        self.deadline_ms = None;
        if self.raw == self.committed {
            return false;
        }
        self.committed = self.raw.clone();
        true
    }

    /// Drop the scheduled commit without committing.
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    /// Latest input value.
    pub fn raw(&self) -> &T {
        &self.raw
    }

    /// Settled value.
    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// Whether a commit is scheduled.
    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// When the scheduled commit is due.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Debounce window in milliseconds.
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }
}
