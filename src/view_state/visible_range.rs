//! Visible range calculation result

use serde::Serialize;
use std::ops::Range;

/// Half-open range of row indices.
///
/// # Invariants
/// - `start_index <= end_index`
/// - `end_index <= total_rows` of the controller that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VisibleRange {
    /// Index of first row (inclusive).
    pub start_index: usize,
    /// Index past the last row (exclusive).
    pub end_index: usize,
}

impl VisibleRange {
    /// Create new visible range.
    ///
    /// # Panics
    /// In debug builds, panics if start_index > end_index.
    pub fn new(start_index: usize, end_index: usize) -> Self {
        debug_assert!(
            start_index <= end_index,
            "start_index {start_index} > end_index {end_index}"
        );
        Self {
            start_index,
            end_index,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Check if range is empty.
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Iterate over row indices.
    pub fn indices(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    /// Check if a specific row index is in range.
    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..self.end_index).contains(&index)
    }

    /// Widen by `overscan` rows on each side, clamped to `0..total_rows`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::view_state::VisibleRange;
    /// let range = VisibleRange::new(2, 6).expand(3, 7);
    /// assert_eq!(range, VisibleRange::new(0, 7));
    /// ```
    pub fn expand(&self, overscan: usize, total_rows: usize) -> Self {
        let end = self.end_index.saturating_add(overscan).min(total_rows);
        let start = self.start_index.saturating_sub(overscan).min(end);
        Self::new(start, end)
    }
}
