//! Windowed rendering controller.
//!
//! Computes which rows of a large collection to mount for the current scroll
//! position, plus the spacer heights that keep the scrollbar geometry of the
//! full collection.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::height_index::HeightIndex;
use super::visible_range::VisibleRange;

/// Default estimated row height in pixels.
pub const DEFAULT_ESTIMATE_ROW_HEIGHT: usize = 40;

/// Default number of extra rows rendered on each side.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Configuration for a [`WindowController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowOptions {
    /// Height assumed for rows that have not been measured. Clamped to >= 1.
    pub estimate_row_height: usize,
    /// Extra rows rendered above and below the viewport.
    pub overscan: usize,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            estimate_row_height: DEFAULT_ESTIMATE_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

/// Where a row lands in the viewport when scrolling to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAlign {
    /// Row top at viewport top.
    Start,
    /// Row centered.
    Center,
    /// Row bottom at viewport bottom.
    End,
    /// Don't move if fully visible, else the nearest edge.
    #[default]
    Auto,
}

/// Rows to mount and the spacers around them.
///
/// # Invariants
/// - `start_index <= end_index <= total rows`
/// - `leading_padding + rendered height + trailing_padding == total_height`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewportWindow {
    /// First rendered row (inclusive, overscan included).
    pub start_index: usize,
    /// Past the last rendered row (exclusive, overscan included).
    pub end_index: usize,
    /// Overscan used to widen the visible range.
    pub overscan: usize,
    /// Spacer height above the first rendered row.
    pub leading_padding: usize,
    /// Spacer height below the last rendered row.
    pub trailing_padding: usize,
    /// Height of the whole collection.
    pub total_height: usize,
}

impl ViewportWindow {
    /// Rendered row indices.
    pub fn range(&self) -> VisibleRange {
        VisibleRange::new(self.start_index, self.end_index)
    }

    /// Number of rendered rows.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Whether nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Height of the rendered rows.
    pub fn rendered_height(&self) -> usize {
        self.total_height - self.leading_padding - self.trailing_padding
    }
}

/// Windowed rendering controller.
///
/// Feed it scroll and resize events; read back the [`ViewportWindow`].
#[derive(Debug, Clone)]
pub struct WindowController {
    heights: HeightIndex,
    options: WindowOptions,
    scroll_offset: usize,
    viewport_height: usize,
}

impl WindowController {
    /// Create a controller for `total_rows` rows with an empty viewport.
    pub fn new(total_rows: usize, options: WindowOptions) -> Self {
        let options = WindowOptions {
            estimate_row_height: options.estimate_row_height.max(1),
            ..options
        };
        Self {
            heights: HeightIndex::from_uniform(total_rows, options.estimate_row_height),
            options,
            scroll_offset: 0,
            viewport_height: 0,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> WindowOptions {
        self.options
    }

    /// Number of rows.
    pub fn total_rows(&self) -> usize {
        self.heights.len()
    }

    /// Current scroll offset in pixels.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Current viewport height in pixels.
    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Change the row count, e.g. after filtering.
    ///
    /// Surviving rows keep their measurements; the scroll offset is clamped
    /// to the new content.
    pub fn set_total_rows(&mut self, total_rows: usize) -> ViewportWindow {
        if total_rows != self.heights.len() {
            debug!(from = self.heights.len(), to = total_rows, "row count changed");
            self.heights
                .resize(total_rows, self.options.estimate_row_height);
            self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        }
        self.window()
    }

    /// Record a scroll event.
    pub fn on_scroll(&mut self, offset: usize) -> ViewportWindow {
        self.scroll_offset = offset.min(self.max_scroll_offset());
        trace!(offset = self.scroll_offset, "scrolled");
        self.window()
    }

    /// Record a viewport resize.
    pub fn on_resize(&mut self, viewport_height: usize) -> ViewportWindow {
        self.viewport_height = viewport_height;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        self.window()
    }

    /// Replace the estimate for `index` with its measured height.
    ///
    /// Returns `true` when the height changed. Out-of-range rows are ignored.
    /// The scroll offset is clamped if the collection got shorter.
    pub fn measure_row(&mut self, index: usize, height: usize) -> bool {
        if index >= self.heights.len() || self.heights.height(index) == height {
            return false;
        }
        self.heights.set(index, height);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        true
    }

    /// Height of the whole collection.
    pub fn total_height(&self) -> usize {
        self.heights.total()
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll_offset(&self) -> usize {
        self.total_height().saturating_sub(self.viewport_height)
    }

    /// Rows intersecting the viewport, without overscan.
    pub fn visible_range(&self) -> VisibleRange {
        let total_rows = self.heights.len();
        let start = self
            .heights
            .lower_bound(self.scroll_offset)
            .unwrap_or(total_rows);
        if self.viewport_height == 0 {
            return VisibleRange::new(start, start);
        }

        let last_pixel = self.scroll_offset + self.viewport_height - 1;
        let end = self
            .heights
            .lower_bound(last_pixel)
            .map_or(total_rows, |row| row + 1);
        VisibleRange::new(start, end.max(start))
    }

    /// Rows to render with overscan, plus spacer heights.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::view_state::{WindowController, WindowOptions};
    /// let options = WindowOptions { estimate_row_height: 20, overscan: 2 };
    /// let mut controller = WindowController::new(10_000, options);
    /// controller.on_resize(100);
    /// let window = controller.on_scroll(1_000);
    /// assert_eq!((window.start_index, window.end_index), (48, 57));
    /// assert_eq!(window.leading_padding, 960);
    /// assert_eq!(window.total_height, 200_000);
    /// ```
    pub fn window(&self) -> ViewportWindow {
        let range = self
            .visible_range()
            .expand(self.options.overscan, self.heights.len());
        let total_height = self.heights.total();
        let leading_padding = self.heights.offset_of(range.start_index);
        let trailing_padding = total_height - self.heights.offset_of(range.end_index);

        ViewportWindow {
            start_index: range.start_index,
            end_index: range.end_index,
            overscan: self.options.overscan,
            leading_padding,
            trailing_padding,
            total_height,
        }
    }

    /// Offset of the top edge of row `index`.
    pub fn row_offset(&self, index: usize) -> usize {
        self.heights.offset_of(index)
    }

    /// Scroll offset that brings `index` into view with `align`.
    ///
    /// Indices past the end target the last row.
    pub fn scroll_offset_for(&self, index: usize, align: ScrollAlign) -> usize {
        let total_rows = self.heights.len();
        if total_rows == 0 {
            return 0;
        }
        let index = index.min(total_rows - 1);
        let start = self.heights.offset_of(index);
        let end = start + self.heights.height(index);
        let view = self.viewport_height;

        let target = match align {
            ScrollAlign::Start => start,
            ScrollAlign::End => end.saturating_sub(view),
            ScrollAlign::Center => (start + (end - start) / 2).saturating_sub(view / 2),
            ScrollAlign::Auto => {
                let current = self.scroll_offset;
                if start >= current && end <= current + view {
                    current
                } else if start < current {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        target.min(self.max_scroll_offset())
    }

    /// Scroll so `index` is in view.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> ViewportWindow {
        let offset = self.scroll_offset_for(index, align);
        self.on_scroll(offset)
    }

    /// The rendered rows of `rows`, with their indices.
    ///
    /// `rows` is the filtered and sorted collection; rows past its end are
    /// skipped.
    pub fn rows<'a, T>(&self, rows: &'a [T]) -> impl Iterator<Item = (usize, &'a T)> + 'a {
        let window = self.window();
        let end = window.end_index.min(rows.len());
        let start = window.start_index.min(end);
        rows[start..end]
            .iter()
            .enumerate()
            .map(move |(i, row)| (start + i, row))
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
