//! Windowed rendering.
//!
//! Only the rows intersecting the viewport (plus overscan) are mounted; the
//! rest of the collection is represented by two spacer heights so the
//! scrollbar keeps the geometry of the full collection.
//!
//! # Module Structure
//!
//! - `height_index`: HeightIndex - O(log n) row offsets via Fenwick tree
//! - `visible_range`: VisibleRange - half-open row index range
//! - `window`: WindowController, ViewportWindow - scroll/resize to window

pub mod height_index;
pub mod visible_range;
pub mod window;

pub use height_index::HeightIndex;
pub use visible_range::VisibleRange;
pub use window::{
    ScrollAlign, ViewportWindow, WindowController, WindowOptions, DEFAULT_ESTIMATE_ROW_HEIGHT,
    DEFAULT_OVERSCAN,
};
