//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod column;
pub mod error;
pub mod filter;
pub mod sort;

// Re-export for convenience
pub use column::{column_ids, ColumnId, ColumnOrder, ColumnSizing, ColumnWidth, InvalidColumnWidth};
pub use error::{CodecError, StorageError, ViewError};
pub use filter::{is_cleared, FilterMap};
pub use sort::{SortDirection, SortMode, SortRule, SortSpec};
