//! View state managers.
//!
//! Each manager owns one slice of view state in memory and mirrors it to the
//! URL ([`crate::sync::History`]) or to durable storage
//! ([`crate::sync::Storage`]). Transitions are synchronous; deferred work
//! (search debounce) is driven by the host through injected timestamps.

pub mod column_order;
pub mod column_sizing;
pub mod debounce;
pub mod filter;
pub mod persisted;
pub mod search;
pub mod sort;

// Re-export for convenience
pub use column_order::{ColumnOrderOptions, ColumnOrderState, OrderChanged, DEFAULT_ORDER_NAMESPACE};
pub use column_sizing::{
    ColumnSizingOptions, ColumnSizingState, GlobalPointerEvent, SizesChanged,
    DEFAULT_SIZING_NAMESPACE,
};
pub use debounce::Debounced;
pub use filter::{FilterOptions, FilterState, FiltersChanged};
pub use persisted::{LayoutPayload, PersistedLayout};
pub use search::{SearchChanged, SearchOptions, SearchState, DEFAULT_DEBOUNCE_MS};
pub use sort::{SortChanged, SortOptions, SortState};
