//! One table's complete view state.
//!
//! Wires filter, sort, search, column order and column sizing to one shared
//! history and one shared storage, plus the windowing controller for the
//! resulting rows.

use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, info};

use crate::config::ResolvedConfig;
use crate::model::{ColumnId, ColumnSizing, FilterMap, SortMode, SortRule};
use crate::registry::Registry;
use crate::state::{
    ColumnOrderState, ColumnSizingState, FilterOptions, FilterState, SearchState, SortOptions,
    SortState,
};
use crate::sync::{History, Storage};
use crate::view_state::WindowController;

/// Registry of mounted tables, keyed by table identity.
pub type TableRegistry = Registry<TableView>;

/// Static description of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Identity used for storage keys.
    pub table_id: String,
    /// Columns in natural order.
    pub columns: Vec<ColumnId>,
    /// Columns the search may be scoped to.
    pub searchable_columns: Vec<ColumnId>,
    /// Single or multi sort.
    pub sort_mode: SortMode,
    /// Filters applied when the URL carries none.
    pub initial_filters: FilterMap,
    /// Sort applied when the URL carries none.
    pub initial_sort: Vec<SortRule>,
    /// Widths restored by a reset.
    pub default_sizes: ColumnSizing,
    /// Rows before the first data load.
    pub total_rows: usize,
}

impl TableOptions {
    /// Single-sort table with no defaults.
    pub fn new(table_id: impl Into<String>, columns: Vec<ColumnId>) -> Self {
        Self {
            table_id: table_id.into(),
            columns,
            searchable_columns: Vec::new(),
            sort_mode: SortMode::Single,
            initial_filters: FilterMap::new(),
            initial_sort: Vec::new(),
            default_sizes: ColumnSizing::new(),
            total_rows: 0,
        }
    }
}

/// Snapshot handed to the data provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewQuery {
    /// Active filters.
    pub filters: FilterMap,
    /// Sort rules in priority order.
    pub sort: Vec<SortRule>,
    /// Committed search query.
    pub search: String,
    /// Columns the search is scoped to.
    pub search_columns: Vec<ColumnId>,
    /// Column display order.
    pub column_order: Vec<ColumnId>,
}

/// All view state of one table.
#[derive(Debug)]
pub struct TableView {
    table_id: String,
    filters: FilterState,
    sort: SortState,
    search: SearchState,
    column_order: ColumnOrderState,
    column_sizing: ColumnSizingState,
    window: WindowController,
}

impl TableView {
    /// Mount a table.
    ///
    /// URL-backed state is read from `history`, layout from `storage`;
    /// either may be absent.
    pub fn new(
        options: TableOptions,
        config: &ResolvedConfig,
        history: Option<Rc<dyn History>>,
        storage: Option<Rc<dyn Storage>>,
    ) -> Self {
        let TableOptions {
            table_id,
            columns,
            searchable_columns,
            sort_mode,
            initial_filters,
            initial_sort,
            default_sizes,
            total_rows,
        } = options;

        let filters = FilterState::new(
            FilterOptions {
                initial: initial_filters,
                ..config.filter_options()
            },
            history.clone(),
        );
        let sort = SortState::new(
            SortOptions {
                initial: initial_sort,
                ..config.sort_options(sort_mode)
            },
            history.clone(),
        );
        let search = SearchState::new(config.search_options(searchable_columns), history);
        let column_order = ColumnOrderState::new(
            config.column_order_options(&table_id, columns),
            storage.clone(),
        );
        let column_sizing = ColumnSizingState::new(
            config.column_sizing_options(&table_id, default_sizes),
            storage,
        );
        let window = WindowController::new(total_rows, config.window_options());

        info!(table = %table_id, "table mounted");

        Self {
            table_id,
            filters,
            sort,
            search,
            column_order,
            column_sizing,
            window,
        }
    }

    /// Table identity.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Filter state.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Filter state, mutably.
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    /// Sort state.
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Sort state, mutably.
    pub fn sort_mut(&mut self) -> &mut SortState {
        &mut self.sort
    }

    /// Search state.
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Search state, mutably.
    pub fn search_mut(&mut self) -> &mut SearchState {
        &mut self.search
    }

    /// Column order state.
    pub fn column_order(&self) -> &ColumnOrderState {
        &self.column_order
    }

    /// Column order state, mutably.
    pub fn column_order_mut(&mut self) -> &mut ColumnOrderState {
        &mut self.column_order
    }

    /// Column sizing state.
    pub fn column_sizing(&self) -> &ColumnSizingState {
        &self.column_sizing
    }

    /// Column sizing state, mutably.
    pub fn column_sizing_mut(&mut self) -> &mut ColumnSizingState {
        &mut self.column_sizing
    }

    /// Windowing controller.
    pub fn window(&self) -> &WindowController {
        &self.window
    }

    /// Windowing controller, mutably.
    pub fn window_mut(&mut self) -> &mut WindowController {
        &mut self.window
    }

    /// Run deferred work due at `now_ms`. Hosts call this once per frame.
    ///
    /// Commits pending filter and sort changes, commits a settled search and
    /// applies layout changes made by other instances. Returns `true` if any
    /// state changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let filtered = self.filters.flush();
        let sorted = self.sort.flush();
        let searched = self.search.poll(now_ms);
        let reordered = self.column_order.sync_storage();
        let resized = self.column_sizing.sync_storage();
        let changed = filtered || sorted || searched || reordered || resized;
        if changed {
            debug!(
                table = %self.table_id,
                filtered,
                sorted,
                searched,
                reordered,
                resized,
                "tick applied changes"
            );
        }
        changed
    }

    /// When the host must call [`tick`](Self::tick) next.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.search.next_deadline_ms()
    }

    /// Rehydrate URL-backed state after back/forward navigation.
    pub fn on_location_change(&mut self) {
        debug!(table = %self.table_id, "location changed");
        self.filters.sync_from_url();
        self.sort.sync_from_url();
        self.search.sync_from_url();
    }

    /// Snapshot for the data provider.
    pub fn query(&self) -> ViewQuery {
        ViewQuery {
            filters: self.filters.filters().clone(),
            sort: self.sort.rules().to_vec(),
            search: self.search.query().to_owned(),
            search_columns: self.search.active_columns().to_vec(),
            column_order: self.column_order.order().to_vec(),
        }
    }
}
