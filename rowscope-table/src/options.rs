use std::fmt;
use std::sync::Arc;

use crate::fns::{AggregationFnRegistry, FilterFn, FilterFnRegistry, SortingFnRegistry};
use crate::{ColumnDef, RowId, TableState};

/// Derives a row id from the record, its index among its siblings and the parent row's id.
pub type GetRowIdFn<T> = Arc<dyn Fn(&T, usize, Option<&RowId>) -> RowId + Send + Sync>;

/// Returns the child records of a record.
pub type GetSubRowsFn<T> = Arc<dyn Fn(&T) -> Vec<Arc<T>> + Send + Sync>;

/// Called once per outermost state update that changed the state.
pub type OnStateChangeCallback = Arc<dyn Fn(&TableState) + Send + Sync>;

/// How grouped columns are placed among the leaf columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupedColumnMode {
    /// Keep the column order as is.
    None,
    /// Move grouped columns to the front, in grouping order.
    #[default]
    Reorder,
    /// Hide grouped columns.
    Remove,
}

/// Configuration for [`crate::Table`].
///
/// Cheap to clone: data is shared and closures live in `Arc`s.
pub struct TableOptions<T> {
    pub data: Arc<[Arc<T>]>,
    pub columns: Vec<ColumnDef<T>>,

    /// Row id function. `None` uses the position path (`"3.1"`).
    pub get_row_id: Option<GetRowIdFn<T>>,
    pub get_sub_rows: Option<GetSubRowsFn<T>>,

    pub filter_fns: FilterFnRegistry,
    pub sorting_fns: SortingFnRegistry,
    pub aggregation_fns: AggregationFnRegistry,

    pub initial_state: TableState,
    pub on_state_change: Option<OnStateChangeCallback>,

    /// Rows arrive pre-filtered; the filtered stage passes them through.
    pub manual_filtering: bool,
    /// Keep a parent when any descendant matches (instead of pruning rejected subtrees).
    pub filter_from_leaf_rows: bool,
    pub max_leaf_row_filter_depth: usize,
    pub enable_column_filters: bool,
    pub enable_global_filter: bool,
    /// Defaults to `includesString` when `Auto`.
    pub global_filter_fn: FilterFn,

    pub manual_sorting: bool,
    pub enable_sorting: bool,
    pub enable_multi_sort: bool,
    pub enable_sorting_removal: bool,
    pub enable_multi_remove: bool,
    pub max_multi_sort_col_count: Option<usize>,
    pub sort_desc_first: Option<bool>,

    pub manual_grouping: bool,
    pub enable_grouping: bool,
    pub grouped_column_mode: GroupedColumnMode,

    pub manual_expanding: bool,
    /// Expanded sub-rows take page slots. When `false`, pages are cut from top-level rows and
    /// expanded afterwards.
    pub paginate_expanded_rows: bool,
    pub enable_expanding: bool,
    /// `None` resets expansion on data or grouping changes unless expansion is manual.
    pub auto_reset_expanded: Option<bool>,

    pub manual_pagination: bool,
    pub enable_pagination: bool,
    /// `None` resets the page index on data, filter, grouping or sorting changes unless
    /// pagination is manual.
    pub auto_reset_page_index: Option<bool>,
    /// Total row count for manual pagination.
    pub row_count: Option<usize>,
    /// Total page count for manual pagination.
    pub page_count: Option<usize>,

    pub enable_row_selection: bool,
    pub enable_multi_row_selection: bool,
    pub enable_sub_row_selection: bool,

    pub enable_row_pinning: bool,
    /// Pinned rows stay listed while filtered out or on another page, as long as their parents
    /// are expanded.
    pub keep_pinned_rows: bool,
    pub enable_column_pinning: bool,
    pub enable_column_resizing: bool,
    pub enable_hiding: bool,
}

impl<T> Clone for TableOptions<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            columns: self.columns.clone(),
            get_row_id: self.get_row_id.clone(),
            get_sub_rows: self.get_sub_rows.clone(),
            filter_fns: self.filter_fns.clone(),
            sorting_fns: self.sorting_fns.clone(),
            aggregation_fns: self.aggregation_fns.clone(),
            initial_state: self.initial_state.clone(),
            on_state_change: self.on_state_change.clone(),
            manual_filtering: self.manual_filtering,
            filter_from_leaf_rows: self.filter_from_leaf_rows,
            max_leaf_row_filter_depth: self.max_leaf_row_filter_depth,
            enable_column_filters: self.enable_column_filters,
            enable_global_filter: self.enable_global_filter,
            global_filter_fn: self.global_filter_fn.clone(),
            manual_sorting: self.manual_sorting,
            enable_sorting: self.enable_sorting,
            enable_multi_sort: self.enable_multi_sort,
            enable_sorting_removal: self.enable_sorting_removal,
            enable_multi_remove: self.enable_multi_remove,
            max_multi_sort_col_count: self.max_multi_sort_col_count,
            sort_desc_first: self.sort_desc_first,
            manual_grouping: self.manual_grouping,
            enable_grouping: self.enable_grouping,
            grouped_column_mode: self.grouped_column_mode,
            manual_expanding: self.manual_expanding,
            paginate_expanded_rows: self.paginate_expanded_rows,
            enable_expanding: self.enable_expanding,
            auto_reset_expanded: self.auto_reset_expanded,
            manual_pagination: self.manual_pagination,
            enable_pagination: self.enable_pagination,
            auto_reset_page_index: self.auto_reset_page_index,
            row_count: self.row_count,
            page_count: self.page_count,
            enable_row_selection: self.enable_row_selection,
            enable_multi_row_selection: self.enable_multi_row_selection,
            enable_sub_row_selection: self.enable_sub_row_selection,
            enable_row_pinning: self.enable_row_pinning,
            keep_pinned_rows: self.keep_pinned_rows,
            enable_column_pinning: self.enable_column_pinning,
            enable_column_resizing: self.enable_column_resizing,
            enable_hiding: self.enable_hiding,
        }
    }
}

impl<T> fmt::Debug for TableOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("rows", &self.data.len())
            .field("columns", &self.columns)
            .field("get_row_id", &self.get_row_id.is_some())
            .field("get_sub_rows", &self.get_sub_rows.is_some())
            .field("initial_state", &self.initial_state)
            .field("manual_filtering", &self.manual_filtering)
            .field("manual_sorting", &self.manual_sorting)
            .field("manual_grouping", &self.manual_grouping)
            .field("manual_expanding", &self.manual_expanding)
            .field("manual_pagination", &self.manual_pagination)
            .field("enable_pagination", &self.enable_pagination)
            .finish_non_exhaustive()
    }
}

impl<T> TableOptions<T> {
    /// Creates options for `data` shown through `columns`.
    pub fn new(data: impl Into<Arc<[Arc<T>]>>, columns: Vec<ColumnDef<T>>) -> Self {
        Self {
            data: data.into(),
            columns,
            get_row_id: None,
            get_sub_rows: None,
            filter_fns: FilterFnRegistry::new(),
            sorting_fns: SortingFnRegistry::new(),
            aggregation_fns: AggregationFnRegistry::new(),
            initial_state: TableState::default(),
            on_state_change: None,
            manual_filtering: false,
            filter_from_leaf_rows: false,
            max_leaf_row_filter_depth: 100,
            enable_column_filters: true,
            enable_global_filter: true,
            global_filter_fn: FilterFn::Auto,
            manual_sorting: false,
            enable_sorting: true,
            enable_multi_sort: true,
            enable_sorting_removal: true,
            enable_multi_remove: true,
            max_multi_sort_col_count: None,
            sort_desc_first: None,
            manual_grouping: false,
            enable_grouping: true,
            grouped_column_mode: GroupedColumnMode::default(),
            manual_expanding: false,
            paginate_expanded_rows: true,
            enable_expanding: true,
            auto_reset_expanded: None,
            manual_pagination: false,
            enable_pagination: false,
            auto_reset_page_index: None,
            row_count: None,
            page_count: None,
            enable_row_selection: true,
            enable_multi_row_selection: true,
            enable_sub_row_selection: true,
            enable_row_pinning: true,
            keep_pinned_rows: true,
            enable_column_pinning: true,
            enable_column_resizing: true,
            enable_hiding: true,
        }
    }

    pub fn with_initial_state(mut self, state: TableState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_filter_from_leaf_rows(mut self, enabled: bool) -> Self {
        self.filter_from_leaf_rows = enabled;
        self
    }

    pub fn with_max_leaf_row_filter_depth(mut self, depth: usize) -> Self {
        self.max_leaf_row_filter_depth = depth;
        self
    }

    pub fn with_global_filter_fn(mut self, filter_fn: impl Into<FilterFn>) -> Self {
        self.global_filter_fn = filter_fn.into();
        self
    }

    pub fn with_manual_filtering(mut self, manual: bool) -> Self {
        self.manual_filtering = manual;
        self
    }

    pub fn with_manual_sorting(mut self, manual: bool) -> Self {
        self.manual_sorting = manual;
        self
    }

    pub fn with_manual_grouping(mut self, manual: bool) -> Self {
        self.manual_grouping = manual;
        self
    }

    pub fn with_manual_expanding(mut self, manual: bool) -> Self {
        self.manual_expanding = manual;
        self
    }

    pub fn with_manual_pagination(mut self, manual: bool) -> Self {
        self.manual_pagination = manual;
        self
    }

    /// Turns on the paginated stage.
    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.enable_pagination = enabled;
        self
    }

    pub fn with_paginate_expanded_rows(mut self, enabled: bool) -> Self {
        self.paginate_expanded_rows = enabled;
        self
    }

    pub fn with_row_count(mut self, row_count: Option<usize>) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_page_count(mut self, page_count: Option<usize>) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn with_auto_reset_page_index(mut self, enabled: bool) -> Self {
        self.auto_reset_page_index = Some(enabled);
        self
    }

    pub fn with_auto_reset_expanded(mut self, enabled: bool) -> Self {
        self.auto_reset_expanded = Some(enabled);
        self
    }

    pub fn with_enable_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    pub fn with_enable_multi_sort(mut self, enabled: bool) -> Self {
        self.enable_multi_sort = enabled;
        self
    }

    pub fn with_enable_sorting_removal(mut self, enabled: bool) -> Self {
        self.enable_sorting_removal = enabled;
        self
    }

    pub fn with_enable_multi_remove(mut self, enabled: bool) -> Self {
        self.enable_multi_remove = enabled;
        self
    }

    pub fn with_max_multi_sort_col_count(mut self, count: usize) -> Self {
        self.max_multi_sort_col_count = Some(count);
        self
    }

    pub fn with_sort_desc_first(mut self, desc_first: bool) -> Self {
        self.sort_desc_first = Some(desc_first);
        self
    }

    pub fn with_enable_column_filters(mut self, enabled: bool) -> Self {
        self.enable_column_filters = enabled;
        self
    }

    pub fn with_enable_global_filter(mut self, enabled: bool) -> Self {
        self.enable_global_filter = enabled;
        self
    }

    pub fn with_enable_grouping(mut self, enabled: bool) -> Self {
        self.enable_grouping = enabled;
        self
    }

    pub fn with_grouped_column_mode(mut self, mode: GroupedColumnMode) -> Self {
        self.grouped_column_mode = mode;
        self
    }

    pub fn with_enable_expanding(mut self, enabled: bool) -> Self {
        self.enable_expanding = enabled;
        self
    }

    pub fn with_enable_row_selection(mut self, enabled: bool) -> Self {
        self.enable_row_selection = enabled;
        self
    }

    pub fn with_enable_multi_row_selection(mut self, enabled: bool) -> Self {
        self.enable_multi_row_selection = enabled;
        self
    }

    pub fn with_enable_sub_row_selection(mut self, enabled: bool) -> Self {
        self.enable_sub_row_selection = enabled;
        self
    }

    pub fn with_enable_row_pinning(mut self, enabled: bool) -> Self {
        self.enable_row_pinning = enabled;
        self
    }

    pub fn with_keep_pinned_rows(mut self, keep: bool) -> Self {
        self.keep_pinned_rows = keep;
        self
    }

    pub fn with_enable_column_pinning(mut self, enabled: bool) -> Self {
        self.enable_column_pinning = enabled;
        self
    }

    pub fn with_enable_column_resizing(mut self, enabled: bool) -> Self {
        self.enable_column_resizing = enabled;
        self
    }

    pub fn with_enable_hiding(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    pub(crate) fn resets_page_index(&self) -> bool {
        self.auto_reset_page_index.unwrap_or(!self.manual_pagination)
    }

    pub(crate) fn resets_expanded(&self) -> bool {
        self.auto_reset_expanded.unwrap_or(!self.manual_expanding)
    }
}

impl<T: 'static> TableOptions<T> {
    pub fn with_get_row_id(
        mut self,
        get_row_id: impl Fn(&T, usize, Option<&RowId>) -> RowId + Send + Sync + 'static,
    ) -> Self {
        self.get_row_id = Some(Arc::new(get_row_id));
        self
    }

    pub fn with_get_sub_rows(
        mut self,
        get_sub_rows: impl Fn(&T) -> Vec<Arc<T>> + Send + Sync + 'static,
    ) -> Self {
        self.get_sub_rows = Some(Arc::new(get_sub_rows));
        self
    }

    pub fn with_on_state_change(
        mut self,
        on_state_change: impl Fn(&TableState) + Send + Sync + 'static,
    ) -> Self {
        self.on_state_change = Some(Arc::new(on_state_change));
        self
    }

    pub fn with_named_filter_fn(mut self, name: impl Into<String>, f: crate::CustomFilterFn) -> Self {
        self.filter_fns.insert(name.into(), Arc::new(f));
        self
    }

    pub fn with_named_sorting_fn(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&crate::Value, &crate::Value) -> std::cmp::Ordering + Send + Sync + 'static,
    ) -> Self {
        self.sorting_fns.insert(name.into(), Arc::new(f));
        self
    }

    pub fn with_named_aggregation_fn(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&[crate::Value]) -> crate::Value + Send + Sync + 'static,
    ) -> Self {
        self.aggregation_fns.insert(name.into(), Arc::new(f));
        self
    }
}
