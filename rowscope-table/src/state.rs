//! Typed table state.
//!
//! Every slice sits behind its own `Arc`. Setters replace only the slice they touch, and keep the
//! previous `Arc` when the updated value is equal, so row-model caches keyed on a slice stay
//! valid across no-op updates.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::{ColumnId, RowId, Value};

/// One active column filter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnFilter {
    pub id: ColumnId,
    pub value: Value,
}

impl ColumnFilter {
    pub fn new(id: impl Into<ColumnId>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// One sort key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSort {
    pub id: ColumnId,
    pub desc: bool,
}

impl ColumnSort {
    pub fn asc(id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

/// Which rows are expanded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpandedState {
    /// Every row is expanded.
    All,
    Rows(BTreeSet<RowId>),
}

impl Default for ExpandedState {
    fn default() -> Self {
        Self::Rows(BTreeSet::new())
    }
}

impl ExpandedState {
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Rows(ids) => ids.contains(id),
        }
    }

    /// `false` for `All`.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Rows(ids) => ids.is_empty(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 10,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnPinningState {
    pub left: Vec<ColumnId>,
    pub right: Vec<ColumnId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnPinPosition {
    Left,
    Right,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowPinningState {
    pub top: Vec<RowId>,
    pub bottom: Vec<RowId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowPinPosition {
    Top,
    Bottom,
}

/// The full table state. Derived row models are pure functions of this and the data.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableState {
    pub column_filters: Arc<Vec<ColumnFilter>>,
    pub global_filter: Arc<Value>,
    pub sorting: Arc<Vec<ColumnSort>>,
    pub grouping: Arc<Vec<ColumnId>>,
    pub expanded: Arc<ExpandedState>,
    pub pagination: Arc<PaginationState>,
    pub column_visibility: Arc<HashMap<ColumnId, bool>>,
    pub column_order: Arc<Vec<ColumnId>>,
    pub column_pinning: Arc<ColumnPinningState>,
    pub row_pinning: Arc<RowPinningState>,
    pub column_sizing: Arc<HashMap<ColumnId, u32>>,
    pub row_selection: Arc<BTreeSet<RowId>>,
}

impl TableState {
    pub fn with_column_filters(mut self, filters: Vec<ColumnFilter>) -> Self {
        self.column_filters = Arc::new(filters);
        self
    }

    pub fn with_global_filter(mut self, value: impl Into<Value>) -> Self {
        self.global_filter = Arc::new(value.into());
        self
    }

    pub fn with_sorting(mut self, sorting: Vec<ColumnSort>) -> Self {
        self.sorting = Arc::new(sorting);
        self
    }

    pub fn with_grouping<I, S>(mut self, grouping: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnId>,
    {
        self.grouping = Arc::new(grouping.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_expanded(mut self, expanded: ExpandedState) -> Self {
        self.expanded = Arc::new(expanded);
        self
    }

    pub fn with_pagination(mut self, page_index: usize, page_size: usize) -> Self {
        self.pagination = Arc::new(PaginationState {
            page_index,
            page_size: page_size.max(1),
        });
        self
    }

    pub fn with_column_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnId>,
    {
        self.column_order = Arc::new(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_row_selection<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RowId>,
    {
        self.row_selection = Arc::new(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// Applies `updater` to a slice and swaps the `Arc` only when the result differs.
///
/// Returns whether the slice changed.
pub(crate) fn update_slice<S: PartialEq>(slot: &mut Arc<S>, updater: impl FnOnce(&S) -> S) -> bool {
    let next = updater(slot);
    if next == **slot {
        return false;
    }
    *slot = Arc::new(next);
    true
}

/// Replaces `slot` with `next` unless the values are equal.
pub(crate) fn replace_slice<S: PartialEq>(slot: &mut Arc<S>, next: &Arc<S>) -> bool {
    if Arc::ptr_eq(slot, next) || **slot == **next {
        return false;
    }
    *slot = Arc::clone(next);
    true
}

impl TableState {
    /// Takes every slice of `next` that differs. Returns whether anything changed.
    pub(crate) fn assign(&mut self, next: &TableState) -> bool {
        let mut changed = false;
        changed |= replace_slice(&mut self.column_filters, &next.column_filters);
        changed |= replace_slice(&mut self.global_filter, &next.global_filter);
        changed |= replace_slice(&mut self.sorting, &next.sorting);
        changed |= replace_slice(&mut self.grouping, &next.grouping);
        changed |= replace_slice(&mut self.expanded, &next.expanded);
        changed |= replace_slice(&mut self.pagination, &next.pagination);
        changed |= replace_slice(&mut self.column_visibility, &next.column_visibility);
        changed |= replace_slice(&mut self.column_order, &next.column_order);
        changed |= replace_slice(&mut self.column_pinning, &next.column_pinning);
        changed |= replace_slice(&mut self.row_pinning, &next.row_pinning);
        changed |= replace_slice(&mut self.column_sizing, &next.column_sizing);
        changed |= replace_slice(&mut self.row_selection, &next.row_selection);
        changed
    }
}
