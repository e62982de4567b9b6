use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::{ColumnFilter, ColumnId, Result, Row, RowId, RowModel, Table, Value};

/// The pseudo column id under which the global filter result is recorded.
pub const GLOBAL_FILTER_ID: &str = "__global__";

/// Filter outcome of one row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowFilterState {
    /// Pass/fail per filtered column, plus [`GLOBAL_FILTER_ID`] when a global filter is active.
    pub passes: HashMap<ColumnId, bool>,
    /// Metadata reported by the filter, per column. Absent when the filter reported none.
    pub meta: HashMap<ColumnId, Value>,
}

/// Every core row's filter outcome for one filter state.
#[derive(Debug, Default)]
pub(crate) struct FilterEvaluation {
    /// Filters a row must pass, in state order.
    pub(crate) filter_ids: Vec<ColumnId>,
    pub(crate) rows: HashMap<RowId, Rc<RowFilterState>>,
}

impl FilterEvaluation {
    pub(crate) fn is_active(&self) -> bool {
        !self.filter_ids.is_empty()
    }

    /// Whether the row passes every active filter except `excluding`.
    pub(crate) fn passes(&self, row_id: &str, excluding: Option<&str>) -> bool {
        let Some(state) = self.rows.get(row_id) else {
            return true;
        };
        self.filter_ids
            .iter()
            .filter(|id| Some(&***id) != excluding)
            .all(|id| state.passes.get(id).copied().unwrap_or(true))
    }
}

/// Runs the column filters and the global filter over every core row.
pub(crate) fn evaluate<T>(
    table: &Table<T>,
    core: &RowModel<T>,
    filters: &[ColumnFilter],
    global: &Value,
) -> Result<FilterEvaluation> {
    if table.options().manual_filtering || core.flat_rows.is_empty() {
        return Ok(FilterEvaluation::default());
    }

    let mut column_filters = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = table.accessor_column(&filter.id, "filtering")?;
        let filter_fn = table.filter_fn_for(column)?;
        let value = filter_fn.resolve_filter_value(&filter.value);
        column_filters.push((column, filter_fn, value));
    }

    let global_fn = table.global_filter_fn();
    let mut global_columns = Vec::new();
    if !global.is_blank() {
        for column in table.leaf_columns() {
            if table.column_can_global_filter(column)? {
                global_columns.push(column);
            }
        }
    }
    let global_value = global_fn.resolve_filter_value(global);

    let mut filter_ids: Vec<ColumnId> = filters.iter().map(|f| Arc::clone(&f.id)).collect();
    if !global_columns.is_empty() {
        filter_ids.push(GLOBAL_FILTER_ID.into());
    }
    if filter_ids.is_empty() {
        return Ok(FilterEvaluation::default());
    }

    let mut rows = HashMap::with_capacity(core.flat_rows.len());
    for row in &core.flat_rows {
        let mut state = RowFilterState::default();
        for (column, filter_fn, value) in &column_filters {
            let result = filter_fn.filter(&table.core_value(row, column), value);
            if !result.meta.is_undefined() {
                state.meta.insert(Arc::clone(column.id()), result.meta);
            }
            state.passes.insert(Arc::clone(column.id()), result.pass);
        }
        if !global_columns.is_empty() {
            let mut matched = false;
            for column in &global_columns {
                let result = global_fn.filter(&table.core_value(row, column), &global_value);
                if result.pass {
                    if !result.meta.is_undefined() {
                        state.meta.insert(Arc::clone(column.id()), result.meta);
                    }
                    matched = true;
                    break;
                }
            }
            state.passes.insert(GLOBAL_FILTER_ID.into(), matched);
        }
        rows.insert(Arc::clone(&row.id), Rc::new(state));
    }

    tdebug!(
        filters = filter_ids.len(),
        rows = rows.len(),
        "filters evaluated"
    );
    Ok(FilterEvaluation { filter_ids, rows })
}

/// Keeps the rows `keep` accepts.
///
/// With `from_leaf_rows`, a row survives when it or any descendant is kept, and sub-rows past
/// `max_depth` are dropped. Otherwise a rejected row takes its subtree with it, and sub-rows
/// past `max_depth` are kept untouched.
pub(crate) fn prune<T>(
    rows: &[Rc<Row<T>>],
    from_leaf_rows: bool,
    max_depth: usize,
    keep: &dyn Fn(&Row<T>) -> bool,
) -> RowModel<T> {
    let rows = if from_leaf_rows {
        prune_from_leafs(rows, 0, max_depth, keep)
    } else {
        prune_from_root(rows, 0, max_depth, keep)
    };
    RowModel::from_rows(rows)
}

fn prune_from_leafs<T>(
    rows: &[Rc<Row<T>>],
    depth: usize,
    max_depth: usize,
    keep: &dyn Fn(&Row<T>) -> bool,
) -> Vec<Rc<Row<T>>> {
    let mut out = Vec::new();
    for row in rows {
        if row.has_sub_rows() && depth < max_depth {
            let sub_rows = prune_from_leafs(&row.sub_rows, depth + 1, max_depth, keep);
            if keep(row) || !sub_rows.is_empty() {
                out.push(Rc::new(row.with_sub_rows(sub_rows)));
            }
        } else if keep(row) {
            out.push(if row.has_sub_rows() {
                Rc::new(row.with_sub_rows(Vec::new()))
            } else {
                Rc::clone(row)
            });
        }
    }
    out
}

fn prune_from_root<T>(
    rows: &[Rc<Row<T>>],
    depth: usize,
    max_depth: usize,
    keep: &dyn Fn(&Row<T>) -> bool,
) -> Vec<Rc<Row<T>>> {
    rows.iter()
        .filter(|row| keep(row))
        .map(|row| {
            if row.has_sub_rows() && depth < max_depth {
                let sub_rows = prune_from_root(&row.sub_rows, depth + 1, max_depth, keep);
                Rc::new(row.with_sub_rows(sub_rows))
            } else {
                Rc::clone(row)
            }
        })
        .collect()
}
