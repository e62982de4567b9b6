use std::rc::Rc;
use std::sync::Arc;

use crate::{Column, ColumnFilter, Result, RowFilterState, Table, Value};

impl<T> Table<T> {
    /// Sets, replaces or (with a value the column's filter auto-removes) clears one column
    /// filter. Fails for unknown columns.
    pub fn set_column_filter_value(&mut self, column_id: &str, value: impl Into<Value>) -> Result<()> {
        let id = Arc::clone(self.column(column_id)?.id());
        let value = value.into();
        self.set_column_filters(|filters| {
            let mut next = filters.clone();
            match next.iter_mut().find(|f| f.id == id) {
                Some(existing) => existing.value = value,
                None => next.push(ColumnFilter { id, value }),
            }
            next
        });
        Ok(())
    }

    /// The active filter value, `Undefined` when the column is not filtered.
    pub fn column_filter_value(&self, column_id: &str) -> Value {
        self.state()
            .column_filters
            .iter()
            .find(|f| &*f.id == column_id)
            .map_or(Value::Undefined, |f| f.value.clone())
    }

    pub fn is_column_filtered(&self, column_id: &str) -> bool {
        self.state().column_filters.iter().any(|f| &*f.id == column_id)
    }

    /// Index of the column's filter in state order.
    pub fn column_filter_index(&self, column_id: &str) -> Option<usize> {
        self.state()
            .column_filters
            .iter()
            .position(|f| &*f.id == column_id)
    }

    pub fn column_can_filter(&self, column_id: &str) -> Result<bool> {
        let column = self.column(column_id)?;
        Ok(column.has_accessor()
            && column.def().enable_column_filter
            && self.options().enable_column_filters)
    }

    /// Global filtering needs the column and the table to allow it, and the column's value in the
    /// first core row to be text or a number.
    pub(crate) fn column_can_global_filter(&self, column: &Column<T>) -> Result<bool> {
        if !column.has_accessor()
            || !column.def().enable_global_filter
            || !self.options().enable_global_filter
        {
            return Ok(false);
        }
        let core = self.core_row_model()?;
        let Some(first) = core.flat_rows.first() else {
            return Ok(false);
        };
        Ok(matches!(
            self.core_value(first, column),
            Value::Text(_) | Value::Number(_)
        ))
    }

    pub fn reset_column_filters(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.column_filters);
        self.set_column_filters(|_| (*initial).clone());
    }

    pub fn reset_global_filter(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.global_filter);
        self.set_global_filter(|_| (*initial).clone());
    }

    /// Pass/fail and metadata recorded for a core row by the current filters.
    ///
    /// `None` when no filter is active or the row was never evaluated.
    pub fn row_filter_state(&self, row_id: &str) -> Result<Option<Rc<RowFilterState>>> {
        Ok(self.filter_evaluation()?.rows.get(row_id).cloned())
    }
}
