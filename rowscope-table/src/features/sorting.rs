use std::sync::Arc;

use crate::{Column, ColumnSort, Result, Table, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_desc(self) -> bool {
        self == Self::Desc
    }

    fn from_desc(desc: bool) -> Self {
        if desc { Self::Desc } else { Self::Asc }
    }
}

enum SortAction {
    Add,
    Toggle,
    Remove,
    Replace,
}

impl<T> Table<T> {
    /// Sortable when the column has an accessor and neither the column nor the table disables
    /// sorting.
    pub(crate) fn is_sortable(&self, column: &Column<T>) -> bool {
        column.has_accessor() && column.def().enable_sorting && self.options().enable_sorting
    }

    pub fn column_can_sort(&self, column_id: &str) -> Result<bool> {
        Ok(self.is_sortable(self.column(column_id)?))
    }

    /// The column setting wins over the table setting; otherwise any column with an accessor
    /// can join a multi-sort.
    pub fn column_can_multi_sort(&self, column_id: &str) -> Result<bool> {
        let column = self.column(column_id)?;
        Ok(column
            .def()
            .enable_multi_sort
            .unwrap_or(self.options().enable_multi_sort && column.has_accessor()))
    }

    /// Text columns start ascending and everything else descending, unless `sort_desc_first`
    /// is set on the column or the table.
    pub fn first_sort_direction(&self, column_id: &str) -> Result<SortDirection> {
        let column = self.column(column_id)?;
        if let Some(desc) = column.def().sort_desc_first.or(self.options().sort_desc_first) {
            return Ok(SortDirection::from_desc(desc));
        }
        let filtered = self.filtered_row_model()?;
        let sample = filtered
            .flat_rows
            .first()
            .map_or(Value::Undefined, |row| self.core_value(row, column));
        Ok(match sample {
            Value::Text(_) => SortDirection::Asc,
            _ => SortDirection::Desc,
        })
    }

    pub fn column_sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.state()
            .sorting
            .iter()
            .find(|s| &*s.id == column_id)
            .map(|s| SortDirection::from_desc(s.desc))
    }

    /// Position of the column among the sort keys.
    pub fn column_sort_index(&self, column_id: &str) -> Option<usize> {
        self.state().sorting.iter().position(|s| &*s.id == column_id)
    }

    /// The direction the next toggle moves to, or `None` when it removes the sort.
    ///
    /// Unsorted columns take their first direction. A column sorted the other way round is
    /// removed when removal is allowed.
    pub fn next_sorting_order(&self, column_id: &str, multi: bool) -> Result<Option<SortDirection>> {
        let first = self.first_sort_direction(column_id)?;
        let Some(current) = self.column_sort_direction(column_id) else {
            return Ok(Some(first));
        };
        let options = self.options();
        let removable = options.enable_sorting_removal && (!multi || options.enable_multi_remove);
        if current != first && removable {
            return Ok(None);
        }
        Ok(Some(match current {
            SortDirection::Desc => SortDirection::Asc,
            SortDirection::Asc => SortDirection::Desc,
        }))
    }

    /// Cycles a column's sort. `desc` forces a direction; `multi` adds the column to the
    /// existing keys instead of replacing them.
    ///
    /// Columns that cannot sort are left alone.
    pub fn toggle_sorting(&mut self, column_id: &str, desc: Option<bool>, multi: bool) -> Result<()> {
        let column = self.column(column_id)?;
        if !self.is_sortable(column) {
            return Ok(());
        }
        let id = Arc::clone(column.id());
        let can_multi = self.column_can_multi_sort(column_id)?;
        let next_order = self.next_sorting_order(column_id, multi)?;
        let next_desc = desc.unwrap_or(next_order == Some(SortDirection::Desc));
        let max_keys = self.options().max_multi_sort_col_count;

        self.set_sorting(|old| {
            let existing = old.iter().position(|s| s.id == id);
            let mut action = if !old.is_empty() && can_multi && multi {
                if existing.is_some() { SortAction::Toggle } else { SortAction::Add }
            } else if !old.is_empty() && existing.is_some_and(|i| i + 1 != old.len()) {
                SortAction::Replace
            } else if existing.is_some() {
                SortAction::Toggle
            } else {
                SortAction::Replace
            };
            if matches!(action, SortAction::Toggle) && desc.is_none() && next_order.is_none() {
                action = SortAction::Remove;
            }

            match action {
                SortAction::Add => {
                    let mut next = old.clone();
                    next.push(ColumnSort { id, desc: next_desc });
                    if let Some(max) = max_keys {
                        let excess = next.len().saturating_sub(max);
                        next = next.split_off(excess);
                    }
                    next
                }
                SortAction::Toggle => old
                    .iter()
                    .map(|s| {
                        if s.id == id {
                            ColumnSort { id: Arc::clone(&s.id), desc: next_desc }
                        } else {
                            s.clone()
                        }
                    })
                    .collect(),
                SortAction::Remove => old.iter().filter(|s| s.id != id).cloned().collect(),
                SortAction::Replace => vec![ColumnSort { id, desc: next_desc }],
            }
        });
        Ok(())
    }

    /// Removes one column from the sort keys.
    pub fn clear_sorting(&mut self, column_id: &str) {
        self.set_sorting(|old| old.iter().filter(|s| &*s.id != column_id).cloned().collect());
    }

    pub fn reset_sorting(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.sorting);
        self.set_sorting(|_| (*initial).clone());
    }
}
