use std::rc::Rc;
use std::sync::Arc;

use crate::{
    Column, ColumnId, ColumnPinPosition, ColumnPinningState, Result, Row, RowId, RowPinPosition,
    RowPinningState, Table,
};

impl<T> Table<T> {
    pub fn row_can_pin(&self) -> bool {
        self.options().enable_row_pinning
    }

    /// Pins a row to the top or bottom, or unpins it with `None`. Pinning appends the row to the
    /// end of that side. A no-op while row pinning is disabled.
    pub fn pin_row(&mut self, row_id: &str, position: Option<RowPinPosition>) -> Result<()> {
        let id = Arc::clone(&self.row_any(row_id)?.id);
        if !self.row_can_pin() {
            return Ok(());
        }
        self.set_row_pinning(|old| {
            let mut next = RowPinningState {
                top: old.top.iter().filter(|r| **r != id).cloned().collect(),
                bottom: old.bottom.iter().filter(|r| **r != id).cloned().collect(),
            };
            match position {
                Some(RowPinPosition::Top) => next.top.push(id),
                Some(RowPinPosition::Bottom) => next.bottom.push(id),
                None => {}
            }
            next
        });
        Ok(())
    }

    pub fn row_pinned(&self, row_id: &str) -> Option<RowPinPosition> {
        let pinning = &self.state().row_pinning;
        if pinning.top.iter().any(|id| &**id == row_id) {
            Some(RowPinPosition::Top)
        } else if pinning.bottom.iter().any(|id| &**id == row_id) {
            Some(RowPinPosition::Bottom)
        } else {
            None
        }
    }

    /// Index of the row within its pinned side.
    pub fn row_pinned_index(&self, row_id: &str) -> Option<usize> {
        let pinning = &self.state().row_pinning;
        let ids = match self.row_pinned(row_id)? {
            RowPinPosition::Top => &pinning.top,
            RowPinPosition::Bottom => &pinning.bottom,
        };
        ids.iter().position(|id| &**id == row_id)
    }

    fn pinned_rows(&self, ids: &[RowId]) -> Result<Vec<Rc<Row<T>>>> {
        let mut rows = Vec::with_capacity(ids.len());
        if self.options().keep_pinned_rows {
            // Pinned rows stay visible across pages and filters, but not inside collapsed parents.
            for id in ids {
                let Ok(row) = self.row(id) else {
                    continue;
                };
                if self.is_all_parents_expanded(id)? {
                    rows.push(row);
                }
            }
        } else {
            let model = self.row_model()?;
            for id in ids {
                if let Some(row) = model.rows.iter().find(|row| row.id == *id) {
                    rows.push(Rc::clone(row));
                }
            }
        }
        Ok(rows)
    }

    pub fn top_rows(&self) -> Result<Vec<Rc<Row<T>>>> {
        let pinning = Arc::clone(&self.state().row_pinning);
        self.pinned_rows(&pinning.top)
    }

    pub fn bottom_rows(&self) -> Result<Vec<Rc<Row<T>>>> {
        let pinning = Arc::clone(&self.state().row_pinning);
        self.pinned_rows(&pinning.bottom)
    }

    /// Rows of the final model that are pinned to neither side.
    pub fn center_rows(&self) -> Result<Vec<Rc<Row<T>>>> {
        let pinning = &self.state().row_pinning;
        Ok(self
            .row_model()?
            .rows
            .iter()
            .filter(|row| !pinning.top.contains(&row.id) && !pinning.bottom.contains(&row.id))
            .cloned()
            .collect())
    }

    pub fn reset_row_pinning(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.row_pinning);
        self.set_row_pinning(|_| (*initial).clone());
    }

    pub fn column_can_pin(&self, column_id: &str) -> Result<bool> {
        let column = self.column(column_id)?;
        let leaves = column.leaf_ids();
        Ok(self.options().enable_column_pinning
            && leaves
                .iter()
                .filter_map(|id| self.find_column(id))
                .all(|leaf| leaf.def().enable_pinning))
    }

    /// Pins a column (every leaf under it, for a group column) left or right, or unpins it.
    /// A no-op unless [`Table::column_can_pin`] holds.
    pub fn pin_column(&mut self, column_id: &str, position: Option<ColumnPinPosition>) -> Result<()> {
        if !self.column_can_pin(column_id)? {
            return Ok(());
        }
        let leaf_ids: Vec<ColumnId> = self.column(column_id)?.leaf_ids().to_vec();
        self.set_column_pinning(|old| {
            let mut next = ColumnPinningState {
                left: old.left.iter().filter(|id| !leaf_ids.contains(id)).cloned().collect(),
                right: old.right.iter().filter(|id| !leaf_ids.contains(id)).cloned().collect(),
            };
            match position {
                Some(ColumnPinPosition::Left) => next.left.extend(leaf_ids),
                Some(ColumnPinPosition::Right) => next.right.extend(leaf_ids),
                None => {}
            }
            next
        });
        Ok(())
    }

    /// The side any leaf of the column is pinned to.
    pub fn column_pinned(&self, column_id: &str) -> Result<Option<ColumnPinPosition>> {
        let leaves = self.column(column_id)?.leaf_ids();
        let pinning = &self.state().column_pinning;
        Ok(if leaves.iter().any(|id| pinning.left.contains(id)) {
            Some(ColumnPinPosition::Left)
        } else if leaves.iter().any(|id| pinning.right.contains(id)) {
            Some(ColumnPinPosition::Right)
        } else {
            None
        })
    }

    pub fn column_pinned_index(&self, column_id: &str) -> Result<Option<usize>> {
        let pinning = &self.state().column_pinning;
        Ok(match self.column_pinned(column_id)? {
            Some(ColumnPinPosition::Left) => pinning.left.iter().position(|id| &**id == column_id),
            Some(ColumnPinPosition::Right) => pinning.right.iter().position(|id| &**id == column_id),
            None => None,
        })
    }

    fn pinned_columns(&self, ids: &[ColumnId]) -> Vec<&Column<T>> {
        let visible = self.ordered_visible_leaf_columns();
        ids.iter()
            .filter_map(|id| visible.iter().find(|column| column.id() == id).copied())
            .collect()
    }

    /// Visible leaf columns pinned left, in pinning order.
    pub fn left_columns(&self) -> Vec<&Column<T>> {
        self.pinned_columns(&self.state().column_pinning.left)
    }

    /// Visible leaf columns pinned right, in pinning order.
    pub fn right_columns(&self) -> Vec<&Column<T>> {
        self.pinned_columns(&self.state().column_pinning.right)
    }

    /// Visible, unpinned leaf columns in display order.
    pub fn center_columns(&self) -> Vec<&Column<T>> {
        let pinning = &self.state().column_pinning;
        self.ordered_visible_leaf_columns()
            .into_iter()
            .filter(|column| !pinning.left.contains(column.id()) && !pinning.right.contains(column.id()))
            .collect()
    }

    pub fn reset_column_pinning(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.column_pinning);
        self.set_column_pinning(|_| (*initial).clone());
    }
}
