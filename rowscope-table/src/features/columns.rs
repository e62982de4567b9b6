use std::collections::HashMap;
use std::sync::Arc;

use crate::{Column, ColumnId, GroupedColumnMode, Result, Table, TableError};

impl<T> Table<T> {
    pub fn column(&self, column_id: &str) -> Result<&Column<T>> {
        self.find_column(column_id)
            .ok_or_else(|| TableError::column_not_found(column_id))
    }

    /// Every column, group columns included, in pre-order.
    pub fn all_columns(&self) -> &[Column<T>] {
        &self.columns().all
    }

    /// Leaf columns in definition order.
    pub fn leaf_columns(&self) -> &[Column<T>] {
        &self.columns().leaves
    }

    /// Leaf columns in display order: ids from the column order state first, then the rest in
    /// definition order. Grouped columns then move to the front or drop out, per
    /// `grouped_column_mode`.
    pub fn ordered_leaf_columns(&self) -> Vec<&Column<T>> {
        let leaves = self.leaf_columns();
        let order = &self.state().column_order;
        let mut ordered: Vec<&Column<T>> = order
            .iter()
            .filter_map(|id| leaves.iter().find(|column| column.id() == id))
            .collect();
        ordered.extend(leaves.iter().filter(|column| !order.contains(column.id())));

        let grouping = &self.state().grouping;
        if grouping.is_empty() {
            return ordered;
        }
        match self.options().grouped_column_mode {
            GroupedColumnMode::None => ordered,
            GroupedColumnMode::Remove => ordered
                .into_iter()
                .filter(|column| !grouping.contains(column.id()))
                .collect(),
            GroupedColumnMode::Reorder => {
                let mut reordered: Vec<&Column<T>> = grouping
                    .iter()
                    .filter_map(|id| ordered.iter().find(|column| column.id() == id).copied())
                    .collect();
                reordered.extend(ordered.iter().filter(|column| !grouping.contains(column.id())));
                reordered
            }
        }
    }

    pub(crate) fn ordered_visible_leaf_columns(&self) -> Vec<&Column<T>> {
        self.ordered_leaf_columns()
            .into_iter()
            .filter(|column| self.is_leaf_visible(column.id()))
            .collect()
    }

    /// Visible leaf columns: left-pinned, then unpinned, then right-pinned.
    pub fn visible_leaf_columns(&self) -> Vec<&Column<T>> {
        let mut columns = self.left_columns();
        columns.extend(self.center_columns());
        columns.extend(self.right_columns());
        columns
    }

    fn is_leaf_visible(&self, column_id: &str) -> bool {
        self.state().column_visibility.get(column_id) != Some(&false)
    }

    /// A group column is visible while any of its leaves is.
    pub fn is_column_visible(&self, column_id: &str) -> Result<bool> {
        let column = self.column(column_id)?;
        Ok(column.leaf_ids().iter().any(|id| self.is_leaf_visible(id)))
    }

    pub fn column_can_hide(&self, column_id: &str) -> Result<bool> {
        Ok(self.column(column_id)?.def().enable_hiding && self.options().enable_hiding)
    }

    /// Shows or hides a column and every leaf under it. `visible` forces the outcome.
    pub fn toggle_column_visibility(&mut self, column_id: &str, visible: Option<bool>) -> Result<()> {
        if !self.column_can_hide(column_id)? {
            return Ok(());
        }
        let visible = match visible {
            Some(visible) => visible,
            None => !self.is_column_visible(column_id)?,
        };
        let column = self.column(column_id)?;
        let mut ids = column.leaf_ids().to_vec();
        if !column.is_leaf() {
            ids.push(Arc::clone(column.id()));
        }
        self.set_column_visibility(|old| {
            let mut next = old.clone();
            for id in ids {
                next.insert(id, visible);
            }
            next
        });
        Ok(())
    }

    pub fn is_all_columns_visible(&self) -> bool {
        self.leaf_columns()
            .iter()
            .all(|column| self.is_leaf_visible(column.id()))
    }

    pub fn is_some_columns_visible(&self) -> bool {
        self.leaf_columns()
            .iter()
            .any(|column| self.is_leaf_visible(column.id()))
    }

    /// Shows every leaf column, or hides every leaf column that can be hidden.
    pub fn toggle_all_columns_visible(&mut self, visible: Option<bool>) {
        let visible = visible.unwrap_or(!self.is_all_columns_visible());
        let table_can_hide = self.options().enable_hiding;
        let next: HashMap<ColumnId, bool> = self
            .leaf_columns()
            .iter()
            .map(|column| {
                let can_hide = table_can_hide && column.def().enable_hiding;
                (Arc::clone(column.id()), visible || !can_hide)
            })
            .collect();
        self.set_column_visibility(|_| next);
    }

    pub fn reset_column_visibility(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.column_visibility);
        self.set_column_visibility(|_| (*initial).clone());
    }

    pub fn reset_column_order(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.column_order);
        self.set_column_order(|_| (*initial).clone());
    }

    /// The column's width: the sizing state or the definition's size, clamped to its min/max.
    /// Group columns measure the sum of their leaves.
    pub fn column_size(&self, column_id: &str) -> Result<u32> {
        let column = self.column(column_id)?;
        if !column.is_leaf() {
            let mut total = 0u32;
            for id in column.leaf_ids() {
                total = total.saturating_add(self.column_size(id)?);
            }
            return Ok(total);
        }
        let def = column.def();
        let size = self
            .state()
            .column_sizing
            .get(column_id)
            .copied()
            .unwrap_or(def.size);
        Ok(size.clamp(def.min_size, def.max_size.max(def.min_size)))
    }

    /// Offset of a visible leaf column from the left edge, or `None` when it is hidden.
    pub fn column_start(&self, column_id: &str) -> Result<Option<u64>> {
        let mut start = 0u64;
        for column in self.visible_leaf_columns() {
            if &**column.id() == column_id {
                return Ok(Some(start));
            }
            start += u64::from(self.column_size(column.id())?);
        }
        self.column(column_id)?;
        Ok(None)
    }

    /// Sum of the visible leaf column widths.
    pub fn total_size(&self) -> Result<u64> {
        let mut total = 0u64;
        for column in self.visible_leaf_columns() {
            total += u64::from(self.column_size(column.id())?);
        }
        Ok(total)
    }

    pub fn column_can_resize(&self, column_id: &str) -> Result<bool> {
        Ok(self.column(column_id)?.def().enable_resizing && self.options().enable_column_resizing)
    }

    /// Records a new width for a leaf column, clamped to its min/max.
    pub fn resize_column(&mut self, column_id: &str, size: u32) -> Result<()> {
        if !self.column_can_resize(column_id)? {
            return Ok(());
        }
        let column = self.column(column_id)?;
        let def = column.def();
        let size = size.clamp(def.min_size, def.max_size.max(def.min_size));
        let id = Arc::clone(column.id());
        self.set_column_sizing(|old| {
            let mut next = old.clone();
            next.insert(id, size);
            next
        });
        Ok(())
    }

    /// Drops the column's sizing entry so it falls back to its definition size.
    pub fn reset_column_size(&mut self, column_id: &str) -> Result<()> {
        let id = Arc::clone(self.column(column_id)?.id());
        self.set_column_sizing(|old| {
            let mut next = old.clone();
            next.remove(&id);
            next
        });
        Ok(())
    }

    pub fn reset_column_sizing(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.column_sizing);
        self.set_column_sizing(|_| (*initial).clone());
    }
}
