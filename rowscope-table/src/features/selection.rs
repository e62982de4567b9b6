use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::{Result, Row, RowId, RowModel, Table};

#[derive(Clone, Copy)]
struct SelectionRules {
    enabled: bool,
    multi: bool,
    sub_rows: bool,
}

fn mark_selected<T>(
    selection: &mut BTreeSet<RowId>,
    row: &Row<T>,
    value: bool,
    include_children: bool,
    rules: SelectionRules,
) {
    if value {
        if !rules.multi {
            selection.clear();
        }
        if rules.enabled {
            selection.insert(Arc::clone(&row.id));
        }
    } else {
        selection.remove(&row.id);
    }
    if include_children && rules.sub_rows {
        for sub in &row.sub_rows {
            mark_selected(selection, sub, value, include_children, rules);
        }
    }
}

/// The selected rows of `model`. An unselected row drops out together with its subtree, but
/// selected descendants are still listed in the flat rows.
fn select_rows<T>(model: &RowModel<T>, selection: &BTreeSet<RowId>) -> RowModel<T> {
    fn walk<T>(
        rows: &[Rc<Row<T>>],
        selection: &BTreeSet<RowId>,
        flat: &mut Vec<Rc<Row<T>>>,
    ) -> Vec<Rc<Row<T>>> {
        let mut out = Vec::new();
        for row in rows {
            let selected = selection.contains(&row.id);
            if selected {
                flat.push(Rc::clone(row));
            }
            let row = if row.has_sub_rows() {
                Rc::new(row.with_sub_rows(walk(&row.sub_rows, selection, flat)))
            } else {
                Rc::clone(row)
            };
            if selected {
                out.push(row);
            }
        }
        out
    }

    if selection.is_empty() {
        return RowModel::default();
    }
    let mut flat = Vec::new();
    let rows = walk(&model.rows, selection, &mut flat);
    RowModel::from_parts(rows, flat)
}

impl<T> Table<T> {
    fn selection_rules(&self) -> SelectionRules {
        let options = self.options();
        SelectionRules {
            enabled: options.enable_row_selection,
            multi: options.enable_multi_row_selection,
            sub_rows: options.enable_sub_row_selection,
        }
    }

    pub fn row_can_select(&self) -> bool {
        self.options().enable_row_selection
    }

    pub fn is_row_selected(&self, row_id: &str) -> bool {
        self.state().row_selection.contains(row_id)
    }

    /// Selects or deselects a row, and its sub-rows with `select_children`. `value` forces the
    /// outcome.
    pub fn toggle_row_selected(
        &mut self,
        row_id: &str,
        value: Option<bool>,
        select_children: bool,
    ) -> Result<()> {
        let row = self.row_any(row_id)?;
        let selected = self.is_row_selected(row_id);
        let value = value.unwrap_or(!selected);
        if self.row_can_select() && selected == value && !select_children {
            return Ok(());
        }
        let rules = self.selection_rules();
        self.set_row_selection(|old| {
            let mut next = old.clone();
            mark_selected(&mut next, &row, value, select_children, rules);
            next
        });
        Ok(())
    }

    /// Every selectable filtered row is selected.
    pub fn is_all_rows_selected(&self) -> Result<bool> {
        let selection = &self.state().row_selection;
        if selection.is_empty() {
            return Ok(false);
        }
        let filtered = self.filtered_row_model()?;
        Ok(!filtered.flat_rows.is_empty()
            && (!self.row_can_select()
                || filtered
                    .flat_rows
                    .iter()
                    .all(|row| selection.contains(&row.id))))
    }

    /// Some, but not all, filtered rows are selected.
    pub fn is_some_rows_selected(&self) -> Result<bool> {
        let selection = &self.state().row_selection;
        let filtered = self.filtered_row_model()?;
        let selected = filtered
            .flat_rows
            .iter()
            .filter(|row| selection.contains(&row.id))
            .count();
        Ok(selected > 0 && selected < filtered.flat_rows.len())
    }

    /// Selects or deselects every filtered row.
    pub fn toggle_all_rows_selected(&mut self, value: Option<bool>) -> Result<()> {
        let value = match value {
            Some(value) => value,
            None => !self.is_all_rows_selected()?,
        };
        let filtered = self.filtered_row_model()?;
        let enabled = self.row_can_select();
        self.set_row_selection(|old| {
            let mut next = old.clone();
            for row in &filtered.flat_rows {
                if !value {
                    next.remove(&row.id);
                } else if enabled {
                    next.insert(Arc::clone(&row.id));
                }
            }
            next
        });
        Ok(())
    }

    /// Every selectable row on the current page is selected.
    pub fn is_all_page_rows_selected(&self) -> Result<bool> {
        if !self.row_can_select() {
            return Ok(false);
        }
        let page = self.row_model()?;
        let selection = &self.state().row_selection;
        Ok(!page.flat_rows.is_empty() && page.flat_rows.iter().all(|row| selection.contains(&row.id)))
    }

    pub fn is_some_page_rows_selected(&self) -> Result<bool> {
        if self.is_all_page_rows_selected()? {
            return Ok(false);
        }
        let page = self.row_model()?;
        let selection = &self.state().row_selection;
        Ok(page.flat_rows.iter().any(|row| selection.contains(&row.id)))
    }

    /// Selects or deselects the rows of the current page, sub-rows included.
    pub fn toggle_all_page_rows_selected(&mut self, value: Option<bool>) -> Result<()> {
        let value = match value {
            Some(value) => value,
            None => !self.is_all_page_rows_selected()?,
        };
        let page = self.row_model()?;
        let rules = self.selection_rules();
        self.set_row_selection(|old| {
            let mut next = old.clone();
            for row in &page.rows {
                mark_selected(&mut next, row, value, true, rules);
            }
            next
        });
        Ok(())
    }

    pub fn reset_row_selection(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.row_selection);
        self.set_row_selection(|_| (*initial).clone());
    }

    /// Selected core rows.
    pub fn selected_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let core = self.core_row_model()?;
        let selection = Arc::clone(&self.state().row_selection);
        Ok(self
            .caches
            .selected
            .borrow_mut()
            .get((core, selection), |(core, selection)| {
                Rc::new(select_rows(core, selection))
            }))
    }

    /// Selected rows that pass the current filters.
    pub fn filtered_selected_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let filtered = self.filtered_row_model()?;
        let selection = Arc::clone(&self.state().row_selection);
        Ok(self
            .caches
            .filtered_selected
            .borrow_mut()
            .get((filtered, selection), |(filtered, selection)| {
                Rc::new(select_rows(filtered, selection))
            }))
    }
}
