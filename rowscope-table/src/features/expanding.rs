use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{ExpandedState, Result, Row, RowId, Table};

impl<T> Table<T> {
    pub fn row_can_expand(&self, row: &Row<T>) -> bool {
        self.options().enable_expanding && row.has_sub_rows()
    }

    pub fn is_row_expanded(&self, row_id: &str) -> bool {
        self.state().expanded.contains(row_id)
    }

    /// Whether every ancestor of the row is expanded. Top-level rows always are.
    pub fn is_all_parents_expanded(&self, row_id: &str) -> Result<bool> {
        let mut parent = self.row_any(row_id)?.parent_id.clone();
        while let Some(id) = parent {
            if !self.is_row_expanded(&id) {
                return Ok(false);
            }
            parent = self.row_any(&id)?.parent_id.clone();
        }
        Ok(true)
    }

    /// Expands or collapses one row. `expanded` forces the outcome.
    ///
    /// Collapsing a row while every row is expanded turns `All` into the explicit id set.
    pub fn toggle_row_expanded(&mut self, row_id: &str, expanded: Option<bool>) -> Result<()> {
        let id = Arc::clone(&self.row_any(row_id)?.id);
        let expanded = expanded.unwrap_or(!self.is_row_expanded(row_id));
        let all_ids = match &*self.state().expanded {
            ExpandedState::All => Some(
                self.sorted_row_model()?
                    .flat_rows
                    .iter()
                    .map(|row| Arc::clone(&row.id))
                    .collect::<Vec<_>>(),
            ),
            ExpandedState::Rows(_) => None,
        };
        self.set_expanded(|old| {
            let mut ids: BTreeSet<RowId> = match (old, all_ids) {
                (ExpandedState::Rows(ids), _) => ids.clone(),
                (ExpandedState::All, Some(all)) => all.into_iter().collect(),
                (ExpandedState::All, None) => BTreeSet::new(),
            };
            if expanded {
                ids.insert(id);
            } else {
                ids.remove(&id);
            }
            ExpandedState::Rows(ids)
        });
        Ok(())
    }

    /// Expands every row, or collapses every row, or flips between the two.
    pub fn toggle_all_rows_expanded(&mut self, expanded: Option<bool>) -> Result<()> {
        let expanded = match expanded {
            Some(expanded) => expanded,
            None => !self.is_all_rows_expanded()?,
        };
        self.set_expanded(|_| {
            if expanded {
                ExpandedState::All
            } else {
                ExpandedState::default()
            }
        });
        Ok(())
    }

    /// Every expandable row is expanded. Rows without sub-rows are ignored.
    pub fn is_all_rows_expanded(&self) -> Result<bool> {
        match &*self.state().expanded {
            ExpandedState::All => Ok(true),
            ExpandedState::Rows(ids) if ids.is_empty() => Ok(false),
            ExpandedState::Rows(ids) => Ok(self
                .sorted_row_model()?
                .flat_rows
                .iter()
                .filter(|row| self.row_can_expand(row))
                .all(|row| ids.contains(&row.id))),
        }
    }

    pub fn is_some_rows_expanded(&self) -> bool {
        !self.state().expanded.is_empty()
    }

    /// The deepest nesting level reached by expanded rows: 0 when nothing is expanded, 1 when only
    /// top-level rows are.
    pub fn expanded_depth(&self) -> Result<usize> {
        let model = self.sorted_row_model()?;
        let expanded = &self.state().expanded;
        Ok(model
            .flat_rows
            .iter()
            .filter(|row| row.has_sub_rows() && expanded.contains(&row.id))
            .map(|row| row.depth + 1)
            .max()
            .unwrap_or(0))
    }

    pub fn reset_expanded(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.expanded);
        self.set_expanded(|_| (*initial).clone());
    }
}
