use std::sync::Arc;

use crate::{Result, Table};

impl<T> Table<T> {
    pub fn column_can_group(&self, column_id: &str) -> Result<bool> {
        let column = self.column(column_id)?;
        Ok(column.has_accessor() && column.def().enable_grouping && self.options().enable_grouping)
    }

    pub fn is_column_grouped(&self, column_id: &str) -> bool {
        self.state().grouping.iter().any(|id| &**id == column_id)
    }

    pub fn column_grouped_index(&self, column_id: &str) -> Option<usize> {
        self.state().grouping.iter().position(|id| &**id == column_id)
    }

    /// Appends the column to the grouping keys, or removes it when already grouped.
    pub fn toggle_grouping(&mut self, column_id: &str) -> Result<()> {
        let id = Arc::clone(self.column(column_id)?.id());
        self.set_grouping(|old| {
            if old.contains(&id) {
                old.iter().filter(|g| **g != id).cloned().collect()
            } else {
                let mut next = old.clone();
                next.push(id);
                next
            }
        });
        Ok(())
    }

    pub fn reset_grouping(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.grouping);
        self.set_grouping(|_| (*initial).clone());
    }
}
