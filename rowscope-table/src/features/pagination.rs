use std::sync::Arc;

use crate::{PaginationState, Result, Table};

impl<T> Table<T> {
    /// Rows being paginated: the `row_count` option, or the top-level rows before pagination.
    pub fn row_count(&self) -> Result<usize> {
        match self.options().row_count {
            Some(count) => Ok(count),
            None => Ok(self.pre_pagination_row_model()?.rows.len()),
        }
    }

    /// The `page_count` option, or the row count divided by the page size, rounded up.
    pub fn page_count(&self) -> Result<usize> {
        if let Some(count) = self.options().page_count {
            return Ok(count);
        }
        let page_size = self.state().pagination.page_size.max(1);
        Ok(self.row_count()?.div_ceil(page_size))
    }

    /// Every page index, for page pickers.
    pub fn page_options(&self) -> Result<Vec<usize>> {
        Ok((0..self.page_count()?).collect())
    }

    pub fn can_previous_page(&self) -> bool {
        self.state().pagination.page_index > 0
    }

    pub fn can_next_page(&self) -> Result<bool> {
        let page_count = self.page_count()?;
        Ok(page_count > 0 && self.state().pagination.page_index < page_count - 1)
    }

    /// Moves to `page_index`, clamped to the last page.
    pub fn set_page_index(&mut self, page_index: usize) -> Result<()> {
        let last = self.page_count()?.saturating_sub(1);
        let page_index = page_index.min(last);
        self.set_pagination(|p| PaginationState { page_index, ..*p });
        Ok(())
    }

    /// Changes the page size and moves to the page holding the current top row.
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        self.set_pagination(|p| {
            let top_row = p.page_index.saturating_mul(p.page_size);
            PaginationState {
                page_index: top_row / page_size,
                page_size,
            }
        });
    }

    pub fn next_page(&mut self) -> Result<()> {
        let page_index = self.state().pagination.page_index;
        self.set_page_index(page_index.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Result<()> {
        let page_index = self.state().pagination.page_index;
        self.set_page_index(page_index.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> Result<()> {
        self.set_page_index(0)
    }

    pub fn last_page(&mut self) -> Result<()> {
        let last = self.page_count()?.saturating_sub(1);
        self.set_page_index(last)
    }

    pub fn reset_page_index(&mut self) {
        let page_index = self.options().initial_state.pagination.page_index;
        self.set_pagination(|p| PaginationState { page_index, ..*p });
    }

    pub fn reset_pagination(&mut self) {
        let initial = Arc::clone(&self.options().initial_state.pagination);
        self.set_pagination(|_| *initial);
    }
}
