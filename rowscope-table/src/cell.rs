use std::rc::Rc;

use crate::{Column, Result, Row, Table, Value};

/// The intersection of a row and a leaf column.
pub struct Cell<'t, T> {
    table: &'t Table<T>,
    row: Rc<Row<T>>,
    column: &'t Column<T>,
}

impl<T> std::fmt::Debug for Cell<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("row", &self.row.id)
            .field("column", self.column.id())
            .finish()
    }
}

impl<'t, T> Cell<'t, T> {
    /// `row id` + `_` + `column id`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.row.id, self.column.id())
    }

    pub fn row(&self) -> &Rc<Row<T>> {
        &self.row
    }

    pub fn column(&self) -> &'t Column<T> {
        self.column
    }

    pub fn value(&self) -> Result<Value> {
        self.table.value_for(&self.row, self.column)
    }

    /// The group row's own grouping column.
    pub fn is_grouped(&self) -> bool {
        self.row.grouping_column_id() == Some(self.column.id())
    }

    /// A grouped column on any row other than the group row that owns it.
    pub fn is_placeholder(&self) -> bool {
        !self.is_grouped() && self.table.is_column_grouped(self.column.id())
    }

    pub fn is_aggregated(&self) -> bool {
        !self.is_grouped() && !self.is_placeholder() && self.row.has_sub_rows()
    }
}

impl<T> Table<T> {
    pub fn cell(&self, row: &Rc<Row<T>>, column_id: &str) -> Result<Cell<'_, T>> {
        Ok(Cell {
            table: self,
            row: Rc::clone(row),
            column: self.column(column_id)?,
        })
    }

    /// One cell per visible leaf column, in display order.
    pub fn row_cells(&self, row: &Rc<Row<T>>) -> Vec<Cell<'_, T>> {
        self.visible_leaf_columns()
            .into_iter()
            .map(|column| Cell {
                table: self,
                row: Rc::clone(row),
                column,
            })
            .collect()
    }
}
