//! Rows and row models.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use crate::{ColumnId, Result, RowId, TableError, Value};

/// A row of a row model.
///
/// Rows are immutable; a stage that changes a row's children or placement produces a copy with
/// the same id.
#[derive(Debug)]
pub struct Row<T> {
    pub id: RowId,
    /// Position among the row's siblings in the core model (group rows: among sibling groups).
    pub index: usize,
    pub original: Arc<T>,
    pub depth: usize,
    pub parent_id: Option<RowId>,
    pub sub_rows: Vec<Rc<Row<T>>>,
    /// Set on the synthetic rows created by grouping.
    pub group: Option<GroupInfo<T>>,
}

/// What a group row groups.
#[derive(Debug)]
pub struct GroupInfo<T> {
    pub column_id: ColumnId,
    /// The grouping column's value shared by every leaf row.
    pub value: Value,
    /// The stringified value the partition was keyed on.
    pub key: Arc<str>,
    /// The data rows under this group, across nested groups, in display order.
    pub leaf_rows: Vec<Rc<Row<T>>>,
    /// Every grouping column in effect when the group was built.
    pub grouping: Arc<Vec<ColumnId>>,
}

impl<T> Clone for GroupInfo<T> {
    fn clone(&self) -> Self {
        Self {
            column_id: Arc::clone(&self.column_id),
            value: self.value.clone(),
            key: Arc::clone(&self.key),
            leaf_rows: self.leaf_rows.clone(),
            grouping: Arc::clone(&self.grouping),
        }
    }
}

impl<T> Clone for Row<T> {
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            index: self.index,
            original: Arc::clone(&self.original),
            depth: self.depth,
            parent_id: self.parent_id.clone(),
            sub_rows: self.sub_rows.clone(),
            group: self.group.clone(),
        }
    }
}

impl<T> Row<T> {
    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }

    pub fn has_sub_rows(&self) -> bool {
        !self.sub_rows.is_empty()
    }

    /// The grouping column when this is a group row.
    pub fn grouping_column_id(&self) -> Option<&ColumnId> {
        self.group.as_ref().map(|g| &g.column_id)
    }

    /// Every descendant, pre-order.
    pub fn leaf_rows(&self) -> Vec<Rc<Row<T>>> {
        let mut out = Vec::new();
        fn walk<T>(rows: &[Rc<Row<T>>], out: &mut Vec<Rc<Row<T>>>) {
            for row in rows {
                out.push(Rc::clone(row));
                walk(&row.sub_rows, out);
            }
        }
        walk(&self.sub_rows, &mut out);
        out
    }

    pub(crate) fn with_sub_rows(&self, sub_rows: Vec<Rc<Row<T>>>) -> Self {
        Self {
            sub_rows,
            ..self.clone_shallow()
        }
    }

    fn clone_shallow(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            index: self.index,
            original: Arc::clone(&self.original),
            depth: self.depth,
            parent_id: self.parent_id.clone(),
            sub_rows: Vec::new(),
            group: self.group.clone(),
        }
    }
}

/// The output of a pipeline stage.
#[derive(Debug)]
pub struct RowModel<T> {
    /// Top-level rows, in display order.
    pub rows: Vec<Rc<Row<T>>>,
    /// Every row of the model, pre-order.
    pub flat_rows: Vec<Rc<Row<T>>>,
    pub rows_by_id: HashMap<RowId, Rc<Row<T>>>,
}

impl<T> Clone for RowModel<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            flat_rows: self.flat_rows.clone(),
            rows_by_id: self.rows_by_id.clone(),
        }
    }
}

impl<T> Default for RowModel<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            flat_rows: Vec::new(),
            rows_by_id: HashMap::new(),
        }
    }
}

impl<T> RowModel<T> {
    /// Builds flat rows and the id index from `rows`. A row reachable twice is listed once.
    pub fn from_rows(rows: Vec<Rc<Row<T>>>) -> Self {
        let mut flat_rows = Vec::new();
        let mut seen = HashSet::new();
        fn walk<T>(rows: &[Rc<Row<T>>], seen: &mut HashSet<RowId>, out: &mut Vec<Rc<Row<T>>>) {
            for row in rows {
                if seen.insert(Arc::clone(&row.id)) {
                    out.push(Rc::clone(row));
                    walk(&row.sub_rows, seen, out);
                }
            }
        }
        walk(&rows, &mut seen, &mut flat_rows);
        Self::from_parts(rows, flat_rows)
    }

    /// Like [`RowModel::from_rows`], but two rows sharing an id is an error.
    pub fn try_from_rows(rows: Vec<Rc<Row<T>>>) -> Result<Self> {
        let mut flat_rows = Vec::new();
        fn walk<T>(rows: &[Rc<Row<T>>], out: &mut Vec<Rc<Row<T>>>) {
            for row in rows {
                out.push(Rc::clone(row));
                walk(&row.sub_rows, out);
            }
        }
        walk(&rows, &mut flat_rows);

        let mut rows_by_id = HashMap::with_capacity(flat_rows.len());
        for row in &flat_rows {
            if rows_by_id.insert(Arc::clone(&row.id), Rc::clone(row)).is_some() {
                return Err(TableError::duplicate_row_id(Arc::clone(&row.id)));
            }
        }
        Ok(Self {
            rows,
            flat_rows,
            rows_by_id,
        })
    }

    pub(crate) fn from_parts(rows: Vec<Rc<Row<T>>>, flat_rows: Vec<Rc<Row<T>>>) -> Self {
        let rows_by_id = flat_rows
            .iter()
            .map(|row| (Arc::clone(&row.id), Rc::clone(row)))
            .collect();
        Self {
            rows,
            flat_rows,
            rows_by_id,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rc<Row<T>>> {
        self.rows_by_id.get(id)
    }

    /// Number of top-level rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = &RowId> {
        self.rows.iter().map(|row| &row.id)
    }
}
