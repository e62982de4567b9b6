use std::rc::Rc;

use crate::{ExpandedState, Row, RowModel};

/// `rows` with the children of every expanded row inserted after it, depth-first.
pub(crate) fn expand_list<T>(rows: &[Rc<Row<T>>], expanded: &ExpandedState) -> Vec<Rc<Row<T>>> {
    fn visit<T>(row: &Rc<Row<T>>, expanded: &ExpandedState, out: &mut Vec<Rc<Row<T>>>) {
        out.push(Rc::clone(row));
        if row.has_sub_rows() && expanded.contains(&row.id) {
            for sub in &row.sub_rows {
                visit(sub, expanded, out);
            }
        }
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        visit(row, expanded, &mut out);
    }
    out
}

/// The expanded view of `model`. Flat rows and the id index are shared with the input.
pub(crate) fn expand<T>(model: &RowModel<T>, expanded: &ExpandedState) -> RowModel<T> {
    RowModel {
        rows: expand_list(&model.rows, expanded),
        flat_rows: model.flat_rows.clone(),
        rows_by_id: model.rows_by_id.clone(),
    }
}
