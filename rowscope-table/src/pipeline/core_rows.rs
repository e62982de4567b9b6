use std::rc::Rc;
use std::sync::Arc;

use crate::options::{GetRowIdFn, GetSubRowsFn};
use crate::{Result, Row, RowId, RowModel};

/// The position-path id: `"3"` for the fourth root, `"3.1"` for its second child.
pub(crate) fn default_row_id(index: usize, parent: Option<&RowId>) -> RowId {
    match parent {
        Some(parent) => format!("{parent}.{index}").into(),
        None => index.to_string().into(),
    }
}

/// Builds the core model from raw records. Two rows resolving to the same id is an error.
pub(crate) fn build<T>(
    data: &[Arc<T>],
    get_row_id: Option<&GetRowIdFn<T>>,
    get_sub_rows: Option<&GetSubRowsFn<T>>,
) -> Result<RowModel<T>> {
    let rows = access_rows(data, 0, None, get_row_id, get_sub_rows);
    let model = RowModel::try_from_rows(rows)?;
    tdebug!(
        rows = model.rows.len(),
        flat_rows = model.flat_rows.len(),
        "core row model built"
    );
    Ok(model)
}

fn access_rows<T>(
    records: &[Arc<T>],
    depth: usize,
    parent: Option<&RowId>,
    get_row_id: Option<&GetRowIdFn<T>>,
    get_sub_rows: Option<&GetSubRowsFn<T>>,
) -> Vec<Rc<Row<T>>> {
    records
        .iter()
        .enumerate()
        .map(|(index, original)| {
            let id = match get_row_id {
                Some(f) => f(original, index, parent),
                None => default_row_id(index, parent),
            };
            let sub_rows = match get_sub_rows {
                Some(f) => {
                    let children = f(original);
                    access_rows(&children, depth + 1, Some(&id), get_row_id, get_sub_rows)
                }
                None => Vec::new(),
            };
            Rc::new(Row {
                id,
                index,
                original: Arc::clone(original),
                depth,
                parent_id: parent.cloned(),
                sub_rows,
                group: None,
            })
        })
        .collect()
}
