use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::{Column, ColumnId, GroupInfo, Result, Row, RowId, RowModel, Table};

/// Partitions the top-level rows by each grouping column in turn.
///
/// Groups appear in first-seen order. Group ids are `column:key`, prefixed with the parent
/// group's id and `>` when nested. Data rows move under their innermost group.
pub(crate) fn group<T>(
    table: &Table<T>,
    model: &RowModel<T>,
    grouping: &Arc<Vec<ColumnId>>,
) -> Result<RowModel<T>> {
    let columns = grouping
        .iter()
        .map(|id| table.accessor_column(id, "grouping"))
        .collect::<Result<Vec<_>>>()?;

    let rows = group_level(table, &model.rows, &columns, grouping, 0, None);
    let model = RowModel::from_rows(rows);
    tdebug!(
        groups = model.rows.len(),
        flat_rows = model.flat_rows.len(),
        "grouped row model built"
    );
    Ok(model)
}

fn group_level<T>(
    table: &Table<T>,
    rows: &[Rc<Row<T>>],
    columns: &[&Column<T>],
    grouping: &Arc<Vec<ColumnId>>,
    depth: usize,
    parent_id: Option<&RowId>,
) -> Vec<Rc<Row<T>>> {
    let Some(column) = columns.get(depth) else {
        return rows
            .iter()
            .map(|row| relocate(row, depth, parent_id))
            .collect();
    };

    let mut partitions: Vec<(String, Vec<Rc<Row<T>>>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key = table.core_value(row, column).to_string();
        match slots.get(&key) {
            Some(&slot) => partitions[slot].1.push(Rc::clone(row)),
            None => {
                slots.insert(key.clone(), partitions.len());
                partitions.push((key, vec![Rc::clone(row)]));
            }
        }
    }

    partitions
        .into_iter()
        .enumerate()
        .map(|(index, (key, members))| {
            let id: RowId = match parent_id {
                Some(parent) => format!("{parent}>{}:{key}", column.id()),
                None => format!("{}:{key}", column.id()),
            }
            .into();
            let sub_rows = group_level(table, &members, columns, grouping, depth + 1, Some(&id));
            let leaf_rows = if depth + 1 == columns.len() {
                sub_rows.clone()
            } else {
                sub_rows
                    .iter()
                    .filter_map(|sub| sub.group.as_ref())
                    .flat_map(|info| info.leaf_rows.iter().cloned())
                    .collect()
            };
            let first = &members[0];
            Rc::new(Row {
                index,
                original: Arc::clone(&first.original),
                depth,
                parent_id: parent_id.cloned(),
                group: Some(GroupInfo {
                    column_id: Arc::clone(column.id()),
                    value: table.core_value(first, column),
                    key: key.into(),
                    leaf_rows,
                    grouping: Arc::clone(grouping),
                }),
                sub_rows,
                id,
            })
        })
        .collect()
}

/// A copy of `row` (and its subtree) placed at `depth` under `parent_id`.
fn relocate<T>(row: &Rc<Row<T>>, depth: usize, parent_id: Option<&RowId>) -> Rc<Row<T>> {
    if row.depth == depth && row.parent_id.as_ref() == parent_id && !row.has_sub_rows() {
        return Rc::clone(row);
    }
    let sub_rows = row
        .sub_rows
        .iter()
        .map(|sub| relocate(sub, depth + 1, Some(&row.id)))
        .collect();
    let mut moved = row.with_sub_rows(sub_rows);
    moved.depth = depth;
    moved.parent_id = parent_id.cloned();
    Rc::new(moved)
}
