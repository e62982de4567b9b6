use std::cmp::Ordering;
use std::rc::Rc;

use crate::fns::ResolvedSort;
use crate::{Column, ColumnSort, Result, Row, RowModel, SortUndefined, Table, Value};

struct SortKey<'t, T> {
    column: &'t Column<T>,
    compare: ResolvedSort,
    desc: bool,
    invert: bool,
    undefined: SortUndefined,
}

/// Sorts every sibling list by `sorting`, falling back to the original row index.
pub(crate) fn sort<T>(
    table: &Table<T>,
    model: &RowModel<T>,
    sorting: &[ColumnSort],
) -> Result<RowModel<T>> {
    let mut keys = Vec::with_capacity(sorting.len());
    for entry in sorting {
        let column = table.accessor_column(&entry.id, "sorting")?;
        if !table.is_sortable(column) {
            continue;
        }
        keys.push(SortKey {
            column,
            compare: table.sort_fn_for(column)?,
            desc: entry.desc,
            invert: column.def().invert_sorting,
            undefined: column.def().sort_undefined,
        });
    }

    let rows = sort_rows(table, &model.rows, &keys)?;
    let model = RowModel::from_rows(rows);
    tdebug!(keys = keys.len(), rows = model.flat_rows.len(), "sorted row model built");
    Ok(model)
}

fn sort_rows<T>(
    table: &Table<T>,
    rows: &[Rc<Row<T>>],
    keys: &[SortKey<'_, T>],
) -> Result<Vec<Rc<Row<T>>>> {
    let mut decorated = Vec::with_capacity(rows.len());
    for row in rows {
        let values = keys
            .iter()
            .map(|key| table.value_for(row, key.column))
            .collect::<Result<Vec<Value>>>()?;
        decorated.push((values, Rc::clone(row)));
    }

    decorated.sort_by(|(a_values, a), (b_values, b)| {
        compare_rows(keys, a_values, b_values).then_with(|| a.index.cmp(&b.index))
    });

    decorated
        .into_iter()
        .map(|(_, row)| {
            if row.has_sub_rows() {
                let sub_rows = sort_rows(table, &row.sub_rows, keys)?;
                Ok(Rc::new(row.with_sub_rows(sub_rows)))
            } else {
                Ok(row)
            }
        })
        .collect()
}

fn compare_rows<T>(keys: &[SortKey<'_, T>], a: &[Value], b: &[Value]) -> Ordering {
    for (key, (a, b)) in keys.iter().zip(a.iter().zip(b)) {
        let mut ord = Ordering::Equal;
        let (a_undefined, b_undefined) = (a.is_undefined(), b.is_undefined());
        if a_undefined != b_undefined {
            match key.undefined {
                // Placement is absolute: direction flags do not apply.
                SortUndefined::First => {
                    return if a_undefined { Ordering::Less } else { Ordering::Greater };
                }
                SortUndefined::Last => {
                    return if a_undefined { Ordering::Greater } else { Ordering::Less };
                }
                SortUndefined::Offset(n) => {
                    let undefined_side = n.cmp(&0);
                    ord = if a_undefined { undefined_side } else { undefined_side.reverse() };
                }
                SortUndefined::Disabled => {}
            }
        } else if a_undefined && key.undefined != SortUndefined::Disabled {
            continue;
        }

        if ord == Ordering::Equal {
            ord = key.compare.compare(a, b);
        }
        if ord != Ordering::Equal {
            if key.desc {
                ord = ord.reverse();
            }
            if key.invert {
                ord = ord.reverse();
            }
            return ord;
        }
    }
    Ordering::Equal
}
