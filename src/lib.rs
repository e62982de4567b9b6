//! A headless data-grid engine.
//!
//! `rowscope` bundles two crates:
//!
//! - [`table`]: records, columns and typed state in; memoized row models out (filtering,
//!   grouping, sorting, expansion, pagination, faceting, selection, pinning, sizing).
//! - [`virtualizer`]: which rows of a long list must be materialized for a given viewport.
//!
//! The helpers here wire the two together: a virtualizer keyed by [`RowId`], so measured row
//! heights follow rows through sorting, filtering and grouping.
//!
//! ```
//! use std::sync::Arc;
//!
//! use rowscope::table::{ColumnDef, Table, TableOptions};
//! use rowscope::virtualizer::Virtualizer;
//!
//! let data: Vec<Arc<u32>> = (0..1_000).map(Arc::new).collect();
//! let columns = vec![ColumnDef::accessor("n", |n: &u32| *n)];
//! let table = Table::new(TableOptions::new(data, columns)).unwrap();
//!
//! let rows = table.row_model().unwrap();
//! let mut v = Virtualizer::new(rowscope::row_virtualizer_options(&rows, |_| 20));
//! v.set_viewport_and_scroll(200, 0);
//! assert_eq!(rowscope::materialized_rows(&v, &rows).len(), 11);
//! ```
#![forbid(unsafe_code)]

use std::rc::Rc;
use std::sync::Arc;

pub use rowscope_table as table;
pub use rowscope_virtualizer as virtualizer;

pub use rowscope_table::{Row, RowId, RowModel, Table, TableOptions, TableState};
pub use rowscope_virtualizer::{VirtualItem, Virtualizer, VirtualizerOptions};


/// The ids of a model's top-level rows, in display order.
pub fn row_keys<T>(model: &RowModel<T>) -> Arc<[RowId]> {
    model.rows.iter().map(|row| Arc::clone(&row.id)).collect()
}

/// Virtualizer options sized to `model`, keyed by row id.
pub fn row_virtualizer_options<T>(
    model: &RowModel<T>,
    estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
) -> VirtualizerOptions<RowId> {
    let keys = row_keys(model);
    VirtualizerOptions::new_with_key(keys.len(), estimate_size, key_fn(keys))
}

/// Points an existing virtualizer at a new row model.
///
/// Count and keys change together, so cached measurements are re-read by row id in one pass.
pub fn sync_rows<T>(virtualizer: &mut Virtualizer<RowId>, model: &RowModel<T>) {
    let keys = row_keys(model);
    virtualizer.update_options(|options| {
        options.count = keys.len();
        options.get_item_key = Arc::new(key_fn(keys));
    });
}

/// The rows the virtualizer wants on screen (overscan included), with their placement.
pub fn materialized_rows<T>(
    virtualizer: &Virtualizer<RowId>,
    model: &RowModel<T>,
) -> Vec<(VirtualItem, Rc<Row<T>>)> {
    let mut out = Vec::new();
    virtualizer.for_each_virtual_item(|item| {
        if let Some(row) = model.rows.get(item.index) {
            out.push((item, Rc::clone(row)));
        }
    });
    out
}

fn key_fn(keys: Arc<[RowId]>) -> impl Fn(usize) -> RowId + Send + Sync + 'static {
    move |index| keys.get(index).cloned().unwrap_or_default()
}
