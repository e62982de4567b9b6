//! A headless table engine: typed state in, memoized row models out.
//!
//! A [`Table`] owns the records, the column definitions and a [`TableState`]. Row models are
//! derived on read through a fixed pipeline:
//!
//! core → filtered → grouped → sorted → expanded → paginated
//!
//! Each stage is a [`Memo`] keyed on the upstream model and the state slices it reads. State
//! setters take an updater closure and keep the previous `Arc` when the result is equal, so
//! reading the row model after a no-op update costs a handful of pointer comparisons.
//!
//! Nothing here renders. Callers turn user intents (sort toggles, filter values, expansion,
//! page changes) into state updates and read back `Rc<RowModel<T>>`.
//!
//! ```
//! use rowscope_table::{ColumnDef, Table, TableOptions, Value};
//!
//! struct Person {
//!     name: &'static str,
//!     age: u32,
//! }
//!
//! let data = vec![
//!     std::sync::Arc::new(Person { name: "Ada", age: 36 }),
//!     std::sync::Arc::new(Person { name: "Grace", age: 45 }),
//! ];
//! let columns = vec![
//!     ColumnDef::accessor("name", |p: &Person| p.name),
//!     ColumnDef::accessor("age", |p: &Person| p.age),
//! ];
//! let mut table = Table::new(TableOptions::new(data, columns)).unwrap();
//! table.toggle_sorting("age", Some(true), false).unwrap();
//!
//! let rows = table.row_model().unwrap();
//! assert_eq!(table.row_value(&rows.rows[0], "name").unwrap(), Value::from("Grace"));
//! ```
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod cell;
mod column;
mod error;
mod features;
mod fns;
mod memo;
mod options;
mod pipeline;
mod row;
mod state;
mod table;
mod value;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use cell::Cell;
pub(crate) use column::ColumnSet;
pub use column::{
    AccessorFn, Column, ColumnDef, DEFAULT_COLUMN_SIZE, DEFAULT_MAX_COLUMN_SIZE,
    DEFAULT_MIN_COLUMN_SIZE, SortUndefined,
};
pub use error::{AccessorError, TableError};
pub use features::SortDirection;
pub use fns::{
    AggregateFn, AggregationFn, AggregationFnRegistry, BuiltinAggregation, BuiltinFilter,
    BuiltinSort, CustomFilterFn, FilterFn, FilterFnRegistry, FilterResult, SortCompareFn,
    SortingFn, SortingFnRegistry, compare_alphanumeric,
};
pub use memo::{Deps, Memo, memo};
pub use options::{
    GetRowIdFn, GetSubRowsFn, GroupedColumnMode, OnStateChangeCallback, TableOptions,
};
pub use pipeline::{GLOBAL_FILTER_ID, RowFilterState};
pub use row::{GroupInfo, Row, RowModel};
pub use state::{
    ColumnFilter, ColumnPinPosition, ColumnPinningState, ColumnSort, ExpandedState,
    PaginationState, RowPinPosition, RowPinningState, TableState,
};
pub use table::Table;
pub use value::Value;

/// Row identifier: a path like `"3.1"` by default, or whatever `get_row_id` returns.
pub type RowId = Arc<str>;

pub type ColumnId = Arc<str>;

pub type Result<T> = core::result::Result<T, TableError>;
