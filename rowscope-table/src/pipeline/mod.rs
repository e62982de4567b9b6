//! Row-model stages: core → filtered → grouped → sorted → expanded → paginated.
//!
//! Each stage is a function of the previous stage's model and the state slices it reads. The
//! [`crate::Table`] caches each stage behind a [`crate::Memo`] keyed on exactly those inputs.

pub(crate) mod core_rows;
pub(crate) mod expanded;
pub(crate) mod filtered;
pub(crate) mod grouped;
pub(crate) mod paginated;
pub(crate) mod sorted;

pub use filtered::{GLOBAL_FILTER_ID, RowFilterState};
