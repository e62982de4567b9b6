//! Per-feature `Table` APIs layered over the state setters and the row-model pipeline.

mod columns;
mod expanding;
mod faceting;
mod filtering;
mod grouping;
mod pagination;
mod pinning;
mod selection;
mod sorting;

pub use sorting::SortDirection;
