//! The algorithm library: filter predicates, sort comparators and aggregation reducers.
//!
//! Each strategy slot on a column is one of `Auto` (picked from a data sample), a built-in,
//! `Named` (looked up in the table's registry, then among the built-ins) or `Custom`.

mod aggregation;
mod filter;
mod sort;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use aggregation::{AggregateFn, BuiltinAggregation};
pub use filter::{BuiltinFilter, CustomFilterFn, FilterResult};
pub use sort::{BuiltinSort, SortCompareFn, compare_alphanumeric};

pub(crate) use aggregation::ResolvedAggregation;
pub(crate) use filter::ResolvedFilter;
pub(crate) use sort::ResolvedSort;

use crate::{Result, TableError, Value};

pub type FilterFnRegistry = HashMap<String, Arc<CustomFilterFn>>;
pub type SortingFnRegistry = HashMap<String, SortCompareFn>;
pub type AggregationFnRegistry = HashMap<String, AggregateFn>;

#[derive(Clone, Default)]
pub enum FilterFn {
    #[default]
    Auto,
    Builtin(BuiltinFilter),
    Named(String),
    Custom(Arc<CustomFilterFn>),
}

impl FilterFn {
    pub fn custom<R: Into<FilterResult>>(
        f: impl Fn(&Value, &Value) -> R + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(Arc::new(CustomFilterFn::new(f)))
    }

    /// Resolves `Named`; `Auto` stays unresolved (`None`).
    pub(crate) fn resolve(&self, registry: &FilterFnRegistry) -> Result<Option<ResolvedFilter>> {
        Ok(match self {
            Self::Auto => None,
            Self::Builtin(f) => Some(ResolvedFilter::Builtin(*f)),
            Self::Custom(f) => Some(ResolvedFilter::Custom(Arc::clone(f))),
            Self::Named(name) => Some(match registry.get(name) {
                Some(f) => ResolvedFilter::Custom(Arc::clone(f)),
                None => ResolvedFilter::Builtin(
                    name.parse()
                        .map_err(|()| TableError::unknown_function("filter", name))?,
                ),
            }),
        })
    }
}

impl From<BuiltinFilter> for FilterFn {
    fn from(f: BuiltinFilter) -> Self {
        Self::Builtin(f)
    }
}

impl From<&str> for FilterFn {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<CustomFilterFn> for FilterFn {
    fn from(f: CustomFilterFn) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            Self::Named(n) => f.debug_tuple("Named").field(n).finish(),
            Self::Custom(c) => f.debug_tuple("Custom").field(c).finish(),
        }
    }
}

#[derive(Clone, Default)]
pub enum SortingFn {
    #[default]
    Auto,
    Builtin(BuiltinSort),
    Named(String),
    Custom(SortCompareFn),
}

impl SortingFn {
    pub fn custom(f: impl Fn(&Value, &Value) -> std::cmp::Ordering + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub(crate) fn resolve(&self, registry: &SortingFnRegistry) -> Result<Option<ResolvedSort>> {
        Ok(match self {
            Self::Auto => None,
            Self::Builtin(s) => Some(ResolvedSort::Builtin(*s)),
            Self::Custom(f) => Some(ResolvedSort::Custom(Arc::clone(f))),
            Self::Named(name) => Some(match registry.get(name) {
                Some(f) => ResolvedSort::Custom(Arc::clone(f)),
                None => ResolvedSort::Builtin(
                    name.parse()
                        .map_err(|()| TableError::unknown_function("sorting", name))?,
                ),
            }),
        })
    }
}

impl From<BuiltinSort> for SortingFn {
    fn from(s: BuiltinSort) -> Self {
        Self::Builtin(s)
    }
}

impl From<&str> for SortingFn {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl fmt::Debug for SortingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            Self::Named(n) => f.debug_tuple("Named").field(n).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub enum AggregationFn {
    #[default]
    Auto,
    /// Group rows show `Undefined` for this column.
    None,
    Builtin(BuiltinAggregation),
    Named(String),
    Custom(AggregateFn),
}

/// An aggregation slot after `Named` resolution.
#[derive(Clone, Debug)]
pub(crate) enum AggregationChoice {
    Auto,
    None,
    Resolved(ResolvedAggregation),
}

impl AggregationFn {
    pub fn custom(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub(crate) fn resolve(&self, registry: &AggregationFnRegistry) -> Result<AggregationChoice> {
        Ok(match self {
            Self::Auto => AggregationChoice::Auto,
            Self::None => AggregationChoice::None,
            Self::Builtin(a) => AggregationChoice::Resolved(ResolvedAggregation::Builtin(*a)),
            Self::Custom(f) => AggregationChoice::Resolved(ResolvedAggregation::Custom(Arc::clone(f))),
            Self::Named(name) => AggregationChoice::Resolved(match registry.get(name) {
                Some(f) => ResolvedAggregation::Custom(Arc::clone(f)),
                None => ResolvedAggregation::Builtin(
                    name.parse()
                        .map_err(|()| TableError::unknown_function("aggregation", name))?,
                ),
            }),
        })
    }
}

impl From<BuiltinAggregation> for AggregationFn {
    fn from(a: BuiltinAggregation) -> Self {
        Self::Builtin(a)
    }
}

impl From<&str> for AggregationFn {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl fmt::Debug for AggregationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::None => f.write_str("None"),
            Self::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            Self::Named(n) => f.debug_tuple("Named").field(n).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
