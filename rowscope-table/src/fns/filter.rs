use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::Value;

/// Outcome of one filter evaluation. `meta` is kept per row and column for callers (for example
/// a fuzzy-match rank) and is `Undefined` for the built-ins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterResult {
    pub pass: bool,
    pub meta: Value,
}

impl FilterResult {
    pub fn with_meta(pass: bool, meta: impl Into<Value>) -> Self {
        Self {
            pass,
            meta: meta.into(),
        }
    }
}

impl From<bool> for FilterResult {
    fn from(pass: bool) -> Self {
        Self {
            pass,
            meta: Value::Undefined,
        }
    }
}

type FilterPredicate = Arc<dyn Fn(&Value, &Value) -> FilterResult + Send + Sync>;
type FilterValueResolver = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
type FilterValueCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A caller-supplied filter: `filter(row_value, filter_value)`, plus the optional hooks the
/// built-ins carry.
#[derive(Clone)]
pub struct CustomFilterFn {
    filter: FilterPredicate,
    resolve_filter_value: Option<FilterValueResolver>,
    auto_remove: Option<FilterValueCheck>,
}

impl CustomFilterFn {
    pub fn new<R: Into<FilterResult>>(
        filter: impl Fn(&Value, &Value) -> R + Send + Sync + 'static,
    ) -> Self {
        Self {
            filter: Arc::new(move |row, value| filter(row, value).into()),
            resolve_filter_value: None,
            auto_remove: None,
        }
    }

    /// Transforms the filter value once per evaluation pass, before any row is tested.
    pub fn with_resolve_filter_value(
        mut self,
        resolve: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.resolve_filter_value = Some(Arc::new(resolve));
        self
    }

    /// Filters whose value this returns `true` for are dropped from state when set.
    pub fn with_auto_remove(mut self, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.auto_remove = Some(Arc::new(check));
        self
    }
}

impl fmt::Debug for CustomFilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilterFn")
            .field("resolve_filter_value", &self.resolve_filter_value.is_some())
            .field("auto_remove", &self.auto_remove.is_some())
            .finish_non_exhaustive()
    }
}

/// Built-in filter predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinFilter {
    /// Case-insensitive substring match on the stringified value.
    IncludesString,
    IncludesStringSensitive,
    /// Case-insensitive whole-string equality.
    EqualsString,
    /// The row's list contains the filter value (or the row's text contains the filter text).
    ArrIncludes,
    ArrIncludesAll,
    ArrIncludesSome,
    Equals,
    /// [`Value::loose_eq`].
    WeakEquals,
    /// Filter value `[min, max]`; either bound may be blank for an open range.
    InNumberRange,
}

impl BuiltinFilter {
    pub const ALL: [BuiltinFilter; 9] = [
        Self::IncludesString,
        Self::IncludesStringSensitive,
        Self::EqualsString,
        Self::ArrIncludes,
        Self::ArrIncludesAll,
        Self::ArrIncludesSome,
        Self::Equals,
        Self::WeakEquals,
        Self::InNumberRange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::IncludesString => "includesString",
            Self::IncludesStringSensitive => "includesStringSensitive",
            Self::EqualsString => "equalsString",
            Self::ArrIncludes => "arrIncludes",
            Self::ArrIncludesAll => "arrIncludesAll",
            Self::ArrIncludesSome => "arrIncludesSome",
            Self::Equals => "equals",
            Self::WeakEquals => "weakEquals",
            Self::InNumberRange => "inNumberRange",
        }
    }

    /// The filter chosen for a column whose first core value is `sample`.
    pub fn auto_for(sample: &Value) -> Self {
        match sample {
            Value::Text(_) => Self::IncludesString,
            Value::Number(_) => Self::InNumberRange,
            Value::Bool(_) | Value::Date(_) => Self::Equals,
            Value::List(_) => Self::ArrIncludes,
            Value::Undefined | Value::Null => Self::WeakEquals,
        }
    }

    pub fn filter(self, row_value: &Value, filter_value: &Value) -> bool {
        match self {
            Self::IncludesString => match (row_value.search_text(), filter_value.search_text()) {
                (Some(row), Some(search)) => row.to_lowercase().contains(&search.to_lowercase()),
                _ => false,
            },
            Self::IncludesStringSensitive => {
                match (row_value.search_text(), filter_value.search_text()) {
                    (Some(row), Some(search)) => row.contains(&search),
                    _ => false,
                }
            }
            Self::EqualsString => match (row_value.search_text(), filter_value.search_text()) {
                (Some(row), Some(search)) => row.to_lowercase() == search.to_lowercase(),
                _ => false,
            },
            Self::ArrIncludes => includes(row_value, filter_value),
            Self::ArrIncludesAll => filter_items(filter_value)
                .iter()
                .all(|item| includes(row_value, item)),
            Self::ArrIncludesSome => filter_items(filter_value)
                .iter()
                .any(|item| includes(row_value, item)),
            Self::Equals => row_value == filter_value,
            Self::WeakEquals => row_value.loose_eq(filter_value),
            Self::InNumberRange => {
                let (min, max) = number_range(filter_value);
                match row_value {
                    Value::Undefined => false,
                    v => v.to_number().is_some_and(|n| n >= min && n <= max),
                }
            }
        }
    }

    pub fn resolve_filter_value(self, value: &Value) -> Value {
        match self {
            Self::IncludesString => match value.search_text() {
                Some(s) => Value::text(s.to_lowercase()),
                None => value.clone(),
            },
            Self::InNumberRange => {
                let (min, max) = resolve_number_range(value);
                Value::list([Value::Number(min), Value::Number(max)])
            }
            _ => value.clone(),
        }
    }

    pub fn auto_remove(self, value: &Value) -> bool {
        match self {
            Self::ArrIncludes | Self::ArrIncludesAll | Self::ArrIncludesSome => {
                value.is_blank() || value.as_list().is_some_and(<[Value]>::is_empty)
            }
            Self::InNumberRange => match value.as_list() {
                Some(bounds) => {
                    let lo = bounds.first().unwrap_or(&Value::Undefined);
                    let hi = bounds.get(1).unwrap_or(&Value::Undefined);
                    lo.is_blank() && hi.is_blank()
                }
                None => value.is_blank(),
            },
            _ => value.is_blank(),
        }
    }
}

impl fmt::Display for BuiltinFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|f| f.name() == s).ok_or(())
    }
}

fn includes(row_value: &Value, item: &Value) -> bool {
    match (row_value, item) {
        (Value::List(items), _) => items.iter().any(|v| v == item),
        (Value::Text(text), Value::Text(search)) => text.contains(&**search),
        _ => false,
    }
}

fn filter_items(filter_value: &Value) -> Vec<Value> {
    match filter_value {
        Value::List(items) => items.to_vec(),
        v if v.is_nullish() => Vec::new(),
        v => vec![v.clone()],
    }
}

fn parse_bound(v: &Value) -> f64 {
    match v {
        Value::Number(n) => *n,
        Value::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => f64::NAN,
    }
}

/// `[a, b]` → `(min, max)` with blank or non-numeric bounds open.
fn resolve_number_range(value: &Value) -> (f64, f64) {
    let (a, b) = match value.as_list() {
        Some(bounds) => (
            bounds.first().cloned().unwrap_or_default(),
            bounds.get(1).cloned().unwrap_or_default(),
        ),
        None => (Value::Undefined, Value::Undefined),
    };
    let min = parse_bound(&a);
    let max = parse_bound(&b);
    let min = if min.is_nan() { f64::NEG_INFINITY } else { min };
    let max = if max.is_nan() { f64::INFINITY } else { max };
    if min > max { (max, min) } else { (min, max) }
}

fn number_range(resolved: &Value) -> (f64, f64) {
    match resolved.as_list() {
        Some([Value::Number(min), Value::Number(max)]) => (*min, *max),
        _ => resolve_number_range(resolved),
    }
}

/// A filter after `Auto` and `Named` resolution.
#[derive(Clone, Debug)]
pub(crate) enum ResolvedFilter {
    Builtin(BuiltinFilter),
    Custom(Arc<CustomFilterFn>),
}

impl ResolvedFilter {
    pub(crate) fn filter(&self, row_value: &Value, filter_value: &Value) -> FilterResult {
        match self {
            Self::Builtin(f) => f.filter(row_value, filter_value).into(),
            Self::Custom(f) => (f.filter)(row_value, filter_value),
        }
    }

    pub(crate) fn resolve_filter_value(&self, value: &Value) -> Value {
        match self {
            Self::Builtin(f) => f.resolve_filter_value(value),
            Self::Custom(f) => match &f.resolve_filter_value {
                Some(resolve) => resolve(value),
                None => value.clone(),
            },
        }
    }

    /// `Undefined` and the empty string are always removed; the strategy may remove more.
    pub(crate) fn should_auto_remove(&self, value: &Value) -> bool {
        if value.is_undefined() || value.as_str().is_some_and(str::is_empty) {
            return true;
        }
        match self {
            Self::Builtin(f) => f.auto_remove(value),
            Self::Custom(f) => f.auto_remove.as_ref().is_some_and(|check| check(value)),
        }
    }
}
