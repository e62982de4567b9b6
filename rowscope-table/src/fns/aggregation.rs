use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::Value;
use crate::value::cmp_f64;

/// A caller-supplied reducer over the leaf values of a group.
pub type AggregateFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Built-in reducers. All of them run over the values of a group's leaf rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinAggregation {
    /// Sum of numeric values; non-numbers count as zero.
    Sum,
    Min,
    Max,
    /// `[min, max]`.
    Extent,
    Mean,
    /// Median of an all-numeric group, otherwise `Undefined`.
    Median,
    /// Distinct values in first-seen order.
    Unique,
    UniqueCount,
    /// Number of leaf rows.
    Count,
}

impl BuiltinAggregation {
    pub const ALL: [BuiltinAggregation; 9] = [
        Self::Sum,
        Self::Min,
        Self::Max,
        Self::Extent,
        Self::Mean,
        Self::Median,
        Self::Unique,
        Self::UniqueCount,
        Self::Count,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Extent => "extent",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Unique => "unique",
            Self::UniqueCount => "uniqueCount",
            Self::Count => "count",
        }
    }

    /// `Sum` for numbers, `Extent` for dates, nothing otherwise.
    pub fn auto_for(sample: &Value) -> Option<Self> {
        match sample {
            Value::Number(_) => Some(Self::Sum),
            Value::Date(_) => Some(Self::Extent),
            _ => None,
        }
    }

    pub fn aggregate(self, values: &[Value]) -> Value {
        match self {
            Self::Sum => Value::Number(values.iter().filter_map(Value::as_number).sum()),
            Self::Min => extent(values).map_or(Value::Undefined, |(min, _)| min.clone()),
            Self::Max => extent(values).map_or(Value::Undefined, |(_, max)| max.clone()),
            Self::Extent => extent(values).map_or(Value::Undefined, |(min, max)| {
                Value::list([min.clone(), max.clone()])
            }),
            Self::Mean => {
                let nums: Vec<f64> = values
                    .iter()
                    .filter(|v| !v.is_nullish())
                    .filter_map(Value::to_number)
                    .filter(|n| !n.is_nan())
                    .collect();
                if nums.is_empty() {
                    Value::Undefined
                } else {
                    Value::Number(nums.iter().sum::<f64>() / nums.len() as f64)
                }
            }
            Self::Median => {
                let Some(mut nums) = values.iter().map(Value::as_number).collect::<Option<Vec<f64>>>()
                else {
                    return Value::Undefined;
                };
                if nums.is_empty() {
                    return Value::Undefined;
                }
                nums.sort_by(|a, b| cmp_f64(*a, *b));
                let mid = nums.len() / 2;
                if nums.len() % 2 == 1 {
                    Value::Number(nums[mid])
                } else {
                    Value::Number((nums[mid - 1] + nums[mid]) / 2.0)
                }
            }
            Self::Unique => Value::list(unique(values)),
            Self::UniqueCount => Value::from(unique(values).len()),
            Self::Count => Value::from(values.len()),
        }
    }
}

impl fmt::Display for BuiltinAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinAggregation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|f| f.name() == s).ok_or(())
    }
}

/// Smallest and largest non-nullish, non-NaN values.
fn extent(values: &[Value]) -> Option<(&Value, &Value)> {
    let mut iter = values
        .iter()
        .filter(|v| !v.is_nullish() && !v.as_number().is_some_and(f64::is_nan));
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), v| {
        (
            if v.cmp_basic(min).is_lt() { v } else { min },
            if v.cmp_basic(max).is_gt() { v } else { max },
        )
    }))
}

fn unique(values: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}

#[derive(Clone)]
pub(crate) enum ResolvedAggregation {
    Builtin(BuiltinAggregation),
    Custom(AggregateFn),
}

impl ResolvedAggregation {
    pub(crate) fn aggregate(&self, values: &[Value]) -> Value {
        match self {
            Self::Builtin(f) => f.aggregate(values),
            Self::Custom(f) => f(values),
        }
    }
}

impl fmt::Debug for ResolvedAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(a) => f.debug_tuple("Builtin").field(a).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
