//! Column definitions and the resolved column tree.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::AccessorError;
use crate::fns::{AggregationFn, FilterFn, SortingFn};
use crate::{ColumnId, Result, TableError, Value};

/// Reads a cell value from a record.
pub type AccessorFn<T> = Arc<dyn Fn(&T) -> core::result::Result<Value, AccessorError> + Send + Sync>;

pub const DEFAULT_COLUMN_SIZE: u32 = 150;
pub const DEFAULT_MIN_COLUMN_SIZE: u32 = 20;
pub const DEFAULT_MAX_COLUMN_SIZE: u32 = u32::MAX;

/// Where rows with an `Undefined` value go when sorting by a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortUndefined {
    /// Always first, whatever the direction.
    First,
    /// Always last, whatever the direction.
    Last,
    /// `Undefined` compares as `n` relative to a defined value (sign only), and flips with the
    /// direction like any other comparison.
    Offset(i32),
    /// `Undefined` goes through the column's comparator.
    Disabled,
}

impl Default for SortUndefined {
    fn default() -> Self {
        Self::Offset(1)
    }
}

/// A column definition. Leaf columns carry an accessor (or none, for display-only columns);
/// group columns carry child definitions.
pub struct ColumnDef<T> {
    pub id: ColumnId,
    pub header: Option<String>,
    pub accessor: Option<AccessorFn<T>>,
    pub columns: Vec<ColumnDef<T>>,

    pub filter_fn: FilterFn,
    pub sorting_fn: SortingFn,
    pub aggregation_fn: AggregationFn,

    pub sort_undefined: SortUndefined,
    pub invert_sorting: bool,
    /// First sort direction when toggled; `None` defers to the table, then to the data.
    pub sort_desc_first: Option<bool>,

    pub enable_column_filter: bool,
    pub enable_global_filter: bool,
    pub enable_sorting: bool,
    /// `None` defers to the table option.
    pub enable_multi_sort: Option<bool>,
    pub enable_grouping: bool,
    pub enable_hiding: bool,
    pub enable_pinning: bool,
    pub enable_resizing: bool,

    pub size: u32,
    pub min_size: u32,
    pub max_size: u32,
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            columns: self.columns.clone(),
            filter_fn: self.filter_fn.clone(),
            sorting_fn: self.sorting_fn.clone(),
            aggregation_fn: self.aggregation_fn.clone(),
            sort_undefined: self.sort_undefined,
            invert_sorting: self.invert_sorting,
            sort_desc_first: self.sort_desc_first,
            enable_column_filter: self.enable_column_filter,
            enable_global_filter: self.enable_global_filter,
            enable_sorting: self.enable_sorting,
            enable_multi_sort: self.enable_multi_sort,
            enable_grouping: self.enable_grouping,
            enable_hiding: self.enable_hiding,
            enable_pinning: self.enable_pinning,
            enable_resizing: self.enable_resizing,
            size: self.size,
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("accessor", &self.accessor.is_some())
            .field("columns", &self.columns)
            .field("filter_fn", &self.filter_fn)
            .field("sorting_fn", &self.sorting_fn)
            .field("aggregation_fn", &self.aggregation_fn)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<T> ColumnDef<T> {
    fn blank(id: impl Into<ColumnId>, accessor: Option<AccessorFn<T>>) -> Self {
        Self {
            id: id.into(),
            header: None,
            accessor,
            columns: Vec::new(),
            filter_fn: FilterFn::Auto,
            sorting_fn: SortingFn::Auto,
            aggregation_fn: AggregationFn::Auto,
            sort_undefined: SortUndefined::default(),
            invert_sorting: false,
            sort_desc_first: None,
            enable_column_filter: true,
            enable_global_filter: true,
            enable_sorting: true,
            enable_multi_sort: None,
            enable_grouping: true,
            enable_hiding: true,
            enable_pinning: true,
            enable_resizing: true,
            size: DEFAULT_COLUMN_SIZE,
            min_size: DEFAULT_MIN_COLUMN_SIZE,
            max_size: DEFAULT_MAX_COLUMN_SIZE,
        }
    }

    /// A column without an accessor. Its cells read as `Undefined`; it cannot be filtered,
    /// sorted or grouped.
    pub fn display(id: impl Into<ColumnId>) -> Self {
        Self::blank(id, None)
    }

    /// A header-only column grouping `columns`.
    pub fn group(id: impl Into<ColumnId>, columns: Vec<ColumnDef<T>>) -> Self {
        let mut def = Self::blank(id, None);
        def.columns = columns;
        def
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_filter_fn(mut self, filter_fn: impl Into<FilterFn>) -> Self {
        self.filter_fn = filter_fn.into();
        self
    }

    pub fn with_sorting_fn(mut self, sorting_fn: impl Into<SortingFn>) -> Self {
        self.sorting_fn = sorting_fn.into();
        self
    }

    pub fn with_aggregation_fn(mut self, aggregation_fn: impl Into<AggregationFn>) -> Self {
        self.aggregation_fn = aggregation_fn.into();
        self
    }

    pub fn with_sort_undefined(mut self, sort_undefined: SortUndefined) -> Self {
        self.sort_undefined = sort_undefined;
        self
    }

    pub fn with_invert_sorting(mut self, invert: bool) -> Self {
        self.invert_sorting = invert;
        self
    }

    pub fn with_sort_desc_first(mut self, desc_first: bool) -> Self {
        self.sort_desc_first = Some(desc_first);
        self
    }

    pub fn with_enable_column_filter(mut self, enabled: bool) -> Self {
        self.enable_column_filter = enabled;
        self
    }

    pub fn with_enable_global_filter(mut self, enabled: bool) -> Self {
        self.enable_global_filter = enabled;
        self
    }

    pub fn with_enable_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    pub fn with_enable_multi_sort(mut self, enabled: bool) -> Self {
        self.enable_multi_sort = Some(enabled);
        self
    }

    pub fn with_enable_grouping(mut self, enabled: bool) -> Self {
        self.enable_grouping = enabled;
        self
    }

    pub fn with_enable_hiding(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    pub fn with_enable_pinning(mut self, enabled: bool) -> Self {
        self.enable_pinning = enabled;
        self
    }

    pub fn with_enable_resizing(mut self, enabled: bool) -> Self {
        self.enable_resizing = enabled;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_size_range(mut self, min_size: u32, max_size: u32) -> Self {
        self.min_size = min_size;
        self.max_size = max_size.max(min_size);
        self
    }
}

impl<T: 'static> ColumnDef<T> {
    /// A leaf column reading its value with `accessor`.
    pub fn accessor<V, F>(id: impl Into<ColumnId>, accessor: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let accessor: AccessorFn<T> =
            Arc::new(move |record: &T| Ok::<Value, AccessorError>(accessor(record).into()));
        Self::blank(id, Some(accessor))
    }

    /// A leaf column whose accessor may fail. Failures read as `Undefined`.
    pub fn try_accessor<F>(id: impl Into<ColumnId>, accessor: F) -> Self
    where
        F: Fn(&T) -> core::result::Result<Value, AccessorError> + Send + Sync + 'static,
    {
        Self::blank(id, Some(Arc::new(accessor)))
    }
}

#[cfg(feature = "json")]
impl ColumnDef<serde_json::Value> {
    /// A leaf column reading a dotted path (`"address.city"`, `"tags.0"`) from JSON records.
    ///
    /// The column id is the path with `.` replaced by `_`.
    pub fn accessor_key(path: &str) -> Self {
        let id = path.replace('.', "_");
        let path = path.to_string();
        Self::try_accessor(id, move |record: &serde_json::Value| {
            let mut current = record;
            for segment in path.split('.') {
                let next = match current {
                    serde_json::Value::Array(items) => {
                        segment.parse::<usize>().ok().and_then(|i| items.get(i))
                    }
                    other => other.get(segment),
                };
                current = next.ok_or_else(|| AccessorError::missing_key(path.as_str()))?;
            }
            Ok(Value::from(current))
        })
    }
}

/// A column of a table: a definition plus its place in the column tree.
pub struct Column<T> {
    def: Arc<ColumnDef<T>>,
    depth: usize,
    parent_id: Option<ColumnId>,
    leaf_ids: Vec<ColumnId>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            def: Arc::clone(&self.def),
            depth: self.depth,
            parent_id: self.parent_id.clone(),
            leaf_ids: self.leaf_ids.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.def.id)
            .field("depth", &self.depth)
            .field("parent_id", &self.parent_id)
            .field("leaf_ids", &self.leaf_ids)
            .finish()
    }
}

impl<T> Column<T> {
    pub fn id(&self) -> &ColumnId {
        &self.def.id
    }

    /// The header text, falling back to the id.
    pub fn header(&self) -> &str {
        self.def.header.as_deref().unwrap_or(&self.def.id)
    }

    pub fn def(&self) -> &ColumnDef<T> {
        &self.def
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent_id(&self) -> Option<&ColumnId> {
        self.parent_id.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.def.columns.is_empty()
    }

    /// Ids of the leaf columns under this column (itself, for a leaf).
    pub fn leaf_ids(&self) -> &[ColumnId] {
        &self.leaf_ids
    }

    pub fn has_accessor(&self) -> bool {
        self.def.accessor.is_some()
    }

    /// Runs the accessor. Failures and missing accessors read as `Undefined`.
    pub(crate) fn read(&self, row_id: &str, record: &T) -> Value {
        match self.try_read(record) {
            Ok(value) => value,
            Err(err) => {
                twarn!(column = %self.def.id, row = row_id, error = %err, "accessor failed");
                #[cfg(not(feature = "tracing"))]
                let _ = (row_id, err);
                Value::Undefined
            }
        }
    }

    /// Like [`Column::read`], but reports why an accessor produced no value. A column without an
    /// accessor reads as `Ok(Undefined)`.
    pub(crate) fn try_read(&self, record: &T) -> core::result::Result<Value, AccessorError> {
        let Some(accessor) = &self.def.accessor else {
            return Ok(Value::Undefined);
        };
        match accessor(record)? {
            Value::Undefined => Err(AccessorError::UndefinedValue),
            value => Ok(value),
        }
    }
}

/// The flattened column tree.
pub(crate) struct ColumnSet<T> {
    /// Every column, pre-order.
    pub(crate) all: Vec<Column<T>>,
    /// Leaf columns in definition order.
    pub(crate) leaves: Vec<Column<T>>,
}

impl<T> ColumnSet<T> {
    pub(crate) fn build(defs: &[ColumnDef<T>]) -> Result<Self> {
        let mut set = Self {
            all: Vec::new(),
            leaves: Vec::new(),
        };
        let mut seen = HashSet::new();
        set.visit(defs, 0, None, &mut seen)?;
        Ok(set)
    }

    fn visit(
        &mut self,
        defs: &[ColumnDef<T>],
        depth: usize,
        parent_id: Option<&ColumnId>,
        seen: &mut HashSet<ColumnId>,
    ) -> Result<Vec<ColumnId>> {
        let mut leaf_ids = Vec::new();
        for def in defs {
            if def.id.is_empty() {
                return Err(TableError::MissingColumnId);
            }
            if !seen.insert(Arc::clone(&def.id)) {
                return Err(TableError::duplicate_column_id(Arc::clone(&def.id)));
            }
            let slot = self.all.len();
            let column = Column {
                def: Arc::new(def.clone()),
                depth,
                parent_id: parent_id.cloned(),
                leaf_ids: Vec::new(),
            };
            self.all.push(column);

            let ids = if def.columns.is_empty() {
                vec![Arc::clone(&def.id)]
            } else {
                self.visit(&def.columns, depth + 1, Some(&def.id), seen)?
            };
            self.all[slot].leaf_ids = ids.clone();
            if def.columns.is_empty() {
                self.leaves.push(self.all[slot].clone());
            }
            leaf_ids.extend(ids);
        }
        Ok(leaf_ids)
    }
}
