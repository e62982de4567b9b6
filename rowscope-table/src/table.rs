use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::sync::Arc;

use crate::fns::{AggregationChoice, ResolvedAggregation, ResolvedFilter, ResolvedSort};
use crate::pipeline::{self, filtered::FilterEvaluation};
use crate::state::{replace_slice, update_slice};
use crate::{
    BuiltinAggregation, BuiltinFilter, BuiltinSort, Column, ColumnFilter, ColumnId,
    ColumnPinningState, ColumnSet, ColumnSort, ExpandedState, Memo, PaginationState, Result, Row,
    RowId, RowModel, RowPinningState, TableError, TableOptions, TableState, Value,
};

/// How many filtered rows are sampled when picking a sort comparator automatically.
const AUTO_SORT_SAMPLE: usize = 10;

/// A follow-up state change queued by a setter and applied when the outermost batch ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    ResetPageIndex,
    ResetExpanded,
}

/// Per-column strategies after `Named` resolution. `None`/`Auto` are resolved on first use.
struct ColumnStrategies {
    filter: Option<ResolvedFilter>,
    sort: Option<ResolvedSort>,
    aggregation: AggregationChoice,
}

/// Everything derived from the column definitions when options are installed.
struct Resolved<T> {
    columns: ColumnSet<T>,
    column_index: HashMap<ColumnId, usize>,
    strategies: HashMap<ColumnId, ColumnStrategies>,
    global_filter_fn: ResolvedFilter,
}

impl<T> Resolved<T> {
    fn build(options: &TableOptions<T>) -> Result<Self> {
        let columns = ColumnSet::build(&options.columns)?;
        let mut column_index = HashMap::with_capacity(columns.all.len());
        let mut strategies = HashMap::with_capacity(columns.all.len());
        for (slot, column) in columns.all.iter().enumerate() {
            let def = column.def();
            column_index.insert(Arc::clone(column.id()), slot);
            strategies.insert(
                Arc::clone(column.id()),
                ColumnStrategies {
                    filter: def.filter_fn.resolve(&options.filter_fns)?,
                    sort: def.sorting_fn.resolve(&options.sorting_fns)?,
                    aggregation: def.aggregation_fn.resolve(&options.aggregation_fns)?,
                },
            );
        }
        let global_filter_fn = options
            .global_filter_fn
            .resolve(&options.filter_fns)?
            .unwrap_or(ResolvedFilter::Builtin(BuiltinFilter::IncludesString));
        Ok(Self {
            columns,
            column_index,
            strategies,
            global_filter_fn,
        })
    }
}

/// Which faceted row model a per-column facet is computed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum FacetScope {
    /// Every filter except the column's own.
    Column,
    /// Every column filter, no global filter.
    Global,
}

type ModelMemo<D, T> = RefCell<Memo<D, Rc<RowModel<T>>>>;
type Model<T> = Rc<RowModel<T>>;
type FilterEvalDeps<T> = (Model<T>, Arc<Vec<ColumnFilter>>, Arc<Value>);
type FilterEvalMemo<T> = RefCell<Memo<FilterEvalDeps<T>, Rc<FilterEvaluation>>>;
type FacetedMemos<T> = RefCell<HashMap<ColumnId, Memo<(Model<T>, Rc<FilterEvaluation>), Model<T>>>>;
type FacetMemos<T, R> = RefCell<HashMap<(FacetScope, ColumnId), Memo<(Model<T>,), R>>>;
type CellValues = RefCell<HashMap<(RowId, ColumnId), Value>>;

pub(crate) struct Caches<T> {
    core: ModelMemo<(Arc<[Arc<T>]>,), T>,
    filter_eval: FilterEvalMemo<T>,
    filtered: ModelMemo<(Model<T>, Rc<FilterEvaluation>), T>,
    grouped: ModelMemo<(Model<T>, Arc<Vec<ColumnId>>), T>,
    sorted: ModelMemo<(Model<T>, Arc<Vec<ColumnSort>>), T>,
    expanded: ModelMemo<(Model<T>, Arc<ExpandedState>), T>,
    paginated: ModelMemo<(Model<T>, Arc<PaginationState>, Arc<ExpandedState>), T>,
    pub(crate) selected: ModelMemo<(Model<T>, Arc<BTreeSet<RowId>>), T>,
    pub(crate) filtered_selected: ModelMemo<(Model<T>, Arc<BTreeSet<RowId>>), T>,
    pub(crate) faceted: FacetedMemos<T>,
    pub(crate) global_faceted: ModelMemo<(Model<T>, Rc<FilterEvaluation>), T>,
    pub(crate) unique_values: FacetMemos<T, Rc<Vec<(Value, usize)>>>,
    pub(crate) min_max: FacetMemos<T, Option<(f64, f64)>>,
    /// Accessor results per `(row id, column id)` for the current core model.
    values: CellValues,
    /// Aggregated group-row values for the current grouped model.
    aggregates: CellValues,
    auto_filter: RefCell<HashMap<ColumnId, ResolvedFilter>>,
    auto_aggregation: RefCell<HashMap<ColumnId, Option<ResolvedAggregation>>>,
    auto_sort: RefCell<HashMap<ColumnId, ResolvedSort>>,
}

impl<T> Caches<T> {
    fn new() -> Self {
        Self {
            core: RefCell::new(Memo::new("core_row_model")),
            filter_eval: RefCell::new(Memo::new("filter_evaluation")),
            filtered: RefCell::new(Memo::new("filtered_row_model")),
            grouped: RefCell::new(Memo::new("grouped_row_model")),
            sorted: RefCell::new(Memo::new("sorted_row_model")),
            expanded: RefCell::new(Memo::new("expanded_row_model")),
            paginated: RefCell::new(Memo::new("paginated_row_model")),
            selected: RefCell::new(Memo::new("selected_row_model")),
            filtered_selected: RefCell::new(Memo::new("filtered_selected_row_model")),
            faceted: RefCell::default(),
            global_faceted: RefCell::new(Memo::new("global_faceted_row_model")),
            unique_values: RefCell::default(),
            min_max: RefCell::default(),
            values: RefCell::default(),
            aggregates: RefCell::default(),
            auto_filter: RefCell::default(),
            auto_aggregation: RefCell::default(),
            auto_sort: RefCell::default(),
        }
    }
}

/// A headless table: options, state, and a memoized row-model pipeline.
///
/// Row models are computed lazily on read and cached per stage. A stage recomputes only when the
/// upstream model or the state slice it reads has changed; otherwise the previous `Rc` is
/// returned, so callers can compare models with `Rc::ptr_eq`.
pub struct Table<T> {
    options: TableOptions<T>,
    state: TableState,
    columns: ColumnSet<T>,
    column_index: HashMap<ColumnId, usize>,
    strategies: HashMap<ColumnId, ColumnStrategies>,
    global_filter_fn: ResolvedFilter,
    pub(crate) caches: Caches<T>,
    update_depth: usize,
    state_changed: bool,
    pending_effects: Vec<Effect>,
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T> Table<T> {
    /// Creates a table. The state starts as `options.initial_state`.
    ///
    /// Fails when column ids repeat or a named strategy is not registered.
    pub fn new(options: TableOptions<T>) -> Result<Self> {
        let resolved = Resolved::build(&options)?;
        tdebug!(
            columns = resolved.columns.all.len(),
            rows = options.data.len(),
            "table created"
        );
        Ok(Self {
            state: options.initial_state.clone(),
            columns: resolved.columns,
            column_index: resolved.column_index,
            strategies: resolved.strategies,
            global_filter_fn: resolved.global_filter_fn,
            caches: Caches::new(),
            options,
            update_depth: 0,
            state_changed: false,
            pending_effects: Vec::new(),
        })
    }

    pub fn options(&self) -> &TableOptions<T> {
        &self.options
    }

    /// Replaces the options. Every cache is dropped; the current state is kept.
    pub fn set_options(&mut self, options: TableOptions<T>) -> Result<()> {
        let resolved = Resolved::build(&options)?;
        self.columns = resolved.columns;
        self.column_index = resolved.column_index;
        self.strategies = resolved.strategies;
        self.global_filter_fn = resolved.global_filter_fn;
        self.options = options;
        self.caches = Caches::new();
        Ok(())
    }

    /// Clones the options, applies `f`, then installs them with [`Table::set_options`].
    pub fn update_options(&mut self, f: impl FnOnce(&mut TableOptions<T>)) -> Result<()> {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next)
    }

    pub fn data(&self) -> &Arc<[Arc<T>]> {
        &self.options.data
    }

    /// Swaps the data. Resets the page index and expansion when auto-reset is on.
    pub fn set_data(&mut self, data: impl Into<Arc<[Arc<T>]>>) {
        let data = data.into();
        if Arc::ptr_eq(&data, &self.options.data) {
            return;
        }
        self.options.data = data;
        self.caches.auto_filter.get_mut().clear();
        self.caches.auto_aggregation.get_mut().clear();
        self.batch_update(|t| {
            t.queue_effect(Effect::ResetPageIndex);
            t.queue_effect(Effect::ResetExpanded);
        });
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Replaces the whole state. Unchanged slices keep their `Arc`, so their caches stay warm.
    ///
    /// No auto-reset effects are queued.
    pub fn set_state(&mut self, updater: impl FnOnce(&TableState) -> TableState) {
        let next = updater(&self.state);
        self.batch_update(|t| {
            if t.state.assign(&next) {
                t.state_changed = true;
            }
        });
    }

    /// Restores `options.initial_state`.
    pub fn reset_state(&mut self) {
        let initial = self.options.initial_state.clone();
        self.set_state(|_| initial);
    }

    /// Runs `f` with state-change notification deferred.
    ///
    /// Queued effects are applied and `on_state_change` fires at most once, when the outermost
    /// batch returns.
    pub fn batch_update<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.update_depth = self.update_depth.saturating_add(1);
        let result = f(self);
        debug_assert!(self.update_depth > 0, "update_depth underflow");
        self.update_depth = self.update_depth.saturating_sub(1);
        if self.update_depth == 0 {
            self.flush_effects();
        }
        result
    }

    fn flush_effects(&mut self) {
        for effect in mem::take(&mut self.pending_effects) {
            let changed = match effect {
                Effect::ResetPageIndex => {
                    let page_index = self.options.initial_state.pagination.page_index;
                    update_slice(&mut self.state.pagination, |p| PaginationState {
                        page_index,
                        ..*p
                    })
                }
                Effect::ResetExpanded => {
                    replace_slice(&mut self.state.expanded, &self.options.initial_state.expanded)
                }
            };
            ttrace!(?effect, changed, "effect applied");
            self.state_changed |= changed;
        }
        if mem::take(&mut self.state_changed) {
            if let Some(cb) = &self.options.on_state_change {
                cb(&self.state);
            }
        }
    }

    pub(crate) fn queue_effect(&mut self, effect: Effect) {
        let enabled = match effect {
            Effect::ResetPageIndex => self.options.resets_page_index(),
            Effect::ResetExpanded => self.options.resets_expanded(),
        };
        if enabled && !self.pending_effects.contains(&effect) {
            self.pending_effects.push(effect);
        }
    }

    /// Updates one slice and queues `effects` when it changed.
    pub(crate) fn update_state<S: PartialEq>(
        &mut self,
        slice: fn(&mut TableState) -> &mut Arc<S>,
        updater: impl FnOnce(&S) -> S,
        effects: &[Effect],
    ) {
        self.batch_update(|t| {
            if update_slice(slice(&mut t.state), updater) {
                t.state_changed = true;
                for &effect in effects {
                    t.queue_effect(effect);
                }
            }
        });
    }

    /// Sets the column filters. Entries whose value the column's filter would auto-remove are
    /// dropped.
    pub fn set_column_filters(&mut self, updater: impl FnOnce(&Vec<ColumnFilter>) -> Vec<ColumnFilter>) {
        let next: Vec<ColumnFilter> = updater(&self.state.column_filters)
            .into_iter()
            .filter(|filter| !self.should_auto_remove_filter(filter))
            .collect();
        self.update_state(|s| &mut s.column_filters, |_| next, &[Effect::ResetPageIndex]);
    }

    fn should_auto_remove_filter(&self, filter: &ColumnFilter) -> bool {
        let Some(column) = self.find_column(&filter.id) else {
            return false;
        };
        match self.filter_fn_for(column) {
            Ok(filter_fn) => filter_fn.should_auto_remove(&filter.value),
            Err(_) => filter.value.is_blank(),
        }
    }

    pub fn set_global_filter(&mut self, updater: impl FnOnce(&Value) -> Value) {
        let next = updater(&self.state.global_filter);
        let next = if self.global_filter_fn.should_auto_remove(&next) {
            Value::Undefined
        } else {
            next
        };
        self.update_state(|s| &mut s.global_filter, |_| next, &[Effect::ResetPageIndex]);
    }

    pub fn set_sorting(&mut self, updater: impl FnOnce(&Vec<ColumnSort>) -> Vec<ColumnSort>) {
        self.update_state(|s| &mut s.sorting, updater, &[Effect::ResetPageIndex]);
    }

    pub fn set_grouping(&mut self, updater: impl FnOnce(&Vec<ColumnId>) -> Vec<ColumnId>) {
        self.update_state(
            |s| &mut s.grouping,
            updater,
            &[Effect::ResetPageIndex, Effect::ResetExpanded],
        );
    }

    pub fn set_expanded(&mut self, updater: impl FnOnce(&ExpandedState) -> ExpandedState) {
        self.update_state(|s| &mut s.expanded, updater, &[]);
    }

    pub fn set_pagination(&mut self, updater: impl FnOnce(&PaginationState) -> PaginationState) {
        self.update_state(|s| &mut s.pagination, updater, &[]);
    }

    pub fn set_column_visibility(
        &mut self,
        updater: impl FnOnce(&HashMap<ColumnId, bool>) -> HashMap<ColumnId, bool>,
    ) {
        self.update_state(|s| &mut s.column_visibility, updater, &[]);
    }

    pub fn set_column_order(&mut self, updater: impl FnOnce(&Vec<ColumnId>) -> Vec<ColumnId>) {
        self.update_state(|s| &mut s.column_order, updater, &[]);
    }

    pub fn set_column_pinning(&mut self, updater: impl FnOnce(&ColumnPinningState) -> ColumnPinningState) {
        self.update_state(|s| &mut s.column_pinning, updater, &[]);
    }

    pub fn set_row_pinning(&mut self, updater: impl FnOnce(&RowPinningState) -> RowPinningState) {
        self.update_state(|s| &mut s.row_pinning, updater, &[]);
    }

    pub fn set_column_sizing(
        &mut self,
        updater: impl FnOnce(&HashMap<ColumnId, u32>) -> HashMap<ColumnId, u32>,
    ) {
        self.update_state(|s| &mut s.column_sizing, updater, &[]);
    }

    pub fn set_row_selection(&mut self, updater: impl FnOnce(&BTreeSet<RowId>) -> BTreeSet<RowId>) {
        self.update_state(|s| &mut s.row_selection, updater, &[]);
    }

    pub(crate) fn columns(&self) -> &ColumnSet<T> {
        &self.columns
    }

    pub(crate) fn find_column(&self, id: &str) -> Option<&Column<T>> {
        self.column_index.get(id).map(|&slot| &self.columns.all[slot])
    }

    /// The column named by a filter, sort or grouping entry. It must exist and have an accessor.
    pub(crate) fn accessor_column(&self, id: &str, feature: &'static str) -> Result<&Column<T>> {
        let Some(column) = self.find_column(id) else {
            twarn!(column = id, feature, "state references an unknown column");
            return Err(TableError::column_not_found(id));
        };
        if !column.has_accessor() {
            return Err(TableError::missing_accessor(Arc::clone(column.id()), feature));
        }
        Ok(column)
    }

    pub(crate) fn global_filter_fn(&self) -> &ResolvedFilter {
        &self.global_filter_fn
    }

    /// The sample the `Auto` strategies look at: the column's value in the first core row.
    fn first_core_value(&self, column: &Column<T>) -> Result<Value> {
        let core = self.core_row_model()?;
        Ok(core
            .flat_rows
            .first()
            .map_or(Value::Undefined, |row| self.core_value(row, column)))
    }

    pub(crate) fn filter_fn_for(&self, column: &Column<T>) -> Result<ResolvedFilter> {
        if let Some(filter) = self.strategies.get(column.id()).and_then(|s| s.filter.clone()) {
            return Ok(filter);
        }
        if let Some(filter) = self.caches.auto_filter.borrow().get(column.id()) {
            return Ok(filter.clone());
        }
        let filter = ResolvedFilter::Builtin(BuiltinFilter::auto_for(&self.first_core_value(column)?));
        ttrace!(column = %column.id(), ?filter, "filter fn picked");
        self.caches
            .auto_filter
            .borrow_mut()
            .insert(Arc::clone(column.id()), filter.clone());
        Ok(filter)
    }

    pub(crate) fn sort_fn_for(&self, column: &Column<T>) -> Result<ResolvedSort> {
        if let Some(sort) = self.strategies.get(column.id()).and_then(|s| s.sort.clone()) {
            return Ok(sort);
        }
        if let Some(sort) = self.caches.auto_sort.borrow().get(column.id()) {
            return Ok(sort.clone());
        }
        let filtered = self.filtered_row_model()?;
        let samples: Vec<Value> = filtered
            .flat_rows
            .iter()
            .take(AUTO_SORT_SAMPLE)
            .map(|row| self.core_value(row, column))
            .collect();
        let sort = ResolvedSort::Builtin(BuiltinSort::auto_for(&samples));
        ttrace!(column = %column.id(), ?sort, "sorting fn picked");
        self.caches
            .auto_sort
            .borrow_mut()
            .insert(Arc::clone(column.id()), sort.clone());
        Ok(sort)
    }

    pub(crate) fn aggregation_for(&self, column: &Column<T>) -> Result<Option<ResolvedAggregation>> {
        match self.strategies.get(column.id()).map(|s| &s.aggregation) {
            Some(AggregationChoice::None) => return Ok(None),
            Some(AggregationChoice::Resolved(aggregation)) => return Ok(Some(aggregation.clone())),
            Some(AggregationChoice::Auto) | None => {}
        }
        if let Some(aggregation) = self.caches.auto_aggregation.borrow().get(column.id()) {
            return Ok(aggregation.clone());
        }
        let aggregation = BuiltinAggregation::auto_for(&self.first_core_value(column)?)
            .map(ResolvedAggregation::Builtin);
        self.caches
            .auto_aggregation
            .borrow_mut()
            .insert(Arc::clone(column.id()), aggregation.clone());
        Ok(aggregation)
    }

    /// The accessor value of a data row, cached for the lifetime of the core model.
    pub(crate) fn core_value(&self, row: &Row<T>, column: &Column<T>) -> Value {
        let key = (Arc::clone(&row.id), Arc::clone(column.id()));
        if let Some(value) = self.caches.values.borrow().get(&key) {
            return value.clone();
        }
        let value = column.read(&row.id, &row.original);
        self.caches.values.borrow_mut().insert(key, value.clone());
        value
    }

    /// A row's value for `column`. Group rows show the grouping value for grouped columns and
    /// the aggregate of their leaf rows otherwise.
    pub(crate) fn value_for(&self, row: &Row<T>, column: &Column<T>) -> Result<Value> {
        let Some(group) = &row.group else {
            return Ok(self.core_value(row, column));
        };
        if group.grouping.iter().any(|id| id == column.id()) {
            return Ok(group
                .leaf_rows
                .first()
                .map_or(Value::Undefined, |leaf| self.core_value(leaf, column)));
        }

        let key = (Arc::clone(&row.id), Arc::clone(column.id()));
        if let Some(value) = self.caches.aggregates.borrow().get(&key) {
            return Ok(value.clone());
        }
        let value = match self.aggregation_for(column)? {
            Some(aggregation) if column.has_accessor() => {
                let values: Vec<Value> = group
                    .leaf_rows
                    .iter()
                    .map(|leaf| self.core_value(leaf, column))
                    .collect();
                aggregation.aggregate(&values)
            }
            _ => Value::Undefined,
        };
        self.caches.aggregates.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    /// The value a row shows in a column: the accessor value, or the group/aggregate value for
    /// group rows.
    pub fn row_value(&self, row: &Row<T>, column_id: &str) -> Result<Value> {
        let column = self.column(column_id)?;
        self.value_for(row, column)
    }

    /// Looks a row up in the final model, then before pagination, then among all core rows.
    pub fn row(&self, id: &str) -> Result<Rc<Row<T>>> {
        if let Some(row) = self.row_model()?.get(id) {
            return Ok(Rc::clone(row));
        }
        self.row_any(id)
    }

    /// Looks a row up before pagination, then among all core rows.
    pub(crate) fn row_any(&self, id: &str) -> Result<Rc<Row<T>>> {
        if let Some(row) = self.pre_pagination_row_model()?.get(id) {
            return Ok(Rc::clone(row));
        }
        self.core_row_model()?
            .get(id)
            .cloned()
            .ok_or_else(|| TableError::row_not_found(id))
    }

    /// Every data row, as produced by the row-id and sub-row functions.
    pub fn core_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let data = Arc::clone(&self.options.data);
        self.caches.core.borrow_mut().try_get((data,), |(data,)| {
            self.caches.values.borrow_mut().clear();
            pipeline::core_rows::build(
                data,
                self.options.get_row_id.as_ref(),
                self.options.get_sub_rows.as_ref(),
            )
            .map(Rc::new)
        })
    }

    pub(crate) fn filter_evaluation(&self) -> Result<Rc<FilterEvaluation>> {
        let core = self.core_row_model()?;
        let deps = (
            core,
            Arc::clone(&self.state.column_filters),
            Arc::clone(&self.state.global_filter),
        );
        self.caches
            .filter_eval
            .borrow_mut()
            .try_get(deps, |(core, filters, global)| {
                pipeline::filtered::evaluate(self, core, filters, global).map(Rc::new)
            })
    }

    /// Rows passing every column filter and the global filter.
    pub fn filtered_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let core = self.core_row_model()?;
        let evaluation = self.filter_evaluation()?;
        self.caches
            .filtered
            .borrow_mut()
            .try_get((core, evaluation), |(core, evaluation)| {
                self.caches.auto_sort.borrow_mut().clear();
                if !evaluation.is_active() {
                    return Ok(Rc::clone(core));
                }
                let model = pipeline::filtered::prune(
                    &core.rows,
                    self.options.filter_from_leaf_rows,
                    self.options.max_leaf_row_filter_depth,
                    &|row| evaluation.passes(&row.id, None),
                );
                tdebug!(rows = model.flat_rows.len(), "filtered row model built");
                Ok(Rc::new(model))
            })
    }

    pub fn grouped_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let filtered = self.filtered_row_model()?;
        if self.options.manual_grouping {
            return Ok(filtered);
        }
        let grouping = Arc::clone(&self.state.grouping);
        self.caches
            .grouped
            .borrow_mut()
            .try_get((filtered, grouping), |(filtered, grouping)| {
                self.caches.aggregates.borrow_mut().clear();
                if grouping.is_empty() {
                    return Ok(Rc::clone(filtered));
                }
                pipeline::grouped::group(self, filtered, grouping).map(Rc::new)
            })
    }

    pub fn sorted_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let grouped = self.grouped_row_model()?;
        if self.options.manual_sorting {
            return Ok(grouped);
        }
        let sorting = Arc::clone(&self.state.sorting);
        self.caches
            .sorted
            .borrow_mut()
            .try_get((grouped, sorting), |(grouped, sorting)| {
                if sorting.is_empty() {
                    return Ok(Rc::clone(grouped));
                }
                pipeline::sorted::sort(self, grouped, sorting).map(Rc::new)
            })
    }

    /// The sorted rows with expanded children inlined.
    ///
    /// When `paginate_expanded_rows` is off, expansion happens after pagination instead and this
    /// returns the sorted model unchanged.
    pub fn expanded_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let sorted = self.sorted_row_model()?;
        if self.options.manual_expanding || !self.options.paginate_expanded_rows {
            return Ok(sorted);
        }
        let expanded = Arc::clone(&self.state.expanded);
        self.caches
            .expanded
            .borrow_mut()
            .try_get((sorted, expanded), |(sorted, expanded)| {
                if expanded.is_empty() || sorted.rows.is_empty() {
                    return Ok(Rc::clone(sorted));
                }
                Ok(Rc::new(pipeline::expanded::expand(sorted, expanded)))
            })
    }

    pub fn pre_pagination_row_model(&self) -> Result<Rc<RowModel<T>>> {
        self.expanded_row_model()
    }

    fn expansion_deferred(&self) -> bool {
        !self.options.manual_expanding
            && !self.options.paginate_expanded_rows
            && !self.state.expanded.is_empty()
    }

    pub fn paginated_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let model = self.pre_pagination_row_model()?;
        let deferred = self.expansion_deferred();
        let paginate = self.options.enable_pagination && !self.options.manual_pagination;
        if !paginate && !deferred {
            return Ok(model);
        }
        let deps = (
            model,
            Arc::clone(&self.state.pagination),
            Arc::clone(&self.state.expanded),
        );
        self.caches
            .paginated
            .borrow_mut()
            .try_get(deps, |(model, pagination, expanded)| {
                if !paginate {
                    let rows = pipeline::expanded::expand_list(&model.rows, expanded);
                    return Ok(Rc::new(RowModel::from_rows(rows)));
                }
                if model.rows.is_empty() {
                    return Ok(Rc::clone(model));
                }
                let expand = deferred.then_some(&**expanded);
                Ok(Rc::new(pipeline::paginated::paginate(model, **pagination, expand)))
            })
    }

    /// The rows to render: the last stage of the pipeline.
    pub fn row_model(&self) -> Result<Rc<RowModel<T>>> {
        self.paginated_row_model()
    }
}
