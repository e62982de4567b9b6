use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::pipeline::filtered::{FilterEvaluation, prune};
use crate::table::FacetScope;
use crate::{GLOBAL_FILTER_ID, Memo, Result, RowModel, Table, Value};

impl<T> Table<T> {
    fn facet_rows(&self, core: &Rc<RowModel<T>>, evaluation: &FilterEvaluation, excluding: &str) -> Rc<RowModel<T>> {
        if !evaluation.filter_ids.iter().any(|id| &**id != excluding) {
            return Rc::clone(core);
        }
        Rc::new(prune(
            &core.rows,
            self.options().filter_from_leaf_rows,
            self.options().max_leaf_row_filter_depth,
            &|row| evaluation.passes(&row.id, Some(excluding)),
        ))
    }

    /// Core rows passing every active filter except the column's own. Feeds filter widgets
    /// that list what the column could still match.
    pub fn faceted_row_model(&self, column_id: &str) -> Result<Rc<RowModel<T>>> {
        let id = Arc::clone(self.column(column_id)?.id());
        let core = self.core_row_model()?;
        let evaluation = self.filter_evaluation()?;
        let mut faceted = self.caches.faceted.borrow_mut();
        let memo = faceted
            .entry(Arc::clone(&id))
            .or_insert_with(|| Memo::new("faceted_row_model"));
        Ok(memo.get((core, evaluation), |(core, evaluation)| {
            self.facet_rows(core, evaluation, &id)
        }))
    }

    /// Core rows passing every column filter, ignoring the global filter.
    pub fn global_faceted_row_model(&self) -> Result<Rc<RowModel<T>>> {
        let core = self.core_row_model()?;
        let evaluation = self.filter_evaluation()?;
        Ok(self
            .caches
            .global_faceted
            .borrow_mut()
            .get((core, evaluation), |(core, evaluation)| {
                self.facet_rows(core, evaluation, GLOBAL_FILTER_ID)
            }))
    }

    fn facet_model(&self, scope: FacetScope, column_id: &str) -> Result<Rc<RowModel<T>>> {
        match scope {
            FacetScope::Column => self.faceted_row_model(column_id),
            FacetScope::Global => self.global_faceted_row_model(),
        }
    }

    fn unique_values(&self, scope: FacetScope, column_id: &str) -> Result<Rc<Vec<(Value, usize)>>> {
        let column = self.column(column_id)?;
        let model = self.facet_model(scope, column_id)?;
        let mut caches = self.caches.unique_values.borrow_mut();
        let memo = caches
            .entry((scope, Arc::clone(column.id())))
            .or_insert_with(|| Memo::new("faceted_unique_values"));
        Ok(memo.get((model,), |(model,)| {
            let mut counts: Vec<(Value, usize)> = Vec::new();
            let mut slots: HashMap<Value, usize> = HashMap::new();
            for row in &model.flat_rows {
                let value = self.core_value(row, column);
                match slots.get(&value) {
                    Some(&slot) => counts[slot].1 += 1,
                    None => {
                        slots.insert(value.clone(), counts.len());
                        counts.push((value, 1));
                    }
                }
            }
            Rc::new(counts)
        }))
    }

    fn min_max(&self, scope: FacetScope, column_id: &str) -> Result<Option<(f64, f64)>> {
        let column = self.column(column_id)?;
        let model = self.facet_model(scope, column_id)?;
        let mut caches = self.caches.min_max.borrow_mut();
        let memo = caches
            .entry((scope, Arc::clone(column.id())))
            .or_insert_with(|| Memo::new("faceted_min_max"));
        Ok(memo.get((model,), |(model,)| {
            model
                .flat_rows
                .iter()
                .filter_map(|row| self.core_value(row, column).as_number())
                .filter(|n| !n.is_nan())
                .fold(None, |acc, n| match acc {
                    None => Some((n, n)),
                    Some((min, max)) => Some((f64::min(min, n), f64::max(max, n))),
                })
        }))
    }

    /// Distinct values of the column over its faceted rows, first-seen order, with counts.
    pub fn faceted_unique_values(&self, column_id: &str) -> Result<Rc<Vec<(Value, usize)>>> {
        self.unique_values(FacetScope::Column, column_id)
    }

    /// Smallest and largest numeric value of the column over its faceted rows.
    pub fn faceted_min_max(&self, column_id: &str) -> Result<Option<(f64, f64)>> {
        self.min_max(FacetScope::Column, column_id)
    }

    pub fn global_faceted_unique_values(&self, column_id: &str) -> Result<Rc<Vec<(Value, usize)>>> {
        self.unique_values(FacetScope::Global, column_id)
    }

    pub fn global_faceted_min_max(&self, column_id: &str) -> Result<Option<(f64, f64)>> {
        self.min_max(FacetScope::Global, column_id)
    }
}
