//! Multi-select filter row: distinct column values and select-all handling.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Weak};

use nattable_config::FilterSettings;
use nattable_core::CellValue;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::data::ColumnAccessor;
use crate::list::{EventList, FilterList};

use super::conflation::EventConflater;
use super::strategy::FilterStrategy;
use super::{FilterMap, FilterValue};

type ValueCache = Arc<Mutex<FxHashMap<usize, Vec<CellValue>>>>;

/// Sorted distinct values per column of the unfiltered list.
///
/// Values are computed on first request and cached. Source list changes
/// drop the cache through an [`EventConflater`], so a burst of edits costs
/// one invalidation.
pub struct DistinctValueProvider<T> {
    list: EventList<T>,
    accessor: Arc<dyn ColumnAccessor<T>>,
    cache: ValueCache,
    conflater: Arc<EventConflater>,
}

impl<T> DistinctValueProvider<T> {
    pub fn new(list: EventList<T>, accessor: Arc<dyn ColumnAccessor<T>>, settings: &FilterSettings) -> Self {
        let cache: ValueCache = Arc::default();
        let stale = Arc::clone(&cache);
        let conflater = Arc::new(EventConflater::new(settings.conflation_interval(), move || {
            stale.lock().clear();
        }));

        let listener: Weak<EventConflater> = Arc::downgrade(&conflater);
        list.add_listener(Box::new(move |_| {
            if let Some(conflater) = listener.upgrade() {
                conflater.add_event();
            }
        }));

        Self { list, accessor, cache, conflater }
    }

    /// Distinct values of `column`, in value order. Null sorts first.
    pub fn values(&self, column: usize) -> Vec<CellValue> {
        let mut cache = self.cache.lock();
        if let Some(values) = cache.get(&column) {
            return values.clone();
        }

        let distinct: BTreeMap<_, CellValue> = self.list.with_items(|items| {
            items
                .iter()
                .map(|item| self.accessor.data_value(item, column))
                .map(|value| (value.sort_key(), value))
                .collect()
        });
        let values: Vec<CellValue> = distinct.into_values().collect();
        cache.insert(column, values.clone());
        values
    }

    /// Apply pending list changes to the cache right away.
    pub fn flush(&self) {
        self.conflater.flush();
    }

    pub fn invalidate(&self) {
        self.cache.lock().clear();
    }

    pub fn is_cached(&self, column: usize) -> bool {
        self.cache.lock().contains_key(&column)
    }
}

/// [`FilterStrategy`] for a combobox filter row.
///
/// An empty filter map means nothing is selected anywhere, so no row
/// passes. A column whose selection covers every distinct value is not
/// filtered at all, which keeps rows whose values show up later.
pub struct ComboBoxFilterStrategy<T> {
    strategy: FilterStrategy<T>,
    values: DistinctValueProvider<T>,
}

impl<T: 'static> ComboBoxFilterStrategy<T> {
    pub fn new(list: FilterList<T>, accessor: Arc<dyn ColumnAccessor<T>>, settings: &FilterSettings) -> Self {
        let values = DistinctValueProvider::new(list.source(), Arc::clone(&accessor), settings);
        Self { strategy: FilterStrategy::new(list, accessor, settings), values }
    }

    pub fn strategy(&self) -> &FilterStrategy<T> {
        &self.strategy
    }

    /// Static and exclude filters, display converters.
    pub fn strategy_mut(&mut self) -> &mut FilterStrategy<T> {
        &mut self.strategy
    }

    pub fn distinct_values(&self) -> &DistinctValueProvider<T> {
        &self.values
    }

    pub fn apply_filter(&mut self, filters: &FilterMap) {
        if filters.is_empty() {
            self.strategy.apply_columns(Vec::new(), true);
            return;
        }

        let mut columns = Vec::new();
        for (&column, value) in filters {
            match value {
                FilterValue::SelectAll => {}
                FilterValue::Values(selected) if self.selects_all(column, selected) => {}
                other => columns.push(self.strategy.column_filter(column, other)),
            }
        }
        self.strategy.apply_columns(columns, false);
    }

    fn selects_all(&self, column: usize, selected: &[CellValue]) -> bool {
        let picked: BTreeSet<_> = selected.iter().map(CellValue::sort_key).collect();
        self.values.values(column).iter().all(|v| picked.contains(&v.sort_key()))
    }
}
