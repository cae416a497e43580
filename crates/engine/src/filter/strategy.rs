//! Filter strategy: filter-row values in, row matcher out.

use std::collections::BTreeMap;
use std::sync::Arc;

use nattable_config::FilterSettings;
use rustc_hash::FxHashMap;

use crate::data::ColumnAccessor;
use crate::list::FilterList;

use super::matcher::{ColumnFilter, DefaultDisplayConverter, DisplayConverter, Matcher, MatcherId, RowFilter, ValueMatcher};
use super::parse::split_tokens;
use super::{FilterMap, FilterValue};

/// Rebuilds the matcher of a [`FilterList`] from a [`FilterMap`].
///
/// Static filters always apply. Exclude filters let a row through no matter
/// what the other filters say.
pub struct FilterStrategy<T> {
    list: FilterList<T>,
    accessor: Arc<dyn ColumnAccessor<T>>,
    converters: FxHashMap<usize, Arc<dyn DisplayConverter>>,
    default_converter: Arc<dyn DisplayConverter>,
    settings: FilterSettings,
    columns: Vec<ColumnFilter>,
    match_nothing: bool,
    statics: BTreeMap<MatcherId, Arc<dyn Matcher<T>>>,
    excludes: BTreeMap<MatcherId, Arc<dyn Matcher<T>>>,
    next_id: u64,
}

impl<T: 'static> FilterStrategy<T> {
    pub fn new(list: FilterList<T>, accessor: Arc<dyn ColumnAccessor<T>>, settings: &FilterSettings) -> Self {
        Self {
            list,
            accessor,
            converters: FxHashMap::default(),
            default_converter: Arc::new(DefaultDisplayConverter),
            settings: settings.clone(),
            columns: Vec::new(),
            match_nothing: false,
            statics: BTreeMap::new(),
            excludes: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn list(&self) -> &FilterList<T> {
        &self.list
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    pub fn accessor(&self) -> &Arc<dyn ColumnAccessor<T>> {
        &self.accessor
    }

    /// Column filters currently installed.
    pub fn column_filters(&self) -> &[ColumnFilter] {
        &self.columns
    }

    pub fn set_display_converter(&mut self, column: usize, converter: Arc<dyn DisplayConverter>) {
        self.converters.insert(column, converter);
    }

    pub fn set_default_display_converter(&mut self, converter: Arc<dyn DisplayConverter>) {
        self.default_converter = converter;
    }

    pub fn display_converter(&self, column: usize) -> &Arc<dyn DisplayConverter> {
        self.converters.get(&column).unwrap_or(&self.default_converter)
    }

    /// Replace every column filter with the ones described by `filters`.
    /// An empty map filters nothing.
    pub fn apply_filter(&mut self, filters: &FilterMap) {
        let columns = filters
            .iter()
            .map(|(&column, value)| self.column_filter(column, value))
            .collect();
        self.apply_columns(columns, false);
    }

    pub(crate) fn apply_columns(&mut self, columns: Vec<ColumnFilter>, match_nothing: bool) {
        self.columns = columns.into_iter().filter(|c| !c.is_empty()).collect();
        self.match_nothing = match_nothing;
        self.install();
    }

    /// Matchers for one column's filter value. Tokens that do not parse are
    /// logged and left out.
    pub fn column_filter(&self, column: usize, value: &FilterValue) -> ColumnFilter {
        let mut filter = ColumnFilter::new(column);
        let converter = self.display_converter(column);

        match value {
            FilterValue::SelectAll => {}
            FilterValue::Values(values) => {
                let mut displays: Vec<String> = values.iter().map(|v| converter.canonical_to_display(v)).collect();
                displays.sort();
                displays.dedup();
                match ValueMatcher::one_of(&displays) {
                    Ok(matcher) => filter.text.push(matcher),
                    Err(e) => log::warn!("filter values on column {column} skipped: {e}"),
                }
            }
            FilterValue::Text(text) => {
                for token in split_tokens(text, self.settings.text_delimiter.as_deref()) {
                    if token.match_type.is_threshold() {
                        match converter.display_to_canonical(&token.value) {
                            Some(threshold) if !threshold.is_null() => {
                                filter.thresholds.push(ValueMatcher::threshold(token.match_type, threshold))
                            }
                            _ => log::warn!(
                                "filter token '{}{}' on column {column} skipped: not a valid value",
                                token.match_type.symbol(),
                                token.value
                            ),
                        }
                    } else {
                        let mode = self.settings.text_match_mode;
                        match ValueMatcher::text(mode, &token.value, self.settings.case_sensitive) {
                            Ok(matcher) => filter.text.push(matcher),
                            Err(e) => log::warn!("filter token '{}' on column {column} skipped: {e}", token.value),
                        }
                    }
                }
            }
        }
        filter
    }

    fn next_id(&mut self) -> MatcherId {
        self.next_id += 1;
        MatcherId(self.next_id)
    }

    pub fn add_static_filter(&mut self, matcher: Arc<dyn Matcher<T>>) -> MatcherId {
        let id = self.next_id();
        self.statics.insert(id, matcher);
        self.install();
        id
    }

    pub fn remove_static_filter(&mut self, id: MatcherId) -> bool {
        let removed = self.statics.remove(&id).is_some();
        if removed {
            self.install();
        }
        removed
    }

    pub fn clear_static_filters(&mut self) {
        self.statics.clear();
        self.install();
    }

    pub fn add_exclude_filter(&mut self, matcher: Arc<dyn Matcher<T>>) -> MatcherId {
        let id = self.next_id();
        self.excludes.insert(id, matcher);
        self.install();
        id
    }

    pub fn remove_exclude_filter(&mut self, id: MatcherId) -> bool {
        let removed = self.excludes.remove(&id).is_some();
        if removed {
            self.install();
        }
        removed
    }

    pub fn clear_exclude_filters(&mut self) {
        self.excludes.clear();
        self.install();
    }

    /// Swap the composed matcher into the list (under its write lock).
    fn install(&self) {
        let filter = RowFilter::new(Arc::clone(&self.accessor), self.converters.clone(), Arc::clone(&self.default_converter))
            .with_columns(self.columns.clone())
            .with_match_nothing(self.match_nothing)
            .with_statics(self.statics.values().cloned().collect())
            .with_excludes(self.excludes.values().cloned().collect());

        let matcher: Option<Arc<dyn Matcher<T>>> = if filter.is_pass_through() {
            None
        } else {
            Some(Arc::new(filter))
        };
        self.list.set_matcher(matcher);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::EventList;
    use nattable_core::{CellValue, TextMatchMode};

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: &'static str,
        age: i64,
    }

    struct PersonColumns;

    impl ColumnAccessor<Person> for PersonColumns {
        fn column_count(&self) -> usize {
            2
        }

        fn data_value(&self, item: &Person, column: usize) -> CellValue {
            match column {
                0 => CellValue::from(item.name),
                1 => CellValue::Long(item.age),
                _ => CellValue::Null,
            }
        }
    }

    fn people() -> EventList<Person> {
        EventList::new(vec![
            Person { name: "Homer", age: 39 },
            Person { name: "Marge", age: 36 },
            Person { name: "Bart", age: 10 },
            Person { name: "Lisa", age: 8 },
            Person { name: "Maggie", age: 1 },
        ])
    }

    fn strategy(list: &EventList<Person>, settings: FilterSettings) -> FilterStrategy<Person> {
        FilterStrategy::new(list.filter_list(), Arc::new(PersonColumns), &settings)
    }

    fn names(strategy: &FilterStrategy<Person>) -> Vec<&'static str> {
        let list = strategy.list();
        (0..list.len()).filter_map(|i| list.get(i).map(|p: Person| p.name)).collect()
    }

    fn text(value: &str) -> FilterValue {
        FilterValue::Text(value.to_string())
    }

    #[test]
    fn test_contains_is_case_insensitive_by_default() {
        let list = people();
        let mut strategy = strategy(&list, FilterSettings::default());
        strategy.apply_filter(&FilterMap::from([(0, text("ma"))]));
        assert_eq!(names(&strategy), vec!["Marge", "Maggie"]);

        strategy.apply_filter(&FilterMap::new());
        assert_eq!(strategy.list().len(), 5);
    }

    #[test]
    fn test_delimited_tokens_or_text_and_thresholds() {
        let list = people();
        let settings = FilterSettings { text_delimiter: Some(",".into()), ..FilterSettings::default() };
        let mut strategy = strategy(&list, settings);

        strategy.apply_filter(&FilterMap::from([(0, text("bart, lisa"))]));
        assert_eq!(names(&strategy), vec!["Bart", "Lisa"]);

        strategy.apply_filter(&FilterMap::from([(1, text(">= 8, < 37"))]));
        assert_eq!(names(&strategy), vec!["Marge", "Bart", "Lisa"]);

        // Text and thresholds across columns
        strategy.apply_filter(&FilterMap::from([(0, text("m")), (1, text(">2"))]));
        assert_eq!(names(&strategy), vec!["Homer", "Marge"]);
    }

    #[test]
    fn test_not_equal_and_equal() {
        let list = people();
        let mut strategy = strategy(&list, FilterSettings::default());
        strategy.apply_filter(&FilterMap::from([(1, text("<> 10"))]));
        assert_eq!(strategy.list().len(), 4);
        strategy.apply_filter(&FilterMap::from([(0, text("=Lisa"))]));
        assert_eq!(names(&strategy), vec!["Lisa"]);
    }

    #[test]
    fn test_bad_regex_token_is_skipped() {
        let list = people();
        let settings = FilterSettings {
            text_delimiter: Some(";".into()),
            text_match_mode: TextMatchMode::RegularExpression,
            ..FilterSettings::default()
        };
        let mut strategy = strategy(&list, settings);
        strategy.apply_filter(&FilterMap::from([(0, text("[;b.*"))]));
        assert_eq!(names(&strategy), vec!["Bart"]);

        // Nothing usable left: the column is unfiltered
        strategy.apply_filter(&FilterMap::from([(0, text("("))]));
        assert_eq!(strategy.list().len(), 5);
        assert!(strategy.column_filters().is_empty());
    }

    #[test]
    fn test_values_become_alternation() {
        let list = people();
        let mut strategy = strategy(&list, FilterSettings::default());
        let picked = FilterValue::Values(vec![CellValue::from("Lisa"), CellValue::from("Homer")]);
        strategy.apply_filter(&FilterMap::from([(0, picked)]));
        assert_eq!(names(&strategy), vec!["Homer", "Lisa"]);

        strategy.apply_filter(&FilterMap::from([(0, FilterValue::Values(Vec::new()))]));
        assert!(strategy.list().is_empty());
    }

    #[test]
    fn test_static_and_exclude_filters() {
        let list = people();
        let mut strategy = strategy(&list, FilterSettings::default());
        let adults = strategy.add_static_filter(Arc::new(|p: &Person| p.age >= 18));
        assert_eq!(names(&strategy), vec!["Homer", "Marge"]);

        strategy.apply_filter(&FilterMap::from([(0, text("r"))]));
        assert_eq!(names(&strategy), vec!["Homer", "Marge"]);

        // Excluded rows stay visible whatever the other filters say
        let baby = strategy.add_exclude_filter(Arc::new(|p: &Person| p.name == "Maggie"));
        assert_eq!(names(&strategy), vec!["Homer", "Marge", "Maggie"]);

        assert!(strategy.remove_static_filter(adults));
        assert!(!strategy.remove_static_filter(adults));
        assert_eq!(names(&strategy), vec!["Homer", "Marge", "Bart", "Maggie"]);

        assert!(strategy.remove_exclude_filter(baby));
        strategy.apply_filter(&FilterMap::new());
        assert_eq!(strategy.list().len(), 5);
    }

    #[test]
    fn test_new_rows_are_filtered_incrementally() {
        let list = people();
        let mut strategy = strategy(&list, FilterSettings::default());
        strategy.apply_filter(&FilterMap::from([(1, text("<18"))]));
        list.push(Person { name: "Abe", age: 83 });
        list.push(Person { name: "Rod", age: 9 });
        assert_eq!(names(&strategy), vec!["Bart", "Lisa", "Maggie", "Rod"]);
    }
}
