//! Matchers: predicates over row objects and over single cell values.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use nattable_core::{CellValue, TextMatchMode};
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::data::ColumnAccessor;

use super::parse::MatchType;

/// Predicate over row objects.
pub trait Matcher<T>: Send + Sync {
    fn matches(&self, item: &T) -> bool;
}

impl<T, F> Matcher<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn matches(&self, item: &T) -> bool {
        self(item)
    }
}

/// Handle of a registered static or exclude matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcherId(pub(crate) u64);

// =============================================================================
// Display conversion
// =============================================================================

/// Converts between cell values and the text shown in (and typed into) the
/// filter row.
pub trait DisplayConverter: Send + Sync {
    fn canonical_to_display(&self, value: &CellValue) -> String {
        value.to_string()
    }

    /// `None` when `text` is not a valid value.
    fn display_to_canonical(&self, text: &str) -> Option<CellValue>;
}

/// Integers, decimals, booleans and ISO dates; anything else is text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDisplayConverter;

impl DisplayConverter for DefaultDisplayConverter {
    fn display_to_canonical(&self, text: &str) -> Option<CellValue> {
        let text = text.trim();
        if text.is_empty() {
            return Some(CellValue::Null);
        }
        if let Ok(v) = text.parse::<i64>() {
            return Some(CellValue::Long(v));
        }
        if let Ok(v) = text.parse::<Decimal>() {
            return Some(CellValue::BigDecimal(v));
        }
        if let Ok(v) = text.parse::<bool>() {
            return Some(CellValue::Bool(v));
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Some(CellValue::from(d));
        }
        Some(CellValue::Text(text.to_string()))
    }
}

// =============================================================================
// Value matchers
// =============================================================================

/// Predicate over one cell: its value and display text.
#[derive(Debug, Clone)]
pub enum ValueMatcher {
    Text {
        mode: TextMatchMode,
        needle: String,
        case_sensitive: bool,
    },
    /// Whole display text must match
    Pattern(Regex),
    Threshold {
        match_type: MatchType,
        value: CellValue,
    },
    Nothing,
}

impl ValueMatcher {
    pub fn text(mode: TextMatchMode, needle: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        match mode {
            TextMatchMode::RegularExpression => Self::pattern(needle, case_sensitive),
            mode => {
                let needle = if case_sensitive { needle.to_string() } else { needle.to_lowercase() };
                Ok(ValueMatcher::Text { mode, needle, case_sensitive })
            }
        }
    }

    /// Full-match regex over the display text.
    pub fn pattern(pattern: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(ValueMatcher::Pattern(regex))
    }

    /// Alternation over the display texts of `values`; empty text becomes `^$`.
    pub fn one_of(displays: &[String]) -> Result<Self, regex::Error> {
        if displays.is_empty() {
            return Ok(ValueMatcher::Nothing);
        }
        let alternatives: Vec<String> = displays
            .iter()
            .map(|d| if d.is_empty() { "^$".to_string() } else { regex::escape(d) })
            .collect();
        Self::pattern(&format!("({})", alternatives.join("|")), true)
    }

    pub fn threshold(match_type: MatchType, value: CellValue) -> Self {
        ValueMatcher::Threshold { match_type, value }
    }

    pub fn matches(&self, value: &CellValue, display: &str) -> bool {
        match self {
            ValueMatcher::Text { mode, needle, case_sensitive } => {
                let owned;
                let haystack = if *case_sensitive {
                    display
                } else {
                    owned = display.to_lowercase();
                    owned.as_str()
                };
                match mode {
                    TextMatchMode::Exact => haystack == needle,
                    TextMatchMode::StartsWith => haystack.starts_with(needle.as_str()),
                    _ => haystack.contains(needle.as_str()),
                }
            }
            ValueMatcher::Pattern(regex) => regex.is_match(display),
            ValueMatcher::Threshold { match_type, value: threshold } => {
                if value.is_null() {
                    return false;
                }
                let ordering = value.compare(threshold);
                match match_type {
                    MatchType::None | MatchType::Equal => ordering == Some(Ordering::Equal),
                    MatchType::NotEqual => ordering != Some(Ordering::Equal),
                    MatchType::GreaterThan => ordering == Some(Ordering::Greater),
                    MatchType::GreaterThanOrEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                    MatchType::LessThan => ordering == Some(Ordering::Less),
                    MatchType::LessThanOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                }
            }
            ValueMatcher::Nothing => false,
        }
    }
}

/// Every matcher of one column. Text matchers are alternatives; thresholds
/// all have to hold.
#[derive(Debug, Clone, Default)]
pub struct ColumnFilter {
    pub column: usize,
    pub text: Vec<ValueMatcher>,
    pub thresholds: Vec<ValueMatcher>,
}

impl ColumnFilter {
    pub fn new(column: usize) -> Self {
        Self { column, ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.thresholds.is_empty()
    }

    pub fn matches(&self, value: &CellValue, display: &str) -> bool {
        (self.text.is_empty() || self.text.iter().any(|m| m.matches(value, display)))
            && self.thresholds.iter().all(|m| m.matches(value, display))
    }
}

// =============================================================================
// Row matcher
// =============================================================================

/// Column filters over row objects, combined with static and exclude
/// matchers: `exclude(row) || (columns(row) && static(row))`.
pub struct RowFilter<T> {
    accessor: Arc<dyn ColumnAccessor<T>>,
    converters: FxHashMap<usize, Arc<dyn DisplayConverter>>,
    default_converter: Arc<dyn DisplayConverter>,
    columns: Vec<ColumnFilter>,
    match_nothing: bool,
    statics: Vec<Arc<dyn Matcher<T>>>,
    excludes: Vec<Arc<dyn Matcher<T>>>,
}

impl<T> RowFilter<T> {
    pub fn new(
        accessor: Arc<dyn ColumnAccessor<T>>,
        converters: FxHashMap<usize, Arc<dyn DisplayConverter>>,
        default_converter: Arc<dyn DisplayConverter>,
    ) -> Self {
        Self {
            accessor,
            converters,
            default_converter,
            columns: Vec::new(),
            match_nothing: false,
            statics: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnFilter>) -> Self {
        self.columns = columns.into_iter().filter(|c| !c.is_empty()).collect();
        self
    }

    /// Reject every row that no exclude matcher lets through.
    pub fn with_match_nothing(mut self, match_nothing: bool) -> Self {
        self.match_nothing = match_nothing;
        self
    }

    pub fn with_statics(mut self, statics: Vec<Arc<dyn Matcher<T>>>) -> Self {
        self.statics = statics;
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<Arc<dyn Matcher<T>>>) -> Self {
        self.excludes = excludes;
        self
    }

    /// True when every row matches.
    pub fn is_pass_through(&self) -> bool {
        !self.match_nothing && self.columns.is_empty() && self.statics.is_empty()
    }

    pub fn columns(&self) -> &[ColumnFilter] {
        &self.columns
    }

    fn converter(&self, column: usize) -> &dyn DisplayConverter {
        self.converters.get(&column).unwrap_or(&self.default_converter).as_ref()
    }

    fn columns_match(&self, item: &T) -> bool {
        self.columns.iter().all(|filter| {
            let value = self.accessor.data_value(item, filter.column);
            let display = self.converter(filter.column).canonical_to_display(&value);
            filter.matches(&value, &display)
        })
    }
}

impl<T> Matcher<T> for RowFilter<T> {
    fn matches(&self, item: &T) -> bool {
        if self.excludes.iter().any(|m| m.matches(item)) {
            return true;
        }
        !self.match_nothing && self.columns_match(item) && self.statics.iter().all(|m| m.matches(item))
    }
}
