//! Filter row support: turn per-column filter values into a row matcher for
//! a [`FilterList`](crate::list::FilterList).
//!
//! - `parse`: filter text into typed tokens
//! - `matcher`: value matchers and the composed row matcher
//! - `strategy`: `apply_filter` plus static and exclude filters
//! - `combobox`: multi-select filter values over the distinct column values
//! - `conflation`: background coalescing of list-change notifications

mod combobox;
mod conflation;
mod matcher;
mod parse;
mod strategy;

use std::collections::BTreeMap;

use nattable_core::CellValue;

pub use combobox::{ComboBoxFilterStrategy, DistinctValueProvider};
pub use conflation::EventConflater;
pub use matcher::{
    ColumnFilter, DefaultDisplayConverter, DisplayConverter, Matcher, MatcherId, RowFilter, ValueMatcher,
};
pub use parse::{parse_token, split_tokens, FilterToken, MatchType};
pub use strategy::FilterStrategy;

/// What the filter row holds for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Typed expression, e.g. `foo`, `>= 10`, `a, b`
    Text(String),
    /// Values picked in a multi-select drop-down
    Values(Vec<CellValue>),
    /// Everything picked
    SelectAll,
}

/// Column index to filter value.
pub type FilterMap = BTreeMap<usize, FilterValue>;
