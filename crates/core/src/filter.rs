//! Text filter matching modes.

use serde::{Deserialize, Serialize};

/// How a plain filter token is matched against a cell's display text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatchMode {
    #[default]
    Contains,
    Exact,
    StartsWith,
    RegularExpression,
}
