//! Fill-handle operation types.

use serde::{Deserialize, Serialize};

use crate::coord::Axis;

/// How target cells are derived from the copied source cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillOperation {
    #[default]
    Copy,
    Series,
}

/// Drag direction of the fill handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillDirection {
    Up,
    Down,
    Left,
    Right,
}

impl FillDirection {
    /// Axis the handle is dragged along.
    pub fn axis(self) -> Axis {
        match self {
            FillDirection::Up | FillDirection::Down => Axis::Row,
            FillDirection::Left | FillDirection::Right => Axis::Column,
        }
    }

    pub fn is_backward(self) -> bool {
        matches!(self, FillDirection::Up | FillDirection::Left)
    }
}
