//! Shared types for the grid layer engine: coordinates, cell values and the
//! small enums that both the engine and the settings file speak.

pub mod calendar;
pub mod coord;
pub mod fill;
pub mod filter;
pub mod value;

pub use calendar::CalendarField;
pub use coord::{
    positions_from_ranges, ranges_from_positions, Axis, CellRect, PositionCoordinate, Range,
    Rectangle,
};
pub use fill::{FillDirection, FillOperation};
pub use filter::TextMatchMode;
pub use value::{CellValue, ValueSortKey};
