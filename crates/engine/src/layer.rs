//! The layer contract.

use nattable_core::{Axis, CellValue};

use crate::command::{CellUpdate, LayerCommand};
use crate::event::LayerEvent;

/// A transformed view of rows and columns.
///
/// Queries on positions that do not exist answer `None`, size 0 or
/// `CellValue::Null`; they never panic.
pub trait Layer {
    fn count(&self, axis: Axis) -> usize;

    fn column_count(&self) -> usize {
        self.count(Axis::Column)
    }

    fn row_count(&self) -> usize {
        self.count(Axis::Row)
    }

    /// Base index of the entry at `position`, resolved down the chain.
    fn index_by_position(&self, axis: Axis, position: usize) -> Option<usize>;

    fn position_by_index(&self, axis: Axis, index: usize) -> Option<usize>;

    fn local_to_underlying(&self, axis: Axis, position: usize) -> Option<usize>;

    fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize>;

    fn size_by_position(&self, axis: Axis, position: usize) -> u32;

    /// `position == count` yields the end pixel.
    fn start_pixel_of_position(&self, axis: Axis, position: usize) -> Option<u32> {
        if position > self.count(axis) {
            return None;
        }
        Some((0..position).map(|p| self.size_by_position(axis, p)).sum())
    }

    fn position_by_pixel(&self, axis: Axis, pixel: u32) -> Option<usize> {
        let mut end = 0u32;
        for p in 0..self.count(axis) {
            end = end.saturating_add(self.size_by_position(axis, p));
            if pixel < end {
                return Some(p);
            }
        }
        None
    }

    fn pixel_extent(&self, axis: Axis) -> u32 {
        (0..self.count(axis)).map(|p| self.size_by_position(axis, p)).sum()
    }

    fn data_value_by_position(&self, column: usize, row: usize) -> CellValue;

    /// Single-cell `UpdateCells`.
    fn set_data_value_by_position(&mut self, column: usize, row: usize, value: CellValue) -> bool {
        self.do_command(LayerCommand::UpdateCells {
            updates: vec![CellUpdate::new(column, row, value)],
        })
    }

    /// Increases whenever positions may have moved anywhere in the chain.
    fn structure_generation(&self) -> u64;

    /// Returns whether the command was handled here or below.
    fn do_command(&mut self, command: LayerCommand) -> bool;

    fn take_events(&mut self) -> Vec<LayerEvent>;
}

/// Convert a command from `layer`'s positions into its underlying layer's.
///
/// A reorder gap equal to the count maps to just past the last underlying
/// position.
pub(crate) fn convert_down<L: Layer + ?Sized>(layer: &L, command: LayerCommand) -> Option<LayerCommand> {
    command.map_positions(
        |axis, p| layer.local_to_underlying(axis, p),
        |axis, gap| {
            let count = layer.count(axis);
            if gap < count {
                layer.local_to_underlying(axis, gap)
            } else if count == 0 {
                Some(0)
            } else {
                layer.local_to_underlying(axis, count - 1).map(|u| u + 1)
            }
        },
    )
}
