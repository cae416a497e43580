//! Base layer: positions are indexes, values come from the provider.

use std::collections::BTreeMap;

use nattable_config::GridSettings;
use nattable_core::{Axis, CellValue, PositionCoordinate, Range};

use crate::command::{CellUpdate, LayerCommand};
use crate::data::DataProvider;
use crate::event::{ChangeKind, LayerEvent, StructuralChange, StructuralDiff};
use crate::layer::Layer;
use crate::list::ListChange;

/// Per-axis sizing. Sizes are stored unscaled and scaled on read.
#[derive(Debug, Clone)]
pub struct SizeConfig {
    default_size: u32,
    overrides: BTreeMap<usize, u32>,
    dpi_scale: f64,
}

impl SizeConfig {
    pub fn new(default_size: u32) -> Self {
        Self { default_size, overrides: BTreeMap::new(), dpi_scale: 1.0 }
    }

    pub fn dpi_scale(&self) -> f64 {
        self.dpi_scale
    }

    pub fn set_dpi_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.dpi_scale = scale;
        }
    }

    fn scale(&self, size: u32) -> u32 {
        (size as f64 * self.dpi_scale).round() as u32
    }

    pub fn size(&self, index: usize) -> u32 {
        self.scale(self.overrides.get(&index).copied().unwrap_or(self.default_size))
    }

    /// `size` is in scaled pixels.
    pub fn set_size(&mut self, index: usize, size: u32) {
        let unscaled = (size as f64 / self.dpi_scale).round() as u32;
        self.overrides.insert(index, unscaled);
    }

    /// Shift overrides at or after `range.start` to make room.
    pub fn insert(&mut self, range: Range) {
        let moved: Vec<(usize, u32)> = self.overrides.split_off(&range.start).into_iter().collect();
        self.overrides.extend(moved.into_iter().map(|(i, s)| (i + range.len(), s)));
    }

    /// Drop overrides inside `range` and close the gap.
    pub fn delete(&mut self, range: Range) {
        let tail = self.overrides.split_off(&range.start);
        self.overrides.extend(
            tail.into_iter()
                .filter(|(i, _)| !range.contains(*i))
                .map(|(i, s)| (i - range.len(), s)),
        );
    }
}

pub struct DataLayer<P> {
    provider: P,
    column_sizes: SizeConfig,
    row_sizes: SizeConfig,
    generation: u64,
    events: Vec<LayerEvent>,
}

impl<P: DataProvider> DataLayer<P> {
    pub fn new(provider: P, grid: &GridSettings) -> Self {
        let mut column_sizes = SizeConfig::new(grid.default_column_width);
        let mut row_sizes = SizeConfig::new(grid.default_row_height);
        column_sizes.set_dpi_scale(grid.dpi_scale);
        row_sizes.set_dpi_scale(grid.dpi_scale);
        Self { provider, column_sizes, row_sizes, generation: 0, events: Vec::new() }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn sizes(&self, axis: Axis) -> &SizeConfig {
        match axis {
            Axis::Column => &self.column_sizes,
            Axis::Row => &self.row_sizes,
        }
    }

    fn sizes_mut(&mut self, axis: Axis) -> &mut SizeConfig {
        match axis {
            Axis::Column => &mut self.column_sizes,
            Axis::Row => &mut self.row_sizes,
        }
    }

    fn update_cells(&mut self, updates: Vec<CellUpdate>) -> bool {
        let mut changed = Vec::new();
        for CellUpdate { column, row, value } in updates {
            if column >= self.provider.column_count() || row >= self.provider.row_count() {
                log::debug!("update of ({column}, {row}) skipped: out of bounds");
                continue;
            }
            if self.provider.data_value(column, row) == value {
                continue;
            }
            match self.provider.set_data_value(column, row, value) {
                Ok(()) => changed.push(PositionCoordinate::new(column, row)),
                Err(e) => log::debug!("update of ({column}, {row}) skipped: {e}"),
            }
        }
        if !changed.is_empty() {
            self.events.push(LayerEvent::CellsUpdated { cells: changed });
        }
        true
    }

    fn rows_changed(&mut self, change: ListChange) {
        let event = match change {
            ListChange::Inserted(range) => {
                self.row_sizes.insert(range);
                StructuralChange::new(
                    Axis::Row,
                    ChangeKind::Insert,
                    Some(vec![StructuralDiff::Add { after: range }]),
                )
                .with_indexes(vec![range])
            }
            ListChange::Deleted(range) => {
                self.row_sizes.delete(range);
                StructuralChange::new(
                    Axis::Row,
                    ChangeKind::Delete,
                    Some(vec![StructuralDiff::Delete { before: range }]),
                )
                .with_indexes(vec![range])
            }
            ListChange::Updated(_) => {
                self.events.push(LayerEvent::VisualRefresh);
                return;
            }
            ListChange::Reset => StructuralChange::refresh(Axis::Row),
        };
        self.generation += 1;
        self.events.push(LayerEvent::Structural(event));
    }

    fn all_changed(&self, axis: Axis) -> StructuralChange {
        let range = Range::new(0, self.count(axis));
        StructuralChange::new(axis, ChangeKind::Resize, Some(vec![StructuralDiff::Change { range }]))
    }
}

impl<P: DataProvider> Layer for DataLayer<P> {
    fn count(&self, axis: Axis) -> usize {
        match axis {
            Axis::Column => self.provider.column_count(),
            Axis::Row => self.provider.row_count(),
        }
    }

    fn index_by_position(&self, axis: Axis, position: usize) -> Option<usize> {
        (position < self.count(axis)).then_some(position)
    }

    fn position_by_index(&self, axis: Axis, index: usize) -> Option<usize> {
        (index < self.count(axis)).then_some(index)
    }

    fn local_to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        self.index_by_position(axis, position)
    }

    fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize> {
        self.index_by_position(axis, position)
    }

    fn size_by_position(&self, axis: Axis, position: usize) -> u32 {
        if position >= self.count(axis) {
            return 0;
        }
        self.sizes(axis).size(position)
    }

    fn data_value_by_position(&self, column: usize, row: usize) -> CellValue {
        self.provider.data_value(column, row)
    }

    fn structure_generation(&self) -> u64 {
        self.generation
    }

    fn do_command(&mut self, command: LayerCommand) -> bool {
        match command {
            LayerCommand::UpdateCells { updates } => self.update_cells(updates),
            LayerCommand::Resize { axis, position, size } => {
                if position >= self.count(axis) {
                    return false;
                }
                self.sizes_mut(axis).set_size(position, size);
                let change = StructuralChange::new(
                    axis,
                    ChangeKind::Resize,
                    Some(vec![StructuralDiff::Change { range: Range::single(position) }]),
                );
                self.events.push(LayerEvent::Structural(change));
                true
            }
            LayerCommand::ConfigureScaling { dpi_factor } => {
                self.column_sizes.set_dpi_scale(dpi_factor);
                self.row_sizes.set_dpi_scale(dpi_factor);
                for axis in [Axis::Column, Axis::Row] {
                    let change = self.all_changed(axis);
                    self.events.push(LayerEvent::Structural(change));
                }
                true
            }
            LayerCommand::StructuralRefresh => {
                self.generation += 1;
                for axis in [Axis::Column, Axis::Row] {
                    self.events.push(LayerEvent::Structural(StructuralChange::refresh(axis)));
                }
                true
            }
            LayerCommand::RowsChanged(change) => {
                self.rows_changed(change);
                true
            }
            _ => false,
        }
    }

    fn take_events(&mut self) -> Vec<LayerEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::VecDataProvider;

    fn layer() -> DataLayer<VecDataProvider> {
        DataLayer::new(VecDataProvider::numbered(4, 5), &GridSettings::default())
    }

    #[test]
    fn test_positions_are_indexes() {
        let layer = layer();
        assert_eq!(layer.column_count(), 4);
        assert_eq!(layer.row_count(), 5);
        assert_eq!(layer.index_by_position(Axis::Row, 4), Some(4));
        assert_eq!(layer.index_by_position(Axis::Row, 5), None);
        assert_eq!(layer.data_value_by_position(2, 3), CellValue::Int(23));
    }

    #[test]
    fn test_pixels_follow_sizes() {
        let mut layer = layer();
        assert_eq!(layer.start_pixel_of_position(Axis::Column, 2), Some(200));
        assert!(layer.do_command(LayerCommand::Resize { axis: Axis::Column, position: 1, size: 50 }));
        assert_eq!(layer.start_pixel_of_position(Axis::Column, 2), Some(150));
        assert_eq!(layer.position_by_pixel(Axis::Column, 149), Some(1));
        assert_eq!(layer.position_by_pixel(Axis::Column, 150), Some(2));
        assert_eq!(layer.pixel_extent(Axis::Column), 350);
        assert_eq!(layer.position_by_pixel(Axis::Column, 350), None);
        assert_eq!(layer.start_pixel_of_position(Axis::Column, 4), Some(350));
        assert_eq!(layer.start_pixel_of_position(Axis::Column, 5), None);
    }

    #[test]
    fn test_dpi_scaling_keeps_overrides() {
        let mut layer = layer();
        layer.do_command(LayerCommand::Resize { axis: Axis::Row, position: 0, size: 30 });
        layer.take_events();
        assert!(layer.do_command(LayerCommand::ConfigureScaling { dpi_factor: 2.0 }));
        assert_eq!(layer.size_by_position(Axis::Row, 0), 60);
        assert_eq!(layer.size_by_position(Axis::Row, 1), 40);
        assert_eq!(layer.take_events().len(), 2);
    }

    #[test]
    fn test_update_cells_skips_equal_and_out_of_bounds() {
        let mut layer = layer();
        let handled = layer.do_command(LayerCommand::UpdateCells {
            updates: vec![
                CellUpdate::new(0, 0, 0),
                CellUpdate::new(1, 1, "x"),
                CellUpdate::new(9, 9, 1),
            ],
        });
        assert!(handled);
        assert_eq!(
            layer.take_events(),
            vec![LayerEvent::CellsUpdated { cells: vec![PositionCoordinate::new(1, 1)] }]
        );
        assert_eq!(layer.data_value_by_position(1, 1), CellValue::Text("x".into()));
    }

    #[test]
    fn test_rows_changed_becomes_structural() {
        let mut layer = layer();
        let before = layer.structure_generation();
        layer.do_command(LayerCommand::RowsChanged(ListChange::Deleted(Range::single(2))));
        assert!(layer.structure_generation() > before);
        let events = layer.take_events();
        let change = events[0].as_structural().unwrap();
        assert_eq!(change.kind, ChangeKind::Delete);
        assert_eq!(change.indexes, vec![Range::single(2)]);
    }

    #[test]
    fn test_size_config_insert_delete_shift_overrides() {
        let mut sizes = SizeConfig::new(10);
        sizes.set_size(2, 30);
        sizes.set_size(5, 50);
        sizes.insert(Range::new(3, 5));
        assert_eq!(sizes.size(2), 30);
        assert_eq!(sizes.size(7), 50);
        sizes.delete(Range::new(1, 3));
        assert_eq!(sizes.size(5), 50);
        assert_eq!(sizes.size(2), 10);
    }

    #[test]
    fn test_unknown_command_is_not_handled() {
        let mut layer = layer();
        assert!(!layer.do_command(LayerCommand::SelectAll));
    }
}
