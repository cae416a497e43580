//! The default body stack.

use nattable_config::Settings;
use nattable_core::{Axis, CellValue};

use crate::command::LayerCommand;
use crate::composite_freeze::CompositeFreezeLayer;
use crate::data::DataProvider;
use crate::data_layer::DataLayer;
use crate::event::LayerEvent;
use crate::hide_show::HideShowLayer;
use crate::layer::Layer;
use crate::reorder::ReorderLayer;
use crate::selection::SelectionLayer;

pub type ColumnReorderLayer<P> = ReorderLayer<DataLayer<P>>;
pub type ColumnHideShowLayer<P> = HideShowLayer<ColumnReorderLayer<P>>;
pub type RowHideShowLayer<P> = HideShowLayer<ColumnHideShowLayer<P>>;

/// data → column reorder → column hide/show → row hide/show → selection →
/// composite freeze.
///
/// Commands go in at the top in the stack's own positions.
pub struct BodyLayerStack<P> {
    top: CompositeFreezeLayer<RowHideShowLayer<P>>,
}

impl<P: DataProvider> BodyLayerStack<P> {
    pub fn new(provider: P, settings: &Settings) -> Self {
        let data = DataLayer::new(provider, &settings.grid);
        let column_reorder = ReorderLayer::new(data, Axis::Column);
        let column_hide_show = HideShowLayer::new(column_reorder, Axis::Column);
        let row_hide_show = HideShowLayer::new(column_hide_show, Axis::Row);

        let mut selection = SelectionLayer::new(row_hide_show);
        selection.set_date_field(settings.fill_handle.date_field);

        Self { top: CompositeFreezeLayer::new(selection) }
    }

    pub fn composite_freeze_layer(&self) -> &CompositeFreezeLayer<RowHideShowLayer<P>> {
        &self.top
    }

    pub fn composite_freeze_layer_mut(&mut self) -> &mut CompositeFreezeLayer<RowHideShowLayer<P>> {
        &mut self.top
    }

    pub fn selection_layer(&self) -> &SelectionLayer<RowHideShowLayer<P>> {
        self.top.selection_layer()
    }

    pub fn selection_layer_mut(&mut self) -> &mut SelectionLayer<RowHideShowLayer<P>> {
        self.top.selection_layer_mut()
    }

    pub fn row_hide_show_layer(&self) -> &RowHideShowLayer<P> {
        self.selection_layer().underlying()
    }

    pub fn column_hide_show_layer(&self) -> &ColumnHideShowLayer<P> {
        self.row_hide_show_layer().underlying()
    }

    pub fn column_reorder_layer(&self) -> &ColumnReorderLayer<P> {
        self.column_hide_show_layer().underlying()
    }

    pub fn data_layer(&self) -> &DataLayer<P> {
        self.column_reorder_layer().underlying()
    }

    pub fn provider(&self) -> &P {
        self.data_layer().provider()
    }

    /// Run a batch of commands, e.g. drained from a
    /// [`RowChangeQueue`](crate::list::RowChangeQueue). Returns how many
    /// were handled.
    pub fn do_commands(&mut self, commands: impl IntoIterator<Item = LayerCommand>) -> usize {
        let mut handled = 0;
        for command in commands {
            if self.top.do_command(command) {
                handled += 1;
            }
        }
        handled
    }
}

impl<P: DataProvider> Layer for BodyLayerStack<P> {
    fn count(&self, axis: Axis) -> usize {
        self.top.count(axis)
    }

    fn index_by_position(&self, axis: Axis, position: usize) -> Option<usize> {
        self.top.index_by_position(axis, position)
    }

    fn position_by_index(&self, axis: Axis, index: usize) -> Option<usize> {
        self.top.position_by_index(axis, index)
    }

    fn local_to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        self.top.local_to_underlying(axis, position)
    }

    fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize> {
        self.top.underlying_to_local(axis, position)
    }

    fn size_by_position(&self, axis: Axis, position: usize) -> u32 {
        self.top.size_by_position(axis, position)
    }

    fn start_pixel_of_position(&self, axis: Axis, position: usize) -> Option<u32> {
        self.top.start_pixel_of_position(axis, position)
    }

    fn position_by_pixel(&self, axis: Axis, pixel: u32) -> Option<usize> {
        self.top.position_by_pixel(axis, pixel)
    }

    fn pixel_extent(&self, axis: Axis) -> u32 {
        self.top.pixel_extent(axis)
    }

    fn data_value_by_position(&self, column: usize, row: usize) -> CellValue {
        self.top.data_value_by_position(column, row)
    }

    fn structure_generation(&self) -> u64 {
        self.top.structure_generation()
    }

    fn do_command(&mut self, command: LayerCommand) -> bool {
        self.top.do_command(command)
    }

    fn take_events(&mut self) -> Vec<LayerEvent> {
        self.top.take_events()
    }
}
