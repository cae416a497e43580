//! Selection layer: selection model, internal clipboard and fill handle.

use nattable_core::{
    ranges_from_positions, Axis, CalendarField, CellRect, CellValue, FillDirection, FillOperation,
    PositionCoordinate, Range,
};

use crate::clipboard::InternalClipboard;
use crate::command::{CellUpdate, LayerCommand};
use crate::event::{ChangeKind, LayerEvent, StructuralChange};
use crate::fill::compute_fill;
use crate::layer::Layer;

// =============================================================================
// SelectionModel
// =============================================================================

/// Selected rectangles plus an anchor and a last selected cell.
///
/// Invariant: the anchor and the last selected cell, when set, are selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionModel {
    rects: Vec<CellRect>,
    anchor: Option<PositionCoordinate>,
    last_selected: Option<PositionCoordinate>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[CellRect] {
        &self.rects
    }

    pub fn anchor(&self) -> Option<PositionCoordinate> {
        self.anchor
    }

    pub fn last_selected(&self) -> Option<PositionCoordinate> {
        self.last_selected
    }

    pub fn contains(&self, column: usize, row: usize) -> bool {
        self.rects.iter().any(|r| r.contains(column, row))
    }

    pub fn clear(&mut self) {
        self.rects.clear();
        self.anchor = None;
        self.last_selected = None;
    }

    pub fn add(&mut self, rect: CellRect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    pub fn remove(&mut self, rect: &CellRect) {
        self.rects = self.rects.iter().flat_map(|r| r.subtract(rect)).collect();
        self.ensure_anchor();
    }

    /// Set anchor and last selected to `cell`; it must already be selected.
    pub fn focus(&mut self, cell: PositionCoordinate) {
        self.anchor = Some(cell);
        self.last_selected = Some(cell);
        self.ensure_anchor();
    }

    pub fn set_last_selected(&mut self, cell: PositionCoordinate) {
        self.last_selected = Some(cell);
        self.ensure_anchor();
    }

    pub fn bounds(&self) -> Option<CellRect> {
        let (first, rest) = self.rects.split_first()?;
        Some(rest.iter().fold(*first, |acc, r| acc.union(r)))
    }

    /// Every selected cell once, ordered by column then row.
    pub fn selected_cells(&self) -> Vec<PositionCoordinate> {
        let mut cells: Vec<PositionCoordinate> = self
            .rects
            .iter()
            .flat_map(|r| r.cells())
            .map(|(c, r)| PositionCoordinate::new(c, r))
            .collect();
        cells.sort_by_key(|c| (c.column, c.row));
        cells.dedup();
        cells
    }

    /// Positions on `axis` with at least one selected cell.
    pub fn selected_positions(&self, axis: Axis) -> Vec<usize> {
        let ranges: Vec<_> = self.rects.iter().map(|r| r.range(axis)).collect();
        ranges_from_positions(ranges.iter().flat_map(|r| r.iter()))
            .iter()
            .flat_map(|r| r.iter())
            .collect()
    }

    /// Positions on `axis` whose whole line (`other_count` cells) is selected.
    pub fn fully_selected_positions(&self, axis: Axis, other_count: usize) -> Vec<usize> {
        if other_count == 0 {
            return Vec::new();
        }
        self.selected_positions(axis)
            .into_iter()
            .filter(|&p| {
                (0..other_count).all(|q| match axis {
                    Axis::Column => self.contains(p, q),
                    Axis::Row => self.contains(q, p),
                })
            })
            .collect()
    }

    /// Follow a structural change on `change.axis`: removed positions drop
    /// out and inserted positions split rectangles.
    pub fn remap(&mut self, change: &StructuralChange) {
        let axis = change.axis;
        let mut rects = Vec::with_capacity(self.rects.len());
        for rect in &self.rects {
            let positions = rect.range(axis).iter().filter_map(|p| change.remap_position(p));
            for range in ranges_from_positions(positions) {
                rects.push(rect.with_range(axis, range));
            }
        }
        self.rects = rects;

        let remap = |cell: PositionCoordinate| {
            change.remap_position(cell.get(axis)).map(|p| cell.with(axis, p))
        };
        self.anchor = self.anchor.and_then(remap);
        self.last_selected = self.last_selected.and_then(remap);
        self.ensure_anchor();
    }

    /// Restore the anchor invariant, falling back to another selected cell.
    fn ensure_anchor(&mut self) {
        let fallback = self.rects.first().map(|r| PositionCoordinate::new(r.column, r.row));
        let selected = |cell: &PositionCoordinate| self.contains(cell.column, cell.row);

        let last = self.last_selected.filter(selected);
        let anchor = self.anchor.filter(selected).or(last).or(fallback);
        self.anchor = anchor;
        self.last_selected = last.or(anchor);
    }
}

// =============================================================================
// SelectionLayer
// =============================================================================

/// Decides whether the fill handle may write a cell (selection positions).
pub trait EditableRule {
    fn is_editable(&self, column: usize, row: usize) -> bool;
}

impl<F> EditableRule for F
where
    F: Fn(usize, usize) -> bool,
{
    fn is_editable(&self, column: usize, row: usize) -> bool {
        self(column, row)
    }
}

pub struct SelectionLayer<L> {
    underlying: L,
    model: SelectionModel,
    clipboard: Option<InternalClipboard>,
    fill_region: Option<CellRect>,
    editable: Box<dyn EditableRule>,
    date_field: CalendarField,
    events: Vec<LayerEvent>,
}

impl<L: Layer> SelectionLayer<L> {
    pub fn new(underlying: L) -> Self {
        Self {
            underlying,
            model: SelectionModel::new(),
            clipboard: None,
            fill_region: None,
            editable: Box::new(|_: usize, _: usize| true),
            date_field: CalendarField::default(),
            events: Vec::new(),
        }
    }

    pub fn underlying(&self) -> &L {
        &self.underlying
    }

    pub fn underlying_mut(&mut self) -> &mut L {
        &mut self.underlying
    }

    pub fn model(&self) -> &SelectionModel {
        &self.model
    }

    pub fn selected_cells(&self) -> Vec<PositionCoordinate> {
        self.model.selected_cells()
    }

    pub fn is_cell_selected(&self, column: usize, row: usize) -> bool {
        self.model.contains(column, row)
    }

    pub fn anchor(&self) -> Option<PositionCoordinate> {
        self.model.anchor()
    }

    pub fn last_selected(&self) -> Option<PositionCoordinate> {
        self.model.last_selected()
    }

    pub fn fully_selected_positions(&self, axis: Axis) -> Vec<usize> {
        self.model.fully_selected_positions(axis, self.count(axis.other()))
    }

    pub fn clipboard(&self) -> Option<&InternalClipboard> {
        self.clipboard.as_ref()
    }

    pub fn fill_handle_region(&self) -> Option<CellRect> {
        self.fill_region
    }

    pub fn set_editable_rule(&mut self, rule: impl EditableRule + 'static) {
        self.editable = Box::new(rule);
    }

    pub fn date_field(&self) -> CalendarField {
        self.date_field
    }

    pub fn set_date_field(&mut self, field: CalendarField) {
        self.date_field = field;
    }

    fn full_rect(&self) -> CellRect {
        CellRect::new(0, 0, self.column_count(), self.row_count())
    }

    fn changed(&mut self) {
        self.events.push(LayerEvent::SelectionChanged);
    }

    fn select_cell(&mut self, column: usize, row: usize, shift: bool, ctrl: bool) -> bool {
        if column >= self.column_count() || row >= self.row_count() {
            return false;
        }
        let cell = PositionCoordinate::new(column, row);

        match (shift, ctrl, self.model.anchor()) {
            (true, false, Some(anchor)) => {
                self.model.clear();
                self.model.add(CellRect::spanning(anchor, cell));
                self.model.focus(anchor);
                self.model.set_last_selected(cell);
            }
            (true, true, Some(anchor)) => {
                self.model.add(CellRect::spanning(anchor, cell));
                self.model.set_last_selected(cell);
            }
            (false, true, _) if self.model.contains(column, row) => {
                self.model.remove(&CellRect::single(column, row));
            }
            (_, true, _) => {
                self.model.add(CellRect::single(column, row));
                self.model.focus(cell);
            }
            _ => {
                self.model.clear();
                self.model.add(CellRect::single(column, row));
                self.model.focus(cell);
            }
        }
        self.changed();
        true
    }

    fn select_region(&mut self, rect: CellRect, shift: bool, ctrl: bool) -> bool {
        let Some(rect) = rect.intersection(&self.full_rect()) else {
            return false;
        };
        let origin = PositionCoordinate::new(rect.column, rect.row);

        match (shift, ctrl, self.model.anchor()) {
            (true, _, Some(anchor)) => {
                let span = rect.union(&CellRect::single(anchor.column, anchor.row));
                if !ctrl {
                    self.model.clear();
                }
                self.model.add(span);
                self.model.focus(anchor);
                self.model.set_last_selected(origin);
            }
            (false, true, _) if rect.cells().all(|(c, r)| self.model.contains(c, r)) => {
                self.model.remove(&rect);
            }
            (_, true, _) => {
                self.model.add(rect);
                self.model.focus(origin);
            }
            _ => {
                self.model.clear();
                self.model.add(rect);
                self.model.focus(origin);
            }
        }
        self.changed();
        true
    }

    /// Whole column or row, extended from the anchor's line with shift.
    fn select_line(&mut self, axis: Axis, position: usize, shift: bool, ctrl: bool) -> bool {
        let full = self.full_rect();
        if position >= self.count(axis) {
            return false;
        }
        let from = match (shift, self.model.anchor()) {
            (true, Some(anchor)) => anchor.get(axis),
            _ => position,
        };
        let line = Range::new(from.min(position), from.max(position) + 1);
        let rect = full.with_range(axis, line);
        if rect.is_empty() {
            return false;
        }

        if shift && self.model.anchor().is_some() {
            let anchor = self.model.anchor();
            if !ctrl {
                self.model.clear();
            }
            self.model.add(rect);
            if let Some(anchor) = anchor {
                self.model.focus(anchor);
            }
            self.model.set_last_selected(PositionCoordinate::new(0, 0).with(axis, position));
            self.changed();
            true
        } else {
            self.select_region(rect, false, ctrl)
        }
    }

    fn select_all(&mut self) -> bool {
        let full = self.full_rect();
        self.model.clear();
        if !full.is_empty() {
            self.model.add(full);
            self.model.focus(PositionCoordinate::new(0, 0));
        }
        self.changed();
        true
    }

    fn copy_selection(&mut self) -> bool {
        let Some(bounds) = self.model.bounds() else {
            return false;
        };
        self.clipboard = Some(InternalClipboard::capture(&*self, bounds));
        true
    }

    fn fill_handle_paste(&mut self, operation: FillOperation, direction: FillDirection) -> bool {
        let (Some(clipboard), Some(region)) = (self.clipboard.as_ref(), self.fill_region) else {
            return false;
        };

        let updates: Vec<CellUpdate> = compute_fill(clipboard, region, operation, direction, self.date_field)
            .into_iter()
            .filter(|u| {
                let editable = self.editable.is_editable(u.column, u.row);
                if !editable {
                    log::debug!("fill of ({}, {}) skipped: cell is not editable", u.column, u.row);
                }
                editable
            })
            .collect();
        if !updates.is_empty() {
            self.underlying.do_command(LayerCommand::UpdateCells { updates });
        }

        self.fill_region = None;
        self.model.clear();
        self.model.add(region);
        self.model.focus(PositionCoordinate::new(region.column, region.row));
        self.changed();
        true
    }

    fn handle_underlying(&mut self, event: LayerEvent) {
        let change = match event {
            LayerEvent::Structural(change) => change,
            other => {
                self.events.push(other);
                return;
            }
        };

        self.fill_region = None;
        let before = self.model.clone();
        if change.kind == ChangeKind::Reorder || change.diffs.is_none() {
            self.model.clear();
        } else if change.moves_positions() {
            self.model.remap(&change);
        }
        let selection_changed = self.model != before;

        self.events.push(LayerEvent::Structural(change));
        if selection_changed {
            self.changed();
        }
    }

    fn pump_events(&mut self) {
        for event in self.underlying.take_events() {
            self.handle_underlying(event);
        }
    }
}

impl<L: Layer> Layer for SelectionLayer<L> {
    fn count(&self, axis: Axis) -> usize {
        self.underlying.count(axis)
    }

    fn index_by_position(&self, axis: Axis, position: usize) -> Option<usize> {
        self.underlying.index_by_position(axis, position)
    }

    fn position_by_index(&self, axis: Axis, index: usize) -> Option<usize> {
        self.underlying.position_by_index(axis, index)
    }

    fn local_to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        (position < self.count(axis)).then_some(position)
    }

    fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize> {
        (position < self.count(axis)).then_some(position)
    }

    fn size_by_position(&self, axis: Axis, position: usize) -> u32 {
        self.underlying.size_by_position(axis, position)
    }

    fn start_pixel_of_position(&self, axis: Axis, position: usize) -> Option<u32> {
        self.underlying.start_pixel_of_position(axis, position)
    }

    fn position_by_pixel(&self, axis: Axis, pixel: u32) -> Option<usize> {
        self.underlying.position_by_pixel(axis, pixel)
    }

    fn pixel_extent(&self, axis: Axis) -> u32 {
        self.underlying.pixel_extent(axis)
    }

    fn data_value_by_position(&self, column: usize, row: usize) -> CellValue {
        self.underlying.data_value_by_position(column, row)
    }

    fn structure_generation(&self) -> u64 {
        self.underlying.structure_generation()
    }

    fn do_command(&mut self, command: LayerCommand) -> bool {
        let handled = match command {
            LayerCommand::SelectCell { column, row, shift, ctrl } => self.select_cell(column, row, shift, ctrl),
            LayerCommand::SelectRegion { rect, shift, ctrl } => self.select_region(rect, shift, ctrl),
            LayerCommand::SelectAll => self.select_all(),
            LayerCommand::SelectColumn { position, shift, ctrl } => {
                self.select_line(Axis::Column, position, shift, ctrl)
            }
            LayerCommand::SelectRow { position, shift, ctrl } => self.select_line(Axis::Row, position, shift, ctrl),
            LayerCommand::ClearSelection => {
                if !self.model.is_empty() {
                    self.model.clear();
                    self.changed();
                }
                true
            }
            LayerCommand::CopySelection => self.copy_selection(),
            LayerCommand::ClearClipboard => {
                self.clipboard = None;
                true
            }
            LayerCommand::SetFillHandleRegion { rect } => {
                self.fill_region = rect.intersection(&self.full_rect());
                self.fill_region.is_some()
            }
            LayerCommand::ClearFillHandleRegion => {
                self.fill_region = None;
                true
            }
            LayerCommand::FillHandlePaste { operation, direction } => self.fill_handle_paste(operation, direction),
            other => self.underlying.do_command(other),
        };
        self.pump_events();
        handled
    }

    fn take_events(&mut self) -> Vec<LayerEvent> {
        self.pump_events();
        std::mem::take(&mut self.events)
    }
}
