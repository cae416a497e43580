//! Composite freeze layer: frozen region followed by the viewport.
//!
//! Local positions `0..frozen` belong to the freeze layer and the rest to the
//! viewport; both resolve to positions of the selection layer below. Every
//! freeze change and every structural change from below recomputes the
//! viewport's minimum origin.

use nattable_core::{Axis, CellValue};

use crate::command::LayerCommand;
use crate::event::{LayerEvent, StructuralChange};
use crate::freeze::FreezeLayer;
use crate::layer::{convert_down, Layer};
use crate::selection::SelectionLayer;
use crate::viewport::ViewportLayer;

/// Local positions of one axis, captured before a change.
#[derive(Debug, Clone, Copy)]
struct RegionMap {
    frozen: Option<(usize, usize)>,
    origin: Option<usize>,
}

impl RegionMap {
    fn to_local(self, position: usize) -> Option<usize> {
        let frozen_count = match self.frozen {
            Some((first, last)) if (first..=last).contains(&position) => return Some(position - first),
            Some((first, last)) => last + 1 - first,
            None => 0,
        };
        let origin = self.origin?;
        (position >= origin).then(|| frozen_count + position - origin)
    }
}

pub struct CompositeFreezeLayer<L> {
    underlying: SelectionLayer<L>,
    freeze: FreezeLayer,
    viewport: ViewportLayer,
    generation: u64,
    events: Vec<LayerEvent>,
}

impl<L: Layer> CompositeFreezeLayer<L> {
    pub fn new(underlying: SelectionLayer<L>) -> Self {
        let viewport = ViewportLayer::new(&underlying);
        let mut freeze = FreezeLayer::new();
        freeze.set_stamp(underlying.structure_generation());
        Self { underlying, freeze, viewport, generation: 0, events: Vec::new() }
    }

    pub fn selection_layer(&self) -> &SelectionLayer<L> {
        &self.underlying
    }

    pub fn selection_layer_mut(&mut self) -> &mut SelectionLayer<L> {
        &mut self.underlying
    }

    pub fn freeze_layer(&self) -> &FreezeLayer {
        &self.freeze
    }

    pub fn viewport_layer(&self) -> &ViewportLayer {
        &self.viewport
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    pub fn frozen_count(&self, axis: Axis) -> usize {
        self.freeze.count(axis)
    }

    pub fn viewport_count(&self, axis: Axis) -> usize {
        self.viewport.count(axis, &self.underlying)
    }

    pub fn minimum_origin_position(&self, axis: Axis) -> Option<usize> {
        self.viewport.minimum_origin_position(axis)
    }

    /// Pixel offset just after the frozen region.
    pub fn minimum_origin(&self, axis: Axis) -> u32 {
        self.viewport.minimum_origin(axis, &self.underlying)
    }

    pub fn viewport_origin(&self, axis: Axis) -> u32 {
        self.viewport.origin(axis, &self.underlying)
    }

    fn region_map(&self, axis: Axis) -> RegionMap {
        RegionMap {
            frozen: self.freeze.span(axis).map(|span| (*span.start(), *span.end())),
            origin: self.viewport.origin_position(axis),
        }
    }

    fn update_minimum(&mut self, axis: Axis, change: Option<&StructuralChange>) {
        let total = self.underlying.count(axis);
        let minimum = match self.freeze.span(axis) {
            Some(span) => Some(span.end() + 1).filter(|&m| m < total),
            None => (total > 0).then_some(0),
        };
        self.viewport.set_minimum(axis, minimum, change, &self.underlying);
    }

    /// Recompute from the frozen indexes if the layers below changed
    /// without telling us.
    fn ensure_current(&mut self) {
        if self.freeze.is_stale(self.underlying.structure_generation()) {
            self.freeze.resync(&self.underlying);
            for axis in [Axis::Column, Axis::Row] {
                self.update_minimum(axis, None);
            }
        }
    }

    // =========================================================================
    // Freeze commands
    // =========================================================================

    /// Freeze through `last` (selection position), starting at the current
    /// frozen start or the viewport origin.
    fn freeze_through(&mut self, axis: Axis, last: usize) {
        let first = match self.freeze.span(axis) {
            Some(span) => *span.start(),
            None => self.viewport.origin_position(axis).unwrap_or(0),
        };
        self.freeze.set_span(axis, first, Some(last), &self.underlying);
        self.update_minimum(axis, None);
    }

    fn unfreeze_axis(&mut self, axis: Axis) {
        let Some(span) = self.freeze.span(axis) else {
            return;
        };
        self.freeze.unfreeze(axis);
        self.update_minimum(axis, None);
        self.viewport.set_origin_position(axis, *span.start(), &self.underlying);
    }

    fn frozen_changed(&mut self) {
        self.generation += 1;
        let event = if self.freeze.is_frozen() { LayerEvent::Freeze } else { LayerEvent::Unfreeze };
        self.events.push(event);
    }

    fn freeze_line(&mut self, axis: Axis, position: usize, toggle: bool) -> bool {
        if toggle && self.freeze.span(axis).is_some() {
            self.unfreeze_axis(axis);
            self.frozen_changed();
            return true;
        }
        let Some(last) = self.local_to_underlying(axis, position) else {
            return false;
        };
        self.freeze_through(axis, last);
        self.frozen_changed();
        true
    }

    fn freeze_position(&mut self, column: usize, row: usize) -> bool {
        let (Some(last_column), Some(last_row)) = (
            self.local_to_underlying(Axis::Column, column),
            self.local_to_underlying(Axis::Row, row),
        ) else {
            return false;
        };
        self.freeze_through(Axis::Column, last_column);
        self.freeze_through(Axis::Row, last_row);
        self.frozen_changed();
        true
    }

    /// Whole selected columns (or rows) freeze through the last of them.
    /// Otherwise everything above and left of the anchor freezes.
    fn freeze_selection(&mut self) -> bool {
        let columns = self.underlying.fully_selected_positions(Axis::Column);
        let rows = self.underlying.fully_selected_positions(Axis::Row);
        if let Some(&last) = columns.last() {
            self.freeze_through(Axis::Column, last);
        } else if let Some(&last) = rows.last() {
            self.freeze_through(Axis::Row, last);
        } else {
            let Some(anchor) = self.underlying.anchor() else {
                return false;
            };
            for axis in [Axis::Column, Axis::Row] {
                let origin = self.viewport.origin_position(axis).unwrap_or(0);
                match anchor.get(axis).checked_sub(1).filter(|&last| last >= origin) {
                    Some(last) => self.freeze_through(axis, last),
                    None => self.unfreeze_axis(axis),
                }
            }
        }
        self.frozen_changed();
        true
    }

    fn unfreeze(&mut self) -> bool {
        let was_frozen = self.freeze.is_frozen();
        for axis in [Axis::Column, Axis::Row] {
            self.unfreeze_axis(axis);
        }
        if was_frozen {
            self.frozen_changed();
        }
        true
    }

    // =========================================================================
    // Viewport commands
    // =========================================================================

    fn viewport_moved(&mut self, axis: Axis) {
        self.generation += 1;
        self.events.push(LayerEvent::Structural(StructuralChange::refresh(axis)));
    }

    fn scroll(&mut self, axis: Axis, delta: i64) -> bool {
        if self.viewport.scroll(axis, delta, &self.underlying) {
            self.viewport_moved(axis);
        }
        true
    }

    fn show_position(&mut self, axis: Axis, position: usize) -> bool {
        if position >= self.underlying.count(axis) {
            return false;
        }
        if self.viewport.show_position(axis, position, &self.underlying) {
            self.viewport_moved(axis);
        }
        true
    }

    fn set_client_area(&mut self, axis: Axis, extent: Option<u32>) -> bool {
        let before = self.viewport.origin(axis, &self.underlying);
        self.viewport.set_client_area(axis, extent, &self.underlying);
        if self.viewport.origin(axis, &self.underlying) != before {
            self.viewport_moved(axis);
        }
        true
    }

    // =========================================================================
    // Events from below
    // =========================================================================

    fn handle_underlying(&mut self, event: LayerEvent) {
        let change = match event {
            LayerEvent::Structural(change) => change,
            other => {
                let event = other.map_cells(|axis, p| self.underlying_to_local(axis, p));
                self.events.push(event);
                return;
            }
        };

        let axis = change.axis;
        let old = self.region_map(axis);
        let was_frozen = self.freeze.is_frozen();
        self.freeze.handle_structural(&change, &self.underlying);
        self.update_minimum(axis, Some(&change));

        let mapped = change.map(|u| old.to_local(u), |u| self.underlying_to_local(axis, u));
        self.events.push(LayerEvent::Structural(mapped));
        if was_frozen != self.freeze.is_frozen() {
            self.frozen_changed();
        }
    }

    fn pump_events(&mut self) {
        let events = self.underlying.take_events();
        if events.is_empty() {
            return;
        }
        for event in events {
            self.handle_underlying(event);
        }
        self.freeze.set_stamp(self.underlying.structure_generation());
    }
}

impl<L: Layer> Layer for CompositeFreezeLayer<L> {
    fn count(&self, axis: Axis) -> usize {
        self.frozen_count(axis) + self.viewport_count(axis)
    }

    fn index_by_position(&self, axis: Axis, position: usize) -> Option<usize> {
        let u = self.local_to_underlying(axis, position)?;
        self.underlying.index_by_position(axis, u)
    }

    fn position_by_index(&self, axis: Axis, index: usize) -> Option<usize> {
        let u = self.underlying.position_by_index(axis, index)?;
        self.underlying_to_local(axis, u)
    }

    fn local_to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        let frozen = self.frozen_count(axis);
        if position < frozen {
            self.freeze.local_to_underlying(axis, position)
        } else {
            self.viewport.local_to_underlying(axis, position - frozen, &self.underlying)
        }
    }

    fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize> {
        self.freeze.underlying_to_local(axis, position).or_else(|| {
            let local = self.viewport.underlying_to_local(axis, position, &self.underlying)?;
            Some(self.frozen_count(axis) + local)
        })
    }

    fn size_by_position(&self, axis: Axis, position: usize) -> u32 {
        self.local_to_underlying(axis, position)
            .map_or(0, |u| self.underlying.size_by_position(axis, u))
    }

    fn data_value_by_position(&self, column: usize, row: usize) -> CellValue {
        match (
            self.local_to_underlying(Axis::Column, column),
            self.local_to_underlying(Axis::Row, row),
        ) {
            (Some(c), Some(r)) => self.underlying.data_value_by_position(c, r),
            _ => CellValue::Null,
        }
    }

    fn structure_generation(&self) -> u64 {
        self.underlying.structure_generation() + self.generation
    }

    fn do_command(&mut self, command: LayerCommand) -> bool {
        self.pump_events();
        self.ensure_current();

        let handled = match command {
            LayerCommand::FreezeColumn { position, toggle } => self.freeze_line(Axis::Column, position, toggle),
            LayerCommand::FreezeRow { position, toggle } => self.freeze_line(Axis::Row, position, toggle),
            LayerCommand::FreezePosition { column, row } => self.freeze_position(column, row),
            LayerCommand::FreezeSelection => self.freeze_selection(),
            LayerCommand::Unfreeze => self.unfreeze(),
            LayerCommand::SetClientArea { axis, extent } => self.set_client_area(axis, extent),
            LayerCommand::Scroll { axis, delta } => self.scroll(axis, delta),
            LayerCommand::ShowPosition { axis, position } => self.show_position(axis, position),
            other => match convert_down(self, other) {
                Some(command) => self.underlying.do_command(command),
                None => false,
            },
        };
        self.pump_events();
        handled
    }

    fn take_events(&mut self) -> Vec<LayerEvent> {
        self.pump_events();
        std::mem::take(&mut self.events)
    }
}
