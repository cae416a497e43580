//! Reorder layer: a permutation of the underlying positions on one axis.

use nattable_core::{ranges_from_positions, Axis, CellValue, Range};

use crate::command::LayerCommand;
use crate::event::{ChangeKind, LayerEvent, StructuralChange, StructuralDiff};
use crate::layer::{convert_down, Layer};

pub struct ReorderLayer<L> {
    underlying: L,
    axis: Axis,
    /// local position -> underlying position
    order: Vec<usize>,
    /// underlying position -> local position
    inverse: Vec<usize>,
    generation: u64,
    events: Vec<LayerEvent>,
}

impl<L: Layer> ReorderLayer<L> {
    pub fn new(underlying: L, axis: Axis) -> Self {
        let count = underlying.count(axis);
        Self {
            underlying,
            axis,
            order: (0..count).collect(),
            inverse: (0..count).collect(),
            generation: 0,
            events: Vec::new(),
        }
    }

    pub fn underlying(&self) -> &L {
        &self.underlying
    }

    pub fn underlying_mut(&mut self) -> &mut L {
        &mut self.underlying
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Underlying positions in local order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn is_reordered(&self) -> bool {
        self.order.iter().enumerate().any(|(i, &u)| i != u)
    }

    fn rebuild_inverse(&mut self) {
        let size = self.order.iter().map(|&u| u + 1).max().unwrap_or(0);
        let mut inverse = vec![usize::MAX; size];
        for (local, &u) in self.order.iter().enumerate() {
            inverse[u] = local;
        }
        self.inverse = inverse;
    }

    fn reset_identity(&mut self) {
        let count = self.underlying.count(self.axis);
        self.order = (0..count).collect();
        self.rebuild_inverse();
    }

    fn reorder(&mut self, from: Vec<usize>, to: usize) -> bool {
        let count = self.order.len();
        let mut moved: Vec<usize> = from.into_iter().filter(|&p| p < count).collect();
        moved.sort_unstable();
        moved.dedup();
        if moved.is_empty() || to > count {
            return false;
        }

        let is_moved = |p: &usize| moved.binary_search(p).is_ok();
        let insert_at = (0..to).filter(|p| !is_moved(p)).count();
        let moved_items: Vec<usize> = moved.iter().map(|&p| self.order[p]).collect();
        let mut order: Vec<usize> = (0..count)
            .filter(|p| !is_moved(p))
            .map(|p| self.order[p])
            .collect();
        order.splice(insert_at..insert_at, moved_items);

        if order == self.order {
            return true;
        }
        self.order = order;
        self.rebuild_inverse();
        self.generation += 1;

        let mut diffs: Vec<StructuralDiff> = ranges_from_positions(moved.iter().copied())
            .into_iter()
            .map(|before| StructuralDiff::Delete { before })
            .collect();
        diffs.push(StructuralDiff::Add { after: Range::new(insert_at, insert_at + moved.len()) });
        self.events.push(LayerEvent::Structural(StructuralChange::new(
            self.axis,
            ChangeKind::Reorder,
            Some(diffs),
        )));
        true
    }

    fn reset_order(&mut self) -> bool {
        if !self.is_reordered() {
            return true;
        }
        self.reset_identity();
        self.generation += 1;
        self.events.push(LayerEvent::Structural(StructuralChange::new(self.axis, ChangeKind::Reorder, None)));
        true
    }

    fn handle_underlying(&mut self, event: LayerEvent) {
        let change = match event {
            LayerEvent::Structural(change) if change.axis == self.axis => change,
            other => {
                let event = other.map_cells(|axis, p| self.underlying_to_local(axis, p));
                self.events.push(event);
                return;
            }
        };

        let old_inverse = self.inverse.clone();
        if change.diffs.is_none() {
            if self.order.len() != self.underlying.count(self.axis) {
                self.reset_identity();
                self.generation += 1;
            }
        } else if change.moves_positions() && change.kind != ChangeKind::Reorder {
            let mut order: Vec<usize> =
                self.order.iter().filter_map(|&u| change.remap_position(u)).collect();
            // New entries go right after their underlying predecessor
            for u in change.added_ranges().iter().flat_map(Range::iter) {
                let at = match u.checked_sub(1) {
                    None => 0,
                    Some(prev) => order.iter().position(|&x| x == prev).map_or(order.len(), |p| p + 1),
                };
                order.insert(at, u);
            }
            if order.len() == self.underlying.count(self.axis) {
                self.order = order;
                self.rebuild_inverse();
            } else {
                self.reset_identity();
            }
            self.generation += 1;
        }

        let inverse = &self.inverse;
        let lookup = |table: &[usize], u: usize| table.get(u).copied().filter(|&l| l != usize::MAX);
        let mapped = change.map(|u| lookup(old_inverse.as_slice(), u), |u| lookup(inverse.as_slice(), u));
        self.events.push(LayerEvent::Structural(mapped));
    }

    fn pump_events(&mut self) {
        for event in self.underlying.take_events() {
            self.handle_underlying(event);
        }
    }
}

impl<L: Layer> Layer for ReorderLayer<L> {
    fn count(&self, axis: Axis) -> usize {
        self.underlying.count(axis)
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
        if axis == self.axis {
            self.order.get(position).copied()
        } else {
            (position < self.underlying.count(axis)).then_some(position)
        }
    }

    fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize> {
        if axis == self.axis {
            self.inverse.get(position).copied().filter(|&l| l != usize::MAX)
        } else {
            (position < self.underlying.count(axis)).then_some(position)
        }
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
        let handled = match command {
            LayerCommand::Reorder { axis, from, to } if axis == self.axis => self.reorder(from, to),
            LayerCommand::ResetOrder { axis } if axis == self.axis => self.reset_order(),
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
