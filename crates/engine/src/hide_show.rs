//! Hide/show layer: drops hidden entries on one axis.
//!
//! Hidden entries are remembered by index, so showing them again puts them
//! wherever their index currently lives below (after reorders, say).

use std::collections::BTreeSet;

use nattable_core::{ranges_from_positions, Axis, CellValue};
use rustc_hash::FxHashMap;

use crate::command::LayerCommand;
use crate::event::{ChangeKind, LayerEvent, StructuralChange, StructuralDiff};
use crate::layer::{convert_down, Layer};

pub struct HideShowLayer<L> {
    underlying: L,
    axis: Axis,
    /// Hidden underlying indexes
    hidden: BTreeSet<usize>,
    /// local position -> underlying position
    visible: Vec<usize>,
    /// underlying position -> local position
    inverse: FxHashMap<usize, usize>,
    generation: u64,
    events: Vec<LayerEvent>,
}

impl<L: Layer> HideShowLayer<L> {
    pub fn new(underlying: L, axis: Axis) -> Self {
        let mut layer = Self {
            underlying,
            axis,
            hidden: BTreeSet::new(),
            visible: Vec::new(),
            inverse: FxHashMap::default(),
            generation: 0,
            events: Vec::new(),
        };
        layer.rebuild_cache();
        layer
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

    /// Hidden indexes in index order.
    pub fn hidden_indexes(&self) -> Vec<usize> {
        self.hidden.iter().copied().collect()
    }

    pub fn is_index_hidden(&self, index: usize) -> bool {
        self.hidden.contains(&index)
    }

    fn rebuild_cache(&mut self) {
        let axis = self.axis;
        let visible: Vec<usize> = (0..self.underlying.count(axis))
            .filter(|&u| {
                self.underlying
                    .index_by_position(axis, u)
                    .map_or(true, |i| !self.hidden.contains(&i))
            })
            .collect();
        self.inverse = visible.iter().enumerate().map(|(local, &u)| (u, local)).collect();
        self.visible = visible;
    }

    fn hide(&mut self, positions: Vec<usize>) -> bool {
        let mut hidden_positions = Vec::new();
        let mut hidden_indexes = Vec::new();
        for p in positions {
            let Some(&u) = self.visible.get(p) else { continue };
            let Some(index) = self.underlying.index_by_position(self.axis, u) else { continue };
            if self.hidden.insert(index) {
                hidden_positions.push(p);
                hidden_indexes.push(index);
            }
        }
        if hidden_positions.is_empty() {
            return true;
        }

        self.rebuild_cache();
        self.generation += 1;

        let diffs = ranges_from_positions(hidden_positions)
            .into_iter()
            .map(|before| StructuralDiff::Delete { before })
            .collect();
        let change = StructuralChange::new(self.axis, ChangeKind::Hide, Some(diffs))
            .with_indexes(ranges_from_positions(hidden_indexes));
        self.events.push(LayerEvent::Structural(change));
        true
    }

    fn show(&mut self, indexes: Vec<usize>) -> bool {
        let shown: Vec<usize> = indexes.into_iter().filter(|i| self.hidden.remove(i)).collect();
        if shown.is_empty() {
            return true;
        }

        self.rebuild_cache();
        self.generation += 1;

        let positions = shown.iter().filter_map(|&i| {
            let u = self.underlying.position_by_index(self.axis, i)?;
            self.inverse.get(&u).copied()
        });
        let diffs = ranges_from_positions(positions)
            .into_iter()
            .map(|after| StructuralDiff::Add { after })
            .collect();
        let change = StructuralChange::new(self.axis, ChangeKind::Show, Some(diffs))
            .with_indexes(ranges_from_positions(shown));
        self.events.push(LayerEvent::Structural(change));
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

        // Real inserts/deletes renumber the indexes we remember
        match change.kind {
            ChangeKind::Insert => {
                for r in &change.indexes {
                    self.hidden = self
                        .hidden
                        .iter()
                        .map(|&i| if i >= r.start { i + r.len() } else { i })
                        .collect();
                }
            }
            ChangeKind::Delete => {
                for r in change.indexes.iter().rev() {
                    self.hidden = self
                        .hidden
                        .iter()
                        .filter(|&&i| !r.contains(i))
                        .map(|&i| if i >= r.end { i - r.len() } else { i })
                        .collect();
                }
            }
            _ => {}
        }
        if change.diffs.is_none() {
            let axis = self.axis;
            let underlying = &self.underlying;
            self.hidden.retain(|&i| underlying.position_by_index(axis, i).is_some());
        }

        let old_inverse = std::mem::take(&mut self.inverse);
        self.rebuild_cache();
        if change.moves_positions() {
            self.generation += 1;
        }

        let inverse = &self.inverse;
        let mapped = change.map(|u| old_inverse.get(&u).copied(), |u| inverse.get(&u).copied());
        self.events.push(LayerEvent::Structural(mapped));
    }

    fn pump_events(&mut self) {
        for event in self.underlying.take_events() {
            self.handle_underlying(event);
        }
    }
}

impl<L: Layer> Layer for HideShowLayer<L> {
    fn count(&self, axis: Axis) -> usize {
        if axis == self.axis {
            self.visible.len()
        } else {
            self.underlying.count(axis)
        }
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
            self.visible.get(position).copied()
        } else {
            (position < self.underlying.count(axis)).then_some(position)
        }
    }

    fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize> {
        if axis == self.axis {
            self.inverse.get(&position).copied()
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
            LayerCommand::Hide { axis, positions } if axis == self.axis => self.hide(positions),
            LayerCommand::ShowAll { axis } if axis == self.axis => {
                let all = self.hidden_indexes();
                self.show(all)
            }
            LayerCommand::ShowIndexes { axis, indexes } if axis == self.axis => self.show(indexes),
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
