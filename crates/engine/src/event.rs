//! Events travel up the layer stack.
//!
//! A layer drains its underlying layer's queue after every command, updates
//! its own bookkeeping from each event and re-queues the event translated into
//! its own position space.

use nattable_core::{ranges_from_positions, Axis, PositionCoordinate, Range};

/// One piece of a structural change.
///
/// `Delete` ranges are in the layout before the change, `Add` ranges in the
/// layout after it. `Change` marks positions that stay put but differ
/// (resize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralDiff {
    Add { after: Range },
    Delete { before: Range },
    Change { range: Range },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Real data rows/columns added.
    Insert,
    /// Real data rows/columns removed.
    Delete,
    Hide,
    Show,
    Reorder,
    Resize,
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuralChange {
    pub axis: Axis,
    pub kind: ChangeKind,
    /// `None` means the extent is unknown and derived state must be rebuilt.
    pub diffs: Option<Vec<StructuralDiff>>,
    /// Base index ranges for `Insert`/`Delete` (and the hidden indexes for `Hide`).
    pub indexes: Vec<Range>,
}

impl StructuralChange {
    pub fn new(axis: Axis, kind: ChangeKind, diffs: Option<Vec<StructuralDiff>>) -> Self {
        Self { axis, kind, diffs, indexes: Vec::new() }
    }

    pub fn refresh(axis: Axis) -> Self {
        Self::new(axis, ChangeKind::Refresh, None)
    }

    pub fn with_indexes(mut self, indexes: Vec<Range>) -> Self {
        self.indexes = indexes;
        self
    }

    /// Removed ranges (before layout), ascending.
    pub fn deleted_ranges(&self) -> Vec<Range> {
        let mut ranges: Vec<Range> = self
            .diffs
            .iter()
            .flatten()
            .filter_map(|d| match d {
                StructuralDiff::Delete { before } => Some(*before),
                _ => None,
            })
            .collect();
        ranges.sort();
        ranges
    }

    /// Added ranges (after layout), ascending.
    pub fn added_ranges(&self) -> Vec<Range> {
        let mut ranges: Vec<Range> = self
            .diffs
            .iter()
            .flatten()
            .filter_map(|d| match d {
                StructuralDiff::Add { after } => Some(*after),
                _ => None,
            })
            .collect();
        ranges.sort();
        ranges
    }

    /// True when positions may have moved: unknown extent, or any add/delete.
    pub fn moves_positions(&self) -> bool {
        match &self.diffs {
            None => true,
            Some(diffs) => diffs.iter().any(|d| !matches!(d, StructuralDiff::Change { .. })),
        }
    }

    /// Where `position` lands after the change. `None` when it was removed or
    /// the extent is unknown.
    pub fn remap_position(&self, position: usize) -> Option<usize> {
        self.diffs.as_ref()?;
        let mut p = position;
        for r in self.deleted_ranges().iter().rev() {
            if r.contains(p) {
                return None;
            }
            if p >= r.end {
                p -= r.len();
            }
        }
        for r in self.added_ranges() {
            if p >= r.start {
                p += r.len();
            }
        }
        Some(p)
    }

    /// Like [`remap_position`](Self::remap_position), but a removed position
    /// resolves to whatever slid into its place.
    pub fn shift_position(&self, position: usize) -> usize {
        if self.diffs.is_none() {
            return position;
        }
        let mut p = position;
        for r in self.deleted_ranges().iter().rev() {
            if r.contains(p) {
                p = r.start;
            } else if p >= r.end {
                p -= r.len();
            }
        }
        for r in self.added_ranges() {
            if p >= r.start {
                p += r.len();
            }
        }
        p
    }

    /// Translate the diffs into another position space. `before` maps the
    /// delete ranges, `after` maps adds and changes. Unmapped positions drop
    /// out; the ranges are regrouped.
    pub fn map<B, A>(&self, before: B, after: A) -> StructuralChange
    where
        B: Fn(usize) -> Option<usize>,
        A: Fn(usize) -> Option<usize>,
    {
        let diffs = self.diffs.as_ref().map(|diffs| {
            let mut mapped = Vec::new();
            for diff in diffs {
                match diff {
                    StructuralDiff::Delete { before: r } => mapped.extend(
                        ranges_from_positions(r.iter().filter_map(&before))
                            .into_iter()
                            .map(|before| StructuralDiff::Delete { before }),
                    ),
                    StructuralDiff::Add { after: r } => mapped.extend(
                        ranges_from_positions(r.iter().filter_map(&after))
                            .into_iter()
                            .map(|after| StructuralDiff::Add { after }),
                    ),
                    StructuralDiff::Change { range } => mapped.extend(
                        ranges_from_positions(range.iter().filter_map(&after))
                            .into_iter()
                            .map(|range| StructuralDiff::Change { range }),
                    ),
                }
            }
            mapped
        });
        StructuralChange { axis: self.axis, kind: self.kind, diffs, indexes: self.indexes.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    Structural(StructuralChange),
    /// Cells whose values changed, in the emitting layer's positions.
    CellsUpdated { cells: Vec<PositionCoordinate> },
    SelectionChanged,
    Freeze,
    Unfreeze,
    VisualRefresh,
}

impl LayerEvent {
    pub fn as_structural(&self) -> Option<&StructuralChange> {
        match self {
            LayerEvent::Structural(change) => Some(change),
            _ => None,
        }
    }

    /// Translate an event from the underlying layer's positions. Structural
    /// diffs are mapped by the caller, who knows the old layout.
    pub fn map_cells<F>(self, to_local: F) -> LayerEvent
    where
        F: Fn(Axis, usize) -> Option<usize>,
    {
        match self {
            LayerEvent::CellsUpdated { cells } => LayerEvent::CellsUpdated {
                cells: cells
                    .into_iter()
                    .filter_map(|c| {
                        Some(PositionCoordinate::new(
                            to_local(Axis::Column, c.column)?,
                            to_local(Axis::Row, c.row)?,
                        ))
                    })
                    .collect(),
            },
            other => other,
        }
    }
}

/// Collects drained events for inspection.
#[derive(Default)]
pub struct EventCollector {
    events: Vec<LayerEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = LayerEvent>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[LayerEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn structural(&self) -> Vec<&StructuralChange> {
        self.events.iter().filter_map(LayerEvent::as_structural).collect()
    }

    pub fn count_of(&self, wanted: &LayerEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }
}
