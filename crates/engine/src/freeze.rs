//! Freeze layer: the pinned block of leading columns and rows.
//!
//! The frozen span of each axis is an inclusive `first..=last` range of
//! positions of the layer below. The freeze layer does not own that layer;
//! the composite freeze layer passes it in for every query that needs it.
//!
//! Structural changes move the span positionally. Deletes shrink it, adds
//! inside it grow it, and an add directly after `last` belongs to the
//! viewport. Changes of unknown extent, and a snapshot stamped with an old
//! structure generation, keep the start and size the span by the frozen
//! indexes still present.

use std::ops::RangeInclusive;

use nattable_core::Axis;

use crate::event::{ChangeKind, StructuralChange};
use crate::layer::Layer;

#[derive(Debug, Clone, Default, PartialEq)]
struct AxisFreeze {
    first: usize,
    last: Option<usize>,
    /// Base indexes of the frozen positions
    snapshot: Vec<usize>,
    /// Indexes that were frozen when a hide collapsed the axis
    collapsed: Vec<usize>,
    collapsed_first: usize,
}

impl AxisFreeze {
    fn span(&self) -> Option<RangeInclusive<usize>> {
        self.last.map(|last| self.first..=last)
    }

    fn count(&self) -> usize {
        self.last.map_or(0, |last| last + 1 - self.first)
    }

    fn set_span(&mut self, first: usize, last: Option<usize>) {
        self.first = first;
        self.last = last.filter(|&l| l >= first);
    }

    fn refresh_snapshot<L: Layer + ?Sized>(&mut self, axis: Axis, underlying: &L) {
        self.snapshot = match self.span() {
            Some(span) => span.filter_map(|p| underlying.index_by_position(axis, p)).collect(),
            None => Vec::new(),
        };
    }

    /// Span starting at `first` with one slot per index still present
    /// below, clamped to the layer.
    fn resolve<L: Layer + ?Sized>(axis: Axis, first: usize, indexes: &[usize], underlying: &L) -> Option<(usize, usize)> {
        let present = indexes
            .iter()
            .filter(|&&i| underlying.position_by_index(axis, i).is_some())
            .count();
        let max = underlying.count(axis).checked_sub(1)?;
        if present == 0 {
            return None;
        }
        let first = first.min(max);
        Some((first, (first + present - 1).min(max)))
    }

    fn resync<L: Layer + ?Sized>(&mut self, axis: Axis, underlying: &L) {
        if self.last.is_none() {
            return;
        }
        match Self::resolve(axis, self.first, &self.snapshot, underlying) {
            Some((first, last)) => self.set_span(first, Some(last)),
            None => self.set_span(0, None),
        }
    }

    /// Apply the diffs positionally. Returns whether the span collapsed.
    fn apply_diffs(&mut self, change: &StructuralChange, count: usize) -> bool {
        let Some(last) = self.last else {
            return false;
        };
        let mut first = self.first as i64;
        let mut last = last as i64;

        for r in change.deleted_ranges().iter().rev() {
            let (start, end) = (r.start as i64, r.end as i64);
            let before = (end.min(first) - start).max(0);
            let inside = (end.min(last + 1) - start.max(first)).max(0);
            first -= before;
            last -= before + inside;
        }
        if last < first {
            self.set_span(0, None);
            return true;
        }

        for r in change.added_ranges() {
            let (start, len) = (r.start as i64, r.len() as i64);
            if start < first {
                first += len;
                last += len;
            } else if start <= last {
                last += len;
            }
        }

        let last = last.min(count as i64 - 1);
        if last < first {
            self.set_span(0, None);
            return true;
        }
        self.set_span(first as usize, Some(last as usize));
        false
    }
}

#[derive(Debug, Clone, Default)]
pub struct FreezeLayer {
    columns: AxisFreeze,
    rows: AxisFreeze,
    /// Structure generation of the layer below when the snapshot was taken
    stamp: u64,
}

impl FreezeLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn axis(&self, axis: Axis) -> &AxisFreeze {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisFreeze {
        match axis {
            Axis::Column => &mut self.columns,
            Axis::Row => &mut self.rows,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.columns.last.is_some() || self.rows.last.is_some()
    }

    /// Frozen positions of the layer below, if the axis is frozen.
    pub fn span(&self, axis: Axis) -> Option<RangeInclusive<usize>> {
        self.axis(axis).span()
    }

    pub fn count(&self, axis: Axis) -> usize {
        self.axis(axis).count()
    }

    pub fn top_left_position(&self, axis: Axis) -> usize {
        self.axis(axis).first
    }

    pub fn bottom_right_position(&self, axis: Axis) -> Option<usize> {
        self.axis(axis).last
    }

    /// Moves the start of the span; the end stays unless it would precede it.
    pub fn set_top_left_position<L: Layer + ?Sized>(&mut self, axis: Axis, position: usize, underlying: &L) {
        let last = self.axis(axis).last;
        self.set_span(axis, position, last, underlying);
    }

    /// `None` unfreezes the axis.
    pub fn set_bottom_right_position<L: Layer + ?Sized>(
        &mut self,
        axis: Axis,
        position: Option<usize>,
        underlying: &L,
    ) {
        let first = self.axis(axis).first;
        self.set_span(axis, first, position, underlying);
    }

    /// Freeze `first..=last`, clamped to the layer below. Clears any
    /// collapse memory.
    pub fn set_span<L: Layer + ?Sized>(&mut self, axis: Axis, first: usize, last: Option<usize>, underlying: &L) {
        let count = underlying.count(axis);
        let last = last.zip(count.checked_sub(1)).map(|(l, max)| l.min(max));
        let state = self.axis_mut(axis);
        state.set_span(first, last);
        state.collapsed.clear();
        state.refresh_snapshot(axis, underlying);
        self.stamp = underlying.structure_generation();
    }

    pub fn unfreeze(&mut self, axis: Axis) {
        let state = self.axis_mut(axis);
        state.set_span(0, None);
        state.snapshot.clear();
        state.collapsed.clear();
    }

    pub fn local_to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        let state = self.axis(axis);
        (position < state.count()).then(|| state.first + position)
    }

    pub fn underlying_to_local(&self, axis: Axis, position: usize) -> Option<usize> {
        let state = self.axis(axis);
        state
            .span()
            .filter(|span| span.contains(&position))
            .map(|_| position - state.first)
    }

    pub fn is_stale(&self, generation: u64) -> bool {
        self.stamp != generation
    }

    /// Re-resolve both spans from the frozen indexes.
    pub fn resync<L: Layer + ?Sized>(&mut self, underlying: &L) {
        for axis in [Axis::Column, Axis::Row] {
            let state = self.axis_mut(axis);
            state.resync(axis, underlying);
            state.refresh_snapshot(axis, underlying);
        }
        self.stamp = underlying.structure_generation();
    }

    /// Follow a structural change of the layer below. `underlying` already
    /// reflects the change.
    pub fn handle_structural<L: Layer + ?Sized>(&mut self, change: &StructuralChange, underlying: &L) {
        let axis = change.axis;
        let count = underlying.count(axis);
        let state = self.axis_mut(axis);

        match (&change.diffs, state.last) {
            (_, None) => {
                if change.kind == ChangeKind::Show && !state.collapsed.is_empty() {
                    let restored = AxisFreeze::resolve(axis, state.collapsed_first, &state.collapsed, underlying);
                    if let Some((first, last)) = restored {
                        state.set_span(first, Some(last));
                        state.collapsed.clear();
                    }
                }
            }
            (None, Some(_)) => state.resync(axis, underlying),
            (Some(_), Some(_)) => {
                let frozen = state.snapshot.clone();
                let first = state.first;
                let deleted_before: usize =
                    change.deleted_ranges().iter().map(|r| r.end.min(first).saturating_sub(r.start)).sum();
                if state.apply_diffs(change, count) && change.kind == ChangeKind::Hide {
                    state.collapsed = frozen;
                    state.collapsed_first = first - deleted_before;
                }
            }
        }
        state.refresh_snapshot(axis, underlying);
    }

    pub fn set_stamp(&mut self, generation: u64) {
        self.stamp = generation;
    }
}
