//! Position and pixel coordinates shared by every layer.
//!
//! Positions are always relative to one layer. A position that does not exist
//! in a layer is reported as `None`, never as a wrapped-around number.

use serde::{Deserialize, Serialize};

/// Grid axis. Most layer queries are parameterised by it so the column and
/// row code paths stay identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Column,
    Row,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Axis::Column => Axis::Row,
            Axis::Row => Axis::Column,
        }
    }
}

// =============================================================================
// Range
// =============================================================================

/// Half-open interval `[start, end)` over positions or indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end: end.max(start) }
    }

    /// Single-element range.
    pub fn single(at: usize) -> Self {
        Self { start: at, end: at + 1 }
    }

    /// Empty range anchored at `at`.
    pub fn empty_at(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, value: usize) -> bool {
        value >= self.start && value < self.end
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Range::new(r.start, r.end)
    }
}

/// Group positions into sorted, merged contiguous ranges.
///
/// Duplicates are ignored.
pub fn ranges_from_positions<I>(positions: I) -> Vec<Range>
where
    I: IntoIterator<Item = usize>,
{
    let mut sorted: Vec<usize> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<Range> = Vec::new();
    for p in sorted {
        match ranges.last_mut() {
            Some(last) if last.end == p => last.end = p + 1,
            _ => ranges.push(Range::single(p)),
        }
    }
    ranges
}

/// Flatten ranges back into individual positions (ascending, as given).
pub fn positions_from_ranges(ranges: &[Range]) -> Vec<usize> {
    ranges.iter().flat_map(|r| r.iter()).collect()
}

// =============================================================================
// Cell coordinates
// =============================================================================

/// A cell position in some layer's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionCoordinate {
    pub column: usize,
    pub row: usize,
}

impl PositionCoordinate {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    pub fn get(&self, axis: Axis) -> usize {
        match axis {
            Axis::Column => self.column,
            Axis::Row => self.row,
        }
    }

    pub fn with(mut self, axis: Axis, value: usize) -> Self {
        match axis {
            Axis::Column => self.column = value,
            Axis::Row => self.row = value,
        }
        self
    }
}

/// A rectangle of cells in position space: `width` columns by `height` rows
/// starting at (`column`, `row`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub column: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
}

impl CellRect {
    pub fn new(column: usize, row: usize, width: usize, height: usize) -> Self {
        Self { column, row, width, height }
    }

    pub fn single(column: usize, row: usize) -> Self {
        Self::new(column, row, 1, 1)
    }

    /// Rectangle spanning two corner cells, in any order.
    pub fn spanning(a: PositionCoordinate, b: PositionCoordinate) -> Self {
        let column = a.column.min(b.column);
        let row = a.row.min(b.row);
        Self {
            column,
            row,
            width: a.column.max(b.column) - column + 1,
            height: a.row.max(b.row) - row + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, column: usize, row: usize) -> bool {
        column >= self.column
            && column < self.column + self.width
            && row >= self.row
            && row < self.row + self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn range(&self, axis: Axis) -> Range {
        match axis {
            Axis::Column => Range::new(self.column, self.column + self.width),
            Axis::Row => Range::new(self.row, self.row + self.height),
        }
    }

    /// Rebuild from per-axis ranges.
    pub fn from_ranges(columns: Range, rows: Range) -> Self {
        Self::new(columns.start, rows.start, columns.len(), rows.len())
    }

    pub fn with_range(self, axis: Axis, range: Range) -> Self {
        match axis {
            Axis::Column => Self::from_ranges(range, self.range(Axis::Row)),
            Axis::Row => Self::from_ranges(self.range(Axis::Column), range),
        }
    }

    pub fn intersection(&self, other: &CellRect) -> Option<CellRect> {
        let c0 = self.column.max(other.column);
        let r0 = self.row.max(other.row);
        let c1 = (self.column + self.width).min(other.column + other.width);
        let r1 = (self.row + self.height).min(other.row + other.height);
        if c0 < c1 && r0 < r1 {
            Some(CellRect::new(c0, r0, c1 - c0, r1 - r0))
        } else {
            None
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &CellRect) -> CellRect {
        let c0 = self.column.min(other.column);
        let r0 = self.row.min(other.row);
        let c1 = (self.column + self.width).max(other.column + other.width);
        let r1 = (self.row + self.height).max(other.row + other.height);
        CellRect::new(c0, r0, c1 - c0, r1 - r0)
    }

    /// `self` minus `hole`, as up to four disjoint rectangles.
    pub fn subtract(&self, hole: &CellRect) -> Vec<CellRect> {
        let Some(cut) = self.intersection(hole) else {
            return vec![*self];
        };

        let mut parts = Vec::with_capacity(4);
        let right = self.column + self.width;
        let bottom = self.row + self.height;
        let cut_right = cut.column + cut.width;
        let cut_bottom = cut.row + cut.height;

        // Full-width bands above and below the cut
        if cut.row > self.row {
            parts.push(CellRect::new(self.column, self.row, self.width, cut.row - self.row));
        }
        if cut_bottom < bottom {
            parts.push(CellRect::new(self.column, cut_bottom, self.width, bottom - cut_bottom));
        }
        // Left and right of the cut, limited to the cut's rows
        if cut.column > self.column {
            parts.push(CellRect::new(self.column, cut.row, cut.column - self.column, cut.height));
        }
        if cut_right < right {
            parts.push(CellRect::new(cut_right, cut.row, right - cut_right, cut.height));
        }
        parts
    }

    /// Iterate all cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let columns = self.column..self.column + self.width;
        (self.row..self.row + self.height)
            .flat_map(move |r| columns.clone().map(move |c| (c, r)))
    }
}

/// Pixel-space rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn extent(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Column => self.width,
            Axis::Row => self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_from_positions_merges_runs() {
        let ranges = ranges_from_positions([5, 1, 2, 3, 9, 2]);
        assert_eq!(ranges, vec![Range::new(1, 4), Range::new(5, 6), Range::new(9, 10)]);
        assert_eq!(positions_from_ranges(&ranges), vec![1, 2, 3, 5, 9]);
    }

    #[test]
    fn test_range_basics() {
        let r = Range::new(2, 5);
        assert_eq!(r.len(), 3);
        assert!(r.contains(2));
        assert!(!r.contains(5));
        assert!(Range::empty_at(3).is_empty());
        assert!(r.overlaps(&Range::new(4, 8)));
        assert!(!r.overlaps(&Range::new(5, 8)));
    }

    #[test]
    fn test_cell_rect_spanning_normalizes() {
        let rect = CellRect::spanning(PositionCoordinate::new(4, 1), PositionCoordinate::new(2, 3));
        assert_eq!(rect, CellRect::new(2, 1, 3, 3));
        assert_eq!(rect.cell_count(), 9);
    }

    #[test]
    fn test_cell_rect_subtract_center_hole() {
        let outer = CellRect::new(0, 0, 3, 3);
        let parts = outer.subtract(&CellRect::single(1, 1));
        let total: usize = parts.iter().map(|p| p.cell_count()).sum();
        assert_eq!(total, 8);
        for (c, r) in outer.cells() {
            let covered = parts.iter().filter(|p| p.contains(c, r)).count();
            let expected = if (c, r) == (1, 1) { 0 } else { 1 };
            assert_eq!(covered, expected, "cell ({c},{r})");
        }
    }

    #[test]
    fn test_cell_rect_subtract_disjoint() {
        let outer = CellRect::new(0, 0, 2, 2);
        assert_eq!(outer.subtract(&CellRect::new(5, 5, 1, 1)), vec![outer]);
    }
}
