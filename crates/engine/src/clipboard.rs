//! Internal copy buffer used by the fill handle.

use nattable_core::{CellRect, CellValue, PositionCoordinate};

use crate::layer::Layer;

/// A copied cell and the position it was copied from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardCell {
    pub column: usize,
    pub row: usize,
    pub value: CellValue,
}

/// Copied cells, column-major: `cells[column_offset][row_offset]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalClipboard {
    cells: Vec<Vec<ClipboardCell>>,
}

impl InternalClipboard {
    /// Copy every cell of `rect` from `layer`.
    pub fn capture<L: Layer + ?Sized>(layer: &L, rect: CellRect) -> Self {
        let cells = (rect.column..rect.column + rect.width)
            .map(|column| {
                (rect.row..rect.row + rect.height)
                    .map(|row| ClipboardCell {
                        column,
                        row,
                        value: layer.data_value_by_position(column, row),
                    })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    pub fn from_columns(cells: Vec<Vec<ClipboardCell>>) -> Self {
        Self { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.column_count() == 0 || self.row_count() == 0
    }

    pub fn column_count(&self) -> usize {
        self.cells.len()
    }

    pub fn row_count(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Source position of the top-left copied cell.
    pub fn origin(&self) -> Option<PositionCoordinate> {
        let cell = self.cells.first()?.first()?;
        Some(PositionCoordinate::new(cell.column, cell.row))
    }

    pub fn cell(&self, column_offset: usize, row_offset: usize) -> Option<&ClipboardCell> {
        self.cells.get(column_offset)?.get(row_offset)
    }

    pub fn column(&self, column_offset: usize) -> &[ClipboardCell] {
        self.cells.get(column_offset).map_or(&[], Vec::as_slice)
    }

    /// Cells of one copied row, left to right.
    pub fn row(&self, row_offset: usize) -> Vec<&ClipboardCell> {
        self.cells.iter().filter_map(|column| column.get(row_offset)).collect()
    }
}
