//! Commands travel down the layer stack.
//!
//! Positions inside a command are relative to the layer the command is
//! currently being handed to. A layer that does not handle a command converts
//! its positions with [`LayerCommand::map_positions`] and passes it on.

use nattable_core::{Axis, CellRect, CellValue, FillDirection, FillOperation};

use crate::list::ListChange;

/// One cell write inside an [`LayerCommand::UpdateCells`] batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub column: usize,
    pub row: usize,
    pub value: CellValue,
}

impl CellUpdate {
    pub fn new(column: usize, row: usize, value: impl Into<CellValue>) -> Self {
        Self { column, row, value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerCommand {
    // Structure
    Hide { axis: Axis, positions: Vec<usize> },
    ShowAll { axis: Axis },
    /// Indexes, not positions: hidden entries have no position.
    ShowIndexes { axis: Axis, indexes: Vec<usize> },
    /// Move `from` into the gap `to` (`0..=count`) of the layout before the move.
    Reorder { axis: Axis, from: Vec<usize>, to: usize },
    ResetOrder { axis: Axis },
    Resize { axis: Axis, position: usize, size: u32 },
    ConfigureScaling { dpi_factor: f64 },
    StructuralRefresh,
    RowsChanged(ListChange),

    // Data
    UpdateCells { updates: Vec<CellUpdate> },

    // Selection
    SelectCell { column: usize, row: usize, shift: bool, ctrl: bool },
    SelectRegion { rect: CellRect, shift: bool, ctrl: bool },
    SelectAll,
    SelectColumn { position: usize, shift: bool, ctrl: bool },
    SelectRow { position: usize, shift: bool, ctrl: bool },
    ClearSelection,

    // Clipboard and fill handle
    CopySelection,
    ClearClipboard,
    SetFillHandleRegion { rect: CellRect },
    ClearFillHandleRegion,
    FillHandlePaste { operation: FillOperation, direction: FillDirection },

    // Freeze
    FreezeColumn { position: usize, toggle: bool },
    FreezeRow { position: usize, toggle: bool },
    FreezePosition { column: usize, row: usize },
    FreezeSelection,
    Unfreeze,

    // Viewport
    /// `None` removes the limit.
    SetClientArea { axis: Axis, extent: Option<u32> },
    Scroll { axis: Axis, delta: i64 },
    /// Position in the scrollable layer's space (below the freeze split).
    ShowPosition { axis: Axis, position: usize },
}

impl LayerCommand {
    /// Rewrite every position in the command.
    ///
    /// `position` maps a single position, `gap` maps an insertion gap. Returns
    /// `None` when nothing addressable is left, so the command cannot be
    /// handled below.
    pub fn map_positions<P, G>(self, position: P, gap: G) -> Option<LayerCommand>
    where
        P: Fn(Axis, usize) -> Option<usize>,
        G: Fn(Axis, usize) -> Option<usize>,
    {
        let map_rect = |rect: CellRect| -> Option<CellRect> {
            let columns = map_range(&position, Axis::Column, rect.column, rect.width)?;
            let rows = map_range(&position, Axis::Row, rect.row, rect.height)?;
            Some(CellRect::new(columns.0, rows.0, columns.1, rows.1))
        };

        let mapped = match self {
            LayerCommand::Hide { axis, positions } => {
                let positions: Vec<usize> =
                    positions.into_iter().filter_map(|p| position(axis, p)).collect();
                if positions.is_empty() {
                    return None;
                }
                LayerCommand::Hide { axis, positions }
            }
            LayerCommand::Reorder { axis, from, to } => {
                let from: Vec<usize> = from.into_iter().filter_map(|p| position(axis, p)).collect();
                if from.is_empty() {
                    return None;
                }
                LayerCommand::Reorder { axis, from, to: gap(axis, to)? }
            }
            LayerCommand::Resize { axis, position: p, size } => {
                LayerCommand::Resize { axis, position: position(axis, p)?, size }
            }
            LayerCommand::UpdateCells { updates } => {
                let updates: Vec<CellUpdate> = updates
                    .into_iter()
                    .filter_map(|u| {
                        Some(CellUpdate {
                            column: position(Axis::Column, u.column)?,
                            row: position(Axis::Row, u.row)?,
                            value: u.value,
                        })
                    })
                    .collect();
                if updates.is_empty() {
                    return None;
                }
                LayerCommand::UpdateCells { updates }
            }
            LayerCommand::SelectCell { column, row, shift, ctrl } => LayerCommand::SelectCell {
                column: position(Axis::Column, column)?,
                row: position(Axis::Row, row)?,
                shift,
                ctrl,
            },
            LayerCommand::SelectRegion { rect, shift, ctrl } => {
                LayerCommand::SelectRegion { rect: map_rect(rect)?, shift, ctrl }
            }
            LayerCommand::SelectColumn { position: p, shift, ctrl } => {
                LayerCommand::SelectColumn { position: position(Axis::Column, p)?, shift, ctrl }
            }
            LayerCommand::SelectRow { position: p, shift, ctrl } => {
                LayerCommand::SelectRow { position: position(Axis::Row, p)?, shift, ctrl }
            }
            LayerCommand::SetFillHandleRegion { rect } => {
                LayerCommand::SetFillHandleRegion { rect: map_rect(rect)? }
            }
            LayerCommand::FreezeColumn { position: p, toggle } => {
                LayerCommand::FreezeColumn { position: position(Axis::Column, p)?, toggle }
            }
            LayerCommand::FreezeRow { position: p, toggle } => {
                LayerCommand::FreezeRow { position: position(Axis::Row, p)?, toggle }
            }
            LayerCommand::FreezePosition { column, row } => LayerCommand::FreezePosition {
                column: position(Axis::Column, column)?,
                row: position(Axis::Row, row)?,
            },
            LayerCommand::ShowPosition { axis, position: p } => {
                LayerCommand::ShowPosition { axis, position: position(axis, p)? }
            }
            other => other,
        };
        Some(mapped)
    }
}

/// Map a run of positions and return the (start, length) of the smallest
/// run covering every mapped position.
fn map_range<P>(position: &P, axis: Axis, start: usize, len: usize) -> Option<(usize, usize)>
where
    P: Fn(Axis, usize) -> Option<usize>,
{
    let mapped: Vec<usize> = (start..start + len).filter_map(|p| position(axis, p)).collect();
    let min = *mapped.iter().min()?;
    let max = *mapped.iter().max()?;
    Some((min, max - min + 1))
}
