//! Fill handle: extend copied cells over a target region.
//!
//! Every target cell takes the copied cell at the same offset modulo the copy
//! shape, measured from the copy origin, so the source tiles outward in both
//! directions. With SERIES, each copied line along the drag axis that has a
//! constant step is extrapolated instead:
//!
//!   value(target) = value(edge) + step * (target - edge)
//!
//! where `edge` is the last copied cell of the line for targets past it and
//! the first copied cell for targets before it. Calendar steps clamp at month
//! ends, so every target continues from the edge rather than from its tiled
//! source cell. Lines without a usable step
//! (fewer than two values, nulls, mixed types, non-numeric, irregular)
//! fall back to COPY.

use nattable_core::{Axis, CalendarField, CellRect, CellValue, FillDirection, FillOperation};
use rust_decimal::Decimal;

use crate::clipboard::{ClipboardCell, InternalClipboard};
use crate::command::CellUpdate;

/// Constant difference between neighbouring values of a source line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesStep {
    Integer(i128),
    Decimal(Decimal),
    /// Units of the configured calendar field
    Calendar(i64),
}

/// Constant step of `values`, if there is one.
pub fn detect_step(values: &[CellValue], field: CalendarField) -> Option<SeriesStep> {
    let first = values.first()?;
    if values.len() < 2 || values.iter().any(|v| v.is_null() || !v.same_type(first)) {
        return None;
    }

    if first.is_integral() {
        let ints: Vec<i128> = values.iter().map(CellValue::as_i128).collect::<Option<_>>()?;
        let step = ints[1].checked_sub(ints[0])?;
        let constant = ints.windows(2).all(|w| w[1].checked_sub(w[0]) == Some(step));
        return constant.then_some(SeriesStep::Integer(step));
    }

    match first {
        CellValue::Float(_) | CellValue::Double(_) | CellValue::BigDecimal(_) => {
            let decimals: Vec<Decimal> =
                values.iter().map(CellValue::to_decimal).collect::<Option<_>>()?;
            let step = decimals[1].checked_sub(decimals[0])?;
            let constant = decimals.windows(2).all(|w| w[1].checked_sub(w[0]) == Some(step));
            constant.then_some(SeriesStep::Decimal(step))
        }
        CellValue::Date(_) => {
            let dates: Vec<_> = values
                .iter()
                .filter_map(|v| match v {
                    CellValue::Date(d) => Some(*d),
                    _ => None,
                })
                .collect();
            let step = field.difference(dates[0], dates[1])?;
            let constant = dates.windows(2).all(|w| field.difference(w[0], w[1]) == Some(step));
            constant.then_some(SeriesStep::Calendar(step))
        }
        _ => None,
    }
}

/// `value` moved `distance` steps. `None` when the result does not fit the
/// value's type.
pub fn step_value(value: &CellValue, step: SeriesStep, distance: i64, field: CalendarField) -> Option<CellValue> {
    match step {
        SeriesStep::Integer(step) => {
            let next = value.as_i128()?.checked_add(step.checked_mul(distance as i128)?)?;
            value.integral_like(next)
        }
        SeriesStep::Decimal(step) => {
            let next = value.to_decimal()?.checked_add(step.checked_mul(Decimal::from(distance))?)?;
            value.decimal_like(next)
        }
        SeriesStep::Calendar(units) => match value {
            CellValue::Date(d) => field.add(*d, units.checked_mul(distance)?).map(CellValue::Date),
            _ => None,
        },
    }
}

/// Copied cell a series target on `line` continues from, with the distance to
/// it along `axis`. Targets inside the copied span continue from themselves.
fn series_edge(
    clipboard: &InternalClipboard,
    axis: Axis,
    line: usize,
    column: usize,
    row: usize,
) -> Option<(&ClipboardCell, i64)> {
    let (first, last, target) = match axis {
        Axis::Row => (
            clipboard.cell(line, 0)?,
            clipboard.cell(line, clipboard.row_count().checked_sub(1)?)?,
            row,
        ),
        Axis::Column => (
            clipboard.cell(0, line)?,
            clipboard.cell(clipboard.column_count().checked_sub(1)?, line)?,
            column,
        ),
    };
    let along = |cell: &ClipboardCell| match axis {
        Axis::Row => cell.row,
        Axis::Column => cell.column,
    };

    if target > along(last) {
        Some((last, target as i64 - along(last) as i64))
    } else if target < along(first) {
        Some((first, target as i64 - along(first) as i64))
    } else {
        let offset = target - along(first);
        let cell = match axis {
            Axis::Row => clipboard.cell(line, offset)?,
            Axis::Column => clipboard.cell(offset, line)?,
        };
        Some((cell, 0))
    }
}

fn line_values(cells: &[&ClipboardCell]) -> Vec<CellValue> {
    cells.iter().map(|c| c.value.clone()).collect()
}

/// Values to write for every cell of `region`.
///
/// Cells whose series value overflows are left out.
pub fn compute_fill(
    clipboard: &InternalClipboard,
    region: CellRect,
    operation: FillOperation,
    direction: FillDirection,
    field: CalendarField,
) -> Vec<CellUpdate> {
    let Some(origin) = clipboard.origin() else {
        return Vec::new();
    };
    let source_columns = clipboard.column_count() as i64;
    let source_rows = clipboard.row_count() as i64;
    let axis = direction.axis();

    // One step per copied line along the drag axis
    let steps: Vec<Option<SeriesStep>> = match (operation, axis) {
        (FillOperation::Copy, _) => Vec::new(),
        (FillOperation::Series, Axis::Row) => (0..clipboard.column_count())
            .map(|c| {
                let column: Vec<&ClipboardCell> = clipboard.column(c).iter().collect();
                detect_step(&line_values(&column), field)
            })
            .collect(),
        (FillOperation::Series, Axis::Column) => (0..clipboard.row_count())
            .map(|r| detect_step(&line_values(&clipboard.row(r)), field))
            .collect(),
    };

    let mut updates = Vec::with_capacity(region.cell_count());
    for (column, row) in region.cells() {
        let source_column = (column as i64 - origin.column as i64).rem_euclid(source_columns) as usize;
        let source_row = (row as i64 - origin.row as i64).rem_euclid(source_rows) as usize;
        let Some(source) = clipboard.cell(source_column, source_row) else {
            continue;
        };

        let line = match axis {
            Axis::Row => source_column,
            Axis::Column => source_row,
        };
        let value = match steps.get(line).copied().flatten() {
            Some(step) => match series_edge(clipboard, axis, line, column, row)
                .and_then(|(edge, distance)| step_value(&edge.value, step, distance, field))
            {
                Some(value) => value,
                None => {
                    log::debug!("fill of ({column}, {row}) skipped: series value out of range");
                    continue;
                }
            },
            None => source.value.clone(),
        };
        updates.push(CellUpdate::new(column, row, value));
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    /// One copied column starting at (`column`, `row`).
    fn column_clip(column: usize, row: usize, values: Vec<CellValue>) -> InternalClipboard {
        InternalClipboard::from_columns(vec![values
            .into_iter()
            .enumerate()
            .map(|(i, value)| ClipboardCell { column, row: row + i, value })
            .collect()])
    }

    fn values_of(updates: &[CellUpdate]) -> Vec<CellValue> {
        updates.iter().map(|u| u.value.clone()).collect()
    }

    fn ints(values: &[i32]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Int(v)).collect()
    }

    #[test]
    fn test_detect_step() {
        let field = CalendarField::Day;
        assert_eq!(detect_step(&ints(&[1, 3, 5]), field), Some(SeriesStep::Integer(2)));
        assert_eq!(detect_step(&ints(&[1, 3, 6]), field), None);
        assert_eq!(detect_step(&ints(&[4]), field), None);
        assert_eq!(detect_step(&[CellValue::Int(1), CellValue::Long(2)], field), None);
        assert_eq!(detect_step(&[CellValue::Int(1), CellValue::Null], field), None);
        assert_eq!(detect_step(&[CellValue::from("a"), CellValue::from("b")], field), None);
        assert_eq!(
            detect_step(&[CellValue::Double(0.1), CellValue::Double(0.3)], field),
            Some(SeriesStep::Decimal(Decimal::from_str("0.2").unwrap()))
        );
    }

    #[test]
    fn test_series_down_extends_odd_numbers() {
        let clip = column_clip(0, 4, ints(&[1, 3, 5]));
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 4, 1, 6),
            FillOperation::Series,
            FillDirection::Down,
            CalendarField::Day,
        );
        assert_eq!(values_of(&updates), ints(&[1, 3, 5, 7, 9, 11]));
        assert_eq!(updates[5].row, 9);
    }

    #[test]
    fn test_series_with_null_copies() {
        let clip = column_clip(0, 4, vec![CellValue::Int(1), CellValue::Null]);
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 4, 1, 6),
            FillOperation::Series,
            FillDirection::Down,
            CalendarField::Day,
        );
        assert_eq!(
            values_of(&updates),
            vec![
                CellValue::Int(1),
                CellValue::Null,
                CellValue::Int(1),
                CellValue::Null,
                CellValue::Int(1),
                CellValue::Null,
            ]
        );
    }

    #[test]
    fn test_series_up_extrapolates_backwards() {
        let clip = column_clip(0, 4, ints(&[1, 3, 5]));
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 1, 1, 6),
            FillOperation::Series,
            FillDirection::Up,
            CalendarField::Day,
        );
        assert_eq!(values_of(&updates), ints(&[-5, -3, -1, 1, 3, 5]));
    }

    #[test]
    fn test_series_right_per_row() {
        // Two copied rows: 10, 20 and 1, 1 (constant, step 0)
        let clip = InternalClipboard::from_columns(vec![
            vec![
                ClipboardCell { column: 0, row: 0, value: CellValue::Long(10) },
                ClipboardCell { column: 0, row: 1, value: CellValue::Long(1) },
            ],
            vec![
                ClipboardCell { column: 1, row: 0, value: CellValue::Long(20) },
                ClipboardCell { column: 1, row: 1, value: CellValue::Long(1) },
            ],
        ]);
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 0, 4, 2),
            FillOperation::Series,
            FillDirection::Right,
            CalendarField::Day,
        );
        let row0: Vec<CellValue> = updates.iter().filter(|u| u.row == 0).map(|u| u.value.clone()).collect();
        let row1: Vec<CellValue> = updates.iter().filter(|u| u.row == 1).map(|u| u.value.clone()).collect();
        assert_eq!(
            row0,
            vec![CellValue::Long(10), CellValue::Long(20), CellValue::Long(30), CellValue::Long(40)]
        );
        assert_eq!(row1, vec![CellValue::Long(1); 4]);
    }

    #[test]
    fn test_copy_tiles_the_source() {
        let clip = column_clip(2, 2, vec![CellValue::from("a"), CellValue::from("b")]);
        let updates = compute_fill(
            &clip,
            CellRect::new(2, 1, 1, 5),
            FillOperation::Copy,
            FillDirection::Down,
            CalendarField::Day,
        );
        let expected: Vec<CellValue> = ["b", "a", "b", "a", "b"].iter().map(|&s| s.into()).collect();
        assert_eq!(values_of(&updates), expected);
    }

    #[test]
    fn test_overflow_skips_cell() {
        let clip = column_clip(0, 0, vec![CellValue::Byte(120), CellValue::Byte(125)]);
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 0, 1, 4),
            FillOperation::Series,
            FillDirection::Down,
            CalendarField::Day,
        );
        // 130 and 135 do not fit in a byte
        assert_eq!(values_of(&updates), vec![CellValue::Byte(120), CellValue::Byte(125)]);
    }

    #[test]
    fn test_decimal_series_is_exact() {
        let clip = column_clip(0, 0, vec![CellValue::Double(0.1), CellValue::Double(0.2)]);
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 0, 1, 4),
            FillOperation::Series,
            FillDirection::Down,
            CalendarField::Day,
        );
        assert_eq!(updates[2].value, CellValue::Double(0.3));
        assert_eq!(updates[3].value, CellValue::Double(0.4));
    }

    #[test]
    fn test_date_series_uses_configured_field() {
        let d = |month, day| CellValue::from(NaiveDate::from_ymd_opt(2024, month, day).unwrap());
        let dates = vec![d(1, 15), d(3, 15)];
        assert_eq!(detect_step(&dates, CalendarField::Month), Some(SeriesStep::Calendar(2)));
        assert_eq!(detect_step(&dates, CalendarField::Day), Some(SeriesStep::Calendar(60)));

        let updates = compute_fill(
            &column_clip(0, 0, dates),
            CellRect::new(0, 0, 1, 3),
            FillOperation::Series,
            FillDirection::Down,
            CalendarField::Month,
        );
        assert_eq!(updates[2].value, d(5, 15));
    }

    #[test]
    fn test_month_end_series_continues_from_last_value() {
        let d = |month, day| CellValue::from(NaiveDate::from_ymd_opt(2024, month, day).unwrap());
        let clip = column_clip(0, 0, vec![d(1, 31), d(2, 29)]);
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 0, 1, 5),
            FillOperation::Series,
            FillDirection::Down,
            CalendarField::Month,
        );
        assert_eq!(values_of(&updates), vec![d(1, 31), d(2, 29), d(3, 29), d(4, 29), d(5, 29)]);
    }

    #[test]
    fn test_month_end_series_up_continues_from_first_value() {
        let d = |year, month, day| CellValue::from(NaiveDate::from_ymd_opt(year, month, day).unwrap());
        let clip = column_clip(0, 3, vec![d(2024, 3, 31), d(2024, 4, 30)]);
        let updates = compute_fill(
            &clip,
            CellRect::new(0, 0, 1, 5),
            FillOperation::Series,
            FillDirection::Up,
            CalendarField::Month,
        );
        assert_eq!(
            values_of(&updates),
            vec![d(2023, 12, 31), d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
        );
    }
}
