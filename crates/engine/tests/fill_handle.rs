use chrono::NaiveDate;
use nattable_config::Settings;
use nattable_core::{Axis, CalendarField, CellRect, CellValue, FillDirection, FillOperation};
use nattable_engine::{BodyLayerStack, DataProvider, Layer, LayerCommand, LayerEvent, VecDataProvider};

fn empty_stack(columns: usize, rows: usize) -> BodyLayerStack<VecDataProvider> {
    BodyLayerStack::new(VecDataProvider::with_size(columns, rows), &Settings::default())
}

fn select(stack: &mut BodyLayerStack<VecDataProvider>, rect: CellRect) {
    assert!(stack.do_command(LayerCommand::SelectRegion { rect, shift: false, ctrl: false }));
}

/// Copy `source`, then drag the fill handle over `region`.
fn fill(
    stack: &mut BodyLayerStack<VecDataProvider>,
    source: CellRect,
    region: CellRect,
    operation: FillOperation,
    direction: FillDirection,
) -> bool {
    select(stack, source);
    assert!(stack.do_command(LayerCommand::CopySelection));
    assert!(stack.do_command(LayerCommand::SetFillHandleRegion { rect: region }));
    stack.do_command(LayerCommand::FillHandlePaste { operation, direction })
}

fn column_values(stack: &BodyLayerStack<VecDataProvider>, column: usize, rows: std::ops::Range<usize>) -> Vec<CellValue> {
    rows.map(|r| stack.data_value_by_position(column, r)).collect()
}

fn ints(values: &[i32]) -> Vec<CellValue> {
    values.iter().map(|&v| CellValue::Int(v)).collect()
}

#[test]
fn series_of_odd_numbers_continues() {
    let mut stack = empty_stack(2, 12);
    for (row, value) in [(4, 1), (5, 3), (6, 5)] {
        stack.set_data_value_by_position(1, row, CellValue::Int(value));
    }

    assert!(fill(
        &mut stack,
        CellRect::new(1, 4, 1, 3),
        CellRect::new(1, 4, 1, 6),
        FillOperation::Series,
        FillDirection::Down,
    ));
    assert_eq!(column_values(&stack, 1, 4..10), ints(&[1, 3, 5, 7, 9, 11]));
    assert_eq!(stack.data_value_by_position(1, 10), CellValue::Null);
}

#[test]
fn series_with_blank_falls_back_to_copy() {
    let mut stack = empty_stack(1, 12);
    stack.set_data_value_by_position(0, 4, CellValue::Int(1));

    assert!(fill(
        &mut stack,
        CellRect::new(0, 4, 1, 2),
        CellRect::new(0, 4, 1, 6),
        FillOperation::Series,
        FillDirection::Down,
    ));
    let expected = vec![
        CellValue::Int(1),
        CellValue::Null,
        CellValue::Int(1),
        CellValue::Null,
        CellValue::Int(1),
        CellValue::Null,
    ];
    assert_eq!(column_values(&stack, 0, 4..10), expected);
}

#[test]
fn copy_fill_is_idempotent() {
    let mut stack = empty_stack(1, 8);
    stack.set_data_value_by_position(0, 0, CellValue::from("x"));
    stack.set_data_value_by_position(0, 1, CellValue::from("y"));

    for _ in 0..2 {
        assert!(fill(
            &mut stack,
            CellRect::new(0, 0, 1, 2),
            CellRect::new(0, 0, 1, 8),
            FillOperation::Copy,
            FillDirection::Down,
        ));
        let values: Vec<String> = (0..8).map(|r| stack.data_value_by_position(0, r).to_string()).collect();
        assert_eq!(values, vec!["x", "y", "x", "y", "x", "y", "x", "y"]);
    }
}

#[test]
fn fill_skips_hidden_rows() {
    let mut stack = empty_stack(1, 8);
    stack.set_data_value_by_position(0, 0, CellValue::Int(10));
    stack.set_data_value_by_position(0, 1, CellValue::Int(20));
    assert!(stack.do_command(LayerCommand::Hide { axis: Axis::Row, positions: vec![3] }));

    assert!(fill(
        &mut stack,
        CellRect::new(0, 0, 1, 2),
        CellRect::new(0, 0, 1, 6),
        FillOperation::Series,
        FillDirection::Down,
    ));

    let provider = stack.provider();
    let stored: Vec<CellValue> = (0..7).map(|r| provider.data_value(0, r)).collect();
    let expected = vec![
        CellValue::Int(10),
        CellValue::Int(20),
        CellValue::Int(30),
        CellValue::Null,
        CellValue::Int(40),
        CellValue::Int(50),
        CellValue::Int(60),
    ];
    assert_eq!(stored, expected);
}

#[test]
fn fill_right_through_reordered_columns() {
    let mut stack = empty_stack(5, 1);
    // Columns now read 4, 0, 1, 2, 3
    assert!(stack.do_command(LayerCommand::Reorder { axis: Axis::Column, from: vec![4], to: 0 }));
    stack.set_data_value_by_position(0, 0, CellValue::Long(2));
    stack.set_data_value_by_position(1, 0, CellValue::Long(4));

    assert!(fill(
        &mut stack,
        CellRect::new(0, 0, 2, 1),
        CellRect::new(0, 0, 5, 1),
        FillOperation::Series,
        FillDirection::Right,
    ));

    let provider = stack.provider();
    let stored: Vec<CellValue> = (0..5).map(|c| provider.data_value(c, 0)).collect();
    let expected: Vec<CellValue> = [4, 6, 8, 10, 2].iter().map(|&v| CellValue::Long(v)).collect();
    assert_eq!(stored, expected);
}

#[test]
fn date_series_uses_configured_field() {
    let mut settings = Settings::default();
    settings.fill_handle.date_field = CalendarField::Month;
    let mut stack = BodyLayerStack::new(VecDataProvider::with_size(1, 4), &settings);

    let date = |m| CellValue::from(NaiveDate::from_ymd_opt(2024, m, 15).unwrap());
    stack.set_data_value_by_position(0, 0, date(1));
    stack.set_data_value_by_position(0, 1, date(2));

    assert!(fill(
        &mut stack,
        CellRect::new(0, 0, 1, 2),
        CellRect::new(0, 0, 1, 4),
        FillOperation::Series,
        FillDirection::Down,
    ));
    assert_eq!(column_values(&stack, 0, 0..4), vec![date(1), date(2), date(3), date(4)]);
}

#[test]
fn fill_updates_cells_in_one_event_and_selects_region() {
    let mut stack = empty_stack(1, 6);
    stack.set_data_value_by_position(0, 0, CellValue::Int(7));
    select(&mut stack, CellRect::new(0, 0, 1, 1));
    stack.do_command(LayerCommand::CopySelection);
    stack.do_command(LayerCommand::SetFillHandleRegion { rect: CellRect::new(0, 0, 1, 4) });
    stack.take_events();

    assert!(stack.do_command(LayerCommand::FillHandlePaste {
        operation: FillOperation::Copy,
        direction: FillDirection::Down,
    }));
    let events = stack.take_events();
    let updates = events
        .iter()
        .filter(|e| matches!(e, LayerEvent::CellsUpdated { .. }))
        .count();
    assert_eq!(updates, 1);
    assert!(events.contains(&LayerEvent::SelectionChanged));
    assert_eq!(stack.selection_layer().selected_cells().len(), 4);
    assert_eq!(stack.selection_layer().fill_handle_region(), None);
}
