use nattable_config::Settings;
use nattable_core::{Axis, CellValue};
use nattable_engine::{BodyLayerStack, ChangeKind, EventCollector, Layer, LayerCommand, LayerEvent, VecDataProvider};

fn stack(columns: usize, rows: usize) -> BodyLayerStack<VecDataProvider> {
    BodyLayerStack::new(VecDataProvider::numbered(columns, rows), &Settings::default())
}

fn run(stack: &mut BodyLayerStack<VecDataProvider>, command: LayerCommand) {
    assert!(stack.do_command(command.clone()), "{command:?} not handled");
}

fn column_indexes(stack: &BodyLayerStack<VecDataProvider>) -> Vec<usize> {
    (0..stack.column_count())
        .filter_map(|p| stack.index_by_position(Axis::Column, p))
        .collect()
}

fn frozen_columns(stack: &BodyLayerStack<VecDataProvider>) -> usize {
    stack.composite_freeze_layer().frozen_count(Axis::Column)
}

#[test]
fn hide_inside_frozen_region_then_show_all() {
    let mut stack = stack(6, 3);
    run(&mut stack, LayerCommand::FreezeColumn { position: 2, toggle: false });
    run(&mut stack, LayerCommand::Hide { axis: Axis::Column, positions: vec![0, 4] });

    assert_eq!(frozen_columns(&stack), 2);
    assert_eq!(column_indexes(&stack), vec![1, 2, 3, 5]);
    assert_eq!(stack.composite_freeze_layer().minimum_origin_position(Axis::Column), Some(2));

    run(&mut stack, LayerCommand::ShowAll { axis: Axis::Column });
    assert_eq!(frozen_columns(&stack), 3);
    assert_eq!(column_indexes(&stack), (0..6).collect::<Vec<_>>());
}

#[test]
fn hidden_boundary_column_comes_back_in_the_viewport() {
    let mut stack = stack(6, 3);
    run(&mut stack, LayerCommand::FreezeColumn { position: 2, toggle: false });
    run(&mut stack, LayerCommand::Hide { axis: Axis::Column, positions: vec![2] });
    assert_eq!(frozen_columns(&stack), 2);

    run(&mut stack, LayerCommand::ShowAll { axis: Axis::Column });
    assert_eq!(frozen_columns(&stack), 2);
    assert_eq!(stack.composite_freeze_layer().viewport_count(Axis::Column), 4);
    assert_eq!(stack.index_by_position(Axis::Column, 2), Some(2));
}

#[test]
fn hiding_every_frozen_column_and_showing_them_again() {
    let mut stack = stack(6, 3);
    run(&mut stack, LayerCommand::FreezeColumn { position: 1, toggle: false });
    stack.take_events();

    let mut collector = EventCollector::new();
    run(&mut stack, LayerCommand::Hide { axis: Axis::Column, positions: vec![0, 1] });
    assert!(!stack.composite_freeze_layer().is_frozen());
    collector.extend(stack.take_events());
    assert_eq!(collector.count_of(&LayerEvent::Unfreeze), 1);
    assert_eq!(collector.structural()[0].kind, ChangeKind::Hide);
    collector.clear();

    run(&mut stack, LayerCommand::ShowAll { axis: Axis::Column });
    assert_eq!(frozen_columns(&stack), 2);
    collector.extend(stack.take_events());
    assert_eq!(collector.count_of(&LayerEvent::Freeze), 1);
    assert_eq!(collector.structural()[0].kind, ChangeKind::Show);
}

#[test]
fn frozen_rows_and_columns_with_scrolled_viewport() {
    let mut stack = stack(20, 50);
    run(&mut stack, LayerCommand::SetClientArea { axis: Axis::Column, extent: Some(500) });
    run(&mut stack, LayerCommand::SetClientArea { axis: Axis::Row, extent: Some(200) });
    run(&mut stack, LayerCommand::FreezePosition { column: 0, row: 1 });

    let composite = stack.composite_freeze_layer();
    assert_eq!(composite.frozen_count(Axis::Column), 1);
    assert_eq!(composite.frozen_count(Axis::Row), 2);
    assert_eq!(composite.viewport_count(Axis::Column), 5);

    run(&mut stack, LayerCommand::Scroll { axis: Axis::Row, delta: 100 });
    assert_eq!(stack.composite_freeze_layer().viewport_origin(Axis::Row), 140);
    // Frozen rows stay put, the viewport starts further down
    assert_eq!(stack.index_by_position(Axis::Row, 1), Some(1));
    assert_eq!(stack.index_by_position(Axis::Row, 2), Some(7));
    assert_eq!(stack.data_value_by_position(1, 2), CellValue::Int(17));

    run(&mut stack, LayerCommand::Unfreeze);
    assert!(!stack.composite_freeze_layer().is_frozen());
    assert_eq!(stack.composite_freeze_layer().frozen_count(Axis::Row), 0);
}

#[test]
fn reorder_into_frozen_region_grows_it() {
    let mut stack = stack(6, 2);
    run(&mut stack, LayerCommand::FreezeColumn { position: 1, toggle: false });
    run(&mut stack, LayerCommand::Reorder { axis: Axis::Column, from: vec![4], to: 1 });

    assert_eq!(column_indexes(&stack), vec![0, 4, 1, 2, 3, 5]);
    assert_eq!(frozen_columns(&stack), 3);

    run(&mut stack, LayerCommand::ResetOrder { axis: Axis::Column });
    assert_eq!(column_indexes(&stack), (0..6).collect::<Vec<_>>());
    assert_eq!(
        frozen_columns(&stack) + stack.composite_freeze_layer().viewport_count(Axis::Column),
        6
    );
}

#[test]
fn freeze_selection_uses_anchor() {
    let mut stack = stack(6, 6);
    run(&mut stack, LayerCommand::SelectCell { column: 3, row: 2, shift: false, ctrl: false });
    run(&mut stack, LayerCommand::FreezeSelection);
    assert_eq!(frozen_columns(&stack), 3);
    assert_eq!(stack.composite_freeze_layer().frozen_count(Axis::Row), 2);
}
