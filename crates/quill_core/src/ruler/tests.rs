use super::*;

const LETTER: f64 = 8.5;

fn px(model: &RulerModel, inches_from_page_edge: f64) -> f64 {
    to_pixels(inches_from_page_edge, model.state().zoom)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn pixel_inch_conversion_round_trips_across_zoom_range() {
    let mut zoom = 50.0;
    while zoom <= 200.0 {
        let mut value = 0.0;
        while value <= LETTER {
            let back = to_inches(to_pixels(value, zoom), zoom);
            assert!(approx(back, value), "value {} zoom {}", value, zoom);
            value += 0.17;
        }
        zoom += 12.5;
    }
}

#[test]
fn click_adds_tab_snapped_to_quarter_inch() {
    let mut model = RulerModel::new(LETTER, 100.0);
    let offset = px(&model, model.state().left_margin + 1.38);
    assert!(model.update(RulerEvent::Click { offset_px: offset }));
    assert_eq!(model.state().tab_stops, vec![1.5]);
}

#[test]
fn click_outside_content_band_is_ignored() {
    let mut model = RulerModel::new(LETTER, 125.0);
    let in_left_margin = px(&model, 0.5);
    let in_right_margin = px(&model, LETTER - 0.5);
    assert!(!model.click(in_left_margin));
    assert!(!model.click(in_right_margin));
    // Inside the band but snapping onto the margin edge.
    let near_edge = px(&model, model.state().left_margin + 0.05);
    assert!(!model.click(near_edge));
    assert!(model.state().tab_stops.is_empty());
}

#[test]
fn clicks_are_ignored_while_dragging() {
    let mut model = RulerModel::new(LETTER, 100.0);
    model.drag_start(DragHandle::LeftMargin);
    let offset = px(&model, 3.0);
    assert!(!model.click(offset));
    assert!(model.state().tab_stops.is_empty());
}

#[test]
fn duplicate_clicks_do_not_duplicate_tab_stops() {
    let mut model = RulerModel::new(LETTER, 100.0);
    let offset = px(&model, model.state().left_margin + 2.0);
    assert!(model.click(offset));
    assert!(!model.click(offset + 1.0));
    assert_eq!(model.state().tab_stops, vec![2.0]);
}

#[test]
fn tab_stops_stay_sorted() {
    let mut model = RulerModel::new(LETTER, 100.0);
    for inches in [4.0, 1.0, 2.5] {
        let offset = px(&model, model.state().left_margin + inches);
        model.click(offset);
    }
    assert_eq!(model.state().tab_stops, vec![1.0, 2.5, 4.0]);
}

#[test]
fn left_margin_drag_is_clamped_to_keep_one_inch_of_content() {
    let mut model = RulerModel::new(LETTER, 100.0);
    model.update(RulerEvent::DragStart(DragHandle::LeftMargin));
    let far_right = px(&model, 50.0);
    assert!(model.update(RulerEvent::DragMove { offset_px: far_right }));
    let state = model.state();
    assert!(approx(state.left_margin, LETTER - state.right_margin - 1.0));
    assert!(state.left_margin + state.right_margin < state.page_width);

    let far_left = px(&model, -3.0);
    model.drag_move(far_left);
    assert!(approx(model.state().left_margin, MIN_MARGIN_INCHES));
}

#[test]
fn left_margin_drag_snaps_to_quarter_inch() {
    let mut model = RulerModel::new(LETTER, 150.0);
    model.drag_start(DragHandle::LeftMargin);
    let offset = px(&model, 1.62);
    model.drag_move(offset);
    assert!(approx(model.state().left_margin, 1.5));
}

#[test]
fn right_margin_drag_measures_from_page_right_edge() {
    let mut model = RulerModel::new(LETTER, 100.0);
    model.drag_start(DragHandle::RightMargin);
    let offset = px(&model, LETTER - 2.0);
    assert!(model.drag_move(offset));
    assert!(approx(model.state().right_margin, 2.0));

    let past_left_margin = px(&model, 0.0);
    model.drag_move(past_left_margin);
    let state = model.state();
    assert!(approx(state.right_margin, LETTER - state.left_margin - 1.0));
}

#[test]
fn margin_changes_prune_tabs_outside_band() {
    let mut model = RulerModel::new(LETTER, 100.0);
    let offset = px(&model, model.state().left_margin + 6.0);
    model.click(offset);
    assert_eq!(model.state().tab_stops, vec![6.0]);
    model.drag_start(DragHandle::RightMargin);
    let offset = px(&model, LETTER - 2.0);
    model.drag_move(offset);
    assert!(model.state().tab_stops.is_empty());
}

#[test]
fn tab_drag_moves_stop_without_duplicates() {
    let mut model = RulerModel::new(LETTER, 100.0);
    for inches in [1.0, 3.0] {
        let offset = px(&model, model.state().left_margin + inches);
        model.click(offset);
    }
    model.drag_start(DragHandle::TabStop(0));
    let offset = px(&model, model.state().left_margin + 4.1);
    assert!(model.drag_move(offset));
    assert_eq!(model.state().tab_stops, vec![3.0, 4.0]);
    assert_eq!(model.drag(), DragState::DraggingTab(1));

    // Keep dragging the same stop on the next frame.
    let offset = px(&model, model.state().left_margin + 4.6);
    assert!(model.drag_move(offset));
    assert_eq!(model.state().tab_stops, vec![3.0, 4.5]);
}

#[test]
fn tab_drag_outside_band_is_rejected_for_that_frame() {
    let mut model = RulerModel::new(LETTER, 100.0);
    let offset = px(&model, model.state().left_margin + 2.0);
    model.click(offset);
    model.drag_start(DragHandle::TabStop(0));
    let outside = px(&model, LETTER - 0.2);
    assert!(!model.drag_move(outside));
    assert_eq!(model.state().tab_stops, vec![2.0]);
    assert_eq!(model.drag(), DragState::DraggingTab(0));
}

#[test]
fn drag_end_and_pointer_leave_always_reset() {
    let mut model = RulerModel::new(LETTER, 100.0);
    model.update(RulerEvent::DragStart(DragHandle::RightMargin));
    assert!(model.drag().is_dragging());
    model.update(RulerEvent::PointerLeave);
    assert_eq!(model.drag(), DragState::Idle);

    model.update(RulerEvent::DragEnd);
    assert_eq!(model.drag(), DragState::Idle);
}

#[test]
fn only_one_drag_is_active_at_a_time() {
    let mut model = RulerModel::new(LETTER, 100.0);
    model.drag_start(DragHandle::LeftMargin);
    model.drag_start(DragHandle::RightMargin);
    assert_eq!(model.drag(), DragState::DraggingMargin(MarginSide::Left));
}

#[test]
fn drag_start_on_missing_tab_is_ignored() {
    let mut model = RulerModel::new(LETTER, 100.0);
    model.drag_start(DragHandle::TabStop(3));
    assert_eq!(model.drag(), DragState::Idle);
}

#[test]
fn double_click_removes_only_the_matching_stop_with_drift() {
    let mut model = RulerModel::new(LETTER, 100.0);
    for inches in [1.0, 2.0, 3.0] {
        let offset = px(&model, model.state().left_margin + inches);
        model.click(offset);
    }
    assert!(model.update(RulerEvent::RemoveTab { value: 2.04 }));
    assert_eq!(model.state().tab_stops, vec![1.0, 3.0]);
    assert!(!model.remove_tab_near(2.0));
    assert!(!model.remove_tab_near(2.9));
    assert!(model.remove_tab_near(2.95));
    assert_eq!(model.state().tab_stops, vec![1.0]);
}

#[test]
fn hit_test_prefers_tabs_then_nearest_margin() {
    let mut model = RulerModel::new(LETTER, 100.0);
    let tab_offset = px(&model, model.state().left_margin + 0.25);
    model.click(tab_offset);
    assert_eq!(
        model.hit_test(tab_offset + 2.0, 6.0),
        Some(DragHandle::TabStop(0))
    );
    assert_eq!(
        model.hit_test(model.left_margin_px() - 3.0, 6.0),
        Some(DragHandle::LeftMargin)
    );
    assert_eq!(
        model.hit_test(model.right_margin_px() + 4.0, 6.0),
        Some(DragHandle::RightMargin)
    );
    assert_eq!(model.hit_test(model.page_width_px() / 2.0, 6.0), None);
}

#[test]
fn page_setup_margins_are_clamped() {
    let mut model = RulerModel::new(LETTER, 100.0);
    model.set_margins(0.0, 9.0);
    let state = model.state();
    assert!(approx(state.left_margin, MIN_MARGIN_INCHES));
    assert!(approx(state.right_margin, LETTER - MIN_MARGIN_INCHES - 1.0));

    model.set_page_width(0.5);
    let state = model.state();
    assert!(state.content_width() >= 1.0 - 1e-9);
}

#[test]
fn zoom_is_clamped_into_supported_range() {
    let mut model = RulerModel::new(LETTER, 10.0);
    assert_eq!(model.state().zoom, 50.0);
    model.set_zoom(900.0);
    assert_eq!(model.state().zoom, 200.0);
    model.set_zoom(f64::NAN);
    assert_eq!(model.state().zoom, 50.0);
}
