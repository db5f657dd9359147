//! Horizontal ruler above the page: margin handles and tab stops.
//!
//! Pointer input is translated into [`RulerEvent`]s with offsets measured from
//! the page's left edge; all geometry and clamping lives in the ruler model.

use super::super::*;
use eframe::egui::{self, pos2, vec2, Color32, Rect, Sense, Shape, Stroke};
use quill_core::ruler::{to_pixels, DragHandle, RulerEvent};

const RULER_HEIGHT: f32 = 26.0;
const HANDLE_HIT_TOLERANCE_PX: f64 = 6.0;
const TICKS_PER_INCH: usize = 8;

impl QuillApp {
    /// Paint the ruler and route gestures. `page_left` is the x offset of the
    /// page's left edge inside `ui`.
    pub(crate) fn show_ruler(&mut self, ui: &mut egui::Ui, page_left: f32) {
        let (rect, response) = ui.allocate_exact_size(
            vec2(ui.available_width(), RULER_HEIGHT),
            Sense::click_and_drag(),
        );
        let origin_x = rect.left() + page_left;
        let offset_of = |x: f32| f64::from(x - origin_x);

        if let Some(pos) = response.interact_pointer_pos() {
            let offset = offset_of(pos.x);
            if response.drag_started() {
                // egui reports the start only after the pointer has travelled, so
                // the handle is looked up where the button went down.
                let press_x = ui
                    .input(|input| input.pointer.press_origin())
                    .map_or(pos.x, |origin| origin.x);
                if let Some(handle) = self
                    .ruler
                    .hit_test(offset_of(press_x), HANDLE_HIT_TOLERANCE_PX)
                {
                    self.ruler.update(RulerEvent::DragStart(handle));
                    self.ruler.update(RulerEvent::DragMove { offset_px: offset });
                }
            } else if response.dragged() && self.ruler.drag().is_dragging() {
                self.ruler.update(RulerEvent::DragMove { offset_px: offset });
            }
            if response.double_clicked() {
                if let Some(DragHandle::TabStop(index)) =
                    self.ruler.hit_test(offset, HANDLE_HIT_TOLERANCE_PX)
                {
                    let value = self.ruler.state().tab_stops[index];
                    self.ruler.update(RulerEvent::RemoveTab { value });
                }
            } else if response.clicked()
                && self
                    .ruler
                    .hit_test(offset, HANDLE_HIT_TOLERANCE_PX)
                    .is_none()
            {
                self.ruler.update(RulerEvent::Click { offset_px: offset });
            }
        }
        if response.drag_stopped() {
            self.ruler.update(RulerEvent::DragEnd);
            self.sync_page_from_ruler();
        } else if self.ruler.drag().is_dragging() && !response.contains_pointer() {
            self.ruler.update(RulerEvent::PointerLeave);
            self.sync_page_from_ruler();
        }

        self.paint_ruler(ui, rect, origin_x);
        if response.hovered() {
            let hovering_handle = ui
                .input(|input| input.pointer.hover_pos())
                .and_then(|pos| {
                    self.ruler
                        .hit_test(offset_of(pos.x), HANDLE_HIT_TOLERANCE_PX)
                })
                .is_some();
            if hovering_handle || self.ruler.drag().is_dragging() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
            }
        }
    }

    fn paint_ruler(&self, ui: &egui::Ui, rect: Rect, origin_x: f32) {
        let painter = ui.painter_at(rect);
        let state = self.ruler.state();
        let zoom = state.zoom;
        let x_at = |inches: f64| origin_x + to_pixels(inches, zoom) as f32;

        painter.rect_filled(rect, 0.0, COLOR_BG_CHROME);
        let page = Rect::from_x_y_ranges(
            x_at(0.0)..=x_at(state.page_width),
            rect.top() + 4.0..=rect.bottom() - 4.0,
        );
        painter.rect_filled(page, 2.0, COLOR_RULER_MARGIN);
        let band = Rect::from_x_y_ranges(
            x_at(state.left_margin)..=x_at(state.page_width - state.right_margin),
            page.y_range(),
        );
        painter.rect_filled(band, 0.0, COLOR_PAPER);

        let ticks = (state.page_width * TICKS_PER_INCH as f64).floor() as usize;
        for tick in 1..=ticks {
            let x = x_at(tick as f64 / TICKS_PER_INCH as f64);
            let length = match tick % TICKS_PER_INCH {
                0 => 9.0,
                4 => 6.0,
                2 | 6 => 4.0,
                _ => 2.5,
            };
            painter.line_segment(
                [pos2(x, page.bottom() - length), pos2(x, page.bottom())],
                Stroke::new(1.0, COLOR_TEXT_MUTED),
            );
            if tick % TICKS_PER_INCH == 0 {
                painter.text(
                    pos2(x, page.top() + 1.0),
                    egui::Align2::CENTER_TOP,
                    (tick / TICKS_PER_INCH).to_string(),
                    egui::FontId::proportional(9.0),
                    COLOR_TEXT_SECONDARY,
                );
            }
        }

        let margin_color = |side: DragHandle| {
            if self.active_handle() == Some(side) {
                COLOR_ACCENT_HOVER
            } else {
                COLOR_ACCENT
            }
        };
        let left = x_at(state.left_margin);
        let right = x_at(state.page_width - state.right_margin);
        painter.add(margin_marker(left, rect.bottom(), margin_color(DragHandle::LeftMargin)));
        painter.add(margin_marker(right, rect.bottom(), margin_color(DragHandle::RightMargin)));

        for (index, stop) in state.tab_stops.iter().enumerate() {
            let x = x_at(state.left_margin + stop);
            let color = if self.active_handle() == Some(DragHandle::TabStop(index)) {
                COLOR_ACCENT_HOVER
            } else {
                COLOR_TEXT_PRIMARY
            };
            let stroke = Stroke::new(2.0, color);
            let base = rect.bottom() - 3.0;
            painter.line_segment([pos2(x, base - 7.0), pos2(x, base)], stroke);
            painter.line_segment([pos2(x, base), pos2(x + 6.0, base)], stroke);
        }
    }

    fn active_handle(&self) -> Option<DragHandle> {
        use quill_core::ruler::{DragState, MarginSide};
        match self.ruler.drag() {
            DragState::Idle => None,
            DragState::DraggingMargin(MarginSide::Left) => Some(DragHandle::LeftMargin),
            DragState::DraggingMargin(MarginSide::Right) => Some(DragHandle::RightMargin),
            DragState::DraggingTab(index) => Some(DragHandle::TabStop(index)),
        }
    }
}

/// Downward-pointing triangle marking a margin.
fn margin_marker(x: f32, bottom: f32, color: Color32) -> Shape {
    Shape::convex_polygon(
        vec![
            pos2(x - 5.0, bottom - 10.0),
            pos2(x + 5.0, bottom - 10.0),
            pos2(x, bottom - 2.0),
        ],
        color,
        Stroke::NONE,
    )
}
