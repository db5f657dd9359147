//! Ruler geometry and the margin/tab-stop drag state machine.
//!
//! All lengths in [`RulerState`] are inches. Pointer offsets arriving from the
//! widget are pixels measured from the page's left edge at the current zoom.
//! Gestures never fail: out-of-range input is clamped or ignored.

mod units;

pub use units::{snap, to_inches, to_pixels};

use crate::constants::{
    DEFAULT_MARGIN_INCHES, MAX_ZOOM_PERCENT, MIN_CONTENT_WIDTH_INCHES, MIN_MARGIN_INCHES,
    MIN_ZOOM_PERCENT, TAB_STOP_TOLERANCE_INCHES,
};
use tracing::debug;
pub(crate) use units::clamp_lenient;

/// Which page margin a drag is adjusting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarginSide {
    Left,
    Right,
}

/// A grabbable ruler handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragHandle {
    LeftMargin,
    RightMargin,
    /// Index into the sorted tab-stop list.
    TabStop(usize),
}

/// Current drag gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    DraggingMargin(MarginSide),
    DraggingTab(usize),
}

impl DragState {
    pub fn is_dragging(self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// Input accepted by [`RulerModel::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RulerEvent {
    Click { offset_px: f64 },
    DragStart(DragHandle),
    DragMove { offset_px: f64 },
    DragEnd,
    PointerLeave,
    /// Double-click on a tab-stop handle positioned at `value` inches.
    RemoveTab { value: f64 },
}

/// Snapshot of the ruler's geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct RulerState {
    pub page_width: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    /// Offsets from the left margin, sorted ascending and unique within tolerance.
    pub tab_stops: Vec<f64>,
    pub zoom: f64,
}

impl RulerState {
    /// Width of the band between the margins.
    pub fn content_width(&self) -> f64 {
        self.page_width - self.left_margin - self.right_margin
    }

    /// Whether `offset` (relative to the left margin) lies strictly inside the content band.
    pub fn in_content_band(&self, offset: f64) -> bool {
        offset > 0.0 && offset < self.content_width()
    }
}

/// Owned ruler state plus the active drag gesture.
#[derive(Clone, Debug)]
pub struct RulerModel {
    state: RulerState,
    drag: DragState,
}

impl RulerModel {
    /// Create a ruler for a page of `page_width` inches with default margins.
    pub fn new(page_width: f64, zoom: f64) -> Self {
        let mut model = Self {
            state: RulerState {
                page_width: page_width.max(min_page_width()),
                left_margin: DEFAULT_MARGIN_INCHES,
                right_margin: DEFAULT_MARGIN_INCHES,
                tab_stops: Vec::new(),
                zoom: clamp_zoom(zoom),
            },
            drag: DragState::Idle,
        };
        model.reclamp_margins();
        model
    }

    pub fn state(&self) -> &RulerState {
        &self.state
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    /// Single entry point for widget input.
    ///
    /// # Returns
    /// `true` when the ruler geometry changed.
    pub fn update(&mut self, event: RulerEvent) -> bool {
        match event {
            RulerEvent::Click { offset_px } => self.click(offset_px),
            RulerEvent::DragStart(handle) => self.drag_start(handle),
            RulerEvent::DragMove { offset_px } => self.drag_move(offset_px),
            RulerEvent::DragEnd | RulerEvent::PointerLeave => {
                self.drag_end();
                false
            }
            RulerEvent::RemoveTab { value } => self.remove_tab_near(value),
        }
    }

    /// Add a snapped tab stop where the ruler was clicked.
    pub fn click(&mut self, offset_px: f64) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let relative = self.relative_to_left_margin(offset_px);
        if !self.state.in_content_band(relative) {
            return false;
        }
        let snapped = snap(relative);
        if !self.state.in_content_band(snapped) {
            return false;
        }
        self.insert_tab(snapped).is_some()
    }

    /// Begin dragging `handle`. Ignored while another drag is active or when
    /// the tab index is out of range.
    pub fn drag_start(&mut self, handle: DragHandle) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        self.drag = match handle {
            DragHandle::LeftMargin => DragState::DraggingMargin(MarginSide::Left),
            DragHandle::RightMargin => DragState::DraggingMargin(MarginSide::Right),
            DragHandle::TabStop(index) if index < self.state.tab_stops.len() => {
                DragState::DraggingTab(index)
            }
            DragHandle::TabStop(index) => {
                debug!(index, "ignoring drag start on missing tab stop");
                return false;
            }
        };
        false
    }

    /// Move the active handle to `offset_px`.
    pub fn drag_move(&mut self, offset_px: f64) -> bool {
        let position = to_inches(offset_px, self.state.zoom);
        match self.drag {
            DragState::Idle => false,
            DragState::DraggingMargin(MarginSide::Left) => {
                let upper =
                    self.state.page_width - self.state.right_margin - MIN_CONTENT_WIDTH_INCHES;
                let next = clamp_lenient(snap(position), MIN_MARGIN_INCHES, upper);
                self.apply_margin(MarginSide::Left, next)
            }
            DragState::DraggingMargin(MarginSide::Right) => {
                let upper =
                    self.state.page_width - self.state.left_margin - MIN_CONTENT_WIDTH_INCHES;
                let from_right = self.state.page_width - position;
                let next = clamp_lenient(snap(from_right), MIN_MARGIN_INCHES, upper);
                self.apply_margin(MarginSide::Right, next)
            }
            DragState::DraggingTab(index) => {
                let relative = position - self.state.left_margin;
                if !self.state.in_content_band(relative) {
                    return false;
                }
                let snapped = snap(relative);
                if !self.state.in_content_band(snapped) {
                    return false;
                }
                let Some(&old) = self.state.tab_stops.get(index) else {
                    self.drag = DragState::Idle;
                    return false;
                };
                if (old - snapped).abs() < f64::EPSILON {
                    return false;
                }
                self.state.tab_stops.remove(index);
                let new_index = match self.insert_tab(snapped) {
                    Some(inserted) => inserted,
                    None => self.tab_index_near(snapped).unwrap_or(0),
                };
                self.drag = DragState::DraggingTab(new_index);
                true
            }
        }
    }

    /// Return to idle. Safe to call in any state.
    pub fn drag_end(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Remove the first tab stop within tolerance of `value`.
    pub fn remove_tab_near(&mut self, value: f64) -> bool {
        let Some(index) = self.tab_index_near(value) else {
            return false;
        };
        self.state.tab_stops.remove(index);
        if let DragState::DraggingTab(_) = self.drag {
            self.drag = DragState::Idle;
        }
        true
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.state.zoom = clamp_zoom(zoom);
    }

    /// Resize the page, re-clamping margins and pruning tab stops.
    pub fn set_page_width(&mut self, page_width: f64) {
        self.state.page_width = if page_width.is_finite() {
            page_width.max(min_page_width())
        } else {
            min_page_width()
        };
        self.reclamp_margins();
    }

    /// Set both margins explicitly (page setup dialog), clamped to legal values.
    pub fn set_margins(&mut self, left: f64, right: f64) {
        self.state.left_margin = if left.is_finite() { left } else { 0.0 };
        self.state.right_margin = if right.is_finite() { right } else { 0.0 };
        self.reclamp_margins();
    }

    /// Pixel position of the left margin handle from the page's left edge.
    pub fn left_margin_px(&self) -> f64 {
        to_pixels(self.state.left_margin, self.state.zoom)
    }

    /// Pixel position of the right margin handle from the page's left edge.
    pub fn right_margin_px(&self) -> f64 {
        to_pixels(
            self.state.page_width - self.state.right_margin,
            self.state.zoom,
        )
    }

    pub fn page_width_px(&self) -> f64 {
        to_pixels(self.state.page_width, self.state.zoom)
    }

    /// Pixel positions of the tab stops from the page's left edge, in order.
    pub fn tab_stops_px(&self) -> Vec<f64> {
        self.state
            .tab_stops
            .iter()
            .map(|stop| to_pixels(self.state.left_margin + stop, self.state.zoom))
            .collect()
    }

    /// Find the handle under `offset_px`, preferring tab stops over margins.
    pub fn hit_test(&self, offset_px: f64, tolerance_px: f64) -> Option<DragHandle> {
        let tabs = self.tab_stops_px();
        let nearest_tab = tabs
            .iter()
            .enumerate()
            .map(|(index, px)| (index, (px - offset_px).abs()))
            .filter(|(_, distance)| *distance <= tolerance_px)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = nearest_tab {
            return Some(DragHandle::TabStop(index));
        }
        let left = (self.left_margin_px() - offset_px).abs();
        let right = (self.right_margin_px() - offset_px).abs();
        if left <= tolerance_px && left <= right {
            Some(DragHandle::LeftMargin)
        } else if right <= tolerance_px {
            Some(DragHandle::RightMargin)
        } else {
            None
        }
    }

    fn relative_to_left_margin(&self, offset_px: f64) -> f64 {
        to_inches(offset_px, self.state.zoom) - self.state.left_margin
    }

    fn apply_margin(&mut self, side: MarginSide, next: f64) -> bool {
        let slot = match side {
            MarginSide::Left => &mut self.state.left_margin,
            MarginSide::Right => &mut self.state.right_margin,
        };
        if (*slot - next).abs() < f64::EPSILON {
            return false;
        }
        *slot = next;
        self.prune_tabs();
        true
    }

    fn reclamp_margins(&mut self) {
        let width = self.state.page_width;
        self.state.left_margin = clamp_lenient(
            self.state.left_margin,
            MIN_MARGIN_INCHES,
            width - MIN_MARGIN_INCHES - MIN_CONTENT_WIDTH_INCHES,
        );
        self.state.right_margin = clamp_lenient(
            self.state.right_margin,
            MIN_MARGIN_INCHES,
            width - self.state.left_margin - MIN_CONTENT_WIDTH_INCHES,
        );
        self.prune_tabs();
    }

    fn prune_tabs(&mut self) {
        let content = self.state.content_width();
        let before = self.state.tab_stops.len();
        self.state
            .tab_stops
            .retain(|stop| *stop > 0.0 && *stop < content);
        if self.state.tab_stops.len() != before {
            debug!(
                removed = before - self.state.tab_stops.len(),
                "pruned tab stops outside the content band"
            );
            if let DragState::DraggingTab(index) = self.drag {
                if index >= self.state.tab_stops.len() {
                    self.drag = DragState::Idle;
                }
            }
        }
    }

    fn tab_index_near(&self, value: f64) -> Option<usize> {
        self.state
            .tab_stops
            .iter()
            .position(|stop| (stop - value).abs() <= TAB_STOP_TOLERANCE_INCHES + 1e-9)
    }

    /// Insert a stop keeping the list sorted; returns its index or `None` for
    /// a duplicate.
    fn insert_tab(&mut self, value: f64) -> Option<usize> {
        if self.tab_index_near(value).is_some() {
            return None;
        }
        let index = self
            .state
            .tab_stops
            .iter()
            .position(|stop| *stop > value)
            .unwrap_or(self.state.tab_stops.len());
        self.state.tab_stops.insert(index, value);
        Some(index)
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT)
    } else {
        MIN_ZOOM_PERCENT
    }
}

fn min_page_width() -> f64 {
    2.0 * MIN_MARGIN_INCHES + MIN_CONTENT_WIDTH_INCHES
}

#[cfg(test)]
mod tests;
