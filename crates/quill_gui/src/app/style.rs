//! Theme constants and one-time style application for the egui app.

use super::QuillApp;
use eframe::egui::{
    self, style::WidgetVisuals, Color32, CornerRadius, FontFamily, FontId, Margin, Stroke,
    TextStyle, Visuals,
};

pub(super) const COLOR_BG_DESK: Color32 = Color32::from_rgb(0xe8, 0xea, 0xed);
pub(super) const COLOR_BG_CHROME: Color32 = Color32::from_rgb(0xf8, 0xf9, 0xfa);
pub(super) const COLOR_BG_CONTROL: Color32 = Color32::from_rgb(0xf1, 0xf3, 0xf4);
pub(super) const COLOR_PAPER: Color32 = Color32::WHITE;
pub(super) const COLOR_TEXT_PRIMARY: Color32 = Color32::from_rgb(0x20, 0x21, 0x24);
pub(super) const COLOR_TEXT_SECONDARY: Color32 = Color32::from_rgb(0x5f, 0x63, 0x68);
pub(super) const COLOR_TEXT_MUTED: Color32 = Color32::from_rgb(0x80, 0x86, 0x8b);
pub(super) const COLOR_ACCENT: Color32 = Color32::from_rgb(0x1a, 0x73, 0xe8);
pub(super) const COLOR_ACCENT_HOVER: Color32 = Color32::from_rgb(0x17, 0x4e, 0xa6);
pub(super) const COLOR_WARNING: Color32 = Color32::from_rgb(0xb0, 0x60, 0x00);
pub(super) const COLOR_BORDER: Color32 = Color32::from_rgb(0xda, 0xdc, 0xe0);
pub(super) const COLOR_HIGHLIGHT: Color32 = Color32::from_rgb(0xff, 0xf1, 0x76);
pub(super) const COLOR_CODE_BG: Color32 = Color32::from_rgb(0xf1, 0xf3, 0xf4);
pub(super) const COLOR_MATCH_FILL: Color32 = Color32::from_rgb(0xfc, 0xe8, 0xb2);
pub(super) const COLOR_MATCH_CURRENT: Color32 = Color32::from_rgb(0xf9, 0xab, 0x00);
pub(super) const COLOR_RULER_MARGIN: Color32 = Color32::from_rgb(0xd2, 0xd6, 0xdc);
pub(super) const COLOR_SELECTION_FILL_RGBA: [u8; 4] = [0x1a, 0x73, 0xe8, 0x40];

/// Body text size of the page at 100% zoom, in points.
pub(super) const BODY_FONT_SIZE: f32 = 15.0;

pub(super) fn selection_fill_color() -> Color32 {
    Color32::from_rgba_unmultiplied(
        COLOR_SELECTION_FILL_RGBA[0],
        COLOR_SELECTION_FILL_RGBA[1],
        COLOR_SELECTION_FILL_RGBA[2],
        COLOR_SELECTION_FILL_RGBA[3],
    )
}

fn widget(bg: Color32, stroke: Color32, fg: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill: bg,
        weak_bg_fill: bg,
        bg_stroke: Stroke::new(1.0, stroke),
        corner_radius: CornerRadius::same(4),
        fg_stroke: Stroke::new(1.0, fg),
        expansion,
    }
}

impl QuillApp {
    pub(super) fn ensure_style(&mut self, ctx: &egui::Context) {
        if self.style_applied {
            return;
        }

        let mut style = (*ctx.style()).clone();
        style.visuals = Visuals::light();
        style.visuals.override_text_color = Some(COLOR_TEXT_PRIMARY);
        style.visuals.window_fill = COLOR_BG_CHROME;
        style.visuals.panel_fill = COLOR_BG_CHROME;
        style.visuals.extreme_bg_color = COLOR_PAPER;
        style.visuals.faint_bg_color = COLOR_BG_CONTROL;
        style.visuals.window_stroke = Stroke::new(1.0, COLOR_BORDER);
        style.visuals.hyperlink_color = COLOR_ACCENT;
        style.visuals.selection.bg_fill = selection_fill_color();
        style.visuals.selection.stroke = Stroke::new(1.0, COLOR_ACCENT);

        style.visuals.widgets.noninteractive =
            widget(COLOR_BG_CHROME, COLOR_BORDER, COLOR_TEXT_SECONDARY, 0.0);
        style.visuals.widgets.inactive =
            widget(COLOR_BG_CONTROL, COLOR_BORDER, COLOR_TEXT_PRIMARY, 0.0);
        style.visuals.widgets.hovered = widget(
            Color32::from_rgb(0xe3, 0xed, 0xfd),
            COLOR_ACCENT,
            COLOR_ACCENT_HOVER,
            0.5,
        );
        style.visuals.widgets.active = widget(COLOR_ACCENT, COLOR_ACCENT, Color32::WHITE, 0.5);
        style.visuals.widgets.open = widget(COLOR_ACCENT, COLOR_ACCENT, Color32::WHITE, 0.0);

        style.spacing.window_margin = Margin::same(12);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.interact_size.y = 26.0;
        style.spacing.menu_margin = Margin::same(6);
        style.spacing.combo_width = 160.0;

        style.text_styles.insert(
            TextStyle::Heading,
            FontId::new(20.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            TextStyle::Body,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            TextStyle::Button,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            TextStyle::Monospace,
            FontId::new(13.0, FontFamily::Monospace),
        );
        style.text_styles.insert(
            TextStyle::Small,
            FontId::new(12.0, FontFamily::Proportional),
        );

        ctx.set_style(style);
        self.style_applied = true;
    }
}
