//! Left panel listing the document's headings.

use super::super::*;
use eframe::egui::{self, RichText};
use quill_core::outline;

const OUTLINE_INDENT: f32 = 12.0;

impl QuillApp {
    pub(crate) fn render_outline_panel(&mut self, ctx: &egui::Context) {
        if !self.outline_open {
            return;
        }
        egui::SidePanel::left("outline")
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading(RichText::new("Outline").color(COLOR_TEXT_PRIMARY));
                ui.add_space(8.0);
                let entries = outline::collect(&self.document);
                if entries.is_empty() {
                    ui.label(
                        RichText::new("Headings you add appear here.")
                            .small()
                            .color(COLOR_TEXT_MUTED),
                    );
                    return;
                }
                let mut jump = None;
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        for entry in &entries {
                            ui.horizontal(|ui| {
                                ui.add_space(entry.depth() as f32 * OUTLINE_INDENT);
                                let text = if entry.level == 1 {
                                    RichText::new(&entry.text).strong()
                                } else {
                                    RichText::new(&entry.text).color(COLOR_TEXT_SECONDARY)
                                };
                                if ui.selectable_label(false, text).clicked() {
                                    jump = Some(entry.clone());
                                }
                            });
                        }
                    });
                if let Some(entry) = jump {
                    self.jump_to_heading(&entry);
                }
            });
    }
}
