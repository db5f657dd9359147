//! Top bar with the editable document title and save indicator.

use super::super::*;
use eframe::egui::{self, RichText};

impl QuillApp {
    pub(crate) fn render_title_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("title_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Quill").color(COLOR_ACCENT));
                    ui.add_space(12.0);
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.title)
                            .desired_width(360.0)
                            .hint_text(DEFAULT_DOCUMENT_TITLE)
                            .font(egui::TextStyle::Heading),
                    );
                    if response.changed() {
                        self.mark_dirty();
                    }
                    if response.lost_focus() && self.title.trim().is_empty() {
                        self.title = DEFAULT_DOCUMENT_TITLE.to_string();
                    }

                    ui.add_space(12.0);
                    let (label, color) = match self.save_status {
                        SaveStatus::Saved => ("Saved", COLOR_TEXT_SECONDARY),
                        SaveStatus::Dirty => ("Unsaved", COLOR_WARNING),
                        SaveStatus::Saving => ("Saving\u{2026}", COLOR_TEXT_MUTED),
                    };
                    ui.label(RichText::new(label).color(color));
                    if let Some(saved_at) = self.last_saved_at {
                        ui.label(
                            RichText::new(format!("Last saved {}", saved_at.format("%H:%M:%S")))
                                .small()
                                .color(COLOR_TEXT_MUTED),
                        );
                    }
                });
            });
    }
}
