//! Bottom status bar: counts, zoom, and the latest status message.

use super::super::*;
use eframe::egui;

impl QuillApp {
    pub(crate) fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let stats = self.document.stats();
                    ui.label(
                        egui::RichText::new(format!("{} words", stats.words))
                            .small()
                            .color(COLOR_TEXT_SECONDARY),
                    );
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{} characters", stats.chars))
                            .small()
                            .color(COLOR_TEXT_SECONDARY),
                    );
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{:.0}%", self.zoom()))
                            .small()
                            .color(COLOR_TEXT_SECONDARY),
                    );
                    if let Some(status) = &self.status {
                        ui.separator();
                        ui.label(egui::RichText::new(&status.text).color(COLOR_WARNING));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(&self.db_path)
                                    .small()
                                    .monospace()
                                    .color(COLOR_TEXT_MUTED),
                            )
                            .truncate(),
                        );
                        ui.label(egui::RichText::new("DB:").small().color(COLOR_TEXT_MUTED));
                    });
                });
            });
    }
}
