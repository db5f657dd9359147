//! Find/replace bar shown under the toolbar.
//!
//! Enter moves to the next match, Shift+Enter to the previous one, and
//! Escape closes the bar (handled with the global shortcuts).

use super::super::*;
use eframe::egui::{self, RichText};

impl QuillApp {
    pub(crate) fn render_find_bar(&mut self, ctx: &egui::Context) {
        if !self.find_open {
            return;
        }
        egui::TopBottomPanel::top("find_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Find").color(COLOR_TEXT_SECONDARY));
                    let mut term = self.search.search_term().to_string();
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut term)
                            .id(egui::Id::new(FIND_INPUT_ID))
                            .desired_width(220.0)
                            .hint_text("Search document"),
                    );
                    if self.find_focus_requested {
                        response.request_focus();
                        self.find_focus_requested = false;
                    }
                    if response.changed() {
                        self.set_find_term(&term);
                    }
                    let (enter, shift) =
                        ui.input(|input| (input.key_pressed(egui::Key::Enter), input.modifiers.shift));
                    if response.lost_focus() && enter {
                        if shift {
                            self.find_previous();
                        } else {
                            self.find_next();
                        }
                        response.request_focus();
                    }

                    let mut case_sensitive = self.search.case_sensitive();
                    if ui.checkbox(&mut case_sensitive, "Match case").changed() {
                        self.set_case_sensitive(case_sensitive);
                    }

                    let status = self.search.status().to_string();
                    if !status.is_empty() {
                        ui.label(RichText::new(status).small().color(COLOR_TEXT_MUTED));
                    }

                    let has_matches = !self.search.matches().is_empty();
                    if ui
                        .add_enabled(has_matches, egui::Button::new("Previous"))
                        .clicked()
                    {
                        self.find_previous();
                    }
                    if ui
                        .add_enabled(has_matches, egui::Button::new("Next"))
                        .clicked()
                    {
                        self.find_next();
                    }
                    ui.toggle_value(&mut self.replace_open, "Replace\u{2026}");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            self.close_find();
                        }
                    });
                });

                if !self.replace_open {
                    return;
                }
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Replace").color(COLOR_TEXT_SECONDARY));
                    let mut replacement = self.search.replace_term().to_string();
                    if ui
                        .add(
                            egui::TextEdit::singleline(&mut replacement)
                                .desired_width(220.0)
                                .hint_text("Replace with"),
                        )
                        .changed()
                    {
                        self.search.set_replace_term(&replacement);
                    }
                    let has_matches = !self.search.matches().is_empty();
                    if ui
                        .add_enabled(has_matches, egui::Button::new("Replace"))
                        .clicked()
                    {
                        self.replace_current();
                    }
                    if ui
                        .add_enabled(has_matches, egui::Button::new("Replace all"))
                        .clicked()
                    {
                        self.replace_all();
                    }
                });
            });
    }
}
