//! Page setup and insert dialogs.

use super::super::*;
use eframe::egui::{self, RichText};
use quill_core::page::{Orientation, PaperSize};

impl QuillApp {
    /// Page setup window. Margin fields are free text; anything that does
    /// not parse becomes 0 and is clamped on apply.
    pub(crate) fn render_page_setup_dialog(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.page_setup_draft.as_mut() else {
            return;
        };
        let mut open = true;
        let mut apply = false;
        let mut cancel = false;
        egui::Window::new("Page setup")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::Grid::new("page_setup_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Paper size");
                        egui::ComboBox::from_id_salt("paper_size")
                            .selected_text(draft.paper.label())
                            .show_ui(ui, |ui| {
                                for paper in PaperSize::ALL {
                                    ui.selectable_value(&mut draft.paper, paper, paper.label());
                                }
                            });
                        ui.end_row();

                        ui.label("Orientation");
                        ui.horizontal(|ui| {
                            ui.radio_value(&mut draft.orientation, Orientation::Portrait, "Portrait");
                            ui.radio_value(
                                &mut draft.orientation,
                                Orientation::Landscape,
                                "Landscape",
                            );
                        });
                        ui.end_row();

                        for (label, field) in [
                            ("Top margin", &mut draft.top),
                            ("Bottom margin", &mut draft.bottom),
                            ("Left margin", &mut draft.left),
                            ("Right margin", &mut draft.right),
                        ] {
                            ui.label(label);
                            ui.horizontal(|ui| {
                                ui.add(egui::TextEdit::singleline(field).desired_width(80.0));
                                ui.label(RichText::new("in").small().color(COLOR_TEXT_MUTED));
                            });
                            ui.end_row();
                        }
                    });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        apply = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });
        if apply {
            self.apply_page_setup();
        } else if cancel || !open {
            self.page_setup_draft = None;
        }
    }

    pub(crate) fn render_insert_dialogs(&mut self, ctx: &egui::Context) {
        self.render_link_dialog(ctx);
        self.render_table_dialog(ctx);
    }

    fn render_link_dialog(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.link_dialog.as_mut() else {
            return;
        };
        let mut open = true;
        let mut submit = false;
        let mut cancel = false;
        egui::Window::new("Insert link")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::Grid::new("link_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("URL");
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut draft.url)
                                .desired_width(240.0)
                                .hint_text("https://"),
                        );
                        if response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter)) {
                            submit = true;
                        }
                        ui.end_row();
                        ui.label("Text");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.label)
                                .desired_width(240.0)
                                .hint_text("Shown when nothing is selected"),
                        );
                        ui.end_row();
                    });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Insert").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });
        if submit {
            if let Some(draft) = self.link_dialog.take() {
                self.insert_link(&draft.url, &draft.label);
            }
        } else if cancel || !open {
            self.link_dialog = None;
        }
    }

    fn render_table_dialog(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.table_dialog.as_mut() else {
            return;
        };
        let mut open = true;
        let mut submit = false;
        let mut cancel = false;
        egui::Window::new("Insert table")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("table_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Rows");
                        ui.add(egui::DragValue::new(&mut draft.rows).range(1..=MAX_TABLE_DIMENSION));
                        ui.end_row();
                        ui.label("Columns");
                        ui.add(egui::DragValue::new(&mut draft.cols).range(1..=MAX_TABLE_DIMENSION));
                        ui.end_row();
                    });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Insert").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });
        if submit {
            if let Some(draft) = self.table_dialog.take() {
                self.insert_table(
                    draft.rows.clamp(1, MAX_TABLE_DIMENSION),
                    draft.cols.clamp(1, MAX_TABLE_DIMENSION),
                );
            }
        } else if cancel || !open {
            self.table_dialog = None;
        }
    }
}
