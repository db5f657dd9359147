//! Right panel for the writing assistant.

use super::super::*;
use eframe::egui::{self, RichText};
use quill_core::assistant::{AssistantAction, Tone};

/// Actions offered by the picker; tone and prompt are filled in on generate.
fn action_choices() -> [AssistantAction; 7] {
    [
        AssistantAction::ContinueWriting,
        AssistantAction::Summarize,
        AssistantAction::Improve,
        AssistantAction::MakeShorter,
        AssistantAction::MakeLonger,
        AssistantAction::ChangeTone(Tone::default()),
        AssistantAction::Custom(String::new()),
    ]
}

impl QuillApp {
    pub(crate) fn render_assistant_panel(&mut self, ctx: &egui::Context) {
        if !self.assistant_open {
            return;
        }
        egui::SidePanel::right("assistant")
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Assistant").color(COLOR_TEXT_PRIMARY));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            self.close_assistant();
                        }
                    });
                });
                ui.label(
                    RichText::new("Works on the selection, or the whole document when nothing is selected.")
                        .small()
                        .color(COLOR_TEXT_MUTED),
                );
                ui.add_space(8.0);

                egui::ComboBox::from_id_salt("assistant_action")
                    .selected_text(self.assistant.action.label())
                    .show_ui(ui, |ui| {
                        for choice in action_choices() {
                            let selected = self.assistant.action.label() == choice.label();
                            let label = choice.label();
                            if ui.selectable_label(selected, label).clicked() {
                                self.assistant.action = choice;
                            }
                        }
                    });

                if matches!(self.assistant.action, AssistantAction::ChangeTone(_)) {
                    egui::ComboBox::from_id_salt("assistant_tone")
                        .selected_text(self.assistant.tone.label())
                        .show_ui(ui, |ui| {
                            for tone in Tone::ALL {
                                ui.selectable_value(&mut self.assistant.tone, tone, tone.label());
                            }
                        });
                }
                if matches!(self.assistant.action, AssistantAction::Custom(_)) {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.assistant.prompt)
                            .desired_rows(3)
                            .desired_width(f32::INFINITY)
                            .hint_text("Tell the assistant what to write"),
                    );
                }

                let generating = self
                    .assistant
                    .run
                    .as_ref()
                    .is_some_and(|run| !run.is_finished());
                if ui
                    .add_enabled(!generating, egui::Button::new("Generate"))
                    .clicked()
                {
                    self.start_generation();
                }
                ui.add_space(8.0);

                let Some(run) = self.assistant.run.as_ref() else {
                    return;
                };
                let finished = run.is_finished();
                let has_target = !self.assistant.target.is_empty();
                ui.separator();
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(run.request().action.label())
                            .small()
                            .color(COLOR_TEXT_SECONDARY),
                    );
                    if !finished {
                        ui.spinner();
                    }
                });
                egui::ScrollArea::vertical()
                    .max_height(320.0)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        ui.label(RichText::new(run.revealed()).color(COLOR_TEXT_PRIMARY));
                    });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Insert").clicked() {
                        self.insert_assistant_output();
                    }
                    if ui
                        .add_enabled(has_target, egui::Button::new("Replace selection"))
                        .clicked()
                    {
                        self.replace_with_assistant_output();
                    }
                    if ui.button("Discard").clicked() {
                        self.discard_assistant_output();
                    }
                });
            });
    }
}
