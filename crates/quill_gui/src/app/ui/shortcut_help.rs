//! Keyboard shortcut help surface.

use super::super::*;
use eframe::egui;

impl QuillApp {
    /// Renders the keyboard shortcut help window.
    pub(crate) fn render_shortcut_help(&mut self, ctx: &egui::Context) {
        if !self.shortcut_help_open {
            return;
        }
        let mut open = self.shortcut_help_open;

        egui::Window::new("Keyboard Shortcuts")
            .open(&mut open)
            .resizable(false)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("Document")
                        .small()
                        .color(COLOR_TEXT_MUTED),
                );
                shortcut_row(ui, "Ctrl/Cmd+N", "Start a new document");
                shortcut_row(ui, "Ctrl/Cmd+S", "Save to local storage");
                shortcut_row(ui, "Ctrl/Cmd+Z", "Undo");
                shortcut_row(ui, "Ctrl/Cmd+Shift+Z, Ctrl/Cmd+Y", "Redo");
                shortcut_row(ui, "F1", "Toggle this help");

                ui.add_space(6.0);
                ui.separator();
                ui.add_space(6.0);

                ui.label(
                    egui::RichText::new("Formatting")
                        .small()
                        .color(COLOR_TEXT_MUTED),
                );
                shortcut_row(ui, "Ctrl/Cmd+B", "Bold");
                shortcut_row(ui, "Ctrl/Cmd+I", "Italic");
                shortcut_row(ui, "Ctrl/Cmd+U", "Underline");
                shortcut_row(ui, "Enter", "Split the block at the caret");
                shortcut_row(ui, "Backspace", "At block start, join with the previous block");

                ui.add_space(6.0);
                ui.separator();
                ui.add_space(6.0);

                ui.label(
                    egui::RichText::new("Find and replace")
                        .small()
                        .color(COLOR_TEXT_MUTED),
                );
                shortcut_row(ui, "Ctrl/Cmd+F", "Open find");
                shortcut_row(ui, "Ctrl/Cmd+H", "Open find and replace");
                shortcut_row(ui, "Enter", "Next match");
                shortcut_row(ui, "Shift+Enter", "Previous match");
                shortcut_row(ui, "Esc", "Close the find bar");
            });
        self.shortcut_help_open = open;
    }
}

fn shortcut_row(ui: &mut egui::Ui, keys: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(keys).monospace().color(COLOR_ACCENT));
        ui.label(egui::RichText::new(description).color(COLOR_TEXT_PRIMARY));
    });
}
