//! Menu bar and formatting toolbar.

use super::super::*;
use eframe::egui::{self, RichText};
use quill_core::constants::{MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT, ZOOM_PRESETS};
use quill_core::document::commands::{current_alignment, current_block_kind};
use quill_core::document::{Alignment, EditorSurface, Mark, StyleChange, TextKind};
use quill_core::export::ExportFormat;

/// Font families offered by the toolbar; `None` is the document default.
const FONT_FAMILIES: [(&str, Option<&str>); 5] = [
    ("Default", None),
    ("Serif", Some("Georgia")),
    ("Sans", Some("Arial")),
    ("Times", Some("Times New Roman")),
    ("Monospace", Some("Courier New")),
];
/// Point sizes offered by the toolbar.
const FONT_SIZES: [u16; 9] = [8, 10, 11, 12, 14, 18, 24, 30, 36];
const ZOOM_STEP: f64 = 10.0;

const BLOCK_STYLES: [(&str, TextKind); 6] = [
    ("Paragraph", TextKind::Paragraph),
    ("Heading 1", TextKind::Heading(1)),
    ("Heading 2", TextKind::Heading(2)),
    ("Heading 3", TextKind::Heading(3)),
    ("Quote", TextKind::Quote),
    ("Code block", TextKind::CodeBlock),
];

fn block_style_label(kind: Option<TextKind>) -> &'static str {
    match kind {
        Some(TextKind::BulletItem) => "Bulleted list",
        Some(TextKind::OrderedItem) => "Numbered list",
        Some(TextKind::Heading(level)) if level > 3 => "Heading",
        Some(kind) => BLOCK_STYLES
            .iter()
            .find(|(_, candidate)| *candidate == kind)
            .map(|(label, _)| *label)
            .unwrap_or("Paragraph"),
        None => "Table",
    }
}

fn hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

impl QuillApp {
    pub(crate) fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar")
            .resizable(false)
            .show(ctx, |ui| {
                egui::MenuBar::new().ui(ui, |ui| {
                    ui.menu_button("File", |ui| self.file_menu(ui));
                    ui.menu_button("Edit", |ui| self.edit_menu(ui));
                    ui.menu_button("Format", |ui| self.format_menu(ui));
                    ui.menu_button("Insert", |ui| self.insert_menu(ui));
                    ui.menu_button("View", |ui| self.view_menu(ui));
                    ui.menu_button("Tools", |ui| self.tools_menu(ui));
                });
            });
    }

    fn file_menu(&mut self, ui: &mut egui::Ui) {
        if ui.button("New document").clicked() {
            self.new_document();
            ui.close();
        }
        if ui.button("Load saved document").clicked() {
            self.load_saved();
            ui.close();
        }
        if ui.button("Import Markdown\u{2026}").clicked() {
            ui.close();
            self.import_markdown();
        }
        ui.separator();
        if ui
            .add_enabled(
                self.save_status == SaveStatus::Dirty,
                egui::Button::new("Save"),
            )
            .clicked()
        {
            self.save_now();
            ui.close();
        }
        ui.menu_button("Export", |ui| {
            for format in ExportFormat::ALL {
                if ui.button(format!("{}\u{2026}", format.label())).clicked() {
                    ui.close();
                    self.export_as(format);
                }
            }
        });
        ui.separator();
        if ui.button("Clear saved document").clicked() {
            self.clear_saved();
            ui.close();
        }
    }

    fn edit_menu(&mut self, ui: &mut egui::Ui) {
        if ui
            .add_enabled(self.history.can_undo(), egui::Button::new("Undo"))
            .clicked()
        {
            self.undo();
            ui.close();
        }
        if ui
            .add_enabled(self.history.can_redo(), egui::Button::new("Redo"))
            .clicked()
        {
            self.redo();
            ui.close();
        }
        ui.separator();
        if ui.button("Find\u{2026}").clicked() {
            self.open_find(false);
            ui.close();
        }
        if ui.button("Replace\u{2026}").clicked() {
            self.open_find(true);
            ui.close();
        }
    }

    fn format_menu(&mut self, ui: &mut egui::Ui) {
        for (label, mark) in [
            ("Bold", Mark::Bold),
            ("Italic", Mark::Italic),
            ("Underline", Mark::Underline),
            ("Strikethrough", Mark::Strike),
            ("Inline code", Mark::Code),
            ("Highlight", Mark::Highlight),
        ] {
            if ui.button(label).clicked() {
                self.toggle_mark(mark);
                ui.close();
            }
        }
        if ui.button("Clear formatting").clicked() {
            self.apply_style_change(StyleChange::ClearFormatting);
            ui.close();
        }
        ui.separator();
        for (label, kind) in BLOCK_STYLES {
            if ui.button(label).clicked() {
                self.toggle_block_kind(kind);
                ui.close();
            }
        }
        if ui.button("Bulleted list").clicked() {
            self.toggle_block_kind(TextKind::BulletItem);
            ui.close();
        }
        if ui.button("Numbered list").clicked() {
            self.toggle_block_kind(TextKind::OrderedItem);
            ui.close();
        }
        ui.separator();
        ui.menu_button("Align", |ui| {
            for (label, align) in [
                ("Left", Alignment::Left),
                ("Center", Alignment::Center),
                ("Right", Alignment::Right),
                ("Justify", Alignment::Justify),
            ] {
                if ui.button(label).clicked() {
                    self.set_alignment(align);
                    ui.close();
                }
            }
        });
    }

    fn insert_menu(&mut self, ui: &mut egui::Ui) {
        if ui.button("Link\u{2026}").clicked() {
            self.open_link_dialog();
            ui.close();
        }
        if ui.button("Horizontal rule").clicked() {
            self.insert_rule();
            ui.close();
        }
        if ui.button("Table\u{2026}").clicked() {
            self.table_dialog = Some(TableDraft::default());
            ui.close();
        }
    }

    fn view_menu(&mut self, ui: &mut egui::Ui) {
        ui.checkbox(&mut self.ruler_visible, "Ruler");
        ui.checkbox(&mut self.outline_open, "Outline");
        let mut assistant_open = self.assistant_open;
        if ui.checkbox(&mut assistant_open, "Assistant").changed() {
            if assistant_open {
                self.assistant_open = true;
            } else {
                self.close_assistant();
            }
        }
        ui.separator();
        ui.menu_button("Zoom", |ui| {
            let current = self.zoom();
            for preset in ZOOM_PRESETS {
                let selected = (current - preset).abs() < f64::EPSILON;
                if ui
                    .selectable_label(selected, format!("{preset:.0}%"))
                    .clicked()
                {
                    self.set_zoom(preset);
                    ui.close();
                }
            }
        });
        if ui.button("Zoom in").clicked() {
            self.set_zoom(self.zoom() + ZOOM_STEP);
        }
        if ui.button("Zoom out").clicked() {
            self.set_zoom(self.zoom() - ZOOM_STEP);
        }
    }

    fn tools_menu(&mut self, ui: &mut egui::Ui) {
        if ui.button("Assistant").clicked() {
            self.assistant_open = true;
            ui.close();
        }
        if ui.button("Page setup\u{2026}").clicked() {
            self.open_page_setup();
            ui.close();
        }
        if ui.button("Keyboard shortcuts").clicked() {
            self.shortcut_help_open = true;
            ui.close();
        }
    }

    fn open_link_dialog(&mut self) {
        let selection = self.document.selection();
        let url = self
            .document
            .style_at(selection.from())
            .link
            .unwrap_or_default();
        self.link_dialog = Some(LinkDraft {
            url,
            label: String::new(),
        });
    }

    /// Whether the selection (or the caret's style) carries `mark`.
    fn mark_active(&self, mark: Mark) -> bool {
        let selection = self.document.selection();
        if selection.is_empty() {
            self.document.style_at(selection.head).has_mark(mark)
        } else {
            self.document.range_has_mark(selection.range(), mark)
        }
    }

    pub(crate) fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    if ui
                        .add_enabled(self.history.can_undo(), egui::Button::new("Undo"))
                        .on_hover_text("Undo (Ctrl/Cmd+Z)")
                        .clicked()
                    {
                        self.undo();
                    }
                    if ui
                        .add_enabled(self.history.can_redo(), egui::Button::new("Redo"))
                        .on_hover_text("Redo (Ctrl/Cmd+Shift+Z)")
                        .clicked()
                    {
                        self.redo();
                    }
                    ui.separator();

                    let kind = current_block_kind(&self.document);
                    egui::ComboBox::from_id_salt("block_style")
                        .selected_text(block_style_label(kind))
                        .width(120.0)
                        .show_ui(ui, |ui| {
                            for (label, style) in BLOCK_STYLES {
                                if ui.selectable_label(kind == Some(style), label).clicked() {
                                    self.toggle_block_kind(style);
                                }
                            }
                        });

                    let caret_style = self.document.style_at(self.document.selection().from());
                    let family_label = FONT_FAMILIES
                        .iter()
                        .find(|(_, family)| *family == caret_style.font_family.as_deref())
                        .map(|(label, _)| *label)
                        .unwrap_or("Custom");
                    egui::ComboBox::from_id_salt("font_family")
                        .selected_text(family_label)
                        .width(96.0)
                        .show_ui(ui, |ui| {
                            for (label, family) in FONT_FAMILIES {
                                if ui.selectable_label(family_label == label, label).clicked() {
                                    self.apply_style_change(StyleChange::FontFamily(
                                        family.map(str::to_string),
                                    ));
                                }
                            }
                        });
                    let size_label = caret_style
                        .font_size
                        .map(|size| size.to_string())
                        .unwrap_or_else(|| "Auto".to_string());
                    egui::ComboBox::from_id_salt("font_size")
                        .selected_text(size_label)
                        .width(56.0)
                        .show_ui(ui, |ui| {
                            if ui
                                .selectable_label(caret_style.font_size.is_none(), "Auto")
                                .clicked()
                            {
                                self.apply_style_change(StyleChange::FontSize(None));
                            }
                            for size in FONT_SIZES {
                                if ui
                                    .selectable_label(
                                        caret_style.font_size == Some(size),
                                        size.to_string(),
                                    )
                                    .clicked()
                                {
                                    self.apply_style_change(StyleChange::FontSize(Some(size)));
                                }
                            }
                        });
                    ui.separator();

                    for (label, mark, hint) in [
                        ("B", Mark::Bold, "Bold (Ctrl/Cmd+B)"),
                        ("I", Mark::Italic, "Italic (Ctrl/Cmd+I)"),
                        ("U", Mark::Underline, "Underline (Ctrl/Cmd+U)"),
                        ("S", Mark::Strike, "Strikethrough"),
                        ("</>", Mark::Code, "Inline code"),
                        ("H", Mark::Highlight, "Highlight"),
                    ] {
                        let text = match mark {
                            Mark::Bold => RichText::new(label).strong(),
                            Mark::Italic => RichText::new(label).italics(),
                            Mark::Underline => RichText::new(label).underline(),
                            Mark::Strike => RichText::new(label).strikethrough(),
                            Mark::Code => RichText::new(label).monospace(),
                            Mark::Highlight => RichText::new(label).background_color(COLOR_HIGHLIGHT),
                        };
                        if ui
                            .selectable_label(self.mark_active(mark), text)
                            .on_hover_text(hint)
                            .clicked()
                        {
                            self.toggle_mark(mark);
                        }
                    }
                    ui.color_edit_button_srgb(&mut self.text_color)
                        .on_hover_text("Pick a text color");
                    if ui
                        .button(RichText::new("A").color(egui::Color32::from_rgb(
                            self.text_color[0],
                            self.text_color[1],
                            self.text_color[2],
                        )))
                        .on_hover_text("Apply text color")
                        .clicked()
                    {
                        self.apply_style_change(StyleChange::Color(Some(hex_color(
                            self.text_color,
                        ))));
                    }
                    if ui
                        .button("Clear")
                        .on_hover_text("Clear formatting")
                        .clicked()
                    {
                        self.apply_style_change(StyleChange::ClearFormatting);
                    }
                    ui.separator();

                    let align = current_alignment(&self.document);
                    for (label, value) in [
                        ("Left", Alignment::Left),
                        ("Center", Alignment::Center),
                        ("Right", Alignment::Right),
                        ("Justify", Alignment::Justify),
                    ] {
                        if ui.selectable_label(align == value, label).clicked() {
                            self.set_alignment(value);
                        }
                    }
                    ui.separator();
                    if ui
                        .selectable_label(kind == Some(TextKind::BulletItem), "\u{2022} List")
                        .clicked()
                    {
                        self.toggle_block_kind(TextKind::BulletItem);
                    }
                    if ui
                        .selectable_label(kind == Some(TextKind::OrderedItem), "1. List")
                        .clicked()
                    {
                        self.toggle_block_kind(TextKind::OrderedItem);
                    }
                    ui.separator();
                    if ui.button("Link").clicked() {
                        self.open_link_dialog();
                    }
                    if ui.button("Rule").on_hover_text("Horizontal rule").clicked() {
                        self.insert_rule();
                    }
                    if ui.button("Table").clicked() {
                        self.table_dialog = Some(TableDraft::default());
                    }
                    ui.separator();
                    if ui
                        .add_enabled(
                            self.zoom() > MIN_ZOOM_PERCENT,
                            egui::Button::new("\u{2212}"),
                        )
                        .on_hover_text("Zoom out")
                        .clicked()
                    {
                        self.set_zoom(self.zoom() - ZOOM_STEP);
                    }
                    ui.label(RichText::new(format!("{:.0}%", self.zoom())).color(COLOR_TEXT_SECONDARY));
                    if ui
                        .add_enabled(self.zoom() < MAX_ZOOM_PERCENT, egui::Button::new("+"))
                        .on_hover_text("Zoom in")
                        .clicked()
                    {
                        self.set_zoom(self.zoom() + ZOOM_STEP);
                    }
                    ui.separator();
                    if ui
                        .selectable_label(self.assistant_open, "Assistant")
                        .clicked()
                    {
                        if self.assistant_open {
                            self.close_assistant();
                        } else {
                            self.assistant_open = true;
                        }
                    }
                });
            });
    }
}
