//! Paper canvas: one text widget per document segment.
//!
//! Widgets are rebuilt from the document every frame. Their buffers are
//! synced back through `sync_segment_text`, and the focused widget's cursor
//! becomes the document selection. Run styles reach the screen through a
//! layouter that maps them onto egui text formats.

use super::super::*;
use eframe::egui::{
    self,
    text::{CCursor, CCursorRange, LayoutJob, LayoutSection, TextFormat, TextWrapping},
    Color32, FontFamily, FontId, Margin, Rect, Shape, Stroke,
};
use quill_core::document::{
    Alignment, Block, EditorSurface, NodeRef, Run, RunStyle, TableBlock, TextBlock, TextKind,
    TextSegment,
};
use quill_core::ruler::to_pixels;
use std::ops::Range;

const PAPER_GUTTER: f32 = 24.0;
const BLOCK_SPACING: f32 = 4.0;
const LIST_MARKER_WIDTH: f32 = 22.0;
const QUOTE_INDENT: f32 = 14.0;
const CODE_PADDING: i8 = 8;

/// Widget feedback gathered while drawing, applied once the pass is done.
enum CanvasAction {
    Sync { node: NodeRef, text: String },
    Select { node: NodeRef, anchor: usize, head: usize },
    Join { block: usize },
}

/// Formatting shared by a whole segment before run styles apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SegmentFormat {
    pub(crate) size: f32,
    pub(crate) monospace: bool,
    pub(crate) color: Color32,
    pub(crate) italics: bool,
    pub(crate) align: egui::Align,
    pub(crate) justify: bool,
    /// Zoom factor (1.0 at 100%).
    pub(crate) zoom: f32,
}

impl SegmentFormat {
    pub(crate) fn for_block(kind: TextKind, align: Alignment, zoom: f32) -> Self {
        let (size, monospace, italics, color) = match kind {
            TextKind::Heading(1) => (26.0, false, false, Color32::BLACK),
            TextKind::Heading(2) => (21.0, false, false, Color32::BLACK),
            TextKind::Heading(3) => (18.0, false, false, Color32::BLACK),
            TextKind::Heading(_) => (16.0, false, false, Color32::BLACK),
            TextKind::CodeBlock => (13.5, true, false, COLOR_TEXT_PRIMARY),
            TextKind::Quote => (BODY_FONT_SIZE, false, true, COLOR_TEXT_SECONDARY),
            TextKind::Paragraph | TextKind::BulletItem | TextKind::OrderedItem => {
                (BODY_FONT_SIZE, false, false, COLOR_TEXT_PRIMARY)
            }
        };
        let (align, justify) = match align {
            Alignment::Left => (egui::Align::Min, false),
            Alignment::Center => (egui::Align::Center, false),
            Alignment::Right => (egui::Align::Max, false),
            Alignment::Justify => (egui::Align::Min, true),
        };
        Self {
            size: size * zoom,
            monospace,
            color,
            italics,
            align,
            justify,
            zoom,
        }
    }

    fn for_cell(zoom: f32) -> Self {
        Self::for_block(TextKind::Paragraph, Alignment::Left, zoom)
    }
}

/// Point sizes are stored in runs; the canvas draws at 96 px per inch.
fn points_to_ui(points: u16) -> f32 {
    f32::from(points) * 4.0 / 3.0
}

fn is_monospace_family(family: &str) -> bool {
    let family = family.to_ascii_lowercase();
    family.contains("mono") || family.contains("courier") || family.contains("consolas")
}

fn text_format(base: SegmentFormat, style: Option<&RunStyle>, background: Option<Color32>) -> TextFormat {
    let family = |mono: bool| {
        if mono {
            FontFamily::Monospace
        } else {
            FontFamily::Proportional
        }
    };
    let mut format = TextFormat {
        font_id: FontId::new(base.size, family(base.monospace)),
        color: base.color,
        italics: base.italics,
        ..Default::default()
    };
    let mut fill = background;
    if let Some(style) = style {
        if let Some(points) = style.font_size {
            format.font_id.size = points_to_ui(points) * base.zoom;
        }
        let mono = base.monospace
            || style.code
            || style.font_family.as_deref().is_some_and(is_monospace_family);
        format.font_id.family = family(mono);
        if style.bold {
            format.color = Color32::BLACK;
        }
        if let Some(color) = style
            .color
            .as_deref()
            .and_then(|hex| Color32::from_hex(hex).ok())
        {
            format.color = color;
        }
        if style.link.is_some() {
            format.color = COLOR_ACCENT;
        }
        format.italics |= style.italic;
        if style.underline || style.link.is_some() {
            format.underline = Stroke::new(1.0, format.color);
        }
        if style.strike {
            format.strikethrough = Stroke::new(1.0, format.color);
        }
        if fill.is_none() && style.highlight {
            fill = Some(COLOR_HIGHLIGHT);
        }
        if fill.is_none() && style.code {
            fill = Some(COLOR_CODE_BG);
        }
    }
    if let Some(fill) = fill {
        format.background = fill;
    }
    format
}

fn run_style_at(runs: &[Run], at: usize) -> Option<&RunStyle> {
    let mut start = 0;
    for run in runs {
        let end = start + run.text.chars().count();
        if at >= start && at < end {
            return Some(&run.style);
        }
        start = end;
    }
    None
}

/// Build the layout job for one segment.
///
/// `highlights` are char ranges local to the segment. When `text` no longer
/// matches the runs (the widget buffer is ahead of the document) the run
/// styles are skipped for this frame.
pub(crate) fn segment_layout_job(
    text: &str,
    runs: &[Run],
    base: SegmentFormat,
    highlights: &[(Range<usize>, Color32)],
    wrap_width: f32,
) -> LayoutJob {
    let len = text.chars().count();
    let styled = runs.iter().map(|run| run.text.as_str()).collect::<String>() == text;

    let mut boundaries = vec![0, len];
    if styled {
        let mut offset = 0;
        for run in runs {
            offset += run.text.chars().count();
            boundaries.push(offset);
        }
    }
    for (range, _) in highlights {
        boundaries.push(range.start.min(len));
        boundaries.push(range.end.min(len));
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let byte_at: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut sections = Vec::new();
    for pair in boundaries.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from >= to {
            continue;
        }
        let style = if styled { run_style_at(runs, from) } else { None };
        let background = highlights
            .iter()
            .find(|(range, _)| range.start <= from && from < range.end)
            .map(|(_, color)| *color);
        sections.push(LayoutSection {
            leading_space: 0.0,
            byte_range: byte_at[from]..byte_at[to],
            format: text_format(base, style, background),
        });
    }
    if sections.is_empty() {
        // The caret of an empty segment takes its height from this format.
        let style = if styled { runs.first().map(|run| &run.style) } else { None };
        sections.push(LayoutSection {
            leading_space: 0.0,
            byte_range: 0..text.len(),
            format: text_format(base, style, None),
        });
    }

    LayoutJob {
        text: text.to_string(),
        sections,
        wrap: TextWrapping {
            max_width: wrap_width,
            ..Default::default()
        },
        halign: base.align,
        justify: base.justify,
        ..Default::default()
    }
}

fn segment_start(segments: &[TextSegment], node: NodeRef) -> Option<usize> {
    segments
        .iter()
        .find(|segment| segment.node == node)
        .map(|segment| segment.start)
}

impl QuillApp {
    pub(crate) fn render_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(COLOR_BG_DESK))
            .show(ctx, |ui| {
                let paper_width = self.ruler.page_width_px() as f32;
                let page_left = ((ui.available_width() - paper_width) / 2.0).max(PAPER_GUTTER);
                if self.ruler_visible {
                    self.show_ruler(ui, page_left);
                }
                egui::ScrollArea::both()
                    .id_salt("canvas_scroll")
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui.add_space(PAPER_GUTTER);
                        ui.horizontal_top(|ui| {
                            ui.spacing_mut().item_spacing.x = 0.0;
                            ui.add_space(page_left);
                            self.show_paper(ui, paper_width);
                            ui.add_space(PAPER_GUTTER);
                        });
                        ui.add_space(PAPER_GUTTER);
                    });
            });
    }

    fn show_paper(&mut self, ui: &mut egui::Ui, paper_width: f32) {
        let zoom_percent = self.zoom();
        let to_px = |inches: f64| to_pixels(inches, zoom_percent) as f32;
        let state = self.ruler.state();
        let left = to_px(state.left_margin);
        let right = to_px(state.right_margin);
        let top = to_px(self.page.margins.top);
        let bottom = to_px(self.page.margins.bottom);
        let min_height = to_px(self.page.page_height());
        let content_width = (paper_width - left - right).max(1.0);
        let zoom = (zoom_percent / 100.0) as f32;

        let top_left = ui.cursor().min;
        let background = ui.painter().add(Shape::Noop);
        let response = ui
            .vertical(|ui| {
                ui.set_width(paper_width);
                ui.set_min_height(min_height);
                ui.spacing_mut().item_spacing = egui::vec2(0.0, 0.0);
                ui.add_space(top);
                ui.horizontal_top(|ui| {
                    ui.add_space(left);
                    ui.vertical(|ui| {
                        ui.set_width(content_width);
                        self.show_blocks(ui, content_width, zoom);
                    });
                });
                ui.add_space(bottom);
            })
            .response;
        let paper = Rect::from_min_size(top_left, egui::vec2(paper_width, response.rect.height()));
        ui.painter()
            .set(background, Shape::rect_filled(paper, 2.0, COLOR_PAPER));
    }

    fn show_blocks(&mut self, ui: &mut egui::Ui, width: f32, zoom: f32) {
        let blocks = self.document.blocks().to_vec();
        let segments = self.document.text_segments();
        let pointer_busy = ui.input(|input| {
            input.pointer.any_pressed() || input.pointer.any_released()
        });
        let mut actions = Vec::new();
        let mut ordinal = 0;

        for (index, block) in blocks.iter().enumerate() {
            match block {
                Block::Text(text_block) => {
                    ordinal = if text_block.kind == TextKind::OrderedItem {
                        ordinal + 1
                    } else {
                        0
                    };
                    let start = segment_start(&segments, NodeRef::Block(index)).unwrap_or(0);
                    self.show_text_block(
                        ui,
                        index,
                        text_block,
                        start,
                        ordinal,
                        width,
                        zoom,
                        pointer_busy,
                        &mut actions,
                    );
                }
                Block::Rule => {
                    ordinal = 0;
                    ui.add(egui::Separator::default().horizontal().spacing(18.0 * zoom));
                }
                Block::Table(table) => {
                    ordinal = 0;
                    self.show_table(
                        ui,
                        index,
                        table,
                        &segments,
                        width,
                        zoom,
                        pointer_busy,
                        &mut actions,
                    );
                }
            }
            ui.add_space(BLOCK_SPACING * zoom);
        }

        // A pending cursor whose widget no longer exists is dropped too.
        if !pointer_busy {
            self.pending_cursor = None;
        }
        self.apply_canvas_actions(actions);
        if self.pending_cursor.is_some() {
            ui.ctx().request_repaint();
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn show_text_block(
        &mut self,
        ui: &mut egui::Ui,
        index: usize,
        block: &TextBlock,
        start: usize,
        ordinal: usize,
        width: f32,
        zoom: f32,
        pointer_busy: bool,
        actions: &mut Vec<CanvasAction>,
    ) {
        let node = NodeRef::Block(index);
        let text = block.text();
        let format = SegmentFormat::for_block(block.kind, block.align, zoom);
        let highlights = self.match_highlights(start, text.chars().count());
        let mut editor = |app: &mut Self, ui: &mut egui::Ui, width: f32| {
            app.show_segment_editor(
                ui,
                node,
                &text,
                &block.runs,
                format,
                &highlights,
                width,
                pointer_busy,
                actions,
            );
        };

        match block.kind {
            TextKind::BulletItem | TextKind::OrderedItem => {
                let marker = if block.kind == TextKind::BulletItem {
                    "\u{2022}".to_string()
                } else {
                    format!("{ordinal}.")
                };
                ui.horizontal_top(|ui| {
                    let marker_width = LIST_MARKER_WIDTH * zoom;
                    ui.add_sized(
                        [marker_width, format.size * 1.3],
                        egui::Label::new(
                            egui::RichText::new(marker)
                                .size(format.size)
                                .color(COLOR_TEXT_SECONDARY),
                        ),
                    );
                    editor(self, ui, width - marker_width);
                });
            }
            TextKind::Quote => {
                let response = ui
                    .horizontal_top(|ui| {
                        ui.add_space(QUOTE_INDENT * zoom);
                        editor(self, ui, width - QUOTE_INDENT * zoom);
                    })
                    .response;
                ui.painter().vline(
                    response.rect.left() + 3.0,
                    response.rect.y_range(),
                    Stroke::new(3.0, COLOR_BORDER),
                );
            }
            TextKind::CodeBlock => {
                egui::Frame::new()
                    .fill(COLOR_CODE_BG)
                    .corner_radius(egui::CornerRadius::same(4))
                    .inner_margin(Margin::same(CODE_PADDING))
                    .show(ui, |ui| {
                        editor(self, ui, width - 2.0 * f32::from(CODE_PADDING));
                    });
            }
            TextKind::Paragraph | TextKind::Heading(_) => editor(self, ui, width),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn show_table(
        &mut self,
        ui: &mut egui::Ui,
        index: usize,
        table: &TableBlock,
        segments: &[TextSegment],
        width: f32,
        zoom: f32,
        pointer_busy: bool,
        actions: &mut Vec<CanvasAction>,
    ) {
        let cols = table.rows.first().map(Vec::len).unwrap_or(1).max(1);
        let cell_width = (width / cols as f32 - 14.0).max(24.0);
        let format = SegmentFormat::for_cell(zoom);
        egui::Grid::new(("quill_table", index))
            .num_columns(cols)
            .spacing([4.0, 4.0])
            .show(ui, |ui| {
                for (row, cells) in table.rows.iter().enumerate() {
                    for (col, cell) in cells.iter().enumerate() {
                        let node = NodeRef::Cell {
                            block: index,
                            row,
                            col,
                        };
                        let start = segment_start(segments, node).unwrap_or(0);
                        let highlights = self.match_highlights(start, cell.chars().count());
                        let runs = [Run::plain(cell.clone())];
                        egui::Frame::new()
                            .stroke(Stroke::new(1.0, COLOR_BORDER))
                            .inner_margin(Margin::same(4))
                            .show(ui, |ui| {
                                self.show_segment_editor(
                                    ui,
                                    node,
                                    cell,
                                    &runs,
                                    format,
                                    &highlights,
                                    cell_width,
                                    pointer_busy,
                                    actions,
                                );
                            });
                    }
                    ui.end_row();
                }
            });
    }

    #[allow(clippy::too_many_arguments)]
    fn show_segment_editor(
        &mut self,
        ui: &mut egui::Ui,
        node: NodeRef,
        text: &str,
        runs: &[Run],
        format: SegmentFormat,
        highlights: &[(Range<usize>, Color32)],
        width: f32,
        pointer_busy: bool,
        actions: &mut Vec<CanvasAction>,
    ) {
        let id = segment_widget_id(node);
        let ctx = ui.ctx().clone();

        let mut scroll_into_view = false;
        if let Some(pending) = self.pending_cursor.filter(|pending| pending.node == node) {
            if !pointer_busy {
                let mut state = egui::text_edit::TextEditState::load(&ctx, id).unwrap_or_default();
                state.cursor.set_char_range(Some(CCursorRange::two(
                    CCursor::new(pending.anchor),
                    CCursor::new(pending.head),
                )));
                state.store(&ctx, id);
                if pending.focus {
                    ctx.memory_mut(|memory| memory.request_focus(id));
                }
                scroll_into_view = pending.scroll;
                self.pending_cursor = None;
            }
        }

        if let NodeRef::Block(block) = node {
            if block > 0 && ctx.memory(|memory| memory.has_focus(id)) {
                let at_start = egui::text_edit::TextEditState::load(&ctx, id)
                    .and_then(|state| state.cursor.char_range())
                    .is_some_and(|range| range.primary.index == 0 && range.secondary.index == 0);
                if at_start
                    && ctx.input_mut(|input| {
                        input.consume_key(egui::Modifiers::NONE, egui::Key::Backspace)
                    })
                {
                    actions.push(CanvasAction::Join { block });
                }
            }
        }

        let mut buffer = text.to_string();
        let mut layouter = |ui: &egui::Ui, buffer: &dyn egui::TextBuffer, wrap_width: f32| {
            let job = segment_layout_job(buffer.as_str(), runs, format, highlights, wrap_width);
            ui.fonts_mut(|fonts| fonts.layout_job(job))
        };
        let output = egui::TextEdit::multiline(&mut buffer)
            .id(id)
            .frame(false)
            .margin(Margin::ZERO)
            .desired_width(width.max(1.0))
            .desired_rows(1)
            .horizontal_align(format.align)
            .layouter(&mut layouter)
            .show(ui);

        if scroll_into_view {
            output.response.scroll_to_me(Some(egui::Align::Center));
        }
        if output.response.changed() {
            actions.push(CanvasAction::Sync {
                node,
                text: buffer.clone(),
            });
        }
        if output.response.has_focus() {
            if let Some(range) = output.cursor_range {
                actions.push(CanvasAction::Select {
                    node,
                    anchor: range.secondary.index,
                    head: range.primary.index,
                });
            }
        }
    }

    /// Find-bar matches inside the segment starting at `start`, as local ranges.
    fn match_highlights(&self, start: usize, len: usize) -> Vec<(Range<usize>, Color32)> {
        if !self.find_open {
            return Vec::new();
        }
        let current = self.search.current().map(|span| span.from);
        self.search
            .matches()
            .iter()
            .filter(|span| span.from >= start && span.to <= start + len)
            .map(|span| {
                let color = if Some(span.from) == current {
                    COLOR_MATCH_CURRENT
                } else {
                    COLOR_MATCH_FILL
                };
                (span.from - start..span.to - start, color)
            })
            .collect()
    }

    fn apply_canvas_actions(&mut self, actions: Vec<CanvasAction>) {
        let mut structural = false;
        for action in actions {
            match action {
                CanvasAction::Sync { node, text } => {
                    structural |= self.sync_segment_text(node, &text);
                }
                CanvasAction::Join { block } => {
                    self.join_backward(block);
                    structural = true;
                }
                CanvasAction::Select { node, anchor, head } => {
                    if !structural {
                        self.selection_from_widget(node, anchor, head);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::document::RunStyle;

    fn base() -> SegmentFormat {
        SegmentFormat::for_block(TextKind::Paragraph, Alignment::Left, 1.0)
    }

    #[test]
    fn layout_job_splits_sections_at_run_and_match_boundaries() {
        let bold = RunStyle {
            bold: true,
            ..Default::default()
        };
        let runs = vec![Run::plain("hello "), Run::styled("wörld", bold)];
        let job = segment_layout_job(
            "hello wörld",
            &runs,
            base(),
            &[(4..8, COLOR_MATCH_CURRENT)],
            300.0,
        );

        let ranges: Vec<_> = job
            .sections
            .iter()
            .map(|section| section.byte_range.clone())
            .collect();
        // chars 0..4 | 4..6 | 6..8 | 8..11, with 'ö' taking two bytes.
        assert_eq!(ranges, vec![0..4, 4..6, 6..9, 9..12]);
        assert_eq!(job.sections[1].format.background, COLOR_MATCH_CURRENT);
        assert_eq!(job.sections[2].format.color, Color32::BLACK);
        assert_eq!(job.sections[3].format.background, Color32::TRANSPARENT);
        assert_eq!(job.wrap.max_width, 300.0);
    }

    #[test]
    fn layout_job_falls_back_to_plain_when_buffer_diverges() {
        let underline = RunStyle {
            underline: true,
            ..Default::default()
        };
        let runs = vec![Run::styled("abc", underline)];
        let job = segment_layout_job("abcd", &runs, base(), &[], 100.0);
        assert_eq!(job.sections.len(), 1);
        assert_eq!(job.sections[0].format.underline, Stroke::NONE);
    }

    #[test]
    fn empty_segment_still_gets_a_section() {
        let job = segment_layout_job("", &[], base(), &[], 100.0);
        assert_eq!(job.sections.len(), 1);
        assert_eq!(job.sections[0].byte_range, 0..0);
    }

    #[test]
    fn run_styles_map_to_text_formats() {
        let style = RunStyle {
            italic: true,
            strike: true,
            code: true,
            color: Some("#ff0000".to_string()),
            font_size: Some(24),
            ..Default::default()
        };
        let format = text_format(base(), Some(&style), None);
        assert!(format.italics);
        assert_eq!(format.color, Color32::from_rgb(255, 0, 0));
        assert_eq!(format.strikethrough, Stroke::new(1.0, Color32::from_rgb(255, 0, 0)));
        assert_eq!(format.font_id.family, FontFamily::Monospace);
        assert_eq!(format.font_id.size, 32.0);
        assert_eq!(format.background, COLOR_CODE_BG);

        let link = RunStyle {
            link: Some("https://example.com".to_string()),
            ..Default::default()
        };
        let format = text_format(base(), Some(&link), None);
        assert_eq!(format.color, COLOR_ACCENT);
        assert_eq!(format.underline, Stroke::new(1.0, COLOR_ACCENT));
    }

    #[test]
    fn justify_and_heading_formats() {
        let heading = SegmentFormat::for_block(TextKind::Heading(1), Alignment::Justify, 2.0);
        assert_eq!(heading.size, 52.0);
        assert!(heading.justify);
        assert_eq!(heading.align, egui::Align::Min);
        let centered = SegmentFormat::for_block(TextKind::Quote, Alignment::Center, 1.0);
        assert!(centered.italics);
        assert_eq!(centered.align, egui::Align::Center);
    }
}
