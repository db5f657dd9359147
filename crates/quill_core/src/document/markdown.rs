//! Markdown export and import.
//!
//! Underline, highlight, color and font attributes have no Markdown form and
//! are written as plain text.

use super::runs::{normalize, Run, RunStyle};
use super::{Block, Document, TableBlock, TextBlock, TextKind};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Render `document` as CommonMark with GFM tables and strikethrough.
pub fn to_markdown(document: &Document) -> String {
    let mut out = String::new();
    let mut previous: Option<TextKind> = None;
    let mut ordinal = 0usize;
    for block in document.blocks() {
        let kind = block.as_text().map(|text| text.kind);
        let is_list = matches!(kind, Some(TextKind::BulletItem | TextKind::OrderedItem));
        if !out.is_empty() {
            let same_list = is_list && previous == kind;
            out.push_str(if same_list { "\n" } else { "\n\n" });
        }
        if kind != Some(TextKind::OrderedItem) || previous != kind {
            ordinal = 0;
        }
        match block {
            Block::Text(text) => match text.kind {
                TextKind::Paragraph => out.push_str(&inline_markdown(&text.runs)),
                TextKind::Heading(level) => {
                    out.push_str(&"#".repeat(level as usize));
                    out.push(' ');
                    out.push_str(&inline_markdown(&text.runs));
                }
                TextKind::BulletItem => {
                    out.push_str("- ");
                    out.push_str(&inline_markdown(&text.runs).replace('\n', "\n  "));
                }
                TextKind::OrderedItem => {
                    ordinal += 1;
                    out.push_str(&format!("{}. ", ordinal));
                    out.push_str(&inline_markdown(&text.runs).replace('\n', "\n   "));
                }
                TextKind::Quote => {
                    out.push_str("> ");
                    out.push_str(&inline_markdown(&text.runs).replace('\n', "\n> "));
                }
                TextKind::CodeBlock => {
                    let body = text.text();
                    let fence = if body.contains("```") { "~~~" } else { "```" };
                    out.push_str(fence);
                    out.push('\n');
                    out.push_str(&body);
                    out.push('\n');
                    out.push_str(fence);
                }
            },
            Block::Rule => out.push_str("---"),
            Block::Table(table) => write_table(&mut out, table),
        }
        previous = kind;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn write_table(out: &mut String, table: &TableBlock) {
    let cols = table.rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    for (index, row) in table.rows.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push('|');
        for col in 0..cols {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            out.push(' ');
            out.push_str(&escape_markdown(cell).replace('|', "\\|"));
            out.push_str(" |");
        }
        if index == 0 {
            out.push_str("\n|");
            for _ in 0..cols {
                out.push_str(" --- |");
            }
        }
    }
}

fn inline_markdown(runs: &[Run]) -> String {
    let mut out = String::new();
    for run in runs {
        let lines: Vec<String> = run
            .text
            .split('\n')
            .map(|line| wrap_run(line, &run.style))
            .collect();
        out.push_str(&lines.join("  \n"));
    }
    out
}

/// Wrap one line of a run in its markers, keeping edge whitespace outside so
/// the emphasis delimiters stay flanking.
fn wrap_run(text: &str, style: &RunStyle) -> String {
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];
    let mut body = if style.code {
        let ticks = if core.contains('`') { "``" } else { "`" };
        let pad = if core.contains('`') { " " } else { "" };
        format!("{ticks}{pad}{core}{pad}{ticks}")
    } else {
        escape_markdown(core)
    };
    if style.italic {
        body = format!("*{}*", body);
    }
    if style.bold {
        body = format!("**{}**", body);
    }
    if style.strike {
        body = format!("~~{}~~", body);
    }
    if let Some(link) = &style.link {
        body = format!("[{}]({})", body, link.replace(' ', "%20").replace(')', "%29"));
    }
    format!("{leading}{body}{trailing}")
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // A leading "12." or "3)" would otherwise open an ordered list.
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    for (index, ch) in text.chars().enumerate() {
        let special = matches!(ch, '\\' | '*' | '_' | '`' | '[' | ']' | '~' | '<')
            || (index == 0 && matches!(ch, '#' | '>' | '-' | '+'))
            || (digits > 0 && index == digits && matches!(ch, '.' | ')'));
        if special {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn heading_level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[derive(Default)]
struct MarkdownReader {
    blocks: Vec<Block>,
    current: Option<TextBlock>,
    lists: Vec<TextKind>,
    quote_depth: usize,
    in_code: bool,
    strong_depth: usize,
    emphasis_depth: usize,
    strike_depth: usize,
    links: Vec<String>,
    table: Option<TableBlock>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

impl MarkdownReader {
    fn style(&self) -> RunStyle {
        RunStyle {
            bold: self.strong_depth > 0,
            italic: self.emphasis_depth > 0,
            strike: self.strike_depth > 0,
            link: self.links.last().cloned(),
            ..RunStyle::default()
        }
    }

    fn context_kind(&self) -> TextKind {
        if let Some(kind) = self.lists.last() {
            *kind
        } else if self.quote_depth > 0 {
            TextKind::Quote
        } else {
            TextKind::Paragraph
        }
    }

    fn open(&mut self, kind: TextKind) {
        if let Some(current) = &self.current {
            if current.runs.is_empty() && current.kind == kind {
                return;
            }
        }
        self.flush();
        self.current = Some(TextBlock::new(kind, ""));
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            if block.kind == TextKind::CodeBlock {
                if let Some(last) = block.runs.last_mut() {
                    if last.text.ends_with('\n') {
                        last.text.pop();
                    }
                }
            }
            normalize(&mut block.runs);
            self.blocks.push(Block::Text(block));
        }
    }

    fn append(&mut self, text: &str, style: RunStyle) {
        if let Some(cell) = &mut self.cell {
            cell.push_str(text);
            return;
        }
        if self.current.is_none() {
            let kind = self.context_kind();
            self.open(kind);
        }
        if let Some(block) = &mut self.current {
            match block.runs.last_mut() {
                Some(last) if last.style == style => last.text.push_str(text),
                _ => block.runs.push(Run::styled(text, style)),
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.cell.is_none() {
                    let kind = self.context_kind();
                    self.open(kind);
                }
            }
            Tag::Heading { level, .. } => {
                self.flush();
                self.open(TextKind::heading(heading_level_number(level)));
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(if start.is_some() {
                    TextKind::OrderedItem
                } else {
                    TextKind::BulletItem
                });
            }
            Tag::Item => {
                self.flush();
                let kind = self.context_kind();
                self.open(kind);
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code = true;
                self.open(TextKind::CodeBlock);
            }
            Tag::Emphasis => self.emphasis_depth += 1,
            Tag::Strong => self.strong_depth += 1,
            Tag::Strikethrough => self.strike_depth += 1,
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            Tag::Table(_) => {
                self.flush();
                self.table = Some(TableBlock { rows: Vec::new() });
            }
            Tag::TableHead | Tag::TableRow => self.row = Some(Vec::new()),
            Tag::TableCell => self.cell = Some(String::new()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item => {
                if self.cell.is_none() {
                    self.flush();
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.in_code = false;
            }
            TagEnd::Emphasis => self.emphasis_depth = self.emphasis_depth.saturating_sub(1),
            TagEnd::Strong => self.strong_depth = self.strong_depth.saturating_sub(1),
            TagEnd::Strikethrough => self.strike_depth = self.strike_depth.saturating_sub(1),
            TagEnd::Link => {
                self.links.pop();
            }
            TagEnd::TableCell => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    if !table.rows.is_empty() {
                        self.blocks.push(Block::Table(table));
                    }
                }
            }
            _ => {}
        }
    }
}

/// Parse Markdown into a document.
pub fn from_markdown(markdown: &str) -> Document {
    let mut reader = MarkdownReader::default();
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => reader.start(tag),
            Event::End(tag) => reader.end(tag),
            Event::Text(text) => {
                let style = if reader.in_code {
                    RunStyle::default()
                } else {
                    reader.style()
                };
                reader.append(&text, style);
            }
            Event::Code(text) => {
                let mut style = reader.style();
                style.code = true;
                reader.append(&text, style);
            }
            Event::SoftBreak => {
                let style = reader.style();
                reader.append(" ", style);
            }
            Event::HardBreak => {
                let style = reader.style();
                reader.append("\n", style);
            }
            Event::Rule => {
                reader.flush();
                reader.blocks.push(Block::Rule);
            }
            _ => {}
        }
    }
    reader.flush();
    Document::from_blocks(reader.blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_stays_outside_emphasis() {
        let style = RunStyle {
            bold: true,
            ..RunStyle::default()
        };
        assert_eq!(wrap_run(" bold ", &style), " **bold** ");
        assert_eq!(wrap_run("   ", &style), "   ");
    }

    #[test]
    fn special_characters_are_escaped() {
        assert_eq!(escape_markdown("# not *a* heading"), "\\# not \\*a\\* heading");
        assert_eq!(escape_markdown("a # b"), "a # b");
        assert_eq!(escape_markdown("2) second"), "2\\) second");
        assert_eq!(escape_markdown("v1. draft"), "v1. draft");
    }

    #[test]
    fn paragraph_starting_with_a_number_stays_a_paragraph() {
        let document = Document::from_blocks(vec![
            Block::Text(TextBlock::paragraph("1. Introduction")),
            Block::Text(TextBlock::paragraph("2024) was a long year")),
        ]);
        let markdown = to_markdown(&document);
        assert!(markdown.starts_with("1\\. Introduction"), "{markdown}");

        let restored = from_markdown(&markdown);
        let blocks: Vec<_> = restored
            .blocks()
            .iter()
            .filter_map(Block::as_text)
            .map(|text| (text.kind, text.text()))
            .collect();
        assert_eq!(
            blocks,
            vec![
                (TextKind::Paragraph, "1. Introduction".to_string()),
                (TextKind::Paragraph, "2024) was a long year".to_string()),
            ]
        );
    }

    #[test]
    fn inline_code_with_backticks_uses_double_fence() {
        let style = RunStyle {
            code: true,
            ..RunStyle::default()
        };
        assert_eq!(wrap_run("a`b", &style), "`` a`b ``");
    }
}
