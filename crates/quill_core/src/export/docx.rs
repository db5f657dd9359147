//! Word document writer built on docx-rs.
//!
//! Lists are written as plain paragraphs with a bullet or number prefix and
//! links as styled text followed by their target; both keep the output valid
//! without a numbering or relationship part.

use super::ExportError;
use crate::document::{Alignment, Block, Document, Run, RunStyle, TableBlock, TextBlock, TextKind};
use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Run as DocxRun, RunFonts, Style, StyleType, Table,
    TableCell, TableRow,
};
use std::io::Cursor;

const CODE_FONT: &str = "Courier New";
const LINK_COLOR: &str = "0563C1";
/// Heading sizes in half-points, indexed by level - 1.
const HEADING_SIZES: [usize; 6] = [40, 32, 28, 24, 22, 22];

fn heading_style_id(level: u8) -> String {
    format!("Heading{}", level.clamp(1, 6))
}

fn with_styles(mut docx: Docx) -> Docx {
    for (index, size) in HEADING_SIZES.iter().enumerate() {
        let level = index + 1;
        docx = docx.add_style(
            Style::new(heading_style_id(level as u8), StyleType::Paragraph)
                .name(format!("Heading {}", level))
                .size(*size)
                .bold(),
        );
    }
    docx.add_style(
        Style::new("Quote", StyleType::Paragraph)
            .name("Quote")
            .italic(),
    )
}

fn alignment_type(align: Alignment) -> AlignmentType {
    match align {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
        Alignment::Justify => AlignmentType::Both,
    }
}

/// `#rgb` / `#rrggbb` to the bare hex form Word expects. Named colors are
/// dropped.
fn hex_color(css: &str) -> Option<String> {
    let hex = css.trim().strip_prefix('#')?;
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(hex.to_ascii_uppercase()),
        3 => Some(
            hex.chars()
                .flat_map(|ch| [ch, ch])
                .collect::<String>()
                .to_ascii_uppercase(),
        ),
        _ => None,
    }
}

fn styled_run(text: &str, style: &RunStyle, force_code: bool) -> DocxRun {
    let mut run = DocxRun::new();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        if !line.is_empty() {
            run = run.add_text(line);
        }
    }
    if style.bold {
        run = run.bold();
    }
    if style.italic {
        run = run.italic();
    }
    if style.underline || style.link.is_some() {
        run = run.underline("single");
    }
    if style.strike {
        run = run.strike();
    }
    if style.highlight {
        run = run.highlight("yellow");
    }
    if let Some(size) = style.font_size {
        run = run.size(usize::from(size) * 2);
    }
    if style.code || force_code {
        run = run.fonts(RunFonts::new().ascii(CODE_FONT).hi_ansi(CODE_FONT));
    } else if let Some(family) = &style.font_family {
        run = run.fonts(RunFonts::new().ascii(family).hi_ansi(family));
    }
    match (&style.link, style.color.as_deref().and_then(hex_color)) {
        (_, Some(color)) => run = run.color(color),
        (Some(_), None) => run = run.color(LINK_COLOR),
        (None, None) => {}
    }
    run
}

fn add_runs(mut paragraph: Paragraph, runs: &[Run], force_code: bool) -> Paragraph {
    for run in runs {
        paragraph = paragraph.add_run(styled_run(&run.text, &run.style, force_code));
        if let Some(href) = &run.style.link {
            if href != &run.text {
                paragraph = paragraph.add_run(DocxRun::new().add_text(format!(" ({})", href)));
            }
        }
    }
    paragraph
}

fn text_paragraph(block: &TextBlock, ordinal: usize) -> Paragraph {
    let mut paragraph = Paragraph::new().align(alignment_type(block.align));
    let mut force_code = false;
    match block.kind {
        TextKind::Paragraph => {}
        TextKind::Heading(level) => paragraph = paragraph.style(&heading_style_id(level)),
        TextKind::BulletItem => paragraph = paragraph.add_run(DocxRun::new().add_text("\u{2022} ")),
        TextKind::OrderedItem => {
            paragraph = paragraph.add_run(DocxRun::new().add_text(format!("{}. ", ordinal)))
        }
        TextKind::Quote => paragraph = paragraph.style("Quote"),
        TextKind::CodeBlock => force_code = true,
    }
    add_runs(paragraph, &block.runs, force_code)
}

fn table(block: &TableBlock) -> Table {
    let rows = block
        .rows
        .iter()
        .map(|row| {
            TableRow::new(
                row.iter()
                    .map(|cell| {
                        TableCell::new()
                            .add_paragraph(Paragraph::new().add_run(DocxRun::new().add_text(cell)))
                    })
                    .collect(),
            )
        })
        .collect();
    Table::new(rows)
}

/// Write `document` as a `.docx` package.
///
/// # Errors
/// Returns [`ExportError::Docx`] when the package cannot be zipped.
pub fn document_to_docx(document: &Document) -> Result<Vec<u8>, ExportError> {
    let mut docx = with_styles(Docx::new());
    let mut ordinal = 0usize;
    for block in document.blocks() {
        match block {
            Block::Text(text) => {
                ordinal = if text.kind == TextKind::OrderedItem {
                    ordinal + 1
                } else {
                    0
                };
                docx = docx.add_paragraph(text_paragraph(text, ordinal));
            }
            Block::Rule => {
                ordinal = 0;
                docx = docx.add_paragraph(
                    Paragraph::new()
                        .align(AlignmentType::Center)
                        .add_run(DocxRun::new().add_text("* * *")),
                );
            }
            Block::Table(grid) => {
                ordinal = 0;
                docx = docx.add_table(table(grid));
            }
        }
    }
    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_accepts_short_and_long_forms() {
        assert_eq!(hex_color("#ff0000").as_deref(), Some("FF0000"));
        assert_eq!(hex_color("#0a3").as_deref(), Some("00AA33"));
        assert_eq!(hex_color("red"), None);
        assert_eq!(hex_color("#12345"), None);
    }

    #[test]
    fn every_block_kind_produces_a_package() {
        let mut bold = RunStyle::default();
        bold.bold = true;
        bold.color = Some("#336699".to_string());
        let mut link = RunStyle::default();
        link.link = Some("https://example.com".to_string());
        let mut heading = TextBlock::new(TextKind::heading(2), "Title");
        heading.align = Alignment::Center;
        let document = Document::from_blocks(vec![
            Block::Text(heading),
            Block::Text(TextBlock {
                kind: TextKind::Paragraph,
                align: Alignment::Justify,
                runs: vec![
                    Run::plain("plain "),
                    Run::styled("bold", bold),
                    Run::styled(" site", link),
                ],
            }),
            Block::Text(TextBlock::new(TextKind::OrderedItem, "first")),
            Block::Text(TextBlock::new(TextKind::OrderedItem, "second")),
            Block::Text(TextBlock::new(TextKind::CodeBlock, "fn main() {}\nlet x = 1;")),
            Block::Rule,
            Block::Table(TableBlock {
                rows: vec![vec!["a".to_string(), "b".to_string()]],
            }),
        ]);
        let bytes = document_to_docx(&document).expect("docx");
        assert_eq!(&bytes[..2], b"PK");
        assert!(bytes.len() > 1000);
    }
}
