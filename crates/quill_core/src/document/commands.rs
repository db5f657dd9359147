//! Formatting and insertion commands expressed as surface edits.
//!
//! Toolbar buttons, menu items and keyboard shortcuts all land here. Every
//! command reads the current selection and applies one or more [`Edit`]s.

use super::{
    Alignment, Block, Document, Edit, EditError, EditReceipt, EditorSurface, Mark, NodeRef,
    StyleChange, TableBlock, TextKind,
};
use std::ops::Range;

/// Selection range, or the word under the caret when nothing is selected.
pub fn effective_range(doc: &Document) -> Range<usize> {
    let selection = doc.selection();
    if selection.is_empty() {
        word_range_at(doc, selection.head)
    } else {
        selection.range()
    }
}

/// Range of the word touching `at`; empty when `at` sits between spaces.
pub fn word_range_at(doc: &Document, at: usize) -> Range<usize> {
    let Some(segment) = doc.segment_at(at) else {
        return at..at;
    };
    let chars: Vec<char> = segment.text.chars().collect();
    let local = at - segment.start;
    let is_word = |ch: char| ch.is_alphanumeric() || ch == '\'' || ch == '_';
    let mut start = local;
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = local;
    while end < chars.len() && is_word(chars[end]) {
        end += 1;
    }
    segment.start + start..segment.start + end
}

pub fn toggle_mark(doc: &mut Document, mark: Mark) -> Result<EditReceipt, EditError> {
    let range = effective_range(doc);
    let on = !doc.range_has_mark(range.clone(), mark);
    doc.apply(Edit::SetStyle {
        range,
        change: StyleChange::Mark(mark, on),
    })
}

/// Apply a non-toggling style change (color, font, size, clear).
pub fn apply_style(doc: &mut Document, change: StyleChange) -> Result<EditReceipt, EditError> {
    let range = effective_range(doc);
    doc.apply(Edit::SetStyle { range, change })
}

/// Kind of the block holding the caret.
pub fn current_block_kind(doc: &Document) -> Option<TextKind> {
    let at = doc.selection().head;
    let index = doc.segment_at(at).and_then(|segment| match segment.node {
        NodeRef::Block(index) => Some(index),
        NodeRef::Cell { .. } => None,
    })?;
    doc.blocks()[index].as_text().map(|block| block.kind)
}

pub fn current_alignment(doc: &Document) -> Alignment {
    doc.segment_at(doc.selection().head)
        .and_then(|segment| doc.blocks()[segment.node.block_index()].as_text())
        .map(|block| block.align)
        .unwrap_or_default()
}

/// Switch selected blocks to `kind`, or back to paragraphs when every one of
/// them already has it.
pub fn toggle_block_kind(doc: &mut Document, kind: TextKind) -> Result<EditReceipt, EditError> {
    let range = doc.selection().range();
    let indices = doc.text_blocks_in(range.clone());
    let all_match = !indices.is_empty()
        && indices.iter().all(|index| {
            doc.blocks()[*index]
                .as_text()
                .is_some_and(|block| block.kind == kind)
        });
    let kind = if all_match && kind != TextKind::Paragraph {
        TextKind::Paragraph
    } else {
        kind
    };
    doc.apply(Edit::SetBlockKind { range, kind })
}

pub fn set_alignment(doc: &mut Document, align: Alignment) -> Result<EditReceipt, EditError> {
    let range = doc.selection().range();
    doc.apply(Edit::SetAlignment { range, align })
}

/// Link the selection to `url`; with a caret, insert `label` as linked text.
pub fn insert_link(
    doc: &mut Document,
    url: &str,
    label: &str,
) -> Result<EditReceipt, EditError> {
    let url = url.trim();
    let link = if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    };
    let selection = doc.selection();
    let range = if selection.is_empty() {
        let label = if label.trim().is_empty() { url } else { label };
        if label.is_empty() {
            return doc.apply(Edit::SetStyle {
                range: selection.range(),
                change: StyleChange::Link(None),
            });
        }
        let receipt = doc.apply(Edit::insert(selection.head, label))?;
        receipt.range
    } else {
        selection.range()
    };
    doc.apply(Edit::SetStyle {
        range,
        change: StyleChange::Link(link),
    })
}

pub fn insert_rule(doc: &mut Document) -> Result<EditReceipt, EditError> {
    let at = doc.selection().head;
    doc.apply(Edit::InsertBlock {
        at,
        block: Block::Rule,
    })
}

pub fn insert_table(doc: &mut Document, rows: usize, cols: usize) -> Result<EditReceipt, EditError> {
    let at = doc.selection().head;
    doc.apply(Edit::InsertBlock {
        at,
        block: Block::Table(TableBlock::empty(rows, cols)),
    })
}

/// Replace the selection with `text`. Newlines outside code blocks start new
/// blocks.
pub fn insert_text(doc: &mut Document, text: &str) -> Result<EditReceipt, EditError> {
    let range = doc.selection().range();
    let receipt = doc.apply(Edit::Replace {
        range: range.clone(),
        text: text.to_string(),
    })?;
    split_inserted_newlines(doc, range.start, text, receipt)
}

/// Bring a text block's content in line with `new_text` (the canvas widget's
/// buffer) using the smallest replacement. Returns `None` when nothing changed.
pub fn sync_text_block(
    doc: &mut Document,
    block: usize,
    new_text: &str,
) -> Result<Option<EditReceipt>, EditError> {
    let (kind, old) = match doc.blocks().get(block) {
        Some(Block::Text(text)) => (text.kind, text.text()),
        _ => return Err(EditError::NotTextBlock { at: 0 }),
    };
    let Some(start) = doc.block_range(block).map(|range| range.start) else {
        return Err(EditError::NotTextBlock { at: 0 });
    };
    let Some((local, replacement)) = diff_chars(&old, new_text) else {
        return Ok(None);
    };
    let base = start + local.start;
    let receipt = doc.apply(Edit::Replace {
        range: base..start + local.end,
        text: replacement.clone(),
    })?;
    if kind == TextKind::CodeBlock {
        return Ok(Some(receipt));
    }
    split_inserted_newlines(doc, base, &replacement, receipt).map(Some)
}

/// Same as [`sync_text_block`] for a table cell; newlines become spaces.
pub fn sync_table_cell(
    doc: &mut Document,
    block: usize,
    row: usize,
    col: usize,
    new_text: &str,
) -> Result<Option<EditReceipt>, EditError> {
    let segment = doc
        .text_segments()
        .into_iter()
        .find(|segment| segment.node == NodeRef::Cell { block, row, col })
        .ok_or(EditError::NotTextBlock { at: 0 })?;
    let flattened = new_text.replace('\n', " ");
    let Some((local, replacement)) = diff_chars(&segment.text, &flattened) else {
        return Ok(None);
    };
    doc.apply(Edit::Replace {
        range: segment.start + local.start..segment.start + local.end,
        text: replacement,
    })
    .map(Some)
}

/// Merge block `block` into the previous text block (Backspace at block start).
pub fn join_with_previous(doc: &mut Document, block: usize) -> Result<EditReceipt, EditError> {
    let at = doc
        .block_range(block)
        .map(|range| range.start)
        .ok_or(EditError::NotTextBlock { at: 0 })?;
    doc.apply(Edit::JoinBackward { at })
}

/// Text covered by the selection.
pub fn selected_text(doc: &Document) -> String {
    let selection = doc.selection();
    doc.text_between(selection.from(), selection.to())
}

fn split_inserted_newlines(
    doc: &mut Document,
    base: usize,
    inserted: &str,
    mut receipt: EditReceipt,
) -> Result<EditReceipt, EditError> {
    let inserted_len = inserted.chars().count();
    let in_code = doc
        .segment_at(base)
        .and_then(|segment| doc.blocks()[segment.node.block_index()].as_text())
        .is_some_and(|block| block.kind == TextKind::CodeBlock);
    if in_code {
        return Ok(receipt);
    }
    // Deleting the newline and splitting adds a separator at the same offset,
    // so later positions stay valid.
    for (index, ch) in inserted.chars().enumerate() {
        if ch != '\n' {
            continue;
        }
        let at = base + index;
        doc.apply(Edit::delete(at..at + 1))?;
        receipt = doc.apply(Edit::SplitBlock { at })?;
    }
    let end = base + inserted_len;
    doc.set_selection(super::Selection::caret(end));
    Ok(EditReceipt {
        revision: receipt.revision,
        range: base..end,
    })
}

/// Smallest char range of `old` to replace, and its replacement, turning
/// `old` into `new`.
pub fn diff_chars(old: &str, new: &str) -> Option<(Range<usize>, String)> {
    if old == new {
        return None;
    }
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let prefix = old_chars
        .iter()
        .zip(&new_chars)
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = old_chars.len().min(new_chars.len()) - prefix;
    let suffix = old_chars
        .iter()
        .rev()
        .zip(new_chars.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    let replacement: String = new_chars[prefix..new_chars.len() - suffix].iter().collect();
    Some((prefix..old_chars.len() - suffix, replacement))
}
