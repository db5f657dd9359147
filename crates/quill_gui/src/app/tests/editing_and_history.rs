//! Canvas sync, formatting commands, outline jumps, and undo/redo.

use super::*;
use quill_core::document::{Alignment, Mark, Selection};
use quill_core::outline;

#[test]
fn typing_a_newline_splits_the_block_and_moves_the_cursor() {
    let mut harness = make_app_with_paragraphs(&["hello world"]);

    let structural = harness
        .app
        .sync_segment_text(NodeRef::Block(0), "hello\n world");

    assert!(structural);
    assert_eq!(block_texts(&harness.app), vec!["hello", " world"]);
    let pending = harness.app.pending_cursor.expect("pending cursor");
    assert_eq!(pending.node, NodeRef::Block(1));
    assert_eq!((pending.anchor, pending.head), (0, 0));
    assert!(pending.focus);
}

#[test]
fn plain_typing_is_not_structural() {
    let mut harness = make_app_with_paragraphs(&["hello"]);
    let structural = harness
        .app
        .sync_segment_text(NodeRef::Block(0), "hello there");
    assert!(!structural);
    assert!(harness.app.pending_cursor.is_none());
    assert_eq!(harness.app.save_status, SaveStatus::Dirty);
}

#[test]
fn unchanged_buffer_records_nothing() {
    let mut harness = make_app_with_paragraphs(&["same"]);
    let structural = harness.app.sync_segment_text(NodeRef::Block(0), "same");
    assert!(!structural);
    assert!(!harness.app.history.can_undo());
    assert_eq!(harness.app.save_status, SaveStatus::Saved);
}

#[test]
fn join_backward_merges_and_undo_restores_each_step() {
    let mut harness = make_app_with_paragraphs(&["hello world"]);
    harness
        .app
        .sync_segment_text(NodeRef::Block(0), "hello\n world");

    harness.app.join_backward(1);
    assert_eq!(block_texts(&harness.app), vec!["hello world"]);
    let pending = harness.app.pending_cursor.expect("pending cursor");
    assert_eq!((pending.node, pending.head), (NodeRef::Block(0), 5));

    harness.app.undo();
    assert_eq!(block_texts(&harness.app), vec!["hello", " world"]);
    harness.app.undo();
    assert_eq!(block_texts(&harness.app), vec!["hello world"]);
    assert_eq!(status_text(&harness.app), None);

    harness.app.undo();
    assert_eq!(status_text(&harness.app), Some("Nothing to undo."));

    harness.app.redo();
    assert_eq!(block_texts(&harness.app), vec!["hello", " world"]);
}

#[test]
fn join_on_first_block_is_ignored() {
    let mut harness = make_app_with_paragraphs(&["only"]);
    harness.app.join_backward(0);
    assert!(!harness.app.history.can_undo());
}

#[test]
fn widget_selection_maps_into_document_offsets() {
    let mut harness = make_app_with_paragraphs(&["first", "second"]);
    harness
        .app
        .selection_from_widget(NodeRef::Block(1), 1, 4);
    assert_eq!(harness.app.document.selection(), Selection::span(7, 10));

    // Offsets past the segment end clamp to it.
    harness
        .app
        .selection_from_widget(NodeRef::Block(0), 2, 99);
    assert_eq!(harness.app.document.selection(), Selection::span(2, 5));
}

#[test]
fn toggle_mark_applies_to_widget_selection() {
    let mut harness = make_app_with_paragraphs(&["make this bold"]);
    harness
        .app
        .selection_from_widget(NodeRef::Block(0), 10, 14);

    harness.app.toggle_mark(Mark::Bold);

    assert!(harness.app.document.range_has_mark(10..14, Mark::Bold));
    assert!(!harness.app.document.range_has_mark(0..4, Mark::Bold));
    assert_eq!(harness.app.save_status, SaveStatus::Dirty);

    harness.app.undo();
    assert!(!harness.app.document.range_has_mark(10..14, Mark::Bold));
}

#[test]
fn block_kind_and_alignment_follow_the_caret() {
    let mut harness = make_app_with_paragraphs(&["Title", "body"]);
    harness.app.selection_from_widget(NodeRef::Block(0), 0, 0);

    harness.app.toggle_block_kind(TextKind::heading(1));
    harness.app.set_alignment(Alignment::Center);

    let Some(first) = harness.app.document.blocks()[0].as_text() else {
        panic!("expected text block");
    };
    assert_eq!(first.kind, TextKind::heading(1));
    assert_eq!(first.align, Alignment::Center);
    let Some(second) = harness.app.document.blocks()[1].as_text() else {
        panic!("expected text block");
    };
    assert_eq!(second.kind, TextKind::Paragraph);
}

#[test]
fn insert_table_and_rule_add_blocks() {
    let mut harness = make_app_with_paragraphs(&["intro"]);
    harness.app.selection_from_widget(NodeRef::Block(0), 5, 5);

    harness.app.insert_table(2, 3);
    let table = harness
        .app
        .document
        .blocks()
        .iter()
        .find_map(|block| match block {
            Block::Table(table) => Some(table.clone()),
            _ => None,
        })
        .expect("table block");
    assert_eq!(table.rows.len(), 2);
    assert!(table.rows.iter().all(|row| row.len() == 3));

    harness.app.insert_rule();
    assert!(harness
        .app
        .document
        .blocks()
        .iter()
        .any(|block| matches!(block, Block::Rule)));
}

#[test]
fn table_cells_sync_without_splitting() {
    let mut harness = make_app();
    harness.app.document = Document::from_blocks(vec![Block::Table(
        quill_core::document::TableBlock::empty(1, 2),
    )]);
    let cell = NodeRef::Cell {
        block: 0,
        row: 0,
        col: 1,
    };

    let structural = harness.app.sync_segment_text(cell, "two\nlines");

    assert!(!structural);
    let Block::Table(table) = &harness.app.document.blocks()[0] else {
        panic!("expected table");
    };
    assert_eq!(table.rows[0][1], "two lines");
}

#[test]
fn insert_link_wraps_label() {
    let mut harness = make_app_with_paragraphs(&["see "]);
    harness.app.selection_from_widget(NodeRef::Block(0), 4, 4);

    harness.app.insert_link("https://example.com", "docs");

    assert_eq!(block_texts(&harness.app), vec!["see docs"]);
    assert_eq!(
        harness.app.document.style_at(5).link.as_deref(),
        Some("https://example.com")
    );
}

#[test]
fn outline_jump_selects_heading_and_focuses_it() {
    let mut harness = make_app();
    harness.app.document = Document::from_blocks(vec![
        Block::Text(TextBlock::paragraph("preface")),
        Block::Text(TextBlock::new(TextKind::heading(2), "Budget")),
    ]);
    let entries = outline::collect(&harness.app.document);
    assert_eq!(entries.len(), 1);

    harness.app.jump_to_heading(&entries[0]);

    assert_eq!(harness.app.document.selection(), Selection::span(8, 14));
    let pending = harness.app.pending_cursor.expect("pending cursor");
    assert_eq!(pending.node, NodeRef::Block(1));
    assert_eq!((pending.anchor, pending.head), (0, 6));
    assert!(pending.focus && pending.scroll);
}

#[test]
fn new_document_resets_state_and_marks_dirty() {
    let mut harness = make_app_with_paragraphs(&["old text"]);
    harness.app.title = "Old".to_string();
    harness.app.sync_segment_text(NodeRef::Block(0), "old text!");

    harness.app.new_document();

    assert_eq!(harness.app.title, DEFAULT_DOCUMENT_TITLE);
    assert_eq!(block_texts(&harness.app), vec![""]);
    assert!(!harness.app.history.can_undo());
    assert_eq!(harness.app.save_status, SaveStatus::Dirty);
    assert_eq!(
        harness.app.pending_cursor.map(|pending| pending.node),
        Some(NodeRef::Block(0))
    );
}
