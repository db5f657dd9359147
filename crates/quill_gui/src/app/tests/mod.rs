//! Integration-style app tests that drive editor state without a window.

use super::*;
use crate::backend::{BackendHandle, CoreCmd, CoreEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use quill_core::document::{Block, EditorSurface, TextBlock, TextKind};
use tempfile::TempDir;

struct TestHarness {
    dir: TempDir,
    app: QuillApp,
    cmd_rx: Receiver<CoreCmd>,
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        db_path: dir.path().join("db").to_string_lossy().to_string(),
        auto_save_interval: 2000,
        default_zoom: 100.0,
        assistant_reveal_ms: 0,
        chrome_path: None,
        export_trace: false,
    }
}

fn make_app() -> TestHarness {
    let (cmd_tx, cmd_rx) = unbounded();
    let (_evt_tx, evt_rx) = unbounded();
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir);
    let app = QuillApp::with_backend(BackendHandle::from_test_channels(cmd_tx, evt_rx), &config);
    TestHarness { dir, app, cmd_rx }
}

fn make_app_with_event_tx() -> (TestHarness, Sender<CoreEvent>) {
    let mut harness = make_app();
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();
    harness.app.backend = BackendHandle::from_test_channels(cmd_tx, evt_rx);
    harness.cmd_rx = cmd_rx;
    (harness, evt_tx)
}

/// Harness whose document holds one paragraph per entry.
fn make_app_with_paragraphs(paragraphs: &[&str]) -> TestHarness {
    let mut harness = make_app();
    let blocks = paragraphs
        .iter()
        .map(|text| Block::Text(TextBlock::paragraph(*text)))
        .collect();
    harness.app.document = Document::from_blocks(blocks);
    harness
}

fn recv_cmd(rx: &Receiver<CoreCmd>) -> CoreCmd {
    rx.recv_timeout(Duration::from_millis(200))
        .expect("expected command")
}

fn status_text(app: &QuillApp) -> Option<&str> {
    app.status.as_ref().map(|status| status.text.as_str())
}

fn block_texts(app: &QuillApp) -> Vec<String> {
    app.document
        .blocks()
        .iter()
        .filter_map(|block| block.as_text().map(TextBlock::text))
        .collect()
}

fn run_frame(app: &mut QuillApp, ctx: &egui::Context) {
    let _ = ctx.run(egui::RawInput::default(), |ctx| {
        app.render_find_bar(ctx);
        app.render_status_bar(ctx);
        app.render_outline_panel(ctx);
        app.render_assistant_panel(ctx);
        app.render_canvas(ctx);
    });
}

#[test]
fn fresh_app_starts_saved_with_default_title() {
    let harness = make_app();
    assert_eq!(harness.app.title, DEFAULT_DOCUMENT_TITLE);
    assert_eq!(harness.app.save_status, SaveStatus::Saved);
    assert_eq!(harness.app.document.blocks().len(), 1);
    assert_eq!(harness.app.zoom(), 100.0);
    assert_eq!(
        harness.app.autosave_delay,
        Some(Duration::from_millis(2000))
    );
    assert!(harness.app.db_path.starts_with(&*harness.dir.path().to_string_lossy()));
}

#[test]
fn heading_blocks_render_with_outline_and_find_bar_open() {
    let mut harness = make_app();
    harness.app.document = Document::from_blocks(vec![
        Block::Text(TextBlock::new(TextKind::heading(1), "Plan")),
        Block::Text(TextBlock::paragraph("Ship the draft on Friday.")),
    ]);
    harness.app.open_find(false);
    harness.app.set_find_term("draft");
    let ctx = egui::Context::default();
    run_frame(&mut harness.app, &ctx);
    run_frame(&mut harness.app, &ctx);
    assert_eq!(harness.app.search.matches().len(), 1);
    assert!(harness.app.pending_cursor.is_none());
}

#[test]
fn pending_cursor_is_pushed_into_the_segment_widget() {
    let mut harness = make_app_with_paragraphs(&["hello world"]);
    harness
        .app
        .document
        .set_selection(quill_core::document::Selection::caret(5));
    harness.app.focus_selection(true, true);
    assert_eq!(
        harness.app.pending_cursor.map(|pending| (pending.anchor, pending.head)),
        Some((5, 5))
    );

    let ctx = egui::Context::default();
    run_frame(&mut harness.app, &ctx);

    assert!(harness.app.pending_cursor.is_none());
    let id = segment_widget_id(NodeRef::Block(0));
    let head = egui::text_edit::TextEditState::load(&ctx, id)
        .and_then(|state| state.cursor.char_range())
        .map(|range| range.primary.index);
    assert_eq!(head, Some(5));
}

mod editing_and_history;
mod save_and_export;
