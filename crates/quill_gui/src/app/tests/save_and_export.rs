//! Save, autosave, load, export, and import command emission tests.

use super::*;
use crate::backend::CoreErrorSource;
use chrono::Utc;
use crossbeam_channel::TryRecvError;
use quill_core::export::ExportFormat;
use quill_core::storage::DocumentSnapshot;

fn type_into_first_block(app: &mut QuillApp, text: &str) {
    let _ = app.sync_segment_text(NodeRef::Block(0), text);
}

#[test]
fn save_now_sends_snapshot_with_current_revision() {
    let mut harness = make_app();
    harness.app.title = "Trip notes".to_string();
    type_into_first_block(&mut harness.app, "Pack light.");
    assert_eq!(harness.app.save_status, SaveStatus::Dirty);

    harness.app.save_now();

    assert_eq!(harness.app.save_status, SaveStatus::Saving);
    assert!(harness.app.save_in_flight);
    match recv_cmd(&harness.cmd_rx) {
        CoreCmd::SaveSnapshot { snapshot, revision } => {
            assert_eq!(snapshot.title, "Trip notes");
            assert!(snapshot.html.contains("Pack light."));
            assert_eq!(revision, harness.app.document.revision());
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn save_now_is_a_noop_when_clean() {
    let mut harness = make_app();
    harness.app.save_now();
    assert!(matches!(harness.cmd_rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(harness.app.save_status, SaveStatus::Saved);
}

#[test]
fn matching_save_ack_marks_saved() {
    let mut harness = make_app();
    type_into_first_block(&mut harness.app, "draft");
    harness.app.save_now();
    let CoreCmd::SaveSnapshot { revision, .. } = recv_cmd(&harness.cmd_rx) else {
        panic!("expected save");
    };

    harness.app.apply_event(CoreEvent::SnapshotSaved {
        revision,
        saved_at: Utc::now(),
    });

    assert_eq!(harness.app.save_status, SaveStatus::Saved);
    assert!(!harness.app.save_in_flight);
    assert!(harness.app.last_saved_at.is_some());
    assert!(harness.app.last_edit_at.is_none());
}

#[test]
fn edits_during_save_keep_document_dirty() {
    let mut harness = make_app();
    type_into_first_block(&mut harness.app, "draft");
    harness.app.save_now();
    let CoreCmd::SaveSnapshot { revision, .. } = recv_cmd(&harness.cmd_rx) else {
        panic!("expected save");
    };
    type_into_first_block(&mut harness.app, "draft two");

    harness.app.apply_event(CoreEvent::SnapshotSaved {
        revision,
        saved_at: Utc::now(),
    });

    assert_eq!(harness.app.save_status, SaveStatus::Dirty);
    assert!(!harness.app.save_in_flight);
}

#[test]
fn save_error_returns_to_dirty_with_message() {
    let mut harness = make_app();
    type_into_first_block(&mut harness.app, "draft");
    harness.app.save_now();
    let _ = recv_cmd(&harness.cmd_rx);

    harness.app.apply_event(CoreEvent::Error {
        source: CoreErrorSource::Save,
        message: "Save failed: disk full".to_string(),
    });

    assert_eq!(harness.app.save_status, SaveStatus::Dirty);
    assert!(!harness.app.save_in_flight);
    assert!(harness.app.save_request_revision.is_none());
    assert_eq!(status_text(&harness.app), Some("Save failed: disk full"));
}

#[test]
fn disconnected_backend_reverts_save_to_dirty() {
    let TestHarness {
        dir: _dir,
        mut app,
        cmd_rx,
    } = make_app();
    drop(cmd_rx);
    type_into_first_block(&mut app, "draft");

    app.save_now();

    assert_eq!(app.save_status, SaveStatus::Dirty);
    assert!(!app.save_in_flight);
    assert_eq!(status_text(&app), Some("Save failed: backend unavailable."));
}

#[test]
fn autosave_waits_for_idle_delay() {
    let mut harness = make_app();
    type_into_first_block(&mut harness.app, "draft");

    harness.app.autosave_delay = Some(Duration::from_secs(3600));
    harness.app.maybe_autosave();
    assert!(matches!(harness.cmd_rx.try_recv(), Err(TryRecvError::Empty)));

    harness.app.autosave_delay = Some(Duration::ZERO);
    harness.app.maybe_autosave();
    assert!(matches!(
        recv_cmd(&harness.cmd_rx),
        CoreCmd::SaveSnapshot { .. }
    ));

    // A second pass while the first save is in flight sends nothing.
    harness.app.maybe_autosave();
    assert!(matches!(harness.cmd_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn disabled_autosave_never_fires() {
    let mut harness = make_app();
    type_into_first_block(&mut harness.app, "draft");
    harness.app.autosave_delay = None;
    harness.app.maybe_autosave();
    assert!(matches!(harness.cmd_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn loaded_snapshot_replaces_document_and_history() {
    let mut harness = make_app();
    type_into_first_block(&mut harness.app, "scratch");
    assert!(harness.app.history.can_undo());

    harness.app.apply_event(CoreEvent::SnapshotLoaded {
        snapshot: DocumentSnapshot::new("Plan", "<h1>Goals</h1><p>Ship it</p>"),
    });

    assert_eq!(harness.app.title, "Plan");
    assert_eq!(block_texts(&harness.app), vec!["Goals", "Ship it"]);
    assert_eq!(harness.app.save_status, SaveStatus::Saved);
    assert!(!harness.app.history.can_undo());
    assert!(harness.app.last_saved_at.is_some());
}

#[test]
fn snapshot_with_blank_title_falls_back_to_default() {
    let mut harness = make_app();
    harness.app.apply_event(CoreEvent::SnapshotLoaded {
        snapshot: DocumentSnapshot::new("   ", "<p>body</p>"),
    });
    assert_eq!(harness.app.title, DEFAULT_DOCUMENT_TITLE);
}

#[test]
fn missing_and_cleared_snapshots_only_report() {
    let mut harness = make_app();
    harness.app.apply_event(CoreEvent::SnapshotMissing);
    assert_eq!(status_text(&harness.app), Some("No saved document found."));
    assert_eq!(harness.app.save_status, SaveStatus::Saved);

    harness
        .app
        .apply_event(CoreEvent::SnapshotCleared { existed: false });
    assert_eq!(status_text(&harness.app), Some("Nothing saved to clear."));
}

#[test]
fn load_and_clear_send_commands() {
    let mut harness = make_app();
    harness.app.load_saved();
    assert!(matches!(recv_cmd(&harness.cmd_rx), CoreCmd::LoadSnapshot));
    harness.app.clear_saved();
    assert!(matches!(recv_cmd(&harness.cmd_rx), CoreCmd::ClearSnapshot));
}

#[test]
fn export_sends_request_with_title_and_page() {
    let mut harness = make_app_with_paragraphs(&["Quarterly numbers"]);
    harness.app.title = "Q3 Report".to_string();
    harness.app.page.margins.left = 1.5;
    let path = harness.dir.path().join("q3-report.md");

    harness
        .app
        .dispatch_export(ExportFormat::Markdown, path.clone());

    match recv_cmd(&harness.cmd_rx) {
        CoreCmd::Export {
            request,
            path: sent_path,
        } => {
            assert_eq!(sent_path, path);
            assert_eq!(request.title, "Q3 Report");
            assert_eq!(request.format, ExportFormat::Markdown);
            assert_eq!(request.page, harness.app.page);
            assert!(request.html.contains("Quarterly numbers"));
        }
        other => panic!("unexpected command: {:?}", other),
    }
    assert_eq!(status_text(&harness.app), Some("Exporting Markdown..."));
}

#[test]
fn exported_event_reports_destination() {
    let mut harness = make_app();
    let path = harness.dir.path().join("out.html");
    harness.app.apply_event(CoreEvent::Exported {
        path: path.clone(),
        format: ExportFormat::Html,
    });
    let expected = format!("Exported HTML to {}", path.display());
    assert_eq!(status_text(&harness.app), Some(expected.as_str()));
}

#[test]
fn import_sends_path_and_imported_document_is_dirty() {
    let (mut harness, evt_tx) = make_app_with_event_tx();
    let path = harness.dir.path().join("notes.md");
    harness.app.dispatch_import(path.clone());
    match recv_cmd(&harness.cmd_rx) {
        CoreCmd::ImportMarkdown { path: sent } => assert_eq!(sent, path),
        other => panic!("unexpected command: {:?}", other),
    }

    evt_tx
        .send(CoreEvent::MarkdownImported {
            title: "notes".to_string(),
            document: quill_core::document::from_markdown("# Notes\n\nFirst line"),
        })
        .expect("send event");
    while let Ok(event) = harness.app.backend.evt_rx.try_recv() {
        harness.app.apply_event(event);
    }

    assert_eq!(harness.app.title, "notes");
    assert_eq!(block_texts(&harness.app), vec!["Notes", "First line"]);
    assert_eq!(harness.app.save_status, SaveStatus::Dirty);
}
