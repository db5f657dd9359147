//! Backend worker wiring for the editor shell.
//!
//! This module exposes the command/event protocol plus the worker spawn helper
//! used by the egui UI thread.

mod protocol;
mod worker;

pub use protocol::{CoreCmd, CoreErrorSource, CoreEvent};
pub use worker::{spawn_backend, BackendHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::export::{ExportError, ExportFormat, ExportRequest, HtmlPrinter};
    use quill_core::page::PageSetup;
    use quill_core::storage::DocumentSnapshot;
    use quill_core::SnapshotStore;
    use std::time::Duration;
    use tempfile::TempDir;

    struct FakePrinter;

    impl HtmlPrinter for FakePrinter {
        fn print_pdf(&self, html: &str, _page: &PageSetup) -> Result<Vec<u8>, ExportError> {
            if html.contains("explode") {
                return Err(ExportError::Printer("renderer crashed".to_string()));
            }
            Ok(b"%PDF-fake".to_vec())
        }
    }

    struct TestBackend {
        dir: TempDir,
        backend: BackendHandle,
    }

    fn setup() -> TestBackend {
        let dir = TempDir::new().expect("temp dir");
        let store = SnapshotStore::open(dir.path().join("db")).expect("store");
        let backend = spawn_backend(store, Box::new(FakePrinter));
        TestBackend { dir, backend }
    }

    fn recv_event(rx: &crossbeam_channel::Receiver<CoreEvent>) -> CoreEvent {
        rx.recv_timeout(Duration::from_secs(2))
            .expect("expected backend event")
    }

    #[test]
    fn backend_saves_and_loads_snapshot() {
        let TestBackend { dir: _guard, backend } = setup();
        backend
            .cmd_tx
            .send(CoreCmd::LoadSnapshot)
            .expect("send load");
        assert!(matches!(
            recv_event(&backend.evt_rx),
            CoreEvent::SnapshotMissing
        ));

        let snapshot = DocumentSnapshot::new("Notes", "<p>hello</p>");
        backend
            .cmd_tx
            .send(CoreCmd::SaveSnapshot {
                snapshot: snapshot.clone(),
                revision: 7,
            })
            .expect("send save");
        match recv_event(&backend.evt_rx) {
            CoreEvent::SnapshotSaved { revision, saved_at } => {
                assert_eq!(revision, 7);
                assert_eq!(saved_at, snapshot.saved_at);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        backend
            .cmd_tx
            .send(CoreCmd::LoadSnapshot)
            .expect("send load");
        match recv_event(&backend.evt_rx) {
            CoreEvent::SnapshotLoaded { snapshot: loaded } => assert_eq!(loaded, snapshot),
            other => panic!("unexpected event: {:?}", other),
        }

        backend
            .cmd_tx
            .send(CoreCmd::ClearSnapshot)
            .expect("send clear");
        match recv_event(&backend.evt_rx) {
            CoreEvent::SnapshotCleared { existed } => assert!(existed),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn backend_exports_to_path_and_reports_printer_failures() {
        let TestBackend { dir, backend } = setup();
        let path = dir.path().join("out.pdf");
        backend
            .cmd_tx
            .send(CoreCmd::Export {
                request: ExportRequest {
                    title: "Doc".to_string(),
                    html: "<p>fine</p>".to_string(),
                    format: ExportFormat::Pdf,
                    page: PageSetup::default(),
                },
                path: path.clone(),
            })
            .expect("send export");
        match recv_event(&backend.evt_rx) {
            CoreEvent::Exported { path: written, format } => {
                assert_eq!(written, path);
                assert_eq!(format, ExportFormat::Pdf);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(std::fs::read(&path).expect("read pdf"), b"%PDF-fake");

        backend
            .cmd_tx
            .send(CoreCmd::Export {
                request: ExportRequest {
                    title: "Doc".to_string(),
                    html: "<p>explode</p>".to_string(),
                    format: ExportFormat::Pdf,
                    page: PageSetup::default(),
                },
                path: dir.path().join("broken.pdf"),
            })
            .expect("send export");
        match recv_event(&backend.evt_rx) {
            CoreEvent::Error { source, message } => {
                assert_eq!(source, CoreErrorSource::Export);
                assert!(message.contains("renderer crashed"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(!dir.path().join("broken.pdf").exists());
    }

    #[test]
    fn backend_imports_markdown_files() {
        let TestBackend { dir, backend } = setup();
        let path = dir.path().join("meeting notes.md");
        std::fs::write(&path, "# Agenda\n\n- budget\n- hiring\n").expect("write md");
        backend
            .cmd_tx
            .send(CoreCmd::ImportMarkdown { path })
            .expect("send import");
        match recv_event(&backend.evt_rx) {
            CoreEvent::MarkdownImported { title, document } => {
                assert_eq!(title, "meeting notes");
                assert_eq!(document.plain_text(), "Agenda\nbudget\nhiring");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        backend
            .cmd_tx
            .send(CoreCmd::ImportMarkdown {
                path: dir.path().join("missing.md"),
            })
            .expect("send import");
        match recv_event(&backend.evt_rx) {
            CoreEvent::Error { source, .. } => assert_eq!(source, CoreErrorSource::Import),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
