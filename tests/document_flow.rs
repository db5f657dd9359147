//! End-to-end flows through the public API: import, edit, persist, export.

use quill::document::{from_html, from_markdown, to_html, EditorSurface};
use quill::export::{export, ExportError, ExportFormat, ExportRequest, HtmlPrinter};
use quill::page::PageSetup;
use quill::search::SearchSession;
use quill::storage::DocumentSnapshot;
use quill::SnapshotStore;
use std::sync::Mutex;
use tempfile::TempDir;

const NOTES: &str = "# Launch plan\n\nShip the draft on Friday.\n\n- review the draft\n- send the draft\n";

#[derive(Default)]
struct RecordingPrinter {
    pages: Mutex<Vec<String>>,
}

impl HtmlPrinter for RecordingPrinter {
    fn print_pdf(&self, html: &str, _page: &PageSetup) -> Result<Vec<u8>, ExportError> {
        self.pages
            .lock()
            .expect("printer lock")
            .push(html.to_string());
        Ok(b"%PDF-1.7 test".to_vec())
    }
}

#[test]
fn markdown_edit_save_and_reload() {
    let dir = TempDir::new().expect("temp dir");
    let mut document = from_markdown(NOTES);
    assert_eq!(document.blocks().len(), 4);

    let mut search = SearchSession::new();
    search.set_search_term(&document, "draft");
    assert_eq!(search.matches().len(), 3);
    search.set_replace_term("release");
    let replaced = search.replace_all(&mut document).expect("replace all");
    assert_eq!(replaced, 3);
    assert!(search.matches().is_empty());

    let edited = document.plain_text();
    assert!(edited.contains("Ship the release on Friday."));

    {
        let store = SnapshotStore::open(dir.path()).expect("open store");
        store
            .save(&DocumentSnapshot::new("Launch", to_html(&document)))
            .expect("save");
    }

    let store = SnapshotStore::open(dir.path()).expect("reopen store");
    let snapshot = store.load().expect("load").expect("snapshot present");
    assert_eq!(snapshot.title, "Launch");
    assert_eq!(from_html(&snapshot.html).plain_text(), edited);

    assert!(store.clear().expect("clear"));
    assert!(store.load().expect("load after clear").is_none());
    assert!(!store.clear().expect("second clear"));
}

#[test]
fn every_format_exports_the_same_document() {
    let document = from_markdown(NOTES);
    let printer = RecordingPrinter::default();
    let dir = TempDir::new().expect("temp dir");

    for format in ExportFormat::ALL {
        let request = ExportRequest {
            title: "Launch: plan?".to_string(),
            html: to_html(&document),
            format,
            page: PageSetup::default(),
        };
        let artifact = export(&request, &printer).expect("export");
        assert_eq!(
            artifact.file_name,
            format!("Launch_ plan_.{}", format.extension())
        );
        assert!(!artifact.bytes.is_empty());

        let path = dir.path().join(&artifact.file_name);
        artifact.write_to(&path).expect("write artifact");
        assert_eq!(std::fs::read(&path).expect("read back"), artifact.bytes);

        match format {
            ExportFormat::Markdown => {
                let text = String::from_utf8(artifact.bytes).expect("utf8");
                assert!(text.starts_with("# Launch plan"));
                assert!(text.contains("- send the draft"));
            }
            ExportFormat::Html => {
                let text = String::from_utf8(artifact.bytes).expect("utf8");
                assert!(text.contains("@page"));
                assert!(text.contains("<h1"));
            }
            ExportFormat::Docx => assert_eq!(&artifact.bytes[..2], b"PK"),
            ExportFormat::Pdf => assert!(artifact.bytes.starts_with(b"%PDF")),
        }
    }

    let pages = printer.pages.lock().expect("printer lock");
    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains("Ship the draft on Friday."));
}

#[test]
fn selection_survives_html_round_trip_offsets() {
    let mut document = from_markdown(NOTES);
    let restored = from_html(&to_html(&document));
    assert_eq!(restored.plain_text(), document.plain_text());

    let mut search = SearchSession::new();
    let first = search
        .set_search_term(&restored, "Friday")
        .expect("match in restored document");
    let same = search
        .set_search_term(&document, "friday")
        .expect("case-insensitive match");
    assert_eq!((first.from, first.to), (same.from, same.to));

    search.select_current(&mut document);
    assert_eq!(document.selection().range(), same.from..same.to);
}
