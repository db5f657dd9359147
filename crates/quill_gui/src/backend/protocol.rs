//! Protocol types for the GUI backend worker.

use chrono::{DateTime, Utc};
use quill_core::document::Document;
use quill_core::export::{ExportFormat, ExportRequest};
use quill_core::storage::DocumentSnapshot;
use std::path::PathBuf;

/// Commands issued by the UI thread for the backend worker to execute.
#[derive(Debug)]
pub enum CoreCmd {
    /// Overwrite the stored snapshot. `revision` is echoed back so the UI can
    /// tell whether edits arrived while the save was in flight.
    SaveSnapshot {
        snapshot: DocumentSnapshot,
        revision: u64,
    },
    /// Read the stored snapshot.
    LoadSnapshot,
    /// Remove the stored snapshot.
    ClearSnapshot,
    /// Render the request and write the artifact to `path`.
    Export {
        request: ExportRequest,
        path: PathBuf,
    },
    /// Read a Markdown file and convert it to a document.
    ImportMarkdown { path: PathBuf },
}

/// Which user action a backend failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorSource {
    Save,
    Load,
    Export,
    Import,
}

impl CoreErrorSource {
    pub fn label(&self) -> &'static str {
        match self {
            CoreErrorSource::Save => "Save",
            CoreErrorSource::Load => "Load",
            CoreErrorSource::Export => "Export",
            CoreErrorSource::Import => "Import",
        }
    }
}

/// Events produced by the backend worker and polled by the UI thread.
#[derive(Debug)]
pub enum CoreEvent {
    SnapshotSaved {
        revision: u64,
        saved_at: DateTime<Utc>,
    },
    SnapshotLoaded {
        snapshot: DocumentSnapshot,
    },
    /// Nothing has been saved yet (or the stored value was unreadable).
    SnapshotMissing,
    SnapshotCleared {
        existed: bool,
    },
    Exported {
        path: PathBuf,
        format: ExportFormat,
    },
    MarkdownImported {
        title: String,
        document: Document,
    },
    Error {
        source: CoreErrorSource,
        message: String,
    },
}
