//! State transitions for backend events, saving, import/export, and page setup.

use super::{QuillApp, SaveStatus};
use crate::backend::{CoreCmd, CoreErrorSource, CoreEvent};
use chrono::Local;
use quill_core::constants::DEFAULT_DOCUMENT_TITLE;
use quill_core::document::{from_html, to_html, Document, EditorSurface};
use quill_core::export::{file_name_for, ExportFormat, ExportRequest};
use quill_core::page::PageSetupDraft;
use quill_core::storage::DocumentSnapshot;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

impl QuillApp {
    pub(super) fn apply_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::SnapshotSaved { revision, saved_at } => {
                self.save_in_flight = false;
                if self.save_request_revision.take() != Some(revision) {
                    debug!("save ack for revision {} was not the pending request", revision);
                }
                self.last_saved_at = Some(saved_at.with_timezone(&Local));
                // Edits made while the save was in flight keep the document dirty.
                if revision == self.document.revision() {
                    self.save_status = SaveStatus::Saved;
                    self.last_edit_at = None;
                } else {
                    self.save_status = SaveStatus::Dirty;
                }
            }
            CoreEvent::SnapshotLoaded { snapshot } => {
                let document = from_html(&snapshot.html);
                self.replace_document(snapshot.title, document);
                self.save_status = SaveStatus::Saved;
                self.last_saved_at = Some(snapshot.saved_at.with_timezone(&Local));
                self.set_status("Loaded saved document.");
            }
            CoreEvent::SnapshotMissing => {
                info!("no stored snapshot");
                self.set_status("No saved document found.");
            }
            CoreEvent::SnapshotCleared { existed } => {
                if existed {
                    self.set_status("Cleared saved document.");
                } else {
                    self.set_status("Nothing saved to clear.");
                }
            }
            CoreEvent::Exported { path, format } => {
                self.set_status(format!(
                    "Exported {} to {}",
                    format.label(),
                    path.display()
                ));
            }
            CoreEvent::MarkdownImported { title, document } => {
                self.replace_document(title, document);
                self.mark_dirty();
                self.set_status("Imported Markdown.");
            }
            CoreEvent::Error { source, message } => {
                warn!("{} failed: {}", source.label(), message);
                if source == CoreErrorSource::Save {
                    self.save_in_flight = false;
                    self.save_request_revision = None;
                    self.save_status = SaveStatus::Dirty;
                    self.last_edit_at = Some(Instant::now());
                }
                self.set_status(message);
            }
        }
    }

    /// Swap in a whole new document. History and derived state start over.
    pub(super) fn replace_document(&mut self, title: String, document: Document) {
        self.document = document;
        self.title = if title.trim().is_empty() {
            DEFAULT_DOCUMENT_TITLE.to_string()
        } else {
            title
        };
        self.history.clear();
        self.pending_cursor = None;
        if self.find_open {
            self.search.rescan(&self.document);
        } else {
            self.search.clear();
        }
    }

    pub(super) fn new_document(&mut self) {
        self.replace_document(DEFAULT_DOCUMENT_TITLE.to_string(), Document::new());
        self.discard_assistant_output();
        self.mark_dirty();
        self.focus_selection(true, true);
        self.set_status("Started a new document.");
    }

    pub(super) fn load_saved(&mut self) {
        if self.backend.cmd_tx.send(CoreCmd::LoadSnapshot).is_err() {
            self.set_status("Load failed: backend unavailable.");
        }
    }

    pub(super) fn clear_saved(&mut self) {
        if self.backend.cmd_tx.send(CoreCmd::ClearSnapshot).is_err() {
            self.set_status("Clear failed: backend unavailable.");
        }
    }

    pub(super) fn mark_dirty(&mut self) {
        self.save_status = SaveStatus::Dirty;
        self.last_edit_at = Some(Instant::now());
    }

    pub(super) fn maybe_autosave(&mut self) {
        if self.save_in_flight || self.save_status != SaveStatus::Dirty {
            return;
        }
        let (Some(delay), Some(last_edit)) = (self.autosave_delay, self.last_edit_at) else {
            return;
        };
        if last_edit.elapsed() < delay {
            return;
        }
        let _sent = self.dispatch_save("Autosave");
    }

    pub(super) fn save_now(&mut self) {
        if self.save_in_flight || self.save_status != SaveStatus::Dirty {
            return;
        }
        let _sent = self.dispatch_save("Save");
    }

    fn dispatch_save(&mut self, mode: &str) -> bool {
        let revision = self.document.revision();
        let snapshot = DocumentSnapshot::new(self.title.clone(), to_html(&self.document));
        self.save_request_revision = Some(revision);
        self.save_in_flight = true;
        self.save_status = SaveStatus::Saving;
        if self
            .backend
            .cmd_tx
            .send(CoreCmd::SaveSnapshot { snapshot, revision })
            .is_ok()
        {
            return true;
        }
        self.save_in_flight = false;
        self.save_status = SaveStatus::Dirty;
        self.save_request_revision = None;
        self.last_edit_at = Some(Instant::now());
        self.set_status(format!("{mode} failed: backend unavailable."));
        false
    }

    pub(super) fn export_request(&self, format: ExportFormat) -> ExportRequest {
        ExportRequest {
            title: self.title.clone(),
            html: to_html(&self.document),
            format,
            page: self.page,
        }
    }

    /// Ask for a destination, then hand the export to the backend.
    pub(super) fn export_as(&mut self, format: ExportFormat) {
        let default_name = file_name_for(&self.title, format);
        let dialog = rfd::FileDialog::new()
            .set_file_name(default_name.as_str())
            .add_filter(format.label(), &[format.extension()]);
        let Some(path) = dialog.save_file() else {
            return;
        };
        self.dispatch_export(format, path);
    }

    pub(super) fn dispatch_export(&mut self, format: ExportFormat, path: PathBuf) {
        let request = self.export_request(format);
        if self
            .backend
            .cmd_tx
            .send(CoreCmd::Export { request, path })
            .is_err()
        {
            self.set_status("Export failed: backend unavailable.");
            return;
        }
        self.set_status(format!("Exporting {}...", format.label()));
    }

    pub(super) fn import_markdown(&mut self) {
        let dialog = rfd::FileDialog::new().add_filter("Markdown", &["md", "markdown", "txt"]);
        let Some(path) = dialog.pick_file() else {
            return;
        };
        self.dispatch_import(path);
    }

    pub(super) fn dispatch_import(&mut self, path: PathBuf) {
        if self
            .backend
            .cmd_tx
            .send(CoreCmd::ImportMarkdown { path })
            .is_err()
        {
            self.set_status("Import failed: backend unavailable.");
        }
    }

    pub(super) fn open_page_setup(&mut self) {
        self.page_setup_draft = Some(PageSetupDraft::from_setup(&self.page));
    }

    /// Apply the dialog's draft. Unparseable fields fall back to 0 and are
    /// then clamped, so applying never fails.
    pub(super) fn apply_page_setup(&mut self) {
        let Some(draft) = self.page_setup_draft.take() else {
            return;
        };
        self.page = draft.apply();
        self.ruler.set_page_width(self.page.page_width());
        self.ruler
            .set_margins(self.page.margins.left, self.page.margins.right);
        self.sync_page_from_ruler();
        self.set_status("Page setup updated.");
    }

    /// Ruler drags own the horizontal margins; mirror them into the page setup.
    pub(super) fn sync_page_from_ruler(&mut self) {
        let state = self.ruler.state();
        self.page.margins.left = state.left_margin;
        self.page.margins.right = state.right_margin;
    }

    pub(super) fn set_zoom(&mut self, zoom: f64) {
        self.ruler.set_zoom(zoom);
    }
}
