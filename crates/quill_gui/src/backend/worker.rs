//! Background worker thread for storage and export I/O.

use crate::backend::{CoreCmd, CoreErrorSource, CoreEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use quill_core::config::env_flag_enabled;
use quill_core::constants::DEFAULT_DOCUMENT_TITLE;
use quill_core::document::from_markdown;
use quill_core::export::{export, HtmlPrinter};
use quill_core::SnapshotStore;
use std::path::Path;
use std::thread;
use std::time::Instant;
use tracing::{error, info};

/// Handle for sending commands to, and receiving events from, the backend worker.
pub struct BackendHandle {
    pub cmd_tx: Sender<CoreCmd>,
    pub evt_rx: Receiver<CoreEvent>,
}

impl BackendHandle {
    /// Wrap bare channels; used by app tests that inspect outbound commands.
    #[cfg(test)]
    pub(crate) fn from_test_channels(cmd_tx: Sender<CoreCmd>, evt_rx: Receiver<CoreEvent>) -> Self {
        Self { cmd_tx, evt_rx }
    }
}

fn send_error(evt_tx: &Sender<CoreEvent>, source: CoreErrorSource, message: String) {
    let _ = evt_tx.send(CoreEvent::Error { source, message });
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string())
}

/// Spawn the backend worker thread that performs blocking storage and export
/// work.
///
/// All I/O stays off the UI thread; the worker replies with [`CoreEvent`] values
/// that are polled each frame. The worker exits when the command sender is
/// dropped.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Panics
/// Panics if the worker thread cannot be spawned.
pub fn spawn_backend(
    store: SnapshotStore,
    printer: Box<dyn HtmlPrinter + Send>,
) -> BackendHandle {
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("quill-gui-backend".to_string())
        .spawn(move || {
            let export_trace = env_flag_enabled("QUILL_EXPORT_TRACE");
            for cmd in cmd_rx.iter() {
                match cmd {
                    CoreCmd::SaveSnapshot { snapshot, revision } => {
                        match store.save(&snapshot) {
                            Ok(()) => {
                                let _ = evt_tx.send(CoreEvent::SnapshotSaved {
                                    revision,
                                    saved_at: snapshot.saved_at,
                                });
                            }
                            Err(err) => {
                                error!("backend save failed: {}", err);
                                send_error(
                                    &evt_tx,
                                    CoreErrorSource::Save,
                                    format!("Save failed: {}", err),
                                );
                            }
                        }
                    }
                    CoreCmd::LoadSnapshot => match store.load() {
                        Ok(Some(snapshot)) => {
                            let _ = evt_tx.send(CoreEvent::SnapshotLoaded { snapshot });
                        }
                        Ok(None) => {
                            let _ = evt_tx.send(CoreEvent::SnapshotMissing);
                        }
                        Err(err) => {
                            error!("backend load failed: {}", err);
                            send_error(
                                &evt_tx,
                                CoreErrorSource::Load,
                                format!("Load failed: {}", err),
                            );
                        }
                    },
                    CoreCmd::ClearSnapshot => match store.clear() {
                        Ok(existed) => {
                            let _ = evt_tx.send(CoreEvent::SnapshotCleared { existed });
                        }
                        Err(err) => {
                            error!("backend clear failed: {}", err);
                            send_error(
                                &evt_tx,
                                CoreErrorSource::Save,
                                format!("Clear failed: {}", err),
                            );
                        }
                    },
                    CoreCmd::Export { request, path } => {
                        let started = Instant::now();
                        let result = export(&request, printer.as_ref())
                            .and_then(|artifact| artifact.write_to(&path));
                        if export_trace {
                            info!(
                                target: "quill_gui::export_trace",
                                format = request.format.label(),
                                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                                ok = result.is_ok(),
                                "export finished"
                            );
                        }
                        match result {
                            Ok(()) => {
                                let _ = evt_tx.send(CoreEvent::Exported {
                                    path,
                                    format: request.format,
                                });
                            }
                            Err(err) => {
                                error!("backend export failed: {}", err);
                                send_error(
                                    &evt_tx,
                                    CoreErrorSource::Export,
                                    format!("Export failed: {}", err),
                                );
                            }
                        }
                    }
                    CoreCmd::ImportMarkdown { path } => match std::fs::read_to_string(&path) {
                        Ok(markdown) => {
                            let document = from_markdown(&markdown);
                            let _ = evt_tx.send(CoreEvent::MarkdownImported {
                                title: title_from_path(&path),
                                document,
                            });
                        }
                        Err(err) => {
                            error!("backend import failed: {}", err);
                            send_error(
                                &evt_tx,
                                CoreErrorSource::Import,
                                format!("Import failed: {}", err),
                            );
                        }
                    },
                }
            }
        })
        .expect("spawn backend thread");

    BackendHandle { cmd_tx, evt_rx }
}
