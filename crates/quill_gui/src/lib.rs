//! Desktop shell for the Quill word processor.
//!
//! Exposes a `run` helper so the workspace root can launch the editor
//! without duplicating initialization logic.

mod app;
/// Backend worker + protocol types used by the GUI and its tests.
pub mod backend;

use app::QuillApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("quill_core=info,quill_gui=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Start the editor with tracing enabled.
///
/// # Returns
/// The result of `eframe::run_native`.
///
/// # Errors
/// Propagates any `eframe` initialization or runtime error (including app
/// creation failures when the snapshot store cannot be opened).
pub fn run() -> eframe::Result<()> {
    init_tracing();

    let app = QuillApp::new().map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::DEFAULT_WINDOW_SIZE)
            .with_min_inner_size(app::MIN_WINDOW_SIZE)
            .with_title("Quill"),
        ..Default::default()
    };

    eframe::run_native("Quill", options, Box::new(|_cc| Ok(Box::new(app))))
}
