//! egui editor shell: document canvas, ruler, dialogs, and side panels.

mod document_ops;
mod state_feedback;
mod state_ops;
mod style;
mod ui;

use crate::backend::{spawn_backend, BackendHandle};
use chrono::{DateTime, Local};
use eframe::egui;
use quill_core::assistant::{AssistantAction, AssistantRun, Tone};
use quill_core::constants::DEFAULT_DOCUMENT_TITLE;
use quill_core::document::{Document, NodeRef};
use quill_core::export::ChromePrinter;
use quill_core::history::DocumentHistory;
use quill_core::page::{PageSetup, PageSetupDraft};
use quill_core::ruler::RulerModel;
use quill_core::search::SearchSession;
use quill_core::{Config, CoreError, SnapshotStore};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use style::*;
use tracing::info;

/// Native egui application shell.
///
/// Owns the document and all editor UI state. Storage and export run on the
/// backend worker so the `update` loop never blocks on disk or the browser.
pub(crate) struct QuillApp {
    backend: BackendHandle,
    document: Document,
    history: DocumentHistory,
    title: String,
    ruler: RulerModel,
    ruler_visible: bool,
    page: PageSetup,
    page_setup_draft: Option<PageSetupDraft>,
    search: SearchSession,
    find_open: bool,
    replace_open: bool,
    find_focus_requested: bool,
    outline_open: bool,
    assistant_open: bool,
    assistant: AssistantPanel,
    link_dialog: Option<LinkDraft>,
    table_dialog: Option<TableDraft>,
    text_color: [u8; 3],
    pending_cursor: Option<PendingCursor>,
    save_status: SaveStatus,
    last_saved_at: Option<DateTime<Local>>,
    last_edit_at: Option<Instant>,
    save_in_flight: bool,
    save_request_revision: Option<u64>,
    autosave_delay: Option<Duration>,
    status: Option<StatusMessage>,
    toasts: VecDeque<ToastMessage>,
    shortcut_help_open: bool,
    style_applied: bool,
    db_path: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SaveStatus {
    Saved,
    Dirty,
    Saving,
}

/// Assistant side panel inputs plus the generation being revealed.
struct AssistantPanel {
    action: AssistantAction,
    tone: Tone,
    prompt: String,
    run: Option<AssistantRun>,
    /// Selection captured when generation started; "Replace" targets it.
    target: std::ops::Range<usize>,
    reveal_interval: Duration,
}

impl AssistantPanel {
    fn new(reveal_interval: Duration) -> Self {
        Self {
            action: AssistantAction::ContinueWriting,
            tone: Tone::default(),
            prompt: String::new(),
            run: None,
            target: 0..0,
            reveal_interval,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LinkDraft {
    url: String,
    label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableDraft {
    rows: usize,
    cols: usize,
}

impl Default for TableDraft {
    fn default() -> Self {
        Self { rows: 3, cols: 3 }
    }
}

/// Cursor placement to push into a canvas widget on the next frame, in chars
/// local to the segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCursor {
    node: NodeRef,
    anchor: usize,
    head: usize,
    /// Move keyboard focus into the widget (outline jumps, structural edits).
    focus: bool,
    scroll: bool,
}

const STATUS_TTL: Duration = Duration::from_secs(5);
const TOAST_TTL: Duration = Duration::from_secs(4);
const TOAST_LIMIT: usize = 4;
#[doc = "Default initial window size for the editor window."]
pub(crate) const DEFAULT_WINDOW_SIZE: [f32; 2] = [1280.0, 860.0];
#[doc = "Minimum enforced window size to keep toolbar and side panels usable."]
pub(crate) const MIN_WINDOW_SIZE: [f32; 2] = [900.0, 600.0];
const FIND_INPUT_ID: &str = "find_bar_input";
const MAX_TABLE_DIMENSION: usize = 20;

struct StatusMessage {
    text: String,
    expires_at: Instant,
}

struct ToastMessage {
    text: String,
    expires_at: Instant,
}

/// Stable widget id for the canvas editor of one text segment.
fn segment_widget_id(node: NodeRef) -> egui::Id {
    match node {
        NodeRef::Block(block) => egui::Id::new(("quill_block", block)),
        NodeRef::Cell { block, row, col } => egui::Id::new(("quill_cell", block, row, col)),
    }
}

impl QuillApp {
    /// Construct the app from the current environment config.
    ///
    /// Opens the snapshot store, spawns the backend worker, and asks it for
    /// the last saved snapshot so the previous session comes back on first
    /// paint.
    ///
    /// # Errors
    /// Returns an error if the snapshot store cannot be opened.
    pub(crate) fn new() -> Result<Self, CoreError> {
        let config = Config::from_env();
        let store = SnapshotStore::open(&config.db_path)?;
        info!("editor opened snapshot store at {}", store.path().display());
        let printer = ChromePrinter::new(config.chrome_path.as_ref().map(PathBuf::from));
        let backend = spawn_backend(store, Box::new(printer));
        let mut app = Self::with_backend(backend, &config);
        app.load_saved();
        Ok(app)
    }

    fn with_backend(backend: BackendHandle, config: &Config) -> Self {
        let page = PageSetup::default();
        let mut ruler = RulerModel::new(page.page_width(), config.default_zoom);
        ruler.set_margins(page.margins.left, page.margins.right);
        Self {
            backend,
            document: Document::new(),
            history: DocumentHistory::default(),
            title: DEFAULT_DOCUMENT_TITLE.to_string(),
            ruler,
            ruler_visible: true,
            page,
            page_setup_draft: None,
            search: SearchSession::new(),
            find_open: false,
            replace_open: false,
            find_focus_requested: false,
            outline_open: true,
            assistant_open: false,
            assistant: AssistantPanel::new(Duration::from_millis(config.assistant_reveal_ms)),
            link_dialog: None,
            table_dialog: None,
            text_color: [0x1f, 0x4e, 0x9c],
            pending_cursor: None,
            save_status: SaveStatus::Saved,
            last_saved_at: None,
            last_edit_at: None,
            save_in_flight: false,
            save_request_revision: None,
            autosave_delay: config
                .autosave_enabled()
                .then(|| Duration::from_millis(config.auto_save_interval)),
            status: None,
            toasts: VecDeque::with_capacity(TOAST_LIMIT),
            shortcut_help_open: false,
            style_applied: false,
            db_path: config.db_path.clone(),
        }
    }

    fn zoom(&self) -> f64 {
        self.ruler.state().zoom
    }

    fn expire_feedback(&mut self, now: Instant) {
        if let Some(status) = &self.status {
            if now >= status.expires_at {
                self.status = None;
            }
        }
        while self
            .toasts
            .front()
            .map(|toast| now >= toast.expires_at)
            .unwrap_or(false)
        {
            self.toasts.pop_front();
        }
    }

    /// Global shortcuts. Keys that text widgets also react to are consumed
    /// here so they reach the document history instead of the widget.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};
        let command = Modifiers::COMMAND;
        let command_shift = Modifiers::COMMAND | Modifiers::SHIFT;

        let consumed = |key: Key, modifiers: Modifiers| {
            ctx.input_mut(|input| input.consume_key(modifiers, key))
        };

        if consumed(Key::Z, command_shift) || consumed(Key::Y, command) {
            self.redo();
        }
        if consumed(Key::Z, command) {
            self.undo();
        }
        if consumed(Key::S, command) {
            self.save_now();
        }
        if consumed(Key::N, command) {
            self.new_document();
        }
        if consumed(Key::F, command) {
            self.open_find(false);
        }
        if consumed(Key::H, command) {
            self.open_find(true);
        }
        if consumed(Key::B, command) {
            self.toggle_mark(quill_core::document::Mark::Bold);
        }
        if consumed(Key::I, command) {
            self.toggle_mark(quill_core::document::Mark::Italic);
        }
        if consumed(Key::U, command) {
            self.toggle_mark(quill_core::document::Mark::Underline);
        }
        if ctx.input(|input| input.key_pressed(Key::F1)) {
            self.shortcut_help_open = !self.shortcut_help_open;
        }
        if self.find_open && ctx.input(|input| input.key_pressed(Key::Escape)) {
            self.close_find();
        }
    }

    /// Earliest moment the UI needs another frame without input.
    fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        let mut wake: Option<Duration> = None;
        let mut consider = |candidate: Duration| {
            wake = Some(wake.map_or(candidate, |current| current.min(candidate)));
        };
        if let Some(run) = &self.assistant.run {
            if let Some(next) = run.time_until_next(now) {
                consider(next);
            }
        }
        if let (SaveStatus::Dirty, Some(delay), Some(last_edit)) =
            (self.save_status, self.autosave_delay, self.last_edit_at)
        {
            consider(delay.saturating_sub(now.saturating_duration_since(last_edit)));
        }
        if let Some(toast) = self.toasts.front() {
            consider(toast.expires_at.saturating_duration_since(now));
        }
        if let Some(status) = &self.status {
            consider(status.expires_at.saturating_duration_since(now));
        }
        wake
    }
}

impl eframe::App for QuillApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_style(ctx);

        let now = Instant::now();
        self.expire_feedback(now);
        while let Ok(event) = self.backend.evt_rx.try_recv() {
            self.apply_event(event);
        }
        self.handle_shortcuts(ctx);
        self.tick_assistant(now);

        self.render_title_bar(ctx);
        self.render_menu_bar(ctx);
        self.render_toolbar(ctx);
        self.render_find_bar(ctx);
        self.render_status_bar(ctx);
        self.render_outline_panel(ctx);
        self.render_assistant_panel(ctx);
        self.render_canvas(ctx);
        self.render_page_setup_dialog(ctx);
        self.render_insert_dialogs(ctx);
        self.render_shortcut_help(ctx);
        self.render_toasts(ctx);

        self.maybe_autosave();
        if let Some(wait) = self.next_wakeup(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}

#[cfg(test)]
mod tests;
