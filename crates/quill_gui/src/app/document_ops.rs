//! Document mutations driven by the canvas, toolbar, find bar, outline, and
//! assistant panel.
//!
//! Every mutation goes through [`QuillApp::edit_with`] (or
//! [`QuillApp::record_edit`] when the edit is applied by another component)
//! so history, dirty state, and search matches stay in step with the document.

use super::{PendingCursor, QuillApp};
use quill_core::assistant::{AssistantAction, AssistantRequest, AssistantRun};
use quill_core::document::commands;
use quill_core::document::{
    Alignment, Document, EditError, EditReceipt, EditorSurface, Mark, NodeRef, Selection,
    StyleChange, TextKind,
};
use quill_core::history::EditIntent;
use quill_core::outline::OutlineEntry;
use quill_core::search::MatchSpan;
use std::time::Instant;
use tracing::debug;

impl QuillApp {
    /// Run `apply` against the document and record the result.
    ///
    /// Returns whether the document changed. A rejected edit leaves the
    /// document as it was before `apply` ran and reports through the status bar.
    pub(super) fn edit_with<F>(&mut self, intent: EditIntent, label: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Document) -> Result<Option<EditReceipt>, EditError>,
    {
        let before = self.document.clone();
        match apply(&mut self.document) {
            Ok(Some(receipt)) => {
                debug!("{} applied at revision {}", label, receipt.revision);
                self.record_edit(&before, intent);
                true
            }
            Ok(None) => false,
            Err(err) => {
                // Multi-step commands may have landed part of their edits.
                if self.document.revision() != before.revision() {
                    self.document.restore(before);
                }
                self.set_status(format!("{label} failed: {err}"));
                false
            }
        }
    }

    /// Bookkeeping after the document moved past `before`.
    fn record_edit(&mut self, before: &Document, intent: EditIntent) {
        self.history.checkpoint(before, intent, Instant::now());
        self.mark_dirty();
        if self.find_open {
            self.search.refresh(&self.document);
        }
    }

    /// Push the document selection into the canvas widget holding its head.
    pub(super) fn focus_selection(&mut self, focus: bool, scroll: bool) {
        let selection = self.document.selection();
        let Some(segment) = self.document.segment_at(selection.head) else {
            self.pending_cursor = None;
            return;
        };
        let local = |offset: usize| offset.clamp(segment.start, segment.end()) - segment.start;
        self.pending_cursor = Some(PendingCursor {
            node: segment.node,
            anchor: local(selection.anchor),
            head: local(selection.head),
            focus,
            scroll,
        });
    }

    /// Mirror the focused widget's cursor (segment-local chars) into the document.
    pub(super) fn selection_from_widget(&mut self, node: NodeRef, anchor: usize, head: usize) {
        let Some(segment) = self
            .document
            .text_segments()
            .into_iter()
            .find(|segment| segment.node == node)
        else {
            return;
        };
        let len = segment.len_chars();
        let selection = Selection {
            anchor: segment.start + anchor.min(len),
            head: segment.start + head.min(len),
        };
        if selection != self.document.selection() {
            self.document.set_selection(selection);
        }
    }

    /// Bring one segment in line with its widget buffer. Returns whether the
    /// block structure changed (a newline split the block), in which case the
    /// widget's own cursor no longer describes the document selection.
    pub(super) fn sync_segment_text(&mut self, node: NodeRef, text: &str) -> bool {
        let blocks_before = self.document.blocks().len();
        let changed = match node {
            NodeRef::Block(block) => self.edit_with(EditIntent::Typing, "Typing", |doc| {
                commands::sync_text_block(doc, block, text)
            }),
            NodeRef::Cell { block, row, col } => {
                self.edit_with(EditIntent::Typing, "Typing", |doc| {
                    commands::sync_table_cell(doc, block, row, col, text)
                })
            }
        };
        let structural = changed && self.document.blocks().len() != blocks_before;
        if structural {
            self.focus_selection(true, true);
        }
        structural
    }

    /// Backspace at the start of a block merges it into the previous one.
    pub(super) fn join_backward(&mut self, block: usize) {
        if block == 0 {
            return;
        }
        if self.edit_with(EditIntent::Structure, "Join", |doc| {
            commands::join_with_previous(doc, block).map(Some)
        }) {
            self.focus_selection(true, true);
        }
    }

    pub(super) fn toggle_mark(&mut self, mark: Mark) {
        if self.edit_with(EditIntent::Format, "Formatting", |doc| {
            commands::toggle_mark(doc, mark).map(Some)
        }) {
            self.focus_selection(true, false);
        }
    }

    pub(super) fn apply_style_change(&mut self, change: StyleChange) {
        if self.edit_with(EditIntent::Format, "Formatting", |doc| {
            commands::apply_style(doc, change).map(Some)
        }) {
            self.focus_selection(true, false);
        }
    }

    pub(super) fn toggle_block_kind(&mut self, kind: TextKind) {
        if self.edit_with(EditIntent::Structure, "Block style", |doc| {
            commands::toggle_block_kind(doc, kind).map(Some)
        }) {
            self.focus_selection(true, false);
        }
    }

    pub(super) fn set_alignment(&mut self, align: Alignment) {
        if self.edit_with(EditIntent::Format, "Alignment", |doc| {
            commands::set_alignment(doc, align).map(Some)
        }) {
            self.focus_selection(true, false);
        }
    }

    pub(super) fn insert_rule(&mut self) {
        if self.edit_with(EditIntent::Structure, "Insert rule", |doc| {
            commands::insert_rule(doc).map(Some)
        }) {
            self.focus_selection(true, true);
        }
    }

    pub(super) fn insert_table(&mut self, rows: usize, cols: usize) {
        if self.edit_with(EditIntent::Structure, "Insert table", |doc| {
            commands::insert_table(doc, rows, cols).map(Some)
        }) {
            self.focus_selection(true, true);
        }
    }

    pub(super) fn insert_link(&mut self, url: &str, label: &str) {
        if self.edit_with(EditIntent::Format, "Insert link", |doc| {
            commands::insert_link(doc, url, label).map(Some)
        }) {
            self.focus_selection(true, false);
        }
    }

    pub(super) fn undo(&mut self) {
        if !self.history.undo(&mut self.document) {
            self.set_status("Nothing to undo.");
            return;
        }
        self.after_history_step();
    }

    pub(super) fn redo(&mut self) {
        if !self.history.redo(&mut self.document) {
            self.set_status("Nothing to redo.");
            return;
        }
        self.after_history_step();
    }

    fn after_history_step(&mut self) {
        self.mark_dirty();
        if self.find_open {
            self.search.refresh(&self.document);
        }
        self.focus_selection(true, true);
    }

    /// Open the find bar, seeding the term from a single-line selection.
    pub(super) fn open_find(&mut self, with_replace: bool) {
        let was_open = self.find_open;
        self.find_open = true;
        self.replace_open = with_replace || (was_open && self.replace_open);
        self.find_focus_requested = true;
        let selected = commands::selected_text(&self.document);
        if !selected.is_empty() && !selected.contains('\n') {
            self.set_find_term(&selected);
        } else {
            self.search.refresh(&self.document);
        }
    }

    pub(super) fn close_find(&mut self) {
        self.find_open = false;
        self.replace_open = false;
        self.search.clear();
        self.focus_selection(true, false);
    }

    pub(super) fn set_find_term(&mut self, term: &str) {
        if let Some(span) = self.search.set_search_term(&self.document, term) {
            self.select_span(&span);
        }
    }

    pub(super) fn set_case_sensitive(&mut self, case_sensitive: bool) {
        if let Some(span) = self
            .search
            .set_case_sensitive(&self.document, case_sensitive)
        {
            self.select_span(&span);
        }
    }

    pub(super) fn find_next(&mut self) {
        self.search.refresh(&self.document);
        if let Some(span) = self.search.go_to_next() {
            self.select_span(&span);
        }
    }

    pub(super) fn find_previous(&mut self) {
        self.search.refresh(&self.document);
        if let Some(span) = self.search.go_to_previous() {
            self.select_span(&span);
        }
    }

    /// Select a match and scroll it into view. Keyboard focus stays in the
    /// find bar so Enter keeps navigating.
    fn select_span(&mut self, span: &MatchSpan) {
        self.document
            .set_selection(Selection::span(span.from, span.to));
        self.focus_selection(false, true);
    }

    pub(super) fn replace_current(&mut self) {
        let before = self.document.clone();
        match self.search.replace_one(&mut self.document) {
            Ok(0) => {}
            Ok(_) => {
                self.record_edit(&before, EditIntent::Replace);
                match self.search.current().cloned() {
                    Some(span) => self.select_span(&span),
                    None => self.focus_selection(false, true),
                }
            }
            Err(err) => self.set_status(format!("Replace failed: {err}")),
        }
    }

    pub(super) fn replace_all(&mut self) {
        let before = self.document.clone();
        match self.search.replace_all(&mut self.document) {
            Ok(0) => self.set_status("No matches to replace."),
            Ok(count) => {
                self.record_edit(&before, EditIntent::Replace);
                let noun = if count == 1 { "occurrence" } else { "occurrences" };
                self.set_status(format!("Replaced {count} {noun}."));
            }
            Err(err) => {
                if self.document.revision() != before.revision() {
                    self.record_edit(&before, EditIntent::Replace);
                }
                self.set_status(format!("Replace all stopped: {err}"));
            }
        }
    }

    pub(super) fn jump_to_heading(&mut self, entry: &OutlineEntry) {
        self.document
            .set_selection(Selection::span(entry.range.start, entry.range.end));
        self.focus_selection(true, true);
    }

    /// Start a generation over the selection (or the whole document).
    pub(super) fn start_generation(&mut self) {
        let action = match &self.assistant.action {
            AssistantAction::ChangeTone(_) => AssistantAction::ChangeTone(self.assistant.tone),
            AssistantAction::Custom(_) => {
                let prompt = self.assistant.prompt.trim();
                if prompt.is_empty() {
                    self.set_status("Write a prompt first.");
                    return;
                }
                AssistantAction::Custom(prompt.to_string())
            }
            other => other.clone(),
        };
        let selection = self.document.selection();
        let source = if selection.is_empty() {
            self.document.plain_text()
        } else {
            commands::selected_text(&self.document)
        };
        self.assistant.target = selection.range();
        let mut run = AssistantRun::start(
            AssistantRequest { action, source },
            self.assistant.reveal_interval,
        );
        run.tick(Instant::now());
        self.assistant.run = Some(run);
    }

    pub(super) fn tick_assistant(&mut self, now: Instant) {
        if let Some(run) = self.assistant.run.as_mut() {
            run.tick(now);
        }
    }

    /// Insert the generated text as new paragraphs after the text it was
    /// generated from.
    pub(super) fn insert_assistant_output(&mut self) {
        let Some(text) = self.finished_assistant_text() else {
            return;
        };
        let at = self.assistant.target.end.min(self.document.len_chars());
        let mid_block = self
            .document
            .segment_at(at)
            .is_some_and(|segment| at > segment.start);
        let text = if mid_block { format!("\n{text}") } else { text };
        self.document.set_selection(Selection::caret(at));
        if self.edit_with(EditIntent::Other, "Insert", |doc| {
            commands::insert_text(doc, &text).map(Some)
        }) {
            self.assistant.run = None;
            self.focus_selection(true, true);
        }
    }

    /// Replace the original selection with the generated text.
    pub(super) fn replace_with_assistant_output(&mut self) {
        let target = self.assistant.target.clone();
        let source_matches = self.assistant.run.as_ref().is_some_and(|run| {
            !target.is_empty()
                && self.document.text_between(target.start, target.end) == run.request().source
        });
        if !source_matches {
            self.set_status("The selected text changed; select it again and regenerate.");
            return;
        }
        let Some(text) = self.finished_assistant_text() else {
            return;
        };
        self.document
            .set_selection(Selection::span(target.start, target.end));
        if self.edit_with(EditIntent::Other, "Replace selection", |doc| {
            commands::insert_text(doc, &text).map(Some)
        }) {
            self.assistant.run = None;
            self.focus_selection(true, true);
        }
    }

    pub(super) fn discard_assistant_output(&mut self) {
        self.assistant.run = None;
    }

    pub(super) fn close_assistant(&mut self) {
        self.assistant_open = false;
        self.discard_assistant_output();
    }

    /// Full generated text with blank lines collapsed, so each paragraph
    /// becomes one block.
    fn finished_assistant_text(&mut self) -> Option<String> {
        let run = self.assistant.run.as_mut()?;
        run.finish();
        let text = run
            .revealed()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        (!text.is_empty()).then_some(text)
    }
}
