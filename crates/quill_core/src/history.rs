//! Undo/redo history for documents.
//!
//! Checkpoints are whole-document states taken before each edit. Consecutive
//! typing inside the coalesce window shares one checkpoint so undo removes a
//! burst of typing at once.

use crate::document::Document;
use std::time::{Duration, Instant};

const DEFAULT_MAX_OPS: usize = 500;
const DEFAULT_MAX_BYTES: usize = 8 * 1024 * 1024;
const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_millis(750);

/// Kind of change about to be made; drives coalescing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditIntent {
    Typing,
    Format,
    Structure,
    Replace,
    Other,
}

#[derive(Clone, Debug)]
struct Checkpoint {
    state: Document,
    intent: EditIntent,
    at: Instant,
    bytes: usize,
}

fn state_bytes(state: &Document) -> usize {
    state
        .plain_text()
        .len()
        .saturating_add(state.blocks().len().saturating_mul(32))
}

/// Bounded checkpoint stack.
#[derive(Debug)]
pub struct DocumentHistory {
    undo: Vec<Checkpoint>,
    redo: Vec<Checkpoint>,
    undo_bytes: usize,
    max_ops: usize,
    max_bytes: usize,
    coalesce_window: Duration,
}

impl Default for DocumentHistory {
    fn default() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            undo_bytes: 0,
            max_ops: DEFAULT_MAX_OPS,
            max_bytes: DEFAULT_MAX_BYTES,
            coalesce_window: DEFAULT_COALESCE_WINDOW,
        }
    }
}

impl DocumentHistory {
    /// Record `before` as the state to return to when the upcoming edit is undone.
    pub fn checkpoint(&mut self, before: &Document, intent: EditIntent, at: Instant) {
        self.redo.clear();
        if let Some(last) = self.undo.last_mut() {
            if Self::can_coalesce(last, intent, at, self.coalesce_window) {
                last.at = at;
                return;
            }
        }
        let bytes = state_bytes(before);
        self.undo_bytes = self.undo_bytes.saturating_add(bytes);
        self.undo.push(Checkpoint {
            state: before.clone(),
            intent,
            at,
            bytes,
        });
        self.trim_undo();
    }

    fn can_coalesce(
        previous: &Checkpoint,
        intent: EditIntent,
        at: Instant,
        window: Duration,
    ) -> bool {
        previous.intent == EditIntent::Typing
            && intent == EditIntent::Typing
            && at.saturating_duration_since(previous.at) <= window
    }

    fn trim_undo(&mut self) {
        while self.undo.len() > self.max_ops || self.undo_bytes > self.max_bytes {
            if self.undo.is_empty() {
                break;
            }
            let removed = self.undo.remove(0);
            self.undo_bytes = self.undo_bytes.saturating_sub(removed.bytes);
        }
    }

    /// Step back one checkpoint. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        let Some(checkpoint) = self.undo.pop() else {
            return false;
        };
        self.undo_bytes = self.undo_bytes.saturating_sub(checkpoint.bytes);
        let current = document.clone();
        self.redo.push(Checkpoint {
            bytes: state_bytes(&current),
            state: current,
            intent: EditIntent::Other,
            at: checkpoint.at,
        });
        document.restore(checkpoint.state);
        true
    }

    /// Re-apply the most recently undone change.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        let Some(checkpoint) = self.redo.pop() else {
            return false;
        };
        let current = document.clone();
        let bytes = state_bytes(&current);
        self.undo_bytes = self.undo_bytes.saturating_add(bytes);
        self.undo.push(Checkpoint {
            state: current,
            intent: EditIntent::Other,
            at: checkpoint.at,
            bytes,
        });
        self.trim_undo();
        document.restore(checkpoint.state);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.undo_bytes = 0;
    }

    #[cfg(test)]
    fn undo_len(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Edit, EditorSurface};

    #[test]
    fn coalesces_adjacent_typing() {
        let mut doc = Document::new();
        let mut history = DocumentHistory::default();
        let now = Instant::now();
        history.checkpoint(&doc, EditIntent::Typing, now);
        doc.apply(Edit::insert(0, "h")).unwrap();
        history.checkpoint(&doc, EditIntent::Typing, now + Duration::from_millis(10));
        doc.apply(Edit::insert(1, "i")).unwrap();
        assert_eq!(history.undo_len(), 1);

        assert!(history.undo(&mut doc));
        assert_eq!(doc.plain_text(), "");
    }

    #[test]
    fn typing_after_a_pause_starts_a_new_checkpoint() {
        let doc = Document::new();
        let mut history = DocumentHistory::default();
        let now = Instant::now();
        history.checkpoint(&doc, EditIntent::Typing, now);
        history.checkpoint(&doc, EditIntent::Typing, now + Duration::from_secs(2));
        history.checkpoint(&doc, EditIntent::Format, now + Duration::from_secs(2));
        assert_eq!(history.undo_len(), 3);
    }

    #[test]
    fn undo_and_redo_roundtrip() {
        let mut doc = Document::new();
        doc.apply(Edit::insert(0, "abc")).unwrap();
        let mut history = DocumentHistory::default();
        history.checkpoint(&doc, EditIntent::Replace, Instant::now());
        doc.apply(Edit::Replace {
            range: 1..2,
            text: "XYZ".to_string(),
        })
        .unwrap();

        let revision = doc.revision();
        assert!(history.undo(&mut doc));
        assert_eq!(doc.plain_text(), "abc");
        assert!(doc.revision() > revision);
        assert!(history.redo(&mut doc));
        assert_eq!(doc.plain_text(), "aXYZc");
        assert!(!history.can_redo());
        assert!(!history.redo(&mut doc));
    }

    #[test]
    fn new_checkpoint_clears_redo() {
        let mut doc = Document::new();
        let mut history = DocumentHistory::default();
        history.checkpoint(&doc, EditIntent::Other, Instant::now());
        doc.apply(Edit::insert(0, "x")).unwrap();
        history.undo(&mut doc);
        assert!(history.can_redo());
        history.checkpoint(&doc, EditIntent::Other, Instant::now());
        assert!(!history.can_redo());
    }

    #[test]
    fn history_is_bounded_by_operation_count() {
        let doc = Document::new();
        let mut history = DocumentHistory {
            max_ops: 3,
            ..DocumentHistory::default()
        };
        for _ in 0..10 {
            history.checkpoint(&doc, EditIntent::Format, Instant::now());
        }
        assert_eq!(history.undo_len(), 3);
    }
}
