//! Writing assistant with template-based (mocked) generation.
//!
//! [`compose`] produces the full response up front. [`ChunkStream`] hands it
//! out word by word, and [`AssistantRun`] paces that stream against a clock so
//! the panel can reveal text gradually.

mod templates;

use std::time::{Duration, Instant};
use tracing::debug;

pub use templates::compose;

/// Voice used by [`AssistantAction::ChangeTone`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Friendly,
    Confident,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Professional, Tone::Casual, Tone::Friendly, Tone::Confident];

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Friendly => "Friendly",
            Tone::Confident => "Confident",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssistantAction {
    ContinueWriting,
    Summarize,
    Improve,
    MakeShorter,
    MakeLonger,
    ChangeTone(Tone),
    Custom(String),
}

impl AssistantAction {
    pub fn label(&self) -> &'static str {
        match self {
            AssistantAction::ContinueWriting => "Continue writing",
            AssistantAction::Summarize => "Summarize",
            AssistantAction::Improve => "Improve writing",
            AssistantAction::MakeShorter => "Make shorter",
            AssistantAction::MakeLonger => "Make longer",
            AssistantAction::ChangeTone(_) => "Change tone",
            AssistantAction::Custom(_) => "Custom prompt",
        }
    }

    /// Whether the result is meant to replace the source text rather than
    /// follow it.
    pub fn rewrites_source(&self) -> bool {
        matches!(
            self,
            AssistantAction::Improve
                | AssistantAction::MakeShorter
                | AssistantAction::MakeLonger
                | AssistantAction::ChangeTone(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantRequest {
    pub action: AssistantAction,
    /// Selected text, or the whole document when nothing is selected.
    pub source: String,
}

/// Lazy word-sized chunks of a composed response. Each chunk is a word plus
/// the whitespace that follows it, so concatenating all chunks yields the
/// original text.
#[derive(Clone, Debug)]
pub struct ChunkStream {
    text: String,
    cursor: usize,
}

impl ChunkStream {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.text.len()
    }
}

impl Iterator for ChunkStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = &self.text[self.cursor..];
        if rest.is_empty() {
            return None;
        }
        let word_start = rest
            .find(|ch: char| !ch.is_whitespace())
            .unwrap_or(rest.len());
        let word_end = rest[word_start..]
            .find(char::is_whitespace)
            .map(|index| word_start + index)
            .unwrap_or(rest.len());
        let chunk_end = rest[word_end..]
            .find(|ch: char| !ch.is_whitespace())
            .map(|index| word_end + index)
            .unwrap_or(rest.len());
        let chunk = rest[..chunk_end].to_string();
        self.cursor += chunk_end;
        Some(chunk)
    }
}

/// One generation being revealed in the assistant panel.
#[derive(Clone, Debug)]
pub struct AssistantRun {
    request: AssistantRequest,
    stream: ChunkStream,
    revealed: String,
    interval: Duration,
    next_at: Option<Instant>,
}

impl AssistantRun {
    pub fn start(request: AssistantRequest, interval: Duration) -> Self {
        let composed = compose(&request);
        debug!(
            "assistant: {} -> {} chars",
            request.action.label(),
            composed.len()
        );
        Self {
            request,
            stream: ChunkStream::new(composed),
            revealed: String::new(),
            interval,
            next_at: None,
        }
    }

    pub fn request(&self) -> &AssistantRequest {
        &self.request
    }

    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn is_finished(&self) -> bool {
        self.stream.is_finished()
    }

    /// Reveal every chunk whose time has come. Returns whether text was added.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        loop {
            let due = self.next_at.map(|at| now >= at).unwrap_or(true);
            if !due {
                break;
            }
            let Some(chunk) = self.stream.next() else {
                break;
            };
            self.revealed.push_str(&chunk);
            changed = true;
            let base = self.next_at.unwrap_or(now);
            self.next_at = Some(base + self.interval);
        }
        changed
    }

    /// Reveal the rest immediately.
    pub fn finish(&mut self) {
        for chunk in self.stream.by_ref() {
            self.revealed.push_str(&chunk);
        }
    }

    /// Time until the next chunk is due, for scheduling repaints.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if self.is_finished() {
            return None;
        }
        Some(
            self.next_at
                .map(|at| at.saturating_duration_since(now))
                .unwrap_or_default(),
        )
    }
}
