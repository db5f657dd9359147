//! Capability surface the editor shell and the search/outline logic consume.
//!
//! Everything outside `document` talks to documents through [`EditorSurface`]:
//! read the selection, read text, walk text-bearing nodes, and apply edits.
//! Offsets are char indices in the document offset space (segments joined by
//! a single virtual newline).

use super::{Alignment, Block, TextKind};
use std::ops::Range;
use thiserror::Error;

/// A selection in document offsets. `anchor == head` is a caret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(at: usize) -> Self {
        Self { anchor: at, head: at }
    }

    pub fn span(from: usize, to: usize) -> Self {
        Self {
            anchor: from,
            head: to,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn range(&self) -> Range<usize> {
        self.from()..self.to()
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// Location of a text-bearing node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRef {
    Block(usize),
    Cell { block: usize, row: usize, col: usize },
}

impl NodeRef {
    pub fn block_index(&self) -> usize {
        match self {
            NodeRef::Block(index) => *index,
            NodeRef::Cell { block, .. } => *block,
        }
    }
}

/// One text-bearing node in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSegment {
    pub node: NodeRef,
    /// Offset of the segment's first char.
    pub start: usize,
    pub text: String,
}

impl TextSegment {
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn end(&self) -> usize {
        self.start + self.len_chars()
    }
}

/// Node filter for [`EditorSurface::nodes_of_kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Paragraph,
    Heading,
    ListItem,
    Quote,
    CodeBlock,
    Rule,
    Table,
}

/// Node returned by a typed traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    pub block: usize,
    pub kind: NodeKind,
    /// Heading level for headings.
    pub level: Option<u8>,
    /// Offset range covered by the node's text; empty for rules.
    pub range: Range<usize>,
    pub text: String,
}

/// Inline marks that are either on or off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Highlight,
}

/// Inline style mutation applied over a range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleChange {
    Mark(Mark, bool),
    Color(Option<String>),
    FontFamily(Option<String>),
    FontSize(Option<u16>),
    Link(Option<String>),
    ClearFormatting,
}

/// A single edit against the document.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    /// Replace the text in `range` (within one segment) with `text`.
    Replace { range: Range<usize>, text: String },
    SetStyle {
        range: Range<usize>,
        change: StyleChange,
    },
    /// Change the kind of every text block touched by `range`.
    SetBlockKind { range: Range<usize>, kind: TextKind },
    SetAlignment {
        range: Range<usize>,
        align: Alignment,
    },
    /// Insert `block` after the block containing offset `at`.
    InsertBlock { at: usize, block: Block },
    /// Split the text block containing `at` into two blocks.
    SplitBlock { at: usize },
    /// Join the text block starting at `at` onto the previous text block.
    JoinBackward { at: usize },
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Edit::Replace {
            range: at..at,
            text: text.into(),
        }
    }

    pub fn delete(range: Range<usize>) -> Self {
        Edit::Replace {
            range,
            text: String::new(),
        }
    }
}

/// Acknowledgment that an edit was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditReceipt {
    /// Document revision after the edit.
    pub revision: u64,
    /// Offsets covered by the edit's result.
    pub range: Range<usize>,
}

/// Reasons an edit is rejected. The document is unchanged when these occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("range {from}..{to} is outside the document (length {len})")]
    OutOfBounds { from: usize, to: usize, len: usize },

    #[error("range {from}..{to} is inverted")]
    Inverted { from: usize, to: usize },

    #[error("range {from}..{to} crosses a block boundary")]
    CrossesSegment { from: usize, to: usize },

    #[error("offset {at} is not inside a text block")]
    NotTextBlock { at: usize },
}

/// Capability set the shell relies on.
pub trait EditorSurface {
    fn selection(&self) -> Selection;

    fn set_selection(&mut self, selection: Selection);

    /// Plain text between two offsets, segments separated by `'\n'`.
    fn text_between(&self, from: usize, to: usize) -> String;

    /// Text-bearing nodes in document order.
    fn text_segments(&self) -> Vec<TextSegment>;

    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeInfo>;

    /// Apply one edit; the receipt is the signal that dependent state may be
    /// recomputed.
    fn apply(&mut self, edit: Edit) -> Result<EditReceipt, EditError>;

    fn revision(&self) -> u64;

    /// Length of the offset space in chars.
    fn len_chars(&self) -> usize {
        self.text_segments().last().map(|s| s.end()).unwrap_or(0)
    }
}
