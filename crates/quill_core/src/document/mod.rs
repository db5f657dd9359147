//! Block-structured rich-text document and its editing surface.
//!
//! A [`Document`] is an ordered list of blocks. Text blocks carry styled runs;
//! tables carry plain-text cells; rules carry nothing. Each text block and
//! each table cell is one text segment of the offset space.

pub mod commands;
mod html;
mod markdown;
mod runs;
mod surface;

pub(crate) use html::escape_text;
pub use html::{from_html, to_html};
pub use markdown::{from_markdown, to_markdown};
pub use runs::{Run, RunStyle};
pub use surface::{
    Edit, EditError, EditReceipt, EditorSurface, Mark, NodeInfo, NodeKind, NodeRef, Selection,
    StyleChange, TextSegment,
};

use std::ops::Range;

/// Horizontal alignment of a text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Kind of a text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Paragraph,
    /// Heading level 1 through 6.
    Heading(u8),
    BulletItem,
    OrderedItem,
    Quote,
    CodeBlock,
}

impl TextKind {
    pub fn heading(level: u8) -> Self {
        TextKind::Heading(level.clamp(1, 6))
    }

    fn node_kind(&self) -> NodeKind {
        match self {
            TextKind::Paragraph => NodeKind::Paragraph,
            TextKind::Heading(_) => NodeKind::Heading,
            TextKind::BulletItem | TextKind::OrderedItem => NodeKind::ListItem,
            TextKind::Quote => NodeKind::Quote,
            TextKind::CodeBlock => NodeKind::CodeBlock,
        }
    }

    /// Kind given to the block created when this one is split.
    fn continuation(&self) -> TextKind {
        match self {
            TextKind::Heading(_) => TextKind::Paragraph,
            other => *other,
        }
    }
}

/// A paragraph-like block with styled runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: TextKind,
    pub align: Alignment,
    pub runs: Vec<Run>,
}

impl TextBlock {
    pub fn new(kind: TextKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![Run::plain(text)]
        };
        Self {
            kind,
            align: Alignment::Left,
            runs,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(TextKind::Paragraph, text)
    }

    pub fn text(&self) -> String {
        runs::runs_text(&self.runs)
    }

    pub fn len_chars(&self) -> usize {
        runs::runs_len(&self.runs)
    }
}

/// A grid of plain-text cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableBlock {
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Empty table with at least one row and one column.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![vec![String::new(); cols.max(1)]; rows.max(1)],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Text(TextBlock),
    Rule,
    Table(TableBlock),
}

impl Block {
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(block) => Some(block),
            _ => None,
        }
    }
}

/// Word and character counts for the status bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub words: usize,
    pub chars: usize,
}

/// The editable document.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    selection: Selection,
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty paragraph.
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    /// Build a document from blocks; an empty list becomes one empty paragraph.
    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::Text(TextBlock::paragraph("")));
        }
        Self {
            blocks,
            selection: Selection::default(),
            revision: 0,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Replace every block, keeping the revision counter moving.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) {
        let replacement = Self::from_blocks(blocks);
        self.blocks = replacement.blocks;
        self.selection = Selection::default();
        self.revision = self.revision.wrapping_add(1);
    }

    /// Restore blocks and selection from an earlier state. Counts as a new
    /// revision so derived state (matches, outline) is recomputed.
    pub fn restore(&mut self, state: Document) {
        self.blocks = state.blocks;
        self.selection = state.selection;
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn plain_text(&self) -> String {
        self.text_segments()
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        for segment in self.text_segments() {
            stats.words += segment.text.split_whitespace().count();
            stats.chars += segment.text.chars().filter(|ch| *ch != '\n').count();
        }
        stats
    }

    /// Whether every char of `range` carries `mark`.
    pub fn range_has_mark(&self, range: Range<usize>, mark: Mark) -> bool {
        let hits = self.text_block_hits(range.clone());
        if hits.is_empty() {
            return false;
        }
        hits.iter().all(|(index, local)| match &self.blocks[*index] {
            Block::Text(block) => runs::range_has_mark(&block.runs, local.start, local.end, mark),
            _ => true,
        })
    }

    /// Style that text typed at `at` would receive.
    pub fn style_at(&self, at: usize) -> RunStyle {
        match self.locate(at) {
            Some((NodeRef::Block(index), local)) => match &self.blocks[index] {
                Block::Text(block) => runs::style_at(&block.runs, local),
                _ => RunStyle::default(),
            },
            _ => RunStyle::default(),
        }
    }

    /// Segment containing `at`, preferring the segment that ends at `at` over
    /// one that would start after the separator.
    pub fn segment_at(&self, at: usize) -> Option<TextSegment> {
        self.text_segments()
            .into_iter()
            .find(|segment| at >= segment.start && at <= segment.end())
    }

    /// Offset range of a block's first segment.
    pub fn block_range(&self, block: usize) -> Option<Range<usize>> {
        self.text_segments()
            .into_iter()
            .find(|segment| segment.node.block_index() == block)
            .map(|segment| segment.start..segment.end())
    }

    /// Indices of the text blocks touched by `range`.
    pub fn text_blocks_in(&self, range: Range<usize>) -> Vec<usize> {
        self.text_block_hits(range)
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    }

    fn locate(&self, at: usize) -> Option<(NodeRef, usize)> {
        self.segment_at(at)
            .map(|segment| (segment.node, at - segment.start))
    }

    /// Text blocks intersecting `range`, with block-local char ranges.
    /// A collapsed range hits the block containing it.
    fn text_block_hits(&self, range: Range<usize>) -> Vec<(usize, Range<usize>)> {
        self.text_segments()
            .into_iter()
            .filter_map(|segment| {
                let NodeRef::Block(index) = segment.node else {
                    return None;
                };
                let touches = if range.start == range.end {
                    range.start >= segment.start && range.start <= segment.end()
                } else {
                    range.start < segment.end().max(segment.start + 1)
                        && range.end > segment.start
                };
                if !touches {
                    return None;
                }
                let local_start = range.start.saturating_sub(segment.start);
                let local_end = range.end.min(segment.end()).saturating_sub(segment.start);
                Some((index, local_start.min(local_end)..local_end))
            })
            .collect()
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), EditError> {
        if range.start > range.end {
            return Err(EditError::Inverted {
                from: range.start,
                to: range.end,
            });
        }
        let len = self.len_chars();
        if range.end > len {
            return Err(EditError::OutOfBounds {
                from: range.start,
                to: range.end,
                len,
            });
        }
        Ok(())
    }

    fn bump(&mut self, range: Range<usize>) -> EditReceipt {
        self.revision = self.revision.wrapping_add(1);
        EditReceipt {
            revision: self.revision,
            range,
        }
    }

    fn apply_replace(&mut self, range: Range<usize>, text: String) -> Result<EditReceipt, EditError> {
        self.check_range(&range)?;
        let segment = self
            .segment_at(range.start)
            .filter(|segment| range.end <= segment.end())
            .ok_or(EditError::CrossesSegment {
                from: range.start,
                to: range.end,
            })?;
        let local_from = range.start - segment.start;
        let local_to = range.end - segment.start;
        match segment.node {
            NodeRef::Block(index) => {
                if let Block::Text(block) = &mut self.blocks[index] {
                    runs::replace_range(&mut block.runs, local_from, local_to, &text);
                }
            }
            NodeRef::Cell { block, row, col } => {
                if let Block::Table(table) = &mut self.blocks[block] {
                    let cell = &mut table.rows[row][col];
                    let start = runs::char_to_byte(cell, local_from);
                    let end = runs::char_to_byte(cell, local_to);
                    cell.replace_range(start..end, &text);
                }
            }
        }
        let inserted = text.chars().count();
        let end = range.start + inserted;
        self.selection = Selection::caret(end);
        Ok(self.bump(range.start..end))
    }

    fn apply_style(
        &mut self,
        range: Range<usize>,
        change: &StyleChange,
    ) -> Result<EditReceipt, EditError> {
        self.check_range(&range)?;
        for (index, local) in self.text_block_hits(range.clone()) {
            if let Block::Text(block) = &mut self.blocks[index] {
                runs::restyle_range(&mut block.runs, local.start, local.end, change);
            }
        }
        Ok(self.bump(range))
    }

    fn apply_block_attr(
        &mut self,
        range: Range<usize>,
        update: impl Fn(&mut TextBlock),
    ) -> Result<EditReceipt, EditError> {
        self.check_range(&range)?;
        let hits = self.text_block_hits(range.clone());
        if hits.is_empty() {
            return Err(EditError::NotTextBlock { at: range.start });
        }
        for (index, _) in hits {
            if let Block::Text(block) = &mut self.blocks[index] {
                update(block);
            }
        }
        Ok(self.bump(range))
    }

    fn apply_insert_block(&mut self, at: usize, block: Block) -> Result<EditReceipt, EditError> {
        self.check_range(&(at..at))?;
        let after = self
            .segment_at(at)
            .map(|segment| segment.node.block_index())
            .unwrap_or(self.blocks.len().saturating_sub(1));
        let insert_at = (after + 1).min(self.blocks.len());
        self.blocks.insert(insert_at, block);
        // Keep a text block after rules and tables so the caret has somewhere to go.
        let needs_trailing = !matches!(self.blocks.get(insert_at + 1), Some(Block::Text(_)));
        if !matches!(self.blocks[insert_at], Block::Text(_)) && needs_trailing {
            self.blocks
                .insert(insert_at + 1, Block::Text(TextBlock::paragraph("")));
        }
        let range = self.block_range(insert_at).unwrap_or(at..at);
        let caret = self
            .block_range(insert_at + 1)
            .map(|next| next.start)
            .unwrap_or(range.start);
        self.selection = Selection::caret(caret);
        Ok(self.bump(range))
    }

    fn apply_split(&mut self, at: usize) -> Result<EditReceipt, EditError> {
        self.check_range(&(at..at))?;
        let Some((NodeRef::Block(index), local)) = self.locate(at) else {
            return Err(EditError::NotTextBlock { at });
        };
        let Block::Text(block) = &mut self.blocks[index] else {
            return Err(EditError::NotTextBlock { at });
        };
        let tail = runs::split_off(&mut block.runs, local);
        let next = TextBlock {
            kind: block.kind.continuation(),
            align: block.align,
            runs: tail,
        };
        self.blocks.insert(index + 1, Block::Text(next));
        let caret = at + 1;
        self.selection = Selection::caret(caret);
        Ok(self.bump(at..caret))
    }

    fn apply_join(&mut self, at: usize) -> Result<EditReceipt, EditError> {
        self.check_range(&(at..at))?;
        let Some((NodeRef::Block(index), 0)) = self.locate(at) else {
            return Err(EditError::NotTextBlock { at });
        };
        if index == 0 {
            return Ok(self.bump(at..at));
        }
        let Block::Text(_) = &self.blocks[index] else {
            return Err(EditError::NotTextBlock { at });
        };
        let previous_index = index - 1;
        match &self.blocks[previous_index] {
            Block::Text(_) => {}
            Block::Rule => {
                // Backspacing into a rule removes the rule.
                self.blocks.remove(previous_index);
                self.selection = Selection::caret(at);
                return Ok(self.bump(at..at));
            }
            Block::Table(_) => return Err(EditError::NotTextBlock { at }),
        }
        let Block::Text(current) = self.blocks.remove(index) else {
            return Err(EditError::NotTextBlock { at });
        };
        let caret = at.saturating_sub(1);
        if let Block::Text(previous) = &mut self.blocks[previous_index] {
            previous.runs.extend(current.runs);
            runs::normalize(&mut previous.runs);
        }
        self.selection = Selection::caret(caret);
        Ok(self.bump(caret..caret))
    }
}

impl EditorSurface for Document {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        let len = self.len_chars();
        self.selection = Selection {
            anchor: selection.anchor.min(len),
            head: selection.head.min(len),
        };
    }

    fn text_between(&self, from: usize, to: usize) -> String {
        let text = self.plain_text();
        let from = from.min(to);
        text.chars().skip(from).take(to.saturating_sub(from)).collect()
    }

    fn text_segments(&self) -> Vec<TextSegment> {
        let mut segments = Vec::new();
        let mut offset = 0usize;
        let mut push = |node: NodeRef, text: String, segments: &mut Vec<TextSegment>| {
            if !segments.is_empty() {
                offset += 1;
            }
            let len = text.chars().count();
            segments.push(TextSegment {
                node,
                start: offset,
                text,
            });
            offset += len;
        };
        for (index, block) in self.blocks.iter().enumerate() {
            match block {
                Block::Text(text) => push(NodeRef::Block(index), text.text(), &mut segments),
                Block::Rule => {}
                Block::Table(table) => {
                    for (row_index, row) in table.rows.iter().enumerate() {
                        for (col_index, cell) in row.iter().enumerate() {
                            push(
                                NodeRef::Cell {
                                    block: index,
                                    row: row_index,
                                    col: col_index,
                                },
                                cell.clone(),
                                &mut segments,
                            );
                        }
                    }
                }
            }
        }
        segments
    }

    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeInfo> {
        let segments = self.text_segments();
        let mut nodes = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            let block_kind = match block {
                Block::Text(text) => text.kind.node_kind(),
                Block::Rule => NodeKind::Rule,
                Block::Table(_) => NodeKind::Table,
            };
            if block_kind != kind {
                continue;
            }
            let owned: Vec<&TextSegment> = segments
                .iter()
                .filter(|segment| segment.node.block_index() == index)
                .collect();
            let range = match (owned.first(), owned.last()) {
                (Some(first), Some(last)) => first.start..last.end(),
                _ => {
                    let at = segments
                        .iter()
                        .find(|segment| segment.node.block_index() > index)
                        .map(|segment| segment.start)
                        .unwrap_or_else(|| self.len_chars());
                    at..at
                }
            };
            let text = owned
                .iter()
                .map(|segment| segment.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let level = match block {
                Block::Text(TextBlock {
                    kind: TextKind::Heading(level),
                    ..
                }) => Some(*level),
                _ => None,
            };
            nodes.push(NodeInfo {
                block: index,
                kind: block_kind,
                level,
                range,
                text,
            });
        }
        nodes
    }

    fn apply(&mut self, edit: Edit) -> Result<EditReceipt, EditError> {
        match edit {
            Edit::Replace { range, text } => self.apply_replace(range, text),
            Edit::SetStyle { range, change } => self.apply_style(range, &change),
            Edit::SetBlockKind { range, kind } => {
                self.apply_block_attr(range, |block| block.kind = kind)
            }
            Edit::SetAlignment { range, align } => {
                self.apply_block_attr(range, |block| block.align = align)
            }
            Edit::InsertBlock { at, block } => self.apply_insert_block(at, block),
            Edit::SplitBlock { at } => self.apply_split(at),
            Edit::JoinBackward { at } => self.apply_join(at),
        }
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
