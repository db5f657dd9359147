//! Heading outline for the navigation panel.

use crate::document::{EditorSurface, NodeKind};
use std::ops::Range;

/// One heading in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    /// Offsets of the heading text; selecting this scrolls the heading into view.
    pub range: Range<usize>,
    pub block: usize,
}

impl OutlineEntry {
    /// Indentation steps relative to a level-1 heading.
    pub fn depth(&self) -> usize {
        usize::from(self.level.saturating_sub(1))
    }
}

/// Collect non-empty headings.
pub fn collect<S>(surface: &S) -> Vec<OutlineEntry>
where
    S: EditorSurface + ?Sized,
{
    surface
        .nodes_of_kind(NodeKind::Heading)
        .into_iter()
        .filter(|node| !node.text.trim().is_empty())
        .map(|node| OutlineEntry {
            level: node.level.unwrap_or(1),
            text: node.text.trim().to_string(),
            range: node.range,
            block: node.block,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Document, TextBlock, TextKind};

    #[test]
    fn collects_headings_in_order_and_skips_blank_ones() {
        let doc = Document::from_blocks(vec![
            Block::Text(TextBlock::new(TextKind::heading(1), "Intro")),
            Block::Text(TextBlock::paragraph("body")),
            Block::Text(TextBlock::new(TextKind::heading(3), "  Detail ")),
            Block::Text(TextBlock::new(TextKind::heading(2), "   ")),
        ]);
        let outline = collect(&doc);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].text, "Intro");
        assert_eq!(outline[0].range, 0..5);
        assert_eq!(outline[1].text, "Detail");
        assert_eq!(outline[1].depth(), 2);
        assert_eq!(outline[1].block, 2);
    }

    #[test]
    fn document_without_headings_has_empty_outline() {
        assert!(collect(&Document::new()).is_empty());
    }
}
