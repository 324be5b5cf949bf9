//! Document model: a versioned tree of blocks in one linear position space
//!
//! Top-level blocks are shared behind `Rc` so that keeping the previous
//! document around for a mutation notification costs one pointer copy per
//! block. Edits copy only the blocks they touch.

mod block;

pub use block::{Block, BlockContent, BlockKind, BlockPath};

use crate::editing::{EditOp, EditResult, Mapping, StepMap};
use crate::error::EditError;
use std::rc::Rc;

/// The main document structure
#[derive(Debug, Clone)]
pub struct Document {
    /// Top-level blocks in order
    blocks: Vec<Rc<Block>>,
    /// Monotonic version counter
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding one empty paragraph
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    /// Create a document with one paragraph per line
    pub fn from_text(text: &str) -> Self {
        Self::from_blocks(text.split('\n').map(Block::paragraph).collect())
    }

    /// Create a document from top-level blocks. An empty list yields one
    /// empty paragraph.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut blocks: Vec<Rc<Block>> = blocks.into_iter().map(Rc::new).collect();
        if blocks.is_empty() {
            blocks.push(Rc::new(Block::paragraph("")));
        }
        Self { blocks, version: 0 }
    }

    /// Get the document version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Total number of positions
    pub fn size(&self) -> usize {
        self.blocks.iter().map(|b| b.node_size()).sum()
    }

    /// Number of top-level blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Top-level blocks with their start positions, in document order
    pub fn top_level(&self) -> impl Iterator<Item = (usize, &Block)> + '_ {
        self.blocks.iter().scan(0, |start, block| {
            let pos = *start;
            *start += block.node_size();
            Some((pos, block.as_ref()))
        })
    }

    /// Plain text, one line per text block
    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            block.collect_text(&mut lines);
        }
        lines.join("\n")
    }

    /// Index of the top-level block starting at `pos`, or the block count
    /// when `pos` is the document end
    fn boundary_index(&self, pos: usize) -> Option<usize> {
        let mut start = 0;
        for (idx, block) in self.blocks.iter().enumerate() {
            if pos == start {
                return Some(idx);
            }
            start += block.node_size();
        }
        (pos == start).then_some(self.blocks.len())
    }

    /// Resolve a position inside a text block to (top-level index, path
    /// below it, char offset)
    fn locate_text(&self, pos: usize) -> Option<(usize, BlockPath, usize)> {
        let mut start = 0;
        for (idx, block) in self.blocks.iter().enumerate() {
            let end = start + block.node_size();
            if pos > start && pos < end {
                let (path, offset) = block.locate_text(start + 1, pos)?;
                return Some((idx, path, offset));
            }
            start = end;
        }
        None
    }

    fn check_range(&self, position: usize) -> Result<(), EditError> {
        let size = self.size();
        if position > size {
            return Err(EditError::OutOfRange { position, size });
        }
        Ok(())
    }

    /// Apply an edit operation. On error the document is left unchanged.
    pub fn apply_edit(&mut self, op: EditOp) -> Result<EditResult, EditError> {
        let snapshot = self.clone();
        let mut mapping = Mapping::new();
        match self.apply_op(op, &mut mapping) {
            Ok(changed) => {
                if changed {
                    self.version += 1;
                }
                Ok(EditResult {
                    version: self.version,
                    mapping,
                    changed,
                })
            }
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }

    fn apply_op(&mut self, op: EditOp, mapping: &mut Mapping) -> Result<bool, EditError> {
        match op {
            EditOp::InsertText { position, text } => {
                self.apply_insert(position, &text, mapping)
            }
            EditOp::Delete { start, end } => self.apply_delete(start, end, mapping),
            EditOp::InsertBlock { position, block } => {
                self.apply_insert_block(position, block, mapping)
            }
            EditOp::SplitBlock { position } => self.apply_split(position, mapping),
            EditOp::SetKind { position, kind } => self.apply_set_kind(position, kind),
            EditOp::Transaction { ops } => {
                let mut changed = false;
                for op in ops {
                    changed |= self.apply_op(op, mapping)?;
                }
                Ok(changed)
            }
        }
    }

    /// Apply an insert operation
    fn apply_insert(
        &mut self,
        position: usize,
        text: &str,
        mapping: &mut Mapping,
    ) -> Result<bool, EditError> {
        self.check_range(position)?;
        if text.is_empty() {
            return Ok(false);
        }
        let (idx, path, offset) = self
            .locate_text(position)
            .ok_or(EditError::NotInTextBlock { position })?;
        let inserted = Rc::make_mut(&mut self.blocks[idx])
            .descendant_mut(&path)
            .is_some_and(|block| block.insert_text(offset, text));
        if !inserted {
            return Err(EditError::NotInTextBlock { position });
        }
        mapping.push(StepMap::insertion(position, text.chars().count()));
        Ok(true)
    }

    /// Apply a delete operation
    fn apply_delete(
        &mut self,
        start: usize,
        end: usize,
        mapping: &mut Mapping,
    ) -> Result<bool, EditError> {
        self.check_range(end)?;
        if start > end {
            return Err(EditError::UnsupportedRange { start, end });
        }
        if start == end {
            return Ok(false);
        }

        // Inside a single text block
        if let (Some((idx, path, from)), Some((end_idx, end_path, to))) =
            (self.locate_text(start), self.locate_text(end))
        {
            if idx == end_idx && path == end_path {
                let deleted = Rc::make_mut(&mut self.blocks[idx])
                    .descendant_mut(&path)
                    .is_some_and(|block| block.delete_text(from, to));
                if deleted {
                    mapping.push(StepMap::deletion(start, end));
                    return Ok(true);
                }
            }
        }

        // A run of whole top-level blocks
        let (Some(first), Some(last)) = (self.boundary_index(start), self.boundary_index(end))
        else {
            return Err(EditError::UnsupportedRange { start, end });
        };
        self.blocks.drain(first..last);
        if self.blocks.is_empty() {
            // A document always keeps one block to type into
            self.blocks.push(Rc::new(Block::paragraph("")));
            mapping.push(StepMap::replacement(start, end - start, 2));
        } else {
            mapping.push(StepMap::deletion(start, end));
        }
        Ok(true)
    }

    fn apply_insert_block(
        &mut self,
        position: usize,
        block: Block,
        mapping: &mut Mapping,
    ) -> Result<bool, EditError> {
        self.check_range(position)?;
        let idx = self
            .boundary_index(position)
            .ok_or(EditError::NotABoundary { position })?;
        mapping.push(StepMap::insertion(position, block.node_size()));
        self.blocks.insert(idx, Rc::new(block));
        Ok(true)
    }

    fn apply_split(&mut self, position: usize, mapping: &mut Mapping) -> Result<bool, EditError> {
        self.check_range(position)?;
        let (idx, path, offset) = self
            .locate_text(position)
            .ok_or(EditError::NotInTextBlock { position })?;

        if path.is_empty() {
            let tail = Rc::make_mut(&mut self.blocks[idx])
                .split_off_text(offset)
                .ok_or(EditError::NotInTextBlock { position })?;
            self.blocks.insert(idx + 1, Rc::new(tail));
        } else if !Rc::make_mut(&mut self.blocks[idx]).split_nested(&path, offset) {
            return Err(EditError::NotInTextBlock { position });
        }

        // closing boundary of the head plus opening boundary of the tail
        mapping.push(StepMap::insertion(position, 2));
        Ok(true)
    }

    fn apply_set_kind(&mut self, position: usize, kind: BlockKind) -> Result<bool, EditError> {
        self.check_range(position)?;
        let (idx, path, _) = self
            .locate_text(position)
            .ok_or(EditError::NotInTextBlock { position })?;
        let block = Rc::make_mut(&mut self.blocks[idx])
            .descendant_mut(&path)
            .ok_or(EditError::NotInTextBlock { position })?;
        if block.kind() == kind {
            return Ok(false);
        }
        if !block.set_text_kind(kind) {
            return Err(EditError::KindMismatch {
                position,
                kind: kind.name(),
            });
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Assoc;

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.size(), 2);
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_from_text() {
        let doc = Document::from_text("Hello\nWorld");
        assert_eq!(doc.text(), "Hello\nWorld");
        assert_eq!(doc.block_count(), 2);
        let starts: Vec<_> = doc.top_level().map(|(pos, _)| pos).collect();
        assert_eq!(starts, vec![0, 7]);
    }

    #[test]
    fn test_insert() {
        let mut doc = Document::new();
        let result = doc.apply_edit(EditOp::insert(1, "Hello")).unwrap();
        assert_eq!(doc.text(), "Hello");
        assert_eq!(result.version, 1);
        assert_eq!(result.mapping.map(2, Assoc::Before), 7);
    }

    #[test]
    fn test_insert_outside_text_fails_atomically() {
        let mut doc = Document::from_text("ab\ncd");
        let err = doc
            .apply_edit(EditOp::transaction(vec![
                EditOp::insert(1, "x"),
                EditOp::insert(5, "y"),
            ]))
            .unwrap_err();
        // position 5 is the boundary between the two paragraphs after "x"
        assert_eq!(err, EditError::NotInTextBlock { position: 5 });
        assert_eq!(doc.text(), "ab\ncd");
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_delete_text() {
        let mut doc = Document::from_text("Hello World");
        doc.apply_edit(EditOp::delete(6, 12)).unwrap();
        assert_eq!(doc.text(), "Hello");
    }

    #[test]
    fn test_delete_whole_blocks() {
        let mut doc = Document::from_text("a\nb\nc");
        // blocks at 0, 3, 6
        let result = doc.apply_edit(EditOp::delete(3, 6)).unwrap();
        assert_eq!(doc.text(), "a\nc");
        assert_eq!(result.mapping.map(6, Assoc::Before), 3);
    }

    #[test]
    fn test_delete_everything_keeps_one_paragraph() {
        let mut doc = Document::from_text("a\nb");
        doc.apply_edit(EditOp::delete(0, 6)).unwrap();
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.size(), 2);
    }

    #[test]
    fn test_delete_partial_blocks_is_rejected() {
        let mut doc = Document::from_text("ab\ncd");
        let err = doc.apply_edit(EditOp::delete(2, 6)).unwrap_err();
        assert_eq!(err, EditError::UnsupportedRange { start: 2, end: 6 });
    }

    #[test]
    fn test_split_block() {
        let mut doc = Document::from_text("Hello");
        let result = doc.apply_edit(EditOp::split(3)).unwrap();
        assert_eq!(doc.text(), "He\nllo");
        assert_eq!(doc.size(), 9);
        assert_eq!(result.mapping.map(4, Assoc::Before), 6);
    }

    #[test]
    fn test_insert_block_at_boundary() {
        let mut doc = Document::from_text("a\nb");
        doc.apply_edit(EditOp::insert_block(3, Block::bullet_list(["x", "y"])))
            .unwrap();
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.text(), "a\nx\ny\nb");

        let err = doc
            .apply_edit(EditOp::insert_block(1, Block::paragraph("z")))
            .unwrap_err();
        assert_eq!(err, EditError::NotABoundary { position: 1 });
    }

    #[test]
    fn test_set_kind() {
        let mut doc = Document::from_text("Title\nBody");
        let result = doc
            .apply_edit(EditOp::set_kind(1, BlockKind::Heading { level: 1 }))
            .unwrap();
        assert!(result.changed);
        assert!(result.mapping.is_identity());
        assert!(doc.top_level().next().unwrap().1.kind().is_heading());

        let unchanged = doc
            .apply_edit(EditOp::set_kind(1, BlockKind::Heading { level: 1 }))
            .unwrap();
        assert!(!unchanged.changed);
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_previous_document_survives_edit() {
        let mut doc = Document::from_text("Hello");
        let before = doc.clone();
        doc.apply_edit(EditOp::insert(1, ">> ")).unwrap();
        assert_eq!(before.text(), "Hello");
        assert_eq!(doc.text(), ">> Hello");
    }

    #[test]
    fn test_top_level_starts() {
        let doc = Document::from_blocks(vec![
            Block::heading(1, "Title"),
            Block::bullet_list(["one", "two"]),
        ]);
        let starts: Vec<_> = doc.top_level().map(|(start, block)| (start, block.kind())).collect();
        assert_eq!(
            starts,
            vec![(0, BlockKind::Heading { level: 1 }), (7, BlockKind::BulletList)]
        );
    }
}
