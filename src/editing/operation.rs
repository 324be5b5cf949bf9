//! Edit operations and results

use crate::document::{Block, BlockKind};
use crate::editing::Mapping;

/// An atomic edit operation, addressed in document positions
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Insert text at a position inside a text block
    InsertText { position: usize, text: String },
    /// Delete a range inside one text block, or a run of whole top-level blocks
    Delete { start: usize, end: usize },
    /// Insert a block at a top-level boundary
    InsertBlock { position: usize, block: Block },
    /// Split the text block containing the position in two
    SplitBlock { position: usize },
    /// Change the kind of the text block containing the position
    SetKind { position: usize, kind: BlockKind },
    /// A composite transaction of multiple operations
    Transaction { ops: Vec<EditOp> },
}

impl EditOp {
    /// Create an insert operation
    pub fn insert(position: usize, text: impl Into<String>) -> Self {
        Self::InsertText {
            position,
            text: text.into(),
        }
    }

    /// Create a delete operation
    pub fn delete(start: usize, end: usize) -> Self {
        Self::Delete { start, end }
    }

    /// Create a block insertion
    pub fn insert_block(position: usize, block: Block) -> Self {
        Self::InsertBlock { position, block }
    }

    /// Create a block split (Enter)
    pub fn split(position: usize) -> Self {
        Self::SplitBlock { position }
    }

    /// Create a block kind change
    pub fn set_kind(position: usize, kind: BlockKind) -> Self {
        Self::SetKind { position, kind }
    }

    /// Create a transaction
    pub fn transaction(ops: Vec<EditOp>) -> Self {
        Self::Transaction { ops }
    }

    /// Insert possibly multi-line text: each newline splits the block
    pub fn insert_lines(position: usize, text: &str) -> Self {
        let mut ops = Vec::new();
        let mut pos = position;
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                ops.push(EditOp::split(pos));
                // past the closing and opening boundaries
                pos += 2;
            }
            if !line.is_empty() {
                ops.push(EditOp::insert(pos, line));
                pos += line.chars().count();
            }
        }
        match ops.len() {
            1 => ops.remove(0),
            _ => EditOp::transaction(ops),
        }
    }
}

/// Result of applying an edit operation
#[derive(Debug, Clone, Default)]
pub struct EditResult {
    /// Document version after this edit
    pub version: u64,
    /// Old-to-new position mapping of the edit
    pub mapping: Mapping,
    /// Whether the document changed at all
    pub changed: bool,
}

impl EditResult {
    /// Check if the edit changed the document
    pub fn has_changes(&self) -> bool {
        self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::StepMap;

    #[test]
    fn test_insert_lines_single_line() {
        let op = EditOp::insert_lines(3, "Hello");
        assert_eq!(op, EditOp::insert(3, "Hello"));
    }

    #[test]
    fn test_insert_lines_splits_blocks() {
        let op = EditOp::insert_lines(1, "ab\ncd");
        assert_eq!(
            op,
            EditOp::transaction(vec![
                EditOp::insert(1, "ab"),
                EditOp::split(3),
                EditOp::insert(5, "cd"),
            ])
        );
    }

    #[test]
    fn test_edit_result() {
        let result = EditResult {
            version: 1,
            mapping: StepMap::insertion(0, 3).into(),
            changed: true,
        };
        assert!(result.has_changes());
        assert!(!result.mapping.is_identity());
    }
}
