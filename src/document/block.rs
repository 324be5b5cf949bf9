//! Block-level nodes

use smallvec::SmallVec;

/// Path from a top-level block down to a nested block, by child index
pub type BlockPath = SmallVec<[usize; 4]>;

/// The kind of block element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockKind {
    /// Regular paragraph
    #[default]
    Paragraph,
    /// Heading with level (1-3 rendered distinctly)
    Heading { level: u8 },
    /// Unordered list of list items
    BulletList,
    /// Numbered list of list items
    OrderedList,
    /// Single list entry holding blocks
    ListItem,
    /// Quoted container
    Blockquote,
}

impl BlockKind {
    /// Whether this kind holds inline text rather than child blocks
    pub fn is_textblock(&self) -> bool {
        matches!(self, BlockKind::Paragraph | BlockKind::Heading { .. })
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading { .. })
    }

    /// Node type name
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading { .. } => "heading",
            BlockKind::BulletList => "bulletList",
            BlockKind::OrderedList => "orderedList",
            BlockKind::ListItem => "listItem",
            BlockKind::Blockquote => "blockquote",
        }
    }
}

/// What a block holds
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(String),
    Blocks(Vec<Block>),
}

/// A node in the document tree.
///
/// Every node occupies `content_size() + 2` positions: one for its opening
/// boundary, its content, and one for its closing boundary. Text content
/// counts one position per `char`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    kind: BlockKind,
    content: BlockContent,
}

impl Block {
    /// Create a paragraph
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            content: BlockContent::Text(text.into()),
        }
    }

    /// Create a heading
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Heading {
                level: level.clamp(1, 6),
            },
            content: BlockContent::Text(text.into()),
        }
    }

    /// Create a list item holding the given blocks
    pub fn list_item(children: Vec<Block>) -> Self {
        Self::container(BlockKind::ListItem, children)
    }

    /// Create a bullet list with one paragraph item per entry
    pub fn bullet_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::list(BlockKind::BulletList, items)
    }

    /// Create an ordered list with one paragraph item per entry
    pub fn ordered_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::list(BlockKind::OrderedList, items)
    }

    /// Create a blockquote
    pub fn blockquote(children: Vec<Block>) -> Self {
        Self::container(BlockKind::Blockquote, children)
    }

    fn list<S: Into<String>>(kind: BlockKind, items: impl IntoIterator<Item = S>) -> Self {
        let children = items
            .into_iter()
            .map(|text| Block::list_item(vec![Block::paragraph(text)]))
            .collect();
        Self::container(kind, children)
    }

    fn container(kind: BlockKind, children: Vec<Block>) -> Self {
        Self {
            kind,
            content: BlockContent::Blocks(children),
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn content(&self) -> &BlockContent {
        &self.content
    }

    /// Inline text, if this is a text block
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Text(text) => Some(text),
            BlockContent::Blocks(_) => None,
        }
    }

    /// Child blocks (empty for text blocks)
    pub fn children(&self) -> &[Block] {
        match &self.content {
            BlockContent::Text(_) => &[],
            BlockContent::Blocks(children) => children,
        }
    }

    /// Number of positions between the opening and closing boundary
    pub fn content_size(&self) -> usize {
        match &self.content {
            BlockContent::Text(text) => text.chars().count(),
            BlockContent::Blocks(children) => children.iter().map(Block::node_size).sum(),
        }
    }

    /// Number of positions this node occupies
    pub fn node_size(&self) -> usize {
        self.content_size() + 2
    }

    /// Find the text block containing `pos`, given that this block's content
    /// starts at `content_start`. Returns the path below this block and the
    /// char offset inside the text.
    pub(crate) fn locate_text(&self, content_start: usize, pos: usize) -> Option<(BlockPath, usize)> {
        match &self.content {
            BlockContent::Text(text) => {
                let offset = pos.checked_sub(content_start)?;
                (offset <= text.chars().count()).then(|| (BlockPath::new(), offset))
            }
            BlockContent::Blocks(children) => {
                let mut start = content_start;
                for (idx, child) in children.iter().enumerate() {
                    let end = start + child.node_size();
                    if pos > start && pos < end {
                        let (mut path, offset) = child.locate_text(start + 1, pos)?;
                        path.insert(0, idx);
                        return Some((path, offset));
                    }
                    start = end;
                }
                None
            }
        }
    }

    /// Descend along `path` to a nested block
    pub(crate) fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => match &mut self.content {
                BlockContent::Blocks(children) => children.get_mut(idx)?.descendant_mut(rest),
                BlockContent::Text(_) => None,
            },
        }
    }

    /// Insert text at a char offset of a text block
    pub(crate) fn insert_text(&mut self, offset: usize, inserted: &str) -> bool {
        match &mut self.content {
            BlockContent::Text(text) => {
                let at = byte_index(text, offset);
                text.insert_str(at, inserted);
                true
            }
            BlockContent::Blocks(_) => false,
        }
    }

    /// Remove the chars in `start..end` of a text block
    pub(crate) fn delete_text(&mut self, start: usize, end: usize) -> bool {
        match &mut self.content {
            BlockContent::Text(text) => {
                let from = byte_index(text, start);
                let to = byte_index(text, end);
                text.replace_range(from..to, "");
                true
            }
            BlockContent::Blocks(_) => false,
        }
    }

    /// Cut a text block at a char offset, returning the tail as a new block
    /// of the same kind
    pub(crate) fn split_off_text(&mut self, offset: usize) -> Option<Block> {
        match &mut self.content {
            BlockContent::Text(text) => {
                let at = byte_index(text, offset);
                let tail = text.split_off(at);
                Some(Block {
                    kind: self.kind,
                    content: BlockContent::Text(tail),
                })
            }
            BlockContent::Blocks(_) => None,
        }
    }

    /// Split the text block at `path` (relative to this container) and place
    /// the tail right after it
    pub(crate) fn split_nested(&mut self, path: &[usize], offset: usize) -> bool {
        let Some((&last, parents)) = path.split_last() else {
            return false;
        };
        let Some(parent) = self.descendant_mut(parents) else {
            return false;
        };
        let BlockContent::Blocks(children) = &mut parent.content else {
            return false;
        };
        let Some(tail) = children.get_mut(last).and_then(|b| b.split_off_text(offset)) else {
            return false;
        };
        children.insert(last + 1, tail);
        true
    }

    /// Change the kind of a text block to another text block kind
    pub(crate) fn set_text_kind(&mut self, kind: BlockKind) -> bool {
        if !self.kind.is_textblock() || !kind.is_textblock() {
            return false;
        }
        self.kind = kind;
        true
    }

    /// Append the plain text of all text blocks, one line each
    pub(crate) fn collect_text(&self, out: &mut Vec<String>) {
        match &self.content {
            BlockContent::Text(text) => out.push(text.clone()),
            BlockContent::Blocks(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Byte index of the `char_idx`-th char, clamped to the end
fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
