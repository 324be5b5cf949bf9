//! Reference layout engine with a per-block height cache
//!
//! Stands in for the host's rendering layer: it lays the document out on one
//! continuous surface and answers height queries through [`HeightOracle`].

use crate::config::{EditorConfig, Typography};
use crate::document::{Block, BlockContent, BlockKind, Document};
use crate::layout::font::FontMetrics;
use crate::layout::line_break::LineBreaker;
use crate::measure::HeightOracle;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};

/// Rendered box of one top-level block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockBox {
    /// Position of the opening boundary
    pub start: usize,
    /// Position just past the closing boundary
    pub end: usize,
    /// Rendered height including spacing after the block
    pub height: f32,
}

impl BlockBox {
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }
}

/// Settled layout of one document version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSnapshot {
    version: u64,
    boxes: Vec<BlockBox>,
}

impl LayoutSnapshot {
    /// Document version this layout reflects
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Top-level block boxes in document order
    pub fn boxes(&self) -> &[BlockBox] {
        &self.boxes
    }

    /// Box of the top-level block containing `position`
    pub fn box_at(&self, position: usize) -> Option<&BlockBox> {
        let idx = self.boxes.partition_point(|b| b.end <= position);
        self.boxes.get(idx).filter(|b| b.contains(position))
    }
}

impl HeightOracle for LayoutSnapshot {
    fn bounding_height(&self, position: usize) -> Option<f32> {
        self.box_at(position).map(|b| b.height)
    }

    fn layout_version(&self) -> Option<u64> {
        Some(self.version)
    }
}

/// Cache statistics of the last layout pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutPass {
    pub hits: usize,
    pub misses: usize,
}

/// Line-box height of one text block, with the inputs it was computed from
#[derive(Debug, Clone)]
struct CachedHeight {
    kind: BlockKind,
    width_bits: u32,
    text: String,
    height: f32,
}

impl CachedHeight {
    fn matches(&self, kind: BlockKind, text: &str, width: f32) -> bool {
        self.kind == kind && self.width_bits == width.to_bits() && self.text == text
    }
}

/// Lays out documents and caches text block heights
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    typography: Typography,
    content_width: f32,
    line_breaker: LineBreaker,
    /// Line-box heights of text blocks, keyed by a digest of kind, text and
    /// width. Entries are checked against their inputs on lookup.
    heights: FxHashMap<u64, CachedHeight>,
    snapshot: Option<LayoutSnapshot>,
    last_pass: LayoutPass,
}

impl LayoutEngine {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_metrics(config, FontMetrics::default())
    }

    pub fn with_metrics(config: &EditorConfig, metrics: FontMetrics) -> Self {
        Self {
            typography: config.typography.clone(),
            content_width: config.page.content_width(),
            line_breaker: LineBreaker::new(metrics),
            heights: FxHashMap::default(),
            snapshot: None,
            last_pass: LayoutPass::default(),
        }
    }

    /// The last published layout, which may lag behind the document
    pub fn snapshot(&self) -> Option<&LayoutSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_pass(&self) -> LayoutPass {
        self.last_pass
    }

    pub fn cached_blocks(&self) -> usize {
        self.heights.len()
    }

    /// Drop all cached geometry
    pub fn invalidate(&mut self) {
        self.heights.clear();
        self.snapshot = None;
    }

    /// Bring the layout up to date with `document` and publish it
    pub fn relayout(&mut self, document: &Document) -> &LayoutSnapshot {
        match self.snapshot.take() {
            Some(snapshot) if snapshot.version == document.version() => {
                self.snapshot.insert(snapshot)
            }
            _ => {
                let snapshot = self.layout_document(document);
                self.snapshot.insert(snapshot)
            }
        }
    }

    fn layout_document(&mut self, document: &Document) -> LayoutSnapshot {
        let previous = std::mem::take(&mut self.heights);
        let mut pass = Pass {
            engine: self,
            previous,
            next: FxHashMap::default(),
            stats: LayoutPass::default(),
        };
        let boxes = document
            .top_level()
            .map(|(start, block)| BlockBox {
                start,
                end: start + block.node_size(),
                height: pass.block_height(block, 0, 0),
            })
            .collect();

        let Pass { next, stats, .. } = pass;
        self.heights = next;
        self.last_pass = stats;
        tracing::debug!(
            version = document.version(),
            hits = stats.hits,
            misses = stats.misses,
            "layout settled"
        );

        LayoutSnapshot {
            version: document.version(),
            boxes,
        }
    }

    fn text_height(&self, kind: BlockKind, text: &str, width: f32) -> f32 {
        let font_size = self.typography.font_size_for(kind);
        let lines = self.line_breaker.count_lines(text, font_size, width);
        lines as f32 * self.typography.line_px_for(kind)
    }
}

/// One layout pass. Only heights used in this pass survive into the cache.
struct Pass<'a> {
    engine: &'a LayoutEngine,
    previous: FxHashMap<u64, CachedHeight>,
    next: FxHashMap<u64, CachedHeight>,
    stats: LayoutPass,
}

impl Pass<'_> {
    fn block_height(&mut self, block: &Block, depth: usize, indent_levels: usize) -> f32 {
        let engine = self.engine;
        let typography = &engine.typography;
        let spacing = if depth == 0 {
            typography.block_spacing
        } else {
            typography.nested_spacing
        };

        match block.content() {
            BlockContent::Text(text) => {
                let width = (engine.content_width - typography.indent * indent_levels as f32)
                    .max(typography.font_size);
                self.line_box_height(block.kind(), text, width) + spacing
            }
            BlockContent::Blocks(children) => {
                let indent_levels = indent_levels + usize::from(indents(block.kind()));
                let inner: f32 = children
                    .iter()
                    .map(|child| self.block_height(child, depth + 1, indent_levels))
                    .sum();
                if depth == 0 {
                    inner + spacing
                } else {
                    inner
                }
            }
        }
    }

    fn line_box_height(&mut self, kind: BlockKind, text: &str, width: f32) -> f32 {
        let key = cache_key(kind, text, width);
        let entry = match self.previous.remove(&key) {
            Some(cached) if cached.matches(kind, text, width) => {
                self.stats.hits += 1;
                cached
            }
            _ => {
                self.stats.misses += 1;
                CachedHeight {
                    kind,
                    width_bits: width.to_bits(),
                    text: text.to_owned(),
                    height: self.engine.text_height(kind, text, width),
                }
            }
        };
        let height = entry.height;
        self.next.insert(key, entry);
        height
    }
}

fn indents(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::BulletList | BlockKind::OrderedList | BlockKind::Blockquote
    )
}

fn cache_key(kind: BlockKind, text: &str, width: f32) -> u64 {
    let mut hasher = FxHasher::default();
    kind.hash(&mut hasher);
    text.hash(&mut hasher);
    width.to_bits().hash(&mut hasher);
    hasher.finish()
}
