//! Paged-editor: page breaks for a continuous rich-text editing surface
//!
//! This crate provides the pagination engine with:
//! - Height measurement of top-level blocks through a rendering oracle
//! - A pure page-break calculator over measured heights
//! - Immutable, generation-tagged pagination state remapped on every edit
//! - Debounced, cancellable recomputation on a single-threaded scheduler
//! - Page-break overlay markers kept outside document content

pub mod config;
pub mod document;
pub mod editing;
pub mod error;
pub mod layout;
pub mod measure;
pub mod overlay;
pub mod pagination;
pub mod scheduler;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmEditor;

// Re-export primary types
pub use config::{EditorConfig, PageConfig, SchedulerConfig, Typography};
pub use document::{Block, BlockKind, Document};
pub use editing::{Assoc, EditOp, EditResult, Mapping, StepMap};
pub use error::{ConfigError, EditError};
pub use layout::{FontMetrics, LayoutEngine, LayoutSnapshot};
pub use measure::{measure, BlockMeasurement, HeightOracle, MeasureReport};
pub use overlay::{OverlayRenderer, PageBreakMarker};
pub use pagination::{calculate_breaks, PaginationState};
pub use scheduler::{Mutation, Paginator, Phase, SchedulerStats};

use std::rc::Rc;

/// An editing session: document, reference layout, paginator and overlay
pub struct Editor {
    config: EditorConfig,
    document: Document,
    layout: LayoutEngine,
    paginator: Paginator,
    overlay: OverlayRenderer,
}

impl Editor {
    /// Start a session on an empty document
    pub fn new(config: EditorConfig, now_ms: u64) -> Result<Self, ConfigError> {
        Self::with_document(config, Document::new(), now_ms)
    }

    /// Start a session with one paragraph per line of `text`
    pub fn with_text(text: &str, config: EditorConfig, now_ms: u64) -> Result<Self, ConfigError> {
        Self::with_document(config, Document::from_text(text), now_ms)
    }

    /// Start a session on an existing document
    pub fn with_document(
        config: EditorConfig,
        document: Document,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = LayoutEngine::new(&config);
        let paginator = Paginator::mount(config.scheduler, config.capacity(), now_ms);
        let mut overlay = OverlayRenderer::new();
        overlay.sync(&paginator.state());

        tracing::info!(
            blocks = document.block_count(),
            capacity = config.capacity(),
            "editor session started"
        );
        Ok(Self {
            config,
            document,
            layout,
            paginator,
            overlay,
        })
    }

    /// Replace the reference layout, e.g. to use different font metrics
    pub fn set_layout(&mut self, layout: LayoutEngine) {
        self.layout = layout;
    }

    /// Apply an edit and notify the paginator.
    ///
    /// Markers move with the edit immediately; fresh breaks arrive on a later
    /// [`tick`](Self::tick).
    pub fn apply(&mut self, op: EditOp, now_ms: u64) -> Result<EditResult, EditError> {
        let before = self.document.clone();
        let result = self.document.apply_edit(op)?;
        if !self.paginator.is_torn_down() {
            self.paginator.on_mutation(
                &Mutation {
                    before: &before,
                    after: &self.document,
                    mapping: &result.mapping,
                },
                now_ms,
            );
            self.overlay.sync(&self.paginator.state());
        }
        Ok(result)
    }

    /// Insert text at `position`; newlines split the block
    pub fn insert_text(
        &mut self,
        position: usize,
        text: &str,
        now_ms: u64,
    ) -> Result<EditResult, EditError> {
        self.apply(EditOp::insert_lines(position, text), now_ms)
    }

    /// Settle the reference layout, run due recomputes against it and redraw
    /// the overlay. Returns `true` if the markers changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.paginator.is_torn_down() {
            return false;
        }
        let snapshot = self.layout.relayout(&self.document);
        poll_and_sync(
            &mut self.paginator,
            &mut self.overlay,
            &self.document,
            now_ms,
            snapshot,
        )
    }

    /// Run due recomputes against heights from the host's own renderer and
    /// redraw the overlay. The reference layout is not consulted.
    pub fn tick_with<O>(&mut self, now_ms: u64, oracle: &O) -> bool
    where
        O: HeightOracle + ?Sized,
    {
        if self.paginator.is_torn_down() {
            return false;
        }
        poll_and_sync(
            &mut self.paginator,
            &mut self.overlay,
            &self.document,
            now_ms,
            oracle,
        )
    }

    /// Time of the next pending recompute, for the host's timer
    pub fn next_deadline(&self) -> Option<u64> {
        self.paginator.next_deadline()
    }

    /// Get total page count
    pub fn page_count(&self) -> usize {
        self.paginator.page_count()
    }

    pub fn markers(&self) -> &[PageBreakMarker] {
        self.overlay.markers()
    }

    pub fn overlay_json(&self) -> Result<String, serde_json::Error> {
        self.overlay.to_json()
    }

    pub fn state(&self) -> Rc<PaginationState> {
        self.paginator.state()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.paginator.stats()
    }

    pub fn phase(&self) -> Phase {
        self.paginator.phase()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The layout published by the last tick
    pub fn layout(&self) -> Option<&LayoutSnapshot> {
        self.layout.snapshot()
    }

    /// Get document text
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// End the session: cancel pending recomputes and remove the markers
    pub fn teardown(&mut self) {
        if self.paginator.is_torn_down() {
            return;
        }
        self.paginator.teardown();
        self.overlay.clear();
        tracing::info!("editor session ended");
    }
}

fn poll_and_sync<O>(
    paginator: &mut Paginator,
    overlay: &mut OverlayRenderer,
    document: &Document,
    now_ms: u64,
    oracle: &O,
) -> bool
where
    O: HeightOracle + ?Sized,
{
    paginator.poll(now_ms, document, oracle);
    overlay.sync(&paginator.state())
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.teardown();
    }
}
