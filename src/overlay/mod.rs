//! Overlay: page-break markers drawn outside document content

mod marker;

pub use marker::{build_markers, PageBreakMarker, Side};

use crate::pagination::PaginationState;
use std::rc::Rc;

/// Keeps the marker list in step with the live pagination state.
///
/// The list is rebuilt from scratch whenever a different state is observed.
/// States are immutable, so an unchanged `Rc` means unchanged markers.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    source: Option<Rc<PaginationState>>,
    markers: Vec<PageBreakMarker>,
    redraws: u64,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe `state`. Returns `true` if the markers were redrawn.
    pub fn sync(&mut self, state: &Rc<PaginationState>) -> bool {
        if self
            .source
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, state))
        {
            return false;
        }

        self.markers = build_markers(state);
        self.source = Some(Rc::clone(state));
        self.redraws += 1;
        tracing::trace!(
            generation = state.generation(),
            markers = self.markers.len(),
            "overlay redrawn"
        );
        true
    }

    pub fn markers(&self) -> &[PageBreakMarker] {
        &self.markers
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    /// Drop all markers and forget the observed state
    pub fn clear(&mut self) {
        self.source = None;
        self.markers.clear();
    }

    /// Markers as a JSON array for the host
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.markers)
    }
}
