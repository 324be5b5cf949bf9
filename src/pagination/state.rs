//! Immutable, generation-tagged pagination snapshots

use crate::editing::{Assoc, Mapping};
use crate::pagination::BreakList;

/// Break positions valid for one generation of the document.
///
/// Never mutated in place: a remap or a recompute produces a new value, which
/// the scheduler swaps in behind an `Rc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    breaks: BreakList,
    generation: u64,
}

impl PaginationState {
    /// State at mount: one page, generation 0
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn new(breaks: BreakList, generation: u64) -> Self {
        debug_assert!(
            breaks.windows(2).all(|w| w[0] < w[1]),
            "breaks must be strictly increasing"
        );
        Self { breaks, generation }
    }

    pub fn breaks(&self) -> &[usize] {
        &self.breaks
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The displayed page count. Derived from the breaks and nothing else.
    pub fn page_count(&self) -> usize {
        self.breaks.len() + 1
    }

    /// Carry the breaks through an edit, one generation later.
    ///
    /// Breaks stay in front of content inserted exactly at them. Breaks only
    /// shift or collapse: two breaks landing on the same position become one,
    /// and a break pushed back to the document start disappears, since the
    /// first page has no break in front of it.
    pub fn remapped(&self, mapping: &Mapping) -> Self {
        let mut breaks = BreakList::new();
        let mut inside_deletions = 0;
        for &pos in &self.breaks {
            let result = mapping.map_result(pos, Assoc::Before);
            inside_deletions += usize::from(result.deleted);
            let mapped = result.pos;
            if mapped == 0 || breaks.last().is_some_and(|&last| last >= mapped) {
                continue;
            }
            breaks.push(mapped);
        }

        if breaks.len() != self.breaks.len() {
            tracing::debug!(
                before = self.breaks.len(),
                after = breaks.len(),
                inside_deletions,
                "breaks collapsed by remap"
            );
        }

        Self {
            breaks,
            generation: self.generation + 1,
        }
    }
}
