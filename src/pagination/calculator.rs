//! Page break calculation
//!
//! Pure functions from block measurements and a page capacity to break
//! positions. They know nothing about the rendering layer.

use crate::measure::BlockMeasurement;
use smallvec::SmallVec;
use std::ops::Range;

/// Ordered, strictly increasing break positions
pub type BreakList = SmallVec<[usize; 8]>;

/// Whether a block of `height` must open a new page when `used` pixels of the
/// current page are taken. The first block on a page never does, so an
/// oversized block gets a page of its own instead of an empty one before it.
#[inline]
fn starts_new_page(used: f32, height: f32, capacity: f32) -> bool {
    used > 0.0 && used + height > capacity
}

/// Compute break positions for blocks in document order.
///
/// A break is placed before every block that would overflow the page it
/// would otherwise land on. Content that fills a page exactly does not break.
pub fn calculate_breaks(measurements: &[BlockMeasurement], capacity: f32) -> BreakList {
    let mut breaks = BreakList::new();
    let mut used = 0.0;

    for m in measurements {
        if starts_new_page(used, m.height, capacity) {
            breaks.push(m.position);
            used = m.height;
        } else {
            used += m.height;
        }
    }

    breaks
}

/// Blocks laid on one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpan {
    /// Indices into the measurement list
    pub blocks: Range<usize>,
    /// Sum of the block heights
    pub height: f32,
}

impl PageSpan {
    /// A page holding a single block taller than the page
    pub fn is_oversized(&self, capacity: f32) -> bool {
        self.blocks.len() == 1 && self.height > capacity
    }
}

/// Group blocks into pages using the same rule as [`calculate_breaks`]
pub fn page_spans(measurements: &[BlockMeasurement], capacity: f32) -> Vec<PageSpan> {
    let mut spans = Vec::new();
    let mut current = PageSpan {
        blocks: 0..0,
        height: 0.0,
    };

    for (idx, m) in measurements.iter().enumerate() {
        if starts_new_page(current.height, m.height, capacity) {
            let next = PageSpan {
                blocks: idx..idx,
                height: 0.0,
            };
            spans.push(std::mem::replace(&mut current, next));
        }
        current.blocks.end = idx + 1;
        current.height += m.height;
    }

    spans.push(current);
    spans
}
