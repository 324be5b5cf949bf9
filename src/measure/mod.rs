//! Height measurement over a settled layout
//!
//! The rendering layer owns geometry. This module only asks it, through
//! [`HeightOracle`], how tall each top-level block rendered. Nested blocks are
//! never measured separately: a container's box already includes its
//! children, so measuring both would count the same pixels twice.

use crate::document::Document;
use std::collections::HashMap;

/// Read access to rendered block geometry
pub trait HeightOracle {
    /// Height of the rendered box of the top-level block whose range
    /// contains `position`, or `None` if its element cannot be located
    fn bounding_height(&self, position: usize) -> Option<f32>;

    /// Document version the current layout reflects, if known. `None` means
    /// the host cannot tell and layout is assumed settled.
    fn layout_version(&self) -> Option<u64> {
        None
    }
}

impl<F> HeightOracle for F
where
    F: Fn(usize) -> Option<f32>,
{
    fn bounding_height(&self, position: usize) -> Option<f32> {
        self(position)
    }
}

/// Heights keyed by block start position. Positions inside a block are not
/// resolved to their block: only exact start positions answer.
impl HeightOracle for HashMap<usize, f32> {
    fn bounding_height(&self, position: usize) -> Option<f32> {
        self.get(&position).copied()
    }
}

/// Rendered height of one top-level block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMeasurement {
    /// Start position of the block
    pub position: usize,
    pub height: f32,
}

impl BlockMeasurement {
    pub fn new(position: usize, height: f32) -> Self {
        Self { position, height }
    }
}

/// Why a block was measured as zero height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// The rendered element could not be located
    NotFound,
    /// The oracle answered with a negative or non-finite height
    InvalidHeight,
}

/// A block whose height could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementMiss {
    pub position: usize,
    pub reason: MissReason,
}

/// Measurements of one document version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureReport {
    /// Version of the measured document
    pub version: u64,
    /// Version the oracle's layout reflected, if it reported one
    pub layout_version: Option<u64>,
    pub measurements: Vec<BlockMeasurement>,
    pub misses: Vec<MeasurementMiss>,
}

impl MeasureReport {
    /// The layout did not reflect the measured document, so nothing was read
    pub fn is_stale(&self) -> bool {
        self.layout_version.is_some_and(|v| v != self.version)
    }
}

/// Measure every top-level block of `document`, in order.
///
/// A missing or invalid height counts as 0 and is recorded as a miss. If the
/// oracle reports a layout for a different document version, no block is
/// measured and the report is stale.
pub fn measure<O>(document: &Document, oracle: &O) -> MeasureReport
where
    O: HeightOracle + ?Sized,
{
    let mut report = MeasureReport {
        version: document.version(),
        layout_version: oracle.layout_version(),
        measurements: Vec::with_capacity(document.block_count()),
        misses: Vec::new(),
    };

    if report.is_stale() {
        tracing::debug!(
            version = report.version,
            layout_version = ?report.layout_version,
            "layout not settled for document, skipping measurement"
        );
        return report;
    }

    for (position, _) in document.top_level() {
        let height = match oracle.bounding_height(position) {
            Some(h) if h.is_finite() && h >= 0.0 => h,
            Some(h) => {
                tracing::warn!(position, height = h, "invalid block height, counting as 0");
                report.misses.push(MeasurementMiss {
                    position,
                    reason: MissReason::InvalidHeight,
                });
                0.0
            }
            None => {
                tracing::warn!(position, "rendered block not found, counting as 0");
                report.misses.push(MeasurementMiss {
                    position,
                    reason: MissReason::NotFound,
                });
                0.0
            }
        };
        tracing::trace!(position, height, "measured block");
        report.measurements.push(BlockMeasurement::new(position, height));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;

    struct Versioned {
        version: u64,
    }

    impl HeightOracle for Versioned {
        fn bounding_height(&self, _position: usize) -> Option<f32> {
            Some(10.0)
        }

        fn layout_version(&self) -> Option<u64> {
            Some(self.version)
        }
    }

    #[test]
    fn test_measures_top_level_only() {
        let doc = Document::from_blocks(vec![
            Block::paragraph("ab"),
            Block::bullet_list(["x", "y", "z"]),
            Block::paragraph("cd"),
        ]);
        let seen = std::cell::RefCell::new(Vec::new());
        let oracle = |pos: usize| {
            seen.borrow_mut().push(pos);
            Some(100.0)
        };
        let report = measure(&doc, &oracle);

        // list = 2 + 3 * (2 + 3) = 17
        assert_eq!(*seen.borrow(), vec![0, 4, 21]);
        assert_eq!(report.measurements.len(), 3);
        assert!(report.measurements.iter().all(|m| m.height == 100.0));
        assert!(report.misses.is_empty());
    }

    #[test]
    fn test_missing_block_counts_as_zero() {
        let doc = Document::from_text("a\nb\nc");
        let heights: HashMap<usize, f32> = [(0, 50.0), (6, 70.0)].into_iter().collect();
        let report = measure(&doc, &heights);

        assert_eq!(
            report.measurements,
            vec![
                BlockMeasurement::new(0, 50.0),
                BlockMeasurement::new(3, 0.0),
                BlockMeasurement::new(6, 70.0),
            ]
        );
        assert_eq!(
            report.misses,
            vec![MeasurementMiss {
                position: 3,
                reason: MissReason::NotFound
            }]
        );
    }

    #[test]
    fn test_height_map_answers_start_positions_only() {
        let heights: HashMap<usize, f32> = [(0, 50.0), (7, 30.0)].into_iter().collect();
        assert_eq!(heights.bounding_height(7), Some(30.0));
        assert_eq!(heights.bounding_height(8), None);
    }

    #[test]
    fn test_invalid_height_is_a_miss() {
        let doc = Document::from_text("a");
        let report = measure(&doc, &|_: usize| Some(f32::NAN));
        assert_eq!(report.measurements[0].height, 0.0);
        assert_eq!(report.misses[0].reason, MissReason::InvalidHeight);
    }

    #[test]
    fn test_stale_layout_measures_nothing() {
        let mut doc = Document::from_text("a");
        doc.apply_edit(crate::editing::EditOp::insert(1, "b")).unwrap();

        let report = measure(&doc, &Versioned { version: 0 });
        assert!(report.is_stale());
        assert!(report.measurements.is_empty());

        let report = measure(&doc, &Versioned { version: 1 });
        assert!(!report.is_stale());
        assert_eq!(report.measurements.len(), 1);
    }
}
