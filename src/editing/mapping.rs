//! Position mapping through edits
//!
//! Every edit the kernel applies yields a [`StepMap`] describing which old
//! ranges were replaced by how much new content. A [`Mapping`] chains step
//! maps so that a position from before a whole transaction can be carried to
//! the document after it.

use smallvec::SmallVec;

/// Which side a position sticks to when content is inserted exactly at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    /// Stay in front of inserted content
    #[default]
    Before,
    /// Move past inserted content
    After,
}

/// A position carried through a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    /// The position was strictly inside a replaced range
    pub deleted: bool,
}

/// One replaced range, in the coordinates of the document before the step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChangedRange {
    start: usize,
    old_size: usize,
    new_size: usize,
}

/// Mapping of a single primitive edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: SmallVec<[ChangedRange; 1]>,
}

impl StepMap {
    /// A step that moves nothing (e.g. a block type change)
    pub fn identity() -> Self {
        Self::default()
    }

    /// `len` positions inserted at `pos`
    pub fn insertion(pos: usize, len: usize) -> Self {
        Self::replacement(pos, 0, len)
    }

    /// The range `start..end` removed
    pub fn deletion(start: usize, end: usize) -> Self {
        Self::replacement(start, end.saturating_sub(start), 0)
    }

    /// `old_size` positions at `start` replaced by `new_size` positions
    pub fn replacement(start: usize, old_size: usize, new_size: usize) -> Self {
        let mut ranges = SmallVec::new();
        if old_size != 0 || new_size != 0 {
            ranges.push(ChangedRange {
                start,
                old_size,
                new_size,
            });
        }
        Self { ranges }
    }

    pub fn is_identity(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Map a position, reporting whether it fell inside replaced content
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == range.start {
                    Assoc::Before
                } else if pos == end {
                    Assoc::After
                } else {
                    assoc
                };
                let base = offset(range.start, diff);
                let mapped = match side {
                    Assoc::Before => base,
                    Assoc::After => base + range.new_size,
                };
                return MapResult {
                    pos: mapped,
                    deleted: range.old_size > 0 && pos > range.start && pos < end,
                };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        MapResult {
            pos: offset(pos, diff),
            deleted: false,
        }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

fn offset(pos: usize, diff: isize) -> usize {
    pos.saturating_add_signed(diff)
}

/// A sequence of step maps applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Identity steps are dropped.
    pub fn push(&mut self, map: StepMap) {
        if !map.is_identity() {
            self.maps.push(map);
        }
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    /// True when no position moves
    pub fn is_identity(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut deleted = false;
        let mut pos = pos;
        for map in &self.maps {
            let result = map.map_result(pos, assoc);
            pos = result.pos;
            deleted |= result.deleted;
        }
        MapResult { pos, deleted }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

impl From<StepMap> for Mapping {
    fn from(map: StepMap) -> Self {
        let mut mapping = Mapping::new();
        mapping.push(map);
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_shifts_later_positions() {
        let map = StepMap::insertion(10, 5);
        assert_eq!(map.map(3, Assoc::Before), 3);
        assert_eq!(map.map(20, Assoc::Before), 25);
    }

    #[test]
    fn test_insertion_at_position_respects_assoc() {
        let map = StepMap::insertion(10, 5);
        assert_eq!(map.map(10, Assoc::Before), 10);
        assert_eq!(map.map(10, Assoc::After), 15);
    }

    #[test]
    fn test_deletion_collapses_inner_positions() {
        let map = StepMap::deletion(10, 20);
        let inside = map.map_result(15, Assoc::Before);
        assert_eq!(inside, MapResult { pos: 10, deleted: true });

        let edge = map.map_result(20, Assoc::Before);
        assert_eq!(edge, MapResult { pos: 10, deleted: false });

        assert_eq!(map.map(30, Assoc::Before), 20);
    }

    #[test]
    fn test_mapping_chains_steps() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::insertion(0, 4));
        mapping.push(StepMap::deletion(10, 14));
        mapping.push(StepMap::identity());

        assert_eq!(mapping.maps().len(), 2);
        // 8 -> 12 -> collapsed onto 10
        let result = mapping.map_result(8, Assoc::Before);
        assert_eq!(result, MapResult { pos: 10, deleted: true });
        // 20 -> 24 -> 20
        assert_eq!(mapping.map(20, Assoc::Before), 20);
    }

    #[test]
    fn test_identity() {
        let mapping = Mapping::from(StepMap::identity());
        assert!(mapping.is_identity());
        assert_eq!(mapping.map(42, Assoc::After), 42);
    }
}
