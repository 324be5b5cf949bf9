//! Laws of the break calculator and of remapping

use paged_editor::pagination::page_spans;
use paged_editor::{calculate_breaks, BlockMeasurement, Mapping, PaginationState, StepMap};
use proptest::prelude::*;

const CAPACITY: f32 = 864.0;

/// Blocks as (height, node size); positions follow from the sizes
fn blocks() -> impl Strategy<Value = Vec<(f32, usize)>> {
    prop::collection::vec((0.0f32..1200.0, 2usize..40), 0..60)
}

fn measurements(blocks: &[(f32, usize)]) -> Vec<BlockMeasurement> {
    let mut position = 0;
    blocks
        .iter()
        .map(|&(height, size)| {
            let m = BlockMeasurement::new(position, height);
            position += size;
            m
        })
        .collect()
}

/// Split measurements at the breaks and sum each page
fn page_heights(measurements: &[BlockMeasurement], breaks: &[usize]) -> Vec<(usize, f32)> {
    let mut pages = vec![(0, 0.0)];
    for m in measurements {
        if breaks.contains(&m.position) {
            pages.push((0, 0.0));
        }
        let page = pages.last_mut().expect("at least one page");
        page.0 += 1;
        page.1 += m.height;
    }
    pages
}

fn step() -> impl Strategy<Value = StepMap> {
    prop_oneof![
        (0usize..2_000, 1usize..200).prop_map(|(pos, len)| StepMap::insertion(pos, len)),
        (0usize..2_000, 1usize..400).prop_map(|(start, len)| StepMap::deletion(start, start + len)),
    ]
}

fn sorted_breaks() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::btree_set(1usize..2_000, 0..30).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn breaks_are_strictly_increasing_and_positive(blocks in blocks()) {
        let breaks = calculate_breaks(&measurements(&blocks), CAPACITY);
        prop_assert!(breaks.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(breaks.iter().all(|&b| b > 0));
    }

    #[test]
    fn pages_fit_unless_single_oversized_block(blocks in blocks()) {
        let measurements = measurements(&blocks);
        let breaks = calculate_breaks(&measurements, CAPACITY);
        for (count, height) in page_heights(&measurements, &breaks) {
            prop_assert!(height <= CAPACITY || count == 1, "{count} blocks, {height}px");
        }
    }

    #[test]
    fn first_block_never_breaks(blocks in blocks()) {
        let measurements = measurements(&blocks);
        let breaks = calculate_breaks(&measurements, CAPACITY);
        if let Some(first) = measurements.first() {
            prop_assert!(!breaks.contains(&first.position));
        }
    }

    #[test]
    fn every_break_is_needed(blocks in blocks()) {
        let measurements = measurements(&blocks);
        let breaks = calculate_breaks(&measurements, CAPACITY);
        let pages = page_heights(&measurements, &breaks);
        // moving a page's first block back onto the previous page overflows it
        let mut idx = 0;
        for window in pages.windows(2) {
            idx += window[0].0;
            let moved = measurements[idx].height;
            prop_assert!(window[0].1 + moved > CAPACITY);
        }
    }

    #[test]
    fn page_count_is_breaks_plus_one(blocks in blocks()) {
        let measurements = measurements(&blocks);
        let breaks = calculate_breaks(&measurements, CAPACITY);
        let state = PaginationState::new(breaks.clone(), 0);
        prop_assert_eq!(state.page_count(), breaks.len() + 1);
        if !measurements.is_empty() {
            prop_assert_eq!(page_spans(&measurements, CAPACITY).len(), state.page_count());
        }
    }

    #[test]
    fn calculation_is_idempotent(blocks in blocks()) {
        let measurements = measurements(&blocks);
        prop_assert_eq!(
            calculate_breaks(&measurements, CAPACITY),
            calculate_breaks(&measurements, CAPACITY)
        );
    }

    #[test]
    fn remap_keeps_breaks_ordered(
        breaks in sorted_breaks(),
        steps in prop::collection::vec(step(), 1..6),
    ) {
        let state = PaginationState::new(breaks.iter().copied().collect(), 7);
        let mut mapping = Mapping::new();
        for step in steps {
            mapping.push(step);
        }
        let remapped = state.remapped(&mapping);

        prop_assert!(remapped.breaks().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(remapped.breaks().iter().all(|&b| b > 0));
        prop_assert!(remapped.breaks().len() <= breaks.len());
        prop_assert_eq!(remapped.generation(), 8);
    }
}
