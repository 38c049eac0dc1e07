//! Strategies for lining up two per-axis partitions.
//!
//! Combining two shapes needs a common lattice: along each axis the two coordinate lists
//! are merged into one, and every merged cell remembers which source cell it came from in
//! each input (`-1` when it lies outside that input). The cheapest applicable strategy is
//! picked by [`create_index_merger`].

use std::sync::Arc;

use tracing::trace;
use voxshape_core::math::{gcd, lcm};
use voxshape_core::EPSILON;

use crate::coords::CoordList;

/// Largest `cost * lcm(a, b)` for which two cube subdivisions are merged analytically.
///
/// `cost` is the number of merged cells on the axes already processed, so this caps the
/// size of the lattice the analytic path can produce.
pub const MAX_CUBE_MERGE_CELLS: u64 = 256;

/// Merged partition of one axis.
#[derive(Debug, Clone)]
pub enum IndexMerger {
    /// Both inputs share the same boundaries.
    Identical(IdenticalMerger),
    /// One input lies entirely below the other.
    NonOverlapping(NonOverlappingMerger),
    /// Both inputs are uniform subdivisions of `[0, 1]`.
    DiscreteCube(DiscreteCubeMerger),
    /// General sorted merge.
    Indirect(IndirectMerger),
}

impl IndexMerger {
    /// Number of merged boundary points (cells + 1).
    pub fn size(&self) -> usize {
        match self {
            IndexMerger::Identical(m) => m.coords.len(),
            IndexMerger::NonOverlapping(m) => m.lower.len() + m.upper.len(),
            IndexMerger::DiscreteCube(m) => m.result_parts as usize + 1,
            IndexMerger::Indirect(m) => m.result_len,
        }
    }

    /// Merged boundary list.
    pub fn coords(&self) -> CoordList {
        match self {
            IndexMerger::Identical(m) => m.coords.clone(),
            IndexMerger::NonOverlapping(m) => {
                CoordList::explicit(m.lower.iter().chain(m.upper.iter()).collect::<Vec<_>>())
            }
            IndexMerger::DiscreteCube(m) => CoordList::cube(m.result_parts),
            IndexMerger::Indirect(m) => {
                if m.result_len <= 1 {
                    CoordList::explicit(vec![0.0])
                } else {
                    CoordList::Explicit(Arc::clone(&m.result))
                }
            }
        }
    }

    /// Whether this merger computed its lattice analytically.
    pub fn is_discrete_cube(&self) -> bool {
        matches!(self, IndexMerger::DiscreteCube(_))
    }

    /// Feed `(first_index, second_index, merged_index)` for every merged cell in order.
    ///
    /// Stops as soon as `consumer` returns `false`; the return value is `false` exactly
    /// when iteration was cut short.
    pub fn for_merged_indexes(&self, mut consumer: impl FnMut(i32, i32, i32) -> bool) -> bool {
        match self {
            IndexMerger::Identical(m) => {
                let cells = m.coords.len() as i32 - 1;
                (0..cells).all(|i| consumer(i, i, i))
            }
            IndexMerger::NonOverlapping(m) => {
                if m.swap {
                    m.for_non_swapped_indexes(|lower, upper, result| consumer(upper, lower, result))
                } else {
                    m.for_non_swapped_indexes(consumer)
                }
            }
            IndexMerger::DiscreteCube(m) => {
                (0..m.result_parts as i32).all(|i| consumer(i / m.second_div, i / m.first_div, i))
            }
            IndexMerger::Indirect(m) => (0..m.result_len.saturating_sub(1)).all(|k| {
                consumer(m.first_indices[k], m.second_indices[k], k as i32)
            }),
        }
    }
}

/// Merger for two equal lists.
#[derive(Debug, Clone)]
pub struct IdenticalMerger {
    coords: CoordList,
}

impl IdenticalMerger {
    /// Merge a list with itself.
    pub fn new(coords: CoordList) -> Self {
        Self { coords }
    }
}

/// Merger for two lists whose ranges do not overlap.
///
/// The merged list is `lower` followed by `upper`. The gap cell between them belongs to
/// neither input and is never visited.
#[derive(Debug, Clone)]
pub struct NonOverlappingMerger {
    lower: CoordList,
    upper: CoordList,
    swap: bool,
}

impl NonOverlappingMerger {
    /// `swap` is set when `lower` is the second input.
    pub fn new(lower: CoordList, upper: CoordList, swap: bool) -> Self {
        Self { lower, upper, swap }
    }

    fn for_non_swapped_indexes(&self, mut consumer: impl FnMut(i32, i32, i32) -> bool) -> bool {
        let lower_size = self.lower.len() as i32;
        for i in 0..lower_size - 1 {
            if !consumer(i, -1, i) {
                return false;
            }
        }
        let upper_cells = self.upper.len() as i32 - 1;
        for i in 0..upper_cells {
            if !consumer(lower_size - 1, i, lower_size + i) {
                return false;
            }
        }
        true
    }
}

/// Analytic merger for two uniform subdivisions of `[0, 1]`.
///
/// Merged cell `i` of `lcm(a, b)` maps to `i * a / lcm` in the first input and
/// `i * b / lcm` in the second.
#[derive(Debug, Clone)]
pub struct DiscreteCubeMerger {
    result_parts: u32,
    first_div: i32,
    second_div: i32,
}

impl DiscreteCubeMerger {
    /// Merge `first_parts` and `second_parts` subdivisions.
    pub fn new(first_parts: u32, second_parts: u32) -> Self {
        let divisor = gcd(first_parts, second_parts);
        Self {
            result_parts: lcm(first_parts, second_parts) as u32,
            first_div: (first_parts / divisor) as i32,
            second_div: (second_parts / divisor) as i32,
        }
    }
}

/// General merge of two sorted lists, deduplicating boundaries within [`EPSILON`].
///
/// When only one input defines a region, whether that region matters depends on the
/// operator: `first_only_matters` / `second_only_matters` say whether cells covered only
/// by the first / second list must be kept. Leading and trailing boundaries that can
/// never change the result are skipped.
#[derive(Debug, Clone)]
pub struct IndirectMerger {
    result: Arc<[f64]>,
    first_indices: Vec<i32>,
    second_indices: Vec<i32>,
    result_len: usize,
}

impl IndirectMerger {
    /// Merge `first` and `second`.
    pub fn new(
        first: &CoordList,
        second: &CoordList,
        first_only_matters: bool,
        second_only_matters: bool,
    ) -> Self {
        let first_size = first.len();
        let second_size = second.len();
        let capacity = first_size + second_size;
        let mut result = Vec::with_capacity(capacity);
        let mut first_indices = Vec::with_capacity(capacity);
        let mut second_indices = Vec::with_capacity(capacity);
        let can_skip_first = !first_only_matters;
        let can_skip_second = !second_only_matters;

        let mut last_value = f64::NAN;
        let mut i = 0usize;
        let mut j = 0usize;
        loop {
            let first_done = i >= first_size;
            let second_done = j >= second_size;
            if first_done && second_done {
                break;
            }
            let choose_first =
                !first_done && (second_done || first.get(i) < second.get(j) + EPSILON);
            if choose_first {
                i += 1;
                if can_skip_first && (j == 0 || second_done) {
                    continue;
                }
            } else {
                j += 1;
                if can_skip_second && (i == 0 || first_done) {
                    continue;
                }
            }

            let prev_i = i as i32 - 1;
            let prev_j = j as i32 - 1;
            let value = if choose_first { first.get(i - 1) } else { second.get(j - 1) };
            // NaN on the first boundary makes the comparison false, so it is always pushed.
            if !(last_value >= value - EPSILON) {
                first_indices.push(prev_i);
                second_indices.push(prev_j);
                result.push(value);
                last_value = value;
            } else if let (Some(fi), Some(si)) = (first_indices.last_mut(), second_indices.last_mut()) {
                *fi = prev_i;
                *si = prev_j;
            }
        }

        let result_len = result.len().max(1);
        Self {
            result: result.into(),
            first_indices,
            second_indices,
            result_len,
        }
    }
}

/// Pick the cheapest merger able to line up `first` and `second`.
///
/// Order: identical lists, non-overlapping ranges, analytic cube merge (only while
/// `cost * lcm` stays within [`MAX_CUBE_MERGE_CELLS`]), then the general merge.
pub fn create_index_merger(
    cost: usize,
    first: &CoordList,
    second: &CoordList,
    first_only_matters: bool,
    second_only_matters: bool,
) -> IndexMerger {
    let first_cells = first.len() - 1;
    let second_cells = second.len() - 1;

    if first_cells == second_cells && first == second {
        trace!(cells = first_cells, "identical merger");
        return IndexMerger::Identical(IdenticalMerger::new(first.clone()));
    }

    if first.last() < second.first() - EPSILON {
        trace!("non-overlapping merger");
        return IndexMerger::NonOverlapping(NonOverlappingMerger::new(
            first.clone(),
            second.clone(),
            false,
        ));
    }
    if second.last() < first.first() - EPSILON {
        trace!("non-overlapping merger (swapped)");
        return IndexMerger::NonOverlapping(NonOverlappingMerger::new(
            second.clone(),
            first.clone(),
            true,
        ));
    }

    if let (CoordList::Cube { parts: a }, CoordList::Cube { parts: b }) = (first, second) {
        let merged = lcm(*a, *b);
        if (cost as u64).saturating_mul(merged) <= MAX_CUBE_MERGE_CELLS {
            trace!(first = a, second = b, merged, "discrete cube merger");
            return IndexMerger::DiscreteCube(DiscreteCubeMerger::new(*a, *b));
        }
    }

    trace!(first_cells, second_cells, "indirect merger");
    IndexMerger::Indirect(IndirectMerger::new(
        first,
        second,
        first_only_matters,
        second_only_matters,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(merger: &IndexMerger) -> Vec<(i32, i32, i32)> {
        let mut out = Vec::new();
        merger.for_merged_indexes(|a, b, r| {
            out.push((a, b, r));
            true
        });
        out
    }

    fn values(list: &CoordList) -> Vec<f64> {
        list.iter().collect()
    }

    #[test]
    fn identical_lists_map_onto_themselves() {
        let list = CoordList::explicit(vec![0.0, 0.3, 1.0]);
        let merger = create_index_merger(1, &list, &list.clone(), true, true);
        assert!(matches!(merger, IndexMerger::Identical(_)));
        assert_eq!(merger.size(), 3);
        assert_eq!(triples(&merger), vec![(0, 0, 0), (1, 1, 1)]);
    }

    #[test]
    fn disjoint_ranges_concatenate() {
        let low = CoordList::explicit(vec![0.0, 0.5, 1.0]);
        let high = CoordList::explicit(vec![2.0, 3.0]);
        let merger = create_index_merger(1, &low, &high, true, true);
        assert!(matches!(merger, IndexMerger::NonOverlapping(_)));
        assert_eq!(values(&merger.coords()), vec![0.0, 0.5, 1.0, 2.0, 3.0]);
        // Cell 2 is the gap [1, 2) and is skipped.
        assert_eq!(triples(&merger), vec![(0, -1, 0), (1, -1, 1), (2, 0, 3)]);

        let swapped = create_index_merger(1, &high, &low, true, true);
        assert_eq!(triples(&swapped), vec![(-1, 0, 0), (-1, 1, 1), (0, 2, 3)]);
    }

    #[test]
    fn cube_lists_merge_analytically() {
        let merger = create_index_merger(1, &CoordList::cube(2), &CoordList::cube(3), true, true);
        assert!(merger.is_discrete_cube());
        assert_eq!(merger.size(), 7);
        assert_eq!(
            triples(&merger),
            vec![(0, 0, 0), (0, 0, 1), (0, 1, 2), (1, 1, 3), (1, 2, 4), (1, 2, 5)]
        );
    }

    #[test]
    fn cube_merge_respects_cell_cap() {
        let merger = create_index_merger(64, &CoordList::cube(8), &CoordList::cube(16), true, true);
        assert!(!merger.is_discrete_cube());
        assert!(matches!(merger, IndexMerger::Indirect(_)));
        assert_eq!(merger.size(), 17);
    }

    #[test]
    fn indirect_merge_deduplicates_shared_boundaries() {
        let a = CoordList::explicit(vec![0.0, 0.5, 1.0]);
        let b = CoordList::explicit(vec![0.25, 0.5 + 1.0e-9, 0.75]);
        let merger = create_index_merger(1, &a, &b, true, true);
        assert_eq!(values(&merger.coords()), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(
            triples(&merger),
            vec![(0, -1, 0), (0, 0, 1), (1, 1, 2), (1, 2, 3)]
        );
    }

    #[test]
    fn indirect_merge_skips_irrelevant_outer_boundaries() {
        let a = CoordList::explicit(vec![0.0, 0.5, 1.0]);
        let b = CoordList::explicit(vec![0.25, 0.75]);
        // Only the overlap matters, as for AND.
        let merger = create_index_merger(1, &a, &b, false, false);
        assert_eq!(values(&merger.coords()), vec![0.25, 0.5, 0.75]);
        assert_eq!(triples(&merger), vec![(0, 0, 0), (1, 0, 1)]);
    }

    #[test]
    fn consumer_can_stop_iteration() {
        let merger = create_index_merger(1, &CoordList::cube(4), &CoordList::cube(4), true, true);
        let mut seen = 0;
        let finished = merger.for_merged_indexes(|_, _, _| {
            seen += 1;
            seen < 2
        });
        assert!(!finished);
        assert_eq!(seen, 2);
    }
}
