//! Per-axis coordinate lists mapping lattice boundaries to real positions.

use std::fmt;
use std::sync::Arc;

/// Sorted list of cell boundaries along one axis.
///
/// A list with `n + 1` entries describes `n` cells; cell `i` spans `[get(i), get(i + 1))`.
#[derive(Clone)]
pub enum CoordList {
    /// `parts + 1` evenly spaced points covering `[0, 1]`.
    Cube {
        /// Number of equal subdivisions.
        parts: u32,
    },
    /// Arbitrary strictly increasing boundaries.
    Explicit(Arc<[f64]>),
}

impl CoordList {
    /// Uniform subdivision of the unit interval.
    pub const fn cube(parts: u32) -> Self {
        CoordList::Cube { parts }
    }

    /// Wrap explicit boundaries.
    pub fn explicit(values: impl Into<Arc<[f64]>>) -> Self {
        let values = values.into();
        debug_assert!(
            values.windows(2).all(|pair| pair[0] <= pair[1]),
            "coordinate list must be sorted: {values:?}"
        );
        CoordList::Explicit(values)
    }

    /// Number of boundaries.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            CoordList::Cube { parts } => *parts as usize + 1,
            CoordList::Explicit(values) => values.len(),
        }
    }

    /// Whether the list holds no boundaries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boundary at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        match self {
            CoordList::Cube { parts } => index as f64 / f64::from(*parts),
            CoordList::Explicit(values) => values[index],
        }
    }

    /// First boundary.
    pub fn first(&self) -> f64 {
        self.get(0)
    }

    /// Last boundary.
    pub fn last(&self) -> f64 {
        self.get(self.len() - 1)
    }

    /// Whether this is an analytic unit-cube subdivision.
    pub fn is_cube(&self) -> bool {
        matches!(self, CoordList::Cube { .. })
    }

    /// Iterate the boundaries in order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Copy every boundary shifted by `offset`.
    pub fn offset(&self, offset: f64) -> Self {
        CoordList::Explicit(self.iter().map(|value| value + offset).collect())
    }
}

impl PartialEq for CoordList {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CoordList::Cube { parts: a }, CoordList::Cube { parts: b }) => a == b,
            (CoordList::Explicit(a), CoordList::Explicit(b)) if Arc::ptr_eq(a, b) => true,
            _ => self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b),
        }
    }
}

impl fmt::Debug for CoordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_lists_are_uniform() {
        let list = CoordList::cube(4);
        assert_eq!(list.len(), 5);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(list.last(), 1.0);
    }

    #[test]
    fn equality_is_element_wise() {
        assert_eq!(CoordList::cube(2), CoordList::explicit(vec![0.0, 0.5, 1.0]));
        assert_ne!(CoordList::cube(2), CoordList::cube(4));
        assert_ne!(CoordList::explicit(vec![0.0, 1.0]), CoordList::explicit(vec![0.0, 0.5]));
    }

    #[test]
    fn offset_shifts_every_boundary() {
        let moved = CoordList::cube(2).offset(1.5);
        assert_eq!(moved.iter().collect::<Vec<_>>(), vec![1.5, 2.0, 2.5]);
        assert!(!moved.is_cube());
    }
}
