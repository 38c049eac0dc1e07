use std::sync::Arc;

use voxshape_core::Axis;

use super::DiscreteVoxelShape;

/// Window `[start, end)` into a parent grid, addressed in local coordinates.
///
/// The parent is shared, not copied. Writes go to the parent held by this window; if that
/// parent is shared with other handles it is cloned first so they are unaffected.
#[derive(Debug, Clone)]
pub struct SubShape {
    parent: Arc<DiscreteVoxelShape>,
    start: [i32; 3],
    end: [i32; 3],
}

impl SubShape {
    pub(crate) fn new(parent: Arc<DiscreteVoxelShape>, start: [i32; 3], end: [i32; 3]) -> Self {
        debug_assert!(start.iter().zip(end.iter()).all(|(s, e)| s <= e));
        Self { parent, start, end }
    }

    /// Single-cell-thick slice at `index` along `axis`.
    pub(crate) fn slice(parent: Arc<DiscreteVoxelShape>, axis: Axis, index: i32) -> Self {
        let (x_size, y_size, z_size) = (parent.x_size(), parent.y_size(), parent.z_size());
        let start = [
            axis.choose(index, 0, 0),
            axis.choose(0, index, 0),
            axis.choose(0, 0, index),
        ];
        let end = [
            axis.choose(index + 1, x_size, x_size),
            axis.choose(y_size, index + 1, y_size),
            axis.choose(z_size, z_size, index + 1),
        ];
        Self::new(parent, start, end)
    }

    /// Grid this window looks into.
    pub fn parent(&self) -> &DiscreteVoxelShape {
        &self.parent
    }

    /// Cell count along `axis`.
    #[inline]
    pub fn size(&self, axis: Axis) -> i32 {
        let i = axis.ordinal();
        self.end[i] - self.start[i]
    }

    /// Whether the parent cell under local `(x, y, z)` is filled.
    ///
    /// Coordinates outside the window read as empty, even where the parent is filled.
    #[inline]
    pub fn is_full(&self, x: i32, y: i32, z: i32) -> bool {
        let inside = [x, y, z]
            .into_iter()
            .zip(Axis::VALUES)
            .all(|(coord, axis)| (0..self.size(axis)).contains(&coord));
        inside
            && self
                .parent
                .is_full(self.start[0] + x, self.start[1] + y, self.start[2] + z)
    }

    /// Fill the parent cell under local `(x, y, z)`.
    ///
    /// Copy-on-write: when the parent is shared (always the case for a slice of a
    /// `VoxelShape`), this window gets its own copy first, and the original shape never
    /// sees the write.
    pub fn fill(&mut self, x: i32, y: i32, z: i32) {
        let [sx, sy, sz] = self.start;
        Arc::make_mut(&mut self.parent).fill(sx + x, sy + y, sz + z);
    }

    /// Whether no cell inside the window is filled.
    pub fn is_empty(&self) -> bool {
        if Axis::VALUES
            .iter()
            .any(|&axis| self.first_full(axis) >= self.last_full(axis))
        {
            return true;
        }
        // The clamped parent bounds can overlap the window even when no filled cell does.
        for x in 0..self.size(Axis::X) {
            for y in 0..self.size(Axis::Y) {
                for z in 0..self.size(Axis::Z) {
                    if self.is_full(x, y, z) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Parent's first filled index, clamped into the window.
    pub fn first_full(&self, axis: Axis) -> i32 {
        self.clamp_to_window(axis, self.parent.first_full(axis))
    }

    /// Parent's last filled bound, clamped into the window.
    pub fn last_full(&self, axis: Axis) -> i32 {
        self.clamp_to_window(axis, self.parent.last_full(axis))
    }

    fn clamp_to_window(&self, axis: Axis, value: i32) -> i32 {
        let i = axis.ordinal();
        value.clamp(self.start[i], self.end[i]) - self.start[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrete::BitSetDiscreteVoxelShape;

    fn parent_with(cells: &[(i32, i32, i32)]) -> Arc<DiscreteVoxelShape> {
        let mut grid = BitSetDiscreteVoxelShape::new(3, 3, 3);
        for &(x, y, z) in cells {
            grid.fill(x, y, z);
        }
        Arc::new(grid.into())
    }

    #[test]
    fn slice_reads_translate_into_parent() {
        let parent = parent_with(&[(2, 1, 0)]);
        let slice = SubShape::slice(parent, Axis::X, 2);
        assert_eq!(slice.size(Axis::X), 1);
        assert_eq!(slice.size(Axis::Y), 3);
        assert!(slice.is_full(0, 1, 0));
        assert!(!slice.is_full(0, 0, 0));
        assert_eq!(slice.first_full(Axis::Y), 1);
        assert_eq!(slice.last_full(Axis::Y), 2);
    }

    #[test]
    fn reads_outside_window_are_empty() {
        let full: Arc<DiscreteVoxelShape> =
            Arc::new(BitSetDiscreteVoxelShape::with_filled_bounds(2, 2, 2, 0, 0, 0, 2, 2, 2).into());
        let slice = DiscreteVoxelShape::Sub(SubShape::slice(full, Axis::X, 0));
        assert_eq!(slice.x_size(), 1);
        assert!(slice.is_full(0, 0, 0));
        assert!(!slice.is_full(1, 0, 0));
        assert!(!slice.is_full(0, 2, 0));
        assert!(!slice.is_full(-1, 0, 0));
    }

    #[test]
    fn writes_through_slice_leave_shared_parent_untouched() {
        let parent = parent_with(&[]);
        let mut window = SubShape::slice(Arc::clone(&parent), Axis::X, 0);
        window.fill(0, 0, 0);
        assert!(window.is_full(0, 0, 0));
        assert!(!parent.is_full(0, 0, 0));
    }

    #[test]
    fn bounds_clamp_into_window() {
        let parent = parent_with(&[(0, 0, 0), (2, 2, 2)]);
        let slice = SubShape::slice(parent, Axis::Z, 1);
        assert_eq!(slice.first_full(Axis::Z), 0);
        assert_eq!(slice.last_full(Axis::Z), 1);
        // Parent bounds straddle z = 1 but nothing is filled there.
        assert!(slice.is_empty());
    }

    #[test]
    fn writes_land_in_parent_storage() {
        let parent = parent_with(&[]);
        let mut window = SubShape::new(parent, [1, 1, 1], [3, 3, 3]);
        window.fill(0, 1, 0);
        assert!(window.is_full(0, 1, 0));
        assert!(window.parent().is_full(1, 2, 1));
        assert!(!window.is_empty());
        assert_eq!(window.first_full(Axis::Y), 1);
    }

    #[test]
    fn slice_of_empty_grid_is_empty() {
        let parent: Arc<DiscreteVoxelShape> = Arc::new(BitSetDiscreteVoxelShape::new(0, 0, 0).into());
        let slice = SubShape::slice(parent, Axis::Y, -1);
        assert!(slice.is_empty());
    }
}
