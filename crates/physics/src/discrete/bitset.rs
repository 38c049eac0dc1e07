use bitvec::prelude::*;
use voxshape_core::Axis;

use super::DiscreteVoxelShape;
use crate::merger::IndexMerger;
use crate::op::BooleanOp;

/// Dense occupancy grid backed by a bit vector.
///
/// Cell `(x, y, z)` lives at bit `(x * y_size + y) * z_size + z`. The filled bounds are
/// kept up to date on every [`fill`](Self::fill); `max` values are exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSetDiscreteVoxelShape {
    x_size: i32,
    y_size: i32,
    z_size: i32,
    storage: BitVec,
    x_min: i32,
    y_min: i32,
    z_min: i32,
    x_max: i32,
    y_max: i32,
    z_max: i32,
}

impl BitSetDiscreteVoxelShape {
    /// Allocate an empty grid.
    pub fn new(x_size: i32, y_size: i32, z_size: i32) -> Self {
        debug_assert!(x_size >= 0 && y_size >= 0 && z_size >= 0);
        let volume = (x_size.max(0) * y_size.max(0) * z_size.max(0)) as usize;
        Self {
            x_size,
            y_size,
            z_size,
            storage: bitvec![0; volume],
            x_min: x_size,
            y_min: y_size,
            z_min: z_size,
            x_max: 0,
            y_max: 0,
            z_max: 0,
        }
    }

    /// Allocate a grid with the box `[min, max)` already filled.
    #[allow(clippy::too_many_arguments)]
    pub fn with_filled_bounds(
        x_size: i32,
        y_size: i32,
        z_size: i32,
        min_x: i32,
        min_y: i32,
        min_z: i32,
        max_x: i32,
        max_y: i32,
        max_z: i32,
    ) -> Self {
        let mut shape = Self::new(x_size, y_size, z_size);
        for x in min_x..max_x {
            for y in min_y..max_y {
                let start = shape.index(x, y, min_z);
                let end = shape.index(x, y, max_z);
                shape.storage[start..end].fill(true);
            }
        }
        if min_x < max_x && min_y < max_y && min_z < max_z {
            shape.x_min = min_x;
            shape.y_min = min_y;
            shape.z_min = min_z;
            shape.x_max = max_x;
            shape.y_max = max_y;
            shape.z_max = max_z;
        }
        shape
    }

    /// Dense copy of any discrete shape, bounds included.
    pub fn from_shape(shape: &DiscreteVoxelShape) -> Self {
        match shape {
            DiscreteVoxelShape::BitSet(dense) => dense.clone(),
            DiscreteVoxelShape::Sub(_) => {
                let mut copy = Self::new(shape.x_size(), shape.y_size(), shape.z_size());
                for x in 0..copy.x_size {
                    for y in 0..copy.y_size {
                        for z in 0..copy.z_size {
                            if shape.is_full(x, y, z) {
                                let index = copy.index(x, y, z);
                                copy.storage.set(index, true);
                            }
                        }
                    }
                }
                copy.x_min = shape.first_full(Axis::X);
                copy.y_min = shape.first_full(Axis::Y);
                copy.z_min = shape.first_full(Axis::Z);
                copy.x_max = shape.last_full(Axis::X);
                copy.y_max = shape.last_full(Axis::Y);
                copy.z_max = shape.last_full(Axis::Z);
                copy
            }
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        ((x * self.y_size + y) * self.z_size + z) as usize
    }

    #[inline]
    fn in_range(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0 && y >= 0 && z >= 0 && x < self.x_size && y < self.y_size && z < self.z_size
    }

    /// Cell count along `axis`.
    #[inline]
    pub fn size(&self, axis: Axis) -> i32 {
        axis.choose(self.x_size, self.y_size, self.z_size)
    }

    /// Whether the cell is filled; cells outside the grid read as empty.
    #[inline]
    pub fn is_full(&self, x: i32, y: i32, z: i32) -> bool {
        self.in_range(x, y, z) && self.storage[self.index(x, y, z)]
    }

    /// Fill a cell and widen the bounds to include it.
    pub fn fill(&mut self, x: i32, y: i32, z: i32) {
        debug_assert!(
            self.in_range(x, y, z),
            "fill ({x}, {y}, {z}) outside {}x{}x{} grid",
            self.x_size,
            self.y_size,
            self.z_size
        );
        let index = self.index(x, y, z);
        self.storage.set(index, true);
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.z_min = self.z_min.min(z);
        self.x_max = self.x_max.max(x + 1);
        self.y_max = self.y_max.max(y + 1);
        self.z_max = self.z_max.max(z + 1);
    }

    /// Whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.storage.not_any()
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.storage.count_ones()
    }

    /// Lowest filled index along `axis`.
    #[inline]
    pub fn first_full(&self, axis: Axis) -> i32 {
        axis.choose(self.x_min, self.y_min, self.z_min)
    }

    /// One past the highest filled index along `axis`.
    #[inline]
    pub fn last_full(&self, axis: Axis) -> i32 {
        axis.choose(self.x_max, self.y_max, self.z_max)
    }

    pub(super) fn is_z_strip_full(&self, start_z: i32, end_z: i32, x: i32, y: i32) -> bool {
        x < self.x_size
            && y < self.y_size
            && self.storage[self.index(x, y, start_z)..self.index(x, y, end_z)].all()
    }

    pub(super) fn is_xz_rectangle_full(
        &self,
        start_x: i32,
        end_x: i32,
        start_z: i32,
        end_z: i32,
        y: i32,
    ) -> bool {
        (start_x..end_x).all(|x| self.is_z_strip_full(start_z, end_z, x, y))
    }

    pub(super) fn clear_z_strip(&mut self, start_z: i32, end_z: i32, x: i32, y: i32) {
        let start = self.index(x, y, start_z);
        let end = self.index(x, y, end_z);
        self.storage[start..end].fill(false);
    }

    /// Evaluate `op` over the merged lattice of `first` and `second`.
    ///
    /// The result has one cell per merged interval on each axis. Bounds are accumulated
    /// per loop level: a Y index only widens the bounds if some Z cell under it was set.
    pub fn join(
        first: &DiscreteVoxelShape,
        second: &DiscreteVoxelShape,
        x_merger: &IndexMerger,
        y_merger: &IndexMerger,
        z_merger: &IndexMerger,
        op: BooleanOp,
    ) -> Self {
        let mut result = Self::new(
            x_merger.size() as i32 - 1,
            y_merger.size() as i32 - 1,
            z_merger.size() as i32 - 1,
        );
        let mut min = [i32::MAX; 3];
        let mut max = [i32::MIN; 3];

        x_merger.for_merged_indexes(|x1, x2, xr| {
            let mut any_in_x = false;
            y_merger.for_merged_indexes(|y1, y2, yr| {
                let mut any_in_y = false;
                z_merger.for_merged_indexes(|z1, z2, zr| {
                    if op.apply(first.is_full_wide(x1, y1, z1), second.is_full_wide(x2, y2, z2)) {
                        let index = result.index(xr, yr, zr);
                        result.storage.set(index, true);
                        min[2] = min[2].min(zr);
                        max[2] = max[2].max(zr);
                        any_in_y = true;
                    }
                    true
                });
                if any_in_y {
                    min[1] = min[1].min(yr);
                    max[1] = max[1].max(yr);
                    any_in_x = true;
                }
                true
            });
            if any_in_x {
                min[0] = min[0].min(xr);
                max[0] = max[0].max(xr);
            }
            true
        });

        if min[0] != i32::MAX {
            result.x_min = min[0];
            result.y_min = min[1];
            result.z_min = min[2];
            result.x_max = max[0] + 1;
            result.y_max = max[1] + 1;
            result.z_max = max[2] + 1;
        }
        result
    }
}
