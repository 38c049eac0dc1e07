//! Integer-lattice occupancy grids.
//!
//! A [`DiscreteVoxelShape`] only knows which cells are filled; real-valued geometry is
//! layered on top by [`crate::VoxelShape`]. Two representations exist:
//!
//! - [`BitSetDiscreteVoxelShape`]: dense bit storage with incrementally tracked bounds.
//! - [`SubShape`]: a window into a parent grid, used to cut single-cell slices.

mod bitset;
mod sub;

pub use bitset::BitSetDiscreteVoxelShape;
pub use sub::SubShape;

use voxshape_core::{Axis, AxisCycle};

/// Occupancy grid of size `x_size * y_size * z_size`.
#[derive(Debug, Clone)]
pub enum DiscreteVoxelShape {
    /// Dense storage.
    BitSet(BitSetDiscreteVoxelShape),
    /// Window into another grid.
    Sub(SubShape),
}

impl DiscreteVoxelShape {
    /// Cell count along X.
    #[inline]
    pub fn x_size(&self) -> i32 {
        self.size(Axis::X)
    }

    /// Cell count along Y.
    #[inline]
    pub fn y_size(&self) -> i32 {
        self.size(Axis::Y)
    }

    /// Cell count along Z.
    #[inline]
    pub fn z_size(&self) -> i32 {
        self.size(Axis::Z)
    }

    /// Cell count along `axis`.
    #[inline]
    pub fn size(&self, axis: Axis) -> i32 {
        match self {
            DiscreteVoxelShape::BitSet(shape) => shape.size(axis),
            DiscreteVoxelShape::Sub(shape) => shape.size(axis),
        }
    }

    /// Whether the cell is filled.
    ///
    /// Never panics; cells outside `[0, size)` read as empty.
    #[inline]
    pub fn is_full(&self, x: i32, y: i32, z: i32) -> bool {
        match self {
            DiscreteVoxelShape::BitSet(shape) => shape.is_full(x, y, z),
            DiscreteVoxelShape::Sub(shape) => shape.is_full(x, y, z),
        }
    }

    /// Probe for cells that may lie past the shape's edge, where merge loops read one
    /// cell beyond a smaller operand. Checks the range up front.
    #[inline]
    pub fn is_full_wide(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && x < self.x_size()
            && y < self.y_size()
            && z < self.z_size()
            && self.is_full(x, y, z)
    }

    /// Probe a cell whose coordinates are expressed in a cycled frame.
    #[inline]
    pub fn is_full_wide_cycled(&self, cycle: AxisCycle, x: i32, y: i32, z: i32) -> bool {
        self.is_full_wide(
            cycle.cycle(x, y, z, Axis::X),
            cycle.cycle(x, y, z, Axis::Y),
            cycle.cycle(x, y, z, Axis::Z),
        )
    }

    /// Mark a cell as filled. The cell must lie inside the grid.
    pub fn fill(&mut self, x: i32, y: i32, z: i32) {
        match self {
            DiscreteVoxelShape::BitSet(shape) => shape.fill(x, y, z),
            DiscreteVoxelShape::Sub(shape) => shape.fill(x, y, z),
        }
    }

    /// Whether no cell is filled.
    pub fn is_empty(&self) -> bool {
        match self {
            DiscreteVoxelShape::BitSet(shape) => shape.is_empty(),
            DiscreteVoxelShape::Sub(shape) => shape.is_empty(),
        }
    }

    /// Lowest filled index along `axis` (equals the size when empty).
    #[inline]
    pub fn first_full(&self, axis: Axis) -> i32 {
        match self {
            DiscreteVoxelShape::BitSet(shape) => shape.first_full(axis),
            DiscreteVoxelShape::Sub(shape) => shape.first_full(axis),
        }
    }

    /// One past the highest filled index along `axis` (0 when empty).
    #[inline]
    pub fn last_full(&self, axis: Axis) -> i32 {
        match self {
            DiscreteVoxelShape::BitSet(shape) => shape.last_full(axis),
            DiscreteVoxelShape::Sub(shape) => shape.last_full(axis),
        }
    }

    /// Decompose the filled cells into disjoint boxes `(x0, y0, z0, x1, y1, z1)` with
    /// exclusive upper corners.
    ///
    /// Without `combine` every filled cell is reported on its own. With `combine`, runs
    /// along Z are grown greedily along X and then Y so the box count stays small.
    pub fn for_all_boxes(
        &self,
        mut consumer: impl FnMut(i32, i32, i32, i32, i32, i32),
        combine: bool,
    ) {
        let mut scratch = BitSetDiscreteVoxelShape::from_shape(self);
        let (x_size, y_size, z_size) = (self.x_size(), self.y_size(), self.z_size());
        for y in 0..y_size {
            for x in 0..x_size {
                let mut strip_start = None;
                for z in 0..=z_size {
                    if scratch.is_full(x, y, z) {
                        if !combine {
                            consumer(x, y, z, x + 1, y + 1, z + 1);
                        } else if strip_start.is_none() {
                            strip_start = Some(z);
                        }
                    } else if let Some(start_z) = strip_start.take() {
                        let mut end_x = x;
                        let mut end_y = y;
                        scratch.clear_z_strip(start_z, z, x, y);
                        while scratch.is_z_strip_full(start_z, z, end_x + 1, y) {
                            scratch.clear_z_strip(start_z, z, end_x + 1, y);
                            end_x += 1;
                        }
                        while scratch.is_xz_rectangle_full(x, end_x + 1, start_z, z, end_y + 1) {
                            for cx in x..=end_x {
                                scratch.clear_z_strip(start_z, z, cx, end_y + 1);
                            }
                            end_y += 1;
                        }
                        consumer(x, y, start_z, end_x + 1, end_y + 1, z);
                    }
                }
            }
        }
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        match self {
            DiscreteVoxelShape::BitSet(shape) => shape.filled_count(),
            DiscreteVoxelShape::Sub(_) => {
                let mut count = 0;
                self.for_all_boxes(|_, _, _, _, _, _| count += 1, false);
                count
            }
        }
    }
}

impl From<BitSetDiscreteVoxelShape> for DiscreteVoxelShape {
    fn from(shape: BitSetDiscreteVoxelShape) -> Self {
        DiscreteVoxelShape::BitSet(shape)
    }
}

impl From<SubShape> for DiscreteVoxelShape {
    fn from(shape: SubShape) -> Self {
        DiscreteVoxelShape::Sub(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_boxes(shape: &DiscreteVoxelShape, combine: bool) -> Vec<[i32; 6]> {
        let mut boxes = Vec::new();
        shape.for_all_boxes(
            |x0, y0, z0, x1, y1, z1| boxes.push([x0, y0, z0, x1, y1, z1]),
            combine,
        );
        boxes
    }

    fn cells_of(boxes: &[[i32; 6]]) -> Vec<[i32; 3]> {
        let mut cells = Vec::new();
        for b in boxes {
            for x in b[0]..b[3] {
                for y in b[1]..b[4] {
                    for z in b[2]..b[5] {
                        cells.push([x, y, z]);
                    }
                }
            }
        }
        cells.sort();
        cells
    }

    #[test]
    fn solid_block_merges_into_one_box() {
        let shape: DiscreteVoxelShape =
            BitSetDiscreteVoxelShape::with_filled_bounds(4, 4, 4, 0, 0, 0, 4, 4, 4).into();
        assert_eq!(collect_boxes(&shape, true), vec![[0, 0, 0, 4, 4, 4]]);
        assert_eq!(collect_boxes(&shape, false).len(), 64);
    }

    #[test]
    fn merged_boxes_cover_exactly_the_filled_cells() {
        let mut grid = BitSetDiscreteVoxelShape::new(3, 3, 3);
        // An L in the y=0 layer plus a lone cell on top.
        for (x, y, z) in [(0, 0, 0), (1, 0, 0), (2, 0, 0), (0, 0, 1), (0, 0, 2), (2, 2, 2)] {
            grid.fill(x, y, z);
        }
        let shape = DiscreteVoxelShape::from(grid);
        let merged = collect_boxes(&shape, true);
        let single = collect_boxes(&shape, false);
        assert!(merged.len() < single.len());
        assert_eq!(cells_of(&merged), cells_of(&single));
        assert_eq!(single.len(), shape.filled_count());
    }

    #[test]
    fn wide_probe_ignores_out_of_range_cells() {
        let shape: DiscreteVoxelShape =
            BitSetDiscreteVoxelShape::with_filled_bounds(2, 2, 2, 0, 0, 0, 2, 2, 2).into();
        assert!(shape.is_full_wide(1, 1, 1));
        assert!(!shape.is_full_wide(-1, 0, 0));
        assert!(!shape.is_full_wide(0, 2, 0));
        assert!(!shape.is_full_wide(0, 0, i32::MAX));
    }

    #[test]
    fn cycled_probe_rotates_coordinates() {
        let mut grid = BitSetDiscreteVoxelShape::new(1, 2, 3);
        grid.fill(0, 1, 2);
        let shape = DiscreteVoxelShape::from(grid);
        // Forward maps local (x, y, z) to real (z, x, y).
        assert!(shape.is_full_wide_cycled(AxisCycle::Forward, 1, 2, 0));
        assert!(!shape.is_full_wide_cycled(AxisCycle::Forward, 0, 1, 2));
    }
}
