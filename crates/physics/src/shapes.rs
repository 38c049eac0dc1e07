//! Entry points for building, combining and querying shapes.
//!
//! Shapes are unit-block sized by convention: `[0, 1]` on every axis is one block. Boxes
//! whose corners land on a power-of-two grid inside that cube are stored analytically,
//! everything else keeps explicit boundaries.

use std::sync::{Arc, OnceLock};

use tracing::debug;
use voxshape_core::math::fuzzy_equals;
use voxshape_core::{Axis, AxisDirection, Direction, EPSILON};

use crate::aabb::Aabb;
use crate::coords::CoordList;
use crate::discrete::{BitSetDiscreteVoxelShape, DiscreteVoxelShape};
use crate::error::ShapeError;
use crate::merger::{create_index_merger, IndexMerger};
use crate::op::BooleanOp;
use crate::shape::{ShapeKind, VoxelShape};

/// Finest subdivision tried when snapping a box to a cube grid (`2^3 = 8` parts).
pub const MAX_CUBE_BITS: u32 = 3;

/// Shape with no volume.
pub fn empty() -> VoxelShape {
    static EMPTY: OnceLock<VoxelShape> = OnceLock::new();
    EMPTY
        .get_or_init(|| {
            VoxelShape::array(
                DiscreteVoxelShape::from(BitSetDiscreteVoxelShape::new(0, 0, 0)),
                CoordList::explicit(vec![0.0]),
                CoordList::explicit(vec![0.0]),
                CoordList::explicit(vec![0.0]),
            )
        })
        .clone()
}

/// Full unit block.
pub fn block() -> VoxelShape {
    static BLOCK: OnceLock<VoxelShape> = OnceLock::new();
    BLOCK
        .get_or_init(|| {
            VoxelShape::cube(DiscreteVoxelShape::from(
                BitSetDiscreteVoxelShape::with_filled_bounds(1, 1, 1, 0, 0, 0, 1, 1, 1),
            ))
        })
        .clone()
}

/// Box covering all of space.
pub fn infinity() -> VoxelShape {
    static INFINITY: OnceLock<VoxelShape> = OnceLock::new();
    INFINITY
        .get_or_init(|| {
            create(
                f64::NEG_INFINITY,
                f64::NEG_INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::INFINITY,
                f64::INFINITY,
            )
        })
        .clone()
}

/// Validated box constructor. Bounds must be ordered on every axis; NaN is rejected.
pub fn box_shape(
    min_x: f64,
    min_y: f64,
    min_z: f64,
    max_x: f64,
    max_y: f64,
    max_z: f64,
) -> Result<VoxelShape, ShapeError> {
    for (axis, min, max) in [
        (Axis::X, min_x, max_x),
        (Axis::Y, min_y, max_y),
        (Axis::Z, min_z, max_z),
    ] {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ShapeError::InvalidBounds { axis, min, max });
        }
    }
    Ok(create(min_x, min_y, min_z, max_x, max_y, max_z))
}

/// Shape for the box `min..max`, picking the cheapest representation.
///
/// Degenerate boxes become [`empty`], the unit box is [`block`], grid-aligned boxes inside
/// the unit cube become cube shapes and anything else keeps explicit boundaries.
pub fn create(
    min_x: f64,
    min_y: f64,
    min_z: f64,
    max_x: f64,
    max_y: f64,
    max_z: f64,
) -> VoxelShape {
    if max_x - min_x < EPSILON || max_y - min_y < EPSILON || max_z - min_z < EPSILON {
        return empty();
    }
    match (
        find_bits(min_x, max_x),
        find_bits(min_y, max_y),
        find_bits(min_z, max_z),
    ) {
        (Some(0), Some(0), Some(0)) => block(),
        (Some(x_bits), Some(y_bits), Some(z_bits)) => {
            let (x_size, y_size, z_size) = (1 << x_bits, 1 << y_bits, 1 << z_bits);
            let snap = |value: f64, size: i32| (value * f64::from(size)).round() as i32;
            VoxelShape::cube(DiscreteVoxelShape::from(
                BitSetDiscreteVoxelShape::with_filled_bounds(
                    x_size,
                    y_size,
                    z_size,
                    snap(min_x, x_size),
                    snap(min_y, y_size),
                    snap(min_z, z_size),
                    snap(max_x, x_size),
                    snap(max_y, y_size),
                    snap(max_z, z_size),
                ),
            ))
        }
        _ => VoxelShape::array(
            Arc::clone(block().discrete_arc()),
            CoordList::explicit(vec![min_x, max_x]),
            CoordList::explicit(vec![min_y, max_y]),
            CoordList::explicit(vec![min_z, max_z]),
        ),
    }
}

/// Shape for an existing box.
pub fn create_from_aabb(aabb: &Aabb) -> VoxelShape {
    create(
        aabb.min.x, aabb.min.y, aabb.min.z, aabb.max.x, aabb.max.y, aabb.max.z,
    )
}

/// Smallest `bits` such that both `min` and `max` sit on the `2^bits` grid of `[0, 1]`.
///
/// `None` if the interval leaves the unit range or needs a grid finer than
/// [`MAX_CUBE_BITS`].
pub fn find_bits(min: f64, max: f64) -> Option<u32> {
    if min < -EPSILON || max > 1.0 + EPSILON {
        return None;
    }
    (0..=MAX_CUBE_BITS).find(|&bits| {
        let parts = f64::from(1u32 << bits);
        let lo = min * parts;
        let hi = max * parts;
        (lo - lo.round()).abs() < EPSILON * parts && (hi - hi.round()).abs() < EPSILON * parts
    })
}

/// Union of two shapes.
pub fn or(first: &VoxelShape, second: &VoxelShape) -> VoxelShape {
    join_unchecked(first, second, BooleanOp::OR).optimize()
}

/// Union of `first` and every shape in `others`.
pub fn or_all<'a>(
    first: &VoxelShape,
    others: impl IntoIterator<Item = &'a VoxelShape>,
) -> VoxelShape {
    others
        .into_iter()
        .fold(first.clone(), |acc, shape| {
            join_unchecked(&acc, shape, BooleanOp::OR)
        })
        .optimize()
}

/// Combine two shapes cell by cell and simplify the result.
pub fn join(
    first: &VoxelShape,
    second: &VoxelShape,
    op: BooleanOp,
) -> Result<VoxelShape, ShapeError> {
    let joined = join_unoptimized(first, second, op)?;
    let optimized = joined.optimize();
    debug!(%op, empty = optimized.is_empty(), "joined shapes");
    Ok(optimized)
}

/// Combine two shapes cell by cell, keeping the merged lattice as is.
pub fn join_unoptimized(
    first: &VoxelShape,
    second: &VoxelShape,
    op: BooleanOp,
) -> Result<VoxelShape, ShapeError> {
    if !op.is_valid_join() {
        return Err(ShapeError::InvalidOperator(op));
    }
    Ok(join_unchecked(first, second, op))
}

/// [`join_unoptimized`] for operators already known to be valid.
pub(crate) fn join_unchecked(first: &VoxelShape, second: &VoxelShape, op: BooleanOp) -> VoxelShape {
    if first.ptr_eq(second) {
        return if op.apply(true, true) {
            first.clone()
        } else {
            empty()
        };
    }
    let first_only = op.only_first();
    let second_only = op.only_second();
    if first.is_empty() {
        return if second_only { second.clone() } else { empty() };
    }
    if second.is_empty() {
        return if first_only { first.clone() } else { empty() };
    }

    let [x_merger, y_merger, z_merger] = axis_mergers(first, second, first_only, second_only);
    let shape = BitSetDiscreteVoxelShape::join(
        first.discrete(),
        second.discrete(),
        &x_merger,
        &y_merger,
        &z_merger,
        op,
    );
    let shape = DiscreteVoxelShape::from(shape);
    if x_merger.is_discrete_cube() && y_merger.is_discrete_cube() && z_merger.is_discrete_cube()
    {
        VoxelShape::cube(shape)
    } else {
        VoxelShape::array(
            shape,
            x_merger.coords(),
            y_merger.coords(),
            z_merger.coords(),
        )
    }
}

fn axis_mergers(
    first: &VoxelShape,
    second: &VoxelShape,
    first_only: bool,
    second_only: bool,
) -> [IndexMerger; 3] {
    let merge = |cost: usize, axis: Axis| {
        create_index_merger(
            cost,
            &first.coords(axis),
            &second.coords(axis),
            first_only,
            second_only,
        )
    };
    let x = merge(1, Axis::X);
    let y = merge(x.size() - 1, Axis::Y);
    let z = merge((x.size() - 1) * (y.size() - 1), Axis::Z);
    [x, y, z]
}

/// Whether `join(first, second, op)` would be non-empty, without building it.
pub fn join_is_not_empty(
    first: &VoxelShape,
    second: &VoxelShape,
    op: BooleanOp,
) -> Result<bool, ShapeError> {
    if !op.is_valid_join() {
        return Err(ShapeError::InvalidOperator(op));
    }
    Ok(exists_unchecked(first, second, op))
}

fn exists_unchecked(first: &VoxelShape, second: &VoxelShape, op: BooleanOp) -> bool {
    let first_empty = first.is_empty();
    let second_empty = second.is_empty();
    if first_empty || second_empty {
        return op.apply(!first_empty, !second_empty);
    }
    if first.ptr_eq(second) {
        return op.apply(true, true);
    }

    let first_only = op.only_first();
    let second_only = op.only_second();
    for axis in Axis::VALUES {
        if first.max(axis) < second.min(axis) - EPSILON
            || second.max(axis) < first.min(axis) - EPSILON
        {
            return first_only || second_only;
        }
    }

    let [x_merger, y_merger, z_merger] = axis_mergers(first, second, first_only, second_only);
    let (a, b) = (first.discrete(), second.discrete());
    // The consumers return `false` (stop) on the first cell where `op` holds.
    !x_merger.for_merged_indexes(|x1, x2, _| {
        y_merger.for_merged_indexes(|y1, y2, _| {
            z_merger.for_merged_indexes(|z1, z2, _| {
                !op.apply(a.is_full_wide(x1, y1, z1), b.is_full_wide(x2, y2, z2))
            })
        })
    })
}

/// Sweep `moving` along `axis` through `shapes`, returning the distance it can travel.
///
/// Each shape can only shorten the result, which is `0` as soon as it gets within
/// [`EPSILON`] of zero.
pub fn collide<'a>(
    axis: Axis,
    moving: &Aabb,
    shapes: impl IntoIterator<Item = &'a VoxelShape>,
    mut distance: f64,
) -> f64 {
    for shape in shapes {
        if distance.abs() < EPSILON {
            return 0.0;
        }
        distance = shape.collide(axis, moving, distance);
    }
    distance
}

/// Whether the face of `shape` towards `direction` is completely covered by `neighbor`.
///
/// Both shapes must actually touch the shared face: a shape that stops short of it
/// never counts as covered or covering.
pub fn block_occludes(shape: &VoxelShape, neighbor: &VoxelShape, direction: Direction) -> bool {
    let full = block();
    if shape.ptr_eq(&full) && neighbor.ptr_eq(&full) {
        return true;
    }
    if neighbor.is_empty() {
        return false;
    }
    let axis = direction.axis();
    let (first, second, op) = match direction.axis_direction() {
        AxisDirection::Positive => (shape, neighbor, BooleanOp::ONLY_FIRST),
        AxisDirection::Negative => (neighbor, shape, BooleanOp::ONLY_SECOND),
    };
    fuzzy_equals(first.max(axis), 1.0, EPSILON)
        && fuzzy_equals(second.min(axis), 0.0, EPSILON)
        && !exists_unchecked(
            &last_slice(first, axis),
            &VoxelShape::slice(second, axis, 0),
            op,
        )
}

/// Cross-section of `shape` on the face pointing at `direction`.
///
/// [`empty`] if the shape does not reach that face.
pub fn face_shape(shape: &VoxelShape, direction: Direction) -> VoxelShape {
    if shape.ptr_eq(&block()) {
        return block();
    }
    let axis = direction.axis();
    match direction.axis_direction() {
        AxisDirection::Positive if fuzzy_equals(shape.max(axis), 1.0, EPSILON) => {
            last_slice(shape, axis)
        }
        AxisDirection::Negative if fuzzy_equals(shape.min(axis), 0.0, EPSILON) => {
            VoxelShape::slice(shape, axis, 0)
        }
        _ => empty(),
    }
}

/// Whether `shape` and `neighbor` together cover the whole face between them.
pub fn merged_face_occludes(
    shape: &VoxelShape,
    neighbor: &VoxelShape,
    direction: Direction,
) -> bool {
    let full = block();
    if shape.ptr_eq(&full) || neighbor.ptr_eq(&full) {
        return true;
    }
    if shape.is_empty() && neighbor.is_empty() {
        return false;
    }
    let axis = direction.axis();
    let (mut first, mut second) = match direction.axis_direction() {
        AxisDirection::Positive => (shape.clone(), neighbor.clone()),
        AxisDirection::Negative => (neighbor.clone(), shape.clone()),
    };
    if !fuzzy_equals(first.max(axis), 1.0, EPSILON) {
        first = empty();
    }
    if !fuzzy_equals(second.min(axis), 0.0, EPSILON) {
        second = empty();
    }
    let merged = join_unchecked(
        &last_slice(&first, axis),
        &VoxelShape::slice(&second, axis, 0),
        BooleanOp::OR,
    );
    !exists_unchecked(&full, &merged, BooleanOp::ONLY_FIRST)
}

/// Whether two face shapes together cover the whole unit face.
pub fn face_shape_occludes(first: &VoxelShape, second: &VoxelShape) -> bool {
    let full = block();
    if first.ptr_eq(&full) || second.ptr_eq(&full) {
        return true;
    }
    if first.is_empty() && second.is_empty() {
        return false;
    }
    let merged = join_unchecked(first, second, BooleanOp::OR);
    !exists_unchecked(&full, &merged, BooleanOp::ONLY_FIRST)
}

fn last_slice(shape: &VoxelShape, axis: Axis) -> VoxelShape {
    VoxelShape::slice(shape, axis, shape.discrete().size(axis) - 1)
}

/// Short name of the representation, for logs and probe output.
pub fn kind_name(shape: &VoxelShape) -> &'static str {
    match shape.kind() {
        ShapeKind::Cube(_) => "cube",
        ShapeKind::Array(_) => "array",
        ShapeKind::Slice(_) => "slice",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn cuboid(min: [f64; 3], max: [f64; 3]) -> VoxelShape {
        box_shape(min[0], min[1], min[2], max[0], max[1], max[2]).expect("valid box")
    }

    #[test]
    fn create_picks_representation() {
        assert!(create(0.0, 0.0, 0.0, 1.0, 1.0, 1.0).ptr_eq(&block()));
        assert!(create(0.0, 0.0, 0.0, 1.0, 0.0, 1.0).ptr_eq(&empty()));
        assert_eq!(kind_name(&create(0.25, 0.0, 0.0, 0.75, 1.0, 1.0)), "cube");
        assert_eq!(kind_name(&create(0.3, 0.0, 0.0, 0.7, 1.0, 1.0)), "array");
        assert_eq!(kind_name(&create(0.0, 0.0, 0.0, 2.0, 1.0, 1.0)), "array");
    }

    #[test]
    fn find_bits_picks_coarsest_grid() {
        assert_eq!(find_bits(0.0, 1.0), Some(0));
        assert_eq!(find_bits(0.5, 1.0), Some(1));
        assert_eq!(find_bits(0.25, 0.75), Some(2));
        assert_eq!(find_bits(0.125, 1.0), Some(3));
        assert_eq!(find_bits(0.0625, 1.0), None);
        assert_eq!(find_bits(-0.5, 1.0), None);
    }

    #[test]
    fn box_shape_rejects_inverted_bounds() {
        let err = box_shape(0.0, 1.0, 0.0, 1.0, 0.5, 1.0).expect_err("inverted y");
        assert_eq!(
            err,
            ShapeError::InvalidBounds {
                axis: Axis::Y,
                min: 1.0,
                max: 0.5
            }
        );
        let nan = box_shape(0.0, 0.0, f64::NAN, 1.0, 1.0, 1.0).expect_err("NaN z");
        assert!(matches!(nan, ShapeError::InvalidBounds { axis: Axis::Z, .. }));
        assert!(box_shape(f64::NAN, 0.0, 0.0, f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn separated_shapes_answer_existence_without_merging() {
        let near = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let far = cuboid([3.0, 0.0, 0.0], [4.0, 1.0, 1.0]);
        assert_eq!(join_is_not_empty(&near, &far, BooleanOp::ONLY_FIRST), Ok(true));
        assert_eq!(join_is_not_empty(&near, &far, BooleanOp::ONLY_SECOND), Ok(true));
        assert_eq!(join_is_not_empty(&near, &far, BooleanOp::OR), Ok(true));
        assert_eq!(join_is_not_empty(&near, &far, BooleanOp::AND), Ok(false));
        assert_eq!(join_is_not_empty(&far, &near, BooleanOp::AND), Ok(false));
    }

    #[test]
    fn invalid_operator_is_rejected() {
        let op = BooleanOp::NOT_OR;
        assert_eq!(
            join(&block(), &empty(), op).expect_err("fills exterior"),
            ShapeError::InvalidOperator(op)
        );
        assert!(join_is_not_empty(&block(), &block(), BooleanOp::TRUE).is_err());
    }

    #[test]
    fn half_offset_intersection_has_half_bounds() {
        let a = block();
        let b = block().move_by(0.5, 0.0, 0.0);
        let both = join(&a, &b, BooleanOp::AND).expect("valid op");
        let bounds = both.bounds().expect("overlap is non-empty");
        assert_eq!(bounds.min, DVec3::new(0.5, 0.0, 0.0));
        assert_eq!(bounds.max, DVec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = block();
        let b = block().move_by(1.0, 0.0, 0.0);
        assert!(join(&a, &b, BooleanOp::AND).expect("valid op").is_empty());
        assert!(!join_is_not_empty(&a, &b, BooleanOp::AND).expect("valid op"));
        assert!(join_is_not_empty(&a, &b, BooleanOp::OR).expect("valid op"));
    }

    #[test]
    fn optimize_restores_singletons() {
        let halves = or(
            &cuboid([0.0, 0.0, 0.0], [0.5, 1.0, 1.0]),
            &cuboid([0.5, 0.0, 0.0], [1.0, 1.0, 1.0]),
        );
        assert!(halves.ptr_eq(&block()));

        let gone = join(&block(), &block(), BooleanOp::ONLY_FIRST).expect("valid op");
        assert!(gone.ptr_eq(&empty()));
    }

    #[test]
    fn empty_is_identity_for_or() {
        let slab = cuboid([0.0, 0.0, 0.0], [1.0, 0.5, 1.0]);
        assert_eq!(
            join(&slab, &empty(), BooleanOp::OR)
                .expect("valid op")
                .to_aabbs(),
            slab.to_aabbs()
        );
        assert!(join(&slab, &empty(), BooleanOp::AND)
            .expect("valid op")
            .is_empty());
    }

    #[test]
    fn collide_stops_flush_against_block() {
        let moving = Aabb::new(DVec3::ZERO, DVec3::ONE);
        let wall = block().move_by(2.0, 0.0, 0.0);
        assert_eq!(collide(Axis::X, &moving, [&wall], 5.0), 1.0);
        assert_eq!(collide(Axis::X, &moving, [&wall], -5.0), -5.0);

        let near = block().move_by(1.25, 0.0, 0.0);
        assert_eq!(collide(Axis::X, &moving, [&wall, &near], 5.0), 0.25);
        assert_eq!(collide(Axis::X, &moving, std::iter::empty(), 5.0), 5.0);
    }

    #[test]
    fn infinity_contains_everything() {
        let inf = infinity();
        assert_eq!(kind_name(&inf), "array");
        assert!(!join_is_not_empty(&block(), &inf, BooleanOp::ONLY_FIRST).expect("valid op"));
    }

    #[test]
    fn full_blocks_occlude_each_other() {
        for direction in Direction::VALUES {
            assert!(block_occludes(&block(), &block(), direction));
            assert!(!block_occludes(&block(), &empty(), direction));
        }
    }

    #[test]
    fn slab_occludes_only_towards_its_full_face() {
        let bottom = cuboid([0.0, 0.0, 0.0], [1.0, 0.5, 1.0]);
        // The slab's bottom face covers the top of the block below it.
        assert!(block_occludes(&block(), &bottom, Direction::Up));
        assert!(!block_occludes(&bottom, &block(), Direction::Up));
        assert!(block_occludes(&bottom, &block(), Direction::Down));
    }

    #[test]
    fn face_shapes_of_partial_blocks() {
        let slab = cuboid([0.0, 0.0, 0.0], [1.0, 0.5, 1.0]);
        assert!(face_shape(&slab, Direction::Up).is_empty());
        assert!(!face_shape(&slab, Direction::Down).is_empty());
        assert!(face_shape(&block(), Direction::North).ptr_eq(&block()));

        let west = face_shape(&cuboid([0.0, 0.0, 0.0], [0.5, 1.0, 1.0]), Direction::Up);
        let east = face_shape(&cuboid([0.5, 0.0, 0.0], [1.0, 1.0, 1.0]), Direction::Up);
        assert!(!face_shape_occludes(&west, &west));
        assert!(face_shape_occludes(&west, &east));
        assert!(!face_shape_occludes(&empty(), &empty()));
    }

    #[test]
    fn merged_halves_cover_shared_face() {
        let lower = cuboid([0.0, 0.0, 0.0], [0.5, 1.0, 1.0]);
        let upper = cuboid([0.5, 0.0, 0.0], [1.0, 1.0, 1.0]);
        // Each half touches the shared Y face over half its area: not enough.
        assert!(!merged_face_occludes(&lower, &lower, Direction::Up));
        assert!(merged_face_occludes(&lower, &upper, Direction::Up));
        assert!(merged_face_occludes(&block(), &empty(), Direction::East));
        assert!(!merged_face_occludes(&empty(), &empty(), Direction::East));
    }
}
