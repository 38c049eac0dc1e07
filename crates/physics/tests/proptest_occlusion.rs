//! Property-based tests for face occlusion
//!
//! Grid-aligned shapes (1/8 subdivisions) are compared against a sampled model of their
//! faces: a face cell is covered when the box list contains a point just inside it.
//!
//! Critical invariants:
//! - block_occludes: the shape's face is covered by the neighbor's opposite face
//! - merged_face_occludes: the two faces together cover the whole unit face
//! - face_shape_occludes is symmetric

use glam::DVec3;
use proptest::prelude::*;
use voxshape_core::{Axis, AxisDirection, Direction};
use voxshape_physics::shapes;
use voxshape_testkit::{grid_box, BoxUnion};

/// Depth of the probe inside a face; half the finest grid step.
const DEPTH: f64 = 1.0 / 16.0;

fn grid_union() -> impl Strategy<Value = BoxUnion> {
    prop::collection::vec(grid_box(), 0..=3).prop_map(|boxes| BoxUnion { boxes })
}

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::VALUES.to_vec())
}

/// Cell centres of the unit face perpendicular to `axis`, at depth `depth` along it.
fn face_points(axis: Axis, depth: f64) -> Vec<DVec3> {
    let centres: Vec<f64> = (0..8).map(|i| (f64::from(i) + 0.5) / 8.0).collect();
    let mut points = Vec::with_capacity(64);
    for &u in &centres {
        for &v in &centres {
            points.push(match axis {
                Axis::X => DVec3::new(depth, u, v),
                Axis::Y => DVec3::new(u, depth, v),
                Axis::Z => DVec3::new(u, v, depth),
            });
        }
    }
    points
}

/// Sampled cover of the face of `layout` on the `side` end of `axis`.
fn face_cover(layout: &BoxUnion, axis: Axis, side: AxisDirection) -> Vec<bool> {
    let depth = match side {
        AxisDirection::Positive => 1.0 - DEPTH,
        AxisDirection::Negative => DEPTH,
    };
    face_points(axis, depth)
        .into_iter()
        .map(|p| layout.contains(p))
        .collect()
}

fn reaches(layout: &BoxUnion, axis: Axis, side: AxisDirection) -> bool {
    layout.boxes.iter().any(|b| match side {
        AxisDirection::Positive => b.max_on(axis) == 1.0,
        AxisDirection::Negative => b.min_on(axis) == 0.0,
    })
}

proptest! {
    /// Property: block_occludes matches the sampled face cover
    #[test]
    fn block_occludes_matches_cover(
        shape in grid_union(),
        neighbor in grid_union(),
        direction in direction(),
    ) {
        let axis = direction.axis();
        let side = direction.axis_direction();
        let expected = !neighbor.boxes.is_empty()
            && reaches(&shape, axis, side)
            && reaches(&neighbor, axis, side.opposite())
            && face_cover(&shape, axis, side)
                .iter()
                .zip(face_cover(&neighbor, axis, side.opposite()))
                .all(|(&own, covered)| !own || covered);
        prop_assert_eq!(
            shapes::block_occludes(&shape.build(), &neighbor.build(), direction),
            expected,
            "{} / {:?} / {:?}", direction, shape, neighbor
        );
    }

    /// Property: merged_face_occludes holds exactly when the two faces fill the unit face
    #[test]
    fn merged_face_occludes_matches_cover(
        shape in grid_union(),
        neighbor in grid_union(),
        direction in direction(),
    ) {
        let axis = direction.axis();
        let side = direction.axis_direction();
        let expected = face_cover(&shape, axis, side)
            .iter()
            .zip(face_cover(&neighbor, axis, side.opposite()))
            .all(|(&own, other)| own || other);
        prop_assert_eq!(
            shapes::merged_face_occludes(&shape.build(), &neighbor.build(), direction),
            expected,
            "{} / {:?} / {:?}", direction, shape, neighbor
        );
    }

    /// Property: face shape coverage does not depend on argument order
    #[test]
    fn face_shape_occludes_is_symmetric(
        a in grid_union(),
        b in grid_union(),
        direction in direction(),
    ) {
        let fa = shapes::face_shape(&a.build(), direction);
        let fb = shapes::face_shape(&b.build(), direction.opposite());
        prop_assert_eq!(
            shapes::face_shape_occludes(&fa, &fb),
            shapes::face_shape_occludes(&fb, &fa)
        );
    }
}
