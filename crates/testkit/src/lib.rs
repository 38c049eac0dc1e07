#![warn(missing_docs)]
//! Shared test surfaces: proptest strategies for box-list shapes and a point-sampling
//! reference oracle.
//!
//! A [`BoxUnion`] keeps the boxes a shape was built from, so occupancy can be checked
//! against the plain box list instead of the shape's own lattice.

use glam::DVec3;
use proptest::prelude::*;
use voxshape_core::Axis;
use voxshape_physics::{shapes, Aabb, VoxelShape};

/// Boxes on the `1/8` grid of the unit cube. They build cube shapes.
pub fn grid_box() -> impl Strategy<Value = Aabb> {
    let span = || (0u8..8, 1u8..=8).prop_map(|(a, b)| ordered(a, b, 8.0));
    (span(), span(), span()).prop_map(|(x, y, z)| {
        Aabb::new(DVec3::new(x.0, y.0, z.0), DVec3::new(x.1, y.1, z.1))
    })
}

/// Boxes on the `1/10` grid of `[-0.5, 1.5]`. Most of them need explicit boundaries.
pub fn free_box() -> impl Strategy<Value = Aabb> {
    let span = || (-5i8..15, -4i8..=15).prop_map(|(a, b)| ordered(a, b, 10.0));
    (span(), span(), span()).prop_map(|(x, y, z)| {
        Aabb::new(DVec3::new(x.0, y.0, z.0), DVec3::new(x.1, y.1, z.1))
    })
}

fn ordered<T: Into<f64> + Ord + Copy>(a: T, b: T, parts: f64) -> (f64, f64) {
    let (lo, hi) = if a < b {
        (a, b)
    } else if b < a {
        (b, a)
    } else {
        return (a.into() / parts, (a.into() + 1.0) / parts);
    };
    (lo.into() / parts, hi.into() / parts)
}

/// Any box this kit generates.
pub fn any_box() -> impl Strategy<Value = Aabb> {
    prop_oneof![grid_box(), free_box()]
}

/// Union of one to four boxes, or nothing at all.
#[derive(Debug, Clone)]
pub struct BoxUnion {
    /// Boxes making up the shape.
    pub boxes: Vec<Aabb>,
}

impl BoxUnion {
    /// Build the shape as the union of its boxes.
    pub fn build(&self) -> VoxelShape {
        let parts: Vec<VoxelShape> = self.boxes.iter().map(shapes::create_from_aabb).collect();
        match parts.split_first() {
            Some((first, rest)) => shapes::or_all(first, rest),
            None => shapes::empty(),
        }
    }

    /// Whether `point` lies strictly inside one of the boxes.
    pub fn contains(&self, point: DVec3) -> bool {
        self.boxes
            .iter()
            .any(|b| point.cmpgt(b.min).all() && point.cmplt(b.max).all())
    }
}

/// Shapes mixing grid and free boxes, including the empty shape.
pub fn box_union() -> impl Strategy<Value = BoxUnion> {
    prop::collection::vec(any_box(), 0..=4).prop_map(|boxes| BoxUnion { boxes })
}

/// Whether the cell of `shape` containing `point` is filled.
///
/// Only meaningful for points off every boundary of the shape.
pub fn occupied(shape: &VoxelShape, point: DVec3) -> bool {
    shape.discrete().is_full_wide(
        shape.find_index(Axis::X, point.x),
        shape.find_index(Axis::Y, point.y),
        shape.find_index(Axis::Z, point.z),
    )
}

/// Points in the middle of every cell of the lattice spanned by `unions`, plus one layer
/// outside it on every side.
pub fn sample_points(unions: &[&BoxUnion]) -> Vec<DVec3> {
    let axis_samples = |pick: fn(DVec3) -> f64| {
        let mut bounds: Vec<f64> = unions
            .iter()
            .flat_map(|layout| layout.boxes.iter())
            .flat_map(|b| [pick(b.min), pick(b.max)])
            .chain([0.0, 1.0])
            .collect();
        bounds.sort_by(f64::total_cmp);
        bounds.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        let mut samples = Vec::with_capacity(bounds.len() + 1);
        samples.push(bounds[0] - 0.5);
        samples.extend(bounds.windows(2).map(|w| (w[0] + w[1]) / 2.0));
        samples.push(bounds[bounds.len() - 1] + 0.5);
        samples
    };
    let xs = axis_samples(|v| v.x);
    let ys = axis_samples(|v| v.y);
    let zs = axis_samples(|v| v.z);

    let mut points = Vec::with_capacity(xs.len() * ys.len() * zs.len());
    for &x in &xs {
        for &y in &ys {
            for &z in &zs {
                points.push(DVec3::new(x, y, z));
            }
        }
    }
    points
}

/// First sample point where `shape` disagrees with `expected`, if any.
pub fn first_mismatch(
    shape: &VoxelShape,
    points: &[DVec3],
    expected: impl Fn(DVec3) -> bool,
) -> Option<DVec3> {
    points
        .iter()
        .copied()
        .find(|&p| occupied(shape, p) != expected(p))
}
