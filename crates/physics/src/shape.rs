//! Continuous shapes: a discrete grid plus per-axis coordinate lists.

use std::fmt;
use std::sync::{Arc, OnceLock};

use glam::{DVec3, IVec3};
use voxshape_core::math::{binary_search, floor, fuzzy_equals};
use voxshape_core::{Axis, AxisCycle, AxisDirection, Direction, EPSILON};

use crate::aabb::{Aabb, ShapeHit};
use crate::coords::CoordList;
use crate::discrete::{DiscreteVoxelShape, SubShape};
use crate::op::BooleanOp;
use crate::shapes;

/// Immutable shape handle. Cloning is cheap and clones share cached face slices.
#[derive(Clone)]
pub struct VoxelShape(Arc<ShapeData>);

struct ShapeData {
    kind: ShapeKind,
    // `None` marks "the face is the shape itself", which keeps the cache free of cycles.
    faces: [OnceLock<Option<VoxelShape>>; 6],
}

/// Concrete representation behind a [`VoxelShape`].
#[derive(Debug)]
pub enum ShapeKind {
    /// Uniform power-of-two subdivision of the unit cube.
    Cube(CubeVoxelShape),
    /// Explicit coordinate lists.
    Array(ArrayVoxelShape),
    /// One-cell-thick cross-section of another shape.
    Slice(SliceShape),
}

/// Shape whose boundaries are the implicit points `i / size` on every axis.
#[derive(Debug)]
pub struct CubeVoxelShape {
    shape: Arc<DiscreteVoxelShape>,
}

/// Shape with explicit boundaries on every axis.
#[derive(Debug)]
pub struct ArrayVoxelShape {
    shape: Arc<DiscreteVoxelShape>,
    xs: CoordList,
    ys: CoordList,
    zs: CoordList,
}

/// Cross-section of a parent shape at one index along `axis`.
///
/// The slice spans `[0, 1]` along its axis and borrows the parent's boundaries elsewhere.
#[derive(Debug)]
pub struct SliceShape {
    shape: Arc<DiscreteVoxelShape>,
    axis: Axis,
    coords: [CoordList; 3],
}

impl VoxelShape {
    fn from_kind(kind: ShapeKind) -> Self {
        VoxelShape(Arc::new(ShapeData {
            kind,
            faces: Default::default(),
        }))
    }

    /// Wrap a grid whose boundaries are uniform subdivisions of `[0, 1]`.
    pub fn cube(shape: impl Into<Arc<DiscreteVoxelShape>>) -> Self {
        Self::from_kind(ShapeKind::Cube(CubeVoxelShape {
            shape: shape.into(),
        }))
    }

    /// Wrap a grid with explicit boundaries; each list needs `size + 1` entries.
    pub fn array(
        shape: impl Into<Arc<DiscreteVoxelShape>>,
        xs: CoordList,
        ys: CoordList,
        zs: CoordList,
    ) -> Self {
        let shape = shape.into();
        debug_assert_eq!(xs.len() as i32, shape.x_size() + 1, "x boundaries");
        debug_assert_eq!(ys.len() as i32, shape.y_size() + 1, "y boundaries");
        debug_assert_eq!(zs.len() as i32, shape.z_size() + 1, "z boundaries");
        Self::from_kind(ShapeKind::Array(ArrayVoxelShape { shape, xs, ys, zs }))
    }

    /// Cross-section of `delegate` at `index` along `axis`.
    pub(crate) fn slice(delegate: &VoxelShape, axis: Axis, index: i32) -> Self {
        let parent = Arc::clone(delegate.discrete_arc());
        let shape = Arc::new(DiscreteVoxelShape::Sub(SubShape::slice(parent, axis, index)));
        let coords = Axis::VALUES.map(|a| {
            if a == axis {
                CoordList::cube(1)
            } else {
                delegate.coords(a)
            }
        });
        Self::from_kind(ShapeKind::Slice(SliceShape {
            shape,
            axis,
            coords,
        }))
    }

    /// Representation behind this handle.
    pub fn kind(&self) -> &ShapeKind {
        &self.0.kind
    }

    /// Whether both handles point at the same shape.
    pub fn ptr_eq(&self, other: &VoxelShape) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn discrete_arc(&self) -> &Arc<DiscreteVoxelShape> {
        match &self.0.kind {
            ShapeKind::Cube(cube) => &cube.shape,
            ShapeKind::Array(array) => &array.shape,
            ShapeKind::Slice(slice) => &slice.shape,
        }
    }

    /// Occupancy grid.
    pub fn discrete(&self) -> &DiscreteVoxelShape {
        self.discrete_arc()
    }

    /// Boundaries along `axis`.
    pub fn coords(&self, axis: Axis) -> CoordList {
        match &self.0.kind {
            ShapeKind::Cube(cube) => CoordList::cube(cube.shape.size(axis) as u32),
            ShapeKind::Array(array) => axis.choose(&array.xs, &array.ys, &array.zs).clone(),
            ShapeKind::Slice(slice) => slice.coords[axis.ordinal()].clone(),
        }
    }

    /// Boundary `index` along `axis`.
    #[inline]
    pub fn get(&self, axis: Axis, index: i32) -> f64 {
        match &self.0.kind {
            ShapeKind::Cube(cube) => f64::from(index) / f64::from(cube.shape.size(axis)),
            ShapeKind::Array(array) => axis
                .choose(&array.xs, &array.ys, &array.zs)
                .get(index as usize),
            ShapeKind::Slice(slice) => slice.coords[axis.ordinal()].get(index as usize),
        }
    }

    /// Whether the shape has no volume.
    pub fn is_empty(&self) -> bool {
        self.discrete().is_empty()
    }

    /// Lowest occupied coordinate along `axis` (`+inf` if none).
    pub fn min(&self, axis: Axis) -> f64 {
        let index = self.discrete().first_full(axis);
        if index >= self.discrete().size(axis) {
            f64::INFINITY
        } else {
            self.get(axis, index)
        }
    }

    /// Highest occupied coordinate along `axis` (`-inf` if none).
    pub fn max(&self, axis: Axis) -> f64 {
        let index = self.discrete().last_full(axis);
        if index <= 0 {
            f64::NEG_INFINITY
        } else {
            self.get(axis, index)
        }
    }

    /// Tight bounding box, or `None` for an empty shape.
    pub fn bounds(&self) -> Option<Aabb> {
        if self.is_empty() {
            return None;
        }
        Some(Aabb::new(
            DVec3::new(self.min(Axis::X), self.min(Axis::Y), self.min(Axis::Z)),
            DVec3::new(self.max(Axis::X), self.max(Axis::Y), self.max(Axis::Z)),
        ))
    }

    /// One box covering the whole shape.
    pub fn single_encompassing(&self) -> VoxelShape {
        match self.bounds() {
            Some(bounds) => shapes::create_from_aabb(&bounds),
            None => shapes::empty(),
        }
    }

    /// Copy translated by `(dx, dy, dz)`.
    pub fn move_by(&self, dx: f64, dy: f64, dz: f64) -> VoxelShape {
        if self.is_empty() {
            return shapes::empty();
        }
        VoxelShape::array(
            Arc::clone(self.discrete_arc()),
            self.coords(Axis::X).offset(dx),
            self.coords(Axis::Y).offset(dy),
            self.coords(Axis::Z).offset(dz),
        )
    }

    /// Report the occupied region as merged boxes in real coordinates.
    pub fn for_all_boxes(&self, mut consumer: impl FnMut(f64, f64, f64, f64, f64, f64)) {
        let xs = self.coords(Axis::X);
        let ys = self.coords(Axis::Y);
        let zs = self.coords(Axis::Z);
        self.discrete().for_all_boxes(
            |x0, y0, z0, x1, y1, z1| {
                consumer(
                    xs.get(x0 as usize),
                    ys.get(y0 as usize),
                    zs.get(z0 as usize),
                    xs.get(x1 as usize),
                    ys.get(y1 as usize),
                    zs.get(z1 as usize),
                )
            },
            true,
        );
    }

    /// Occupied region as a list of disjoint boxes.
    pub fn to_aabbs(&self) -> Vec<Aabb> {
        let mut boxes = Vec::new();
        self.for_all_boxes(|x0, y0, z0, x1, y1, z1| {
            boxes.push(Aabb::new(DVec3::new(x0, y0, z0), DVec3::new(x1, y1, z1)));
        });
        boxes
    }

    /// Cell index containing `coord` along `axis`.
    ///
    /// `-1` lies below the first boundary, `size` at or beyond the last one.
    pub fn find_index(&self, axis: Axis, coord: f64) -> i32 {
        match &self.0.kind {
            ShapeKind::Cube(cube) => {
                let size = cube.shape.size(axis);
                floor((coord * f64::from(size)).clamp(-1.0, f64::from(size)))
            }
            _ => {
                let size = self.discrete().size(axis);
                binary_search(0, size + 1, |i| coord < self.get(axis, i)) - 1
            }
        }
    }

    /// Rebuild the shape from its merged boxes, collapsing to canonical forms.
    pub fn optimize(&self) -> VoxelShape {
        let mut result = shapes::empty();
        self.for_all_boxes(|x0, y0, z0, x1, y1, z1| {
            let part = shapes::create(x0, y0, z0, x1, y1, z1);
            result = shapes::join_unchecked(&result, &part, BooleanOp::OR);
        });
        result
    }

    /// Cross-section one cell inside the face pointing at `direction`.
    pub fn face_shape(&self, direction: Direction) -> VoxelShape {
        if self.is_empty() {
            return shapes::empty();
        }
        self.0.faces[direction.ordinal()]
            .get_or_init(|| self.calculate_face(direction))
            .clone()
            .unwrap_or_else(|| self.clone())
    }

    fn calculate_face(&self, direction: Direction) -> Option<VoxelShape> {
        let axis = direction.axis();
        let coords = self.coords(axis);
        if coords.len() == 2
            && fuzzy_equals(coords.get(0), 0.0, EPSILON)
            && fuzzy_equals(coords.get(1), 1.0, EPSILON)
        {
            return None;
        }
        let probe = match direction.axis_direction() {
            AxisDirection::Positive => 1.0 - EPSILON,
            AxisDirection::Negative => EPSILON,
        };
        let index = self.find_index(axis, probe);
        Some(VoxelShape::slice(self, axis, index))
    }

    /// How far `moving` can travel along `axis` (up to `distance`) before touching this
    /// shape.
    ///
    /// Cells the box already overlaps are ignored, so a box that starts inside the shape
    /// is free to leave it.
    pub fn collide(&self, axis: Axis, moving: &Aabb, mut distance: f64) -> f64 {
        if self.is_empty() {
            return distance;
        }
        if distance.abs() < EPSILON {
            return 0.0;
        }

        // Work in a frame where the movement axis is local X.
        let inverse = AxisCycle::between(axis, Axis::X).inverse();
        let ax = inverse.cycle_axis(Axis::X);
        let ay = inverse.cycle_axis(Axis::Y);
        let az = inverse.cycle_axis(Axis::Z);
        let shape = self.discrete();

        let max_x = moving.max_on(ax);
        let min_x = moving.min_on(ax);
        let x1 = self.find_index(ax, min_x + EPSILON);
        let x2 = self.find_index(ax, max_x - EPSILON);
        let y1 = self.find_index(ay, moving.min_on(ay) + EPSILON).max(0);
        let y2 = (self.find_index(ay, moving.max_on(ay) - EPSILON) + 1).min(shape.size(ay));
        let z1 = self.find_index(az, moving.min_on(az) + EPSILON).max(0);
        let z2 = (self.find_index(az, moving.max_on(az) - EPSILON) + 1).min(shape.size(az));
        let x_size = shape.size(ax);

        let layer_blocked = |x: i32| {
            (y1..y2).any(|y| (z1..z2).any(|z| shape.is_full_wide_cycled(inverse, x, y, z)))
        };

        if distance > 0.0 {
            for x in x2 + 1..x_size {
                if layer_blocked(x) {
                    let gap = self.get(ax, x) - max_x;
                    if gap >= -EPSILON {
                        distance = distance.min(gap);
                    }
                    return distance;
                }
            }
        } else if distance < 0.0 {
            for x in (0..x1).rev() {
                if layer_blocked(x) {
                    let gap = self.get(ax, x + 1) - min_x;
                    if gap <= EPSILON {
                        distance = distance.max(gap);
                    }
                    return distance;
                }
            }
        }
        distance
    }

    /// Cast the segment `from -> to` against this shape placed at `block_pos`.
    pub fn clip(&self, from: DVec3, to: DVec3, block_pos: IVec3) -> Option<ShapeHit> {
        if self.is_empty() {
            return None;
        }
        let delta = to - from;
        if delta.length_squared() < EPSILON {
            return None;
        }
        let probe = from + delta * 0.001;
        let local = probe - block_pos.as_dvec3();
        let starts_inside = self.discrete().is_full_wide(
            self.find_index(Axis::X, local.x),
            self.find_index(Axis::Y, local.y),
            self.find_index(Axis::Z, local.z),
        );
        if starts_inside {
            return Some(ShapeHit {
                location: probe,
                direction: Direction::nearest(delta.x, delta.y, delta.z).opposite(),
                block_pos,
                inside: true,
            });
        }
        Aabb::clip_boxes(&self.to_aabbs(), from, to, block_pos)
    }
}

impl SliceShape {
    /// Axis the slice is one cell thick along.
    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl fmt::Debug for VoxelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("VoxelShape");
        match self.kind() {
            ShapeKind::Cube(_) => out.field("kind", &"Cube"),
            ShapeKind::Array(_) => out.field("kind", &"Array"),
            ShapeKind::Slice(slice) => out.field("kind", &"Slice").field("axis", &slice.axis()),
        };
        out.field("boxes", &self.to_aabbs()).finish()
    }
}
