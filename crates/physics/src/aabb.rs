//! Axis-aligned boxes in continuous space.

use glam::{DVec3, IVec3};
use voxshape_core::{Axis, AxisDirection, Direction, EPSILON};

/// Axis-aligned bounding box used for collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner (x, y, z).
    pub min: DVec3,
    /// Maximum corner (x, y, z).
    pub max: DVec3,
}

/// Result of casting a segment against a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    /// Point where the segment enters the shape.
    pub location: DVec3,
    /// Face that was hit.
    pub direction: Direction,
    /// Block position the shape was placed at.
    pub block_pos: IVec3,
    /// Whether the segment started inside the shape.
    pub inside: bool,
}

impl Aabb {
    /// Create a new AABB ensuring min <= max per axis.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y && min.z <= max.z);
        Self { min, max }
    }

    /// Box spanning two arbitrary corners.
    pub fn from_corners(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower bound along `axis`.
    #[inline]
    pub fn min_on(&self, axis: Axis) -> f64 {
        axis.choose(self.min.x, self.min.y, self.min.z)
    }

    /// Upper bound along `axis`.
    #[inline]
    pub fn max_on(&self, axis: Axis) -> f64 {
        axis.choose(self.max.x, self.max.y, self.max.z)
    }

    /// Tests intersection with another AABB.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Copy shifted by `offset`.
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Where the segment `from -> to` first enters this box.
    ///
    /// Returns the segment parameter in `(0, 1)` and the entry face. Segments that start
    /// inside the box do not report a hit.
    pub fn clip(&self, from: DVec3, to: DVec3) -> Option<(f64, Direction)> {
        let delta = to - from;
        let mut best: Option<(f64, Direction)> = None;
        for axis in Axis::VALUES {
            let a = axis.ordinal();
            let step = delta[a];
            let (plane, face) = if step > EPSILON {
                (self.min[a], axis.direction(AxisDirection::Negative))
            } else if step < -EPSILON {
                (self.max[a], axis.direction(AxisDirection::Positive))
            } else {
                continue;
            };
            let t = (plane - from[a]) / step;
            let limit = best.map_or(1.0, |(t, _)| t);
            if !(0.0 < t && t < limit) {
                continue;
            }
            let point = from + delta * t;
            let inside_face = Axis::VALUES.iter().filter(|other| **other != axis).all(|other| {
                let o = other.ordinal();
                self.min[o] - EPSILON < point[o] && point[o] < self.max[o] + EPSILON
            });
            if inside_face {
                best = Some((t, face));
            }
        }
        best
    }

    /// Nearest entry into any of `boxes` placed at `block_pos`.
    pub fn clip_boxes(boxes: &[Aabb], from: DVec3, to: DVec3, block_pos: IVec3) -> Option<ShapeHit> {
        let offset = block_pos.as_dvec3();
        let mut nearest: Option<(f64, Direction)> = None;
        for aabb in boxes {
            if let Some((t, face)) = aabb.translated(offset).clip(from, to) {
                if nearest.map_or(true, |(best, _)| t < best) {
                    nearest = Some((t, face));
                }
            }
        }
        nearest.map(|(t, direction)| ShapeHit {
            location: from + (to - from) * t,
            direction,
            block_pos,
            inside: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(DVec3::ZERO, DVec3::ONE)
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = unit();
        assert!(a.intersects(&a.translated(DVec3::new(0.5, 0.0, 0.0))));
        assert!(!a.intersects(&a.translated(DVec3::new(1.0, 0.0, 0.0))));
    }

    #[test]
    fn clip_reports_entry_face() {
        let hit = unit().clip(DVec3::new(-1.0, 0.5, 0.5), DVec3::new(2.0, 0.5, 0.5));
        let (t, face) = hit.expect("segment crosses the box");
        assert!((t - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(face, Direction::West);

        let down = unit().clip(DVec3::new(0.5, 3.0, 0.5), DVec3::new(0.5, -1.0, 0.5));
        assert_eq!(down.map(|(_, face)| face), Some(Direction::Up));

        assert!(unit().clip(DVec3::new(-1.0, 2.0, 0.5), DVec3::new(2.0, 2.0, 0.5)).is_none());
    }

    #[test]
    fn clip_boxes_picks_nearest() {
        let boxes = [
            Aabb::new(DVec3::new(0.5, 0.0, 0.0), DVec3::ONE),
            Aabb::new(DVec3::ZERO, DVec3::new(0.25, 1.0, 1.0)),
        ];
        let hit = Aabb::clip_boxes(
            &boxes,
            DVec3::new(11.0, 0.5, 0.5),
            DVec3::new(0.0, 0.5, 0.5),
            IVec3::new(9, 0, 0),
        )
        .expect("hit");
        assert_eq!(hit.direction, Direction::East);
        assert!((hit.location.x - 10.0).abs() < 1e-9);
        assert!(!hit.inside);
    }
}
