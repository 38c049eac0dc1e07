//! Axis and direction identifiers.
//!
//! Shape queries are written once for the X axis and rotated onto Y and Z with an
//! [`AxisCycle`], so the three movement axes share a single code path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three lattice axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The X axis (west/east).
    X = 0,
    /// The Y axis (down/up).
    Y = 1,
    /// The Z axis (north/south).
    Z = 2,
}

impl Axis {
    /// All axes in ordinal order.
    pub const VALUES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Stable ordinal (0, 1, 2).
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Pick the component that belongs to this axis.
    #[inline]
    pub fn choose<T>(self, x: T, y: T, z: T) -> T {
        match self {
            Axis::X => x,
            Axis::Y => y,
            Axis::Z => z,
        }
    }

    /// Canonical lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Direction along this axis with the given sign.
    pub const fn direction(self, sign: AxisDirection) -> Direction {
        Direction::from_axis_and_direction(self, sign)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown axis name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown axis `{0}` (expected x, y or z)")]
pub struct ParseAxisError(pub String);

impl FromStr for Axis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

/// Sign of a direction along its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    /// Towards increasing coordinates.
    Positive,
    /// Towards decreasing coordinates.
    Negative,
}

impl AxisDirection {
    /// Unit step (+1 or -1).
    pub const fn step(self) -> i32 {
        match self {
            AxisDirection::Positive => 1,
            AxisDirection::Negative => -1,
        }
    }

    /// The other sign.
    pub const fn opposite(self) -> Self {
        match self {
            AxisDirection::Positive => AxisDirection::Negative,
            AxisDirection::Negative => AxisDirection::Positive,
        }
    }
}

/// One of the six faces of a lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// -Y
    Down,
    /// +Y
    Up,
    /// -Z
    North,
    /// +Z
    South,
    /// -X
    West,
    /// +X
    East,
}

impl Direction {
    /// All directions in declaration order.
    pub const VALUES: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Stable index into [`Direction::VALUES`].
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Axis this direction points along.
    pub const fn axis(self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    /// Sign of this direction along its axis.
    pub const fn axis_direction(self) -> AxisDirection {
        match self {
            Direction::Up | Direction::South | Direction::East => AxisDirection::Positive,
            Direction::Down | Direction::North | Direction::West => AxisDirection::Negative,
        }
    }

    /// The direction facing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Build a direction from its axis and sign.
    pub const fn from_axis_and_direction(axis: Axis, sign: AxisDirection) -> Self {
        match (axis, sign) {
            (Axis::X, AxisDirection::Positive) => Direction::East,
            (Axis::X, AxisDirection::Negative) => Direction::West,
            (Axis::Y, AxisDirection::Positive) => Direction::Up,
            (Axis::Y, AxisDirection::Negative) => Direction::Down,
            (Axis::Z, AxisDirection::Positive) => Direction::South,
            (Axis::Z, AxisDirection::Negative) => Direction::North,
        }
    }

    /// Unit normal as integer components.
    pub const fn normal(self) -> [i32; 3] {
        let step = self.axis_direction().step();
        match self.axis() {
            Axis::X => [step, 0, 0],
            Axis::Y => [0, step, 0],
            Axis::Z => [0, 0, step],
        }
    }

    /// Direction whose normal best matches `(dx, dy, dz)`.
    ///
    /// Ties resolve to the earliest direction in [`Direction::VALUES`]; a zero vector yields
    /// [`Direction::North`].
    pub fn nearest(dx: f64, dy: f64, dz: f64) -> Self {
        let mut best = Direction::North;
        let mut best_dot = 0.0;
        for direction in Direction::VALUES {
            let [nx, ny, nz] = direction.normal();
            let dot = dx * f64::from(nx) + dy * f64::from(ny) + dz * f64::from(nz);
            if dot > best_dot {
                best_dot = dot;
                best = direction;
            }
        }
        best
    }

    /// Canonical lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown direction name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction `{0}`")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Direction::VALUES
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}

/// Rotation of the axis triple `X -> Y -> Z -> X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisCycle {
    /// Identity.
    None,
    /// `X -> Y`, `Y -> Z`, `Z -> X`.
    Forward,
    /// `X -> Z`, `Y -> X`, `Z -> Y`.
    Backward,
}

impl AxisCycle {
    /// All cycles in ordinal order.
    pub const VALUES: [AxisCycle; 3] = [AxisCycle::None, AxisCycle::Forward, AxisCycle::Backward];

    /// The cycle that maps `from` onto `to`.
    pub fn between(from: Axis, to: Axis) -> Self {
        let shift = (to.ordinal() as i32 - from.ordinal() as i32).rem_euclid(3);
        Self::VALUES[shift as usize]
    }

    /// The cycle that undoes this one.
    pub const fn inverse(self) -> Self {
        match self {
            AxisCycle::None => AxisCycle::None,
            AxisCycle::Forward => AxisCycle::Backward,
            AxisCycle::Backward => AxisCycle::Forward,
        }
    }

    /// Where `axis` lands after applying this cycle.
    pub fn cycle_axis(self, axis: Axis) -> Axis {
        let shift = match self {
            AxisCycle::None => 0,
            AxisCycle::Forward => 1,
            AxisCycle::Backward => 2,
        };
        Axis::VALUES[(axis.ordinal() + shift) % 3]
    }

    /// Component of the cycled triple `(x, y, z)` that lands on `axis`.
    #[inline]
    pub fn cycle<T>(self, x: T, y: T, z: T, axis: Axis) -> T {
        match self {
            AxisCycle::None => axis.choose(x, y, z),
            AxisCycle::Forward => axis.choose(z, x, y),
            AxisCycle::Backward => axis.choose(y, z, x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_round_trip_through_axis_and_sign() {
        for direction in Direction::VALUES {
            let rebuilt =
                Direction::from_axis_and_direction(direction.axis(), direction.axis_direction());
            assert_eq!(rebuilt, direction);
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.opposite().axis(), direction.axis());
        }
    }

    #[test]
    fn nearest_picks_dominant_component() {
        assert_eq!(Direction::nearest(0.2, -3.0, 1.0), Direction::Down);
        assert_eq!(Direction::nearest(5.0, 0.0, 1.0), Direction::East);
        assert_eq!(Direction::nearest(0.0, 0.0, -0.1), Direction::North);
    }

    #[test]
    fn axis_cycle_inverse_restores_axis() {
        for cycle in AxisCycle::VALUES {
            for axis in Axis::VALUES {
                assert_eq!(cycle.inverse().cycle_axis(cycle.cycle_axis(axis)), axis);
            }
        }
        assert_eq!(AxisCycle::between(Axis::Y, Axis::X), AxisCycle::Backward);
        assert_eq!(AxisCycle::between(Axis::X, Axis::Z), AxisCycle::Backward);
        assert_eq!(AxisCycle::between(Axis::Z, Axis::X), AxisCycle::Forward);
    }

    #[test]
    fn cycled_coordinates_follow_cycled_axes() {
        // Probing through the inverse of `between(axis, X)` maps local X onto `axis`.
        for axis in Axis::VALUES {
            let inverse = AxisCycle::between(axis, Axis::X).inverse();
            let (x, y, z) = (10, 20, 30);
            let real = [
                inverse.cycle(x, y, z, Axis::X),
                inverse.cycle(x, y, z, Axis::Y),
                inverse.cycle(x, y, z, Axis::Z),
            ];
            assert_eq!(real[inverse.cycle_axis(Axis::X).ordinal()], x);
            assert_eq!(real[inverse.cycle_axis(Axis::Y).ordinal()], y);
            assert_eq!(real[inverse.cycle_axis(Axis::Z).ordinal()], z);
        }
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("Y".parse::<Axis>(), Ok(Axis::Y));
        assert_eq!("EAST".parse::<Direction>(), Ok(Direction::East));
        assert!("w".parse::<Axis>().is_err());
        assert!("sideways".parse::<Direction>().is_err());
    }
}
