#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod direction;
pub mod math;

// Re-export commonly used types
pub use direction::{Axis, AxisCycle, AxisDirection, Direction, ParseAxisError, ParseDirectionError};
pub use math::EPSILON;
