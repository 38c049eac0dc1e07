use thiserror::Error;
use voxshape_core::Axis;

use crate::op::BooleanOp;

/// Errors raised by shape construction and combination.
///
/// Both variants are caller mistakes; valid input never produces an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// A box was requested with `min > max` (or a NaN bound) on some axis.
    #[error("box bounds are not ordered on the {axis} axis ({min}..{max})")]
    InvalidBounds {
        /// Offending axis.
        axis: Axis,
        /// Requested minimum.
        min: f64,
        /// Requested maximum.
        max: f64,
    },
    /// The operator maps `(false, false)` to `true`, which would fill the unbounded exterior.
    #[error("{0:?} cannot combine shapes: it is true where both inputs are empty")]
    InvalidOperator(BooleanOp),
}
