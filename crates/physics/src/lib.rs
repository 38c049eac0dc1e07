#![warn(missing_docs)]
//! Voxel collision shapes: occupancy grids, boolean combination, sweeps and face occlusion.
//!
//! Most callers only need the [`shapes`] facade and the [`VoxelShape`] handle.

pub mod aabb;
pub mod coords;
pub mod discrete;
mod error;
pub mod merger;
pub mod op;
pub mod shape;
pub mod shapes;

pub use aabb::{Aabb, ShapeHit};
pub use coords::CoordList;
pub use discrete::{BitSetDiscreteVoxelShape, DiscreteVoxelShape, SubShape};
pub use error::ShapeError;
pub use merger::{create_index_merger, IndexMerger, MAX_CUBE_MERGE_CELLS};
pub use op::{BooleanOp, ParseBooleanOpError};
pub use shape::{ShapeKind, VoxelShape};
