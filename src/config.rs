use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::debug;
use voxshape_core::{Axis, Direction};
use voxshape_physics::{shapes, VoxelShape};

/// Box corners as `[min_x, min_y, min_z, max_x, max_y, max_z]`.
pub type BoxCorners = [f64; 6];

/// Probe input: named shapes plus the queries to run against them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Scene {
    pub shapes: BTreeMap<String, ShapeConfig>,
    pub queries: Vec<Query>,
}

/// A shape given as the union of its boxes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub boxes: Vec<BoxCorners>,
}

/// One probe query, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    /// Combine two shapes and report the result.
    Join {
        first: String,
        second: String,
        op: String,
    },
    /// Whether combining two shapes leaves anything.
    Exists {
        first: String,
        second: String,
        op: String,
    },
    /// Sweep a box through a list of shapes.
    Collide {
        axis: Axis,
        moving: BoxCorners,
        shapes: Vec<String>,
        distance: f64,
    },
    /// Whether `first`'s face towards `direction` is hidden by `second`.
    Occludes {
        first: String,
        second: String,
        direction: Direction,
    },
    /// Whether the faces of `first` and `second` between them cover the whole face.
    FaceOccludes {
        first: String,
        second: String,
        direction: Direction,
    },
}

impl Scene {
    /// Parse a scene from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid scene file")
    }

    /// Load a scene from disk.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        let scene = Self::from_toml(&contents)
            .with_context(|| format!("failed to parse scene {}", path.display()))?;
        debug!(
            shapes = scene.shapes.len(),
            queries = scene.queries.len(),
            "loaded scene from {}",
            path.display()
        );
        Ok(scene)
    }

    /// Build every named shape.
    pub fn build_shapes(&self) -> Result<BTreeMap<String, VoxelShape>> {
        self.shapes
            .iter()
            .map(|(name, config)| {
                let shape = config
                    .build()
                    .with_context(|| format!("invalid shape `{name}`"))?;
                Ok((name.clone(), shape))
            })
            .collect()
    }
}

impl ShapeConfig {
    /// Union of the configured boxes; no boxes gives the empty shape.
    pub fn build(&self) -> Result<VoxelShape> {
        let parts = self
            .boxes
            .iter()
            .enumerate()
            .map(|(index, corners)| {
                let [min_x, min_y, min_z, max_x, max_y, max_z] = *corners;
                shapes::box_shape(min_x, min_y, min_z, max_x, max_y, max_z)
                    .with_context(|| format!("box {index}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(match parts.split_first() {
            Some((first, rest)) => shapes::or_all(first, rest),
            None => shapes::empty(),
        })
    }
}
