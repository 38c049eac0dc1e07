//! Query evaluation for scene files.

use anyhow::{anyhow, Context, Result};
use glam::DVec3;
use serde::Serialize;
use std::{collections::BTreeMap, io::Write};
use tracing::{debug, instrument};
use voxshape_core::{Axis, Direction};
use voxshape_physics::{shapes, Aabb, BooleanOp, VoxelShape};

use crate::config::{BoxCorners, Query, Scene};

/// One output line.
#[derive(Debug, Serialize)]
pub struct Report {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Join {
        op: String,
        empty: bool,
        representation: &'static str,
        boxes: Vec<BoxCorners>,
    },
    Exists {
        op: String,
        exists: bool,
    },
    Collide {
        axis: Axis,
        requested: f64,
        allowed: f64,
    },
    Occludes {
        direction: Direction,
        occludes: bool,
    },
    FaceOccludes {
        direction: Direction,
        occludes: bool,
    },
}

/// Evaluate every query of `scene`, writing one JSON line per result.
#[instrument(skip_all, fields(shapes = scene.shapes.len(), queries = scene.queries.len()))]
pub fn run(scene: &Scene, out: &mut impl Write) -> Result<()> {
    let built = scene.build_shapes()?;
    for (index, query) in scene.queries.iter().enumerate() {
        let outcome = evaluate(&built, query).with_context(|| format!("query {index}"))?;
        debug!(index, ?outcome, "evaluated query");
        serde_json::to_writer(&mut *out, &Report { index, outcome })?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Evaluate one query against the built shapes.
pub fn evaluate(built: &BTreeMap<String, VoxelShape>, query: &Query) -> Result<Outcome> {
    let lookup = |name: &str| {
        built
            .get(name)
            .ok_or_else(|| anyhow!("unknown shape `{name}`"))
    };
    let parse_op = |op: &str| {
        op.parse::<BooleanOp>()
            .with_context(|| format!("invalid operator `{op}`"))
    };

    Ok(match query {
        Query::Join { first, second, op } => {
            let op = parse_op(op)?;
            let joined = shapes::join(lookup(first)?, lookup(second)?, op)?;
            Outcome::Join {
                op: op.to_string(),
                empty: joined.is_empty(),
                representation: shapes::kind_name(&joined),
                boxes: joined
                    .to_aabbs()
                    .iter()
                    .map(|b| [b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z])
                    .collect(),
            }
        }
        Query::Exists { first, second, op } => {
            let op = parse_op(op)?;
            Outcome::Exists {
                op: op.to_string(),
                exists: shapes::join_is_not_empty(lookup(first)?, lookup(second)?, op)?,
            }
        }
        Query::Collide {
            axis,
            moving,
            shapes: names,
            distance,
        } => {
            let [min_x, min_y, min_z, max_x, max_y, max_z] = *moving;
            let moving = Aabb::from_corners(
                DVec3::new(min_x, min_y, min_z),
                DVec3::new(max_x, max_y, max_z),
            );
            let candidates = names
                .iter()
                .map(|name| lookup(name))
                .collect::<Result<Vec<_>>>()?;
            Outcome::Collide {
                axis: *axis,
                requested: *distance,
                allowed: shapes::collide(*axis, &moving, candidates, *distance),
            }
        }
        Query::Occludes {
            first,
            second,
            direction,
        } => Outcome::Occludes {
            direction: *direction,
            occludes: shapes::block_occludes(lookup(first)?, lookup(second)?, *direction),
        },
        Query::FaceOccludes {
            first,
            second,
            direction,
        } => {
            let own = shapes::face_shape(lookup(first)?, *direction);
            let other = shapes::face_shape(lookup(second)?, direction.opposite());
            Outcome::FaceOccludes {
                direction: *direction,
                occludes: shapes::face_shape_occludes(&own, &other),
            }
        }
    })
}
