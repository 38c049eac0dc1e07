//! voxshape - probe for the voxel shape engine
//!
//! Loads a scene of named box-list shapes, runs its queries and prints one JSON line per
//! result on stdout.

mod config;
mod probe;

use anyhow::{Context, Result};
use clap::Parser;
use config::Scene;
use std::{io, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Evaluate voxel shape queries from a scene file", long_about = None)]
struct Args {
    /// Scene file (TOML) with `[shapes.*]` tables and `[[queries]]`
    #[arg(short, long)]
    scene: PathBuf,

    /// Log filter overriding RUST_LOG (e.g. `voxshape_physics=trace`)
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // WARN by default; RUST_LOG or --log can raise it. Logs go to stderr so stdout stays JSON.
    let filter = match &args.log {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Starting voxshape v{}", env!("CARGO_PKG_VERSION"));

    let scene = Scene::load_from_path(&args.scene)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    probe::run(&scene, &mut out)
}
