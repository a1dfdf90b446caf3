//! `lumen`: load a scene file, path trace it and write a PPM.

mod cli;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use lumen_core::load::load_scene;
use lumen_renderer::{render, render_parallel, write_ppm};

use crate::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .parse_default_env()
        .init();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the render thread pool")?;
    }

    let loaded = load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    if !loaded.diagnostics.is_empty() {
        warn!("{} scene line(s) skipped", loaded.diagnostics.len());
    }
    let scene = loaded.scene;

    let config = args.render_config();
    let start = Instant::now();
    let image = if args.sequential {
        render(&scene, &config)
    } else {
        render_parallel(&scene, &config)
    };
    info!("Rendered in {:.2?}", start.elapsed());

    write_ppm(&args.output, &image, config.gamma)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
