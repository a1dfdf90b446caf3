use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::RenderConfig;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Render a scene file to a PPM image with a Monte Carlo path tracer")]
pub struct Args {
    /// Scene description file
    pub scene: PathBuf,

    /// Image size as WIDTHxHEIGHT
    #[arg(long, default_value = "512x512", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Rays per pixel, rounded down to a power of four
    #[arg(long, short = 'r', default_value_t = 4)]
    pub rays: u32,

    /// Output gamma
    #[arg(long, short = 'g', default_value_t = 1.0, value_parser = parse_gamma)]
    pub gamma: f64,

    /// Output PPM path
    #[arg(long, short = 'o', default_value = "out.ppm")]
    pub output: PathBuf,

    /// Maximum path depth
    #[arg(long, short = 'd', default_value_t = lumen_renderer::MAX_DEPTH)]
    pub depth: u32,

    /// Seed for every random stream of the render
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Use the single-threaded scanline renderer instead of parallel buckets
    #[arg(long)]
    pub sequential: bool,

    /// Worker threads for the bucket renderer (defaults to all cores)
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// Logging level; RUST_LOG filters still apply on top
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    pub fn render_config(&self) -> RenderConfig {
        let (width, height) = self.size;
        RenderConfig {
            width,
            height,
            rays_per_pixel: self.rays,
            max_depth: self.depth,
            gamma: self.gamma,
            seed: self.seed,
            ..Default::default()
        }
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| match v.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid dimension '{v}' in '{s}'")),
    };
    Ok((parse(w)?, parse(h)?))
}

fn parse_gamma(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(g) if g > 0.0 && g.is_finite() => Ok(g),
        _ => Err(format!("gamma must be a positive number, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert_eq!(parse_size("32X16"), Ok((32, 16)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x480").is_err());
        assert!(parse_size("ax480").is_err());
    }

    #[test]
    fn test_parse_gamma() {
        assert_eq!(parse_gamma("2.2"), Ok(2.2));
        assert!(parse_gamma("0").is_err());
        assert!(parse_gamma("-1").is_err());
        assert!(parse_gamma("inf").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["lumen", "scene.scn"]).unwrap();
        assert_eq!(args.scene, PathBuf::from("scene.scn"));
        assert_eq!(args.output, PathBuf::from("out.ppm"));
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(!args.sequential);
        assert_eq!(args.threads, None);

        let config = args.render_config();
        let default = RenderConfig::default();
        assert_eq!((config.width, config.height), (default.width, default.height));
        assert_eq!(config.rays_per_pixel, default.rays_per_pixel);
        assert_eq!(config.max_depth, default.max_depth);
        assert_eq!(config.gamma, default.gamma);
        assert_eq!(config.seed, default.seed);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "lumen", "in.scn", "--size", "64x32", "--rays", "16", "--gamma", "2.2", "--output", "x.ppm",
            "--depth", "3", "--seed", "7", "--sequential", "--threads", "2", "--log-level", "debug",
        ])
        .unwrap();

        let config = args.render_config();
        assert_eq!((config.width, config.height), (64, 32));
        assert_eq!(config.rays_per_pixel, 16);
        assert_eq!(config.gamma, 2.2);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.seed, 7);
        assert!(args.sequential);
        assert_eq!(args.threads, Some(2));
        assert_eq!(args.output, PathBuf::from("x.ppm"));
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_scene_is_required() {
        assert!(Args::try_parse_from(["lumen"]).is_err());
    }
}
