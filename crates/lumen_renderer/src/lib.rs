//! Lumen Renderer - CPU Monte Carlo path tracing.
//!
//! The pieces, leaves first:
//!
//! - [`brdf`]: diffuse and Phong lobes, evaluation and sampling
//! - [`integrator`]: recursive `trace`/`shade` with direct lighting and a
//!   Russian-roulette bounce
//! - [`sampler`]: recursive pixel subdivision for antialiasing
//! - [`renderer`] and [`bucket`]: sequential scanline and parallel bucket
//!   drivers producing an [`ImageBuffer`]
//! - [`output`]: binary PPM writing and reading

pub mod brdf;
pub mod bucket;
pub mod integrator;
pub mod output;
pub mod renderer;
pub mod sampler;

pub use bucket::{generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use integrator::{shade, trace, PathTracer, MAX_DEPTH};
pub use output::{decode_ppm, encode_ppm, read_ppm, write_ppm, OutputError, OutputResult};
pub use renderer::{color_to_rgb, pixel_footprint, render, render_pixel, ImageBuffer, RenderConfig};
pub use sampler::{calc_subdivision, PixelSampler, Radiance};

pub use lumen_core::Color;
