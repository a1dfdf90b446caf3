//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Each bucket draws from its own random
//! stream, seeded from the render seed and the bucket's index, so the image
//! does not depend on thread scheduling.

use log::{debug, info};
use lumen_core::{Color, Scene};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::integrator::PathTracer;
use crate::renderer::{render_pixel, ImageBuffer, RenderConfig};
use crate::sampler::{PixelSampler, Radiance};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Seed of this bucket's random stream.
    pub fn seed(&self, base: u64) -> u64 {
        base ^ (self.index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Indices follow the sorted order. A zero `bucket_size` is treated as one.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x = x.saturating_add(bucket_size);
        }
        y = y.saturating_add(bucket_size);
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance of their centre from the image centre.
///
/// The sort is stable, so equidistant buckets keep row-major order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;

    let dist = |b: &Bucket| {
        let bx = f64::from(b.x) + f64::from(b.width) / 2.0;
        let by = f64::from(b.y) + f64::from(b.height) / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
}

/// Render a single bucket.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket<R: Radiance + ?Sized>(
    bucket: &Bucket,
    sampler: &PixelSampler<'_, R>,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count());

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(sampler, bucket.x + local_x, bucket.y + local_y, config, rng);
            pixels.push(color);
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into place.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (i, color) in self.pixels.iter().enumerate() {
            let x = self.bucket.x + (i % width) as u32;
            let y = self.bucket.y + (i / width) as u32;
            image.set(x, y, *color);
        }
    }
}

/// Render the image with buckets distributed over the rayon pool.
pub fn render_parallel(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let tracer = PathTracer::new(scene, config.max_depth);
    let sampler = PixelSampler::new(scene.camera(), &tracer, config.rays_per_pixel);
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);

    info!(
        "Rendering {}x{} in {} buckets on {} threads, {} rays/pixel, depth {}",
        config.width,
        config.height,
        buckets.len(),
        rayon::current_num_threads(),
        config.rays_per_pixel,
        config.max_depth
    );

    // Built up front so the first query does not race
    scene.index();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket.seed(config.seed));
            let pixels = render_bucket(bucket, &sampler, config, &mut rng);
            debug!("Bucket {} done ({}x{} at {},{})", bucket.index, bucket.width, bucket.height, bucket.x, bucket.y);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        result.write_into(&mut image);
    }
    image
}
