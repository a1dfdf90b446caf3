//! Scanline renderer and the linear image buffer.
//!
//! Pixels map to screen space with `x` in `[-aspect, aspect]` growing right
//! and `y` in `[-1, 1]` growing up. Each pixel is resolved by the
//! [`PixelSampler`] over the path integrator.

use log::{debug, info};
use lumen_core::{Color, Scene};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::integrator::{PathTracer, MAX_DEPTH};
use crate::sampler::{PixelSampler, Radiance};

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Ray budget per pixel; rounded down to a power of four
    pub rays_per_pixel: u32,
    /// Maximum path depth
    pub max_depth: u32,
    /// Output gamma, applied when quantising
    pub gamma: f64,
    /// Base seed for every random stream of the render
    pub seed: u64,
    /// Tile edge for the parallel renderer
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            rays_per_pixel: 4,
            max_depth: MAX_DEPTH,
            gamma: 1.0,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Screen-space centre and footprint `(cx, cy, w, h)` of pixel `(x, y)`.
pub fn pixel_footprint(x: u32, y: u32, width: u32, height: u32) -> (f64, f64, f64, f64) {
    let (w, h) = (f64::from(width), f64::from(height));
    let aspect = w / h;
    let cx = (2.0 * (f64::from(x) + 0.5) / w - 1.0) * aspect;
    let cy = 1.0 - 2.0 * (f64::from(y) + 0.5) / h;
    (cx, cy, 2.0 / w * aspect, 2.0 / h)
}

/// Render a single pixel.
pub fn render_pixel<R: Radiance + ?Sized>(
    sampler: &PixelSampler<'_, R>,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let (cx, cy, w, h) = pixel_footprint(x, y, config.width, config.height);
    sampler.pixel_color(cx, cy, w, h, rng)
}

/// Quantise a linear color: `c^(1/gamma) * 255`, truncated and clamped.
pub fn color_to_rgb(color: Color, gamma: f64) -> [u8; 3] {
    let inv_gamma = 1.0 / gamma;
    let quantise = |c: f64| (c.max(0.0).powf(inv_gamma) * 255.0) as i64;
    [
        quantise(color.x).clamp(0, 255) as u8,
        quantise(color.y).clamp(0, 255) as u8,
        quantise(color.z).clamp(0, 255) as u8,
    ]
}

/// Linear color image, row-major from the top-left pixel.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    /// Packed 8-bit RGB triples after gamma.
    pub fn to_rgb8(&self, gamma: f64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color, gamma));
        }
        bytes
    }
}

/// Render the whole image in scanline order on the calling thread.
///
/// A single random stream seeded from `config.seed` drives every pixel, so
/// the result depends only on the scene and the config.
pub fn render(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let tracer = PathTracer::new(scene, config.max_depth);
    let sampler = PixelSampler::new(scene.camera(), &tracer, config.rays_per_pixel);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut image = ImageBuffer::new(config.width, config.height);

    info!(
        "Rendering {}x{} scanlines, {} rays/pixel, depth {}",
        config.width, config.height, config.rays_per_pixel, config.max_depth
    );

    for y in 0..config.height {
        for x in 0..config.width {
            let color = render_pixel(&sampler, x, y, config, &mut rng);
            image.set(x, y, color);
        }
        debug!("Scanline {}/{}", y + 1, config.height);
    }

    image
}
