//! Recursive pixel subdivision.
//!
//! A pixel footprint is split into four quadrants, recursively, and the
//! quadrant results are averaged. Leaves shoot one primary ray each.

use lumen_core::random::gen_f64;
use lumen_core::{Camera, Color, Ray};
use rand::RngCore;

/// Estimates radiance along a primary ray.
pub trait Radiance: Sync {
    fn radiance(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color;
}

/// Subdivision depth for a ray budget.
///
/// With `k` the largest integer such that `4^k <= rays_per_pixel`, the
/// depth is `k - 1` (`4^k` leaves). `None` means one sample per pixel.
pub fn calc_subdivision(rays_per_pixel: u32) -> Option<u32> {
    let mut k = 0u32;
    let mut leaves = 4u64;
    while leaves <= u64::from(rays_per_pixel) {
        k += 1;
        leaves *= 4;
    }
    k.checked_sub(1)
}

/// Antialiasing sampler for one camera and estimator.
pub struct PixelSampler<'a, R: Radiance + ?Sized> {
    camera: &'a Camera,
    estimator: &'a R,
    rays_per_pixel: u32,
    depth: Option<u32>,
}

impl<'a, R: Radiance + ?Sized> PixelSampler<'a, R> {
    pub fn new(camera: &'a Camera, estimator: &'a R, rays_per_pixel: u32) -> Self {
        Self {
            camera,
            estimator,
            rays_per_pixel,
            depth: calc_subdivision(rays_per_pixel),
        }
    }

    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// Color of the pixel centred at `(cx, cy)` with footprint `w × h`, in
    /// screen space.
    pub fn pixel_color(&self, cx: f64, cy: f64, w: f64, h: f64, rng: &mut dyn RngCore) -> Color {
        match self.depth {
            Some(depth) => self.average_color(w, h, cx, cy, depth, rng),
            None => self.leaf(w, h, cx, cy, rng),
        }
    }

    /// Unweighted mean of the four quadrants of the footprint. Performs
    /// `4^(depth + 1)` leaf evaluations.
    pub fn average_color(
        &self,
        w: f64,
        h: f64,
        cx: f64,
        cy: f64,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let (qw, qh) = (w / 2.0, h / 2.0);
        let (dx, dy) = (w / 4.0, h / 4.0);

        let mut sum = Color::ZERO;
        for (x, y) in [
            (cx - dx, cy - dy),
            (cx + dx, cy - dy),
            (cx - dx, cy + dy),
            (cx + dx, cy + dy),
        ] {
            sum += if depth == 0 {
                self.leaf(qw, qh, x, y, rng)
            } else {
                self.average_color(qw, qh, x, y, depth - 1, rng)
            };
        }
        sum / 4.0
    }

    fn leaf(&self, w: f64, h: f64, cx: f64, cy: f64, rng: &mut dyn RngCore) -> Color {
        let (mut x, mut y) = (cx, cy);
        if self.rays_per_pixel > 1 {
            x += gen_f64(rng) * w - w / 2.0;
            y += gen_f64(rng) * h - h / 2.0;
        }

        let ray = self.camera.primary_ray(x, y);
        self.estimator.radiance(&ray, rng).min(Color::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Alternates between an over-bright and a dim sample, counting calls.
    struct Alternating {
        calls: AtomicUsize,
    }

    impl Alternating {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl Radiance for Alternating {
        fn radiance(&self, _ray: &Ray, _rng: &mut dyn RngCore) -> Color {
            if self.calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
                Color::splat(2.0)
            } else {
                Color::splat(0.5)
            }
        }
    }

    struct Constant(Color);

    impl Radiance for Constant {
        fn radiance(&self, _ray: &Ray, _rng: &mut dyn RngCore) -> Color {
            self.0
        }
    }

    #[test]
    fn test_calc_subdivision() {
        assert_eq!(calc_subdivision(0), None);
        assert_eq!(calc_subdivision(1), None);
        assert_eq!(calc_subdivision(3), None);
        assert_eq!(calc_subdivision(4), Some(0));
        assert_eq!(calc_subdivision(15), Some(0));
        assert_eq!(calc_subdivision(16), Some(1));
        assert_eq!(calc_subdivision(64), Some(2));
        assert_eq!(calc_subdivision(u32::MAX), Some(14));
    }

    #[test]
    fn test_average_color_leaf_count_and_mean() {
        let camera = Camera::default();
        for depth in 0..3 {
            let estimator = Alternating::new();
            let sampler = PixelSampler::new(&camera, &estimator, 4);
            let mut rng = StdRng::seed_from_u64(42);

            let color = sampler.average_color(0.1, 0.1, 0.0, 0.0, depth, &mut rng);

            assert_eq!(estimator.calls(), 4usize.pow(depth + 1));
            // Leaves clamp 2.0 down to 1.0: mean of 1.0 and 0.5
            assert!((color - Color::splat(0.75)).length() < 1e-12, "{color:?}");
        }
    }

    #[test]
    fn test_single_ray_pixel_uses_one_leaf() {
        let camera = Camera::default();
        let estimator = Alternating::new();
        let sampler = PixelSampler::new(&camera, &estimator, 1);
        let mut rng = StdRng::seed_from_u64(42);

        let color = sampler.pixel_color(0.0, 0.0, 0.1, 0.1, &mut rng);
        assert_eq!(estimator.calls(), 1);
        assert_eq!(color, Color::ONE);
    }

    #[test]
    fn test_pixel_color_sample_count_follows_ray_budget() {
        let camera = Camera::default();
        let estimator = Alternating::new();
        let sampler = PixelSampler::new(&camera, &estimator, 20);
        let mut rng = StdRng::seed_from_u64(42);

        sampler.pixel_color(0.0, 0.0, 0.1, 0.1, &mut rng);
        assert_eq!(sampler.depth(), Some(1));
        assert_eq!(estimator.calls(), 16);
    }

    #[test]
    fn test_leaf_keeps_dark_values() {
        let camera = Camera::default();
        let estimator = Constant(Color::new(0.25, 3.0, 0.0));
        let sampler = PixelSampler::new(&camera, &estimator, 4);
        let mut rng = StdRng::seed_from_u64(42);

        let color = sampler.pixel_color(0.0, 0.0, 0.1, 0.1, &mut rng);
        assert!((color - Color::new(0.25, 1.0, 0.0)).length() < 1e-12);
    }
}
