//! Recursive path integrator.
//!
//! `trace` finds the nearest hit and hands it to `shade`, which adds
//! ambient, emission and direct light from every light, then continues the
//! path with at most one bounce chosen by Russian roulette over the
//! material's diffuse and specular weights.

use log::trace as log_trace;
use lumen_core::random::gen_f64;
use lumen_core::{Color, Intersection, Ray, Scene, RAY_MAG};
use rand::RngCore;

use crate::brdf::{lambert, phong, reflect, sample_lambert, sample_phong};
use crate::sampler::Radiance;

/// Default recursion depth for primary rays.
pub const MAX_DEPTH: u32 = 5;

/// Radiance arriving along `ray`. Black once `depth` reaches zero or when
/// nothing is hit.
pub fn trace(scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    match scene.intersection(ray) {
        Some(hit) => shade(scene, ray, &hit, depth, rng),
        None => Color::ZERO,
    }
}

/// Outgoing radiance at `hit` toward the origin of `ray`.
pub fn shade(
    scene: &Scene,
    ray: &Ray,
    hit: &Intersection<'_>,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let material = hit.material();
    let p = hit.point;

    let mut n = hit.normal;
    if n.dot(ray.direction) > 0.0 {
        n = -n;
    }
    let v = (ray.origin - p).normalize_or_zero();

    let mut color = scene.ambient() * material.kd + material.ke;

    // Direct lighting
    for &light_id in scene.lights() {
        let Some(light) = scene.object(light_id) else {
            continue;
        };
        let target = light.sample_surface_point(rng);
        let shadow = Ray::new(p, target - p);
        if scene.intersection_excluding(&shadow, Some(light_id)).is_some() {
            continue;
        }

        let Some(l) = shadow.direction.try_normalize() else {
            continue;
        };
        let lr = reflect(l, n);
        let diffuse = n.dot(l).max(0.0);
        let specular = lr.dot(v).max(0.0).powf(material.specexp);

        color += (material.kd * diffuse + material.ks * specular) * light.material().ke;
    }

    // Indirect bounce
    let avg_diff = material.avg_kd();
    let avg_spec = material.avg_ks();
    let range = (avg_diff + avg_spec).max(1.0);
    let u = gen_f64(rng) * range;

    if u < avg_diff {
        let dir = sample_lambert(n, rng);
        if gen_f64(rng) <= lambert(dir, n) {
            let bounce = Ray::new(p, dir * RAY_MAG);
            color += trace(scene, &bounce, depth - 1, rng) * material.kd / avg_diff;
        }
    } else if u < avg_diff + avg_spec {
        let dir = sample_phong(-ray.direction, n, material.specexp, rng);
        let pdf = phong(dir, -ray.direction.normalize_or_zero(), n, material.specexp);
        if gen_f64(rng) <= pdf {
            let bounce = Ray::new(p, dir * RAY_MAG);
            color += trace(scene, &bounce, depth - 1, rng) * material.ks / avg_spec;
        }
    }

    log_trace!("shade {} depth {} -> {:?}", hit.id, depth, color);
    color
}

/// The integrator as a [`Radiance`] estimator for the pixel sampler.
pub struct PathTracer<'s> {
    scene: &'s Scene,
    max_depth: u32,
}

impl<'s> PathTracer<'s> {
    pub fn new(scene: &'s Scene, max_depth: u32) -> Self {
        Self { scene, max_depth }
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

impl Radiance for PathTracer<'_> {
    fn radiance(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        trace(self.scene, ray, self.max_depth, rng)
    }
}
