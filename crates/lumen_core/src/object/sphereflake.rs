//! Recursive sphere cluster ("sphereflake").
//!
//! Every sphere carries nine children of a third of its radius: six around
//! its equator and three on the upper cap, where "up" is the direction away
//! from the parent. The whole subtree of a sphere of radius `r` fits in a
//! sphere of radius `2r` around its center, which is used as a cull volume.

use std::f64::consts::{FRAC_PI_3, TAU};

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use super::sphere::{hit_sphere, segment_touches_sphere};
use super::{Object, SurfaceHit};
use crate::random::random_unit_vector;
use crate::Material;

const EQUATOR_CHILDREN: usize = 6;
const CAP_CHILDREN: usize = 3;
const CAP_ELEVATION_DEG: f64 = 50.0;

#[derive(Debug, Clone)]
struct FlakeNode {
    center: Vec3,
    radius: f64,
    children: Vec<FlakeNode>,
}

impl FlakeNode {
    fn build(center: Vec3, radius: f64, up: Vec3, iterations: u32) -> Self {
        let children = if iterations == 0 {
            Vec::new()
        } else {
            let child_radius = radius / 3.0;
            let offset = radius + child_radius;
            child_directions(up)
                .into_iter()
                .map(|dir| FlakeNode::build(center + dir * offset, child_radius, dir, iterations - 1))
                .collect()
        };
        Self {
            center,
            radius,
            children,
        }
    }

    fn bound_radius(&self) -> f64 {
        self.radius * 2.0
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(FlakeNode::count).sum::<usize>()
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval, nearest: &mut Option<SurfaceHit>) {
        let range = match nearest {
            Some(hit) => ray_t.with_max(hit.t),
            None => ray_t,
        };
        if !segment_touches_sphere(self.center, self.bound_radius(), ray, range) {
            return;
        }

        if let Some(hit) = hit_sphere(self.center, self.radius, ray, range) {
            if nearest.map_or(true, |n| hit.t < n.t) {
                *nearest = Some(hit);
            }
        }
        for child in &self.children {
            child.intersect(ray, ray_t, nearest);
        }
    }
}

/// Unit directions of the nine children around `up`.
fn child_directions(up: Vec3) -> Vec<Vec3> {
    let (u, v) = up.any_orthonormal_pair();

    let equator = (0..EQUATOR_CHILDREN).map(|k| {
        let phi = TAU * k as f64 / EQUATOR_CHILDREN as f64;
        u * phi.cos() + v * phi.sin()
    });

    let elevation = CAP_ELEVATION_DEG.to_radians();
    let cap = (0..CAP_CHILDREN).map(move |k| {
        // Rotated half a step so cap spheres sit between equator spheres
        let phi = FRAC_PI_3 * 0.5 + TAU * k as f64 / CAP_CHILDREN as f64;
        (u * phi.cos() + v * phi.sin()) * elevation.cos() + up * elevation.sin()
    });

    equator.chain(cap).collect()
}

/// A base sphere plus recursively nested children.
#[derive(Debug, Clone)]
pub struct SphereFlake {
    root: FlakeNode,
    iterations: u32,
    material: Material,
}

impl SphereFlake {
    pub fn new(center: Vec3, radius: f64, iterations: u32, material: Material) -> Self {
        Self {
            root: FlakeNode::build(center, radius.abs(), Vec3::Y, iterations),
            iterations,
            material,
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Total number of spheres in the cluster.
    pub fn sphere_count(&self) -> usize {
        self.root.count()
    }
}

impl Object for SphereFlake {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        if self.root.radius == 0.0 {
            return None;
        }
        let mut nearest = None;
        self.root.intersect(ray, ray_t, &mut nearest);
        nearest
    }

    fn bounding_box(&self) -> Aabb {
        let extent = Vec3::splat(self.root.bound_radius());
        Aabb::from_points(self.root.center - extent, self.root.center + extent)
    }

    /// Samples cover the base sphere only.
    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.root.center + random_unit_vector(rng) * self.root.radius
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn kind(&self) -> &'static str {
        "sphereflake"
    }
}
