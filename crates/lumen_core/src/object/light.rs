use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use super::{Object, SurfaceHit};
use crate::{Color, Material};

/// Zero-extent emitter. Lights the scene but can never be hit.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Vec3,
    material: Material,
}

impl PointLight {
    /// The light color becomes the material's emission.
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position,
            material: Material::emissive(color),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn color(&self) -> Color {
        self.material.ke
    }
}

impl Object for PointLight {
    fn intersect(&self, _ray: &Ray, _ray_t: Interval) -> Option<SurfaceHit> {
        None
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.position, self.position)
    }

    fn sample_surface_point(&self, _rng: &mut dyn RngCore) -> Vec3 {
        self.position
    }

    fn material(&self) -> &Material {
        &self.material
    }

    /// Explicit lights count as emissive even when their color is black.
    fn is_emissive(&self) -> bool {
        true
    }

    fn kind(&self) -> &'static str {
        "point light"
    }
}
