//! Intersectable scene objects.
//!
//! Each variant implements [`Object`]; the scene stores them as
//! `Box<dyn Object>` and addresses them by [`ObjectId`].

mod light;
mod mesh;
mod plane;
mod sphere;
mod sphereflake;

pub use light::PointLight;
pub use mesh::{Face, Mesh, MeshPrimitive, Vertex};
pub use plane::Plane;
pub use sphere::Sphere;
pub use sphereflake::SphereFlake;

use std::fmt;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::Material;

/// Index of an object inside its [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric part of a hit, as reported by a single object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Ray parameter of the hit
    pub t: f64,
    /// World-space hit point
    pub point: Vec3,
    /// Unit shading normal (not yet flipped toward the ray)
    pub normal: Vec3,
}

/// Nearest hit of a scene query, tagged with the object that produced it.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    pub t: f64,
    pub point: Vec3,
    pub normal: Vec3,
    pub object: &'a dyn Object,
    pub id: ObjectId,
}

impl<'a> Intersection<'a> {
    pub fn new(hit: SurfaceHit, object: &'a dyn Object, id: ObjectId) -> Self {
        Self {
            t: hit.t,
            point: hit.point,
            normal: hit.normal,
            object,
            id,
        }
    }

    pub fn material(&self) -> &'a Material {
        self.object.material()
    }
}

impl fmt::Debug for Intersection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intersection")
            .field("t", &self.t)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("id", &self.id)
            .finish()
    }
}

/// Capability set shared by every scene primitive.
pub trait Object: Send + Sync {
    /// Nearest hit with `t` admitted by `ray_t`, if any. Never mutates.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit>;

    /// Box enclosing every point the object can be hit at.
    fn bounding_box(&self) -> Aabb;

    /// A point on the surface, used as a light sample.
    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> Vec3;

    fn material(&self) -> &Material;

    fn is_emissive(&self) -> bool {
        self.material().is_emissive()
    }

    /// Short type name for logging.
    fn kind(&self) -> &'static str;
}
