//! Lumen Core - scene description for the Lumen path tracer.
//!
//! This crate provides:
//!
//! - **Objects**: `Sphere`, `Plane`, `Mesh`, `PointLight`, `SphereFlake`, all
//!   behind the [`Object`] trait
//! - **Scene**: object storage, light list, camera and the lazily built
//!   [`SpatialIndex`] answering nearest-hit queries
//! - **Loading**: the line-oriented scene and mesh file formats
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::load::load_scene;
//!
//! let loaded = load_scene("scenes/demo.scn")?;
//! for diag in &loaded.diagnostics {
//!     eprintln!("{diag}");
//! }
//! let hit = loaded.scene.intersection(&loaded.scene.camera().primary_ray(0.0, 0.0));
//! ```

pub mod bvh;
pub mod camera;
pub mod load;
pub mod material;
pub mod object;
pub mod random;
pub mod scene;

pub use bvh::SpatialIndex;
pub use camera::Camera;
pub use material::{Color, Material};
pub use object::{
    Face, Intersection, Mesh, MeshPrimitive, Object, ObjectId, Plane, PointLight, Sphere,
    SphereFlake, SurfaceHit, Vertex,
};
pub use scene::Scene;

pub use lumen_math::{Aabb, Interval, Ray, Transform, Vec3, EPSILON, RAY_MAG};
