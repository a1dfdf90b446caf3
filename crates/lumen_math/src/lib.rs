//! Lumen math - double precision vectors, rays and bounding volumes.
//!
//! Everything downstream works in `f64`; the glam double precision types are
//! re-exported under the short names used throughout the workspace.

pub use glam::{DQuat as Quat, DVec3 as Vec3};

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Transform;

/// Smallest accepted hit distance; keeps secondary rays off their own surface.
pub const EPSILON: f64 = 1e-6;

/// Magnitude primary and bounce directions are scaled to.
///
/// A ray's direction length is its maximum travel distance, so every hit
/// lives in `t ∈ (EPSILON, 1]`.
pub const RAY_MAG: f64 = 1000.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_is_double_precision() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let sum: f64 = v.x + v.y + v.z;
        assert_eq!(sum, 6.0);
    }

    #[test]
    fn test_travel_range_covers_ray_magnitude() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z * RAY_MAG);
        assert_eq!(ray.at(Ray::TRAVEL.max), Vec3::new(0.0, 0.0, -RAY_MAG));
        assert!(!Ray::TRAVEL.admits(0.0));
    }
}
