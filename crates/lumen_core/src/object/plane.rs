use lumen_math::{Aabb, Interval, Ray, Vec3, RAY_MAG};
use rand::RngCore;

use super::{Object, SurfaceHit};
use crate::random::gen_range;
use crate::Material;

/// Infinite plane `normal · p = distance`.
#[derive(Debug, Clone)]
pub struct Plane {
    normal: Vec3,
    distance: f64,
    material: Material,
}

impl Plane {
    /// The normal is normalized; `distance` is measured along it from the
    /// origin. A zero normal produces a plane that is never hit.
    pub fn new(normal: Vec3, distance: f64, material: Material) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            distance,
            material,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }
}

impl Object for Plane {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        let ndotdir = self.normal.dot(ray.direction);
        if ndotdir == 0.0 {
            return None;
        }

        let t = (self.distance - self.normal.dot(ray.origin)) / ndotdir;
        if !ray_t.admits(t) {
            return None;
        }

        Some(SurfaceHit {
            t,
            point: ray.at(t),
            normal: self.normal,
        })
    }

    /// Planes are unbounded.
    fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    /// Uniform point within `RAY_MAG` of the plane's foot point, the
    /// farthest any ray can reach anyway.
    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let foot = self.normal * self.distance;
        if self.normal == Vec3::ZERO {
            return foot;
        }
        let (u, v) = self.normal.any_orthonormal_pair();
        foot + u * gen_range(rng, -RAY_MAG, RAY_MAG) + v * gen_range(rng, -RAY_MAG, RAY_MAG)
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn kind(&self) -> &'static str {
        "plane"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ground() -> Plane {
        Plane::new(Vec3::new(0.0, 2.0, 0.0), -1.0, Material::default())
    }

    #[test]
    fn test_plane_hit() {
        let ray = Ray::new(Vec3::new(0.5, 3.0, 0.0), Vec3::NEG_Y * RAY_MAG);
        let hit = ground().intersect(&ray, Ray::TRAVEL).expect("should hit");

        assert!((hit.point - Vec3::new(0.5, -1.0, 0.0)).length() < 1e-9);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_plane_parallel_and_behind() {
        let plane = ground();

        let parallel = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::X * RAY_MAG);
        assert!(plane.intersect(&parallel, Ray::TRAVEL).is_none());

        let away = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::Y * RAY_MAG);
        assert!(plane.intersect(&away, Ray::TRAVEL).is_none());
    }

    #[test]
    fn test_zero_normal_plane_is_never_hit() {
        let plane = Plane::new(Vec3::ZERO, 1.0, Material::default());
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y * RAY_MAG);
        assert!(plane.intersect(&ray, Ray::TRAVEL).is_none());
    }

    #[test]
    fn test_plane_samples_lie_on_plane() {
        let plane = ground();
        let mut rng = StdRng::seed_from_u64(42);

        assert!(!plane.bounding_box().is_finite());
        for _ in 0..100 {
            let p = plane.sample_surface_point(&mut rng);
            assert!((p.y + 1.0).abs() < 1e-9);
        }
    }
}
