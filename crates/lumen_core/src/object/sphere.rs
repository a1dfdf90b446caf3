use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use super::{Object, SurfaceHit};
use crate::random::random_unit_vector;
use crate::Material;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: Material,
}

impl Sphere {
    /// Create a new sphere. Negative radii are taken by magnitude.
    pub fn new(center: Vec3, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius: radius.abs(),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Ray/sphere test shared with the fractal cluster.
///
/// The ray direction is not assumed to be unit length.
pub(crate) fn hit_sphere(center: Vec3, radius: f64, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    // Nearest root in range
    let mut root = (-half_b - sqrtd) / a;
    if !ray_t.admits(root) {
        root = (-half_b + sqrtd) / a;
        if !ray_t.admits(root) {
            return None;
        }
    }

    let point = ray.at(root);
    Some(SurfaceHit {
        t: root,
        point,
        normal: (point - center) / radius,
    })
}

/// True if the ray segment inside `ray_t` touches the sphere's volume.
pub(crate) fn segment_touches_sphere(center: Vec3, radius: f64, ray: &Ray, ray_t: Interval) -> bool {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    if a == 0.0 {
        return oc.length_squared() <= radius * radius;
    }
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return false;
    }
    let sqrtd = discriminant.sqrt();
    let t0 = (-half_b - sqrtd) / a;
    let t1 = (-half_b + sqrtd) / a;
    t1 >= ray_t.min && t0 <= ray_t.max
}

impl Object for Sphere {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        if self.radius == 0.0 {
            return None;
        }
        hit_sphere(self.center, self.radius, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }

    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.center + random_unit_vector(rng) * self.radius
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn kind(&self) -> &'static str {
        "sphere"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::RAY_MAG;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0, Material::default())
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z * RAY_MAG);
        let hit = unit_sphere().intersect(&ray, Ray::TRAVEL).expect("should hit");

        assert!((hit.point - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-9);
        assert!((hit.normal - Vec3::Z).length() < 1e-9);
        assert!((hit.t - 4.0 / RAY_MAG).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X * RAY_MAG);
        let hit = unit_sphere().intersect(&ray, Ray::TRAVEL).expect("should hit");
        assert!((hit.point - Vec3::X).length() < 1e-9);
    }

    #[test]
    fn test_sphere_miss_and_out_of_range() {
        let sphere = unit_sphere();

        let beside = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z * RAY_MAG);
        assert!(sphere.intersect(&beside, Ray::TRAVEL).is_none());

        // Direction length 2 cannot reach a surface 4 units away
        let short = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z * 2.0);
        assert!(sphere.intersect(&short, Ray::TRAVEL).is_none());
    }

    #[test]
    fn test_sphere_bounding_box_and_samples() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5, Material::default());
        let bbox = sphere.bounding_box();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let p = sphere.sample_surface_point(&mut rng);
            assert!(((p - sphere.center()).length() - 0.5).abs() < 1e-9);
            assert!(bbox.contains_point(p));
        }
    }
}
