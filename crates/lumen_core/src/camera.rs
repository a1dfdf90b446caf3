//! Pinhole camera for primary ray generation.

use lumen_math::{Ray, Vec3, RAY_MAG};

/// Pinhole camera looking from `position` at `target`.
///
/// Screen coordinates run over `y ∈ [-1, 1]` (top is `+1`) and
/// `x ∈ [-aspect, aspect]`; the caller applies the aspect ratio.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    /// Vertical field of view in radians
    fov: f64,

    // Derived basis (set by update_basis())
    forward: Vec3,
    right: Vec3,
    true_up: Vec3,
    half_height: f64,
}

impl Camera {
    pub const DEFAULT_FOV_DEG: f64 = 45.0;

    pub fn new(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            position,
            target,
            fov: Self::DEFAULT_FOV_DEG.to_radians(),
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            true_up: Vec3::Y,
            half_height: 1.0,
        };
        camera.update_basis();
        camera
    }

    /// Set the vertical field of view.
    pub fn with_fov_degrees(mut self, degrees: f64) -> Self {
        self.fov = degrees.to_radians();
        self.update_basis();
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn fov_degrees(&self) -> f64 {
        self.fov.to_degrees()
    }

    fn update_basis(&mut self) {
        self.forward = (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z);
        self.right = match self.forward.cross(Vec3::Y).try_normalize() {
            Some(right) => right,
            // Looking straight up or down
            None => self.forward.any_orthonormal_vector(),
        };
        self.true_up = self.right.cross(self.forward);
        self.half_height = (self.fov * 0.5).tan();
    }

    /// Primary ray through screen point `(x, y)`, scaled to `RAY_MAG`.
    pub fn primary_ray(&self, x: f64, y: f64) -> Ray {
        let dir = self.forward
            + self.right * (x * self.half_height)
            + self.true_up * (y * self.half_height);
        Ray::new(self.position, dir.normalize() * RAY_MAG)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, -7.0));
        let ray = camera.primary_ray(0.0, 0.0);

        assert_eq!(ray.origin, camera.position());
        assert!((ray.direction.normalize() - Vec3::NEG_Z).length() < 1e-12);
        assert!((ray.direction.length() - RAY_MAG).abs() < 1e-9);
    }

    #[test]
    fn test_screen_axes() {
        let camera = Camera::default();

        let top = camera.primary_ray(0.0, 1.0);
        assert!(top.direction.y > 0.0);

        let right = camera.primary_ray(1.0, 0.0);
        assert!(right.direction.x > 0.0);
    }

    #[test]
    fn test_fov_edge_angle() {
        let camera = Camera::default().with_fov_degrees(90.0);
        let edge = camera.primary_ray(0.0, 1.0).direction.normalize();
        let angle = edge.angle_between(Vec3::NEG_Z).to_degrees();
        assert!((angle - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_looking_straight_down_is_valid() {
        let camera = Camera::new(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        let ray = camera.primary_ray(0.3, -0.2);
        assert!(ray.direction.is_finite());
        assert!(ray.direction.y < 0.0);
    }
}
