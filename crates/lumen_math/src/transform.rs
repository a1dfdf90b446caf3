use crate::{Quat, Vec3};

/// Instancing transform, applied as scale, then rotate, then translate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Rotation of `degrees` about `axis`. A zero axis yields no rotation.
    pub fn axis_angle_degrees(axis: Vec3, degrees: f64) -> Quat {
        match axis.try_normalize() {
            Some(axis) => Quat::from_axis_angle(axis, degrees.to_radians()),
            None => Quat::IDENTITY,
        }
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.translation
    }

    /// Normals only follow the rotation, then get renormalized.
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        (self.rotation * n).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_point_order_is_scale_rotate_translate() {
        let transform = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Transform::axis_angle_degrees(Vec3::Z, 90.0),
            Vec3::new(2.0, 1.0, 1.0),
        );

        // (1,0,0) -> scale (2,0,0) -> rotate (0,2,0) -> translate (10,2,0)
        let p = transform.transform_point(Vec3::X);
        assert!(approx(p, Vec3::new(10.0, 2.0, 0.0)));

        let srt = glam::DMat4::from_scale_rotation_translation(
            transform.scale,
            transform.rotation,
            transform.translation,
        );
        assert!(approx(srt.transform_point3(Vec3::X), p));
    }

    #[test]
    fn test_normals_ignore_scale_and_translation() {
        let transform = Transform::new(
            Vec3::splat(5.0),
            Transform::axis_angle_degrees(Vec3::X, 90.0),
            Vec3::splat(3.0),
        );
        let n = transform.transform_normal(Vec3::Y);
        assert!(approx(n, Vec3::Z));
    }

    #[test]
    fn test_zero_axis_means_identity() {
        assert_eq!(Transform::axis_angle_degrees(Vec3::ZERO, 45.0), Quat::IDENTITY);
    }
}
