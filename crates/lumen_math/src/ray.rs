use crate::{Interval, Vec3, EPSILON};

/// A ray with an origin and an unnormalized direction.
///
/// The direction's length carries the maximum travel distance, so hits are
/// searched for in [`Ray::TRAVEL`] rather than an open-ended range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Valid hit parameters: `(EPSILON, 1]`.
    pub const TRAVEL: Interval = Interval::new(EPSILON, 1.0);

    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_direction_is_not_normalized() {
        let ray = Ray::new(Vec3::ONE, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(ray.at(0.5), Vec3::new(1.0, 1.0, -4.0));
    }
}
