//! Sampling helpers over an explicit random stream.
//!
//! Every function takes `&mut dyn RngCore` so callers decide seeding and
//! ownership (one stream per render task).

use lumen_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform f64 in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform f64 in [min, max).
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + (max - min) * gen_f64(rng)
}

/// Point inside the unit ball by rejection; near-zero points are rejected
/// too so the result can always be normalized.
pub fn random_in_unit_ball(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
        );
        let len_sq = p.length_squared();
        if len_sq > 1e-12 && len_sq <= 1.0 {
            return p;
        }
    }
}

/// Uniformly distributed unit vector.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    random_in_unit_ball(rng).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_range_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let v = gen_range(&mut rng, -2.0, 3.0);
            assert!((-2.0..3.0).contains(&v));
        }
    }

    #[test]
    fn test_unit_vectors_are_unit() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            assert!((random_unit_vector(&mut rng).length() - 1.0).abs() < 1e-9);
            assert!(random_in_unit_ball(&mut rng).length() <= 1.0);
        }
    }
}
