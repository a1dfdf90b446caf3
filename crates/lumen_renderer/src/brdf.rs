//! Reflectance lobes: Lambertian diffuse and Phong specular.
//!
//! Directions point away from the surface. `indir` is toward the light (or
//! the next bounce), `outdir` toward the viewer.

use std::f64::consts::TAU;

use lumen_core::random::{gen_f64, random_unit_vector};
use lumen_math::{Vec3, EPSILON};
use rand::RngCore;

/// Mirror `l` about `n`: `2(l·n)n - l`.
#[inline]
pub fn reflect(l: Vec3, n: Vec3) -> Vec3 {
    n * (2.0 * l.dot(n)) - l
}

/// `max(0, n·indir)`
pub fn lambert(indir: Vec3, n: Vec3) -> f64 {
    n.dot(indir).max(0.0)
}

/// Uniform direction on the sphere, flipped into the hemisphere of `n`.
///
/// Not cosine weighted; the integrator's accept step against [`lambert`]
/// supplies the cosine.
pub fn sample_lambert(n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let dir = random_unit_vector(rng);
    if dir.dot(n) < 0.0 {
        -dir
    } else {
        dir
    }
}

/// `max(0, reflect(indir, n)·outdir)^specexp`
pub fn phong(indir: Vec3, outdir: Vec3, n: Vec3, specexp: f64) -> f64 {
    let s = reflect(indir, n).dot(outdir);
    if s < 0.0 {
        return 0.0;
    }
    s.powf(specexp)
}

/// Draw a direction from the Phong lobe around the mirror direction of
/// `outdir`.
///
/// The lobe axis is `j` of a local `(i, j, k)` frame:
/// - general case: `j` is the mirror direction, `i = normalize(v × r)`
/// - grazing view (`|n·v| < ε`): `k = -v`, `j = n`
/// - view along the normal: any frame around the mirror direction
pub fn sample_phong(outdir: Vec3, n: Vec3, specexp: f64, rng: &mut dyn RngCore) -> Vec3 {
    let ldir = outdir.normalize_or_zero();
    let mirror = reflect(ldir, n);
    let ndotl = ldir.dot(n);

    let (i, j, k) = if 1.0 - ndotl > EPSILON {
        if ndotl.abs() < EPSILON {
            let k = -ldir;
            let j = n;
            (j.cross(k), j, k)
        } else {
            let i = ldir.cross(mirror).normalize_or_zero();
            let j = mirror;
            (i, j, mirror.cross(i))
        }
    } else {
        let j = mirror.normalize_or_zero();
        let (i, k) = j.any_orthonormal_pair();
        (i, j, k)
    };

    let phi = gen_f64(rng).powf(1.0 / (specexp + 1.0)).acos();
    let theta = TAU * gen_f64(rng);
    let local = Vec3::new(theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());

    i * local.x + j * local.y + k * local.z
}
