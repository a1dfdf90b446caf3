//! Surface reflectance parameters.

use lumen_math::Vec3;

/// RGB color, one linear channel per component.
pub type Color = Vec3;

/// Diffuse + Phong specular material with optional emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse reflectance
    pub kd: Color,
    /// Specular reflectance
    pub ks: Color,
    /// Emission; any positive channel turns the owner into a light
    pub ke: Color,
    /// Phong exponent
    pub specexp: f64,
    /// Reflective coefficient. Parsed and carried, not used by the integrator.
    pub kr: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Color::splat(0.5),
            ks: Color::ZERO,
            ke: Color::ZERO,
            specexp: 50.0,
            kr: 0.0,
        }
    }
}

impl Material {
    /// Pure diffuse material.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd,
            ..Default::default()
        }
    }

    /// Pure emitter with no reflectance.
    pub fn emissive(ke: Color) -> Self {
        Self {
            kd: Color::ZERO,
            ke,
            ..Default::default()
        }
    }

    pub fn with_specular(mut self, ks: Color, specexp: f64) -> Self {
        self.ks = ks;
        self.specexp = specexp;
        self
    }

    pub fn with_emission(mut self, ke: Color) -> Self {
        self.ke = ke;
        self
    }

    pub fn is_emissive(&self) -> bool {
        self.ke.cmpgt(Color::ZERO).any()
    }

    /// Channel mean of `kd`.
    pub fn avg_kd(&self) -> f64 {
        channel_mean(self.kd)
    }

    /// Channel mean of `ks`.
    pub fn avg_ks(&self) -> f64 {
        channel_mean(self.ks)
    }
}

fn channel_mean(c: Color) -> f64 {
    (c.x + c.y + c.z) / 3.0
}
