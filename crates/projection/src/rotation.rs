//! Spherical rotation by yaw, pitch and roll.
//!
//! Angles follow the `[λ, φ, γ]` convention: `λ` spins the globe about the polar
//! axis, `φ` tilts it toward the viewer and `γ` rolls it about the view axis.
//! Rotating by `[-lon, -lat, 0]` brings `(lon, lat)` to the center of the view.

use crate::{asin, wrap_pi};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    degrees: [f64; 3],
    delta_lambda: f64,
    sin_phi: f64,
    cos_phi: f64,
    sin_gamma: f64,
    cos_gamma: f64,
    spins_only: bool,
}

impl Rotation {
    /// Build from `[λ, φ, γ]` in degrees.
    pub fn new(degrees: [f64; 3]) -> Self {
        let [l, p, g] = degrees;
        let (sin_phi, cos_phi) = p.to_radians().sin_cos();
        let (sin_gamma, cos_gamma) = g.to_radians().sin_cos();
        Self {
            degrees,
            delta_lambda: (l % 360.0).to_radians(),
            sin_phi,
            cos_phi,
            sin_gamma,
            cos_gamma,
            spins_only: p == 0.0 && g == 0.0,
        }
    }

    pub fn degrees(&self) -> [f64; 3] {
        self.degrees
    }

    /// Rotate `(λ, φ)` in radians.
    pub fn forward(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let lambda = wrap_pi(lambda + self.delta_lambda);
        if self.spins_only {
            return (lambda, phi);
        }
        let cos_p = phi.cos();
        let x = lambda.cos() * cos_p;
        let y = lambda.sin() * cos_p;
        let z = phi.sin();
        let k = z * self.cos_phi + x * self.sin_phi;
        (
            (y * self.cos_gamma - k * self.sin_gamma).atan2(x * self.cos_phi - z * self.sin_phi),
            asin(k * self.cos_gamma + y * self.sin_gamma),
        )
    }

    /// Undo [`forward`](Self::forward).
    pub fn invert(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let (lambda, phi) = if self.spins_only {
            (lambda, phi)
        } else {
            let cos_p = phi.cos();
            let x = lambda.cos() * cos_p;
            let y = lambda.sin() * cos_p;
            let z = phi.sin();
            let k = z * self.cos_gamma - y * self.sin_gamma;
            (
                (y * self.cos_gamma + z * self.sin_gamma).atan2(x * self.cos_phi + k * self.sin_phi),
                asin(k * self.cos_phi - x * self.sin_phi),
            )
        };
        (wrap_pi(lambda - self.delta_lambda), phi)
    }
}
