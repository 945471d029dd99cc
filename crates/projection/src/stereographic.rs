//! Stereographic projection, clipped short of the antipode of the center.

use crate::{check_scale, circle, Projection, ProjectionError, Rotation, View, FIT_MARGIN};

/// Angular distance from the center beyond which nothing is drawn.
const CLIP_ANGLE_DEGREES: f64 = 160.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Stereographic {
    rotation: Rotation,
    scale: f64,
    translate: (f64, f64),
}

impl Stereographic {
    pub fn new(
        rotate: [f64; 3],
        scale: f64,
        translate: (f64, f64),
    ) -> Result<Self, ProjectionError> {
        check_scale(scale)?;
        Ok(Self {
            rotation: Rotation::new(rotate),
            scale,
            translate,
        })
    }

    /// Scale at which the near hemisphere fits the view.
    pub fn fit_scale(view: View) -> f64 {
        (view.width.min(view.height) as f64 / 2.0 * FIT_MARGIN).max(1.0)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn clip_radius() -> f64 {
        (CLIP_ANGLE_DEGREES.to_radians() / 2.0).tan()
    }
}

impl Projection for Stereographic {
    fn name(&self) -> &'static str {
        "stereographic"
    }

    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(lon.is_finite() && lat.is_finite()) {
            return None;
        }
        let (l, p) = self.rotation.forward(lon.to_radians(), lat.to_radians());
        let cos_p = p.cos();
        let k = 1.0 + cos_p * l.cos();
        if k < 1e-9 {
            return None;
        }
        let x = cos_p * l.sin() / k;
        let y = p.sin() / k;
        Some((
            self.translate.0 + self.scale * x,
            self.translate.1 - self.scale * y,
        ))
    }

    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let px = (x - self.translate.0) / self.scale;
        let py = (self.translate.1 - y) / self.scale;
        let rho = px.hypot(py);
        if rho.is_nan() || rho > Self::clip_radius() {
            return None;
        }
        let c = 2.0 * rho.atan();
        let (sin_c, cos_c) = c.sin_cos();
        let lambda = (px * sin_c).atan2(rho * cos_c);
        let phi = if rho > 0.0 {
            crate::asin(py * sin_c / rho)
        } else {
            0.0
        };
        let (l, p) = self.rotation.invert(lambda, phi);
        Some((l.to_degrees(), p.to_degrees()))
    }

    fn outline(&self) -> Vec<(f64, f64)> {
        circle(self.translate, self.scale * Self::clip_radius())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_at_unit_radius() {
        let p = Stereographic::new([0.0; 3], 100.0, (0.0, 0.0)).unwrap();
        let (x, y) = p.project(90.0, 0.0).unwrap();
        assert!((x - 100.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_antipode_is_singular() {
        let p = Stereographic::new([0.0; 3], 100.0, (0.0, 0.0)).unwrap();
        assert!(p.project(180.0, 0.0).is_none());
    }

    #[test]
    fn test_round_trip_within_clip() {
        let p = Stereographic::new([20.0, -40.0, 0.0], 150.0, (200.0, 200.0)).unwrap();
        let (x, y) = p.project(-10.0, 50.0).unwrap();
        let (lon, lat) = p.invert(x, y).unwrap();
        assert!((lon + 10.0).abs() < 1e-6);
        assert!((lat - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_invert_beyond_clip_is_none() {
        let p = Stereographic::new([0.0; 3], 10.0, (0.0, 0.0)).unwrap();
        assert!(p.invert(10.0 * Stereographic::clip_radius() + 1.0, 0.0).is_none());
    }
}
