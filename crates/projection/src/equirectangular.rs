//! Equirectangular (plate carrée) projection.

use crate::{check_scale, Projection, ProjectionError, Rotation, View, FIT_MARGIN};
use std::f64::consts::{FRAC_PI_2, PI};

#[derive(Debug, Clone, PartialEq)]
pub struct Equirectangular {
    rotation: Rotation,
    scale: f64,
    translate: (f64, f64),
}

impl Equirectangular {
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

    /// Pixels per radian at which the whole map fits the view.
    pub fn fit_scale(view: View) -> f64 {
        let w = view.width as f64 / (2.0 * PI);
        let h = view.height as f64 / PI;
        (w.min(h) * FIT_MARGIN).max(f64::EPSILON)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Projection for Equirectangular {
    fn name(&self) -> &'static str {
        "equirectangular"
    }

    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(lon.is_finite() && lat.is_finite()) {
            return None;
        }
        let (l, p) = self.rotation.forward(lon.to_radians(), lat.to_radians());
        Some((
            self.translate.0 + self.scale * l,
            self.translate.1 - self.scale * p,
        ))
    }

    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let lambda = (x - self.translate.0) / self.scale;
        let phi = (self.translate.1 - y) / self.scale;
        if !(lambda.abs() <= PI && phi.abs() <= FRAC_PI_2) {
            return None;
        }
        let (l, p) = self.rotation.invert(lambda, phi);
        Some((l.to_degrees(), p.to_degrees()))
    }

    fn outline(&self) -> Vec<(f64, f64)> {
        let (cx, cy) = self.translate;
        let (hw, hh) = (self.scale * PI, self.scale * FRAC_PI_2);
        vec![
            (cx - hw, cy - hh),
            (cx + hw, cy - hh),
            (cx + hw, cy + hh),
            (cx - hw, cy + hh),
        ]
    }
}
