//! Map projections for the interactive globe.
//!
//! Implements projections from scratch without external dependencies. Every
//! projection maps `(longitude, latitude)` in degrees to screen pixels (y down) and
//! back, and exposes the outline of the sphere under the projection so the mask
//! builder can rasterize the visible region.

pub mod bounds;
pub mod distortion;
pub mod equirectangular;
pub mod orthographic;
pub mod rotation;
pub mod stereographic;

pub use bounds::{View, ViewBounds};
pub use distortion::{distort, distortion};
pub use equirectangular::Equirectangular;
pub use orthographic::Orthographic;
pub use rotation::Rotation;
pub use stereographic::Stereographic;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Number of vertices used to approximate circular outlines.
const OUTLINE_SEGMENTS: usize = 360;

/// Fraction of the view the default scale fills.
const FIT_MARGIN: f64 = 0.9;

/// Errors from constructing projections.
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("projection scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("view must have positive size, got {0}x{1}")]
    InvalidView(usize, usize),

    #[error("unknown projection: {0}")]
    UnknownProjection(String),

    #[error("invalid orientation '{0}', expected \"lon,lat[,scale]\"")]
    InvalidOrientation(String),
}

/// A map projection from geographic degrees to screen pixels.
pub trait Projection: Send + Sync + fmt::Debug {
    /// Short identifier, e.g. "orthographic".
    fn name(&self) -> &'static str;

    /// Project `(lon, lat)` to `(x, y)` pixels, or `None` at a singular point.
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Inverse projection. `None` for pixels outside the projected sphere.
    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// Closed ring of screen points tracing the sphere's boundary.
    fn outline(&self) -> Vec<(f64, f64)>;
}

/// Selectable projection families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    Orthographic,
    Equirectangular,
    Stereographic,
}

impl ProjectionKind {
    /// Build a projection centered on `(lon, lat)` that fits the view, scaled by `zoom`.
    pub fn build(
        &self,
        view: View,
        orientation: Orientation,
    ) -> Result<Arc<dyn Projection>, ProjectionError> {
        if view.width == 0 || view.height == 0 {
            return Err(ProjectionError::InvalidView(view.width, view.height));
        }
        let translate = view.center();
        let rotate = [-orientation.lon, -orientation.lat, 0.0];
        let projection: Arc<dyn Projection> = match self {
            ProjectionKind::Orthographic => {
                let scale = orientation.scale.unwrap_or_else(|| Orthographic::fit_scale(view));
                Arc::new(Orthographic::new(rotate, scale, translate)?)
            }
            ProjectionKind::Equirectangular => {
                let scale = orientation
                    .scale
                    .unwrap_or_else(|| Equirectangular::fit_scale(view));
                Arc::new(Equirectangular::new(rotate, scale, translate)?)
            }
            ProjectionKind::Stereographic => {
                let scale = orientation.scale.unwrap_or_else(|| Stereographic::fit_scale(view));
                Arc::new(Stereographic::new(rotate, scale, translate)?)
            }
        };
        Ok(projection)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::Orthographic => "orthographic",
            ProjectionKind::Equirectangular => "equirectangular",
            ProjectionKind::Stereographic => "stereographic",
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectionKind {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "orthographic" | "ortho" => Ok(ProjectionKind::Orthographic),
            "equirectangular" | "equirect" => Ok(ProjectionKind::Equirectangular),
            "stereographic" | "stereo" => Ok(ProjectionKind::Stereographic),
            _ => Err(ProjectionError::UnknownProjection(s.to_string())),
        }
    }
}

/// Where the view is centered and, optionally, its scale in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub lon: f64,
    pub lat: f64,
    pub scale: Option<f64>,
}

impl FromStr for Orientation {
    type Err = ProjectionError;

    /// Parse "lon,lat" or "lon,lat,scale".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProjectionError::InvalidOrientation(s.to_string());
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
        if parts.iter().any(|v| !v.is_finite()) {
            return Err(invalid());
        }
        match parts.as_slice() {
            [lon, lat] => Ok(Orientation { lon: *lon, lat: *lat, scale: None }),
            [lon, lat, scale] if *scale > 0.0 => Ok(Orientation {
                lon: *lon,
                lat: *lat,
                scale: Some(*scale),
            }),
            _ => Err(invalid()),
        }
    }
}

/// Map `a` into `[-π, π]` after a single rotation step.
pub(crate) fn wrap_pi(a: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if a > PI {
        a - TAU
    } else if a < -PI {
        a + TAU
    } else {
        a
    }
}

/// `asin` clamped against rounding just outside [-1, 1].
pub(crate) fn asin(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

pub(crate) fn check_scale(scale: f64) -> Result<(), ProjectionError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::InvalidScale(scale))
    }
}

/// Ring of `OUTLINE_SEGMENTS` points on a circle.
pub(crate) fn circle(center: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    (0..OUTLINE_SEGMENTS)
        .map(|i| {
            let a = i as f64 / OUTLINE_SEGMENTS as f64 * std::f64::consts::TAU;
            (center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orientation() {
        let o: Orientation = "-30,20".parse().unwrap();
        assert_eq!(o, Orientation { lon: -30.0, lat: 20.0, scale: None });

        let o: Orientation = " 10.5, -4 , 800".parse().unwrap();
        assert_eq!(o.scale, Some(800.0));

        assert!("10".parse::<Orientation>().is_err());
        assert!("10,20,-1".parse::<Orientation>().is_err());
        assert!("a,b".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_parse_projection_kind() {
        assert_eq!("Ortho".parse::<ProjectionKind>().unwrap(), ProjectionKind::Orthographic);
        assert!("mercator".parse::<ProjectionKind>().is_err());
    }

    #[test]
    fn test_build_rejects_empty_view() {
        let err = ProjectionKind::Orthographic
            .build(View::new(0, 10), Orientation::default())
            .unwrap_err();
        assert_eq!(err, ProjectionError::InvalidView(0, 10));
    }

    #[test]
    fn test_wrap_pi() {
        use std::f64::consts::PI;
        assert!((wrap_pi(PI + 0.5) - (-PI + 0.5)).abs() < 1e-12);
        assert!((wrap_pi(-PI - 0.5) - (PI - 0.5)).abs() < 1e-12);
        assert_eq!(wrap_pi(1.0), 1.0);
    }
}
