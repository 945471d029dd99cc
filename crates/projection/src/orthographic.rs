//! Orthographic (globe) projection.

use crate::{check_scale, circle, Projection, ProjectionError, Rotation, View, FIT_MARGIN};

/// Sensitivity of drag rotation, in degrees per pixel at scale 1.
const DRAG_SENSITIVITY: f64 = 60.0;

/// Smallest scale zooming may reach.
const MIN_SCALE: f64 = 25.0;

/// Largest scale zooming may reach.
const MAX_SCALE: f64 = 3000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Orthographic {
    rotation: Rotation,
    scale: f64,
    translate: (f64, f64),
}

impl Orthographic {
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

    /// Globe centered on `(lon, lat)` that fills most of the view.
    pub fn centered_on(lon: f64, lat: f64, view: View) -> Self {
        Self {
            rotation: Rotation::new([-lon, -lat, 0.0]),
            scale: Self::fit_scale(view),
            translate: view.center(),
        }
    }

    /// Radius in pixels at which the globe fits the view with a margin.
    pub fn fit_scale(view: View) -> f64 {
        (view.width.min(view.height) as f64 / 2.0 * FIT_MARGIN).max(1.0)
    }

    pub fn rotate(&self) -> [f64; 3] {
        self.rotation.degrees()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    /// Rotate as if the globe were dragged by `(dx, dy)` pixels.
    ///
    /// Pitch is clamped so the poles never flip over the top of the view.
    pub fn rotate_by(&mut self, dx: f64, dy: f64) {
        let sensitivity = DRAG_SENSITIVITY / self.scale;
        let [l, p, g] = self.rotation.degrees();
        let l = (l + dx * sensitivity) % 360.0;
        let p = (p - dy * sensitivity).clamp(-90.0, 90.0);
        self.rotation = Rotation::new([l, p, g]);
    }

    /// Multiply the scale by `factor`, clamped to the zoom range.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        }
    }
}

impl Projection for Orthographic {
    fn name(&self) -> &'static str {
        "orthographic"
    }

    /// Points on the far hemisphere are not clipped; they land inside the disk too.
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(lon.is_finite() && lat.is_finite()) {
            return None;
        }
        let (l, p) = self.rotation.forward(lon.to_radians(), lat.to_radians());
        let x = p.cos() * l.sin();
        let y = p.sin();
        Some((
            self.translate.0 + self.scale * x,
            self.translate.1 - self.scale * y,
        ))
    }

    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let px = (x - self.translate.0) / self.scale;
        let py = (self.translate.1 - y) / self.scale;
        let rho2 = px * px + py * py;
        if rho2.is_nan() || rho2 > 1.0 {
            return None;
        }
        let cos_c = (1.0 - rho2).sqrt();
        let lambda = px.atan2(cos_c);
        let phi = crate::asin(py);
        let (l, p) = self.rotation.invert(lambda, phi);
        Some((l.to_degrees(), p.to_degrees()))
    }

    fn outline(&self) -> Vec<(f64, f64)> {
        circle(self.translate, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> View {
        View::new(800, 600)
    }

    #[test]
    fn test_center_projects_to_view_center() {
        let p = Orthographic::centered_on(-30.0, 20.0, view());
        let (x, y) = p.project(-30.0, 20.0).unwrap();
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
        assert!((p.scale() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_north_is_up() {
        let p = Orthographic::centered_on(0.0, 0.0, view());
        let (_, y) = p.project(0.0, 10.0).unwrap();
        assert!(y < 300.0);
        let (x, _) = p.project(10.0, 0.0).unwrap();
        assert!(x > 400.0);
    }

    #[test]
    fn test_invert_round_trip() {
        let p = Orthographic::new([40.0, -25.0, 0.0], 250.0, (400.0, 300.0)).unwrap();
        let (x, y) = p.project(-50.0, 30.0).unwrap();
        let (lon, lat) = p.invert(x, y).unwrap();
        assert!((lon - -50.0).abs() < 1e-6);
        assert!((lat - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_invert_outside_disk_is_none() {
        let p = Orthographic::centered_on(0.0, 0.0, view());
        assert!(p.invert(0.0, 0.0).is_none());
        assert!(p.invert(400.0 + 271.0, 300.0).is_none());
        assert!(p.invert(400.0 + 269.0, 300.0).is_some());
    }

    #[test]
    fn test_rotate_by_clamps_pitch() {
        let mut p = Orthographic::centered_on(0.0, 0.0, view());
        p.rotate_by(0.0, -1.0e6);
        assert_eq!(p.rotate()[1], 90.0);
        p.rotate_by(270.0, 0.0);
        assert!((p.rotate()[0] - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_by_clamps_scale() {
        let mut p = Orthographic::centered_on(0.0, 0.0, view());
        p.zoom_by(2.0);
        assert!((p.scale() - 540.0).abs() < 1e-9);
        p.zoom_by(1.0e6);
        assert_eq!(p.scale(), MAX_SCALE);
        p.zoom_by(0.0);
        assert_eq!(p.scale(), MAX_SCALE);
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(Orthographic::new([0.0; 3], 0.0, (0.0, 0.0)).is_err());
        assert!(Orthographic::new([0.0; 3], f64::NAN, (0.0, 0.0)).is_err());
    }
}
