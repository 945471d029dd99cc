//! Screen-space view and the pixel bounds of the projected sphere.

use crate::Projection;
use serde::{Deserialize, Serialize};

/// Size of the output surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct View {
    pub width: usize,
    pub height: usize,
}

impl View {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Inclusive pixel rectangle covering the projected sphere, clamped to the view.
///
/// Never empty: a sphere entirely off-screen collapses to a single pixel on the
/// nearest edge, which the mask then reports as invisible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewBounds {
    pub x: usize,
    pub y: usize,
    pub x_max: usize,
    pub y_max: usize,
    pub width: usize,
    pub height: usize,
}

impl ViewBounds {
    pub fn for_projection<P: Projection + ?Sized>(projection: &P, view: View) -> Self {
        Self::from_outline(&projection.outline(), view)
    }

    pub fn from_outline(outline: &[(f64, f64)], view: View) -> Self {
        let last_x = view.width.saturating_sub(1) as f64;
        let last_y = view.height.saturating_sub(1) as f64;

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(px, py) in outline.iter().filter(|(px, py)| px.is_finite() && py.is_finite()) {
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }
        if min_x > max_x || min_y > max_y {
            // Nothing finite to bound: use the whole view.
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, last_x, last_y);
        }

        let x = min_x.floor().clamp(0.0, last_x) as usize;
        let y = min_y.floor().clamp(0.0, last_y) as usize;
        let x_max = (max_x.ceil().clamp(0.0, last_x) as usize).max(x);
        let y_max = (max_y.ceil().clamp(0.0, last_y) as usize).max(y);

        Self {
            x,
            y,
            x_max,
            y_max,
            width: x_max - x + 1,
            height: y_max - y + 1,
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x <= self.x_max && y >= self.y && y <= self.y_max
    }
}
