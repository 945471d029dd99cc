//! The finished per-pixel vector field.

use crate::Mask;
use projection::{View, ViewBounds};
use std::sync::Arc;

/// One pixel of a field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldCell {
    /// Outside the field bounds or the visible outline.
    #[default]
    Outside,
    /// On the sphere but without data.
    Hole,
    /// Screen displacement per frame and the geographic magnitude.
    Vector { dx: f64, dy: f64, magnitude: f64 },
}

impl FieldCell {
    pub fn is_defined(&self) -> bool {
        matches!(self, FieldCell::Vector { .. })
    }

    pub fn magnitude(&self) -> Option<f64> {
        match self {
            FieldCell::Vector { magnitude, .. } => Some(*magnitude),
            _ => None,
        }
    }
}

/// A column of cells indexed by y. Adjacent sampled columns share one allocation.
pub(crate) type Column = Arc<[FieldCell]>;

/// Dense field over the view, plus the overlay image produced alongside it.
#[derive(Debug, Clone)]
pub struct Field {
    view: View,
    bounds: ViewBounds,
    columns: Vec<Option<Column>>,
    overlay: Mask,
}

impl Field {
    pub(crate) fn new(
        view: View,
        bounds: ViewBounds,
        columns: Vec<Option<Column>>,
        overlay: Mask,
    ) -> Self {
        Self {
            view,
            bounds,
            columns,
            overlay,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn bounds(&self) -> ViewBounds {
        self.bounds
    }

    /// Cell at the pixel nearest to `(x, y)`.
    pub fn get(&self, x: f64, y: f64) -> FieldCell {
        if !(x.is_finite() && y.is_finite()) || x <= -0.5 || y <= -0.5 {
            return FieldCell::Outside;
        }
        let (col, row) = (x.round() as usize, y.round() as usize);
        self.columns
            .get(col)
            .and_then(|c| c.as_ref())
            .and_then(|c| c.get(row))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_defined(&self, x: f64, y: f64) -> bool {
        self.get(x, y).is_defined()
    }

    /// The color-mapped overlay, one RGBA pixel per view pixel.
    pub fn overlay(&self) -> &Mask {
        &self.overlay
    }

    /// Number of pixels holding a vector.
    pub fn defined_count(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .map(|c| c.iter().filter(|cell| cell.is_defined()).count())
            .sum()
    }

    /// Drop the column buffers and the overlay. Every lookup afterwards is `Outside`.
    pub fn release(&mut self) {
        self.columns = Vec::new();
        self.overlay = Mask::empty(View::new(0, 0));
    }

    pub fn is_released(&self) -> bool {
        self.columns.is_empty()
    }
}
