//! Bilinear sampling of lat/lon grids.

use earth_common::{floor_mod, Cell, Grid, GridKind};
use std::sync::Arc;

/// An interpolated grid value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Scalar(f64),
    Vector { u: f64, v: f64, magnitude: f64 },
}

impl Sample {
    /// The scalar, or the vector's magnitude.
    pub fn value(&self) -> f64 {
        match self {
            Sample::Scalar(v) => *v,
            Sample::Vector { magnitude, .. } => *magnitude,
        }
    }
}

/// Point-wise interpolation over a shared, immutable grid.
#[derive(Debug, Clone)]
pub struct GridSampler {
    grid: Arc<Grid>,
}

impl GridSampler {
    pub fn new(grid: Arc<Grid>) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn kind(&self) -> GridKind {
        self.grid.kind()
    }

    /// Interpolate at `(lon, lat)` in degrees.
    ///
    /// Returns `None` when any of the four surrounding grid points lies outside the
    /// grid or is missing.
    pub fn interpolate(&self, lon: f64, lat: f64) -> Option<Sample> {
        let header = self.grid.header();
        let i = floor_mod(lon - header.lo1, 360.0) / header.dx;
        let j = (header.la1 - lat) / header.dy;
        if !(i.is_finite() && j.is_finite()) {
            return None;
        }

        let (fi, ci) = (i.floor(), i.ceil());
        let (fj, cj) = (j.floor(), j.ceil());

        let g00 = self.grid.cell(fi as isize, fj as isize)?;
        let g10 = self.grid.cell(ci as isize, fj as isize)?;
        let g01 = self.grid.cell(fi as isize, cj as isize)?;
        let g11 = self.grid.cell(ci as isize, cj as isize)?;

        let (x, y) = (i - fi, j - fj);
        match (g00, g10, g01, g11) {
            (Cell::Scalar(a), Cell::Scalar(b), Cell::Scalar(c), Cell::Scalar(d)) => {
                Some(Sample::Scalar(bilinear_scalar(x, y, a, b, c, d)))
            }
            (
                Cell::Vector(u00, v00),
                Cell::Vector(u10, v10),
                Cell::Vector(u01, v01),
                Cell::Vector(u11, v11),
            ) => {
                let [u, v] =
                    bilinear_vector(x, y, [u00, v00], [u10, v10], [u01, v01], [u11, v11]);
                Some(Sample::Vector {
                    u,
                    v,
                    magnitude: (u * u + v * v).sqrt(),
                })
            }
            _ => None,
        }
    }
}

/// Bilinear interpolation of `g00` (top left), `g10`, `g01`, `g11` at fractional
/// offsets `x` (east) and `y` (south).
pub fn bilinear_scalar(x: f64, y: f64, g00: f64, g10: f64, g01: f64, g11: f64) -> f64 {
    let rx = 1.0 - x;
    let ry = 1.0 - y;
    g00 * rx * ry + g10 * x * ry + g01 * rx * y + g11 * x * y
}

/// Component-wise [`bilinear_scalar`].
pub fn bilinear_vector(
    x: f64,
    y: f64,
    g00: [f64; 2],
    g10: [f64; 2],
    g01: [f64; 2],
    g11: [f64; 2],
) -> [f64; 2] {
    [
        bilinear_scalar(x, y, g00[0], g10[0], g01[0], g11[0]),
        bilinear_scalar(x, y, g00[1], g10[1], g01[1], g11[1]),
    ]
}
