//! Decoded lat/lon grids as produced by grib2json.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{EarthError, EarthResult};

/// Values at or above this are GRIB "missing" markers.
const MISSING_SENTINEL: f64 = 9.999e20;

/// Floored modulo: the result has the sign of `n`, so negative longitudes land in `[0, n)`.
pub fn floor_mod(a: f64, n: f64) -> f64 {
    a - n * (a / n).floor()
}

/// Header of one grib2json record.
///
/// Only the fields the core needs are required; the descriptive fields are kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHeader {
    #[serde(default)]
    pub discipline: Option<u32>,
    #[serde(default)]
    pub parameter_category: u32,
    #[serde(default)]
    pub parameter_number: u32,
    #[serde(default)]
    pub parameter_number_name: Option<String>,
    #[serde(default)]
    pub parameter_unit: Option<String>,
    #[serde(default)]
    pub surface1_type: Option<u32>,
    #[serde(default)]
    pub surface1_value: Option<f64>,
    #[serde(default)]
    pub center_name: Option<String>,
    /// Longitude of the first grid point (λ0)
    pub lo1: f64,
    /// Latitude of the first grid point (φ0)
    pub la1: f64,
    /// Longitude step (Δλ)
    pub dx: f64,
    /// Latitude step (Δφ), positive while rows run north to south
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
    pub ref_time: DateTime<Utc>,
    /// Forecast offset in hours from `ref_time`
    #[serde(default)]
    pub forecast_time: i64,
}

impl GridHeader {
    /// Reference time plus the forecast offset.
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.ref_time + Duration::hours(self.forecast_time)
    }

    /// True when the columns cover the full circle, so column `nx` is column 0 again.
    pub fn is_continuous(&self) -> bool {
        (self.nx as f64 * self.dx).floor() >= 360.0
    }

    /// Number of grid points described by the header.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }

    pub fn validate(&self) -> EarthResult<()> {
        if self.is_empty() {
            return Err(EarthError::InvalidHeader(format!(
                "grid dimensions must be positive, got {}x{}",
                self.nx, self.ny
            )));
        }
        if !(self.dx.is_finite() && self.dx > 0.0) || !(self.dy.is_finite() && self.dy > 0.0) {
            return Err(EarthError::InvalidHeader(format!(
                "grid steps must be positive, got dx={} dy={}",
                self.dx, self.dy
            )));
        }
        if !self.lo1.is_finite() || !self.la1.is_finite() {
            return Err(EarthError::InvalidHeader("grid origin is not finite".to_string()));
        }
        Ok(())
    }
}

/// One record of a grib2json file: header plus row-major values (nulls allowed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridRecord {
    pub header: GridHeader,
    pub data: Vec<Option<f64>>,
}

impl GridRecord {
    /// Whether this record carries the given GRIB category/number pair.
    pub fn matches(&self, category: u32, number: u32) -> bool {
        self.header.parameter_category == category && self.header.parameter_number == number
    }
}

/// Whether a grid stores scalars or u/v vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    Scalar,
    Vector,
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Missing,
    Scalar(f64),
    Vector(f64, f64),
}

impl Cell {
    fn from_value(value: Option<f64>) -> Cell {
        match value {
            Some(v) if is_value(v) => Cell::Scalar(v),
            _ => Cell::Missing,
        }
    }

    fn from_components(u: Option<f64>, v: Option<f64>) -> Cell {
        match (u, v) {
            (Some(u), Some(v)) if is_value(u) && is_value(v) => Cell::Vector(u, v),
            _ => Cell::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

fn is_value(v: f64) -> bool {
    v.is_finite() && v.abs() < MISSING_SENTINEL
}

/// Immutable snapshot of one decoded data layer.
///
/// Rows run north to south and columns west to east (scan mode 0). Continuous grids
/// carry one extra column per row holding a copy of column 0.
#[derive(Debug, Clone)]
pub struct Grid {
    header: GridHeader,
    kind: GridKind,
    row_len: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a scalar grid from one record's values.
    pub fn scalar(header: GridHeader, data: &[Option<f64>]) -> EarthResult<Self> {
        header.validate()?;
        check_len(&header, data.len(), "scalar")?;
        let cells = data.iter().map(|v| Cell::from_value(*v)).collect();
        Ok(Self::from_cells(header, GridKind::Scalar, cells))
    }

    /// Build a vector grid from matching u and v component values.
    pub fn vector(header: GridHeader, u: &[Option<f64>], v: &[Option<f64>]) -> EarthResult<Self> {
        header.validate()?;
        if u.len() != v.len() {
            return Err(EarthError::DataMismatch(format!(
                "u has {} values but v has {}",
                u.len(),
                v.len()
            )));
        }
        check_len(&header, u.len(), "vector")?;
        let cells = u
            .iter()
            .zip(v.iter())
            .map(|(u, v)| Cell::from_components(*u, *v))
            .collect();
        Ok(Self::from_cells(header, GridKind::Vector, cells))
    }

    /// Build a scalar grid by combining two aligned grids cell by cell.
    ///
    /// Cells where either input is missing, or `f` yields a non-finite value, are missing.
    pub fn derive<F>(first: &Grid, second: &Grid, f: F) -> EarthResult<Self>
    where
        F: Fn(Cell, Cell) -> Option<f64>,
    {
        let (a, b) = (&first.header, &second.header);
        if a.nx != b.nx || a.ny != b.ny || a.lo1 != b.lo1 || a.la1 != b.la1 {
            return Err(EarthError::DataMismatch(format!(
                "cannot combine {}x{} grid with {}x{} grid",
                a.nx, a.ny, b.nx, b.ny
            )));
        }
        let mut cells = Vec::with_capacity(a.len());
        for j in 0..a.ny {
            for i in 0..a.nx {
                let (c1, c2) = (first.raw(i, j), second.raw(i, j));
                let cell = if c1.is_missing() || c2.is_missing() {
                    Cell::Missing
                } else {
                    Cell::from_value(f(c1, c2))
                };
                cells.push(cell);
            }
        }
        Ok(Self::from_cells(first.header.clone(), GridKind::Scalar, cells))
    }

    fn from_cells(header: GridHeader, kind: GridKind, cells: Vec<Cell>) -> Self {
        let (nx, ny) = (header.nx, header.ny);
        if !header.is_continuous() {
            return Self { header, kind, row_len: nx, cells };
        }

        // Duplicate column 0 at the end of each row so interpolation can wrap.
        let row_len = nx + 1;
        let mut wrapped = Vec::with_capacity(row_len * ny);
        for row in cells.chunks_exact(nx) {
            wrapped.extend_from_slice(row);
            wrapped.push(row[0]);
        }
        Self { header, kind, row_len, cells: wrapped }
    }

    fn raw(&self, i: usize, j: usize) -> Cell {
        self.cells[j * self.row_len + i]
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn is_continuous(&self) -> bool {
        self.header.is_continuous()
    }

    /// Number of addressable columns, including the wrap column.
    pub fn columns(&self) -> usize {
        self.row_len
    }

    pub fn rows(&self) -> usize {
        self.header.ny
    }

    /// Cell at column `i`, row `j`, or `None` outside the grid.
    pub fn cell(&self, i: isize, j: isize) -> Option<Cell> {
        if i < 0 || j < 0 || i as usize >= self.row_len || j as usize >= self.header.ny {
            return None;
        }
        Some(self.raw(i as usize, j as usize))
    }

    /// Longitude and latitude of grid point (i, j).
    pub fn coord(&self, i: usize, j: usize) -> (f64, f64) {
        (
            floor_mod(self.header.lo1 + i as f64 * self.header.dx, 360.0),
            self.header.la1 - j as f64 * self.header.dy,
        )
    }
}

fn check_len(header: &GridHeader, len: usize, what: &str) -> EarthResult<()> {
    if len != header.len() {
        return Err(EarthError::DataMismatch(format!(
            "{} data has {} values, header expects {}x{}={}",
            what,
            len,
            header.nx,
            header.ny,
            header.len()
        )));
    }
    Ok(())
}
