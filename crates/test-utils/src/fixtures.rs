//! Common test fixtures for earth tests.
//!
//! Pre-defined headers and view sizes that show up across the test suite.

use earth_common::GridHeader;

/// A fixed reference time for tests.
pub const REFERENCE_TIME: &str = "2014-01-31T00:00:00Z";

/// Common view sizes in pixels.
pub mod views {
    pub const SMALL: (usize, usize) = (64, 48);
    pub const MEDIUM: (usize, usize) = (320, 240);
}

/// Header for a grid starting at (lo1, la1) with the given steps and size.
pub fn header(lo1: f64, la1: f64, dx: f64, dy: f64, nx: usize, ny: usize) -> GridHeader {
    GridHeader {
        discipline: Some(0),
        parameter_category: 0,
        parameter_number: 0,
        parameter_number_name: None,
        parameter_unit: None,
        surface1_type: None,
        surface1_value: None,
        center_name: None,
        lo1,
        la1,
        dx,
        dy,
        nx,
        ny,
        ref_time: REFERENCE_TIME.parse().expect("valid reference time"),
        forecast_time: 0,
    }
}

/// Header with the GRIB discriminators set.
pub fn parameter_header(base: &GridHeader, category: u32, number: u32) -> GridHeader {
    GridHeader {
        parameter_category: category,
        parameter_number: number,
        ..base.clone()
    }
}

/// A global one-degree grid: 360 columns from 0°E, 181 rows from 90°N.
pub fn global_1deg() -> GridHeader {
    header(0.0, 90.0, 1.0, 1.0, 360, 181)
}

/// A coarse global grid: 36 columns of 10°, 19 rows of 10°.
pub fn global_10deg() -> GridHeader {
    header(0.0, 90.0, 10.0, 10.0, 36, 19)
}

/// The 2×2 grid with 180° steps used by the vertex scenarios.
pub fn two_by_two() -> GridHeader {
    header(0.0, 0.0, 180.0, 180.0, 2, 2)
}
