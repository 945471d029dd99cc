//! Generators for synthetic grib2json records.
//!
//! These produce predictable data so tests can check interpolation results exactly.

use std::io::Write;
use std::path::PathBuf;

use earth_common::{GridHeader, GridRecord};

use crate::fixtures::parameter_header;

/// GRIB category of wind records.
pub const WIND_CATEGORY: u32 = 2;

/// GRIB category of ocean current records.
pub const CURRENTS_CATEGORY: u32 = 1;

/// A record with the given discriminators and values.
pub fn record(base: &GridHeader, category: u32, number: u32, data: Vec<f64>) -> GridRecord {
    GridRecord {
        header: parameter_header(base, category, number),
        data: data.into_iter().map(Some).collect(),
    }
}

/// u (number 2) and v (number 3) records in a vector category.
pub fn vector_records(base: &GridHeader, category: u32, u: Vec<f64>, v: Vec<f64>) -> Vec<GridRecord> {
    vec![record(base, category, 2, u), record(base, category, 3, v)]
}

/// Wind records with the same vector everywhere.
pub fn uniform_wind_records(base: &GridHeader, u: f64, v: f64) -> Vec<GridRecord> {
    let n = base.nx * base.ny;
    vector_records(base, WIND_CATEGORY, vec![u; n], vec![v; n])
}

/// Wind records where each cell encodes its position: u = col, v = row.
pub fn indexed_wind_records(base: &GridHeader) -> Vec<GridRecord> {
    let mut u = Vec::with_capacity(base.nx * base.ny);
    let mut v = Vec::with_capacity(base.nx * base.ny);
    for row in 0..base.ny {
        for col in 0..base.nx {
            u.push(col as f64);
            v.push(row as f64);
        }
    }
    vector_records(base, WIND_CATEGORY, u, v)
}

/// Temperature record (category 0, number 0) with a north-south gradient in Kelvin.
pub fn temperature_record(base: &GridHeader) -> GridRecord {
    let mut data = Vec::with_capacity(base.nx * base.ny);
    for row in 0..base.ny {
        let t = row as f64 / base.ny.max(1) as f64;
        for _ in 0..base.nx {
            data.push(250.0 + 60.0 * t);
        }
    }
    record(base, 0, 0, data)
}

/// Air density record (category 3, number 10) with a constant value.
pub fn air_density_record(base: &GridHeader, rho: f64) -> GridRecord {
    record(base, 3, 10, vec![rho; base.nx * base.ny])
}

/// Serialize records to a temporary JSON file. Keep the returned guard alive while the file is used.
pub fn write_records_file(records: &[GridRecord]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("grid.json");
    let mut file = std::fs::File::create(&path).expect("create grid file");
    let json = serde_json::to_vec(records).expect("serialize records");
    file.write_all(&json).expect("write grid file");
    (dir, path)
}
