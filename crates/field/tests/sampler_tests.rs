//! Bilinear sampling properties: wraparound, vertices, range checks, continuity.

use earth_common::{Grid, Product};
use field::{GridSampler, Sample};
use std::sync::Arc;
use test_utils::{
    assert_approx_eq, global_10deg, header, indexed_wind_records, temperature_record,
    two_by_two, vector_records, WIND_CATEGORY,
};

fn sampler(grid: Grid) -> GridSampler {
    GridSampler::new(Arc::new(grid))
}

fn indexed() -> GridSampler {
    sampler(Product::Wind.build(&indexed_wind_records(&global_10deg())).unwrap())
}

fn uv(sample: Option<Sample>) -> [f64; 2] {
    match sample {
        Some(Sample::Vector { u, v, .. }) => [u, v],
        other => panic!("expected a vector, got {other:?}"),
    }
}

// ============================================================================
// The 2×2 scenario
// ============================================================================

fn two_by_two_sampler() -> GridSampler {
    let records = vector_records(
        &two_by_two(),
        WIND_CATEGORY,
        vec![1.0, 2.0, 3.0, 4.0],
        vec![5.0, 6.0, 7.0, 8.0],
    );
    sampler(Product::Wind.build(&records).unwrap())
}

#[test]
fn test_two_by_two_top_left_vertex() {
    assert_eq!(uv(two_by_two_sampler().interpolate(0.0, 0.0)), [1.0, 5.0]);
}

#[test]
fn test_two_by_two_bottom_right_vertex() {
    // Row 1 lies at φ0 - Δφ, column 1 at λ0 + Δλ.
    assert_eq!(uv(two_by_two_sampler().interpolate(180.0, -180.0)), [4.0, 8.0]);
}

#[test]
fn test_two_by_two_cell_center_averages_corners() {
    assert_eq!(uv(two_by_two_sampler().interpolate(90.0, -90.0)), [2.5, 6.5]);
}

#[test]
fn test_two_by_two_quarter_point_weights() {
    // Grid coordinates: with Δλ = Δφ = 180 this is a quarter of the way into the
    // cell, weights 9/16, 3/16, 3/16, 1/16. The [2.5, 6.5] average of all four
    // corners belongs to the cell center at (90, -90).
    assert_eq!(uv(two_by_two_sampler().interpolate(45.0, -45.0)), [1.75, 5.75]);
}

#[test]
fn test_two_by_two_magnitude() {
    match two_by_two_sampler().interpolate(0.0, 0.0) {
        Some(Sample::Vector { magnitude, .. }) => {
            assert_approx_eq!(magnitude, 26f64.sqrt(), 1e-12);
        }
        other => panic!("unexpected sample: {other:?}"),
    }
}

// ============================================================================
// Wraparound
// ============================================================================

#[test]
fn test_wraparound_is_idempotent() {
    let s = indexed();
    for &lon in &[0.0, 12.5, 175.25, 347.5, -7.5, -181.75] {
        for &lat in &[88.5, 12.5, -45.25, -89.5] {
            let a = s.interpolate(lon, lat);
            assert_eq!(a, s.interpolate(lon + 360.0, lat), "lon {lon} lat {lat}");
            assert_eq!(a, s.interpolate(lon - 360.0, lat), "lon {lon} lat {lat}");
            assert!(a.is_some());
        }
    }
}

#[test]
fn test_wrap_column_blends_last_and_first() {
    // Between column 35 (u = 35) and the wrap column (a copy of column 0, u = 0).
    let [u, v] = uv(indexed().interpolate(355.0, 90.0));
    assert_eq!(u, 17.5);
    assert_eq!(v, 0.0);
}

// ============================================================================
// Vertices and range
// ============================================================================

#[test]
fn test_vertices_return_stored_values() {
    let base = global_10deg();
    let s = indexed();
    for j in 0..base.ny {
        for i in 0..base.nx {
            let (lon, lat) = s.grid().coord(i, j);
            assert_eq!(uv(s.interpolate(lon, lat)), [i as f64, j as f64], "({i}, {j})");
        }
    }
}

#[test]
fn test_latitude_outside_rows_is_none() {
    let s = indexed();
    assert!(s.interpolate(10.0, 90.5).is_none());
    assert!(s.interpolate(10.0, -90.5).is_none());

    let regional = header(0.0, 60.0, 1.0, 1.0, 10, 10);
    let s = sampler(Product::Wind.build(&indexed_wind_records(&regional)).unwrap());
    assert!(s.interpolate(5.0, 55.0).is_some());
    assert!(s.interpolate(5.0, 50.5).is_none());
    assert!(s.interpolate(5.0, 61.0).is_none());
}

#[test]
fn test_longitude_outside_regional_grid_is_none() {
    let regional = header(0.0, 60.0, 1.0, 1.0, 10, 10);
    let s = sampler(Product::Wind.build(&indexed_wind_records(&regional)).unwrap());
    assert!(s.interpolate(9.0, 55.0).is_some());
    assert!(s.interpolate(9.5, 55.0).is_none());
    assert!(s.interpolate(-0.5, 55.0).is_none());
}

#[test]
fn test_missing_corner_is_none() {
    let base = global_10deg();
    let n = base.nx * base.ny;
    let mut u = vec![1.0; n];
    u[base.nx + 1] = f64::NAN; // column 1, row 1: (10°E, 80°N)
    let records = vector_records(&base, WIND_CATEGORY, u, vec![1.0; n]);
    let s = sampler(Product::Wind.build(&records).unwrap());

    assert!(s.interpolate(5.0, 85.0).is_none());
    assert!(s.interpolate(15.0, 75.0).is_none());
    assert!(s.interpolate(25.0, 75.0).is_some());
}

#[test]
fn test_non_finite_coordinates_are_none() {
    let s = indexed();
    assert!(s.interpolate(f64::NAN, 0.0).is_none());
    assert!(s.interpolate(0.0, f64::INFINITY).is_none());
}

// ============================================================================
// Continuity
// ============================================================================

#[test]
fn test_converges_to_cell_boundary() {
    let s = indexed();
    let at = uv(s.interpolate(20.0, 50.0));
    for eps in [1e-3, 1e-6, 1e-9] {
        let [u_west, v_west] = uv(s.interpolate(20.0 - eps, 50.0));
        let [u_north, v_north] = uv(s.interpolate(20.0, 50.0 + eps));
        assert_approx_eq!(u_west, at[0], eps);
        assert_approx_eq!(v_west, at[1], eps);
        assert_approx_eq!(u_north, at[0], eps);
        assert_approx_eq!(v_north, at[1], eps);
    }
}

#[test]
fn test_scalar_grid_interpolates() {
    let base = global_10deg();
    let s = sampler(Product::Temperature.build(&[temperature_record(&base)]).unwrap());
    // Rows 0 and 1 hold 250 and 250 + 60/19.
    match s.interpolate(3.0, 85.0) {
        Some(Sample::Scalar(t)) => assert_approx_eq!(t, 250.0 + 30.0 / 19.0, 1e-9),
        other => panic!("unexpected sample: {other:?}"),
    }
}
