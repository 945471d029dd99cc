//! Tests for building product grids from grib2json records.

use earth_common::{Cell, EarthError, GridKind, GridRecord, Product};
use test_utils::{
    air_density_record, global_10deg, indexed_wind_records, record, temperature_record,
    uniform_wind_records, vector_records, CURRENTS_CATEGORY,
};

// ============================================================================
// Vector products
// ============================================================================

#[test]
fn test_wind_pairs_u_and_v_records() {
    let base = global_10deg();
    let grid = Product::Wind.build(&indexed_wind_records(&base)).unwrap();

    assert_eq!(grid.kind(), GridKind::Vector);
    assert_eq!(grid.cell(3, 5), Some(Cell::Vector(3.0, 5.0)));
}

#[test]
fn test_wind_ignores_record_order() {
    let base = global_10deg();
    let mut records = indexed_wind_records(&base);
    records.reverse();
    records.insert(0, temperature_record(&base));

    let grid = Product::Wind.build(&records).unwrap();
    assert_eq!(grid.cell(1, 2), Some(Cell::Vector(1.0, 2.0)));
}

#[test]
fn test_currents_use_their_own_category() {
    let base = global_10deg();
    let n = base.nx * base.ny;
    let records = vector_records(&base, CURRENTS_CATEGORY, vec![0.5; n], vec![-0.25; n]);

    let grid = Product::OceanCurrents.build(&records).unwrap();
    assert_eq!(grid.cell(0, 0), Some(Cell::Vector(0.5, -0.25)));

    // Wind records are not currents.
    let err = Product::OceanCurrents
        .build(&uniform_wind_records(&base, 1.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, EarthError::MissingComponent { component: "u", .. }));
}

#[test]
fn test_missing_v_component_is_identifiable() {
    let base = global_10deg();
    let records: Vec<GridRecord> = uniform_wind_records(&base, 1.0, 1.0)
        .into_iter()
        .filter(|r| r.header.parameter_number == 2)
        .collect();

    let err = Product::Wind.build(&records).unwrap_err();
    match err {
        EarthError::MissingComponent { product, component } => {
            assert_eq!(product, "wind");
            assert_eq!(component, "v");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_empty_file_fails_with_missing_component() {
    let err = Product::Wind.build(&[]).unwrap_err();
    assert!(matches!(err, EarthError::MissingComponent { .. }));
    assert!(err.is_data_error());
}

#[test]
fn test_component_length_mismatch() {
    let base = global_10deg();
    let n = base.nx * base.ny;
    let records = vec![
        record(&base, 2, 2, vec![1.0; n]),
        record(&base, 2, 3, vec![1.0; n - 1]),
    ];
    let err = Product::Wind.build(&records).unwrap_err();
    assert!(matches!(err, EarthError::DataMismatch(_)));
}

// ============================================================================
// Scalar and derived products
// ============================================================================

#[test]
fn test_temperature_is_scalar() {
    let base = global_10deg();
    let grid = Product::Temperature.build(&[temperature_record(&base)]).unwrap();
    assert_eq!(grid.kind(), GridKind::Scalar);
    assert_eq!(grid.cell(0, 0), Some(Cell::Scalar(250.0)));
}

#[test]
fn test_wind_power_density_is_derived() {
    let base = global_10deg();
    let mut records = uniform_wind_records(&base, 3.0, 4.0);
    records.push(air_density_record(&base, 1.2));

    let grid = Product::WindPowerDensity.build(&records).unwrap();
    // ½ · 1.2 · 5³ = 75 W/m²
    match grid.cell(7, 7) {
        Some(Cell::Scalar(v)) => assert!((v - 75.0).abs() < 1e-9),
        other => panic!("unexpected cell: {other:?}"),
    }
}

#[test]
fn test_wind_power_density_requires_air_density() {
    let base = global_10deg();
    let err = Product::WindPowerDensity
        .build(&uniform_wind_records(&base, 3.0, 4.0))
        .unwrap_err();
    assert!(matches!(err, EarthError::MissingComponent { .. }));
}

#[test]
fn test_records_round_trip_through_json() {
    let base = global_10deg();
    let records = indexed_wind_records(&base);
    let json = serde_json::to_string(&records).unwrap();
    let parsed: Vec<GridRecord> = serde_json::from_str(&json).unwrap();
    let grid = Product::Wind.build(&parsed).unwrap();
    assert_eq!(grid.cell(35, 18), Some(Cell::Vector(35.0, 18.0)));
    assert_eq!(grid.header().valid_time(), base.valid_time());
}
