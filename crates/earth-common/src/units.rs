//! Display units and value formatting for point inspection.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A display unit. Conversions take the product's native (GRIB) unit as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    MetersPerSecond,
    KilometersPerHour,
    Knots,
    MilesPerHour,
    Kelvin,
    Celsius,
    Fahrenheit,
    Percent,
    KilogramsPerSquareMeter,
    KilogramsPerCubicMeter,
    KilowattsPerSquareMeter,
    Hectopascals,
    MillimetersOfMercury,
    InchesOfMercury,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::MetersPerSecond => "m/s",
            Unit::KilometersPerHour => "km/h",
            Unit::Knots => "kn",
            Unit::MilesPerHour => "mph",
            Unit::Kelvin => "K",
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Percent => "%",
            Unit::KilogramsPerSquareMeter => "kg/m²",
            Unit::KilogramsPerCubicMeter => "kg/m³",
            Unit::KilowattsPerSquareMeter => "kW/m²",
            Unit::Hectopascals => "hPa",
            Unit::MillimetersOfMercury => "mmHg",
            Unit::InchesOfMercury => "inHg",
        }
    }

    /// Convert a native value into this unit.
    pub fn convert(&self, x: f64) -> f64 {
        match self {
            Unit::KilometersPerHour => x * 3.6,
            Unit::Knots => x * 1.943844,
            Unit::MilesPerHour => x * 2.236936,
            Unit::Celsius => x - 273.15,
            Unit::Fahrenheit => x * 9.0 / 5.0 - 459.67,
            Unit::KilowattsPerSquareMeter => x / 1000.0,
            Unit::Hectopascals => x / 100.0,
            Unit::MillimetersOfMercury => x / 133.322387415,
            Unit::InchesOfMercury => x / 3386.389,
            Unit::MetersPerSecond
            | Unit::Kelvin
            | Unit::Percent
            | Unit::KilogramsPerSquareMeter
            | Unit::KilogramsPerCubicMeter => x,
        }
    }

    /// Decimal places shown for this unit.
    pub fn precision(&self) -> usize {
        match self {
            Unit::KilometersPerHour
            | Unit::Knots
            | Unit::MilesPerHour
            | Unit::Percent
            | Unit::Hectopascals
            | Unit::MillimetersOfMercury => 0,
            Unit::MetersPerSecond
            | Unit::Kelvin
            | Unit::Celsius
            | Unit::Fahrenheit
            | Unit::KilowattsPerSquareMeter => 1,
            Unit::InchesOfMercury => 1,
            Unit::KilogramsPerCubicMeter => 2,
            Unit::KilogramsPerSquareMeter => 3,
        }
    }

    /// Parse a unit label such as "km/h" or "°C".
    pub fn from_label(label: &str) -> Option<Unit> {
        ALL_UNITS.iter().copied().find(|u| u.label() == label)
    }
}

const ALL_UNITS: [Unit; 14] = [
    Unit::MetersPerSecond,
    Unit::KilometersPerHour,
    Unit::Knots,
    Unit::MilesPerHour,
    Unit::Kelvin,
    Unit::Celsius,
    Unit::Fahrenheit,
    Unit::Percent,
    Unit::KilogramsPerSquareMeter,
    Unit::KilogramsPerCubicMeter,
    Unit::KilowattsPerSquareMeter,
    Unit::Hectopascals,
    Unit::MillimetersOfMercury,
    Unit::InchesOfMercury,
];

/// "12.3 °C"
pub fn format_scalar(value: f64, unit: Unit) -> String {
    format!("{:.*} {}", unit.precision(), unit.convert(value), unit.label())
}

/// "270° @ 12 km/h". The bearing is the direction the flow comes from, rounded to 5°.
pub fn format_vector(u: f64, v: f64, unit: Unit) -> String {
    let bearing = (-u).atan2(-v) / TAU * 360.0;
    let bearing = ((bearing + 360.0) % 360.0 / 5.0).round() * 5.0;
    format!(
        "{:.0}° @ {}",
        bearing,
        format_scalar((u * u + v * v).sqrt(), unit)
    )
}
