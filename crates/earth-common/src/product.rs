//! Data products: which GRIB records make up a layer and how it is displayed.
//!
//! Each product carries its own discriminators, units, color scale and, for the
//! animated vector products, particle settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::grid::{Cell, Grid, GridKind, GridRecord};
use crate::style::{ColorScale, ColorStop, Gradient};
use crate::units::Unit;
use crate::{EarthError, EarthResult};

/// GRIB parameter numbers of the u and v components within a vector category.
const U_COMPONENT: u32 = 2;
const V_COMPONENT: u32 = 3;

/// How particles move through a vector product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSettings {
    /// Pixels per frame per native unit, per pixel of view height.
    pub velocity_scale: f64,
    /// Magnitude at which particle color saturates.
    pub max_intensity: f64,
}

/// A displayable data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Wind,
    OceanCurrents,
    Temperature,
    RelativeHumidity,
    AirDensity,
    WindPowerDensity,
    TotalCloudWater,
    TotalPrecipitableWater,
    MeanSeaLevelPressure,
}

impl Product {
    pub const ALL: [Product; 9] = [
        Product::Wind,
        Product::OceanCurrents,
        Product::Temperature,
        Product::RelativeHumidity,
        Product::AirDensity,
        Product::WindPowerDensity,
        Product::TotalCloudWater,
        Product::TotalPrecipitableWater,
        Product::MeanSeaLevelPressure,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Product::Wind => "wind",
            Product::OceanCurrents => "currents",
            Product::Temperature => "temp",
            Product::RelativeHumidity => "relative_humidity",
            Product::AirDensity => "air_density",
            Product::WindPowerDensity => "wind_power_density",
            Product::TotalCloudWater => "total_cloud_water",
            Product::TotalPrecipitableWater => "total_precipitable_water",
            Product::MeanSeaLevelPressure => "mean_sea_level_pressure",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Product::Wind => "Wind",
            Product::OceanCurrents => "Ocean Currents",
            Product::Temperature => "Temperature",
            Product::RelativeHumidity => "Relative Humidity",
            Product::AirDensity => "Air Density",
            Product::WindPowerDensity => "Wind Power Density",
            Product::TotalCloudWater => "Total Cloud Water",
            Product::TotalPrecipitableWater => "Total Precipitable Water",
            Product::MeanSeaLevelPressure => "Mean Sea Level Pressure",
        }
    }

    pub fn kind(&self) -> GridKind {
        match self {
            Product::Wind | Product::OceanCurrents => GridKind::Vector,
            _ => GridKind::Scalar,
        }
    }

    /// GRIB (category, number) for scalar products read directly from a record.
    fn scalar_parameter(&self) -> Option<(u32, u32)> {
        match self {
            Product::Temperature => Some((0, 0)),
            Product::RelativeHumidity => Some((1, 1)),
            Product::TotalPrecipitableWater => Some((1, 3)),
            Product::AirDensity => Some((3, 10)),
            Product::MeanSeaLevelPressure => Some((3, 1)),
            Product::TotalCloudWater => Some((6, 6)),
            Product::Wind | Product::OceanCurrents | Product::WindPowerDensity => None,
        }
    }

    /// GRIB category holding the u/v pair of a vector product.
    fn vector_category(&self) -> Option<u32> {
        match self {
            Product::Wind => Some(2),
            Product::OceanCurrents => Some(1),
            _ => None,
        }
    }

    /// Display units, default first.
    pub fn units(&self) -> &'static [Unit] {
        match self {
            Product::Wind => &[
                Unit::KilometersPerHour,
                Unit::MetersPerSecond,
                Unit::Knots,
                Unit::MilesPerHour,
            ],
            Product::OceanCurrents => &[
                Unit::MetersPerSecond,
                Unit::KilometersPerHour,
                Unit::Knots,
                Unit::MilesPerHour,
            ],
            Product::Temperature => &[Unit::Celsius, Unit::Fahrenheit, Unit::Kelvin],
            Product::RelativeHumidity => &[Unit::Percent],
            Product::AirDensity => &[Unit::KilogramsPerCubicMeter],
            Product::WindPowerDensity => &[Unit::KilowattsPerSquareMeter],
            Product::TotalCloudWater | Product::TotalPrecipitableWater => {
                &[Unit::KilogramsPerSquareMeter]
            }
            Product::MeanSeaLevelPressure => &[
                Unit::Hectopascals,
                Unit::MillimetersOfMercury,
                Unit::InchesOfMercury,
            ],
        }
    }

    pub fn default_unit(&self) -> Unit {
        self.units()[0]
    }

    /// Overlay color scale in native units.
    pub fn scale(&self) -> ColorScale {
        match self {
            Product::Wind => ColorScale::new(0.0, 100.0, Gradient::ExtendedSinebow),
            Product::OceanCurrents => ColorScale::new(0.0, 1.5, Gradient::ExtendedSinebow),
            Product::Temperature => ColorScale::segmented(
                193.0,
                328.0,
                &[
                    ColorStop::new(193.0, [37, 4, 42]),
                    ColorStop::new(206.0, [41, 10, 130]),
                    ColorStop::new(219.0, [81, 40, 40]),
                    ColorStop::new(233.15, [192, 37, 149]),
                    ColorStop::new(255.372, [70, 215, 215]),
                    ColorStop::new(273.15, [21, 84, 187]),
                    ColorStop::new(275.15, [24, 132, 14]),
                    ColorStop::new(291.0, [247, 251, 59]),
                    ColorStop::new(298.0, [235, 167, 21]),
                    ColorStop::new(311.0, [230, 71, 39]),
                    ColorStop::new(328.0, [88, 27, 67]),
                ],
            ),
            Product::RelativeHumidity => ColorScale::segmented(
                0.0,
                100.0,
                &[
                    ColorStop::new(0.0, [230, 165, 30]),
                    ColorStop::new(25.0, [120, 100, 95]),
                    ColorStop::new(60.0, [40, 44, 92]),
                    ColorStop::new(75.0, [21, 13, 193]),
                    ColorStop::new(90.0, [75, 63, 235]),
                    ColorStop::new(100.0, [25, 255, 255]),
                ],
            ),
            Product::AirDensity => ColorScale::segmented(
                0.0,
                1.5,
                &[
                    ColorStop::new(0.0, [255, 0, 0]),
                    ColorStop::new(0.5, [255, 127, 80]),
                    ColorStop::new(1.0, [255, 185, 15]),
                    ColorStop::new(1.4, [255, 224, 113]),
                    ColorStop::new(2.0, [255, 255, 0]),
                ],
            ),
            Product::WindPowerDensity => ColorScale::segmented(
                0.0,
                80000.0,
                &[
                    ColorStop::new(0.0, [15, 4, 96]),
                    ColorStop::new(250.0, [30, 8, 180]),
                    ColorStop::new(1000.0, [121, 102, 2]),
                    ColorStop::new(2000.0, [118, 161, 66]),
                    ColorStop::new(4000.0, [50, 102, 219]),
                    ColorStop::new(8000.0, [19, 131, 193]),
                    ColorStop::new(16000.0, [59, 204, 227]),
                    ColorStop::new(64000.0, [241, 1, 45]),
                    ColorStop::new(256000.0, [243, 0, 241]),
                ],
            ),
            Product::TotalCloudWater => ColorScale::segmented(
                0.0,
                1.0,
                &[
                    ColorStop::new(0.0, [5, 5, 89]),
                    ColorStop::new(0.2, [170, 170, 230]),
                    ColorStop::new(1.0, [255, 255, 255]),
                ],
            ),
            Product::TotalPrecipitableWater => ColorScale::segmented(
                0.0,
                70.0,
                &[
                    ColorStop::new(0.0, [230, 165, 30]),
                    ColorStop::new(10.0, [120, 100, 95]),
                    ColorStop::new(20.0, [40, 44, 92]),
                    ColorStop::new(30.0, [21, 13, 193]),
                    ColorStop::new(40.0, [75, 63, 235]),
                    ColorStop::new(60.0, [25, 255, 255]),
                    ColorStop::new(70.0, [150, 255, 255]),
                ],
            ),
            Product::MeanSeaLevelPressure => ColorScale::segmented(
                92000.0,
                105000.0,
                &[
                    ColorStop::new(92000.0, [40, 0, 0]),
                    ColorStop::new(95000.0, [187, 60, 31]),
                    ColorStop::new(96500.0, [137, 32, 30]),
                    ColorStop::new(98000.0, [16, 1, 43]),
                    ColorStop::new(100500.0, [36, 1, 93]),
                    ColorStop::new(101300.0, [241, 254, 18]),
                    ColorStop::new(103000.0, [228, 246, 223]),
                    ColorStop::new(105000.0, [255, 255, 255]),
                ],
            ),
        }
    }

    /// Particle settings for animated products.
    pub fn particles(&self) -> Option<ParticleSettings> {
        match self {
            Product::Wind => Some(ParticleSettings {
                velocity_scale: 1.0 / 60000.0,
                max_intensity: 17.0,
            }),
            Product::OceanCurrents => Some(ParticleSettings {
                velocity_scale: 1.0 / 4400.0,
                max_intensity: 0.7,
            }),
            _ => None,
        }
    }

    /// Build this product's grid from the records of one grid file.
    pub fn build(&self, records: &[GridRecord]) -> EarthResult<Grid> {
        if let Some(category) = self.vector_category() {
            return self.build_vector(records, category);
        }
        if let Some((category, number)) = self.scalar_parameter() {
            let record = self.find(records, category, number, "scalar")?;
            return Grid::scalar(record.header.clone(), &record.data);
        }

        // Derived: ½·ρ·|v|³ from the wind pair and air density.
        let wind = Product::Wind.build(records)?;
        let density = Product::AirDensity.build(records)?;
        Grid::derive(&wind, &density, |w, rho| match (w, rho) {
            (Cell::Vector(u, v), Cell::Scalar(rho)) => {
                let m = (u * u + v * v).sqrt();
                Some(0.5 * rho * m * m * m)
            }
            _ => None,
        })
    }

    fn build_vector(&self, records: &[GridRecord], category: u32) -> EarthResult<Grid> {
        let u = self.find(records, category, U_COMPONENT, "u")?;
        let v = self.find(records, category, V_COMPONENT, "v")?;
        let (hu, hv) = (&u.header, &v.header);
        if hu.nx != hv.nx || hu.ny != hv.ny || hu.lo1 != hv.lo1 || hu.la1 != hv.la1 {
            return Err(EarthError::DataMismatch(format!(
                "{} components have different grids: {}x{} vs {}x{}",
                self.name(),
                hu.nx,
                hu.ny,
                hv.nx,
                hv.ny
            )));
        }
        Grid::vector(u.header.clone(), &u.data, &v.data)
    }

    fn find<'a>(
        &self,
        records: &'a [GridRecord],
        category: u32,
        number: u32,
        component: &'static str,
    ) -> EarthResult<&'a GridRecord> {
        records
            .iter()
            .find(|r| r.matches(category, number))
            .ok_or_else(|| EarthError::MissingComponent {
                product: self.name().to_string(),
                component,
            })
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Product {
    type Err = EarthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Product::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or_else(|| EarthError::InvalidConfig(format!("unknown product '{}'", s)))
    }
}
