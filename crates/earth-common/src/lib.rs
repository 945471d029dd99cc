//! Common types and utilities shared across the earth crates.

pub mod cancel;
pub mod error;
pub mod grid;
pub mod product;
pub mod style;
pub mod units;

pub use cancel::CancelFlag;
pub use error::{EarthError, EarthResult};
pub use grid::{floor_mod, Cell, Grid, GridHeader, GridKind, GridRecord};
pub use product::{ParticleSettings, Product};
pub use style::{ColorScale, ColorStop, Gradient, Rgba, TRANSPARENT_BLACK};
pub use units::{format_scalar, format_vector, Unit};
