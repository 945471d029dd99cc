//! Color scales mapping data values to overlay colors.
//!
//! A scale has a value range and a gradient. Sinebow gradients work on the value
//! normalized to `[0, 1]`; segmented gradients interpolate between color stops given
//! in data units.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// RGBA color, non-premultiplied.
pub type Rgba = [u8; 4];

pub const TRANSPARENT_BLACK: Rgba = [0, 0, 0, 0];

/// Hue at which the extended sinebow stops cycling and fades to white.
const SINEBOW_BOUNDARY: f64 = 0.45;

/// A color stop in data units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub value: f64,
    pub color: [u8; 3],
}

impl ColorStop {
    pub const fn new(value: f64, color: [u8; 3]) -> Self {
        Self { value, color }
    }
}

/// How a normalized or raw value becomes a color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gradient {
    /// Rainbow produced by phase-shifted sines, blue through red to magenta.
    Sinebow,
    /// Sinebow up to 0.45, then a fade to white.
    ExtendedSinebow,
    /// Piecewise-linear interpolation between stops.
    Segmented { stops: Vec<ColorStop> },
}

/// Value range plus gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub gradient: Gradient,
}

impl ColorScale {
    pub fn new(min: f64, max: f64, gradient: Gradient) -> Self {
        Self { min, max, gradient }
    }

    pub fn segmented(min: f64, max: f64, stops: &[ColorStop]) -> Self {
        Self::new(min, max, Gradient::Segmented { stops: stops.to_vec() })
    }

    /// Color for `value` with the given alpha.
    pub fn gradient(&self, value: f64, alpha: u8) -> Rgba {
        match &self.gradient {
            Gradient::Sinebow => sinebow(proportion(value, self.min, self.max), alpha),
            Gradient::ExtendedSinebow => {
                extended_sinebow(proportion(value, self.min, self.max), alpha)
            }
            Gradient::Segmented { stops } => segmented(stops, value, alpha),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.max <= self.min {
            return Err(format!("invalid scale bounds [{}, {}]", self.min, self.max));
        }
        if let Gradient::Segmented { stops } = &self.gradient {
            if stops.len() < 2 {
                return Err("Segmented scale must have at least 2 color stops".to_string());
            }
            if stops.windows(2).any(|w| w[1].value <= w[0].value) {
                return Err("Color stops must be strictly increasing".to_string());
            }
        }
        Ok(())
    }
}

/// `(clamp(x) - low) / (high - low)`.
fn proportion(x: f64, low: f64, high: f64) -> f64 {
    if high <= low {
        return 0.0;
    }
    (x.clamp(low, high) - low) / (high - low)
}

/// Linear interpolation between two colors, `t` in `[0, 1]`.
pub fn interpolate_color(start: [u8; 3], end: [u8; 3], t: f64, alpha: u8) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)).floor() as u8;
    [
        mix(start[0], end[0]),
        mix(start[1], end[1]),
        mix(start[2], end[2]),
        alpha,
    ]
}

/// Hue in `[0, 1]` to a rainbow color. Hue 0 and hue 1 are distinct colors.
pub fn sinebow(hue: f64, alpha: u8) -> Rgba {
    // 5/6 of a turn, then 3/4 frequency
    let rad = hue * TAU * 5.0 / 6.0 * 0.75;
    let (s, c) = rad.sin_cos();
    [
        ((-c).max(0.0) * 255.0).floor() as u8,
        (s.max(0.0) * 255.0).floor() as u8,
        (c.max(0.0).max(-s) * 255.0).floor() as u8,
        alpha,
    ]
}

/// Sinebow that fades to white past the boundary hue.
pub fn extended_sinebow(i: f64, alpha: u8) -> Rgba {
    if i <= SINEBOW_BOUNDARY {
        return sinebow(i / SINEBOW_BOUNDARY, alpha);
    }
    let end = sinebow(1.0, 0);
    interpolate_color(
        [end[0], end[1], end[2]],
        [255, 255, 255],
        (i - SINEBOW_BOUNDARY) / (1.0 - SINEBOW_BOUNDARY),
        alpha,
    )
}

fn segmented(stops: &[ColorStop], value: f64, alpha: u8) -> Rgba {
    match stops {
        [] => TRANSPARENT_BLACK,
        [only] => [only.color[0], only.color[1], only.color[2], alpha],
        _ => {
            // Find the first segment whose upper stop is >= value; the last segment absorbs the rest.
            let last = stops.len() - 2;
            let i = (0..last).find(|&i| value <= stops[i + 1].value).unwrap_or(last);
            let (lo, hi) = (&stops[i], &stops[i + 1]);
            interpolate_color(lo.color, hi.color, proportion(value, lo.value, hi.value), alpha)
        }
    }
}
