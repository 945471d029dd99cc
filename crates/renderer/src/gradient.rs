//! Particle intensity colors.
//!
//! Particles are drawn in one of a fixed number of gray levels, chosen by the
//! magnitude of the vector under them. Grouping particles by level lets each frame
//! stroke one path per color instead of one per particle.

use earth_common::Rgba;

/// Darkest gray level of the ramp.
const GRAY_START: u8 = 85;

/// Discrete colors indexed by clamped magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityScale {
    colors: Vec<Rgba>,
    max_intensity: f64,
}

impl IntensityScale {
    /// Opaque grays from 85 to 255 in increments of `step`.
    pub fn gray(step: u8, max_intensity: f64) -> Self {
        let step = step.max(1) as usize;
        let colors = (GRAY_START..=u8::MAX)
            .step_by(step)
            .map(|g| [g, g, g, u8::MAX])
            .collect();
        Self {
            colors,
            max_intensity,
        }
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn max_intensity(&self) -> f64 {
        self.max_intensity
    }

    /// Bucket for `magnitude`: linear in `[0, max_intensity]`, clamped at both ends.
    pub fn index_for(&self, magnitude: f64) -> usize {
        if self.max_intensity.is_nan() || self.max_intensity <= 0.0 || self.colors.is_empty() {
            return 0;
        }
        let m = magnitude.clamp(0.0, self.max_intensity);
        let last = self.colors.len() - 1;
        ((m / self.max_intensity * last as f64).floor() as usize).min(last)
    }
}
