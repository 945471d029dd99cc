//! Configuration for particle animation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the particle animator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Particles per pixel of field width.
    pub particle_multiplier: f64,

    /// Reduce the particle count for slow devices.
    pub low_power: bool,

    /// Factor applied to the particle count in low-power mode.
    pub particle_reduction: f64,

    /// Frames a particle lives before it is respawned.
    pub max_age: u32,

    /// Target time between frames in milliseconds.
    pub frame_interval_ms: u64,

    /// Opacity kept by old trails each frame.
    pub fade_alpha: f32,

    /// Trail stroke width in pixels.
    pub line_width: f32,

    /// Gray increment between intensity buckets.
    pub intensity_scale_step: u8,

    /// Extra random draws when seeding lands on a pixel without data.
    pub max_random_attempts: u32,

    /// Fixed RNG seed for reproducible animations.
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            particle_multiplier: 7.0,
            low_power: false,
            particle_reduction: 0.75,
            max_age: 100,
            frame_interval_ms: 40,
            fade_alpha: 0.97,
            line_width: 1.0,
            intensity_scale_step: 10,
            max_random_attempts: 30,
            seed: None,
        }
    }
}

impl AnimationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("EARTH_PARTICLE_MULTIPLIER") {
            if let Ok(m) = val.parse() {
                config.particle_multiplier = m;
            }
        }

        if let Ok(val) = std::env::var("EARTH_LOW_POWER") {
            config.low_power = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("EARTH_MAX_PARTICLE_AGE") {
            if let Ok(age) = val.parse() {
                config.max_age = age;
            }
        }

        if let Ok(val) = std::env::var("EARTH_FRAME_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                config.frame_interval_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("EARTH_FADE_ALPHA") {
            if let Ok(alpha) = val.parse() {
                config.fade_alpha = alpha;
            }
        }

        if let Ok(val) = std::env::var("EARTH_PARTICLE_LINE_WIDTH") {
            if let Ok(width) = val.parse() {
                config.line_width = width;
            }
        }

        if let Ok(val) = std::env::var("EARTH_SEED") {
            config.seed = val.parse().ok();
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.particle_multiplier.is_finite() && self.particle_multiplier > 0.0) {
            return Err("particle_multiplier must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.particle_reduction) {
            return Err("particle_reduction must be between 0 and 1".to_string());
        }

        if self.max_age == 0 {
            return Err("max_age must be > 0".to_string());
        }

        if self.frame_interval_ms == 0 {
            return Err("frame_interval_ms must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.fade_alpha) {
            return Err("fade_alpha must be between 0 and 1".to_string());
        }

        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err("line_width must be > 0".to_string());
        }

        if self.intensity_scale_step == 0 {
            return Err("intensity_scale_step must be > 0".to_string());
        }

        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Particle count for a field `width` pixels wide.
    pub fn particle_count(&self, width: usize) -> usize {
        let mut count = (width as f64 * self.particle_multiplier).round();
        if self.low_power {
            count *= self.particle_reduction;
        }
        count.round() as usize
    }
}
