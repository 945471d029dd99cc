//! Configuration for field interpolation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for building fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Wall-clock time one slice may run before yielding, in milliseconds.
    pub time_budget_ms: u64,

    /// Pause between slices, in milliseconds.
    pub yield_delay_ms: u64,

    /// Only every `sample_stride`-th column and row is interpolated; the result is
    /// copied into the skipped neighbours.
    pub sample_stride: usize,

    /// Alpha of overlay pixels (0.4 opacity).
    pub overlay_alpha: u8,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 100,
            yield_delay_ms: 25,
            sample_stride: 2,
            overlay_alpha: 102,
        }
    }
}

impl FieldConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("EARTH_FIELD_TIME_BUDGET_MS") {
            if let Ok(ms) = val.parse() {
                config.time_budget_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("EARTH_FIELD_YIELD_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                config.yield_delay_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("EARTH_FIELD_SAMPLE_STRIDE") {
            if let Ok(stride) = val.parse() {
                config.sample_stride = stride;
            }
        }

        if let Ok(val) = std::env::var("EARTH_OVERLAY_ALPHA") {
            if let Ok(alpha) = val.parse() {
                config.overlay_alpha = alpha;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_budget_ms == 0 {
            return Err("time_budget_ms must be > 0".to_string());
        }

        if self.sample_stride == 0 || self.sample_stride > 8 {
            return Err("sample_stride must be 1-8".to_string());
        }

        Ok(())
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn yield_delay(&self) -> Duration {
        Duration::from_millis(self.yield_delay_ms)
    }
}
