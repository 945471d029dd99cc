//! Viewer configuration.

use field::FieldConfig;
use projection::{Orientation, ProjectionKind, View};
use renderer::AnimationConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Output image width in pixels.
    pub width: usize,

    /// Output image height in pixels.
    pub height: usize,

    pub projection: ProjectionKind,

    /// View center and optional scale.
    pub orientation: Orientation,

    /// Number of animation frames to run.
    pub frames: u64,

    /// Write every n-th frame to disk.
    pub frame_every: u64,

    /// Directory for overlay and frame PNGs.
    pub output_dir: PathBuf,

    pub field: FieldConfig,

    pub animation: AnimationConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            projection: ProjectionKind::Orthographic,
            orientation: Orientation::default(),
            frames: 100,
            frame_every: 10,
            output_dir: PathBuf::from("output"),
            field: FieldConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from environment variables, including the field and
    /// animation settings.
    pub fn from_env() -> Self {
        let mut config = Self {
            field: FieldConfig::from_env(),
            animation: AnimationConfig::from_env(),
            ..Self::default()
        };

        if let Ok(val) = std::env::var("EARTH_WIDTH") {
            if let Ok(width) = val.parse() {
                config.width = width;
            }
        }

        if let Ok(val) = std::env::var("EARTH_HEIGHT") {
            if let Ok(height) = val.parse() {
                config.height = height;
            }
        }

        if let Ok(val) = std::env::var("EARTH_PROJECTION") {
            if let Ok(kind) = val.parse() {
                config.projection = kind;
            }
        }

        if let Ok(val) = std::env::var("EARTH_ORIENTATION") {
            if let Ok(orientation) = val.parse() {
                config.orientation = orientation;
            }
        }

        if let Ok(val) = std::env::var("EARTH_FRAMES") {
            if let Ok(frames) = val.parse() {
                config.frames = frames;
            }
        }

        if let Ok(val) = std::env::var("EARTH_FRAME_EVERY") {
            if let Ok(every) = val.parse() {
                config.frame_every = every;
            }
        }

        if let Ok(val) = std::env::var("EARTH_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(val);
        }

        config
    }

    /// Validate the configuration, including nested settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "view must be at least 1x1, got {}x{}",
                self.width, self.height
            ));
        }

        if self.width > 8192 || self.height > 8192 {
            return Err("view dimensions must be <= 8192".to_string());
        }

        if self.frame_every == 0 {
            return Err("frame_every must be > 0".to_string());
        }

        self.field.validate()?;
        self.animation.validate()?;

        Ok(())
    }

    pub fn view(&self) -> View {
        View::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.view(), View::new(1024, 768));
    }

    #[test]
    fn test_nested_config_is_validated() {
        let mut config = ViewerConfig::default();
        config.field.sample_stride = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.animation.fade_alpha = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_view_is_rejected() {
        let config = ViewerConfig {
            width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
