//! Error types for the earth crates.

use thiserror::Error;

/// Result type alias using EarthError.
pub type EarthResult<T> = Result<T, EarthError>;

/// Primary error type for grid construction, field interpolation and rendering.
#[derive(Debug, Error)]
pub enum EarthError {
    // === Data Errors ===
    #[error("Missing {component} component for {product}")]
    MissingComponent {
        product: String,
        component: &'static str,
    },

    #[error("Data mismatch: {0}")]
    DataMismatch(String),

    #[error("Invalid grid header: {0}")]
    InvalidHeader(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    // === Interpolation Errors ===
    #[error("Distortion unavailable at lon={lon}, lat={lat}")]
    Distortion { lon: f64, lat: f64 },

    #[error("Projection error: {0}")]
    ProjectionError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EarthError {
    /// Whether the error comes from malformed or incomplete input data.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            EarthError::MissingComponent { .. }
                | EarthError::DataMismatch(_)
                | EarthError::InvalidHeader(_)
                | EarthError::DataReadError(_)
        )
    }

    /// Short message suitable for the status indicator.
    pub fn status_message(&self) -> String {
        match self {
            EarthError::MissingComponent { .. } | EarthError::DataMismatch(_) => {
                format!("Bad data: {}", self)
            }
            EarthError::DataReadError(_) => "Failed to load data".to_string(),
            EarthError::Distortion { .. } | EarthError::ProjectionError(_) => {
                "Failed to interpolate field".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for EarthError {
    fn from(err: std::io::Error) -> Self {
        EarthError::DataReadError(err.to_string())
    }
}

impl From<serde_json::Error> for EarthError {
    fn from(err: serde_json::Error) -> Self {
        EarthError::DataReadError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_component_message() {
        let err = EarthError::MissingComponent {
            product: "wind".to_string(),
            component: "v",
        };
        assert_eq!(err.to_string(), "Missing v component for wind");
        assert!(err.is_data_error());
    }

    #[test]
    fn test_distortion_is_not_data_error() {
        let err = EarthError::Distortion { lon: 10.0, lat: 20.0 };
        assert!(!err.is_data_error());
        assert_eq!(err.status_message(), "Failed to interpolate field");
    }
}
