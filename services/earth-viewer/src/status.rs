//! Shared status indicator.
//!
//! One message at a time. Errors are sticky: progress messages from other sources
//! do not overwrite them until [`Status::reset`] is called or the source that failed
//! completes successfully.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Idle,
    Working,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub level: StatusLevel,
    pub message: String,
    /// Slot that set the message.
    pub source: Option<String>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            level: StatusLevel::Idle,
            message: String::new(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Status {
    inner: Arc<Mutex<StatusSnapshot>>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatusSnapshot> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Show a progress message unless an error is showing.
    pub fn working(&self, source: &str, message: impl Into<String>) {
        let mut state = self.lock();
        if state.level == StatusLevel::Error {
            return;
        }
        *state = StatusSnapshot {
            level: StatusLevel::Working,
            message: message.into(),
            source: Some(source.to_string()),
        };
    }

    /// Show an error. It stays until reset or until `source` completes.
    pub fn error(&self, source: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(source, message = %message, "Status error");
        *self.lock() = StatusSnapshot {
            level: StatusLevel::Error,
            message,
            source: Some(source.to_string()),
        };
    }

    /// `source` finished successfully: clear its own message or error.
    pub fn complete(&self, source: &str) {
        let mut state = self.lock();
        if state.source.as_deref() == Some(source) {
            if state.level == StatusLevel::Error {
                debug!(source, "Error cleared by successful run");
            }
            *state = StatusSnapshot::default();
        }
    }

    /// Drop a progress message from `source` without touching errors.
    pub fn idle(&self, source: &str) {
        let mut state = self.lock();
        if state.level == StatusLevel::Working && state.source.as_deref() == Some(source) {
            *state = StatusSnapshot::default();
        }
    }

    /// Clear everything, errors included.
    pub fn reset(&self) {
        *self.lock() = StatusSnapshot::default();
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.lock().clone()
    }

    pub fn is_error(&self) -> bool {
        self.lock().level == StatusLevel::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sticky() {
        let status = Status::new();
        status.error("grid", "Failed to load data");
        status.working("field", "Interpolating...");
        let snap = status.snapshot();
        assert_eq!(snap.level, StatusLevel::Error);
        assert_eq!(snap.message, "Failed to load data");
    }

    #[test]
    fn test_other_source_does_not_clear_error() {
        let status = Status::new();
        status.error("grid", "Bad data");
        status.complete("field");
        assert!(status.is_error());

        status.complete("grid");
        assert_eq!(status.snapshot(), StatusSnapshot::default());
    }

    #[test]
    fn test_reset_clears_error() {
        let status = Status::new();
        status.error("field", "Failed to interpolate field");
        status.reset();
        assert!(!status.is_error());
        status.working("field", "Interpolating... 50%");
        assert_eq!(status.snapshot().level, StatusLevel::Working);
    }

    #[test]
    fn test_idle_keeps_errors() {
        let status = Status::new();
        status.working("animation", "Animating...");
        status.idle("animation");
        assert_eq!(status.snapshot().level, StatusLevel::Idle);

        status.error("animation", "Rendering failed");
        status.idle("animation");
        assert!(status.is_error());
    }
}
