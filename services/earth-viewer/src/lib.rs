//! Earth viewer service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod agent;
pub mod config;
pub mod loader;
pub mod orchestrator;
pub mod output;
pub mod status;

pub use agent::{Agent, AgentEvent, TaskContext};
pub use config::ViewerConfig;
pub use loader::{load_layer, read_records, Layer};
pub use orchestrator::{AnimationRun, LayerRequest, Orchestrator, PointInfo, Reading, ViewState};
pub use output::{write_overlay, PngFrameSink};
pub use status::{Status, StatusLevel, StatusSnapshot};
