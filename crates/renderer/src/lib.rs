//! Particle animation and image output.
//!
//! Implements:
//! - Particle seeding, evolution and bucketed trail drawing
//! - A fading trail canvas backed by tiny-skia
//! - Particle intensity color scales
//! - PNG encoding for overlays and frames

pub mod canvas;
pub mod config;
pub mod gradient;
pub mod particles;
pub mod png;

pub use canvas::TrailCanvas;
pub use config::AnimationConfig;
pub use gradient::IntensityScale;
pub use particles::{animate, AnimatorState, FrameSink, Particle, ParticleAnimator, SinkControl};
