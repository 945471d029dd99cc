//! Dense per-pixel vector fields for particle animation.
//!
//! A [`Field`] caches, for every visible screen pixel, the distortion-corrected
//! displacement a particle makes per frame and the magnitude of the underlying
//! geographic vector. Building one is expensive (an inverse projection, a bilinear
//! sample and a finite-difference Jacobian per pixel), so it runs as a resumable
//! task that yields after a time budget.
//!
//! # Architecture
//!
//! ```text
//! Grid ──► GridSampler ─┐
//!                       │
//! Projection ──► Mask ──┼──► FieldTask::resume(budget) ──► Step::Yielded { progress }
//!                       │              ▲                         │
//!                       │              └──── sleep(yield) ◄──────┘
//!                       │
//!                       └──► Step::Finished(Field) ──► particles + overlay image
//! ```

pub mod config;
pub mod field;
pub mod interpolator;
pub mod mask;
pub mod sampler;

pub use config::FieldConfig;
pub use field::{Field, FieldCell};
pub use interpolator::{interpolate_field, FieldRequest, FieldTask, OverlaySource, Step, TaskState};
pub use mask::{Mask, MaskBuilder};
pub use sampler::{GridSampler, Sample};
