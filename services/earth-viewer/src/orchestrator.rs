//! Ties layers, the view, the field and the animation together.
//!
//! Each piece of state lives in its own [`Agent`] slot:
//!
//! ```text
//! load_layers ──► primary / overlay ─┐
//!                                    ├──► rebuild_field ──► field ──► start_animation ──► animation
//! set_view ──────► projection ───────┘
//! ```
//!
//! Changing an input cancels everything downstream of it: new layers or a new view
//! cancel the running interpolation and animation, and a new field cancels the
//! animation. Downstream work is started explicitly by the caller once its inputs
//! have settled.

use crate::agent::Agent;
use crate::config::ViewerConfig;
use crate::loader::{load_layer, Layer};
use crate::status::Status;
use earth_common::{
    format_scalar, format_vector, EarthError, EarthResult, ParticleSettings, Product,
};
use field::{
    interpolate_field, Field, FieldRequest, FieldTask, MaskBuilder, OverlaySource, Sample,
};
use projection::{Orientation, Projection, ProjectionKind};
use renderer::{animate, FrameSink, ParticleAnimator, TrailCanvas};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

/// A layer file and the product to build from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRequest {
    pub path: PathBuf,
    pub product: Product,
}

impl LayerRequest {
    pub fn new(path: impl Into<PathBuf>, product: Product) -> Self {
        Self {
            path: path.into(),
            product,
        }
    }
}

/// Result of an animation run that stopped on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationRun {
    pub frames: u64,
}

/// The current projection and what it was built from.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub kind: ProjectionKind,
    pub orientation: Orientation,
    pub projection: Arc<dyn Projection>,
}

/// An interpolated value at an inspected point.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub product: Product,
    pub sample: Sample,
    /// Formatted in the product's default unit, e.g. "270° @ 12 km/h".
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointInfo {
    pub lon: f64,
    pub lat: f64,
    pub primary: Option<Reading>,
    pub overlay: Option<Reading>,
}

pub struct Orchestrator {
    config: ViewerConfig,
    status: Status,
    view: Mutex<Option<ViewState>>,
    primary: Agent<Layer>,
    overlay: Agent<Layer>,
    field: Agent<Field>,
    animation: Agent<AnimationRun>,
}

impl Orchestrator {
    pub fn new(config: ViewerConfig) -> EarthResult<Self> {
        config.validate().map_err(EarthError::InvalidConfig)?;
        let status = Status::new();
        Ok(Self {
            primary: Agent::new("primary", "Loading grid", status.clone()),
            overlay: Agent::new("overlay", "Loading overlay", status.clone()),
            field: Agent::new("field", "Interpolating field", status.clone()),
            animation: Agent::new("animation", "Animating", status.clone()),
            view: Mutex::new(None),
            config,
            status,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn primary(&self) -> &Agent<Layer> {
        &self.primary
    }

    pub fn overlay(&self) -> &Agent<Layer> {
        &self.overlay
    }

    pub fn field(&self) -> &Agent<Field> {
        &self.field
    }

    pub fn animation(&self) -> &Agent<AnimationRun> {
        &self.animation
    }

    pub fn view_state(&self) -> Option<ViewState> {
        self.view.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Build and install a projection for the configured view size.
    #[instrument(skip(self))]
    pub fn set_view(&self, kind: ProjectionKind, orientation: Orientation) -> EarthResult<()> {
        let projection = kind
            .build(self.config.view(), orientation)
            .map_err(|e| EarthError::ProjectionError(e.to_string()))
            .map_err(|e| self.report("view", e))?;

        self.field.cancel();
        self.animation.cancel();
        *self.view.lock().unwrap_or_else(|e| e.into_inner()) = Some(ViewState {
            kind,
            orientation,
            projection,
        });
        self.status.complete("view");
        info!(projection = %kind, lon = orientation.lon, lat = orientation.lat, "View set");
        Ok(())
    }

    /// Start loading the primary layer and, optionally, a distinct overlay layer.
    /// Without an overlay request the overlay slot is cleared and the overlay is
    /// colored by the primary magnitude. Returns the primary epoch.
    #[instrument(skip(self))]
    pub fn load_layers(&self, primary: LayerRequest, overlay: Option<LayerRequest>) -> u64 {
        self.field.cancel();
        self.animation.cancel();

        match overlay {
            Some(request) => {
                self.overlay.submit(move |ctx| async move {
                    let layer = load_layer(&request.path, request.product).await?;
                    Ok((!ctx.is_cancelled()).then_some(layer))
                });
            }
            None => self.overlay.clear(),
        }

        self.primary.submit(move |ctx| async move {
            let layer = load_layer(&primary.path, primary.product).await?;
            Ok((!ctx.is_cancelled()).then_some(layer))
        })
    }

    /// Start interpolating a field from the current primary layer and view.
    ///
    /// Fails immediately when no primary layer or view is available, or when the
    /// primary product cannot be animated.
    #[instrument(skip(self))]
    pub fn rebuild_field(&self) -> EarthResult<u64> {
        let layer = self
            .primary
            .value()
            .ok_or_else(|| EarthError::InvalidConfig("no primary layer loaded".to_string()))
            .map_err(|e| self.report("field", e))?;
        let settings = particle_settings(layer.product).map_err(|e| self.report("field", e))?;
        let view_state = self
            .view_state()
            .ok_or_else(|| EarthError::InvalidConfig("no view set".to_string()))
            .map_err(|e| self.report("field", e))?;

        self.animation.cancel();

        let overlay = match self.overlay.value() {
            Some(overlay) => OverlaySource::Grid {
                sampler: overlay.sampler.clone(),
                scale: overlay.product.scale(),
            },
            None => OverlaySource::Magnitude(layer.product.scale()),
        };
        let request = FieldRequest {
            primary: layer.sampler.clone(),
            overlay,
            projection: view_state.projection,
            velocity_scale: settings.velocity_scale,
        };
        let view = self.config.view();
        let config = self.config.field.clone();

        Ok(self.field.submit(move |ctx| async move {
            let mask = MaskBuilder::build(request.projection.as_ref(), view)?;
            let task = FieldTask::new(request, mask, config, ctx.cancel_flag().clone())?;
            interpolate_field(task, |progress| ctx.progress(progress)).await
        }))
    }

    /// Start animating particles over the current field, handing each frame to
    /// `sink`. The run completes when the sink stops it; a newer field, view or
    /// layer cancels it.
    #[instrument(skip(self, sink))]
    pub fn start_animation<S>(&self, sink: S) -> EarthResult<u64>
    where
        S: FrameSink + 'static,
    {
        let field = self
            .field
            .value()
            .ok_or_else(|| EarthError::InvalidConfig("no field available".to_string()))
            .map_err(|e| self.report("animation", e))?;
        let layer = self
            .primary
            .value()
            .ok_or_else(|| EarthError::InvalidConfig("no primary layer loaded".to_string()))
            .map_err(|e| self.report("animation", e))?;
        let settings = particle_settings(layer.product).map_err(|e| self.report("animation", e))?;
        let config = self.config.animation.clone();
        let view = self.config.view();

        Ok(self.animation.submit(move |ctx| async move {
            let mut sink = sink;
            let animator =
                ParticleAnimator::new(field, settings, config, ctx.cancel_flag().clone())?;
            let canvas = TrailCanvas::new(view)?;
            let frames = animate(animator, canvas, &mut sink).await?;
            Ok(Some(AnimationRun { frames }))
        }))
    }

    /// Un-project a pixel and sample the current layers there.
    pub fn inspect(&self, x: f64, y: f64) -> Option<PointInfo> {
        let view_state = self.view_state()?;
        let (lon, lat) = view_state.projection.invert(x, y)?;
        Some(PointInfo {
            lon,
            lat,
            primary: self.primary.value().and_then(|l| read(&l, lon, lat)),
            overlay: self.overlay.value().and_then(|l| read(&l, lon, lat)),
        })
    }

    /// Cancel every running task. Published values are kept.
    pub fn cancel_all(&self) {
        self.primary.cancel();
        self.overlay.cancel();
        self.field.cancel();
        self.animation.cancel();
    }

    /// Wait for every submitted task to finish.
    pub async fn settle(&self) {
        self.primary.settle().await;
        self.overlay.settle().await;
        self.field.settle().await;
        self.animation.settle().await;
    }

    fn report(&self, source: &str, error: EarthError) -> EarthError {
        self.status.error(source, error.status_message());
        error
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("primary", &self.primary)
            .field("overlay", &self.overlay)
            .field("field", &self.field)
            .field("animation", &self.animation)
            .finish()
    }
}

fn particle_settings(product: Product) -> EarthResult<ParticleSettings> {
    product.particles().ok_or_else(|| {
        EarthError::InvalidConfig(format!("{} has no particle animation", product))
    })
}

fn read(layer: &Layer, lon: f64, lat: f64) -> Option<Reading> {
    let sample = layer.sampler.interpolate(lon, lat)?;
    let unit = layer.product.default_unit();
    let text = match sample {
        Sample::Vector { u, v, .. } => format_vector(u, v, unit),
        Sample::Scalar(value) => format_scalar(value, unit),
    };
    Some(Reading {
        product: layer.product,
        sample,
        text,
    })
}
