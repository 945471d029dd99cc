//! Resumable field interpolation.
//!
//! [`FieldTask`] walks the visible columns left to right. Each call to
//! [`FieldTask::resume`] processes whole columns until the time budget is spent,
//! then reports progress and returns, keeping its cursor for the next call.
//! [`interpolate_field`] drives a task to completion on the tokio runtime,
//! sleeping between slices so other tasks get to run.

use crate::field::Column;
use crate::{Field, FieldCell, FieldConfig, GridSampler, Mask, Sample};
use earth_common::{
    CancelFlag, ColorScale, EarthError, EarthResult, GridKind, TRANSPARENT_BLACK,
};
use projection::{distort, Projection, View, ViewBounds};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Where overlay colors come from.
#[derive(Debug, Clone)]
pub enum OverlaySource {
    /// Color by the magnitude of the primary vector.
    Magnitude(ColorScale),
    /// Color by a separate grid sampled at the same point.
    Grid { sampler: GridSampler, scale: ColorScale },
}

/// Everything a field is computed from.
#[derive(Debug, Clone)]
pub struct FieldRequest {
    /// Vector grid the particles follow.
    pub primary: GridSampler,
    pub overlay: OverlaySource,
    pub projection: Arc<dyn Projection>,
    /// Product velocity scale; multiplied by the bounds height.
    pub velocity_scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Outcome of one slice.
#[derive(Debug)]
pub enum Step {
    /// Budget exhausted; fraction of columns done so far.
    Yielded { progress: f64 },
    Finished(Field),
    Cancelled,
}

/// A field computation that can be suspended between columns.
pub struct FieldTask {
    request: FieldRequest,
    config: FieldConfig,
    cancel: CancelFlag,
    state: TaskState,
    view: View,
    bounds: ViewBounds,
    velocity_scale: f64,
    mask: Mask,
    columns: Vec<Option<Column>>,
    x: usize,
    started: Option<Instant>,
}

impl FieldTask {
    /// Prepare a task over `mask`, which must have been built for `request.projection`.
    pub fn new(
        request: FieldRequest,
        mask: Mask,
        config: FieldConfig,
        cancel: CancelFlag,
    ) -> EarthResult<Self> {
        config.validate().map_err(EarthError::InvalidConfig)?;
        if request.primary.kind() != GridKind::Vector {
            return Err(EarthError::InvalidConfig(
                "field interpolation needs a vector grid".to_string(),
            ));
        }

        let view = mask.view();
        let bounds = ViewBounds::for_projection(request.projection.as_ref(), view);
        let velocity_scale = bounds.height as f64 * request.velocity_scale;

        Ok(Self {
            request,
            config,
            cancel,
            state: TaskState::Idle,
            view,
            bounds,
            velocity_scale,
            mask,
            columns: vec![None; view.width],
            x: bounds.x,
            started: None,
        })
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn bounds(&self) -> ViewBounds {
        self.bounds
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Fraction of columns processed.
    pub fn progress(&self) -> f64 {
        let done = self.x.saturating_sub(self.bounds.x).min(self.bounds.width);
        done as f64 / self.bounds.width as f64
    }

    /// Run until the field is complete or `budget` has elapsed.
    ///
    /// The cancel flag is checked before any work. Resuming a task that already
    /// finished, failed or was cancelled is an error.
    pub fn resume(&mut self, budget: Duration) -> EarthResult<Step> {
        match self.state {
            TaskState::Idle => {
                self.state = TaskState::Running;
                self.started = Some(Instant::now());
                debug!(
                    x = self.bounds.x,
                    x_max = self.bounds.x_max,
                    y = self.bounds.y,
                    y_max = self.bounds.y_max,
                    "Field interpolation started"
                );
            }
            TaskState::Running => {}
            state => {
                return Err(EarthError::InternalError(format!(
                    "cannot resume field task in state {:?}",
                    state
                )));
            }
        }

        if self.cancel.is_cancelled() {
            self.state = TaskState::Cancelled;
            self.columns = Vec::new();
            debug!(progress = self.progress(), "Field interpolation cancelled");
            return Ok(Step::Cancelled);
        }

        let slice_start = Instant::now();
        let stride = self.config.sample_stride;
        while self.x <= self.bounds.x_max {
            if let Err(e) = self.interpolate_column(self.x) {
                self.state = TaskState::Failed;
                self.columns = Vec::new();
                return Err(e);
            }
            self.x += stride;

            if self.x <= self.bounds.x_max && slice_start.elapsed() > budget {
                return Ok(Step::Yielded {
                    progress: self.progress(),
                });
            }
        }

        self.state = TaskState::Completed;
        let field = Field::new(
            self.view,
            self.bounds,
            std::mem::take(&mut self.columns),
            std::mem::replace(&mut self.mask, Mask::empty(View::new(0, 0))),
        );
        info!(
            elapsed_ms = self.started.map(|s| s.elapsed().as_millis()).unwrap_or(0),
            columns = self.bounds.width,
            defined = field.defined_count(),
            "Field interpolation complete"
        );
        Ok(Step::Finished(field))
    }

    /// Run to completion without yielding. `Ok(None)` if cancelled.
    pub fn run_to_completion(mut self) -> EarthResult<Option<Field>> {
        match self.resume(Duration::MAX)? {
            Step::Finished(field) => Ok(Some(field)),
            Step::Cancelled => Ok(None),
            Step::Yielded { .. } => Err(EarthError::InternalError(
                "field task yielded with an unbounded budget".to_string(),
            )),
        }
    }

    /// Fill columns `x..x + stride` by sampling one pixel per `stride × stride` block.
    /// Only the block's mask-visible pixels receive the cell and its color; the rest
    /// stay `Outside`.
    fn interpolate_column(&mut self, x: usize) -> EarthResult<()> {
        let stride = self.config.sample_stride;
        let span = stride.min(self.view.width.saturating_sub(x));
        let mut columns = vec![vec![FieldCell::Outside; self.view.height]; span];

        for y in (self.bounds.y..=self.bounds.y_max).step_by(stride) {
            let rows = stride.min(self.view.height.saturating_sub(y));
            // Visibility is read before any color in the block is written.
            let visible: Vec<(usize, usize)> = (0..span)
                .flat_map(|dx| (0..rows).map(move |dy| (dx, dy)))
                .filter(|&(dx, dy)| self.mask.is_visible(x + dx, y + dy))
                .collect();
            let Some(&(sx, sy)) = visible.first() else {
                continue;
            };

            let (cell, color) = self.interpolate_pixel(x + sx, y + sy)?;
            for (dx, dy) in visible {
                columns[dx][y + dy] = cell;
                self.mask.set(x + dx, y + dy, color);
            }
        }

        // Identical neighbours share one allocation.
        let mut built: Vec<Column> = Vec::with_capacity(span);
        for cells in columns {
            let column = match built.first() {
                Some(first) if first[..] == cells[..] => first.clone(),
                _ => Arc::from(cells),
            };
            built.push(column);
        }
        for (dx, column) in built.into_iter().enumerate() {
            self.columns[x + dx] = Some(column);
        }
        Ok(())
    }

    fn interpolate_pixel(&self, x: usize, y: usize) -> EarthResult<(FieldCell, [u8; 4])> {
        let (px, py) = (x as f64, y as f64);
        let Some((lon, lat)) = self.request.projection.invert(px, py) else {
            return Ok((FieldCell::Hole, TRANSPARENT_BLACK));
        };
        if !lon.is_finite() {
            return Ok((FieldCell::Hole, TRANSPARENT_BLACK));
        }

        let mut cell = FieldCell::Hole;
        let mut scalar = None;
        let primary = self.request.primary.interpolate(lon, lat);
        if let Some(Sample::Vector { u, v, magnitude }) = primary {
            let projection = self.request.projection.as_ref();
            let [dx, dy] = distort(projection, lon, lat, px, py, self.velocity_scale, [u, v])
                .ok_or(EarthError::Distortion { lon, lat })?;
            cell = FieldCell::Vector { dx, dy, magnitude };
            scalar = Some(magnitude);
        }

        let scale = match &self.request.overlay {
            OverlaySource::Magnitude(scale) => scale,
            OverlaySource::Grid { sampler, scale } => {
                scalar = sampler.interpolate(lon, lat).map(|s| s.value());
                scale
            }
        };

        let color = match scalar {
            Some(value) if value.is_finite() => scale.gradient(value, self.config.overlay_alpha),
            _ => TRANSPARENT_BLACK,
        };
        Ok((cell, color))
    }
}

impl std::fmt::Debug for FieldTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldTask")
            .field("state", &self.state)
            .field("bounds", &self.bounds)
            .field("x", &self.x)
            .finish()
    }
}

/// Drive `task` to completion, sleeping `yield_delay` between slices.
///
/// `on_progress` sees the fraction done after every slice and `1.0` on completion.
/// Returns `Ok(None)` when the task's cancel flag is set before it finishes.
pub async fn interpolate_field<F>(
    mut task: FieldTask,
    mut on_progress: F,
) -> EarthResult<Option<Field>>
where
    F: FnMut(f64),
{
    let budget = task.config.time_budget();
    let delay = task.config.yield_delay();
    loop {
        match task.resume(budget)? {
            Step::Yielded { progress } => {
                on_progress(progress);
                tokio::time::sleep(delay).await;
            }
            Step::Finished(field) => {
                on_progress(1.0);
                return Ok(Some(field));
            }
            Step::Cancelled => return Ok(None),
        }
    }
}
