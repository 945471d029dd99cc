//! Particle animation over a vector field.
//!
//! Each frame every particle looks up the field under it and moves by the stored
//! displacement. Particles whose next position still has data are grouped into
//! buckets by speed and drawn as short segments, one path per bucket. Particles
//! that leave the field or grow too old are respawned at a random pixel.

use crate::canvas::Segment;
use crate::{AnimationConfig, IntensityScale, TrailCanvas};
use earth_common::{CancelFlag, EarthError, EarthResult, ParticleSettings};
use field::{Field, FieldCell};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// One animated particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Position at the end of the current frame.
    pub xt: f64,
    pub yt: f64,
    /// Frames since spawn.
    pub age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Animating,
    Cancelled,
}

/// Whether the frame consumer wants more frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    Stop,
}

/// Receives each drawn frame.
pub trait FrameSink: Send {
    fn frame(&mut self, index: u64, canvas: &TrailCanvas) -> EarthResult<SinkControl>;
}

pub struct ParticleAnimator {
    field: Option<Arc<Field>>,
    config: AnimationConfig,
    scale: IntensityScale,
    particles: Vec<Particle>,
    buckets: Vec<Vec<usize>>,
    rng: StdRng,
    cancel: CancelFlag,
    state: AnimatorState,
    frames: u64,
}

impl ParticleAnimator {
    /// Seed particles over `field`.
    pub fn new(
        field: Arc<Field>,
        settings: ParticleSettings,
        config: AnimationConfig,
        cancel: CancelFlag,
    ) -> EarthResult<Self> {
        config.validate().map_err(EarthError::InvalidConfig)?;
        if !(settings.max_intensity.is_finite() && settings.max_intensity > 0.0) {
            return Err(EarthError::InvalidConfig(format!(
                "max_intensity must be > 0, got {}",
                settings.max_intensity
            )));
        }

        let scale = IntensityScale::gray(config.intensity_scale_step, settings.max_intensity);
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let count = config.particle_count(field.bounds().width);
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let (x, y) = random_position(&field, &mut rng, config.max_random_attempts);
            particles.push(Particle {
                x,
                y,
                xt: x,
                yt: y,
                age: rng.gen_range(0..config.max_age),
            });
        }

        info!(
            particles = count,
            width = field.bounds().width,
            low_power = config.low_power,
            "Seeded particles"
        );

        Ok(Self {
            field: Some(field),
            buckets: vec![Vec::new(); scale.len()],
            config,
            scale,
            particles,
            rng,
            cancel,
            state: AnimatorState::Idle,
            frames: 0,
        })
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Indices into [`particles`](Self::particles) per intensity bucket for the
    /// current frame.
    pub fn buckets(&self) -> &[Vec<usize>] {
        &self.buckets
    }

    pub fn intensity_scale(&self) -> &IntensityScale {
        &self.scale
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Advance every particle one step.
    ///
    /// Afterwards every particle's age is at most `max_age`: particles that left the
    /// field or aged out have already been respawned with age 0.
    pub fn evolve(&mut self) {
        let Some(field) = self.field.as_ref() else {
            return;
        };
        if self.state == AnimatorState::Idle {
            self.state = AnimatorState::Animating;
        }

        for bucket in &mut self.buckets {
            bucket.clear();
        }

        let max_age = self.config.max_age;
        for (i, p) in self.particles.iter_mut().enumerate() {
            let mut age = p.age.saturating_add(1);
            let mut bucket = None;
            match field.get(p.x, p.y) {
                FieldCell::Vector { dx, dy, magnitude } => {
                    let (xt, yt) = (p.x + dx, p.y + dy);
                    if field.is_defined(xt, yt) {
                        p.xt = xt;
                        p.yt = yt;
                        bucket = Some(self.scale.index_for(magnitude));
                    } else {
                        // Passing through a gap; move without drawing.
                        p.x = xt;
                        p.y = yt;
                    }
                }
                FieldCell::Hole | FieldCell::Outside => age = max_age.saturating_add(1),
            }

            if age > max_age {
                let (x, y) = random_position(field, &mut self.rng, self.config.max_random_attempts);
                *p = Particle {
                    x,
                    y,
                    xt: x,
                    yt: y,
                    age: 0,
                };
            } else {
                p.age = age;
                if let Some(b) = bucket {
                    self.buckets[b].push(i);
                }
            }
        }
        self.frames += 1;
    }

    /// Fade old trails, then draw this frame's segments and move drawn particles to
    /// their targets.
    pub fn draw(&mut self, canvas: &mut TrailCanvas) -> EarthResult<()> {
        let Some(field) = self.field.as_ref() else {
            return Ok(());
        };
        canvas.fade(self.config.fade_alpha, &field.bounds())?;

        let mut segments: Vec<Segment> = Vec::new();
        for (bucket, color) in self.buckets.iter().zip(self.scale.colors()) {
            if bucket.is_empty() {
                continue;
            }
            segments.clear();
            for &i in bucket {
                let p = &mut self.particles[i];
                segments.push((p.x, p.y, p.xt, p.yt));
                p.x = p.xt;
                p.y = p.yt;
            }
            canvas.stroke_segments(*color, self.config.line_width, &segments);
        }
        Ok(())
    }

    /// Stop animating and drop the particles and the field reference.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.stop();
    }

    /// Drop the particles and the field reference without raising the cancel flag,
    /// so whoever owns the flag can still tell a finished run from a cancelled one.
    fn stop(&mut self) {
        if self.state == AnimatorState::Cancelled {
            return;
        }
        self.state = AnimatorState::Cancelled;
        self.field = None;
        self.particles = Vec::new();
        self.buckets = Vec::new();
        debug!(frames = self.frames, "Animation cancelled");
    }
}

impl std::fmt::Debug for ParticleAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleAnimator")
            .field("state", &self.state)
            .field("particles", &self.particles.len())
            .field("frames", &self.frames)
            .finish()
    }
}

/// A uniformly random pixel within the field bounds, redrawn up to `attempts` extra
/// times while it has no data. Always returns a position.
fn random_position(field: &Field, rng: &mut StdRng, attempts: u32) -> (f64, f64) {
    let bounds = field.bounds();
    let mut draw = || {
        (
            rng.gen_range(bounds.x..=bounds.x_max) as f64,
            rng.gen_range(bounds.y..=bounds.y_max) as f64,
        )
    };
    let mut pos = draw();
    for _ in 0..attempts {
        if field.is_defined(pos.0, pos.1) {
            break;
        }
        pos = draw();
    }
    pos
}

/// Run `animator` on a fixed frame interval until its cancel flag is set or `sink`
/// asks to stop. Returns the number of frames drawn.
///
/// On return the animator is stopped, so no further frames are scheduled and the
/// field is released.
pub async fn animate<S>(
    mut animator: ParticleAnimator,
    mut canvas: TrailCanvas,
    sink: &mut S,
) -> EarthResult<u64>
where
    S: FrameSink + ?Sized,
{
    let mut interval = tokio::time::interval(animator.config.frame_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut drawn = 0;
    loop {
        interval.tick().await;
        if animator.cancel.is_cancelled() {
            break;
        }

        animator.evolve();
        if let Err(e) = animator.draw(&mut canvas) {
            animator.stop();
            return Err(e);
        }
        let control = match sink.frame(drawn, &canvas) {
            Ok(control) => control,
            Err(e) => {
                animator.stop();
                return Err(e);
            }
        };
        drawn += 1;
        if control == SinkControl::Stop {
            break;
        }
    }

    animator.stop();
    Ok(drawn)
}
