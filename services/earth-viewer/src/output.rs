//! Writing overlays and animation frames to disk.

use earth_common::{EarthError, EarthResult};
use field::Field;
use renderer::png::encode_png_auto;
use renderer::{FrameSink, SinkControl, TrailCanvas};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write the field's overlay image as `overlay.png` in `dir`.
pub fn write_overlay(dir: &Path, field: &Field) -> EarthResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let overlay = field.overlay();
    let view = overlay.view();
    let png = encode_png_auto(overlay.rgba(), view.width, view.height)?;
    let path = dir.join("overlay.png");
    std::fs::write(&path, &png)?;
    info!(path = %path.display(), bytes = png.len(), "Wrote overlay");
    Ok(path)
}

/// Writes every n-th frame, composited over a background, and stops after a fixed
/// number of frames.
#[derive(Debug)]
pub struct PngFrameSink {
    dir: PathBuf,
    background: Vec<u8>,
    every: u64,
    limit: u64,
    written: Vec<PathBuf>,
}

impl PngFrameSink {
    /// `background` is RGBA for the same view as the frames, usually the overlay.
    /// A `limit` of 0 runs until cancelled.
    pub fn new(dir: impl Into<PathBuf>, background: Vec<u8>, every: u64, limit: u64) -> Self {
        Self {
            dir: dir.into(),
            background,
            every: every.max(1),
            limit,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, index: u64, canvas: &TrailCanvas) -> EarthResult<()> {
        let view = canvas.view();
        let pixels = canvas.composite_over(&self.background)?;
        let png = encode_png_auto(&pixels, view.width, view.height)?;
        let path = self.dir.join(format!("frame-{:04}.png", index));
        std::fs::write(&path, &png)
            .map_err(|e| EarthError::RenderError(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = png.len(), "Wrote frame");
        self.written.push(path);
        Ok(())
    }
}

impl FrameSink for PngFrameSink {
    fn frame(&mut self, index: u64, canvas: &TrailCanvas) -> EarthResult<SinkControl> {
        if index == 0 {
            std::fs::create_dir_all(&self.dir)?;
        }
        if index % self.every == 0 {
            self.write(index, canvas)?;
        }
        if self.limit > 0 && index + 1 >= self.limit {
            return Ok(SinkControl::Stop);
        }
        Ok(SinkControl::Continue)
    }
}
