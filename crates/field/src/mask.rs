//! Visibility mask and overlay image.
//!
//! The mask is an RGBA buffer the size of the view. Rasterizing the projection's
//! outline marks pixels on the sphere with an opaque sentinel color; the
//! interpolator then overwrites visited pixels with overlay colors, so the same
//! buffer ends up holding the rendered overlay.

use earth_common::{EarthError, EarthResult, Rgba, TRANSPARENT_BLACK};
use projection::{Projection, View};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use tracing::debug;

/// Opaque red marks "inside the outline" until overwritten.
const SENTINEL: Rgba = [255, 0, 0, 255];

/// RGBA pixels, non-premultiplied, row-major. Alpha > 0 means visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    view: View,
    data: Vec<u8>,
}

impl Mask {
    /// A mask with no visible pixels.
    pub fn empty(view: View) -> Self {
        Self {
            view,
            data: vec![0; view.pixel_count() * 4],
        }
    }

    /// A mask with every pixel visible.
    pub fn full(view: View) -> Self {
        let mut data = Vec::with_capacity(view.pixel_count() * 4);
        for _ in 0..view.pixel_count() {
            data.extend_from_slice(&SENTINEL);
        }
        Self { view, data }
    }

    pub fn view(&self) -> View {
        self.view
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.view.width && y < self.view.height {
            Some((y * self.view.width + x) * 4)
        } else {
            None
        }
    }

    pub fn is_visible(&self, x: usize, y: usize) -> bool {
        self.offset(x, y).is_some_and(|i| self.data[i + 3] > 0)
    }

    /// Color at `(x, y)`; transparent outside the view.
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        match self.offset(x, y) {
            Some(i) => [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]],
            None => TRANSPARENT_BLACK,
        }
    }

    /// Overwrite the color at `(x, y)`. Out-of-view coordinates are ignored.
    pub fn set(&mut self, x: usize, y: usize, rgba: Rgba) -> &mut Self {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
        self
    }

    pub fn visible_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    pub fn rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }
}

/// Rasterizes projection outlines into masks.
pub struct MaskBuilder;

impl MaskBuilder {
    /// Fill the projection's outline without anti-aliasing, so every pixel is
    /// either fully in or fully out.
    pub fn build<P: Projection + ?Sized>(projection: &P, view: View) -> EarthResult<Mask> {
        let mut pixmap = Pixmap::new(view.width as u32, view.height as u32).ok_or_else(|| {
            EarthError::RenderError(format!(
                "cannot allocate {}x{} mask",
                view.width, view.height
            ))
        })?;

        let outline = projection.outline();
        let mut pb = PathBuilder::new();
        let mut points = outline
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite());
        if let Some(&(x, y)) = points.next() {
            pb.move_to(x as f32, y as f32);
            for &(x, y) in points {
                pb.line_to(x as f32, y as f32);
            }
            pb.close();
        }

        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color_rgba8(SENTINEL[0], SENTINEL[1], SENTINEL[2], SENTINEL[3]);
            paint.anti_alias = false;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        // The sentinel is opaque, so premultiplied and straight alpha agree.
        let mask = Mask {
            view,
            data: pixmap.data().to_vec(),
        };
        debug!(
            projection = projection.name(),
            width = view.width,
            height = view.height,
            visible = mask.visible_count(),
            "Built mask"
        );
        Ok(mask)
    }
}
