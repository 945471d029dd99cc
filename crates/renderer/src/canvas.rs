//! Trail canvas for particle animation.
//!
//! Each frame first multiplies the existing trails' alpha by a constant below one
//! (destination-in with a translucent fill), then strokes the new segments on top.
//! Old segments therefore fade out over a few dozen frames and leave tails behind
//! moving particles.

use earth_common::{EarthError, EarthResult, Rgba};
use projection::{View, ViewBounds};
use tiny_skia::{
    BlendMode, Color, ColorU8, LineCap, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

/// A line segment from `(x0, y0)` to `(x1, y1)` in pixels.
pub type Segment = (f64, f64, f64, f64);

pub struct TrailCanvas {
    view: View,
    pixmap: Pixmap,
}

impl TrailCanvas {
    /// A fully transparent canvas.
    pub fn new(view: View) -> EarthResult<Self> {
        let pixmap = Pixmap::new(view.width as u32, view.height as u32).ok_or_else(|| {
            EarthError::RenderError(format!(
                "cannot allocate {}x{} canvas",
                view.width, view.height
            ))
        })?;
        Ok(Self { view, pixmap })
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Keep `alpha` of every pixel's opacity inside `bounds`.
    pub fn fade(&mut self, alpha: f32, bounds: &ViewBounds) -> EarthResult<()> {
        let color = Color::from_rgba(0.0, 0.0, 0.0, alpha)
            .ok_or_else(|| EarthError::RenderError(format!("invalid fade alpha {}", alpha)))?;
        let Some(rect) = Rect::from_xywh(
            bounds.x as f32,
            bounds.y as f32,
            bounds.width as f32,
            bounds.height as f32,
        ) else {
            return Ok(());
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.blend_mode = BlendMode::DestinationIn;
        paint.anti_alias = false;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        Ok(())
    }

    /// Stroke all `segments` in one color as a single path.
    pub fn stroke_segments(&mut self, color: Rgba, width: f32, segments: &[Segment]) {
        let mut pb = PathBuilder::new();
        for &(x0, y0, x1, y1) in segments {
            pb.move_to(x0 as f32, y0 as f32);
            pb.line_to(x1 as f32, y1 as f32);
        }
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;

        let stroke = Stroke {
            width,
            line_cap: LineCap::Butt,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Straight-alpha RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.view.pixel_count() * 4);
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Trails drawn over `background` (straight-alpha RGBA of the same size).
    pub fn composite_over(&self, background: &[u8]) -> EarthResult<Vec<u8>> {
        if background.len() != self.view.pixel_count() * 4 {
            return Err(EarthError::RenderError(format!(
                "background has {} bytes, expected {}",
                background.len(),
                self.view.pixel_count() * 4
            )));
        }

        let mut base = Pixmap::new(self.view.width as u32, self.view.height as u32)
            .ok_or_else(|| EarthError::RenderError("cannot allocate composite".to_string()))?;
        for (dst, src) in base.pixels_mut().iter_mut().zip(background.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        base.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        let mut out = Vec::with_capacity(background.len());
        for px in base.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(out)
    }

    /// Alpha at `(x, y)`; zero outside the canvas.
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.view.width || y >= self.view.height {
            return 0;
        }
        self.pixmap
            .pixel(x as u32, y as u32)
            .map(|p| p.alpha())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for TrailCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrailCanvas").field("view", &self.view).finish()
    }
}
