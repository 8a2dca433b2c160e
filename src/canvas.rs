//! The drawing surface the interpreter renders onto.
//!
//! [`Canvas`] is the narrow seam between metafile playback and an actual 2D
//! rasterizer: path construction, fill/stroke, matrix manipulation and one
//! raw-pixel blit. [`PixmapCanvas`] backs it with `tiny-skia`.
//!
//! Coordinates passed to the path methods are logical; the canvas applies
//! its current matrix when the point is appended, so matrix changes midway
//! through a path affect only subsequent segments.

use crate::records::types::RectL;
use image::{imageops, Rgba, RgbaImage};
use tiny_skia::{ColorU8, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

/// Fill rule for path filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// ALTERNATE in GDI terms.
    EvenOdd,
    /// WINDING in GDI terms.
    #[default]
    Winding,
}

/// Affine matrix `[a b c d e f]`: maps `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
pub type Matrix = [f64; 6];

pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m` applied after `n` (column-vector convention).
pub fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[2] * n[1],
        m[1] * n[0] + m[3] * n[1],
        m[0] * n[2] + m[2] * n[3],
        m[1] * n[2] + m[3] * n[3],
        m[0] * n[4] + m[2] * n[5] + m[4],
        m[1] * n[4] + m[3] * n[5] + m[5],
    ]
}

/// 2D drawing interface consumed by the interpreter.
pub trait Canvas {
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn cubic_curve_to(&mut self, cx1: f64, cy1: f64, cx2: f64, cy2: f64, x: f64, y: f64);
    /// Elliptical arc about `(cx, cy)` with radii `(rx, ry)`, from
    /// `start_angle` sweeping `sweep` radians.
    fn arc_to(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep: f64);
    fn close(&mut self);

    /// Fill the accumulated path and discard it.
    fn fill(&mut self);
    /// Stroke the accumulated path and discard it.
    fn stroke(&mut self);
    /// Fill, then stroke, then discard the accumulated path.
    fn fill_stroke(&mut self);

    /// Fully transparent colors switch the corresponding pass off.
    fn set_fill_color(&mut self, color: Rgba<u8>);
    fn set_stroke_color(&mut self, color: Rgba<u8>);
    fn set_line_width(&mut self, width: f64);
    fn set_fill_rule(&mut self, rule: FillRule);

    /// Push the matrix and paint state.
    fn save(&mut self);
    /// Pop the matrix and paint state; no-op on an empty stack.
    fn restore(&mut self);

    fn scale(&mut self, sx: f64, sy: f64);
    fn translate(&mut self, tx: f64, ty: f64);
    fn matrix_transform(&self) -> Matrix;
    fn set_matrix_transform(&mut self, matrix: Matrix);

    /// Composite `source` over the destination rectangle (device
    /// coordinates). The source is resampled to the destination size only
    /// when it is more than one pixel larger in both axes.
    fn blit(&mut self, dest: RectL, source: &RgbaImage);
}

#[derive(Clone, Copy)]
struct PaintState {
    matrix: Matrix,
    fill_color: Rgba<u8>,
    stroke_color: Rgba<u8>,
    line_width: f64,
    fill_rule: FillRule,
}

/// Canvas backed by a `tiny-skia` pixmap. Starts fully transparent with the
/// GDI defaults: black 1-px pen, white brush.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    builder: PathBuilder,
    has_current: bool,
    state: PaintState,
    saved: Vec<PaintState>,
}

impl PixmapCanvas {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let pixmap = Pixmap::new(width, height)?;
        Some(Self {
            pixmap,
            builder: PathBuilder::new(),
            has_current: false,
            state: PaintState {
                matrix: IDENTITY,
                fill_color: Rgba([255, 255, 255, 255]),
                stroke_color: Rgba([0, 0, 0, 255]),
                line_width: 1.0,
                fill_rule: FillRule::default(),
            },
            saved: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Demultiply the pixmap into a plain RGBA image.
    pub fn into_image(self) -> RgbaImage {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut out = RgbaImage::new(w, h);
        for (pixel, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *pixel = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    #[inline]
    fn apply(&self, x: f64, y: f64) -> (f32, f32) {
        let m = &self.state.matrix;
        (
            (m[0] * x + m[2] * y + m[4]) as f32,
            (m[1] * x + m[3] * y + m[5]) as f32,
        )
    }

    fn take_path(&mut self) -> Option<tiny_skia::Path> {
        let builder = std::mem::replace(&mut self.builder, PathBuilder::new());
        self.has_current = false;
        builder.finish()
    }

    fn fill_rule(&self) -> tiny_skia::FillRule {
        match self.state.fill_rule {
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
            FillRule::Winding => tiny_skia::FillRule::Winding,
        }
    }

    fn paint(color: Rgba<u8>) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;
        paint
    }

    fn fill_path(&mut self, path: &tiny_skia::Path) {
        if self.state.fill_color[3] == 0 {
            return;
        }
        self.pixmap.fill_path(
            path,
            &Self::paint(self.state.fill_color),
            self.fill_rule(),
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path) {
        if self.state.stroke_color[3] == 0 {
            return;
        }
        let stroke = Stroke {
            width: self.state.line_width.max(0.1) as f32,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            path,
            &Self::paint(self.state.stroke_color),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

impl Canvas for PixmapCanvas {
    fn begin_path(&mut self) {
        self.builder = PathBuilder::new();
        self.has_current = false;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let (dx, dy) = self.apply(x, y);
        self.builder.move_to(dx, dy);
        self.has_current = true;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let (dx, dy) = self.apply(x, y);
        if self.has_current {
            self.builder.line_to(dx, dy);
        } else {
            self.builder.move_to(dx, dy);
            self.has_current = true;
        }
    }

    fn cubic_curve_to(&mut self, cx1: f64, cy1: f64, cx2: f64, cy2: f64, x: f64, y: f64) {
        let (c1x, c1y) = self.apply(cx1, cy1);
        let (c2x, c2y) = self.apply(cx2, cy2);
        let (dx, dy) = self.apply(x, y);
        if !self.has_current {
            self.builder.move_to(c1x, c1y);
            self.has_current = true;
        }
        self.builder.cubic_to(c1x, c1y, c2x, c2y, dx, dy);
    }

    fn arc_to(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep: f64) {
        if sweep == 0.0 || rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let point = |t: f64| (cx + rx * t.cos(), cy + ry * t.sin());

        let segments = ((sweep.abs() / std::f64::consts::FRAC_PI_2).ceil() as u32).max(1);
        let delta = sweep / segments as f64;
        let alpha = 4.0 / 3.0 * (delta / 4.0).tan();

        let (sx, sy) = point(start_angle);
        if self.has_current {
            self.line_to(sx, sy);
        } else {
            self.move_to(sx, sy);
        }

        let mut theta = start_angle;
        for _ in 0..segments {
            let next = theta + delta;
            let (x0, y0) = point(theta);
            let (x1, y1) = point(next);
            self.cubic_curve_to(
                x0 - alpha * rx * theta.sin(),
                y0 + alpha * ry * theta.cos(),
                x1 + alpha * rx * next.sin(),
                y1 - alpha * ry * next.cos(),
                x1,
                y1,
            );
            theta = next;
        }
    }

    fn close(&mut self) {
        if self.has_current {
            self.builder.close();
        }
    }

    fn fill(&mut self) {
        if let Some(path) = self.take_path() {
            self.fill_path(&path);
        }
    }

    fn stroke(&mut self) {
        if let Some(path) = self.take_path() {
            self.stroke_path(&path);
        }
    }

    fn fill_stroke(&mut self) {
        if let Some(path) = self.take_path() {
            self.fill_path(&path);
            self.stroke_path(&path);
        }
    }

    fn set_fill_color(&mut self, color: Rgba<u8>) {
        self.state.fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Rgba<u8>) {
        self.state.stroke_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.state.fill_rule = rule;
    }

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.matrix = multiply(&self.state.matrix, &[sx, 0.0, 0.0, sy, 0.0, 0.0]);
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.state.matrix = multiply(&self.state.matrix, &[1.0, 0.0, 0.0, 1.0, tx, ty]);
    }

    fn matrix_transform(&self) -> Matrix {
        self.state.matrix
    }

    fn set_matrix_transform(&mut self, matrix: Matrix) {
        self.state.matrix = matrix;
    }

    fn blit(&mut self, dest: RectL, source: &RgbaImage) {
        let dw = dest.width();
        let dh = dest.height();
        if dw <= 0 || dh <= 0 {
            return;
        }

        // Bounds regularly differ from the image size by a single pixel;
        // resampling is expensive, so only do it when the image is clearly
        // larger than the destination.
        let resized;
        let src: &RgbaImage = if source.width() as i64 > dw as i64 + 1
            && source.height() as i64 > dh as i64 + 1
        {
            resized = imageops::resize(source, dw as u32, dh as u32, imageops::FilterType::CatmullRom);
            &resized
        } else {
            source
        };

        let Some(mut overlay) = Pixmap::new(src.width(), src.height()) else {
            return;
        };
        for (dst, px) in overlay.pixels_mut().iter_mut().zip(src.pixels()) {
            *dst = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        }
        self.pixmap.draw_pixmap(
            dest.left,
            dest.top,
            overlay.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(canvas: &PixmapCanvas, x: u32, y: u32) -> u8 {
        canvas.pixmap.pixel(x, y).unwrap().demultiply().alpha()
    }

    #[test]
    fn test_fill_covers_interior() {
        let mut canvas = PixmapCanvas::new(20, 20).unwrap();
        canvas.set_fill_color(Rgba([255, 0, 0, 255]));
        canvas.begin_path();
        canvas.move_to(2.0, 2.0);
        canvas.line_to(18.0, 2.0);
        canvas.line_to(18.0, 18.0);
        canvas.line_to(2.0, 18.0);
        canvas.close();
        canvas.fill();

        let img = canvas.into_image();
        assert_eq!(img.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_transparent_fill_is_skipped() {
        let mut canvas = PixmapCanvas::new(8, 8).unwrap();
        canvas.set_fill_color(Rgba([0, 0, 0, 0]));
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(8.0, 0.0);
        canvas.line_to(8.0, 8.0);
        canvas.close();
        canvas.fill();
        assert_eq!(alpha_at(&canvas, 4, 2), 0);
    }

    #[test]
    fn test_matrix_applies_at_append_time() {
        let mut canvas = PixmapCanvas::new(16, 16).unwrap();
        canvas.translate(8.0, 8.0);
        canvas.set_fill_color(Rgba([0, 255, 0, 255]));
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(6.0, 0.0);
        canvas.line_to(6.0, 6.0);
        canvas.line_to(0.0, 6.0);
        canvas.close();
        canvas.fill();

        assert_eq!(alpha_at(&canvas, 11, 11), 255);
        assert_eq!(alpha_at(&canvas, 4, 4), 0);
    }

    #[test]
    fn test_save_restore_round_trips_matrix() {
        let mut canvas = PixmapCanvas::new(4, 4).unwrap();
        canvas.scale(2.0, 3.0);
        canvas.save();
        canvas.translate(5.0, 7.0);
        assert_ne!(canvas.matrix_transform(), [2.0, 0.0, 0.0, 3.0, 0.0, 0.0]);
        canvas.restore();
        assert_eq!(canvas.matrix_transform(), [2.0, 0.0, 0.0, 3.0, 0.0, 0.0]);
        // restoring past the bottom is a no-op
        canvas.restore();
        assert_eq!(canvas.matrix_transform(), [2.0, 0.0, 0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scale_composes_with_translation() {
        let mut canvas = PixmapCanvas::new(4, 4).unwrap();
        canvas.scale(2.0, 2.0);
        canvas.translate(3.0, 4.0);
        // translation happens in the scaled space
        assert_eq!(canvas.matrix_transform(), [2.0, 0.0, 0.0, 2.0, 6.0, 8.0]);
    }

    #[test]
    fn test_blit_composites_over() {
        let mut canvas = PixmapCanvas::new(10, 10).unwrap();
        let mut src = RgbaImage::new(2, 2);
        for p in src.pixels_mut() {
            *p = Rgba([0, 0, 255, 255]);
        }
        canvas.blit(
            RectL {
                left: 3,
                top: 3,
                right: 5,
                bottom: 5,
            },
            &src,
        );
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(3, 3), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(4, 4), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(6, 6).0[3], 0);
    }
}
