//! Drawing backends.
//!
//! The engine never talks to a graphics API directly. It draws through the
//! four-call [`Renderer`] capability (plus `clear`), which has three
//! implementations:
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`RecordingRenderer`] | Headless; records every call for assertions |
//! | [`RasterRenderer`] | Native; paints into an `image::RgbaImage` |
//! | [`crate::web::CanvasBackend`] | Browser; HTML canvas 2D context |
//!
//! All coordinates handed to a renderer are canvas pixels.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::consts::MAX_CANVAS_PX;
use crate::error::RenderError;
use crate::glyphs;
use crate::mapper::{Point, Rect, Size};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb` or `#rrggbb`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        match digits.len() {
            3 => {
                let mut channels = digits.chars().map(|c| c.to_digit(16));
                let r = channels.next()??;
                let g = channels.next()??;
                let b = channels.next()??;
                #[allow(clippy::cast_possible_truncation)]
                Some(Self::rgb((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
            }
            6 => {
                match u32::from_str_radix(digits, 16) {
                    Ok(value) => {
                        let [_, r, g, b] = value.to_be_bytes();
                        Some(Self::rgb(r, g, b))
                    }
                    Err(_) => None,
                }
            }
            _ => None,
        }
    }

    /// CSS color string, `#rrggbb` when opaque.
    #[must_use]
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, f64::from(self.a) / 255.0)
        }
    }

    #[must_use]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// A decoded map bitmap tagged with the load that produced it.
///
/// Backends that upload the bitmap somewhere (a GPU texture, an offscreen
/// canvas) key their cache on `generation`.
#[derive(Debug, Clone)]
pub struct MapRaster {
    pub generation: u64,
    pub image: RgbaImage,
}

/// Minimal 2D drawing capability the engine renders through.
///
/// # Errors
///
/// Every method returns [`RenderError::Backend`] when the backend rejects a call.
pub trait Renderer {
    /// Reset the whole surface to `background`.
    fn clear(&mut self, size: Size, background: Color) -> Result<(), RenderError>;

    /// Draw `raster` scaled into `dest`, nearest-neighbour, no smoothing.
    fn blit_raster(&mut self, raster: &MapRaster, dest: Rect) -> Result<(), RenderError>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<(), RenderError>;

    fn draw_line(&mut self, from: Point, to: Point, width: f64, color: Color) -> Result<(), RenderError>;

    /// Draw `text` centered on `center`.
    fn draw_text(&mut self, text: &str, center: Point, size_px: f64, color: Color) -> Result<(), RenderError>;
}

// =============================================================
// Recording backend
// =============================================================

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear { size: Size, background: Color },
    Blit { generation: u64, dest: Rect },
    Circle { center: Point, radius: f64, color: Color },
    Line { from: Point, to: Point, width: f64, color: Color },
    Text { text: String, center: Point, size_px: f64, color: Color },
}

/// Headless backend that records draw calls instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, size: Size, background: Color) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Clear { size, background });
        Ok(())
    }

    fn blit_raster(&mut self, raster: &MapRaster, dest: Rect) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Blit { generation: raster.generation, dest });
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Circle { center, radius, color });
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, width: f64, color: Color) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Line { from, to, width, color });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, center: Point, size_px: f64, color: Color) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Text { text: text.to_owned(), center, size_px, color });
        Ok(())
    }
}

// =============================================================
// Raster backend
// =============================================================

/// Native backend painting into an RGBA image (snapshots, headless hosts).
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    canvas: RgbaImage,
}

impl RasterRenderer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { canvas: RgbaImage::new(width, height) }
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }
}

impl Renderer for RasterRenderer {
    fn clear(&mut self, size: Size, background: Color) -> Result<(), RenderError> {
        let (width, height) = (to_pixels(size.width), to_pixels(size.height));
        if width > MAX_CANVAS_PX || height > MAX_CANVAS_PX {
            return Err(RenderError::Backend(format!(
                "frame {width}x{height} exceeds {MAX_CANVAS_PX}px per side"
            )));
        }
        if self.canvas.dimensions() != (width, height) {
            self.canvas = RgbaImage::new(width, height);
        }
        let fill = background.to_rgba();
        for px in self.canvas.pixels_mut() {
            *px = fill;
        }
        Ok(())
    }

    fn blit_raster(&mut self, raster: &MapRaster, dest: Rect) -> Result<(), RenderError> {
        let (src_w, src_h) = raster.image.dimensions();
        if src_w == 0 || src_h == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return Ok(());
        }
        let (canvas_w, canvas_h) = self.canvas.dimensions();
        let x0 = clamp_pixel(dest.x.floor(), canvas_w);
        let x1 = clamp_pixel((dest.x + dest.width).ceil(), canvas_w);
        let y0 = clamp_pixel(dest.y.floor(), canvas_h);
        let y1 = clamp_pixel((dest.y + dest.height).ceil(), canvas_h);
        for py in y0..y1 {
            let v = (f64::from(py) + 0.5 - dest.y) / dest.height;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let sy = sample_index(v, src_h);
            for px in x0..x1 {
                let u = (f64::from(px) + 0.5 - dest.x) / dest.width;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let sx = sample_index(u, src_w);
                self.canvas.put_pixel(px, py, *raster.image.get_pixel(sx, sy));
            }
        }
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<(), RenderError> {
        if !center.is_finite() || !radius.is_finite() {
            return Ok(());
        }
        draw_filled_circle_mut(
            &mut self.canvas,
            (to_i32(center.x), to_i32(center.y)),
            to_i32(radius).max(1),
            color.to_rgba(),
        );
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, width: f64, color: Color) -> Result<(), RenderError> {
        if !from.is_finite() || !to.is_finite() {
            return Ok(());
        }
        let len = from.distance(to);
        // Unit normal, used to thicken the line with parallel strokes.
        let (nx, ny) = if len > 0.0 { (-(to.y - from.y) / len, (to.x - from.x) / len) } else { (0.0, 0.0) };
        let strokes = to_i32(width).max(1);
        let (canvas_w, canvas_h) = self.canvas.dimensions();
        let bounds = Size::new(f64::from(canvas_w), f64::from(canvas_h));
        for k in 0..strokes {
            let t = f64::from(k) - f64::from(strokes - 1) * 0.5;
            let stroke = (Point::new(from.x + nx * t, from.y + ny * t), Point::new(to.x + nx * t, to.y + ny * t));
            // imageproc walks every step of the line, on-canvas or not.
            let Some((a, b)) = clip_segment(stroke.0, stroke.1, bounds) else {
                continue;
            };
            #[allow(clippy::cast_possible_truncation)]
            draw_line_segment_mut(
                &mut self.canvas,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                color.to_rgba(),
            );
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, center: Point, size_px: f64, color: Color) -> Result<(), RenderError> {
        if !center.is_finite() {
            return Ok(());
        }
        let scale = to_i32(size_px / f64::from(glyphs::GLYPH_HEIGHT)).max(1);
        let x = to_i32(center.x) - glyphs::text_width(text, scale) / 2;
        let y = to_i32(center.y) - glyphs::GLYPH_HEIGHT * scale / 2;
        glyphs::draw_text(&mut self.canvas, text, x, y, scale, color.to_rgba());
        Ok(())
    }
}

/// Liang-Barsky clip of `from..to` against the canvas plus a one pixel
/// margin. `None` when the segment misses the canvas entirely.
fn clip_segment(from: Point, to: Point, bounds: Size) -> Option<(Point, Point)> {
    const MARGIN: f64 = 1.0;
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }
    let edges = [
        (-dx, from.x + MARGIN),
        (dx, bounds.width + MARGIN - from.x),
        (-dy, from.y + MARGIN),
        (dy, bounds.height + MARGIN - from.y),
    ];
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in edges {
        if p.abs() < f64::EPSILON {
            // Parallel to this edge: inside or entirely outside.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((Point::new(from.x + t0 * dx, from.y + t0 * dy), Point::new(from.x + t1 * dx, from.y + t1 * dy)))
}

#[allow(clippy::cast_possible_truncation)]
fn to_i32(v: f64) -> i32 {
    v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(v: f64) -> u32 {
    if v.is_finite() { v.round().clamp(0.0, f64::from(u32::MAX)) as u32 } else { 0 }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_pixel(v: f64, limit: u32) -> u32 {
    v.clamp(0.0, f64::from(limit)) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_index(t: f64, len: u32) -> u32 {
    ((t * f64::from(len)) as u32).min(len - 1)
}
