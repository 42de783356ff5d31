//! Browser backend: draws through a [`CanvasRenderingContext2d`].
//!
//! This is the only module that touches `web_sys`. The decoded map bitmap is
//! uploaded once per load generation into a host-supplied scratch canvas and
//! then blitted (scaled, no smoothing) on every frame, so panning and zooming
//! never re-encode pixels.
//!
//! All fallible `Canvas2D` calls map their `JsValue` error into
//! [`RenderError::Backend`].

use std::f64::consts::TAU;

use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::error::RenderError;
use crate::mapper::{Point, Rect, Size};
use crate::render::{Color, MapRaster, Renderer};
use crate::surface::{Action, MapSurface};
use crate::viewport::{WheelInput, WheelResponse};

fn js_err(e: JsValue) -> RenderError {
    RenderError::Backend(format!("{e:?}"))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
    canvas
        .get_context("2d")
        .map_err(js_err)?
        .ok_or_else(|| RenderError::Backend("2d context unavailable".to_owned()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| RenderError::Backend("context is not CanvasRenderingContext2d".to_owned()))
}

/// [`Renderer`] over an HTML canvas.
pub struct CanvasBackend {
    ctx: CanvasRenderingContext2d,
    scratch: HtmlCanvasElement,
    scratch_ctx: CanvasRenderingContext2d,
    /// Generation of the raster currently held by `scratch`.
    uploaded: Option<u64>,
}

impl CanvasBackend {
    /// Bind to `canvas`, using `scratch` (never attached to the page) as the raster cache.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Backend`] when either canvas has no 2D context.
    pub fn new(canvas: &HtmlCanvasElement, scratch: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = context_2d(canvas)?;
        let scratch_ctx = context_2d(&scratch)?;
        Ok(Self { ctx, scratch, scratch_ctx, uploaded: None })
    }

    fn upload(&mut self, raster: &MapRaster) -> Result<(), RenderError> {
        if self.uploaded == Some(raster.generation) {
            return Ok(());
        }
        let (width, height) = raster.image.dimensions();
        self.scratch.set_width(width);
        self.scratch.set_height(height);
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(raster.image.as_raw().as_slice()), width, height)
            .map_err(js_err)?;
        self.scratch_ctx.put_image_data(&data, 0.0, 0.0).map_err(js_err)?;
        self.uploaded = Some(raster.generation);
        Ok(())
    }
}

impl Renderer for CanvasBackend {
    fn clear(&mut self, size: Size, background: Color) -> Result<(), RenderError> {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).map_err(js_err)?;
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
        self.ctx.set_fill_style_str(&background.to_css());
        self.ctx.fill_rect(0.0, 0.0, size.width, size.height);
        Ok(())
    }

    fn blit_raster(&mut self, raster: &MapRaster, dest: Rect) -> Result<(), RenderError> {
        self.upload(raster)?;
        self.ctx.set_image_smoothing_enabled(false);
        self.ctx
            .draw_image_with_html_canvas_element_and_dw_and_dh(&self.scratch, dest.x, dest.y, dest.width, dest.height)
            .map_err(js_err)
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<(), RenderError> {
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU).map_err(js_err)?;
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, width: f64, color: Color) -> Result<(), RenderError> {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.set_line_cap("round");
        self.ctx.stroke();
        Ok(())
    }

    fn draw_text(&mut self, text: &str, center: Point, size_px: f64, color: Color) -> Result<(), RenderError> {
        self.ctx.set_font(&format!("{size_px}px sans-serif"));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_text(text, center.x, center.y).map_err(js_err)
    }
}

/// The browser-facing viewer. Wraps a [`MapSurface`] and owns the canvas it draws on.
///
/// The host wires DOM events to the `on_*` methods, calls [`Self::resize`]
/// from its own resize observer, and calls [`Self::render`] once per
/// animation frame.
pub struct MapCanvas {
    canvas: HtmlCanvasElement,
    backend: CanvasBackend,
    pub surface: MapSurface,
}

impl MapCanvas {
    /// # Errors
    ///
    /// Returns [`RenderError::Backend`] when a 2D context cannot be obtained.
    pub fn new(canvas: HtmlCanvasElement, scratch: HtmlCanvasElement) -> Result<Self, RenderError> {
        let backend = CanvasBackend::new(&canvas, scratch)?;
        let size = Size::new(f64::from(canvas.width()), f64::from(canvas.height()));
        Ok(Self { canvas, backend, surface: MapSurface::new(size) })
    }

    /// Resize the backing store and the surface to `width x height` canvas pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v.round() } else { 0.0 };
        let (width, height) = (clean(width), clean(height));
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        // Setting the size wipes the canvas, so always redraw.
        self.surface.mark_dirty();
        self.surface.resize(width, height)
    }

    pub fn on_pointer_down(&mut self, x: f64, y: f64) -> Vec<Action> {
        self.surface.on_pointer_down(Point::new(x, y))
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> Vec<Action> {
        self.surface.on_pointer_move(Point::new(x, y))
    }

    pub fn on_pointer_up(&mut self, x: f64, y: f64) -> Vec<Action> {
        self.surface.on_pointer_up(Point::new(x, y))
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.surface.on_pointer_leave()
    }

    /// The host calls `preventDefault` on the DOM event iff `prevent_default` is set.
    pub fn on_wheel(&mut self, delta_y: f64, cancelable: bool) -> WheelResponse {
        self.surface.on_wheel(WheelInput { delta_y, cancelable })
    }

    /// Draw if anything changed since the last frame.
    ///
    /// # Errors
    ///
    /// Propagates [`RenderError`] from the canvas.
    pub fn render(&mut self) -> Result<bool, RenderError> {
        self.surface.render_if_dirty(&mut self.backend)
    }
}
