//! Coordinate transforms between world meters, grid cells, and canvas pixels.
//!
//! Canvas placement of the map:
//!
//! ```text
//! fit        = min(cw / (w * res), ch / (h * res)) * FIT_FACTOR
//! s          = fit * view.scale
//! originX    = (cw - w * res * s) / 2
//! originY    = (ch - h * res * s) / 2
//! canvasX    = originX + (wx - origin.x) * s + offset.x
//! canvasY    = originY + (h * res - (wy - origin.y)) * s + offset.y
//! ```
//!
//! World Y grows up, canvas Y grows down. The flip is done in continuous
//! world space (`h * res - relY`) for both the raster placement and every
//! overlay, so points, poses, and the bitmap always agree.

#[cfg(test)]
#[path = "mapper_test.rs"]
mod mapper_test;

use crate::consts::FIT_FACTOR;
use crate::error::CoordinateConversionError;
use crate::model::MapMetadata;
use crate::viewport::ViewState;

/// A point in world meters or canvas pixels, depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Container size in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Index of a grid cell; `row` 0 is the bottom row of the occupancy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndex {
    pub col: u32,
    pub row: u32,
}

impl GridIndex {
    /// Row of this cell in the top-down bitmap.
    #[must_use]
    pub fn bitmap_row(self, height: u32) -> u32 {
        height - 1 - self.row
    }
}

/// Stateless transform for one map, one view state, and one container size.
///
/// Cheap to build; construct a fresh one whenever any input changes.
#[derive(Debug, Clone, Copy)]
pub struct WorldPixelMapper {
    metadata: MapMetadata,
    view: ViewState,
    container: Size,
}

impl WorldPixelMapper {
    #[must_use]
    pub fn new(metadata: &MapMetadata, view: &ViewState, container: Size) -> Self {
        Self { metadata: *metadata, view: *view, container }
    }

    /// Scale (canvas px per meter) that fits the whole map inside the container with margin.
    #[must_use]
    pub fn fit_scale(&self) -> f64 {
        let sx = self.container.width / self.metadata.world_width();
        let sy = self.container.height / self.metadata.world_height();
        sx.min(sy) * FIT_FACTOR
    }

    /// Fit scale multiplied by the user zoom.
    #[must_use]
    pub fn effective_scale(&self) -> f64 {
        self.fit_scale() * self.view.scale
    }

    /// Canvas position of the map's top-left corner before panning.
    #[must_use]
    pub fn canvas_origin(&self) -> Point {
        let s = self.effective_scale();
        Point::new(
            (self.container.width - self.metadata.world_width() * s) * 0.5,
            (self.container.height - self.metadata.world_height() * s) * 0.5,
        )
    }

    /// World meters to canvas pixels.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateConversionError`] when the effective scale is
    /// degenerate or the result is not finite.
    pub fn world_to_canvas(&self, world: Point) -> Result<Point, CoordinateConversionError> {
        let s = self.checked_scale()?;
        let origin = self.metadata.origin();
        let canvas_origin = self.canvas_origin();
        let rel_x = world.x - origin.x;
        let rel_y = world.y - origin.y;
        finite(Point::new(
            canvas_origin.x + rel_x * s + self.view.offset.x,
            canvas_origin.y + (self.metadata.world_height() - rel_y) * s + self.view.offset.y,
        ))
    }

    /// Canvas pixels to world meters; the exact inverse of [`Self::world_to_canvas`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateConversionError`] when the effective scale is
    /// degenerate or any value is not finite. Never returns a guessed point.
    pub fn canvas_to_world(&self, canvas: Point) -> Result<Point, CoordinateConversionError> {
        if !canvas.is_finite() {
            return Err(CoordinateConversionError::NonFinite);
        }
        let s = self.checked_scale()?;
        let origin = self.metadata.origin();
        let canvas_origin = self.canvas_origin();
        let rel_x = (canvas.x - self.view.offset.x - canvas_origin.x) / s;
        let rel_y = self.metadata.world_height() - (canvas.y - self.view.offset.y - canvas_origin.y) / s;
        finite(Point::new(origin.x + rel_x, origin.y + rel_y))
    }

    /// Canvas rectangle covered by the whole map bitmap.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::world_to_canvas`].
    pub fn raster_rect(&self) -> Result<Rect, CoordinateConversionError> {
        let s = self.checked_scale()?;
        let origin = self.metadata.origin();
        let top_left = self.world_to_canvas(Point::new(origin.x, origin.y + self.metadata.world_height()))?;
        Ok(Rect {
            x: top_left.x,
            y: top_left.y,
            width: self.metadata.world_width() * s,
            height: self.metadata.world_height() * s,
        })
    }

    /// Grid cell containing `world`, or `None` outside the map.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn world_to_grid(&self, world: Point) -> Option<GridIndex> {
        if !world.is_finite() {
            return None;
        }
        let origin = self.metadata.origin();
        let res = self.metadata.resolution();
        let col = ((world.x - origin.x) / res).floor();
        let row = ((world.y - origin.y) / res).floor();
        if col < 0.0 || row < 0.0 || col >= f64::from(self.metadata.width()) || row >= f64::from(self.metadata.height())
        {
            return None;
        }
        Some(GridIndex { col: col as u32, row: row as u32 })
    }

    /// World position of the center of grid cell `index`.
    #[must_use]
    pub fn grid_to_world(&self, index: GridIndex) -> Point {
        let origin = self.metadata.origin();
        let res = self.metadata.resolution();
        Point::new(
            origin.x + (f64::from(index.col) + 0.5) * res,
            origin.y + (f64::from(index.row) + 0.5) * res,
        )
    }

    fn checked_scale(&self) -> Result<f64, CoordinateConversionError> {
        let s = self.effective_scale();
        if !s.is_finite() || s <= 0.0 {
            return Err(CoordinateConversionError::DegenerateScale(s));
        }
        Ok(s)
    }
}

fn finite(p: Point) -> Result<Point, CoordinateConversionError> {
    if p.is_finite() { Ok(p) } else { Err(CoordinateConversionError::NonFinite) }
}
