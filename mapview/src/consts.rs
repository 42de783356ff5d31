//! Shared numeric constants for the map viewer.

use std::f64::consts::PI;

// ── Fit / zoom ──────────────────────────────────────────────────

/// Fraction of the container the auto-fit map occupies; the rest is margin.
pub const FIT_FACTOR: f64 = 0.8;

/// Smallest user zoom multiplier.
pub const MIN_SCALE: f64 = 0.1;

/// Largest user zoom multiplier.
pub const MAX_SCALE: f64 = 5.0;

/// Wheel zoom factor when scrolling down (zoom out).
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Wheel zoom factor when scrolling up (zoom in).
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Step factor for the discrete zoom buttons.
pub const BUTTON_ZOOM_STEP: f64 = 1.2;

/// Largest container side in canvas pixels. Larger sizes are clamped so a
/// backend never allocates an unbounded frame.
pub const MAX_CANVAS_PX: u32 = 16_384;

// ── Input ───────────────────────────────────────────────────────

/// Pointer travel in canvas pixels after which a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

// ── Raster ──────────────────────────────────────────────────────

/// Cell value for an unknown cell.
pub const UNKNOWN_CELL: i8 = -1;

/// Cell value for a free cell.
pub const FREE_CELL: i8 = 0;

/// Cell value for a fully occupied cell.
pub const OCCUPIED_CELL: i8 = 100;

/// Gray level used for unknown cells.
pub const UNKNOWN_GRAY: u8 = 205;

/// Raster pixels brighter than this sample as free.
pub const FREE_GRAY_THRESHOLD: u8 = 250;

/// Raster pixels darker than this sample as occupied.
pub const OCCUPIED_GRAY_THRESHOLD: u8 = 10;

// ── Overlay ─────────────────────────────────────────────────────

/// Nav point circle radius in canvas pixels.
pub const POINT_RADIUS_PX: f64 = 6.0;

/// Font size of the order label drawn inside a nav point.
pub const POINT_LABEL_PX: f64 = 9.0;

/// Road segment line width in canvas pixels.
pub const SEGMENT_WIDTH_PX: f64 = 2.0;

/// Arrowhead length in canvas pixels.
pub const ARROW_LENGTH_PX: f64 = 15.0;

/// Arrowhead half-angle in radians (30°).
pub const ARROW_HALF_ANGLE: f64 = PI / 6.0;

/// Robot marker radius in canvas pixels.
pub const ROBOT_RADIUS_PX: f64 = 8.0;

/// Length of the robot heading line in canvas pixels.
pub const HEADING_LENGTH_PX: f64 = 20.0;

/// Heading line width in canvas pixels.
pub const HEADING_WIDTH_PX: f64 = 3.0;

/// Font size of placeholder messages.
pub const PLACEHOLDER_TEXT_PX: f64 = 16.0;
