//! Data model: map metadata, occupancy grids, navigation overlays, robot pose.
//!
//! Map metadata and grids are validated on construction and immutable after
//! that; nothing downstream has to re-check dimensions. Nav points and road
//! segments are owned by the host (the point editor) and handed to the viewer
//! read-only. A `RobotPose` is replaced wholesale on every telemetry update.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};

use crate::error::MapDataError;
use crate::mapper::Point;

/// A position in world meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position3 {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The planar (x, y) part of this position.
    #[must_use]
    pub fn planar(self) -> Point {
        Point::new(self.x, self.y)
    }
}

// =============================================================
// Map metadata
// =============================================================

/// Geometry of a loaded map.
///
/// `origin` is the world position of the bottom-left corner of image pixel
/// `(0, height - 1)`, i.e. of grid cell `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapMetadata {
    width: u32,
    height: u32,
    resolution: f64,
    origin: Position3,
}

impl MapMetadata {
    /// Build validated metadata.
    ///
    /// # Errors
    ///
    /// Returns [`MapDataError`] for zero dimensions, a non-positive or
    /// non-finite resolution, or a non-finite origin.
    pub fn new(width: u32, height: u32, resolution: f64, origin: Position3) -> Result<Self, MapDataError> {
        if width == 0 || height == 0 {
            return Err(MapDataError::InvalidDimensions { width, height });
        }
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(MapDataError::InvalidResolution(resolution));
        }
        if !(origin.x.is_finite() && origin.y.is_finite() && origin.z.is_finite()) {
            return Err(MapDataError::InvalidOrigin { x: origin.x, y: origin.y, z: origin.z });
        }
        Ok(Self { width, height, resolution, origin })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Meters per grid pixel.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[must_use]
    pub fn origin(&self) -> Position3 {
        self.origin
    }

    /// Number of cells a grid with this metadata must carry.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Map extent along world X in meters.
    #[must_use]
    pub fn world_width(&self) -> f64 {
        f64::from(self.width) * self.resolution
    }

    /// Map extent along world Y in meters.
    #[must_use]
    pub fn world_height(&self) -> f64 {
        f64::from(self.height) * self.resolution
    }
}

// =============================================================
// Occupancy grid
// =============================================================

/// Row-major occupancy cells with row 0 at the world-space bottom.
///
/// Each cell is `-1` (unknown) or an occupancy probability in `0..=100`.
/// Out-of-range values are kept as-is and render as unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    metadata: MapMetadata,
    cells: Vec<i8>,
}

impl OccupancyGrid {
    /// Pair metadata with its cells.
    ///
    /// # Errors
    ///
    /// Returns [`MapDataError::CellCountMismatch`] when `cells.len()` is not
    /// `width * height`. The grid is never truncated or padded.
    pub fn new(metadata: MapMetadata, cells: Vec<i8>) -> Result<Self, MapDataError> {
        let expected = metadata.cell_count();
        if cells.len() != expected {
            return Err(MapDataError::CellCountMismatch { expected, actual: cells.len() });
        }
        Ok(Self { metadata, cells })
    }

    #[must_use]
    pub fn metadata(&self) -> &MapMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    /// Cell at column `col` and grid row `row` (row 0 at the bottom).
    #[must_use]
    pub fn get(&self, col: u32, row: u32) -> Option<i8> {
        if col >= self.metadata.width || row >= self.metadata.height {
            return None;
        }
        let index = row as usize * self.metadata.width as usize + col as usize;
        self.cells.get(index).copied()
    }
}

// =============================================================
// Navigation overlay
// =============================================================

/// Role of a nav point within a route template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointType {
    Start,
    Waypoint,
    End,
    /// Any type this viewer does not know; drawn in the neutral color.
    #[serde(other)]
    Other,
}

/// A named route point placed by the point editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPoint {
    pub id: String,
    pub name: String,
    pub position: Position3,
    #[serde(rename = "type")]
    pub point_type: PointType,
    /// Position of this point in the route sequence, unique within a template.
    pub order: u32,
}

/// Per-segment spraying settings. Only `pump_status` affects the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprayParams {
    #[serde(default)]
    pub pump_status: bool,
}

/// A directed road between two nav points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSegment {
    pub id: String,
    pub start_point_id: String,
    pub end_point_id: String,
    #[serde(default)]
    pub spray_params: SprayParams,
}

// =============================================================
// Robot pose
// =============================================================

/// Orientation quaternion `{x, y, z, w}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Rotation about the world Z axis in radians.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        siny_cosp.atan2(cosy_cosp)
    }
}

/// Robot heading as reported by telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Heading already expressed in radians.
    Yaw(f64),
    /// Full 3-D orientation; only its yaw is drawn.
    Quaternion(Quaternion),
}

impl Orientation {
    #[must_use]
    pub fn yaw(&self) -> f64 {
        match self {
            Self::Yaw(theta) => *theta,
            Self::Quaternion(q) => q.yaw(),
        }
    }
}

/// Latest robot pose in world meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotPose {
    pub position: Point,
    pub orientation: Orientation,
}

impl RobotPose {
    #[must_use]
    pub fn new(position: Point, orientation: Orientation) -> Self {
        Self { position, orientation }
    }

    /// Heading in radians, counter-clockwise from world +X.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        self.orientation.yaw()
    }

    /// Whether every component is finite, i.e. the pose can be placed on the map.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite() && self.yaw().is_finite()
    }
}
