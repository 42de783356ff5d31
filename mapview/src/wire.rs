//! Message shapes exchanged with the map provider and the pose stream.
//!
//! These are the consumption contracts only. Transport (HTTP, WebSocket,
//! auth) lives in the host. Every message is validated into the engine's own
//! model types before it reaches the surface.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use serde::{Deserialize, Serialize};

use crate::error::MapDataError;
use crate::mapper::Point;
use crate::model::{MapMetadata, NavPoint, OccupancyGrid, Orientation, Position3, Quaternion, RoadSegment, RobotPose};

// =============================================================
// Map provider
// =============================================================

/// One entry of the provider's map list.
///
/// Fields are optional on the wire so that a malformed entry surfaces as a
/// [`MapDataError::MissingField`] when it is selected, not as a failed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: Option<f64>,
    pub origin: Option<Position3>,
    #[serde(default)]
    pub is_active: bool,
}

impl MapSummary {
    /// Validated metadata for this map.
    ///
    /// # Errors
    ///
    /// Returns [`MapDataError`] when a field is missing or out of range.
    pub fn metadata(&self) -> Result<MapMetadata, MapDataError> {
        let width = self.width.ok_or(MapDataError::MissingField("width"))?;
        let height = self.height.ok_or(MapDataError::MissingField("height"))?;
        let resolution = self.resolution.ok_or(MapDataError::MissingField("resolution"))?;
        let origin = self.origin.ok_or(MapDataError::MissingField("origin"))?;
        MapMetadata::new(width, height, resolution, origin)
    }
}

/// Pick the map to show first: the active one, else the first listed.
#[must_use]
pub fn default_map(maps: &[MapSummary]) -> Option<&MapSummary> {
    maps.iter().find(|m| m.is_active).or_else(|| maps.first())
}

/// Raw occupancy message: `{info: {width, height, resolution, origin: {position}}, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyMessage {
    pub info: OccupancyInfo,
    pub data: Vec<i8>,
}

/// Header of an [`OccupancyMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: Option<f64>,
    pub origin: Option<OriginPose>,
}

/// Origin pose of an occupancy grid; only its position is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginPose {
    pub position: Position3,
}

impl OccupancyMessage {
    /// Validate into an [`OccupancyGrid`].
    ///
    /// # Errors
    ///
    /// Returns [`MapDataError`] for missing metadata fields or a cell count
    /// that does not match `width * height`.
    pub fn into_grid(self) -> Result<OccupancyGrid, MapDataError> {
        let info = self.info;
        let width = info.width.ok_or(MapDataError::MissingField("info.width"))?;
        let height = info.height.ok_or(MapDataError::MissingField("info.height"))?;
        let resolution = info.resolution.ok_or(MapDataError::MissingField("info.resolution"))?;
        let origin = info.origin.ok_or(MapDataError::MissingField("info.origin"))?;
        let metadata = MapMetadata::new(width, height, resolution, origin.position)?;
        OccupancyGrid::new(metadata, self.data)
    }
}

// =============================================================
// Pose stream
// =============================================================

/// Planar position as it appears in pose messages (`z` is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPosition {
    pub x: f64,
    pub y: f64,
}

/// Position + quaternion pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseBody {
    pub position: PlanarPosition,
    pub orientation: Quaternion,
}

/// `{pose: {...}}` wrapper used by odometry messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseWithCovariance {
    pub pose: PoseBody,
}

/// Any of the three pose shapes the telemetry stream produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoseMessage {
    /// `{pose: {pose: {position, orientation}}}`
    Odometry { pose: PoseWithCovariance },
    /// `{position: {x, y}, orientation: {x, y, z, w}}`
    Quaternion { position: PlanarPosition, orientation: Quaternion },
    /// `{x, y, theta}`
    Planar { x: f64, y: f64, theta: f64 },
}

impl From<PoseMessage> for RobotPose {
    fn from(msg: PoseMessage) -> Self {
        match msg {
            PoseMessage::Odometry { pose } => RobotPose::new(
                Point::new(pose.pose.position.x, pose.pose.position.y),
                Orientation::Quaternion(pose.pose.orientation),
            ),
            PoseMessage::Quaternion { position, orientation } => {
                RobotPose::new(Point::new(position.x, position.y), Orientation::Quaternion(orientation))
            }
            PoseMessage::Planar { x, y, theta } => RobotPose::new(Point::new(x, y), Orientation::Yaw(theta)),
        }
    }
}

/// Parse one pose message from JSON text.
///
/// # Errors
///
/// Returns the `serde_json` error when the text matches none of the shapes.
pub fn parse_pose(text: &str) -> Result<RobotPose, serde_json::Error> {
    serde_json::from_str::<PoseMessage>(text).map(RobotPose::from)
}

// =============================================================
// Host-supplied overlays
// =============================================================

/// Nav points and road segments for one route template, as the editor saves them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavDocument {
    #[serde(default)]
    pub points: Vec<NavPoint>,
    #[serde(default)]
    pub segments: Vec<RoadSegment>,
}
