//! Navigation points, directed road segments, and the robot marker.
//!
//! Everything is positioned through [`WorldPixelMapper`], so overlays move with
//! the raster under pan and zoom. Draw order is segments, then points, then
//! the robot, so point circles sit on top of the lines that join them.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::consts::{
    ARROW_HALF_ANGLE, ARROW_LENGTH_PX, HEADING_LENGTH_PX, HEADING_WIDTH_PX, POINT_LABEL_PX, POINT_RADIUS_PX,
    ROBOT_RADIUS_PX, SEGMENT_WIDTH_PX,
};
use crate::error::RenderError;
use crate::mapper::{Point, WorldPixelMapper};
use crate::model::{NavPoint, PointType, RoadSegment, RobotPose};
use crate::render::{Color, Renderer};

// ── Palette ─────────────────────────────────────────────────────

pub const START_COLOR: Color = Color::rgb(0x52, 0xc4, 0x1a);
pub const WAYPOINT_COLOR: Color = Color::rgb(0x18, 0x90, 0xff);
pub const END_COLOR: Color = Color::rgb(0xff, 0x4d, 0x4f);
pub const DEFAULT_POINT_COLOR: Color = Color::rgb(0x99, 0x99, 0x99);

/// Segment color while the spray pump is on.
pub const PUMP_ON_COLOR: Color = Color::rgb(0x52, 0xc4, 0x1a);

pub const ROBOT_COLOR: Color = Color::rgb(0xfa, 0x54, 0x1c);
pub const LABEL_COLOR: Color = Color::rgb(0xff, 0xff, 0xff);

/// Fill color for a nav point of `point_type`.
#[must_use]
pub fn point_color(point_type: PointType) -> Color {
    match point_type {
        PointType::Start => START_COLOR,
        PointType::Waypoint => WAYPOINT_COLOR,
        PointType::End => END_COLOR,
        PointType::Other => DEFAULT_POINT_COLOR,
    }
}

/// Host-dependent overlay styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Segment color while the pump is off (`#999` on plain views, `#1890ff` on editors).
    pub idle_segment_color: Color,
    /// Draw each point's `order` inside its circle.
    pub show_order_labels: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self { idle_segment_color: DEFAULT_POINT_COLOR, show_order_labels: true }
    }
}

impl OverlayStyle {
    #[must_use]
    pub fn segment_color(&self, segment: &RoadSegment) -> Color {
        if segment.spray_params.pump_status { PUMP_ON_COLOR } else { self.idle_segment_color }
    }
}

// ── Geometry ────────────────────────────────────────────────────

/// The two arrowhead wing tips for a line ending at `to`.
///
/// Returns `None` for a zero-length line, which has no direction.
#[must_use]
pub fn arrowhead(from: Point, to: Point) -> Option<(Point, Point)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let angle = dy.atan2(dx);
    let wing = |a: f64| Point::new(to.x - ARROW_LENGTH_PX * a.cos(), to.y - ARROW_LENGTH_PX * a.sin());
    Some((wing(angle - ARROW_HALF_ANGLE), wing(angle + ARROW_HALF_ANGLE)))
}

/// End of the heading line for a robot at canvas `center` facing world `yaw`.
///
/// World yaw is counter-clockwise with Y up; canvas Y grows down, so the
/// vertical component is negated.
#[must_use]
pub fn heading_end(center: Point, yaw: f64) -> Point {
    Point::new(center.x + HEADING_LENGTH_PX * yaw.cos(), center.y - HEADING_LENGTH_PX * yaw.sin())
}

// ── Renderer ────────────────────────────────────────────────────

/// Draws overlays for one mapper (one map, view, and container size).
pub struct OverlayRenderer<'a> {
    mapper: &'a WorldPixelMapper,
    style: &'a OverlayStyle,
}

impl<'a> OverlayRenderer<'a> {
    #[must_use]
    pub fn new(mapper: &'a WorldPixelMapper, style: &'a OverlayStyle) -> Self {
        Self { mapper, style }
    }

    /// Segments, then points, then the robot when a pose is known.
    ///
    /// # Errors
    ///
    /// Propagates backend failures. Coordinate failures only skip the item.
    pub fn draw_all(
        &self,
        out: &mut dyn Renderer,
        points: &[NavPoint],
        segments: &[RoadSegment],
        pose: Option<&RobotPose>,
    ) -> Result<(), RenderError> {
        self.draw_segments(out, segments, points)?;
        self.draw_points(out, points)?;
        if let Some(pose) = pose {
            self.draw_robot(out, pose)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn draw_points(&self, out: &mut dyn Renderer, points: &[NavPoint]) -> Result<(), RenderError> {
        for point in points {
            let Some(center) = self.to_canvas(point.position.planar(), "nav point", &point.id) else {
                continue;
            };
            out.fill_circle(center, POINT_RADIUS_PX, point_color(point.point_type))?;
            if self.style.show_order_labels {
                out.draw_text(&point.order.to_string(), center, POINT_LABEL_PX, LABEL_COLOR)?;
            }
        }
        Ok(())
    }

    /// Draw each segment as a line with an arrowhead at its end point.
    ///
    /// A segment whose start or end id is not in `points` is skipped entirely.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn draw_segments(
        &self,
        out: &mut dyn Renderer,
        segments: &[RoadSegment],
        points: &[NavPoint],
    ) -> Result<(), RenderError> {
        let by_id: HashMap<&str, &NavPoint> = points.iter().map(|p| (p.id.as_str(), p)).collect();
        for segment in segments {
            let (Some(start), Some(end)) =
                (by_id.get(segment.start_point_id.as_str()), by_id.get(segment.end_point_id.as_str()))
            else {
                debug!(
                    segment_id = %segment.id,
                    start = %segment.start_point_id,
                    end = %segment.end_point_id,
                    "segment skipped: nav point missing"
                );
                continue;
            };
            let Some(from) = self.to_canvas(start.position.planar(), "segment", &segment.id) else {
                continue;
            };
            let Some(to) = self.to_canvas(end.position.planar(), "segment", &segment.id) else {
                continue;
            };
            let color = self.style.segment_color(segment);
            out.draw_line(from, to, SEGMENT_WIDTH_PX, color)?;
            if let Some((left, right)) = arrowhead(from, to) {
                out.draw_line(to, left, SEGMENT_WIDTH_PX, color)?;
                out.draw_line(to, right, SEGMENT_WIDTH_PX, color)?;
            }
        }
        Ok(())
    }

    /// Circle at the pose position plus a heading line at its yaw.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn draw_robot(&self, out: &mut dyn Renderer, pose: &RobotPose) -> Result<(), RenderError> {
        let yaw = pose.yaw();
        if !yaw.is_finite() {
            warn!(yaw, "robot pose skipped: non-finite heading");
            return Ok(());
        }
        let Some(center) = self.to_canvas(pose.position, "robot", "pose") else {
            return Ok(());
        };
        out.fill_circle(center, ROBOT_RADIUS_PX, ROBOT_COLOR)?;
        out.draw_line(center, heading_end(center, yaw), HEADING_WIDTH_PX, ROBOT_COLOR)
    }

    fn to_canvas(&self, world: Point, kind: &str, id: &str) -> Option<Point> {
        match self.mapper.world_to_canvas(world) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(kind, id, error = %e, "coordinate conversion rejected");
                None
            }
        }
    }
}
