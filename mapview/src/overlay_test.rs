#![allow(clippy::float_cmp)]

use std::f64::consts::FRAC_PI_2;

use super::*;
use crate::mapper::Size;
use crate::model::{MapMetadata, Orientation, Position3, SprayParams};
use crate::render::{DrawCall, RecordingRenderer};
use crate::viewport::ViewState;

// =============================================================
// Helpers
// =============================================================

fn mapper() -> WorldPixelMapper {
    let meta = MapMetadata::new(100, 100, 0.05, Position3::new(-2.5, -2.5, 0.0)).unwrap();
    WorldPixelMapper::new(&meta, &ViewState::default(), Size::new(800.0, 600.0))
}

fn nav_point(id: &str, x: f64, y: f64, point_type: PointType, order: u32) -> NavPoint {
    NavPoint {
        id: id.to_owned(),
        name: id.to_uppercase(),
        position: Position3::new(x, y, 0.0),
        point_type,
        order,
    }
}

fn segment(id: &str, start: &str, end: &str, pump: bool) -> RoadSegment {
    RoadSegment {
        id: id.to_owned(),
        start_point_id: start.to_owned(),
        end_point_id: end.to_owned(),
        spray_params: SprayParams { pump_status: pump },
    }
}

fn circles(calls: &[DrawCall]) -> Vec<(Point, Color)> {
    calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Circle { center, color, .. } => Some((*center, *color)),
            _ => None,
        })
        .collect()
}

fn lines(calls: &[DrawCall]) -> Vec<(Point, Point, Color)> {
    calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Line { from, to, color, .. } => Some((*from, *to, *color)),
            _ => None,
        })
        .collect()
}

fn close(a: Point, b: Point) -> bool {
    a.distance(b) < 1e-9
}

// =============================================================
// Points
// =============================================================

#[test]
fn point_colors_by_type() {
    assert_eq!(point_color(PointType::Start).to_css(), "#52c41a");
    assert_eq!(point_color(PointType::Waypoint).to_css(), "#1890ff");
    assert_eq!(point_color(PointType::End).to_css(), "#ff4d4f");
    assert_eq!(point_color(PointType::Other).to_css(), "#999999");
}

#[test]
fn start_and_end_points_render_in_their_colors() {
    let m = mapper();
    let style = OverlayStyle::default();
    let mut out = RecordingRenderer::new();
    let points = [nav_point("a", 0.0, 0.0, PointType::Start, 1), nav_point("b", 1.0, 1.0, PointType::End, 2)];
    OverlayRenderer::new(&m, &style).draw_points(&mut out, &points).unwrap();

    let drawn = circles(out.calls());
    assert_eq!(drawn.len(), 2);
    assert_eq!(drawn[0].1.to_css(), "#52c41a");
    assert_eq!(drawn[1].1.to_css(), "#ff4d4f");
    assert!(close(drawn[0].0, m.world_to_canvas(Point::new(0.0, 0.0)).unwrap()));
}

#[test]
fn order_labels_follow_style() {
    let m = mapper();
    let points = [nav_point("a", 0.0, 0.0, PointType::Waypoint, 7)];

    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &OverlayStyle::default()).draw_points(&mut out, &points).unwrap();
    assert!(out.calls().iter().any(|c| matches!(c, DrawCall::Text { text, .. } if text == "7")));

    let quiet = OverlayStyle { show_order_labels: false, ..OverlayStyle::default() };
    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &quiet).draw_points(&mut out, &points).unwrap();
    assert!(!out.calls().iter().any(|c| matches!(c, DrawCall::Text { .. })));
}

#[test]
fn non_finite_point_is_skipped() {
    let m = mapper();
    let style = OverlayStyle::default();
    let mut out = RecordingRenderer::new();
    let points = [nav_point("bad", f64::NAN, 0.0, PointType::Start, 1), nav_point("ok", 0.0, 0.0, PointType::End, 2)];
    OverlayRenderer::new(&m, &style).draw_points(&mut out, &points).unwrap();
    assert_eq!(circles(out.calls()).len(), 1);
}

// =============================================================
// Segments
// =============================================================

#[test]
fn segment_draws_line_and_two_arrow_wings() {
    let m = mapper();
    let style = OverlayStyle::default();
    let points = [nav_point("a", -1.0, 0.0, PointType::Start, 1), nav_point("b", 1.0, 0.0, PointType::End, 2)];
    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &style).draw_segments(&mut out, &[segment("s", "a", "b", false)], &points).unwrap();

    let drawn = lines(out.calls());
    assert_eq!(drawn.len(), 3);
    let to = m.world_to_canvas(Point::new(1.0, 0.0)).unwrap();
    assert!(close(drawn[0].1, to));
    assert!(close(drawn[1].0, to) && close(drawn[2].0, to));
    assert!(drawn.iter().all(|(_, _, c)| c.to_css() == "#999999"));
}

#[test]
fn pump_on_segment_is_green_and_idle_color_follows_style() {
    let m = mapper();
    let points = [nav_point("a", -1.0, 0.0, PointType::Start, 1), nav_point("b", 1.0, 0.0, PointType::End, 2)];
    let editor = OverlayStyle { idle_segment_color: WAYPOINT_COLOR, ..OverlayStyle::default() };

    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &editor)
        .draw_segments(&mut out, &[segment("on", "a", "b", true), segment("off", "b", "a", false)], &points)
        .unwrap();
    let drawn = lines(out.calls());
    assert_eq!(drawn[0].2.to_css(), "#52c41a");
    assert_eq!(drawn[3].2.to_css(), "#1890ff");
}

#[test]
fn segment_with_missing_point_is_a_no_op() {
    let m = mapper();
    let style = OverlayStyle::default();
    let points = [nav_point("a", 0.0, 0.0, PointType::Start, 1)];
    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &style)
        .draw_segments(&mut out, &[segment("s", "a", "ghost", true), segment("t", "ghost", "a", true)], &points)
        .unwrap();
    assert!(out.calls().is_empty());
}

#[test]
fn arrowhead_wings_point_back_along_the_line() {
    let (left, right) = arrowhead(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
    let dx = ARROW_LENGTH_PX * ARROW_HALF_ANGLE.cos();
    let dy = ARROW_LENGTH_PX * ARROW_HALF_ANGLE.sin();
    assert!(close(left, Point::new(100.0 - dx, dy)));
    assert!(close(right, Point::new(100.0 - dx, -dy)));
    assert!((left.distance(Point::new(100.0, 0.0)) - ARROW_LENGTH_PX).abs() < 1e-9);
}

#[test]
fn zero_length_segment_has_no_arrowhead() {
    assert!(arrowhead(Point::new(5.0, 5.0), Point::new(5.0, 5.0)).is_none());
}

// =============================================================
// Robot
// =============================================================

#[test]
fn heading_line_flips_y_for_canvas() {
    let c = Point::new(50.0, 50.0);
    assert!(close(heading_end(c, 0.0), Point::new(50.0 + HEADING_LENGTH_PX, 50.0)));
    // Facing world +Y is facing up the screen.
    assert!(close(heading_end(c, FRAC_PI_2), Point::new(50.0, 50.0 - HEADING_LENGTH_PX)));
}

#[test]
fn robot_marker_is_circle_plus_heading() {
    let m = mapper();
    let style = OverlayStyle::default();
    let pose = RobotPose::new(Point::new(0.5, 0.5), Orientation::Yaw(0.0));
    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &style).draw_robot(&mut out, &pose).unwrap();

    let center = m.world_to_canvas(pose.position).unwrap();
    let calls = out.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], DrawCall::Circle { center, radius: ROBOT_RADIUS_PX, color: ROBOT_COLOR });
    let (from, to, _) = lines(calls)[0];
    assert!(close(from, center));
    assert!(close(to, heading_end(center, 0.0)));
}

#[test]
fn robot_with_nan_heading_is_not_drawn() {
    let m = mapper();
    let style = OverlayStyle::default();
    let pose = RobotPose::new(Point::new(0.0, 0.0), Orientation::Yaw(f64::NAN));
    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &style).draw_robot(&mut out, &pose).unwrap();
    assert!(out.calls().is_empty());
}

#[test]
fn draw_all_orders_segments_points_robot() {
    let m = mapper();
    let style = OverlayStyle::default();
    let points = [nav_point("a", -1.0, 0.0, PointType::Start, 1), nav_point("b", 1.0, 0.0, PointType::End, 2)];
    let pose = RobotPose::new(Point::new(0.0, 0.0), Orientation::Yaw(1.0));
    let mut out = RecordingRenderer::new();
    OverlayRenderer::new(&m, &style)
        .draw_all(&mut out, &points, &[segment("s", "a", "b", false)], Some(&pose))
        .unwrap();

    let calls = out.calls();
    let first_circle = calls.iter().position(|c| matches!(c, DrawCall::Circle { .. })).unwrap();
    let last_segment_line = 2;
    assert!(first_circle > last_segment_line);
    assert!(matches!(calls.last(), Some(DrawCall::Line { width, .. }) if *width == HEADING_WIDTH_PX));
}
