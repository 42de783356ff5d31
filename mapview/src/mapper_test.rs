#![allow(clippy::float_cmp)]

use super::*;
use crate::model::Position3;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn scenario_meta() -> MapMetadata {
    MapMetadata::new(100, 100, 0.05, Position3::new(-2.5, -2.5, 0.0)).unwrap()
}

fn mapper(view: ViewState) -> WorldPixelMapper {
    WorldPixelMapper::new(&scenario_meta(), &view, Size::new(800.0, 600.0))
}

// --- Point ---

#[test]
fn point_distance() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn point_is_finite() {
    assert!(Point::new(1.0, 2.0).is_finite());
    assert!(!Point::new(f64::NAN, 2.0).is_finite());
    assert!(!Point::new(1.0, f64::NEG_INFINITY).is_finite());
}

// --- Fit scale ---

#[test]
fn fit_scale_uses_limiting_axis() {
    // 5 m x 5 m map in 800 x 600: height limits, 600 / 5 * 0.8 = 96.
    let m = mapper(ViewState::default());
    assert!(approx_eq(m.fit_scale(), 96.0));
}

#[test]
fn effective_scale_multiplies_user_zoom() {
    let m = mapper(ViewState { scale: 2.5, offset: Point::default() });
    assert!(approx_eq(m.effective_scale(), 240.0));
}

#[test]
fn canvas_origin_centers_scaled_map() {
    let m = mapper(ViewState::default());
    // 480 x 480 map in 800 x 600.
    assert!(point_approx_eq(m.canvas_origin(), Point::new(160.0, 60.0)));
}

// --- world_to_canvas ---

#[test]
fn world_center_maps_to_container_center() {
    let m = mapper(ViewState::default());
    let meta = scenario_meta();
    let fit = (800.0 / (100.0 * 0.05_f64)).min(600.0 / (100.0 * 0.05)) * crate::consts::FIT_FACTOR;
    let origin_x = (800.0 - meta.world_width() * fit) / 2.0;
    let origin_y = (600.0 - meta.world_height() * fit) / 2.0;
    let expected = Point::new(origin_x + 2.5 * fit, origin_y + (meta.world_height() - 2.5) * fit);

    let canvas = m.world_to_canvas(Point::new(0.0, 0.0)).unwrap();
    assert!(point_approx_eq(canvas, expected));
    assert!(point_approx_eq(canvas, Point::new(400.0, 300.0)));
}

#[test]
fn world_y_up_is_canvas_y_down() {
    let m = mapper(ViewState::default());
    let low = m.world_to_canvas(Point::new(0.0, -1.0)).unwrap();
    let high = m.world_to_canvas(Point::new(0.0, 1.0)).unwrap();
    assert!(high.y < low.y);
    assert!(approx_eq(low.y - high.y, 2.0 * 96.0));
}

#[test]
fn origin_corner_maps_to_bottom_left_of_raster() {
    let m = mapper(ViewState::default());
    let canvas = m.world_to_canvas(Point::new(-2.5, -2.5)).unwrap();
    assert!(point_approx_eq(canvas, Point::new(160.0, 540.0)));
}

#[test]
fn offset_translates_canvas_position() {
    let m = mapper(ViewState { scale: 1.0, offset: Point::new(30.0, -20.0) });
    let canvas = m.world_to_canvas(Point::new(0.0, 0.0)).unwrap();
    assert!(point_approx_eq(canvas, Point::new(430.0, 280.0)));
}

#[test]
fn zoom_keeps_map_center_fixed() {
    let m = mapper(ViewState { scale: 3.0, offset: Point::default() });
    let canvas = m.world_to_canvas(Point::new(0.0, 0.0)).unwrap();
    assert!(point_approx_eq(canvas, Point::new(400.0, 300.0)));
}

#[test]
fn world_to_canvas_rejects_zero_container() {
    let m = WorldPixelMapper::new(&scenario_meta(), &ViewState::default(), Size::new(0.0, 0.0));
    assert!(matches!(
        m.world_to_canvas(Point::new(0.0, 0.0)),
        Err(CoordinateConversionError::DegenerateScale(_))
    ));
}

#[test]
fn world_to_canvas_rejects_nan_input() {
    let m = mapper(ViewState::default());
    assert_eq!(
        m.world_to_canvas(Point::new(f64::NAN, 0.0)),
        Err(CoordinateConversionError::NonFinite)
    );
}

// --- canvas_to_world ---

#[test]
fn canvas_to_world_inverts_scenario_point() {
    let m = mapper(ViewState::default());
    let world = Point::new(1.0, -0.5);
    let canvas = m.world_to_canvas(world).unwrap();
    let back = m.canvas_to_world(canvas).unwrap();
    assert!((back.x - 1.0).abs() < 1e-3);
    assert!((back.y + 0.5).abs() < 1e-3);
}

#[test]
fn round_trip_over_map_and_view_states() {
    let views = [
        ViewState::default(),
        ViewState { scale: 0.1, offset: Point::new(-500.0, 250.0) },
        ViewState { scale: 5.0, offset: Point::new(1234.5, -987.25) },
        ViewState { scale: 1.7, offset: Point::new(0.5, 0.25) },
    ];
    for view in views {
        let m = mapper(view);
        for i in 0..=20 {
            for j in 0..=20 {
                let world = Point::new(-2.5 + f64::from(i) * 0.25, -2.5 + f64::from(j) * 0.25);
                let back = m.canvas_to_world(m.world_to_canvas(world).unwrap()).unwrap();
                assert!(
                    (back.x - world.x).abs() < 1e-3 && (back.y - world.y).abs() < 1e-3,
                    "round trip drifted for {world:?} under {view:?}: {back:?}"
                );
            }
        }
    }
}

#[test]
fn canvas_to_world_rejects_degenerate_scale() {
    let m = WorldPixelMapper::new(&scenario_meta(), &ViewState::default(), Size::new(0.0, 600.0));
    assert!(matches!(
        m.canvas_to_world(Point::new(10.0, 10.0)),
        Err(CoordinateConversionError::DegenerateScale(_))
    ));
}

#[test]
fn canvas_to_world_rejects_infinite_input() {
    let m = mapper(ViewState::default());
    assert_eq!(
        m.canvas_to_world(Point::new(f64::INFINITY, 0.0)),
        Err(CoordinateConversionError::NonFinite)
    );
}

#[test]
fn canvas_to_world_rejects_nan_scale() {
    let view = ViewState { scale: f64::NAN, offset: Point::default() };
    let m = mapper(view);
    assert!(m.canvas_to_world(Point::new(10.0, 10.0)).is_err());
}

// --- raster_rect ---

#[test]
fn raster_rect_covers_fitted_map() {
    let m = mapper(ViewState::default());
    let rect = m.raster_rect().unwrap();
    assert!(approx_eq(rect.x, 160.0));
    assert!(approx_eq(rect.y, 60.0));
    assert!(approx_eq(rect.width, 480.0));
    assert!(approx_eq(rect.height, 480.0));
}

#[test]
fn raster_rect_follows_pan() {
    let m = mapper(ViewState { scale: 1.0, offset: Point::new(-10.0, 15.0) });
    let rect = m.raster_rect().unwrap();
    assert!(approx_eq(rect.x, 150.0));
    assert!(approx_eq(rect.y, 75.0));
}

// --- Grid ---

#[test]
fn world_to_grid_finds_cell() {
    let m = mapper(ViewState::default());
    // Origin corner is cell (0, 0); 0.05 m cells.
    assert_eq!(m.world_to_grid(Point::new(-2.5, -2.5)), Some(GridIndex { col: 0, row: 0 }));
    assert_eq!(m.world_to_grid(Point::new(-2.0 + 0.01, -2.25 + 0.01)), Some(GridIndex { col: 10, row: 5 }));
}

#[test]
fn world_to_grid_outside_map_is_none() {
    let m = mapper(ViewState::default());
    assert_eq!(m.world_to_grid(Point::new(-2.6, 0.0)), None);
    assert_eq!(m.world_to_grid(Point::new(0.0, 2.6)), None);
    assert_eq!(m.world_to_grid(Point::new(f64::NAN, 0.0)), None);
}

#[test]
fn grid_to_world_returns_cell_center() {
    let m = mapper(ViewState::default());
    let p = m.grid_to_world(GridIndex { col: 0, row: 0 });
    assert!(point_approx_eq(p, Point::new(-2.475, -2.475)));
    assert_eq!(m.world_to_grid(p), Some(GridIndex { col: 0, row: 0 }));
}

#[test]
fn grid_index_bitmap_row_flips() {
    assert_eq!(GridIndex { col: 10, row: 5 }.bitmap_row(100), 94);
    assert_eq!(GridIndex { col: 0, row: 0 }.bitmap_row(100), 99);
}

#[test]
fn cell_center_lands_inside_its_bitmap_pixel() {
    // The continuous flip and the integer row flip agree at cell centers.
    let m = mapper(ViewState::default());
    let index = GridIndex { col: 10, row: 5 };
    let canvas = m.world_to_canvas(m.grid_to_world(index)).unwrap();
    let rect = m.raster_rect().unwrap();
    let px_size = rect.width / 100.0;
    let bitmap_col = ((canvas.x - rect.x) / px_size).floor();
    let bitmap_row = ((canvas.y - rect.y) / px_size).floor();
    assert_eq!(bitmap_col, 10.0);
    assert_eq!(bitmap_row, f64::from(index.bitmap_row(100)));
}
