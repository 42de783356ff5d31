//! The composed map viewer.
//!
//! `MapSurface` owns every piece of viewer state (selected map, decoded
//! raster, nav overlays, robot pose, view state, container size) and redraws
//! as a pure function of it. Mutations mark the surface dirty; the host calls
//! [`MapSurface::render_if_dirty`] once per tick.
//!
//! Map loads are asynchronous from the surface's point of view:
//! [`MapSurface::select_map`] hands out a [`LoadTicket`], the host fetches and
//! decodes off the UI task, and [`MapSurface::complete_load`] applies the
//! result only if the ticket is still the current selection.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use tracing::{debug, info, warn};

use crate::consts::{MAX_CANVAS_PX, PLACEHOLDER_TEXT_PX};
use crate::error::{CoordinateConversionError, MapLoadError, RenderError};
use crate::grid::DecodedMap;
use crate::mapper::{Point, Size, WorldPixelMapper};
use crate::model::{MapMetadata, NavPoint, RoadSegment, RobotPose};
use crate::overlay::{OverlayRenderer, OverlayStyle};
use crate::render::{Color, MapRaster, Renderer};
use crate::viewport::{PointerRelease, ViewState, ViewportController, WheelInput, WheelResponse};
use crate::wire::{NavDocument, parse_pose};

pub const BACKGROUND_COLOR: Color = Color::rgb(0xf5, 0xf5, 0xf5);
pub const PLACEHOLDER_COLOR: Color = Color::rgb(0x8c, 0x8c, 0x8c);

pub const CURSOR_IDLE: &str = "grab";
pub const CURSOR_PANNING: &str = "grabbing";

/// Receives the world position of every qualifying click.
pub type ClickConsumer = Box<dyn FnMut(f64, f64) + Send>;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetCursor(String),
    RenderNeeded,
}

/// What the surface currently shows underneath the overlays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapStatus {
    /// Nothing selected.
    NoMap,
    /// A load is in flight for the selected map.
    Loading,
    /// The selected map is decoded and drawn.
    Ready,
    /// The last load for the selected map failed; carries the reason.
    Unavailable(String),
}

/// Proof of one `select_map` call. Only the newest ticket can complete a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    map_id: String,
}

impl LoadTicket {
    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }

    #[must_use]
    pub fn map_id(&self) -> &str {
        &self.map_id
    }
}

/// Result of handing a finished load to [`MapSurface::complete_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The map is now displayed.
    Applied,
    /// A newer selection superseded this load; the result was dropped.
    Stale,
    /// The load failed and the surface now shows "map unavailable".
    Failed,
}

struct LoadedMap {
    metadata: MapMetadata,
    raster: MapRaster,
}

/// Core viewer state. Has no browser dependency; see `web::MapCanvas` for the canvas wrapper.
pub struct MapSurface {
    viewport: ViewportController,
    container: Size,
    style: OverlayStyle,
    /// Monotonic selection token; bumped on every select and clear.
    token: u64,
    selected: Option<String>,
    status: MapStatus,
    map: Option<LoadedMap>,
    points: Vec<NavPoint>,
    segments: Vec<RoadSegment>,
    pose: Option<RobotPose>,
    click_consumer: Option<ClickConsumer>,
    dirty: bool,
}

impl MapSurface {
    #[must_use]
    pub fn new(container: Size) -> Self {
        Self {
            viewport: ViewportController::new(),
            container: sanitize_size(container),
            style: OverlayStyle::default(),
            token: 0,
            selected: None,
            status: MapStatus::NoMap,
            map: None,
            points: Vec::new(),
            segments: Vec::new(),
            pose: None,
            click_consumer: None,
            dirty: true,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    // --- Map selection ---

    /// Select `map_id` and start a load. Any load still in flight becomes stale.
    ///
    /// The previous bitmap is dropped and the view is reset.
    pub fn select_map(&mut self, map_id: &str) -> LoadTicket {
        self.token += 1;
        self.selected = Some(map_id.to_owned());
        self.status = MapStatus::Loading;
        self.map = None;
        self.viewport.reset();
        self.dirty = true;
        info!(map_id, token = self.token, "map selected");
        LoadTicket { token: self.token, map_id: map_id.to_owned() }
    }

    /// Whether `ticket` is still the current selection.
    #[must_use]
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.token == self.token
    }

    /// Apply a finished load if `ticket` is still current.
    pub fn complete_load(&mut self, ticket: &LoadTicket, result: Result<DecodedMap, MapLoadError>) -> LoadOutcome {
        if !self.is_current(ticket) {
            debug!(map_id = %ticket.map_id, token = ticket.token, current = self.token, "stale map load discarded");
            return LoadOutcome::Stale;
        }
        self.dirty = true;
        let decoded = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(map_id = %ticket.map_id, error = %e, "map load failed");
                self.status = MapStatus::Unavailable(e.to_string());
                return LoadOutcome::Failed;
            }
        };

        let expected = (decoded.metadata.width(), decoded.metadata.height());
        let actual = decoded.bitmap.dimensions();
        debug_assert_eq!(actual, expected, "decoded bitmap size disagrees with map metadata");
        if actual != expected {
            warn!(map_id = %ticket.map_id, ?actual, ?expected, "bitmap size mismatch");
            self.status = MapStatus::Unavailable("bitmap size mismatch".to_owned());
            return LoadOutcome::Failed;
        }

        info!(map_id = %ticket.map_id, width = expected.0, height = expected.1, "map loaded");
        self.map = Some(LoadedMap {
            metadata: decoded.metadata,
            raster: MapRaster { generation: ticket.token, image: decoded.bitmap },
        });
        self.status = MapStatus::Ready;
        LoadOutcome::Applied
    }

    /// Deselect the current map and invalidate any load in flight.
    pub fn clear_map(&mut self) {
        self.token += 1;
        self.selected = None;
        self.status = MapStatus::NoMap;
        self.map = None;
        self.viewport.reset();
        self.dirty = true;
    }

    // --- Overlay data ---

    pub fn set_points(&mut self, points: Vec<NavPoint>) {
        self.points = points;
        self.dirty = true;
    }

    pub fn set_segments(&mut self, segments: Vec<RoadSegment>) {
        self.segments = segments;
        self.dirty = true;
    }

    /// Replace both overlay collections from one host document.
    pub fn set_nav(&mut self, doc: NavDocument) {
        self.points = doc.points;
        self.segments = doc.segments;
        self.dirty = true;
    }

    /// Replace the robot pose wholesale. Non-finite poses are rejected.
    pub fn set_pose(&mut self, pose: RobotPose) -> bool {
        if !pose.is_finite() {
            warn!(?pose, "pose rejected: non-finite");
            return false;
        }
        self.pose = Some(pose);
        self.dirty = true;
        true
    }

    /// Parse one pose stream message and apply it.
    pub fn apply_pose_message(&mut self, text: &str) -> bool {
        match parse_pose(text) {
            Ok(pose) => self.set_pose(pose),
            Err(e) => {
                warn!(error = %e, "pose message rejected");
                false
            }
        }
    }

    pub fn clear_pose(&mut self) {
        if self.pose.take().is_some() {
            self.dirty = true;
        }
    }

    // --- Viewport ---

    /// New container size in canvas pixels.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        let next = sanitize_size(Size::new(width, height));
        if next == self.container {
            return Vec::new();
        }
        self.container = next;
        self.changed(true)
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        let changed = self.viewport.reset();
        self.changed(changed)
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        let changed = self.viewport.zoom_in();
        self.changed(changed)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        let changed = self.viewport.zoom_out();
        self.changed(changed)
    }

    pub fn on_wheel(&mut self, input: WheelInput) -> WheelResponse {
        let response = self.viewport.wheel(input);
        if response.changed {
            self.dirty = true;
        }
        response
    }

    // --- Pointer ---

    pub fn on_pointer_down(&mut self, pos: Point) -> Vec<Action> {
        self.viewport.pointer_down(pos);
        if self.viewport.is_idle() {
            return Vec::new();
        }
        vec![Action::SetCursor(CURSOR_PANNING.to_owned())]
    }

    pub fn on_pointer_move(&mut self, pos: Point) -> Vec<Action> {
        let changed = self.viewport.pointer_move(pos);
        self.changed(changed)
    }

    /// End the gesture. A release that never became a drag is a click and is
    /// forwarded in world coordinates to the registered consumer, if any.
    pub fn on_pointer_up(&mut self, pos: Point) -> Vec<Action> {
        match self.viewport.pointer_up(pos) {
            PointerRelease::Ignored => Vec::new(),
            PointerRelease::DragEnd => vec![Action::SetCursor(CURSOR_IDLE.to_owned())],
            PointerRelease::Click(at) => {
                self.dispatch_click(at);
                vec![Action::SetCursor(CURSOR_IDLE.to_owned())]
            }
        }
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        if self.viewport.pointer_leave() {
            vec![Action::SetCursor(CURSOR_IDLE.to_owned())]
        } else {
            Vec::new()
        }
    }

    /// Register or remove the click consumer. View-only hosts register none.
    pub fn set_click_consumer(&mut self, consumer: Option<ClickConsumer>) {
        self.click_consumer = consumer;
    }

    #[must_use]
    pub fn has_click_consumer(&self) -> bool {
        self.click_consumer.is_some()
    }

    fn dispatch_click(&mut self, at: Point) {
        if self.click_consumer.is_none() {
            return;
        }
        let Some(mapper) = self.mapper() else {
            debug!(x = at.x, y = at.y, "click ignored: no map loaded");
            return;
        };
        match mapper.canvas_to_world(at) {
            Ok(world) => {
                if let Some(consumer) = self.click_consumer.as_mut() {
                    consumer(world.x, world.y);
                }
            }
            Err(e) => warn!(x = at.x, y = at.y, error = %e, "coordinate conversion rejected"),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    #[must_use]
    pub fn selected_map(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.viewport.view()
    }

    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&MapMetadata> {
        self.map.as_ref().map(|m| &m.metadata)
    }

    #[must_use]
    pub fn raster(&self) -> Option<&MapRaster> {
        self.map.as_ref().map(|m| &m.raster)
    }

    #[must_use]
    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    #[must_use]
    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    #[must_use]
    pub fn pose(&self) -> Option<&RobotPose> {
        self.pose.as_ref()
    }

    /// Mapper for the loaded map at the current view and size.
    #[must_use]
    pub fn mapper(&self) -> Option<WorldPixelMapper> {
        self.map.as_ref().map(|m| WorldPixelMapper::new(&m.metadata, &self.viewport.view(), self.container))
    }

    /// World position under canvas point `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateConversionError::DegenerateScale`] when no map is
    /// loaded, or whatever the mapper rejects.
    pub fn canvas_to_world(&self, pos: Point) -> Result<Point, CoordinateConversionError> {
        match self.mapper() {
            Some(mapper) => mapper.canvas_to_world(pos),
            None => Err(CoordinateConversionError::DegenerateScale(0.0)),
        }
    }

    // --- Render ---

    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Render only if something changed since the last render.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the surface stays dirty in that case.
    pub fn render_if_dirty(&mut self, out: &mut dyn Renderer) -> Result<bool, RenderError> {
        if !self.dirty {
            return Ok(false);
        }
        self.render(out)?;
        Ok(true)
    }

    /// Draw the full frame: background, raster or placeholder, then overlays.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn render(&mut self, out: &mut dyn Renderer) -> Result<(), RenderError> {
        out.clear(self.container, BACKGROUND_COLOR)?;
        match (&self.status, &self.map) {
            (MapStatus::Ready, Some(map)) => {
                let mapper = WorldPixelMapper::new(&map.metadata, &self.viewport.view(), self.container);
                match mapper.raster_rect() {
                    Ok(dest) => {
                        out.blit_raster(&map.raster, dest)?;
                        OverlayRenderer::new(&mapper, &self.style).draw_all(
                            out,
                            &self.points,
                            &self.segments,
                            self.pose.as_ref(),
                        )?;
                    }
                    Err(e) => debug!(error = %e, "map not drawn: container has no area"),
                }
            }
            (status, _) => {
                let label = placeholder_text(status);
                out.draw_text(label, self.container.center(), PLACEHOLDER_TEXT_PX, PLACEHOLDER_COLOR)?;
            }
        }
        self.dirty = false;
        Ok(())
    }

    fn changed(&mut self, changed: bool) -> Vec<Action> {
        if changed {
            self.dirty = true;
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }
}

/// Centered message shown when no raster is drawn.
#[must_use]
pub fn placeholder_text(status: &MapStatus) -> &'static str {
    match status {
        MapStatus::NoMap => "NO MAP",
        MapStatus::Loading => "LOADING",
        MapStatus::Ready | MapStatus::Unavailable(_) => "MAP UNAVAILABLE",
    }
}

/// Negative or non-finite sides become 0; sides above [`MAX_CANVAS_PX`] are clamped.
fn sanitize_size(size: Size) -> Size {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v.min(f64::from(MAX_CANVAS_PX)) } else { 0.0 };
    Size::new(clean(size.width), clean(size.height))
}
