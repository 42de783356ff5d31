//! View state and the pointer/wheel gesture state machine.
//!
//! `ViewState` is the user zoom multiplier and pan offset applied on top of
//! the auto-fit scale. `ViewportController` is the only thing that mutates it:
//! pointer events drive an `Idle` / `Panning` machine, wheel events and zoom
//! buttons scale multiplicatively within `[MIN_SCALE, MAX_SCALE]`.
//!
//! A press that never travels past `DRAG_THRESHOLD_PX` is a click; once it
//! does, it is a drag for the rest of the gesture and releasing it never
//! produces a click.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{BUTTON_ZOOM_STEP, DRAG_THRESHOLD_PX, MAX_SCALE, MIN_SCALE, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
use crate::mapper::Point;

/// User zoom and pan for one map-viewing session.
///
/// `scale` is a multiplier on the fit scale (1.0 = fitted).
/// `offset` is a pan translation in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub scale: f64,
    pub offset: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { scale: 1.0, offset: Point::new(0.0, 0.0) }
    }
}

impl ViewState {
    /// Multiply the scale by `factor`, clamped. Returns whether the scale changed.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let next = clamp_scale(self.scale * factor);
        let changed = (next - self.scale).abs() > f64::EPSILON;
        self.scale = next;
        changed
    }
}

/// Clamp a requested zoom multiplier into `[MIN_SCALE, MAX_SCALE]`.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Active gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No pointer held.
    #[default]
    Idle,
    /// Pointer held; the map follows it once the press has become a drag.
    Panning {
        /// Pointer position minus the offset at press time.
        drag_anchor: Point,
        /// Where the press started, for the drag threshold.
        press: Point,
        /// Whether travel has exceeded the drag threshold.
        dragged: bool,
    },
}

/// Wheel / trackpad scroll event.
#[derive(Debug, Clone, Copy)]
pub struct WheelInput {
    /// Vertical scroll amount (positive = down = zoom out).
    pub delta_y: f64,
    /// Whether the host event allows default suppression.
    pub cancelable: bool,
}

/// What the host should do after a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelResponse {
    /// The view state changed and needs a redraw.
    pub changed: bool,
    /// Call `preventDefault` on the host event. Never set for non-cancelable events.
    pub prevent_default: bool,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerRelease {
    /// Press and release without a drag; carries the release position in canvas pixels.
    Click(Point),
    /// A pan gesture ended.
    DragEnd,
    /// No gesture was in progress.
    Ignored,
}

/// Owns the view state and turns raw input into view-state transitions.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    view: ViewState,
    gesture: Gesture,
}

impl ViewportController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.view
    }

    #[must_use]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Whether the current press has turned into a drag.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { dragged: true, .. })
    }

    // --- Pointer ---

    /// Start a gesture at `pos`.
    pub fn pointer_down(&mut self, pos: Point) {
        if !pos.is_finite() {
            return;
        }
        self.gesture = Gesture::Panning {
            drag_anchor: Point::new(pos.x - self.view.offset.x, pos.y - self.view.offset.y),
            press: pos,
            dragged: false,
        };
    }

    /// Track the pointer. Returns whether the offset changed.
    pub fn pointer_move(&mut self, pos: Point) -> bool {
        if !pos.is_finite() {
            return false;
        }
        let Gesture::Panning { drag_anchor, press, dragged } = self.gesture else {
            return false;
        };
        let dragged = dragged || pos.distance(press) > DRAG_THRESHOLD_PX;
        self.gesture = Gesture::Panning { drag_anchor, press, dragged };
        if !dragged {
            return false;
        }
        let next = Point::new(pos.x - drag_anchor.x, pos.y - drag_anchor.y);
        let changed = next != self.view.offset;
        self.view.offset = next;
        changed
    }

    /// End the gesture at `pos`.
    pub fn pointer_up(&mut self, pos: Point) -> PointerRelease {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::Idle => PointerRelease::Ignored,
            Gesture::Panning { dragged: true, .. } => PointerRelease::DragEnd,
            Gesture::Panning { dragged: false, press, .. } => {
                if pos.is_finite() && pos.distance(press) <= DRAG_THRESHOLD_PX {
                    PointerRelease::Click(pos)
                } else {
                    PointerRelease::DragEnd
                }
            }
        }
    }

    /// The pointer left the surface; abandon any gesture without a click.
    /// Returns whether a gesture was in progress.
    pub fn pointer_leave(&mut self) -> bool {
        std::mem::take(&mut self.gesture) != Gesture::Idle
    }

    // --- Zoom ---

    /// Apply a wheel event: down zooms out by `WHEEL_ZOOM_OUT`, up zooms in by `WHEEL_ZOOM_IN`.
    ///
    /// A zero or non-finite delta is not a zoom request and leaves the host event alone.
    pub fn wheel(&mut self, input: WheelInput) -> WheelResponse {
        if !input.delta_y.is_finite() || input.delta_y == 0.0 {
            return WheelResponse { changed: false, prevent_default: false };
        }
        let factor = if input.delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
        let changed = self.view.zoom_by(factor);
        WheelResponse { changed, prevent_default: input.cancelable }
    }

    /// Zoom-in button.
    pub fn zoom_in(&mut self) -> bool {
        self.view.zoom_by(BUTTON_ZOOM_STEP)
    }

    /// Zoom-out button.
    pub fn zoom_out(&mut self) -> bool {
        self.view.zoom_by(1.0 / BUTTON_ZOOM_STEP)
    }

    /// Back to fitted scale with no pan. Cancels any gesture in progress.
    /// Returns whether the view state changed.
    pub fn reset(&mut self) -> bool {
        self.gesture = Gesture::Idle;
        let changed = self.view != ViewState::default();
        self.view = ViewState::default();
        changed
    }
}
