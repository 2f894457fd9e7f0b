//! Pointer and wheel gesture tracking.
//!
//! Converts raw pointer events into pan and zoom updates on a [`Viewport`].
//!
//! # State Machine
//!
//! ```text
//! Idle --down--> Dragging --down--> Pinching
//!  ^                |  ^                |
//!  +------up--------+  +------up--------+
//! ```
//!
//! The state is derived from the number of tracked pointers: none is
//! [`GestureState::Idle`], one is [`GestureState::Dragging`] and two is
//! [`GestureState::Pinching`]. Pointers beyond the second are ignored.
//!
//! A second pointer arriving mid-drag starts a pinch and discards the drag
//! anchor. When the pinch ends and one pointer remains, the next move of that
//! pointer re-anchors the drag at the live offset, so panning resumes without
//! a jump.
//!
//! Every move re-reads the absolute position from the event; nothing is
//! accumulated from deltas.

use crate::geometry::{Point, Viewport};
use tracing::debug;

/// Pointer identifier as reported by the host (e.g. DOM `pointerId`).
pub type PointerId = i32;

/// Number of pointers that take part in gestures.
pub const MAX_TRACKED_POINTERS: usize = 2;

/// Default zoom change per wheel delta unit.
pub const DEFAULT_WHEEL_SENSITIVITY: f64 = 0.0015;

/// Current interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    /// No pointer is down.
    Idle,
    /// One pointer is down and pans the image.
    Dragging,
    /// Two pointers are down and zoom the image.
    Pinching,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedPointer {
    id: PointerId,
    position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    start: Point,
    start_offset: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchAnchor {
    start_distance: f64,
    start_zoom: f64,
}

/// Tracks active pointers and turns their movement into viewport updates.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    pointers: [Option<TrackedPointer>; MAX_TRACKED_POINTERS],
    drag: Option<DragAnchor>,
    pinch: Option<PinchAnchor>,
    wheel_sensitivity: f64,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WHEEL_SENSITIVITY)
    }
}

impl GestureTracker {
    pub fn new(wheel_sensitivity: f64) -> Self {
        let wheel_sensitivity = if wheel_sensitivity.is_finite() {
            wheel_sensitivity
        } else {
            DEFAULT_WHEEL_SENSITIVITY
        };
        Self {
            pointers: [None; MAX_TRACKED_POINTERS],
            drag: None,
            pinch: None,
            wheel_sensitivity,
        }
    }

    pub fn state(&self) -> GestureState {
        match self.active_pointers() {
            0 => GestureState::Idle,
            1 => GestureState::Dragging,
            _ => GestureState::Pinching,
        }
    }

    /// Number of pointers currently tracked.
    pub fn active_pointers(&self) -> usize {
        self.pointers.iter().flatten().count()
    }

    pub fn is_tracking(&self, id: PointerId) -> bool {
        self.slot_of(id).is_some()
    }

    /// Forget all pointers and anchors.
    pub fn reset(&mut self) {
        self.pointers = [None; MAX_TRACKED_POINTERS];
        self.drag = None;
        self.pinch = None;
    }

    /// Drop the drag and pinch anchors but keep the pointers.
    ///
    /// The next move anchors again at the live viewport. Call after the
    /// viewport changed underneath an active gesture (e.g. a stage resize).
    pub fn reanchor(&mut self) {
        let had_drag = self.drag.take().is_some();
        let had_pinch = self.pinch.take().is_some();
        if had_drag || had_pinch {
            debug!(pointers = self.active_pointers(), "gesture re-anchored");
        }
    }

    /// Handle a pointer going down.
    ///
    /// Returns `true` if the pointer was captured. A third simultaneous
    /// pointer is not captured.
    pub fn pointer_down(&mut self, viewport: &Viewport, id: PointerId, position: Point) -> bool {
        if !position.is_finite() {
            return false;
        }

        if let Some(slot) = self.slot_of(id) {
            self.pointers[slot] = Some(TrackedPointer { id, position });
            return true;
        }

        let Some(slot) = self.pointers.iter().position(Option::is_none) else {
            debug!(id, "ignoring pointer beyond the second");
            return false;
        };
        self.pointers[slot] = Some(TrackedPointer { id, position });

        match self.pair() {
            Some((a, b)) => {
                self.drag = None;
                self.pinch = Some(PinchAnchor {
                    start_distance: a.distance_to(b),
                    start_zoom: viewport.zoom(),
                });
                debug!(id, zoom = viewport.zoom(), "pinch started");
            }
            None => {
                self.pinch = None;
                self.drag = Some(DragAnchor {
                    start: position,
                    start_offset: viewport.offset(),
                });
                debug!(id, "drag started");
            }
        }
        true
    }

    /// Handle a pointer move. Returns whether the viewport changed.
    pub fn pointer_move(
        &mut self,
        viewport: &mut Viewport,
        id: PointerId,
        position: Point,
    ) -> bool {
        if !position.is_finite() {
            return false;
        }
        let Some(slot) = self.slot_of(id) else {
            return false;
        };
        self.pointers[slot] = Some(TrackedPointer { id, position });

        if let Some((a, b)) = self.pair() {
            let distance = a.distance_to(b);
            return match self.pinch {
                Some(anchor) if anchor.start_distance > f64::EPSILON => {
                    let factor = distance / anchor.start_distance;
                    viewport.set_zoom(anchor.start_zoom * factor)
                }
                _ => {
                    self.pinch = Some(PinchAnchor {
                        start_distance: distance,
                        start_zoom: viewport.zoom(),
                    });
                    false
                }
            };
        }

        match self.drag {
            Some(anchor) => viewport.set_offset(
                anchor.start_offset.x + (position.x - anchor.start.x),
                anchor.start_offset.y + (position.y - anchor.start.y),
            ),
            None => {
                self.drag = Some(DragAnchor {
                    start: position,
                    start_offset: viewport.offset(),
                });
                debug!(id, "drag re-anchored");
                false
            }
        }
    }

    /// Handle a pointer going up, being cancelled or leaving the stage.
    ///
    /// Unknown or already removed ids are ignored.
    pub fn pointer_up(&mut self, id: PointerId) {
        let Some(slot) = self.slot_of(id) else {
            return;
        };
        self.pointers[slot] = None;

        let remaining = self.active_pointers();
        if remaining < 2 && self.pinch.take().is_some() {
            debug!(id, remaining, "pinch ended");
        }
        if remaining < 1 {
            self.drag = None;
        }
    }

    /// Apply a wheel event. Returns whether the viewport changed.
    ///
    /// Positive `delta_y` (scrolling down) zooms out.
    pub fn wheel(&self, viewport: &mut Viewport, delta_y: f64) -> bool {
        if !delta_y.is_finite() {
            return false;
        }
        viewport.set_zoom(viewport.zoom() * (1.0 - delta_y * self.wheel_sensitivity))
    }

    fn slot_of(&self, id: PointerId) -> Option<usize> {
        self.pointers
            .iter()
            .position(|p| matches!(p, Some(tracked) if tracked.id == id))
    }

    fn pair(&self) -> Option<(Point, Point)> {
        match self.pointers {
            [Some(a), Some(b)] => Some((a.position, b.position)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{NaturalSize, MAX_ZOOM, MIN_ZOOM};

    const EPS: f64 = 1e-9;

    fn viewport() -> Viewport {
        // Wide image: 180 px of horizontal pan each side at zoom 1
        Viewport::new(NaturalSize::new(1000, 500), 360.0)
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_initial_state_idle() {
        let tracker = GestureTracker::default();
        assert_eq!(tracker.state(), GestureState::Idle);
        assert_eq!(tracker.active_pointers(), 0);
    }

    #[test]
    fn test_drag_pans_viewport() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        assert!(tracker.pointer_down(&vp, 1, p(100.0, 100.0)));
        assert_eq!(tracker.state(), GestureState::Dragging);

        assert!(tracker.pointer_move(&mut vp, 1, p(130.0, 100.0)));
        assert!((vp.offset().x - 30.0).abs() < EPS);

        // Absolute, not accumulated
        assert!(tracker.pointer_move(&mut vp, 1, p(110.0, 100.0)));
        assert!((vp.offset().x - 10.0).abs() < EPS);
    }

    #[test]
    fn test_drag_is_clamped() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_move(&mut vp, 1, p(500.0, 500.0));
        assert!((vp.offset().x - 180.0).abs() < EPS);
        assert_eq!(vp.offset().y, 0.0);
    }

    #[test]
    fn test_drag_anchors_on_current_offset() {
        let mut vp = viewport();
        vp.set_offset(50.0, 0.0);
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(10.0, 10.0));
        tracker.pointer_move(&mut vp, 1, p(20.0, 10.0));
        assert!((vp.offset().x - 60.0).abs() < EPS);
    }

    #[test]
    fn test_second_pointer_starts_pinch() {
        let vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(100.0, 100.0));
        tracker.pointer_down(&vp, 2, p(200.0, 100.0));
        assert_eq!(tracker.state(), GestureState::Pinching);
        assert!(tracker.drag.is_none());
        assert!(tracker.pinch.is_some());
    }

    #[test]
    fn test_pinch_zooms() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(100.0, 100.0));
        tracker.pointer_down(&vp, 2, p(200.0, 100.0));

        assert!(tracker.pointer_move(&mut vp, 2, p(300.0, 100.0)));
        assert!((vp.zoom() - 2.0).abs() < EPS);

        // Relative to the anchor, not the previous move
        tracker.pointer_move(&mut vp, 2, p(250.0, 100.0));
        assert!((vp.zoom() - 1.5).abs() < EPS);
    }

    #[test]
    fn test_pinch_zoom_clamped() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_down(&vp, 2, p(10.0, 0.0));
        tracker.pointer_move(&mut vp, 2, p(1000.0, 0.0));
        assert_eq!(vp.zoom(), MAX_ZOOM);

        tracker.pointer_move(&mut vp, 2, p(1.0, 0.0));
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_pinch_from_coincident_points_reanchors() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(50.0, 50.0));
        tracker.pointer_down(&vp, 2, p(50.0, 50.0));
        assert!(!tracker.pointer_move(&mut vp, 2, p(60.0, 50.0)));
        assert_eq!(vp.zoom(), 1.0);

        tracker.pointer_move(&mut vp, 2, p(70.0, 50.0));
        assert!((vp.zoom() - 2.0).abs() < EPS);
        assert!(vp.zoom().is_finite());
    }

    #[test]
    fn test_third_pointer_ignored() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_down(&vp, 2, p(100.0, 0.0));
        assert!(!tracker.pointer_down(&vp, 3, p(50.0, 50.0)));
        assert_eq!(tracker.active_pointers(), 2);
        assert!(!tracker.is_tracking(3));

        assert!(!tracker.pointer_move(&mut vp, 3, p(500.0, 500.0)));
        tracker.pointer_up(3);
        assert_eq!(tracker.state(), GestureState::Pinching);
    }

    #[test]
    fn test_release_all_returns_to_idle() {
        let vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_down(&vp, 2, p(100.0, 0.0));
        tracker.pointer_up(1);
        assert_eq!(tracker.state(), GestureState::Dragging);
        assert!(tracker.pinch.is_none());

        tracker.pointer_up(2);
        assert_eq!(tracker.state(), GestureState::Idle);
        assert!(tracker.drag.is_none());
    }

    #[test]
    fn test_pointer_up_idempotent() {
        let vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 7, p(0.0, 0.0));
        tracker.pointer_up(7);
        tracker.pointer_up(7);
        tracker.pointer_up(42);
        assert_eq!(tracker.state(), GestureState::Idle);
    }

    #[test]
    fn test_moves_ignored_when_idle() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_up(1);
        assert!(!tracker.pointer_move(&mut vp, 1, p(100.0, 0.0)));
        assert_eq!(vp.offset(), Point::ORIGIN);
    }

    #[test]
    fn test_pinch_release_drag_has_no_jump() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        // Drag to the right first
        tracker.pointer_down(&vp, 1, p(100.0, 100.0));
        tracker.pointer_move(&mut vp, 1, p(140.0, 100.0));
        assert!((vp.offset().x - 40.0).abs() < EPS);

        // Pinch in
        tracker.pointer_down(&vp, 2, p(240.0, 100.0));
        tracker.pointer_move(&mut vp, 2, p(340.0, 100.0));
        assert!((vp.zoom() - 2.0).abs() < EPS);

        // Lift the second finger; the first one keeps moving
        tracker.pointer_up(2);
        let before = vp.offset();
        assert!(!tracker.pointer_move(&mut vp, 1, p(400.0, 400.0)));
        assert_eq!(vp.offset(), before);

        tracker.pointer_move(&mut vp, 1, p(410.0, 400.0));
        assert!((vp.offset().x - (before.x + 10.0)).abs() < EPS);
        assert!((vp.offset().y - before.y).abs() < EPS);
    }

    #[test]
    fn test_reanchor_keeps_drag_state() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_move(&mut vp, 1, p(90.0, 0.0));
        vp.set_offset(60.0, 0.0);
        tracker.reanchor();
        assert_eq!(tracker.state(), GestureState::Dragging);
        assert!(tracker.is_tracking(1));

        assert!(!tracker.pointer_move(&mut vp, 1, p(91.0, 0.0)));
        assert!((vp.offset().x - 60.0).abs() < EPS);
        assert!(tracker.pointer_move(&mut vp, 1, p(95.0, 0.0)));
        assert!((vp.offset().x - 64.0).abs() < EPS);
    }

    #[test]
    fn test_reanchor_during_pinch() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_down(&vp, 2, p(50.0, 0.0));
        tracker.pointer_move(&mut vp, 2, p(100.0, 0.0));
        assert!((vp.zoom() - 2.0).abs() < EPS);

        tracker.reanchor();
        assert_eq!(tracker.state(), GestureState::Pinching);
        assert!(!tracker.pointer_move(&mut vp, 2, p(100.0, 0.0)));
        assert!((vp.zoom() - 2.0).abs() < EPS);

        tracker.pointer_move(&mut vp, 2, p(150.0, 0.0));
        assert!((vp.zoom() - 3.0).abs() < EPS);
    }

    #[test]
    fn test_repeated_down_refreshes_position() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        assert!(tracker.pointer_down(&vp, 1, p(10.0, 0.0)));
        assert_eq!(tracker.active_pointers(), 1);
        tracker.pointer_move(&mut vp, 1, p(20.0, 0.0));
        assert!((vp.offset().x - 20.0).abs() < EPS);
    }

    #[test]
    fn test_wheel_zooms() {
        let mut vp = viewport();
        let tracker = GestureTracker::new(0.01);

        // Scroll up zooms in
        assert!(tracker.wheel(&mut vp, -50.0));
        assert!((vp.zoom() - 1.5).abs() < EPS);

        // Scroll down zooms out, clamped to 1
        tracker.wheel(&mut vp, 500.0);
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_wheel_clamped_high() {
        let mut vp = viewport();
        let tracker = GestureTracker::default();
        for _ in 0..200 {
            tracker.wheel(&mut vp, -100.0);
        }
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_wheel_ignores_non_finite() {
        let mut vp = viewport();
        let tracker = GestureTracker::default();
        assert!(!tracker.wheel(&mut vp, f64::NAN));
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_non_finite_position_ignored() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        assert!(!tracker.pointer_down(&vp, 1, p(f64::NAN, 0.0)));
        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        assert!(!tracker.pointer_move(&mut vp, 1, p(f64::INFINITY, 0.0)));
        assert_eq!(vp.offset(), Point::ORIGIN);
    }

    #[test]
    fn test_gestures_on_empty_viewport() {
        let mut vp = Viewport::empty(0.0);
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, p(0.0, 0.0));
        tracker.pointer_move(&mut vp, 1, p(100.0, 100.0));
        tracker.pointer_down(&vp, 2, p(10.0, 0.0));
        tracker.pointer_move(&mut vp, 2, p(40.0, 0.0));
        tracker.wheel(&mut vp, -100.0);

        assert!(vp.offset().is_finite());
        assert!(vp.zoom().is_finite());
        assert_eq!(vp.offset(), Point::ORIGIN);
    }
}
