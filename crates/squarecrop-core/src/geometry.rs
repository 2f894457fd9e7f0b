//! Viewport geometry: cover scale, zoom and pan clamping.
//!
//! All interactive math happens in *stage space*: a square of side
//! `stage_size` pixels with the origin at its top-left corner. The source
//! image is centered in the stage, shifted by `offset` and scaled by
//! `effective_scale = min_zoom * zoom`.
//!
//! # Invariants
//!
//! - `min_zoom = max(stage / natural_w, stage / natural_h)` so that the image
//!   always covers the stage at `zoom = 1`
//! - `zoom` is always within [`MIN_ZOOM`, `MAX_ZOOM`]
//! - `|offset.x| <= max((natural_w * effective_scale - stage) / 2, 0)` and the
//!   same for y, so panning never reveals area outside the source image
//!
//! While the stage or the natural size is unknown (zero), every function here
//! returns neutral values instead of NaN or infinity.

use serde::{Deserialize, Serialize};

/// Lower bound of the user zoom multiplier (relative to the cover scale).
pub const MIN_ZOOM: f64 = 1.0;

/// Upper bound of the user zoom multiplier (relative to the cover scale).
pub const MAX_ZOOM: f64 = 8.0;

/// A point or displacement in stage space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Untransformed pixel dimensions of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NaturalSize {
    pub width: u32,
    pub height: u32,
}

impl NaturalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True while the dimensions are unknown or degenerate.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The square region of the source image visible in the stage, in source
/// pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub side: f64,
}

#[inline]
fn is_valid_stage(stage_size: f64) -> bool {
    stage_size.is_finite() && stage_size > 0.0
}

/// Compute the cover scale for an image inside a square stage.
///
/// Returns `max(stage / width, stage / height)`, the smallest scale at which
/// the image fills the stage without an empty border. Degenerate input
/// (zero-sized image or stage) yields `1.0`.
pub fn compute_min_zoom(natural: NaturalSize, stage_size: f64) -> f64 {
    if natural.is_empty() || !is_valid_stage(stage_size) {
        return 1.0;
    }
    let by_width = stage_size / natural.width as f64;
    let by_height = stage_size / natural.height as f64;
    by_width.max(by_height)
}

/// Clamp a user zoom multiplier into [`MIN_ZOOM`, `MAX_ZOOM`].
///
/// NaN maps to `MIN_ZOOM`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Maximum pan distance from center along one axis.
///
/// `extent` is the natural length of the image along that axis.
pub fn max_pan(extent: u32, scale: f64, stage_size: f64) -> f64 {
    if !is_valid_stage(stage_size) || !scale.is_finite() {
        return 0.0;
    }
    let slack = (extent as f64 * scale - stage_size) / 2.0;
    if slack.is_finite() {
        slack.max(0.0)
    } else {
        0.0
    }
}

/// Clamp an offset so the scaled image still covers the stage.
///
/// `scale` is passed explicitly so callers can evaluate a pending scale
/// without mutating any state.
pub fn clamp_offset(natural: NaturalSize, stage_size: f64, offset: Point, scale: f64) -> Point {
    if natural.is_empty() {
        return Point::ORIGIN;
    }
    let bound_x = max_pan(natural.width, scale, stage_size);
    let bound_y = max_pan(natural.height, scale, stage_size);
    let axis = |v: f64, bound: f64| if v.is_finite() { v.clamp(-bound, bound) } else { 0.0 };
    Point::new(axis(offset.x, bound_x), axis(offset.y, bound_y))
}

/// Shrink a preferred stage side length to fit the available viewport.
///
/// The stage is never grown beyond `preferred`. A non-positive or
/// non-finite `available` means "unknown" and leaves `preferred` as is.
pub fn effective_stage_size(preferred: f64, available: f64) -> f64 {
    let preferred = if preferred.is_finite() { preferred.max(0.0) } else { 0.0 };
    if !is_valid_stage(available) {
        return preferred.floor();
    }
    preferred.min(available).floor()
}

/// Zoom and pan state for one source image in one square stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    natural: NaturalSize,
    stage_size: f64,
    min_zoom: f64,
    zoom: f64,
    offset: Point,
}

impl Viewport {
    /// Create a viewport at default zoom and centered offset.
    pub fn new(natural: NaturalSize, stage_size: f64) -> Self {
        let stage_size = if is_valid_stage(stage_size) { stage_size } else { 0.0 };
        Self {
            natural,
            stage_size,
            min_zoom: compute_min_zoom(natural, stage_size),
            zoom: MIN_ZOOM,
            offset: Point::ORIGIN,
        }
    }

    /// A viewport without a source image.
    pub fn empty(stage_size: f64) -> Self {
        Self::new(NaturalSize::default(), stage_size)
    }

    pub fn natural(&self) -> NaturalSize {
        self.natural
    }

    pub fn stage_size(&self) -> f64 {
        self.stage_size
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// On-screen scale applied to the source image.
    pub fn effective_scale(&self) -> f64 {
        self.min_zoom * self.zoom
    }

    /// True once both the stage and the natural dimensions are known.
    pub fn is_ready(&self) -> bool {
        !self.natural.is_empty() && is_valid_stage(self.stage_size)
    }

    /// Replace the source dimensions and reset zoom and pan.
    pub fn set_source(&mut self, natural: NaturalSize) {
        *self = Self::new(natural, self.stage_size);
    }

    /// Resize the stage, keeping the visible crop in place.
    ///
    /// The relative `zoom` is kept and the offset is scaled by the stage
    /// ratio, then clamped against the new cover scale.
    pub fn set_stage_size(&mut self, stage_size: f64) {
        let stage_size = if is_valid_stage(stage_size) { stage_size } else { 0.0 };
        if stage_size == self.stage_size {
            return;
        }

        let ratio = if self.stage_size > 0.0 && stage_size > 0.0 {
            stage_size / self.stage_size
        } else {
            0.0
        };
        let projected = Point::new(self.offset.x * ratio, self.offset.y * ratio);

        self.stage_size = stage_size;
        self.min_zoom = compute_min_zoom(self.natural, stage_size);
        self.offset = self.clamp_offset(projected.x, projected.y, self.effective_scale());
    }

    /// Set the zoom multiplier, clamped into [`MIN_ZOOM`, `MAX_ZOOM`].
    ///
    /// Non-finite input is ignored. The offset is re-clamped against the new
    /// scale. Returns whether the state changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let zoom = clamp_zoom(zoom);
        let offset = self.clamp_offset(self.offset.x, self.offset.y, self.min_zoom * zoom);
        let changed = zoom != self.zoom || offset != self.offset;
        self.zoom = zoom;
        self.offset = offset;
        changed
    }

    /// Set the pan offset, clamped against the current scale.
    ///
    /// Returns whether the state changed.
    pub fn set_offset(&mut self, x: f64, y: f64) -> bool {
        let offset = self.clamp_offset(x, y, self.effective_scale());
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }

    /// Clamp an offset against an arbitrary (possibly pending) scale.
    pub fn clamp_offset(&self, x: f64, y: f64, scale: f64) -> Point {
        clamp_offset(self.natural, self.stage_size, Point::new(x, y), scale)
    }

    /// The square of the source image currently visible in the stage.
    ///
    /// Returns `None` while the viewport is not ready.
    pub fn visible_region(&self) -> Option<CropRegion> {
        if !self.is_ready() {
            return None;
        }
        let scale = self.effective_scale();
        let side = self.stage_size / scale;
        let x = self.natural.width as f64 / 2.0 - self.offset.x / scale - side / 2.0;
        let y = self.natural.height as f64 / 2.0 - self.offset.y / scale - side / 2.0;
        Some(CropRegion { x, y, side })
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn natural_strategy() -> impl Strategy<Value = NaturalSize> {
        (1u32..=6000, 1u32..=6000).prop_map(|(w, h)| NaturalSize::new(w, h))
    }

    proptest! {
        /// Property: at zoom 1 and centered, the scaled image covers the stage.
        #[test]
        fn prop_cover_at_default(
            natural in natural_strategy(),
            stage in 1.0f64..=2000.0,
        ) {
            let vp = Viewport::new(natural, stage);
            let expected = (stage / natural.width as f64).max(stage / natural.height as f64);
            prop_assert!((vp.min_zoom() - expected).abs() <= expected * 1e-12);

            let scaled_w = natural.width as f64 * vp.effective_scale();
            let scaled_h = natural.height as f64 * vp.effective_scale();
            prop_assert!(scaled_w >= stage * (1.0 - 1e-12));
            prop_assert!(scaled_h >= stage * (1.0 - 1e-12));
        }

        /// Property: a clamped offset never exposes area outside the source.
        #[test]
        fn prop_visible_region_inside_source(
            natural in natural_strategy(),
            stage in 1.0f64..=2000.0,
            zoom in 1.0f64..=8.0,
            ox in -1e5f64..=1e5,
            oy in -1e5f64..=1e5,
        ) {
            let mut vp = Viewport::new(natural, stage);
            vp.set_zoom(zoom);
            vp.set_offset(ox, oy);

            let region = vp.visible_region().unwrap();
            let tol = 1e-6 * (natural.width.max(natural.height) as f64);
            prop_assert!(region.x >= -tol);
            prop_assert!(region.y >= -tol);
            prop_assert!(region.x + region.side <= natural.width as f64 + tol);
            prop_assert!(region.y + region.side <= natural.height as f64 + tol);
        }

        /// Property: zoom always stays within bounds.
        #[test]
        fn prop_zoom_bounded(zoom in -100.0f64..=100.0) {
            let mut vp = Viewport::new(NaturalSize::new(640, 480), 320.0);
            vp.set_zoom(zoom);
            prop_assert!(vp.zoom() >= MIN_ZOOM && vp.zoom() <= MAX_ZOOM);
        }

        /// Property: stage resizing never produces non-finite state.
        #[test]
        fn prop_stage_resize_finite(
            natural in natural_strategy(),
            first in 0.0f64..=2000.0,
            second in 0.0f64..=2000.0,
            zoom in 1.0f64..=8.0,
            ox in -1e4f64..=1e4,
        ) {
            let mut vp = Viewport::new(natural, first);
            vp.set_zoom(zoom);
            vp.set_offset(ox, -ox);
            vp.set_stage_size(second);

            prop_assert!(vp.min_zoom().is_finite());
            prop_assert!(vp.effective_scale().is_finite());
            prop_assert!(vp.offset().is_finite());
            let bound = max_pan(natural.width, vp.effective_scale(), vp.stage_size());
            prop_assert!(vp.offset().x.abs() <= bound + 1e-9);
        }
    }
}
