//! Preview transform for the on-screen stage.

use crate::geometry::Viewport;
use serde::Serialize;

/// Affine transform placing the source image (at natural size) in the stage.
///
/// The image is centered in the stage, translated by the pan offset and then
/// scaled by the effective scale around its own center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTransform {
    /// Horizontal shift of the image center from the stage center.
    pub translate_x: f64,
    /// Vertical shift of the image center from the stage center.
    pub translate_y: f64,
    /// Effective scale (`min_zoom * zoom`).
    pub scale: f64,
    /// Left edge of the scaled image in stage coordinates.
    pub left: f64,
    /// Top edge of the scaled image in stage coordinates.
    pub top: f64,
    pub scaled_width: f64,
    pub scaled_height: f64,
}

impl PreviewTransform {
    /// Derive the transform from the viewport.
    ///
    /// Returns `None` (image hidden) until both the stage size and the
    /// natural size are known.
    pub fn from_viewport(viewport: &Viewport) -> Option<Self> {
        if !viewport.is_ready() {
            return None;
        }
        let natural = viewport.natural();
        let stage = viewport.stage_size();
        let scale = viewport.effective_scale();
        let offset = viewport.offset();

        let scaled_width = natural.width as f64 * scale;
        let scaled_height = natural.height as f64 * scale;

        Some(Self {
            translate_x: offset.x,
            translate_y: offset.y,
            scale,
            left: (stage - scaled_width) / 2.0 + offset.x,
            top: (stage - scaled_height) / 2.0 + offset.y,
            scaled_width,
            scaled_height,
        })
    }

    /// CSS `transform` value for an image absolutely positioned at the stage
    /// center (`left: 50%; top: 50%`) with `transform-origin: center`.
    pub fn to_css(&self) -> String {
        format!(
            "translate(-50%, -50%) translate({:.3}px, {:.3}px) scale({:.6})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}
