//! Live preview transform and output raster composition.
//!
//! Both derive from the same [`Viewport`](crate::geometry::Viewport) state:
//!
//! - [`PreviewTransform`] is what the host applies to the on-screen image
//!   while the user interacts
//! - [`compose_square`] bakes the final state into an opaque square raster
//!   on commit
//!
//! Interactive math and clamping happen in stage space; composition maps
//! stage space to output space with a single factor
//! `k = output_size / stage_size`, so the exported resolution is independent
//! of the on-screen stage size.

mod compose;
mod preview;

pub use compose::{compose_square, CropRaster, BACKGROUND};
pub use preview::PreviewTransform;
