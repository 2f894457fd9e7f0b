//! Squarecrop Core - square crop editor engine
//!
//! This crate provides the state and math behind an interactive square crop
//! editor: the user pans and zooms a source image inside a square stage and
//! commits a fixed-size, fully opaque square output file.
//!
//! # Modules
//!
//! - [`geometry`] - cover scale, zoom and pan clamping
//! - [`gesture`] - pointer/wheel state machine (drag, pinch, wheel zoom)
//! - [`render`] - live preview transform and output raster composition
//! - [`decode`] - source image decoding with EXIF orientation
//! - [`encode`] - JPEG/PNG encoding with fallback and `data:` URLs
//! - [`session`] - one owned editing session tying it all together
//! - [`config`] - host configuration and export settings
//!
//! Everything is synchronous and single-threaded. Logging goes through
//! `tracing`; no subscriber is installed by this crate.

pub mod config;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod gesture;
pub mod render;
pub mod session;

pub use config::{ConfigError, CropConfig, OutputSpec};
pub use decode::{decode_source, DecodeError, SourceImage};
pub use encode::{EncodeError, OutputFormat};
pub use geometry::{CropRegion, NaturalSize, Point, Viewport, MAX_ZOOM, MIN_ZOOM};
pub use gesture::{GestureState, GestureTracker, PointerId};
pub use render::{compose_square, CropRaster, PreviewTransform};
pub use session::{CropError, CropOutput, CropSession};
