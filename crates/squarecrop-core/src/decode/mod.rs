//! Source image decoding.
//!
//! Turns the raw bytes of a user-selected file into a [`SourceImage`] whose
//! dimensions are the *natural size* used by all viewport geometry.
//!
//! - Format is sniffed from the bytes (JPEG and PNG)
//! - EXIF orientation is applied so the natural size matches what the user sees
//! - Pixels are converted to RGBA8 so transparency survives until export
//!
//! Until decoding succeeds the session has no natural size, and stage
//! rendering and commit stay disabled.

mod source;
mod types;

pub use source::{decode_source, read_orientation};
pub use types::{DecodeError, ExifOrientation, SourceImage};
