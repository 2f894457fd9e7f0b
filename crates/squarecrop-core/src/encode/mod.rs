//! Output encoding for committed crops.
//!
//! This module provides:
//! - Lossy (JPEG, with quality) and lossless (PNG) encoding of RGB rasters
//! - A primary codec encoder with a fallback that re-encodes from a rebuilt
//!   pixel buffer
//! - `data:` URLs used as the inline preview handed back to the host
//!
//! All output is 8-bit RGB, so encoded files never carry transparency.

mod codec;
mod data_url;

pub use codec::{
    encode_jpeg, encode_png, encode_raster, encode_with_fallback, BufferEncoder, CodecEncoder,
    EncodeError, OutputFormat, RasterEncoder,
};
pub use data_url::to_data_url;
