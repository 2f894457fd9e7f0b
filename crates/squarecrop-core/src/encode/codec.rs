//! JPEG and PNG encoding of output rasters.
//!
//! Encoding goes through a [`RasterEncoder`]. [`CodecEncoder`] drives the
//! `image` crate's codec encoders directly and honors the quality factor.
//! [`BufferEncoder`] rebuilds an owned pixel buffer and writes it through
//! `DynamicImage`; it is the fallback when the primary path fails. Both honor
//! the same quality setting.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::render::CropRaster;

/// Errors that can occur while encoding a raster.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image or produced no output
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed {
        format: OutputFormat,
        reason: String,
    },
}

/// Encoded file format of the committed crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy, honors the quality factor.
    #[default]
    #[serde(alias = "jpg", alias = "image/jpeg")]
    Jpeg,
    /// Lossless, quality is ignored.
    #[serde(alias = "image/png")]
    Png,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Jpeg => f.write_str("JPEG"),
            OutputFormat::Png => f.write_str("PNG"),
        }
    }
}

/// Something that can turn an output raster into file bytes.
pub trait RasterEncoder {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    fn encode(
        &self,
        raster: &CropRaster,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError>;
}

/// Primary encoder: the `image` crate's codec encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecEncoder;

impl RasterEncoder for CodecEncoder {
    fn name(&self) -> &'static str {
        "codec"
    }

    fn encode(
        &self,
        raster: &CropRaster,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError> {
        match format {
            OutputFormat::Jpeg => encode_jpeg(&raster.pixels, raster.size, raster.size, quality),
            OutputFormat::Png => encode_png(&raster.pixels, raster.size, raster.size),
        }
    }
}

/// Fallback encoder: rebuilds an `RgbImage` from the raw buffer and writes
/// it through `DynamicImage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferEncoder;

impl RasterEncoder for BufferEncoder {
    fn name(&self) -> &'static str {
        "buffer"
    }

    fn encode(
        &self,
        raster: &CropRaster,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError> {
        validate(&raster.pixels, raster.size, raster.size)?;
        let rgb = raster.to_rgb_image().ok_or(EncodeError::InvalidPixelData {
            expected: raster.size as usize * raster.size as usize * 3,
            actual: raster.pixels.len(),
        })?;

        let image = DynamicImage::ImageRgb8(rgb);
        let mut buffer = Cursor::new(Vec::new());
        let written = match format {
            OutputFormat::Jpeg => image.write_with_encoder(JpegEncoder::new_with_quality(
                &mut buffer,
                quality.clamp(1, 100),
            )),
            OutputFormat::Png => image.write_to(&mut buffer, format.image_format()),
        };
        written.map_err(|e| EncodeError::EncodingFailed {
            format,
            reason: e.to_string(),
        })?;

        non_empty(buffer.into_inner(), format)
    }
}

/// Encode with `primary`, retrying once with `fallback` on failure.
pub fn encode_with_fallback(
    primary: &dyn RasterEncoder,
    fallback: &dyn RasterEncoder,
    raster: &CropRaster,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match primary.encode(raster, format, quality) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            warn!(encoder = primary.name(), error = %err, "primary encoder failed, falling back");
            fallback.encode(raster, format, quality).inspect_err(|err| {
                warn!(encoder = fallback.name(), error = %err, "fallback encoder failed");
            })
        }
    }
}

/// Encode a raster with the default encoder chain.
pub fn encode_raster(
    raster: &CropRaster,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    encode_with_fallback(&CodecEncoder, &BufferEncoder, raster, format, quality)
}

/// Encode RGB pixel data to JPEG bytes.
///
/// `quality` is clamped to 1-100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Jpeg,
            reason: e.to_string(),
        })?;

    non_empty(buffer.into_inner(), OutputFormat::Jpeg)
}

/// Encode RGB pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Png,
            reason: e.to_string(),
        })?;

    non_empty(buffer, OutputFormat::Png)
}

fn validate(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * 3;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

fn non_empty(bytes: Vec<u8>, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    if bytes.is_empty() {
        return Err(EncodeError::EncodingFailed {
            format,
            reason: "encoder produced no data".to_string(),
        });
    }
    Ok(bytes)
}
