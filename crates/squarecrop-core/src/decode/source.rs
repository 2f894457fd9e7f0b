//! Decoding of user-selected files with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};
use tracing::{debug, warn};

use super::{DecodeError, ExifOrientation, SourceImage};

/// Decode a source image from file bytes.
///
/// The format is guessed from the content, EXIF orientation is applied and
/// the result is converted to RGBA8.
///
/// # Errors
///
/// - `DecodeError::InvalidFormat` if the bytes are not a recognized image, or
///   are a recognized format this build cannot decode (e.g. GIF, WebP)
/// - `DecodeError::CorruptedFile` if decoding fails
/// - `DecodeError::EmptyImage` if the image has a zero dimension
pub fn decode_source(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        warn!(len = bytes.len(), "unrecognized source image format");
        return Err(DecodeError::InvalidFormat);
    }
    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(reason) => {
            warn!(%reason, "source image format not supported");
            DecodeError::InvalidFormat
        }
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let orientation = read_orientation(bytes);
    let rgba = orient(img, orientation).into_rgba8();
    let (width, height) = rgba.dimensions();
    if width.min(height) == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    debug!(width, height, ?orientation, "decoded source image");
    Ok(SourceImage::from_rgba_image(rgba))
}

/// Read the EXIF orientation from file bytes.
///
/// Files without EXIF data (most PNGs) are upright.
pub fn read_orientation(bytes: &[u8]) -> ExifOrientation {
    Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(ExifOrientation::from_tag)
        .unwrap_or_default()
}

fn orient(img: DynamicImage, orientation: ExifOrientation) -> DynamicImage {
    let turned = match orientation.quarter_turns % 4 {
        1 => img.rotate90(),
        2 => img.rotate180(),
        3 => img.rotate270(),
        _ => img,
    };
    if orientation.mirrored {
        turned.fliph()
    } else {
        turned
    }
}
