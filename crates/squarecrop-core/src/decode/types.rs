//! Core types for source image decoding.

use crate::geometry::NaturalSize;
use serde::Serialize;
use thiserror::Error;

/// Why a selected file could not become a crop source.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a format the decoder knows.
    #[error("Unsupported image format")]
    InvalidFormat,

    /// The format was recognized but decoding failed.
    #[error("Failed to decode image: {0}")]
    CorruptedFile(String),

    /// The image decoded but has no pixels.
    #[error("Image has degenerate dimensions {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

/// Display transform encoded by the EXIF orientation tag.
///
/// Every tag value 1-8 is a clockwise rotation by `quarter_turns * 90`
/// degrees followed by an optional horizontal mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExifOrientation {
    pub quarter_turns: u8,
    pub mirrored: bool,
}

impl ExifOrientation {
    pub const IDENTITY: Self = Self {
        quarter_turns: 0,
        mirrored: false,
    };

    /// Map a raw tag value. Unknown values are treated as upright.
    pub fn from_tag(tag: u32) -> Self {
        let (quarter_turns, mirrored) = match tag {
            2 => (0, true),
            3 => (2, false),
            4 => (2, true),
            5 => (1, true),
            6 => (1, false),
            7 => (3, true),
            8 => (3, false),
            _ => (0, false),
        };
        Self {
            quarter_turns,
            mirrored,
        }
    }

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// True when displayed width and height are swapped relative to storage.
    pub fn swaps_axes(self) -> bool {
        self.quarter_turns % 2 == 1
    }
}

/// A decoded source image with straight (non-premultiplied) RGBA pixels.
///
/// Immutable for the lifetime of an edit session. Dropping it releases the
/// pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl SourceImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// A single-color image, mostly useful for tests and placeholders.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn natural_size(&self) -> NaturalSize {
        NaturalSize::new(self.width, self.height)
    }

    /// RGBA value at `(x, y)`. Coordinates must be in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// True if any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks_exact(4).any(|px| px[3] < 255)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_tags() {
        assert!(ExifOrientation::from_tag(1).is_identity());
        assert!(ExifOrientation::from_tag(0).is_identity());
        assert!(ExifOrientation::from_tag(99).is_identity());

        let upright_phone = ExifOrientation::from_tag(6);
        assert_eq!(upright_phone.quarter_turns, 1);
        assert!(!upright_phone.mirrored);
        assert!(upright_phone.swaps_axes());

        let flipped = ExifOrientation::from_tag(4);
        assert_eq!((flipped.quarter_turns, flipped.mirrored), (2, true));
        assert!(!flipped.swaps_axes());
    }

    #[test]
    fn test_filled_source() {
        let img = SourceImage::filled(3, 2, [10, 20, 30, 255]);
        assert_eq!(img.pixels.len(), 24);
        assert_eq!(img.pixel(2, 1), [10, 20, 30, 255]);
        assert_eq!(img.natural_size(), NaturalSize::new(3, 2));
        assert!(!img.has_transparency());
        assert!(!img.is_empty());
    }

    #[test]
    fn test_has_transparency() {
        let mut img = SourceImage::filled(2, 2, [0, 0, 0, 255]);
        img.pixels[7] = 0;
        assert!(img.has_transparency());
    }

    #[test]
    fn test_empty_source() {
        let img = SourceImage::new(0, 0, vec![]);
        assert!(img.is_empty());
        assert!(img.natural_size().is_empty());
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::EmptyImage {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "Image has degenerate dimensions 0x10");
        assert_eq!(DecodeError::InvalidFormat.to_string(), "Unsupported image format");
    }
}
