//! Output raster composition.
//!
//! Uses inverse mapping: for every output pixel we compute which source
//! position lands there and sample it with bilinear interpolation. When the
//! output is smaller than the scaled source, each output pixel averages a
//! small grid of samples to avoid aliasing.
//!
//! ```text
//! k          = output_size / stage_size
//! left_out   = ((stage - natural_w * scale) / 2 + offset.x) * k
//! src_x      = (out_x - left_out) / (scale * k)
//! ```
//!
//! The raster starts out fully opaque white and source pixels are
//! alpha-composited over it, so transparent source regions come out white and
//! the result never carries an alpha channel.

use crate::decode::SourceImage;
use crate::geometry::Viewport;

/// Opaque background every output raster starts from.
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Upper bound on samples per axis when downscaling.
const MAX_SUPERSAMPLE: u32 = 4;

/// A square, fully opaque RGB raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropRaster {
    /// Side length in pixels.
    pub size: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl CropRaster {
    /// A raster filled with [`BACKGROUND`].
    pub fn blank(size: u32) -> Self {
        let len = size as usize * size as usize * 3;
        Self {
            size,
            pixels: BACKGROUND.iter().copied().cycle().take(len).collect(),
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.size as usize + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.size, self.size, self.pixels.clone())
    }
}

/// Bake the viewport state into an `output_size x output_size` raster.
///
/// Returns `None` when there is nothing to draw: zero output size, an empty
/// source, a viewport that is not ready, or a viewport built for different
/// natural dimensions than `source`.
pub fn compose_square(
    source: &SourceImage,
    viewport: &Viewport,
    output_size: u32,
) -> Option<CropRaster> {
    if output_size == 0
        || source.is_empty()
        || !viewport.is_ready()
        || viewport.natural() != source.natural_size()
    {
        return None;
    }

    let stage = viewport.stage_size();
    let k = output_size as f64 / stage;
    let scale = viewport.effective_scale() * k;
    let offset = viewport.offset();

    let src_w = source.width as f64;
    let src_h = source.height as f64;
    let left = ((stage - src_w * viewport.effective_scale()) / 2.0 + offset.x) * k;
    let top = ((stage - src_h * viewport.effective_scale()) / 2.0 + offset.y) * k;

    let taps = supersample_taps(scale);
    let step = 1.0 / taps as f64;
    let weight = 1.0 / (taps * taps) as f64;

    let mut raster = CropRaster::blank(output_size);

    for out_y in 0..output_size {
        for out_x in 0..output_size {
            let mut acc = [0.0f64; 3];

            for ty in 0..taps {
                let py = out_y as f64 + (ty as f64 + 0.5) * step;
                let v = (py - top) / scale;
                for tx in 0..taps {
                    let px = out_x as f64 + (tx as f64 + 0.5) * step;
                    let u = (px - left) / scale;

                    let sample = if u < -0.5 || u >= src_w + 0.5 || v < -0.5 || v >= src_h + 0.5 {
                        [BACKGROUND[0] as f64, BACKGROUND[1] as f64, BACKGROUND[2] as f64]
                    } else {
                        // Pixel centers sit at half-integer positions
                        sample_over_background(source, u - 0.5, v - 0.5)
                    };

                    for c in 0..3 {
                        acc[c] += sample[c] * weight;
                    }
                }
            }

            let idx = (out_y as usize * output_size as usize + out_x as usize) * 3;
            for c in 0..3 {
                raster.pixels[idx + c] = acc[c].clamp(0.0, 255.0).round() as u8;
            }
        }
    }

    Some(raster)
}

/// Samples per axis for a given source-to-output scale.
fn supersample_taps(scale: f64) -> u32 {
    if scale >= 1.0 {
        return 1;
    }
    ((1.0 / scale).ceil() as u32).clamp(1, MAX_SUPERSAMPLE)
}

/// A source pixel composited over the background.
#[inline]
fn over_background(rgba: [u8; 4]) -> [f64; 3] {
    let alpha = rgba[3] as f64 / 255.0;
    let mut out = [0.0; 3];
    for c in 0..3 {
        out[c] = rgba[c] as f64 * alpha + BACKGROUND[c] as f64 * (1.0 - alpha);
    }
    out
}

/// Bilinear sample with clamp-to-edge, composited over the background.
///
/// Compositing each tap before interpolating keeps the colors of fully
/// transparent pixels from bleeding into their neighbors.
fn sample_over_background(source: &SourceImage, x: f64, y: f64) -> [f64; 3] {
    let x = x.clamp(0.0, (source.width - 1) as f64);
    let y = y.clamp(0.0, (source.height - 1) as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(source.width - 1);
    let y1 = (y0 + 1).min(source.height - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = over_background(source.pixel(x0, y0));
    let p10 = over_background(source.pixel(x1, y0));
    let p01 = over_background(source.pixel(x0, y1));
    let p11 = over_background(source.pixel(x1, y1));

    let mut out = [0.0; 3];
    for c in 0..3 {
        out[c] = p00[c] * (1.0 - fx) * (1.0 - fy)
            + p10[c] * fx * (1.0 - fy)
            + p01[c] * (1.0 - fx) * fy
            + p11[c] * fx * fy;
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: an opaque source fully covers the output at any zoom and pan.
        #[test]
        fn prop_opaque_source_covers_output(
            (width, height) in (2u32..=40, 2u32..=40),
            stage in 10.0f64..=200.0,
            zoom in 1.0f64..=8.0,
            ox in -500.0f64..=500.0,
            oy in -500.0f64..=500.0,
        ) {
            let src = SourceImage::filled(width, height, [0, 0, 0, 255]);
            let mut vp = Viewport::new(src.natural_size(), stage);
            vp.set_zoom(zoom);
            vp.set_offset(ox, oy);

            let raster = compose_square(&src, &vp, 24).unwrap();
            prop_assert!(raster.pixels.iter().all(|&v| v == 0), "background leaked into output");
        }
    }
}
