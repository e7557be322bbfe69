//! Projection of canvas-order RGBA rasters into PNG sample streams.
//!
//! The encoder's input is always 8-bit RGBA. Each colour type picks its
//! channels from that; grayscale samples come from the red channel. Depths
//! below 8 keep the high bits of the 8-bit sample and are packed MSB-first
//! per scanline; depth 16 widens a sample `v` to `v * 257` (both bytes
//! equal), the lossless 8-to-16 promotion.

use crate::color::ColorType;

/// An image whose pixels are laid out one after another at a fixed byte
/// stride, before any sub-byte packing. Interlace passes select pixels at
/// this granularity.
#[derive(Debug)]
pub(crate) struct SampleImage {
    /// Pixel bytes, `pixel_bytes` per pixel, row-major.
    pub pixels: Vec<u8>,
    /// Bytes per pixel in `pixels` (1 for sub-byte depths).
    pub pixel_bytes: usize,
    /// Bits per packed pixel on the wire.
    pub bits_per_pixel: usize,
}

impl SampleImage {
    /// Bytes per packed scanline for a row of `width` pixels.
    pub(crate) fn row_bytes(&self, width: u32) -> usize {
        (width as usize * self.bits_per_pixel).div_ceil(8)
    }

    /// Filter `bpp`: rounded-up bytes per complete pixel, at least 1.
    pub(crate) fn filter_bpp(&self) -> usize {
        self.bits_per_pixel.div_ceil(8).max(1)
    }

    /// Pack one row of unpacked pixels into wire bytes.
    ///
    /// Depths of 8 and above copy through; sub-byte depths fill each byte
    /// from the most significant bit, zero-padding the final byte.
    pub(crate) fn pack_row(&self, row: &[u8], bit_depth: u8, out: &mut Vec<u8>) {
        if bit_depth >= 8 {
            out.extend_from_slice(row);
            return;
        }

        let mut acc: u8 = 0;
        let mut acc_bits: u8 = 0;
        for &value in row {
            acc = (acc << bit_depth) | value;
            acc_bits += bit_depth;
            if acc_bits == 8 {
                out.push(acc);
                acc = 0;
                acc_bits = 0;
            }
        }
        if acc_bits > 0 {
            out.push(acc << (8 - acc_bits));
        }
    }
}

/// Build the sample image for a non-indexed colour type.
pub(crate) fn project(raster: &[u8], color_type: ColorType, bit_depth: u8) -> SampleImage {
    let channels = color_type.channels();
    let bits_per_pixel = color_type.bits_per_pixel(bit_depth);
    let pixel_bytes = if bit_depth < 8 {
        1
    } else {
        channels * (bit_depth as usize / 8)
    };

    let pixel_count = raster.len() / 4;
    let mut pixels = Vec::with_capacity(pixel_count * pixel_bytes);

    for rgba in raster.chunks_exact(4) {
        match (color_type, bit_depth) {
            (ColorType::Gray, depth) if depth < 8 => {
                pixels.push(rgba[0] >> (8 - depth));
            }
            (ColorType::Gray, 8) => pixels.push(rgba[0]),
            (ColorType::Gray, _) => {
                pixels.extend_from_slice(&[rgba[0], rgba[0]]);
            }
            (ColorType::GrayAlpha, 8) => {
                pixels.extend_from_slice(&[rgba[0], rgba[3]]);
            }
            (ColorType::GrayAlpha, _) => {
                pixels.extend_from_slice(&[rgba[0], rgba[0], rgba[3], rgba[3]]);
            }
            (ColorType::Rgb, 8) => pixels.extend_from_slice(&rgba[..3]),
            (ColorType::Rgb, _) => {
                pixels.extend_from_slice(&[rgba[0], rgba[0], rgba[1], rgba[1], rgba[2], rgba[2]]);
            }
            (ColorType::Rgba, 8) => pixels.extend_from_slice(rgba),
            (ColorType::Rgba, _) => {
                pixels.extend_from_slice(&[
                    rgba[0], rgba[0], rgba[1], rgba[1], rgba[2], rgba[2], rgba[3], rgba[3],
                ]);
            }
            (ColorType::Indexed, _) => {
                // Indexed pixels come from the palette builder, not here.
                unreachable!("indexed rasters are projected by the palette builder")
            }
        }
    }

    SampleImage {
        pixels,
        pixel_bytes,
        bits_per_pixel,
    }
}

/// Wrap palette indices (one byte per pixel) as a sample image.
pub(crate) fn from_indices(indices: Vec<u8>, bit_depth: u8) -> SampleImage {
    SampleImage {
        pixels: indices,
        pixel_bytes: 1,
        bits_per_pixel: bit_depth as usize,
    }
}
