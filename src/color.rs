//! PNG colour types and the bit depths each one allows.

use crate::error::{Error, Result};

/// PNG colour types (the IHDR colour-type byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// Grayscale, one sample per pixel.
    Gray,
    /// Red, green, blue.
    Rgb,
    /// Palette indices into a PLTE chunk.
    Indexed,
    /// Grayscale plus alpha.
    GrayAlpha,
    /// Red, green, blue, alpha.
    Rgba,
}

impl ColorType {
    /// The IHDR colour-type value.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            ColorType::Gray => 0,
            ColorType::Rgb => 2,
            ColorType::Indexed => 3,
            ColorType::GrayAlpha => 4,
            ColorType::Rgba => 6,
        }
    }

    /// Samples per pixel for this colour type.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            ColorType::Gray | ColorType::Indexed => 1,
            ColorType::GrayAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }

    /// Whether `bit_depth` is a legal sample depth for this colour type.
    #[inline]
    pub const fn supports_bit_depth(self, bit_depth: u8) -> bool {
        match self {
            ColorType::Gray => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
            ColorType::Indexed => matches!(bit_depth, 1 | 2 | 4 | 8),
            ColorType::Rgb | ColorType::GrayAlpha | ColorType::Rgba => {
                matches!(bit_depth, 8 | 16)
            }
        }
    }

    /// Validate a colour-type/bit-depth combination.
    pub fn check_bit_depth(self, bit_depth: u8) -> Result<()> {
        if self.supports_bit_depth(bit_depth) {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                reason: "bit depth not allowed for this colour type",
            })
        }
    }

    /// Bits per complete pixel at the given depth.
    #[inline]
    pub const fn bits_per_pixel(self, bit_depth: u8) -> usize {
        self.channels() * bit_depth as usize
    }
}

impl TryFrom<u8> for ColorType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(ColorType::Gray),
            2 => Ok(ColorType::Rgb),
            3 => Ok(ColorType::Indexed),
            4 => Ok(ColorType::GrayAlpha),
            6 => Ok(ColorType::Rgba),
            other => Err(other),
        }
    }
}
