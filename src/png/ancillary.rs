//! Ancillary PNG chunks: payload types and their wire serialization.
//!
//! Each optional chunk gets a small typed carrier on
//! [`crate::png::PngParams`] and a writer here. The compressed chunks
//! (iCCP, zTXt, iTXt) run their payloads through this crate's own zlib
//! encoder with the caller's DEFLATE settings.

use crate::compress::deflate::{deflate_zlib, DeflateConfig};
use crate::error::{Error, Result};
use crate::png::chunk::write_chunk;

/// cHRM: white point and primary chromaticities, each coordinate
/// multiplied by 100 000.
#[derive(Debug, Clone, Copy)]
pub struct Chromaticities {
    /// White point x.
    pub white_x: u32,
    /// White point y.
    pub white_y: u32,
    /// Red primary x.
    pub red_x: u32,
    /// Red primary y.
    pub red_y: u32,
    /// Green primary x.
    pub green_x: u32,
    /// Green primary y.
    pub green_y: u32,
    /// Blue primary x.
    pub blue_x: u32,
    /// Blue primary y.
    pub blue_y: u32,
}

/// sBIT: significant bits per channel, shaped by colour type.
#[derive(Debug, Clone, Copy)]
pub enum SignificantBits {
    /// Grayscale images.
    Gray(u8),
    /// Grayscale + alpha images.
    GrayAlpha(u8, u8),
    /// Truecolour and indexed images.
    Rgb(u8, u8, u8),
    /// Truecolour + alpha images.
    Rgba(u8, u8, u8, u8),
}

/// sRGB rendering intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingIntent {
    /// Perceptual (0).
    Perceptual,
    /// Relative colorimetric (1).
    RelativeColorimetric,
    /// Saturation (2).
    Saturation,
    /// Absolute colorimetric (3).
    AbsoluteColorimetric,
}

impl RenderingIntent {
    fn code(self) -> u8 {
        match self {
            RenderingIntent::Perceptual => 0,
            RenderingIntent::RelativeColorimetric => 1,
            RenderingIntent::Saturation => 2,
            RenderingIntent::AbsoluteColorimetric => 3,
        }
    }
}

/// iCCP: an embedded ICC profile.
#[derive(Debug, Clone)]
pub struct IccProfile {
    /// Profile name (a chunk keyword).
    pub name: String,
    /// Compression method; only 0 (DEFLATE) is defined.
    pub compression_method: u8,
    /// Raw profile bytes (compressed on the wire).
    pub profile: Vec<u8>,
}

/// bKGD: default background colour, shaped by colour type.
#[derive(Debug, Clone, Copy)]
pub enum Background {
    /// Grayscale level (sample-depth scaled).
    Gray(u16),
    /// RGB levels (sample-depth scaled).
    Rgb(u16, u16, u16),
    /// For indexed images: the colour to resolve against the palette.
    Palette([u8; 3]),
}

/// pHYs: intended physical pixel dimensions.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalDimensions {
    /// Pixels per unit, x axis.
    pub pixels_per_unit_x: u32,
    /// Pixels per unit, y axis.
    pub pixels_per_unit_y: u32,
    /// Whether the unit is the metre (otherwise unknown).
    pub in_meters: bool,
}

/// tIME: last-modification timestamp (UTC).
#[derive(Debug, Clone, Copy)]
pub struct TimeStamp {
    /// Full year, e.g. 2024.
    pub year: u16,
    /// Month 1-12.
    pub month: u8,
    /// Day 1-31.
    pub day: u8,
    /// Hour 0-23.
    pub hour: u8,
    /// Minute 0-59.
    pub minute: u8,
    /// Second 0-60 (60 allows leap seconds).
    pub second: u8,
}

/// tEXt: an uncompressed keyword/text pair.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// Keyword, 1-79 printable Latin-1 characters.
    pub keyword: String,
    /// Text content.
    pub text: String,
}

/// zTXt: a compressed keyword/text pair.
#[derive(Debug, Clone)]
pub struct CompressedText {
    /// Keyword, 1-79 printable Latin-1 characters.
    pub keyword: String,
    /// Compression method; only 0 (DEFLATE) is defined.
    pub compression_method: u8,
    /// Text content (compressed on the wire).
    pub text: String,
}

/// iTXt: an international (UTF-8) text chunk.
#[derive(Debug, Clone)]
pub struct InternationalText {
    /// Keyword, 1-79 printable Latin-1 characters.
    pub keyword: String,
    /// RFC 3066 language tag; may be empty.
    pub language_tag: String,
    /// Keyword translated into `language_tag`; may be empty.
    pub translated_keyword: String,
    /// Whether the text is compressed on the wire.
    pub compressed: bool,
    /// Compression method; only 0 (DEFLATE) is defined.
    pub compression_method: u8,
    /// UTF-8 text content.
    pub text: String,
}

/// Validate a chunk keyword: 1-79 bytes of printable Latin-1, no leading,
/// trailing, or consecutive spaces.
pub(crate) fn validate_keyword(keyword: &str) -> Result<()> {
    let bytes = keyword.as_bytes();
    if bytes.is_empty() || bytes.len() > 79 {
        return Err(Error::InvalidParameter {
            reason: "keyword must be 1-79 bytes",
        });
    }
    if bytes[0] == b' ' || bytes[bytes.len() - 1] == b' ' {
        return Err(Error::InvalidParameter {
            reason: "keyword has leading or trailing space",
        });
    }
    let mut prev_space = false;
    for &b in bytes {
        let printable = (32..=126).contains(&b) || (161..=255).contains(&b);
        if !printable {
            return Err(Error::InvalidParameter {
                reason: "keyword contains non-printable character",
            });
        }
        if b == b' ' && prev_space {
            return Err(Error::InvalidParameter {
                reason: "keyword has consecutive spaces",
            });
        }
        prev_space = b == b' ';
    }
    Ok(())
}

pub(crate) fn write_gama(output: &mut Vec<u8>, gamma: u32) {
    write_chunk(output, b"gAMA", &gamma.to_be_bytes());
}

pub(crate) fn write_chrm(output: &mut Vec<u8>, c: &Chromaticities) {
    let mut data = Vec::with_capacity(32);
    for value in [
        c.white_x, c.white_y, c.red_x, c.red_y, c.green_x, c.green_y, c.blue_x, c.blue_y,
    ] {
        data.extend_from_slice(&value.to_be_bytes());
    }
    write_chunk(output, b"cHRM", &data);
}

pub(crate) fn write_sbit(output: &mut Vec<u8>, bits: &SignificantBits) {
    let data: Vec<u8> = match *bits {
        SignificantBits::Gray(g) => vec![g],
        SignificantBits::GrayAlpha(g, a) => vec![g, a],
        SignificantBits::Rgb(r, g, b) => vec![r, g, b],
        SignificantBits::Rgba(r, g, b, a) => vec![r, g, b, a],
    };
    write_chunk(output, b"sBIT", &data);
}

pub(crate) fn write_srgb(output: &mut Vec<u8>, intent: RenderingIntent) {
    write_chunk(output, b"sRGB", &[intent.code()]);
}

pub(crate) fn write_iccp(
    output: &mut Vec<u8>,
    profile: &IccProfile,
    deflate_config: &DeflateConfig,
) -> Result<()> {
    validate_keyword(&profile.name)?;
    if profile.compression_method != 0 {
        return Err(Error::UnsupportedCompressionMethod(
            profile.compression_method,
        ));
    }

    let compressed = deflate_zlib(&profile.profile, deflate_config)?;
    let mut data = Vec::with_capacity(profile.name.len() + 2 + compressed.len());
    data.extend_from_slice(profile.name.as_bytes());
    data.push(0);
    data.push(0); // compression method
    data.extend_from_slice(&compressed);
    write_chunk(output, b"iCCP", &data);
    Ok(())
}

/// bKGD for grayscale or truecolour images; the indexed form is written by
/// the framer once the palette index is known.
pub(crate) fn write_bkgd(output: &mut Vec<u8>, background: &Background) {
    match *background {
        Background::Gray(level) => {
            write_chunk(output, b"bKGD", &level.to_be_bytes());
        }
        Background::Rgb(r, g, b) => {
            let mut data = Vec::with_capacity(6);
            data.extend_from_slice(&r.to_be_bytes());
            data.extend_from_slice(&g.to_be_bytes());
            data.extend_from_slice(&b.to_be_bytes());
            write_chunk(output, b"bKGD", &data);
        }
        Background::Palette(_) => {}
    }
}

pub(crate) fn write_bkgd_indexed(output: &mut Vec<u8>, index: u8) {
    write_chunk(output, b"bKGD", &[index]);
}

/// hIST: approximate usage counts, saturating into u16.
pub(crate) fn write_hist(output: &mut Vec<u8>, histogram: &[u32]) {
    let mut data = Vec::with_capacity(histogram.len() * 2);
    for &count in histogram {
        let clamped = count.min(u16::MAX as u32) as u16;
        data.extend_from_slice(&clamped.to_be_bytes());
    }
    write_chunk(output, b"hIST", &data);
}

pub(crate) fn write_phys(output: &mut Vec<u8>, phys: &PhysicalDimensions) {
    let mut data = Vec::with_capacity(9);
    data.extend_from_slice(&phys.pixels_per_unit_x.to_be_bytes());
    data.extend_from_slice(&phys.pixels_per_unit_y.to_be_bytes());
    data.push(phys.in_meters as u8);
    write_chunk(output, b"pHYs", &data);
}

/// sPLT at sample depth 8, entries paired with their frequencies.
pub(crate) fn write_splt(
    output: &mut Vec<u8>,
    name: &str,
    entries: &[[u8; 4]],
    histogram: &[u32],
) -> Result<()> {
    validate_keyword(name)?;

    let mut data = Vec::with_capacity(name.len() + 2 + entries.len() * 6);
    data.extend_from_slice(name.as_bytes());
    data.push(0);
    data.push(8); // sample depth
    for (entry, &count) in entries.iter().zip(histogram) {
        data.extend_from_slice(entry);
        let freq = count.min(u16::MAX as u32) as u16;
        data.extend_from_slice(&freq.to_be_bytes());
    }
    write_chunk(output, b"sPLT", &data);
    Ok(())
}

pub(crate) fn write_time(output: &mut Vec<u8>, time: &TimeStamp) -> Result<()> {
    if !(1..=12).contains(&time.month)
        || !(1..=31).contains(&time.day)
        || time.hour > 23
        || time.minute > 59
        || time.second > 60
    {
        return Err(Error::InvalidParameter {
            reason: "timestamp field out of range",
        });
    }
    let mut data = Vec::with_capacity(7);
    data.extend_from_slice(&time.year.to_be_bytes());
    data.extend_from_slice(&[time.month, time.day, time.hour, time.minute, time.second]);
    write_chunk(output, b"tIME", &data);
    Ok(())
}

pub(crate) fn write_text(output: &mut Vec<u8>, text: &TextChunk) -> Result<()> {
    validate_keyword(&text.keyword)?;
    let mut data = Vec::with_capacity(text.keyword.len() + 1 + text.text.len());
    data.extend_from_slice(text.keyword.as_bytes());
    data.push(0);
    data.extend_from_slice(text.text.as_bytes());
    write_chunk(output, b"tEXt", &data);
    Ok(())
}

pub(crate) fn write_ztxt(
    output: &mut Vec<u8>,
    text: &CompressedText,
    deflate_config: &DeflateConfig,
) -> Result<()> {
    validate_keyword(&text.keyword)?;
    if text.compression_method != 0 {
        return Err(Error::UnsupportedCompressionMethod(text.compression_method));
    }

    let compressed = deflate_zlib(text.text.as_bytes(), deflate_config)?;
    let mut data = Vec::with_capacity(text.keyword.len() + 2 + compressed.len());
    data.extend_from_slice(text.keyword.as_bytes());
    data.push(0);
    data.push(0); // compression method
    data.extend_from_slice(&compressed);
    write_chunk(output, b"zTXt", &data);
    Ok(())
}

pub(crate) fn write_itxt(
    output: &mut Vec<u8>,
    text: &InternationalText,
    deflate_config: &DeflateConfig,
) -> Result<()> {
    validate_keyword(&text.keyword)?;
    if text.compression_method != 0 {
        return Err(Error::UnsupportedCompressionMethod(text.compression_method));
    }

    let mut data = Vec::with_capacity(text.keyword.len() + 5 + text.text.len());
    data.extend_from_slice(text.keyword.as_bytes());
    data.push(0);
    data.push(text.compressed as u8);
    data.push(0); // compression method
    data.extend_from_slice(text.language_tag.as_bytes());
    data.push(0);
    data.extend_from_slice(text.translated_keyword.as_bytes());
    data.push(0);
    if text.compressed {
        let compressed = deflate_zlib(text.text.as_bytes(), deflate_config)?;
        data.extend_from_slice(&compressed);
    } else {
        data.extend_from_slice(text.text.as_bytes());
    }
    write_chunk(output, b"iTXt", &data);
    Ok(())
}
