//! PNG encoder: validation, scanline serialization, and chunk framing.
//!
//! The pipeline is a pure function of its inputs: project the RGBA raster
//! into the target colour type, split it into interlace passes, filter each
//! pass's scanlines, compress the concatenated stream with this crate's
//! zlib encoder, and emit CRC-protected chunks in specification order.

pub mod ancillary;
pub mod chunk;
pub mod filter;
pub mod interlace;
mod palette;
mod samples;

pub use ancillary::{
    Background, Chromaticities, CompressedText, IccProfile, InternationalText,
    PhysicalDimensions, RenderingIntent, SignificantBits, TextChunk, TimeStamp,
};
pub use filter::FilterType;
pub use interlace::Interlace;

use crate::color::ColorType;
use crate::compress::deflate::{deflate_zlib, DeflateConfig};
use crate::error::{Error, Result};
use crate::png::interlace::{Pass, ADAM7_PASSES, FULL_IMAGE_PASS};
use crate::png::palette::Palette;
use crate::png::samples::SampleImage;

/// PNG file signature.
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Maximum supported image dimension.
const MAX_DIMENSION: u32 = 1 << 24;

/// Compressed payload carried per IDAT chunk.
const IDAT_CHUNK_SIZE: usize = 256 * 1024;

/// PNG encoding parameters.
///
/// The raster handed to [`encode`] is always canvas-order RGBA at 8 bits
/// per channel; these parameters choose how it is represented on the wire.
#[derive(Debug, Clone)]
pub struct PngParams {
    /// Sample depth: 1/2/4/8/16 as allowed by the colour type.
    pub bit_depth: u8,
    /// Output colour type.
    pub color_type: ColorType,
    /// Scanline filter applied to every line.
    pub filter: FilterType,
    /// Interlace method.
    pub interlace: Interlace,
    /// Whether indexed images write a tRNS chunk (alpha-keyed palette).
    pub indexed_transparency: bool,
    /// gAMA: image gamma times 100 000.
    pub gamma: Option<u32>,
    /// cHRM: white point and primaries.
    pub chromaticities: Option<Chromaticities>,
    /// sBIT: significant bits per channel.
    pub significant_bits: Option<SignificantBits>,
    /// sRGB: rendering intent.
    pub srgb: Option<RenderingIntent>,
    /// iCCP: embedded ICC profile.
    pub icc_profile: Option<IccProfile>,
    /// bKGD: default background colour.
    pub background: Option<Background>,
    /// hIST: write palette usage counts (indexed only).
    pub histogram: bool,
    /// pHYs: physical pixel dimensions.
    pub physical: Option<PhysicalDimensions>,
    /// sPLT: emit the scanned palette as a suggested palette under this
    /// name (indexed only).
    pub suggested_palette: Option<String>,
    /// tIME: last-modification time.
    pub time: Option<TimeStamp>,
    /// tEXt chunks.
    pub text: Vec<TextChunk>,
    /// zTXt chunks.
    pub compressed_text: Vec<CompressedText>,
    /// iTXt chunks.
    pub international_text: Vec<InternationalText>,
    /// Settings forwarded to the zlib encoder for IDAT (and compressed
    /// ancillary payloads).
    pub deflate: DeflateConfig,
}

impl Default for PngParams {
    fn default() -> Self {
        Self {
            bit_depth: 8,
            color_type: ColorType::Rgba,
            filter: FilterType::None,
            interlace: Interlace::None,
            indexed_transparency: true,
            gamma: None,
            chromaticities: None,
            significant_bits: None,
            srgb: None,
            icc_profile: None,
            background: None,
            histogram: false,
            physical: None,
            suggested_palette: None,
            time: None,
            text: Vec::new(),
            compressed_text: Vec::new(),
            international_text: Vec::new(),
            deflate: DeflateConfig::default(),
        }
    }
}

/// Encode an RGBA raster as a complete PNG file.
///
/// `raster` holds `width * height` pixels in `[R, G, B, A, ...]` order,
/// 8 bits per channel.
pub fn encode(raster: &[u8], width: u32, height: u32, params: &PngParams) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    encode_into(&mut output, raster, width, height, params)?;
    Ok(output)
}

/// Encode into a caller-provided buffer, reusing its allocation.
///
/// The buffer is cleared first; its contents are unspecified if an error
/// is returned.
pub fn encode_into(
    output: &mut Vec<u8>,
    raster: &[u8],
    width: u32,
    height: u32,
    params: &PngParams,
) -> Result<()> {
    validate(raster, width, height, params)?;

    // Everything fallible or expensive happens before chunk emission.
    let (image, palette) = match params.color_type {
        ColorType::Indexed => {
            let background = match params.background {
                Some(Background::Palette(rgb)) => Some(rgb),
                _ => None,
            };
            let mut palette = Palette::build(
                raster,
                params.bit_depth,
                params.indexed_transparency,
                background,
            )?;
            let indices = std::mem::take(&mut palette.indices);
            (
                samples::from_indices(indices, params.bit_depth),
                Some(palette),
            )
        }
        other => (samples::project(raster, other, params.bit_depth), None),
    };

    let filtered = filtered_scanlines(&image, width, height, params);
    let idat = deflate_zlib(&filtered, &params.deflate)?;

    output.clear();
    output.reserve((idat.len() + 256).max(64));

    output.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(output, width, height, params);

    if let Some(chromaticities) = &params.chromaticities {
        ancillary::write_chrm(output, chromaticities);
    }
    if let Some(gamma) = params.gamma {
        ancillary::write_gama(output, gamma);
    }
    if let Some(profile) = &params.icc_profile {
        ancillary::write_iccp(output, profile, &params.deflate)?;
    }
    if let Some(bits) = &params.significant_bits {
        ancillary::write_sbit(output, bits);
    }
    if let Some(intent) = params.srgb {
        ancillary::write_srgb(output, intent);
    }

    match &palette {
        Some(palette) => {
            chunk::write_chunk(output, b"PLTE", &palette.plte_data());
            if let Some(index) = palette.background_index {
                ancillary::write_bkgd_indexed(output, index);
            }
            if params.histogram {
                ancillary::write_hist(output, &palette.histogram);
            }
            if params.indexed_transparency {
                let trns = palette.trns_data();
                if !trns.is_empty() {
                    chunk::write_chunk(output, b"tRNS", &trns);
                }
            }
        }
        None => {
            if let Some(background) = &params.background {
                ancillary::write_bkgd(output, background);
            }
        }
    }

    if let Some(physical) = &params.physical {
        ancillary::write_phys(output, physical);
    }
    if let Some(name) = &params.suggested_palette {
        if let Some(palette) = &palette {
            ancillary::write_splt(output, name, &palette.entries, &palette.histogram)?;
        }
    }
    if let Some(time) = &params.time {
        ancillary::write_time(output, time)?;
    }
    for text in &params.text {
        ancillary::write_text(output, text)?;
    }
    for text in &params.compressed_text {
        ancillary::write_ztxt(output, text, &params.deflate)?;
    }
    for text in &params.international_text {
        ancillary::write_itxt(output, text, &params.deflate)?;
    }

    for chunk_data in idat.chunks(IDAT_CHUNK_SIZE) {
        chunk::write_chunk(output, b"IDAT", chunk_data);
    }
    chunk::write_chunk(output, b"IEND", &[]);

    Ok(())
}

/// Up-front parameter validation, so chunk emission cannot fail midway.
fn validate(raster: &[u8], width: u32, height: u32, params: &PngParams) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidParameter {
            reason: "width and height must be non-zero",
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::InvalidParameter {
            reason: "dimension exceeds the supported maximum",
        });
    }

    params.color_type.check_bit_depth(params.bit_depth)?;

    let expected = width as usize * height as usize * 4;
    if raster.len() != expected {
        return Err(Error::InputTooLarge {
            expected,
            actual: raster.len(),
        });
    }

    if let Some(background) = &params.background {
        let matches = matches!(
            (background, params.color_type),
            (Background::Gray(_), ColorType::Gray | ColorType::GrayAlpha)
                | (Background::Rgb(..), ColorType::Rgb | ColorType::Rgba)
                | (Background::Palette(_), ColorType::Indexed)
        );
        if !matches {
            return Err(Error::InvalidParameter {
                reason: "background form does not match the colour type",
            });
        }
    }

    if let Some(bits) = &params.significant_bits {
        validate_significant_bits(bits, params.color_type, params.bit_depth)?;
    }

    if params.color_type != ColorType::Indexed {
        if params.histogram {
            return Err(Error::InvalidParameter {
                reason: "histogram requires an indexed image",
            });
        }
        if params.suggested_palette.is_some() {
            return Err(Error::InvalidParameter {
                reason: "suggested palette requires an indexed image",
            });
        }
    }
    if let Some(name) = &params.suggested_palette {
        ancillary::validate_keyword(name)?;
    }

    if let Some(profile) = &params.icc_profile {
        ancillary::validate_keyword(&profile.name)?;
        if profile.compression_method != 0 {
            return Err(Error::UnsupportedCompressionMethod(
                profile.compression_method,
            ));
        }
    }
    for text in &params.text {
        ancillary::validate_keyword(&text.keyword)?;
    }
    for text in &params.compressed_text {
        ancillary::validate_keyword(&text.keyword)?;
        if text.compression_method != 0 {
            return Err(Error::UnsupportedCompressionMethod(text.compression_method));
        }
    }
    for text in &params.international_text {
        ancillary::validate_keyword(&text.keyword)?;
        if text.compression_method != 0 {
            return Err(Error::UnsupportedCompressionMethod(text.compression_method));
        }
    }

    Ok(())
}

/// sBIT values must fit the sample depth (the source depth, 8, for
/// indexed images) and the variant must match the colour type.
fn validate_significant_bits(
    bits: &SignificantBits,
    color_type: ColorType,
    bit_depth: u8,
) -> Result<()> {
    let sample_depth = if color_type == ColorType::Indexed {
        8
    } else {
        bit_depth
    };

    let (matches, values): (bool, Vec<u8>) = match *bits {
        SignificantBits::Gray(g) => (color_type == ColorType::Gray, vec![g]),
        SignificantBits::GrayAlpha(g, a) => (color_type == ColorType::GrayAlpha, vec![g, a]),
        SignificantBits::Rgb(r, g, b) => (
            matches!(color_type, ColorType::Rgb | ColorType::Indexed),
            vec![r, g, b],
        ),
        SignificantBits::Rgba(r, g, b, a) => (color_type == ColorType::Rgba, vec![r, g, b, a]),
    };

    if !matches {
        return Err(Error::InvalidParameter {
            reason: "significant-bits form does not match the colour type",
        });
    }
    if values.iter().any(|&v| v == 0 || v > sample_depth) {
        return Err(Error::InvalidParameter {
            reason: "significant-bits value outside 1..=sample depth",
        });
    }
    Ok(())
}

/// Serialize the image into filtered scanlines, one interlace pass at a
/// time. Each pass is packed and filtered independently with a zero prior.
fn filtered_scanlines(
    image: &SampleImage,
    width: u32,
    height: u32,
    params: &PngParams,
) -> Vec<u8> {
    let passes: &[Pass] = match params.interlace {
        Interlace::None => std::slice::from_ref(&FULL_IMAGE_PASS),
        Interlace::Adam7 => &ADAM7_PASSES,
    };

    let full_row = image.row_bytes(width);
    let mut out = Vec::with_capacity((full_row + 1) * height as usize + 64);

    for pass in passes {
        let (pass_w, pass_h) = pass.dimensions(width, height);
        if pass_w == 0 || pass_h == 0 {
            continue;
        }

        let sub = pass.extract(&image.pixels, width, height, image.pixel_bytes);
        let row_bytes = image.row_bytes(pass_w);

        if params.bit_depth >= 8 {
            filter::filter_rows(&sub, row_bytes, image.filter_bpp(), params.filter, &mut out);
        } else {
            let mut packed = Vec::with_capacity(row_bytes * pass_h as usize);
            for row in sub.chunks_exact(pass_w as usize) {
                image.pack_row(row, params.bit_depth, &mut packed);
            }
            filter::filter_rows(&packed, row_bytes, image.filter_bpp(), params.filter, &mut out);
        }
    }

    out
}

/// IHDR: 13 big-endian bytes describing the image.
fn write_ihdr(output: &mut Vec<u8>, width: u32, height: u32, params: &PngParams) {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.push(params.bit_depth);
    data.push(params.color_type.code());
    data.push(0); // compression method: DEFLATE
    data.push(0); // filter method: adaptive five-filter set
    data.push(match params.interlace {
        Interlace::None => 0,
        Interlace::Adam7 => 1,
    });
    chunk::write_chunk(output, b"IHDR", &data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_1x1_rgba_layout() {
        let pixels = [255, 0, 0, 255];
        let png = encode(&pixels, 1, 1, &PngParams::default()).unwrap();

        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        // IHDR length 13, type, 13 payload bytes.
        assert_eq!(&png[8..12], &[0, 0, 0, 13]);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &[0, 0, 0, 1]); // width
        assert_eq!(&png[20..24], &[0, 0, 0, 1]); // height
        assert_eq!(png[24], 8); // bit depth
        assert_eq!(png[25], 6); // colour type
        assert_eq!(&png[26..29], &[0, 0, 0]); // compression/filter/interlace
    }

    #[test]
    fn test_ihdr_crc_matches_reference() {
        let pixels = [255, 0, 0, 255];
        let png = encode(&pixels, 1, 1, &PngParams::default()).unwrap();

        let mut covered = Vec::new();
        covered.extend_from_slice(b"IHDR");
        covered.extend_from_slice(&png[16..29]);
        let expected = crate::compress::crc32(&covered);
        assert_eq!(&png[29..33], &expected.to_be_bytes());
    }

    #[test]
    fn test_iend_is_last_chunk() {
        let pixels = vec![128u8; 4 * 4 * 4];
        let png = encode(&pixels, 4, 4, &PngParams::default()).unwrap();

        let iend_start = png.len() - 12;
        assert_eq!(&png[iend_start..iend_start + 4], &[0, 0, 0, 0]);
        assert_eq!(&png[iend_start + 4..iend_start + 8], b"IEND");
        assert_eq!(
            &png[iend_start + 8..],
            &[0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = encode(&[], 0, 1, &PngParams::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_raster_length_mismatch_rejected() {
        let err = encode(&[0, 0, 0], 1, 1, &PngParams::default()).unwrap_err();
        assert_eq!(
            err,
            Error::InputTooLarge {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_invalid_depth_for_colour_type_rejected() {
        let params = PngParams {
            color_type: ColorType::Rgb,
            bit_depth: 4,
            ..PngParams::default()
        };
        let err = encode(&[0, 0, 0, 255], 1, 1, &params).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_background_form_mismatch_rejected() {
        let params = PngParams {
            color_type: ColorType::Rgb,
            background: Some(Background::Gray(0)),
            ..PngParams::default()
        };
        let err = encode(&[0, 0, 0, 255], 1, 1, &params).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_histogram_requires_indexed() {
        let params = PngParams {
            histogram: true,
            ..PngParams::default()
        };
        let err = encode(&[0, 0, 0, 255], 1, 1, &params).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_interlaced_ihdr_flag() {
        let pixels = vec![7u8; 4 * 3 * 4];
        let params = PngParams {
            interlace: Interlace::Adam7,
            ..PngParams::default()
        };
        let png = encode(&pixels, 4, 3, &params).unwrap();
        assert_eq!(png[28], 1);
    }

    #[test]
    fn test_indexed_plte_before_trns_before_idat() {
        // Two colours, one translucent.
        let pixels = [
            0, 0, 0, 0, //
            255, 255, 255, 255, //
            0, 0, 0, 0, //
            255, 255, 255, 255, //
        ];
        let params = PngParams {
            color_type: ColorType::Indexed,
            ..PngParams::default()
        };
        let png = encode(&pixels, 4, 1, &params).unwrap();

        let plte = find_chunk(&png, b"PLTE").expect("PLTE present");
        let trns = find_chunk(&png, b"tRNS").expect("tRNS present");
        let idat = find_chunk(&png, b"IDAT").expect("IDAT present");
        assert!(plte.0 < trns.0);
        assert!(trns.0 < idat.0);
        // Two entries, one transparent alpha (opaque elided).
        assert_eq!(plte.1.len(), 6);
        assert_eq!(trns.1, vec![0]);
    }

    #[test]
    fn test_encode_into_reuses_buffer() {
        let mut output = Vec::with_capacity(64);
        let black = [0u8, 0, 0, 255];
        encode_into(&mut output, &black, 1, 1, &PngParams::default()).unwrap();
        let first = output.clone();
        assert!(!first.is_empty());

        let red = [255u8, 0, 0, 255];
        encode_into(&mut output, &red, 1, 1, &PngParams::default()).unwrap();
        assert_ne!(first, output);
        assert_eq!(&output[0..8], &PNG_SIGNATURE);
    }

    /// Locate a chunk, returning (offset, payload).
    fn find_chunk(png: &[u8], chunk_type: &[u8; 4]) -> Option<(usize, Vec<u8>)> {
        let mut offset = 8;
        while offset + 8 <= png.len() {
            let len = u32::from_be_bytes([
                png[offset],
                png[offset + 1],
                png[offset + 2],
                png[offset + 3],
            ]) as usize;
            let ty = &png[offset + 4..offset + 8];
            if ty == chunk_type {
                return Some((offset, png[offset + 8..offset + 8 + len].to_vec()));
            }
            offset += 12 + len;
        }
        None
    }
}
