//! DEFLATE compression (RFC 1951) and the zlib container (RFC 1950).
//!
//! Combines the LZ77 tokenizer with Huffman coding. Three block bodies are
//! supported: stored, fixed Huffman, and dynamic Huffman; the choice is a
//! configuration input, never auto-selected.

use crate::bits::BitWriter;
use crate::compress::adler32::adler32;
use crate::compress::huffman::{
    build_lengths, codes_from_lengths, fixed_distance_codes, fixed_literal_codes, HuffmanCode,
    MAX_CODE_BITS, MAX_PRECODE_BITS,
};
use crate::compress::lz77::{Matcher, Token};
use crate::error::{Error, Result};

/// Number of literal/length symbols (0..=285).
const NUM_LITLEN_SYMBOLS: usize = 286;

/// Number of distance symbols (0..=29).
const NUM_DIST_SYMBOLS: usize = 30;

/// Largest payload a single stored block can carry.
const MAX_STORED_BLOCK: usize = 65535;

/// Length code base values (codes 257..=285).
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for each length code.
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Distance code base values (codes 0..=29).
const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for each distance code.
const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code-length code lengths (RFC 1951 §3.2.7).
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// DEFLATE block body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockType {
    /// Uncompressed blocks (BTYPE=00), split at 65535 bytes.
    Stored,
    /// Fixed Huffman tables (BTYPE=01).
    #[default]
    Fixed,
    /// Per-block Huffman tables transmitted in the header (BTYPE=10).
    Dynamic,
}

/// Configuration for a DEFLATE encode call.
#[derive(Debug, Clone, Copy)]
pub struct DeflateConfig {
    /// Which block body to emit.
    pub block_type: BlockType,
    /// Whether the (last) block carries the BFINAL flag.
    pub final_block: bool,
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self {
            block_type: BlockType::Fixed,
            final_block: true,
        }
    }
}

/// Map a match length (3..=258) to `(code, extra_bits, extra_value)`.
fn length_code(length: u16) -> Result<(u16, u8, u16)> {
    if !(3..=258).contains(&length) {
        return Err(Error::InvalidLengthCode(length));
    }

    for (i, &base) in LENGTH_BASE.iter().enumerate() {
        let next_base = if i + 1 < LENGTH_BASE.len() {
            LENGTH_BASE[i + 1]
        } else {
            259
        };
        if length >= base && length < next_base {
            return Ok((257 + i as u16, LENGTH_EXTRA[i], length - base));
        }
    }

    // Length 258 maps onto the final zero-extra code.
    Ok((285, 0, 0))
}

/// Map a match distance (1..=32768) to `(code, extra_bits, extra_value)`.
fn distance_code(distance: u16) -> Result<(u16, u8, u16)> {
    if distance == 0 {
        return Err(Error::InvalidDistanceCode(distance));
    }

    for (i, &base) in DISTANCE_BASE.iter().enumerate() {
        let next_base = if i + 1 < DISTANCE_BASE.len() {
            DISTANCE_BASE[i + 1] as u32
        } else {
            32769
        };
        if distance >= base && (distance as u32) < next_base {
            return Ok((i as u16, DISTANCE_EXTRA[i], distance - base));
        }
    }

    Err(Error::InvalidDistanceCode(distance))
}

/// Compress `data` into a raw DEFLATE bitstream (no container).
pub fn deflate(data: &[u8], config: &DeflateConfig) -> Result<Vec<u8>> {
    match config.block_type {
        BlockType::Stored => encode_stored(data, config.final_block),
        BlockType::Fixed | BlockType::Dynamic => {
            let tokens = Matcher::new().tokenize(data);
            let mut writer = BitWriter::with_capacity(data.len() / 2 + 64);
            writer.write_bit(config.final_block);
            match config.block_type {
                BlockType::Fixed => {
                    writer.write_bits(0b01, 2);
                    encode_fixed(&mut writer, &tokens)?;
                }
                _ => {
                    writer.write_bits(0b10, 2);
                    encode_dynamic(&mut writer, &tokens)?;
                }
            }
            Ok(writer.finish())
        }
    }
}

/// Compress `data` into a zlib stream: CMF, FLG, DEFLATE body, Adler-32.
pub fn deflate_zlib(data: &[u8], config: &DeflateConfig) -> Result<Vec<u8>> {
    let body = deflate(data, config)?;

    // CM=8 (DEFLATE), CINFO=7 (32 KiB window).
    let cmf: u8 = 0x78;
    // FLEVEL advertises the effort that produced the stream.
    let flevel: u8 = match config.block_type {
        BlockType::Stored => 0,
        BlockType::Fixed => 1,
        BlockType::Dynamic => 2,
    };
    let mut flg = flevel << 6;
    let rem = ((cmf as u16) * 256 + flg as u16) % 31;
    if rem != 0 {
        flg += (31 - rem) as u8;
    }

    let mut out = Vec::with_capacity(body.len() + 6);
    out.push(cmf);
    out.push(flg);
    out.extend_from_slice(&body);
    out.extend_from_slice(&adler32(data).to_be_bytes());
    Ok(out)
}

/// Stored blocks: byte-aligned LEN/NLEN(LE) + raw payload, split at 65535.
fn encode_stored(data: &[u8], final_block: bool) -> Result<Vec<u8>> {
    let chunk_count = data.len().div_ceil(MAX_STORED_BLOCK).max(1);
    let mut writer = BitWriter::with_capacity(data.len() + chunk_count * 5 + 1);

    let mut start = 0;
    for i in 0..chunk_count {
        let end = (start + MAX_STORED_BLOCK).min(data.len());
        let chunk = &data[start..end];
        let is_last = i == chunk_count - 1;

        writer.write_bit(final_block && is_last);
        writer.write_bits(0b00, 2);
        writer.align_to_byte();

        let len = chunk.len() as u16;
        writer.write_bytes(&len.to_le_bytes());
        writer.write_bytes(&(!len).to_le_bytes());
        writer.write_bytes(chunk);
        start = end;
    }

    Ok(writer.finish())
}

/// Fixed-table block body.
fn encode_fixed(writer: &mut BitWriter, tokens: &[Token]) -> Result<()> {
    let lit_codes = fixed_literal_codes();
    let dist_codes = fixed_distance_codes();
    write_tokens(writer, tokens, lit_codes, dist_codes)?;
    let eob = lit_codes[256];
    writer.write_bits(eob.code as u32, eob.length);
    Ok(())
}

/// Dynamic-table block body: transmitted trees, then the token stream.
fn encode_dynamic(writer: &mut BitWriter, tokens: &[Token]) -> Result<()> {
    let (lit_freq, dist_freq) = token_frequencies(tokens)?;
    let lit_lengths_full = build_lengths(&lit_freq, Some(MAX_CODE_BITS));
    let dist_lengths_full = build_lengths(&dist_freq, Some(MAX_CODE_BITS));

    // HLIT/HDIST: transmit up to the highest used code, with the RFC minima
    // (257 literal/length codes, 1 distance code) always present.
    let num_lit = 257
        + lit_lengths_full[257..]
            .iter()
            .rposition(|&l| l > 0)
            .map_or(0, |p| p + 1);
    let num_dist = 1
        + dist_lengths_full[1..]
            .iter()
            .rposition(|&l| l > 0)
            .map_or(0, |p| p + 1);

    let lit_lengths = &lit_lengths_full[..num_lit];
    let dist_lengths = &dist_lengths_full[..num_dist];

    // The two length sequences are run-length coded as one stream over the
    // 19-symbol code-length alphabet.
    let mut combined = Vec::with_capacity(num_lit + num_dist);
    combined.extend_from_slice(lit_lengths);
    combined.extend_from_slice(dist_lengths);
    let rle = rle_code_lengths(&combined);

    let mut precode_freq = [0u32; 19];
    for &(sym, _) in &rle {
        if sym > 18 {
            return Err(Error::BadRunLength(sym));
        }
        precode_freq[sym as usize] += 1;
    }

    let precode_lengths = build_lengths(&precode_freq, Some(MAX_PRECODE_BITS));
    let precode_codes = codes_from_lengths(&precode_lengths)?;

    let mut hclen_count = 4;
    for i in (0..CODE_LENGTH_ORDER.len()).rev() {
        if precode_lengths[CODE_LENGTH_ORDER[i]] > 0 {
            hclen_count = (i + 1).max(4);
            break;
        }
    }

    writer.write_bits((num_lit - 257) as u32, 5);
    writer.write_bits((num_dist - 1) as u32, 5);
    writer.write_bits((hclen_count - 4) as u32, 4);
    for &sym in CODE_LENGTH_ORDER.iter().take(hclen_count) {
        writer.write_bits(precode_lengths[sym] as u32, 3);
    }

    for &(sym, extra) in &rle {
        let code = precode_codes[sym as usize];
        writer.write_bits(code.code as u32, code.length);
        match sym {
            16 => writer.write_bits(extra as u32, 2),
            17 => writer.write_bits(extra as u32, 3),
            18 => writer.write_bits(extra as u32, 7),
            _ => {}
        }
    }

    let lit_codes = codes_from_lengths(lit_lengths)?;
    let dist_codes = codes_from_lengths(dist_lengths)?;
    write_tokens(writer, tokens, &lit_codes, &dist_codes)?;
    let eob = lit_codes[256];
    writer.write_bits(eob.code as u32, eob.length);
    Ok(())
}

/// Emit the token stream with the given tables.
///
/// Each match record is fully buffered before emission so the fields go
/// out in the fixed order: length code, length extra, distance code,
/// distance extra.
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Token],
    lit_codes: &[HuffmanCode],
    dist_codes: &[HuffmanCode],
) -> Result<()> {
    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                let code = lit_codes[byte as usize];
                writer.write_bits(code.code as u32, code.length);
            }
            Token::Match { length, distance } => {
                let (len_sym, len_extra_bits, len_extra) = length_code(length)?;
                let (dist_sym, dist_extra_bits, dist_extra) = distance_code(distance)?;

                let code = lit_codes[len_sym as usize];
                writer.write_bits(code.code as u32, code.length);
                if len_extra_bits > 0 {
                    writer.write_bits(len_extra as u32, len_extra_bits);
                }
                let code = dist_codes[dist_sym as usize];
                writer.write_bits(code.code as u32, code.length);
                if dist_extra_bits > 0 {
                    writer.write_bits(dist_extra as u32, dist_extra_bits);
                }
            }
        }
    }
    Ok(())
}

/// Count literal/length and distance code frequencies across the stream,
/// including exactly one end-of-block marker.
fn token_frequencies(
    tokens: &[Token],
) -> Result<([u32; NUM_LITLEN_SYMBOLS], [u32; NUM_DIST_SYMBOLS])> {
    let mut litlen = [0u32; NUM_LITLEN_SYMBOLS];
    let mut dist = [0u32; NUM_DIST_SYMBOLS];

    for token in tokens {
        match *token {
            Token::Literal(byte) => litlen[byte as usize] += 1,
            Token::Match { length, distance } => {
                let (code, _, _) = length_code(length)?;
                litlen[code as usize] += 1;
                let (code, _, _) = distance_code(distance)?;
                dist[code as usize] += 1;
            }
        }
    }

    litlen[256] += 1;
    Ok((litlen, dist))
}

/// Run-length code a length sequence with the 16/17/18 repeat symbols.
///
/// Returns `(symbol, extra_value)` pairs. Zero runs prefer 18 (11..=138)
/// then 17 (3..=10); non-zero repeats prefer chunks of 6 but are resized
/// so a repeat never strands a tail of one or two behind it.
fn rle_code_lengths(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut out = Vec::with_capacity(lengths.len() / 2 + 8);
    let mut i = 0;

    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }
        i += run;

        if value == 0 {
            while run > 0 {
                if run >= 11 {
                    let take = run.min(138);
                    out.push((18, (take - 11) as u8));
                    run -= take;
                } else if run >= 3 {
                    out.push((17, (run - 3) as u8));
                    run = 0;
                } else {
                    out.push((0, 0));
                    run -= 1;
                }
            }
        } else {
            out.push((value, 0));
            run -= 1;
            while run > 0 {
                if run >= 3 {
                    let mut take = run.min(6);
                    if run - take > 0 && run - take < 3 {
                        take = run - 3;
                    }
                    out.push((16, (take - 3) as u8));
                    run -= take;
                } else {
                    out.push((value, 0));
                    run -= 1;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_code_boundaries() {
        assert_eq!(length_code(3).unwrap(), (257, 0, 0));
        assert_eq!(length_code(4).unwrap(), (258, 0, 0));
        assert_eq!(length_code(10).unwrap(), (264, 0, 0));
        assert_eq!(length_code(11).unwrap(), (265, 1, 0));
        assert_eq!(length_code(12).unwrap(), (265, 1, 1));
        assert_eq!(length_code(257).unwrap(), (284, 5, 30));
        assert_eq!(length_code(258).unwrap(), (285, 0, 0));
    }

    #[test]
    fn test_length_code_out_of_range() {
        assert_eq!(length_code(2), Err(Error::InvalidLengthCode(2)));
        assert_eq!(length_code(259), Err(Error::InvalidLengthCode(259)));
    }

    #[test]
    fn test_distance_code_boundaries() {
        assert_eq!(distance_code(1).unwrap(), (0, 0, 0));
        assert_eq!(distance_code(2).unwrap(), (1, 0, 0));
        assert_eq!(distance_code(5).unwrap(), (4, 1, 0));
        assert_eq!(distance_code(6).unwrap(), (4, 1, 1));
        assert_eq!(distance_code(24577).unwrap(), (29, 13, 0));
        assert_eq!(distance_code(32768).unwrap(), (29, 13, 8191));
    }

    #[test]
    fn test_distance_code_zero_rejected() {
        assert_eq!(distance_code(0), Err(Error::InvalidDistanceCode(0)));
    }

    #[test]
    fn test_zlib_empty_stored_exact_bytes() {
        let config = DeflateConfig {
            block_type: BlockType::Stored,
            final_block: true,
        };
        let out = deflate_zlib(&[], &config).unwrap();
        assert_eq!(
            out,
            vec![0x78, 0x01, 0x01, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn test_zlib_single_byte_fixed_exact_bytes() {
        let out = deflate_zlib(b"a", &DeflateConfig::default()).unwrap();
        assert_eq!(out.len(), 9);
        assert_eq!(
            out,
            vec![0x78, 0x5E, 0x4B, 0x04, 0x00, 0x00, 0x62, 0x00, 0x62]
        );
    }

    #[test]
    fn test_zlib_header_checks_out_for_all_block_types() {
        for block_type in [BlockType::Stored, BlockType::Fixed, BlockType::Dynamic] {
            let config = DeflateConfig {
                block_type,
                final_block: true,
            };
            let out = deflate_zlib(b"check header", &config).unwrap();
            assert_eq!(out[0], 0x78);
            assert_eq!((out[0] as u32 * 256 + out[1] as u32) % 31, 0);
            assert_eq!(out[1] & 0x20, 0, "FDICT must be clear");
        }
    }

    #[test]
    fn test_dynamic_block_header_bits() {
        let config = DeflateConfig {
            block_type: BlockType::Dynamic,
            final_block: true,
        };
        let out = deflate(b"hello hello hello", &config).unwrap();
        // BFINAL=1, BTYPE=10 -> low three bits read 1,0,1.
        assert_eq!(out[0] & 0x07, 0x05);
    }

    #[test]
    fn test_fixed_block_header_bits() {
        let out = deflate(b"hello", &DeflateConfig::default()).unwrap();
        // BFINAL=1, BTYPE=01 -> low three bits read 1,1,0.
        assert_eq!(out[0] & 0x07, 0x03);
    }

    #[test]
    fn test_non_final_block_clears_bfinal() {
        let config = DeflateConfig {
            final_block: false,
            ..DeflateConfig::default()
        };
        let out = deflate(b"hello", &config).unwrap();
        assert_eq!(out[0] & 0x01, 0x00);
    }

    #[test]
    fn test_stored_split_at_65535() {
        let data = vec![0xAAu8; 70_000];
        let config = DeflateConfig {
            block_type: BlockType::Stored,
            final_block: true,
        };
        let out = deflate(&data, &config).unwrap();
        // Two blocks: 5-byte header each.
        assert_eq!(out.len(), 70_000 + 10);

        // First block: BFINAL=0, LEN=65535.
        assert_eq!(out[0], 0x00);
        assert_eq!(&out[1..5], &[0xFF, 0xFF, 0x00, 0x00]);

        // Second block: BFINAL=1, LEN=4465.
        let second = 5 + 65_535;
        assert_eq!(out[second], 0x01);
        let len = u16::from_le_bytes([out[second + 1], out[second + 2]]);
        let nlen = u16::from_le_bytes([out[second + 3], out[second + 4]]);
        assert_eq!(len, 4465);
        assert_eq!(nlen, !len);
    }

    #[test]
    fn test_repetitive_dynamic_compresses() {
        let data = vec![b'a'; 2304];
        let config = DeflateConfig {
            block_type: BlockType::Dynamic,
            final_block: true,
        };
        let out = deflate_zlib(&data, &config).unwrap();
        assert!(out.len() < data.len() + 11);
    }

    #[test]
    fn test_rle_zero_runs() {
        assert_eq!(rle_code_lengths(&[0; 20]), vec![(18, 9)]);
        assert_eq!(rle_code_lengths(&[0; 10]), vec![(17, 7)]);
        assert_eq!(rle_code_lengths(&[0; 3]), vec![(17, 0)]);
        assert_eq!(rle_code_lengths(&[0; 2]), vec![(0, 0), (0, 0)]);
        assert_eq!(rle_code_lengths(&[0; 138]), vec![(18, 127)]);
        // 139 zeros: a full 18 plus one literal zero.
        assert_eq!(rle_code_lengths(&[0; 139]), vec![(18, 127), (0, 0)]);
    }

    #[test]
    fn test_rle_nonzero_repeats() {
        // value + repeat-of-3.
        assert_eq!(rle_code_lengths(&[5; 4]), vec![(5, 0), (16, 0)]);
        // value + repeat-of-6.
        assert_eq!(rle_code_lengths(&[5; 7]), vec![(5, 0), (16, 3)]);
        // Tail rule: 8 repeats split 5+3 rather than 6+2.
        assert_eq!(rle_code_lengths(&[5; 9]), vec![(5, 0), (16, 2), (16, 0)]);
        // 10 repeats: 6+3 is fine.
        assert_eq!(rle_code_lengths(&[5; 10]), vec![(5, 0), (16, 3), (16, 0)]);
        // Two values only: no repeat symbol applies.
        assert_eq!(rle_code_lengths(&[5, 5]), vec![(5, 0), (5, 0)]);
    }

    #[test]
    fn test_rle_mixed_sequence() {
        let lengths = [3, 3, 3, 3, 0, 0, 0, 0, 0, 7];
        assert_eq!(
            rle_code_lengths(&lengths),
            vec![(3, 0), (3, 0), (3, 0), (3, 0), (17, 2), (7, 0)]
        );
    }

    #[test]
    fn test_token_frequencies_counts_eob_once() {
        let tokens = [
            Token::Literal(b'x'),
            Token::Literal(b'x'),
            Token::Match {
                length: 3,
                distance: 1,
            },
        ];
        let (litlen, dist) = token_frequencies(&tokens).unwrap();
        assert_eq!(litlen[b'x' as usize], 2);
        assert_eq!(litlen[256], 1);
        assert_eq!(litlen[257], 1);
        assert_eq!(dist[0], 1);
    }
}
