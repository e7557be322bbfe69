//! PNG scanline filtering (PNG specification §9).
//!
//! Each scanline is emitted as one filter-type byte followed by the
//! filtered bytes. Bytes to the left of the line start and above the first
//! line are treated as zero; interlace passes therefore filter with a
//! fresh zero prior.

/// Filter applied to every scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    /// Identity.
    #[default]
    None,
    /// Difference from the byte one pixel to the left.
    Sub,
    /// Difference from the byte directly above.
    Up,
    /// Difference from the floor-average of left and above.
    Average,
    /// Difference from the Paeth predictor.
    Paeth,
    /// Pick the best of the five per row by minimum absolute sum.
    Adaptive,
}

/// Filter type bytes as defined by the PNG specification.
const FILTER_NONE: u8 = 0;
const FILTER_SUB: u8 = 1;
const FILTER_UP: u8 = 2;
const FILTER_AVERAGE: u8 = 3;
const FILTER_PAETH: u8 = 4;

/// Filter `height` rows of `row_bytes` bytes each, appending one
/// filter-byte-prefixed scanline per row to `output`.
pub(crate) fn filter_rows(
    rows: &[u8],
    row_bytes: usize,
    bpp: usize,
    filter: FilterType,
    output: &mut Vec<u8>,
) {
    if row_bytes == 0 {
        return;
    }
    let height = rows.len() / row_bytes;
    let zero_row = vec![0u8; row_bytes];
    let mut scratch = AdaptiveScratch::new(row_bytes);

    for y in 0..height {
        let row = &rows[y * row_bytes..(y + 1) * row_bytes];
        let prev = if y == 0 {
            &zero_row[..]
        } else {
            &rows[(y - 1) * row_bytes..y * row_bytes]
        };

        match filter {
            FilterType::None => {
                output.push(FILTER_NONE);
                output.extend_from_slice(row);
            }
            FilterType::Sub => {
                output.push(FILTER_SUB);
                filter_sub(row, bpp, output);
            }
            FilterType::Up => {
                output.push(FILTER_UP);
                filter_up(row, prev, output);
            }
            FilterType::Average => {
                output.push(FILTER_AVERAGE);
                filter_average(row, prev, bpp, output);
            }
            FilterType::Paeth => {
                output.push(FILTER_PAETH);
                filter_paeth(row, prev, bpp, output);
            }
            FilterType::Adaptive => {
                adaptive_filter(row, prev, bpp, output, &mut scratch);
            }
        }
    }
}

/// Sub filter: difference from the corresponding byte of the left pixel.
fn filter_sub(row: &[u8], bpp: usize, output: &mut Vec<u8>) {
    for (i, &byte) in row.iter().enumerate() {
        let left = if i >= bpp { row[i - bpp] } else { 0 };
        output.push(byte.wrapping_sub(left));
    }
}

/// Up filter: difference from the byte above.
fn filter_up(row: &[u8], prev_row: &[u8], output: &mut Vec<u8>) {
    for (i, &byte) in row.iter().enumerate() {
        output.push(byte.wrapping_sub(prev_row[i]));
    }
}

/// Average filter: difference from `floor((left + above) / 2)`.
fn filter_average(row: &[u8], prev_row: &[u8], bpp: usize, output: &mut Vec<u8>) {
    for (i, &byte) in row.iter().enumerate() {
        let left = if i >= bpp { row[i - bpp] as u16 } else { 0 };
        let above = prev_row[i] as u16;
        let avg = ((left + above) / 2) as u8;
        output.push(byte.wrapping_sub(avg));
    }
}

/// Paeth filter: difference from the Paeth predictor.
fn filter_paeth(row: &[u8], prev_row: &[u8], bpp: usize, output: &mut Vec<u8>) {
    for (i, &byte) in row.iter().enumerate() {
        let left = if i >= bpp { row[i - bpp] } else { 0 };
        let above = prev_row[i];
        let upper_left = if i >= bpp { prev_row[i - bpp] } else { 0 };
        output.push(byte.wrapping_sub(paeth_predictor(left, above, upper_left)));
    }
}

/// Paeth predictor: whichever of left/above/upper-left is closest to
/// `p = a + b - c`, preferring left, then above.
#[inline]
fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let a_i = a as i16;
    let b_i = b as i16;
    let c_i = c as i16;

    let p = a_i + b_i - c_i;
    let pa = (p - a_i).abs();
    let pb = (p - b_i).abs();
    let pc = (p - c_i).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Scratch buffers reused across rows by the adaptive picker.
struct AdaptiveScratch {
    sub: Vec<u8>,
    up: Vec<u8>,
    avg: Vec<u8>,
    paeth: Vec<u8>,
}

impl AdaptiveScratch {
    fn new(row_len: usize) -> Self {
        Self {
            sub: Vec::with_capacity(row_len),
            up: Vec::with_capacity(row_len),
            avg: Vec::with_capacity(row_len),
            paeth: Vec::with_capacity(row_len),
        }
    }

    fn clear(&mut self) {
        self.sub.clear();
        self.up.clear();
        self.avg.clear();
        self.paeth.clear();
    }
}

/// Try all five filters and keep whichever minimizes the absolute sum.
fn adaptive_filter(
    row: &[u8],
    prev_row: &[u8],
    bpp: usize,
    output: &mut Vec<u8>,
    scratch: &mut AdaptiveScratch,
) {
    scratch.clear();

    let mut best_filter = FILTER_NONE;
    let mut best_score = score_filter(row);

    filter_sub(row, bpp, &mut scratch.sub);
    let score = score_filter(&scratch.sub);
    if score < best_score {
        best_score = score;
        best_filter = FILTER_SUB;
    }

    filter_up(row, prev_row, &mut scratch.up);
    let score = score_filter(&scratch.up);
    if score < best_score {
        best_score = score;
        best_filter = FILTER_UP;
    }

    filter_average(row, prev_row, bpp, &mut scratch.avg);
    let score = score_filter(&scratch.avg);
    if score < best_score {
        best_score = score;
        best_filter = FILTER_AVERAGE;
    }

    filter_paeth(row, prev_row, bpp, &mut scratch.paeth);
    let score = score_filter(&scratch.paeth);
    if score < best_score {
        best_filter = FILTER_PAETH;
    }

    output.push(best_filter);
    match best_filter {
        FILTER_NONE => output.extend_from_slice(row),
        FILTER_SUB => output.extend_from_slice(&scratch.sub),
        FILTER_UP => output.extend_from_slice(&scratch.up),
        FILTER_AVERAGE => output.extend_from_slice(&scratch.avg),
        _ => output.extend_from_slice(&scratch.paeth),
    }
}

/// Score a filtered row by the sum of absolute signed values; lower
/// typically compresses better.
#[inline]
fn score_filter(filtered: &[u8]) -> u64 {
    filtered
        .iter()
        .map(|&b| (b as i8).unsigned_abs() as u64)
        .sum()
}
