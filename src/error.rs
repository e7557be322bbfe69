//! Error types for the pngz library.

use std::fmt;

/// Result type alias for pngz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during encoding.
///
/// Every error is reported synchronously at the point of detection and is
/// fatal to the current encode call; no partial output is ever returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A parameter is out of range or the combination is not allowed
    /// (bit depth vs. colour type, malformed keyword, ...).
    InvalidParameter {
        /// What was wrong with the parameter.
        reason: &'static str,
    },
    /// Raster dimensions are inconsistent with the supplied buffer length.
    InputTooLarge {
        /// Number of bytes the dimensions call for.
        expected: usize,
        /// Number of bytes actually provided.
        actual: usize,
    },
    /// The palette would need more entries than the bit depth can index.
    PaletteOverflow {
        /// Entries required by the input (plus background, if appended).
        entries: usize,
        /// Maximum entries representable, `2^bit_depth`.
        max: usize,
    },
    /// Huffman code assignment over- or under-committed the code space.
    /// Indicates a corrupted frequency table or an implementation bug.
    CorruptTree,
    /// The code-length run-length encoder produced a symbol outside 0..=18.
    BadRunLength(u8),
    /// The LZ77 encoder received a match length outside 3..=258.
    InvalidLengthCode(u16),
    /// The LZ77 encoder received a match distance outside 1..=32768.
    InvalidDistanceCode(u16),
    /// A chunk requested a compression method other than DEFLATE (0).
    UnsupportedCompressionMethod(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter { reason } => {
                write!(f, "Invalid parameter: {}", reason)
            }
            Error::InputTooLarge { expected, actual } => {
                write!(
                    f,
                    "Raster size mismatch: dimensions call for {} bytes, got {}",
                    expected, actual
                )
            }
            Error::PaletteOverflow { entries, max } => {
                write!(
                    f,
                    "Palette overflow: {} entries needed, bit depth allows {}",
                    entries, max
                )
            }
            Error::CorruptTree => {
                write!(f, "Huffman code space over- or under-committed")
            }
            Error::BadRunLength(sym) => {
                write!(f, "Run-length symbol {} outside 0..=18", sym)
            }
            Error::InvalidLengthCode(len) => {
                write!(f, "Match length {} outside 3..=258", len)
            }
            Error::InvalidDistanceCode(dist) => {
                write!(f, "Match distance {} outside 1..=32768", dist)
            }
            Error::UnsupportedCompressionMethod(method) => {
                write!(f, "Compression method {} is not DEFLATE", method)
            }
        }
    }
}

impl std::error::Error for Error {}
