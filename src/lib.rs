//! # pngz
//!
//! A minimal-dependency PNG encoder and zlib/DEFLATE compressor.
//!
//! The compression path is hand-implemented: LZ77 match search, canonical
//! Huffman code construction, and LSB-first bit emission per RFC 1951,
//! wrapped in an RFC 1950 zlib container. The PNG path serializes rasters
//! into signed, CRC-protected chunk streams, reusing the same compressor
//! for IDAT and for compressed ancillary chunks.
//!
//! ## Example
//!
//! ```rust
//! use pngz::{png, compress, ColorType};
//!
//! // Compress bytes into a zlib stream.
//! let zlib = compress::deflate_zlib(b"hello", &compress::DeflateConfig::default()).unwrap();
//! assert_eq!(zlib[0], 0x78);
//!
//! // Encode a 1x1 red pixel as a PNG.
//! let raster = [255u8, 0, 0, 255];
//! let file = png::encode(&raster, 1, 1, &png::PngParams::default()).unwrap();
//! assert_eq!(&file[1..4], b"PNG");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod color;
pub mod compress;
pub mod error;
pub mod png;

pub use color::ColorType;
pub use compress::{BlockType, DeflateConfig};
pub use error::{Error, Result};
