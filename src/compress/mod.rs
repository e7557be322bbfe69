//! Compression building blocks: checksums, LZ77, Huffman, DEFLATE, zlib.

pub mod adler32;
pub mod crc32;
pub mod deflate;
pub mod heap;
pub mod huffman;
pub mod lz77;

pub use adler32::adler32;
pub use crc32::crc32;
pub use deflate::{deflate, deflate_zlib, BlockType, DeflateConfig};
