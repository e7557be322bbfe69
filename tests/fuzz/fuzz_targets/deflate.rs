//! Fuzz target for DEFLATE/zlib compression.
//!
//! Checks that compression never panics and that the container invariants
//! hold for arbitrary input.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// Structured input for DEFLATE fuzzing.
#[derive(Arbitrary, Debug)]
struct DeflateInput {
    /// Selects the block type.
    block_selector: u8,
    /// Raw data to compress.
    data: Vec<u8>,
}

fuzz_target!(|input: DeflateInput| {
    if input.data.len() > 1024 * 1024 {
        return;
    }

    let block_type = match input.block_selector % 3 {
        0 => pngz::BlockType::Stored,
        1 => pngz::BlockType::Fixed,
        _ => pngz::BlockType::Dynamic,
    };
    let config = pngz::DeflateConfig {
        block_type,
        final_block: true,
    };

    let compressed = pngz::compress::deflate_zlib(&input.data, &config).unwrap();

    assert!(compressed.len() >= 6, "compressed data too short");
    let cmf = compressed[0];
    let flg = compressed[1];
    assert_eq!(cmf & 0x0F, 8);
    assert_eq!((cmf as u32 * 256 + flg as u32) % 31, 0);
});
