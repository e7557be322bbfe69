//! PNG chunk emission.

use crate::compress::crc32::Crc32;

/// Write one chunk (length, type, data, CRC-32) to the output buffer.
///
/// The CRC covers the type bytes and the data, not the length.
pub fn write_chunk(output: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    output.reserve(12 + data.len());

    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    let crc = crc.finalize();

    output.extend_from_slice(&(data.len() as u32).to_be_bytes());
    output.extend_from_slice(chunk_type);
    output.extend_from_slice(data);
    output.extend_from_slice(&crc.to_be_bytes());
}
