//! Adler-32 checksum (RFC 1950) for zlib trailers.

const MOD_ADLER: u32 = 65_521;

/// Largest run of bytes whose sums cannot overflow u32 before a modulo.
const NMAX: usize = 5552;

/// Calculate the Adler-32 checksum of `data`.
///
/// Runs the rolling `(s1, s2)` update seeded at `(1, 0)` and defers the
/// modulo to NMAX-sized chunk boundaries.
#[inline]
pub fn adler32(data: &[u8]) -> u32 {
    let mut s1: u32 = 1;
    let mut s2: u32 = 0;

    for chunk in data.chunks(NMAX) {
        for &b in chunk {
            s1 += b as u32;
            s2 += s1;
        }
        s1 %= MOD_ADLER;
        s2 %= MOD_ADLER;
    }

    (s2 << 16) | s1
}
