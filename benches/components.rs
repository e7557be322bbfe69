//! Component-level microbenchmarks for pngz.
//! Covers LZ77, Huffman construction, DEFLATE block types, filtering, and
//! checksums.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pngz::compress::huffman::{build_lengths, codes_from_lengths, MAX_CODE_BITS};
use pngz::compress::lz77::Matcher;
use pngz::compress::{adler32, crc32, deflate, deflate_zlib, BlockType, DeflateConfig};
use pngz::png::{self, FilterType, PngParams};

fn make_pattern(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while out.len() < len {
        out.extend_from_slice(pattern);
    }
    out.truncate(len);
    out
}

fn make_random(len: usize, mut seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        out.push((seed >> 16) as u8);
    }
    out.truncate(len);
    out
}

fn gradient_rgba(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = (((x + y) * 127) / (width + height)) as u8;
            pixels.extend_from_slice(&[r, g, b, 255]);
        }
    }
    pixels
}

fn bench_lz77(c: &mut Criterion) {
    let compressible = make_pattern(1 << 18);
    let random = make_random(1 << 18, 0x1234_5678);

    let mut group = c.benchmark_group("lz77");
    group.throughput(Throughput::Bytes(compressible.len() as u64));
    group.bench_function("tokenize/pattern", |b| {
        b.iter(|| Matcher::new().tokenize(black_box(&compressible)))
    });
    group.bench_function("tokenize/random", |b| {
        b.iter(|| Matcher::new().tokenize(black_box(&random)))
    });
    group.finish();
}

fn bench_huffman(c: &mut Criterion) {
    let mut freqs = [0u32; 286];
    for (i, f) in freqs.iter_mut().enumerate() {
        *f = ((i * 2654435761) % 5000) as u32;
    }

    let mut group = c.benchmark_group("huffman");
    group.bench_function("build_lengths", |b| {
        b.iter(|| build_lengths(black_box(&freqs), Some(MAX_CODE_BITS)))
    });
    let lengths = build_lengths(&freqs, Some(MAX_CODE_BITS));
    group.bench_function("codes_from_lengths", |b| {
        b.iter(|| codes_from_lengths(black_box(&lengths)).unwrap())
    });
    group.finish();
}

fn bench_deflate(c: &mut Criterion) {
    let data = make_pattern(1 << 18);

    let mut group = c.benchmark_group("deflate");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for block_type in [BlockType::Stored, BlockType::Fixed, BlockType::Dynamic] {
        let config = DeflateConfig {
            block_type,
            final_block: true,
        };
        group.bench_with_input(
            BenchmarkId::new("block_type", format!("{:?}", block_type)),
            &config,
            |b, config| b.iter(|| deflate(black_box(&data), config).unwrap()),
        );
    }
    group.bench_function("zlib", |b| {
        b.iter(|| deflate_zlib(black_box(&data), &DeflateConfig::default()).unwrap())
    });
    group.finish();
}

fn bench_checksums(c: &mut Criterion) {
    let data = make_random(1 << 20, 0xCAFE);

    let mut group = c.benchmark_group("checksums");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("adler32", |b| b.iter(|| adler32(black_box(&data))));
    group.bench_function("crc32", |b| b.iter(|| crc32(black_box(&data))));
    group.finish();
}

fn bench_png_encode(c: &mut Criterion) {
    let raster = gradient_rgba(512, 512);

    let mut group = c.benchmark_group("png");
    group.throughput(Throughput::Bytes(raster.len() as u64));
    for filter in [FilterType::None, FilterType::Paeth, FilterType::Adaptive] {
        let params = PngParams {
            filter,
            ..PngParams::default()
        };
        group.bench_with_input(
            BenchmarkId::new("encode_512", format!("{:?}", filter)),
            &params,
            |b, params| b.iter(|| png::encode(black_box(&raster), 512, 512, params).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_lz77,
    bench_huffman,
    bench_deflate,
    bench_checksums,
    bench_png_encode
);
criterion_main!(benches);
