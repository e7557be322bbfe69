//! Fuzz target for PNG encoding.
//!
//! Feeds arbitrary rasters and parameter combinations through the encoder;
//! it must either return a structurally valid file or a clean error.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// Structured input for PNG fuzzing.
#[derive(Arbitrary, Debug)]
struct PngInput {
    width: u8,
    height: u8,
    color_selector: u8,
    depth_selector: u8,
    filter_selector: u8,
    interlaced: bool,
    data: Vec<u8>,
}

fuzz_target!(|input: PngInput| {
    let width = input.width as u32 % 64 + 1;
    let height = input.height as u32 % 64 + 1;
    let needed = (width * height * 4) as usize;
    if input.data.len() < needed {
        return;
    }
    let raster = &input.data[..needed];

    let color_type = match input.color_selector % 5 {
        0 => pngz::ColorType::Gray,
        1 => pngz::ColorType::Rgb,
        2 => pngz::ColorType::Indexed,
        3 => pngz::ColorType::GrayAlpha,
        _ => pngz::ColorType::Rgba,
    };
    let bit_depth = [1u8, 2, 4, 8, 16][input.depth_selector as usize % 5];
    let filter = match input.filter_selector % 6 {
        0 => pngz::png::FilterType::None,
        1 => pngz::png::FilterType::Sub,
        2 => pngz::png::FilterType::Up,
        3 => pngz::png::FilterType::Average,
        4 => pngz::png::FilterType::Paeth,
        _ => pngz::png::FilterType::Adaptive,
    };

    let params = pngz::png::PngParams {
        color_type,
        bit_depth,
        filter,
        interlace: if input.interlaced {
            pngz::png::Interlace::Adam7
        } else {
            pngz::png::Interlace::None
        },
        ..pngz::png::PngParams::default()
    };

    match pngz::png::encode(raster, width, height, &params) {
        Ok(file) => {
            assert_eq!(&file[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
            assert_eq!(&file[file.len() - 8..file.len() - 4], b"IEND");
        }
        Err(_) => {
            // Invalid parameter combinations must fail cleanly.
        }
    }
});
