#![no_main]

use libfuzzer_sys::fuzz_target;
use logoconv::{Codec, Grid, RleCodec, RleOptions, TileCodec, TileOptions};
use arbitrary::Arbitrary;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    run_limit: u8,
    block_size: u8,
    pixels: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let width = (input.width as usize).clamp(1, 64);
    let height = (input.height as usize).clamp(1, 64);

    let expected_size = width * height;
    if input.pixels.len() < expected_size {
        return;
    }

    // Keep every level representable by the RLE symbols
    let pixels = input.pixels[..expected_size].iter().map(|p| p % 12).collect();
    let grid = Grid::new(width, height, pixels).unwrap();

    let rle = RleCodec::new(RleOptions {
        run_limit: (input.run_limit % 27) as usize,
    });
    if let Ok(encoded) = rle.encode(&grid) {
        assert_eq!(rle.decode(&encoded).unwrap(), grid);
    }

    let tiles = TileCodec::new(TileOptions {
        block_size: (input.block_size as usize % 8) + 1,
        diff_threshold: 0,
    });
    if let Ok(encoded) = tiles.encode(&grid) {
        assert_eq!(tiles.decode(&encoded).unwrap(), grid);
    }
});
