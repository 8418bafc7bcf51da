#![no_main]

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use logoconv::TileMap;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    block_size: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    // Should never panic, regardless of input
    if let Ok(map) = TileMap::from_bytes(
        &input.data,
        input.width as usize,
        input.height as usize,
        input.block_size as usize,
    ) {
        let _ = map.reconstruct();
    }
});
