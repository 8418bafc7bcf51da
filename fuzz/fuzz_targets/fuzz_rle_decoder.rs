#![no_main]

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    max_level: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    // Should never panic, regardless of input
    let _ = logoconv::rle::decode(
        &input.data,
        input.width as usize,
        input.height as usize,
        input.max_level,
    );
});
