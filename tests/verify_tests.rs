use logoconv::*;
use pretty_assertions::assert_eq;

/// Drops the bottom-right pixel on decode while claiming to be lossless.
struct LeakyCodec;

impl Codec for LeakyCodec {
    fn name(&self) -> &'static str {
        "leaky"
    }

    fn is_lossless(&self) -> bool {
        true
    }

    fn encode(&self, grid: &Grid) -> Result<Encoded> {
        RleCodec::default().encode(grid)
    }

    fn decode(&self, encoded: &Encoded) -> Result<Grid> {
        let mut data = RleCodec::default().decode(encoded)?.into_vec();
        if let Some(last) = data.last_mut() {
            *last = last.wrapping_add(1);
        }
        Grid::new(encoded.width, encoded.height, data)
    }
}

fn logo() -> Grid {
    let mut data = vec![0u8; 16 * 8];
    for y in 2..6 {
        for x in 2..14 {
            data[y * 16 + x] = if (x + y) % 3 == 0 { 5 } else { 11 };
        }
    }
    Grid::new(16, 8, data).unwrap()
}

#[test]
fn test_both_codecs_round_trip() {
    let codecs: Vec<Box<dyn Codec>> = vec![
        Box::new(RleCodec::default()),
        Box::new(RleCodec::new(RleOptions { run_limit: 3 })),
        Box::new(TileCodec::new(TileOptions::default())),
        Box::new(TileCodec::new(TileOptions {
            block_size: 8,
            diff_threshold: 0,
        })),
    ];
    let grid = logo();
    for codec in &codecs {
        let (encoded, fidelity) = encode_verified(codec.as_ref(), &grid).unwrap();
        assert!(fidelity.is_exact(), "{}", codec.name());
        assert_eq!(codec.decode(&encoded).unwrap(), grid);
    }
}

#[test]
fn test_lossy_codec_is_advisory() {
    // the top-left block is within the threshold of its vertical mirror below
    let mut data = logo().into_vec();
    data[2 * 16 + 2] = 10;
    let grid = Grid::new(16, 8, data).unwrap();

    let codec = TileCodec::new(TileOptions {
        block_size: 4,
        diff_threshold: 100,
    });
    let (_, fidelity) = encode_verified(&codec, &grid).unwrap();
    assert!(!fidelity.is_exact());
    assert!(fidelity.squared_error > 0);
}

#[test]
fn test_integrity_failure_is_fatal() {
    let result = encode_verified(&LeakyCodec, &logo());
    assert_eq!(
        result.map(|(_, f)| f),
        Err(LogoError::CompressionIntegrityError {
            x: 15,
            y: 7,
            expected: 0,
            actual: 1
        })
    );
}

#[test]
fn test_encode_errors_propagate() {
    let wide = Grid::filled(40, 1, 0).unwrap();
    let codec = RleCodec::new(RleOptions { run_limit: 0 });
    assert!(matches!(
        encode_verified(&codec, &wide),
        Err(LogoError::RunOverflow { .. })
    ));
}
