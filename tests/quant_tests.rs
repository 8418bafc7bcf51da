use logoconv::quant::{dequantize_value, quantize_value};
use logoconv::*;
use pretty_assertions::assert_eq;

#[test]
fn test_round_trip_within_one_step() {
    for levels in 2..=256u32 {
        let step = 255u32.div_ceil(levels - 1);
        for x in 0..=255u8 {
            let q = quantize_value(x, levels);
            assert!((q as u32) < levels, "x={x} levels={levels} -> {q}");
            let back = dequantize_value(q, levels);
            assert!(
                (back as u32).abs_diff(x as u32) <= step,
                "x={x} levels={levels}: {q} -> {back}"
            );
        }
    }
}

#[test]
fn test_quantize_is_monotonic() {
    for levels in [2u32, 3, 10, 12, 17, 255] {
        let mut last = 0;
        for x in 0..=255u8 {
            let q = quantize_value(x, levels);
            assert!(q >= last);
            last = q;
        }
    }
}

#[test]
fn test_grid_quantization() {
    let raw = Grid::from_rows(&[[0u8, 23, 24, 255], [128, 200, 12, 11]]).unwrap();
    let q = quantize(&raw, 12).unwrap();
    assert_eq!(q.as_slice(), &[0, 1, 1, 11, 6, 9, 1, 0]);
    assert_eq!(q.max_value(), 11);

    let back = dequantize(&q, 12).unwrap();
    assert_eq!(back.as_slice(), &[0, 23, 23, 255, 139, 209, 23, 0]);
}

#[test]
fn test_two_levels_threshold_at_midpoint() {
    let raw = Grid::from_rows(&[[0u8, 127, 128, 255]]).unwrap();
    assert_eq!(quantize(&raw, 2).unwrap().as_slice(), &[0, 0, 1, 1]);
}

#[test]
fn test_invalid_levels() {
    let raw = Grid::filled(1, 1, 0).unwrap();
    assert!(matches!(quantize(&raw, 1), Err(LogoError::InvalidParameter(_))));
    assert!(matches!(quantize(&raw, 0), Err(LogoError::InvalidParameter(_))));
}
