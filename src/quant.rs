//! Intensity quantization.
//!
//! Maps 8-bit intensities onto `levels` evenly spaced levels with rounding
//! integer division, and back. The mapping is fixed, so the same input always
//! produces the same palette.

use crate::{Grid, LogoError, Result};

/// Smallest supported number of levels.
pub const MIN_LEVELS: usize = 2;
/// Largest supported number of levels.
pub const MAX_LEVELS: usize = 256;

fn check_levels(levels: usize) -> Result<u32> {
    if !(MIN_LEVELS..=MAX_LEVELS).contains(&levels) {
        return Err(LogoError::InvalidParameter(format!(
            "levels must be in {MIN_LEVELS}..={MAX_LEVELS}, got {levels}"
        )));
    }
    Ok(levels as u32)
}

/// Quantizes a single intensity: `(x * (levels - 1) + 127) / 255`.
#[inline]
pub fn quantize_value(x: u8, levels: u32) -> u8 {
    ((x as u32 * (levels - 1) + 127) / 255) as u8
}

/// Maps a level back to an intensity: `(v * 255 + (levels - 1) / 2) / (levels - 1)`.
#[inline]
pub fn dequantize_value(v: u8, levels: u32) -> u8 {
    let steps = levels - 1;
    ((v as u32 * 255 + (steps >> 1)) / steps) as u8
}

/// Quantizes every cell of `grid` to `[0, levels - 1]`.
///
/// # Example
/// ```
/// use logoconv::{quantize, Grid};
///
/// let raw = Grid::from_rows(&[[0u8, 64, 128, 255]])?;
/// assert_eq!(quantize(&raw, 5)?.as_slice(), &[0, 1, 2, 4]);
/// # Ok::<(), logoconv::LogoError>(())
/// ```
///
/// # Errors
///
/// Returns [`LogoError::InvalidParameter`] if `levels` is outside `2..=256`.
pub fn quantize(grid: &Grid, levels: usize) -> Result<Grid> {
    let levels = check_levels(levels)?;
    Ok(grid.map(|x| quantize_value(x, levels)))
}

/// Maps a quantized grid back to 8-bit intensities for display.
///
/// This is lossy: the result is within one quantization step of the value
/// originally quantized.
///
/// # Errors
///
/// Returns [`LogoError::InvalidParameter`] if `levels` is outside `2..=256`
/// or the grid holds a value of `levels` or more.
pub fn dequantize(grid: &Grid, levels: usize) -> Result<Grid> {
    let levels = check_levels(levels)?;
    let max = grid.max_value();
    if max as u32 >= levels {
        return Err(LogoError::InvalidParameter(format!(
            "level {max} out of range for {levels} levels"
        )));
    }
    Ok(grid.map(|v| dequantize_value(v, levels)))
}
