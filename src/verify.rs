//! Reconstruction checks.
//!
//! A lossless codec must reproduce its input exactly; any difference is an
//! integrity failure. For lossy codecs the comparison only reports how far
//! the reconstruction drifted.

use log::{debug, warn};

use crate::codec::{Codec, Encoded};
use crate::{Grid, LogoError, Result};

/// How closely a reconstruction matches its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fidelity {
    /// Number of cells that differ
    pub mismatched: usize,
    /// Largest absolute difference of a single cell
    pub max_error: u8,
    /// Sum of squared differences over the whole grid
    pub squared_error: u64,
}

impl Fidelity {
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.mismatched == 0
    }
}

fn check_shape(source: &Grid, reconstructed: &Grid) -> Result<()> {
    if source.width() != reconstructed.width() || source.height() != reconstructed.height() {
        return Err(LogoError::InvalidDimensions {
            width: reconstructed.width(),
            height: reconstructed.height(),
        });
    }
    Ok(())
}

/// Compares two grids of the same shape cell by cell.
pub fn compare(source: &Grid, reconstructed: &Grid) -> Result<Fidelity> {
    check_shape(source, reconstructed)?;
    let mut fidelity = Fidelity::default();
    for (&a, &b) in source.as_slice().iter().zip(reconstructed.as_slice()) {
        let d = a.abs_diff(b);
        if d != 0 {
            fidelity.mismatched += 1;
            fidelity.max_error = fidelity.max_error.max(d);
            fidelity.squared_error += d as u64 * d as u64;
        }
    }
    Ok(fidelity)
}

/// Fails with [`LogoError::CompressionIntegrityError`] at the first cell, in
/// row-major order, where the grids differ.
pub fn verify_exact(source: &Grid, reconstructed: &Grid) -> Result<()> {
    check_shape(source, reconstructed)?;
    let width = source.width();
    let first = source
        .as_slice()
        .iter()
        .zip(reconstructed.as_slice())
        .position(|(a, b)| a != b);
    match first {
        None => Ok(()),
        Some(i) => Err(LogoError::CompressionIntegrityError {
            x: i % width,
            y: i / width,
            expected: source.as_slice()[i],
            actual: reconstructed.as_slice()[i],
        }),
    }
}

/// Encodes `grid`, decodes the result and checks it against `grid`.
///
/// Lossless codecs must round-trip exactly. For lossy codecs differences are
/// logged and returned in the [`Fidelity`].
///
/// # Example
/// ```
/// use logoconv::{encode_verified, Grid, RleCodec};
///
/// let grid = Grid::from_rows(&[[0u8, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]])?;
/// let (encoded, fidelity) = encode_verified(&RleCodec::default(), &grid)?;
/// assert_eq!(encoded.data, b"DAbAAbAD");
/// assert!(fidelity.is_exact());
/// # Ok::<(), logoconv::LogoError>(())
/// ```
pub fn encode_verified<C: Codec + ?Sized>(codec: &C, grid: &Grid) -> Result<(Encoded, Fidelity)> {
    let encoded = codec.encode(grid)?;
    let decoded = codec.decode(&encoded)?;
    if codec.is_lossless() {
        verify_exact(grid, &decoded)?;
    }
    let fidelity = compare(grid, &decoded)?;
    if fidelity.is_exact() {
        debug!(
            "{}: {} bytes, reconstruction exact",
            codec.name(),
            encoded.len()
        );
    } else {
        warn!(
            "{}: {} of {} pixels differ (max error {}, squared error {})",
            codec.name(),
            fidelity.mismatched,
            grid.len(),
            fidelity.max_error,
            fidelity.squared_error
        );
    }
    Ok((encoded, fidelity))
}
