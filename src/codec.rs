//! Shared interface of the two encoders.

use crate::{Grid, Result};

/// An encoded byte stream plus what a decoder needs to know out of band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// The compressed stream
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Highest quantized level in the source image
    pub max_level: u8,
}

impl Encoded {
    /// Length of the compressed stream in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A compression strategy for quantized grids.
///
/// Implementations are pure: encoding the same grid with the same options
/// always produces the same bytes.
pub trait Codec {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Whether `decode(encode(grid)) == grid` is guaranteed.
    fn is_lossless(&self) -> bool;

    fn encode(&self, grid: &Grid) -> Result<Encoded>;

    fn decode(&self, encoded: &Encoded) -> Result<Grid>;
}
