//! # logoconv
//!
//! Turns a small grayscale image into a compact byte string that can be
//! embedded as a constant in program source, and decodes it again.
//!
//! ## Features
//!
//! - **Quantizer**: maps 8-bit intensities onto a small palette of levels
//! - **RLE codec**: run-length codes the two background levels as letters and
//!   writes every other level as a digit
//! - **Tile compressor**: deduplicates square blocks under mirroring and
//!   optionally merges near-identical blocks
//! - **Verifier**: decodes a produced stream and compares it to its source
//!
//! ## Quick Start
//!
//! ```
//! use logoconv::{quantize, Codec, Grid, RleCodec, RleOptions};
//!
//! let raw = Grid::from_rows(&[[0u8, 0, 255, 255], [0, 128, 128, 0]])?;
//! let levels = quantize(&raw, 12)?;
//!
//! let codec = RleCodec::new(RleOptions::default());
//! let encoded = codec.encode(&levels)?;
//! assert_eq!(encoded.data, b"BbA55A");
//! assert_eq!(codec.decode(&encoded)?, levels);
//! # Ok::<(), logoconv::LogoError>(())
//! ```

use thiserror::Error;

pub mod codec;
pub mod grid;
pub mod header;
pub mod quant;
pub mod rle;
pub mod tiles;
pub mod verify;

pub use codec::{Codec, Encoded};
pub use grid::Grid;
pub use header::{render_header, HeaderOptions};
pub use quant::{dequantize, quantize};
pub use rle::{RleCodec, RleOptions, RleStats, Token};
pub use tiles::{compress_tiles, TileCodec, TileMap, TileOptions, TileRef, TileStats, Transform};
pub use verify::{compare, encode_verified, verify_exact, Fidelity};

/// Errors that can occur while quantizing, encoding or decoding an image.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogoError {
    /// A parameter is outside its valid range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Width or height is zero, or the rows are not all the same length
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Buffer size doesn't match the expected size for the dimensions
    #[error("buffer size mismatch: expected {expected} values, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The grid cannot be split into whole blocks
    #[error("{width}x{height} is not a multiple of the {block_size}x{block_size} block size")]
    DimensionMismatch {
        width: usize,
        height: usize,
        block_size: usize,
    },

    /// A background run is too long for a single run symbol
    #[error("run of {run} pixels at level {level} exceeds the maximum of {max}", max = rle::MAX_RUN)]
    RunOverflow { level: u8, run: usize },

    /// A non-background level has no literal symbol
    #[error("level {level} cannot be written as a literal digit")]
    LiteralOverflow { level: u8 },

    /// A byte in the stream is not a valid symbol
    #[error("invalid symbol 0x{byte:02x} at offset {offset}")]
    InvalidSymbol { byte: u8, offset: usize },

    /// The decoded stream does not cover the image exactly
    #[error("decoded {actual} values, expected {expected}")]
    DecodeLengthMismatch { expected: usize, actual: usize },

    /// Too many tile bitmaps to address with one ID byte
    #[error("{count} tile bitmaps exceed the addressable maximum of {max}", max = tiles::MAX_TILE_IDS)]
    PaletteOverflow { count: usize },

    /// A lossless round trip produced a different image
    #[error("reconstruction differs at ({x}, {y}): expected {expected}, got {actual}")]
    CompressionIntegrityError {
        x: usize,
        y: usize,
        expected: u8,
        actual: u8,
    },
}

/// Result type for logoconv operations.
pub type Result<T> = core::result::Result<T, LogoError>;
