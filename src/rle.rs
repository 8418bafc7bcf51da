//! Run-length codec for two background levels.
//!
//! Only the lowest level (`0`) and the highest level present in the image
//! form runs; every other level is written one symbol per pixel. Each token
//! becomes exactly one printable byte:
//!
//! | Bytes        | Meaning                                   |
//! |--------------|-------------------------------------------|
//! | `'A'..='Z'`  | run of level `0`, length `byte - 64`      |
//! | `'a'..='z'`  | run of the maximum level, length `byte - 96` |
//! | `'0'..='9'`  | single pixel of level `byte - 47` (1..=10) |
//!
//! Runs never cross a row boundary. Width, height and the maximum level are
//! not part of the stream and travel alongside it in [`Encoded`].

use log::debug;

use crate::codec::{Codec, Encoded};
use crate::{Grid, LogoError, Result};

/// Longest run a single symbol can express.
pub const MAX_RUN: usize = 26;
/// Highest level that has a literal digit symbol.
pub const MAX_LITERAL: u8 = 10;

const ZERO_RUN_BASE: u8 = b'A' - 1;
const MAX_RUN_BASE: u8 = b'a' - 1;
const LITERAL_BASE: u8 = b'0' - 1;

/// A run of `run` pixels of `level` inside one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub level: u8,
    pub run: usize,
}

/// Options for the RLE codec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RleOptions {
    /// Longest run to emit before starting a new one; `0` disables the cap.
    ///
    /// Anything above [`MAX_RUN`] can produce runs that have no symbol, in
    /// which case encoding fails with [`LogoError::RunOverflow`].
    pub run_limit: usize,
}

impl Default for RleOptions {
    fn default() -> Self {
        Self { run_limit: MAX_RUN }
    }
}

/// Summary of a token stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RleStats {
    /// Longest run in the stream
    pub max_run: usize,
    /// Number of tokens, which is also the number of encoded bytes
    pub tokens: usize,
}

impl RleStats {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        Self {
            max_run: tokens.iter().map(|t| t.run).max().unwrap_or(0),
            tokens: tokens.len(),
        }
    }
}

/// Row scanner that is either idle or holding one pending run.
struct RunEncoder {
    background: [u8; 2],
    run_limit: usize,
    pending: Option<Token>,
    tokens: Vec<Token>,
}

impl RunEncoder {
    fn new(max_level: u8, run_limit: usize) -> Self {
        Self {
            background: [0, max_level],
            run_limit,
            pending: None,
            tokens: Vec::new(),
        }
    }

    #[inline]
    fn is_background(&self, level: u8) -> bool {
        self.background.contains(&level)
    }

    fn push(&mut self, level: u8) {
        let extends = self.is_background(level)
            && matches!(self.pending, Some(t) if t.level == level
                && (self.run_limit == 0 || t.run < self.run_limit));
        if extends {
            if let Some(t) = self.pending.as_mut() {
                t.run += 1;
            }
            return;
        }
        self.flush();
        self.pending = Some(Token { level, run: 1 });
    }

    fn flush(&mut self) {
        if let Some(t) = self.pending.take() {
            self.tokens.push(t);
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush();
        self.tokens
    }
}

/// Splits a quantized grid into row-bounded tokens.
///
/// # Example
/// ```
/// use logoconv::{rle, Grid, RleOptions, Token};
///
/// let grid = Grid::from_rows(&[[0u8, 0, 0, 3, 3, 1, 1]])?;
/// let tokens = rle::tokenize(&grid, &RleOptions::default());
/// assert_eq!(tokens, vec![
///     Token { level: 0, run: 3 },
///     Token { level: 3, run: 2 },
///     Token { level: 1, run: 1 },
///     Token { level: 1, run: 1 },
/// ]);
/// # Ok::<(), logoconv::LogoError>(())
/// ```
pub fn tokenize(grid: &Grid, opts: &RleOptions) -> Vec<Token> {
    let mut encoder = RunEncoder::new(grid.max_value(), opts.run_limit);
    for row in grid.rows() {
        for &level in row {
            encoder.push(level);
        }
        encoder.flush();
    }
    encoder.finish()
}

/// Writes tokens as symbol bytes.
///
/// # Errors
///
/// [`LogoError::RunOverflow`] for a background run longer than [`MAX_RUN`],
/// [`LogoError::LiteralOverflow`] for a literal level above [`MAX_LITERAL`].
pub fn write_symbols(tokens: &[Token], max_level: u8) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(tokens.len());
    for &Token { level, run } in tokens {
        if level == 0 || level == max_level {
            if run > MAX_RUN {
                return Err(LogoError::RunOverflow { level, run });
            }
            let base = if level == 0 { ZERO_RUN_BASE } else { MAX_RUN_BASE };
            out.push(base + run as u8);
        } else {
            if level > MAX_LITERAL {
                return Err(LogoError::LiteralOverflow { level });
            }
            out.extend(core::iter::repeat_n(LITERAL_BASE + level, run));
        }
    }
    Ok(out)
}

/// Encodes a quantized grid.
pub fn encode(grid: &Grid, opts: &RleOptions) -> Result<Encoded> {
    let max_level = grid.max_value();
    let tokens = tokenize(grid, opts);
    let stats = RleStats::from_tokens(&tokens);
    debug!(
        "RLE, runlimit {}: {} maxrun, {} defbytes",
        opts.run_limit, stats.max_run, stats.tokens
    );
    let data = write_symbols(&tokens, max_level)?;
    Ok(Encoded {
        data,
        width: grid.width(),
        height: grid.height(),
        max_level,
    })
}

#[inline]
fn read_symbol(byte: u8, offset: usize, max_level: u8) -> Result<Token> {
    match byte {
        b'A'..=b'Z' => Ok(Token {
            level: 0,
            run: (byte - ZERO_RUN_BASE) as usize,
        }),
        b'a'..=b'z' => Ok(Token {
            level: max_level,
            run: (byte - MAX_RUN_BASE) as usize,
        }),
        b'0'..=b'9' => Ok(Token {
            level: byte - LITERAL_BASE,
            run: 1,
        }),
        _ => Err(LogoError::InvalidSymbol { byte, offset }),
    }
}

/// Decodes a symbol stream back into a `width`×`height` grid.
///
/// # Errors
///
/// [`LogoError::InvalidSymbol`] for a byte outside the three symbol ranges and
/// [`LogoError::DecodeLengthMismatch`] if the stream does not expand to exactly
/// `width * height` values.
pub fn decode(data: &[u8], width: usize, height: usize, max_level: u8) -> Result<Grid> {
    if width == 0 || height == 0 {
        return Err(LogoError::InvalidDimensions { width, height });
    }
    let expected = width
        .checked_mul(height)
        .ok_or(LogoError::InvalidDimensions { width, height })?;

    // Validate and size first so a bad stream never drives a large allocation
    let mut actual = 0usize;
    for (offset, &byte) in data.iter().enumerate() {
        actual += read_symbol(byte, offset, max_level)?.run;
    }
    if actual != expected {
        return Err(LogoError::DecodeLengthMismatch { expected, actual });
    }

    let mut pixels = Vec::with_capacity(expected);
    for (offset, &byte) in data.iter().enumerate() {
        let Token { level, run } = read_symbol(byte, offset, max_level)?;
        pixels.extend(core::iter::repeat_n(level, run));
    }
    Grid::new(width, height, pixels)
}

/// The RLE codec behind the [`Codec`] interface.
#[derive(Clone, Debug, Default)]
pub struct RleCodec {
    opts: RleOptions,
}

impl RleCodec {
    pub fn new(opts: RleOptions) -> Self {
        Self { opts }
    }
}

impl Codec for RleCodec {
    fn name(&self) -> &'static str {
        "rle"
    }

    fn is_lossless(&self) -> bool {
        true
    }

    fn encode(&self, grid: &Grid) -> Result<Encoded> {
        encode(grid, &self.opts)
    }

    fn decode(&self, encoded: &Encoded) -> Result<Grid> {
        decode(
            &encoded.data,
            encoded.width,
            encoded.height,
            encoded.max_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(grid: &Grid, run_limit: usize) -> Vec<(u8, usize)> {
        tokenize(grid, &RleOptions { run_limit })
            .into_iter()
            .map(|t| (t.level, t.run))
            .collect()
    }

    #[test]
    fn test_runs_break_at_row_end() {
        let grid = Grid::from_rows(&[[0u8, 0], [0, 0]]).unwrap();
        assert_eq!(tokens(&grid, 0), vec![(0, 2), (0, 2)]);
    }

    #[test]
    fn test_run_limit_splits_runs() {
        let grid = Grid::from_rows(&[[5u8; 7]]).unwrap();
        assert_eq!(tokens(&grid, 3), vec![(5, 3), (5, 3), (5, 1)]);
        assert_eq!(tokens(&grid, 0), vec![(5, 7)]);
    }

    #[test]
    fn test_literals_are_never_merged() {
        let grid = Grid::from_rows(&[[0u8, 2, 2, 2, 3]]).unwrap();
        assert_eq!(tokens(&grid, 0), vec![(0, 1), (2, 1), (2, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_single_background_level() {
        // maximum is 0, so only level 0 runs and it uses uppercase symbols
        let grid = Grid::filled(3, 1, 0).unwrap();
        let encoded = encode(&grid, &RleOptions::default()).unwrap();
        assert_eq!(encoded.data, b"C");
        assert_eq!(encoded.max_level, 0);
    }

    #[test]
    fn test_symbols() {
        let toks = [
            Token { level: 0, run: 26 },
            Token { level: 9, run: 1 },
            Token { level: 1, run: 1 },
            Token { level: 10, run: 1 },
            Token { level: 11, run: 1 },
        ];
        assert_eq!(write_symbols(&toks, 11).unwrap(), b"Z809a");
    }

    #[test]
    fn test_run_overflow() {
        let toks = [Token { level: 4, run: 27 }];
        assert_eq!(
            write_symbols(&toks, 4),
            Err(LogoError::RunOverflow { level: 4, run: 27 })
        );
    }

    #[test]
    fn test_literal_overflow() {
        let toks = [Token { level: 11, run: 1 }];
        assert_eq!(
            write_symbols(&toks, 12),
            Err(LogoError::LiteralOverflow { level: 11 })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_bytes() {
        assert_eq!(
            decode(b"A/", 2, 1, 3),
            Err(LogoError::InvalidSymbol {
                byte: b'/',
                offset: 1
            })
        );
        assert!(matches!(
            decode(b"A@", 2, 1, 3),
            Err(LogoError::InvalidSymbol { byte: b'@', .. })
        ));
    }

    #[test]
    fn test_decode_length_mismatch() {
        assert_eq!(
            decode(b"C", 2, 1, 1),
            Err(LogoError::DecodeLengthMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            decode(b"", 1, 1, 1),
            Err(LogoError::DecodeLengthMismatch {
                expected: 1,
                actual: 0
            })
        );
    }
}
