//! Tile compressor.
//!
//! Splits a quantized grid into square blocks and stores each distinct block
//! once, together with a nametable that says which stored block (and which
//! mirror image of it) belongs at every block position. Blocks that are mirror
//! images of each other share one palette entry. With a nonzero
//! `diff_threshold`, blocks whose squared error against an earlier block (in
//! any orientation) is within the threshold are merged into it, which makes
//! the result lossy.
//!
//! # Byte layout
//!
//! ```text
//! nametable   one entry per block position, row-major
//!               id                  transform = identity
//!               0xFC | t, id        transform t = 1..=3
//! palette     N * block_size² levels, canonical orientation, row-major
//! ```
//!
//! The stream length therefore equals [`TileMap::defined_bytes`].

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::codec::{Codec, Encoded};
use crate::{Grid, LogoError, Result};

/// Number of palette IDs a single nametable byte can address.
pub const MAX_TILE_IDS: usize = TRANSFORM_MARKER as usize;

const TRANSFORM_MARKER: u8 = 0xFC;

/// One of the four mirror images of a square block.
///
/// Bit 0 is a horizontal flip and bit 1 a vertical flip, so composing two
/// transforms is XOR and every transform is its own inverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Transform {
    #[default]
    Identity = 0,
    HFlip = 1,
    VFlip = 2,
    Both = 3,
}

impl Transform {
    pub const ALL: [Transform; 4] = [
        Transform::Identity,
        Transform::HFlip,
        Transform::VFlip,
        Transform::Both,
    ];

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Transform from the low two bits of `bits`.
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 3) as usize]
    }

    /// The transform equivalent to applying `self` and then `other`.
    #[inline]
    pub fn then(self, other: Transform) -> Self {
        Self::from_bits(self.bits() ^ other.bits())
    }

    #[inline]
    fn flips_h(self) -> bool {
        self.bits() & 1 != 0
    }

    #[inline]
    fn flips_v(self) -> bool {
        self.bits() & 2 != 0
    }

    /// Returns the mirrored copy of a `size`×`size` row-major block.
    pub fn apply(self, block: &[u8], size: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(size * size);
        for y in 0..size {
            let sy = if self.flips_v() { size - 1 - y } else { y };
            let row = &block[sy * size..(sy + 1) * size];
            if self.flips_h() {
                out.extend(row.iter().rev());
            } else {
                out.extend_from_slice(row);
            }
        }
        out
    }
}

/// A nametable entry: palette block `id`, drawn with `transform`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileRef {
    pub id: usize,
    pub transform: Transform,
}

/// Options for the tile compressor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileOptions {
    /// Side of the square blocks; must divide both image dimensions
    pub block_size: usize,
    /// Largest sum of squared differences at which two blocks are merged.
    /// `0` keeps the compression lossless.
    pub diff_threshold: u64,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            block_size: 4,
            diff_threshold: 0,
        }
    }
}

/// Size figures of a tile map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileStats {
    /// Block positions in the image
    pub blocks: usize,
    /// Distinct `(id, transform)` pairs in the nametable
    pub unique_refs: usize,
    /// Palette entries
    pub bitmaps: usize,
    /// Pixels stored in the palette
    pub pixels: usize,
    /// Bytes needed for palette and nametable
    pub defined_bytes: usize,
}

fn stats_for(nametable: &[TileRef], bitmaps: usize, block_size: usize) -> TileStats {
    let unique_refs = nametable.iter().collect::<HashSet<_>>().len();
    let pixels = bitmaps * block_size * block_size;
    let transformed = nametable
        .iter()
        .filter(|r| r.transform != Transform::Identity)
        .count();
    TileStats {
        blocks: nametable.len(),
        unique_refs,
        bitmaps,
        pixels,
        defined_bytes: pixels + nametable.len() + transformed,
    }
}

/// A deduplicated palette of blocks and the nametable that places them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    block_size: usize,
    width: usize,
    height: usize,
    palette: Vec<Vec<u8>>,
    nametable: Vec<TileRef>,
}

/// Canonical blocks by dense ID, plus the reverse lookup from every
/// orientation of a stored block to its reference.
struct SymmetryTable {
    block_size: usize,
    blocks: Vec<Vec<u8>>,
    index: HashMap<Vec<u8>, TileRef>,
}

impl SymmetryTable {
    fn new(block_size: usize) -> Self {
        Self {
            block_size,
            blocks: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Reference reproducing `block`, allocating a new ID if no orientation
    /// of it is known yet.
    fn intern(&mut self, block: Vec<u8>) -> TileRef {
        if let Some(&found) = self.index.get(&block) {
            return found;
        }
        let id = self.blocks.len();
        // Identity goes in first so a symmetric block resolves to it
        for t in Transform::ALL {
            let variant = t.apply(&block, self.block_size);
            self.index
                .entry(variant)
                .or_insert(TileRef { id, transform: t });
        }
        self.blocks.push(block);
        TileRef {
            id,
            transform: Transform::Identity,
        }
    }
}

fn squared_error(a: &[u8], b: &[u8]) -> u64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as i64 - y as i64;
            (d * d) as u64
        })
        .sum()
}

/// For every ID, the earlier ID it merges into and the transform mapping
/// between them; `None` for IDs that survive.
///
/// Pairs are visited in ascending `a`, then ascending `b`, then orientation
/// order, and the first match wins.
fn merge_targets(blocks: &[Vec<u8>], block_size: usize, threshold: u64) -> Vec<Option<TileRef>> {
    let variants: Vec<[Vec<u8>; 4]> = blocks
        .iter()
        .map(|b| Transform::ALL.map(|t| t.apply(b, block_size)))
        .collect();

    let mut merged: Vec<Option<TileRef>> = vec![None; blocks.len()];
    for a in 0..blocks.len() {
        if merged[a].is_some() {
            continue;
        }
        let canonical = &blocks[a];
        for b in a + 1..blocks.len() {
            if merged[b].is_some() {
                continue;
            }
            merged[b] = Transform::ALL
                .into_iter()
                .find(|&t| squared_error(canonical, &variants[b][t as usize]) <= threshold)
                .map(|transform| TileRef { id: a, transform });
        }
    }
    merged
}

/// Compresses a quantized grid into a [`TileMap`].
///
/// # Errors
///
/// [`LogoError::InvalidParameter`] for a zero block size and
/// [`LogoError::DimensionMismatch`] if the block size does not divide both
/// dimensions.
pub fn compress_tiles(grid: &Grid, opts: &TileOptions) -> Result<TileMap> {
    let bs = opts.block_size;
    if bs == 0 {
        return Err(LogoError::InvalidParameter(
            "block size must be at least 1".to_string(),
        ));
    }
    let (width, height) = (grid.width(), grid.height());
    if width % bs != 0 || height % bs != 0 {
        return Err(LogoError::DimensionMismatch {
            width,
            height,
            block_size: bs,
        });
    }

    // Phase 1: exact deduplication under mirroring
    let mut table = SymmetryTable::new(bs);
    let mut nametable = Vec::with_capacity((width / bs) * (height / bs));
    for by in (0..height).step_by(bs) {
        for bx in (0..width).step_by(bs) {
            let mut block = Vec::with_capacity(bs * bs);
            for row in grid.rows().skip(by).take(bs) {
                block.extend_from_slice(&row[bx..bx + bs]);
            }
            nametable.push(table.intern(block));
        }
    }
    let blocks = table.blocks;
    let pre = stats_for(&nametable, blocks.len(), bs);
    debug!(
        "blocksize {bs},  pre-merge: {} blocks, {} unique, {} bitmaps, {} pixels",
        pre.blocks, pre.unique_refs, pre.bitmaps, pre.pixels
    );

    // Phase 2: fold near-duplicates into their earliest match
    let merged = merge_targets(&blocks, bs, opts.diff_threshold);
    for entry in &mut nametable {
        if let Some(target) = merged[entry.id] {
            *entry = TileRef {
                id: target.id,
                transform: entry.transform.then(target.transform),
            };
        }
    }
    let survivors = merged.iter().filter(|m| m.is_none()).count();
    let post = stats_for(&nametable, survivors, bs);
    debug!(
        "blocksize {bs}, post-merge: {} blocks, {} unique, {} bitmaps, {} pixels",
        post.blocks, post.unique_refs, post.bitmaps, post.pixels
    );

    // Phase 3: renumber the referenced IDs densely, keeping their order
    let mut used = vec![false; blocks.len()];
    for entry in &nametable {
        used[entry.id] = true;
    }
    let mut renumber = vec![usize::MAX; blocks.len()];
    let mut palette = Vec::with_capacity(survivors);
    for (old, block) in blocks.into_iter().enumerate() {
        if used[old] {
            renumber[old] = palette.len();
            palette.push(block);
        }
    }
    for entry in &mut nametable {
        entry.id = renumber[entry.id];
    }

    let map = TileMap {
        block_size: bs,
        width,
        height,
        palette,
        nametable,
    };
    debug!(
        "blocksize {bs},      final: {} defbytes",
        map.defined_bytes()
    );
    Ok(map)
}

impl TileMap {
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Stored blocks in canonical orientation, indexed by ID.
    pub fn palette(&self) -> &[Vec<u8>] {
        &self.palette
    }

    /// One reference per block position, row-major.
    pub fn nametable(&self) -> &[TileRef] {
        &self.nametable
    }

    /// Palette pixels plus one byte per nametable entry plus one more per
    /// mirrored entry.
    pub fn defined_bytes(&self) -> usize {
        self.stats().defined_bytes
    }

    pub fn stats(&self) -> TileStats {
        stats_for(&self.nametable, self.palette.len(), self.block_size)
    }

    /// Rebuilds the grid by drawing every referenced block in place.
    pub fn reconstruct(&self) -> Result<Grid> {
        let bs = self.block_size;
        let stride = self.width / bs;
        let mut data = vec![0u8; self.width * self.height];
        for (i, entry) in self.nametable.iter().enumerate() {
            let block = self
                .palette
                .get(entry.id)
                .ok_or(LogoError::DecodeLengthMismatch {
                    expected: (entry.id + 1) * bs * bs,
                    actual: self.palette.len() * bs * bs,
                })?;
            let tile = entry.transform.apply(block, bs);
            let (x0, y0) = ((i % stride) * bs, (i / stride) * bs);
            for (sy, src) in tile.chunks_exact(bs).enumerate() {
                let start = (y0 + sy) * self.width + x0;
                data[start..start + bs].copy_from_slice(src);
            }
        }
        Grid::new(self.width, self.height, data)
    }

    /// Serializes the map in the layout described at the module level.
    ///
    /// # Errors
    ///
    /// [`LogoError::PaletteOverflow`] if there are more than [`MAX_TILE_IDS`]
    /// palette entries.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.palette.len() > MAX_TILE_IDS {
            return Err(LogoError::PaletteOverflow {
                count: self.palette.len(),
            });
        }
        let mut out = Vec::with_capacity(self.defined_bytes());
        for entry in &self.nametable {
            if entry.transform != Transform::Identity {
                out.push(TRANSFORM_MARKER | entry.transform.bits());
            }
            out.push(entry.id as u8);
        }
        for block in &self.palette {
            out.extend_from_slice(block);
        }
        Ok(out)
    }

    /// Parses a stream produced by [`TileMap::to_bytes`].
    pub fn from_bytes(data: &[u8], width: usize, height: usize, block_size: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LogoError::InvalidDimensions { width, height });
        }
        if block_size == 0 || width % block_size != 0 || height % block_size != 0 {
            return Err(LogoError::DimensionMismatch {
                width,
                height,
                block_size,
            });
        }
        let count = (width / block_size)
            .checked_mul(height / block_size)
            .ok_or(LogoError::InvalidDimensions { width, height })?;
        // every entry takes at least one byte, so check before allocating
        if data.len() < count {
            return Err(LogoError::DecodeLengthMismatch {
                expected: count,
                actual: data.len(),
            });
        }

        let mut nametable = Vec::with_capacity(count);
        let mut pos = 0;
        while nametable.len() < count {
            let Some(&byte) = data.get(pos) else {
                return Err(LogoError::DecodeLengthMismatch {
                    expected: count,
                    actual: nametable.len(),
                });
            };
            let mut transform = Transform::Identity;
            let mut id = byte;
            if byte >= TRANSFORM_MARKER {
                transform = Transform::from_bits(byte);
                if transform == Transform::Identity {
                    return Err(LogoError::InvalidSymbol { byte, offset: pos });
                }
                pos += 1;
                id = match data.get(pos) {
                    Some(&next) if next < TRANSFORM_MARKER => next,
                    Some(&next) => {
                        return Err(LogoError::InvalidSymbol {
                            byte: next,
                            offset: pos,
                        })
                    }
                    None => {
                        return Err(LogoError::DecodeLengthMismatch {
                            expected: count,
                            actual: nametable.len(),
                        })
                    }
                };
            }
            nametable.push(TileRef {
                id: id as usize,
                transform,
            });
            pos += 1;
        }

        let bitmaps = nametable.iter().map(|r| r.id + 1).max().unwrap_or(0);
        let area = block_size.saturating_mul(block_size);
        let expected = bitmaps
            .checked_mul(area)
            .and_then(|n| n.checked_add(pos))
            .ok_or(LogoError::DecodeLengthMismatch {
                expected: usize::MAX,
                actual: data.len(),
            })?;
        if data.len() != expected {
            return Err(LogoError::DecodeLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        let palette = data[pos..].chunks_exact(area).map(<[u8]>::to_vec).collect();

        Ok(Self {
            block_size,
            width,
            height,
            palette,
            nametable,
        })
    }
}

/// The tile compressor behind the [`Codec`] interface.
#[derive(Clone, Debug, Default)]
pub struct TileCodec {
    opts: TileOptions,
}

impl TileCodec {
    pub fn new(opts: TileOptions) -> Self {
        Self { opts }
    }
}

impl Codec for TileCodec {
    fn name(&self) -> &'static str {
        "tiles"
    }

    fn is_lossless(&self) -> bool {
        self.opts.diff_threshold == 0
    }

    fn encode(&self, grid: &Grid) -> Result<Encoded> {
        let map = compress_tiles(grid, &self.opts)?;
        Ok(Encoded {
            data: map.to_bytes()?,
            width: grid.width(),
            height: grid.height(),
            max_level: grid.max_value(),
        })
    }

    fn decode(&self, encoded: &Encoded) -> Result<Grid> {
        TileMap::from_bytes(
            &encoded.data,
            encoded.width,
            encoded.height,
            self.opts.block_size,
        )?
        .reconstruct()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];

    #[test]
    fn test_transform_apply() {
        assert_eq!(Transform::Identity.apply(&BLOCK, 3), BLOCK.to_vec());
        assert_eq!(
            Transform::HFlip.apply(&BLOCK, 3),
            vec![3, 2, 1, 6, 5, 4, 9, 8, 7]
        );
        assert_eq!(
            Transform::VFlip.apply(&BLOCK, 3),
            vec![7, 8, 9, 4, 5, 6, 1, 2, 3]
        );
        assert_eq!(
            Transform::Both.apply(&BLOCK, 3),
            vec![9, 8, 7, 6, 5, 4, 3, 2, 1]
        );
    }

    #[test]
    fn test_transform_composition_matches_xor() {
        for a in Transform::ALL {
            for b in Transform::ALL {
                let stepwise = b.apply(&a.apply(&BLOCK, 3), 3);
                assert_eq!(a.then(b).apply(&BLOCK, 3), stepwise);
            }
            assert_eq!(a.apply(&a.apply(&BLOCK, 3), 3), BLOCK.to_vec());
        }
    }

    #[test]
    fn test_symmetric_block_prefers_identity() {
        let mut table = SymmetryTable::new(2);
        let first = table.intern(vec![1, 1, 1, 1]);
        assert_eq!(first.transform, Transform::Identity);
        let again = table.intern(vec![1, 1, 1, 1]);
        assert_eq!(again, first);
        // a left/right symmetric block is its own horizontal mirror
        let sym = table.intern(vec![2, 2, 3, 3]);
        assert_eq!(table.intern(vec![3, 3, 2, 2]).transform, Transform::VFlip);
        assert_eq!(table.intern(vec![2, 2, 3, 3]), sym);
    }

    #[test]
    fn test_merge_first_match_wins() {
        let blocks = vec![vec![0, 0, 0, 0], vec![0, 0, 0, 1], vec![0, 1, 1, 1]];
        let merged = merge_targets(&blocks, 2, 1);
        assert_eq!(
            merged,
            vec![
                None,
                Some(TileRef {
                    id: 0,
                    transform: Transform::Identity
                }),
                None
            ]
        );
        assert_eq!(merge_targets(&blocks, 2, 0), vec![None, None, None]);
    }

    #[test]
    fn test_merge_matches_mirrored_block_at_zero_threshold() {
        let blocks = vec![vec![0, 0, 0, 0], vec![0, 0, 0, 1], vec![0, 0, 1, 0]];
        assert_eq!(
            merge_targets(&blocks, 2, 0),
            vec![
                None,
                None,
                Some(TileRef {
                    id: 1,
                    transform: Transform::HFlip
                })
            ]
        );
    }

    #[test]
    fn test_squared_error() {
        assert_eq!(squared_error(&[0, 5, 9], &[3, 5, 7]), 13);
    }

    #[test]
    fn test_from_bytes_rejects_bad_marker() {
        // 0xFC alone would mean "identity", which is never written with a marker
        let data = [0xFC, 0, 1];
        assert_eq!(
            TileMap::from_bytes(&data, 1, 1, 1),
            Err(LogoError::InvalidSymbol {
                byte: 0xFC,
                offset: 0
            })
        );
    }

    #[test]
    fn test_from_bytes_truncated() {
        assert!(matches!(
            TileMap::from_bytes(&[0xFD], 1, 1, 1),
            Err(LogoError::DecodeLengthMismatch { .. })
        ));
        assert!(matches!(
            TileMap::from_bytes(&[0, 0], 2, 1, 1),
            Err(LogoError::DecodeLengthMismatch { .. })
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_from_bytes_short_stream_with_large_dimensions() {
        assert_eq!(
            TileMap::from_bytes(&[0], 1 << 17, 1 << 17, 1),
            Err(LogoError::DecodeLengthMismatch {
                expected: 1 << 34,
                actual: 1
            })
        );
    }

    #[test]
    fn test_reconstruct_rejects_missing_tile() {
        let map = TileMap {
            block_size: 1,
            width: 1,
            height: 1,
            palette: vec![],
            nametable: vec![TileRef::default()],
        };
        assert_eq!(
            map.reconstruct(),
            Err(LogoError::DecodeLengthMismatch {
                expected: 1,
                actual: 0
            })
        );
    }
}
