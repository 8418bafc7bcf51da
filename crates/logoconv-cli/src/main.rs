//! logoconv - Compress a grayscale logo into an embeddable header
//!
//! A command-line tool that quantizes an image, compresses it with the RLE or
//! tile codec, checks the round trip and writes the result as a C/C++ header.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use logoconv::{
    compress_tiles, dequantize, encode_verified, quantize, render_header, Codec, Grid,
    HeaderOptions, RleCodec, RleOptions, TileCodec, TileOptions,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "logoconv")]
#[command(version)]
#[command(about = "Compress a grayscale logo into an embeddable header", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Input image file (PNG, JPEG, GIF, WebP); converted to grayscale
    input: PathBuf,

    /// Number of gray levels (2-256; at most 12 for the RLE codec)
    #[arg(short, long, default_value = "12")]
    levels: usize,

    /// Columns to cut away on the left before quantizing
    #[arg(long, default_value = "0")]
    crop_left: usize,

    /// Level-0 columns to add on the left after quantizing
    #[arg(long, default_value = "0")]
    pad_left: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum CodecKind {
    Rle,
    Tiles,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an image with the RLE codec and write a header
    Rle {
        #[command(flatten)]
        source: SourceArgs,

        /// Output header file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Longest run per symbol (1-26, 0 = unlimited)
        #[arg(short, long, default_value = "26")]
        run_limit: usize,

        /// Prefix of the generated identifiers
        #[arg(short, long, default_value = "Logo")]
        name: String,

        /// Compressed bytes per line of the data string
        #[arg(long, default_value = "76")]
        line_width: usize,
    },

    /// Compress an image with the tile codec and report its size
    Tiles {
        #[command(flatten)]
        source: SourceArgs,

        /// Block side in pixels
        #[arg(short, long, default_value = "4")]
        block_size: usize,

        /// Merge blocks whose squared error is at most this
        #[arg(short, long, default_value = "0")]
        threshold: u64,
    },

    /// Round-trip an image through a codec and save what a decoder would show
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Codec to round-trip through
        #[arg(short, long, value_enum, default_value = "rle")]
        codec: CodecKind,

        /// Longest run per symbol for the RLE codec
        #[arg(short, long, default_value = "26")]
        run_limit: usize,

        /// Block side in pixels for the tile codec
        #[arg(short, long, default_value = "4")]
        block_size: usize,

        /// Merge threshold for the tile codec
        #[arg(short, long, default_value = "0")]
        threshold: u64,
    },
}

/// Loads `source.input` as 8-bit luma and turns it into quantized levels.
fn load_levels(source: &SourceArgs) -> Result<Grid, Box<dyn std::error::Error>> {
    let img = image::open(&source.input)
        .map_err(|e| format!("Failed to open '{}': {}", source.input.display(), e))?;
    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    let raw = Grid::new(width as usize, height as usize, luma.into_raw())?;
    let raw = raw.crop(
        source.crop_left,
        0,
        raw.width().saturating_sub(source.crop_left),
        raw.height(),
    )?;

    let levels = quantize(&raw, source.levels)?;
    if source.pad_left == 0 {
        return Ok(levels);
    }
    let width = levels.width() + source.pad_left;
    let mut data = Vec::with_capacity(width * levels.height());
    for row in levels.rows() {
        data.resize(data.len() + source.pad_left, 0);
        data.extend_from_slice(row);
    }
    Ok(Grid::new(width, levels.height(), data)?)
}

fn save_preview(grid: &Grid, levels: usize, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let gray = dequantize(grid, levels)?;
    let img = image::GrayImage::from_raw(gray.width() as u32, gray.height() as u32, gray.into_vec())
        .ok_or("Failed to create image from decoded data")?;
    img.save(path)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rle {
            source,
            output,
            run_limit,
            name,
            line_width,
        } => {
            let grid = load_levels(&source)?;
            info!(
                "Encoding '{}' ({}x{}) with {} levels, run limit {}",
                source.input.display(),
                grid.width(),
                grid.height(),
                source.levels,
                run_limit
            );

            let codec = RleCodec::new(RleOptions { run_limit });
            let (encoded, _) = encode_verified(&codec, &grid)?;
            let header = render_header(
                &encoded,
                &HeaderOptions {
                    name,
                    line_width,
                    ..HeaderOptions::default()
                },
            )?;

            match output {
                Some(path) => {
                    fs::write(&path, &header)?;
                    info!(
                        "Written {} bytes of compressed data to '{}'",
                        encoded.len(),
                        path.display()
                    );
                }
                None => {
                    io::stdout().write_all(header.as_bytes())?;
                }
            }
        }

        Commands::Tiles {
            source,
            block_size,
            threshold,
        } => {
            let grid = load_levels(&source)?;
            let opts = TileOptions {
                block_size,
                diff_threshold: threshold,
            };
            let stats = compress_tiles(&grid, &opts)?.stats();
            info!(
                "blocksize {}: {} blocks, {} unique, {} bitmaps, {} pixels, {} defbytes",
                block_size,
                stats.blocks,
                stats.unique_refs,
                stats.bitmaps,
                stats.pixels,
                stats.defined_bytes
            );

            let (encoded, fidelity) = encode_verified(&TileCodec::new(opts), &grid)?;
            info!(
                "Encoded {} bytes, {} of {} pixels differ (max error {})",
                encoded.len(),
                fidelity.mismatched,
                grid.len(),
                fidelity.max_error
            );
        }

        Commands::Preview {
            source,
            output,
            codec,
            run_limit,
            block_size,
            threshold,
        } => {
            let grid = load_levels(&source)?;
            let codec: Box<dyn Codec> = match codec {
                CodecKind::Rle => Box::new(RleCodec::new(RleOptions { run_limit })),
                CodecKind::Tiles => Box::new(TileCodec::new(TileOptions {
                    block_size,
                    diff_threshold: threshold,
                })),
            };

            let (encoded, _) = encode_verified(codec.as_ref(), &grid)?;
            let decoded = codec.decode(&encoded)?;
            save_preview(&decoded, source.levels, &output)?;
            info!(
                "Decoded {}x{} ({} bytes, {}) -> '{}'",
                decoded.width(),
                decoded.height(),
                encoded.len(),
                codec.name(),
                output.display()
            );
        }
    }

    Ok(())
}
