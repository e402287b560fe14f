//! Converts an indexed PNG into SNES tileset, tilemap and palette data.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use snestile::{BitDepth, Config, Image2Snes};

mod load;
mod output;

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(about = "Convert an indexed PNG image into SNES tiles, tilemap and palette")]
struct Args {
    /// Bits per pixel of the output tiles (1, 2, 3, 4 or 8)
    #[arg(long, value_parser = parse_bit_depth)]
    bpp: BitDepth,

    /// Character number of the first tile
    #[arg(long, default_value_t = 0)]
    tile_offset: usize,

    /// Maximum number of tiles
    #[arg(long, default_value_t = 1024)]
    max_tiles: usize,

    /// Palette number of the first sub-palette
    #[arg(long, default_value_t = 0)]
    palette_offset: usize,

    /// Maximum number of sub-palettes
    #[arg(long, default_value_t = 8)]
    max_palettes: usize,

    /// Tilemap priority bit
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    order: u8,

    /// Print diagnostics while converting
    #[arg(short, long)]
    verbose: bool,

    /// Format of the output files
    #[arg(long, value_enum, default_value_t = OutputFormat::Bin)]
    format: OutputFormat,

    /// Also write a JSON summary of the conversion
    #[arg(long)]
    json: Option<PathBuf>,

    /// Also write a PNG rendering of the converted image
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Indexed PNG to convert
    input: PathBuf,

    /// Tileset output file
    tileset: PathBuf,

    /// Tilemap output file
    tilemap: PathBuf,

    /// Palette output file
    palette: PathBuf,
}

fn parse_bit_depth(s: &str) -> Result<BitDepth, String> {
    let bits: u8 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    BitDepth::try_from(bits).map_err(|e| e.to_string())
}

impl Args {
    fn config(&self) -> Config {
        Config {
            bit_depth: self.bpp,
            tile_offset: self.tile_offset,
            max_tiles: self.max_tiles,
            palette_offset: self.palette_offset,
            max_palettes: self.max_palettes,
            order: self.order == 1,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut converter = Image2Snes::new(args.config())?;
    let image = load::load_indexed_png(&args.input)?;
    info!(
        "{}: {}x{} pixels, {} colors",
        args.input.display(),
        image.width(),
        image.height(),
        image.palette().len()
    );

    converter
        .process(&image)
        .with_context(|| format!("cannot convert {}", args.input.display()))?;

    // Everything is serialized before any file is touched.
    let tileset = converter.tileset_data();
    let tilemap = converter.tilemap_data();
    let palette = converter.palette_data();

    info!(
        "{} tiles, {} palettes, {}x{} maps",
        converter.tileset().len(),
        converter.n_palettes(),
        converter.tilemap().width_in_maps(),
        converter.tilemap().height_in_maps()
    );

    output::write_data(&args.tileset, &tileset, args.format)?;
    output::write_data(&args.tilemap, &tilemap, args.format)?;
    output::write_data(&args.palette, &palette, args.format)?;

    if let Some(path) = &args.json {
        let summary = output::Summary::new(&converter, image.width(), image.height());
        output::write_json(path, &summary)?;
    }

    if let Some(path) = &args.preview {
        let preview = output::render_preview(&converter, image.width(), image.height());
        preview
            .save(path)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_options() {
        let args = Args::try_parse_from([
            "img2snes",
            "--bpp",
            "2",
            "--tile-offset",
            "32",
            "--max-palettes",
            "4",
            "--order",
            "1",
            "in.png",
            "tiles.bin",
            "map.bin",
            "pal.bin",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(config.bit_depth, BitDepth::Bpp2);
        assert_eq!(config.tile_offset, 32);
        assert_eq!(config.max_tiles, 1024);
        assert_eq!(config.max_palettes, 4);
        assert!(config.order);
        assert_eq!(args.format, OutputFormat::Bin);
    }

    #[test]
    fn rejects_bad_bit_depth() {
        let result = Args::try_parse_from(["img2snes", "--bpp", "5", "a", "b", "c", "d"]);
        assert!(result.is_err());
    }

    #[test]
    fn bpp_is_required() {
        assert!(Args::try_parse_from(["img2snes", "a", "b", "c", "d"]).is_err());
    }
}
