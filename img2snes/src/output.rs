//! Writing conversion results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use image::RgbImage;
use serde::Serialize;
use snestile::{Config, Image2Snes};

/// Number of 16-bit words per line in hex output
const WORDS_PER_LINE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw binary, as loaded into VRAM/CGRAM
    Bin,
    /// Whitespace separated 16-bit hex words
    Hex,
}

/// Writes little-endian 16-bit words as hex text, `WORDS_PER_LINE` per line.
pub fn write_hex_words<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    for line in data.chunks(WORDS_PER_LINE * 2) {
        let words: Vec<String> = line
            .chunks(2)
            .map(|w| match w {
                [lo, hi] => hex::encode([*hi, *lo]),
                _ => hex::encode(w),
            })
            .collect();
        writeln!(out, "{}", words.join(" "))?;
    }
    Ok(())
}

pub fn write_data(path: &Path, data: &[u8], format: OutputFormat) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let written = match format {
        OutputFormat::Bin => file.write_all(data),
        OutputFormat::Hex => write_hex_words(&mut file, data),
    };
    written.with_context(|| format!("cannot write {}", path.display()))
}

/// Summary of a conversion, for the JSON report
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub config: &'a Config,
    pub image_width: u32,
    pub image_height: u32,
    pub tiles: usize,
    pub palettes: usize,
    pub maps_wide: usize,
    pub maps_high: usize,
}

impl<'a> Summary<'a> {
    pub fn new(converter: &'a Image2Snes, image_width: u32, image_height: u32) -> Self {
        Summary {
            config: converter.config(),
            image_width,
            image_height,
            tiles: converter.tileset().len(),
            palettes: converter.n_palettes(),
            maps_wide: converter.tilemap().width_in_maps(),
            maps_high: converter.tilemap().height_in_maps(),
        }
    }
}

pub fn write_json(path: &Path, summary: &Summary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

/// Renders the converted image back to RGB, as the SNES would show it.
pub fn render_preview(converter: &Image2Snes, width: u32, height: u32) -> RgbImage {
    let colors = converter.render();
    RgbImage::from_fn(width, height, |x, y| {
        let (r, g, b) = colors[(y * width + x) as usize].to_rgb();
        image::Rgb([r, g, b])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_words_are_big_endian_text() {
        let mut out = Vec::new();
        write_hex_words(&mut out, &[0x34, 0x12, 0xff, 0x7f]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1234 7fff\n");
    }

    #[test]
    fn hex_lines_wrap() {
        let mut out = Vec::new();
        write_hex_words(&mut out, &[0; 34]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(' ').count(), 16);
        assert_eq!(lines[1], "0000");
    }
}
