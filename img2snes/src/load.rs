//! Reading indexed PNG images.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use png::{ColorType, Transformations};
use snestile::{IndexedImage, Rgba};

/// Loads a palette-mapped PNG without expanding it to true color.
pub fn load_indexed_png(path: &Path) -> Result<IndexedImage> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    decode_indexed_png(BufReader::new(file)).with_context(|| format!("cannot load {}", path.display()))
}

pub fn decode_indexed_png<R: BufRead + Read>(reader: R) -> Result<IndexedImage> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    if frame.color_type != ColorType::Indexed {
        bail!("image is not indexed (color type {:?})", frame.color_type);
    }

    let info = reader.info();
    let Some(raw_palette) = info.palette.as_ref() else {
        bail!("indexed image has no palette");
    };
    let alpha = info.trns.as_deref().unwrap_or(&[]);
    let palette: Vec<Rgba> = raw_palette
        .chunks_exact(3)
        .enumerate()
        .map(|(i, rgb)| Rgba::new(rgb[0], rgb[1], rgb[2], alpha.get(i).copied().unwrap_or(0xff)))
        .collect();

    let bits = frame.bit_depth as usize;
    ensure!(matches!(bits, 1 | 2 | 4 | 8), "unsupported png bit depth {}", bits);
    let mask = ((1u16 << bits) - 1) as u8;

    let (width, height) = (frame.width as usize, frame.height as usize);
    let mut pixels = Vec::with_capacity(width * height);
    for row in buffer.chunks_exact(frame.line_size).take(height) {
        for x in 0..width {
            let bit = x * bits;
            let shift = 8 - bits - bit % 8;
            pixels.push((row[bit / 8] >> shift) & mask);
        }
    }

    Ok(IndexedImage::new(frame.width, frame.height, palette, pixels)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32, depth: png::BitDepth, palette: &[u8], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(ColorType::Indexed);
            encoder.set_depth(depth);
            encoder.set_palette(palette.to_vec());
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn reads_8bit_indexed() {
        let palette = [0, 0, 0, 255, 0, 0, 0, 255, 0];
        let data: Vec<u8> = (0..16).map(|i| (i % 3) as u8).collect();
        let png = encode_png(4, 4, png::BitDepth::Eight, &palette, &data);

        let image = decode_indexed_png(Cursor::new(png)).unwrap();
        assert_eq!((image.width(), image.height()), (4, 4));
        assert_eq!(image.pixels(), data.as_slice());
        assert_eq!(image.palette()[1], Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn unpacks_low_bit_depths() {
        let palette = [0, 0, 0, 8, 8, 8, 16, 16, 16, 24, 24, 24];
        // 2bpp, 4 pixels per byte: rows [0 1 2 3 3 2 1 0] and [3 3 3 3 0 0 0 0]
        let data = [0b00_01_10_11, 0b11_10_01_00, 0xff, 0x00];
        let png = encode_png(8, 2, png::BitDepth::Two, &palette, &data);

        let image = decode_indexed_png(Cursor::new(png)).unwrap();
        assert_eq!(
            image.pixels(),
            &[0, 1, 2, 3, 3, 2, 1, 0, 3, 3, 3, 3, 0, 0, 0, 0]
        );
    }

    #[test]
    fn rejects_true_color() {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 1, 1);
            encoder.set_color(ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 2, 3]).unwrap();
        }
        assert!(decode_indexed_png(Cursor::new(out)).is_err());
    }
}
