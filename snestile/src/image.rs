//! Indexed-color image input.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tile::{Tile8, TILE_SIZE};

/// An 8-bit per channel color from the source image palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 0xff }
    }
}

/// A palette-mapped image: one palette index per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    palette: Vec<Rgba>,
    pixels: Vec<u8>,
}

impl IndexedImage {
    /// Validates and wraps decoded image data.
    pub fn new(width: u32, height: u32, palette: Vec<Rgba>, pixels: Vec<u8>) -> Result<Self> {
        if palette.is_empty() || palette.len() > 256 {
            return Err(Error::InvalidImage(format!(
                "palette has {} colors (expected 1 to 256)",
                palette.len()
            )));
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!("image is empty ({}x{})", width, height)));
        }
        if pixels.len() != width as usize * height as usize {
            return Err(Error::InvalidImage(format!(
                "{} pixels supplied for a {}x{} image",
                pixels.len(),
                width,
                height
            )));
        }
        if let Some(&bad) = pixels.iter().find(|&&p| p as usize >= palette.len()) {
            return Err(Error::InvalidImage(format!(
                "pixel index {} is outside the {} color palette",
                bad,
                palette.len()
            )));
        }

        Ok(IndexedImage {
            width,
            height,
            palette,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn palette(&self) -> &[Rgba] {
        &self.palette
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Copies the 8x8 tile whose top-left pixel is at (`tile_x * 8`, `tile_y * 8`).
    ///
    /// The tile must lie fully inside the image.
    pub fn tile(&self, tile_x: u32, tile_y: u32) -> Tile8 {
        let mut tile = Tile8::new();
        let base_x = tile_x * TILE_SIZE as u32;
        let base_y = tile_y * TILE_SIZE as u32;
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                tile.pixels[y][x] = self.pixel(base_x + x as u32, base_y + y as u32);
            }
        }
        tile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_pixels() {
        let palette = vec![Rgba::rgb(0, 0, 0), Rgba::rgb(255, 255, 255)];
        let err = IndexedImage::new(2, 1, palette, vec![0, 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn rejects_wrong_pixel_count() {
        let err = IndexedImage::new(2, 2, vec![Rgba::default()], vec![0; 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn rejects_empty_palette() {
        let err = IndexedImage::new(1, 1, vec![], vec![0]).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn rejects_empty_image() {
        for (width, height) in [(0, 0), (0, 8), (8, 0)] {
            let err = IndexedImage::new(width, height, vec![Rgba::default()], vec![]).unwrap_err();
            assert!(matches!(err, Error::InvalidImage(_)), "{width}x{height}");
            assert_eq!(err.kind(), crate::error::ErrorKind::InputFormat);
        }
    }

    #[test]
    fn extracts_tiles() {
        let palette = (0..4).map(|i| Rgba::rgb(i * 40, 0, 0)).collect();
        let pixels = (0..16 * 8).map(|i| ((i % 16) / 8 + (i / 16) % 2) as u8).collect();
        let image = IndexedImage::new(16, 8, palette, pixels).unwrap();
        let left = image.tile(0, 0);
        let right = image.tile(1, 0);
        assert_eq!(left.pixel(0, 0), 0);
        assert_eq!(left.pixel(0, 1), 1);
        assert_eq!(right.pixel(0, 0), 1);
        assert_eq!(right.pixel(7, 1), 2);
    }
}
