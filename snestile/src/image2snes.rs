//! Image to SNES background conversion.
//!
//! Turns an indexed image into a tileset, a set of sub-palettes and a tilemap
//! that reproduce it on the SNES PPU.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::IndexedImage;
use crate::palette_rearranger::rearrange_palette;
use crate::snes_color::{encode_palette, SnesColor};
use crate::tile::{Tile8, TILE_SIZE};
use crate::tile_codec::{encode_tiles, BitDepth};
use crate::tilemap::{Tilemap, TilemapEntry, MAX_CHARACTER, MAX_PALETTE};
use crate::tileset_inserter::{TilesetEntry, TilesetInserter};

/// Parameters for one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bits per pixel of the output tiles
    pub bit_depth: BitDepth,
    /// Character number of the first output tile
    pub tile_offset: usize,
    /// Maximum number of tiles the conversion may produce
    pub max_tiles: usize,
    /// Palette number of the first output sub-palette
    pub palette_offset: usize,
    /// Maximum number of sub-palettes the conversion may produce
    pub max_palettes: usize,
    /// Priority bit written to every tilemap cell
    pub order: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bit_depth: BitDepth::Bpp4,
            tile_offset: 0,
            max_tiles: MAX_CHARACTER + 1,
            palette_offset: 0,
            max_palettes: MAX_PALETTE + 1,
            order: false,
        }
    }
}

impl Config {
    /// Checks the parameters against the tilemap cell limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_tiles == 0 {
            return Err(Error::InvalidConfig("maxTiles must be at least 1".into()));
        }
        let tiles_end = self.tile_offset.checked_add(self.max_tiles);
        if tiles_end.map_or(true, |end| end > MAX_CHARACTER + 1) {
            return Err(Error::InvalidConfig(format!(
                "tileOffset + maxTiles ({} + {}) exceeds {}",
                self.tile_offset,
                self.max_tiles,
                MAX_CHARACTER + 1
            )));
        }
        if self.max_palettes == 0 {
            return Err(Error::InvalidConfig("maxPalettes must be at least 1".into()));
        }
        let palettes_end = self.palette_offset.checked_add(self.max_palettes);
        if palettes_end.map_or(true, |end| end > MAX_PALETTE + 1) {
            return Err(Error::InvalidConfig(format!(
                "paletteOffset + maxPalettes ({} + {}) exceeds {}",
                self.palette_offset,
                self.max_palettes,
                MAX_PALETTE + 1
            )));
        }
        Ok(())
    }

    /// Usable colors in each sub-palette; slot 0 is transparent.
    pub fn colors_per_palette(&self) -> usize {
        self.bit_depth.colors_per_palette() - 1
    }
}

/// Converts indexed images into SNES tiles, palettes and tilemaps.
///
/// Outputs are only replaced when [`Image2Snes::process`] succeeds.
#[derive(Debug, Clone)]
pub struct Image2Snes {
    config: Config,
    image_width: u32,
    image_height: u32,
    palette: Vec<SnesColor>,
    n_palettes: usize,
    tileset: Vec<Tile8>,
    tilemap: Tilemap,
}

impl Image2Snes {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Image2Snes {
            config,
            image_width: 0,
            image_height: 0,
            palette: Vec::new(),
            n_palettes: 0,
            tileset: Vec::new(),
            tilemap: Tilemap::new(0, 0),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// All sub-palettes back to back, `2^bpp` colors each.
    pub fn palette(&self) -> &[SnesColor] {
        &self.palette
    }

    pub fn n_palettes(&self) -> usize {
        self.n_palettes
    }

    pub fn tileset(&self) -> &[Tile8] {
        &self.tileset
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn palette_data(&self) -> Vec<u8> {
        encode_palette(&self.palette)
    }

    pub fn tileset_data(&self) -> Vec<u8> {
        encode_tiles(&self.tileset, self.config.bit_depth)
    }

    pub fn tilemap_data(&self) -> Vec<u8> {
        self.tilemap.snes_data()
    }

    /// Runs the whole conversion.
    pub fn process(&mut self, image: &IndexedImage) -> Result<()> {
        if image.width() % TILE_SIZE as u32 != 0 || image.height() % TILE_SIZE as u32 != 0 {
            return Err(Error::InvalidImageSize {
                width: image.width(),
                height: image.height(),
            });
        }

        let mut tilemap = Tilemap::covering(
            (image.width() / TILE_SIZE as u32) as usize,
            (image.height() / TILE_SIZE as u32) as usize,
        );
        let tiles = extract_tiles(image, &tilemap);
        debug!(
            "extracted {} tiles into {}x{} maps",
            tiles.len(),
            tilemap.width_in_maps(),
            tilemap.height_in_maps()
        );

        let palette = build_palette(image);
        let (palette, tiles) = remove_duplicate_colors(&palette, &tiles);
        debug!("{} unique colors", palette.len());

        let rearranged = rearrange_palette(
            &palette,
            &tiles,
            self.config.colors_per_palette(),
            self.config.max_palettes,
        )?;

        let mut inserter = TilesetInserter::new();
        if rearranged.tiles.iter().any(Tile8::is_blank) {
            inserter.get_or_insert(&Tile8::new());
        }
        let entries: Vec<TilesetEntry> = rearranged
            .tiles
            .iter()
            .map(|tile| inserter.get_or_insert(tile))
            .collect();
        debug!("{} unique tiles", inserter.len());

        if inserter.len() > self.config.max_tiles {
            return Err(Error::TooManyTiles {
                required: inserter.len(),
                available: self.config.max_tiles,
            });
        }

        let width = tilemap.width();
        for (i, (entry, &palette_id)) in entries.iter().zip(rearranged.tile_palettes.iter()).enumerate() {
            tilemap.set(
                i % width,
                i / width,
                TilemapEntry::new(
                    (self.config.tile_offset + entry.tile_id) as u16,
                    (self.config.palette_offset + palette_id as usize) as u16,
                    self.config.order,
                    entry.hflip,
                    entry.vflip,
                ),
            );
        }

        self.image_width = image.width();
        self.image_height = image.height();
        self.palette = rearranged.palette;
        self.n_palettes = rearranged.n_palettes;
        self.tileset = inserter.into_tileset();
        self.tilemap = tilemap;
        Ok(())
    }

    /// Draws the converted image back from the tilemap, tileset and palette.
    ///
    /// Returns one color per source pixel, row-major.
    pub fn render(&self) -> Vec<SnesColor> {
        let palette_size = self.config.bit_depth.colors_per_palette();
        let mut out = Vec::with_capacity((self.image_width * self.image_height) as usize);

        for y in 0..self.image_height as usize {
            for x in 0..self.image_width as usize {
                let cell = self.tilemap.get(x / TILE_SIZE, y / TILE_SIZE);
                let tile_id = cell.character() as usize - self.config.tile_offset;
                let palette_id = cell.palette() as usize - self.config.palette_offset;
                let tile = self.tileset[tile_id].flip(cell.hflip(), cell.vflip());
                let index = tile.pixel(x % TILE_SIZE, y % TILE_SIZE) as usize;
                out.push(self.palette[palette_id * palette_size + index]);
            }
        }
        out
    }
}

/// Cuts the image into tiles in tilemap cell order, padding with blank tiles.
fn extract_tiles(image: &IndexedImage, tilemap: &Tilemap) -> Vec<Tile8> {
    let tiles_wide = image.width() as usize / TILE_SIZE;
    let tiles_high = image.height() as usize / TILE_SIZE;
    let mut tiles = Vec::with_capacity(tilemap.width() * tilemap.height());

    for y in 0..tilemap.height() {
        for x in 0..tilemap.width() {
            if x < tiles_wide && y < tiles_high {
                tiles.push(image.tile(x as u32, y as u32));
            } else {
                tiles.push(Tile8::new());
            }
        }
    }
    tiles
}

fn build_palette(image: &IndexedImage) -> Vec<SnesColor> {
    image.palette().iter().map(|&c| SnesColor::from(c)).collect()
}

/// Folds repeated palette entries into their first occurrence and compacts the palette.
///
/// Slot 0 is the transparent color and never takes part.
fn remove_duplicate_colors(palette: &[SnesColor], tiles: &[Tile8]) -> (Vec<SnesColor>, Vec<Tile8>) {
    let Some((&transparent, rest)) = palette.split_first() else {
        return (Vec::new(), tiles.to_vec());
    };

    let mut colors = vec![transparent];
    let mut remap = vec![0u8; palette.len()];
    for (i, color) in rest.iter().enumerate() {
        let index = match colors[1..].iter().position(|c| c == color) {
            Some(existing) => existing + 1,
            None => {
                colors.push(*color);
                colors.len() - 1
            }
        };
        remap[i + 1] = index as u8;
    }

    if colors.len() == palette.len() {
        return (colors, tiles.to_vec());
    }
    let tiles = tiles
        .iter()
        .map(|tile| tile.map(|p| remap[p as usize]))
        .collect();
    (colors, tiles)
}
