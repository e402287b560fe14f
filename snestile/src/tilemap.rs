//! SNES background tilemaps.

use bitfield::bitfield;

use crate::error::{Error, Result};

/// Width and height of one hardware map (screen block), in cells.
pub const MAP_SIZE: usize = 32;

/// Largest character number a tilemap cell can address.
pub const MAX_CHARACTER: usize = 1023;

/// Largest palette number a tilemap cell can address.
pub const MAX_PALETTE: usize = 7;

bitfield! {
    /// One tilemap cell, as stored in VRAM.
    #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TilemapEntry(u16);
    impl Debug;
    u16;

    /// Character (tile) number
    pub character, set_character: 9, 0;

    /// Palette number
    pub palette, set_palette: 12, 10;

    /// Priority ("order") bit
    pub order, set_order: 13;

    pub hflip, set_hflip: 14;
    pub vflip, set_vflip: 15;
}

impl TilemapEntry {
    pub fn new(character: u16, palette: u16, order: bool, hflip: bool, vflip: bool) -> Self {
        let mut entry = TilemapEntry(0);
        entry.set_character(character);
        entry.set_palette(palette);
        entry.set_order(order);
        entry.set_hflip(hflip);
        entry.set_vflip(vflip);
        entry
    }

    pub fn from_data(data: u16) -> Self {
        TilemapEntry(data)
    }

    pub fn data(&self) -> u16 {
        self.0
    }
}

/// A grid of 32x32-cell maps.
///
/// Cells are addressed by global (x, y) coordinates; serialization writes the
/// maps one after another in row-major map order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    width_in_maps: usize,
    height_in_maps: usize,
    cells: Vec<TilemapEntry>,
}

impl Tilemap {
    pub fn new(width_in_maps: usize, height_in_maps: usize) -> Self {
        Tilemap {
            width_in_maps,
            height_in_maps,
            cells: vec![TilemapEntry::default(); width_in_maps * height_in_maps * MAP_SIZE * MAP_SIZE],
        }
    }

    /// The smallest tilemap covering `width` x `height` cells.
    pub fn covering(width: usize, height: usize) -> Self {
        Self::new(width.div_ceil(MAP_SIZE), height.div_ceil(MAP_SIZE))
    }

    pub fn width_in_maps(&self) -> usize {
        self.width_in_maps
    }

    pub fn height_in_maps(&self) -> usize {
        self.height_in_maps
    }

    pub fn n_maps(&self) -> usize {
        self.width_in_maps * self.height_in_maps
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width_in_maps * MAP_SIZE
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height_in_maps * MAP_SIZE
    }

    fn cell_index(&self, x: usize, y: usize) -> usize {
        let map = (y / MAP_SIZE) * self.width_in_maps + x / MAP_SIZE;
        map * MAP_SIZE * MAP_SIZE + (y % MAP_SIZE) * MAP_SIZE + x % MAP_SIZE
    }

    pub fn get(&self, x: usize, y: usize) -> TilemapEntry {
        self.cells[self.cell_index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, entry: TilemapEntry) {
        let i = self.cell_index(x, y);
        self.cells[i] = entry;
    }

    /// Cells of map `index`, row by row.
    pub fn map(&self, index: usize) -> &[TilemapEntry] {
        let n = MAP_SIZE * MAP_SIZE;
        &self.cells[index * n..(index + 1) * n]
    }

    /// Two little-endian bytes per cell, maps in order.
    pub fn snes_data(&self) -> Vec<u8> {
        self.cells.iter().flat_map(|c| c.data().to_le_bytes()).collect()
    }

    pub fn from_snes_data(data: &[u8], width_in_maps: usize) -> Result<Self> {
        let unit = MAP_SIZE * MAP_SIZE * 2 * width_in_maps.max(1);
        if data.is_empty() || data.len() % unit != 0 || width_in_maps == 0 {
            return Err(Error::MalformedData {
                len: data.len(),
                unit,
            });
        }
        let cells = data
            .chunks_exact(2)
            .map(|w| TilemapEntry::from_data(u16::from_le_bytes([w[0], w[1]])))
            .collect();
        Ok(Tilemap {
            width_in_maps,
            height_in_maps: data.len() / unit,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_bit_layout() {
        let entry = TilemapEntry::new(0x3ff, 7, true, true, true);
        assert_eq!(entry.data(), 0xffff);

        let entry = TilemapEntry::new(0x123, 5, false, true, false);
        assert_eq!(entry.data(), 0x123 | (5 << 10) | (1 << 14));
        assert_eq!(entry.character(), 0x123);
        assert_eq!(entry.palette(), 5);
        assert!(entry.hflip());
        assert!(!entry.vflip());
        assert!(!entry.order());

        let entry = TilemapEntry::new(0, 0, true, false, true);
        assert_eq!(entry.data(), 0xa000);
    }

    #[test]
    fn map_major_ordering() {
        let mut tilemap = Tilemap::covering(40, 10);
        assert_eq!((tilemap.width_in_maps(), tilemap.height_in_maps()), (2, 1));

        tilemap.set(1, 0, TilemapEntry::new(1, 0, false, false, false));
        tilemap.set(32, 0, TilemapEntry::new(2, 0, false, false, false));
        tilemap.set(33, 1, TilemapEntry::new(3, 0, false, false, false));

        assert_eq!(tilemap.map(0)[1].character(), 1);
        assert_eq!(tilemap.map(1)[0].character(), 2);
        assert_eq!(tilemap.map(1)[MAP_SIZE + 1].character(), 3);

        let data = tilemap.snes_data();
        assert_eq!(data.len(), 2 * 1024 * 2);
        assert_eq!(&data[2..4], &[1, 0]);
        assert_eq!(&data[2048..2050], &[2, 0]);
    }

    #[test]
    fn snes_data_round_trip() {
        let mut tilemap = Tilemap::new(1, 2);
        tilemap.set(5, 40, TilemapEntry::new(700, 3, true, false, true));
        let decoded = Tilemap::from_snes_data(&tilemap.snes_data(), 1).unwrap();
        assert_eq!(decoded, tilemap);
        assert!(Tilemap::from_snes_data(&[0; 10], 1).is_err());
    }
}
