//! SNES planar tile encoding.
//!
//! Each 8x8 tile is stored as bitplanes, one byte per row per plane, with the
//! pixel at x = 0 in the most significant bit. Planes are interleaved in pairs:
//! for plane pair p the 16 bytes at offset 16p hold plane 2p and plane 2p+1
//! alternating row by row. When the depth is odd the last, unpaired plane
//! follows as 8 contiguous row bytes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tile::{Tile16, Tile8, TILE_SIZE};

/// Bits per pixel supported by the SNES character formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitDepth {
    Bpp1,
    Bpp2,
    Bpp3,
    Bpp4,
    Bpp8,
}

impl BitDepth {
    pub const ALL: [BitDepth; 5] = [
        BitDepth::Bpp1,
        BitDepth::Bpp2,
        BitDepth::Bpp3,
        BitDepth::Bpp4,
        BitDepth::Bpp8,
    ];

    pub fn bits(self) -> usize {
        match self {
            BitDepth::Bpp1 => 1,
            BitDepth::Bpp2 => 2,
            BitDepth::Bpp3 => 3,
            BitDepth::Bpp4 => 4,
            BitDepth::Bpp8 => 8,
        }
    }

    /// Number of entries in one hardware palette at this depth, including slot 0.
    pub fn colors_per_palette(self) -> usize {
        1 << self.bits()
    }

    /// Size in bytes of one encoded 8x8 tile.
    pub fn bytes_per_tile(self) -> usize {
        TILE_SIZE * self.bits()
    }

    /// Largest pixel value representable at this depth.
    pub fn pixel_mask(self) -> u8 {
        ((1u16 << self.bits()) - 1) as u8
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(BitDepth::Bpp1),
            2 => Ok(BitDepth::Bpp2),
            3 => Ok(BitDepth::Bpp3),
            4 => Ok(BitDepth::Bpp4),
            8 => Ok(BitDepth::Bpp8),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(value: BitDepth) -> Self {
        value.bits() as u8
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bpp", self.bits())
    }
}

#[inline]
fn plane_row(tile: &Tile8, y: usize, plane: usize) -> u8 {
    tile.pixels[y]
        .iter()
        .enumerate()
        .fold(0, |acc, (x, &p)| acc | (((p >> plane) & 1) << (7 - x)))
}

#[inline]
fn apply_plane_row(tile: &mut Tile8, y: usize, plane: usize, byte: u8) {
    for x in 0..TILE_SIZE {
        tile.pixels[y][x] |= ((byte >> (7 - x)) & 1) << plane;
    }
}

fn encode_tile(tile: &Tile8, bit_depth: BitDepth, out: &mut Vec<u8>) {
    let planes = bit_depth.bits();
    let mask = bit_depth.pixel_mask();
    let tile = tile.map(|p| p & mask);

    for pair in 0..planes / 2 {
        for y in 0..TILE_SIZE {
            out.push(plane_row(&tile, y, pair * 2));
            out.push(plane_row(&tile, y, pair * 2 + 1));
        }
    }
    if planes % 2 == 1 {
        for y in 0..TILE_SIZE {
            out.push(plane_row(&tile, y, planes - 1));
        }
    }
}

fn decode_tile(data: &[u8], bit_depth: BitDepth) -> Tile8 {
    let planes = bit_depth.bits();
    let mut tile = Tile8::new();

    for pair in 0..planes / 2 {
        let base = pair * 16;
        for y in 0..TILE_SIZE {
            apply_plane_row(&mut tile, y, pair * 2, data[base + y * 2]);
            apply_plane_row(&mut tile, y, pair * 2 + 1, data[base + y * 2 + 1]);
        }
    }
    if planes % 2 == 1 {
        let base = (planes / 2) * 16;
        for y in 0..TILE_SIZE {
            apply_plane_row(&mut tile, y, planes - 1, data[base + y]);
        }
    }
    tile
}

/// Encodes tiles into the SNES planar format. Pixel values are masked to the depth.
pub fn encode_tiles(tiles: &[Tile8], bit_depth: BitDepth) -> Vec<u8> {
    let mut out = Vec::with_capacity(tiles.len() * bit_depth.bytes_per_tile());
    for tile in tiles {
        encode_tile(tile, bit_depth, &mut out);
    }
    out
}

pub fn decode_tiles(data: &[u8], bit_depth: BitDepth) -> Result<Vec<Tile8>> {
    let unit = bit_depth.bytes_per_tile();
    if data.len() % unit != 0 {
        return Err(Error::MalformedData {
            len: data.len(),
            unit,
        });
    }
    Ok(data
        .chunks_exact(unit)
        .map(|chunk| decode_tile(chunk, bit_depth))
        .collect())
}

/// Encodes 16px tiles as four consecutive 4bpp tiles (TL, TR, BL, BR).
pub fn encode_tile16_4bpp(tiles: &[Tile16]) -> Vec<u8> {
    let small: Vec<Tile8> = tiles.iter().flat_map(|t| t.quadrants()).collect();
    encode_tiles(&small, BitDepth::Bpp4)
}

pub fn decode_tile16_4bpp(data: &[u8]) -> Result<Vec<Tile16>> {
    let unit = BitDepth::Bpp4.bytes_per_tile() * 4;
    if data.len() % unit != 0 {
        return Err(Error::MalformedData {
            len: data.len(),
            unit,
        });
    }
    let small = decode_tiles(data, BitDepth::Bpp4)?;
    Ok(small
        .chunks_exact(4)
        .map(|q| Tile16::from_quadrants(&[q[0], q[1], q[2], q[3]]))
        .collect())
}
