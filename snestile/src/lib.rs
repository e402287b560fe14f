//! Conversion of indexed images into SNES tiles, palettes and tilemaps.
//!
//! [`Image2Snes`] drives the whole conversion; the codecs, the tile
//! deduplicator, the palette rearranger and the small tile combiner are usable
//! on their own.

pub mod error;
pub mod image;
pub mod image2snes;
pub mod palette_rearranger;
pub mod small_tiles;
pub mod snes_color;
pub mod tile;
pub mod tile_codec;
pub mod tilemap;
pub mod tileset_inserter;

pub use error::{Error, ErrorKind, Result};
pub use image::{IndexedImage, Rgba};
pub use image2snes::{Config, Image2Snes};
pub use snes_color::SnesColor;
pub use tile::{Tile, Tile16, Tile8};
pub use tile_codec::BitDepth;
pub use tilemap::{Tilemap, TilemapEntry};
pub use tileset_inserter::{TilesetEntry, TilesetInserter};
