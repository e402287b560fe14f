//! Tile deduplication.
//!
//! A tile and its horizontally, vertically and doubly flipped variants all map
//! to the same tileset entry, with the flip flags needed to reproduce it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::tile::Tile8;

/// A reference to a tileset tile, drawn with the given flips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TilesetEntry {
    pub tile_id: usize,
    pub hflip: bool,
    pub vflip: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TilesetInserter {
    tileset: Vec<Tile8>,
    lookup: HashMap<Tile8, TilesetEntry>,
}

impl TilesetInserter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tileset(&self) -> &[Tile8] {
        &self.tileset
    }

    pub fn into_tileset(self) -> Vec<Tile8> {
        self.tileset
    }

    pub fn len(&self) -> usize {
        self.tileset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tileset.is_empty()
    }

    /// The pixels an entry draws, flips applied.
    pub fn tile(&self, entry: &TilesetEntry) -> Tile8 {
        self.tileset[entry.tile_id].flip(entry.hflip, entry.vflip)
    }

    /// Returns the entry matching `tile` in any orientation, appending it if absent.
    pub fn get_or_insert(&mut self, tile: &Tile8) -> TilesetEntry {
        if let Some(entry) = self.lookup.get(tile) {
            return *entry;
        }
        self.insert(tile)
    }

    fn insert(&mut self, tile: &Tile8) -> TilesetEntry {
        let tile_id = self.tileset.len();
        self.tileset.push(*tile);

        // A symmetric tile has coinciding orientations, the first registration wins.
        for (oriented, hflip, vflip) in tile.orientations() {
            if let Entry::Vacant(slot) = self.lookup.entry(oriented) {
                slot.insert(TilesetEntry {
                    tile_id,
                    hflip,
                    vflip,
                });
            }
        }

        TilesetEntry {
            tile_id,
            hflip: false,
            vflip: false,
        }
    }

    /// Matches a tile whose pixels are partly hidden.
    ///
    /// Pixels where `mask` is non-zero are don't-care. An existing tile is a
    /// candidate when every other pixel matches exactly; among candidates the
    /// one with the most equal pixels wins, the first found on a tie. Returns
    /// the match and `true`, or inserts `tile` and returns `false`.
    pub fn process_overlapped_tile(&mut self, tile: &Tile8, mask: &Tile8) -> (TilesetEntry, bool) {
        let mut best: Option<(usize, TilesetEntry)> = None;

        for (tile_id, existing) in self.tileset.iter().enumerate() {
            for (oriented, hflip, vflip) in existing.orientations() {
                if let Some(score) = overlap_score(tile, mask, &oriented) {
                    if best.map_or(true, |(s, _)| score > s) {
                        best = Some((
                            score,
                            TilesetEntry {
                                tile_id,
                                hflip,
                                vflip,
                            },
                        ));
                    }
                }
            }
        }

        match best {
            Some((_, entry)) => (entry, true),
            None => (self.get_or_insert(tile), false),
        }
    }
}

fn overlap_score(tile: &Tile8, mask: &Tile8, candidate: &Tile8) -> Option<usize> {
    let mut score = 0;
    for ((p, m), c) in tile.iter().zip(mask.iter()).zip(candidate.iter()) {
        if p == c {
            score += 1;
        } else if m == 0 {
            return None;
        }
    }
    Some(score)
}
