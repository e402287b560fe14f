//! Combining small tiles into large ones.
//!
//! Sprite frames draw from a pool of 8px tiles, but VRAM is cheapest to fill
//! with 16px blocks. Tiles that are used by the same frames are grouped so a
//! frame loads as few blocks as possible: first into pairs, then pairs into
//! quads. Greedy, so the grouping is good but not optimal.

use std::cmp::Reverse;

use itertools::Itertools;
use log::debug;

use crate::error::{Error, Result};
use crate::tile::{Tile16, Tile8};

/// Score for a frame both tiles appear in.
const SHARED_FRAME_SCORE: i64 = 3;
/// Score for a frame only the candidate appears in.
const UNSHARED_FRAME_SCORE: i64 = -1;

/// Small tile ids in top-left, top-right, bottom-left, bottom-right order.
pub type SmallTileQuad = [Option<usize>; 4];

/// Which frames use each tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGraph {
    /// Sorted, deduplicated frame ids per tile.
    usage: Vec<Vec<usize>>,
}

impl TileGraph {
    /// Builds the graph from the tiles each frame uses.
    ///
    /// Tiles `0..n_tiles` are always present, used or not. A frame using a
    /// tile outside that range is rejected.
    pub fn new(n_tiles: usize, frames: &[Vec<usize>]) -> Result<Self> {
        let mut usage = vec![Vec::new(); n_tiles];
        for (frame, tiles) in frames.iter().enumerate() {
            for &tile in tiles.iter().unique() {
                let Some(used_by) = usage.get_mut(tile) else {
                    return Err(Error::UnknownTile { frame, tile, n_tiles });
                };
                used_by.push(frame);
            }
        }
        Ok(TileGraph { usage })
    }

    pub fn n_tiles(&self) -> usize {
        self.usage.len()
    }

    pub fn frames(&self, tile: usize) -> &[usize] {
        &self.usage[tile]
    }
}

/// Output of [`combine_small_tiles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedSmallTiles {
    pub quads: Vec<SmallTileQuad>,
    /// For every small tile, its quad and quadrant.
    pub positions: Vec<(usize, usize)>,
}

fn shared_count(a: &[usize], b: &[usize]) -> usize {
    a.iter().filter(|f| b.binary_search(f).is_ok()).count()
}

/// Pairs nodes that share frames, most popular first.
fn pair_greedily(usage: &[Vec<usize>]) -> Vec<(usize, Option<usize>)> {
    let order: Vec<usize> = (0..usage.len())
        .sorted_by_key(|&i| (Reverse(usage[i].len()), i))
        .collect();
    let mut used = vec![false; usage.len()];
    let mut pairs = Vec::with_capacity(usage.len().div_ceil(2));

    for &first in order.iter() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let mut best: Option<(i64, usize)> = None;
        for &candidate in order.iter().filter(|&&c| !used[c]) {
            let shared = shared_count(&usage[first], &usage[candidate]);
            let unshared = usage[candidate].len() - shared;
            let score = shared as i64 * SHARED_FRAME_SCORE + unshared as i64 * UNSHARED_FRAME_SCORE;
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, candidate));
            }
        }

        let partner = best.map(|(_, c)| c);
        if let Some(c) = partner {
            used[c] = true;
        }
        pairs.push((first, partner));
    }
    pairs
}

/// Groups small tiles into quads of tiles that are used together.
pub fn combine_small_tiles(graph: &TileGraph) -> CombinedSmallTiles {
    let pairs = pair_greedily(&graph.usage);

    let pair_usage: Vec<Vec<usize>> = pairs
        .iter()
        .map(|&(a, b)| match b {
            Some(b) => graph.usage[a]
                .iter()
                .merge(graph.usage[b].iter())
                .dedup()
                .copied()
                .collect(),
            None => graph.usage[a].clone(),
        })
        .collect();

    let quads: Vec<SmallTileQuad> = pair_greedily(&pair_usage)
        .into_iter()
        .map(|(top, bottom)| {
            let (tl, tr) = pairs[top];
            let (bl, br) = match bottom {
                Some(b) => (Some(pairs[b].0), pairs[b].1),
                None => (None, None),
            };
            [Some(tl), tr, bl, br]
        })
        .collect();

    let mut positions = vec![(0, 0); graph.n_tiles()];
    for (q, quad) in quads.iter().enumerate() {
        for (quadrant, tile) in quad.iter().enumerate() {
            if let Some(tile) = tile {
                positions[*tile] = (q, quadrant);
            }
        }
    }

    debug!(
        "combined {} small tiles into {} pairs and {} quads",
        graph.n_tiles(),
        pairs.len(),
        quads.len()
    );

    CombinedSmallTiles { quads, positions }
}

/// Assembles each quad into a 16px tile. Empty or unknown quadrants are blank.
pub fn build_large_tiles(combined: &CombinedSmallTiles, small_tiles: &[Tile8]) -> Vec<Tile16> {
    combined
        .quads
        .iter()
        .map(|quad| {
            let quadrants =
                quad.map(|id| id.and_then(|id| small_tiles.get(id).copied()).unwrap_or_default());
            Tile16::from_quadrants(&quadrants)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_records_frames_per_tile() {
        let graph = TileGraph::new(4, &[vec![0, 1, 1], vec![1, 2]]).unwrap();
        assert_eq!(graph.n_tiles(), 4);
        assert_eq!(graph.frames(0), &[0]);
        assert_eq!(graph.frames(1), &[0, 1]);
        assert_eq!(graph.frames(2), &[1]);
        assert!(graph.frames(3).is_empty());
    }

    #[test]
    fn rejects_frames_using_unknown_tiles() {
        let err = TileGraph::new(4, &[vec![0], vec![1, 4]]).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownTile {
                frame: 1,
                tile: 4,
                n_tiles: 4
            }
        );

        // must not overflow or try to allocate a graph that large
        let err = TileGraph::new(2, &[vec![usize::MAX]]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InputFormat);
    }

    #[test]
    fn tiles_used_together_share_a_pair() {
        let graph = TileGraph::new(4, &[vec![0, 1], vec![0, 1], vec![2], vec![3]]).unwrap();
        let combined = combine_small_tiles(&graph);
        assert_eq!(combined.quads, vec![[Some(0), Some(1), Some(2), Some(3)]]);
        assert_eq!(combined.positions[2], (0, 2));
    }

    #[test]
    fn prefers_most_shared_partner() {
        let frames = vec![vec![0, 2], vec![0, 2], vec![0, 1], vec![1], vec![1]];
        let graph = TileGraph::new(3, &frames).unwrap();
        let combined = combine_small_tiles(&graph);
        assert_eq!(combined.quads, vec![[Some(0), Some(2), Some(1), None]]);
    }

    #[test]
    fn leftover_tiles_form_partial_quads() {
        let graph = TileGraph::new(5, &[vec![0], vec![1], vec![2], vec![3], vec![4]]).unwrap();
        let combined = combine_small_tiles(&graph);
        // the lone fifth tile scores better against (0, 1) than (2, 3) does
        assert_eq!(
            combined.quads,
            vec![
                [Some(0), Some(1), Some(4), None],
                [Some(2), Some(3), None, None]
            ]
        );

        let mut seen: Vec<usize> = combined.quads.iter().flatten().flatten().copied().collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_graph() {
        let combined = combine_small_tiles(&TileGraph::new(0, &[]).unwrap());
        assert!(combined.quads.is_empty());
        assert!(combined.positions.is_empty());
    }

    #[test]
    fn large_tiles_from_quads() {
        let tiles: Vec<Tile8> = (1..=3u8).map(|v| Tile8::from_pixels([[v; 8]; 8])).collect();
        let combined = CombinedSmallTiles {
            quads: vec![[Some(2), None, Some(0), Some(1)]],
            positions: vec![(0, 2), (0, 3), (0, 0)],
        };
        let large = build_large_tiles(&combined, &tiles);
        assert_eq!(large.len(), 1);
        assert_eq!(large[0].pixel(0, 0), 3);
        assert_eq!(large[0].pixel(8, 0), 0);
        assert_eq!(large[0].pixel(0, 8), 1);
        assert_eq!(large[0].pixel(15, 15), 2);
    }
}
