//! Splitting a large palette into hardware sub-palettes.
//!
//! Every tile may only reference colors from one sub-palette, and slot 0 of
//! each sub-palette is the shared transparent color. Tiles are packed
//! greedily, hungriest first, into groups of at most `colors_per_palette`
//! colors. The packing is a heuristic and does not promise the minimum
//! number of sub-palettes.

use std::cmp::Reverse;

use itertools::Itertools;
use log::debug;

use crate::error::{Error, Result};
use crate::snes_color::SnesColor;
use crate::tile::Tile8;

/// Output of [`rearrange_palette`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RearrangedPalette {
    /// Sub-palettes back to back, each `colors_per_palette + 1` entries long.
    pub palette: Vec<SnesColor>,
    /// The input tiles with pixels rewritten to sub-palette local indices.
    pub tiles: Vec<Tile8>,
    /// Sub-palette of each tile.
    pub tile_palettes: Vec<u8>,
    pub n_palettes: usize,
}

#[derive(Debug, Default)]
struct PaletteGroup {
    /// Global palette indices, in the order they were added.
    colors: Vec<u8>,
}

impl PaletteGroup {
    fn matching(&self, colors: &[u8]) -> usize {
        colors.iter().filter(|c| self.colors.contains(c)).count()
    }

    fn add_missing(&mut self, colors: &[u8]) {
        for &c in colors {
            if !self.colors.contains(&c) {
                self.colors.push(c);
            }
        }
    }

    fn local_index(&self, color: u8) -> u8 {
        match self.colors.iter().position(|&c| c == color) {
            Some(i) => (i + 1) as u8,
            None => 0,
        }
    }
}

/// Distinct non-transparent palette indices used by a tile, ascending.
pub fn tile_colors(tile: &Tile8) -> Vec<u8> {
    tile.iter().filter(|&p| p != 0).sorted().dedup().collect()
}

/// Picks the group a tile joins, or `None` when it should open a new one.
///
/// `Err(())` means no group can take the tile and no new group may be opened.
fn choose_group(
    groups: &[PaletteGroup],
    colors: &[u8],
    colors_per_palette: usize,
    max_palettes: usize,
) -> std::result::Result<Option<usize>, ()> {
    if let Some(g) = groups.iter().position(|g| g.matching(colors) == colors.len()) {
        return Ok(Some(g));
    }

    let fits = |g: &PaletteGroup| g.colors.len() + colors.len() - g.matching(colors) <= colors_per_palette;

    let mut best = None;
    let mut best_matching = 0;
    for (i, g) in groups.iter().enumerate() {
        let matching = g.matching(colors);
        if matching > best_matching && fits(g) {
            best = Some(i);
            best_matching = matching;
        }
    }
    if best.is_some() {
        return Ok(best);
    }

    if groups.len() < max_palettes {
        return Ok(None);
    }

    groups
        .iter()
        .enumerate()
        .filter(|&(_, g)| fits(g))
        .min_by_key(|(_, g)| g.colors.len() + colors.len() - g.matching(colors))
        .map(|(i, _)| Some(i))
        .ok_or(())
}

fn pack_groups(
    tile_colors: &[Vec<u8>],
    colors_per_palette: usize,
    max_palettes: usize,
) -> std::result::Result<(Vec<PaletteGroup>, Vec<usize>), ()> {
    let mut groups: Vec<PaletteGroup> = Vec::new();
    let mut assignment = vec![0; tile_colors.len()];

    let order = (0..tile_colors.len())
        .filter(|&i| !tile_colors[i].is_empty())
        .sorted_by_key(|&i| Reverse(tile_colors[i].len()));

    for i in order {
        let colors = &tile_colors[i];
        let g = match choose_group(&groups, colors, colors_per_palette, max_palettes)? {
            Some(g) => g,
            None => {
                groups.push(PaletteGroup::default());
                groups.len() - 1
            }
        };
        groups[g].add_missing(colors);
        assignment[i] = g;
    }

    Ok((groups, assignment))
}

/// Rearranges `palette` so that every tile fits in one sub-palette.
///
/// Tile pixels index into `palette`, with index 0 transparent; a pixel past
/// the end of `palette` is an [`Error::InvalidImage`].
/// `colors_per_palette` is the number of usable (non-transparent) slots in
/// each sub-palette.
pub fn rearrange_palette(
    palette: &[SnesColor],
    tiles: &[Tile8],
    colors_per_palette: usize,
    max_palettes: usize,
) -> Result<RearrangedPalette> {
    if let Some((tile, pixel)) = tiles
        .iter()
        .enumerate()
        .find_map(|(i, t)| t.iter().find(|&p| p as usize >= palette.len()).map(|p| (i, p)))
    {
        return Err(Error::InvalidImage(format!(
            "tile {} uses color {}, but the palette has {} colors",
            tile,
            pixel,
            palette.len()
        )));
    }

    let palette_size = colors_per_palette + 1;
    let transparent = palette.first().copied().unwrap_or(SnesColor::BLACK);

    if palette.len() <= palette_size {
        debug!("{} colors fit in one palette, no rearranging needed", palette.len());
        let mut out = palette.to_vec();
        out.resize(palette_size, SnesColor::BLACK);
        return Ok(RearrangedPalette {
            palette: out,
            tiles: tiles.to_vec(),
            tile_palettes: vec![0; tiles.len()],
            n_palettes: 1,
        });
    }

    let tile_colors: Vec<Vec<u8>> = tiles.iter().map(tile_colors).collect();
    if let Some((tile, colors)) = tile_colors
        .iter()
        .enumerate()
        .find(|(_, c)| c.len() > colors_per_palette)
    {
        return Err(Error::TooManyTileColors {
            tile,
            required: colors.len(),
            available: colors_per_palette,
        });
    }

    let (groups, assignment) = match pack_groups(&tile_colors, colors_per_palette, max_palettes) {
        Ok(packed) => packed,
        Err(()) => {
            let required = pack_groups(&tile_colors, colors_per_palette, usize::MAX)
                .map(|(groups, _)| groups.len())
                .unwrap_or(max_palettes + 1);
            return Err(Error::TooManyPalettes {
                required,
                available: max_palettes,
            });
        }
    };

    let n_palettes = groups.len().max(1);
    debug!(
        "rearranged {} colors into {} palettes",
        palette.len(),
        n_palettes
    );

    let mut out = Vec::with_capacity(n_palettes * palette_size);
    for group in groups.iter() {
        out.push(transparent);
        out.extend(group.colors.iter().map(|&c| palette[c as usize]));
        out.resize(out.len() + palette_size - 1 - group.colors.len(), SnesColor::BLACK);
    }
    if groups.is_empty() {
        out.push(transparent);
        out.resize(palette_size, SnesColor::BLACK);
    }

    let new_tiles = tiles
        .iter()
        .zip(assignment.iter())
        .map(|(tile, &g)| match groups.get(g) {
            Some(group) => tile.map(|p| group.local_index(p)),
            None => *tile,
        })
        .collect();

    Ok(RearrangedPalette {
        palette: out,
        tiles: new_tiles,
        tile_palettes: assignment.into_iter().map(|g| g as u8).collect(),
        n_palettes,
    })
}
