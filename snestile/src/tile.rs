//! Fixed-size square tiles of palette indices.

/// Width and height of a hardware character tile.
pub const TILE_SIZE: usize = 8;

/// An N×N grid of palette indices, stored row by row.
///
/// Equality and hashing are by pixel content, so a tile can key a map directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile<const N: usize> {
    pub pixels: [[u8; N]; N],
}

pub type Tile8 = Tile<8>;
pub type Tile16 = Tile<16>;

impl<const N: usize> Default for Tile<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Tile<N> {
    /// A blank tile, every pixel transparent.
    pub const fn new() -> Self {
        Tile {
            pixels: [[0; N]; N],
        }
    }

    pub fn from_pixels(pixels: [[u8; N]; N]) -> Self {
        Tile { pixels }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[y][x] = value;
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().flatten().all(|&p| p == 0)
    }

    pub fn hflip(&self) -> Self {
        let mut result = *self;
        for row in result.pixels.iter_mut() {
            row.reverse();
        }
        result
    }

    pub fn vflip(&self) -> Self {
        let mut result = *self;
        result.pixels.reverse();
        result
    }

    /// Returns the tile as seen through the given flip flags.
    pub fn flip(&self, hflip: bool, vflip: bool) -> Self {
        match (hflip, vflip) {
            (false, false) => *self,
            (true, false) => self.hflip(),
            (false, true) => self.vflip(),
            (true, true) => self.hflip().vflip(),
        }
    }

    /// The four orientations in lookup order: unflipped, h, v, hv.
    pub fn orientations(&self) -> [(Self, bool, bool); 4] {
        [
            (*self, false, false),
            (self.hflip(), true, false),
            (self.vflip(), false, true),
            (self.flip(true, true), true, true),
        ]
    }

    /// Iterates over every pixel value, row by row.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels.iter().flatten().copied()
    }

    /// Returns a copy with every pixel passed through `f`.
    pub fn map(&self, mut f: impl FnMut(u8) -> u8) -> Self {
        let mut result = *self;
        for p in result.pixels.iter_mut().flatten() {
            *p = f(*p);
        }
        result
    }
}

impl Tile16 {
    /// Splits into the top-left, top-right, bottom-left and bottom-right 8px tiles.
    pub fn quadrants(&self) -> [Tile8; 4] {
        let mut out = [Tile8::new(); 4];
        for (q, tile) in out.iter_mut().enumerate() {
            let ox = (q % 2) * TILE_SIZE;
            let oy = (q / 2) * TILE_SIZE;
            for y in 0..TILE_SIZE {
                tile.pixels[y].copy_from_slice(&self.pixels[oy + y][ox..ox + TILE_SIZE]);
            }
        }
        out
    }

    /// Inverse of [`Tile16::quadrants`].
    pub fn from_quadrants(quadrants: &[Tile8; 4]) -> Self {
        let mut out = Tile16::new();
        for (q, tile) in quadrants.iter().enumerate() {
            let ox = (q % 2) * TILE_SIZE;
            let oy = (q / 2) * TILE_SIZE;
            for y in 0..TILE_SIZE {
                out.pixels[oy + y][ox..ox + TILE_SIZE].copy_from_slice(&tile.pixels[y]);
            }
        }
        out
    }
}
