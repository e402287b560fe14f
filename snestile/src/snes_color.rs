//! SNES 15-bit colors and palette serialization.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Rgba;

/// A BGR555 color: bits 0-4 red, 5-9 green, 10-14 blue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnesColor(u16);

impl SnesColor {
    pub const BLACK: SnesColor = SnesColor(0);

    /// Builds a color from the low 15 bits of `data`.
    pub const fn from_data(data: u16) -> Self {
        SnesColor(data & 0x7fff)
    }

    pub const fn data(self) -> u16 {
        self.0
    }

    /// Builds a color from 5-bit channels.
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        SnesColor(
            (red as u16 & 0x1f) | ((green as u16 & 0x1f) << 5) | ((blue as u16 & 0x1f) << 10),
        )
    }

    /// Converts from 8-bit channels, dropping the low three bits of each.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r >> 3, g >> 3, b >> 3)
    }

    pub fn red(self) -> u8 {
        (self.0 & 0x1f) as u8
    }

    pub fn green(self) -> u8 {
        ((self.0 >> 5) & 0x1f) as u8
    }

    pub fn blue(self) -> u8 {
        ((self.0 >> 10) & 0x1f) as u8
    }

    /// Converts to 8-bit channels, replicating the top bits into the low bits.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let expand = |c: u8| (c << 3) | (c >> 2);
        (expand(self.red()), expand(self.green()), expand(self.blue()))
    }
}

impl From<Rgba> for SnesColor {
    fn from(color: Rgba) -> Self {
        SnesColor::from_rgb(color.r, color.g, color.b)
    }
}

/// Serializes colors as little-endian 16 bit words.
pub fn encode_palette(colors: &[SnesColor]) -> Vec<u8> {
    colors
        .iter()
        .flat_map(|c| (c.data() & 0x7fff).to_le_bytes())
        .collect()
}

pub fn decode_palette(data: &[u8]) -> Result<Vec<SnesColor>> {
    if data.len() % 2 != 0 {
        return Err(Error::MalformedData {
            len: data.len(),
            unit: 2,
        });
    }
    Ok(data
        .chunks_exact(2)
        .map(|w| SnesColor::from_data(u16::from_le_bytes([w[0], w[1]])))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_packing() {
        let c = SnesColor::new(31, 0, 0);
        assert_eq!(c.data(), 0x001f);
        let c = SnesColor::new(0, 31, 0);
        assert_eq!(c.data(), 0x03e0);
        let c = SnesColor::new(0, 0, 31);
        assert_eq!(c.data(), 0x7c00);
        assert_eq!(SnesColor::from_data(0xffff).data(), 0x7fff);
    }

    #[test]
    fn rgb_conversion() {
        let c = SnesColor::from_rgb(255, 128, 8);
        assert_eq!((c.red(), c.green(), c.blue()), (31, 16, 1));
        assert_eq!(c.to_rgb(), (255, 132, 8));
        assert_eq!(SnesColor::from_rgb(0, 0, 0).to_rgb(), (0, 0, 0));

        // every 5-bit value survives a trip through 8-bit rgb
        for v in 0..32 {
            let c = SnesColor::new(v, 31 - v, v / 2);
            let (r, g, b) = c.to_rgb();
            assert_eq!(SnesColor::from_rgb(r, g, b), c);
        }
    }

    #[test]
    fn palette_bytes() {
        let colors = [SnesColor::new(31, 0, 0), SnesColor::from_data(0x7c00)];
        let data = encode_palette(&colors);
        assert_eq!(data, vec![0x1f, 0x00, 0x00, 0x7c]);
        assert_eq!(decode_palette(&data).unwrap(), colors);
    }

    #[test]
    fn decode_ignores_high_bit() {
        assert_eq!(
            decode_palette(&[0xff, 0xff]).unwrap(),
            vec![SnesColor::from_data(0x7fff)]
        );
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert_eq!(
            decode_palette(&[0, 0, 0]),
            Err(Error::MalformedData { len: 3, unit: 2 })
        );
    }
}
