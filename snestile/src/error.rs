//! Errors raised by the conversion engine.

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid parameters, detected before any processing.
    Configuration,
    /// The input image cannot be converted at all.
    InputFormat,
    /// The image needs more tiles, palettes or colors than allowed.
    CapacityExceeded,
    /// A byte buffer handed to a decoder has the wrong length.
    MalformedData,
}

/// Errors that can occur during conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported bit depth {0} (expected 1, 2, 3, 4 or 8)")]
    UnsupportedBitDepth(u8),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image size is not divisible by 8 ({width}x{height})")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Tile contains too many colors (tile {tile} requires {required} colors, maximum is {available})")]
    TooManyTileColors {
        tile: usize,
        required: usize,
        available: usize,
    },

    #[error("Could not rearrange the palette ({required} palettes required, but maxPalettes is {available})")]
    TooManyPalettes { required: usize, available: usize },

    #[error("Too many tiles ({required} tiles required, but maxTiles is {available})")]
    TooManyTiles { required: usize, available: usize },

    #[error("Frame {frame} uses tile {tile}, but there are only {n_tiles} tiles")]
    UnknownTile {
        frame: usize,
        tile: usize,
        n_tiles: usize,
    },

    #[error("Malformed data: {len} bytes is not a multiple of {unit}")]
    MalformedData { len: usize, unit: usize },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedBitDepth(_) | Error::InvalidConfig(_) => ErrorKind::Configuration,
            Error::InvalidImageSize { .. } | Error::InvalidImage(_) | Error::UnknownTile { .. } => {
                ErrorKind::InputFormat
            }
            Error::TooManyTileColors { .. }
            | Error::TooManyPalettes { .. }
            | Error::TooManyTiles { .. } => ErrorKind::CapacityExceeded,
            Error::MalformedData { .. } => ErrorKind::MalformedData,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_messages_report_both_counts() {
        let err = Error::TooManyTiles {
            required: 1025,
            available: 1024,
        };
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert!(err
            .to_string()
            .contains("1025 tiles required, but maxTiles is 1024"));
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::UnsupportedBitDepth(5).kind(), ErrorKind::Configuration);
        assert_eq!(
            Error::InvalidImageSize { width: 9, height: 8 }.kind(),
            ErrorKind::InputFormat
        );
        assert_eq!(
            Error::MalformedData { len: 3, unit: 2 }.kind(),
            ErrorKind::MalformedData
        );
    }
}
