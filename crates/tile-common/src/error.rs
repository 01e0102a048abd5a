//! Error types shared by the tile geometry and grid preparation code.

use thiserror::Error;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

/// Errors raised by tile math and grid validation.
///
/// These are caller bugs (bad indices, malformed grids), not data problems:
/// sparse or missing data never produces a `TileError`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TileError {
    #[error("Tile {zoom}/{x}/{y} is outside the 2^{zoom} grid")]
    OutOfRange { zoom: u8, x: u32, y: u32 },

    #[error("Zoom level {0} exceeds the maximum of {max}", max = crate::tile::MAX_ZOOM)]
    ZoomTooDeep(u8),

    #[error("Invalid bounding box {0}")]
    InvalidBbox(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
}

impl TileError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }
}
