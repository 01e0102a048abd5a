//! Error types for tile generation.

use renderer::RenderError;
use std::path::PathBuf;
use thiserror::Error;
use tile_common::TileError;

/// Failures that prevent a batch from starting.
#[derive(Error, Debug)]
pub enum TilerError {
    /// An output directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool for a zoom level could not be started.
    #[error("failed to build worker pool for zoom {zoom}: {message}")]
    Pool { zoom: u8, message: String },

    /// A zero-sized pool was requested.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// Tile enumeration rejected the bounding box or zoom.
    #[error(transparent)]
    Tile(#[from] TileError),
}

pub type TilerResult<T> = Result<T, TilerError>;

/// Why a single tile job did not produce its file.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid tile: {0}")]
    Tile(#[from] TileError),

    #[error("encoding failed: {0}")]
    Encode(#[from] RenderError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker panicked: {0}")]
    Panic(String),
}
