//! Render error types.

use thiserror::Error;

/// Reasons a tile could not be rasterized.
///
/// All of these are recovered by [`crate::render_tile`], which emits a fully
/// transparent placeholder instead. They surface only through
/// [`crate::RenderedTile::fallback`] for accounting and logging.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("Only {points} samples in the buffered window, at least 3 required")]
    InsufficientData { points: usize },

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    #[error("Render exceeded its {0:?} deadline")]
    Timeout(std::time::Duration),

    #[error("Canvas error: {0}")]
    Canvas(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
