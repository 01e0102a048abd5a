//! Tile rendering for scattered ocean data.
//!
//! Samples around a tile are Delaunay-triangulated, triangles spanning data
//! gaps are masked, and the rest is filled with discrete color bands:
//! - Color scales and banded color specs
//! - Triangulation and gap masking
//! - Contour lines (marching triangles)
//! - PNG encoding

pub mod colorscale;
pub mod contour;
pub mod error;
pub mod options;
pub mod png;
pub mod raster;
pub mod style;
pub mod triangulation;

pub use colorscale::{Color, ColorScale};
pub use error::{RenderError, RenderResult};
pub use options::{RenderOptions, MAX_SUPERSAMPLE};
pub use raster::{rasterize, render_tile, render_tile_outcome, RasterImage, RenderedTile};
pub use style::{ColorSpec, LineStyle, StyleDefinition, StyleError};
