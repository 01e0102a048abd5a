//! Common types shared across the sea tile pipeline: slippy-map tile math,
//! bounding boxes and gridded-field preparation.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod tile;

pub use bbox::{BboxParseError, BoundingBox};
pub use error::{TileError, TileResult};
pub use grid::{prepare, GeoGrid, GridCoords, PointCloud};
pub use tile::{lonlat_to_tile, tile_bounds, tiles_for_bbox, TileBounds, TileCoord};
