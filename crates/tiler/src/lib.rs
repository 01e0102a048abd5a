//! Tile pyramid generation.
//!
//! For every requested zoom level the tiles covering a bounding box are
//! enumerated, their directories created, and each tile is rendered and
//! written by a dedicated worker pool. A failing tile never stops its
//! siblings; it is reported in the returned [`TileSummary`].

pub mod error;
pub mod layout;
pub mod scheduler;
pub mod summary;

pub use error::{JobError, TilerError, TilerResult};
pub use layout::{prepare_directories, product_date_dir, tile_path, zoom_dir};
pub use scheduler::{generate_tiles, TilerOptions};
pub use summary::{JobFailure, TileSummary, ZoomSummary};
