//! On-disk tile layout: `{root}/{zoom}/{x}/{y}.png`.

use crate::error::{TilerError, TilerResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tile_common::TileCoord;

/// Root of one product/day pyramid: `{tile_dir}/{product}/{date}`.
pub fn product_date_dir(tile_dir: &Path, product: &str, date: &str) -> PathBuf {
    tile_dir.join(product).join(date)
}

pub fn zoom_dir(root: &Path, zoom: u8) -> PathBuf {
    root.join(zoom.to_string())
}

/// File a tile is written to.
pub fn tile_path(root: &Path, coord: &TileCoord) -> PathBuf {
    root.join(coord.z.to_string())
        .join(coord.x.to_string())
        .join(format!("{}.png", coord.y))
}

/// Create the zoom directory and one column directory per distinct `x` in
/// `tiles`. Returns the number of column directories.
///
/// Must complete before any tile of the zoom level is written.
pub fn prepare_directories(root: &Path, zoom: u8, tiles: &[TileCoord]) -> TilerResult<usize> {
    let zoom_path = zoom_dir(root, zoom);
    create_dir(&zoom_path)?;

    let columns: BTreeSet<u32> = tiles.iter().map(|t| t.x).collect();
    for x in &columns {
        create_dir(&zoom_path.join(x.to_string()))?;
    }
    Ok(columns.len())
}

fn create_dir(path: &Path) -> TilerResult<()> {
    fs::create_dir_all(path).map_err(|source| TilerError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
