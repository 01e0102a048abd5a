//! Reading product grids from the data directory.
//!
//! Grid files are JSON, one per product and day, at
//! `{data_dir}/{product}/{product}_{date}.json`:
//!
//! ```json
//! { "lat": [..], "lon": [..], "values": [[..], ..] }
//! ```
//!
//! with 1-D axes (either may be descending), or `"layout": "mesh"` with
//! 2-D `lat`/`lon` arrays. `null` values are missing data.

use crate::error::RetrievalError;
use crate::products::Product;
use crate::retry::RetryPolicy;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tile_common::{BoundingBox, GeoGrid};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinates {
    Axis(Vec<f64>),
    Mesh(Vec<Vec<f64>>),
}

#[derive(Debug, Deserialize)]
struct GridFile {
    #[serde(default)]
    layout: Option<String>,
    lat: Coordinates,
    lon: Coordinates,
    values: Vec<Vec<Option<f64>>>,
}

/// Location of a product's grid for `date`.
pub fn grid_path(data_dir: &Path, product: Product, date: NaiveDate) -> PathBuf {
    data_dir
        .join(product.id())
        .join(format!("{}_{}.json", product.id(), date.format("%Y-%m-%d")))
}

/// Parse one grid file. A missing file is `NotFound`; anything unreadable
/// or malformed is `Corrupt`.
pub fn read_grid_file(path: &Path) -> Result<GeoGrid, RetrievalError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RetrievalError::NotFound {
            path: path.to_path_buf(),
        },
        _ => corrupt(path, e.to_string()),
    })?;

    let file: GridFile = serde_json::from_str(&text).map_err(|e| corrupt(path, e.to_string()))?;
    to_geo_grid(file).map_err(|reason| corrupt(path, reason))
}

fn corrupt(path: &Path, reason: String) -> RetrievalError {
    RetrievalError::Corrupt {
        path: path.to_path_buf(),
        reason,
    }
}

fn to_geo_grid(file: GridFile) -> Result<GeoGrid, String> {
    let rows = file.values.len();
    let cols = file.values.first().map_or(0, Vec::len);
    if let Some(r) = file.values.iter().position(|row| row.len() != cols) {
        return Err(format!("row {} has {} values, expected {}", r, file.values[r].len(), cols));
    }
    let values: Vec<f64> = file
        .values
        .into_iter()
        .flatten()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    let mesh_declared = file.layout.as_deref() == Some("mesh");
    let grid = match (file.lat, file.lon) {
        (Coordinates::Axis(lat), Coordinates::Axis(lon)) if !mesh_declared => {
            GeoGrid::from_axes(lat, lon, values)
        }
        (Coordinates::Mesh(lat), Coordinates::Mesh(lon)) => {
            if lat.len() != rows || lon.len() != rows {
                return Err(format!("mesh coordinates do not have {} rows", rows));
            }
            let lat: Vec<f64> = lat.into_iter().flatten().collect();
            let lon: Vec<f64> = lon.into_iter().flatten().collect();
            GeoGrid::from_mesh(rows, cols, lat, lon, values)
        }
        _ => return Err("lat and lon must both be 1-D axes or both be 2-D meshes".to_string()),
    };
    grid.map_err(|e| e.to_string())
}

/// Load `product` for `date` with retries, and check it covers `cruise`.
pub fn load_grid(
    path: &Path,
    product: Product,
    date: NaiveDate,
    cruise: &BoundingBox,
    policy: &RetryPolicy,
    sleep: impl FnMut(Duration),
) -> Result<GeoGrid, RetrievalError> {
    debug!(product = %product, path = %path.display(), "Opening grid");
    let grid = policy.run(path, sleep, || read_grid_file(path))?;

    let covers = grid
        .coordinate_bounds()
        .is_some_and(|extent| extent.intersects(cruise));
    if !covers {
        return Err(RetrievalError::OutOfBounds {
            product: product.id().to_string(),
            date: date.to_string(),
            requested: cruise.to_string(),
        });
    }

    let (rows, cols) = grid.shape();
    info!(product = %product, date = %date, rows, cols, "Loaded grid");
    Ok(grid)
}
