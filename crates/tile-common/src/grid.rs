//! Gridded scalar fields and their flattened point-cloud form.
//!
//! A [`GeoGrid`] is what the data layer hands over: coordinate axes (1-D
//! axes or a 2-D mesh) plus a row-major value array where NaN marks missing
//! data. [`prepare`] turns it into a [`PointCloud`] of finite samples that the
//! rasterizer can query spatially.

use crate::error::{TileError, TileResult};
use crate::BoundingBox;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coordinates of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum GridCoords {
    /// Separate 1-D axes: `lat.len()` rows by `lon.len()` columns.
    /// Either axis may be stored ascending or descending.
    Axes { lat: Vec<f64>, lon: Vec<f64> },
    /// Full 2-D mesh, row-major, one lat/lon pair per value.
    Mesh {
        rows: usize,
        cols: usize,
        lat: Vec<f64>,
        lon: Vec<f64>,
    },
}

/// A scalar field on a (possibly irregular) geographic grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoGrid {
    pub coords: GridCoords,
    /// Row-major values, NaN for missing samples.
    pub values: Vec<f64>,
}

impl GeoGrid {
    /// Grid from 1-D axes. `values` holds `lat.len()` rows of `lon.len()`.
    pub fn from_axes(lat: Vec<f64>, lon: Vec<f64>, values: Vec<f64>) -> TileResult<Self> {
        let grid = Self {
            coords: GridCoords::Axes { lat, lon },
            values,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Grid from a 2-D mesh of coordinates.
    pub fn from_mesh(
        rows: usize,
        cols: usize,
        lat: Vec<f64>,
        lon: Vec<f64>,
        values: Vec<f64>,
    ) -> TileResult<Self> {
        let grid = Self {
            coords: GridCoords::Mesh {
                rows,
                cols,
                lat,
                lon,
            },
            values,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// `(rows, cols)` of the value array.
    pub fn shape(&self) -> (usize, usize) {
        match &self.coords {
            GridCoords::Axes { lat, lon } => (lat.len(), lon.len()),
            GridCoords::Mesh { rows, cols, .. } => (*rows, *cols),
        }
    }

    /// Check that coordinates broadcast to the value shape.
    pub fn validate(&self) -> TileResult<()> {
        let (rows, cols) = self.shape();
        if self.values.len() != rows * cols {
            return Err(TileError::invalid_grid(format!(
                "{} values do not match a {}x{} grid",
                self.values.len(),
                rows,
                cols
            )));
        }
        if let GridCoords::Mesh { lat, lon, .. } = &self.coords {
            if lat.len() != rows * cols || lon.len() != rows * cols {
                return Err(TileError::invalid_grid(format!(
                    "mesh coordinates ({} lat, {} lon) do not match a {}x{} grid",
                    lat.len(),
                    lon.len(),
                    rows,
                    cols
                )));
            }
        }
        Ok(())
    }

    /// Apply `f` to every value. Non-finite results become missing data.
    pub fn map_values(mut self, f: impl Fn(f64) -> f64) -> Self {
        for v in &mut self.values {
            let mapped = f(*v);
            *v = if mapped.is_finite() { mapped } else { f64::NAN };
        }
        self
    }

    /// Extent of the coordinates (ignores whether values are missing).
    pub fn coordinate_bounds(&self) -> Option<BoundingBox> {
        match &self.coords {
            GridCoords::Axes { lat, lon } => {
                let (lon_min, lon_max) = min_max(lon)?;
                let (lat_min, lat_max) = min_max(lat)?;
                Some(BoundingBox::new(lon_min, lat_min, lon_max, lat_max))
            }
            GridCoords::Mesh { lat, lon, .. } => BoundingBox::enclosing(lon, lat),
        }
    }
}

/// Flattened finite samples of a field.
///
/// Immutable once built; tile jobs share it read-only. Samples are also
/// indexed by longitude so window queries only touch the matching band.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    lats: Vec<f64>,
    lons: Vec<f64>,
    values: Vec<f64>,
    /// Sample indices sorted by longitude.
    lon_order: Vec<usize>,
}

impl PointCloud {
    /// Build from parallel arrays, dropping any triplet with a non-finite
    /// component.
    pub fn from_samples(lats: &[f64], lons: &[f64], values: &[f64]) -> Self {
        let mut cloud = Self::default();
        for ((&lat, &lon), &value) in lats.iter().zip(lons).zip(values) {
            cloud.push(lat, lon, value);
        }
        cloud.build_lon_index();
        cloud
    }

    fn build_lon_index(&mut self) {
        let lons = &self.lons;
        let mut order: Vec<usize> = (0..lons.len()).collect();
        order.sort_by(|&a, &b| lons[a].total_cmp(&lons[b]));
        self.lon_order = order;
    }

    fn push(&mut self, lat: f64, lon: f64, value: f64) {
        if lat.is_finite() && lon.is_finite() && value.is_finite() {
            self.lats.push(lat);
            self.lons.push(lon);
            self.values.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(lat, lon, value)` of sample `i`.
    pub fn sample(&self, i: usize) -> (f64, f64, f64) {
        (self.lats[i], self.lons[i], self.values[i])
    }

    /// Min/max of the values, `None` for an empty cloud.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        min_max(&self.values)
    }

    /// Extent of the sample positions.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.lons, &self.lats)
    }

    /// Indices of samples inside `bbox` (edges inclusive), in cloud order.
    pub fn indices_within(&self, bbox: &BoundingBox) -> Vec<usize> {
        let start = self.lon_order.partition_point(|&i| self.lons[i] < bbox.min_x);
        let end = self.lon_order.partition_point(|&i| self.lons[i] <= bbox.max_x);
        if start >= end {
            return Vec::new();
        }

        let mut indices: Vec<usize> = self.lon_order[start..end]
            .iter()
            .copied()
            .filter(|&i| bbox.contains_point(self.lons[i], self.lats[i]))
            .collect();
        indices.sort_unstable();
        indices
    }
}

/// Normalize a grid into a point cloud of finite samples.
///
/// Descending 1-D axes are reversed together with the matching value rows or
/// columns, so every surviving triplet keeps its original lat/lon/value
/// association. Mesh coordinates are used as-is. The output order is
/// row-major over the normalized grid and therefore stable for a given input.
pub fn prepare(grid: &GeoGrid) -> TileResult<PointCloud> {
    grid.validate()?;
    let (rows, cols) = grid.shape();
    let mut cloud = PointCloud {
        lats: Vec::with_capacity(grid.values.len()),
        lons: Vec::with_capacity(grid.values.len()),
        values: Vec::with_capacity(grid.values.len()),
        lon_order: Vec::new(),
    };

    match &grid.coords {
        GridCoords::Axes { lat, lon } => {
            let lat_descending = is_descending(lat);
            let lon_descending = is_descending(lon);

            for r in 0..rows {
                let src_r = if lat_descending { rows - 1 - r } else { r };
                for c in 0..cols {
                    let src_c = if lon_descending { cols - 1 - c } else { c };
                    cloud.push(lat[src_r], lon[src_c], grid.values[src_r * cols + src_c]);
                }
            }

            debug!(
                rows,
                cols,
                lat_descending,
                lon_descending,
                points = cloud.len(),
                "Prepared point cloud from axes"
            );
        }
        GridCoords::Mesh { lat, lon, .. } => {
            for i in 0..rows * cols {
                cloud.push(lat[i], lon[i], grid.values[i]);
            }

            debug!(rows, cols, points = cloud.len(), "Prepared point cloud from mesh");
        }
    }

    cloud.build_lon_index();
    Ok(cloud)
}

fn is_descending(axis: &[f64]) -> bool {
    match (axis.first(), axis.last()) {
        (Some(first), Some(last)) => first > last,
        _ => false,
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triplets(cloud: &PointCloud) -> Vec<(f64, f64, f64)> {
        (0..cloud.len()).map(|i| cloud.sample(i)).collect()
    }

    #[test]
    fn test_descending_latitude_matches_ascending() {
        let lon = vec![0.0, 1.0];
        let descending = GeoGrid::from_axes(
            vec![50.0, 40.0, 30.0],
            lon.clone(),
            vec![5.0, 6.0, 4.0, 4.5, 3.0, 3.5],
        )
        .unwrap();
        let ascending = GeoGrid::from_axes(
            vec![30.0, 40.0, 50.0],
            lon,
            vec![3.0, 3.5, 4.0, 4.5, 5.0, 6.0],
        )
        .unwrap();

        let a = prepare(&descending).unwrap();
        let b = prepare(&ascending).unwrap();
        assert_eq!(triplets(&a), triplets(&b));
        assert_eq!(a.sample(0), (30.0, 0.0, 3.0));
        assert_eq!(a.sample(5), (50.0, 1.0, 6.0));
    }

    #[test]
    fn test_descending_longitude_flips_columns() {
        let grid = GeoGrid::from_axes(vec![0.0], vec![20.0, 10.0, 0.0], vec![2.0, 1.0, 0.0]).unwrap();
        let cloud = prepare(&grid).unwrap();
        assert_eq!(cloud.lons(), &[0.0, 10.0, 20.0]);
        assert_eq!(cloud.values(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_nan_samples_dropped() {
        let grid = GeoGrid::from_axes(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![1.0, f64::NAN, f64::INFINITY, 4.0],
        )
        .unwrap();
        let cloud = prepare(&grid).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.value_range(), Some((1.0, 4.0)));
    }

    #[test]
    fn test_mesh_used_unchanged() {
        let grid = GeoGrid::from_mesh(
            1,
            3,
            vec![5.0, 4.0, 3.0],
            vec![-1.0, -2.0, -3.0],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();
        let cloud = prepare(&grid).unwrap();
        assert_eq!(cloud.lats(), &[5.0, 4.0, 3.0]);
        assert_eq!(cloud.lons(), &[-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = GeoGrid::from_axes(vec![0.0, 1.0], vec![0.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, TileError::InvalidGrid(_)));
    }

    #[test]
    fn test_map_values_marks_non_finite_missing() {
        let grid = GeoGrid::from_axes(vec![0.0], vec![0.0, 1.0], vec![0.0, 1.0])
            .unwrap()
            .map_values(f64::ln);
        assert!(grid.values[0].is_nan());
        assert_eq!(grid.values[1], 0.0);
    }

    #[test]
    fn test_indices_within_buffer() {
        let cloud = PointCloud::from_samples(&[0.0, 5.0, 10.0], &[0.0, 5.0, 10.0], &[1.0, 2.0, 3.0]);
        let idx = cloud.indices_within(&BoundingBox::new(4.0, 4.0, 10.0, 10.0));
        assert_eq!(idx, vec![1, 2]);
    }

    #[test]
    fn test_indices_within_matches_full_scan() {
        // Unsorted longitudes with repeats, as a mesh or swath would give.
        let mut lats = Vec::new();
        let mut lons = Vec::new();
        for i in 0..400u32 {
            lats.push(((i * 37) % 101) as f64 - 50.0);
            lons.push(((i * 53) % 71) as f64 - 35.0);
        }
        let values = vec![1.0; lats.len()];
        let cloud = PointCloud::from_samples(&lats, &lons, &values);

        for bbox in [
            BoundingBox::new(-10.0, -20.0, 10.0, 20.0),
            BoundingBox::new(-35.0, -50.0, -35.0, 50.0),
            BoundingBox::new(0.5, 0.5, 0.7, 0.7),
            BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            BoundingBox::new(40.0, 0.0, 50.0, 10.0),
        ] {
            let expected: Vec<usize> = (0..cloud.len())
                .filter(|&i| bbox.contains_point(cloud.lons()[i], cloud.lats()[i]))
                .collect();
            assert_eq!(cloud.indices_within(&bbox), expected, "{}", bbox);
        }
    }

    #[test]
    fn test_prepared_cloud_is_indexed() {
        let grid = GeoGrid::from_axes(vec![0.0, 1.0], vec![3.0, 2.0, 1.0], vec![1.0; 6]).unwrap();
        let cloud = prepare(&grid).unwrap();
        let idx = cloud.indices_within(&BoundingBox::new(1.5, 0.0, 3.0, 0.5));
        assert_eq!(idx, vec![1, 2]);
    }
}
