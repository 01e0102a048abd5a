//! Synthetic ocean-like fields for tests and benchmarks.
//!
//! Generators are deterministic: the same arguments always produce the same
//! grid, so assertions can reason about exact sample positions.

use tile_common::{prepare, GeoGrid, PointCloud};

/// Evenly spaced axis from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Regular grid on 1-D axes with values computed by `f(lat, lon)`.
///
/// Rows follow `lat` in the order given, so pass a descending range to get a
/// north-up grid.
pub fn create_axis_grid(
    lat: (f64, f64, usize),
    lon: (f64, f64, usize),
    f: impl Fn(f64, f64) -> f64,
) -> GeoGrid {
    let lats = linspace(lat.0, lat.1, lat.2);
    let lons = linspace(lon.0, lon.1, lon.2);
    let mut values = Vec::with_capacity(lats.len() * lons.len());
    for &la in &lats {
        for &lo in &lons {
            values.push(f(la, lo));
        }
    }
    GeoGrid::from_axes(lats, lons, values).expect("generated grid has a consistent shape")
}

/// Grid of a single constant value.
pub fn create_constant_grid(lat: (f64, f64, usize), lon: (f64, f64, usize), value: f64) -> GeoGrid {
    create_axis_grid(lat, lon, |_, _| value)
}

/// Smooth sea-surface-height-like field in metres, roughly within ±0.7.
pub fn create_ssh_grid(lat: (f64, f64, usize), lon: (f64, f64, usize)) -> GeoGrid {
    create_axis_grid(lat, lon, |la, lo| {
        0.5 * (la.to_radians() * 3.0).sin() * (lo.to_radians() * 2.0).cos()
            + 0.2 * (lo.to_radians() * 5.0).sin()
    })
}

/// Grid whose samples inside any of `holes` (west, south, east, north) are
/// missing, like cloud-masked satellite swaths.
pub fn create_grid_with_gaps(
    lat: (f64, f64, usize),
    lon: (f64, f64, usize),
    holes: &[(f64, f64, f64, f64)],
) -> GeoGrid {
    create_axis_grid(lat, lon, |la, lo| {
        let in_hole = holes
            .iter()
            .any(|&(w, s, e, n)| lo >= w && lo <= e && la >= s && la <= n);
        if in_hole {
            f64::NAN
        } else {
            la + lo
        }
    })
}

/// Prepared point cloud of a generated grid.
pub fn cloud_from_grid(grid: &GeoGrid) -> PointCloud {
    prepare(grid).expect("generated grid prepares cleanly")
}

/// Square cluster of `n × n` samples with spacing `step` degrees starting at
/// (`lon0`, `lat0`), all carrying `value`.
pub fn create_cluster(lon0: f64, lat0: f64, n: usize, step: f64, value: f64) -> Vec<(f64, f64, f64)> {
    let mut samples = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            samples.push((lat0 + row as f64 * step, lon0 + col as f64 * step, value));
        }
    }
    samples
}

/// Point cloud from `(lat, lon, value)` triplets.
pub fn cloud_from_samples(samples: &[(f64, f64, f64)]) -> PointCloud {
    let lats: Vec<f64> = samples.iter().map(|s| s.0).collect();
    let lons: Vec<f64> = samples.iter().map(|s| s.1).collect();
    let values: Vec<f64> = samples.iter().map(|s| s.2).collect();
    PointCloud::from_samples(&lats, &lons, &values)
}

/// `count` samples on a straight line, which no planar triangulation can use.
pub fn create_colinear_samples(lon0: f64, lat0: f64, count: usize, value: f64) -> Vec<(f64, f64, f64)> {
    (0..count)
        .map(|i| (lat0 + i as f64 * 0.5, lon0 + i as f64 * 0.5, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let axis = linspace(-89.0, 89.0, 10);
        assert_eq!(axis.len(), 10);
        assert_eq!(axis[0], -89.0);
        assert!((axis[9] - 89.0).abs() < 1e-12);
    }

    #[test]
    fn test_gaps_are_missing() {
        let grid = create_grid_with_gaps((0.0, 4.0, 5), (0.0, 4.0, 5), &[(1.5, 1.5, 2.5, 2.5)]);
        let cloud = cloud_from_grid(&grid);
        assert_eq!(cloud.len(), 24);
    }

    #[test]
    fn test_cluster_layout() {
        let cluster = create_cluster(1.0, 1.0, 5, 1.0, 7.0);
        assert_eq!(cluster.len(), 25);
        assert_eq!(cluster[0], (1.0, 1.0, 7.0));
        assert_eq!(cluster[24], (5.0, 5.0, 7.0));
    }
}
