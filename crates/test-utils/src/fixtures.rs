//! Common test fixtures.

/// Bounding boxes used across the suites, as `(west, south, east, north)`.
pub mod bbox {
    /// South-west Atlantic cruise area.
    pub const CRUISE: (f64, f64, f64, f64) = (-75.0, -55.0, -5.0, -10.0);

    /// Whole Mercator world.
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -85.0, 180.0, 85.0);

    /// Small box inside a single zoom-4 tile.
    pub const SMALL: (f64, f64, f64, f64) = (1.0, 1.0, 15.0, 5.0);

    /// Crosses the antimeridian, rejected by the tile mapper.
    pub const PACIFIC: (f64, f64, f64, f64) = (160.0, -50.0, -140.0, 50.0);
}

/// Configuration snippets.
pub mod config {
    /// Minimal YAML configuration; `{tile_dir}` and `{data_dir}` are
    /// substituted by the test.
    pub const MINIMAL_YAML: &str = r#"
cruise_name: test-cruise
lat1: -55.0
lat2: -10.0
lon1: -75.0
lon2: -5.0
tile_dir: "{tile_dir}"
data_dir: "{data_dir}"
zoom_levels: [0, 1, 2]
workers: 2
"#;
}

/// Grid files in the on-disk JSON layout.
pub mod grids {
    /// 3 x 3 axis grid with a missing sample and a descending latitude axis.
    pub const SMALL_AXES_JSON: &str = r#"{
  "lat": [-10.0, -30.0, -50.0],
  "lon": [-70.0, -40.0, -10.0],
  "values": [
    [0.1, 0.2, 0.3],
    [0.0, null, -0.2],
    [-0.3, -0.4, -0.5]
  ]
}"#;

    /// 2 x 2 mesh grid.
    pub const SMALL_MESH_JSON: &str = r#"{
  "layout": "mesh",
  "lat": [[-20.0, -20.5], [-30.0, -30.5]],
  "lon": [[-60.0, -50.0], [-60.5, -50.5]],
  "values": [[1.0, 2.0], [3.0, 4.0]]
}"#;
}
