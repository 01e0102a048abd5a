//! XYZ (slippy-map) tile addressing.
//!
//! Longitude maps linearly onto tile columns, latitude through the spherical
//! Mercator y. Enumeration follows the public XYZ convention used by
//! mercantile/OSM: tile (0, 0) is the north-west corner of the world and rows
//! grow southwards.

use crate::error::{TileError, TileResult};
use crate::BoundingBox;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Deepest zoom level whose grid still fits in `u32` indices.
pub const MAX_ZOOM: u8 = 30;

/// Latitude limit of the square Web Mercator world.
pub const MAX_MERCATOR_LAT: f64 = 85.051129;

/// Nudge applied to the south-east corner so a box ending exactly on a tile
/// edge does not pull in the next row/column.
const LL_EPSILON: f64 = 1e-11;

/// Guard against `floor` landing one tile short on exact edges.
const TILE_EPSILON: f64 = 1e-14;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u8,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along each axis at this coordinate's zoom.
    pub fn grid_size(&self) -> u64 {
        1u64 << self.z.min(MAX_ZOOM)
    }

    /// True iff `0 <= x, y < 2^z` and the zoom is supported.
    pub fn is_valid(&self) -> bool {
        self.z <= MAX_ZOOM && (self.x as u64) < self.grid_size() && (self.y as u64) < self.grid_size()
    }

    /// Fail with `OutOfRange` unless the coordinate is valid.
    pub fn validate(&self) -> TileResult<()> {
        if self.z > MAX_ZOOM {
            return Err(TileError::ZoomTooDeep(self.z));
        }
        if !self.is_valid() {
            return Err(TileError::OutOfRange {
                zoom: self.z,
                x: self.x,
                y: self.y,
            });
        }
        Ok(())
    }

    /// Relative path fragment `{z}/{x}/{y}.png`.
    pub fn path_fragment(&self) -> String {
        format!("{}/{}/{}.png", self.z, self.x, self.y)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Geographic extent of one tile, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl TileBounds {
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn as_bbox(&self) -> BoundingBox {
        BoundingBox::new(self.west, self.south, self.east, self.north)
    }

    /// Box grown on every side by `fraction` of the tile's width/height.
    pub fn buffered(&self, fraction: f64) -> BoundingBox {
        self.as_bbox()
            .expand(self.width() * fraction, self.height() * fraction)
    }

    /// Geographic position of a (fractional) pixel position in a square
    /// canvas of `size` pixels covering this tile edge to edge.
    ///
    /// Columns are linear in longitude, rows linear in Mercator y.
    pub fn pixel_to_lonlat(&self, px: f64, py: f64, size: f64) -> (f64, f64) {
        let lon = self.west + px / size * self.width();
        let y_north = mercator_y(self.north);
        let y_south = mercator_y(self.south);
        let y = y_north - py / size * (y_north - y_south);
        (lon, inverse_mercator_y(y))
    }

    /// Inverse of [`TileBounds::pixel_to_lonlat`].
    pub fn lonlat_to_pixel(&self, lon: f64, lat: f64, size: f64) -> (f64, f64) {
        let px = (lon - self.west) / self.width() * size;
        let y_north = mercator_y(self.north);
        let y_south = mercator_y(self.south);
        let py = (y_north - mercator_y(lat)) / (y_north - y_south) * size;
        (px, py)
    }
}

/// Spherical Mercator y (radians) for a latitude in degrees.
pub fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-89.999_999, 89.999_999).to_radians();
    (PI / 4.0 + lat / 2.0).tan().ln()
}

/// Latitude in degrees for a spherical Mercator y (radians).
pub fn inverse_mercator_y(y: f64) -> f64 {
    y.sinh().atan().to_degrees()
}

/// Tile containing a lon/lat point at `zoom`.
///
/// Points on or beyond the world edge clamp to the first/last tile.
pub fn lonlat_to_tile(lon: f64, lat: f64, zoom: u8) -> TileResult<TileCoord> {
    if zoom > MAX_ZOOM {
        return Err(TileError::ZoomTooDeep(zoom));
    }
    let n = (1u64 << zoom) as f64;

    let fx = lon / 360.0 + 0.5;
    let sin_lat = lat.to_radians().sin();
    let fy = 0.5 - 0.25 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / PI;

    let to_index = |f: f64| -> u32 {
        if f.is_nan() || f <= 0.0 {
            0
        } else if f >= 1.0 {
            (n - 1.0) as u32
        } else {
            ((f + TILE_EPSILON) * n).floor().min(n - 1.0) as u32
        }
    };

    Ok(TileCoord::new(zoom, to_index(fx), to_index(fy)))
}

/// Geographic bounds of a tile (the algebraic inverse of the enumeration).
pub fn tile_bounds(coord: &TileCoord) -> TileResult<TileBounds> {
    coord.validate()?;
    let n = coord.grid_size() as f64;

    let west = coord.x as f64 / n * 360.0 - 180.0;
    let east = (coord.x as f64 + 1.0) / n * 360.0 - 180.0;

    let north = (PI * (1.0 - 2.0 * coord.y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    let south = (PI * (1.0 - 2.0 * (coord.y as f64 + 1.0) / n))
        .sinh()
        .atan()
        .to_degrees();

    Ok(TileBounds {
        west,
        south,
        east,
        north,
    })
}

/// Every tile at `zoom` whose bounds intersect `bbox`.
///
/// The box is clamped to the Mercator world first. Tiles come back ordered by
/// column then row, each exactly once. Boxes crossing the antimeridian
/// (`west > east`) are rejected.
pub fn tiles_for_bbox(bbox: &BoundingBox, zoom: u8) -> TileResult<Vec<TileCoord>> {
    if !bbox.is_valid() {
        return Err(TileError::InvalidBbox(bbox.to_string()));
    }
    if zoom > MAX_ZOOM {
        return Err(TileError::ZoomTooDeep(zoom));
    }

    let west = bbox.min_x.max(-180.0);
    let south = bbox.min_y.max(-MAX_MERCATOR_LAT);
    let east = bbox.max_x.min(180.0);
    let north = bbox.max_y.min(MAX_MERCATOR_LAT);
    if west > east || south > north {
        return Ok(Vec::new());
    }

    let upper_left = lonlat_to_tile(west, north, zoom)?;
    let lower_right = lonlat_to_tile(east - LL_EPSILON, south + LL_EPSILON, zoom)?;

    let x_range = upper_left.x..=lower_right.x.max(upper_left.x);
    let y_range = upper_left.y..=lower_right.y.max(upper_left.y);

    let mut tiles = Vec::with_capacity(x_range.clone().count() * y_range.clone().count());
    for x in x_range {
        for y in y_range.clone() {
            tiles.push(TileCoord::new(zoom, x, y));
        }
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_zero_is_single_world_tile() {
        let bbox = BoundingBox::new(-75.0, -55.0, -5.0, -10.0);
        let tiles = tiles_for_bbox(&bbox, 0).unwrap();
        assert_eq!(tiles, vec![TileCoord::new(0, 0, 0)]);

        let bounds = tile_bounds(&tiles[0]).unwrap();
        assert!((bounds.west + 180.0).abs() < 1e-12);
        assert!((bounds.east - 180.0).abs() < 1e-12);
        assert!((bounds.north - MAX_MERCATOR_LAT).abs() < 1e-6);
        assert!((bounds.south + MAX_MERCATOR_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_known_tile_matches_xyz_convention() {
        // Null Island quadrant at zoom 1 is the south-east tile (1, 1).
        let coord = lonlat_to_tile(10.0, -10.0, 1).unwrap();
        assert_eq!(coord, TileCoord::new(1, 1, 1));

        let coord = lonlat_to_tile(-74.0060, 40.0, 10).unwrap();
        assert_eq!((coord.x, coord.y), (301, 387));
    }

    #[test]
    fn test_out_of_range_tile_rejected() {
        let err = tile_bounds(&TileCoord::new(2, 4, 0)).unwrap_err();
        assert_eq!(err, TileError::OutOfRange { zoom: 2, x: 4, y: 0 });

        let err = tile_bounds(&TileCoord::new(31, 0, 0)).unwrap_err();
        assert_eq!(err, TileError::ZoomTooDeep(31));
    }

    #[test]
    fn test_bbox_on_tile_edge_excludes_neighbour() {
        // Exactly the eastern hemisphere north of the equator at zoom 1.
        let bbox = BoundingBox::new(0.0, 0.0, 180.0, 85.0);
        let tiles = tiles_for_bbox(&bbox, 1).unwrap();
        assert_eq!(tiles, vec![TileCoord::new(1, 1, 0)]);
    }

    #[test]
    fn test_antimeridian_box_rejected() {
        let bbox = BoundingBox::new(170.0, -10.0, -170.0, 10.0);
        assert!(matches!(
            tiles_for_bbox(&bbox, 3),
            Err(TileError::InvalidBbox(_))
        ));
    }

    #[test]
    fn test_pixel_mapping_round_trip() {
        let bounds = tile_bounds(&TileCoord::new(5, 9, 12)).unwrap();
        let (lon, lat) = bounds.pixel_to_lonlat(37.5, 200.25, 256.0);
        let (px, py) = bounds.lonlat_to_pixel(lon, lat, 256.0);
        assert!((px - 37.5).abs() < 1e-9);
        assert!((py - 200.25).abs() < 1e-9);

        let (lon, lat) = bounds.pixel_to_lonlat(0.0, 0.0, 256.0);
        assert!((lon - bounds.west).abs() < 1e-12);
        assert!((lat - bounds.north).abs() < 1e-9);
    }
}
