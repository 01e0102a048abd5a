//! Tile enumeration tests against the public XYZ convention.

use std::collections::HashSet;
use tile_common::{tile_bounds, tiles_for_bbox, BoundingBox, TileCoord, TileError};

#[test]
fn test_tile_counts_grow_with_zoom() {
    let bbox = BoundingBox::new(-75.0, -55.0, -5.0, -10.0);
    let mut previous = 0;
    for zoom in 0..=6u8 {
        let tiles = tiles_for_bbox(&bbox, zoom).unwrap();
        assert!(tiles.len() >= previous, "zoom {} shrank", zoom);
        previous = tiles.len();
    }
}

#[test]
fn test_tiles_unique_and_intersecting() {
    let bbox = BoundingBox::new(-75.0, -55.0, -5.0, -10.0);
    for zoom in [2u8, 5, 7] {
        let tiles = tiles_for_bbox(&bbox, zoom).unwrap();
        let unique: HashSet<_> = tiles.iter().collect();
        assert_eq!(unique.len(), tiles.len());

        for tile in &tiles {
            assert!(tile.is_valid());
            let bounds = tile_bounds(tile).unwrap();
            assert!(
                bounds.as_bbox().intersects(&bbox),
                "{} does not touch {}",
                tile,
                bbox
            );
        }
    }
}

#[test]
fn test_whole_world_covers_grid() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    let tiles = tiles_for_bbox(&bbox, 3).unwrap();
    assert_eq!(tiles.len(), 64);
    assert_eq!(tiles.first(), Some(&TileCoord::new(3, 0, 0)));
    assert_eq!(tiles.last(), Some(&TileCoord::new(3, 7, 7)));
}

#[test]
fn test_ordering_is_column_then_row() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    let tiles = tiles_for_bbox(&bbox, 1).unwrap();
    assert_eq!(
        tiles,
        vec![
            TileCoord::new(1, 0, 0),
            TileCoord::new(1, 0, 1),
            TileCoord::new(1, 1, 0),
            TileCoord::new(1, 1, 1),
        ]
    );
}

#[test]
fn test_adjacent_tiles_share_edges() {
    let a = tile_bounds(&TileCoord::new(6, 20, 30)).unwrap();
    let right = tile_bounds(&TileCoord::new(6, 21, 30)).unwrap();
    let below = tile_bounds(&TileCoord::new(6, 20, 31)).unwrap();
    assert_eq!(a.east, right.west);
    assert_eq!(a.south, below.north);
}

#[test]
fn test_point_box_yields_one_tile() {
    let bbox = BoundingBox::new(12.5, 41.9, 12.5, 41.9);
    let tiles = tiles_for_bbox(&bbox, 8).unwrap();
    assert_eq!(tiles.len(), 1);
}

#[test]
fn test_invalid_box_rejected() {
    let bbox = BoundingBox::new(0.0, f64::NAN, 1.0, 1.0);
    assert!(matches!(tiles_for_bbox(&bbox, 2), Err(TileError::InvalidBbox(_))));
}

/// Edge, near-edge and interior indices along one axis of a `n`-wide grid.
fn sample_indices(n: u64) -> Vec<u32> {
    let mut picks = vec![0, 1, n / 3, n / 2 - 1, n / 2, n / 2 + 1, n - 2, n - 1];
    picks.retain(|&i| i < n);
    picks.sort_unstable();
    picks.dedup();
    picks.into_iter().map(|i| i as u32).collect()
}

#[test]
fn test_tile_bounds_enumerate_back_to_the_tile() {
    for zoom in 0..=24u8 {
        let n = 1u64 << zoom;
        let indices: Vec<u32> = if zoom <= 4 {
            (0..n as u32).collect()
        } else {
            sample_indices(n)
        };

        for &x in &indices {
            for &y in &indices {
                let tile = TileCoord::new(zoom, x, y);
                let bounds = tile_bounds(&tile).unwrap();
                let tiles = tiles_for_bbox(&bounds.as_bbox(), zoom).unwrap();
                assert_eq!(tiles, vec![tile], "bounds of {} enumerate {:?}", tile, tiles);
            }
        }
    }
}
