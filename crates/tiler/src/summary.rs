//! Per-zoom and per-batch outcome counts.

use std::time::Duration;
use tile_common::TileCoord;

/// A tile whose file could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub coord: TileCoord,
    pub message: String,
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tile {}: {}", self.coord, self.message)
    }
}

/// Outcome of one zoom level.
///
/// `rendered` tiles carry data, `empty` tiles were written as transparent
/// placeholders (no data in the window, or the render fell back).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoomSummary {
    pub zoom: u8,
    pub total: usize,
    pub rendered: usize,
    pub empty: usize,
    pub failed: Vec<JobFailure>,
    pub elapsed: Duration,
}

impl ZoomSummary {
    pub fn new(zoom: u8, total: usize) -> Self {
        Self {
            zoom,
            total,
            ..Default::default()
        }
    }

    /// Tiles that ended up on disk.
    pub fn written(&self) -> usize {
        self.rendered + self.empty
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.written() == self.total
    }
}

/// Outcome of a whole `generate_tiles` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileSummary {
    pub zooms: Vec<ZoomSummary>,
}

impl TileSummary {
    pub fn total(&self) -> usize {
        self.zooms.iter().map(|z| z.total).sum()
    }

    /// Number of tile files written across all zoom levels.
    pub fn file_count(&self) -> usize {
        self.zooms.iter().map(ZoomSummary::written).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.zooms.iter().map(|z| z.failed.len()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobFailure> {
        self.zooms.iter().flat_map(|z| z.failed.iter())
    }

    pub fn zoom(&self, zoom: u8) -> Option<&ZoomSummary> {
        self.zooms.iter().find(|z| z.zoom == zoom)
    }

    pub fn elapsed(&self) -> Duration {
        self.zooms.iter().map(|z| z.elapsed).sum()
    }
}
