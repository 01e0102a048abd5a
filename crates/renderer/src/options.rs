//! Per-call render settings.

use crate::error::{RenderError, RenderResult};
use std::time::Duration;

/// Largest accepted supersampling factor.
pub const MAX_SUPERSAMPLE: u32 = 8;

/// Tunables for a single tile render.
///
/// Passed explicitly into every render call; nothing in the renderer reads
/// process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Log per-tile diagnostics at `info` instead of `debug`.
    pub verbose: bool,
    /// Output edge length in pixels.
    pub pixel_size: u32,
    /// Render at `pixel_size * supersample` and downsample (1 = off).
    pub supersample: u32,
    /// Triangles larger than `mask_ratio` times the median area are masked.
    pub mask_ratio: f64,
    /// Buffer around the tile, as a fraction of its width/height.
    pub buffer_fraction: f64,
    /// Abandon the tile once this much time has been spent on it.
    pub tile_timeout: Option<Duration>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            pixel_size: 256,
            supersample: 1,
            mask_ratio: 3.0,
            buffer_fraction: 0.5,
            tile_timeout: None,
        }
    }
}

impl RenderOptions {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_pixel_size(mut self, pixel_size: u32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn with_supersample(mut self, supersample: u32) -> Self {
        self.supersample = supersample;
        self
    }

    pub fn with_mask_ratio(mut self, mask_ratio: f64) -> Self {
        self.mask_ratio = mask_ratio;
        self
    }

    pub fn with_tile_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tile_timeout = timeout;
        self
    }

    /// Edge length of the working canvas before any downsampling.
    pub fn canvas_size(&self) -> RenderResult<u32> {
        let factor = self.supersample.max(1);
        if factor > MAX_SUPERSAMPLE {
            return Err(RenderError::Canvas(format!(
                "supersample {} exceeds {}",
                factor, MAX_SUPERSAMPLE
            )));
        }
        self.pixel_size
            .max(1)
            .checked_mul(factor)
            .ok_or_else(|| {
                RenderError::Canvas(format!(
                    "{} px at {}x supersampling overflows the canvas",
                    self.pixel_size, factor
                ))
            })
    }
}
