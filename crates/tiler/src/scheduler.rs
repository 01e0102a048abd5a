//! Per-zoom parallel tile generation.

use crate::error::{JobError, TilerError, TilerResult};
use crate::layout::{prepare_directories, tile_path};
use crate::summary::{JobFailure, TileSummary, ZoomSummary};
use rayon::prelude::*;
use renderer::{render_tile_outcome, ColorSpec, RenderOptions};
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tile_common::{tile_bounds, tiles_for_bbox, BoundingBox, PointCloud, TileCoord};
use tracing::{debug, error, info, instrument};

/// Batch settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TilerOptions {
    /// Worker threads per zoom level.
    pub workers: usize,
    /// Log progress every this many completed tiles (0 = never).
    pub progress_interval: usize,
    pub render: RenderOptions,
}

impl Default for TilerOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            progress_interval: 100,
            render: RenderOptions::default(),
        }
    }
}

impl TilerOptions {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}

enum TileOutcome {
    Rendered,
    Empty,
    Failed(JobFailure),
}

/// Render and write every tile covering `bbox` at each of `zoom_levels` under
/// `output_root/{zoom}/{x}/{y}.png`.
///
/// Zoom levels run one after another, each on its own pool of
/// `options.workers` threads that is torn down before the next level starts.
/// Tile failures are collected in the summary; only setup problems (bad
/// bbox or zoom, directories, pool) return an error.
pub fn generate_tiles(
    cloud: &PointCloud,
    bbox: &BoundingBox,
    zoom_levels: &[u8],
    spec: &ColorSpec,
    output_root: &Path,
    options: &TilerOptions,
) -> TilerResult<TileSummary> {
    if options.workers == 0 {
        return Err(TilerError::NoWorkers);
    }

    let mut summary = TileSummary::default();
    for &zoom in zoom_levels {
        let tiles = tiles_for_bbox(bbox, zoom)?;
        log_zoom_plan(cloud, bbox, zoom, &tiles, options.render.verbose);

        prepare_directories(output_root, zoom, &tiles)?;
        let zoom_summary = generate_zoom(cloud, &tiles, zoom, spec, output_root, options)?;

        info!(
            zoom,
            tiles = zoom_summary.total,
            rendered = zoom_summary.rendered,
            empty = zoom_summary.empty,
            failed = zoom_summary.failed.len(),
            elapsed_ms = zoom_summary.elapsed.as_millis() as u64,
            "Zoom level complete"
        );
        summary.zooms.push(zoom_summary);
    }

    Ok(summary)
}

#[instrument(skip(cloud, tiles, spec, output_root, options), fields(tiles = tiles.len(), workers = options.workers))]
fn generate_zoom(
    cloud: &PointCloud,
    tiles: &[TileCoord],
    zoom: u8,
    spec: &ColorSpec,
    output_root: &Path,
    options: &TilerOptions,
) -> TilerResult<ZoomSummary> {
    let started = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(move |i| format!("tiler-z{}-{}", zoom, i))
        .build()
        .map_err(|e| TilerError::Pool {
            zoom,
            message: e.to_string(),
        })?;

    let total = tiles.len();
    let completed = AtomicUsize::new(0);
    let outcomes: Vec<TileOutcome> = pool.install(|| {
        tiles
            .par_iter()
            .map(|coord| {
                let outcome = run_job(cloud, coord, spec, output_root, &options.render);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if options.progress_interval > 0 && done % options.progress_interval == 0 {
                    info!(zoom, done, total, "Tile progress");
                }
                outcome
            })
            .collect()
    });

    let mut summary = ZoomSummary::new(zoom, total);
    for outcome in outcomes {
        match outcome {
            TileOutcome::Rendered => summary.rendered += 1,
            TileOutcome::Empty => summary.empty += 1,
            TileOutcome::Failed(failure) => summary.failed.push(failure),
        }
    }
    summary.elapsed = started.elapsed();
    Ok(summary)
}

/// One tile, isolated from its siblings: errors and panics both become a
/// `Failed` outcome.
fn run_job(
    cloud: &PointCloud,
    coord: &TileCoord,
    spec: &ColorSpec,
    output_root: &Path,
    render: &RenderOptions,
) -> TileOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        write_tile(cloud, coord, spec, output_root, render)
    }))
    .unwrap_or_else(|payload| Err(JobError::Panic(panic_message(payload.as_ref()))));

    match result {
        Ok(true) => TileOutcome::Empty,
        Ok(false) => TileOutcome::Rendered,
        Err(e) => {
            error!(zoom = coord.z, x = coord.x, y = coord.y, error = %e, "Tile job failed");
            TileOutcome::Failed(JobFailure {
                coord: *coord,
                message: e.to_string(),
            })
        }
    }
}

/// Render, encode and write one tile. Returns whether the written image is a
/// transparent placeholder.
fn write_tile(
    cloud: &PointCloud,
    coord: &TileCoord,
    spec: &ColorSpec,
    output_root: &Path,
    render: &RenderOptions,
) -> Result<bool, JobError> {
    let tile = render_tile_outcome(cloud, coord, spec, render)?;
    let png = tile.image.to_png()?;
    let path = tile_path(output_root, coord);
    fs::write(&path, png).map_err(|source| JobError::Write { path, source })?;
    Ok(tile.is_placeholder())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn log_zoom_plan(cloud: &PointCloud, bbox: &BoundingBox, zoom: u8, tiles: &[TileCoord], verbose: bool) {
    let data_extent = cloud
        .bounds()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "empty".to_string());
    let first_tile = tiles
        .first()
        .and_then(|t| tile_bounds(t).ok())
        .map(|b| b.as_bbox().to_string())
        .unwrap_or_default();

    if verbose {
        info!(zoom, tiles = tiles.len(), requested = %bbox, data = %data_extent, first_tile = %first_tile, "Planning zoom level");
    } else {
        debug!(zoom, tiles = tiles.len(), requested = %bbox, data = %data_extent, first_tile = %first_tile, "Planning zoom level");
    }
}
