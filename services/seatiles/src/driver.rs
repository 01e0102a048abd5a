//! Product/day orchestration: load, prepare, style and tile.

use crate::config::SeatilesConfig;
use crate::error::ensure_not_future;
use crate::loader::{grid_path, load_grid};
use crate::products::Product;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tile_common::{prepare, GeoGrid};
use tiler::{generate_tiles, product_date_dir, TileSummary};
use tracing::{error, info, warn};

/// What happened to one product/day.
#[derive(Debug)]
pub enum ProductOutcome {
    Rendered(TileSummary),
    /// Tiles for the day already exist and `force` was not set.
    AlreadyExists,
    /// No usable data for the day (outside the cruise area or not
    /// delivered); nothing was written.
    Skipped(String),
}

impl ProductOutcome {
    pub fn summary(&self) -> Option<&TileSummary> {
        match self {
            ProductOutcome::Rendered(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Results of every daily product for one day.
pub type DayReport = Vec<(Product, Result<ProductOutcome>)>;

/// Today's date in UTC, the reference for rejecting future days.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whether `{tile_dir}/{product}/{date}` exists.
pub fn tiles_exist(tile_dir: &Path, product: Product, date: NaiveDate) -> bool {
    product_date_dir(tile_dir, product.id(), &date.to_string()).is_dir()
}

/// Tile `product` for `date` from its grid file in the data directory.
pub fn process_product(
    config: &SeatilesConfig,
    product: Product,
    date: NaiveDate,
    force: bool,
) -> Result<ProductOutcome> {
    let path = grid_path(&config.data_dir, product, date);
    process_grid_file(config, product, date, force, &path, std::thread::sleep)
}

/// Tile `product` for `date` from the grid file at `path`. `sleep` is used
/// between retries of a failing open.
pub fn process_grid_file(
    config: &SeatilesConfig,
    product: Product,
    date: NaiveDate,
    force: bool,
    path: &Path,
    sleep: impl FnMut(Duration),
) -> Result<ProductOutcome> {
    ensure_not_future(date, today_utc())?;

    if !force && tiles_exist(&config.tile_dir, product, date) {
        info!(product = %product, date = %date, "Tiles already exist, skipping");
        return Ok(ProductOutcome::AlreadyExists);
    }

    let grid = match load_grid(path, product, date, &config.bbox(), &config.retry_policy(), sleep) {
        Ok(grid) => grid,
        Err(e) if e.is_skippable() => {
            warn!(product = %product, date = %date, error = %e, "No data, skipping");
            return Ok(ProductOutcome::Skipped(e.to_string()));
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to load {} for {}", product, date)),
    };

    render_grid(config, product, date, grid).map(ProductOutcome::Rendered)
}

/// Transform, prepare, style and tile an already loaded grid.
///
/// Tiles cover the grid's own coordinate extent, at the configured zooms.
pub fn render_grid(
    config: &SeatilesConfig,
    product: Product,
    date: NaiveDate,
    grid: GeoGrid,
) -> Result<TileSummary> {
    let grid = product.apply(grid);
    let extent = grid
        .coordinate_bounds()
        .with_context(|| format!("{} grid for {} has no finite coordinates", product, date))?;
    let cloud = prepare(&grid).with_context(|| format!("Failed to prepare {} grid", product))?;
    let spec = config
        .style_for(product)
        .to_color_spec(&cloud)
        .with_context(|| format!("Invalid style for {}", product))?;

    let root = product_date_dir(&config.tile_dir, product.id(), &date.to_string());
    fs::create_dir_all(&root).with_context(|| format!("Failed to create {:?}", root))?;

    info!(
        product = %product,
        date = %date,
        points = cloud.len(),
        extent = %extent,
        zooms = ?config.zoom_levels,
        "Generating tiles"
    );
    let summary = generate_tiles(&cloud, &extent, &config.zoom_levels, &spec, &root, &config.tiler_options())?;

    for failure in summary.failures() {
        warn!(product = %product, date = %date, failure = %failure, "Tile not written");
    }
    info!(
        product = %product,
        date = %date,
        tiles = summary.file_count(),
        failed = summary.failure_count(),
        elapsed_ms = summary.elapsed().as_millis() as u64,
        "Product complete"
    );
    Ok(summary)
}

/// Tile every daily product for `date`. A product that fails is logged and
/// does not stop the others.
pub fn process_all(config: &SeatilesConfig, date: NaiveDate, force: bool) -> DayReport {
    Product::DAILY
        .iter()
        .map(|&product| {
            info!(product = %product, date = %date, "Processing product");
            let outcome = process_product(config, product, date, force);
            if let Err(e) = &outcome {
                error!(product = %product, date = %date, error = %format!("{:#}", e), "Product failed");
            }
            (product, outcome)
        })
        .collect()
}

/// The `days` days before `today` followed by `today` itself, oldest first.
pub fn last_days(today: NaiveDate, days: u64) -> Vec<NaiveDate> {
    let from = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
    from.iter_days().take_while(|d| *d <= today).collect()
}

/// Tile every daily product for each day from `from` to `to` inclusive.
///
/// The whole range is rejected up front if it is inverted or reaches into
/// the future; failures on individual days are reported per product.
pub fn backfill(
    config: &SeatilesConfig,
    from: NaiveDate,
    to: NaiveDate,
    force: bool,
) -> Result<Vec<(NaiveDate, DayReport)>> {
    anyhow::ensure!(from <= to, "backfill range {}..{} is inverted", from, to);
    ensure_not_future(to, today_utc())?;

    info!(from = %from, to = %to, force, "Backfilling");
    Ok(from
        .iter_days()
        .take_while(|d| *d <= to)
        .map(|date| (date, process_all(config, date, force)))
        .collect())
}
