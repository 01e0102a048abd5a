//! `layer_config.json` maintenance for the map viewer.
//!
//! The viewer reads one entry per product with the URL template of its tiles
//! and the range of dates it can offer. After each run the ranges are
//! refreshed from the dates actually present in the tile tree.

use crate::products::Product;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const LAYER_CONFIG_FILE: &str = "layer_config.json";

/// First and last day with tiles for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Date range of every product directory under `tile_dir`.
///
/// Sub-directories whose name is not an ISO date are ignored, as are product
/// directories without any dated sub-directory.
pub fn find_date_ranges(tile_dir: &Path) -> Result<BTreeMap<String, DateRange>> {
    let mut ranges = BTreeMap::new();
    let entries =
        fs::read_dir(tile_dir).with_context(|| format!("Failed to list tile directory {:?}", tile_dir))?;

    for entry in entries {
        let product_dir = entry?.path();
        if !product_dir.is_dir() {
            continue;
        }
        let Some(product) = product_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let mut dates = Vec::new();
        for day in fs::read_dir(&product_dir)? {
            let day = day?.path();
            if !day.is_dir() {
                continue;
            }
            if let Some(date) = day
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| NaiveDate::parse_from_str(n, "%Y-%m-%d").ok())
            {
                dates.push(date);
            }
        }

        if let (Some(&start), Some(&end)) = (dates.iter().min(), dates.iter().max()) {
            debug!(product, %start, %end, "Found tile dates");
            ranges.insert(product.to_string(), DateRange { start, end });
        }
    }

    Ok(ranges)
}

/// Rewrite `date_range.start/end` of every layer in `json_path` whose `id`
/// has an entry in `ranges`. Writes to `output`, or back to `json_path`.
///
/// Layers without a `date_range`, unknown ids and all other fields are left
/// as they are. Returns the number of layers updated.
pub fn update_date_ranges(
    json_path: &Path,
    ranges: &BTreeMap<String, DateRange>,
    output: Option<&Path>,
) -> Result<usize> {
    let text = fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read layer config {:?}", json_path))?;
    let mut data: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse layer config {:?}", json_path))?;

    let mut updated = 0;
    if let Some(layers) = data.get_mut("layers").and_then(Value::as_array_mut) {
        for layer in layers {
            let Some(range) = layer.get("id").and_then(Value::as_str).and_then(|id| ranges.get(id)) else {
                continue;
            };
            let Some(date_range) = layer.get_mut("date_range").and_then(Value::as_object_mut) else {
                continue;
            };
            date_range.insert("start".into(), Value::String(range.start.to_string()));
            date_range.insert("end".into(), Value::String(range.end.to_string()));
            updated += 1;
        }
    }

    let output = output.unwrap_or(json_path);
    fs::write(output, serde_json::to_string_pretty(&data)?)
        .with_context(|| format!("Failed to write layer config {:?}", output))?;
    info!(path = %output.display(), layers = updated, "Updated layer date ranges");
    Ok(updated)
}

/// Default viewer configuration listing the daily products, each offering
/// only `date`.
pub fn default_layer_config(base_url: &str, date: NaiveDate) -> Value {
    let layers: Vec<Value> = Product::DAILY
        .iter()
        .map(|product| {
            json!({
                "id": product.id(),
                "name": product.display_name(),
                "url_template": format!("{{base_url}}/{}/{{date}}/{{z}}/{{x}}/{{y}}.png", product.id()),
                "attribution": product.attribution(),
                "date_range": { "start": date.to_string(), "end": date.to_string() },
                "exclusive": false,
                "collapsed": false,
            })
        })
        .collect();

    json!({ "base_url": base_url, "layers": layers })
}

/// Write the default configuration to `{dir}/layer_config.json`.
pub fn write_default_layer_config(dir: &Path, base_url: &str) -> Result<PathBuf> {
    let today = chrono::Utc::now().date_naive();
    let path = dir.join(LAYER_CONFIG_FILE);
    let text = serde_json::to_string_pretty(&default_layer_config(base_url, today))?;
    fs::write(&path, text).with_context(|| format!("Failed to write layer config {:?}", path))?;
    info!(path = %path.display(), "Wrote default layer config");
    Ok(path)
}
