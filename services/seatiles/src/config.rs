//! Cruise configuration.
//!
//! Loaded from a YAML file with `${VAR}` / `${VAR:-default}` substitution,
//! then overridden by `SEATILES_*` environment variables.

use crate::products::Product;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use renderer::{RenderOptions, StyleDefinition, MAX_SUPERSAMPLE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tile_common::BoundingBox;
use tiler::TilerOptions;

/// Deepest zoom accepted in a configuration.
const MAX_CONFIG_ZOOM: u8 = 22;

/// Settings for one cruise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatilesConfig {
    pub cruise_name: String,
    /// Southern edge of the cruise area.
    pub lat1: f64,
    /// Northern edge of the cruise area.
    pub lat2: f64,
    /// Western edge of the cruise area.
    pub lon1: f64,
    /// Eastern edge of the cruise area.
    pub lon2: f64,
    /// Root of the tile tree: `{tile_dir}/{product}/{date}/{z}/{x}/{y}.png`.
    pub tile_dir: PathBuf,
    /// Root of the grid files: `{data_dir}/{product}/{product}_{date}.json`.
    pub data_dir: PathBuf,
    #[serde(default = "default_zoom_levels")]
    pub zoom_levels: Vec<u8>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default)]
    pub tile_timeout_secs: Option<u64>,
    #[serde(default = "default_mask_ratio")]
    pub mask_ratio: f64,
    #[serde(default = "default_supersample")]
    pub supersample: u32,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub retry: RetrySettings,
    /// Per-product replacements for the built-in styles.
    #[serde(default)]
    pub styles: HashMap<Product, StyleDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_secs: default_initial_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

fn default_zoom_levels() -> Vec<u8> {
    (0..=9).collect()
}

fn default_workers() -> usize {
    10
}

fn default_progress_interval() -> usize {
    100
}

fn default_mask_ratio() -> f64 {
    3.0
}

fn default_supersample() -> u32 {
    1
}

fn default_max_attempts() -> u32 {
    4
}

fn default_initial_delay_secs() -> u64 {
    5
}

fn default_max_delay_secs() -> u64 {
    60
}

impl Default for SeatilesConfig {
    fn default() -> Self {
        Self {
            cruise_name: "FALKOR_1".to_string(),
            lat1: -55.0,
            lat2: -10.0,
            lon1: -75.0,
            lon2: -5.0,
            tile_dir: PathBuf::from("/data/tiles"),
            data_dir: PathBuf::from("/data/grids"),
            zoom_levels: default_zoom_levels(),
            workers: default_workers(),
            progress_interval: default_progress_interval(),
            tile_timeout_secs: None,
            mask_ratio: default_mask_ratio(),
            supersample: default_supersample(),
            verbose: false,
            retry: RetrySettings::default(),
            styles: HashMap::new(),
        }
    }
}

impl SeatilesConfig {
    /// Read, expand, apply environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let mut config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults with environment overrides, for runs without a
    /// configuration file.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML after `${VAR}` expansion. Does not validate.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: Self = serde_yaml::from_str(&expanded)?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `SEATILES_TILE_DIR`, `SEATILES_DATA_DIR`, `SEATILES_WORKERS` and
    /// `SEATILES_ZOOM_LEVELS` as returned by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("SEATILES_TILE_DIR") {
            self.tile_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SEATILES_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(workers) = lookup("SEATILES_WORKERS") {
            self.workers = workers
                .trim()
                .parse()
                .with_context(|| format!("Invalid SEATILES_WORKERS: {}", workers))?;
        }
        if let Some(zooms) = lookup("SEATILES_ZOOM_LEVELS") {
            self.zoom_levels = parse_zoom_levels(&zooms)
                .with_context(|| format!("Invalid SEATILES_ZOOM_LEVELS: {}", zooms))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.zoom_levels.is_empty(), "zoom_levels cannot be empty");
        if let Some(&zoom) = self.zoom_levels.iter().find(|&&z| z > MAX_CONFIG_ZOOM) {
            anyhow::bail!("zoom level {} exceeds the maximum of {}", zoom, MAX_CONFIG_ZOOM);
        }
        anyhow::ensure!(
            self.bbox().is_valid(),
            "cruise area lat {}..{} lon {}..{} is inverted or not finite",
            self.lat1,
            self.lat2,
            self.lon1,
            self.lon2
        );
        anyhow::ensure!(self.workers > 0, "workers must be greater than 0");
        anyhow::ensure!(
            self.mask_ratio.is_finite() && self.mask_ratio > 0.0,
            "mask_ratio must be positive, got {}",
            self.mask_ratio
        );
        anyhow::ensure!(
            (1..=MAX_SUPERSAMPLE).contains(&self.supersample),
            "supersample must be between 1 and {}, got {}",
            MAX_SUPERSAMPLE,
            self.supersample
        );
        anyhow::ensure!(self.retry.max_attempts >= 1, "retry.max_attempts must be at least 1");
        Ok(())
    }

    /// Cruise area as `(lon1, lat1, lon2, lat2)`.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.lon1, self.lat1, self.lon2, self.lat2)
    }

    /// Configured style for `product`, or its built-in default.
    pub fn style_for(&self, product: Product) -> StyleDefinition {
        self.styles
            .get(&product)
            .cloned()
            .unwrap_or_else(|| product.default_style())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_verbose(self.verbose)
            .with_supersample(self.supersample)
            .with_mask_ratio(self.mask_ratio)
            .with_tile_timeout(self.tile_timeout_secs.map(Duration::from_secs))
    }

    pub fn tiler_options(&self) -> TilerOptions {
        TilerOptions::default()
            .with_workers(self.workers)
            .with_progress_interval(self.progress_interval)
            .with_render(self.render_options())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_secs(self.retry.initial_delay_secs),
            max_delay: Duration::from_secs(self.retry.max_delay_secs),
        }
    }
}

/// Parse `"0,1,2"` or `"0-9"` (or a mix, `"0-3,7"`).
pub fn parse_zoom_levels(s: &str) -> Result<Vec<u8>> {
    let mut zooms = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: u8 = lo.trim().parse()?;
                let hi: u8 = hi.trim().parse()?;
                anyhow::ensure!(lo <= hi, "descending zoom range {}", part);
                zooms.extend(lo..=hi);
            }
            None => zooms.push(part.parse()?),
        }
    }
    Ok(zooms)
}

/// Expand `${VAR}` and `${VAR:-default}` in configuration text.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }
            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
