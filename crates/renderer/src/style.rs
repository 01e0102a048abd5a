//! Style configuration: how scalar values become filled color bands.

use crate::colorscale::{Color, ColorScale};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_common::PointCloud;

/// Errors raised while building a style. These are configuration errors and
/// surface when the configuration is loaded, never during rendering.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StyleError {
    #[error("Unknown color scale '{0}' (expected one of rdbu, viridis, nipy_spectral, deep)")]
    UnknownColorScale(String),

    #[error("Invalid value range [{vmin}, {vmax}]")]
    InvalidRange { vmin: f64, vmax: f64 },

    #[error("Band count must be at least 1, got {0}")]
    InvalidLevels(u32),
}

/// Stroke settings for contour lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line width in output pixels
    #[serde(default = "default_line_width")]
    pub width: f32,
    /// Line color [R, G, B, A]
    #[serde(default = "default_line_color")]
    pub color: [u8; 4],
}

fn default_line_width() -> f32 {
    1.0
}

fn default_line_color() -> [u8; 4] {
    [0, 0, 0, 255]
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: default_line_width(),
            color: default_line_color(),
        }
    }
}

/// Fully resolved color mapping for one product.
///
/// `[vmin, vmax]` is split into `level_count` equal bands. Values outside the
/// range take the color of the nearest extreme band.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpec {
    scale: ColorScale,
    vmin: f64,
    vmax: f64,
    level_count: u32,
    contour_levels: Vec<f64>,
    contour_style: LineStyle,
}

impl ColorSpec {
    pub fn new(scale: ColorScale, vmin: f64, vmax: f64, level_count: u32) -> Result<Self, StyleError> {
        if !vmin.is_finite() || !vmax.is_finite() || vmin >= vmax {
            return Err(StyleError::InvalidRange { vmin, vmax });
        }
        if level_count == 0 {
            return Err(StyleError::InvalidLevels(level_count));
        }
        Ok(Self {
            scale,
            vmin,
            vmax,
            level_count,
            contour_levels: Vec::new(),
            contour_style: LineStyle::default(),
        })
    }

    /// Stroke contour lines at `levels` on top of the fill.
    pub fn with_contours(mut self, levels: Vec<f64>, style: LineStyle) -> Self {
        self.contour_levels = levels.into_iter().filter(|l| l.is_finite()).collect();
        self.contour_style = style;
        self
    }

    pub fn scale(&self) -> ColorScale {
        self.scale
    }

    pub fn vmin(&self) -> f64 {
        self.vmin
    }

    pub fn vmax(&self) -> f64 {
        self.vmax
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    pub fn contour_levels(&self) -> &[f64] {
        &self.contour_levels
    }

    pub fn contour_style(&self) -> &LineStyle {
        &self.contour_style
    }

    /// Band index of `value`, clamped into `0..level_count`.
    pub fn band_index(&self, value: f64) -> usize {
        let step = (self.vmax - self.vmin) / self.level_count as f64;
        let raw = ((value - self.vmin) / step).floor();
        let last = (self.level_count - 1) as f64;
        raw.clamp(0.0, last) as usize
    }

    /// Color of band `index` (sampled at the band's centre).
    pub fn band_color(&self, index: usize) -> Color {
        let t = (index as f64 + 0.5) / self.level_count as f64;
        self.scale.sample(t)
    }

    /// Fill color for `value`.
    pub fn color_for(&self, value: f64) -> Color {
        self.band_color(self.band_index(value))
    }

    /// Every band color in order, for palette building.
    pub fn band_colors(&self) -> Vec<Color> {
        (0..self.level_count as usize)
            .map(|i| self.band_color(i))
            .collect()
    }
}

/// Style as written in configuration; the range may be left open and filled
/// from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    pub scale: ColorScale,
    #[serde(default)]
    pub vmin: Option<f64>,
    #[serde(default)]
    pub vmax: Option<f64>,
    pub levels: u32,
    #[serde(default)]
    pub contour_levels: Option<Vec<f64>>,
    #[serde(default)]
    pub contour_line: Option<LineStyle>,
}

impl StyleDefinition {
    pub fn new(scale: ColorScale, vmin: Option<f64>, vmax: Option<f64>, levels: u32) -> Self {
        Self {
            scale,
            vmin,
            vmax,
            levels,
            contour_levels: None,
            contour_line: None,
        }
    }

    /// Resolve against the data: a missing bound becomes the min/max of the
    /// cloud's values.
    ///
    /// A derived range that collapses to a single value (uniform field) is
    /// widened by 0.5 on each side so the field lands in the middle band.
    pub fn to_color_spec(&self, cloud: &PointCloud) -> Result<ColorSpec, StyleError> {
        let data_range = cloud.value_range();
        let vmin = self.vmin.or(data_range.map(|r| r.0));
        let vmax = self.vmax.or(data_range.map(|r| r.1));

        let (mut vmin, mut vmax) = match (vmin, vmax) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => {
                return Err(StyleError::InvalidRange {
                    vmin: f64::NAN,
                    vmax: f64::NAN,
                })
            }
        };

        if vmin == vmax && (self.vmin.is_none() || self.vmax.is_none()) {
            vmin -= 0.5;
            vmax += 0.5;
        }

        let spec = ColorSpec::new(self.scale, vmin, vmax, self.levels)?;
        Ok(match &self.contour_levels {
            Some(levels) => spec.with_contours(levels.clone(), self.contour_line.unwrap_or_default()),
            None => spec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ColorSpec {
        ColorSpec::new(ColorScale::Viridis, 0.0, 10.0, 10).unwrap()
    }

    #[test]
    fn test_band_index_equal_steps() {
        let spec = spec();
        assert_eq!(spec.band_index(0.0), 0);
        assert_eq!(spec.band_index(0.99), 0);
        assert_eq!(spec.band_index(1.0), 1);
        assert_eq!(spec.band_index(5.5), 5);
        assert_eq!(spec.band_index(9.99), 9);
    }

    #[test]
    fn test_values_clamp_to_extreme_bands() {
        let spec = spec();
        assert_eq!(spec.color_for(10.0), spec.color_for(1010.0));
        assert_eq!(spec.color_for(-500.0), spec.color_for(0.0));
        assert_eq!(spec.band_index(f64::INFINITY), 9);
    }

    #[test]
    fn test_band_colors_distinct_ends() {
        let colors = spec().band_colors();
        assert_eq!(colors.len(), 10);
        assert_ne!(colors[0], colors[9]);
    }

    #[test]
    fn test_invalid_spec_rejected() {
        assert!(matches!(
            ColorSpec::new(ColorScale::RdBu, 1.0, 1.0, 10),
            Err(StyleError::InvalidRange { .. })
        ));
        assert!(matches!(
            ColorSpec::new(ColorScale::RdBu, 0.0, 1.0, 0),
            Err(StyleError::InvalidLevels(0))
        ));
    }

    #[test]
    fn test_definition_derives_missing_range() {
        let cloud = PointCloud::from_samples(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], &[-2.0, 3.0, 7.0]);
        let def = StyleDefinition::new(ColorScale::RdBu, None, Some(5.0), 20);
        let spec = def.to_color_spec(&cloud).unwrap();
        assert_eq!(spec.vmin(), -2.0);
        assert_eq!(spec.vmax(), 5.0);
    }

    #[test]
    fn test_definition_uniform_field_widened() {
        let cloud = PointCloud::from_samples(&[0.0, 1.0], &[0.0, 1.0], &[4.0, 4.0]);
        let def = StyleDefinition::new(ColorScale::Deep, None, None, 5);
        let spec = def.to_color_spec(&cloud).unwrap();
        assert_eq!(spec.band_index(4.0), 2);
    }

    #[test]
    fn test_definition_empty_cloud_needs_range() {
        let def = StyleDefinition::new(ColorScale::Deep, None, None, 5);
        assert!(def.to_color_spec(&PointCloud::default()).is_err());
    }
}
