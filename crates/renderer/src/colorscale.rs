//! Color scales mapping a normalized scalar in [0, 1] to RGBA.
//!
//! The set of scales is closed: names are resolved when configuration is
//! loaded, so an unknown scale never reaches the rasterizer.

use crate::style::StyleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Supported color scales.
///
/// Stops are evenly spaced approximations of the reference palettes of the
/// same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorScale {
    /// Diverging red (low) to blue (high).
    RdBu,
    /// Perceptually uniform purple to yellow.
    Viridis,
    /// Black through purple, blue, green, yellow, red to grey.
    NipySpectral,
    /// Ocean depth: abyssal navy (low) to pale shallows (high).
    Deep,
}

const RDBU: &[Color] = &[
    Color::rgb(103, 0, 31),
    Color::rgb(178, 24, 43),
    Color::rgb(214, 96, 77),
    Color::rgb(244, 165, 130),
    Color::rgb(253, 219, 199),
    Color::rgb(247, 247, 247),
    Color::rgb(209, 229, 240),
    Color::rgb(146, 197, 222),
    Color::rgb(67, 147, 195),
    Color::rgb(33, 102, 172),
    Color::rgb(5, 48, 97),
];

const VIRIDIS: &[Color] = &[
    Color::rgb(68, 1, 84),
    Color::rgb(72, 40, 120),
    Color::rgb(62, 73, 137),
    Color::rgb(49, 104, 142),
    Color::rgb(38, 130, 142),
    Color::rgb(31, 158, 137),
    Color::rgb(53, 183, 121),
    Color::rgb(110, 206, 88),
    Color::rgb(181, 222, 43),
    Color::rgb(253, 231, 37),
];

const NIPY_SPECTRAL: &[Color] = &[
    Color::rgb(0, 0, 0),
    Color::rgb(119, 0, 136),
    Color::rgb(136, 0, 153),
    Color::rgb(0, 0, 170),
    Color::rgb(0, 0, 221),
    Color::rgb(0, 119, 221),
    Color::rgb(0, 153, 221),
    Color::rgb(0, 170, 170),
    Color::rgb(0, 170, 136),
    Color::rgb(0, 153, 0),
    Color::rgb(0, 187, 0),
    Color::rgb(0, 221, 0),
    Color::rgb(0, 255, 0),
    Color::rgb(187, 255, 0),
    Color::rgb(238, 238, 0),
    Color::rgb(255, 204, 0),
    Color::rgb(255, 153, 0),
    Color::rgb(255, 0, 0),
    Color::rgb(221, 0, 0),
    Color::rgb(204, 0, 0),
    Color::rgb(204, 204, 204),
];

const DEEP: &[Color] = &[
    Color::rgb(40, 26, 44),
    Color::rgb(55, 42, 85),
    Color::rgb(62, 65, 126),
    Color::rgb(55, 93, 148),
    Color::rgb(54, 120, 155),
    Color::rgb(64, 146, 160),
    Color::rgb(82, 172, 164),
    Color::rgb(111, 197, 165),
    Color::rgb(156, 217, 165),
    Color::rgb(206, 236, 179),
    Color::rgb(253, 254, 204),
];

impl ColorScale {
    pub const ALL: [ColorScale; 4] = [
        ColorScale::RdBu,
        ColorScale::Viridis,
        ColorScale::NipySpectral,
        ColorScale::Deep,
    ];

    /// Canonical lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            ColorScale::RdBu => "rdbu",
            ColorScale::Viridis => "viridis",
            ColorScale::NipySpectral => "nipy_spectral",
            ColorScale::Deep => "deep",
        }
    }

    fn stops(&self) -> &'static [Color] {
        match self {
            ColorScale::RdBu => RDBU,
            ColorScale::Viridis => VIRIDIS,
            ColorScale::NipySpectral => NIPY_SPECTRAL,
            ColorScale::Deep => DEEP,
        }
    }

    /// Color at normalized position `t` (clamped to [0, 1]). Always opaque.
    pub fn sample(&self, t: f64) -> Color {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        interpolate_color(stops[i], stops[i + 1], scaled - i as f64)
    }
}

impl FromStr for ColorScale {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rdbu" => Ok(ColorScale::RdBu),
            "viridis" => Ok(ColorScale::Viridis),
            "nipy_spectral" => Ok(ColorScale::NipySpectral),
            "deep" | "ocean" => Ok(ColorScale::Deep),
            _ => Err(StyleError::UnknownColorScale(s.to_string())),
        }
    }
}

impl TryFrom<String> for ColorScale {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorScale> for String {
    fn from(scale: ColorScale) -> Self {
        scale.name().to_string()
    }
}

impl fmt::Display for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
