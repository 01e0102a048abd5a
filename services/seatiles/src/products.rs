//! The products tiled for a cruise and how each one is styled.

use renderer::{ColorScale, LineStyle, StyleDefinition};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tile_common::GeoGrid;

const KELVIN_OFFSET: f64 = 273.15;

/// Bathymetry is filled in 100 m bands and contoured every 500 m.
const BATHY_FLOOR: f64 = -6000.0;
const BATHY_BANDS: u32 = 60;
const BATHY_CONTOUR_STEP: f64 = 500.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown product '{0}' (expected one of ssh, ostia, sst, globcolour, gebco)")]
pub struct UnknownProduct(pub String);

/// A gridded ocean product. The id doubles as its tile directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Sea surface height anomaly (m).
    Ssh,
    /// OSTIA sea surface temperature, delivered in Kelvin.
    #[serde(alias = "sst")]
    Ostia,
    /// GlobColour chlorophyll-a (mg/m³), tiled on a log scale.
    Globcolour,
    /// GEBCO bathymetry (m, negative down).
    Gebco,
}

impl Product {
    pub const ALL: [Product; 4] = [Product::Ssh, Product::Ostia, Product::Globcolour, Product::Gebco];

    /// Products refreshed every day.
    pub const DAILY: [Product; 3] = [Product::Ssh, Product::Ostia, Product::Globcolour];

    pub fn id(&self) -> &'static str {
        match self {
            Product::Ssh => "ssh",
            Product::Ostia => "ostia",
            Product::Globcolour => "globcolour",
            Product::Gebco => "gebco",
        }
    }

    /// Layer name shown in the map viewer.
    pub fn display_name(&self) -> &'static str {
        match self {
            Product::Ssh => "SSH CMEMS 0.125\u{b0}",
            Product::Ostia => "SST OSTIA 5km",
            Product::Globcolour => "Chl GlobColour 4km",
            Product::Gebco => "Bathymetry GEBCO",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Product::Ssh => "Copernicus 1/8\u{b0} SSH -0.75\u{2013}0.75 m",
            Product::Ostia => "OSTIA SST 10\u{2013}28\u{b0}C",
            Product::Globcolour => "GlobColour 4km Chl 0.01\u{2013}100 mg/m3",
            Product::Gebco => "GEBCO bathymetry 0\u{2013}6000 m",
        }
    }

    /// Convert a raw value into the unit the style is defined in.
    pub fn transform(&self, value: f64) -> f64 {
        match self {
            Product::Ssh | Product::Gebco => value,
            Product::Ostia => value - KELVIN_OFFSET,
            Product::Globcolour => value.ln(),
        }
    }

    /// Apply [`Product::transform`] to a whole grid. Values without a finite
    /// transform (log of zero) become missing data.
    pub fn apply(&self, grid: GeoGrid) -> GeoGrid {
        let product = *self;
        grid.map_values(move |v| product.transform(v))
    }

    pub fn default_style(&self) -> StyleDefinition {
        match self {
            Product::Ssh => StyleDefinition::new(ColorScale::RdBu, Some(-0.75), Some(0.75), 20),
            Product::Ostia => StyleDefinition::new(ColorScale::Viridis, Some(10.0), Some(28.0), 20),
            Product::Globcolour => StyleDefinition::new(ColorScale::NipySpectral, Some(-4.6), Some(4.6), 50),
            Product::Gebco => StyleDefinition {
                contour_levels: Some(bathymetry_contours()),
                contour_line: Some(LineStyle::default()),
                ..StyleDefinition::new(ColorScale::Deep, Some(BATHY_FLOOR), Some(0.0), BATHY_BANDS)
            },
        }
    }
}

/// -6000, -5500, ..., -500 m.
fn bathymetry_contours() -> Vec<f64> {
    let steps = (-BATHY_FLOOR / BATHY_CONTOUR_STEP) as usize;
    (0..steps)
        .map(|i| BATHY_FLOOR + i as f64 * BATHY_CONTOUR_STEP)
        .collect()
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Product {
    type Err = UnknownProduct;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(Product::Ssh),
            "ostia" | "sst" => Ok(Product::Ostia),
            "globcolour" | "chl" => Ok(Product::Globcolour),
            "gebco" | "bathymetry" => Ok(Product::Gebco),
            _ => Err(UnknownProduct(s.to_string())),
        }
    }
}
