//! Triangulated rasterization of one map tile.

use crate::contour::{contour_segments, stroke_segments, Point};
use crate::error::{RenderError, RenderResult};
use crate::options::RenderOptions;
use crate::png::encode_png;
use crate::style::ColorSpec;
use crate::triangulation::{barycentric, TriMesh};
use image::imageops::FilterType;
use std::time::Instant;
use tile_common::{tile_bounds, PointCloud, TileBounds, TileCoord, TileResult};
use tracing::{debug, info};

/// Tolerance on barycentric weights so pixel centres on a shared edge are
/// never dropped by rounding.
const EDGE_EPSILON: f64 = 1e-9;

/// Square straight-alpha RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Fully transparent `size × size` image.
    pub fn transparent(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            pixels: vec![0; size as usize * size as usize * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> RenderResult<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(RenderError::Canvas(format!(
                "{} bytes do not form a {}x{} RGBA image",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Number of pixels with non-zero alpha.
    pub fn coverage(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.coverage() == 0
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        encode_png(&self.pixels, self.width as usize, self.height as usize)
    }
}

/// A rendered tile together with the reason it fell back to a transparent
/// placeholder, if it did.
#[derive(Debug, Clone)]
pub struct RenderedTile {
    pub image: RasterImage,
    pub fallback: Option<RenderError>,
}

impl RenderedTile {
    pub fn is_placeholder(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Render one tile.
///
/// Only an invalid coordinate is an error. Sparse data and triangulation or
/// rendering failures yield a fully transparent image.
pub fn render_tile(
    cloud: &PointCloud,
    coord: &TileCoord,
    spec: &ColorSpec,
    options: &RenderOptions,
) -> TileResult<RasterImage> {
    render_tile_outcome(cloud, coord, spec, options).map(|tile| tile.image)
}

/// Like [`render_tile`], but reports why a placeholder was produced.
pub fn render_tile_outcome(
    cloud: &PointCloud,
    coord: &TileCoord,
    spec: &ColorSpec,
    options: &RenderOptions,
) -> TileResult<RenderedTile> {
    let bounds = tile_bounds(coord)?;

    match rasterize(cloud, &bounds, spec, options) {
        Ok(image) => Ok(RenderedTile {
            image,
            fallback: None,
        }),
        Err(e) => {
            if options.verbose {
                info!(zoom = coord.z, x = coord.x, y = coord.y, reason = %e, "Transparent tile");
            } else {
                debug!(zoom = coord.z, x = coord.x, y = coord.y, reason = %e, "Transparent tile");
            }
            Ok(RenderedTile {
                image: RasterImage::transparent(options.pixel_size),
                fallback: Some(e),
            })
        }
    }
}

/// Rasterize the samples around `bounds` into a `pixel_size` square image.
///
/// Rows are linear in Mercator y, columns linear in longitude, so the image
/// covers the tile edge to edge. Uncovered and masked areas stay transparent.
pub fn rasterize(
    cloud: &PointCloud,
    bounds: &TileBounds,
    spec: &ColorSpec,
    options: &RenderOptions,
) -> RenderResult<RasterImage> {
    let started = Instant::now();

    let window = bounds.buffered(options.buffer_fraction);
    let selected = cloud.indices_within(&window);
    if selected.len() < 3 {
        return Err(RenderError::InsufficientData {
            points: selected.len(),
        });
    }

    let samples: Vec<(f64, f64, f64)> = selected
        .iter()
        .map(|&i| {
            let (lat, lon, value) = cloud.sample(i);
            (lon, lat, value)
        })
        .collect();

    let mut mesh = TriMesh::build(&samples)?;
    let masked = mesh.mask_large_triangles(options.mask_ratio);
    debug!(
        points = mesh.points.len(),
        triangles = mesh.triangles.len(),
        masked,
        "Triangulated tile window"
    );

    let size = options.canvas_size()?;
    let canvas = size as f64;
    let col_lon: Vec<f64> = (0..size)
        .map(|px| bounds.pixel_to_lonlat(px as f64 + 0.5, 0.0, canvas).0)
        .collect();
    let row_lat: Vec<f64> = (0..size)
        .map(|py| bounds.pixel_to_lonlat(0.0, py as f64 + 0.5, canvas).1)
        .collect();

    let mut pixels = vec![0u8; size as usize * size as usize * 4];
    for i in mesh.visible() {
        if let Some(limit) = options.tile_timeout {
            if started.elapsed() > limit {
                return Err(RenderError::Timeout(limit));
            }
        }
        let (vertices, values) = mesh.triangle(i);
        fill_triangle(&mut pixels, size, bounds, &col_lon, &row_lat, vertices, values, spec);
    }

    if !spec.contour_levels().is_empty() {
        let segments = contour_segments(&mesh, spec.contour_levels(), |lon, lat| {
            let (x, y) = bounds.lonlat_to_pixel(lon, lat, canvas);
            Point::new(x as f32, y as f32)
        });
        pixels = stroke_segments(
            pixels,
            size,
            size,
            &segments,
            spec.contour_style(),
            options.supersample.max(1) as f32,
        )?;
    }

    if size != options.pixel_size {
        pixels = downsample(pixels, size, options.pixel_size)?;
    }

    RasterImage::from_rgba(options.pixel_size, options.pixel_size, pixels)
}

/// Paint every pixel whose centre lies inside the triangle with the band
/// color of the linearly interpolated value.
#[allow(clippy::too_many_arguments)]
fn fill_triangle(
    pixels: &mut [u8],
    size: u32,
    bounds: &TileBounds,
    col_lon: &[f64],
    row_lat: &[f64],
    vertices: [(f64, f64); 3],
    values: [f64; 3],
    spec: &ColorSpec,
) {
    let [a, b, c] = vertices;
    let lon_min = a.0.min(b.0).min(c.0);
    let lon_max = a.0.max(b.0).max(c.0);
    let lat_min = a.1.min(b.1).min(c.1);
    let lat_max = a.1.max(b.1).max(c.1);

    let canvas = size as f64;
    let (x0, y0) = bounds.lonlat_to_pixel(lon_min, lat_max, canvas);
    let (x1, y1) = bounds.lonlat_to_pixel(lon_max, lat_min, canvas);

    let last = size as i64 - 1;
    let col_start = ((x0 - 0.5).ceil() as i64).max(0);
    let col_end = ((x1 - 0.5).floor() as i64).min(last);
    let row_start = ((y0 - 0.5).ceil() as i64).max(0);
    let row_end = ((y1 - 0.5).floor() as i64).min(last);
    if col_start > col_end || row_start > row_end {
        return;
    }

    if barycentric(a, a, b, c).is_none() {
        return;
    }

    for py in row_start as usize..=row_end as usize {
        let lat = row_lat[py];
        for px in col_start as usize..=col_end as usize {
            let Some(w) = barycentric((col_lon[px], lat), a, b, c) else {
                continue;
            };
            if w.iter().any(|&wi| wi < -EDGE_EPSILON) {
                continue;
            }
            let value = w[0] * values[0] + w[1] * values[1] + w[2] * values[2];
            let color = spec.color_for(value);
            let i = (py * size as usize + px) * 4;
            pixels[i..i + 4].copy_from_slice(&color.to_array());
        }
    }
}

fn downsample(pixels: Vec<u8>, from: u32, to: u32) -> RenderResult<Vec<u8>> {
    let canvas = image::RgbaImage::from_raw(from, from, pixels)
        .ok_or_else(|| RenderError::Canvas("supersampled canvas has the wrong length".into()))?;
    Ok(image::imageops::resize(&canvas, to, to, FilterType::Lanczos3).into_raw())
}
