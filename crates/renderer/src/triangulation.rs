//! Delaunay triangulation of scattered samples and gap masking.
//!
//! Triangulation happens in plain (lon, lat) degrees. Triangles much larger
//! than the typical triangle usually bridge a data void (cloud cover, land,
//! swath edges) and are masked so no color is interpolated across them.

use crate::error::{RenderError, RenderResult};
use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation};
use std::collections::HashSet;

struct Vertex {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for Vertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Triangulated samples with a per-triangle visibility mask.
#[derive(Debug, Clone)]
pub struct TriMesh {
    /// Vertex positions as (lon, lat).
    pub points: Vec<(f64, f64)>,
    /// Sample value at each vertex.
    pub values: Vec<f64>,
    /// Vertex indices of every triangle.
    pub triangles: Vec<[usize; 3]>,
    /// `true` for triangles excluded from rendering.
    pub masked: Vec<bool>,
}

impl TriMesh {
    /// Triangulate `(lon, lat, value)` samples.
    ///
    /// Samples sharing a position are collapsed to the first occurrence. Fails
    /// with `Degenerate` when the samples produce no triangle at all (fewer
    /// than three distinct positions, or all on one line).
    pub fn build(samples: &[(f64, f64, f64)]) -> RenderResult<Self> {
        let mut seen = HashSet::with_capacity(samples.len());
        let mut points = Vec::with_capacity(samples.len());
        let mut values = Vec::with_capacity(samples.len());
        for &(lon, lat, value) in samples {
            if seen.insert((lon.to_bits(), lat.to_bits())) {
                points.push((lon, lat));
                values.push(value);
            }
        }

        if points.len() < 3 {
            return Err(RenderError::InsufficientData {
                points: points.len(),
            });
        }

        let vertices: Vec<Vertex> = points
            .iter()
            .enumerate()
            .map(|(index, &(lon, lat))| Vertex {
                position: Point2::new(lon, lat),
                index,
            })
            .collect();

        let delaunay: DelaunayTriangulation<Vertex> = DelaunayTriangulation::bulk_load(vertices)
            .map_err(|e| RenderError::Triangulation(e.to_string()))?;

        let triangles: Vec<[usize; 3]> = delaunay
            .inner_faces()
            .map(|face| {
                let [a, b, c] = face.vertices();
                [a.data().index, b.data().index, c.data().index]
            })
            .collect();

        if triangles.is_empty() {
            return Err(RenderError::Degenerate(format!(
                "{} samples produce no triangle",
                points.len()
            )));
        }

        let masked = vec![false; triangles.len()];
        Ok(Self {
            points,
            values,
            triangles,
            masked,
        })
    }

    /// Planar area of every triangle, in square degrees.
    pub fn areas(&self) -> Vec<f64> {
        self.triangles
            .iter()
            .map(|&[a, b, c]| triangle_area(self.points[a], self.points[b], self.points[c]))
            .collect()
    }

    /// Mask every triangle whose area exceeds `ratio` times the median area.
    /// Returns the number of masked triangles.
    pub fn mask_large_triangles(&mut self, ratio: f64) -> usize {
        let areas = self.areas();
        let Some(median_area) = median(&areas) else {
            return 0;
        };
        let threshold = ratio * median_area;
        self.masked = areas.iter().map(|&area| area > threshold).collect();
        self.masked.iter().filter(|&&m| m).count()
    }

    /// Indices of triangles left visible by the mask.
    pub fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.triangles.len()).filter(move |&i| !self.masked[i])
    }

    /// Vertices and values of triangle `i`.
    pub fn triangle(&self, i: usize) -> ([(f64, f64); 3], [f64; 3]) {
        let [a, b, c] = self.triangles[i];
        (
            [self.points[a], self.points[b], self.points[c]],
            [self.values[a], self.values[b], self.values[c]],
        )
    }
}

/// Area of a triangle from the cross product of two edges.
pub fn triangle_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let (e1x, e1y) = (b.0 - a.0, b.1 - a.1);
    let (e2x, e2y) = (c.0 - a.0, c.1 - a.1);
    0.5 * (e1x * e2y - e1y * e2x).abs()
}

/// Median of `values`; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Barycentric weights of `p` in triangle `(a, b, c)`, or `None` when the
/// triangle has no area.
pub fn barycentric(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<[f64; 3]> {
    let det = (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1);
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let w1 = ((b.1 - c.1) * (p.0 - c.0) + (c.0 - b.0) * (p.1 - c.1)) / det;
    let w2 = ((c.1 - a.1) * (p.0 - c.0) + (a.0 - c.0) * (p.1 - c.1)) / det;
    Some([w1, w2, 1.0 - w1 - w2])
}
