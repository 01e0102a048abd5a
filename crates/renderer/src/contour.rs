//! Contour line (isoline) extraction and stroking.
//!
//! Lines are extracted per triangle (marching triangles) over the visible
//! part of the triangulation, so they stop at masked gaps exactly like the
//! fill does, and are stroked anti-aliased with tiny-skia.

use crate::error::{RenderError, RenderResult};
use crate::style::LineStyle;
use crate::triangulation::TriMesh;
use tiny_skia::{IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// A point in 2D space (pixel coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Crossing of `level` through one triangle, in the triangle's own
/// coordinates. `None` when the level does not cross the triangle.
///
/// A vertex counts as "above" when its value is `>= level`, so a level equal
/// to a vertex value yields a segment touching that vertex.
pub fn march_triangle(
    vertices: [(f64, f64); 3],
    values: [f64; 3],
    level: f64,
) -> Option<((f64, f64), (f64, f64))> {
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let above = values.map(|v| v >= level);
    if above.iter().all(|&a| a) || above.iter().all(|&a| !a) {
        return None;
    }

    let mut crossings = [(0.0, 0.0); 2];
    let mut found = 0;
    for (i, j) in [(0usize, 1usize), (1, 2), (2, 0)] {
        if above[i] != above[j] && found < 2 {
            let t = ((level - values[i]) / (values[j] - values[i])).clamp(0.0, 1.0);
            crossings[found] = (
                vertices[i].0 + t * (vertices[j].0 - vertices[i].0),
                vertices[i].1 + t * (vertices[j].1 - vertices[i].1),
            );
            found += 1;
        }
    }
    (found == 2).then_some((crossings[0], crossings[1]))
}

/// Segments for every level over the visible triangles of `mesh`, projected
/// to pixel space with `project(lon, lat)`.
pub fn contour_segments(
    mesh: &TriMesh,
    levels: &[f64],
    project: impl Fn(f64, f64) -> Point,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    for i in mesh.visible() {
        let (vertices, values) = mesh.triangle(i);
        for &level in levels {
            if let Some((a, b)) = march_triangle(vertices, values, level) {
                segments.push(Segment {
                    start: project(a.0, a.1),
                    end: project(b.0, b.1),
                });
            }
        }
    }
    segments
}

/// Stroke `segments` onto a straight (non-premultiplied) RGBA canvas.
///
/// The canvas must only contain fully opaque or fully transparent
/// `(0, 0, 0, 0)` pixels, which read identically as premultiplied data.
/// `scale` multiplies the configured line width (for supersampled canvases).
pub fn stroke_segments(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    segments: &[Segment],
    style: &LineStyle,
    scale: f32,
) -> RenderResult<Vec<u8>> {
    if segments.is_empty() {
        return Ok(pixels);
    }

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| RenderError::Canvas(format!("invalid canvas size {}x{}", width, height)))?;
    let mut pixmap = Pixmap::from_vec(pixels, size)
        .ok_or_else(|| RenderError::Canvas("canvas buffer does not match its size".into()))?;

    let [r, g, b, a] = style.color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let stroke = Stroke {
        width: style.width * scale,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut pb = PathBuilder::new();
    for segment in segments {
        pb.move_to(segment.start.x, segment.start.y);
        pb.line_to(segment.end.x, segment.end.y);
    }
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    let mut data = pixmap.take();
    demultiply(&mut data);
    Ok(data)
}

/// Convert premultiplied RGBA back to straight alpha in place.
fn demultiply(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a != 0 && a != 255 {
            for c in &mut px[..3] {
                *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRI: [(f64, f64); 3] = [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)];

    #[test]
    fn test_march_triangle_no_crossing() {
        assert!(march_triangle(TRI, [1.0, 2.0, 3.0], 5.0).is_none());
        assert!(march_triangle(TRI, [1.0, 2.0, 3.0], 0.5).is_none());
    }

    #[test]
    fn test_march_triangle_interpolates_edges() {
        let (a, b) = march_triangle(TRI, [0.0, 10.0, 0.0], 5.0).unwrap();
        // Crosses edge 0-1 at its midpoint and edge 1-2 at its midpoint.
        assert_eq!(a, (1.0, 0.0));
        assert_eq!(b, (1.0, 1.0));
    }

    #[test]
    fn test_stroke_draws_line() {
        let pixels = vec![0u8; 16 * 16 * 4];
        let segments = [Segment {
            start: Point::new(0.0, 8.0),
            end: Point::new(16.0, 8.0),
        }];
        let out = stroke_segments(pixels, 16, 16, &segments, &LineStyle::default(), 1.0).unwrap();
        let row = 7 * 16 * 4;
        let alpha: u32 = (0..16).map(|x| out[row + x * 4 + 3] as u32).sum();
        assert!(alpha > 0);
        // Far rows untouched.
        assert!(out[..4 * 16 * 4].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_stroke_keeps_opaque_fill() {
        let mut pixels = Vec::with_capacity(8 * 8 * 4);
        for _ in 0..64 {
            pixels.extend_from_slice(&[200, 100, 50, 255]);
        }
        let out = stroke_segments(pixels.clone(), 8, 8, &[], &LineStyle::default(), 1.0).unwrap();
        assert_eq!(out, pixels);
    }

    #[test]
    fn test_demultiply() {
        let mut data = [50u8, 25, 0, 128];
        demultiply(&mut data);
        assert_eq!(data, [100, 50, 0, 128]);
    }
}
