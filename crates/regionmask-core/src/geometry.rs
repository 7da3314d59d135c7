//! Stateless hit-testing over vertices and regions.
//!
//! All inputs are in content coordinates.

use crate::region::{Region, Vertex};
use kurbo::{CubicBez, ParamCurve, Point};

/// Samples per cubic segment when a curve is approximated as a polygon.
pub const DEFAULT_CURVE_SAMPLES: usize = 100;

/// Check if `point` lies within the vertex's hit radius (boundary inclusive).
pub fn hit_vertex(point: Point, vertex: &Vertex) -> bool {
    let dx = point.x - vertex.position.x;
    let dy = point.y - vertex.position.y;
    dx * dx + dy * dy <= vertex.radius * vertex.radius
}

/// Find the first vertex hit by `point`, scanning regions in store order.
///
/// Returns `(region_index, vertex_index)`.
pub fn find_vertex(point: Point, regions: &[Region]) -> Option<(usize, usize)> {
    regions.iter().enumerate().find_map(|(region_index, region)| {
        region
            .vertices()
            .iter()
            .position(|v| hit_vertex(point, v))
            .map(|vertex_index| (region_index, vertex_index))
    })
}

/// Find the topmost region containing `point`.
pub fn find_region(point: Point, regions: &[Region], samples: usize) -> Option<usize> {
    regions
        .iter()
        .rposition(|region| region.contains(point, samples))
}

/// Even-odd ray-casting containment test.
///
/// A horizontal ray is cast from `point` towards +x and edge crossings are
/// counted over the polygon taken as closed. Fewer than three points never
/// contain anything.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Cubic segments `[3i, 3i+1, 3i+2, 3i+3]` of a chained curve.
///
/// A trailing partial segment is ignored.
pub fn cubic_segments(vertices: &[Vertex]) -> Vec<CubicBez> {
    if vertices.len() < 4 {
        return Vec::new();
    }
    (0..(vertices.len() - 1) / 3)
        .map(|i| {
            let base = 3 * i;
            CubicBez::new(
                vertices[base].position,
                vertices[base + 1].position,
                vertices[base + 2].position,
                vertices[base + 3].position,
            )
        })
        .collect()
}

/// Approximate a chained curve as a polygon.
///
/// Each segment is evaluated at `samples + 1` evenly spaced parameters in
/// `[0, 1]` and all points are concatenated in order.
pub fn sample_curve_to_polygon(vertices: &[Vertex], samples: usize) -> Vec<Point> {
    let samples = samples.max(1);
    let segments = cubic_segments(vertices);
    let mut points = Vec::with_capacity(segments.len() * (samples + 1));
    for segment in segments {
        points.extend((0..=samples).map(|step| segment.eval(step as f64 / samples as f64)));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{CurveType, SerializableColor};

    fn vertex(x: f64, y: f64, radius: f64) -> Vertex {
        Vertex::anchor(Point::new(x, y), radius, SerializableColor::black())
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    fn polygon_region(points: &[(f64, f64)]) -> Region {
        Region::closed_from(
            CurveType::Polygon,
            points.iter().map(|&(x, y)| vertex(x, y, 2.0)).collect(),
        )
    }

    #[test]
    fn test_hit_vertex_boundary() {
        let v = vertex(0.0, 0.0, 5.0);
        assert!(hit_vertex(Point::new(5.0, 0.0), &v));
        assert!(hit_vertex(Point::new(0.0, -5.0), &v));
        assert!(hit_vertex(Point::new(3.0, 4.0), &v));
        assert!(!hit_vertex(Point::new(5.0 + 1e-9, 0.0), &v));
        assert!(!hit_vertex(Point::new(-5.0 - 1e-9, 0.0), &v));
    }

    #[test]
    fn test_point_in_square() {
        let polygon = square();
        assert!(point_in_polygon(Point::new(5.0, 5.0), &polygon));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &polygon));
        assert!(!point_in_polygon(Point::new(-1.0, 5.0), &polygon));
        assert!(!point_in_polygon(Point::new(5.0, 11.0), &polygon));
    }

    #[test]
    fn test_point_on_edge_is_deterministic() {
        let polygon = square();
        let on_edge = Point::new(10.0, 5.0);
        let first = point_in_polygon(on_edge, &polygon);
        for _ in 0..10 {
            assert_eq!(point_in_polygon(on_edge, &polygon), first);
        }
    }

    #[test]
    fn test_degenerate_polygon() {
        assert!(!point_in_polygon(Point::new(0.0, 0.0), &[]));
        assert!(!point_in_polygon(
            Point::new(1.0, 0.0),
            &[Point::new(0.0, 0.0), Point::new(2.0, 0.0)]
        ));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upwards
        let polygon = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 8.0),
            Point::new(7.0, 8.0),
            Point::new(7.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(1.5, 5.0), &polygon));
        assert!(!point_in_polygon(Point::new(5.0, 4.0), &polygon));
        assert!(point_in_polygon(Point::new(5.0, 9.0), &polygon));
    }

    #[test]
    fn test_curve_sampling_endpoints() {
        let vertices = vec![
            vertex(1.0, 2.0, 1.0),
            vertex(4.0, 9.0, 1.0),
            vertex(7.0, -3.0, 1.0),
            vertex(10.0, 5.0, 1.0),
        ];
        let points = sample_curve_to_polygon(&vertices, DEFAULT_CURVE_SAMPLES);
        assert_eq!(points.len(), DEFAULT_CURVE_SAMPLES + 1);
        let first = points[0];
        let last = points[points.len() - 1];
        assert!((first.x - 1.0).abs() < 1e-10 && (first.y - 2.0).abs() < 1e-10);
        assert!((last.x - 10.0).abs() < 1e-10 && (last.y - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_curve_sampling_matches_bezier_formula() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ];
        let vertices: Vec<Vertex> = p.iter().map(|p| vertex(p.x, p.y, 1.0)).collect();
        let points = sample_curve_to_polygon(&vertices, 4);
        let t: f64 = 0.25;
        let mt = 1.0 - t;
        let expected_x = mt.powi(3) * p[0].x
            + 3.0 * mt * mt * t * p[1].x
            + 3.0 * mt * t * t * p[2].x
            + t.powi(3) * p[3].x;
        let expected_y = mt.powi(3) * p[0].y
            + 3.0 * mt * mt * t * p[1].y
            + 3.0 * mt * t * t * p[2].y
            + t.powi(3) * p[3].y;
        assert!((points[1].x - expected_x).abs() < 1e-10);
        assert!((points[1].y - expected_y).abs() < 1e-10);
    }

    #[test]
    fn test_chained_segments_share_anchor() {
        let vertices: Vec<Vertex> = (0..7).map(|i| vertex(i as f64, 0.0, 1.0)).collect();
        let segments = cubic_segments(&vertices);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].p3, segments[1].p0);
        assert_eq!(sample_curve_to_polygon(&vertices, 10).len(), 22);
        // Partial trailing segment is skipped
        assert_eq!(cubic_segments(&vertices[..6]).len(), 1);
    }

    #[test]
    fn test_find_vertex_tie_break() {
        let regions = vec![
            polygon_region(&[(50.0, 50.0), (0.0, 0.0), (1.0, 0.0)]),
            polygon_region(&[(0.0, 0.0)]),
        ];
        assert_eq!(find_vertex(Point::new(0.5, 0.0), &regions), Some((0, 1)));
        assert_eq!(find_vertex(Point::new(50.0, 51.0), &regions), Some((0, 0)));
        assert_eq!(find_vertex(Point::new(100.0, 100.0), &regions), None);
    }

    #[test]
    fn test_find_region_topmost() {
        let regions = vec![
            polygon_region(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            polygon_region(&[(5.0, 5.0), (20.0, 5.0), (20.0, 20.0), (5.0, 20.0)]),
        ];
        assert_eq!(find_region(Point::new(2.0, 2.0), &regions, 10), Some(0));
        assert_eq!(find_region(Point::new(7.0, 7.0), &regions, 10), Some(1));
        assert_eq!(find_region(Point::new(30.0, 30.0), &regions, 10), None);
    }

    #[test]
    fn test_find_region_curve() {
        // Closed lens-shaped curve: two segments from (0,0) to (20,0) and back.
        let vertices = vec![
            vertex(0.0, 0.0, 1.0),
            vertex(5.0, -10.0, 1.0),
            vertex(15.0, -10.0, 1.0),
            vertex(20.0, 0.0, 1.0),
            vertex(15.0, 10.0, 1.0),
            vertex(5.0, 10.0, 1.0),
            vertex(0.0, 0.0, 1.0),
        ];
        let regions = vec![Region::closed_from(CurveType::CubicCurve, vertices)];
        assert_eq!(find_region(Point::new(10.0, 0.0), &regions, DEFAULT_CURVE_SAMPLES), Some(0));
        assert_eq!(find_region(Point::new(10.0, 6.0), &regions, DEFAULT_CURVE_SAMPLES), Some(0));
        assert_eq!(find_region(Point::new(10.0, 9.0), &regions, DEFAULT_CURVE_SAMPLES), None);
        assert_eq!(find_region(Point::new(30.0, 0.0), &regions, DEFAULT_CURVE_SAMPLES), None);
    }
}
