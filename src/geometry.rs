//! Polygon geometry over traced contours: moments, centroid, arc length and
//! Douglas-Peucker simplification.
//!
//! Perimeter and area come from `imageproc::geometry`. The closed-contour
//! simplification is done here: it must accept a zero tolerance and must not
//! keep the tracer's start point as a vertex.

use crate::models::Point;

/// Raw geometric moments of a closed polygon
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

/// Moments of the polygon described by `points` (Green's theorem).
///
/// `m00` is the signed enclosed area; its sign follows the winding order.
pub fn moments(points: &[Point]) -> Moments {
    if points.len() < 3 {
        return Moments::default();
    }

    let mut m = Moments::default();
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let (xi, yi) = (p.x as f64, p.y as f64);
        let (xj, yj) = (q.x as f64, q.y as f64);
        let cross = xi * yj - xj * yi;
        m.m00 += cross;
        m.m10 += cross * (xi + xj);
        m.m01 += cross * (yi + yj);
    }
    m.m00 /= 2.0;
    m.m10 /= 6.0;
    m.m01 /= 6.0;
    m
}

/// Centroid `(M10/M00, M01/M00)` truncated to pixel coordinates.
///
/// Returns `None` for a zero-area contour.
pub fn contour_center(points: &[Point]) -> Option<Point> {
    let m = moments(points);
    if m.m00.abs() < f64::EPSILON {
        return None;
    }
    Some(Point::new((m.m10 / m.m00) as i32, (m.m01 / m.m00) as i32))
}

fn to_imageproc(points: &[Point]) -> Vec<imageproc::point::Point<i32>> {
    points
        .iter()
        .map(|p| imageproc::point::Point::new(p.x, p.y))
        .collect()
}

/// Total length of a polyline, including the closing segment when `closed`
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    imageproc::geometry::arc_length(&to_imageproc(points), closed)
}

/// Unsigned enclosed area of a closed polygon (shoelace)
pub fn contour_area(points: &[Point]) -> f64 {
    imageproc::geometry::contour_area(&to_imageproc(points))
}

fn distance(a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `point` to the line through `start` and `end`
fn perpendicular_distance(point: Point, start: Point, end: Point) -> f64 {
    let dx = (end.x - start.x) as f64;
    let dy = (end.y - start.y) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-9 {
        return distance(point, start);
    }
    let px = (point.x - start.x) as f64;
    let py = (point.y - start.y) as f64;
    (dx * py - dy * px).abs() / len
}

/// Douglas-Peucker simplification of an open polyline. Both endpoints are kept.
pub fn douglas_peucker(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in start + 1..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }
        if max_dist > epsilon {
            keep[max_idx] = true;
            stack.push((start, max_idx));
            stack.push((max_idx, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Douglas-Peucker simplification of a closed contour.
///
/// The contour is split at the point farthest from its first point and both
/// halves are simplified separately. The starting point is dropped again when
/// it lies within `epsilon` of the line joining its neighbours, so where the
/// tracer happened to start does not add a vertex.
pub fn approximate_closed_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let origin = points[0];
    let mut split = 0;
    let mut max_dist = 0.0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let d = distance(origin, *p);
        if d > max_dist {
            max_dist = d;
            split = i;
        }
    }
    if split == 0 {
        return vec![origin];
    }

    let mut polygon = douglas_peucker(&points[..=split], epsilon);

    let mut back: Vec<Point> = points[split..].to_vec();
    back.push(origin);
    let back = douglas_peucker(&back, epsilon);
    polygon.extend_from_slice(&back[1..back.len() - 1]);

    if polygon.len() > 3 {
        let prev = polygon[polygon.len() - 1];
        let next = polygon[1];
        if perpendicular_distance(polygon[0], prev, next) <= epsilon {
            polygon.remove(0);
        }
    }

    polygon
}
