//! Experimental half-circle detection with a Hough circle transform.
//!
//! Full circles are found by letting every edge pixel vote for the centers
//! that lie along its gradient direction. For each circle the circumference
//! is then sampled: a half circle has only about half of its circumference on
//! an edge, a full circle nearly all of it.

use image::GrayImage;
use imageproc::distance_transform::{Norm, distance_transform};
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::config::{DetectorConfig, HoughConfig};
use crate::detection::classify::measure;
use crate::detection::preprocessing::detect_edges;
use crate::models::{BoundingBox, Contour, DetectionResult, Point, ShapeKind};

/// Half-width of the window votes are summed over when looking for centers
const VOTE_WINDOW: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub center: Point,
    pub radius: u32,
}

fn edge_points(edges: &GrayImage) -> Vec<(u32, u32)> {
    edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| (x, y))
        .collect()
}

/// Detect circles in `mask`, strongest first.
///
/// `edges` must be the edge map of `mask`.
pub fn hough_circles(mask: &GrayImage, edges: &GrayImage, params: &HoughConfig) -> Vec<Circle> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    // gradients of a softened mask point reliably along the normal
    let smooth = gaussian_blur_f32(mask, 1.5);
    let gx = horizontal_sobel(&smooth);
    let gy = vertical_sobel(&smooth);

    let points = edge_points(edges);
    let (w, h) = (width as i64, height as i64);
    let mut votes = vec![0u32; (width * height) as usize];

    for &(x, y) in &points {
        let dx = gx.get_pixel(x, y)[0] as f64;
        let dy = gy.get_pixel(x, y)[0] as f64;
        let mag = dx.hypot(dy);
        if mag < 1.0 {
            continue;
        }
        let (ux, uy) = (dx / mag, dy / mag);
        for sign in [1.0, -1.0] {
            for r in params.min_radius..=params.max_radius {
                let cx = (x as f64 + sign * r as f64 * ux).round() as i64;
                let cy = (y as f64 + sign * r as f64 * uy).round() as i64;
                if cx < 0 || cy < 0 || cx >= w || cy >= h {
                    break;
                }
                votes[(cy * w + cx) as usize] += 1;
            }
        }
    }

    let window_sum = |cx: i64, cy: i64| -> u32 {
        let mut sum = 0;
        for y in (cy - VOTE_WINDOW).max(0)..=(cy + VOTE_WINDOW).min(h - 1) {
            for x in (cx - VOTE_WINDOW).max(0)..=(cx + VOTE_WINDOW).min(w - 1) {
                sum += votes[(y * w + x) as usize];
            }
        }
        sum
    };
    let summed: Vec<u32> = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .map(|(x, y)| window_sum(x, y))
        .collect();

    let mut candidates: Vec<(u32, i64, i64)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let score = summed[(y * w + x) as usize];
            if score < params.accumulator_threshold {
                continue;
            }
            let is_peak = (-1..=1).all(|oy: i64| {
                (-1..=1).all(|ox: i64| {
                    let (nx, ny) = (x + ox, y + oy);
                    nx < 0 || ny < 0 || nx >= w || ny >= h || summed[(ny * w + nx) as usize] <= score
                })
            });
            if is_peak {
                candidates.push((score, x, y));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.2.cmp(&b.2)).then(a.1.cmp(&b.1)));

    let mut circles: Vec<Circle> = Vec::new();
    for (_, x, y) in candidates {
        let center = Point::new(x as i32, y as i32);
        let too_close = circles.iter().any(|c| {
            let dx = (c.center.x - center.x) as f64;
            let dy = (c.center.y - center.y) as f64;
            dx.hypot(dy) < params.min_center_distance
        });
        if too_close {
            continue;
        }
        if let Some(radius) = estimate_radius(center, &points, params) {
            circles.push(Circle { center, radius });
        }
    }

    circles
}

/// Most common edge distance from `center` within the radius range
fn estimate_radius(center: Point, points: &[(u32, u32)], params: &HoughConfig) -> Option<u32> {
    let span = (params.max_radius - params.min_radius + 1) as usize;
    let mut histogram = vec![0u32; span];
    for &(x, y) in points {
        let dx = x as f64 - center.x as f64;
        let dy = y as f64 - center.y as f64;
        let d = dx.hypot(dy).round() as u32;
        if d >= params.min_radius && d <= params.max_radius {
            histogram[(d - params.min_radius) as usize] += 1;
        }
    }

    let (offset, &count) = histogram
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
    (count > 0).then_some(params.min_radius + offset as u32)
}

/// Fraction of circumference samples lying on or near an edge.
///
/// `distances` holds, per pixel, the distance to the nearest edge pixel.
/// A sample counts when that distance is within `radius * tolerance`
/// (never less than one pixel). Samples outside the image never count.
pub fn circumference_inlier_fraction(
    distances: &GrayImage,
    circle: &Circle,
    step_degrees: f64,
    tolerance: f64,
) -> f64 {
    let limit = (circle.radius as f64 * tolerance).max(1.0);
    let samples = (360.0 / step_degrees).floor().max(1.0) as usize;
    let (w, h) = (distances.width() as i64, distances.height() as i64);

    let inliers = (0..samples)
        .filter(|i| {
            let theta = (*i as f64 * step_degrees).to_radians();
            let x = (circle.center.x as f64 + circle.radius as f64 * theta.cos()).round() as i64;
            let y = (circle.center.y as f64 + circle.radius as f64 * theta.sin()).round() as i64;
            x >= 0
                && y >= 0
                && x < w
                && y < h
                && distances.get_pixel(x as u32, y as u32)[0] as f64 <= limit
        })
        .count();

    inliers as f64 / samples as f64
}

fn near_box(b: &BoundingBox, p: Point, margin: i32) -> bool {
    p.x >= b.x - margin
        && p.y >= b.y - margin
        && p.x < b.x + b.width as i32 + margin
        && p.y < b.y + b.height as i32 + margin
}

/// Half circles among `contours`, found through Hough circles in `mask`.
///
/// Every circle whose circumference inlier fraction falls in the configured
/// band is attached to the first area-valid contour around its center; each
/// contour is reported at most once.
pub fn detect_half_circles(
    mask: &GrayImage,
    contours: &[Contour],
    config: &DetectorConfig,
) -> Vec<DetectionResult> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let params = &config.half_circle.hough;
    let edges = detect_edges(mask, params.canny_low, params.canny_high);
    let distances = distance_transform(&edges, Norm::LInf);
    let circles = hough_circles(mask, &edges, params);

    let measured: Vec<_> = contours.iter().map(|c| measure(c, config)).collect();
    let mut used = vec![false; contours.len()];
    let mut results = Vec::new();

    for circle in &circles {
        let fraction = circumference_inlier_fraction(
            &distances,
            circle,
            params.sample_step_degrees,
            params.inlier_tolerance,
        );
        tracing::debug!(
            x = circle.center.x,
            y = circle.center.y,
            radius = circle.radius,
            fraction,
            "hough circle"
        );
        if fraction < params.min_inlier_fraction || fraction > params.max_inlier_fraction {
            continue;
        }

        let owner = measured.iter().enumerate().position(|(i, m)| {
            !used[i]
                && m.as_ref().is_some_and(|m| {
                    near_box(&m.bounding_box, circle.center, config.contour_center_margin)
                })
        });
        if let Some(i) = owner {
            used[i] = true;
            if let Some(m) = measured[i].clone() {
                results.push(m.into_result(ShapeKind::HalfCircle));
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};

    #[test]
    fn test_finds_filled_disc() {
        let mut mask = GrayImage::new(120, 120);
        draw_filled_circle_mut(&mut mask, (60, 60), 30, Luma([255]));
        let params = HoughConfig::default();
        let edges = detect_edges(&mask, params.canny_low, params.canny_high);

        let circles = hough_circles(&mask, &edges, &params);
        let first = circles.first().expect("a circle");
        assert!((first.center.x - 60).abs() <= 3, "{first:?}");
        assert!((first.center.y - 60).abs() <= 3, "{first:?}");
        assert!((first.radius as i32 - 30).abs() <= 3, "{first:?}");
    }

    #[test]
    fn test_full_ring_is_all_inliers() {
        let mut edges = GrayImage::new(100, 100);
        draw_hollow_circle_mut(&mut edges, (50, 50), 25, Luma([255]));
        let distances = distance_transform(&edges, Norm::LInf);
        let circle = Circle {
            center: Point::new(50, 50),
            radius: 25,
        };
        let fraction = circumference_inlier_fraction(&distances, &circle, 5.0, 0.05);
        assert!(fraction > 0.95, "fraction {fraction}");
    }

    #[test]
    fn test_half_ring_is_half_inliers() {
        let mut ring = GrayImage::new(100, 100);
        draw_hollow_circle_mut(&mut ring, (50, 50), 25, Luma([255]));
        // keep only the upper arc
        let edges = GrayImage::from_fn(100, 100, |x, y| if y < 50 { *ring.get_pixel(x, y) } else { Luma([0]) });
        let distances = distance_transform(&edges, Norm::LInf);
        let circle = Circle {
            center: Point::new(50, 50),
            radius: 25,
        };
        let fraction = circumference_inlier_fraction(&distances, &circle, 5.0, 0.05);
        assert!(fraction > 0.4 && fraction < 0.65, "fraction {fraction}");
    }
}
