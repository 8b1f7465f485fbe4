use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};

use crate::models::{Contour, Point};

/// Find the outer boundaries of the foreground regions in a binary mask.
///
/// Holes and anything nested inside a hole are skipped. Contours come back in
/// scan-line order of their first pixel and keep every traced point.
pub fn extract_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(c.points.iter().map(|p| Point::new(p.x, p.y)).collect()))
        .collect()
}

/// Keep the contours whose area lies within `[min_area, max_area]`
pub fn filter_by_area(contours: Vec<Contour>, min_area: f64, max_area: f64) -> Vec<Contour> {
    contours
        .into_iter()
        .filter(|c| is_area_allowed(c, min_area, max_area))
        .collect()
}

pub fn is_area_allowed(contour: &Contour, min_area: f64, max_area: f64) -> bool {
    let area = contour.area();
    area >= min_area && area <= max_area
}
