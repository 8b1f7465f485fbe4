use crate::error::DetectorError;
use crate::models::{Contour, Point};

/// Drop contours whose center lies within `margin` (on both axes) of an
/// earlier, surviving contour.
///
/// Order is preserved and the first contour of every cluster is the one that
/// survives. Every contour must enclose a non-zero area.
pub fn suppress_duplicates(contours: Vec<Contour>, margin: i32) -> Result<Vec<Contour>, DetectorError> {
    let centers = contours
        .iter()
        .enumerate()
        .map(|(index, c)| c.center().ok_or(DetectorError::DegenerateContour { index }))
        .collect::<Result<Vec<Point>, _>>()?;

    let mut kept_centers: Vec<Point> = Vec::with_capacity(contours.len());
    let mut kept = Vec::with_capacity(contours.len());

    for (contour, center) in contours.into_iter().zip(centers) {
        let duplicate = kept_centers
            .iter()
            .any(|k| (k.x - center.x).abs() <= margin && (k.y - center.y).abs() <= margin);
        if duplicate {
            tracing::trace!(x = center.x, y = center.y, "dropping duplicate contour");
            continue;
        }
        kept_centers.push(center);
        kept.push(contour);
    }

    Ok(kept)
}
