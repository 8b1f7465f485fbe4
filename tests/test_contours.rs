mod common;

use common::*;
use shapedetector::detection::contours::{extract_contours, filter_by_area, is_area_allowed};
use shapedetector::detection::dedup::suppress_duplicates;

#[test]
fn test_extracts_one_contour_per_region() {
    let mut mask = blank_mask(100, 100);
    fill_rect(&mut mask, 10, 10, 20, 20);
    fill_rect(&mut mask, 60, 50, 30, 10);

    let contours = extract_contours(&mask);
    assert_eq!(contours.len(), 2);

    // scan-line order of the first pixel
    assert_eq!(contours[0].bounding_box(), Some(BoundingBox { x: 10, y: 10, width: 20, height: 20 }));
    assert_eq!(contours[1].bounding_box(), Some(BoundingBox { x: 60, y: 50, width: 30, height: 10 }));
}

#[test]
fn test_holes_and_nested_regions_are_skipped() {
    let mut mask = blank_mask(100, 100);
    fill_rect(&mut mask, 10, 10, 60, 60);
    // hole with an island inside it
    for y in 20..60 {
        for x in 20..60 {
            mask.put_pixel(x, y, image::Luma([0]));
        }
    }
    fill_rect(&mut mask, 35, 35, 10, 10);

    let contours = extract_contours(&mask);
    assert_eq!(contours.len(), 1);
    assert_eq!(contours[0].bounding_box().map(|b| b.width), Some(60));
}

#[test]
fn test_empty_mask_has_no_contours() {
    assert!(extract_contours(&blank_mask(40, 40)).is_empty());
}

#[test]
fn test_traced_square_measurements() {
    let mut mask = blank_mask(80, 80);
    fill_rect(&mut mask, 20, 20, 32, 32);

    let contours = extract_contours(&mask);
    let square = &contours[0];

    // polygon through the border pixel centers
    assert_eq!(square.area(), 31.0 * 31.0);
    assert_eq!(square.center(), Some(Point::new(35, 35)));
    assert!((square.perimeter() - 4.0 * 31.0).abs() < 1e-9);
}

#[test]
fn test_area_bounds_are_inclusive() {
    let (min, max) = (400.0, 2500.0);

    assert!(is_area_allowed(&rect_contour(0, 0, 20, 20), min, max));
    assert!(!is_area_allowed(&rect_contour(0, 0, 21, 19), min, max));
    assert!(is_area_allowed(&rect_contour(0, 0, 50, 50), min, max));
    assert!(!is_area_allowed(&rect_contour(0, 0, 41, 61), min, max));
}

#[test]
fn test_filter_by_area_keeps_order() {
    let contours = vec![
        rect_contour(0, 0, 30, 30),
        rect_contour(0, 0, 5, 5),
        rect_contour(100, 100, 25, 25),
        rect_contour(0, 0, 100, 100),
    ];

    let kept = filter_by_area(contours, 400.0, 2500.0);
    assert_eq!(kept, vec![rect_contour(0, 0, 30, 30), rect_contour(100, 100, 25, 25)]);
}

#[test]
fn test_duplicates_within_margin_are_dropped() -> anyhow::Result<()> {
    let contours = vec![
        square_around(50, 50, 20),
        square_around(50, 50, 22),
        square_around(60, 40, 20),
        square_around(61, 50, 20),
    ];

    let kept = suppress_duplicates(contours, 10)?;

    // (60, 40) is exactly at the margin, (61, 50) just outside it
    assert_eq!(kept, vec![square_around(50, 50, 20), square_around(61, 50, 20)]);
    Ok(())
}

#[test]
fn test_first_of_a_chain_survives() -> anyhow::Result<()> {
    let chain = vec![
        square_around(50, 50, 20),
        square_around(58, 50, 20),
        square_around(66, 50, 20),
    ];

    let kept = suppress_duplicates(chain, 10)?;

    // the middle one is dropped, the last is compared to the survivor only
    assert_eq!(kept, vec![square_around(50, 50, 20), square_around(66, 50, 20)]);

    let again = suppress_duplicates(kept.clone(), 10)?;
    assert_eq!(again, kept);
    Ok(())
}

#[test]
fn test_zero_area_contour_is_an_error() {
    let line = Contour::new(vec![Point::new(0, 0), Point::new(5, 0), Point::new(10, 0)]);
    let contours = vec![square_around(50, 50, 20), line];

    let err = suppress_duplicates(contours, 10).unwrap_err();
    assert!(matches!(err, DetectorError::DegenerateContour { index: 1 }));
}

#[test]
fn test_empty_input_stays_empty() -> anyhow::Result<()> {
    assert!(suppress_duplicates(Vec::new(), 10)?.is_empty());
    Ok(())
}
