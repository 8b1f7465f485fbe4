mod common;

use common::*;
use shapedetector::{FrameSequence, StillImage};

fn detector() -> ShapeDetector {
    ShapeDetector::new(DetectorConfig::default()).expect("default config is valid")
}

#[test]
fn test_red_square_is_found() -> anyhow::Result<()> {
    let cycle = detector().handle_command(&scene(), "vierkant rood")?;

    assert_eq!(cycle.shape_count(), 1);
    let square = &cycle.results[0];
    assert_eq!(square.kind, ShapeKind::Square);
    // border pixel centers span 30..=61
    assert_eq!(square.center, Point::new(45, 45));
    assert_eq!(square.area, 31.0 * 31.0);
    assert_eq!(cycle.request, DetectionRequest::new(ShapeKind::Square, ColorKind::Red));
    Ok(())
}

#[test]
fn test_blue_circle_is_found() -> anyhow::Result<()> {
    let cycle = detector().handle_command(&scene(), "cirkel blauw")?;

    assert_eq!(cycle.shape_count(), 1);
    let circle = &cycle.results[0];
    assert_eq!(circle.kind, ShapeKind::Circle);
    let (cx, cy) = SCENE_DISC_CENTER;
    assert!((circle.center.x - cx).abs() <= 1, "center {:?}", circle.center);
    assert!((circle.center.y - cy).abs() <= 1, "center {:?}", circle.center);
    Ok(())
}

#[test]
fn test_wrong_shape_or_color_finds_nothing() -> anyhow::Result<()> {
    let detector = detector();
    let img = scene();

    assert_eq!(detector.handle_command(&img, "driehoek rood")?.shape_count(), 0);
    assert_eq!(detector.handle_command(&img, "cirkel rood")?.shape_count(), 0);
    assert_eq!(detector.handle_command(&img, "vierkant blauw")?.shape_count(), 0);
    assert_eq!(detector.handle_command(&img, "vierkant groen")?.shape_count(), 0);
    Ok(())
}

#[test]
fn test_unknown_tokens_are_not_errors() -> anyhow::Result<()> {
    let detector = detector();
    let img = scene();

    let cycle = detector.handle_command(&img, "bolletje rood")?;
    assert_eq!(cycle.request.shape, ShapeKind::Unknown);
    assert_eq!(cycle.shape_count(), 0);

    let cycle = detector.handle_command(&img, "vierkant paars")?;
    assert_eq!(cycle.request.color, ColorKind::Unknown);
    assert_eq!(cycle.shape_count(), 0);
    assert!(cycle.mask.pixels().all(|p| p[0] == 0));

    assert_eq!(detector.handle_command(&img, "vierkant")?.shape_count(), 0);
    Ok(())
}

#[test]
fn test_alles_labels_what_it_finds() -> anyhow::Result<()> {
    let cycle = detector().handle_command(&scene(), "alles rood")?;

    assert_eq!(cycle.shape_count(), 1);
    assert_eq!(cycle.results[0].kind, ShapeKind::Square);
    Ok(())
}

#[test]
fn test_cycle_outputs_match_frame() -> anyhow::Result<()> {
    let img = scene();
    let cycle = detector().handle_command(&img, "vierkant rood")?;

    assert_eq!(cycle.mask.dimensions(), img.dimensions());
    assert_eq!(cycle.annotated.dimensions(), img.dimensions());
    assert_ne!(cycle.annotated, img);
    Ok(())
}

#[test]
fn test_debug_helpers() -> anyhow::Result<()> {
    let detector = detector();
    let img = scene();

    let mask = detector.get_mask(&img, ColorKind::Red)?;
    assert_eq!(mask.pixels().filter(|p| p[0] == 255).count(), 32 * 32);

    let contours = detector.get_contours(&img, ColorKind::Blue)?;
    assert_eq!(contours.len(), 1);
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = DetectorConfig {
        min_contour_area: 0.0,
        ..DetectorConfig::default()
    };
    assert!(ShapeDetector::new(config).is_err());
}

#[test]
fn test_smaller_min_area_picks_up_small_shapes() -> anyhow::Result<()> {
    let mut img = blank_image(100, 100);
    imageproc::drawing::draw_filled_rect_mut(
        &mut img,
        imageproc::rect::Rect::at(20, 20).of_size(15, 15),
        RED,
    );

    let strict = detector();
    assert_eq!(strict.handle_command(&img, "vierkant rood")?.shape_count(), 0);

    let relaxed = ShapeDetector::new(DetectorConfig {
        min_contour_area: 100.0,
        ..DetectorConfig::default()
    })?;
    assert_eq!(relaxed.handle_command(&img, "vierkant rood")?.shape_count(), 1);
    Ok(())
}

#[test]
fn test_no_frame_means_no_cycle() -> anyhow::Result<()> {
    let detector = detector();
    let request = DetectionRequest::parse("vierkant rood");

    let mut frames = FrameSequence::new([scene()]);
    let first = detector.run_cycle(&mut frames, &request)?;
    assert_eq!(first.map(|c| c.shape_count()), Some(1));
    assert!(detector.run_cycle(&mut frames, &request)?.is_none());

    let mut empty = FrameSequence::default();
    assert!(detector.run_cycle(&mut empty, &request)?.is_none());
    Ok(())
}

#[test]
fn test_still_image_serves_every_cycle() -> anyhow::Result<()> {
    let detector = detector();
    let request = DetectionRequest::parse("cirkel blauw");
    let mut still = StillImage::new(scene());

    for _ in 0..3 {
        let cycle = detector.run_cycle(&mut still, &request)?;
        assert_eq!(cycle.map(|c| c.shape_count()), Some(1));
    }
    Ok(())
}

#[test]
fn test_still_image_from_file() -> anyhow::Result<()> {
    let file = save_temp_png(&scene());
    let mut still = StillImage::open(file.path())?;

    let cycle = detector().run_cycle(&mut still, &DetectionRequest::parse("vierkant rood"))?;
    assert_eq!(cycle.map(|c| c.shape_count()), Some(1));

    assert!(StillImage::open(file.path().with_extension("missing")).is_err());
    Ok(())
}

#[test]
fn test_debug_dumps_every_stage() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");
    let detector = detector().with_debug(&debug_dir)?;

    detector.handle_command(&scene(), "vierkant rood")?;
    detector.handle_command(&scene(), "cirkel blauw")?;

    for step in [
        "00_input",
        "01_preprocess",
        "02_color_conversion",
        "03_color_mask",
        "04_noise_filter",
        "05_contour_detection",
        "06_area_filter",
        "07_duplicate_suppression",
        "08_shape_classification",
    ] {
        assert!(debug_dir.join(step).join("01.png").exists(), "{} cycle 1", step);
        assert!(debug_dir.join(step).join("02.png").exists(), "{} cycle 2", step);
    }
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;

    assert!(detector().with_debug(dir.path()).is_err());
    Ok(())
}

#[test]
fn test_empty_frame_with_hough_half_circles() -> anyhow::Result<()> {
    let mut config = DetectorConfig::default();
    config.half_circle.strategy = shapedetector::config::HalfCircleStrategy::Hough;
    let detector = ShapeDetector::new(config)?;

    let cycle = detector.handle_command(&image::RgbImage::new(0, 0), "halfcirkel rood")?;
    assert_eq!(cycle.shape_count(), 0);
    assert_eq!(cycle.mask.dimensions(), (0, 0));

    let cycle = detector.handle_command(&image::RgbImage::new(0, 0), "vierkant rood")?;
    assert_eq!(cycle.shape_count(), 0);
    Ok(())
}
