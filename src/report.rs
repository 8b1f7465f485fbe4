//! Printing and drawing detection results.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use serde::Serialize;

use crate::command::DetectionRequest;
use crate::detection::DetectionCycle;
use crate::models::DetectionResult;

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const CENTER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// The `X:`, `Y:` and `A:` labels shown next to a shape
pub fn shape_values(result: &DetectionResult) -> [String; 3] {
    [
        format!("X: {}", result.center.x),
        format!("Y: {}", result.center.y),
        format!("A: {}", result.area as i64),
    ]
}

/// Copy of `original` with outline, bounding box and center of every result
pub fn annotate(original: &RgbImage, results: &[DetectionResult]) -> RgbImage {
    let mut canvas = original.clone();

    for result in results {
        let outline = &result.outline;
        for (i, a) in outline.iter().enumerate() {
            let b = outline[(i + 1) % outline.len()];
            draw_line_segment_mut(
                &mut canvas,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                OUTLINE_COLOR,
            );
        }

        let bbox = result.bounding_box;
        if bbox.width > 0 && bbox.height > 0 {
            let rect = Rect::at(bbox.x, bbox.y).of_size(bbox.width, bbox.height);
            draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
        }

        draw_cross_mut(&mut canvas, CENTER_COLOR, result.center.x, result.center.y);
    }

    canvas
}

/// Print the outcome of one cycle to stdout
pub fn print_detection_data(cycle: &DetectionCycle) {
    println!("\n=== {} ===", cycle.request);
    println!("Shapes found: {}", cycle.shape_count());

    for (i, result) in cycle.results.iter().enumerate() {
        let [x, y, a] = shape_values(result);
        println!("  {} {}: {}  {}  {}", result.kind, i + 1, x, y, a);
    }

    println!("Elapsed: {:.2} ms", cycle.elapsed.as_secs_f64() * 1000.0);
}

#[derive(Serialize)]
struct CycleReport<'a> {
    request: &'a DetectionRequest,
    count: usize,
    results: &'a [DetectionResult],
    elapsed_ms: f64,
}

/// JSON rendering of one cycle, for `--json`
pub fn cycle_json(cycle: &DetectionCycle) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&CycleReport {
        request: &cycle.request,
        count: cycle.shape_count(),
        results: &cycle.results,
        elapsed_ms: cycle.elapsed.as_secs_f64() * 1000.0,
    })
}
