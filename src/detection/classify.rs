//! Shape classification by polygon approximation.
//!
//! Each contour is simplified with a tolerance proportional to its perimeter
//! and the vertex count of the result, together with a couple of bounding box
//! ratios, decides which shape it is.

use image::GrayImage;

use crate::config::{DetectorConfig, HalfCircleStrategy};
use crate::detection::circles;
use crate::detection::contours::is_area_allowed;
use crate::models::{BoundingBox, Contour, DetectionResult, Point, ShapeKind};

pub const TRIANGLE_CORNER_COUNT: usize = 3;
pub const SQUARE_CORNER_COUNT: usize = 4;
pub const HALF_CIRCLE_CORNER_COUNT: usize = 5;

/// Geometry of one area-valid contour
#[derive(Debug, Clone)]
pub struct Measurement {
    pub center: Point,
    pub area: f64,
    pub bounding_box: BoundingBox,
    pub outline: Vec<Point>,
}

impl Measurement {
    pub fn vertex_count(&self) -> usize {
        self.outline.len()
    }

    /// Share of the bounding box covered by the shape, in percent
    pub fn fill_percentage(&self) -> f64 {
        let box_area = self.bounding_box.area();
        if box_area == 0.0 {
            return 0.0;
        }
        self.area / box_area * 100.0
    }

    pub(crate) fn into_result(self, kind: ShapeKind) -> DetectionResult {
        DetectionResult {
            kind,
            center: self.center,
            area: self.area,
            bounding_box: self.bounding_box,
            outline: self.outline,
        }
    }
}

/// Approximate `contour` and measure it.
///
/// `None` when its area is outside the configured bounds or it has no center.
pub fn measure(contour: &Contour, config: &DetectorConfig) -> Option<Measurement> {
    if !is_area_allowed(contour, config.min_contour_area, config.max_contour_area) {
        return None;
    }
    let epsilon = config.epsilon_multiplier * contour.perimeter();
    let outline = contour.approximate(epsilon);
    let center = contour.center()?;
    let bounding_box = contour.bounding_box()?;

    Some(Measurement {
        center,
        area: contour.area(),
        bounding_box,
        outline,
    })
}

fn is_square(m: &Measurement, config: &DetectorConfig) -> bool {
    let ratio = m.bounding_box.aspect_ratio();
    m.vertex_count() == SQUARE_CORNER_COUNT
        && ratio >= config.min_square_ratio
        && ratio <= config.max_square_ratio
}

fn is_half_circle(m: &Measurement, config: &DetectorConfig) -> bool {
    let pct = m.fill_percentage();
    m.vertex_count() == HALF_CIRCLE_CORNER_COUNT
        && pct >= config.half_circle.min_percentage
        && pct <= config.half_circle.max_percentage
}

/// Whether a measured contour is an instance of `kind`
pub fn matches(kind: ShapeKind, m: &Measurement, config: &DetectorConfig) -> bool {
    match kind {
        ShapeKind::All => true,
        ShapeKind::Square => is_square(m, config),
        ShapeKind::Rectangle => m.vertex_count() == SQUARE_CORNER_COUNT,
        ShapeKind::Triangle => m.vertex_count() == TRIANGLE_CORNER_COUNT,
        ShapeKind::Circle => m.vertex_count() > HALF_CIRCLE_CORNER_COUNT,
        ShapeKind::HalfCircle => is_half_circle(m, config),
        ShapeKind::Unknown => false,
    }
}

/// Best single label for a measured contour
pub fn infer_kind(m: &Measurement, config: &DetectorConfig) -> ShapeKind {
    match m.vertex_count() {
        TRIANGLE_CORNER_COUNT => ShapeKind::Triangle,
        SQUARE_CORNER_COUNT if is_square(m, config) => ShapeKind::Square,
        SQUARE_CORNER_COUNT => ShapeKind::Rectangle,
        HALF_CIRCLE_CORNER_COUNT if is_half_circle(m, config) => ShapeKind::HalfCircle,
        v if v > HALF_CIRCLE_CORNER_COUNT => ShapeKind::Circle,
        _ => ShapeKind::Unknown,
    }
}

/// Classifies contours against a requested shape
pub struct ShapeClassifier<'a> {
    config: &'a DetectorConfig,
    mask: Option<&'a GrayImage>,
}

impl<'a> ShapeClassifier<'a> {
    pub fn new(config: &'a DetectorConfig) -> Self {
        Self { config, mask: None }
    }

    /// Give access to the cleaned mask, which the Hough half-circle strategy needs
    pub fn with_mask(mut self, mask: &'a GrayImage) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn classify(&self, contours: &[Contour], requested: ShapeKind) -> Vec<DetectionResult> {
        if requested == ShapeKind::Unknown {
            tracing::warn!("unknown shape requested, nothing to classify");
            return Vec::new();
        }

        if requested == ShapeKind::HalfCircle
            && self.config.half_circle.strategy == HalfCircleStrategy::Hough
        {
            match self.mask {
                Some(mask) => return circles::detect_half_circles(mask, contours, self.config),
                None => tracing::warn!("hough half circle detection needs a mask, using area ratio"),
            }
        }

        let results: Vec<DetectionResult> = contours
            .iter()
            .filter_map(|c| measure(c, self.config))
            .filter(|m| matches(requested, m, self.config))
            .map(|m| {
                let kind = if requested == ShapeKind::All {
                    infer_kind(&m, self.config)
                } else {
                    requested
                };
                m.into_result(kind)
            })
            .collect();

        tracing::debug!(
            requested = %requested,
            candidates = contours.len(),
            accepted = results.len(),
            "classified contours"
        );
        results
    }
}

/// Classify `contours` as `requested` using the area-ratio half-circle test
pub fn classify_shapes(
    contours: &[Contour],
    requested: ShapeKind,
    config: &DetectorConfig,
) -> Vec<DetectionResult> {
    ShapeClassifier::new(config).classify(contours, requested)
}
