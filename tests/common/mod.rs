mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from shapedetector for tests
pub use shapedetector::{
    BoundingBox, ColorKind, Contour, DetectionRequest, DetectorConfig, DetectorError, Point,
    ShapeDetector, ShapeKind,
};
