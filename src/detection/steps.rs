use std::sync::Arc;

use anyhow::Result;

use crate::config::{ColorRanges, DetectorConfig, PreprocessConfig};
use crate::detection::classify::ShapeClassifier;
use crate::detection::{color, contours, dedup, noise, preprocessing};
use crate::models::{ColorKind, ShapeKind};
use crate::pipeline::{FrameData, PipelineContext, PipelineStep};

/// Contrast, brightness and blur on the working image
pub struct PreprocessStep {
    pub settings: PreprocessConfig,
}

impl PipelineStep for PreprocessStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        if !self.settings.is_identity() {
            data.image = preprocessing::adjust(&data.image, &self.settings);
        }
        Ok(data)
    }

    fn name(&self) -> &str {
        "Preprocess"
    }
}

/// Derive the HSV and greyscale representations
pub struct ColorConversionStep;

impl PipelineStep for ColorConversionStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        data.hsv = Some(preprocessing::to_hsv(&data.image));
        data.grey = Some(preprocessing::to_grayscale(&data.image));
        Ok(data)
    }

    fn name(&self) -> &str {
        "Color Conversion"
    }
}

/// Mask the pixels of one color
pub struct ColorMaskStep {
    pub color: ColorKind,
    pub ranges: ColorRanges,
}

impl PipelineStep for ColorMaskStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        let mask = color::generate_mask(self.color, data.require_hsv()?, &self.ranges);
        data.mask = Some(mask);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Color Mask"
    }
}

/// Morphological opening of the mask
pub struct NoiseFilterStep {
    pub kernel_size: u32,
}

impl PipelineStep for NoiseFilterStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        let cleaned = noise::remove_noise(data.require_mask()?, self.kernel_size);
        data.mask = Some(cleaned);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Noise Filter"
    }
}

/// Trace the outer contours of the mask
pub struct ContourDetectionStep;

impl PipelineStep for ContourDetectionStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        data.contours = contours::extract_contours(data.require_mask()?);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Contour Detection"
    }
}

/// Drop specks and oversized blobs. Runs before duplicate suppression so no
/// zero-area contour ever reaches a centroid computation.
pub struct AreaFilterStep {
    pub min_area: f64,
    pub max_area: f64,
}

impl PipelineStep for AreaFilterStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        let all = std::mem::take(&mut data.contours);
        data.contours = contours::filter_by_area(all, self.min_area, self.max_area);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Area Filter"
    }
}

/// Keep one contour per cluster of nearby centers
pub struct DuplicateSuppressionStep {
    pub margin: i32,
}

impl PipelineStep for DuplicateSuppressionStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        let all = std::mem::take(&mut data.contours);
        data.contours = dedup::suppress_duplicates(all, self.margin)?;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Duplicate Suppression"
    }
}

/// Label the remaining contours as the requested shape
pub struct ShapeClassificationStep {
    pub requested: ShapeKind,
    pub config: Arc<DetectorConfig>,
}

impl PipelineStep for ShapeClassificationStep {
    fn process(&self, mut data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        let mut classifier = ShapeClassifier::new(&self.config);
        if let Some(mask) = data.mask.as_ref() {
            classifier = classifier.with_mask(mask);
        }
        let detections = classifier.classify(&data.contours, self.requested);
        data.detections = detections;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Shape Classification"
    }
}
