pub mod preprocessing;
pub mod color;
pub mod noise;
pub mod contours;
pub mod dedup;
pub mod classify;
pub mod circles;
pub mod steps;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use image::{GrayImage, RgbImage};

use crate::command::DetectionRequest;
use crate::config::DetectorConfig;
use crate::frame::FrameSource;
use crate::models::{ColorKind, Contour, DetectionResult, ShapeKind};
use crate::pipeline::{DebugConfig, Pipeline};
use crate::report;

/// Outcome of one detection cycle
#[derive(Debug, Clone)]
pub struct DetectionCycle {
    pub request: DetectionRequest,
    pub results: Vec<DetectionResult>,
    /// Cleaned color mask
    pub mask: GrayImage,
    /// Frame with the accepted shapes drawn on it
    pub annotated: RgbImage,
    pub elapsed: Duration,
}

impl DetectionCycle {
    pub fn shape_count(&self) -> usize {
        self.results.len()
    }
}

/// Runs detection requests against frames with a fixed configuration
pub struct ShapeDetector {
    config: Arc<DetectorConfig>,
    debug: Option<DebugConfig>,
    cycles: AtomicUsize,
}

impl ShapeDetector {
    /// Validate `config` and build a detector around it
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            debug: None,
            cycles: AtomicUsize::new(0),
        })
    }

    /// Save every pipeline stage of every cycle below `output_dir`
    pub fn with_debug(mut self, output_dir: impl AsRef<Path>) -> Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir.as_ref())?);
        Ok(self)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn mask_pipeline(&self, color: ColorKind) -> Pipeline {
        use steps::*;

        Pipeline::new()
            .add_step(Arc::new(PreprocessStep {
                settings: self.config.preprocessing.clone(),
            }))
            .add_step(Arc::new(ColorConversionStep))
            .add_step(Arc::new(ColorMaskStep {
                color,
                ranges: self.config.color_ranges.clone(),
            }))
            .add_step(Arc::new(NoiseFilterStep {
                kernel_size: self.config.noise_kernel_size,
            }))
    }

    /// The full pipeline for one request
    pub fn build_pipeline(&self, request: &DetectionRequest) -> Pipeline {
        use steps::*;

        self.mask_pipeline(request.color)
            .add_step(Arc::new(ContourDetectionStep))
            .add_step(Arc::new(AreaFilterStep {
                min_area: self.config.min_contour_area,
                max_area: self.config.max_contour_area,
            }))
            .add_step(Arc::new(DuplicateSuppressionStep {
                margin: self.config.contour_center_margin,
            }))
            .add_step(Arc::new(ShapeClassificationStep {
                requested: request.shape,
                config: self.config.clone(),
            }))
    }

    /// Run one detection cycle on `image`
    pub fn detect(&self, image: &RgbImage, request: &DetectionRequest) -> Result<DetectionCycle> {
        let started = Instant::now();
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;

        let mut pipeline = self.build_pipeline(request).with_cycle(cycle);
        if let Some(debug) = &self.debug {
            pipeline = pipeline.with_debug(debug.clone());
        }

        let data = pipeline.run(image.clone())?;
        let mask = match data.mask {
            Some(mask) => mask,
            None => GrayImage::new(image.width(), image.height()),
        };
        let annotated = report::annotate(image, &data.detections);
        let elapsed = started.elapsed();

        tracing::info!(
            request = %request,
            shapes = data.detections.len(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "detection cycle finished"
        );

        Ok(DetectionCycle {
            request: *request,
            results: data.detections,
            mask,
            annotated,
            elapsed,
        })
    }

    /// Parse `command` and run it on `image`
    pub fn handle_command(&self, image: &RgbImage, command: &str) -> Result<DetectionCycle> {
        let request = DetectionRequest::parse(command);
        self.detect(image, &request)
    }

    /// Pull the next frame from `source` and run a cycle on it.
    ///
    /// `Ok(None)` when the source has no new frame; no cycle runs then.
    pub fn run_cycle(
        &self,
        source: &mut dyn FrameSource,
        request: &DetectionRequest,
    ) -> Result<Option<DetectionCycle>> {
        match source.next_frame()? {
            Some(frame) => self.detect(&frame, request).map(Some),
            None => {
                tracing::debug!("no frame available, skipping cycle");
                Ok(None)
            }
        }
    }

    /// Get the cleaned mask for `color` (for debugging)
    pub fn get_mask(&self, image: &RgbImage, color: ColorKind) -> Result<GrayImage> {
        let data = self.mask_pipeline(color).run(image.clone())?;
        data.mask
            .ok_or_else(|| anyhow::anyhow!("mask pipeline produced no mask"))
    }

    /// Get the area-filtered, deduplicated contours for `color` (for debugging)
    pub fn get_contours(&self, image: &RgbImage, color: ColorKind) -> Result<Vec<Contour>> {
        let request = DetectionRequest {
            shape: ShapeKind::All,
            color,
        };
        let pipeline = self.build_pipeline(&request);
        // everything but the classification
        let data = pipeline.run_partial(image.clone(), pipeline.len() - 1)?;
        Ok(data.contours)
    }
}
