use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::detection::preprocessing::HsvImage;
use crate::models::{Contour, DetectionResult};
use crate::report;

/// Data that flows through the pipeline.
///
/// One `FrameData` holds everything a detection cycle derives from a single
/// frame; each step fills in the next representation.
#[derive(Clone)]
pub struct FrameData {
    /// The frame as it was handed in (shared, never modified)
    pub original: Arc<RgbImage>,

    /// Working color image (after brightness/contrast/blur)
    pub image: RgbImage,

    pub hsv: Option<HsvImage>,
    pub grey: Option<GrayImage>,

    /// Binary color mask, cleaned once the noise filter ran
    pub mask: Option<GrayImage>,

    pub contours: Vec<Contour>,
    pub detections: Vec<DetectionResult>,
}

impl FrameData {
    /// Create FrameData for a full frame
    pub fn from_image(image: RgbImage) -> Self {
        Self {
            original: Arc::new(image.clone()),
            image,
            hsv: None,
            grey: None,
            mask: None,
            contours: Vec::new(),
            detections: Vec::new(),
        }
    }

    pub fn require_hsv(&self) -> Result<&HsvImage> {
        self.hsv
            .as_ref()
            .context("no HSV image yet, run color conversion first")
    }

    pub fn require_mask(&self) -> Result<&GrayImage> {
        self.mask
            .as_ref()
            .context("no mask yet, run color masking first")
    }

    /// Image that best shows how far the frame got: annotations once there
    /// are detections, otherwise the mask, otherwise the working image
    pub fn stage_image(&self) -> DynamicImage {
        if !self.detections.is_empty() {
            DynamicImage::ImageRgb8(report::annotate(&self.original, &self.detections))
        } else if let Some(mask) = &self.mask {
            DynamicImage::ImageLuma8(mask.clone())
        } else {
            DynamicImage::ImageRgb8(self.image.clone())
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// Prepare `output_dir` for debug dumps.
    /// The directory must be empty or non-existent.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                anyhow::bail!("Debug directory is not empty: {}", output_dir.display());
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    fn save(&self, step_dir_name: &str, cycle: usize, image: &DynamicImage) -> Result<PathBuf> {
        let step_dir = self.output_dir.join(step_dir_name);
        std::fs::create_dir_all(&step_dir)?;
        let path = step_dir.join(format!("{:02}.png", cycle));
        image
            .save(&path)
            .with_context(|| format!("Failed to save debug image {}", path.display()))?;
        Ok(path)
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
    /// Number of the detection cycle, used to name debug files
    pub cycle: usize,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform the frame data
    fn process(&self, data: FrameData, context: &PipelineContext) -> Result<FrameData>;

    /// Human-readable name for this step (used in logs and debug dirs)
    fn name(&self) -> &str;
}

fn step_dir_name(index: usize, name: &str) -> String {
    format!("{:02}_{}", index, name.to_lowercase().replace(' ', "_"))
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump every stage of the run into the debug directory
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.context.debug = Some(debug);
        self
    }

    /// Shorthand for [`DebugConfig::new`] followed by [`Pipeline::with_debug`]
    pub fn with_debug_dir(self, output_dir: impl AsRef<Path>) -> Result<Self> {
        let debug = DebugConfig::new(output_dir.as_ref())?;
        Ok(self.with_debug(debug))
    }

    pub fn with_cycle(mut self, cycle: usize) -> Self {
        self.context.cycle = cycle;
        self
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step on `input`
    pub fn run(&self, input: RgbImage) -> Result<FrameData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: RgbImage, num_steps: usize) -> Result<FrameData> {
        let debug = self.context.debug.as_ref();
        let cycle = self.context.cycle;

        let mut data = FrameData::from_image(input);
        if let Some(debug) = debug {
            let path = debug.save("00_input", cycle, &DynamicImage::ImageRgb8(data.image.clone()))?;
            tracing::debug!("saved {}", path.display());
        }

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let step_name = step.name();
            data = step
                .process(data, &self.context)
                .with_context(|| format!("step '{}' failed", step_name))?;

            tracing::debug!(
                step = step_name,
                contours = data.contours.len(),
                detections = data.detections.len(),
                "step done"
            );

            if let Some(debug) = debug {
                let path = debug.save(&step_dir_name(step_idx + 1, step_name), cycle, &data.stage_image())?;
                tracing::debug!("saved {}", path.display());
            }
        }

        Ok(data)
    }
}
