pub mod command;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod report;

pub use command::DetectionRequest;
pub use config::{DetectorConfig, HsvRange};
pub use detection::{DetectionCycle, ShapeDetector};
pub use error::DetectorError;
pub use frame::{FrameSequence, FrameSource, StillImage};
pub use models::{BoundingBox, ColorKind, Contour, DetectionResult, Point, ShapeKind};
pub use pipeline::{DebugConfig, FrameData, Pipeline, PipelineContext, PipelineStep};
