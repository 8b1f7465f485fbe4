use std::path::PathBuf;

use crate::models::ColorKind;

/// Errors raised by the detection core.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("contour {index} has zero area, its center is undefined")]
    DegenerateContour { index: usize },

    #[error("invalid {color} range: channel {channel} has min {min} > max {max}")]
    InvalidColorRange {
        color: ColorKind,
        channel: usize,
        min: u8,
        max: u8,
    },

    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
