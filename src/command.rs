//! Detection commands: `"<shape> <color>"` requests and batch files of them.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{ColorKind, ShapeKind};

/// Typing this ends an interactive session
pub const EXIT_COMMAND: &str = "exit";

/// Batch lines starting with this are ignored
pub const COMMENT_CHARACTER: char = '#';

/// One shape/color request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionRequest {
    pub shape: ShapeKind,
    pub color: ColorKind,
}

impl DetectionRequest {
    pub fn new(shape: ShapeKind, color: ColorKind) -> Self {
        Self { shape, color }
    }

    /// Parse `"<shape> <color>"`.
    ///
    /// Everything before the first space is the shape, everything after it the
    /// color. Unrecognised tokens become `Unknown` and are reported as a
    /// warning; parsing itself never fails.
    pub fn parse(command: &str) -> Self {
        let (shape_token, color_token) = command.split_once(' ').unwrap_or((command, ""));

        let shape = ShapeKind::from_token(shape_token);
        if shape == ShapeKind::Unknown {
            tracing::warn!("\"{}\" is not a valid shape", shape_token);
        }
        let color = ColorKind::from_token(color_token);
        if color == ColorKind::Unknown {
            tracing::warn!("\"{}\" is not a valid color", color_token);
        }

        Self { shape, color }
    }

    /// Both tokens were recognised
    pub fn is_valid(&self) -> bool {
        self.shape != ShapeKind::Unknown && self.color != ColorKind::Unknown
    }
}

impl fmt::Display for DetectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.shape, self.color)
    }
}

/// Commands of a batch file: one per line, comments and blank lines skipped
pub fn parse_batch(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with(COMMENT_CHARACTER))
        .map(str::to_string)
        .collect()
}

pub fn read_batch_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    Ok(parse_batch(&contents))
}
