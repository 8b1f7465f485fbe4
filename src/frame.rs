//! Frame sources feeding detection cycles.
//!
//! Camera capture lives outside this crate; anything that can hand out
//! frames implements [`FrameSource`].

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageReader, RgbImage};

/// Supplies frames to the detector
pub trait FrameSource {
    /// The next frame, or `None` when no new frame is available
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// A still image served again for every cycle
pub struct StillImage {
    image: RgbImage,
}

impl StillImage {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Decode an image file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_image(path)?))
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(Some(self.image.clone()))
    }
}

/// A finite run of frames, exhausted after the last one
#[derive(Default)]
pub struct FrameSequence {
    frames: VecDeque<RgbImage>,
}

impl FrameSequence {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for FrameSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }
}

/// Load and decode an image file into RGB
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("Image file does not exist: {}", path.display());
    }
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    Ok(img.to_rgb8())
}
