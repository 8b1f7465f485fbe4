//! Detector configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::preprocessing::HsvImage;
use crate::error::DetectorError;
use crate::models::{BoundingBox, ColorKind};

/// Inclusive HSV range (8-bit convention: hue 0..180, saturation/value 0..255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub min: [u8; 3],
    pub max: [u8; 3],
}

impl HsvRange {
    pub const fn new(min: [u8; 3], max: [u8; 3]) -> Self {
        Self { min, max }
    }

    /// True when every channel lies within `[min, max]`
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.min[c] && hsv[c] <= self.max[c])
    }

    fn validate(&self, color: ColorKind) -> Result<(), DetectorError> {
        for channel in 0..3 {
            if self.min[channel] > self.max[channel] {
                return Err(DetectorError::InvalidColorRange {
                    color,
                    channel,
                    min: self.min[channel],
                    max: self.max[channel],
                });
            }
        }
        Ok(())
    }

    /// Range spanned by the pixels of `region`, widened by `margin` per channel.
    ///
    /// Returns `None` when the region does not overlap the image.
    pub fn calibrate(hsv: &HsvImage, region: BoundingBox, margin: [u8; 3]) -> Option<Self> {
        let x0 = region.x.max(0) as u32;
        let y0 = region.y.max(0) as u32;
        let x1 = (region.x + region.width as i32).clamp(0, hsv.width() as i32) as u32;
        let y1 = (region.y + region.height as i32).clamp(0, hsv.height() as i32) as u32;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for y in y0..y1 {
            for x in x0..x1 {
                let px = hsv.get_pixel(x, y);
                for c in 0..3 {
                    min[c] = min[c].min(px[c]);
                    max[c] = max[c].max(px[c]);
                }
            }
        }
        for c in 0..3 {
            min[c] = min[c].saturating_sub(margin[c]);
            max[c] = max[c].saturating_add(margin[c]);
        }
        Some(Self { min, max })
    }
}

/// HSV ranges per color. Red straddles the hue wrap point and needs two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRanges {
    pub red: [HsvRange; 2],
    pub green: HsvRange,
    pub blue: HsvRange,
    pub black: HsvRange,
    pub yellow: HsvRange,
    pub white: HsvRange,
}

impl Default for ColorRanges {
    fn default() -> Self {
        Self {
            red: [
                HsvRange::new([0, 60, 60], [10, 255, 255]),
                HsvRange::new([170, 60, 60], [180, 255, 255]),
            ],
            green: HsvRange::new([40, 40, 40], [75, 255, 255]),
            blue: HsvRange::new([85, 60, 40], [135, 255, 255]),
            black: HsvRange::new([0, 0, 0], [180, 255, 50]),
            yellow: HsvRange::new([20, 80, 80], [35, 255, 255]),
            white: HsvRange::new([0, 0, 200], [180, 40, 255]),
        }
    }
}

impl ColorRanges {
    /// Ranges whose masks are unioned for `color`; empty for `Unknown`
    pub fn ranges_for(&self, color: ColorKind) -> &[HsvRange] {
        match color {
            ColorKind::Red => &self.red,
            ColorKind::Green => std::slice::from_ref(&self.green),
            ColorKind::Blue => std::slice::from_ref(&self.blue),
            ColorKind::Black => std::slice::from_ref(&self.black),
            ColorKind::Yellow => std::slice::from_ref(&self.yellow),
            ColorKind::White => std::slice::from_ref(&self.white),
            ColorKind::Unknown => &[],
        }
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        for color in ColorKind::VARIANTS {
            for range in self.ranges_for(color) {
                range.validate(color)?;
            }
        }
        Ok(())
    }
}

/// Image adjustments applied before color conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Contrast change in percent, 0 leaves the image untouched
    pub contrast: f32,
    /// Added to every channel
    pub brightness: i32,
    /// Gaussian blur sigma, 0 disables blurring
    pub blur_sigma: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            contrast: 0.0,
            brightness: 0,
            blur_sigma: 0.0,
        }
    }
}

impl PreprocessConfig {
    pub fn is_identity(&self) -> bool {
        self.contrast == 0.0 && self.brightness == 0 && self.blur_sigma <= 0.0
    }
}

/// How half circles are recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfCircleStrategy {
    /// Five-vertex polygons filling a band of their bounding box
    #[default]
    AreaRatio,
    /// Experimental: Hough circles whose circumference is only partly on an edge
    Hough,
}

/// Parameters of the experimental Hough half-circle detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    pub canny_low: f32,
    pub canny_high: f32,
    pub min_radius: u32,
    pub max_radius: u32,
    /// Votes a center needs before it is considered a circle
    pub accumulator_threshold: u32,
    /// Minimum distance between two detected circle centers
    pub min_center_distance: f64,
    /// Angular step between circumference samples, in degrees
    pub sample_step_degrees: f64,
    /// A sample is an inlier within `radius * inlier_tolerance` of an edge
    pub inlier_tolerance: f64,
    pub min_inlier_fraction: f64,
    pub max_inlier_fraction: f64,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 100.0,
            min_radius: 10,
            max_radius: 200,
            accumulator_threshold: 100,
            min_center_distance: 20.0,
            sample_step_degrees: 5.0,
            inlier_tolerance: 0.05,
            min_inlier_fraction: 0.35,
            max_inlier_fraction: 0.70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalfCircleConfig {
    pub strategy: HalfCircleStrategy,
    pub min_percentage: f64,
    pub max_percentage: f64,
    pub hough: HoughConfig,
}

impl Default for HalfCircleConfig {
    fn default() -> Self {
        Self {
            strategy: HalfCircleStrategy::AreaRatio,
            min_percentage: 50.0,
            max_percentage: 72.0,
            hough: HoughConfig::default(),
        }
    }
}

/// Every threshold and color range a detection cycle reads.
///
/// Treated as an immutable snapshot: recalibration builds a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub color_ranges: ColorRanges,
    pub preprocessing: PreprocessConfig,
    /// Side of the square opening kernel
    pub noise_kernel_size: u32,
    pub min_contour_area: f64,
    pub max_contour_area: f64,
    /// Approximation tolerance as a fraction of the contour perimeter
    pub epsilon_multiplier: f64,
    /// Contours whose centers are this close on both axes are duplicates
    pub contour_center_margin: i32,
    pub min_square_ratio: f64,
    pub max_square_ratio: f64,
    pub half_circle: HalfCircleConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            color_ranges: ColorRanges::default(),
            preprocessing: PreprocessConfig::default(),
            noise_kernel_size: 3,
            min_contour_area: 500.0,
            max_contour_area: 150_000.0,
            epsilon_multiplier: 0.02,
            contour_center_margin: 10,
            min_square_ratio: 0.85,
            max_square_ratio: 1.08,
            half_circle: HalfCircleConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Load a JSON configuration; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DetectorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        self.color_ranges.validate()?;

        if self.min_contour_area.is_nan() || self.min_contour_area <= 0.0 {
            return Err(DetectorError::InvalidConfig(
                "min_contour_area must be positive".into(),
            ));
        }
        if self.min_contour_area > self.max_contour_area {
            return Err(DetectorError::InvalidConfig(format!(
                "min_contour_area {} exceeds max_contour_area {}",
                self.min_contour_area, self.max_contour_area
            )));
        }
        if self.epsilon_multiplier.is_nan() || self.epsilon_multiplier < 0.0 {
            return Err(DetectorError::InvalidConfig(
                "epsilon_multiplier must not be negative".into(),
            ));
        }
        if self.contour_center_margin < 0 {
            return Err(DetectorError::InvalidConfig(
                "contour_center_margin must not be negative".into(),
            ));
        }
        if self.min_square_ratio > self.max_square_ratio {
            return Err(DetectorError::InvalidConfig(format!(
                "square ratio band {}..{} is empty",
                self.min_square_ratio, self.max_square_ratio
            )));
        }
        let half = &self.half_circle;
        if half.min_percentage > half.max_percentage {
            return Err(DetectorError::InvalidConfig(format!(
                "half circle percentage band {}..{} is empty",
                half.min_percentage, half.max_percentage
            )));
        }
        let hough = &half.hough;
        if hough.min_radius == 0 || hough.min_radius > hough.max_radius {
            return Err(DetectorError::InvalidConfig(format!(
                "hough radius range {}..{} is invalid",
                hough.min_radius, hough.max_radius
            )));
        }
        if hough.sample_step_degrees.is_nan() || hough.sample_step_degrees <= 0.0 {
            return Err(DetectorError::InvalidConfig(
                "hough sample_step_degrees must be positive".into(),
            ));
        }
        if hough.min_inlier_fraction > hough.max_inlier_fraction {
            return Err(DetectorError::InvalidConfig(format!(
                "hough inlier band {}..{} is empty",
                hough.min_inlier_fraction, hough.max_inlier_fraction
            )));
        }
        Ok(())
    }

    /// New configuration with `range` calibrated for `color`.
    ///
    /// Red keeps two ranges: a range whose lower hue sits in the upper half
    /// of the hue circle replaces the high-hue range, anything else the
    /// low-hue one.
    pub fn with_color_range(&self, color: ColorKind, range: HsvRange) -> Result<Self, DetectorError> {
        range.validate(color)?;
        let mut next = self.clone();
        let ranges = &mut next.color_ranges;
        match color {
            ColorKind::Red if range.min[0] >= 90 => ranges.red[1] = range,
            ColorKind::Red => ranges.red[0] = range,
            ColorKind::Green => ranges.green = range,
            ColorKind::Blue => ranges.blue = range,
            ColorKind::Black => ranges.black = range,
            ColorKind::Yellow => ranges.yellow = range,
            ColorKind::White => ranges.white = range,
            ColorKind::Unknown => {
                return Err(DetectorError::InvalidConfig(
                    "cannot calibrate an unknown color".into(),
                ));
            }
        }
        Ok(next)
    }
}
