use image::{GrayImage, ImageBuffer, Rgb, RgbImage, imageops};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

use crate::config::PreprocessConfig;

/// Tri-channel image holding hue (0..180), saturation and value per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct HsvImage(RgbImage);

impl HsvImage {
    /// Build an HSV image pixel by pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        Self(ImageBuffer::from_fn(width, height, |x, y| Rgb(f(x, y))))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.0.get_pixel(x, y).0
    }
}

/// Convert one RGB pixel to 8-bit HSV (hue halved to fit a byte)
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { 255.0 * delta / max };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h = ((h / 2.0).round() as u32 % 180) as u8;
    [h, s.round() as u8, max as u8]
}

/// Convert image to HSV
pub fn to_hsv(img: &RgbImage) -> HsvImage {
    HsvImage(ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Rgb(rgb_to_hsv(img.get_pixel(x, y).0))
    }))
}

/// Convert image to grayscale
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    imageops::grayscale(img)
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &RgbImage, sigma: f32) -> RgbImage {
    gaussian_blur_f32(img, sigma)
}

/// Contrast, brightness and blur, in that order. Neutral settings copy the input.
pub fn adjust(img: &RgbImage, settings: &PreprocessConfig) -> RgbImage {
    let mut out = if settings.contrast != 0.0 {
        imageops::contrast(img, settings.contrast)
    } else {
        img.clone()
    };
    if settings.brightness != 0 {
        out = imageops::brighten(&out, settings.brightness);
    }
    if settings.blur_sigma > 0.0 {
        out = apply_blur(&out, settings.blur_sigma);
    }
    out
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hues() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
    }

    #[test]
    fn test_greys_have_no_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
    }

    #[test]
    fn test_hue_wraps_below_180() {
        // magenta-red, just short of a full turn
        let [h, _, _] = rgb_to_hsv([255, 0, 20]);
        assert!(h >= 170 && h < 180, "hue {h}");
    }

    #[test]
    fn test_neutral_adjust_is_copy() {
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        assert_eq!(adjust(&img, &PreprocessConfig::default()), img);
    }
}
