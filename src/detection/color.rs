use image::{GrayImage, Luma};

use crate::config::{ColorRanges, HsvRange};
use crate::detection::preprocessing::HsvImage;
use crate::models::ColorKind;

pub const MASK_ON: u8 = 255;

/// Binary mask of the pixels inside `range` (inclusive on every channel)
pub fn in_range(hsv: &HsvImage, range: &HsvRange) -> GrayImage {
    let (width, height) = hsv.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if range.contains(hsv.get_pixel(x, y)) {
            Luma([MASK_ON])
        } else {
            Luma([0])
        }
    })
}

/// Pixel-wise OR of two masks of equal size
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0].max(b.get_pixel(x, y)[0])])
    })
}

/// Mask of the pixels matching `color`.
///
/// Red is built from two ranges because its hue wraps around 0/180; the two
/// masks are unioned. `Unknown` gives an empty mask.
pub fn generate_mask(color: ColorKind, hsv: &HsvImage, ranges: &ColorRanges) -> GrayImage {
    let (width, height) = hsv.dimensions();
    let mut ranges = ranges.ranges_for(color).iter();

    let Some(first) = ranges.next() else {
        tracing::warn!("unknown color requested, mask is empty");
        return GrayImage::new(width, height);
    };

    ranges.fold(in_range(hsv, first), |mask, range| union(&mask, &in_range(hsv, range)))
}
