use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point as DrawPoint;
use imageproc::rect::Rect;
use shapedetector::{Contour, Point};
use tempfile::NamedTempFile;

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Where [`scene`] puts its shapes
pub const SCENE_SQUARE_ORIGIN: (i32, i32) = (30, 30);
pub const SCENE_SQUARE_SIDE: u32 = 32;
pub const SCENE_DISC_CENTER: (i32, i32) = (140, 140);
pub const SCENE_DISC_RADIUS: i32 = 25;

/// White canvas
pub fn blank_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, WHITE)
}

/// 200x200 white image with a red 32x32 square and a blue disc of radius 25
pub fn scene() -> RgbImage {
    let mut img = blank_image(200, 200);
    let (x, y) = SCENE_SQUARE_ORIGIN;
    draw_filled_rect_mut(
        &mut img,
        Rect::at(x, y).of_size(SCENE_SQUARE_SIDE, SCENE_SQUARE_SIDE),
        RED,
    );
    draw_filled_circle_mut(&mut img, SCENE_DISC_CENTER, SCENE_DISC_RADIUS, BLUE);
    img
}

/// Empty binary mask
pub fn blank_mask(width: u32, height: u32) -> GrayImage {
    GrayImage::new(width, height)
}

pub fn fill_rect(mask: &mut GrayImage, x: i32, y: i32, width: u32, height: u32) {
    draw_filled_rect_mut(mask, Rect::at(x, y).of_size(width, height), Luma([255]));
}

pub fn fill_disc(mask: &mut GrayImage, center: (i32, i32), radius: i32) {
    draw_filled_circle_mut(mask, center, radius, Luma([255]));
}

/// Upper half of a disc, flat side down along the row of the center
pub fn fill_half_disc(mask: &mut GrayImage, center: (i32, i32), radius: i32) {
    let mut disc = GrayImage::new(mask.width(), mask.height());
    fill_disc(&mut disc, center, radius);
    for (x, y, p) in disc.enumerate_pixels() {
        if p[0] > 0 && y as i32 <= center.1 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
}

pub fn fill_triangle(mask: &mut GrayImage, corners: [(i32, i32); 3]) {
    let poly: Vec<DrawPoint<i32>> = corners.iter().map(|&(x, y)| DrawPoint::new(x, y)).collect();
    draw_polygon_mut(mask, &poly, Luma([255]));
}

/// Rectangle contour from its four corners only
pub fn rect_contour(x: i32, y: i32, width: i32, height: i32) -> Contour {
    Contour::new(vec![
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ])
}

/// Square contour of side `side` centered on `(cx, cy)`
pub fn square_around(cx: i32, cy: i32, side: i32) -> Contour {
    rect_contour(cx - side / 2, cy - side / 2, side, side)
}

/// Writes `img` to a temporary PNG that lives as long as the returned handle
pub fn save_temp_png(img: &RgbImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}
