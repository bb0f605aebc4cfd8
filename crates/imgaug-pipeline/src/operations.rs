//! Pixel-level implementations of the augmentation steps.
//!
//! All functions work on RGBA buffers, leave the alpha channel untouched and
//! return an image with the same dimensions as the input.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Filter used whenever a cropped window is scaled back to full size
const RESTORE_FILTER: FilterType = FilterType::CatmullRom;

/// Absorbs f32 error in side lengths such as `100.0 * 0.7` before flooring
const SIDE_EPSILON: f32 = 1e-3;

/// Rotates counterclockwise by `degrees` (negative turns clockwise), then
/// crops away the filled corners and scales back to the original size.
pub fn rotate(image: &RgbaImage, degrees: f32) -> RgbaImage {
    if degrees == 0.0 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    // imageproc rotates clockwise for positive angles
    let rotated = rotate_about_center(
        image,
        -degrees.to_radians(),
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    );

    let (crop_w, crop_h) = inscribed_size(width, height, degrees);
    crop_and_restore(
        &rotated,
        (width - crop_w) / 2,
        (height - crop_h) / 2,
        crop_w,
        crop_h,
    )
}

/// Size of the largest centered rectangle with the source aspect ratio that
/// fits inside the source rectangle rotated by `degrees`.
pub fn inscribed_size(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (width as f32, height as f32);

    let scale = (w / (w * cos + h * sin)).min(h / (w * sin + h * cos)).min(1.0);

    (
        floor_side(w * scale, width),
        floor_side(h * scale, height),
    )
}

/// Window kept by a random zoom: each side scaled by `percentage_area`
pub fn zoom_window(width: u32, height: u32, percentage_area: f32) -> (u32, u32) {
    (
        floor_side(width as f32 * percentage_area, width),
        floor_side(height as f32 * percentage_area, height),
    )
}

fn floor_side(value: f32, max: u32) -> u32 {
    ((value + SIDE_EPSILON).floor() as u32).clamp(1, max)
}

/// Crops the given window and resizes it back to the source dimensions
pub fn crop_and_restore(image: &RgbaImage, x: u32, y: u32, crop_w: u32, crop_h: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if crop_w == width && crop_h == height {
        return image.clone();
    }

    let window = imageops::crop_imm(image, x, y, crop_w, crop_h).to_image();
    imageops::resize(&window, width, height, RESTORE_FILTER)
}

/// Multiplies every color channel by `factor`
pub fn adjust_brightness(image: &RgbaImage, factor: f32) -> RgbaImage {
    map_rgb(image, |c, _| c * factor)
}

/// Blends each pixel with the mean luma of the whole image
pub fn adjust_contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mean = mean_luma(image);
    map_rgb(image, |c, _| mean + factor * (c - mean))
}

/// Blends each pixel with its own luma; 0.0 yields grayscale
pub fn adjust_color(image: &RgbaImage, factor: f32) -> RgbaImage {
    map_rgb(image, |c, gray| gray + factor * (c - gray))
}

/// ITU-R 601-2 luma
fn luma(pixel: &Rgba<u8>) -> f32 {
    0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32
}

fn mean_luma(image: &RgbaImage) -> f32 {
    let count = image.width() as usize * image.height() as usize;
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = image.pixels().map(|p| luma(p) as f64).sum();
    (sum / count as f64) as f32
}

/// Applies `f(channel, luma)` to the RGB channels of every pixel
fn map_rgb(image: &RgbaImage, f: impl Fn(f32, f32) -> f32) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let gray = luma(pixel);
        for channel in 0..3 {
            pixel[channel] = f(pixel[channel] as f32, gray).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
