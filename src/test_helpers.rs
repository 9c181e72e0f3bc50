//! Shared synthetic-image fixtures for the test suite.
//!
//! Tests never ship binary fixtures; every source image, watermark, and
//! test pattern is encoded on the fly into a `TempDir`. The quadrant
//! pattern gives crop tests something position-sensitive to assert on.

use std::fs;
use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};

/// Four solid quadrants: red / green / blue / white (clockwise from
/// top-left). Corner colors survive any center crop or stretch, which
/// makes geometry observable from pixels alone.
pub(crate) fn quadrant_pattern(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| match (x < w / 2, y < h / 2) {
        (true, true) => Rgba([255, 0, 0, 255]),
        (false, true) => Rgba([0, 255, 0, 255]),
        (true, false) => Rgba([0, 0, 255, 255]),
        (false, false) => Rgba([255, 255, 255, 255]),
    })
}

/// Write the quadrant pattern as a png.
pub(crate) fn write_quadrant_png(path: &Path, w: u32, h: u32) {
    quadrant_pattern(w, h).save(path).unwrap();
}

/// Write a single-color png, alpha included.
pub(crate) fn write_solid_png(path: &Path, w: u32, h: u32, color: [u8; 4]) {
    RgbaImage::from_pixel(w, h, Rgba(color)).save(path).unwrap();
}

/// Write a single-color jpeg.
pub(crate) fn write_solid_jpeg(path: &Path, w: u32, h: u32, color: [u8; 3]) {
    let rgba = RgbaImage::from_pixel(w, h, Rgba([color[0], color[1], color[2], 255]));
    DynamicImage::ImageRgba8(rgba).to_rgb8().save(path).unwrap();
}

/// Write a single-color gif.
pub(crate) fn write_solid_gif(path: &Path, w: u32, h: u32, color: [u8; 4]) {
    RgbaImage::from_pixel(w, h, Rgba(color)).save(path).unwrap();
}

/// Write a single-color lossless webp (the `image` crate cannot encode
/// webp lossily, and tests want exact pixel values anyway).
pub(crate) fn write_solid_webp(path: &Path, w: u32, h: u32, color: [u8; 4]) {
    let rgba = RgbaImage::from_pixel(w, h, Rgba(color));
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), w, h).encode_lossless();
    fs::write(path, &*encoded).unwrap();
}

/// Decode any supported file back to RGBA for assertions.
pub(crate) fn read_rgba(path: &Path) -> RgbaImage {
    image::open(path).unwrap().to_rgba8()
}
