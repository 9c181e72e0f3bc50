//! Format dispatch, decode, resample, and encode.
//!
//! The four supported formats are a closed enum, [`ImageKind`], so the
//! per-format rules (transparency, which encode parameter applies) live
//! in one place instead of scattered extension comparisons. Dispatch is
//! by file extension, case-insensitive — a mislabeled file is a decode
//! error, not a silently different format.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate, format forced from the extension |
//! | Resample | crop to the sample window + `resize_exact` with `Triangle` (bilinear) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (compression level 0–9) |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` (no tuning parameters) |
//! | Encode → WebP | `webp` crate lossy encoder (quality 1–100; the `image` crate's webp encoder is lossless-only) |

use std::fmt;
use std::io::Write;
use std::path::Path;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbaImage};

use crate::error::PipelineError;
use crate::geometry::Geometry;

/// The closed set of raster formats the pipeline reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// Map a file extension to a kind, case-insensitive. `jpeg` and
    /// `jpg` are the same kind. Returns `None` for anything else.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Dispatch on a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension used for cache file names.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// Whether the format carries an alpha channel worth preserving.
    /// Webp can store alpha, but the original dispatch treats only
    /// png/gif as transparency-preserving and that contract is kept.
    pub fn supports_transparency(self) -> bool {
        matches!(self, Self::Png | Self::Gif)
    }

    fn format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        })
    }
}

/// Read image dimensions from the file header without a full decode.
pub fn dimensions(path: &Path) -> Result<(u32, u32), PipelineError> {
    image::image_dimensions(path).map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Decode a source file as the given kind.
///
/// The format is forced from the extension rather than sniffed, so the
/// dispatch decision and the decode agree. A recognized extension whose
/// decoder was not compiled in is [`PipelineError::MissingCodecSupport`].
pub fn decode(path: &Path, kind: ImageKind) -> Result<DynamicImage, PipelineError> {
    if !kind.format().reading_enabled() {
        return Err(PipelineError::MissingCodecSupport(kind));
    }
    let mut reader = ImageReader::open(path)?;
    reader.set_format(kind.format());
    reader.decode().map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resample a decoded source onto the output canvas.
///
/// Crops the geometry's sample window and bilinear-resizes it to fill
/// the full canvas. Png/Gif sources keep their alpha channel end to
/// end; other sources are flattened against black, matching a draw
/// onto an opaque canvas.
pub fn resample(source: &DynamicImage, geometry: &Geometry, kind: ImageKind) -> RgbaImage {
    let window = source.crop_imm(
        geometry.sample.x,
        geometry.sample.y,
        geometry.sample.width,
        geometry.sample.height,
    );
    let canvas = window
        .resize_exact(
            geometry.canvas_width,
            geometry.canvas_height,
            FilterType::Triangle,
        )
        .to_rgba8();

    if kind.supports_transparency() {
        canvas
    } else {
        flatten(canvas)
    }
}

/// Composite semi-transparent pixels over opaque black.
fn flatten(mut canvas: RgbaImage) -> RgbaImage {
    for px in canvas.pixels_mut() {
        let alpha = px[3] as u16;
        if alpha < 255 {
            for channel in 0..3 {
                px[channel] = (px[channel] as u16 * alpha / 255) as u8;
            }
            px[3] = 255;
        }
    }
    canvas
}

/// Encode the canvas to a writer in the target format.
///
/// `quality` applies to Jpeg and Webp, `compression` to Png, Gif takes
/// neither. Out-of-range values are clamped here, not at configuration
/// time.
pub fn encode<W: Write>(
    canvas: &RgbaImage,
    writer: &mut W,
    kind: ImageKind,
    quality: i32,
    compression: i32,
) -> Result<(), PipelineError> {
    match kind {
        ImageKind::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            JpegEncoder::new_with_quality(writer, clamp_quality(quality))
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| PipelineError::Encode(e.to_string()))
        }
        ImageKind::Png => PngEncoder::new_with_quality(
            writer,
            compression_type(compression),
            image::codecs::png::FilterType::Adaptive,
        )
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| PipelineError::Encode(e.to_string())),
        ImageKind::Gif => GifEncoder::new(writer)
            .encode(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| PipelineError::Encode(e.to_string())),
        ImageKind::Webp => {
            // encode_simple reports libwebp failures (e.g. dimensions
            // past the 16383-pixel cap) instead of unwrapping them.
            let encoded = webp::Encoder::from_rgba(canvas.as_raw(), canvas.width(), canvas.height())
                .encode_simple(false, clamp_quality(quality) as f32)
                .map_err(|e| PipelineError::Encode(format!("{e:?}")))?;
            writer.write_all(&encoded)?;
            Ok(())
        }
    }
}

fn clamp_quality(quality: i32) -> u8 {
    quality.clamp(1, 100) as u8
}

/// Map the 0–9 compression level onto the png encoder's three speed
/// tiers.
fn compression_type(level: i32) -> CompressionType {
    match level.clamp(0, 9) {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}
