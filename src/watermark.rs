//! Watermark anchoring and compositing.
//!
//! A watermark is loaded through the same extension dispatch as source
//! images, positioned by a 9-way [`Anchor`], and composited one of two
//! ways:
//!
//! - **Direct overwrite** — watermark pixels replace canvas pixels at
//!   the anchor offset. Used at full opacity, and for every non-png
//!   watermark regardless of the opacity setting. Only png watermarks
//!   get true partial-opacity blending; that format-conditioned rule is
//!   part of the contract, not an optimization.
//! - **Two-pass alpha merge** — for png watermarks below 100% opacity.
//!   A scratch buffer starting fully transparent receives the canvas
//!   region under the watermark's footprint, then the watermark pixels
//!   on top of it (overwrite, not blend). That scratch — "watermark
//!   drawn over existing content" — is then mixed linearly onto the
//!   canvas at the opacity percentage. Blending the watermark directly
//!   against a partially-transparent canvas region would apply the
//!   translucency twice; capturing the region first avoids that.
//!
//! Anchor offsets are computed signed and the blit region is clipped,
//! so a watermark larger than the canvas crops at the edges instead of
//! wrapping or panicking.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use image::RgbaImage;
use serde::Deserialize;

use crate::codec::{self, ImageKind};
use crate::error::PipelineError;

/// The nine watermark anchor positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::MiddleCenter,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Top-left offset of the watermark on the canvas.
    ///
    /// Per axis: left/top → 0, right/bottom → `canvas − wm`,
    /// center/middle → `(canvas − wm) / 2`. Signed, because a
    /// watermark can be larger than the canvas.
    pub fn offset(self, canvas: (u32, u32), watermark: (u32, u32)) -> (i64, i64) {
        let span_x = canvas.0 as i64 - watermark.0 as i64;
        let span_y = canvas.1 as i64 - watermark.1 as i64;

        let x = match self {
            Anchor::TopLeft | Anchor::MiddleLeft | Anchor::BottomLeft => 0,
            Anchor::TopCenter | Anchor::MiddleCenter | Anchor::BottomCenter => span_x / 2,
            Anchor::TopRight | Anchor::MiddleRight | Anchor::BottomRight => span_x,
        };
        let y = match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => 0,
            Anchor::MiddleLeft | Anchor::MiddleCenter | Anchor::MiddleRight => span_y / 2,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => span_y,
        };
        (x, y)
    }

    fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopCenter => "top-center",
            Anchor::TopRight => "top-right",
            Anchor::MiddleLeft => "middle-left",
            Anchor::MiddleCenter => "middle-center",
            Anchor::MiddleRight => "middle-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomCenter => "bottom-center",
            Anchor::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| PipelineError::InvalidWatermarkPosition(s.to_string()))
    }
}

/// A fully-resolved watermark to composite: where the raster lives,
/// how opaque, and where it anchors on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub path: PathBuf,
    /// Opacity percentage, 0–100.
    pub opacity: u8,
    pub anchor: Anchor,
}

/// Composite the watermark onto the canvas in place.
///
/// Errors (unsupported extension, missing or undecodable raster) leave
/// the canvas untouched; the caller records them without failing the
/// surrounding resize.
pub fn apply(canvas: &mut RgbaImage, spec: &WatermarkSpec) -> Result<(), PipelineError> {
    let ext = spec
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let kind = ImageKind::from_extension(&ext)
        .ok_or_else(|| PipelineError::UnsupportedWatermarkFormat(ext.clone()))?;

    let watermark = codec::decode(&spec.path, kind)?.to_rgba8();
    let (dx, dy) = spec.anchor.offset(
        (canvas.width(), canvas.height()),
        (watermark.width(), watermark.height()),
    );

    if kind == ImageKind::Png && spec.opacity < 100 {
        merge_at_opacity(canvas, &watermark, dx, dy, spec.opacity);
    } else {
        overwrite(canvas, &watermark, dx, dy);
    }
    Ok(())
}

/// Intersection of the watermark footprint with the canvas.
struct Blit {
    canvas_x: u32,
    canvas_y: u32,
    wm_x: u32,
    wm_y: u32,
    width: u32,
    height: u32,
}

fn clip(canvas: &RgbaImage, watermark: &RgbaImage, dx: i64, dy: i64) -> Option<Blit> {
    let x_start = dx.max(0);
    let y_start = dy.max(0);
    let x_end = (dx + watermark.width() as i64).min(canvas.width() as i64);
    let y_end = (dy + watermark.height() as i64).min(canvas.height() as i64);
    if x_end <= x_start || y_end <= y_start {
        return None;
    }
    Some(Blit {
        canvas_x: x_start as u32,
        canvas_y: y_start as u32,
        wm_x: (x_start - dx) as u32,
        wm_y: (y_start - dy) as u32,
        width: (x_end - x_start) as u32,
        height: (y_end - y_start) as u32,
    })
}

/// Replace canvas pixels with watermark pixels, all four channels.
fn overwrite(canvas: &mut RgbaImage, watermark: &RgbaImage, dx: i64, dy: i64) {
    let Some(blit) = clip(canvas, watermark, dx, dy) else {
        return;
    };
    for y in 0..blit.height {
        for x in 0..blit.width {
            let px = *watermark.get_pixel(blit.wm_x + x, blit.wm_y + y);
            canvas.put_pixel(blit.canvas_x + x, blit.canvas_y + y, px);
        }
    }
}

/// Two-pass alpha merge at an opacity percentage.
fn merge_at_opacity(canvas: &mut RgbaImage, watermark: &RgbaImage, dx: i64, dy: i64, pct: u8) {
    let Some(blit) = clip(canvas, watermark, dx, dy) else {
        return;
    };
    let pct = pct as u32;

    // Pass 1: capture the destination region into a transparent
    // scratch buffer, then draw the watermark over it (full overwrite).
    let mut scratch = RgbaImage::new(blit.width, blit.height);
    for y in 0..blit.height {
        for x in 0..blit.width {
            let under = *canvas.get_pixel(blit.canvas_x + x, blit.canvas_y + y);
            scratch.put_pixel(x, y, under);
        }
    }
    for y in 0..blit.height {
        for x in 0..blit.width {
            let over = *watermark.get_pixel(blit.wm_x + x, blit.wm_y + y);
            scratch.put_pixel(x, y, over);
        }
    }

    // Pass 2: linear per-channel mix of the scratch buffer back onto
    // the canvas at the opacity percentage.
    for y in 0..blit.height {
        for x in 0..blit.width {
            let dst = canvas.get_pixel_mut(blit.canvas_x + x, blit.canvas_y + y);
            let src = scratch.get_pixel(x, y);
            for channel in 0..4 {
                let mixed =
                    (dst[channel] as u32 * (100 - pct) + src[channel] as u32 * pct) / 100;
                dst[channel] = mixed as u8;
            }
        }
    }
}
