//! Pure geometry planning for a transform request.
//!
//! No I/O and no pixels: given the original dimensions and the
//! requested output size, [`plan`] decides how big the output canvas is
//! and which window of the source gets sampled onto it.
//!
//! ## Crop-then-fit
//!
//! The sample window is a *center window sized to the requested output
//! dimensions*, clamped to the original bounds. Two regimes fall out of
//! that:
//!
//! - Request smaller than the original: the window is exactly the
//!   requested size, so the output is an undistorted pixel-for-pixel
//!   center crop of the original.
//! - Request larger than the original (either axis): the window
//!   collapses to the full original on that axis and the resample
//!   stretches it to fill the canvas, which can distort aspect ratio.
//!
//! The asymmetry is deliberate and load-bearing: correct center-crops
//! for the common downscale case, stretch as the upscale fallback. Do
//! not "fix" this into a cover/contain fit — cached outputs and their
//! keys are derived from exactly this behavior.

/// Window of the source image to sample from, in source pixel
/// coordinates. Always lies within the original image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Planned output geometry: the canvas to produce and the source
/// window that gets resampled onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub sample: SampleRect,
}

/// Plan output geometry for a resize request.
///
/// `requested_height` of `None` derives the height that preserves the
/// original aspect ratio at `requested_width`, truncated:
/// `floor(orig_h * req_w / orig_w)`.
///
/// Only defined for positive inputs; callers reject zero dimensions
/// before planning. The derived height itself can floor to zero for
/// extreme aspect ratios (a 1000x1 original at width 500), so callers
/// also reject a planned canvas dimension of zero afterwards.
pub fn plan(
    original: (u32, u32),
    requested_width: u32,
    requested_height: Option<u32>,
) -> Geometry {
    let (orig_w, orig_h) = original;

    let height = requested_height.unwrap_or_else(|| {
        // u64 intermediate: orig_h * req_w can overflow u32 for large
        // originals long before the result does.
        (orig_h as u64 * requested_width as u64 / orig_w as u64) as u32
    });

    Geometry {
        canvas_width: requested_width,
        canvas_height: height,
        sample: SampleRect {
            x: orig_w.saturating_sub(requested_width) / 2,
            y: orig_h.saturating_sub(height) / 2,
            width: requested_width.min(orig_w),
            height: height.min(orig_h),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Derived height
    // =========================================================================

    #[test]
    fn missing_height_preserves_aspect_ratio() {
        // 1600x1200 at width 800 → height 600
        let g = plan((1600, 1200), 800, None);
        assert_eq!(g.canvas_width, 800);
        assert_eq!(g.canvas_height, 600);
    }

    #[test]
    fn derived_height_truncates_not_rounds() {
        // 1000x751 at width 500 → 751*500/1000 = 375.5 → 375
        let g = plan((1000, 751), 500, None);
        assert_eq!(g.canvas_height, 375);
    }

    #[test]
    fn derived_height_survives_large_originals() {
        // 60000x40000 at width 30000: orig_h * req_w overflows u32
        let g = plan((60_000, 40_000), 30_000, None);
        assert_eq!(g.canvas_height, 20_000);
    }

    #[test]
    fn extreme_aspect_ratio_floors_derived_height_to_zero() {
        // 1000x1 at width 500 → 1*500/1000 = 0; the pipeline rejects
        // this canvas before any encoder sees it
        let g = plan((1000, 1), 500, None);
        assert_eq!(g.canvas_height, 0);
    }

    #[test]
    fn explicit_height_used_verbatim() {
        let g = plan((1600, 1200), 800, Some(100));
        assert_eq!(g.canvas_height, 100);
    }

    // =========================================================================
    // Center window (downscale = true crop)
    // =========================================================================

    #[test]
    fn smaller_request_centers_sample_window() {
        // 1000x800 original, 200x100 request → window at (400, 350)
        let g = plan((1000, 800), 200, Some(100));
        assert_eq!(
            g.sample,
            SampleRect {
                x: 400,
                y: 350,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn odd_margin_truncates_toward_top_left() {
        // (101 - 100) / 2 = 0 in integer math
        let g = plan((101, 101), 100, Some(100));
        assert_eq!(g.sample.x, 0);
        assert_eq!(g.sample.y, 0);
    }

    #[test]
    fn exact_size_request_samples_everything() {
        let g = plan((640, 480), 640, Some(480));
        assert_eq!(
            g.sample,
            SampleRect {
                x: 0,
                y: 0,
                width: 640,
                height: 480
            }
        );
    }

    // =========================================================================
    // Oversized request (upscale = stretch)
    // =========================================================================

    #[test]
    fn larger_request_collapses_to_full_original() {
        let g = plan((300, 200), 600, Some(500));
        assert_eq!(g.canvas_width, 600);
        assert_eq!(g.canvas_height, 500);
        assert_eq!(
            g.sample,
            SampleRect {
                x: 0,
                y: 0,
                width: 300,
                height: 200
            }
        );
    }

    #[test]
    fn mixed_axes_crop_one_stretch_other() {
        // Width downscales (crop), height upscales (full extent)
        let g = plan((1000, 100), 200, Some(400));
        assert_eq!(g.sample.x, 400);
        assert_eq!(g.sample.width, 200);
        assert_eq!(g.sample.y, 0);
        assert_eq!(g.sample.height, 100);
    }

    #[test]
    fn sample_window_stays_in_bounds() {
        for (ow, oh, w, h) in [
            (1000u32, 800u32, 200u32, Some(100u32)),
            (10, 10, 5000, Some(5000)),
            (1920, 1080, 1920, None),
            (33, 77, 32, None),
        ] {
            let g = plan((ow, oh), w, h);
            assert!(g.sample.x + g.sample.width <= ow, "{ow}x{oh} @ {w}");
            assert!(g.sample.y + g.sample.height <= oh, "{ow}x{oh} @ {w}");
        }
    }
}
