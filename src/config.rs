//! Pipeline configuration.
//!
//! [`PipelineConfig`] is plain data: it carries the output format,
//! encoder tuning, and watermark settings for a transform, with the
//! same defaults the tool has always shipped. There is no global,
//! mutable configuration — a config value reaches the pipeline only by
//! being passed in (or held by a [`Pipeline`](crate::pipeline::Pipeline)
//! instance), which is what makes concurrent `resolve` calls safe to
//! run against one shared snapshot.
//!
//! Validation deliberately does *not* live here. The original surface
//! validates on set, with an asymmetry this crate preserves: an invalid
//! output format is silently ignored, while an invalid watermark path
//! or position is rejected *and* recorded as an error. Those rules live
//! on the `Pipeline` setters; deserialized configs get the same checks
//! applied when a watermark spec is built.
//!
//! ## Config file
//!
//! The CLI can load these fields from a `config.toml`:
//!
//! ```toml
//! # All options are optional - defaults shown below
//! output_format = "auto"          # auto | jpg | png | webp | gif
//! quality = 90                    # jpeg/webp quality (clamped to 1-100 at encode)
//! compression = 6                 # png compression level (0-9)
//!
//! # watermark = "logo.png"        # off unless set
//! watermark_opacity = 50          # 0-100; partial opacity applies to png watermarks only
//! watermark_position = "bottom-right"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::codec::ImageKind;
use crate::watermark::{Anchor, WatermarkSpec};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Target format for encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Re-encode in the source's own format.
    Auto,
    Jpg,
    Png,
    Webp,
    Gif,
}

impl OutputFormat {
    /// Parse a user-supplied format name. `None` for anything outside
    /// the accepted set — the caller decides whether that is silent
    /// (it is, for the configuration surface).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "jpg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Resolve to a concrete output kind given the source's kind.
    pub fn resolve(self, source: ImageKind) -> ImageKind {
        match self {
            Self::Auto => source,
            Self::Jpg => ImageKind::Jpeg,
            Self::Png => ImageKind::Png,
            Self::Webp => ImageKind::Webp,
            Self::Gif => ImageKind::Gif,
        }
    }
}

/// Configuration snapshot for transform requests.
///
/// `quality` and `compression` are stored exactly as given (the
/// original surface does not range-validate them); the codec clamps at
/// encode time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub output_format: OutputFormat,
    /// Jpeg/webp encode quality.
    pub quality: i32,
    /// Png compression level.
    pub compression: i32,
    /// Watermark raster path; watermarking is off while unset.
    pub watermark: Option<PathBuf>,
    /// Watermark opacity percentage.
    pub watermark_opacity: i32,
    pub watermark_position: Anchor,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Auto,
            quality: 90,
            compression: 6,
            watermark: None,
            watermark_opacity: 50,
            watermark_position: Anchor::BottomRight,
        }
    }
}

impl PipelineConfig {
    /// Load from a `config.toml` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// The watermark to composite, if one is configured. Opacity is
    /// clamped here so a config file with an out-of-range value
    /// behaves like the clamping setter.
    pub fn watermark_spec(&self) -> Option<WatermarkSpec> {
        self.watermark.as_ref().map(|path| WatermarkSpec {
            path: path.clone(),
            opacity: self.watermark_opacity.clamp(0, 100) as u8,
            anchor: self.watermark_position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_surface() {
        let c = PipelineConfig::default();
        assert_eq!(c.output_format, OutputFormat::Auto);
        assert_eq!(c.quality, 90);
        assert_eq!(c.compression, 6);
        assert_eq!(c.watermark, None);
        assert_eq!(c.watermark_opacity, 50);
        assert_eq!(c.watermark_position, Anchor::BottomRight);
    }

    #[test]
    fn parse_accepts_the_five_formats() {
        assert_eq!(OutputFormat::parse("auto"), Some(OutputFormat::Auto));
        assert_eq!(OutputFormat::parse("jpg"), Some(OutputFormat::Jpg));
        assert_eq!(OutputFormat::parse("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::parse("webp"), Some(OutputFormat::Webp));
        assert_eq!(OutputFormat::parse("gif"), Some(OutputFormat::Gif));
    }

    #[test]
    fn parse_rejects_aliases_and_junk() {
        // "jpeg" is a valid *source* extension but not a valid output
        // format name; the original surface only accepts "jpg".
        assert_eq!(OutputFormat::parse("jpeg"), None);
        assert_eq!(OutputFormat::parse("JPG"), None);
        assert_eq!(OutputFormat::parse("bmp"), None);
        assert_eq!(OutputFormat::parse(""), None);
    }

    #[test]
    fn auto_resolves_to_source_kind() {
        assert_eq!(OutputFormat::Auto.resolve(ImageKind::Gif), ImageKind::Gif);
        assert_eq!(OutputFormat::Webp.resolve(ImageKind::Gif), ImageKind::Webp);
    }

    #[test]
    fn toml_round_trip_with_partial_file() {
        let c: PipelineConfig = toml::from_str(
            r#"
            output_format = "webp"
            quality = 80
            "#,
        )
        .unwrap();
        assert_eq!(c.output_format, OutputFormat::Webp);
        assert_eq!(c.quality, 80);
        // Unspecified fields keep their defaults
        assert_eq!(c.compression, 6);
        assert_eq!(c.watermark_position, Anchor::BottomRight);
    }

    #[test]
    fn toml_kebab_case_anchor_names() {
        let c: PipelineConfig = toml::from_str(r#"watermark_position = "middle-center""#).unwrap();
        assert_eq!(c.watermark_position, Anchor::MiddleCenter);
    }

    #[test]
    fn toml_unknown_keys_rejected() {
        let result: Result<PipelineConfig, _> = toml::from_str(r#"qualty = 80"#);
        assert!(result.is_err());
    }

    #[test]
    fn watermark_spec_clamps_opacity() {
        let mut c = PipelineConfig {
            watermark: Some(PathBuf::from("logo.png")),
            watermark_opacity: 170,
            ..PipelineConfig::default()
        };
        assert_eq!(c.watermark_spec().unwrap().opacity, 100);
        c.watermark_opacity = -4;
        assert_eq!(c.watermark_spec().unwrap().opacity, 0);
    }

    #[test]
    fn no_watermark_no_spec() {
        assert_eq!(PipelineConfig::default().watermark_spec(), None);
    }
}
