//! Transform orchestration: resolve a request to a cached path.
//!
//! [`resolve`] is the whole story for one request:
//!
//! ```text
//! derive key → cache hit? return path
//!            → miss: decode → plan → resample → watermark → encode → persist
//! ```
//!
//! It is a free function over an immutable [`PipelineConfig`] snapshot
//! and a cache directory, with no shared state, so independent callers
//! (threads or processes) can hammer the same cache directory
//! concurrently: entries are write-once, keyed by content, and
//! persisted atomically, so the worst outcome of a race is the same
//! bytes encoded twice.
//!
//! [`Pipeline`] wraps the function with owned configuration and the
//! ordered error list the original surface exposes: setters with the
//! historical validation asymmetry (invalid output formats are silently
//! ignored; invalid watermark paths/positions are rejected *and*
//! recorded), `resize`, `clear_cache`, and `errors`.
//!
//! ## Failure policy
//!
//! Any decode/plan/encode/persist failure aborts the request, records
//! one message, and leaves no partial cache file. Watermark failures
//! are the exception: a watermark that cannot be loaded is recorded and
//! skipped, and the resize still succeeds with an unwatermarked canvas.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache;
use crate::codec::{self, ImageKind};
use crate::config::{OutputFormat, PipelineConfig};
use crate::error::PipelineError;
use crate::geometry;
use crate::naming;
use crate::watermark::{self, Anchor};

/// One resize request: a source file and the requested output size.
/// A missing height is derived during geometry planning, preserving
/// the source aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub source: PathBuf,
    pub width: u32,
    pub height: Option<u32>,
}

impl TransformRequest {
    pub fn new(source: impl Into<PathBuf>, width: u32, height: Option<u32>) -> Self {
        Self {
            source: source.into(),
            width,
            height,
        }
    }
}

/// Successful resolution: the cache path, plus any warnings (currently
/// only watermark failures) that did not stop the transform.
#[derive(Debug)]
pub struct Resolved {
    pub path: PathBuf,
    pub warnings: Vec<PipelineError>,
}

/// Resolve a transform request against the cache.
///
/// Reads the full source file to derive the content-addressed key, so
/// a changed source invalidates stale entries of the same name. On a
/// hit the path is returned without decoding the image; on a miss the
/// full transform runs and persists atomically.
pub fn resolve(
    config: &PipelineConfig,
    cache_dir: &Path,
    request: &TransformRequest,
) -> Result<Resolved, PipelineError> {
    // Geometry is only defined for positive dimensions; reject before
    // touching the filesystem.
    if request.width == 0 || request.height == Some(0) {
        return Err(PipelineError::InvalidDimensions);
    }

    let source = request.source.as_path();
    if !source.exists() {
        return Err(PipelineError::SourceNotFound(source.to_path_buf()));
    }

    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let kind =
        ImageKind::from_extension(&ext).ok_or(PipelineError::UnsupportedSourceFormat(ext))?;

    let original = codec::dimensions(source)?;
    let geometry = geometry::plan(original, request.width, request.height);
    // A derived height can floor to zero for extreme aspect ratios
    // (a 1000x1 source at width 500); an empty canvas is rejected the
    // same way an explicit zero is.
    if geometry.canvas_width == 0 || geometry.canvas_height == 0 {
        return Err(PipelineError::InvalidDimensions);
    }

    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let stem = naming::sanitize_file_name(stem);
    let hash = cache::hash_file(source)?;
    let out_kind = config.output_format.resolve(kind);

    fs::create_dir_all(cache_dir)?;
    let dest = cache::cache_path(
        cache_dir,
        &stem,
        geometry.canvas_width,
        geometry.canvas_height,
        &hash,
        out_kind.extension(),
    );

    // Existence is validity: entries are write-once and content-keyed.
    if dest.exists() {
        return Ok(Resolved {
            path: dest,
            warnings: Vec::new(),
        });
    }

    let decoded = codec::decode(source, kind)?;
    let mut canvas = codec::resample(&decoded, &geometry, kind);

    let mut warnings = Vec::new();
    if let Some(spec) = config.watermark_spec() {
        // A watermark that cannot be loaded is skipped, not fatal; the
        // canvas goes out unwatermarked.
        if let Err(err) = watermark::apply(&mut canvas, &spec) {
            warnings.push(err);
        }
    }

    cache::persist(cache_dir, &dest, |writer| {
        codec::encode(&canvas, writer, out_kind, config.quality, config.compression)
    })?;

    Ok(Resolved {
        path: dest,
        warnings,
    })
}

/// Owned pipeline: configuration, cache directory, and the ordered
/// error list accumulated across calls.
#[derive(Debug)]
pub struct Pipeline {
    cache_dir: PathBuf,
    config: PipelineConfig,
    errors: Vec<String>,
}

impl Pipeline {
    /// Pipeline with default configuration writing into `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(cache_dir, PipelineConfig::default())
    }

    pub fn with_config(cache_dir: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            config,
            errors: Vec::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Set the output format. Unrecognized values are ignored without
    /// recording an error (historical behavior, preserved).
    pub fn set_output_format(&mut self, format: &str) {
        if let Some(parsed) = OutputFormat::parse(format) {
            self.config.output_format = parsed;
        }
    }

    /// Stored as given; clamped at encode time.
    pub fn set_quality(&mut self, quality: i32) {
        self.config.quality = quality;
    }

    /// Stored as given; clamped at encode time.
    pub fn set_compression(&mut self, compression: i32) {
        self.config.compression = compression;
    }

    /// Set the watermark raster. The path must exist; otherwise the
    /// setting is unchanged and an error is recorded.
    pub fn set_watermark(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if path.exists() {
            self.config.watermark = Some(path.to_path_buf());
        } else {
            self.errors
                .push(PipelineError::InvalidWatermarkPath(path.to_path_buf()).to_string());
        }
    }

    /// Clamped into 0–100 and always applied.
    pub fn set_watermark_opacity(&mut self, opacity: i32) {
        self.config.watermark_opacity = opacity.clamp(0, 100);
    }

    /// Set the watermark anchor by name (`"bottom-right"`, ...).
    /// Invalid names record an error and leave the setting unchanged.
    pub fn set_watermark_position(&mut self, position: &str) {
        match position.parse::<Anchor>() {
            Ok(anchor) => self.config.watermark_position = anchor,
            Err(err) => self.errors.push(err.to_string()),
        }
    }

    /// Resize `source` to `width` (and `height`, if given), returning
    /// the cache path. Failures record one message in [`errors`] and
    /// watermark warnings are recorded without failing the call.
    ///
    /// [`errors`]: Pipeline::errors
    pub fn resize(
        &mut self,
        source: impl AsRef<Path>,
        width: u32,
        height: Option<u32>,
    ) -> Result<PathBuf, PipelineError> {
        let request = TransformRequest::new(source.as_ref(), width, height);
        match resolve(&self.config, &self.cache_dir, &request) {
            Ok(resolved) => {
                for warning in &resolved.warnings {
                    self.errors.push(warning.to_string());
                }
                Ok(resolved.path)
            }
            Err(err) => {
                self.errors.push(err.to_string());
                Err(err)
            }
        }
    }

    /// Remove every regular file directly inside the cache directory.
    pub fn clear_cache(&self) -> io::Result<()> {
        cache::clear_cache(&self.cache_dir)
    }

    /// All recorded error messages, oldest first. Never reset
    /// automatically.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}
