//! Pipeline error type.
//!
//! One enum covers every failure the pipeline can surface. The
//! `Display` strings are written for end users: they are exactly what
//! [`Pipeline::errors`](crate::pipeline::Pipeline::errors) accumulates,
//! so a caller can render the list directly.

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::ImageKind;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Unsupported image format: {0}")]
    UnsupportedSourceFormat(String),

    #[error("Unsupported watermark image format: {0}")]
    UnsupportedWatermarkFormat(String),

    #[error("Watermark image file does not exist: {}", .0.display())]
    InvalidWatermarkPath(PathBuf),

    #[error("Invalid watermark position: {0}")]
    InvalidWatermarkPosition(String),

    /// The decoder for a recognized format was not compiled into the
    /// binary (a feature-flag misconfiguration, not a user error).
    #[error("No compiled-in decoder for {0} images")]
    MissingCodecSupport(ImageKind),

    /// Requested width or height of zero, or a derived height that
    /// floored to zero for an extreme aspect ratio. Rejected before
    /// any pixel work happens.
    #[error("Requested dimensions must be positive")]
    InvalidDimensions,

    #[error("Failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Failed to encode image: {0}")]
    Encode(String),
}
