//! # Pixelpress
//!
//! An image transform-and-cache pipeline. Ask for a source image at a
//! target size and you get back the path of a cached rendition,
//! computing it only when it does not exist yet.
//!
//! # Architecture: Resolve, Then Reuse
//!
//! Every request runs the same short circuit:
//!
//! ```text
//! 1. Key       source bytes + dimensions + format  →  cache file name
//! 2. Hit?      name exists in cache dir            →  return path, done
//! 3. Miss      decode → crop/fit → watermark → encode → atomic persist
//! ```
//!
//! The cache is content-addressed: the file name embeds a SHA-256 of
//! the source bytes, so editing a source image produces a new entry
//! instead of serving a stale one, and no manifest or index has to be
//! kept consistent. Existence of the computed name *is* validity.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestration — [`resolve`](pipeline::resolve) runs one request end to end; [`Pipeline`](pipeline::Pipeline) adds owned config and the recorded error list |
//! | [`geometry`] | Pure crop/fit math: canvas size, derived height, centered sample window |
//! | [`codec`] | Format dispatch over jpeg/png/gif/webp: decode, resample, encode with quality/compression tuning |
//! | [`watermark`] | Anchor placement and alpha-aware compositing of a watermark raster onto the canvas |
//! | [`cache`] | Content-addressed keys, atomic temp-file-then-rename writes, non-recursive clearing |
//! | [`config`] | [`PipelineConfig`](config::PipelineConfig) defaults, `config.toml` loading, output-format resolution |
//! | [`naming`] | Cache-stem sanitization — strips everything outside `[A-Za-z0-9_-]` |
//! | [`error`] | [`PipelineError`](error::PipelineError), whose display strings double as the recorded error messages |
//!
//! # Design Decisions
//!
//! ## No Shared Mutable State
//!
//! [`pipeline::resolve`] is a free function over an immutable config
//! snapshot and a cache directory. Concurrency comes for free: any
//! number of threads or processes can resolve against the same cache
//! directory, because entries are write-once, content-keyed, and
//! persisted via atomic rename. The stateful [`pipeline::Pipeline`]
//! exists only to own a config and accumulate error messages for
//! callers that want the classic setter-based surface.
//!
//! ## Crop Down, Stretch Up
//!
//! When both dimensions are given and the source is larger, the output
//! is an exact center crop — pixels outside the window are discarded,
//! not squeezed. When the source is smaller, the full image is
//! stretched to fill. The asymmetry is intentional: thumbnails from
//! large photos keep their subject's proportions, while tiny sources
//! still fill the requested canvas. See [`geometry::plan`].
//!
//! ## Pure-Rust Codecs
//!
//! All decoding and encoding goes through the `image` crate (plus the
//! `webp` crate for quality-controlled webp output), so the binary has
//! no system library dependencies. Formats whose decoder is compiled
//! out fail with a distinct error rather than a generic decode failure.
//!
//! ## Errors Are Recorded, Not Just Returned
//!
//! The [`Pipeline`](pipeline::Pipeline) surface records every failure
//! message in an ordered list alongside returning `Result`s, matching
//! how batch callers inspect what went wrong after a run. Watermark
//! failures are deliberately soft: the resize still succeeds,
//! unwatermarked, with the problem recorded.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod geometry;
pub mod naming;
pub mod pipeline;
pub mod watermark;

pub use codec::ImageKind;
pub use config::{OutputFormat, PipelineConfig};
pub use error::PipelineError;
pub use pipeline::{resolve, Pipeline, Resolved, TransformRequest};
pub use watermark::Anchor;

#[cfg(test)]
pub(crate) mod test_helpers;
