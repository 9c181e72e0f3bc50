//! Content-addressed cache for transformed images.
//!
//! There is no manifest and no index: the cache file *name* is the
//! key, and the directory listing is the only durable state. A name
//! embeds everything the output depends on:
//!
//! ```text
//! <sanitized-stem>-<width>-<height>-<sha256-of-source-bytes>.<ext>
//! ```
//!
//! The hash is over the source file's full contents — content-based
//! rather than mtime-based, so edits to a file invalidate stale
//! entries even when the name and dimensions stay the same, and the
//! cache survives `git checkout` resetting modification times.
//! Existence of the computed path *is* validity; entries are
//! write-once and never verified afterwards.
//!
//! ## Concurrent writers
//!
//! The transform is a pure function of its inputs, so two processes
//! racing to fill the same key produce equivalent bytes; the race
//! wastes work but cannot corrupt. Writes go through a temp file in
//! the cache directory followed by an atomic rename, so a reader never
//! observes a partially-written entry.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::PipelineError;

/// SHA-256 hash of a file's contents, as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Build the deterministic cache file name for a transform.
pub fn cache_file_name(stem: &str, width: u32, height: u32, hash: &str, ext: &str) -> String {
    format!("{stem}-{width}-{height}-{hash}.{ext}")
}

/// Full cache path for a transform.
pub fn cache_path(
    cache_dir: &Path,
    stem: &str,
    width: u32,
    height: u32,
    hash: &str,
    ext: &str,
) -> PathBuf {
    cache_dir.join(cache_file_name(stem, width, height, hash, ext))
}

/// Write a cache entry atomically.
///
/// The closure writes the encoded bytes into a temp file inside the
/// cache directory; on success the temp file is renamed over `dest`.
/// On any failure the temp file is cleaned up and `dest` is never
/// created, so an aborted transform leaves no partial entry behind.
pub fn persist<F>(cache_dir: &Path, dest: &Path, write: F) -> Result<(), PipelineError>
where
    F: FnOnce(&mut BufWriter<&mut fs::File>) -> Result<(), PipelineError>,
{
    let mut tmp = NamedTempFile::new_in(cache_dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(dest).map_err(|e| PipelineError::Io(e.error))?;
    Ok(())
}

/// Remove every regular file directly inside the cache directory.
///
/// Non-recursive: subdirectories and their contents are left alone.
/// Creates the directory first if it does not exist yet.
pub fn clear_cache(cache_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(cache_dir)?;
    for entry in fs::read_dir(cache_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
