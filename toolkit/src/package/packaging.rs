//! Container packaging.
//!
//! Streams a normalised workspace through a tar encoder into a zstd
//! compressor in a single pass; no uncompressed intermediate is written.
//! The container is assembled in a temporary file beside its destination
//! and only moved into place once both encoder layers have finished.

use super::packaging_error::PackagingError;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Zstd level used when none is configured.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Compression settings for [`package`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackagingOptions {
    /// Zstd compression level.
    pub level: i32,
    /// Zstd worker threads; `0` or `1` compresses on the calling thread.
    pub threads: u32,
}

impl Default for PackagingOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_COMPRESSION_LEVEL,
            threads: default_threads(),
        }
    }
}

/// Return the number of worker threads used by default.
#[must_use]
pub fn default_threads() -> u32 {
    std::thread::available_parallelism()
        .map_or(1, |count| u32::try_from(count.get()).unwrap_or(u32::MAX))
}

/// Compute the SHA-256 digest of a file as lowercase hex.
///
/// # Errors
///
/// Returns [`PackagingError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<String, PackagingError> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Package every immediate child of `root` into a `.wcp` container.
///
/// Each child is stored under its own base name with its nested structure
/// intact. Children are appended in sorted name order so identical
/// workspaces produce identical member order.
///
/// # Errors
///
/// Returns [`PackagingError::NotADirectory`] if `root` is not a directory,
/// [`PackagingError::Io`] on read or write failures, or
/// [`PackagingError::Persist`] if the finished container cannot be moved to
/// `output_path`. No file is left at `output_path` on failure.
pub fn package(
    root: &Path,
    output_path: &Path,
    options: PackagingOptions,
) -> Result<(), PackagingError> {
    if !root.is_dir() {
        return Err(PackagingError::NotADirectory(root.to_path_buf()));
    }

    info!("Creating archive at: {}", output_path.display());
    let output_dir = parent_dir(output_path);
    fs::create_dir_all(output_dir)?;
    let mut staged = tempfile::Builder::new()
        .prefix(".wcp-")
        .suffix(".partial")
        .tempfile_in(output_dir)?;
    write_container(root, staged.as_file_mut(), options)?;
    staged
        .persist(output_path)
        .map_err(|err| PackagingError::Persist {
            path: output_path.to_path_buf(),
            source: err.error,
        })?;
    info!("Archive created successfully.");
    Ok(())
}

/// List the immediate children of `root` as `(archive_name, path)` pairs.
fn container_members(root: &Path) -> io::Result<Vec<(OsString, PathBuf)>> {
    let mut members = fs::read_dir(root)?
        .map(|entry| entry.map(|e| (e.file_name(), e.path())))
        .collect::<io::Result<Vec<_>>>()?;
    members.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(members)
}

fn write_container(
    root: &Path,
    file: &mut fs::File,
    options: PackagingOptions,
) -> Result<(), PackagingError> {
    let mut encoder = zstd::Encoder::new(&mut *file, options.level)?;
    if options.threads > 1 {
        encoder.multithread(options.threads)?;
    }
    let mut archive = tar::Builder::new(encoder);

    for (name, path) in container_members(root)? {
        debug!("adding {} to container", path.display());
        if path.is_dir() {
            archive.append_dir_all(&name, &path)?;
        } else {
            archive.append_path_with_name(&path, &name)?;
        }
    }

    let encoder = archive.into_inner()?;
    encoder.finish()?;
    file.sync_all()?;
    Ok(())
}

/// Return the directory containing `path`, treating a bare name as `.`.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
