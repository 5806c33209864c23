//! Source archive extraction.
//!
//! Unpacks upstream release archives into a conversion workspace with path
//! traversal protection. Tarball variants stream their decompressed bytes
//! straight into the tar reader; nothing is buffered whole in memory.

use crate::format::ArchiveFormat;
use log::{debug, info};
use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Trait for extracting source archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use wcp_toolkit::format::ArchiveFormat;
/// use wcp_toolkit::package::extraction::{ArchiveExtractor, extractor_for};
///
/// let extractor = extractor_for(ArchiveFormat::ZstdTar);
/// assert_eq!(extractor.format(), ArchiveFormat::ZstdTar);
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// The archive format this extractor understands.
    fn format(&self) -> ArchiveFormat;

    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the effective root of the extracted tree.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::EmptyArchive`]
    /// if the archive has no members, [`ExtractionError::UnsupportedEntry`]
    /// for links and special files, and [`ExtractionError::Io`] or
    /// [`ExtractionError::Zip`] on read or write failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<ExtractedTree, ExtractionError>;
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTree {
    /// Directory holding the release contents (architecture folders etc.).
    pub root: PathBuf,
    /// Number of file and directory members unpacked.
    pub member_count: usize,
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction, including corrupt compressed streams.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container is unreadable.
    #[error("unreadable zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive holds a member type that cannot be unpacked safely.
    #[error("unsupported {kind} member: {path}")]
    UnsupportedEntry {
        /// The member's path inside the archive.
        path: String,
        /// Description of the member type.
        kind: String,
    },

    /// The archive contains no members.
    #[error("archive contains no members")]
    EmptyArchive,
}

/// Extractor for gzip-compressed tarballs (official DXVK releases).
///
/// The effective root is the top-level directory named by the first member.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::GzipTar
    }

    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<ExtractedTree, ExtractionError> {
        info!("Extracting {}...", archive_path.display());
        let file = BufReader::new(fs::File::open(archive_path)?);
        unpack_tar(flate2::read::GzDecoder::new(file), dest_dir)
    }
}

/// Extractor for zstd-compressed tarballs (vkd3d-proton releases).
///
/// The zstd decoder is a streaming reader, so members are unpacked as
/// their bytes are decompressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarZstExtractor;

impl ArchiveExtractor for TarZstExtractor {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::ZstdTar
    }

    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<ExtractedTree, ExtractionError> {
        info!("Extracting {}...", archive_path.display());
        let file = fs::File::open(archive_path)?;
        unpack_tar(zstd::Decoder::new(file)?, dest_dir)
    }
}

/// Extractor for zip archives (DXVK development builds).
///
/// These archives do not wrap their contents in a subdirectory, so the
/// effective root is the destination itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<ExtractedTree, ExtractionError> {
        info!("Extracting {}...", archive_path.display());
        let file = BufReader::new(fs::File::open(archive_path)?);
        let mut archive = zip::ZipArchive::new(file)?;
        if archive.len() == 0 {
            return Err(ExtractionError::EmptyArchive);
        }

        for index in 0..archive.len() {
            let mut member = archive.by_index(index)?;
            let Some(relative) = member.enclosed_name() else {
                return Err(ExtractionError::PathTraversal {
                    path: member.name().to_owned(),
                });
            };
            if member.is_symlink() {
                return Err(ExtractionError::UnsupportedEntry {
                    path: member.name().to_owned(),
                    kind: "symlink".to_owned(),
                });
            }
            let dest_path = dest_dir.join(&relative);
            debug!("unpacking {}", dest_path.display());

            if member.is_dir() {
                fs::create_dir_all(&dest_path)?;
                continue;
            }
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&dest_path)?;
            io::copy(&mut member, &mut out)?;
        }

        Ok(ExtractedTree {
            root: dest_dir.to_path_buf(),
            member_count: archive.len(),
        })
    }
}

/// Return the production extractor for `format`.
#[must_use]
pub fn extractor_for(format: ArchiveFormat) -> Box<dyn ArchiveExtractor> {
    match format {
        ArchiveFormat::GzipTar => Box::new(TarGzExtractor),
        ArchiveFormat::Zip => Box::new(ZipExtractor),
        ArchiveFormat::ZstdTar => Box::new(TarZstExtractor),
    }
}

/// Unpack a tar stream into `dest_dir`, one member at a time.
fn unpack_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<ExtractedTree, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut first_top_level: Option<PathBuf> = None;
    let mut member_count = 0usize;

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_type = entry.header().entry_type();
        if entry_type.is_pax_global_extensions() {
            continue;
        }

        let entry_path = entry.path()?.into_owned();
        validate_entry_path(&entry_path)?;
        if !(entry_type.is_file()
            || entry_type.is_dir()
            || entry_type.is_contiguous()
            || entry_type.is_gnu_sparse())
        {
            return Err(ExtractionError::UnsupportedEntry {
                path: entry_path.display().to_string(),
                kind: format!("{entry_type:?}"),
            });
        }

        if first_top_level.is_none() {
            first_top_level = top_level_component(&entry_path);
        }

        let dest_path = dest_dir.join(&entry_path);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("unpacking {}", dest_path.display());
        entry.unpack(&dest_path)?;
        member_count += 1;
    }

    if member_count == 0 {
        return Err(ExtractionError::EmptyArchive);
    }

    Ok(ExtractedTree {
        root: effective_root(dest_dir, first_top_level),
        member_count,
    })
}

/// Resolve the working root: the first member's top-level directory when it
/// exists, otherwise the destination itself.
fn effective_root(dest_dir: &Path, top_level: Option<PathBuf>) -> PathBuf {
    top_level
        .map(|name| dest_dir.join(name))
        .filter(|candidate| candidate.is_dir())
        .unwrap_or_else(|| dest_dir.to_path_buf())
}

/// Return the first normal component of `path`, skipping `./` prefixes.
fn top_level_component(path: &Path) -> Option<PathBuf> {
    path.components().find_map(|component| match component {
        Component::Normal(name) => Some(PathBuf::from(name)),
        _ => None,
    })
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
