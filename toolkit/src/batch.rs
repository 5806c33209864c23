//! Folder-level batch conversion and organisation.
//!
//! Scans a folder's regular files, dispatches each recognised archive to
//! its converter one at a time, and records every outcome without stopping
//! at the first failure. Afterwards, [`organize`] tidies the folder by
//! moving converted sources and produced containers into subfolders.

use crate::converter::{Converter, ConverterRegistry};
use crate::error::ConversionError;
use crate::format::file_name_str;
use crate::output::{conversion_summary, write_stderr_line};
use crate::package::naming::CONTAINER_EXTENSION;
use crate::pipeline::{Conversion, ConvertRequest, ConvertSettings};
use crate::prompt::{DevVersionSource, PromptError};
use log::{info, warn};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subfolder receiving converted source archives.
pub const SOURCE_ARCHIVE_DIR: &str = "_source_archives";

/// Subfolder receiving produced containers.
pub const OUTPUT_DIR: &str = "_wcp_output";

const SEPARATOR: &str = "--------------------------------------------------";

/// Errors that stop a batch before or while organising it.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch folder does not exist or is not a directory.
    #[error("the path provided is not a valid directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The batch folder could not be listed.
    #[error("could not read directory {}: {source}", path.display())]
    ReadDir {
        /// Folder being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An organisation subfolder could not be created.
    #[error("could not create {}: {source}", path.display())]
    CreateDir {
        /// Subfolder being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// What happened to one archive.
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// A container was produced.
    Converted(Conversion),
    /// No version could be obtained for a development build.
    VersionUnavailable(PromptError),
    /// The conversion failed.
    Failed(ConversionError),
}

/// One dispatched archive and its outcome.
#[derive(Debug)]
pub struct ArchiveReport {
    /// Source archive path.
    pub archive: PathBuf,
    /// Identifier of the converter that handled it.
    pub converter: &'static str,
    /// Result of the conversion.
    pub outcome: ArchiveOutcome,
}

impl ArchiveReport {
    /// Return the conversion when it succeeded.
    #[must_use]
    pub fn conversion(&self) -> Option<&Conversion> {
        match &self.outcome {
            ArchiveOutcome::Converted(conversion) => Some(conversion),
            ArchiveOutcome::VersionUnavailable(_) | ArchiveOutcome::Failed(_) => None,
        }
    }
}

/// Outcomes of a batch run, in dispatch order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Every dispatched archive.
    pub archives: Vec<ArchiveReport>,
}

impl BatchReport {
    /// Number of archives dispatched to a converter.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.archives.len()
    }

    /// Number of archives converted successfully.
    #[must_use]
    pub fn converted_count(&self) -> usize {
        self.archives
            .iter()
            .filter(|report| report.conversion().is_some())
            .count()
    }

    /// Number of archives that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.processed_count() - self.converted_count()
    }

    /// Source paths of the archives converted successfully.
    #[must_use]
    pub fn converted_sources(&self) -> Vec<PathBuf> {
        self.archives
            .iter()
            .filter(|report| report.conversion().is_some())
            .map(|report| report.archive.clone())
            .collect()
    }
}

/// A file that could not be relocated by [`organize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationWarning {
    /// File that stayed in place.
    pub path: PathBuf,
    /// Directory it should have moved into.
    pub destination: PathBuf,
    /// Why the move failed.
    pub reason: String,
}

impl fmt::Display for RelocationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.path.file_name().map_or(self.path.as_path(), Path::new);
        write!(
            f,
            "could not move '{}' to {}: {}",
            name.display(),
            self.destination.display(),
            self.reason
        )
    }
}

/// List the regular files in `folder` that some converter accepts.
///
/// Files are returned in file-name order; directories and unrecognised
/// files are skipped.
///
/// # Errors
///
/// Returns [`BatchError::NotADirectory`] or [`BatchError::ReadDir`] if the
/// folder cannot be listed.
pub fn scan_folder<'r>(
    folder: &Path,
    registry: &'r ConverterRegistry,
) -> Result<Vec<(PathBuf, &'r Converter)>, BatchError> {
    if !folder.is_dir() {
        return Err(BatchError::NotADirectory(folder.to_path_buf()));
    }
    let read_error = |source| BatchError::ReadDir {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = fs::read_dir(folder)
        .map_err(read_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_error)?;
    files.sort();

    Ok(files
        .into_iter()
        .filter(|path| path.is_file())
        .filter_map(|path| registry.for_path(&path).map(|converter| (path, converter)))
        .collect())
}

/// Convert every recognised archive in `folder`, one at a time.
///
/// Development builds get their version from `versions`. Progress lines are
/// written to `progress`. A failed archive is recorded and the batch moves
/// on to the next one.
///
/// # Errors
///
/// Returns [`BatchError`] only if the folder itself cannot be scanned.
pub fn run_batch(
    folder: &Path,
    registry: &ConverterRegistry,
    settings: &ConvertSettings,
    versions: &mut dyn DevVersionSource,
    progress: &mut dyn Write,
) -> Result<BatchReport, BatchError> {
    write_stderr_line(progress, format!("Scanning folder: {}", folder.display()));
    let mut report = BatchReport::default();

    for (archive, converter) in scan_folder(folder, registry)? {
        let spec = converter.spec();
        let name = file_name_str(&archive).unwrap_or_default();
        write_stderr_line(progress, SEPARATOR);
        write_stderr_line(progress, format!("Found {} archive: {name}", spec.name));

        let outcome = convert_one(converter, &archive, settings, versions);
        match &outcome {
            ArchiveOutcome::Converted(conversion) => {
                write_stderr_line(progress, conversion_summary(conversion));
            }
            ArchiveOutcome::VersionUnavailable(err) => {
                write_stderr_line(progress, format!("Skipped {name}: {err}"));
            }
            ArchiveOutcome::Failed(err) => {
                write_stderr_line(progress, format!("Failed: {err}"));
            }
        }
        report.archives.push(ArchiveReport {
            archive,
            converter: spec.name,
            outcome,
        });
    }

    if report.processed_count() > 0 {
        write_stderr_line(progress, SEPARATOR);
    }
    info!(
        "batch finished: {} processed, {} failed",
        report.processed_count(),
        report.failed_count()
    );
    Ok(report)
}

fn convert_one(
    converter: &Converter,
    archive: &Path,
    settings: &ConvertSettings,
    versions: &mut dyn DevVersionSource,
) -> ArchiveOutcome {
    let spec = converter.spec();
    let mut request = ConvertRequest::new(archive);
    if spec.needs_version() {
        match versions.version_for(archive, spec.package_type) {
            Ok(version) => request = request.with_version(version),
            Err(err) => return ArchiveOutcome::VersionUnavailable(err),
        }
    }
    match converter.convert(&request, settings) {
        Ok(conversion) => ArchiveOutcome::Converted(conversion),
        Err(err) => ArchiveOutcome::Failed(err),
    }
}

/// Move `sources` into `_source_archives` and every `.wcp` file directly in
/// `folder` into `_wcp_output`.
///
/// A file that cannot be moved stays where it is and is reported as a
/// [`RelocationWarning`]; an existing file at the destination is never
/// overwritten.
///
/// # Errors
///
/// Returns [`BatchError`] if a subfolder cannot be created or `folder`
/// cannot be listed.
pub fn organize(folder: &Path, sources: &[PathBuf]) -> Result<Vec<RelocationWarning>, BatchError> {
    let source_dir = create_subfolder(folder, SOURCE_ARCHIVE_DIR)?;
    let output_dir = create_subfolder(folder, OUTPUT_DIR)?;
    let mut warnings = Vec::new();

    for source in sources.iter().filter(|path| path.exists()) {
        if let Err(warning) = move_into(source, &source_dir) {
            warnings.push(warning);
        }
    }

    let read_error = |source| BatchError::ReadDir {
        path: folder.to_path_buf(),
        source,
    };
    let mut containers = fs::read_dir(folder)
        .map_err(read_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_error)?;
    containers.retain(|path| {
        path.is_file()
            && file_name_str(path).is_some_and(|name| name.ends_with(CONTAINER_EXTENSION))
    });
    containers.sort();

    for container in &containers {
        if let Err(warning) = move_into(container, &output_dir) {
            warnings.push(warning);
        }
    }

    for warning in &warnings {
        warn!("{warning}");
    }
    Ok(warnings)
}

fn create_subfolder(folder: &Path, name: &str) -> Result<PathBuf, BatchError> {
    let path = folder.join(name);
    fs::create_dir_all(&path).map_err(|source| BatchError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Move `path` into `dir`, keeping its file name.
fn move_into(path: &Path, dir: &Path) -> Result<PathBuf, RelocationWarning> {
    let warning = |reason: String| RelocationWarning {
        path: path.to_path_buf(),
        destination: dir.to_path_buf(),
        reason,
    };
    let Some(name) = path.file_name() else {
        return Err(warning("path has no file name".to_owned()));
    };
    let target = dir.join(name);
    if target.exists() {
        return Err(warning(format!("{} already exists", target.display())));
    }

    if fs::rename(path, &target).is_err() {
        // Renames fail across filesystems; fall back to copy and delete.
        fs::copy(path, &target).map_err(|err| warning(err.to_string()))?;
        fs::remove_file(path).map_err(|err| warning(err.to_string()))?;
    }
    info!("Moved {} to {}", path.display(), dir.display());
    Ok(target)
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
