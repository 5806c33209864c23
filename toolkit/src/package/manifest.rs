//! Profile manifest synthesis.
//!
//! Every container ships a `profile.json` at its root describing the package
//! type, version, and which DLLs to install where. Entries are only emitted
//! for binaries that are actually present in the normalised workspace.

use super::registry::{BinaryRegistry, CanonicalFolder, PackageType};
use super::version::PackageVersion;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the manifest at the container root.
pub const PROFILE_FILE_NAME: &str = "profile.json";

/// Maps one file inside the container to its install location.
///
/// # Examples
///
/// ```
/// use wcp_toolkit::package::manifest::ManifestEntry;
/// use wcp_toolkit::package::registry::CanonicalFolder;
///
/// let entry = ManifestEntry::for_binary(CanonicalFolder::Syswow64, "d3d9");
/// assert_eq!(entry.source, "syswow64/d3d9.dll");
/// assert_eq!(entry.target, "${syswow64}/d3d9.dll");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the container root.
    pub source: String,
    /// Install path templated on the canonical folder variable.
    pub target: String,
}

impl ManifestEntry {
    /// Build the entry for `<folder>/<name>.dll`.
    #[must_use]
    pub fn for_binary(folder: CanonicalFolder, name: &str) -> Self {
        let folder = folder.dir_name();
        Self {
            source: format!("{folder}/{name}.dll"),
            target: format!("${{{folder}}}/{name}.dll"),
        }
    }
}

/// The manifest document serialized as `profile.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Package flavour.
    #[serde(rename = "type")]
    pub package_type: PackageType,
    /// Human-readable version.
    pub version_name: String,
    /// Numeric version code; `0` when unknown.
    pub version_code: u64,
    /// `<type>-<versionName>`.
    pub description: String,
    /// Installable files, folder-major then registry order.
    pub files: Vec<ManifestEntry>,
}

/// Errors raised while writing the manifest into the workspace.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Writing `profile.json` failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Destination manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Probe `root` for registry binaries and build the package profile.
///
/// Never fails: an archive with no recognised binaries yields an empty
/// `files` list, which is logged as a warning.
#[must_use]
pub fn build_profile(
    root: &Path,
    package_type: PackageType,
    version: &PackageVersion,
    registry: &BinaryRegistry,
) -> Profile {
    let files: Vec<ManifestEntry> = CanonicalFolder::ORDER
        .into_iter()
        .flat_map(|folder| {
            registry
                .binaries(folder)
                .iter()
                .filter(move |name| binary_path(root, folder, name).is_file())
                .map(move |name| ManifestEntry::for_binary(folder, name))
        })
        .collect();

    if files.is_empty() {
        warn!(
            "no {package_type} binaries found under {}; the profile lists no files",
            root.display()
        );
    } else {
        info!("Found {} {package_type} binaries.", files.len());
    }

    Profile {
        package_type,
        version_name: version.name.clone(),
        version_code: version.code,
        description: format!("{package_type}-{}", version.name),
        files,
    }
}

/// Serialize `profile` as four-space indented JSON.
///
/// # Errors
///
/// Returns [`ManifestError::Serialization`] if encoding fails.
pub fn profile_json(profile: &Profile) -> Result<Vec<u8>, ManifestError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    profile.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Write `profile.json` into `root` and return its path.
///
/// # Errors
///
/// Returns [`ManifestError`] if serialization or the write fails.
pub fn write_profile(root: &Path, profile: &Profile) -> Result<PathBuf, ManifestError> {
    let path = root.join(PROFILE_FILE_NAME);
    let json = profile_json(profile)?;
    let write = |path: &Path| -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(&json)?;
        file.sync_all()
    };
    write(&path).map_err(|source| ManifestError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn binary_path(root: &Path, folder: CanonicalFolder, name: &str) -> PathBuf {
    root.join(folder.dir_name()).join(format!("{name}.dll"))
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
