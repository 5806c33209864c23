//! Per-archive conversion pipeline.
//!
//! Sequences extraction, normalisation, manifest emission, and packaging for
//! one archive inside a private workspace. The workspace is removed on every
//! exit path, and a failed conversion never leaves a container behind.

use crate::converter::{Converter, Versioning};
use crate::error::{ConversionError, InvalidInputReason, Result};
use crate::format::file_name_str;
use crate::package::manifest::{Profile, build_profile, write_profile};
use crate::package::naming::ContainerName;
use crate::package::normalization::normalize;
use crate::package::packaging::{PackagingOptions, compute_sha256, package, parent_dir};
use crate::package::version::{PackageVersion, infer_version};
use crate::workspace::Workspace;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Where conversions write their output and workspaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSettings {
    /// Directory receiving containers; defaults to the archive's directory.
    pub output_dir: Option<PathBuf>,
    /// Directory holding workspaces; defaults to the archive's directory.
    pub work_root: Option<PathBuf>,
    /// Compression settings.
    pub packaging: PackagingOptions,
}

impl ConvertSettings {
    /// Resolve the output directory for `archive`.
    #[must_use]
    pub fn output_dir_for(&self, archive: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| parent_dir(archive).to_path_buf())
    }

    /// Resolve the workspace parent directory for `archive`.
    #[must_use]
    pub fn work_root_for(&self, archive: &Path) -> PathBuf {
        self.work_root
            .clone()
            .unwrap_or_else(|| parent_dir(archive).to_path_buf())
    }
}

/// One archive to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    /// Source archive path.
    pub archive: PathBuf,
    /// Explicit version; required for development builds.
    pub version: Option<PackageVersion>,
}

impl ConvertRequest {
    /// Request conversion of `archive` with an inferred version.
    #[must_use]
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            version: None,
        }
    }

    /// Supply an explicit version.
    #[must_use]
    pub fn with_version(mut self, version: PackageVersion) -> Self {
        self.version = Some(version);
        self
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Path of the new container.
    pub output_path: PathBuf,
    /// Manifest written into the container.
    pub profile: Profile,
    /// Lowercase hex SHA-256 of the container.
    pub sha256: String,
}

impl Converter {
    /// Convert one archive into a `.wcp` container.
    ///
    /// The extension is checked before anything touches the filesystem.
    /// A development build without a version is rejected before a workspace
    /// is created.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidInput`] for a wrong extension, a
    /// missing file, or a missing development version, and the wrapped stage
    /// error for any later failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use wcp_toolkit::converter::{Converter, ConverterSpec};
    /// use wcp_toolkit::error::{ConversionError, InvalidInputReason};
    /// use wcp_toolkit::pipeline::{ConvertRequest, ConvertSettings};
    ///
    /// let converter = Converter::new(ConverterSpec::VKD3D_PROTON_RELEASE);
    /// let err = converter
    ///     .convert(&ConvertRequest::new("dxvk-2.3.tar.gz"), &ConvertSettings::default())
    ///     .expect_err("wrong extension");
    /// assert!(matches!(
    ///     err,
    ///     ConversionError::InvalidInput {
    ///         reason: InvalidInputReason::WrongExtension { .. },
    ///         ..
    ///     }
    /// ));
    /// ```
    pub fn convert(
        &self,
        request: &ConvertRequest,
        settings: &ConvertSettings,
    ) -> Result<Conversion> {
        let archive = request.archive.as_path();
        let file_name = self.validate_input(archive)?;
        let version = self.resolve_version(archive, file_name, request.version.as_ref())?;
        let output_path = settings
            .output_dir_for(archive)
            .join(self.container_name(file_name, &version));

        let work_root = settings.work_root_for(archive);
        let workspace = Workspace::create(&work_root, self.spec().format).map_err(|source| {
            ConversionError::Workspace {
                path: work_root.clone(),
                source,
            }
        })?;

        let result = self.convert_in(
            &workspace,
            archive,
            &version,
            &output_path,
            settings.packaging,
        );
        if let Err(err) = &result {
            error!("Conversion of {} failed: {err}", archive.display());
        }
        if let Err(err) = workspace.close() {
            warn!("failed to remove workspace: {err}");
        }
        result
    }

    /// Check the extension, then existence; return the archive's file name.
    fn validate_input<'a>(&self, archive: &'a Path) -> Result<&'a str> {
        let format = self.spec().format;
        let file_name = file_name_str(archive)
            .filter(|name| name.ends_with(format.extension()))
            .ok_or_else(|| {
                ConversionError::invalid_input(
                    archive,
                    InvalidInputReason::WrongExtension { expected: format },
                )
            })?;
        if !archive.is_file() {
            return Err(ConversionError::invalid_input(
                archive,
                InvalidInputReason::NotFound,
            ));
        }
        Ok(file_name)
    }

    fn resolve_version(
        &self,
        archive: &Path,
        file_name: &str,
        supplied: Option<&PackageVersion>,
    ) -> Result<PackageVersion> {
        let version = match (supplied, self.spec().versioning) {
            (Some(version), _) => version.clone(),
            (None, Versioning::Release(detection)) => {
                PackageVersion::release(infer_version(file_name, detection))
            }
            (None, Versioning::Development) => {
                return Err(ConversionError::invalid_input(
                    archive,
                    InvalidInputReason::MissingVersion,
                ));
            }
        };
        info!("Version: {version}");
        Ok(version)
    }

    fn container_name(&self, file_name: &str, version: &PackageVersion) -> ContainerName {
        let spec = self.spec();
        match spec.versioning {
            Versioning::Release(_) => ContainerName::from_release(file_name, spec.format),
            Versioning::Development => ContainerName::for_development(spec.package_type, version),
        }
    }

    fn convert_in(
        &self,
        workspace: &Workspace,
        archive: &Path,
        version: &PackageVersion,
        output_path: &Path,
        options: PackagingOptions,
    ) -> Result<Conversion> {
        let spec = self.spec();
        let tree = self
            .extractor
            .extract(archive, workspace.path())
            .map_err(|source| ConversionError::Extraction {
                archive: archive.to_path_buf(),
                source,
            })?;
        info!("Working root: {}", tree.root.display());

        normalize(&tree.root, &spec.mapping)
            .map_err(|source| ConversionError::Normalization { source })?;

        let profile = build_profile(&tree.root, spec.package_type, version, &spec.registry);
        write_profile(&tree.root, &profile)?;

        package(&tree.root, output_path, options)?;
        let sha256 = compute_sha256(output_path)?;
        info!("Created {}", output_path.display());

        Ok(Conversion {
            output_path: output_path.to_path_buf(),
            profile,
            sha256,
        })
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
