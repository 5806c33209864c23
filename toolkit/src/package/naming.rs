//! Output container naming policy.
//!
//! Official releases keep their upstream name with the source extension
//! swapped for `.wcp`. Development builds have inconsistent names, so their
//! container name is derived from the package type and operator-supplied
//! version instead.

use super::registry::PackageType;
use super::version::PackageVersion;
use crate::format::ArchiveFormat;
use std::fmt;

/// Extension of every output container.
pub const CONTAINER_EXTENSION: &str = ".wcp";

/// A deterministic output container file name.
///
/// # Examples
///
/// ```
/// use wcp_toolkit::format::ArchiveFormat;
/// use wcp_toolkit::package::naming::ContainerName;
/// use wcp_toolkit::package::registry::PackageType;
/// use wcp_toolkit::package::version::PackageVersion;
///
/// let release = ContainerName::from_release("dxvk-2.3.1.tar.gz", ArchiveFormat::GzipTar);
/// assert_eq!(release.as_str(), "dxvk-2.3.1.wcp");
///
/// let dev = ContainerName::for_development(
///     PackageType::Dxvk,
///     &PackageVersion::new("2.3-f1a3b4c", 20231026),
/// );
/// assert_eq!(dev.to_string(), "dxvk-2.3-f1a3b4c-20231026.wcp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName(String);

impl ContainerName {
    /// Derive the name by replacing the source extension with `.wcp`.
    ///
    /// A name lacking the extension keeps its full text as the stem.
    #[must_use]
    pub fn from_release(source_file_name: &str, format: ArchiveFormat) -> Self {
        let stem = format
            .strip_extension(source_file_name)
            .unwrap_or(source_file_name);
        Self(format!("{stem}{CONTAINER_EXTENSION}"))
    }

    /// Derive the name from package type, version name, and version code.
    #[must_use]
    pub fn for_development(package_type: PackageType, version: &PackageVersion) -> Self {
        Self(format!(
            "{}-{}-{}{CONTAINER_EXTENSION}",
            package_type.slug(),
            version.name,
            version.code
        ))
    }

    /// Return the file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<std::path::Path> for ContainerName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::gzip("dxvk-2.3.1.tar.gz", ArchiveFormat::GzipTar, "dxvk-2.3.1.wcp")]
    #[case::zstd(
        "vkd3d-proton-2.12.tar.zst",
        ArchiveFormat::ZstdTar,
        "vkd3d-proton-2.12.wcp"
    )]
    #[case::only_final_suffix("a.tar.gz.tar.gz", ArchiveFormat::GzipTar, "a.tar.gz.wcp")]
    fn release_names_swap_extension(
        #[case] source: &str,
        #[case] format: ArchiveFormat,
        #[case] expected: &str,
    ) {
        assert_eq!(ContainerName::from_release(source, format).as_str(), expected);
    }

    #[test]
    fn development_names_use_slug_and_code() {
        let name = ContainerName::for_development(PackageType::Vkd3d, &PackageVersion::new("x", 7));
        assert_eq!(name.as_str(), "vkd3d-x-7.wcp");
    }
}
