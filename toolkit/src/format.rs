//! Recognised upstream archive formats.
//!
//! Each release family ships in exactly one container layout. The format tag
//! drives extractor selection, input validation, and output naming.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// Compression and container layout of an upstream release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// A gzip-compressed tarball (`.tar.gz`).
    GzipTar,
    /// A zip archive (`.zip`).
    Zip,
    /// A zstd-compressed tarball (`.tar.zst`).
    ZstdTar,
}

impl ArchiveFormat {
    /// Every supported format, in dispatch order.
    pub const ALL: [Self; 3] = [Self::GzipTar, Self::Zip, Self::ZstdTar];

    /// Return the filename suffix identifying this format.
    ///
    /// # Examples
    ///
    /// ```
    /// use wcp_toolkit::format::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::ZstdTar.extension(), ".tar.zst");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::GzipTar => ".tar.gz",
            Self::Zip => ".zip",
            Self::ZstdTar => ".tar.zst",
        }
    }

    /// Return a short human-readable label used in logs and workspace names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GzipTar => "gzip-tar",
            Self::Zip => "zip",
            Self::ZstdTar => "zstd-tar",
        }
    }

    /// Check whether `path` carries this format's extension.
    ///
    /// Only the file name is inspected; the filesystem is never touched.
    #[must_use]
    pub fn matches(self, path: &Path) -> bool {
        file_name_str(path).is_some_and(|name| name.ends_with(self.extension()))
    }

    /// Detect the format of `path` from its extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use wcp_toolkit::format::ArchiveFormat;
    ///
    /// let format = ArchiveFormat::detect(Path::new("dxvk-2.3.tar.gz"));
    /// assert_eq!(format, Some(ArchiveFormat::GzipTar));
    /// assert_eq!(ArchiveFormat::detect(Path::new("notes.txt")), None);
    /// ```
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.matches(path))
    }

    /// Strip this format's extension from a file name.
    ///
    /// Returns `None` when the name does not end with the extension.
    #[must_use]
    pub fn strip_extension(self, file_name: &str) -> Option<&str> {
        file_name.strip_suffix(self.extension())
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Return the UTF-8 file name of `path`, if it has one.
pub(crate) fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(OsStr::to_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::gzip("dxvk-2.3.1.tar.gz", Some(ArchiveFormat::GzipTar))]
    #[case::zip("dxvk-master-f1a3b4c.zip", Some(ArchiveFormat::Zip))]
    #[case::zstd("vkd3d-proton-2.12.tar.zst", Some(ArchiveFormat::ZstdTar))]
    #[case::plain_tar("dxvk-2.3.tar", None)]
    #[case::uppercase("DXVK-2.3.TAR.GZ", None)]
    fn detect_uses_filename_suffix(#[case] name: &str, #[case] expected: Option<ArchiveFormat>) {
        assert_eq!(ArchiveFormat::detect(Path::new(name)), expected);
    }

    #[test]
    fn matches_ignores_directory_components() {
        let path = Path::new("/tmp/release.zip/dxvk-2.3.tar.gz");
        assert!(ArchiveFormat::GzipTar.matches(path));
        assert!(!ArchiveFormat::Zip.matches(path));
    }

    #[test]
    fn strip_extension_returns_stem() {
        assert_eq!(
            ArchiveFormat::ZstdTar.strip_extension("vkd3d-proton-2.12.tar.zst"),
            Some("vkd3d-proton-2.12")
        );
        assert_eq!(ArchiveFormat::Zip.strip_extension("dxvk.tar.gz"), None);
    }
}
