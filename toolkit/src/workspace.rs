//! Per-conversion temporary workspaces.
//!
//! A workspace is an exclusively owned temporary directory that holds the
//! extracted and normalised release while one archive is converted. It is
//! removed when dropped, so no exit path can leave it behind.

use crate::format::ArchiveFormat;
use log::debug;
use std::io;
use std::path::Path;
use tempfile::TempDir;

/// Prefix shared by every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "wcp-";

/// A uniquely named temporary directory, deleted on drop.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace named `wcp-<format>-XXXX` inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating the directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use wcp_toolkit::format::ArchiveFormat;
    /// use wcp_toolkit::workspace::Workspace;
    ///
    /// let parent = tempfile::tempdir().expect("tempdir");
    /// let workspace = Workspace::create(parent.path(), ArchiveFormat::Zip).expect("create");
    /// assert!(workspace.path().is_dir());
    ///
    /// let path = workspace.path().to_path_buf();
    /// drop(workspace);
    /// assert!(!path.exists());
    /// ```
    pub fn create(parent: &Path, format: ArchiveFormat) -> io::Result<Self> {
        let prefix = format!("{WORKSPACE_PREFIX}{}-", format.label());
        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(parent)?;
        debug!("created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Return the workspace directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while deleting the directory tree.
    pub fn close(self) -> io::Result<()> {
        debug!("removing workspace {}", self.dir.path().display());
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;

    #[fixture]
    fn parent() -> TempDir {
        TempDir::new().expect("temp dir")
    }

    #[rstest]
    #[case::gzip(ArchiveFormat::GzipTar, "wcp-gzip-tar-")]
    #[case::zip(ArchiveFormat::Zip, "wcp-zip-")]
    #[case::zstd(ArchiveFormat::ZstdTar, "wcp-zstd-tar-")]
    fn workspace_name_carries_format_label(
        parent: TempDir,
        #[case] format: ArchiveFormat,
        #[case] prefix: &str,
    ) {
        let workspace = Workspace::create(parent.path(), format).expect("create");

        assert_eq!(workspace.path().parent(), Some(parent.path()));
        let name = workspace
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .expect("utf-8 name");
        assert!(name.starts_with(prefix), "{name} should start with {prefix}");
    }

    #[rstest]
    fn workspaces_are_unique(parent: TempDir) {
        let first = Workspace::create(parent.path(), ArchiveFormat::Zip).expect("first");
        let second = Workspace::create(parent.path(), ArchiveFormat::Zip).expect("second");
        assert_ne!(first.path(), second.path());
    }

    #[rstest]
    fn close_removes_populated_tree(parent: TempDir) {
        let workspace = Workspace::create(parent.path(), ArchiveFormat::GzipTar).expect("create");
        let nested = workspace.path().join("dxvk-2.3").join("x64");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(nested.join("d3d11.dll"), b"MZ").expect("write");
        let path = workspace.path().to_path_buf();

        workspace.close().expect("close");

        assert!(!path.exists());
    }

    #[rstest]
    fn missing_parent_is_an_error(parent: TempDir) {
        let result = Workspace::create(&parent.path().join("absent"), ArchiveFormat::Zip);
        assert!(result.is_err());
    }
}
