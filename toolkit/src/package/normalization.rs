//! Architecture directory normalisation.
//!
//! Upstream releases name their per-architecture folders inconsistently
//! (`x32`, `x86`, `x64`). Containers always use `system32` and `syswow64`.

use super::registry::CanonicalFolder;
use log::info;
use std::io;
use std::path::Path;

/// Fixed table mapping upstream folder names to canonical folders.
///
/// Mappings are disjoint by construction: each canonical folder appears at
/// most once, so a rename never lands on a directory produced by another
/// pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchitectureMapping {
    pairs: &'static [(&'static str, CanonicalFolder)],
}

impl ArchitectureMapping {
    /// DXVK releases and development builds.
    pub const DXVK: Self = Self::new(&[
        ("x32", CanonicalFolder::Syswow64),
        ("x64", CanonicalFolder::System32),
    ]);

    /// vkd3d-proton releases.
    pub const VKD3D_PROTON: Self = Self::new(&[
        ("x86", CanonicalFolder::Syswow64),
        ("x64", CanonicalFolder::System32),
    ]);

    /// Create a mapping from `(source, target)` pairs.
    #[must_use]
    pub const fn new(pairs: &'static [(&'static str, CanonicalFolder)]) -> Self {
        Self { pairs }
    }

    /// Iterate the `(source, target)` pairs in table order.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, CanonicalFolder)> + '_ {
        self.pairs.iter().copied()
    }
}

/// A rename that [`normalize`] actually performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    /// Upstream directory name.
    pub from: &'static str,
    /// Canonical folder it now lives under.
    pub to: CanonicalFolder,
}

/// Rename known architecture directories under `root` to canonical names.
///
/// Missing source directories are skipped: a release may ship only one
/// architecture. An existing target directory is never replaced.
///
/// # Errors
///
/// Returns an [`io::ErrorKind::AlreadyExists`] error if the target name is
/// already taken, or the underlying I/O error if a rename fails.
pub fn normalize(root: &Path, mapping: &ArchitectureMapping) -> io::Result<Vec<Rename>> {
    let mut applied = Vec::new();
    for (from, to) in mapping.pairs() {
        let source = root.join(from);
        if !source.exists() {
            continue;
        }
        let target = root.join(to.dir_name());
        if target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "cannot rename '{from}': {} already exists",
                    target.display()
                ),
            ));
        }
        std::fs::rename(&source, &target)?;
        info!("Renamed '{from}' to '{to}'.");
        applied.push(Rename { from, to });
    }
    Ok(applied)
}
