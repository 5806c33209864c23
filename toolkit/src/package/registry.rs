//! Package types, canonical folders, and the expected-binary registry.
//!
//! The registry is fixed configuration: it lists which DLL base names a
//! package of a given type may ship in each canonical folder. It is never
//! derived from archive contents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two architecture folders every container uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalFolder {
    /// 64-bit binaries.
    System32,
    /// 32-bit binaries.
    Syswow64,
}

impl CanonicalFolder {
    /// Manifest iteration order: `system32` first, then `syswow64`.
    pub const ORDER: [Self; 2] = [Self::System32, Self::Syswow64];

    /// Return the directory name used inside the container.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::System32 => "system32",
            Self::Syswow64 => "syswow64",
        }
    }
}

impl fmt::Display for CanonicalFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Package flavour recorded in the manifest `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackageType {
    /// Direct3D 8-11 to Vulkan translation layer.
    Dxvk,
    /// Direct3D 12 to Vulkan translation layer.
    Vkd3d,
}

impl PackageType {
    /// Return the manifest spelling (`DXVK` or `VKD3D`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dxvk => "DXVK",
            Self::Vkd3d => "VKD3D",
        }
    }

    /// Return the lowercase form used in generated file names.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Dxvk => "dxvk",
            Self::Vkd3d => "vkd3d",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected binary base names per canonical folder.
///
/// # Examples
///
/// ```
/// use wcp_toolkit::package::registry::{BinaryRegistry, CanonicalFolder, PackageType};
///
/// let registry = BinaryRegistry::for_package(PackageType::Vkd3d);
/// assert_eq!(registry.binaries(CanonicalFolder::System32), ["d3d12", "d3d12core"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryRegistry {
    system32: &'static [&'static str],
    syswow64: &'static [&'static str],
}

impl BinaryRegistry {
    /// DXVK: the 32-bit folder additionally carries `d3d8`.
    pub const DXVK: Self = Self::new(
        &["d3d9", "d3d10", "d3d10_1", "d3d10core", "d3d11", "dxgi"],
        &[
            "d3d8", "d3d9", "d3d10", "d3d10_1", "d3d10core", "d3d11", "dxgi",
        ],
    );

    /// vkd3d-proton: both folders carry the same pair.
    pub const VKD3D: Self = Self::new(&["d3d12", "d3d12core"], &["d3d12", "d3d12core"]);

    /// Create a registry from per-folder name lists.
    #[must_use]
    pub const fn new(
        system32: &'static [&'static str],
        syswow64: &'static [&'static str],
    ) -> Self {
        Self { system32, syswow64 }
    }

    /// Return the registry for a package type.
    #[must_use]
    pub const fn for_package(package_type: PackageType) -> Self {
        match package_type {
            PackageType::Dxvk => Self::DXVK,
            PackageType::Vkd3d => Self::VKD3D,
        }
    }

    /// Return the expected base names for `folder`, in registry order.
    #[must_use]
    pub const fn binaries(&self, folder: CanonicalFolder) -> &'static [&'static str] {
        match folder {
            CanonicalFolder::System32 => self.system32,
            CanonicalFolder::Syswow64 => self.syswow64,
        }
    }
}
