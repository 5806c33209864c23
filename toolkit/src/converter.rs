//! Static converter registry.
//!
//! Each converter pairs one upstream archive format with the extractor,
//! architecture mapping, binary registry, and versioning strategy needed to
//! turn it into a `.wcp` container. The registry is an explicit value handed
//! to the pipeline and batch layer; a converter that is not registered is
//! simply unavailable.

use crate::format::ArchiveFormat;
use crate::package::extraction::{ArchiveExtractor, extractor_for};
use crate::package::normalization::ArchitectureMapping;
use crate::package::registry::{BinaryRegistry, PackageType};
use crate::package::version::TagDetection;
use std::fmt;
use std::path::Path;

/// How a converter obtains the package version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Versioning {
    /// Infer the version from the archive file name.
    Release(TagDetection),
    /// Require an operator-supplied version; name the container after it.
    Development,
}

/// Static description of one converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterSpec {
    /// Stable identifier, e.g. `dxvk-dev`.
    pub name: &'static str,
    /// Accepted archive format.
    pub format: ArchiveFormat,
    /// Manifest package type.
    pub package_type: PackageType,
    /// Architecture folder renames.
    pub mapping: ArchitectureMapping,
    /// Expected binaries per canonical folder.
    pub registry: BinaryRegistry,
    /// Version resolution strategy.
    pub versioning: Versioning,
}

impl ConverterSpec {
    /// Official DXVK releases (`.tar.gz`).
    pub const DXVK_RELEASE: Self = Self {
        name: "dxvk",
        format: ArchiveFormat::GzipTar,
        package_type: PackageType::Dxvk,
        mapping: ArchitectureMapping::DXVK,
        registry: BinaryRegistry::DXVK,
        versioning: Versioning::Release(TagDetection::DxvkForks),
    };

    /// DXVK development builds (`.zip`).
    pub const DXVK_DEVELOPMENT: Self = Self {
        name: "dxvk-dev",
        format: ArchiveFormat::Zip,
        package_type: PackageType::Dxvk,
        mapping: ArchitectureMapping::DXVK,
        registry: BinaryRegistry::DXVK,
        versioning: Versioning::Development,
    };

    /// Official vkd3d-proton releases (`.tar.zst`).
    pub const VKD3D_PROTON_RELEASE: Self = Self {
        name: "vkd3d-proton",
        format: ArchiveFormat::ZstdTar,
        package_type: PackageType::Vkd3d,
        mapping: ArchitectureMapping::VKD3D_PROTON,
        registry: BinaryRegistry::VKD3D,
        versioning: Versioning::Release(TagDetection::None),
    };

    /// Every built-in converter, in dispatch order.
    pub const STANDARD: [Self; 3] = [
        Self::DXVK_RELEASE,
        Self::DXVK_DEVELOPMENT,
        Self::VKD3D_PROTON_RELEASE,
    ];

    /// Return true when this converter needs an operator-supplied version.
    #[must_use]
    pub const fn needs_version(&self) -> bool {
        matches!(self.versioning, Versioning::Development)
    }
}

/// A converter: its static description plus the extractor it drives.
pub struct Converter {
    spec: ConverterSpec,
    pub(crate) extractor: Box<dyn ArchiveExtractor>,
}

impl Converter {
    /// Create a converter using the production extractor for its format.
    #[must_use]
    pub fn new(spec: ConverterSpec) -> Self {
        Self::with_extractor(spec, extractor_for(spec.format))
    }

    /// Create a converter with a custom extractor.
    #[must_use]
    pub fn with_extractor(spec: ConverterSpec, extractor: Box<dyn ArchiveExtractor>) -> Self {
        Self { spec, extractor }
    }

    /// Return the converter's static description.
    #[must_use]
    pub const fn spec(&self) -> &ConverterSpec {
        &self.spec
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("spec", &self.spec)
            .field("extractor", &self.extractor.format())
            .finish()
    }
}

/// Ordered collection of available converters.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use wcp_toolkit::converter::ConverterRegistry;
///
/// let registry = ConverterRegistry::standard();
/// let converter = registry
///     .for_path(Path::new("vkd3d-proton-2.12.tar.zst"))
///     .expect("zstd tarballs are supported");
/// assert_eq!(converter.spec().name, "vkd3d-proton");
/// assert!(registry.for_path(Path::new("notes.txt")).is_none());
/// ```
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    converters: Vec<Converter>,
}

impl ConverterRegistry {
    /// Registry holding every built-in converter.
    #[must_use]
    pub fn standard() -> Self {
        ConverterSpec::STANDARD
            .into_iter()
            .fold(Self::empty(), |registry, spec| {
                registry.register(Converter::new(spec))
            })
    }

    /// Registry with no converters.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a converter, after those already registered.
    #[must_use]
    pub fn register(mut self, converter: Converter) -> Self {
        self.converters.push(converter);
        self
    }

    /// Return the first converter accepting `format`.
    #[must_use]
    pub fn for_format(&self, format: ArchiveFormat) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|converter| converter.spec.format == format)
    }

    /// Return the converter whose extension matches `path`'s file name.
    #[must_use]
    pub fn for_path(&self, path: &Path) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|converter| converter.spec.format.matches(path))
    }

    /// Look a converter up by its identifier.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|converter| converter.spec.name == name)
    }

    /// Iterate converters in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Converter> {
        self.converters.iter()
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Return true when no converter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
