//! Package version resolution.
//!
//! Official releases carry their version in the archive file name; DXVK
//! forks additionally mark themselves with tags such as `sarek` or
//! `gplasync`. Development builds have no reliable naming, so the operator
//! supplies their version explicitly.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Version name used when a file name carries no numeric version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Matches `1.2` or `1.2.3`, optionally prefixed by `v`.
static NUMERIC_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"v?([0-9]+\.[0-9]+(?:\.[0-9]+)?)").ok());

/// DXVK fork tags. Within a group the first matching tag wins, so the
/// specific `gplasync` shadows the general `async`.
const DXVK_FORK_TAGS: &[&[&str]] = &[&["sarek"], &["gplasync", "async"]];

/// Name and numeric code recorded in a package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    /// Free-form version name, e.g. `2.3.1` or `async-2.3.1`.
    pub name: String,
    /// Monotonic version code; `0` when not explicitly known.
    pub code: u64,
}

impl PackageVersion {
    /// Create a version with an explicit code.
    #[must_use]
    pub fn new(name: impl Into<String>, code: u64) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }

    /// Create a version inferred from a release file name (code `0`).
    #[must_use]
    pub fn release(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Tag detection strategy applied on top of the numeric version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDetection {
    /// Use the bare numeric version.
    None,
    /// Prepend DXVK fork tags (`sarek`, `gplasync`, `async`).
    DxvkForks,
}

/// Extract the numeric version from a file name.
///
/// # Examples
///
/// ```
/// use wcp_toolkit::package::version::numeric_version;
///
/// assert_eq!(numeric_version("vkd3d-proton-v2.12.tar.zst"), Some("2.12"));
/// assert_eq!(numeric_version("dxvk-master.zip"), None);
/// ```
#[must_use]
pub fn numeric_version(file_name: &str) -> Option<&str> {
    NUMERIC_VERSION
        .as_ref()?
        .captures(file_name)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str())
}

/// Detect DXVK fork tags in a lowercased file name, in priority order.
#[must_use]
pub fn fork_tags(file_name_lower: &str) -> Vec<&'static str> {
    DXVK_FORK_TAGS
        .iter()
        .filter_map(|group| {
            group
                .iter()
                .copied()
                .find(|tag| file_name_lower.contains(tag))
        })
        .collect()
}

/// Infer a release version name from an archive file name.
///
/// Falls back to [`UNKNOWN_VERSION`] when no numeric version is present.
///
/// # Examples
///
/// ```
/// use wcp_toolkit::package::version::{TagDetection, infer_version};
///
/// assert_eq!(
///     infer_version("dxvk-sarek-gplasync-1.0.tar.gz", TagDetection::DxvkForks),
///     "sarek-gplasync-1.0"
/// );
/// assert_eq!(infer_version("vkd3d-proton-2.12.tar.zst", TagDetection::None), "2.12");
/// ```
#[must_use]
pub fn infer_version(file_name: &str, detection: TagDetection) -> String {
    match detection {
        TagDetection::None => numeric_version(file_name)
            .unwrap_or(UNKNOWN_VERSION)
            .to_owned(),
        TagDetection::DxvkForks => {
            let lower = file_name.to_lowercase();
            let core = numeric_version(&lower).unwrap_or(UNKNOWN_VERSION);
            let mut parts = fork_tags(&lower);
            parts.push(core);
            parts.join("-")
        }
    }
}
