//! Behaviour-driven tests for single-archive conversion.
//!
//! Scenarios build synthetic upstream archives, run them through the
//! standard converter registry, and inspect the resulting `.wcp` container.
//! Tests use the rstest-bdd v0.5.0 mutable world pattern.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wcp_toolkit::converter::ConverterRegistry;
use wcp_toolkit::error::{ConversionError, InvalidInputReason};
use wcp_toolkit::package::packaging::{DEFAULT_COMPRESSION_LEVEL, PackagingOptions};
use wcp_toolkit::package::version::PackageVersion;
use wcp_toolkit::pipeline::{Conversion, ConvertRequest, ConvertSettings};
use wcp_toolkit::test_utils::{
    container_entries, container_profile, dxvk_dev_entries, dxvk_release_entries,
    entries_with_prefix, vkd3d_release_entries, write_archive,
};

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct ConversionWorld {
    temp_dir: TempDir,
    archive: Option<PathBuf>,
    version: Option<PackageVersion>,
    conversion: Option<Conversion>,
    error: Option<ConversionError>,
}

#[fixture]
fn world() -> ConversionWorld {
    ConversionWorld {
        temp_dir: TempDir::new().expect("temp dir"),
        archive: None,
        version: None,
        conversion: None,
        error: None,
    }
}

impl ConversionWorld {
    fn conversion(&self) -> &Conversion {
        match (&self.conversion, &self.error) {
            (Some(conversion), _) => conversion,
            (None, Some(err)) => panic!("conversion failed: {err}"),
            (None, None) => panic!("archive was not converted"),
        }
    }

    fn error(&self) -> &ConversionError {
        self.error.as_ref().expect("conversion should have failed")
    }

    fn profile_field(&self, field: &str) -> serde_json::Value {
        let profile = container_profile(&self.conversion().output_path);
        profile.get(field).cloned().expect("profile field present")
    }
}

/// Top-level directory name used inside release tarballs.
fn release_top(file_name: &str) -> &str {
    file_name
        .strip_suffix(".tar.gz")
        .or_else(|| file_name.strip_suffix(".tar.zst"))
        .unwrap_or(file_name)
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a \"{converter}\" archive named \"{name}\"")]
fn given_archive(world: &mut ConversionWorld, converter: String, name: String) {
    let registry = ConverterRegistry::standard();
    let format = registry
        .by_name(&converter)
        .expect("known converter")
        .spec()
        .format;
    let entries = match converter.as_str() {
        "dxvk" => dxvk_release_entries(release_top(&name)),
        "vkd3d-proton" => vkd3d_release_entries(release_top(&name)),
        _ => dxvk_dev_entries(),
    };
    let path = world.temp_dir.path().join(&name);
    write_archive(&path, format, &entries);
    world.archive = Some(path);
}

#[given("a corrupt \"{converter}\" archive named \"{name}\"")]
fn given_corrupt_archive(world: &mut ConversionWorld, converter: String, name: String) {
    assert!(ConverterRegistry::standard().by_name(&converter).is_some());
    let path = world.temp_dir.path().join(&name);
    fs::write(&path, b"definitely not an archive").expect("write corrupt archive");
    world.archive = Some(path);
}

#[given("the development version \"{name}\" with code {code}")]
fn given_dev_version(world: &mut ConversionWorld, name: String, code: u64) {
    world.version = Some(PackageVersion::new(name, code));
}

#[when("the archive is converted")]
fn when_converted(world: &mut ConversionWorld) {
    let archive = world.archive.clone().expect("archive set");
    let registry = ConverterRegistry::standard();
    let converter = registry.for_path(&archive).expect("supported archive");

    let mut request = ConvertRequest::new(archive);
    if let Some(version) = world.version.clone() {
        request = request.with_version(version);
    }
    let settings = ConvertSettings {
        packaging: PackagingOptions {
            level: DEFAULT_COMPRESSION_LEVEL,
            threads: 1,
        },
        ..ConvertSettings::default()
    };

    match converter.convert(&request, &settings) {
        Ok(conversion) => world.conversion = Some(conversion),
        Err(err) => world.error = Some(err),
    }
}

#[then("the container \"{name}\" is created")]
fn then_container_created(world: &mut ConversionWorld, name: String) {
    let expected = world.temp_dir.path().join(&name);
    assert_eq!(world.conversion().output_path, expected);
    assert!(expected.is_file(), "{name} should exist");
}

#[then("the manifest type is \"{expected}\"")]
fn then_manifest_type(world: &mut ConversionWorld, expected: String) {
    assert_eq!(world.profile_field("type"), serde_json::json!(expected));
}

#[then("the manifest version name is \"{expected}\"")]
fn then_manifest_version_name(world: &mut ConversionWorld, expected: String) {
    assert_eq!(world.profile_field("versionName"), serde_json::json!(expected));
}

#[then("the manifest version code is {expected}")]
fn then_manifest_version_code(world: &mut ConversionWorld, expected: u64) {
    assert_eq!(world.profile_field("versionCode"), serde_json::json!(expected));
}

#[then("the manifest lists {count} files")]
fn then_manifest_file_count(world: &mut ConversionWorld, count: usize) {
    let files = world.profile_field("files");
    let files = files.as_array().expect("files is an array");
    assert_eq!(files.len(), count);
    assert_eq!(world.conversion().profile.files.len(), count);
}

#[then("the container holds \"{entry}\"")]
fn then_container_holds(world: &mut ConversionWorld, entry: String) {
    let entries = container_entries(&world.conversion().output_path);
    assert!(
        entries.contains(&entry),
        "{entry} missing from container: {entries:?}"
    );
}

#[then("no workspace is left behind")]
fn then_no_workspace(world: &mut ConversionWorld) {
    let leftovers = entries_with_prefix(world.temp_dir.path(), "wcp-");
    assert!(leftovers.is_empty(), "leftover workspaces: {leftovers:?}");
}

#[then("the conversion is rejected as invalid input")]
fn then_rejected(world: &mut ConversionWorld) {
    assert!(matches!(
        world.error(),
        ConversionError::InvalidInput {
            reason: InvalidInputReason::MissingVersion,
            ..
        }
    ));
}

#[then("the conversion fails while extracting")]
fn then_extraction_failed(world: &mut ConversionWorld) {
    assert!(matches!(
        world.error(),
        ConversionError::Extraction { .. }
    ));
}

#[then("no container is created")]
fn then_no_container(world: &mut ConversionWorld) {
    let containers: Vec<_> = fs::read_dir(world.temp_dir.path())
        .expect("read_dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "wcp"))
        .collect();
    assert!(containers.is_empty());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/conversion.feature", name = "Convert a DXVK release")]
fn scenario_dxvk_release(world: ConversionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/conversion.feature",
    name = "Convert a DXVK fork release"
)]
fn scenario_dxvk_fork(world: ConversionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/conversion.feature",
    name = "Convert a vkd3d-proton release"
)]
fn scenario_vkd3d_release(world: ConversionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/conversion.feature",
    name = "Convert a DXVK development build with a supplied version"
)]
fn scenario_dev_build(world: ConversionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/conversion.feature",
    name = "A development build needs a version"
)]
fn scenario_dev_build_needs_version(world: ConversionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/conversion.feature",
    name = "A corrupt archive fails cleanly"
)]
fn scenario_corrupt_archive(world: ConversionWorld) {
    let _ = world;
}
