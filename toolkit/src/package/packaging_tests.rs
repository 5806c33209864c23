//! Unit tests for the container packaging module.

use super::*;
use rstest::{fixture, rstest};
use std::collections::BTreeSet;
use std::io::Read;
use tempfile::TempDir;

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("temp dir creation succeeds")
}

/// A small normalised workspace: two architecture folders and a manifest.
fn populate_workspace(root: &Path) {
    fs::create_dir_all(root.join("system32")).expect("mkdir system32");
    fs::create_dir_all(root.join("syswow64").join("nested")).expect("mkdir syswow64");
    fs::write(root.join("system32").join("d3d11.dll"), b"x64 d3d11").expect("write");
    fs::write(root.join("syswow64").join("d3d9.dll"), b"x86 d3d9").expect("write");
    fs::write(root.join("syswow64").join("nested").join("readme"), b"n").expect("write");
    fs::write(root.join("profile.json"), b"{}").expect("write profile");
}

fn single_threaded() -> PackagingOptions {
    PackagingOptions {
        level: DEFAULT_COMPRESSION_LEVEL,
        threads: 1,
    }
}

#[rstest]
fn compute_sha256_of_known_content(temp_dir: TempDir) {
    let path = temp_dir.path().join("test.bin");
    // SHA-256 of empty file is the well-known constant.
    fs::write(&path, b"").expect("write");
    let digest = compute_sha256(&path).expect("sha256 succeeds");
    assert_eq!(
        digest,
        concat!(
            "e3b0c44298fc1c149afbf4c8996fb924",
            "27ae41e4649b934ca495991b7852b855"
        )
    );
}

#[rstest]
fn container_members_mirror_workspace_children(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    populate_workspace(&root);
    let output = temp_dir.path().join("out.wcp");

    package(&root, &output, single_threaded()).expect("packaging succeeds");

    let entries = list_archive_entries(&output);
    let top_level: BTreeSet<String> = entries
        .iter()
        .filter_map(|name| name.split('/').next())
        .map(str::to_owned)
        .collect();
    let expected: BTreeSet<String> = ["profile.json", "syswow64", "system32"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    assert_eq!(top_level, expected);
    assert!(entries.contains(&"system32/d3d11.dll".to_owned()));
    assert!(entries.contains(&"syswow64/nested/readme".to_owned()));
    assert!(
        !entries.iter().any(|name| name.starts_with("work")),
        "the workspace directory itself must not be a member"
    );
}

#[rstest]
fn file_contents_survive_round_trip(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    populate_workspace(&root);
    let output = temp_dir.path().join("out.wcp");

    package(&root, &output, PackagingOptions::default()).expect("packaging succeeds");

    let file = fs::File::open(&output).expect("open");
    let decoder = zstd::Decoder::new(file).expect("zstd decode");
    let mut archive = tar::Archive::new(decoder);
    let mut found = false;
    for entry in archive.entries().expect("entries") {
        let mut entry = entry.expect("entry");
        let path = entry.path().expect("path").into_owned();
        if path == Path::new("syswow64/d3d9.dll") {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).expect("read");
            assert_eq!(contents, b"x86 d3d9");
            found = true;
        }
    }
    assert!(found, "syswow64/d3d9.dll missing from container");
}

#[rstest]
fn members_are_sorted(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    fs::create_dir_all(&root).expect("mkdir");
    for name in ["zeta", "alpha", "mid"] {
        fs::write(root.join(name), name).expect("write");
    }
    let output = temp_dir.path().join("sorted.wcp");

    package(&root, &output, single_threaded()).expect("packaging succeeds");

    assert_eq!(list_archive_entries(&output), vec!["alpha", "mid", "zeta"]);
}

#[rstest]
fn empty_workspace_produces_valid_container(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    fs::create_dir_all(&root).expect("mkdir");
    let output = temp_dir.path().join("empty.wcp");

    package(&root, &output, single_threaded()).expect("packaging succeeds");

    assert!(output.is_file());
    assert!(list_archive_entries(&output).is_empty());
}

#[rstest]
fn missing_root_is_rejected_without_output(temp_dir: TempDir) {
    let output = temp_dir.path().join("never.wcp");

    let err = package(&temp_dir.path().join("absent"), &output, single_threaded())
        .expect_err("expected packaging to fail");

    assert!(matches!(err, PackagingError::NotADirectory(_)));
    assert!(!output.exists());
}

#[rstest]
fn missing_output_directory_is_created(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    populate_workspace(&root);
    let output = temp_dir.path().join("dist").join("nested").join("out.wcp");

    package(&root, &output, single_threaded()).expect("package");

    assert!(output.is_file());
}

#[rstest]
fn unusable_output_directory_leaves_nothing_behind(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    populate_workspace(&root);
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, b"a file, not a directory").expect("write blocker");
    let output = blocker.join("out.wcp");

    let err = package(&root, &output, single_threaded()).expect_err("expected failure");

    assert!(matches!(err, PackagingError::Io(_)));
    assert!(!output.exists());
}

#[rstest]
fn no_partial_files_remain_after_success(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    populate_workspace(&root);
    let output = temp_dir.path().join("out.wcp");

    package(&root, &output, single_threaded()).expect("packaging succeeds");

    let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
        .expect("read_dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty(), "staging file left behind: {leftovers:?}");
}

#[rstest]
fn repackaging_overwrites_existing_container(temp_dir: TempDir) {
    let root = temp_dir.path().join("work");
    populate_workspace(&root);
    let output = temp_dir.path().join("out.wcp");
    fs::write(&output, b"stale").expect("write stale");

    package(&root, &output, single_threaded()).expect("packaging succeeds");

    assert!(list_archive_entries(&output).contains(&"profile.json".to_owned()));
}

#[test]
fn parent_dir_of_bare_name_is_current_dir() {
    assert_eq!(parent_dir(Path::new("out.wcp")), Path::new("."));
    assert_eq!(parent_dir(Path::new("dist/out.wcp")), Path::new("dist"));
}

/// Extract entry names from a `.wcp` container for test assertions.
fn list_archive_entries(archive_path: &Path) -> Vec<String> {
    let file = fs::File::open(archive_path).expect("open archive");
    let decoder = zstd::Decoder::new(file).expect("zstd decode");
    let mut archive = tar::Archive::new(decoder);
    archive
        .entries()
        .expect("entries")
        .map(|e| {
            let entry = e.expect("entry");
            entry
                .path()
                .expect("path")
                .to_string_lossy()
                .trim_end_matches('/')
                .to_owned()
        })
        .collect()
}
