//! Synthetic release archives for unit and behavioural tests.
//!
//! Builds small gzip-tar, zstd-tar, and zip archives laid out like real
//! DXVK and vkd3d-proton releases, so conversions can be exercised without
//! shipping binary fixtures.

use crate::format::ArchiveFormat;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// One member of a synthetic archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureEntry {
    /// Member path inside the archive, `/`-separated.
    pub path: String,
    /// File contents, or `None` for a directory member.
    pub contents: Option<Vec<u8>>,
}

/// A directory member.
pub fn dir(path: &str) -> FixtureEntry {
    FixtureEntry {
        path: path.to_owned(),
        contents: None,
    }
}

/// A regular file member.
pub fn file(path: &str, contents: &[u8]) -> FixtureEntry {
    FixtureEntry {
        path: path.to_owned(),
        contents: Some(contents.to_vec()),
    }
}

/// Entries for `<arch>/<name>.dll` files, preceded by the `<arch>` directory.
pub fn dlls(prefix: &str, arch: &str, names: &[&str]) -> Vec<FixtureEntry> {
    let base = join(prefix, arch);
    std::iter::once(dir(&base))
        .chain(
            names
                .iter()
                .map(|name| file(&format!("{base}/{name}.dll"), format!("MZ {name}").as_bytes())),
        )
        .collect()
}

/// A complete DXVK release wrapped in a `top` directory.
pub fn dxvk_release_entries(top: &str) -> Vec<FixtureEntry> {
    let mut entries = vec![dir(top)];
    entries.extend(dlls(
        top,
        "x64",
        &["d3d9", "d3d10", "d3d10_1", "d3d10core", "d3d11", "dxgi"],
    ));
    entries.extend(dlls(
        top,
        "x32",
        &["d3d8", "d3d9", "d3d10", "d3d10_1", "d3d10core", "d3d11", "dxgi"],
    ));
    entries.push(file(&format!("{top}/setup_dxvk.sh"), b"#!/bin/sh\n"));
    entries
}

/// A complete vkd3d-proton release wrapped in a `top` directory.
pub fn vkd3d_release_entries(top: &str) -> Vec<FixtureEntry> {
    let mut entries = vec![dir(top)];
    entries.extend(dlls(top, "x64", &["d3d12", "d3d12core"]));
    entries.extend(dlls(top, "x86", &["d3d12", "d3d12core"]));
    entries.push(file(&format!("{top}/setup_vkd3d_proton.sh"), b"#!/bin/sh\n"));
    entries
}

/// A flat DXVK development build, as produced by CI artifacts.
pub fn dxvk_dev_entries() -> Vec<FixtureEntry> {
    let mut entries = dlls("", "x64", &["d3d9", "d3d11", "dxgi"]);
    entries.extend(dlls("", "x32", &["d3d8", "d3d9", "d3d11", "dxgi"]));
    entries
}

/// Write `entries` to `dest` in the given format.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_archive(dest: &Path, format: ArchiveFormat, entries: &[FixtureEntry]) {
    let result = match format {
        ArchiveFormat::GzipTar => write_tar_gz(dest, entries),
        ArchiveFormat::Zip => write_zip(dest, entries),
        ArchiveFormat::ZstdTar => write_tar_zst(dest, entries),
    };
    result.expect("write fixture archive");
}

/// Write a gzip-compressed tarball.
///
/// # Errors
///
/// Returns any I/O error raised while writing.
pub fn write_tar_gz(dest: &Path, entries: &[FixtureEntry]) -> io::Result<()> {
    let encoder = flate2::write::GzEncoder::new(
        fs::File::create(dest)?,
        flate2::Compression::default(),
    );
    let encoder = write_tar(encoder, entries)?;
    encoder.finish()?;
    Ok(())
}

/// Write a zstd-compressed tarball.
///
/// # Errors
///
/// Returns any I/O error raised while writing.
pub fn write_tar_zst(dest: &Path, entries: &[FixtureEntry]) -> io::Result<()> {
    let encoder = zstd::Encoder::new(fs::File::create(dest)?, 0)?;
    let encoder = write_tar(encoder, entries)?;
    encoder.finish()?;
    Ok(())
}

/// Write a zip archive with stored (uncompressed) members.
///
/// # Errors
///
/// Returns any I/O or zip error raised while writing.
pub fn write_zip(dest: &Path, entries: &[FixtureEntry]) -> io::Result<()> {
    zip_writer(dest, entries)?.finish()?;
    Ok(())
}

/// Append a symlink member to a zip archive, after `entries`.
///
/// # Errors
///
/// Returns any I/O or zip error raised while writing.
pub fn write_zip_with_symlink(
    dest: &Path,
    entries: &[FixtureEntry],
    link: &str,
    target: &str,
) -> io::Result<()> {
    let mut writer = zip_writer(dest, entries)?;
    writer.add_symlink(link, target, zip_options())?;
    writer.finish()?;
    Ok(())
}

/// Append a symlink member to a gzip tarball, after `entries`.
///
/// # Errors
///
/// Returns any I/O error raised while writing.
pub fn write_tar_gz_with_symlink(
    dest: &Path,
    entries: &[FixtureEntry],
    link: &str,
    target: &str,
) -> io::Result<()> {
    let encoder = flate2::write::GzEncoder::new(
        fs::File::create(dest)?,
        flate2::Compression::default(),
    );
    let mut builder = tar::Builder::new(encoder);
    append_entries(&mut builder, entries)?;
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_size(0);
    header.set_mode(0o777);
    builder.append_link(&mut header, link, target)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

fn zip_options() -> zip::write::SimpleFileOptions {
    zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
}

fn zip_writer(dest: &Path, entries: &[FixtureEntry]) -> io::Result<zip::ZipWriter<fs::File>> {
    let options = zip_options();
    let mut writer = zip::ZipWriter::new(fs::File::create(dest)?);
    for entry in entries {
        match &entry.contents {
            None => writer.add_directory(entry.path.as_str(), options)?,
            Some(contents) => {
                writer.start_file(entry.path.as_str(), options)?;
                writer.write_all(contents)?;
            }
        }
    }
    Ok(writer)
}

fn write_tar<W: Write>(writer: W, entries: &[FixtureEntry]) -> io::Result<W> {
    let mut builder = tar::Builder::new(writer);
    append_entries(&mut builder, entries)?;
    builder.into_inner()
}

fn append_entries<W: Write>(
    builder: &mut tar::Builder<W>,
    entries: &[FixtureEntry],
) -> io::Result<()> {
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        match &entry.contents {
            None => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
                header.set_mode(0o755);
                builder.append_data(&mut header, format!("{}/", entry.path), io::empty())?;
            }
            Some(contents) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_size(contents.len() as u64);
                header.set_mode(0o644);
                builder.append_data(&mut header, &entry.path, contents.as_slice())?;
            }
        }
    }
    Ok(())
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}

/// List the member names of a `.wcp` container, without trailing slashes.
///
/// # Panics
///
/// Panics if the container cannot be read.
pub fn container_entries(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open container");
    let decoder = zstd::Decoder::new(file).expect("zstd decode");
    let mut archive = tar::Archive::new(decoder);
    archive
        .entries()
        .expect("entries")
        .map(|entry| {
            let entry = entry.expect("entry");
            entry
                .path()
                .expect("path")
                .to_string_lossy()
                .trim_end_matches('/')
                .to_owned()
        })
        .collect()
}

/// Read `profile.json` from a `.wcp` container as JSON.
///
/// # Panics
///
/// Panics if the container cannot be read or has no manifest.
pub fn container_profile(path: &Path) -> serde_json::Value {
    let file = fs::File::open(path).expect("open container");
    let decoder = zstd::Decoder::new(file).expect("zstd decode");
    let mut archive = tar::Archive::new(decoder);
    for entry in archive.entries().expect("entries") {
        let mut entry = entry.expect("entry");
        if entry.path().expect("path").as_os_str() == "profile.json" {
            return serde_json::from_reader(&mut entry).expect("parse profile.json");
        }
    }
    panic!("profile.json not found in {}", path.display());
}

/// Names of directory entries under `dir` that start with `prefix`.
///
/// # Panics
///
/// Panics if `dir` cannot be read.
pub fn entries_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    fs::read_dir(dir)
        .expect("read_dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect()
}
