//! WCP packaging library.
//!
//! This crate converts third-party graphics translation layer releases
//! (DXVK, DXVK development builds, and vkd3d-proton) into `.wcp` containers:
//! zstd-compressed tarballs holding architecture-mapped binary folders and a
//! `profile.json` manifest. It is used by the `wcp-toolkit` CLI binary and
//! can be consumed programmatically.
//!
//! # Modules
//!
//! - [`batch`] - Folder scanning, batch dispatch, and file organisation
//! - [`cli`] - Command-line argument definitions
//! - [`converter`] - Static converter registry
//! - [`error`] - Conversion error types
//! - [`format`] - Recognised upstream archive formats
//! - [`output`] - Progress and result formatting
//! - [`package`] - Extraction, normalisation, manifests, and packaging
//! - [`pipeline`] - Per-archive conversion orchestration
//! - [`prompt`] - Operator-supplied versions for development builds
//! - [`workspace`] - Per-conversion temporary workspaces

#![cfg_attr(not(any(test, feature = "test-support")), deny(clippy::expect_used))]

pub mod batch;
pub mod cli;
pub mod converter;
pub mod error;
pub mod format;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod prompt;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod workspace;
