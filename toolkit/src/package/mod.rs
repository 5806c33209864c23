//! Release normalisation, manifest emission, and container packaging.
//!
//! Each stage of a conversion lives in its own sub-module so converters can
//! compose them:
//!
//! - [`extraction`] - Source archive extraction with path traversal protection.
//! - [`normalization`] - Architecture folder renames (`x64` to `system32` etc.).
//! - [`registry`] - Canonical folders, package types, and binary registries.
//! - [`version`] - Version inference from release file names.
//! - [`manifest`] - `profile.json` schema and emission.
//! - [`naming`] - Output container naming.
//! - [`packaging`] - Zstd-compressed tar container creation.
//! - [`packaging_error`] - Error types for packaging operations.

pub mod extraction;
pub mod manifest;
pub mod naming;
pub mod normalization;
pub mod packaging;
pub mod packaging_error;
pub mod registry;
pub mod version;
