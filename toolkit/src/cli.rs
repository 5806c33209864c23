//! CLI argument definitions for the WCP converter.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::package::packaging::{DEFAULT_COMPRESSION_LEVEL, PackagingOptions, default_threads};
use crate::package::version::PackageVersion;
use crate::pipeline::ConvertSettings;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Convert DXVK and vkd3d-proton releases into `.wcp` containers.
#[derive(Parser, Debug)]
#[command(name = "wcp-toolkit")]
#[command(version, about)]
#[command(long_about = concat!(
    "Convert DXVK and vkd3d-proton releases into .wcp containers.\n\n",
    "Each archive is extracted into a temporary workspace, its architecture ",
    "folders are renamed to system32 and syswow64, a profile.json manifest is ",
    "generated, and the result is packed into a zstd-compressed tarball.\n\n",
    "Official releases take their version from the file name. DXVK ",
    "development builds need a version name and code, either as flags or ",
    "entered when prompted.",
))]
#[command(after_help = concat!(
    "SUPPORTED ARCHIVES:\n",
    "  .tar.gz     DXVK release (incl. sarek, gplasync and async forks)\n",
    "  .zip        DXVK development build\n",
    "  .tar.zst    vkd3d-proton release\n\n",
    "EXAMPLES:\n",
    "  Convert one release:\n",
    "    $ wcp-toolkit convert dxvk-2.3.1.tar.gz\n\n",
    "  Convert a development build non-interactively:\n",
    "    $ wcp-toolkit convert dxvk-master.zip --version-name 2.3-f1a3b4c --version-code 20231026\n\n",
    "  Convert and organise a whole folder:\n",
    "    $ wcp-toolkit batch ~/Downloads/releases\n\n",
    "Set RUST_LOG to override the log filter.",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a single archive.
    Convert(ConvertArgs),

    /// Convert every supported archive in a folder.
    Batch(BatchArgs),
}

/// Compression settings shared by both subcommands.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CompressionArgs {
    /// Zstd compression level.
    #[arg(
        long,
        value_name = "LEVEL",
        default_value_t = DEFAULT_COMPRESSION_LEVEL,
        value_parser = clap::value_parser!(i32).range(1..=22)
    )]
    pub level: i32,

    /// Zstd worker threads [default: available parallelism].
    #[arg(long, value_name = "N")]
    pub threads: Option<u32>,
}

/// Explicit version for development builds.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionArgs {
    /// Version name for development builds, e.g. 2.3-f1a3b4c.
    #[arg(long, value_name = "NAME", requires = "version_code")]
    pub version_name: Option<String>,

    /// Numeric version code for development builds, e.g. 20231026.
    #[arg(long, value_name = "CODE", requires = "version_name")]
    pub version_code: Option<u64>,
}

/// Arguments for the convert command.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Archive to convert.
    #[arg(value_name = "ARCHIVE")]
    pub archive: Utf8PathBuf,

    /// Directory for the container [default: the archive's directory].
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Directory for temporary workspaces [default: the archive's directory].
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,

    /// Compression settings.
    #[command(flatten)]
    pub compression: CompressionArgs,

    /// Development build version.
    #[command(flatten)]
    pub version: VersionArgs,
}

/// Arguments for the batch command.
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Folder holding the archives.
    #[arg(value_name = "DIR")]
    pub dir: Utf8PathBuf,

    /// Directory for temporary workspaces [default: the folder itself].
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,

    /// Compression settings.
    #[command(flatten)]
    pub compression: CompressionArgs,

    /// Version applied to every development build instead of prompting.
    #[command(flatten)]
    pub version: VersionArgs,

    /// Leave sources and containers in place instead of moving them into
    /// `_source_archives` and `_wcp_output`.
    #[arg(long)]
    pub no_organize: bool,
}

impl Cli {
    /// Return the log filter directive implied by `-v` and `-q`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use wcp_toolkit::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["wcp-toolkit", "-v", "batch", "."]);
    /// assert_eq!(cli.log_directive(), "debug");
    /// ```
    #[must_use]
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

impl CompressionArgs {
    /// Convert into packaging options, filling in the default thread count.
    #[must_use]
    pub fn packaging_options(&self) -> PackagingOptions {
        PackagingOptions {
            level: self.level,
            threads: self.threads.unwrap_or_else(default_threads),
        }
    }
}

impl VersionArgs {
    /// Return the version when both flags were given.
    #[must_use]
    pub fn version(&self) -> Option<PackageVersion> {
        match (&self.version_name, self.version_code) {
            (Some(name), Some(code)) => Some(PackageVersion::new(name.clone(), code)),
            _ => None,
        }
    }
}

impl ConvertArgs {
    /// Build conversion settings from the arguments.
    #[must_use]
    pub fn settings(&self) -> ConvertSettings {
        ConvertSettings {
            output_dir: self.output_dir.clone().map(Into::into),
            work_root: self.work_dir.clone().map(Into::into),
            packaging: self.compression.packaging_options(),
        }
    }
}

impl BatchArgs {
    /// Build conversion settings; containers are written into the folder.
    #[must_use]
    pub fn settings(&self) -> ConvertSettings {
        ConvertSettings {
            output_dir: None,
            work_root: self.work_dir.clone().map(Into::into),
            packaging: self.compression.packaging_options(),
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
