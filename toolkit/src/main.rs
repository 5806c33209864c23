//! WCP converter CLI entrypoint.
//!
//! This binary converts DXVK and vkd3d-proton release archives into `.wcp`
//! containers, either one at a time or for a whole folder. Progress and
//! results are written to stderr; diagnostics go through the log filter.

use camino::Utf8PathBuf;
use clap::Parser;
use std::io::{self, Write};
use thiserror::Error;
use wcp_toolkit::batch::{BatchError, organize, run_batch};
use wcp_toolkit::cli::{BatchArgs, Cli, Command, ConvertArgs, VersionArgs};
use wcp_toolkit::converter::ConverterRegistry;
use wcp_toolkit::error::ConversionError;
use wcp_toolkit::output::{
    batch_summary, conversion_summary, no_compatible_files_message, relocation_warning_line,
    write_stderr_line,
};
use wcp_toolkit::pipeline::ConvertRequest;
use wcp_toolkit::prompt::{DevVersionSource, FixedDevVersion, PromptDevVersion, PromptError};

/// Errors that end a CLI run with a non-zero exit code.
#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("could not obtain a development build version: {0}")]
    Prompt(#[from] PromptError),

    #[error("unsupported archive {path}. {hint}")]
    Unsupported { path: Utf8PathBuf, hint: String },

    #[error("{failed} archive(s) failed to convert")]
    BatchFailures { failed: usize },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_directive());
    let mut stderr = io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Install the fmt subscriber; `RUST_LOG` takes precedence over `-v`/`-q`.
fn init_logging(default_directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<(), RunError> {
    let registry = ConverterRegistry::standard();
    match &cli.command {
        Command::Convert(args) => run_convert(args, &registry, stderr),
        Command::Batch(args) => run_batch_command(args, &registry, stderr),
    }
}

/// Converts one archive, prompting for a version if it is a development build.
fn run_convert(
    args: &ConvertArgs,
    registry: &ConverterRegistry,
    stderr: &mut dyn Write,
) -> Result<(), RunError> {
    let archive = args.archive.as_std_path();
    let converter = registry
        .for_path(archive)
        .ok_or_else(|| RunError::Unsupported {
            path: args.archive.clone(),
            hint: no_compatible_files_message(registry),
        })?;

    let spec = converter.spec();
    let mut request = ConvertRequest::new(archive);
    // Prompting for a file that does not exist would be pointless; let the
    // converter report it instead.
    if spec.needs_version() && archive.is_file() {
        let version = version_source(&args.version).version_for(archive, spec.package_type)?;
        request = request.with_version(version);
    }

    let conversion = converter.convert(&request, &args.settings())?;
    write_stderr_line(stderr, conversion_summary(&conversion));
    Ok(())
}

/// Converts a folder, then organises it unless told not to.
fn run_batch_command(
    args: &BatchArgs,
    registry: &ConverterRegistry,
    stderr: &mut dyn Write,
) -> Result<(), RunError> {
    let folder = args.dir.as_std_path();
    let mut versions = version_source(&args.version);
    let report = run_batch(
        folder,
        registry,
        &args.settings(),
        versions.as_mut(),
        stderr,
    )?;
    write_stderr_line(stderr, batch_summary(&report, registry));

    if report.processed_count() > 0 && !args.no_organize {
        write_stderr_line(stderr, "Organizing files...");
        for warning in organize(folder, &report.converted_sources())? {
            write_stderr_line(stderr, relocation_warning_line(&warning));
        }
    }

    match report.failed_count() {
        0 => Ok(()),
        failed => Err(RunError::BatchFailures { failed }),
    }
}

/// Uses the version flags when given, otherwise asks on the terminal.
fn version_source(args: &VersionArgs) -> Box<dyn DevVersionSource> {
    match args.version() {
        Some(version) => Box::new(FixedDevVersion(version)),
        None => Box::new(PromptDevVersion::new(io::stdin().lock(), io::stderr())),
    }
}

fn exit_code_for_run_result(result: Result<(), RunError>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("[ERROR] {err}"));
            1
        }
    }
}
