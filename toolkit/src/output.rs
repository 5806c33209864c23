//! Output formatting for the converter CLI.
//!
//! User-facing progress and results go to an injected writer (stderr in the
//! binary, a buffer in tests). Diagnostics go through `log` instead.

use crate::batch::{BatchReport, RelocationWarning};
use crate::converter::ConverterRegistry;
use crate::pipeline::Conversion;
use std::io::Write;

/// Write one line, ignoring write failures.
///
/// # Example
///
/// ```
/// use wcp_toolkit::output::write_stderr_line;
///
/// let mut buffer = Vec::new();
/// write_stderr_line(&mut buffer, "Scanning folder: /tmp");
/// assert_eq!(buffer, b"Scanning folder: /tmp\n");
/// ```
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Format the result line for one successful conversion.
#[must_use]
pub fn conversion_summary(conversion: &Conversion) -> String {
    let count = conversion.profile.files.len();
    let plural = if count == 1 { "file" } else { "files" };
    format!(
        "Success! Created {} ({count} manifest {plural}, sha256 {})",
        conversion.output_path.display(),
        conversion.sha256
    )
}

/// Format the closing line of a batch run.
#[must_use]
pub fn batch_summary(report: &BatchReport, registry: &ConverterRegistry) -> String {
    if report.processed_count() == 0 {
        return no_compatible_files_message(registry);
    }
    let processed = report.processed_count();
    match report.failed_count() {
        0 => format!("Batch processing complete. Processed {processed} file(s)."),
        failed => format!(
            "Batch processing complete. Processed {processed} file(s), {failed} failed."
        ),
    }
}

/// Message shown when a folder holds nothing any converter accepts.
#[must_use]
pub fn no_compatible_files_message(registry: &ConverterRegistry) -> String {
    let extensions: Vec<&str> = registry
        .iter()
        .map(|converter| converter.spec().format.extension())
        .collect();
    format!(
        "No compatible files ({}) were found to process.",
        extensions.join(", ")
    )
}

/// Format a relocation warning for display.
#[must_use]
pub fn relocation_warning_line(warning: &RelocationWarning) -> String {
    format!("[WARN] {warning}")
}
