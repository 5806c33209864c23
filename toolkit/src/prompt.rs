//! Operator-supplied versions for development builds.
//!
//! Development build archives carry no dependable version in their names,
//! so the batch layer asks a [`DevVersionSource`] for one. The CLI uses
//! [`FixedDevVersion`] when the version is passed as flags and
//! [`PromptDevVersion`] to ask interactively otherwise.

use crate::package::registry::PackageType;
use crate::package::version::PackageVersion;
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;

/// Errors raised while obtaining a development version.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Reading the answer or writing the prompt failed.
    #[error("prompt I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input ended before a complete answer was given.
    #[error("input ended before a version was entered")]
    EndOfInput,

    /// The version name was left blank.
    #[error("version name must not be empty")]
    EmptyName,
}

/// Supplies the version of a development build.
#[cfg_attr(test, mockall::automock)]
pub trait DevVersionSource {
    /// Return the version to record for `archive`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when no version can be obtained.
    fn version_for(
        &mut self,
        archive: &Path,
        package_type: PackageType,
    ) -> Result<PackageVersion, PromptError>;
}

/// Hands out the same version for every archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDevVersion(pub PackageVersion);

impl DevVersionSource for FixedDevVersion {
    fn version_for(
        &mut self,
        _archive: &Path,
        _package_type: PackageType,
    ) -> Result<PackageVersion, PromptError> {
        Ok(self.0.clone())
    }
}

/// Asks the operator on `output` and reads answers from `input`.
///
/// The version code is asked for again until it parses as a whole number.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use wcp_toolkit::package::registry::PackageType;
/// use wcp_toolkit::prompt::{DevVersionSource, PromptDevVersion};
///
/// let input = b"2.3-f1a3b4c\nsoon\n20231026\n";
/// let mut prompt = PromptDevVersion::new(&input[..], Vec::new());
/// let version = prompt
///     .version_for(Path::new("dxvk-master.zip"), PackageType::Dxvk)
///     .expect("version");
/// assert_eq!(version.name, "2.3-f1a3b4c");
/// assert_eq!(version.code, 20231026);
/// ```
#[derive(Debug)]
pub struct PromptDevVersion<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptDevVersion<R, W> {
    /// Create a prompt over the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Return the output stream, e.g. to inspect what was asked.
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput);
        }
        Ok(line.trim().to_owned())
    }
}

impl<R: BufRead, W: Write> DevVersionSource for PromptDevVersion<R, W> {
    fn version_for(
        &mut self,
        archive: &Path,
        package_type: PackageType,
    ) -> Result<PackageVersion, PromptError> {
        let shown = archive.file_name().map_or(archive, Path::new);
        writeln!(self.output, "Processing development build: {}", shown.display())?;

        let name = self.ask(&format!(
            "Enter {package_type} version name (e.g. 2.3-f1a3b4c): "
        ))?;
        if name.is_empty() {
            return Err(PromptError::EmptyName);
        }

        loop {
            let answer = self.ask("Enter a numeric version code (e.g. 20231026): ")?;
            match answer.parse::<u64>() {
                Ok(code) => return Ok(PackageVersion::new(name, code)),
                Err(_) => writeln!(self.output, "Please enter a valid number.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ask(input: &str) -> (Result<PackageVersion, PromptError>, String) {
        let mut prompt = PromptDevVersion::new(input.as_bytes(), Vec::new());
        let result = prompt.version_for(Path::new("/tmp/dxvk-master.zip"), PackageType::Dxvk);
        let output = String::from_utf8(prompt.into_output()).expect("utf-8 output");
        (result, output)
    }

    #[test]
    fn reads_name_and_code() {
        let (result, output) = ask("2.3-sarek-f1a3b4c\n20231026\n");

        let version = result.expect("version");
        assert_eq!(version, PackageVersion::new("2.3-sarek-f1a3b4c", 20_231_026));
        assert!(output.contains("dxvk-master.zip"));
        assert!(output.contains("DXVK version name"));
    }

    #[test]
    fn reprompts_until_code_is_numeric() {
        let (result, output) = ask("2.3\nabc\n-4\n 42 \n");

        assert_eq!(result.expect("version").code, 42);
        assert_eq!(output.matches("Please enter a valid number.").count(), 2);
        assert_eq!(output.matches("numeric version code").count(), 3);
    }

    #[rstest]
    #[case::no_name("")]
    #[case::no_code("2.3\n")]
    #[case::only_bad_codes("2.3\nx\ny\n")]
    fn end_of_input_is_reported(#[case] input: &str) {
        let (result, _) = ask(input);
        assert!(matches!(result, Err(PromptError::EndOfInput)));
    }

    #[test]
    fn blank_name_is_rejected() {
        let (result, _) = ask("   \n1\n");
        assert!(matches!(result, Err(PromptError::EmptyName)));
    }

    #[test]
    fn fixed_version_ignores_archive() {
        let mut source = FixedDevVersion(PackageVersion::new("2.4-dev", 7));
        let first = source
            .version_for(Path::new("a.zip"), PackageType::Dxvk)
            .expect("version");
        let second = source
            .version_for(Path::new("b.zip"), PackageType::Dxvk)
            .expect("version");
        assert_eq!(first, second);
        assert_eq!(first.code, 7);
    }
}
