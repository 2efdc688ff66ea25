//! Generation of Visual Studio project files.
//!
//! The actual work is done by `Win-GenProjects-vs2019.bat` and
//! `Win-GenProjects-vs2022.bat`, which call Premake with the matching action.

use core::fmt;
use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use crate::{
    command::{run_command, CommandExecError},
    prompt::Choice,
};

/// Question asked when no version was given.
pub const VERSION_QUESTION: &str = "Please enter Visual Studio version [2019/2022]:";

/// Supported Visual Studio releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[non_exhaustive]
pub enum VsVersion {
    /// Visual Studio 2019.
    #[serde(rename = "2019")]
    #[cfg_attr(feature = "clap", value(name = "2019"))]
    Vs2019,
    /// Visual Studio 2022.
    #[serde(rename = "2022")]
    #[cfg_attr(feature = "clap", value(name = "2022"))]
    Vs2022,
}

impl VsVersion {
    /// Year of the release, as typed by the user.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vs2019 => "2019",
            Self::Vs2022 => "2022",
        }
    }

    /// File name of the batch script generating projects for this release.
    #[inline]
    #[must_use]
    pub const fn script_name(self) -> &'static str {
        match self {
            Self::Vs2019 => "Win-GenProjects-vs2019.bat",
            Self::Vs2022 => "Win-GenProjects-vs2022.bat",
        }
    }
}

impl fmt::Display for VsVersion {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Choice for VsVersion {
    const TOKENS: &'static [&'static str] = &["2019", "2022"];

    #[inline]
    fn parse(line: &str) -> Option<Self> {
        match line {
            "2019" => Some(Self::Vs2019),
            "2022" => Some(Self::Vs2022),
            _ => None,
        }
    }
}

/// Path of the script for `version` inside `scripts_dir`.
#[inline]
#[must_use]
pub fn script_path(scripts_dir: &Path, version: VsVersion) -> PathBuf {
    scripts_dir.join(version.script_name())
}

/// Command running the script for `version`, from within `scripts_dir`.
#[inline]
#[must_use]
pub fn generator_command(scripts_dir: &Path, version: VsVersion) -> Command {
    let mut command = Command::new(script_path(scripts_dir, version));
    command.current_dir(scripts_dir);
    command
}

/// Runs the project generator for `version` and waits for it.
///
/// The exit status is returned for reporting only; whatever the script does
/// is up to the script.
///
/// # Errors
///
/// Returns an error if the script can't be started, e.g. because it is missing.
#[inline]
pub fn generate_projects(
    scripts_dir: &Path,
    version: VsVersion,
) -> Result<ExitStatus, CommandExecError> {
    log::info!("generating projects for Visual Studio {version}");
    let status = run_command(generator_command(scripts_dir, version))?;
    log::debug!("{} exited with {status}", version.script_name());
    Ok(status)
}

#[cfg(test)]
mod test {
    use std::io::{self, Cursor};

    use crate::prompt::{ask, PromptError, RetryPolicy};

    use super::*;

    #[test_log::test]
    fn only_exact_years_are_accepted() {
        assert_eq!(VsVersion::parse("2019"), Some(VsVersion::Vs2019));
        assert_eq!(VsVersion::parse("2022"), Some(VsVersion::Vs2022));
        for rejected in ["", "2017", "vs2022", " 2022", "2022 ", "2O22", "19", "2019/2022"] {
            assert_eq!(VsVersion::parse(rejected), None, "{rejected:?}");
        }
    }

    #[test_log::test]
    fn prompt_repeats_until_valid_year() {
        let mut output = Vec::new();
        let version = ask::<VsVersion, _, _>(
            VERSION_QUESTION,
            Cursor::new("2017\nvs2022\n2022\n"),
            &mut output,
            RetryPolicy::Unbounded,
        )
        .unwrap();

        assert_eq!(version, VsVersion::Vs2022);
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, VERSION_QUESTION.repeat(3));
    }

    #[test_log::test]
    fn prompt_rejects_garbled_line() {
        let version = ask::<VsVersion, _, _>(
            VERSION_QUESTION,
            Cursor::new(b"\xff\xfe20\n2022\n".as_slice()),
            io::sink(),
            RetryPolicy::Unbounded,
        )
        .unwrap();
        assert_eq!(version, VsVersion::Vs2022);
    }

    #[test_log::test]
    fn prompt_without_valid_year_fails_when_input_ends() {
        let err = ask::<VsVersion, _, _>(
            VERSION_QUESTION,
            Cursor::new("2017\n"),
            io::sink(),
            RetryPolicy::Unbounded,
        )
        .unwrap_err();
        assert!(matches!(err, PromptError::Closed));
    }

    #[test_log::test]
    fn scripts_per_version() {
        let dir = Path::new("C:/Lamp");
        assert_eq!(
            script_path(dir, VsVersion::Vs2019),
            Path::new("C:/Lamp/Win-GenProjects-vs2019.bat")
        );
        let command = generator_command(dir, VsVersion::Vs2022);
        assert_eq!(
            command.get_program(),
            Path::new("C:/Lamp/Win-GenProjects-vs2022.bat").as_os_str()
        );
        assert_eq!(command.get_current_dir(), Some(dir));
    }

    #[test_log::test]
    fn missing_script_fails_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_projects(dir.path(), VsVersion::Vs2019).unwrap_err();
        assert!(matches!(err, CommandExecError::Io { .. }));
    }
}
