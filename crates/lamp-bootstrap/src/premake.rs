//! Premake, the build configuration tool generating the Visual Studio solutions.
//!
//! Premake is not installed system wide; the batch scripts expect the binary
//! inside the repository, at `vendor/premake/bin/premake5.exe` by default.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use semver::Version;

use crate::{
    download::{Download, DownloadError},
    progress::ProgressBar,
    user_output,
};

/// Premake release used when none is configured.
pub const DEFAULT_VERSION: &str = "5.0.0-beta2";

/// Directory, relative to the project root, holding the binary.
pub const DEFAULT_DIRECTORY: &str = "vendor/premake/bin";

/// Name of the Premake binary.
pub const EXECUTABLE: &str = "premake5.exe";

/// License shipped next to the binary.
pub const LICENSE_URL: &str =
    "https://raw.githubusercontent.com/premake/premake-core/master/LICENSE.txt";

/// Parameters of the Premake check and installation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[cfg_attr(feature = "clap", derive(clap::Parser))]
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "this is intended")]
pub struct PremakeParams {
    /// Premake release to download if it is missing.
    #[cfg_attr(
        feature = "clap",
        clap(
            long = "premake-version",
            id = "premake_version",
            default_value = DEFAULT_VERSION
        )
    )]
    pub version: Version,

    /// Directory holding `premake5.exe`, relative to the project root.
    #[cfg_attr(
        feature = "clap",
        clap(long = "premake-dir", default_value = DEFAULT_DIRECTORY)
    )]
    pub directory: PathBuf,

    /// Assume "yes" to the "Download Premake" prompt.
    #[cfg_attr(feature = "clap", clap(long = "auto-install-premake", action))]
    pub auto_install: bool,
}

impl Default for PremakeParams {
    #[inline]
    #[expect(clippy::unwrap_used, reason = "the default version is a valid constant")]
    fn default() -> Self {
        Self {
            version: Version::parse(DEFAULT_VERSION).unwrap(),
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            auto_install: false,
        }
    }
}

impl PremakeParams {
    /// Directory holding the binary for the project at `root`.
    #[inline]
    #[must_use]
    pub fn install_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.directory)
    }

    /// Path of the binary for the project at `root`.
    #[inline]
    #[must_use]
    pub fn executable(&self, root: &Path) -> PathBuf {
        self.install_dir(root).join(EXECUTABLE)
    }

    /// Whether the binary is present for the project at `root`.
    #[inline]
    #[must_use]
    pub fn is_installed(&self, root: &Path) -> bool {
        self.executable(root).is_file()
    }

    /// URL of the Windows release archive.
    #[inline]
    #[must_use]
    pub fn archive_url(&self) -> String {
        let version = &self.version;
        format!(
            "https://github.com/premake/premake-core/releases/download/v{version}/premake-{version}-windows.zip"
        )
    }
}

/// Makes sure Premake is present for the project at `root`, returning the path
/// of its binary.
///
/// If the binary is missing, `on_install` is called first and may halt the
/// installation by returning an error. Then the release archive is downloaded
/// with a progress bar on `writer`, unpacked, and removed, and the license is
/// downloaded next to the binary.
///
/// # Errors
///
/// Returns an error if the installation was halted or any step of it fails.
#[inline]
pub fn ensure_premake<E, H, W>(
    params: &PremakeParams,
    root: &Path,
    on_install: H,
    mut writer: W,
) -> Result<PathBuf, E>
where
    E: From<PremakeError>,
    H: FnOnce(&Version) -> Result<(), E>,
    W: io::Write,
{
    let executable = params.executable(root);
    if params.is_installed(root) {
        log::debug!("premake found at {}", executable.display());
        return Ok(executable);
    }
    log::debug!("premake not found at {}", executable.display());
    on_install(&params.version)?;

    let install_dir = params.install_dir(root);
    fs::create_dir_all(&install_dir).map_err(|source| PremakeError::CreateDir {
        path: install_dir.clone(),
        source,
    })?;

    let archive = install_dir.join(format!("premake-{}-windows.zip", params.version));
    let url = params.archive_url();
    user_output!(&mut writer, "Downloading Premake {}...\n", params.version)
        .map_err(PremakeError::IoWrite)?;
    let mut bar = ProgressBar::new(&mut writer);
    Download::new(&url)
        .to_file(&archive, |progress| bar.draw(progress))
        .map_err(PremakeError::Download)?;
    bar.finish().map_err(PremakeError::IoWrite)?;

    user_output!(&mut writer, "Extracting {}\n", archive.display())
        .map_err(PremakeError::IoWrite)?;
    extract_archive(&archive, &install_dir)?;
    fs::remove_file(&archive).map_err(|source| PremakeError::RemoveArchive {
        path: archive.clone(),
        source,
    })?;

    let license = install_dir.join("LICENSE.txt");
    Download::new(LICENSE_URL)
        .to_file(&license, |_| Ok(()))
        .map_err(PremakeError::Download)?;

    if !executable.is_file() {
        return Err(PremakeError::MissingExecutable { path: executable }.into());
    }
    user_output!(
        &mut writer,
        "Premake {} has been downloaded to {}\n",
        params.version,
        install_dir.display()
    )
    .map_err(PremakeError::IoWrite)?;
    Ok(executable)
}

/// Unpacks every entry of the zip `archive` into `dest`.
///
/// # Errors
///
/// Returns an error if the archive can't be read or an entry can't be written.
#[inline]
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<(), PremakeError> {
    let extract_err = |source| PremakeError::Extract {
        path: archive.to_path_buf(),
        source,
    };
    let file = fs::File::open(archive)
        .map_err(|source| extract_err(zip::result::ZipError::Io(source)))?;
    let mut zip = zip::ZipArchive::new(file).map_err(extract_err)?;
    log::debug!("extracting {} entries into {}", zip.len(), dest.display());
    zip.extract(dest).map_err(extract_err)
}

/// An error indicating that Premake could not be installed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "this is intended")]
pub enum PremakeError {
    /// Failed to write user output.
    #[error("failed to write user output: {0}")]
    IoWrite(#[source] io::Error),
    /// Failed to create the directory of the binary.
    #[error("failed to create {path}: {source}")]
    CreateDir {
        /// Directory we tried to create.
        path: PathBuf,
        /// Source of the error.
        source: io::Error,
    },
    /// Failed to download the archive or the license.
    #[error(transparent)]
    Download(DownloadError),
    /// Failed to unpack the archive.
    #[error("failed to extract {path}: {source}")]
    Extract {
        /// Path of the archive.
        path: PathBuf,
        /// Source of the error.
        source: zip::result::ZipError,
    },
    /// Failed to remove the archive after extraction.
    #[error("failed to remove {path}: {source}")]
    RemoveArchive {
        /// Path of the archive.
        path: PathBuf,
        /// Source of the error.
        source: io::Error,
    },
    /// The archive did not contain the binary.
    #[error("{path} is missing after extracting Premake")]
    MissingExecutable {
        /// Expected path of the binary.
        path: PathBuf,
    },
}

#[cfg(test)]
mod test {
    use std::io::Write as _;

    use super::*;

    #[test_log::test]
    fn default_archive_url() {
        assert_eq!(
            PremakeParams::default().archive_url(),
            "https://github.com/premake/premake-core/releases/download/v5.0.0-beta2/premake-5.0.0-beta2-windows.zip"
        );
    }

    #[test_log::test]
    fn installed_when_binary_exists() {
        let root = tempfile::tempdir().unwrap();
        let params = PremakeParams::default();
        assert!(!params.is_installed(root.path()));

        fs::create_dir_all(params.install_dir(root.path())).unwrap();
        fs::write(params.executable(root.path()), b"MZ").unwrap();
        assert!(params.is_installed(root.path()));
        assert_eq!(
            params.executable(root.path()),
            root.path().join("vendor/premake/bin/premake5.exe")
        );
    }

    #[test_log::test]
    fn present_binary_is_not_reinstalled() {
        let root = tempfile::tempdir().unwrap();
        let params = PremakeParams::default();
        fs::create_dir_all(params.install_dir(root.path())).unwrap();
        fs::write(params.executable(root.path()), b"MZ").unwrap();

        let path = ensure_premake::<PremakeError, _, _>(
            &params,
            root.path(),
            |_| panic!("must not ask to install"),
            io::sink(),
        )
        .unwrap();
        assert_eq!(path, params.executable(root.path()));
    }

    #[derive(Debug, thiserror::Error)]
    enum Halted {
        #[error("declined")]
        Declined,
        #[error(transparent)]
        Premake(#[from] PremakeError),
    }

    #[test_log::test]
    fn declined_install_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let params = PremakeParams::default();
        let mut asked = None;

        let err = ensure_premake(
            &params,
            root.path(),
            |version: &Version| {
                asked = Some(version.clone());
                Err(Halted::Declined)
            },
            io::sink(),
        )
        .unwrap_err();

        assert!(matches!(err, Halted::Declined));
        assert_eq!(asked, Some(params.version.clone()));
        assert!(!params.install_dir(root.path()).exists());
    }

    #[test_log::test]
    fn extracts_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("premake.zip");
        {
            let mut zip = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
            zip.start_file(EXECUTABLE, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"MZ premake").unwrap();
            zip.finish().unwrap();
        }

        let dest = dir.path().join("bin");
        extract_archive(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join(EXECUTABLE)).unwrap(), b"MZ premake");
    }

    #[test_log::test]
    fn corrupt_zip_is_extract_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("premake.zip");
        fs::write(&archive, b"not a zip").unwrap();

        let err = extract_archive(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, PremakeError::Extract { .. }));
    }
}
