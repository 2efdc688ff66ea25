//! Installation of the Vulkan SDK.
//!
//! Put together from the other modules:
//! * [probe](crate::probe) `VULKAN_SDK`,
//! * [download](crate::download) the official installer into the working directory,
//! * [run it](crate::installer) until the operator confirms, then delete it.

use core::fmt;
use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{
    download::{Download, DownloadError},
    installer::{install_until_confirmed, Confirm, InstallLoopError, Installer},
    probe::SdkStatus,
    progress::ProgressBar,
    user_output,
};

/// Latest Windows installer published by LunarG.
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://sdk.lunarg.com/sdk/download/latest/windows/vulkan-sdk.exe";

/// Version the engine is built against.
pub const DEFAULT_VERSION_PREFIX: &str = "1.3.";

/// File name the installer is saved under.
pub const DEFAULT_INSTALLER_NAME: &str = "VulkanSDK.exe";

/// Parameters of the Vulkan SDK check and installation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[cfg_attr(feature = "clap", derive(clap::Parser))]
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "this is intended")]
pub struct VulkanParams {
    /// URL of the Vulkan SDK installer.
    #[cfg_attr(
        feature = "clap",
        clap(long = "vulkan-url", default_value = DEFAULT_DOWNLOAD_URL)
    )]
    pub download_url: String,

    /// Version which must appear in `VULKAN_SDK`, e.g. "1.3.".
    #[cfg_attr(
        feature = "clap",
        clap(long = "vulkan-version", default_value = DEFAULT_VERSION_PREFIX)
    )]
    pub version_prefix: String,

    /// File name of the downloaded installer in the working directory.
    #[cfg_attr(
        feature = "clap",
        clap(long = "vulkan-installer", default_value = DEFAULT_INSTALLER_NAME)
    )]
    pub installer_name: String,
}

impl Default for VulkanParams {
    #[inline]
    fn default() -> Self {
        Self {
            download_url: DEFAULT_DOWNLOAD_URL.to_owned(),
            version_prefix: DEFAULT_VERSION_PREFIX.to_owned(),
            installer_name: DEFAULT_INSTALLER_NAME.to_owned(),
        }
    }
}

impl VulkanParams {
    /// Where the installer is downloaded to.
    #[inline]
    #[must_use]
    pub fn artifact_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.installer_name)
    }
}

/// Question asked after every run of the installer.
pub const CONFIRM_QUESTION: &str = "Was the Vulkan SDK installed properly? [Y/N]:";

/// [`CONFIRM_QUESTION`] with the answers rendered by the caller, e.g. in color.
#[inline]
#[must_use]
pub fn confirm_question<Y: fmt::Display, N: fmt::Display>(yes: Y, no: N) -> String {
    format!("Was the Vulkan SDK installed properly? [{yes}/{no}]:")
}

/// Result of [`ensure_vulkan_sdk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum VulkanOutcome {
    /// A matching SDK was found, nothing was done.
    AlreadyInstalled,
    /// The installer was run and confirmed.
    Installed {
        /// How many times the installer was run.
        launches: usize,
    },
}

/// Installs the Vulkan SDK if `status` says so.
///
/// # Errors
///
/// See [`install_vulkan_sdk`].
#[inline]
pub fn ensure_vulkan_sdk<W, I, C>(
    params: &VulkanParams,
    status: &SdkStatus,
    work_dir: &Path,
    writer: W,
    installer: &mut I,
    confirm: &mut C,
) -> Result<VulkanOutcome, VulkanError>
where
    W: io::Write,
    I: Installer,
    C: Confirm,
{
    if !status.needs_install() {
        log::debug!("Vulkan SDK is installed: {status:?}");
        return Ok(VulkanOutcome::AlreadyInstalled);
    }
    let launches = install_vulkan_sdk(params, work_dir, writer, installer, confirm)?;
    Ok(VulkanOutcome::Installed { launches })
}

/// Downloads the installer into `work_dir` while drawing a progress bar on
/// `writer`, then runs it until `confirm` answers yes. Returns how many times
/// the installer was run.
///
/// # Errors
///
/// Returns an error if the download fails, the installer can't be run,
/// the operator can't be asked or `writer` fails.
#[inline]
pub fn install_vulkan_sdk<W, I, C>(
    params: &VulkanParams,
    work_dir: &Path,
    mut writer: W,
    installer: &mut I,
    confirm: &mut C,
) -> Result<usize, VulkanError>
where
    W: io::Write,
    I: Installer,
    C: Confirm,
{
    let artifact = params.artifact_path(work_dir);

    user_output!(&mut writer, "Downloading Vulkan SDK installer...\n")
        .map_err(VulkanError::IoWrite)?;
    let mut bar = ProgressBar::new(&mut writer);
    Download::new(&params.download_url).to_file(&artifact, |progress| bar.draw(progress))?;
    bar.finish().map_err(VulkanError::IoWrite)?;

    user_output!(&mut writer, "Download finished! Running installer!\n")
        .map_err(VulkanError::IoWrite)?;
    let launches = install_until_confirmed(&artifact, installer, confirm)?;
    log::info!("Vulkan SDK installer ran {launches} time(s)");
    Ok(launches)
}

/// An error indicating that the Vulkan SDK could not be installed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VulkanError {
    /// Failed to write user output.
    #[error("failed to write user output: {0}")]
    IoWrite(#[source] io::Error),
    /// Failed to download the installer.
    #[error(transparent)]
    Download(#[from] DownloadError),
    /// Failed to run the installer.
    #[error(transparent)]
    Install(#[from] InstallLoopError),
}

#[cfg(test)]
mod test {
    use crate::{
        command::CommandExecError,
        probe::probe_value,
        prompt::{Confirmation, PromptError},
        test::{answers, InstantInstaller, OneShotServer},
    };

    use super::*;

    /// Installer that must never be started.
    struct Unreachable;

    impl Installer for Unreachable {
        type Running = ();

        fn launch(&mut self, artifact: &Path) -> Result<(), CommandExecError> {
            panic!("{} must not be launched", artifact.display());
        }

        fn wait(&mut self, (): ()) -> io::Result<Option<i32>> {
            panic!("nothing to wait on");
        }
    }

    fn never_asked() -> Result<Confirmation, PromptError> {
        panic!("operator must not be asked");
    }

    #[test_log::test]
    fn matching_sdk_skips_installation() {
        let dir = tempfile::tempdir().unwrap();
        let status = SdkStatus::Installed {
            found: "C:\\VulkanSDK\\1.3.250.1".to_owned(),
        };
        let mut output = Vec::new();
        let outcome = ensure_vulkan_sdk(
            &VulkanParams::default(),
            &status,
            dir.path(),
            &mut output,
            &mut Unreachable,
            &mut never_asked,
        )
        .unwrap();

        assert_eq!(outcome, VulkanOutcome::AlreadyInstalled);
        assert!(output.is_empty());
        assert!(!VulkanParams::default().artifact_path(dir.path()).exists());
    }

    #[test_log::test]
    fn failed_download_never_launches() {
        let dir = tempfile::tempdir().unwrap();
        let params = VulkanParams {
            download_url: "http://127.0.0.1:9/vulkan-sdk.exe".to_owned(),
            ..VulkanParams::default()
        };
        let mut output = Vec::new();
        let err = ensure_vulkan_sdk(
            &params,
            &SdkStatus::NotInstalled,
            dir.path(),
            &mut output,
            &mut Unreachable,
            &mut never_asked,
        )
        .unwrap_err();

        assert!(matches!(err, VulkanError::Download(_)), "{err}");
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "Downloading Vulkan SDK installer...\n");
    }

    #[test_log::test]
    fn artifact_lands_in_work_dir() {
        let params = VulkanParams::default();
        assert_eq!(
            params.artifact_path(Path::new("C:/Lamp")),
            Path::new("C:/Lamp/VulkanSDK.exe")
        );
    }

    fn served_params(body: &[u8]) -> (OneShotServer, VulkanParams) {
        let server = OneShotServer::complete("/vulkan-sdk.exe", body.to_vec());
        let params = VulkanParams {
            download_url: server.url.clone(),
            ..VulkanParams::default()
        };
        (server, params)
    }

    #[test_log::test]
    fn missing_sdk_is_downloaded_and_installed_until_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        let (server, params) = served_params(b"MZ vulkan installer");
        let mut installer = InstantInstaller::default();
        let mut output = Vec::new();

        let outcome = ensure_vulkan_sdk(
            &params,
            &probe_value(None, &params.version_prefix),
            dir.path(),
            &mut output,
            &mut installer,
            &mut answers(&["n", "Y"]),
        )
        .unwrap();
        server.request();

        let artifact = params.artifact_path(dir.path());
        assert_eq!(outcome, VulkanOutcome::Installed { launches: 2 });
        assert_eq!(installer.launched, [artifact.clone(), artifact.clone()]);
        assert_eq!(installer.waited, 2);
        assert!(!artifact.exists());

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Downloading Vulkan SDK installer...\n"), "{output}");
        assert!(output.contains("100.0% / 100%"), "{output}");
        assert!(output.ends_with("Download finished! Running installer!\n"), "{output}");
    }

    #[test_log::test]
    fn older_sdk_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let (server, params) = served_params(b"MZ");
        let status = probe_value(Some("C:\\VulkanSDK\\1.2.100.0"), &params.version_prefix);
        let mut installer = InstantInstaller::default();

        let outcome = ensure_vulkan_sdk(
            &params,
            &status,
            dir.path(),
            io::sink(),
            &mut installer,
            &mut answers(&["y"]),
        )
        .unwrap();
        server.request();

        assert_eq!(outcome, VulkanOutcome::Installed { launches: 1 });
        assert!(!params.artifact_path(dir.path()).exists());
    }

    #[test_log::test]
    fn expected_sdk_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let params = VulkanParams::default();
        let status = probe_value(Some("C:\\VulkanSDK\\1.3.250.1"), &params.version_prefix);

        let outcome = ensure_vulkan_sdk(
            &params,
            &status,
            dir.path(),
            io::sink(),
            &mut Unreachable,
            &mut never_asked,
        )
        .unwrap();
        assert_eq!(outcome, VulkanOutcome::AlreadyInstalled);
    }

    #[test_log::test]
    fn question_with_plain_answers() {
        assert_eq!(confirm_question("Y", "N"), CONFIRM_QUESTION);
    }
}
