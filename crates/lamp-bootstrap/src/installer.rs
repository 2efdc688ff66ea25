//! Runs a downloaded installer until the operator confirms it worked.
//!
//! There is no reliable way to tell from the outside whether an interactive
//! installer succeeded; it may have been cancelled or it may have failed
//! halfway. So after every run the operator is asked, and the installer is
//! started again until they answer "yes":
//!
//! ```text
//! Launching ──started──▶ Waiting ──exited──▶ AwaitingConfirmation ──"y"──▶ Done
//!     ▲                                              │
//!     └────────────────────anything else─────────────┘
//! ```
//!
//! The loop has no timeout. An installer that never exits or an operator that
//! never answers keeps it waiting until the tool is killed.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus},
};

use crate::{
    command::CommandExecError,
    prompt::{Confirmation, PromptError},
};

/// OS error returned when an executable requires elevation (`ERROR_ELEVATION_REQUIRED`).
const ERROR_ELEVATION_REQUIRED: i32 = 740;

/// Current state of [`install_until_confirmed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InstallState {
    /// Starting the installer.
    Launching,
    /// Waiting for the installer process to exit.
    Waiting,
    /// Asking the operator whether the installation worked.
    AwaitingConfirmation,
    /// The operator confirmed, the artifact gets deleted.
    Done,
}

impl InstallState {
    /// State following this one, given the answer when awaiting confirmation.
    #[inline]
    #[must_use]
    pub const fn next(self, answer: Option<Confirmation>) -> Self {
        match (self, answer) {
            (Self::Launching, _) => Self::Waiting,
            (Self::Waiting, _) => Self::AwaitingConfirmation,
            (Self::AwaitingConfirmation, Some(Confirmation::Yes)) | (Self::Done, _) => Self::Done,
            (Self::AwaitingConfirmation, _) => Self::Launching,
        }
    }
}

/// Something able to run an installer to completion.
pub trait Installer {
    /// Handle of a running installer.
    type Running;

    /// Starts the installer at `artifact`.
    ///
    /// # Errors
    ///
    /// Returns an error if the installer could not be started.
    fn launch(&mut self, artifact: &Path) -> Result<Self::Running, CommandExecError>;

    /// Blocks until the installer exits, returning its exit code if it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting on the process fails.
    fn wait(&mut self, running: Self::Running) -> io::Result<Option<i32>>;
}

/// Asks the operator whether the installation worked.
pub trait Confirm {
    /// Returns the operator's answer.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer could be obtained.
    fn confirm(&mut self) -> Result<Confirmation, PromptError>;
}

impl<F> Confirm for F
where
    F: FnMut() -> Result<Confirmation, PromptError>,
{
    #[inline]
    fn confirm(&mut self) -> Result<Confirmation, PromptError> {
        self()
    }
}

/// Runs installers as child processes and waits on their process handle.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct ChildInstaller;

impl Installer for ChildInstaller {
    type Running = Child;

    #[inline]
    fn launch(&mut self, artifact: &Path) -> Result<Child, CommandExecError> {
        let mut command = Command::new(artifact);
        log::debug!("launching `{command:?}`");
        match command.spawn() {
            Ok(child) => Ok(child),
            Err(source)
                if cfg!(windows) && source.raw_os_error() == Some(ERROR_ELEVATION_REQUIRED) =>
            {
                log::info!(
                    "{} requires elevation, starting it through the shell",
                    artifact.display()
                );
                // `start` goes through ShellExecute, which shows the UAC prompt,
                // and `/wait` keeps `cmd` alive until the installer exits.
                let mut elevated = Command::new("cmd");
                elevated
                    .args(["/C", "start", "", "/wait"])
                    .arg(artifact);
                match elevated.spawn() {
                    Ok(child) => Ok(child),
                    Err(err) => Err(CommandExecError::io(elevated, err)),
                }
            }
            Err(source) => Err(CommandExecError::io(command, source)),
        }
    }

    #[inline]
    fn wait(&mut self, mut running: Child) -> io::Result<Option<i32>> {
        let status: ExitStatus = running.wait()?;
        Ok(status.code())
    }
}

/// Runs the installer at `artifact` until `confirm` answers
/// [`Confirmation::Yes`], then deletes `artifact`. Returns how many times
/// the installer was run.
///
/// # Errors
///
/// Returns an error if the installer can't be started or waited on,
/// no answer could be read, or the artifact can't be deleted.
#[inline]
pub fn install_until_confirmed<I, C>(
    artifact: &Path,
    installer: &mut I,
    confirm: &mut C,
) -> Result<usize, InstallLoopError>
where
    I: Installer,
    C: Confirm,
{
    let mut state = InstallState::Launching;
    let mut running = None;
    let mut launches = 0_usize;

    loop {
        log::trace!("installer loop state {state:?}");
        let mut answer = None;
        match state {
            InstallState::Launching => {
                running = Some(installer.launch(artifact)?);
                launches += 1;
                log::debug!("started {} (run {launches})", artifact.display());
            }
            InstallState::Waiting => {
                if let Some(process) = running.take() {
                    let code = installer.wait(process).map_err(InstallLoopError::Wait)?;
                    match code {
                        Some(0) => log::debug!("installer exited successfully"),
                        Some(code) => log::warn!("installer exited with code {code}"),
                        None => log::warn!("installer was terminated"),
                    }
                }
            }
            InstallState::AwaitingConfirmation => {
                let confirmation = confirm.confirm()?;
                log::debug!("operator answered {confirmation:?}");
                answer = Some(confirmation);
            }
            InstallState::Done => {
                fs::remove_file(artifact).map_err(|source| InstallLoopError::RemoveArtifact {
                    path: artifact.to_path_buf(),
                    source,
                })?;
                log::info!("removed {}", artifact.display());
                return Ok(launches);
            }
        }
        state = state.next(answer);
    }
}

/// An error indicating that the install-and-confirm loop was interrupted.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InstallLoopError {
    /// The installer could not be started.
    #[error("failed to start the installer: {0}")]
    Launch(#[from] CommandExecError),
    /// Waiting on the installer process failed.
    #[error("failed to wait for the installer to exit: {0}")]
    Wait(#[source] io::Error),
    /// The operator could not be asked.
    #[error(transparent)]
    Confirm(#[from] PromptError),
    /// The installer could not be deleted after a confirmed installation.
    #[error("failed to remove installer {path}: {source}")]
    RemoveArtifact {
        /// Path of the installer.
        path: PathBuf,
        /// Source of the error.
        source: io::Error,
    },
}
