//! Questions put to the operator on the terminal.
//!
//! Line based questions go through [`lamp_bootstrap::prompt`] on the locked
//! stdin, so they also work with piped input. Consent to download Premake is a
//! single key press and needs a terminal.

use std::io;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    style::Color,
    terminal,
    tty::IsTty as _,
};
use lamp_bootstrap::{
    generate::{VsVersion, VERSION_QUESTION},
    premake::PremakeError,
    prompt::{ask, Confirmation, PromptError, RetryPolicy},
    user_output,
    vulkan::confirm_question,
};
use semver::Version;

use crate::terminal::TerminalStyle;

/// Question asking whether the Vulkan SDK installer did its job,
/// with a green `Y` and a red `N`.
fn installation_question(style: &TerminalStyle) -> String {
    confirm_question(style.paint("Y", Color::Green), style.paint("N", Color::Red))
}

/// Operator answering whether the Vulkan SDK installer did its job.
///
/// Every call asks again on stdin; it fails if stdin is closed or can't be read.
#[inline]
pub fn confirm_installation(
    style: &TerminalStyle,
) -> impl FnMut() -> Result<Confirmation, PromptError> {
    let question = installation_question(style);
    move || ask(&question, io::stdin().lock(), io::stdout(), RetryPolicy::Unbounded)
}

/// Asks for the Visual Studio version until a supported one is entered.
///
/// # Errors
///
/// Returns an error if stdin is closed or can't be read.
#[inline]
pub fn ask_vs_version() -> Result<VsVersion, PromptError> {
    ask(
        VERSION_QUESTION,
        io::stdin().lock(),
        io::stdout(),
        RetryPolicy::Unbounded,
    )
}

/// Halts the installation of Premake if the user does not consent to it.
#[inline]
pub fn ask_for_premake_consent(
    skip: bool,
) -> impl FnOnce(&Version) -> Result<(), UserConsentError> {
    move |version: &Version| {
        get_user_consent(
            format!("Premake {version} was not found. Download it?"),
            skip,
        )?;
        log::debug!("installing premake {version}");
        Ok(())
    }
}

/// Puts the terminal in raw mode until dropped.
struct RawMode;

impl RawMode {
    /// Enables raw mode.
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            log::warn!("failed to leave raw mode: {err}");
        }
    }
}

/// Prompts the user with a single `y`/`n` key press.
fn get_user_consent(prompt: impl AsRef<str>, skip: bool) -> Result<(), UserConsentError> {
    if skip {
        return Ok(());
    }

    if !io::stdout().is_tty() {
        log::error!("attempted to ask for consent when there's no TTY");
        return Err(UserConsentError::NoTTY);
    }

    log::debug!("asking for consent to download premake");
    user_output!(io::stdout(), "{} [y/n]: ", prompt.as_ref()).map_err(UserConsentError::IoWrite)?;
    let code = {
        let _raw = RawMode::enable().map_err(UserConsentError::IoRead)?;
        read_key_press().map_err(UserConsentError::IoRead)?
    };
    user_output!(io::stdout(), "\n").map_err(UserConsentError::IoWrite)?;

    if is_consent(code) {
        Ok(())
    } else {
        Err(UserConsentError::UserDenied)
    }
}

/// Waits for the next key press.
///
/// Windows terminals also report key releases, e.g. of the Enter key that
/// started this program (see crossterm#124), which are skipped.
fn read_key_press() -> io::Result<KeyCode> {
    loop {
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            return Ok(code);
        }
    }
}

/// Whether `code` means "yes".
const fn is_consent(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('y' | 'Y'))
}

/// An error indicating that user consent were not acquired.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UserConsentError {
    /// Premake could not be installed after the user agreed.
    #[error(transparent)]
    Premake(#[from] PremakeError),
    /// No TTY detected, so can't ask for consent to download Premake.
    #[error("no TTY detected, so can't ask for consent to download Premake; pass `--auto-install-premake` to skip the question")]
    NoTTY,
    /// An I/O error occurred while reading user input.
    #[error("failed to read user input: {0}")]
    IoRead(#[source] io::Error),
    /// An I/O error occurred while writing user output.
    #[error("failed to write user output: {0}")]
    IoWrite(#[source] io::Error),
    /// User denied to download Premake.
    #[error("user denied to download Premake, which is required to generate projects")]
    UserDenied,
}
