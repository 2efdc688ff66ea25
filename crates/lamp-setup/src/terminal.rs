//! Terminal styling for status lines.

use core::fmt::Display;
use std::{env, io};

use crossterm::{
    execute,
    style::{style, Color, ResetColor, Stylize as _},
    tty::IsTty as _,
};
use lamp_bootstrap::user_output;

/// Colors status lines while alive and resets the terminal colors when dropped.
///
/// Acquire it once and keep it for the whole run. Colors are only used when
/// stdout is a terminal that understands them and `NO_COLOR` is unset.
#[derive(Debug)]
#[non_exhaustive]
pub struct TerminalStyle {
    /// Whether escape sequences are written at all.
    colored: bool,
}

impl TerminalStyle {
    /// Inspects stdout and prepares it for colored output.
    #[inline]
    #[must_use]
    pub fn acquire() -> Self {
        let colored =
            io::stdout().is_tty() && env::var_os("NO_COLOR").is_none() && supports_ansi();
        log::trace!("colored output: {colored}");
        Self { colored }
    }

    /// Style writing no escape sequences.
    #[inline]
    #[must_use]
    pub const fn plain() -> Self {
        Self::forced(false)
    }

    /// Style with colors on or off regardless of the terminal.
    #[inline]
    #[must_use]
    pub const fn forced(colored: bool) -> Self {
        Self { colored }
    }

    /// Whether status lines are colored.
    #[inline]
    #[must_use]
    pub const fn is_colored(&self) -> bool {
        self.colored
    }

    /// Renders `text` in `color`, or as is without colors.
    #[inline]
    pub fn paint<D: Display>(&self, text: D, color: Color) -> String {
        if self.colored {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Writes `message` in `color` on its own line to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout can't be written.
    #[inline]
    pub fn status<D: Display>(&self, color: Color, message: D) -> io::Result<()> {
        user_output!(io::stdout(), "{}\n", self.paint(message, color))
    }
}

impl Drop for TerminalStyle {
    #[inline]
    fn drop(&mut self) {
        if self.colored {
            if let Err(err) = execute!(io::stdout(), ResetColor) {
                log::debug!("failed to reset terminal colors: {err}");
            }
        }
    }
}

/// Enables escape sequence processing on consoles that need it.
#[cfg(windows)]
fn supports_ansi() -> bool {
    crossterm::ansi_support::supports_ansi()
}

#[cfg(not(windows))]
const fn supports_ansi() -> bool {
    true
}
