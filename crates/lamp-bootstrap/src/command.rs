//! Utilities for executing [commands](Command).

use std::{
    io,
    process::{Command, ExitStatus, Output},
};

/// An error indicating failure while executing some command.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "this is intended")]
pub enum CommandExecError {
    /// IO error occurred while calling some command.
    #[error("IO error occurred while calling `{command:?}`: {source}")]
    Io {
        /// The command which was called.
        command: Box<Command>,
        /// Source of the error.
        source: io::Error,
    },
    /// Result of calling some command was not successful.
    #[error("calling `{command:?}` was not successful")]
    ExecFail {
        /// The command which was called.
        command: Box<Command>,
        /// The output of called command.
        output: Output,
    },
}

impl CommandExecError {
    /// Creates [`Io`](CommandExecError::Io) variant from given arguments.
    pub(crate) fn io(command: impl Into<Command>, source: io::Error) -> Self {
        Self::Io {
            command: Box::new(command.into()),
            source,
        }
    }

    /// Creates [`ExecFail`](CommandExecError::ExecFail) variant from given arguments.
    fn exec_fail(command: impl Into<Command>, output: Output) -> Self {
        Self::ExecFail {
            command: Box::new(command.into()),
            output,
        }
    }

    /// Returns the command which was called.
    #[inline]
    #[expect(clippy::must_use_candidate, reason = "returns a reference")]
    pub fn command(&self) -> &Command {
        match self {
            Self::Io { command, .. } | Self::ExecFail { command, .. } => command.as_ref(),
        }
    }

    /// Returns the OS error code if the command could not even be started.
    #[inline]
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            Self::ExecFail { .. } => None,
        }
    }
}

/// Executes the command, returning its output.
///
/// Fails if the command could not be started or exited unsuccessfully.
#[expect(clippy::shadow_reuse, reason = "this is intended")]
pub(crate) fn execute_command(command: impl Into<Command>) -> Result<Output, CommandExecError> {
    let mut command = command.into();
    let output = match command.output() {
        Ok(output) => output,
        Err(source) => return Err(CommandExecError::io(command, source)),
    };
    if !output.status.success() {
        return Err(CommandExecError::exec_fail(command, output));
    }
    Ok(output)
}

/// Runs the command with inherited stdio and waits for it, returning its exit status.
///
/// Only a failure to start the command is an error,
/// the exit status is left for the caller to judge.
#[expect(clippy::shadow_reuse, reason = "this is intended")]
pub(crate) fn run_command(command: impl Into<Command>) -> Result<ExitStatus, CommandExecError> {
    let mut command = command.into();
    log::debug!("running `{command:?}`");
    match command.status() {
        Ok(status) => Ok(status),
        Err(source) => Err(CommandExecError::io(command, source)),
    }
}
