//! Synchronization of git submodules and LFS objects.

use std::{path::Path, process::Command};

use crate::command::{execute_command, run_command, CommandExecError};

/// Commands bringing a checkout at `root` up to date, in the order they run.
///
/// LFS objects are pulled first so submodules checked out afterwards
/// find their parents' assets in place.
#[inline]
#[must_use]
pub fn sync_commands(root: &Path) -> [Command; 2] {
    let mut lfs = Command::new("git");
    lfs.current_dir(root).args(["lfs", "pull"]);

    let mut submodules = Command::new("git");
    submodules
        .current_dir(root)
        .args(["submodule", "update", "--init", "--recursive"]);

    [lfs, submodules]
}

/// Checks whether `root` is inside a git work tree.
///
/// # Errors
///
/// Returns an error if `git` can't be started.
#[inline]
pub fn is_work_tree(root: &Path) -> Result<bool, CommandExecError> {
    let mut command = Command::new("git");
    command
        .current_dir(root)
        .args(["rev-parse", "--is-inside-work-tree"]);
    match execute_command(command) {
        Ok(output) => Ok(String::from_utf8_lossy(&output.stdout).trim() == "true"),
        Err(CommandExecError::ExecFail { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Runs [`sync_commands`] with inherited stdio. Returns how many of them
/// succeeded.
///
/// A failing command is reported and the next one still runs, so a machine
/// without `git lfs` can still fetch submodules.
///
/// # Errors
///
/// Returns an error if `git` can't be started at all.
#[inline]
pub fn sync_repository(root: &Path) -> Result<usize, CommandExecError> {
    let mut succeeded = 0;
    for command in sync_commands(root) {
        let description = format!("{command:?}");
        let status = run_command(command)?;
        if status.success() {
            succeeded += 1;
        } else {
            log::warn!("`{description}` exited with {status}");
        }
    }
    Ok(succeeded)
}
