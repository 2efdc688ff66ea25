//! Bootstrapper of the Lamp development environment.
//!
//! Lamp builds against the Vulkan SDK and generates its Visual Studio
//! solutions with Premake. This library holds every step needed to get a fresh
//! Windows checkout to the point where project files can be generated:
//!
//! * [`probe`] inspects `VULKAN_SDK` to decide whether the SDK must be installed,
//! * [`download`] fetches installers and archives while drawing a [`progress`] bar,
//! * [`installer`] runs an installer until the operator confirms it succeeded,
//! * [`vulkan`] and [`premake`] compose those pieces for each tool,
//! * [`vcs`] synchronizes git submodules and LFS objects,
//! * [`generate`] dispatches to the Visual Studio specific batch script.
//!
//! Interactive input goes through the small state machine in [`prompt`],
//! so every step can be driven by tests with in-memory readers and writers.

pub mod command;
pub mod download;
pub mod generate;
pub mod installer;
pub mod premake;
pub mod probe;
pub mod progress;
pub mod prompt;
pub mod vcs;
pub mod vulkan;

mod test;

/// Writes formatted text to the user through the given writer and flushes it.
///
/// Evaluates to an [`io::Result`](std::io::Result).
#[macro_export]
macro_rules! user_output {
    ($dst: expr, $($args: tt)*) => { {
        #[allow(
            clippy::allow_attributes,
            clippy::useless_attribute,
            unused_imports,
            reason = "`std::io::Write` is only sometimes called??"
        )]
        use std::io::Write as _;

        let mut writer = $dst;
        match write!(writer, $($args)*) {
            Ok(()) => writer.flush(),
            Err(err) => Err(err),
        }
    } };
}
