//! Command line tool bootstrapping the Lamp development environment on Windows.
//!
//! Without a subcommand, a full setup is run:
//!
//! 1. git LFS objects and submodules are brought up to date,
//! 2. the Vulkan SDK is installed unless `VULKAN_SDK` names a matching version,
//! 3. Premake is downloaded into `vendor/premake/bin` if it is missing,
//! 4. the Visual Studio projects are generated with the matching batch script.
//!
//! Each step can also be run on its own, see `lamp-setup --help`.
//!
//! ## Configuration
//!
//! Settings are read from `setup.toml` in the user config directory, then from
//! `setup.toml` in the project root, then from the command line flags.
//! See the [`config`] module for the file format.

use std::{io, path::PathBuf};

use anyhow::Context as _;

use self::{
    config::{ConfigSources, SetupArgs},
    setup::Setup,
    terminal::TerminalStyle,
};

pub mod config;
pub mod setup;
pub mod show;
pub mod terminal;

mod merge;
mod user_consent;

/// All of the available subcommands for `lamp-setup`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::Subcommand)]
#[non_exhaustive]
pub enum Command {
    /// Run every step below in order. This is the default.
    #[default]
    Setup,

    /// Pull git LFS objects and update submodules.
    Sync,

    /// Install the Vulkan SDK unless a matching one is found.
    Vulkan,

    /// Download Premake if it is missing.
    Premake,

    /// Generate the Visual Studio projects.
    Generate,

    /// Show the detected state of the checkout and the config files.
    Show,
}

/// The struct representing the main CLI.
#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
#[non_exhaustive]
pub struct Cli {
    /// Root of the Lamp checkout.
    #[clap(long, default_value = ".", global = true)]
    pub project_root: PathBuf,

    /// Settings overriding the config files. They go before the subcommand.
    #[clap(flatten)]
    pub args: SetupArgs,

    /// The command to run.
    #[clap(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Runs the command
    ///
    /// # Errors
    /// Any errors during execution, usually printed to the user
    #[inline]
    pub fn run(&self) -> anyhow::Result<()> {
        let root = dunce::canonicalize(&self.project_root).with_context(|| {
            format!("project root {} not found", self.project_root.display())
        })?;
        let sources = ConfigSources::new(&root);
        let config = sources.load(&self.args)?;
        log::debug!("running with final merged config: {config:#?}");

        let style = TerminalStyle::acquire();
        let setup = Setup {
            root: &root,
            config: &config,
            style: &style,
        };
        match self.command.unwrap_or_default() {
            Command::Setup => setup.all()?,
            Command::Sync => setup.sync()?,
            Command::Vulkan => setup.vulkan()?,
            Command::Premake => setup.premake()?,
            Command::Generate => setup.generate()?,
            Command::Show => show::show(&root, &sources, &config, io::stdout())?,
        }

        Ok(())
    }
}
