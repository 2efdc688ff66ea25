//! The steps of a setup run, in the order [`Setup::all`] runs them.

use std::{env, io, path::Path};

use anyhow::Context as _;
use crossterm::style::Color;
use lamp_bootstrap::{
    generate::generate_projects,
    installer::ChildInstaller,
    premake::ensure_premake,
    probe::{probe_environment, SdkStatus},
    vcs::{is_work_tree, sync_repository},
    vulkan::{ensure_vulkan_sdk, VulkanOutcome, VulkanParams},
};

use crate::{
    config::SetupArgs,
    terminal::TerminalStyle,
    user_consent::{ask_for_premake_consent, ask_vs_version, confirm_installation},
};

/// Everything a step needs to run.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Setup<'ctx> {
    /// Canonical root of the Lamp checkout.
    pub root: &'ctx Path,
    /// Final merged config.
    pub config: &'ctx SetupArgs,
    /// Styling of status lines.
    pub style: &'ctx TerminalStyle,
}

impl Setup<'_> {
    /// Runs every step, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Any error of the individual steps.
    #[inline]
    pub fn all(&self) -> anyhow::Result<()> {
        self.sync()?;
        self.vulkan()?;
        self.premake()?;
        self.generate()?;
        Ok(())
    }

    /// Pulls LFS objects and updates submodules, unless disabled.
    ///
    /// Failing git commands only produce warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout can't be written or `git` vanishes midway.
    #[inline]
    pub fn sync(&self) -> anyhow::Result<()> {
        if self.config.no_sync {
            log::info!("skipping repository sync");
            return Ok(());
        }
        match is_work_tree(self.root) {
            Ok(true) => {}
            Ok(false) => {
                log::warn!(
                    "{} is not a git work tree, skipping repository sync",
                    self.root.display()
                );
                return Ok(());
            }
            Err(err) => {
                log::warn!("can't run git, skipping repository sync: {err}");
                return Ok(());
            }
        }

        self.style
            .status(Color::Green, "Updating git LFS objects and submodules...")?;
        let succeeded = sync_repository(self.root)?;
        log::debug!("{succeeded} sync command(s) succeeded");
        Ok(())
    }

    /// Installs the Vulkan SDK unless a matching one is found.
    ///
    /// # Errors
    ///
    /// Returns an error if the installer can't be downloaded or run, or the
    /// operator can't be asked about it.
    #[inline]
    pub fn vulkan(&self) -> anyhow::Result<()> {
        let params = &self.config.vulkan;
        let status = probe_environment(&params.version_prefix);
        self.report_vulkan(params, &status)?;

        let work_dir = env::current_dir().context("failed to read the working directory")?;
        let outcome = ensure_vulkan_sdk(
            params,
            &status,
            &work_dir,
            io::stdout(),
            &mut ChildInstaller::default(),
            &mut confirm_installation(self.style),
        )?;
        if let VulkanOutcome::Installed { launches } = outcome {
            log::debug!("installer confirmed after {launches} run(s)");
            self.style.status(Color::Green, "Vulkan SDK installed!")?;
        }
        Ok(())
    }

    /// Writes the result of the Vulkan SDK probe.
    #[expect(
        clippy::wildcard_enum_match_arm,
        reason = "new states are reported like a missing SDK"
    )]
    fn report_vulkan(&self, params: &VulkanParams, status: &SdkStatus) -> io::Result<()> {
        match status {
            SdkStatus::Installed { found } => {
                log::debug!("VULKAN_SDK={found}");
                self.style.status(Color::Green, "Correct Vulkan version found!")
            }
            SdkStatus::WrongVersion { found } => {
                log::debug!("VULKAN_SDK={found}");
                self.style.status(
                    Color::Red,
                    format_args!(
                        "Correct Vulkan version not found! Installing {}xxx",
                        params.version_prefix
                    ),
                )
            }
            _ => self
                .style
                .status(Color::Red, "Vulkan SDK not installed! Installing!"),
        }
    }

    /// Downloads Premake into the project if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the user declines or the download fails.
    #[inline]
    pub fn premake(&self) -> anyhow::Result<()> {
        let params = &self.config.premake;
        let halt = ask_for_premake_consent(params.auto_install);
        let executable = ensure_premake(params, self.root, halt, io::stdout())?;
        self.style.status(
            Color::Green,
            format_args!("Premake found at {}", executable.display()),
        )?;
        Ok(())
    }

    /// Runs the project generator for the configured or entered Visual Studio
    /// version.
    ///
    /// # Errors
    ///
    /// Returns an error if no version was entered or the script can't be
    /// started.
    #[inline]
    pub fn generate(&self) -> anyhow::Result<()> {
        let params = &self.config.generate;
        let version = match params.vs_version {
            Some(version) => version,
            None => ask_vs_version()?,
        };
        let scripts_dir = self.root.join(&params.scripts_dir);
        let status = generate_projects(&scripts_dir, version)?;
        if !status.success() {
            log::warn!("{} exited with {status}", version.script_name());
        }
        Ok(())
    }
}
