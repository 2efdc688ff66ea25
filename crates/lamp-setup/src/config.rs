//! Manage and merge the various sources of config:
//! the user's `setup.toml`, the project's `setup.toml` and the command line.
//!
//! Every later source overrides the earlier ones, field by field.
//! Keys in the files use the same kebab case as the flags:
//!
//! ```toml
//! no-sync = true
//!
//! [vulkan]
//! version-prefix = "1.3."
//!
//! [premake]
//! auto-install = true
//!
//! [generate]
//! vs-version = "2022"
//! ```

use std::{
    fs, io, iter,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use lamp_bootstrap::{generate::VsVersion, premake::PremakeParams, vulkan::VulkanParams};
use serde_json::{from_value, to_value, Value};

use crate::merge::{json_merge_in, merge, JsonKeysToSnakeCase as _};

/// Name of the config files, both in the user config directory and in the
/// project root.
pub const CONFIG_FILE_NAME: &str = "setup.toml";

/// Everything the setup steps can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Parser, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub struct SetupArgs {
    /// Vulkan SDK check and installation.
    #[clap(flatten)]
    pub vulkan: VulkanParams,

    /// Premake check and installation.
    #[clap(flatten)]
    pub premake: PremakeParams,

    /// Project generation.
    #[clap(flatten)]
    pub generate: GenerateParams,

    /// Don't update git submodules and LFS objects.
    #[clap(long, action)]
    pub no_sync: bool,
}

/// Parameters of the project generation.
#[derive(Debug, Clone, PartialEq, Eq, clap::Parser, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub struct GenerateParams {
    /// Visual Studio version to generate projects for. Asked for when missing.
    #[clap(long)]
    pub vs_version: Option<VsVersion>,

    /// Directory holding the `Win-GenProjects-*.bat` scripts, relative to the project root.
    #[clap(long, default_value = ".")]
    pub scripts_dir: PathBuf,
}

impl Default for GenerateParams {
    #[inline]
    fn default() -> Self {
        Self {
            vs_version: None,
            scripts_dir: PathBuf::from("."),
        }
    }
}

/// Path of the config file in the user config directory, if the platform has one.
#[inline]
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lamp-setup")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Config files consulted for a project, lowest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ConfigSources {
    /// File in the user config directory.
    pub user: Option<PathBuf>,
    /// File in the project root.
    pub project: PathBuf,
}

impl ConfigSources {
    /// Sources for the project at `project_root`.
    #[inline]
    #[must_use]
    pub fn new(project_root: &Path) -> Self {
        Self {
            user: user_config_path(),
            project: project_root.join(CONFIG_FILE_NAME),
        }
    }

    /// Every file path, lowest priority first. The files may not exist.
    #[inline]
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.user
            .as_deref()
            .into_iter()
            .chain(iter::once(self.project.as_path()))
    }

    /// Lays the config files over the defaults, then the command line `args`
    /// over the result.
    ///
    /// Missing files are skipped. Keys that don't name a setting are ignored
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if a file can't be read or parsed, or holds a value of
    /// the wrong type.
    #[inline]
    pub fn load(&self, args: &SetupArgs) -> anyhow::Result<SetupArgs> {
        let defaults = to_value(SetupArgs::default())?;
        let mut merged = defaults.clone();
        for path in self.files() {
            if let Some(layer) = read_layer(path)? {
                log::debug!("applying config from {}", path.display());
                json_merge_in(&mut merged, layer, &defaults);
            }
        }
        let from_files: SetupArgs =
            from_value(merged).context("invalid value in config files")?;
        log::debug!("config from files: {from_files:#?}");

        let config = merge(&from_files, args)?;
        Ok(config)
    }
}

/// Reads a config file into a JSON value with snake case keys.
fn read_layer(path: &Path) -> anyhow::Result<Option<Value>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };
    let table: toml::Table =
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(to_value(table)?.keys_to_snake_case()))
}
