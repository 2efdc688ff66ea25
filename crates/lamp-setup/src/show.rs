//! Display information about the setup of a checkout.

use std::{io, path::Path};

use lamp_bootstrap::{
    generate::script_path,
    probe::{probe_environment, SdkStatus, VULKAN_SDK_VAR},
    user_output,
};

use crate::config::{ConfigSources, SetupArgs};

/// Writes what a setup run would find, without changing anything.
///
/// # Errors
///
/// Returns an error if `writer` fails.
#[inline]
pub fn show<W: io::Write>(
    root: &Path,
    sources: &ConfigSources,
    config: &SetupArgs,
    mut writer: W,
) -> io::Result<()> {
    user_output!(&mut writer, "Project root: {}\n", root.display())?;
    for path in sources.files() {
        let state = if path.is_file() { "found" } else { "missing" };
        user_output!(&mut writer, "Config file: {} ({state})\n", path.display())?;
    }

    let status = probe_environment(&config.vulkan.version_prefix);
    user_output!(
        &mut writer,
        "Vulkan SDK: {}\n",
        describe_sdk(&status, &config.vulkan.version_prefix)
    )?;

    let premake = config.premake.executable(root);
    let state = if premake.is_file() { "installed" } else { "missing" };
    user_output!(
        &mut writer,
        "Premake {}: {} ({state})\n",
        config.premake.version,
        premake.display()
    )?;

    let scripts_dir = root.join(&config.generate.scripts_dir);
    match config.generate.vs_version {
        Some(version) => {
            let script = script_path(&scripts_dir, version);
            let state = if script.is_file() { "found" } else { "missing" };
            user_output!(&mut writer, "Generator: {} ({state})\n", script.display())?;
        }
        None => {
            user_output!(
                &mut writer,
                "Generator: asked for at run time, scripts in {}\n",
                scripts_dir.display()
            )?;
        }
    }
    Ok(())
}

/// One line summary of a probe.
#[expect(
    clippy::wildcard_enum_match_arm,
    reason = "new states are described like a missing SDK"
)]
fn describe_sdk(status: &SdkStatus, version_prefix: &str) -> String {
    match status {
        SdkStatus::Installed { found } => format!("{found} (matches {version_prefix})"),
        SdkStatus::WrongVersion { found } => {
            format!("{found} (does not match {version_prefix})")
        }
        _ => format!("not installed ({VULKAN_SDK_VAR} is unset)"),
    }
}
