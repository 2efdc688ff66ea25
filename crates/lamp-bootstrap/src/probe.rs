//! Detection of an installed Vulkan SDK.
//!
//! The SDK installer exports `VULKAN_SDK` pointing at a versioned directory,
//! e.g. `C:\VulkanSDK\1.3.250.1`, so the version is read straight from that path.

use std::env;

/// Environment variable set by the Vulkan SDK installer.
pub const VULKAN_SDK_VAR: &str = "VULKAN_SDK";

/// State of the Vulkan SDK on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SdkStatus {
    /// [`VULKAN_SDK_VAR`] is not set at all.
    NotInstalled,
    /// An SDK is installed, but not of the expected version.
    WrongVersion {
        /// Value of [`VULKAN_SDK_VAR`].
        found: String,
    },
    /// An SDK of the expected version is installed.
    Installed {
        /// Value of [`VULKAN_SDK_VAR`].
        found: String,
    },
}

impl SdkStatus {
    /// Whether the installer has to be run.
    #[inline]
    #[must_use]
    pub const fn needs_install(&self) -> bool {
        !matches!(self, Self::Installed { .. })
    }
}

/// Classifies a value of [`VULKAN_SDK_VAR`] against the expected version.
///
/// The version is matched as a substring anywhere in the value,
/// since the variable usually holds an installation path.
#[inline]
#[must_use]
pub fn probe_value(value: Option<&str>, version_prefix: &str) -> SdkStatus {
    match value {
        None => SdkStatus::NotInstalled,
        Some(found) if found.contains(version_prefix) => SdkStatus::Installed {
            found: found.to_owned(),
        },
        Some(found) => SdkStatus::WrongVersion {
            found: found.to_owned(),
        },
    }
}

/// Reads [`VULKAN_SDK_VAR`] from the process environment and classifies it.
#[inline]
#[must_use]
pub fn probe_environment(version_prefix: &str) -> SdkStatus {
    let value = env::var_os(VULKAN_SDK_VAR);
    let value = value.as_ref().map(|value| value.to_string_lossy());
    log::debug!("{VULKAN_SDK_VAR} is {value:?}");
    probe_value(value.as_deref(), version_prefix)
}
