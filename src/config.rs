//! Release environments and their fixed build configuration.
//!
//! The environment set is closed: unknown keys are rejected at the boundary
//! with a typed error. Scheme, build configuration, and export method are
//! fixed per environment; only the branch comes from [`Settings`].

use crate::error::ReleaseError;
use crate::settings::Settings;
use std::fmt;
use std::str::FromStr;

/// Supported release environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Staging track (Terra Staging JP scheme)
    Kraken,
    /// Production track (iosApp scheme)
    Titan,
}

impl Environment {
    /// All supported environments
    pub const ALL: [Environment; 2] = [Environment::Kraken, Environment::Titan];

    /// Environment key as used in chat commands and notifications
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Kraken => "kraken",
            Environment::Titan => "titan",
        }
    }

    /// Comma-separated list of supported keys, for error messages
    pub fn supported_keys() -> String {
        Self::ALL
            .iter()
            .map(|env| env.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve the release configuration for this environment
    pub fn release_config(&self, settings: &Settings) -> EnvironmentConfig {
        match self {
            Environment::Kraken => EnvironmentConfig {
                scheme: "Terra Staging JP",
                branch: settings.kraken_branch.clone(),
                configuration: "Release",
                export_method: "app-store",
            },
            Environment::Titan => EnvironmentConfig {
                scheme: "iosApp",
                branch: settings.titan_branch.clone(),
                configuration: "Release",
                export_method: "app-store",
            },
        }
    }
}

impl FromStr for Environment {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kraken" => Ok(Environment::Kraken),
            "titan" => Ok(Environment::Titan),
            other => Err(ReleaseError::UnknownEnvironment {
                key: other.to_string(),
                supported: Environment::supported_keys(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed build parameters for one environment
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Xcode scheme to archive
    pub scheme: &'static str,
    /// Branch to sync and release from
    pub branch: String,
    /// Xcode build configuration
    pub configuration: &'static str,
    /// Export method written into the export options descriptor
    pub export_method: &'static str,
}
