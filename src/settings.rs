//! Process configuration loaded from environment variables.

use crate::error::{Result, SettingsError};
use std::path::PathBuf;
use std::time::Duration;

/// Default per-command timeout. Archive builds routinely take many minutes;
/// an hour means a wedged xcodebuild eventually frees the single-flight lock.
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 3600;

/// Default cap on captured command output (50 MiB, enough for xcodebuild logs)
const DEFAULT_MAX_OUTPUT_BYTES: usize = 50 * 1024 * 1024;

/// Configuration for the release service
#[derive(Debug, Clone)]
pub struct Settings {
    /// Working directory for every external command (the iOS project checkout)
    pub project_root: PathBuf,
    /// Branch released for the kraken environment
    pub kraken_branch: String,
    /// Branch released for the titan environment
    pub titan_branch: String,
    /// Slack bot token used for status notifications
    pub slack_bot_token: String,
    /// App Store Connect credentials, if configured
    pub app_store: AppStoreCredentials,
    /// Per-command execution timeout
    pub command_timeout: Duration,
    /// Cap on captured stdout/stderr per command
    pub max_output_bytes: usize,
}

/// App Store Connect API key identifiers
#[derive(Debug, Clone, Default)]
pub struct AppStoreCredentials {
    /// APP_STORE_CONNECT_API_KEY_ID
    pub api_key_id: Option<String>,
    /// APP_STORE_CONNECT_ISSUER_ID
    pub issuer_id: Option<String>,
}

impl AppStoreCredentials {
    /// Whether both API key identifiers are present.
    ///
    /// Selects the export mode: configured credentials let xcodebuild deliver
    /// the build in one step, otherwise the manual export path is taken.
    pub fn configured(&self) -> bool {
        self.api_key_id.is_some() && self.issuer_id.is_some()
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_root = non_empty("PROJECT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("../Project/Terra-Charge/iosApp"));

        let slack_bot_token =
            non_empty("SLACK_BOT_TOKEN").ok_or(SettingsError::MissingVariable {
                variable: "SLACK_BOT_TOKEN".to_string(),
            })?;

        let command_timeout = match non_empty("RELEASE_COMMAND_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| SettingsError::InvalidValue {
                    variable: "RELEASE_COMMAND_TIMEOUT_SECS".to_string(),
                    reason: format!("expected seconds as an integer, got '{raw}'"),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        };

        let max_output_bytes = match non_empty("RELEASE_MAX_OUTPUT_BYTES") {
            Some(raw) => raw.parse().map_err(|_| SettingsError::InvalidValue {
                variable: "RELEASE_MAX_OUTPUT_BYTES".to_string(),
                reason: format!("expected bytes as an integer, got '{raw}'"),
            })?,
            None => DEFAULT_MAX_OUTPUT_BYTES,
        };

        Ok(Self {
            project_root,
            kraken_branch: non_empty("RELEASE_BRANCH_KRAKEN")
                .unwrap_or_else(|| "develop".to_string()),
            titan_branch: non_empty("RELEASE_BRANCH_TITAN").unwrap_or_else(|| "main".to_string()),
            slack_bot_token,
            app_store: AppStoreCredentials {
                api_key_id: non_empty("APP_STORE_CONNECT_API_KEY_ID"),
                issuer_id: non_empty("APP_STORE_CONNECT_ISSUER_ID"),
            },
            command_timeout,
            max_output_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_applied_when_optional_variables_absent() {
        let settings =
            Settings::from_lookup(lookup_from(&[("SLACK_BOT_TOKEN", "xoxb-test")])).unwrap();
        assert_eq!(settings.kraken_branch, "develop");
        assert_eq!(settings.titan_branch, "main");
        assert_eq!(settings.command_timeout, Duration::from_secs(3600));
        assert!(!settings.app_store.configured());
    }

    #[test]
    fn missing_slack_token_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("SLACK_BOT_TOKEN"));
    }

    #[test]
    fn credentials_require_both_identifiers() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("APP_STORE_CONNECT_API_KEY_ID", "ABC123"),
        ]))
        .unwrap();
        assert!(!settings.app_store.configured());

        let settings = Settings::from_lookup(lookup_from(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("APP_STORE_CONNECT_API_KEY_ID", "ABC123"),
            ("APP_STORE_CONNECT_ISSUER_ID", "def-456"),
        ]))
        .unwrap();
        assert!(settings.app_store.configured());
    }

    #[test]
    fn branch_overrides_are_honored() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("RELEASE_BRANCH_KRAKEN", "release/staging"),
            ("RELEASE_BRANCH_TITAN", "release/prod"),
        ]))
        .unwrap();
        assert_eq!(settings.kraken_branch, "release/staging");
        assert_eq!(settings.titan_branch, "release/prod");
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("RELEASE_COMMAND_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RELEASE_COMMAND_TIMEOUT_SECS"));
    }
}
