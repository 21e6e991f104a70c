//! Error types for terra_release operations.
//!
//! Every pipeline step surfaces a typed error; the orchestrator is the single
//! catch boundary that turns them into failure notifications.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for terra_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all terra_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Environment key outside the supported set
    #[error("Unknown environment: '{key}'. Supported: {supported}.")]
    UnknownEnvironment {
        /// Key that was requested
        key: String,
        /// Comma-separated supported keys
        supported: String,
    },

    /// Another release already holds the single-flight lock
    #[error("A release is already in progress. Please wait for it to finish.")]
    AlreadyRunning,

    /// External command errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Expected descriptor or build artifact is missing
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Manual App Store upload path invoked while unsupported
    #[error("App Store API key upload is not implemented")]
    UploadNotImplemented,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export options serialization errors
    #[error("Export options error: {0}")]
    Plist(#[from] plist::Error),
}

/// External command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command could not be spawned at all
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        /// Command line that failed to start
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// Command exited with a non-zero status
    #[error("'{command}' exited with {}: {stderr}", exit_label(.status))]
    Failed {
        /// Command line that failed
        command: String,
        /// Exit code, if the process was not killed by a signal
        status: Option<i32>,
        /// Captured stderr, truncated to the output cap
        stderr: String,
    },

    /// Command did not finish within the configured timeout
    #[error("'{command}' timed out after {timeout_secs}s and was killed")]
    TimedOut {
        /// Command line that hung
        command: String,
        /// Timeout that was exceeded
        timeout_secs: u64,
    },
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

/// Missing descriptor or output artifact errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Neither the workspace nor the project descriptor exists
    #[error("Neither '{workspace}' nor '{project}' found in {root}")]
    ProjectDescriptorMissing {
        /// Expected workspace descriptor file name
        workspace: String,
        /// Expected project descriptor file name
        project: String,
        /// Directory that was probed
        root: PathBuf,
    },

    /// Export finished but produced no artifact with the expected extension
    #[error("No .{extension} file produced in {dir}")]
    ExportedArtifactMissing {
        /// Extension that was searched for
        extension: String,
        /// Export output directory
        dir: PathBuf,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Required environment variable is missing or empty
    #[error("Missing required environment variable: {variable}")]
    MissingVariable {
        /// Variable name
        variable: String,
    },

    /// Environment variable value could not be parsed
    #[error("Invalid value for {variable}: {reason}")]
    InvalidValue {
        /// Variable name
        variable: String,
        /// Reason the value was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display_includes_status_and_stderr() {
        let err = CommandError::Failed {
            command: "git push origin develop".to_string(),
            status: Some(128),
            stderr: "fatal: repository not found".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("git push origin develop"));
        assert!(text.contains("status 128"));
        assert!(text.contains("repository not found"));
    }

    #[test]
    fn command_killed_by_signal_displays_signal() {
        let err = CommandError::Failed {
            command: "xcodebuild archive".to_string(),
            status: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn upload_not_implemented_mentions_not_implemented() {
        assert!(
            ReleaseError::UploadNotImplemented
                .to_string()
                .contains("not implemented")
        );
    }

    #[test]
    fn unknown_environment_lists_supported_keys() {
        let err = ReleaseError::UnknownEnvironment {
            key: "atlantis".to_string(),
            supported: "kraken, titan".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("Unknown environment"));
        assert!(text.contains("atlantis"));
        assert!(text.contains("kraken, titan"));
    }
}
