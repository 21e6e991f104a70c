//! # Terra Release
//!
//! Chat-triggered release automation for the Terra iOS app.
//!
//! Given an environment name and optional version/build numbers, the pipeline
//! synchronizes the release branch, bumps version metadata, builds a signed
//! archive, exports or uploads the resulting binary, and streams status back
//! to the requesting conversation.
//!
//! ## Design
//!
//! - **Single-flight**: at most one release runs at a time; concurrent
//!   requests are answered with a busy notification and dropped, never queued.
//! - **Sequential pipeline**: each step starts only after the previous
//!   command exits; a failing step aborts the run with a typed error.
//! - **Best-effort reporting**: notification delivery failures are logged and
//!   never abort the pipeline.
//!
//! ## Usage
//!
//! ```bash
//! terra_release kraken --channel C0123456          # release current version
//! terra_release kraken 2.5.0 --channel C0123456    # bump and release
//! terra_release titan 3.0.0 42 --channel C0123456  # explicit build number
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod archive;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod notify;
pub mod orchestrator;
pub mod settings;
pub mod version;

// Re-export main types for public API
pub use archive::ArchiveBuilder;
pub use command::{CommandRunner, ShellRunner};
pub use config::{Environment, EnvironmentConfig};
pub use error::{ArtifactError, CommandError, ReleaseError, Result, SettingsError};
pub use export::{DeliveryMode, ExportOptions, Exporter};
pub use git::GitClient;
pub use notify::{Notifier, NotifyError, SlackNotifier};
pub use orchestrator::{ReleaseOrchestrator, ReleaseRequest};
pub use settings::{AppStoreCredentials, Settings};
pub use version::VersionBumper;
