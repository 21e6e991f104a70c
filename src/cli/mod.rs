//! Command line front-end.
//!
//! Parses a release request, acknowledges it immediately, and runs the
//! pipeline as a background task so the acknowledgment never waits on the
//! long-running build. Status is reported through the notification channel;
//! the process exit code mirrors the terminal outcome.

use crate::command::ShellRunner;
use crate::notify::SlackNotifier;
use crate::orchestrator::{ReleaseOrchestrator, ReleaseRequest};
use crate::settings::Settings;
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

/// Release automation for the Terra iOS app
#[derive(Parser, Debug)]
#[command(
    name = "terra_release",
    version,
    about = "Release automation for the Terra iOS app",
    long_about = "Sync the release branch, bump version metadata, archive, and deliver a build.

Usage:
  terra_release kraken --channel C0123456
  terra_release kraken 2.5.0 --channel C0123456
  terra_release titan 3.0.0 42 --channel C0123456 --thread 1712345678.000100"
)]
pub struct Args {
    /// Target environment: kraken or titan
    #[arg(index = 1, value_name = "ENVIRONMENT")]
    pub environment: String,

    /// Target marketing version (e.g. 2.5.0); omit to release the current version
    #[arg(id = "target_version", index = 2, value_name = "VERSION")]
    pub version: Option<semver::Version>,

    /// Explicit build number; omit to auto-increment
    #[arg(index = 3, value_name = "BUILD_NUMBER")]
    pub build_number: Option<String>,

    /// Channel status updates are posted to
    #[arg(long, env = "RELEASE_CHANNEL")]
    pub channel: String,

    /// User id mentioned in the starting banner
    #[arg(long, env = "RELEASE_USER", default_value = "terra-release")]
    pub user: String,

    /// Thread timestamp to reply under
    #[arg(long)]
    pub thread: Option<String>,
}

impl Args {
    /// Turn parsed arguments into a release request
    pub fn into_request(self) -> ReleaseRequest {
        ReleaseRequest {
            environment: self.environment,
            version: self.version,
            build_number: self.build_number,
            channel: self.channel,
            user: self.user,
            thread: self.thread,
        }
    }
}

/// Parse arguments, wire the pipeline, and run one release
pub async fn run() -> anyhow::Result<i32> {
    let args = Args::parse();
    let settings = Settings::from_env().context("Failed to load configuration")?;

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let notifier = Arc::new(SlackNotifier::new(
        client,
        settings.slack_bot_token.clone(),
    ));
    let runner = Arc::new(ShellRunner::new(
        settings.project_root.clone(),
        settings.command_timeout,
        settings.max_output_bytes,
    ));
    let orchestrator = Arc::new(ReleaseOrchestrator::new(settings, runner, notifier));

    let request = args.into_request();
    println!(
        "Release to '{}' accepted; status will be posted to {}.",
        request.environment, request.channel
    );

    // Background task keeps the acknowledgment path free of pipeline latency
    let pipeline = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.handle_request(request).await }
    });

    match pipeline.await {
        // Failures were already reported through the notification channel
        Ok(Ok(())) => Ok(0),
        Ok(Err(_)) => Ok(1),
        Err(join_err) => Err(join_err).context("Release task panicked"),
    }
}
