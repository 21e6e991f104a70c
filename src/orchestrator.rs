//! Release orchestration.
//!
//! The orchestrator owns the single-flight lock and sequences the pipeline:
//! source-control sync, version handling, archive build, export/upload. It is
//! the single catch boundary: every step error becomes exactly one failure
//! notification, and the lock is restored on every exit path.

use crate::archive::ArchiveBuilder;
use crate::command::CommandRunner;
use crate::config::Environment;
use crate::error::{ReleaseError, Result};
use crate::export::{DeliveryMode, Exporter};
use crate::git::GitClient;
use crate::notify::Notifier;
use crate::settings::Settings;
use crate::version::VersionBumper;
use semver::Version;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A single release request, immutable once accepted
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    /// Environment key as received from the front-end
    pub environment: String,
    /// Target marketing version; absent means release the current version
    pub version: Option<Version>,
    /// Explicit build number; absent means auto-increment
    pub build_number: Option<String>,
    /// Channel to report status into
    pub channel: String,
    /// Requesting user id, mentioned in the starting banner
    pub user: String,
    /// Thread to reply under, when the command came from one
    pub thread: Option<String>,
}

/// Sequences release pipelines one at a time
pub struct ReleaseOrchestrator {
    settings: Settings,
    runner: Arc<dyn CommandRunner>,
    notifier: Arc<dyn Notifier>,
    running: AtomicBool,
}

/// Restores the idle state on every exit path
struct IdleGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl ReleaseOrchestrator {
    /// Create an orchestrator
    pub fn new(
        settings: Settings,
        runner: Arc<dyn CommandRunner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            runner,
            notifier,
            running: AtomicBool::new(false),
        }
    }

    /// Whether a release is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one release end-to-end.
    ///
    /// A request arriving while another release runs is answered with a busy
    /// notification and dropped. Every other outcome produces exactly one
    /// terminal notification; the returned result mirrors it for callers
    /// that care about exit codes.
    pub async fn handle_request(&self, request: ReleaseRequest) -> Result<()> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.notify(
                &request,
                "⚠️ A release is already in progress. Please wait for it to finish.",
            )
            .await;
            return Err(ReleaseError::AlreadyRunning);
        }
        let _idle_on_exit = IdleGuard {
            running: &self.running,
        };

        match self.run_pipeline(&request).await {
            Ok(summary) => {
                self.notify(&request, &summary).await;
                Ok(())
            }
            Err(err) => {
                log::error!("Release failed: {err}");
                self.notify(&request, &format!("❌ Release failed\nError: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    async fn run_pipeline(&self, request: &ReleaseRequest) -> Result<String> {
        let environment: Environment = request.environment.parse()?;
        let config = environment.release_config(&self.settings);
        let runner = self.runner.as_ref();

        self.notify(request, &starting_banner(request, environment))
            .await;

        self.notify(
            request,
            &format!("🌿 Syncing branch `{}`...", config.branch),
        )
        .await;
        GitClient::new(runner).sync_branch(&config.branch).await?;

        let bumper = VersionBumper::new(runner);
        let build_number = match &request.version {
            Some(version) => {
                self.notify(
                    request,
                    &format!(
                        "🏷️ Bumping version to {version} (build: {})...",
                        request.build_number.as_deref().unwrap_or("auto-increment")
                    ),
                )
                .await;
                bumper
                    .bump(version, request.build_number.as_deref(), &config.branch)
                    .await?
            }
            None => {
                self.notify(request, "🔢 Reading current build number...").await;
                bumper.current_build_number().await?
            }
        };

        self.notify(
            request,
            &format!(
                "🏗️ Building archive for {} (build {build_number})...",
                config.scheme
            ),
        )
        .await;
        let archive_path = ArchiveBuilder::new(runner, &self.settings.project_root)
            .build(config.scheme, config.configuration)
            .await?;

        let mode = DeliveryMode::for_credentials(self.settings.app_store.configured());
        let exporter = Exporter::new(runner, &self.settings.project_root);
        match mode {
            DeliveryMode::Upload => {
                self.notify(request, "✈️ Exporting and uploading via xcodebuild...")
                    .await;
                exporter
                    .export_and_upload(&archive_path, config.export_method)
                    .await?;
            }
            DeliveryMode::Export => {
                self.notify(request, "📦 Exporting artifact for manual upload...")
                    .await;
                let artifact = exporter
                    .export_artifact(&archive_path, config.export_method)
                    .await?;
                exporter.upload(&artifact).await?;
            }
        }

        Ok(success_summary(request, environment, config.scheme, &build_number, mode))
    }

    /// Best-effort notification; delivery failures never abort the pipeline
    async fn notify(&self, request: &ReleaseRequest, text: &str) {
        if let Err(err) = self
            .notifier
            .post_message(&request.channel, text, request.thread.as_deref())
            .await
        {
            log::warn!("Failed to send status notification: {err}");
        }
    }
}

fn starting_banner(request: &ReleaseRequest, environment: Environment) -> String {
    let version = request
        .version
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "current".to_string());
    let build = request.build_number.as_deref().unwrap_or("auto-increment");
    format!(
        "🚀 Starting release to {}\nUser: <@{}>\nTarget version: {version}\nTarget build: {build}",
        environment.as_str().to_uppercase(),
        request.user
    )
}

fn success_summary(
    request: &ReleaseRequest,
    environment: Environment,
    scheme: &str,
    build_number: &str,
    mode: DeliveryMode,
) -> String {
    let version = request
        .version
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "current".to_string());
    format!(
        "✅ Release complete!\nEnvironment: {environment}\nVersion: {version}\nBuild: {build_number}\nScheme: {scheme}\nDelivery: {}",
        mode.describe()
    )
}
