//! Marketing-version and build-number management via agvtool.

use crate::command::CommandRunner;
use crate::error::Result;
use crate::git::GitClient;
use semver::Version;

/// Applies version metadata changes and reads back the build number
pub struct VersionBumper<'a> {
    runner: &'a dyn CommandRunner,
    git: GitClient<'a>,
}

impl<'a> VersionBumper<'a> {
    /// Create a bumper over the given runner
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            git: GitClient::new(runner),
        }
    }

    /// Set the marketing version, set or increment the build number, and
    /// commit the metadata change.
    ///
    /// Returns the resulting build number read back from agvtool as the
    /// authoritative value. Commit/push failures are logged and swallowed:
    /// the bump is already on disk and the build proceeds with local
    /// metadata. An empty `git status` skips the commit entirely.
    pub async fn bump(
        &self,
        version: &Version,
        explicit_build: Option<&str>,
        branch: &str,
    ) -> Result<String> {
        self.runner
            .run(
                "xcrun",
                &["agvtool", "new-marketing-version", &version.to_string()],
            )
            .await?;

        match explicit_build {
            Some(build) => {
                self.runner
                    .run("xcrun", &["agvtool", "new-version", "-all", build])
                    .await?;
            }
            None => {
                self.runner
                    .run("xcrun", &["agvtool", "next-version", "-all"])
                    .await?;
            }
        }

        let build_number = self.current_build_number().await?;

        self.git.stage_all().await?;
        if let Err(err) = self.commit_and_push(version, &build_number, branch).await {
            log::warn!("Version bump commit/push failed, continuing with local metadata: {err}");
        }

        Ok(build_number)
    }

    /// Read the current build number without mutating anything
    pub async fn current_build_number(&self) -> Result<String> {
        let raw = self
            .runner
            .run("xcrun", &["agvtool", "what-version", "-terse"])
            .await?;
        Ok(raw.trim().to_string())
    }

    async fn commit_and_push(&self, version: &Version, build: &str, branch: &str) -> Result<()> {
        let status = self.git.status_porcelain().await?;
        if status.trim().is_empty() {
            log::warn!("No version metadata changes to commit");
            return Ok(());
        }

        let message = format!("chore: bump version to {version} (build {build})");
        self.git.commit(&message).await?;
        self.git.push(branch).await?;
        Ok(())
    }
}
