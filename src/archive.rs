//! Archive production via xcodebuild.

use crate::command::CommandRunner;
use crate::error::{ArtifactError, Result};
use std::path::{Path, PathBuf};

/// Workspace descriptor probed first
pub const WORKSPACE_DESCRIPTOR: &str = "iosApp.xcworkspace";
/// Project descriptor probed when no workspace exists
pub const PROJECT_DESCRIPTOR: &str = "iosApp.xcodeproj";

/// Builds a signed archive for a scheme/configuration pair
pub struct ArchiveBuilder<'a> {
    runner: &'a dyn CommandRunner,
    project_root: &'a Path,
}

impl<'a> ArchiveBuilder<'a> {
    /// Create a builder rooted at the iOS project checkout
    pub fn new(runner: &'a dyn CommandRunner, project_root: &'a Path) -> Self {
        Self {
            runner,
            project_root,
        }
    }

    /// Produce an archive, returning its path.
    ///
    /// Fails with an artifact error when neither descriptor exists; any
    /// non-zero xcodebuild exit aborts the release.
    pub async fn build(&self, scheme: &str, configuration: &str) -> Result<PathBuf> {
        let build_dir = self.project_root.join("build");
        let archive_path = build_dir.join(format!("{scheme}.xcarchive"));
        tokio::fs::create_dir_all(&build_dir).await?;

        let (source_flag, descriptor) = locate_source_descriptor(self.project_root).await?;

        let archive_arg = archive_path.to_string_lossy().into_owned();
        self.runner
            .run(
                "xcodebuild",
                &[
                    source_flag,
                    descriptor,
                    "-scheme",
                    scheme,
                    "-configuration",
                    configuration,
                    "-archivePath",
                    &archive_arg,
                    "archive",
                    "-allowProvisioningUpdates",
                ],
            )
            .await?;

        Ok(archive_path)
    }
}

/// Pick the xcodebuild source flag: workspace first, then project
async fn locate_source_descriptor(root: &Path) -> Result<(&'static str, &'static str)> {
    if path_exists(&root.join(WORKSPACE_DESCRIPTOR)).await {
        return Ok(("-workspace", WORKSPACE_DESCRIPTOR));
    }
    if path_exists(&root.join(PROJECT_DESCRIPTOR)).await {
        return Ok(("-project", PROJECT_DESCRIPTOR));
    }
    Err(ArtifactError::ProjectDescriptorMissing {
        workspace: WORKSPACE_DESCRIPTOR.to_string(),
        project: PROJECT_DESCRIPTOR.to_string(),
        root: root.to_path_buf(),
    }
    .into())
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn workspace_descriptor_wins_when_both_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(WORKSPACE_DESCRIPTOR)).unwrap();
        std::fs::create_dir(dir.path().join(PROJECT_DESCRIPTOR)).unwrap();

        let (flag, descriptor) = locate_source_descriptor(dir.path()).await.unwrap();
        assert_eq!(flag, "-workspace");
        assert_eq!(descriptor, WORKSPACE_DESCRIPTOR);
    }

    #[tokio::test]
    async fn project_descriptor_is_the_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(PROJECT_DESCRIPTOR)).unwrap();

        let (flag, descriptor) = locate_source_descriptor(dir.path()).await.unwrap();
        assert_eq!(flag, "-project");
        assert_eq!(descriptor, PROJECT_DESCRIPTOR);
    }

    #[tokio::test]
    async fn missing_descriptors_fail_with_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_source_descriptor(dir.path()).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains(WORKSPACE_DESCRIPTOR));
        assert!(text.contains(PROJECT_DESCRIPTOR));
    }
}
