//! Archive export and delivery.
//!
//! A fresh export options descriptor is written before every export. Delivery
//! runs in one of two modes: with App Store Connect credentials configured,
//! xcodebuild uploads the build itself; without them the archive is exported
//! to a local artifact for a separate upload step.

use crate::command::CommandRunner;
use crate::error::{ArtifactError, ReleaseError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extension of the distributable artifact produced by export
const ARTIFACT_EXTENSION: &str = "ipa";

/// How the exported build leaves the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// xcodebuild delivers the build directly during export
    Upload,
    /// Export a local artifact, upload separately
    Export,
}

impl DeliveryMode {
    /// Select the mode from the credential presence signal
    pub fn for_credentials(configured: bool) -> Self {
        if configured {
            DeliveryMode::Upload
        } else {
            DeliveryMode::Export
        }
    }

    /// Destination value written into the export options descriptor
    pub fn destination(&self) -> &'static str {
        match self {
            DeliveryMode::Upload => "upload",
            DeliveryMode::Export => "export",
        }
    }

    /// Human-readable delivery route for the success summary
    pub fn describe(&self) -> &'static str {
        match self {
            DeliveryMode::Upload => "uploaded directly by xcodebuild",
            DeliveryMode::Export => "exported locally for manual upload",
        }
    }
}

/// Export options descriptor, serialized as an XML property list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Export method (e.g. app-store)
    pub method: String,
    /// Destination: upload or export
    pub destination: String,
    /// Signing style; always automatic
    pub signing_style: String,
    /// Strip Swift symbols from the payload
    pub strip_swift_symbols: bool,
    /// Bitcode compilation; always off
    pub compile_bitcode: bool,
}

impl ExportOptions {
    /// Options for one export run
    pub fn new(method: &str, mode: DeliveryMode) -> Self {
        Self {
            method: method.to_string(),
            destination: mode.destination().to_string(),
            signing_style: "automatic".to_string(),
            strip_swift_symbols: true,
            compile_bitcode: false,
        }
    }
}

/// Exports an archive and locates the resulting artifact
pub struct Exporter<'a> {
    runner: &'a dyn CommandRunner,
    project_root: &'a Path,
}

impl<'a> Exporter<'a> {
    /// Create an exporter rooted at the iOS project checkout
    pub fn new(runner: &'a dyn CommandRunner, project_root: &'a Path) -> Self {
        Self {
            runner,
            project_root,
        }
    }

    /// Export with destination `upload`: xcodebuild delivers the build
    /// itself, so a missing local artifact is expected and not an error.
    pub async fn export_and_upload(&self, archive_path: &Path, method: &str) -> Result<()> {
        self.export_with(archive_path, method, DeliveryMode::Upload)
            .await?;
        Ok(())
    }

    /// Export with destination `export`, returning the local artifact for a
    /// separate upload step. No artifact after a successful export is an
    /// artifact error.
    pub async fn export_artifact(&self, archive_path: &Path, method: &str) -> Result<PathBuf> {
        match self
            .export_with(archive_path, method, DeliveryMode::Export)
            .await?
        {
            Some(path) => Ok(path),
            None => Err(ArtifactError::ExportedArtifactMissing {
                extension: ARTIFACT_EXTENSION.to_string(),
                dir: self.project_root.join("build").join("output"),
            }
            .into()),
        }
    }

    /// Write a fresh options descriptor, run the export, and look for the
    /// produced artifact. Artifact-presence policy belongs to the callers.
    async fn export_with(
        &self,
        archive_path: &Path,
        method: &str,
        mode: DeliveryMode,
    ) -> Result<Option<PathBuf>> {
        let export_dir = self.project_root.join("build").join("output");
        tokio::fs::create_dir_all(&export_dir).await?;

        let options_path = export_dir.join("ExportOptions.plist");
        let options = ExportOptions::new(method, mode);
        plist::to_file_xml(&options_path, &options)?;

        let archive_arg = archive_path.to_string_lossy().into_owned();
        let options_arg = options_path.to_string_lossy().into_owned();
        let export_arg = export_dir.to_string_lossy().into_owned();
        self.runner
            .run(
                "xcodebuild",
                &[
                    "-exportArchive",
                    "-archivePath",
                    &archive_arg,
                    "-exportOptionsPlist",
                    &options_arg,
                    "-exportPath",
                    &export_arg,
                    "-allowProvisioningUpdates",
                ],
            )
            .await?;

        locate_artifact(&export_dir, ARTIFACT_EXTENSION).await
    }

    /// Upload a locally exported artifact to App Store Connect.
    ///
    /// Deliberately unsupported: the API-key transporter flow is not built,
    /// so the manual delivery mode always fails here.
    pub async fn upload(&self, _artifact: &Path) -> Result<()> {
        Err(ReleaseError::UploadNotImplemented)
    }
}

/// Find the first file with the given extension in a directory
async fn locate_artifact(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == extension) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_serializes_the_expected_plist_keys() {
        let options = ExportOptions::new("app-store", DeliveryMode::Upload);
        let mut buffer = Vec::new();
        plist::to_writer_xml(&mut buffer, &options).unwrap();
        let xml = String::from_utf8(buffer).unwrap();

        assert!(xml.contains("<key>method</key>"));
        assert!(xml.contains("<string>app-store</string>"));
        assert!(xml.contains("<key>destination</key>"));
        assert!(xml.contains("<string>upload</string>"));
        assert!(xml.contains("<key>signingStyle</key>"));
        assert!(xml.contains("<string>automatic</string>"));
        assert!(xml.contains("<key>stripSwiftSymbols</key>"));
        assert!(xml.contains("<true/>"));
        assert!(xml.contains("<key>compileBitcode</key>"));
        assert!(xml.contains("<false/>"));
    }

    #[test]
    fn export_mode_writes_export_destination() {
        let options = ExportOptions::new("app-store", DeliveryMode::Export);
        assert_eq!(options.destination, "export");
    }

    #[test]
    fn credential_signal_selects_the_mode() {
        assert_eq!(DeliveryMode::for_credentials(true), DeliveryMode::Upload);
        assert_eq!(DeliveryMode::for_credentials(false), DeliveryMode::Export);
    }

    #[tokio::test]
    async fn artifact_lookup_matches_extension_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ExportOptions.plist"), "<plist/>").unwrap();
        std::fs::write(dir.path().join("Terra.ipa"), "binary").unwrap();

        let found = locate_artifact(dir.path(), "ipa").await.unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "Terra.ipa");
    }

    #[tokio::test]
    async fn artifact_lookup_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ExportOptions.plist"), "<plist/>").unwrap();
        assert!(locate_artifact(dir.path(), "ipa").await.unwrap().is_none());
    }
}
