//! Source-control operations over the command runner.

use crate::command::CommandRunner;
use crate::error::Result;

/// Narrow git client for release workflows
pub struct GitClient<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> GitClient<'a> {
    /// Create a git client over the given runner
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Bring the working tree to the tip of `branch`.
    ///
    /// Stash, fetch, checkout, and pull run strictly in order; the first
    /// failure aborts. Stash and checkout are best-effort cleanliness, not a
    /// transaction: nothing is rolled back on a later failure.
    pub async fn sync_branch(&self, branch: &str) -> Result<()> {
        self.runner.run("git", &["stash"]).await?;
        self.runner.run("git", &["fetch", "origin", branch]).await?;
        self.runner.run("git", &["checkout", branch]).await?;
        self.runner.run("git", &["pull", "origin", branch]).await?;
        Ok(())
    }

    /// Stage all working-tree changes
    pub async fn stage_all(&self) -> Result<()> {
        self.runner.run("git", &["add", "."]).await?;
        Ok(())
    }

    /// Machine-readable working-tree status; empty output means clean
    pub async fn status_porcelain(&self) -> Result<String> {
        self.runner.run("git", &["status", "--porcelain"]).await
    }

    /// Commit staged changes
    pub async fn commit(&self, message: &str) -> Result<()> {
        self.runner.run("git", &["commit", "-m", message]).await?;
        Ok(())
    }

    /// Push the branch to origin
    pub async fn push(&self, branch: &str) -> Result<()> {
        self.runner.run("git", &["push", "origin", branch]).await?;
        Ok(())
    }
}
