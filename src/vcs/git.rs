//! `git` executable backend

use super::{VcsClient, VcsProvider};
use crate::config::VcsConfig;
use crate::core::models::RepositoryRecord;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// Runs git commands inside one working tree
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
    root: PathBuf,
    author_name: Option<String>,
    author_email: Option<String>,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>, config: &VcsConfig) -> Self {
        Self {
            binary: config.git_binary.clone(),
            root: root.into(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.current_dir(&self.root);
        if let Some(name) = &self.author_name {
            command.args(["-c", &format!("user.name={}", name)]);
        }
        if let Some(email) = &self.author_email {
            command.args(["-c", &format!("user.email={}", email)]);
        }
        command
    }

    /// Run git with `args` and return stdout; a non-zero exit is an error
    /// carrying stderr.
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        debug!("git {} in {}", args.join(" "), self.root.display());
        let output = self.command().args(args).output().await?;

        if !output.status.success() {
            return Err(PipelineError::vcs(format!(
                "git {} failed ({}): {}",
                args.first().unwrap_or(&""),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl VcsClient for GitCli {
    async fn read_blob(&self, sha: &str) -> Result<Vec<u8>> {
        self.run(&["cat-file", "blob", sha]).await
    }

    async fn stage(&self, path: &str) -> Result<()> {
        self.run(&["add", "--", path]).await.map(|_| ())
    }

    async fn has_pending_changes(&self, path: &str) -> Result<bool> {
        let stdout = self
            .run(&["status", "--porcelain", "--untracked-files=all", "--", path])
            .await?;
        Ok(!String::from_utf8_lossy(&stdout).trim().is_empty())
    }

    async fn commit(&self, message: &str, path: &str) -> Result<()> {
        self.run(&["commit", "--only", "-m", message, "--", path])
            .await
            .map(|_| ())
    }
}

/// Builds a `GitCli` rooted at each repository's local path
#[derive(Debug, Clone, Default)]
pub struct GitProvider {
    config: VcsConfig,
}

impl GitProvider {
    pub fn new(config: VcsConfig) -> Self {
        Self { config }
    }
}

impl VcsProvider for GitProvider {
    fn client(&self, repository: &RepositoryRecord) -> Option<Arc<dyn VcsClient>> {
        let root = Path::new(&repository.local_path);
        if !root.is_dir() {
            return None;
        }
        Some(Arc::new(GitCli::new(root, &self.config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_requires_existing_checkout() {
        let provider = GitProvider::default();
        let missing = RepositoryRecord {
            id: 1,
            name: "gone".to_string(),
            local_path: "/nonexistent/lexflow/checkout".to_string(),
        };
        assert!(provider.client(&missing).is_none());

        let dir = tempfile::tempdir().unwrap();
        let present = RepositoryRecord {
            id: 2,
            name: "here".to_string(),
            local_path: dir.path().to_string_lossy().to_string(),
        };
        assert!(provider.client(&present).is_some());
    }

    #[tokio::test]
    async fn test_failed_command_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::new(dir.path(), &VcsConfig::default());
        // not a repository, or no git at all; either way an error
        let result = git.read_blob("0000000000000000000000000000000000000000").await;
        assert!(result.is_err());
    }
}
