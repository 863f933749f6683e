//! Version control collaborators
//!
//! The patch engine only needs four operations from a repository; `GitCli`
//! provides them by driving the `git` executable.

mod git;

pub use git::{GitCli, GitProvider};

use crate::core::models::RepositoryRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations on one working tree
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Raw content of a blob by object id
    async fn read_blob(&self, sha: &str) -> Result<Vec<u8>>;

    /// Stage a path relative to the repository root
    async fn stage(&self, path: &str) -> Result<()>;

    /// Whether `path` differs from `HEAD` in the index or the working tree
    async fn has_pending_changes(&self, path: &str) -> Result<bool>;

    /// Commit `path` alone, leaving anything else staged untouched
    async fn commit(&self, message: &str, path: &str) -> Result<()>;
}

/// Hands out a client for a repository's working tree
#[cfg_attr(test, mockall::automock)]
pub trait VcsProvider: Send + Sync {
    fn client(&self, repository: &RepositoryRecord) -> Option<Arc<dyn VcsClient>>;
}
