//! Platform services for the pull-request forge
//!
//! Provides the forge interface used by the reconciliation engine, the
//! series tag linking a pull request to its series, and the run-scoped
//! cache of open pull requests.

mod github;
mod open_prs;
mod tag;

pub use github::GitHubService;
pub use open_prs::OpenPullRequests;
pub use tag::{SERIES_TAG_PREFIX, parse_series_tag, series_pr_title};

use crate::error::Result;
use crate::types::{PlatformConfig, PullRequest};
use async_trait::async_trait;
use tracing::{info, warn};

/// Platform service trait for PR operations
///
/// This trait abstracts the forge so the same reconciliation logic can be
/// driven against GitHub or a test double.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List every open PR of the repository, across all pages
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>>;

    /// Create a new PR
    async fn create_pr(&self, head: &str, base: &str, title: &str, body: &str)
    -> Result<PullRequest>;

    /// Set a PR to the closed state
    async fn close_pr(&self, pr_number: u64) -> Result<()>;

    /// Delete a branch of the repository
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;

    /// Close a PR, then delete its head branch.
    ///
    /// A failed branch deletion is logged and ignored: the head ref may
    /// already be gone. Implementors should override the two primitives,
    /// not this method.
    async fn close_pr_and_delete_branch(&self, pr: &PullRequest) -> Result<()> {
        self.close_pr(pr.number).await?;
        info!(pr_number = pr.number, "closed PR");

        match self.delete_branch(&pr.head_ref).await {
            Ok(()) => info!(branch = %pr.head_ref, "deleted branch"),
            Err(e) => warn!(branch = %pr.head_ref, error = %e, "failed to delete branch"),
        }
        Ok(())
    }
}
