//! Working-tree driver
//!
//! Version-control primitives against the single shared source checkout.
//! Every primitive reports the exit status and captured output of the
//! underlying command; a non-zero status is an outcome, not an `Err`.
//! `Err` is reserved for commands that could not be run at all.

mod git;
mod lease;

pub use git::GitWorkingTree;
pub use lease::TreeLease;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Exit status and captured output of a version-control command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (`None` if terminated by a signal)
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with no captured text
    pub const fn ok() -> Self {
        Self {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given error text
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Working tree trait
///
/// Git operations are not reentrant against one directory; callers hold a
/// [`TreeLease`] for the whole apply-and-push span of a series.
#[async_trait]
pub trait WorkingTree: Send + Sync {
    /// Switch the tree to `branch`, creating (or resetting) it first if
    /// `create_new` is set
    async fn checkout(&self, branch: &str, create_new: bool) -> Result<CommandOutput>;

    /// Apply a patch in mailbox format on top of the current branch
    async fn apply_mailbox(&self, patch_file: &Path) -> Result<CommandOutput>;

    /// Abort an in-progress mailbox apply, restoring a clean tree
    async fn abort_apply(&self) -> Result<CommandOutput>;

    /// Publish a branch to a remote
    async fn push(&self, remote: &str, branch: &str, force: bool) -> Result<CommandOutput>;
}
