//! Scoped acquisition of the shared working tree

use crate::error::Result;
use crate::repo::WorkingTree;
use tracing::{debug, warn};

/// Exclusive use of the working tree on a fresh per-series branch.
///
/// Acquiring resets the tree to the base branch and creates the series
/// branch from it. [`release`](Self::release) switches back to the base
/// branch and must be called on every exit path, whatever the outcome of
/// the work done under the lease.
#[must_use = "a lease must be released to return the tree to the base branch"]
pub struct TreeLease<'a> {
    tree: &'a dyn WorkingTree,
    base: String,
    branch: String,
}

impl<'a> TreeLease<'a> {
    /// Check out `base`, then create `branch` from it.
    ///
    /// Returns `Ok(None)` if either checkout fails; the failure is logged
    /// with the captured git output.
    pub async fn acquire(
        tree: &'a dyn WorkingTree,
        base: &str,
        branch: &str,
    ) -> Result<Option<Self>> {
        let out = tree.checkout(base, false).await?;
        if !out.success() {
            warn!(base, stderr = %out.stderr, "failed to check out base branch");
            return Ok(None);
        }

        let out = tree.checkout(branch, true).await?;
        if !out.success() {
            warn!(branch, stderr = %out.stderr, "failed to create series branch");
            return Ok(None);
        }

        debug!(base, branch, "working tree leased");
        Ok(Some(Self {
            tree,
            base: base.to_string(),
            branch: branch.to_string(),
        }))
    }

    /// Series branch held by this lease
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Working tree held by this lease
    pub fn tree(&self) -> &'a dyn WorkingTree {
        self.tree
    }

    /// Return the tree to the base branch
    pub async fn release(self) {
        match self.tree.checkout(&self.base, false).await {
            Ok(out) if out.success() => debug!(base = %self.base, "working tree released"),
            Ok(out) => warn!(base = %self.base, stderr = %out.stderr, "failed to restore base branch"),
            Err(e) => warn!(base = %self.base, error = %e, "failed to restore base branch"),
        }
    }
}
