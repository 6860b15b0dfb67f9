//! `git` command line implementation of the working tree

use crate::error::{Error, Result};
use crate::repo::{CommandOutput, WorkingTree};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Working tree driven through the `git` executable
#[derive(Debug, Clone)]
pub struct GitWorkingTree {
    root: PathBuf,
}

impl GitWorkingTree {
    /// Open the checkout at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Git(format!(
                "source directory {} does not exist",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(?args, dir = %self.root.display(), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git {}: {e}", args.join(" "))))?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            code = ?result.code,
            stdout = %result.stdout,
            stderr = %result.stderr,
            "git finished"
        );
        if !result.success() {
            warn!(?args, code = ?result.code, stderr = %result.stderr, "git command failed");
        }
        Ok(result)
    }
}

#[async_trait]
impl WorkingTree for GitWorkingTree {
    async fn checkout(&self, branch: &str, create_new: bool) -> Result<CommandOutput> {
        if create_new {
            self.git(&["checkout", "-B", branch]).await
        } else {
            self.git(&["checkout", branch]).await
        }
    }

    async fn apply_mailbox(&self, patch_file: &Path) -> Result<CommandOutput> {
        let path = patch_file.to_string_lossy();
        self.git(&["am", path.as_ref()]).await
    }

    async fn abort_apply(&self) -> Result<CommandOutput> {
        self.git(&["am", "--abort"]).await
    }

    async fn push(&self, remote: &str, branch: &str, force: bool) -> Result<CommandOutput> {
        if force {
            self.git(&["push", remote, branch, "--force"]).await
        } else {
            self.git(&["push", remote, branch]).await
        }
    }
}
