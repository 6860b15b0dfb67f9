//! Temporary git repository for working tree tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Scratch git repository with one commit on `main`
pub struct TempGitRepo {
    dir: TempDir,
}

impl TempGitRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Self { dir };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.commit_file("file.txt", "line 1\nline 2\n", "initial commit");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the repository, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Write `content` to `file` and commit it on the current branch
    pub fn commit_file(&self, file: &str, content: &str, message: &str) {
        std::fs::write(self.path().join(file), content).unwrap();
        self.git(&["add", file]);
        self.git(&["commit", "-q", "-m", message]);
    }

    /// Build a mailbox patch changing `file` on top of `main`, without
    /// leaving the commit in the repository
    pub fn make_mailbox(&self, file: &str, content: &str, subject: &str, out: &Path) -> PathBuf {
        self.git(&["checkout", "-q", "-b", "scratch", "main"]);
        self.commit_file(file, content, subject);
        let mbox = self.git(&["format-patch", "-1", "--stdout"]);
        self.git(&["checkout", "-q", "main"]);
        self.git(&["branch", "-q", "-D", "scratch"]);

        let path = out.join("0001.patch");
        std::fs::write(&path, mbox).unwrap();
        path
    }

    /// Current branch name
    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).trim().to_string()
    }

    /// Subject of the HEAD commit
    pub fn head_subject(&self) -> String {
        self.git(&["log", "-1", "--format=%s"]).trim().to_string()
    }

    /// Whether `git status --porcelain` reports nothing
    pub fn is_clean(&self) -> bool {
        self.git(&["status", "--porcelain"]).trim().is_empty()
    }

    /// Create a bare repository next to this one and add it as `origin`
    pub fn add_bare_remote(&self) -> TempDir {
        let remote = TempDir::new().unwrap();
        let status = Command::new("git")
            .args(["init", "-q", "--bare"])
            .current_dir(remote.path())
            .status()
            .unwrap();
        assert!(status.success());
        let url = remote.path().to_string_lossy().into_owned();
        self.git(&["remote", "add", "origin", &url]);
        remote
    }
}
