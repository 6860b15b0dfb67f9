//! Shared test utilities

#![allow(dead_code, unused_imports)]

mod git_repo;
mod mock_platform;
mod mock_tracker;

pub use git_repo::TempGitRepo;
pub use mock_platform::{CreatePrCall, MockPlatformService, github_config, make_pr, make_series_pr};
pub use mock_tracker::MockTracker;
pub use mock_tree::{MockNotifier, MockWorkingTree, TreeCall};

use patchbridge::config::{RepoDetails, RepoProfile};
use patchbridge::filter::RelevanceFilter;
use patchbridge::reconcile::{Reconciler, RunOptions, RunSummary};
use patchbridge::error::Result;
use std::path::Path;
use tempfile::TempDir;

/// Unified diff touching one existing file
pub fn diff_for(path: &str) -> String {
    format!(
        "diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n@@ -1 +1 @@\n-old\n+new\n"
    )
}

/// Compiled "kernel" profile from raw patterns
pub fn profile(include: &[&str], exclude: &[&str]) -> RepoProfile {
    RepoProfile::compile(
        "kernel",
        &RepoDetails {
            include: include.iter().map(ToString::to_string).collect(),
            exclude: exclude.iter().map(ToString::to_string).collect(),
        },
    )
    .unwrap()
}

/// Every collaborator of a reconciliation run, mocked
///
/// The source directory is a real temp dir so the tree-probing fallback of
/// the relevance filter can be exercised with [`Harness::touch`].
pub struct Harness {
    pub tracker: MockTracker,
    pub platform: MockPlatformService,
    pub tree: MockWorkingTree,
    pub notifier: MockNotifier,
    pub filter: RelevanceFilter,
    pub source: TempDir,
    pub patch_dir: TempDir,
}

impl Harness {
    /// Harness whose profile includes "Bluetooth:" and excludes "BlueZ"
    pub fn new() -> Self {
        Self::with_profile(profile(&["Bluetooth:"], &["BlueZ"]))
    }

    pub fn with_profile(profile: RepoProfile) -> Self {
        let source = TempDir::new().unwrap();
        Self {
            tracker: MockTracker::new(),
            platform: MockPlatformService::with_config(github_config()),
            tree: MockWorkingTree::new(),
            notifier: MockNotifier::new(),
            filter: RelevanceFilter::new(profile, source.path()),
            source,
            patch_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a file in the source tree
    pub fn touch(&self, relative: &str) {
        let path = self.source.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "old\n").unwrap();
    }

    pub fn source_dir(&self) -> &Path {
        self.source.path()
    }

    /// Run the engine once with default options
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with(RunOptions::default()).await
    }

    /// Run the engine once
    pub async fn run_with(&self, options: RunOptions) -> Result<RunSummary> {
        Reconciler::new(
            &self.tracker,
            &self.platform,
            &self.tree,
            &self.notifier,
            &self.filter,
            options,
        )
        .run(self.patch_dir.path())
        .await
    }
}
