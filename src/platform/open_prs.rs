//! Run-scoped cache of open pull requests

use crate::error::Result;
use crate::platform::{PlatformService, parse_series_tag};
use crate::types::PullRequest;
use std::collections::HashMap;
use tracing::{debug, info};

/// Open pull requests of the target repository, fetched once per run.
///
/// Used both as the duplicate-creation guard and as the input of the
/// closing pass. PRs are indexed by the series tag parsed from their title,
/// so a title that merely mentions a tag somewhere else never counts.
#[derive(Debug, Clone, Default)]
pub struct OpenPullRequests {
    prs: Vec<PullRequest>,
    by_series: HashMap<u64, u64>,
}

impl OpenPullRequests {
    /// Fetch the open PR list from the platform
    pub async fn load(platform: &dyn PlatformService) -> Result<Self> {
        let prs = platform.list_open_prs().await?;
        info!(
            repo = %platform.config(),
            count = prs.len(),
            "loaded open pull requests"
        );
        Ok(Self::from_prs(prs))
    }

    /// Build the cache from an already fetched list
    pub fn from_prs(prs: Vec<PullRequest>) -> Self {
        let mut by_series = HashMap::new();
        for pr in &prs {
            match parse_series_tag(&pr.title) {
                Some(sid) => {
                    by_series.entry(sid).or_insert(pr.number);
                }
                None => debug!(pr_number = pr.number, title = %pr.title, "PR has no series tag"),
            }
        }
        Self { prs, by_series }
    }

    /// PR number of the open PR for a series
    pub fn pr_for_series(&self, series_id: u64) -> Option<u64> {
        self.by_series.get(&series_id).copied()
    }

    /// Record a PR created during this run
    pub fn insert(&mut self, pr: PullRequest) {
        if let Some(sid) = parse_series_tag(&pr.title) {
            self.by_series.entry(sid).or_insert(pr.number);
        }
        self.prs.push(pr);
    }

    /// All open PRs, in listing order
    pub fn all(&self) -> &[PullRequest] {
        &self.prs
    }

    /// Number of open PRs
    pub fn len(&self) -> usize {
        self.prs.len()
    }

    /// Whether there are no open PRs
    pub fn is_empty(&self) -> bool {
        self.prs.is_empty()
    }
}
