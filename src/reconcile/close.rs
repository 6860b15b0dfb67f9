//! Closing pass - converge open PRs to the active series set
//!
//! Planning is pure; execution closes each planned PR as its own unit of
//! work, so one failed close never stops the others.

use crate::platform::{PlatformService, parse_series_tag};
use crate::types::{PullRequest, SeriesIndex};
use tracing::{debug, info, warn};

/// Outcome of the closing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosePassResult {
    /// PRs closed (or, in a dry run, that would have been closed)
    pub closed: Vec<u64>,
    /// PRs whose close failed, with the error
    pub failed: Vec<(u64, String)>,
}

/// Open PRs whose series is no longer active (PURE).
///
/// PRs without a parseable series tag are never touched.
pub fn plan_closures<'a>(open: &'a [PullRequest], active: &SeriesIndex) -> Vec<&'a PullRequest> {
    open.iter()
        .filter(|pr| match parse_series_tag(&pr.title) {
            Some(sid) if active.contains_key(&sid) => {
                debug!(pr_number = pr.number, series_id = sid, "series still active, keep PR");
                false
            }
            Some(sid) => {
                info!(pr_number = pr.number, series_id = sid, "series no longer active");
                true
            }
            None => {
                debug!(pr_number = pr.number, title = %pr.title, "no series tag, leave PR");
                false
            }
        })
        .collect()
}

/// Close every planned PR and delete its branch (EFFECTFUL)
pub async fn execute_closures(
    plan: &[&PullRequest],
    platform: &dyn PlatformService,
    dry_run: bool,
) -> ClosePassResult {
    let mut result = ClosePassResult::default();

    for pr in plan {
        if dry_run {
            info!(pr_number = pr.number, "dry run, skip closing PR");
            result.closed.push(pr.number);
            continue;
        }

        match platform.close_pr_and_delete_branch(pr).await {
            Ok(()) => result.closed.push(pr.number),
            Err(e) => {
                warn!(pr_number = pr.number, error = %e, "failed to close PR");
                result.failed.push((pr.number, e.to_string()));
            }
        }
    }

    result
}
