//! Reconciliation engine
//!
//! One run:
//! 1. Discover - build the `SeriesIndex` from patches in the target states
//! 2. Process - per series, in ascending ID order: skip, or apply its
//!    patches on a fresh branch, report checks, then notify or open a PR
//! 3. Close - close open PRs whose series is no longer in the index
//!
//! Override flags (`dry_run`, `skip_check_upload`, `ignore_check`) only gate
//! side effects; decisions and logging are identical in every mode.

mod close;
mod discover;

pub use close::{ClosePassResult, execute_closures, plan_closures};
pub use discover::{build_series_index, referenced_series};

use crate::config::DEFAULT_CHECK_CONTEXT;
use crate::error::Result;
use crate::filter::{Relevance, RelevanceFilter};
use crate::notify::{FailureReport, Notifier};
use crate::platform::{OpenPullRequests, PlatformService, series_pr_title};
use crate::repo::{TreeLease, WorkingTree};
use crate::tracker::TrackerService;
use crate::types::{CheckOutcome, CheckReport, CheckState, Patch, Series};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{Instrument, info, info_span, warn};

/// Options for one reconciliation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Tracker patch states to query
    pub states: Vec<String>,
    /// Branch PRs target and series branches start from
    pub base_branch: String,
    /// Remote series branches are pushed to
    pub remote: String,
    /// Overwrite a series branch left on the remote by an earlier run
    pub force_push: bool,
    /// Check context label
    pub check_context: String,
    /// Process series even if their first patch was already checked
    pub ignore_check: bool,
    /// Do not post checks to the tracker
    pub skip_check_upload: bool,
    /// Rehearse: no checks, emails, pushes, PR creation or closing
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            states: vec!["1".to_string(), "2".to_string()],
            base_branch: "workflow".to_string(),
            remote: "origin".to_string(),
            force_push: true,
            check_context: DEFAULT_CHECK_CONTEXT.to_string(),
            ignore_check: false,
            skip_check_upload: false,
            dry_run: false,
        }
    }
}

/// Why a series was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Series has no patches
    NoPatches,
    /// First patch already has a check state
    AlreadyChecked(CheckState),
    /// Series does not belong to the repository variant
    NotRelevant(Relevance),
    /// An open PR already exists for the series
    PrExists(u64),
    /// The working tree could not be switched to the series branch
    CheckoutFailed,
}

/// What happened after a series applied cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    /// Branch pushed and PR opened
    Opened(u64),
    /// Dry run, nothing pushed
    DryRun,
    /// Push failed, no PR opened
    PushFailed,
}

/// Terminal state of one series in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesOutcome {
    /// Not applied
    Skipped(SkipReason),
    /// Every patch applied
    Applied(Publication),
    /// A patch failed to apply
    Failed {
        /// First patch that failed
        patch_id: u64,
    },
    /// A transport or I/O error aborted the series
    Errored(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPatches => write!(f, "no patches"),
            Self::AlreadyChecked(state) => write!(f, "already checked ({state})"),
            Self::NotRelevant(relevance) => write!(f, "not for this repository: {relevance}"),
            Self::PrExists(number) => write!(f, "PR #{number} already open"),
            Self::CheckoutFailed => write!(f, "checkout failed"),
        }
    }
}

impl std::fmt::Display for SeriesOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Applied(Publication::Opened(number)) => write!(f, "applied, opened PR #{number}"),
            Self::Applied(Publication::DryRun) => write!(f, "applied (dry run)"),
            Self::Applied(Publication::PushFailed) => write!(f, "applied, push failed"),
            Self::Failed { patch_id } => write!(f, "failed to apply patch {patch_id}"),
            Self::Errored(e) => write!(f, "error: {e}"),
        }
    }
}

/// Result of a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Outcome per series ID
    pub outcomes: BTreeMap<u64, SeriesOutcome>,
    /// PRs opened during the run
    pub created: Vec<u64>,
    /// Result of the closing pass
    pub close_pass: ClosePassResult,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&SeriesOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|o| pred(o)).count()
    }

    /// Number of series applied cleanly
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, SeriesOutcome::Applied(_)))
    }

    /// Number of series that failed to apply
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SeriesOutcome::Failed { .. }))
    }

    /// Number of series skipped
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SeriesOutcome::Skipped(_)))
    }

    /// Number of series aborted by an error
    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, SeriesOutcome::Errored(_)))
    }
}

/// Verdict of applying every patch of a series
enum ApplyVerdict {
    Applied,
    Failed(FailureReport),
}

/// Reconciliation engine
///
/// Holds the collaborators of a run explicitly so tests can substitute
/// every one of them.
pub struct Reconciler<'a> {
    tracker: &'a dyn TrackerService,
    platform: &'a dyn PlatformService,
    tree: &'a dyn WorkingTree,
    notifier: &'a dyn Notifier,
    filter: &'a RelevanceFilter,
    options: RunOptions,
}

impl<'a> Reconciler<'a> {
    /// Create an engine over the given collaborators
    pub fn new(
        tracker: &'a dyn TrackerService,
        platform: &'a dyn PlatformService,
        tree: &'a dyn WorkingTree,
        notifier: &'a dyn Notifier,
        filter: &'a RelevanceFilter,
        options: RunOptions,
    ) -> Self {
        Self {
            tracker,
            platform,
            tree,
            notifier,
            filter,
            options,
        }
    }

    /// Execute one full run.
    ///
    /// Mailbox files are written under `patch_dir`. Only discovery and the
    /// initial PR listing can fail the run; per-series and per-PR failures
    /// are recorded in the summary.
    pub async fn run(&self, patch_dir: &Path) -> Result<RunSummary> {
        let mut open_prs = OpenPullRequests::load(self.platform).await?;
        let mut index = build_series_index(self.tracker, &self.options.states).await?;
        let mut summary = RunSummary::default();

        for (&id, series) in &mut index {
            let outcome = match self
                .process_series(series, &mut open_prs, patch_dir)
                .instrument(info_span!("series", series_id = id))
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(series_id = id, transport = e.is_transport(), error = %e, "series aborted");
                    SeriesOutcome::Errored(e.to_string())
                }
            };
            info!(series_id = id, ?outcome, "series done");

            if let SeriesOutcome::Applied(Publication::Opened(number)) = outcome {
                summary.created.push(number);
            }
            summary.outcomes.insert(id, outcome);
        }

        let plan = plan_closures(open_prs.all(), &index);
        summary.close_pass = execute_closures(&plan, self.platform, self.options.dry_run).await;

        info!(
            applied = summary.applied(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            errored = summary.errored(),
            closed = summary.close_pass.closed.len(),
            "run complete"
        );
        Ok(summary)
    }

    async fn process_series(
        &self,
        series: &mut Series,
        open_prs: &mut OpenPullRequests,
        patch_dir: &Path,
    ) -> Result<SeriesOutcome> {
        let Some(first_ref) = series.patches.first() else {
            warn!("series has no patches");
            return Ok(SeriesOutcome::Skipped(SkipReason::NoPatches));
        };

        let first = self.tracker.fetch_patch(first_ref.id).await?;
        if !self.options.ignore_check && first.check_state != CheckState::Pending {
            info!(check = %first.check_state, "series is already checked");
            return Ok(SeriesOutcome::Skipped(SkipReason::AlreadyChecked(
                first.check_state,
            )));
        }

        if series.normalize_name() {
            info!(name = series.display_name(), "series name taken from first patch");
        }

        let relevance = match self.filter.match_name(series.display_name()) {
            Some(verdict) => verdict,
            None => {
                let patches = self.fetch_patches(series, &first).await?;
                self.filter.match_tree(&patches)
            }
        };
        if !relevance.is_relevant() {
            info!(variant = self.filter.variant(), %relevance, "series is not for this repository");
            return Ok(SeriesOutcome::Skipped(SkipReason::NotRelevant(relevance)));
        }

        if let Some(pr_number) = open_prs.pr_for_series(series.id) {
            info!(pr_number, "PR already exists");
            return Ok(SeriesOutcome::Skipped(SkipReason::PrExists(pr_number)));
        }

        let series_dir = patch_dir.join(series.id.to_string());
        tokio::fs::create_dir_all(&series_dir).await?;

        let branch = series.id.to_string();
        let Some(lease) = TreeLease::acquire(self.tree, &self.options.base_branch, &branch).await?
        else {
            return Ok(SeriesOutcome::Skipped(SkipReason::CheckoutFailed));
        };

        let body = first.content.as_deref().or(first.diff.as_deref()).unwrap_or_default();
        let result = self
            .apply_and_publish(series, &lease, &series_dir, body, open_prs)
            .await;
        lease.release().await;
        result
    }

    /// Full patch records of a series, reusing the already fetched first one
    async fn fetch_patches(&self, series: &Series, first: &Patch) -> Result<Vec<Patch>> {
        let mut patches = vec![first.clone()];
        for patch_ref in series.patches.iter().skip(1) {
            patches.push(self.tracker.fetch_patch(patch_ref.id).await?);
        }
        Ok(patches)
    }

    async fn apply_and_publish(
        &self,
        series: &Series,
        lease: &TreeLease<'_>,
        series_dir: &Path,
        body: &str,
        open_prs: &mut OpenPullRequests,
    ) -> Result<SeriesOutcome> {
        match self.apply_patches(series, lease.tree(), series_dir).await? {
            ApplyVerdict::Failed(report) => {
                info!(patch_id = report.patch_id, "apply failed, notifying submitter");
                self.dispatch_notification(series, &report).await;
                Ok(SeriesOutcome::Failed {
                    patch_id: report.patch_id,
                })
            }
            ApplyVerdict::Applied => {
                for patch in &series.patches {
                    self.report_check(patch.id, CheckOutcome::Pass, "Success".to_string())
                        .await?;
                }
                info!("all patches applied");
                let publication = self.publish(series, lease, body, open_prs).await?;
                Ok(SeriesOutcome::Applied(publication))
            }
        }
    }

    /// Apply the patches in series order, stopping at the first failure
    async fn apply_patches(
        &self,
        series: &Series,
        tree: &dyn WorkingTree,
        series_dir: &Path,
    ) -> Result<ApplyVerdict> {
        for patch in &series.patches {
            let mbox = self.tracker.fetch_mbox(&patch.mbox_url).await?;
            let path = series_dir.join(format!("{}.patch", patch.id));
            tokio::fs::write(&path, &mbox).await?;
            info!(patch_id = patch.id, path = %path.display(), "applying patch");

            let out = tree.apply_mailbox(&path).await?;
            if out.success() {
                continue;
            }

            warn!(patch_id = patch.id, stderr = %out.stderr, "patch failed to apply");
            // Abort before anything else can fail so the tree is never left mid-apply
            match tree.abort_apply().await {
                Ok(abort) if !abort.success() => {
                    warn!(stderr = %abort.stderr, "abort after failed apply reported an error");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "failed to run abort"),
            }

            self.report_check(patch.id, CheckOutcome::Fail, out.stderr.clone())
                .await?;
            return Ok(ApplyVerdict::Failed(FailureReport {
                series_id: series.id,
                patch_id: patch.id,
                output: out.stderr,
            }));
        }
        Ok(ApplyVerdict::Applied)
    }

    async fn report_check(
        &self,
        patch_id: u64,
        outcome: CheckOutcome,
        description: String,
    ) -> Result<()> {
        if self.options.dry_run {
            info!(patch_id, %outcome, "dry run, skip check submission");
            return Ok(());
        }
        if self.options.skip_check_upload {
            info!(patch_id, %outcome, "check upload disabled, skip check submission");
            return Ok(());
        }

        let report = CheckReport {
            patch_id,
            outcome,
            context: self.options.check_context.clone(),
            description,
            target_url: None,
        };
        self.tracker.submit_check(&report).await?;
        Ok(())
    }

    async fn dispatch_notification(&self, series: &Series, report: &FailureReport) {
        if self.options.dry_run {
            info!(patch_id = report.patch_id, "dry run, skip notification");
            return;
        }
        if let Err(e) = self.notifier.notify(series, report).await {
            warn!(error = %e, "failed to send failure notification");
        }
    }

    /// Push the series branch and open its PR.
    ///
    /// The branch is rebuilt from base on every run, so a copy left on the
    /// remote by an earlier run (pushed without a PR, or not deleted after
    /// its PR was closed) never fast-forwards; `force_push` overwrites it.
    /// A failed push is an infrastructure fault, not a patch defect: it is
    /// logged and the series moves on without a PR or a notification.
    async fn publish(
        &self,
        series: &Series,
        lease: &TreeLease<'_>,
        body: &str,
        open_prs: &mut OpenPullRequests,
    ) -> Result<Publication> {
        if self.options.dry_run {
            info!("dry run, skip push and PR creation");
            return Ok(Publication::DryRun);
        }

        let out = lease
            .tree()
            .push(&self.options.remote, lease.branch(), self.options.force_push)
            .await?;
        if !out.success() {
            warn!(
                branch = lease.branch(),
                stderr = %out.stderr,
                "failed to push, skip creating PR"
            );
            return Ok(Publication::PushFailed);
        }

        let title = series_pr_title(series.id, series.display_name());
        let pr = self
            .platform
            .create_pr(lease.branch(), &self.options.base_branch, &title, body)
            .await?;
        info!(pr_number = pr.number, url = %pr.html_url, "PR created");

        let number = pr.number;
        open_prs.insert(pr);
        Ok(Publication::Opened(number))
    }
}
