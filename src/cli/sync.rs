//! Sync command - reconcile tracker series with open pull requests

use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, CROSS, Stylize, spinner_style};
use anstream::println;
use clap::Args;
use indicatif::ProgressBar;
use patchbridge::error::Result;
use patchbridge::reconcile::{Publication, Reconciler, RunSummary, SeriesOutcome};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tracing::info;

/// Arguments of the sync command
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Configuration file
    #[arg(short, long, default_value = "./config.json")]
    pub config_file: PathBuf,

    /// Tracker patch states to query
    #[arg(short, long, num_args = 1.., default_values = ["1", "2"])]
    pub patch_state: Vec<String>,

    /// Repository PRs are opened against, as <OWNER>/<REPO>
    #[arg(short, long)]
    pub repo: String,

    /// Base branch of the PRs
    #[arg(short, long, default_value = "workflow")]
    pub branch: String,

    /// Repository variant key in the configuration
    #[arg(short, long, default_value = "kernel")]
    pub key_str: String,

    /// Source directory (a checkout of the repository)
    #[arg(short, long)]
    pub src_dir: PathBuf,

    /// Remote series branches are pushed to
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Do not overwrite series branches already on the remote
    #[arg(long)]
    pub no_force_push: bool,

    /// Process series even if they were already checked (debug only)
    #[arg(short, long)]
    pub ignore_check: bool,

    /// Do not post checks to the tracker
    #[arg(short, long)]
    pub no_update_check: bool,

    /// Run without any side effect on the tracker, forge or mail
    #[arg(short, long)]
    pub dry_run: bool,
}

/// Run the sync command
pub async fn run_sync(args: &SyncArgs) -> Result<()> {
    let ctx = CommandContext::new(args)?;

    let patch_dir = TempDir::new()?;
    info!(path = %patch_dir.path().display(), "patch directory");

    let reconciler = Reconciler::new(
        &ctx.tracker,
        &ctx.platform,
        &ctx.tree,
        ctx.notifier.as_ref(),
        &ctx.filter,
        ctx.options.clone(),
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Reconciling {}...", args.repo.emphasis()));
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = reconciler.run(patch_dir.path()).await;
    spinner.finish_and_clear();
    let summary = result?;

    print_summary(&summary, args.dry_run);
    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!();
    if summary.outcomes.is_empty() {
        println!("{}", "No series found".muted());
    }

    for (id, outcome) in &summary.outcomes {
        let marker = match outcome {
            SeriesOutcome::Applied(Publication::PushFailed) => "!".warn(),
            SeriesOutcome::Applied(_) => CHECK.success(),
            SeriesOutcome::Failed { .. } | SeriesOutcome::Errored(_) => CROSS.error(),
            SeriesOutcome::Skipped(_) => "-".muted(),
        };
        println!("  {marker} {} {outcome}", id.accent());
    }

    let close = &summary.close_pass;
    if !close.closed.is_empty() {
        let verb = if dry_run { "Would close" } else { "Closed" };
        let numbers: Vec<String> = close.closed.iter().map(|n| format!("#{n}")).collect();
        println!("  {} {}", verb.emphasis(), numbers.join(", "));
    }
    for (number, err) in &close.failed {
        println!("  {} close #{number}: {}", CROSS.error(), err.muted());
    }

    println!();
    println!(
        "{} {} applied, {} failed, {} skipped, {} errored, {} PR(s) opened",
        format!("{CHECK} Sync complete:").success(),
        summary.applied().accent(),
        summary.failed().accent(),
        summary.skipped().accent(),
        summary.errored().accent(),
        summary.created.len().accent()
    );
    if dry_run {
        println!("{}", "Dry run: no changes were made".muted());
    }
}
