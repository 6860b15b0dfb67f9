//! Check command - post a check result to a patch by hand

use crate::cli::context::{PATCHWORK_TOKEN, env_token};
use crate::cli::style::{CHECK, Stylize};
use anstream::println;
use clap::Args;
use patchbridge::config::{DEFAULT_TRACKER_URL, TrackerConfig};
use patchbridge::error::{Error, Result};
use patchbridge::tracker::{CheckSubmission, PatchworkClient, TrackerService};
use patchbridge::types::{CheckOutcome, CheckReport};
use tracing::info;

/// Arguments of the check command
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Patch ID to update the check of
    #[arg(short, long)]
    pub patch_id: u64,

    /// State: 1 pass, 2 warning, 3 fail
    #[arg(short, long)]
    pub state: u8,

    /// URL the check result points to
    #[arg(short, long, default_value = "")]
    pub target_url: String,

    /// Check name (no whitespace)
    #[arg(short, long)]
    pub context: String,

    /// Test result or description
    #[arg(short, long)]
    pub description: String,

    /// Tracker API base URL
    #[arg(long, default_value = DEFAULT_TRACKER_URL)]
    pub tracker_url: String,
}

/// Validate the state code and context label
pub fn validate(args: &CheckArgs) -> Result<CheckOutcome> {
    let outcome = CheckOutcome::from_code(args.state)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid state: {}", args.state)))?;
    if args.context.is_empty() || args.context.chars().any(char::is_whitespace) {
        return Err(Error::InvalidArgument(format!(
            "context must be a single word, got '{}'",
            args.context
        )));
    }
    Ok(outcome)
}

/// Run the check command
pub async fn run_check(args: &CheckArgs) -> Result<()> {
    let outcome = validate(args)?;

    let config = TrackerConfig {
        url: args.tracker_url.clone(),
        ..TrackerConfig::default()
    };
    let tracker = PatchworkClient::new(&config, env_token(PATCHWORK_TOKEN))?;

    let patch = tracker.fetch_patch(args.patch_id).await?;
    info!(patch_id = patch.id, name = %patch.name, "found patch");

    let report = CheckReport {
        patch_id: args.patch_id,
        outcome,
        context: args.context.clone(),
        description: args.description.clone(),
        target_url: Some(args.target_url.clone()).filter(|u| !u.is_empty()),
    };

    match tracker.submit_check(&report).await? {
        CheckSubmission::Posted => println!(
            "{} Posted {} check '{}' to patch {}",
            CHECK.success(),
            outcome.accent(),
            report.context,
            patch.id.accent()
        ),
        CheckSubmission::Skipped => println!(
            "{}",
            format!("{PATCHWORK_TOKEN} not set, check was not posted").warn()
        ),
    }
    Ok(())
}
