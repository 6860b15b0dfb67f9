//! Failure notifications
//!
//! When a series cannot be applied, the submitter (or the maintainers) get
//! a plain-text report carrying the captured `git am` output.

mod email;

pub use email::EmailNotifier;

use crate::config::EmailConfig;
use crate::error::Result;
use crate::types::Series;
use async_trait::async_trait;
use tracing::info;

/// Failure report for one series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Series that failed to apply
    pub series_id: u64,
    /// First patch that failed to apply
    pub patch_id: u64,
    /// Captured error output of the apply
    pub output: String,
}

impl FailureReport {
    /// Render the notification body
    pub fn render(&self) -> String {
        format!(
            "This is an automated email and please do not reply to this email.\n\
             \n\
             Dear Submitter,\n\
             \n\
             Thank you for submitting the patches to the mailing list.\n\
             While preparing the CI tests, the patches you submitted couldn't be \
             applied to the current HEAD of the repository.\n\
             \n\
             ----- Output -----\n\
             {}\n\
             \n\
             Please resolve the issue and submit the patches again.\n\
             \n\
             \n\
             ---\n\
             Regards,\n\
             CI Bot\n",
            self.output.trim_end()
        )
    }
}

/// Recipients of a failure report.
///
/// With `only-maintainers` set, only the maintainer list; otherwise the
/// default list address followed by the series submitter.
pub fn recipients(config: &EmailConfig, series: &Series) -> Vec<String> {
    if config.only_maintainers {
        config.maintainers.clone()
    } else {
        vec![config.default_to.clone(), series.submitter.email.clone()]
    }
}

/// Notifier trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a failure report for `series`
    async fn notify(&self, series: &Series, report: &FailureReport) -> Result<()>;
}

/// Notifier used when no email policy is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, series: &Series, report: &FailureReport) -> Result<()> {
        info!(
            series_id = series.id,
            patch_id = report.patch_id,
            "email is disabled, not sending failure report"
        );
        Ok(())
    }
}
