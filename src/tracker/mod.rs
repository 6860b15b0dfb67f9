//! Patch tracker services
//!
//! Typed read/write operations against the patch-review tracker.

mod patchwork;

pub use patchwork::{PatchworkClient, parse_next_link};

use crate::error::Result;
use crate::types::{CheckReport, Patch, Series};
use async_trait::async_trait;

/// Result of submitting a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSubmission {
    /// The tracker accepted the check
    Posted,
    /// No write token available, nothing was sent
    Skipped,
}

/// Tracker service trait
///
/// Abstracts the tracker so the reconciliation engine can run against
/// test doubles.
#[async_trait]
pub trait TrackerService: Send + Sync {
    /// Get full details of a series
    async fn fetch_series(&self, id: u64) -> Result<Series>;

    /// Get full details of a patch
    async fn fetch_patch(&self, id: u64) -> Result<Patch>;

    /// Get every non-archived patch of the project in any of `states`,
    /// following pagination until exhausted.
    async fn fetch_patches_by_state(&self, states: &[String]) -> Result<Vec<Patch>>;

    /// Download a patch in mailbox format
    async fn fetch_mbox(&self, url: &str) -> Result<Vec<u8>>;

    /// Post a check result against a patch
    async fn submit_check(&self, report: &CheckReport) -> Result<CheckSubmission>;
}
