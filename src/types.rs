//! Core types for patchbridge

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Check state of a patch as reported by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    /// No check has been reported yet
    #[default]
    Pending,
    /// All checks passed
    Success,
    /// At least one check warned
    Warning,
    /// At least one check failed
    Fail,
}

impl std::fmt::Display for CheckState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Reference to a series as embedded in a patch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesRef {
    /// Series ID
    pub id: u64,
}

/// A single patch on the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    /// Patch ID
    pub id: u64,
    /// Patch subject
    pub name: String,
    /// Commit message part of the submission
    #[serde(default)]
    pub content: Option<String>,
    /// Unified diff of the patch
    #[serde(default)]
    pub diff: Option<String>,
    /// URL of the patch in mailbox format
    #[serde(rename = "mbox")]
    pub mbox_url: String,
    /// Message-ID of the submission email
    #[serde(default)]
    pub msgid: String,
    /// Aggregated check state
    #[serde(rename = "check", default)]
    pub check_state: CheckState,
    /// Series this patch belongs to
    #[serde(default)]
    pub series: Vec<SeriesRef>,
}

/// A patch entry as listed inside a series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRef {
    /// Patch ID
    pub id: u64,
    /// Patch subject
    pub name: String,
    /// URL of the patch in mailbox format
    #[serde(rename = "mbox")]
    pub mbox_url: String,
    /// Message-ID of the submission email
    #[serde(default)]
    pub msgid: String,
}

/// Submitter of a series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submitter {
    /// Email address
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// A patch series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Series ID
    pub id: u64,
    /// Series name, absent for some single-patch submissions
    pub name: Option<String>,
    /// Who submitted the series
    pub submitter: Submitter,
    /// Patches in submission order
    #[serde(default)]
    pub patches: Vec<PatchRef>,
}

impl Series {
    /// Fill in a missing name from the first patch's subject.
    ///
    /// Returns `true` if the name was changed.
    pub fn normalize_name(&mut self) -> bool {
        if self.name.is_some() {
            return false;
        }
        match self.patches.first() {
            Some(first) => {
                self.name = Some(first.name.clone());
                true
            }
            None => false,
        }
    }

    /// Series name, or an empty string if it is still unknown
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Active series of one run, keyed (and iterated) by ascending series ID
pub type SeriesIndex = BTreeMap<u64, Series>;

/// Outcome of a check posted back to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Check passed
    Pass,
    /// Check passed with warnings
    Warn,
    /// Check failed
    Fail,
}

impl CheckOutcome {
    /// Numeric state used by the tracker's checks endpoint
    pub const fn code(self) -> u8 {
        match self {
            Self::Pass => 1,
            Self::Warn => 2,
            Self::Fail => 3,
        }
    }

    /// Parse a numeric check state (1 pass, 2 warning, 3 fail)
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Pass),
            2 => Some(Self::Warn),
            3 => Some(Self::Fail),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warn => write!(f, "warning"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// A check result for one patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Target patch
    pub patch_id: u64,
    /// Verdict
    pub outcome: CheckOutcome,
    /// Check name, shown as the check title on the tracker
    pub context: String,
    /// Free-form result text
    pub description: String,
    /// Link to the full result
    pub target_url: Option<String>,
}

/// A pull request on the forge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
}

/// Forge repository coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl PlatformConfig {
    /// Parse an `owner/repo` string
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, repo) = slug.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl std::fmt::Display for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
