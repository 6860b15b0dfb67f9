//! Series tag embedded in pull request titles
//!
//! The title prefix `[PW_SID:<id>]` is the only link between a pull request
//! and its series, so the format must stay stable across runs.

use regex::Regex;
use std::sync::LazyLock;

/// Tag name used in PR titles
pub const SERIES_TAG_PREFIX: &str = "PW_SID";

// Anchored at the start of the title, case-insensitive
static SERIES_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^\[{SERIES_TAG_PREFIX}:([0-9]+)\]"))
        .expect("series tag pattern is valid")
});

/// Build the PR title for a series
pub fn series_pr_title(series_id: u64, series_name: &str) -> String {
    format!("[{SERIES_TAG_PREFIX}:{series_id}] {series_name}")
}

/// Extract the series ID from a PR title.
///
/// Only a tag at the very start of the title counts. Returns `None` for
/// foreign or malformed titles.
pub fn parse_series_tag(title: &str) -> Option<u64> {
    SERIES_TAG_REGEX
        .captures(title)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}
