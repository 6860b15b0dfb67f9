//! JSON configuration: repository variants, email policy and tracker settings.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default tracker API base URL
pub const DEFAULT_TRACKER_URL: &str = "https://patchwork.kernel.org/api";

/// Default tracker project ID
pub const DEFAULT_PROJECT: &str = "395";

/// Default tracker user ID checks are posted as
pub const DEFAULT_CHECK_USER: u64 = 104_215;

/// Default check context label
pub const DEFAULT_CHECK_CONTEXT: &str = "pre-ci_am";

/// Top-level configuration document
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Include/exclude patterns per repository variant
    pub repo_details: HashMap<String, RepoDetails>,
    /// Failure email policy (absent = disabled)
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Tracker settings
    #[serde(default)]
    pub patchwork: TrackerConfig,
}

/// Raw include/exclude patterns of one repository variant
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoDetails {
    /// Series names matching any of these belong to the variant
    #[serde(default)]
    pub include: Vec<String>,
    /// Series names matching any of these never belong to the variant
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Email notification policy
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EmailConfig {
    /// Master switch
    pub enable: bool,
    /// SMTP server host
    pub server: String,
    /// SMTP server port
    pub port: u16,
    /// Upgrade the connection with STARTTLS
    #[serde(default)]
    pub starttls: bool,
    /// Login user, also used as the sender address
    pub user: String,
    /// List address, used as Reply-To and default recipient
    pub default_to: String,
    /// Send only to the maintainers instead of list + submitter
    #[serde(default)]
    pub only_maintainers: bool,
    /// Maintainer addresses
    #[serde(default)]
    pub maintainers: Vec<String>,
}

/// Tracker connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// API base URL
    pub url: String,
    /// Project ID used to list patches
    pub project: String,
    /// User ID checks are posted as
    pub user: u64,
    /// Check context label
    pub context: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRACKER_URL.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            user: DEFAULT_CHECK_USER,
            context: DEFAULT_CHECK_CONTEXT.to_string(),
        }
    }
}

/// Compiled include/exclude patterns of one repository variant
#[derive(Debug, Clone)]
pub struct RepoProfile {
    /// Variant key, e.g. "kernel"
    pub key: String,
    /// Compiled include patterns (case-insensitive)
    pub include: Vec<Regex>,
    /// Compiled exclude patterns (case-insensitive)
    pub exclude: Vec<Regex>,
}

impl RepoProfile {
    /// Compile the raw patterns of a variant
    pub fn compile(key: &str, details: &RepoDetails) -> Result<Self> {
        Ok(Self {
            key: key.to_string(),
            include: compile_patterns(key, &details.include)?,
            exclude: compile_patterns(key, &details.exclude)?,
        })
    }
}

fn compile_patterns(key: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::Config(format!("invalid pattern '{p}' in '{key}': {e}")))
        })
        .collect()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Parse configuration from a JSON string
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Compiled profile for a repository variant
    pub fn profile(&self, key: &str) -> Result<RepoProfile> {
        let details = self
            .repo_details
            .get(key)
            .ok_or_else(|| Error::UnknownVariant(key.to_string()))?;
        RepoProfile::compile(key, details)
    }
}
