//! Relevance filter
//!
//! Decides whether a series belongs to the configured repository variant.
//! Name patterns are fast manual overrides; probing the source tree for the
//! files a series touches is the fallback for series whose subject gives no
//! hint.

use crate::config::RepoProfile;
use crate::types::Patch;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Old-file marker of a unified diff
const OLD_FILE_MARKER: &str = "--- ";

/// Null-device sentinel used for newly added files
const DEV_NULL: &str = "/dev/null";

/// Verdict of the relevance filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relevance {
    /// Name matched an exclude pattern
    Excluded(String),
    /// Name matched an include pattern
    Included(String),
    /// Every touched file exists in the source tree
    InTree,
    /// A touched file does not exist in the source tree
    MissingPath(String),
    /// No touched files could be extracted from the patches
    Indeterminate,
}

impl Relevance {
    /// Whether the series should be processed for this variant
    pub const fn is_relevant(&self) -> bool {
        matches!(self, Self::Included(_) | Self::InTree)
    }
}

impl std::fmt::Display for Relevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excluded(p) => write!(f, "excluded by pattern '{p}'"),
            Self::Included(p) => write!(f, "included by pattern '{p}'"),
            Self::InTree => write!(f, "all files exist in the source tree"),
            Self::MissingPath(p) => write!(f, "file not found: {p}"),
            Self::Indeterminate => write!(f, "no files found in the series"),
        }
    }
}

/// Relevance filter for one repository variant and source tree
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    profile: RepoProfile,
    source_dir: PathBuf,
}

impl RelevanceFilter {
    /// Create a filter for `profile` probing files under `source_dir`
    pub fn new(profile: RepoProfile, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile,
            source_dir: source_dir.into(),
        }
    }

    /// Variant key of the profile
    pub fn variant(&self) -> &str {
        &self.profile.key
    }

    /// Decide from the series name alone.
    ///
    /// Exclude patterns win over include patterns regardless of declaration
    /// order. Returns `None` when neither matches and the touched files have
    /// to be checked.
    pub fn match_name(&self, name: &str) -> Option<Relevance> {
        if let Some(re) = self.profile.exclude.iter().find(|re| re.is_match(name)) {
            info!(pattern = re.as_str(), "found exclude pattern");
            return Some(Relevance::Excluded(re.as_str().to_string()));
        }
        if let Some(re) = self.profile.include.iter().find(|re| re.is_match(name)) {
            info!(pattern = re.as_str(), "found include pattern");
            return Some(Relevance::Included(re.as_str().to_string()));
        }
        None
    }

    /// Decide from the files touched by the patches
    pub fn match_tree(&self, patches: &[Patch]) -> Relevance {
        let files = series_files(patches);
        if files.is_empty() {
            warn!("no files found in the series, cannot determine relevance");
            return Relevance::Indeterminate;
        }
        debug!(?files, "files in series");

        for file in &files {
            if !exists_under(&self.source_dir, file) {
                info!(file, "file not found in source tree");
                return Relevance::MissingPath(file.clone());
            }
        }

        info!(count = files.len(), "files exist in the source tree");
        Relevance::InTree
    }

    /// Full decision: name patterns first, then the touched files
    pub fn evaluate(&self, name: &str, patches: &[Patch]) -> Relevance {
        self.match_name(name)
            .unwrap_or_else(|| self.match_tree(patches))
    }
}

/// Paths touched by a series, in patch order.
///
/// Duplicates are kept; patches without a diff contribute nothing.
pub fn series_files(patches: &[Patch]) -> Vec<String> {
    patches
        .iter()
        .filter_map(|p| p.diff.as_deref())
        .flat_map(diff_old_paths)
        .collect()
}

/// "Before" paths of a unified diff.
///
/// Uses the old-file side so deleted files still count and added files
/// (old side `/dev/null`) contribute nothing. The `a/` style prefix is
/// stripped.
pub fn diff_old_paths(diff: &str) -> Vec<String> {
    diff.lines()
        .filter_map(|line| line.strip_prefix(OLD_FILE_MARKER))
        .map(|rest| rest.split('\t').next().unwrap_or_default().trim_end())
        .filter(|path| !path.is_empty() && *path != DEV_NULL)
        .map(|path| path.split_once('/').map_or(path, |(_, p)| p).to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

/// Whether a relative diff path exists under `root`.
///
/// Absolute paths and paths escaping the root never exist.
fn exists_under(root: &Path, relative: &str) -> bool {
    let path = Path::new(relative);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    !escapes && root.join(path).exists()
}
