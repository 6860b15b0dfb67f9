//! Error types for patchbridge

use thiserror::Error;

/// Errors that can occur while bridging the tracker and the forge
#[derive(Error, Debug)]
pub enum Error {
    /// Tracker answered with an unexpected status code
    #[error("tracker unavailable: {method} {url} returned {status}")]
    TrackerUnavailable {
        /// HTTP method of the failed request
        method: &'static str,
        /// Request URL
        url: String,
        /// Status code returned by the tracker
        status: u16,
    },

    /// GitHub API error with context
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Octocrab transport or API error
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// HTTP transport error
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A git process could not be run
    #[error("git error: {0}")]
    Git(String),

    /// Configuration file missing, unreadable or malformed
    #[error("config error: {0}")]
    Config(String),

    /// Requested repository variant is not present in the configuration
    #[error("unknown repository variant '{0}'")]
    UnknownVariant(String),

    /// A credential required for this operation is not set
    #[error("missing credential: {0} is not set in the environment")]
    MissingCredential(&'static str),

    /// Failure email could not be composed or delivered
    #[error("email error: {0}")]
    Email(String),

    /// Invalid command line argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error comes from a remote service rather than local state.
    ///
    /// Transport errors abort the enclosing unit of work (one series, one
    /// pull request close) but never the whole run once discovery is done.
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::TrackerUnavailable { .. } | Self::GitHubApi(_) | Self::Octocrab(_) | Self::Http(_)
        )
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
