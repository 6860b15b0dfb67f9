//! Shared command context for the sync command
//!
//! Builds every collaborator of a run from the command line, the
//! configuration file and the environment.

use crate::cli::sync::SyncArgs;
use patchbridge::config::Config;
use patchbridge::error::{Error, Result};
use patchbridge::filter::RelevanceFilter;
use patchbridge::notify::{DisabledNotifier, EmailNotifier, Notifier};
use patchbridge::platform::GitHubService;
use patchbridge::reconcile::RunOptions;
use patchbridge::repo::GitWorkingTree;
use patchbridge::tracker::PatchworkClient;
use patchbridge::types::PlatformConfig;
use tracing::{info, warn};

/// Environment variable holding the tracker write token
pub const PATCHWORK_TOKEN: &str = "PATCHWORK_TOKEN";

/// Environment variable holding the GitHub token
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Environment variable holding the SMTP password
pub const EMAIL_TOKEN: &str = "EMAIL_TOKEN";

/// Read a non-empty environment variable
pub fn env_token(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Everything a sync run needs
pub struct CommandContext {
    /// Patch tracker client
    pub tracker: PatchworkClient,
    /// Forge client
    pub platform: GitHubService,
    /// Shared source checkout
    pub tree: GitWorkingTree,
    /// Failure notifier
    pub notifier: Box<dyn Notifier>,
    /// Relevance filter of the selected variant
    pub filter: RelevanceFilter,
    /// Run options
    pub options: RunOptions,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// Fails before any network access on a malformed repository slug, an
    /// unreadable config, an unknown variant or a missing source directory.
    pub fn new(args: &SyncArgs) -> Result<Self> {
        let platform_config = PlatformConfig::parse(&args.repo).ok_or_else(|| {
            Error::InvalidArgument(format!("repository must be owner/repo, got '{}'", args.repo))
        })?;

        info!(path = %args.config_file.display(), "loading config file");
        let config = Config::load(&args.config_file)?;
        let profile = config.profile(&args.key_str)?;
        let filter = RelevanceFilter::new(profile, &args.src_dir);
        let tree = GitWorkingTree::open(&args.src_dir)?;

        let tracker = PatchworkClient::new(&config.patchwork, env_token(PATCHWORK_TOKEN))?;

        let github_token = env_token(GITHUB_TOKEN);
        if github_token.is_none() {
            if !args.dry_run {
                return Err(Error::MissingCredential(GITHUB_TOKEN));
            }
            warn!("GITHUB_TOKEN not set, using anonymous access for dry run");
        }
        let platform = GitHubService::new(github_token.as_deref(), platform_config)?;

        let notifier: Box<dyn Notifier> = match config.email.clone() {
            Some(email) => Box::new(EmailNotifier::new(email, env_token(EMAIL_TOKEN))),
            None => Box::new(DisabledNotifier),
        };

        let options = RunOptions {
            states: args.patch_state.clone(),
            base_branch: args.branch.clone(),
            remote: args.remote.clone(),
            force_push: !args.no_force_push,
            check_context: config.patchwork.context.clone(),
            ignore_check: args.ignore_check,
            skip_check_upload: args.no_update_check,
            dry_run: args.dry_run,
        };

        Ok(Self {
            tracker,
            platform,
            tree,
            notifier,
            filter,
            options,
        })
    }
}
