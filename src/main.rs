//! patchbridge CLI

mod cli;

use clap::{Parser, Subcommand};
use cli::style::Stylize;
use patchbridge::error::Error;
use std::process::ExitCode;

/// Turn patchwork series into GitHub pull requests
#[derive(Parser)]
#[command(name = "patchbridge", version, about = "Turn patchwork series into GitHub pull requests")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply new series, open PRs for them and close stale PRs
    Sync(cli::sync::SyncArgs),
    /// Post a check result to a patch manually
    Check(cli::check::CheckArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Exit status for a fatal error
const fn exit_code(err: &Error) -> u8 {
    match err {
        Error::Config(_) => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Sync(args) => cli::sync::run_sync(&args).await,
        Commands::Check(args) => cli::check::run_check(&args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            anstream::eprintln!("{} {e}", "error:".error());
            ExitCode::from(exit_code(&e))
        }
    }
}
