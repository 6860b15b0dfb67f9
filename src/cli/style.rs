//! Terminal styling helpers

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Check mark
pub const CHECK: &str = "✓";

/// Cross mark
pub const CROSS: &str = "✗";

/// Semantic styles for CLI output.
///
/// Output goes through `anstream`, which strips the escapes when stdout is
/// not a terminal.
pub trait Stylize: Display + Sized {
    /// Bold
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    /// Cyan, for identifiers and counts
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    /// Dimmed
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    /// Green
    fn success(&self) -> String {
        self.green().to_string()
    }

    /// Yellow
    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    /// Bold red
    fn error(&self) -> String {
        self.red().bold().to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Spinner style for long-running steps
pub fn spinner_style() -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
}
