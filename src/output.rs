//! # Output Configuration
//!
//! This module provides utilities for controlling CLI output appearance,
//! including color and emoji support based on terminal capabilities and
//! user preferences, and renders the end-of-run summary.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repo_sweep::output::{OutputConfig, emoji};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{} Selecting repositories...", emoji(&config, "🔍", "[SCAN]"));
//! ```

use std::env;

use crate::orchestrator::{RunReport, RunStatus};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // presence alone disables colors, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled and the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

fn status_marker(out: &OutputConfig, status: &RunStatus) -> &'static str {
    match status {
        RunStatus::Committed { .. } => emoji(out, "✅", "[OK]"),
        RunStatus::PrCreated { .. } => emoji(out, "🔀", "[PR]"),
        RunStatus::NoMatch | RunStatus::NoOpCommit => emoji(out, "➖", "[--]"),
        RunStatus::SkippedArchived => emoji(out, "⏭️", "[SKIP]"),
        RunStatus::Failed { .. } => emoji(out, "❌", "[ERR]"),
    }
}

/// Render the end-of-run summary.
///
/// Lists every repository with its outcome, then either the created pull
/// requests (publishing) or the changed files as `<repo>/<path>` together
/// with the workspace holding them, then every failure with its stage.
pub fn render_summary(report: &RunReport, out: &OutputConfig) -> String {
    let mut lines = vec![format!(
        "{} Sweep finished: {} repositories",
        emoji(out, "📊", "[INFO]"),
        report.results.len()
    )];

    for result in &report.results {
        let detail = match &result.status {
            RunStatus::Committed { sha } => format!(" {}", &sha[..sha.len().min(12)]),
            RunStatus::PrCreated { url } => format!(" {}", url),
            _ => String::new(),
        };
        lines.push(format!(
            "   {} {}: {}{}",
            status_marker(out, &result.status),
            result.repo,
            result.status.label(),
            detail
        ));
        for missing in &result.missing_files {
            lines.push(format!(
                "      {} {} was missing",
                emoji(out, "⚠️", "[WARN]"),
                missing.display()
            ));
        }
    }

    if report.publish {
        let urls = report.pr_urls();
        lines.push(String::new());
        if urls.is_empty() {
            lines.push("No pull requests opened".to_string());
        } else {
            lines.push(format!("Pull requests ({}):", urls.len()));
            lines.extend(urls.iter().map(|u| format!("   {}", u)));
        }
    } else {
        let files = report.changed_files();
        lines.push(String::new());
        if files.is_empty() {
            lines.push("No files changed".to_string());
        } else {
            lines.push(format!("Changed files ({}):", files.len()));
            lines.extend(files.iter().map(|f| format!("   {}", f)));
            lines.push(format!(
                "{} Review the changes under {}",
                emoji(out, "💡", "[HINT]"),
                report.workspace.display()
            ));
        }
    }

    let failures = report.failures();
    if !failures.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "{} {} repositories failed:",
            emoji(out, "❌", "[ERR]"),
            failures.len()
        ));
        for failure in failures {
            if let RunStatus::Failed { stage, reason } = &failure.status {
                lines.push(format!("   {} ({}): {}", failure.repo, stage, reason));
            }
        }
    }

    lines.join("\n")
}
