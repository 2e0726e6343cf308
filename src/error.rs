//! # Error Handling
//!
//! This module defines the centralized error type for `repo-sweep`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! failure the library can report, each variant carrying enough context to
//! tell the operator which repository, command, or option was at fault.
//!
//! Errors fall into two groups with different blast radius:
//!
//! - **Pre-flight errors** (`Config`, and `GitHubApi`/`Network` raised while
//!   selecting repositories) abort the run before any repository is touched.
//! - **Per-repository errors** (`GitClone`, `GitCommand`, `Search`, and
//!   `GitHubApi`/`Network` raised while publishing) are caught by the
//!   orchestrator and recorded as a failed outcome for that repository only.
//!
//! The `Result` type alias is used to return `Result<T, Error>` from
//! functions throughout the library.

use thiserror::Error;

/// Main error type for repo-sweep operations
#[derive(Error, Debug)]
pub enum Error {
    /// The run configuration is missing a value or contradicts itself.
    ///
    /// Raised before any network or filesystem work. Optionally carries a
    /// hint about how to fix the configuration.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// Cloning a repository into the workspace failed.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// A git command run inside a workspace exited unsuccessfully.
    #[error("Git command failed in {dir}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// The external full-text search utility failed.
    #[error("Search error: {tool} - {message}")]
    Search { tool: String, message: String },

    /// The code-hosting API answered with an error status.
    #[error("GitHub API error{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    GitHubApi {
        /// HTTP status code, when the server answered at all
        status: Option<u16>,
        message: String,
    },

    /// The code-hosting API could not be reached.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a configuration error with a hint.
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Returns true for errors that must abort the run before any side effect.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
