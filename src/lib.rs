//! # Repo Sweep Library
//!
//! This library applies one literal find-and-replace across many repositories
//! of a GitHub organization and, optionally, opens a pull request for every
//! repository it changed. It is designed to be used by the `repo-sweep`
//! command-line tool but the pipeline pieces can be driven on their own.
//!
//! ## Quick Example
//!
//! ```
//! use repo_sweep::config::{self, Selection};
//!
//! let config = config::parse(r#"
//! org: acme
//! name-contains: svc-
//! branch: bump-tool-1.3.0
//! message: Bump tool to 1.3.0
//! target: tool==1.2.3
//! replacement: tool==1.3.0
//! "#).unwrap();
//!
//! let plan = config.validate().unwrap();
//! assert!(matches!(plan.selection, Selection::Rules(_)));
//! assert!(!plan.publish);
//!
//! let (rewritten, count) = repo_sweep::mutator::substitute("tool==1.2.3\n", &plan.target, &plan.replacement);
//! assert_eq!(rewritten, "tool==1.3.0\n");
//! assert_eq!(count, 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: sweep options from `.repo-sweep.yaml` and
//!   flags, validated into a `Plan` before anything is touched.
//! - **Selection (`selector`, `github`)**: resolves the repositories to visit
//!   through the `HostingApi` trait.
//! - **Workspace (`workspace`, `git`)**: one working copy per repository,
//!   cloned or reset to upstream on every run.
//! - **Discovery and rewrite (`locator`, `mutator`)**: literal search and
//!   line-preserving substitution.
//! - **Delivery (`committer`, `publisher`)**: topic branch, commit, push and
//!   pull request.
//! - **Orchestration (`orchestrator`)**: per-repository state machine and the
//!   aggregated `RunReport`.
//!
//! ## Execution Flow
//!
//! 1.  **Validate** the configuration.
//! 2.  **Select** repositories (read-only) and check the topic branch against
//!     each default branch.
//! 3.  For each repository: **sync**, **search**, **mutate**, **commit**, and
//!     with publishing on, **push** and open a **pull request**.
//! 4.  **Report** changed files or pull request URLs plus failures.

pub mod committer;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod github;
pub mod locator;
pub mod mutator;
pub mod orchestrator;
pub mod output;
pub mod publisher;
pub mod selector;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_utils;
