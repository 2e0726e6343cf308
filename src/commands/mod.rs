//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `repo-sweep`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`. The sweep options themselves live in `args` and are
//!   flattened into every command that needs them.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `repo_sweep` library.

pub mod args;
pub mod completions;
pub mod run;
pub mod select;
pub mod validate;
