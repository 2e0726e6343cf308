//! # Completions Command Implementation
//!
//! Prints a `clap_complete` script for the requested shell.
//!
//! ```bash
//! repo-sweep completions bash > ~/.local/share/bash-completion/completions/repo-sweep
//! repo-sweep completions zsh > ~/.zfunc/_repo-sweep
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to `out`.
fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    render(args.shell, &mut lock);
    lock.flush()?;
    Ok(())
}
