//! # Select Command Implementation
//!
//! Prints the repositories a configuration would visit. This is a read-only
//! operation: it queries the GitHub API but never clones or writes anything.

use anyhow::Result;
use clap::Args;

use repo_sweep::orchestrator::Orchestrator;
use repo_sweep::output::{emoji, OutputConfig};
use repo_sweep::workspace::DefaultGitOperations;

use super::args::SweepArgs;

/// List the repositories a sweep would touch
#[derive(Args, Debug)]
pub struct SelectArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,
}

/// Execute the `select` command.
pub fn execute(args: SelectArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let plan = args.sweep.load()?.validate()?;
    let api = args.sweep.client();
    let git = DefaultGitOperations;

    let targets = Orchestrator::new(&plan, &api, &git).select()?;
    println!(
        "{} {} repositories selected in {}",
        emoji(&out, "📋", "[LIST]"),
        targets.len(),
        plan.org
    );
    for target in &targets {
        let note = if target.archived { ", archived" } else { "" };
        println!(
            "   {} ({}{})",
            target.name,
            target.default_branch,
            note
        );
    }
    Ok(())
}
