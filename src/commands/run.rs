//! # Run Command Implementation
//!
//! Executes a sweep end to end:
//!
//! 1. Validate the configuration (no side effects on failure)
//! 2. Select repositories, read-only
//! 3. Ask for confirmation when pull requests will be opened
//! 4. Sync, search, rewrite and commit every repository, pushing and opening
//!    pull requests when publishing
//! 5. Print the summary
//!
//! Individual repository failures are reported in the summary and do not
//! change the exit code.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{ProgressBar, ProgressStyle};

use repo_sweep::orchestrator::{prepare_workspace, Orchestrator, RepoStage};
use repo_sweep::output::{emoji, render_summary, OutputConfig};
use repo_sweep::workspace::DefaultGitOperations;

use super::args::SweepArgs;

/// Apply the replacement across the selected repositories
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Open pull requests without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `run` command.
pub fn execute(args: RunArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let plan = args.sweep.load()?.validate()?;
    let api = args.sweep.client();
    let git = DefaultGitOperations;
    let orchestrator = Orchestrator::new(&plan, &api, &git);

    println!(
        "{} Selecting repositories in {}",
        emoji(&out, "🔍", "[SCAN]"),
        plan.org
    );
    let targets = orchestrator.select()?;
    if targets.is_empty() {
        println!("No repositories matched");
        return Ok(());
    }
    for target in &targets {
        let note = if target.archived { " (archived, skipped)" } else { "" };
        println!("   {}{}", target.name, note);
    }

    if plan.publish && !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Push '{}' and open pull requests in up to {} repositories?",
                plan.branch,
                targets.len()
            ))
            .default(false)
            .interact()?;
        if !proceed {
            println!("Aborted. Nothing was changed.");
            return Ok(());
        }
    }

    let root = prepare_workspace(&plan)?;
    println!(
        "{} Workspace: {}",
        emoji(&out, "📁", "[DIR]"),
        root.display()
    );

    let progress = ProgressBar::new(targets.len() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{spinner} [{bar:30}] {pos}/{len} {msg}",
    )?);
    let report = orchestrator.run(&targets, &root, |target, stage| match stage {
        RepoStage::Done => progress.inc(1),
        stage => progress.set_message(format!("{} ({})", target.name, stage)),
    });
    progress.finish_and_clear();

    println!();
    println!("{}", render_summary(&report, &out));
    Ok(())
}
