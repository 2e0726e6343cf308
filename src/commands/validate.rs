//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a sweep
//! configuration (file plus flags) without contacting GitHub or touching any
//! repository. The checks that need repository metadata, such as the topic
//! branch colliding with a default branch, run at the start of `run` and
//! `select`.

use anyhow::Result;
use clap::Args;

use repo_sweep::config::Selection;
use repo_sweep::output::{emoji, OutputConfig};

use super::args::SweepArgs;

/// Validate a sweep configuration offline
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    match args.sweep.config_path() {
        Some(path) => println!(
            "{} Validating configuration: {}",
            emoji(&out, "🔍", "[SCAN]"),
            path.display()
        ),
        None => println!(
            "{} Validating command-line options",
            emoji(&out, "🔍", "[SCAN]")
        ),
    }

    let plan = match args.sweep.load().and_then(|c| Ok(c.validate()?)) {
        Ok(plan) => plan,
        Err(e) => {
            println!("{} Configuration is invalid", emoji(&out, "❌", "[ERR]"));
            return Err(e);
        }
    };

    println!("{} Configuration is valid", emoji(&out, "✅", "[OK]"));
    println!("\n{} Sweep Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Organization: {}", plan.org);
    match &plan.selection {
        Selection::Explicit(names) => println!("   Repositories: {}", names.join(", ")),
        Selection::Rules(rules) => {
            if let Some(name) = &rules.name_contains {
                println!("   Name contains: {}", name);
            }
            if let Some(topic) = &rules.topic {
                println!("   Topic: {}", topic);
            }
        }
    }
    if !plan.ignore.is_empty() {
        println!("   Ignoring: {}", plan.ignore.join(", "));
    }
    println!("   Branch: {}", plan.branch);
    println!("   Message: {}", plan.message);
    println!("   Replace: {:?} -> {:?}", plan.target, plan.replacement);
    match &plan.file {
        Some(file) => println!("   File: {}", file.display()),
        None => println!("   Search: {:?}", plan.search),
    }
    if plan.publish {
        println!(
            "   Publish: yes (base {}, {} ms between pull requests)",
            plan.base.as_deref().unwrap_or("default branch"),
            plan.pr_delay.as_millis()
        );
    } else {
        println!("   Publish: no (changes stay local)");
    }
    Ok(())
}
