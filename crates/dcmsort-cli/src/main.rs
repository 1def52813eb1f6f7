mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dcmsort_core::namer::ReorgPlan;
use dcmsort_core::{SortConfig, SortEngine, SortReport};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let guard = logging::init_logger(args.verbose);

    let config = match dcmsort_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(1);
        }
    };

    let exit_code = match args.command {
        Some(Commands::Sort {
            dir,
            dry_run,
            workers,
            attempts,
        }) => {
            let config = SortConfig {
                workers: workers.unwrap_or(config.workers),
                rename_attempts: attempts.unwrap_or(config.rename_attempts),
                dry_run: dry_run || config.dry_run,
                ..config
            };
            match run_sort(config, &dir) {
                Ok(true) => 0,
                Ok(false) => 1,
                Err(err) => {
                    error!("Error: {:#}", err);
                    1
                }
            }
        }
        Some(Commands::Check { dir }) => match run_check(config, &dir) {
            Ok(()) => 0,
            Err(err) => {
                error!("Error: {:#}", err);
                1
            }
        },
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            0
        }
        None => {
            let _ = Cli::command().print_long_help();
            0
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Returns `Ok(false)` when some folder renames could not be resolved.
fn run_sort(config: SortConfig, dir: &Path) -> anyhow::Result<bool> {
    config.validate().context("invalid configuration")?;
    let dry_run = config.dry_run;
    let engine = SortEngine::new(config);
    let report = {
        let reporter = CliReporter::new();
        engine
            .run(dir, &reporter)
            .with_context(|| format!("sorting {}", dir.display()))?
    };

    if dry_run {
        print_plans(&report.planned);
    }
    print_summary(&report);

    if !report.is_success() {
        println!("{}", "Folders that could not be renamed:".red().bold());
        for failure in &report.unresolved {
            println!("  {} -> {}", failure.from.display(), failure.to.display());
        }
    }

    Ok(report.is_success())
}

fn run_check(config: SortConfig, dir: &Path) -> anyhow::Result<()> {
    let engine = SortEngine::new(config);
    let unsorted = engine
        .unsorted_directories(dir)
        .with_context(|| format!("checking {}", dir.display()))?;

    if unsorted.is_empty() {
        info!("{}", "Every directory is already sorted".green());
    } else {
        for path in &unsorted {
            println!("{}", path.display());
        }
        info!(
            "{} directories not in canonical form",
            format!("{}", unsorted.len()).yellow()
        );
    }
    Ok(())
}

fn print_plans(plans: &[ReorgPlan]) {
    for plan in plans {
        println!("{} ({:?})", plan.directory.display().to_string().cyan(), plan.layout);
        for m in &plan.moves {
            println!("  {} -> {}", m.from.display(), m.to.display());
        }
        if let Some(rename) = &plan.folder_rename {
            println!("  [dir] {} -> {}", rename.from.display(), rename.to.display());
        }
    }
}

fn print_summary(report: &SortReport) {
    println!();
    info!(
        "{} directories visited, {} already sorted, {} reorganized in {}",
        report.directories_visited,
        format!("{}", report.directories_already_sorted).green(),
        format!("{}", report.directories_reorganized).green(),
        format!("{:.2}s", report.duration.as_secs_f64()).green(),
    );
    info!(
        "{} files moved, {} folders renamed, {} non-image files skipped",
        format!("{}", report.files_moved).cyan(),
        format!("{}", report.folder_renames.len()).cyan(),
        report.unrecognized_files,
    );
    if !report.mutation_failures.is_empty() || !report.collisions.is_empty() {
        info!(
            "{} file moves failed, {} naming collisions left in place",
            format!("{}", report.mutation_failures.len()).red(),
            format!("{}", report.collisions.len()).red(),
        );
    }
    if report.cancelled {
        info!("{}", "Run was cancelled before every directory was visited".yellow());
    }
}
