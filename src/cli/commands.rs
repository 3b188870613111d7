//! CLI commands implementation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use scanshelf::config::{expand_path, Config};
use scanshelf::ocr::{check_tools, CommandRunner, ToolStatus};
use scanshelf::services::{
    discover_publications, GoogleBooksClient, MetaOutcome, ProcessEvent, PublicationService,
};

#[derive(Parser)]
#[command(name = "scanshelf")]
#[command(about = "Turn scanned-book PDFs into browsable page images, text, and search indices")]
#[command(version)]
pub struct Cli {
    /// Directory containing source PDFs
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory receiving one folder per publication
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (TOML, YAML, or JSON). Defaults to ./scanshelf.toml if present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reprocess publications whose output folder already exists
    #[arg(short, long)]
    force: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Check if the required external tools are installed
    Check,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Some(Commands::Check) => cmd_check(&config),
        None => {
            let input = cli.input.context("--input is required (see --help)")?;
            let output = cli.output.context("--output is required (see --help)")?;
            cmd_process(config, &expand_path(&input), &expand_path(&output), cli.force).await
        }
    }
}

fn print_tool_status(report: &[ToolStatus]) -> bool {
    let mut all_found = true;
    for tool in report {
        let status = if tool.available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool.program, status);
        if !tool.available {
            println!("                  {}", style(tool.hint).dim());
        }
    }
    all_found
}

fn cmd_check(config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("External Tool Status").bold());
    println!("{}", "-".repeat(50));

    if print_tool_status(&check_tools(&config.tools)) {
        println!("\n{} All tools available", style("✓").green());
        Ok(())
    } else {
        anyhow::bail!("some required tools are missing")
    }
}

async fn cmd_process(
    mut config: Config,
    input: &Path,
    output: &Path,
    force: bool,
) -> anyhow::Result<()> {
    if force {
        config.processing.ignore_existing = false;
    }

    println!("{} Reading from {}", style("→").cyan(), input.display());
    println!("{} Generating to {}", style("→").cyan(), output.display());

    let report = check_tools(&config.tools);
    if report.iter().any(|t| !t.available) {
        print_tool_status(&report);
        anyhow::bail!("required tools are missing (run `scanshelf check`)");
    }

    let publications = discover_publications(input, output)
        .with_context(|| format!("Failed to scan {}", input.display()))?;
    if publications.is_empty() {
        println!("{} No PDFs found in {}", style("!").yellow(), input.display());
        return Ok(());
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            eprintln!(
                "{} Stopping after the current publication (Ctrl-C again to quit now)",
                style("!").yellow()
            );
            cancel.store(true, Ordering::Relaxed);

            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{} Interrupted", style("✗").red());
                std::process::exit(130);
            }
        });
    }

    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
        .progress_chars("█▓░");

    let (event_tx, mut event_rx) = mpsc::channel::<ProcessEvent>(100);

    let event_handler = tokio::spawn(async move {
        let progress = ProgressBar::hidden();
        while let Some(event) = event_rx.recv().await {
            match event {
                ProcessEvent::BatchStarted { total } => {
                    progress.set_length(total as u64);
                    progress.set_style(bar_style.clone());
                    progress.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                }
                ProcessEvent::PublicationStarted { id } => {
                    progress.set_message(id);
                }
                ProcessEvent::PublicationSkipped { id } => {
                    progress.println(format!("{} Ignoring {}", style("-").dim(), id));
                    progress.inc(1);
                }
                ProcessEvent::PublicationCompleted { id, pages, meta } => {
                    let meta = match meta {
                        MetaOutcome::Matched(isbn) => format!("ISBN {}", isbn),
                        MetaOutcome::Preserved => "existing metadata kept".to_string(),
                        MetaOutcome::NoMatch => "no metadata match".to_string(),
                        MetaOutcome::NoCandidates => "no ISBN found".to_string(),
                        MetaOutcome::Disabled => "metadata disabled".to_string(),
                    };
                    progress.println(format!(
                        "{} {} ({} pages, {})",
                        style("✓").green(),
                        id,
                        pages,
                        meta
                    ));
                    progress.inc(1);
                }
                ProcessEvent::PublicationFailed { id, error } => {
                    progress.println(format!("{} {}: {}", style("✗").red(), id, error));
                    progress.inc(1);
                }
                ProcessEvent::BatchCancelled { remaining } => {
                    progress.println(format!(
                        "{} Cancelled with {} publications left",
                        style("!").yellow(),
                        remaining
                    ));
                }
            }
        }
        progress.finish_and_clear();
    });

    let runner = CommandRunner;
    let lookup = GoogleBooksClient::new(&config.lookup)?;
    let service = PublicationService::new(&config, &runner, &lookup, output);

    let outcome = service.process_all(&publications, &cancel, event_tx).await;
    let _ = event_handler.await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) if e.is_tool_failure() => {
            return Err(anyhow::Error::new(e).context("External tool failed, aborting run"));
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} {} processed, {} skipped, {} failed, {} with metadata",
        style("✓").green(),
        result.processed,
        result.skipped,
        result.failed,
        result.meta_matched
    );
    if result.cancelled {
        println!("{} Run was cancelled", style("!").yellow());
    }

    Ok(())
}
