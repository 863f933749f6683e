//! lexflow command line
//!
//! Runs migrations, workers and one-off pipeline and patch commands.

#![allow(missing_docs)]

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use lexflow::config::{Config, QueueBackend};
use lexflow::core::models::NewLexeme;
use lexflow::storage::WorkItemRepository;
use lexflow::storage::queue::Task;
use lexflow::utils::logging::init_tracing;
use lexflow::Runtime;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "lexflow", version, about = "Batch lexeme pipeline and patch applier")]
struct Cli {
    /// YAML configuration file; environment variables are used when absent
    #[arg(short, long, env = "LEXFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply database migrations
    Migrate,
    /// Consume queued tasks until interrupted
    Worker,
    /// Record lexemes for processing
    AddLexemes {
        /// Source texts
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Create a run for a processor and queue its dispatch
    CreateRun {
        /// Configured processor name
        processor: String,
    },
    /// Queue the dispatch of an existing run
    Dispatch { run_id: i64 },
    /// Print a run's progress as JSON
    Status { run_id: i64 },
    /// Apply an approved review to its file
    Apply { review_id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path).await,
        None => Config::from_env(),
    }
    .context("loading configuration")?;
    init_tracing(&config.logging)?;

    let local_queue = config.queue.backend == QueueBackend::Local;
    let runtime = Runtime::new(config).await?;

    match cli.command {
        Command::Migrate => {
            runtime.storage.migrate().await?;
            println!("migrations applied");
        }
        Command::Worker => {
            if local_queue {
                bail!("the worker needs a shared queue; set queue.backend to redis");
            }
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, finishing in-flight tasks");
                    let _ = shutdown_tx.send(true);
                }
            });
            runtime.work(shutdown_rx).await?;
        }
        Command::AddLexemes { texts } => {
            for text in texts {
                let lexeme = runtime.storage.database.upsert_lexeme(NewLexeme::new(text)).await?;
                println!("{}\t{}\t{}", lexeme.id, lexeme.status, lexeme.normalized_text);
            }
        }
        Command::CreateRun { processor } => {
            let run = runtime.pipeline.submit(&processor).await?;
            println!("run {} created", run.id);
            if local_queue {
                runtime.drain().await?;
                print_status(&runtime, run.id).await?;
            }
        }
        Command::Dispatch { run_id } => {
            runtime.queue.enqueue(Task::Dispatch { run_id }).await?;
            println!("dispatch of run {} queued", run_id);
            if local_queue {
                runtime.drain().await?;
                print_status(&runtime, run_id).await?;
            }
        }
        Command::Status { run_id } => print_status(&runtime, run_id).await?,
        Command::Apply { review_id } => {
            let report = runtime.patches.apply(review_id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                bail!("review {} was not applied: {}", review_id, report.message);
            }
        }
    }

    Ok(())
}

async fn print_status(runtime: &Runtime, run_id: i64) -> anyhow::Result<()> {
    let run = runtime
        .storage
        .database
        .get_run(run_id)
        .await?
        .with_context(|| format!("run {} not found", run_id))?;
    let progress = runtime.pipeline.snapshot(run_id).await?;
    let status = serde_json::json!({
        "run_id": run.id,
        "processor": run.processor,
        "status": run.status,
        "error": run.error,
        "progress": progress,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
