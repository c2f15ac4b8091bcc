//! `batchsim-worker` -- command-line batch runner.
//!
//! Loads a job file, queues every valid line on a fresh scheduler and runs
//! it batch by batch, printing progress to stdout (logs go to stderr).
//! Ctrl-C cancels the run after the job in flight finishes.
//!
//! # Usage
//!
//! ```text
//! batchsim-worker jobs.txt
//! ```

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use batchsim_engine::Scheduler;
use batchsim_worker::cli::Cli;
use batchsim_worker::runner;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let scheduler = Scheduler::new();
    runner::load_jobs(&scheduler, &cli.input)
        .await
        .with_context(|| format!("Failed to load jobs from {}", cli.input.display()))?;

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    let mut stdout = std::io::stdout();
    let summary = runner::drive(&scheduler, &mut stdout, interrupt).await?;

    tracing::info!(
        completed = summary.jobs_completed,
        failed = summary.jobs_failed,
        cancelled = summary.cancelled,
        "Worker finished",
    );
    Ok(())
}
