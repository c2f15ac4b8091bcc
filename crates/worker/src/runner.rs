//! Load a job file into a scheduler and drive it to completion.

use std::future::Future;
use std::io::Write;
use std::path::Path;

use batchsim_core::clock::format_clock;
use batchsim_core::job_file::{self, JobFileError};
use batchsim_engine::{EngineError, RunSummary, Scheduler};
use tokio::sync::broadcast::error::RecvError;

use crate::progress::ProgressTracker;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    JobFile(#[from] JobFileError),

    #[error("No valid jobs were loaded from {0}")]
    NoValidJobs(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to write progress output: {0}")]
    Output(#[from] std::io::Error),
}

/// Parse `path` and queue every valid job on `scheduler`.
///
/// Malformed lines are logged and skipped. Returns the number of jobs
/// queued, or [`WorkerError::NoValidJobs`] when none survived.
pub async fn load_jobs(scheduler: &Scheduler, path: &Path) -> Result<usize, WorkerError> {
    let report = job_file::load(path)?;

    for rejected in &report.rejected {
        tracing::warn!(
            line = rejected.line,
            reason = %rejected.reason,
            "Skipping malformed job line",
        );
    }

    let mut queued = 0;
    for description in &report.jobs {
        scheduler.add(description).await?;
        queued += 1;
    }

    if queued == 0 {
        return Err(WorkerError::NoValidJobs(path.display().to_string()));
    }

    tracing::info!(
        path = %path.display(),
        queued,
        rejected = report.rejected.len(),
        "Job file loaded",
    );
    Ok(queued)
}

/// Run every queued batch, writing progress lines to `out`.
///
/// When `interrupt` resolves the run is cancelled; the job in flight still
/// finishes before this returns.
pub async fn drive<W, F>(
    scheduler: &Scheduler,
    out: &mut W,
    interrupt: F,
) -> Result<RunSummary, WorkerError>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut rx = scheduler.subscribe();
    let mut tracker = ProgressTracker::new();
    let mut interrupted = false;

    let run = scheduler.start();
    tokio::pin!(run);
    tokio::pin!(interrupt);

    let summary = loop {
        tokio::select! {
            result = &mut run => break result?,
            received = rx.recv() => match received {
                Ok(snapshot) => {
                    for line in tracker.observe(&snapshot) {
                        writeln!(out, "{line}")?;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Progress output lagged behind");
                }
                Err(RecvError::Closed) => {}
            },
            () = &mut interrupt, if !interrupted => {
                interrupted = true;
                tracing::info!("Interrupt received, finishing the job in flight");
                scheduler.cancel().await;
            }
        }
    };

    // Snapshots published after the last poll.
    while let Ok(snapshot) = rx.try_recv() {
        for line in tracker.observe(&snapshot) {
            writeln!(out, "{line}")?;
        }
    }

    let elapsed = scheduler.snapshot().await.metrics.global_elapsed;
    writeln!(out)?;
    writeln!(
        out,
        "Total jobs executed: {} ({} completed, {} failed)",
        summary.jobs_completed + summary.jobs_failed,
        summary.jobs_completed,
        summary.jobs_failed
    )?;
    writeln!(out, "Elapsed: {}", format_clock(elapsed))?;
    if summary.cancelled {
        writeln!(out, "Run cancelled before the queue was exhausted")?;
    }

    Ok(summary)
}
