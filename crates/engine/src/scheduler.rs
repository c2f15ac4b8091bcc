//! Batch runner: drives a [`BatchSession`] on the tokio clock.
//!
//! The session lock is only held for the synchronous transitions, never
//! across a simulated wait, so `add`, `cancel` and `snapshot` stay
//! responsive while a job is "working". Cancellation is observed between
//! jobs and between batches; an in-flight wait always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use batchsim_core::job::{Job, JobDescription, JobStatus};
use batchsim_core::metrics::SessionSnapshot;
use batchsim_core::session::{BatchSession, BatchTicket, RunTicket};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::bus::SnapshotBus;
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Per-batch tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// 0-based batch index.
    pub batch: usize,
    pub completed: usize,
    pub failed: usize,
}

/// What a single [`Scheduler::run_next_batch`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every job in the batch reached a terminal status.
    Completed(BatchReport),
    /// Cancellation was observed between two jobs of the batch.
    Interrupted(BatchReport),
    /// The session was cleared while the batch was in flight.
    Abandoned,
    /// Nothing to do: a batch is already running or the queue is exhausted.
    Skipped,
}

/// Totals for one [`Scheduler::start`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub batches_completed: usize,
    pub jobs_completed: usize,
    pub jobs_failed: usize,
    pub cancelled: bool,
}

impl RunSummary {
    fn absorb(&mut self, report: BatchReport) {
        self.jobs_completed += report.completed;
        self.jobs_failed += report.failed;
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Shared handle to one batch session.
///
/// Cheaply cloneable; every clone drives and observes the same session.
#[derive(Clone, Default)]
pub struct Scheduler {
    session: Arc<Mutex<BatchSession>>,
    bus: Arc<SnapshotBus>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the snapshot published after every mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.bus.subscribe()
    }

    /// Current snapshot, projected at this instant.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot(now())
    }

    /// Validate and queue a job. Returns the stored job.
    pub async fn add(&self, description: &JobDescription) -> Result<Job, EngineError> {
        let mut session = self.session.lock().await;
        let job = session.add(description)?.clone();
        tracing::debug!(
            job_id = job.id,
            owner = %job.owner,
            operation = %job.operation,
            "Job queued",
        );
        self.publish(&session);
        Ok(job)
    }

    /// Empty the queue and reset every scheduler field.
    ///
    /// A run in flight is abandoned at its next transition, and a new run
    /// may start right away.
    pub async fn clear(&self) {
        let mut session = self.session.lock().await;
        session.clear();
        tracing::info!("Session cleared");
        self.publish(&session);
    }

    /// Request cancellation. Takes effect at the next job or batch boundary.
    pub async fn cancel(&self) {
        let mut session = self.session.lock().await;
        if session.cancel_requested() {
            return;
        }
        session.request_cancel();
        tracing::info!(running = session.is_running(), "Cancellation requested");
        self.publish(&session);
    }

    /// Drive batches until the queue is exhausted or cancellation is seen.
    ///
    /// Clears any earlier cancellation first. Returns
    /// [`EngineError::AlreadyRunning`] without touching the session if
    /// another run or batch is in progress.
    pub async fn start(&self) -> Result<RunSummary, EngineError> {
        let run = {
            let mut session = self.session.lock().await;
            let Some(run) = session.begin_run() else {
                tracing::warn!("Start ignored: a run is already in progress");
                return Err(EngineError::AlreadyRunning);
            };
            tracing::info!(
                jobs = session.jobs().len(),
                total_batches = session.total_batches(),
                batch_index = session.batch_index(),
                "Run started",
            );
            run
        };

        let mut summary = RunSummary::default();
        loop {
            {
                let session = self.session.lock().await;
                if !session.is_current_run(&run) || !session.has_remaining_batches() {
                    break;
                }
                if session.cancel_requested() {
                    summary.cancelled = true;
                    break;
                }
            }

            match self.advance(Some(&run)).await {
                BatchOutcome::Completed(report) => {
                    summary.absorb(report);
                    summary.batches_completed += 1;
                }
                BatchOutcome::Interrupted(report) => {
                    summary.absorb(report);
                    summary.cancelled = true;
                    break;
                }
                BatchOutcome::Abandoned | BatchOutcome::Skipped => break,
            }
        }

        {
            let mut session = self.session.lock().await;
            let batch_index = session.batch_index();
            session.end_run(&run);
            if session.batch_index() != batch_index {
                tracing::debug!(
                    batch = session.batch_index() + 1,
                    "Reopened a batch that gained jobs during the run",
                );
                self.publish(&session);
            }
        }

        tracing::info!(
            batches = summary.batches_completed,
            completed = summary.jobs_completed,
            failed = summary.jobs_failed,
            cancelled = summary.cancelled,
            "Run finished",
        );
        Ok(summary)
    }

    /// Advance exactly one batch.
    ///
    /// Each job is moved to `Processing`, waits its simulated duration,
    /// then is evaluated. A snapshot is published around every job and when
    /// the batch closes.
    pub async fn run_next_batch(&self) -> BatchOutcome {
        self.advance(None).await
    }

    /// One batch, optionally on behalf of the run `run`.
    ///
    /// The batch's end is re-read after every job, so jobs appended into a
    /// short batch while it runs are dispatched in the same pass.
    async fn advance(&self, run: Option<&RunTicket>) -> BatchOutcome {
        let ticket = {
            let mut session = self.session.lock().await;
            if run.is_some_and(|run| !session.is_current_run(run)) {
                return BatchOutcome::Abandoned;
            }
            let Some(ticket) = session.begin_batch(now()) else {
                return BatchOutcome::Skipped;
            };
            tracing::info!(
                batch = ticket.batch + 1,
                total_batches = session.total_batches(),
                jobs = ticket.range.len(),
                "Batch started",
            );
            self.publish(&session);
            ticket
        };

        let mut report = BatchReport {
            batch: ticket.batch,
            ..BatchReport::default()
        };
        let mut index = ticket.range.start;

        loop {
            let duration = {
                let mut session = self.session.lock().await;
                if !session.is_current(&ticket) {
                    tracing::info!(batch = ticket.batch + 1, "Batch abandoned after clear");
                    return BatchOutcome::Abandoned;
                }
                if index >= session.batch_range(ticket.batch).end {
                    return self.close_batch(&mut session, &ticket, report);
                }
                let Some(duration) = session.start_job(&ticket, index) else {
                    index += 1;
                    continue;
                };
                let job = &session.jobs()[index];
                tracing::info!(
                    job_id = job.id,
                    operation = %job.operation,
                    operand_a = job.operand_a,
                    operand_b = job.operand_b,
                    estimated_secs = duration,
                    "Job processing",
                );
                self.publish(&session);
                duration
            };

            // The simulated work itself: never interrupted.
            tokio::time::sleep(simulated(duration)).await;

            let mut session = self.session.lock().await;
            let Some(job) = session.finish_job(&ticket, index) else {
                tracing::info!(batch = ticket.batch + 1, "Batch abandoned after clear");
                return BatchOutcome::Abandoned;
            };
            match job.status {
                JobStatus::Completed => report.completed += 1,
                _ => report.failed += 1,
            }
            log_finished(job);
            self.publish(&session);
            index += 1;

            // Closing under the same lock leaves no gap for a job to be
            // appended after the batch looked finished.
            if index >= session.batch_range(ticket.batch).end {
                return self.close_batch(&mut session, &ticket, report);
            }
            if session.cancel_requested() {
                session.abort_batch(&ticket);
                tracing::info!(batch = ticket.batch + 1, "Batch interrupted by cancellation");
                self.publish(&session);
                return BatchOutcome::Interrupted(report);
            }
        }
    }

    fn close_batch(
        &self,
        session: &mut BatchSession,
        ticket: &BatchTicket,
        report: BatchReport,
    ) -> BatchOutcome {
        session.end_batch(ticket);
        tracing::info!(
            batch = ticket.batch + 1,
            completed = report.completed,
            failed = report.failed,
            "Batch finished",
        );
        self.publish(session);
        BatchOutcome::Completed(report)
    }

    fn publish(&self, session: &BatchSession) {
        if self.bus.has_subscribers() {
            self.bus.publish(session.snapshot(now()));
        }
    }
}

fn log_finished(job: &Job) {
    match job.status {
        JobStatus::Completed => tracing::info!(job_id = job.id, result = ?job.result, "Job completed"),
        _ => tracing::warn!(job_id = job.id, reason = ?job.result, "Job failed"),
    }
}

/// Current instant on the tokio clock, so paused-time tests see virtual time.
fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

fn simulated(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}
