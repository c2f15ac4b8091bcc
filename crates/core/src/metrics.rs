//! Metrics & progress projection.
//!
//! Turns a [`BatchSession`] into a renderable [`SessionSnapshot`]. Nothing
//! here is stored: the projection is recomputed from raw state after every
//! mutation, independent of whatever renders it.

use std::time::Instant;

use serde::Serialize;

use crate::job::Job;
use crate::session::BatchSession;
use crate::types::Seconds;

/// Coarse state of the batch runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    /// Running, with a cancellation waiting for the next job boundary.
    Cancelling,
}

/// Derived timing and progress figures. All times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub pending_count: usize,
    pub current_job_estimate: Option<Seconds>,
    pub global_elapsed: Seconds,
    pub run_elapsed: Seconds,
    pub total_estimated: Seconds,
    pub time_remaining: Seconds,
    pub batch_index: usize,
    pub total_batches: usize,
    pub progress_fraction: f64,
    pub batch_status_label: String,
    pub run_state: RunState,
}

/// Everything a renderer needs: the ordered job list plus derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub jobs: Vec<Job>,
    pub metrics: Metrics,
}

/// Project the full snapshot at instant `now`.
pub fn project(session: &BatchSession, now: Instant) -> SessionSnapshot {
    SessionSnapshot {
        jobs: session.jobs().to_vec(),
        metrics: project_metrics(session, now),
    }
}

/// Project only the derived metrics at instant `now`.
pub fn project_metrics(session: &BatchSession, now: Instant) -> Metrics {
    let jobs = session.jobs();
    let completed = session.completed_count();
    let total_batches = session.total_batches();
    let total_estimated = session.total_estimated_duration();
    let run_elapsed = seconds_since(session.batch_started_at(), now);

    let run_state = match (session.is_running(), session.cancel_requested()) {
        (false, _) => RunState::Idle,
        (true, false) => RunState::Running,
        (true, true) => RunState::Cancelling,
    };

    Metrics {
        pending_count: jobs.len().saturating_sub(completed),
        current_job_estimate: jobs.get(completed).map(|j| j.estimated_duration),
        global_elapsed: seconds_since(session.session_started_at(), now),
        run_elapsed,
        total_estimated,
        time_remaining: (total_estimated - run_elapsed).max(0.0),
        batch_index: session.batch_index(),
        total_batches,
        progress_fraction: progress_fraction(session),
        batch_status_label: format!(
            "Batch {} of {}",
            (session.batch_index() + 1).min(total_batches),
            total_batches
        ),
        run_state,
    }
}

/// Fraction of the queue's batches that have been dispatched, in `[0, 1]`.
///
/// The current batch contributes one batch-size slot per job that already
/// reached a terminal status. Measuring against the batch size rather than
/// the batch's current length keeps the value from moving backwards when a
/// job is appended into a short batch mid-run, and leaves an interrupted
/// batch's finished jobs counted.
pub fn progress_fraction(session: &BatchSession) -> f64 {
    let total_batches = session.total_batches();
    if total_batches == 0 {
        return 0.0;
    }

    let range = session.batch_range(session.batch_index());
    let finished = session.jobs()[range]
        .iter()
        .filter(|j| j.status.is_terminal())
        .count();
    let batches_done =
        session.batch_index() as f64 + finished as f64 / session.batch_size() as f64;

    (batches_done / total_batches as f64).clamp(0.0, 1.0)
}

fn seconds_since(start: Option<Instant>, now: Instant) -> Seconds {
    start
        .map(|s| now.saturating_duration_since(s).as_secs_f64())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
