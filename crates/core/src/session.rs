//! Synchronous batch session state machine.
//!
//! [`BatchSession`] owns the job queue and every scheduler field. It never
//! sleeps: advancing a batch is split into discrete transitions
//! ([`begin_batch`](BatchSession::begin_batch),
//! [`start_job`](BatchSession::start_job),
//! [`finish_job`](BatchSession::finish_job),
//! [`end_batch`](BatchSession::end_batch)) so that a driver can wait between
//! them on whatever clock it likes without holding the session.
//!
//! A driving loop is bracketed by [`begin_run`](BatchSession::begin_run) and
//! [`end_run`](BatchSession::end_run). Every transition taking a
//! [`BatchTicket`] or [`RunTicket`] is a no-op when the session has been
//! cleared since the ticket was issued.

use std::ops::Range;
use std::time::Instant;

use crate::error::CoreError;
use crate::job::{Job, JobDescription, JobResult, JobStatus};
use crate::metrics::{self, SessionSnapshot};
use crate::operation::evaluate;
use crate::types::{JobId, Seconds, BATCH_SIZE};

/// Proof that a batch was opened by [`BatchSession::begin_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTicket {
    epoch: u64,
    /// 0-based index of the batch being advanced.
    pub batch: usize,
    /// Queue indices covered when the batch opened. Jobs appended into a
    /// short batch while it runs extend it; see
    /// [`BatchSession::batch_range`].
    pub range: Range<usize>,
}

/// Proof that a driving loop was opened by [`BatchSession::begin_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    epoch: u64,
}

/// One scheduler session: the job queue plus its batch bookkeeping.
#[derive(Debug, Clone)]
pub struct BatchSession {
    jobs: Vec<Job>,
    batch_index: usize,
    batch_size: usize,
    running: bool,
    /// A driving loop owns the session, possibly between two batches.
    run_active: bool,
    cancel_requested: bool,
    session_started_at: Option<Instant>,
    batch_started_at: Option<Instant>,
    total_estimated_duration: Seconds,
    completed_count: usize,
    /// Bumped on every `clear` so stale tickets are ignored.
    epoch: u64,
}

impl Default for BatchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchSession {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            batch_index: 0,
            batch_size: BATCH_SIZE,
            running: false,
            run_active: false,
            cancel_requested: false,
            session_started_at: None,
            batch_started_at: None,
            total_estimated_duration: 0.0,
            completed_count: 0,
            epoch: 0,
        }
    }

    // -- Queue management -----------------------------------------------------

    /// Validate `description` and append it as a new `Pending` job.
    ///
    /// The id is the queue length plus one. On error the queue is untouched.
    /// A job landing in a short batch that already closed reopens that batch,
    /// unless a run is active; the run reopens it when it ends.
    pub fn add(&mut self, description: &JobDescription) -> Result<&Job, CoreError> {
        let valid = description.validate()?;
        let id = self.jobs.len() as JobId + 1;
        self.jobs.push(Job::new(id, valid));
        if !self.running && !self.run_active {
            self.reopen_stragglers();
        }
        Ok(&self.jobs[self.jobs.len() - 1])
    }

    /// Drop every job and reset all scheduler fields to their initial values.
    pub fn clear(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = Self::new();
        self.epoch = epoch;
    }

    // -- Accessors ------------------------------------------------------------

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a driving loop currently owns the session.
    pub fn is_run_active(&self) -> bool {
        self.run_active
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn session_started_at(&self) -> Option<Instant> {
        self.session_started_at
    }

    pub fn batch_started_at(&self) -> Option<Instant> {
        self.batch_started_at
    }

    pub fn total_estimated_duration(&self) -> Seconds {
        self.total_estimated_duration
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// `ceil(queue length / batch size)`.
    pub fn total_batches(&self) -> usize {
        self.jobs.len().div_ceil(self.batch_size)
    }

    /// Whether any batch is left to dispatch.
    pub fn has_remaining_batches(&self) -> bool {
        self.batch_index * self.batch_size < self.jobs.len()
    }

    /// Queue indices of the batch at `batch_index`, as the queue stands now.
    pub fn batch_range(&self, batch_index: usize) -> Range<usize> {
        let start = (batch_index * self.batch_size).min(self.jobs.len());
        let end = (start + self.batch_size).min(self.jobs.len());
        start..end
    }

    // -- Cancellation ---------------------------------------------------------

    /// Ask the driver to stop at the next job or batch boundary.
    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    // -- Runs -----------------------------------------------------------------

    /// Open a driving loop and clear any earlier cancellation.
    ///
    /// Returns `None` while another run is active or a batch is in flight.
    pub fn begin_run(&mut self) -> Option<RunTicket> {
        if self.run_active || self.running {
            return None;
        }
        self.run_active = true;
        self.cancel_requested = false;
        Some(RunTicket { epoch: self.epoch })
    }

    /// Whether `run` still owns the session.
    pub fn is_current_run(&self, run: &RunTicket) -> bool {
        self.run_active && run.epoch == self.epoch
    }

    /// Close a driving loop. Jobs appended into a closed short batch while
    /// it ran are reopened for the next run.
    pub fn end_run(&mut self, run: &RunTicket) {
        if !self.is_current_run(run) {
            return;
        }
        self.run_active = false;
        self.reopen_stragglers();
    }

    // -- Batch transitions ----------------------------------------------------

    /// Open the next batch.
    ///
    /// On the first batch of the session this records the start instants
    /// and freezes the total estimated duration. Returns `None` (and changes
    /// nothing) when a batch is already running or the queue is exhausted.
    pub fn begin_batch(&mut self, now: Instant) -> Option<BatchTicket> {
        if self.running || !self.has_remaining_batches() {
            return None;
        }

        if self.session_started_at.is_none() {
            self.session_started_at = Some(now);
            self.batch_started_at = Some(now);
            self.total_estimated_duration =
                self.jobs.iter().map(|j| j.estimated_duration).sum();
        }

        self.running = true;
        self.completed_count = 0;

        Some(BatchTicket {
            epoch: self.epoch,
            batch: self.batch_index,
            range: self.batch_range(self.batch_index),
        })
    }

    /// Move the job at `index` to `Processing` and return how long its
    /// simulated work lasts.
    ///
    /// Returns `None` for jobs that are not `Pending` (already finished by
    /// an earlier, cancelled pass over the same batch) or a stale ticket.
    pub fn start_job(&mut self, ticket: &BatchTicket, index: usize) -> Option<Seconds> {
        if !self.is_current(ticket) || !self.batch_range(ticket.batch).contains(&index) {
            return None;
        }
        let job = self.jobs.get_mut(index)?;
        if job.status != JobStatus::Pending {
            return None;
        }
        job.status = JobStatus::Processing;
        Some(job.estimated_duration)
    }

    /// Evaluate the job at `index` and record its terminal status.
    ///
    /// Evaluation failures mark the job `Failed` with a readable reason;
    /// they never abort the batch.
    pub fn finish_job(&mut self, ticket: &BatchTicket, index: usize) -> Option<&Job> {
        if !self.is_current(ticket) {
            return None;
        }
        let job = self.jobs.get_mut(index)?;
        if job.status != JobStatus::Processing {
            return None;
        }

        match evaluate(&job.operation, job.operand_a, job.operand_b) {
            Ok(value) => {
                job.result = Some(JobResult::Value(value));
                job.status = JobStatus::Completed;
                self.completed_count += 1;
            }
            Err(e) => {
                job.result = Some(JobResult::Failure(e.to_string()));
                job.status = JobStatus::Failed;
            }
        }
        Some(&self.jobs[index])
    }

    /// Close a fully dispatched batch and advance to the next one.
    ///
    /// `batch_index` only ever moves forward here.
    pub fn end_batch(&mut self, ticket: &BatchTicket) {
        if !self.is_current(ticket) {
            return;
        }
        self.batch_index += 1;
        self.running = false;
    }

    /// Close a batch interrupted by cancellation without advancing.
    ///
    /// Jobs still `Pending` in the batch are dispatched by the next run.
    pub fn abort_batch(&mut self, ticket: &BatchTicket) {
        if !self.is_current(ticket) {
            return;
        }
        self.running = false;
    }

    /// Whether `ticket` still refers to the batch in progress.
    pub fn is_current(&self, ticket: &BatchTicket) -> bool {
        self.running && ticket.epoch == self.epoch && ticket.batch == self.batch_index
    }

    /// Rewind `batch_index` to the batch of the first `Pending` job when a
    /// job was appended into a short batch that had already closed.
    fn reopen_stragglers(&mut self) {
        if let Some(first) = self.jobs.iter().position(|j| j.status == JobStatus::Pending) {
            self.batch_index = self.batch_index.min(first / self.batch_size);
        }
    }

    // -- Projection -----------------------------------------------------------

    /// Project the current state into a renderable snapshot.
    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        metrics::project(self, now)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
