//! Console progress reporting.
//!
//! [`ProgressTracker`] diffs consecutive snapshots and turns the changes
//! into the lines a console user sees: a header whenever a new batch
//! starts, one line when a job starts and one when it finishes.

use batchsim_core::job::{Job, JobResult, JobStatus};
use batchsim_core::metrics::{RunState, SessionSnapshot};

#[derive(Debug, Default)]
pub struct ProgressTracker {
    /// Batch whose header was printed last.
    announced_batch: Option<usize>,
    /// Status of every job at the previous snapshot.
    statuses: Vec<JobStatus>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines describing what changed since the previous snapshot.
    pub fn observe(&mut self, snapshot: &SessionSnapshot) -> Vec<String> {
        let mut lines = Vec::new();
        let metrics = &snapshot.metrics;

        // A shorter job list means the session was cleared.
        if snapshot.jobs.len() < self.statuses.len() {
            *self = Self::default();
        }

        if metrics.run_state != RunState::Idle && self.announced_batch != Some(metrics.batch_index)
        {
            self.announced_batch = Some(metrics.batch_index);
            lines.push(format!(
                "Current batch: {}/{}",
                metrics.batch_index + 1,
                metrics.total_batches
            ));
        }

        for (index, job) in snapshot.jobs.iter().enumerate() {
            let previous = self.statuses.get(index).copied();
            if previous == Some(job.status) {
                continue;
            }
            match job.status {
                JobStatus::Processing => lines.push(started_line(job)),
                JobStatus::Completed | JobStatus::Failed => lines.push(finished_line(job)),
                JobStatus::Pending => {}
            }
        }

        self.statuses = snapshot.jobs.iter().map(|j| j.status).collect();
        lines
    }
}

fn started_line(job: &Job) -> String {
    format!(
        "ID: {}, Owner: {}, Operation: {}, Data1: {}, Data2: {}, Estimated: {:.2}s",
        job.id, job.owner, job.operation, job.operand_a, job.operand_b, job.estimated_duration
    )
}

fn finished_line(job: &Job) -> String {
    let outcome = match &job.result {
        Some(JobResult::Value(v)) => format!("Result: {v}"),
        Some(JobResult::Failure(reason)) => format!("Failed: {reason}"),
        None => "Result: -".to_string(),
    };
    format!("ID: {}, Operation: {}, {}", job.id, job.operation, outcome)
}
