//! Integration tests for the file-driven batch runner.

use std::io::Write;
use std::time::Duration;

use assert_matches::assert_matches;
use batchsim_core::job::JobStatus;
use batchsim_core::job_file::JobFileError;
use batchsim_engine::Scheduler;
use batchsim_worker::runner::{self, WorkerError};
use tempfile::NamedTempFile;

/// Write `lines` to a temporary job file.
fn job_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

// ---------------------------------------------------------------------------
// Test: loading skips malformed lines and queues the rest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_queues_valid_lines_only() {
    let file = job_file(&[
        "# id,owner,operation,a,b,time",
        "1,ada,+,2,3,0",
        "2,ada,*,oops,3,0",
        "3,grace,residue,7,3,0",
    ]);
    let scheduler = Scheduler::new();

    let queued = runner::load_jobs(&scheduler, file.path()).await.unwrap();

    assert_eq!(queued, 2);
    let ids: Vec<_> = scheduler.snapshot().await.jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

// ---------------------------------------------------------------------------
// Test: a file without valid jobs is an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_without_valid_jobs_fails() {
    let file = job_file(&["# nothing here", "1,ada"]);
    let scheduler = Scheduler::new();

    assert_matches!(
        runner::load_jobs(&scheduler, file.path()).await,
        Err(WorkerError::NoValidJobs(_))
    );
}

#[tokio::test]
async fn load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = Scheduler::new();

    assert_matches!(
        runner::load_jobs(&scheduler, &dir.path().join("jobs.txt")).await,
        Err(WorkerError::JobFile(JobFileError::NotFound(_)))
    );
}

// ---------------------------------------------------------------------------
// Test: driving a run prints batch headers, job lines and the total
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn drive_prints_progress_and_total() {
    let file = job_file(&[
        "1,ada,+,2,3,1",
        "2,ada,/,10,0,1",
        "3,ada,*,4,5,1",
        "4,ada,potency,2,10,1",
        "5,ada,-,5,1,1",
    ]);
    let scheduler = Scheduler::new();
    runner::load_jobs(&scheduler, file.path()).await.unwrap();

    let mut out = Vec::new();
    let summary = runner::drive(&scheduler, &mut out, std::future::pending())
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.jobs_completed, 4);
    assert_eq!(summary.jobs_failed, 1);
    assert!(!summary.cancelled);

    assert!(text.contains("Current batch: 1/2"), "{text}");
    assert!(text.contains("Current batch: 2/2"), "{text}");
    assert!(text.contains("ID: 1, Operation: +, Result: 5"), "{text}");
    assert!(text.contains("ID: 2, Operation: /, Failed: Division by zero"), "{text}");
    assert!(text.contains("ID: 4, Operation: potency, Result: 1024"), "{text}");
    assert!(text.contains("Total jobs executed: 5 (4 completed, 1 failed)"), "{text}");
    assert!(text.contains("Elapsed: 00:05"), "{text}");

    let first_batch = text.find("Current batch: 1/2").unwrap();
    let second_batch = text.find("Current batch: 2/2").unwrap();
    let job_five = text.find("ID: 5, Owner").unwrap();
    assert!(first_batch < second_batch && second_batch < job_five);
}

// ---------------------------------------------------------------------------
// Test: an interrupt cancels after the in-flight job
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn interrupt_cancels_after_in_flight_job() {
    let file = job_file(&[
        "1,ada,+,1,1,1",
        "2,ada,+,1,1,1",
        "3,ada,+,1,1,1",
        "4,ada,+,1,1,1",
        "5,ada,+,1,1,1",
    ]);
    let scheduler = Scheduler::new();
    runner::load_jobs(&scheduler, file.path()).await.unwrap();

    let interrupt = tokio::time::sleep(Duration::from_millis(500));
    let mut out = Vec::new();
    let summary = runner::drive(&scheduler, &mut out, interrupt).await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.jobs_completed, 1);
    assert!(text.contains("Run cancelled"), "{text}");

    let statuses: Vec<_> = scheduler
        .snapshot()
        .await
        .jobs
        .iter()
        .map(|j| j.status)
        .collect();
    assert_eq!(statuses[0], JobStatus::Completed);
    assert!(statuses[1..].iter().all(|s| *s == JobStatus::Pending));
}
