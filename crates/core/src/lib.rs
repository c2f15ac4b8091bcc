//! Batch simulator core.
//!
//! Pure building blocks for the batch scheduler: the job model, the
//! operation evaluator, the synchronous session state machine, the metrics
//! projector and the job-file loader. Nothing in this crate sleeps or does
//! async work; the engine crate drives the session on a real clock.

pub mod clock;
pub mod error;
pub mod job;
pub mod job_file;
pub mod metrics;
pub mod operation;
pub mod session;
pub mod types;
