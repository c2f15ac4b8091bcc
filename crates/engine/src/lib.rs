//! Async driver for the batch session.
//!
//! [`Scheduler`] wraps a [`BatchSession`](batchsim_core::session::BatchSession)
//! in a cheaply cloneable handle, runs the simulated per-job waits on the
//! tokio clock and fans every state change out on a [`SnapshotBus`].

pub mod bus;
pub mod error;
pub mod scheduler;

pub use bus::SnapshotBus;
pub use error::EngineError;
pub use scheduler::{BatchOutcome, BatchReport, RunSummary, Scheduler};
