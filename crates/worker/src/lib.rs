//! `batchsim-worker` library crate.
//!
//! Re-exports the loader, progress reporter and run driver for integration
//! testing. The binary entrypoint lives in `main.rs`.

pub mod cli;
pub mod progress;
pub mod runner;
