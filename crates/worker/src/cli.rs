use std::path::PathBuf;

use clap::Parser;

/// Run a file of arithmetic jobs through the batch simulator.
#[derive(Parser, Debug)]
#[command(name = "batchsim-worker")]
#[command(about = "Runs queued arithmetic jobs in batches of four with simulated durations")]
pub struct Cli {
    /// Job file: one `id,owner,operation,operand_a,operand_b,estimated_duration` per line
    pub input: PathBuf,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "batchsim_worker=info,batchsim_engine=info")]
    pub log_level: String,
}
