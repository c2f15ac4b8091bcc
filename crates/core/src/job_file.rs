//! Plain-text job file loader.
//!
//! One job per line:
//!
//! ```text
//! # id,owner,operation,operand_a,operand_b,estimated_duration
//! 1,ada,+,2,3,1.5
//! 2,grace,divide,10,0,0.5
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A malformed line is
//! reported and skipped; it never aborts the load. The leading id column
//! must be an integer but is otherwise ignored: ids are assigned when the
//! jobs are queued.

use std::path::Path;

use crate::job::JobDescription;

/// Number of comma-separated columns in a job line.
const COLUMN_COUNT: usize = 6;

/// Column names, in file order, used in error messages.
const COLUMNS: [&str; COLUMN_COUNT] = [
    "id",
    "owner",
    "operation",
    "operand_a",
    "operand_b",
    "estimated_duration",
];

#[derive(Debug, thiserror::Error)]
pub enum JobFileError {
    #[error("Job file does not exist: {0}")]
    NotFound(String),

    #[error("Failed to read job file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A line that could not be turned into a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number in the source text.
    pub line: usize,
    pub reason: String,
}

/// Result of parsing a job file: accepted descriptions plus rejected lines.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub jobs: Vec<JobDescription>,
    pub rejected: Vec<LineError>,
}

/// Read and parse the job file at `path`.
pub fn load(path: &Path) -> Result<LoadReport, JobFileError> {
    if !path.exists() {
        return Err(JobFileError::NotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| JobFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse(&text))
}

/// Parse job-file text.
pub fn parse(text: &str) -> LoadReport {
    let mut report = LoadReport::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim_start_matches(' ');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Ok(job) => report.jobs.push(job),
            Err(reason) => report.rejected.push(LineError {
                line: index + 1,
                reason,
            }),
        }
    }

    report
}

fn parse_line(line: &str) -> Result<JobDescription, String> {
    let fields: Vec<&str> = line.splitn(COLUMN_COUNT, ',').collect();
    if fields.len() < COLUMN_COUNT {
        return Err(format!("Missing {}", COLUMNS[fields.len()]));
    }

    let id = fields[0].trim();
    if id.parse::<i64>().is_err() {
        return Err(format!("Invalid id '{id}'"));
    }

    let description = JobDescription {
        owner: fields[1].to_string(),
        operation: fields[2].to_string(),
        operand_a: fields[3].to_string(),
        operand_b: fields[4].to_string(),
        estimated_duration: fields[5].to_string(),
    };
    description.validate().map_err(|e| e.to_string())?;
    Ok(description)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
