//! Job model and job-description validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Seconds};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle of a queued job.
///
/// Transitions only move forward: `Pending -> Processing -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    /// Whether the job has left `Processing` for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Outcome recorded on a job once it leaves `Processing`.
///
/// Serialized untagged so a renderer sees either the number or the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResult {
    Value(f64),
    Failure(String),
}

// ---------------------------------------------------------------------------
// Description (unvalidated input)
// ---------------------------------------------------------------------------

/// A job as submitted by a form or a job file: every field is raw text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDescription {
    pub owner: String,
    pub operation: String,
    pub operand_a: String,
    pub operand_b: String,
    pub estimated_duration: String,
}

/// A description whose fields have been checked and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidJob {
    pub owner: String,
    pub operation: String,
    pub operand_a: f64,
    pub operand_b: f64,
    pub estimated_duration: Seconds,
}

impl JobDescription {
    /// Check every field and parse the numeric ones.
    ///
    /// Owner and operation must be non-blank; operands must be finite
    /// numbers; the duration must be finite and not negative.
    pub fn validate(&self) -> Result<ValidJob, CoreError> {
        let owner = required_text(&self.owner, "owner")?;
        let operation = required_text(&self.operation, "operation")?;
        let operand_a = finite_number(&self.operand_a, "operand_a")?;
        let operand_b = finite_number(&self.operand_b, "operand_b")?;
        let estimated_duration = finite_number(&self.estimated_duration, "estimated_duration")?;
        if estimated_duration < 0.0 {
            return Err(CoreError::Validation(format!(
                "estimated_duration must not be negative, got {estimated_duration}"
            )));
        }

        Ok(ValidJob {
            owner,
            operation,
            operand_a,
            operand_b,
            estimated_duration,
        })
    }
}

fn required_text(value: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn finite_number(value: &str, field: &str) -> Result<f64, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(CoreError::Validation(format!(
            "{field} must be a finite number, got '{trimmed}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One queued unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub owner: String,
    pub operation: String,
    pub operand_a: f64,
    pub operand_b: f64,
    pub estimated_duration: Seconds,
    pub result: Option<JobResult>,
    pub status: JobStatus,
}

impl Job {
    /// Build a fresh `Pending` job from validated input.
    pub fn new(id: JobId, input: ValidJob) -> Self {
        Self {
            id,
            owner: input.owner,
            operation: input.operation,
            operand_a: input.operand_a,
            operand_b: input.operand_b,
            estimated_duration: input.estimated_duration,
            result: None,
            status: JobStatus::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn description(a: &str, b: &str, duration: &str) -> JobDescription {
        JobDescription {
            owner: "ada".into(),
            operation: "add".into(),
            operand_a: a.into(),
            operand_b: b.into(),
            estimated_duration: duration.into(),
        }
    }

    #[test]
    fn valid_description_parses_numbers() {
        let valid = description(" 2 ", "3.5", "1.25").validate().unwrap();
        assert_eq!(valid.owner, "ada");
        assert_eq!(valid.operand_a, 2.0);
        assert_eq!(valid.operand_b, 3.5);
        assert_eq!(valid.estimated_duration, 1.25);
    }

    #[test]
    fn blank_owner_is_rejected() {
        let mut desc = description("1", "2", "0");
        desc.owner = "   ".into();
        assert_matches!(desc.validate(), Err(CoreError::Validation(msg)) if msg.contains("owner"));
    }

    #[test]
    fn missing_operation_is_rejected() {
        let mut desc = description("1", "2", "0");
        desc.operation = String::new();
        assert_matches!(desc.validate(), Err(CoreError::Validation(msg)) if msg.contains("operation"));
    }

    #[test]
    fn non_numeric_operand_is_rejected() {
        assert_matches!(
            description("two", "2", "0").validate(),
            Err(CoreError::Validation(msg)) if msg.contains("operand_a")
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(description("NaN", "1", "0").validate().is_err());
        assert!(description("1", "inf", "0").validate().is_err());
        assert!(description("1", "1", "-inf").validate().is_err());
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert_matches!(
            description("1", "1", "-2").validate(),
            Err(CoreError::Validation(msg)) if msg.contains("negative")
        );
    }

    #[test]
    fn new_job_starts_pending_without_result() {
        let job = Job::new(7, description("1", "1", "0").validate().unwrap());
        assert_eq!(job.id, 7);
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result.is_none());
    }

    #[test]
    fn job_result_serializes_untagged() {
        let value = serde_json::to_value(JobResult::Value(5.0)).unwrap();
        assert_eq!(value, serde_json::json!(5.0));
        let failure = serde_json::to_value(JobResult::Failure("Division by zero".into())).unwrap();
        assert_eq!(failure, serde_json::json!("Division by zero"));
    }
}
