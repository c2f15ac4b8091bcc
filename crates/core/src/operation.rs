//! Arithmetic operations and their evaluator.
//!
//! Jobs carry the operation tag exactly as it was entered. The tag is only
//! resolved at evaluation time, so an unknown tag fails that single job
//! instead of being rejected when the job is queued.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A recognised arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

/// All recognised operations, in display order.
pub const ALL_OPERATIONS: &[Operation] = &[
    Operation::Add,
    Operation::Subtract,
    Operation::Multiply,
    Operation::Divide,
    Operation::Modulo,
    Operation::Power,
];

impl Operation {
    /// Canonical tag for this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Modulo => "modulo",
            Self::Power => "power",
        }
    }

    /// Apply the operation to two operands.
    ///
    /// `Modulo` is the truncating remainder (sign follows `a`). `Power`
    /// uses [`f64::powf`], so `0^0 == 1` and fractional or negative
    /// exponents follow IEEE semantics.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, EvalError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide | Self::Modulo if b == 0.0 => Err(EvalError::DivisionByZero),
            Self::Divide => Ok(a / b),
            Self::Modulo => Ok(a % b),
            Self::Power => Ok(a.powf(b)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = EvalError;

    /// Accepts the canonical names plus the symbolic and legacy aliases
    /// (`+ - * / % ^ residue potency`). Matching is case-insensitive.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "add" | "+" => Ok(Self::Add),
            "subtract" | "-" => Ok(Self::Subtract),
            "multiply" | "*" => Ok(Self::Multiply),
            "divide" | "/" => Ok(Self::Divide),
            "modulo" | "%" | "residue" => Ok(Self::Modulo),
            "power" | "^" | "potency" => Ok(Self::Power),
            _ => Err(EvalError::UnsupportedOperation(tag.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Per-job evaluation failure. The Display text is what gets recorded as
/// the failed job's result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid operation: {0}")]
    UnsupportedOperation(String),
}

/// Resolve `tag` and apply it to `a` and `b`.
pub fn evaluate(tag: &str, a: f64, b: f64) -> Result<f64, EvalError> {
    tag.parse::<Operation>()?.apply(a, b)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SAMPLES: &[f64] = &[0.0, 1.0, -1.0, 2.5, -7.25, 1e-9, 123456.789, -0.5];

    #[test]
    fn basic_arithmetic() {
        assert_eq!(evaluate("add", 2.0, 3.0), Ok(5.0));
        assert_eq!(evaluate("subtract", 5.0, 1.0), Ok(4.0));
        assert_eq!(evaluate("multiply", 4.0, 5.0), Ok(20.0));
        assert_eq!(evaluate("divide", 10.0, 4.0), Ok(2.5));
        assert_eq!(evaluate("power", 2.0, 10.0), Ok(1024.0));
    }

    #[test]
    fn aliases_resolve_to_same_operation() {
        assert_eq!("+".parse::<Operation>(), Ok(Operation::Add));
        assert_eq!("residue".parse::<Operation>(), Ok(Operation::Modulo));
        assert_eq!("potency".parse::<Operation>(), Ok(Operation::Power));
        assert_eq!(" Divide ".parse::<Operation>(), Ok(Operation::Divide));
    }

    #[test]
    fn canonical_names_round_trip() {
        for op in ALL_OPERATIONS {
            assert_eq!(op.as_str().parse::<Operation>(), Ok(*op));
        }
    }

    #[test]
    fn divide_and_modulo_by_zero_fail() {
        for &a in SAMPLES {
            assert_eq!(evaluate("divide", a, 0.0), Err(EvalError::DivisionByZero));
            assert_eq!(evaluate("modulo", a, 0.0), Err(EvalError::DivisionByZero));
            assert_eq!(evaluate("/", a, -0.0), Err(EvalError::DivisionByZero));
        }
    }

    #[test]
    fn modulo_sign_follows_numerator() {
        assert_eq!(evaluate("modulo", 7.0, 3.0), Ok(1.0));
        assert_eq!(evaluate("modulo", -7.0, 3.0), Ok(-1.0));
        assert_eq!(evaluate("modulo", 7.0, -3.0), Ok(1.0));
        assert_eq!(evaluate("modulo", 5.5, 2.0), Ok(1.5));
    }

    #[test]
    fn power_edge_cases() {
        assert_eq!(evaluate("power", 0.0, 0.0), Ok(1.0));
        assert_eq!(evaluate("power", 4.0, 0.5), Ok(2.0));
        assert_eq!(evaluate("power", 2.0, -1.0), Ok(0.5));
    }

    #[test]
    fn add_and_multiply_commute() {
        for &a in SAMPLES {
            for &b in SAMPLES {
                assert_eq!(evaluate("add", a, b), evaluate("add", b, a));
                assert_eq!(evaluate("multiply", a, b), evaluate("multiply", b, a));
            }
        }
    }

    #[test]
    fn subtract_identities() {
        for &a in SAMPLES {
            assert_eq!(evaluate("subtract", a, a), Ok(0.0));
            assert_eq!(evaluate("subtract", a, 0.0), Ok(a));
            for &b in SAMPLES {
                assert_eq!(evaluate("subtract", a, b), evaluate("add", a, -b));
            }
        }
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        assert_matches!(
            evaluate("sqrt", 4.0, 0.0),
            Err(EvalError::UnsupportedOperation(tag)) if tag == "sqrt"
        );
    }

    #[test]
    fn failure_reasons_are_human_readable() {
        assert_eq!(EvalError::DivisionByZero.to_string(), "Division by zero");
        assert_eq!(
            EvalError::UnsupportedOperation("xor".into()).to_string(),
            "Invalid operation: xor"
        );
    }
}
