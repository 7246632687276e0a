//! # Validation Errors
//!
//! A rejected value produces every violation found, not just the first,
//! each located by the JSON Pointer of the offending value.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single rejected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer to the rejected value in the instance.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of violations in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A value was rejected by a validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("value rejected:\n{violations}")]
pub struct ValidationError {
    /// Everything that was wrong with the value.
    pub violations: ValidationViolations,
}

impl ValidationError {
    /// Returns true if some violation is located at `instance_path`.
    pub fn has_violation_at(&self, instance_path: &str) -> bool {
        self.violations
            .violations()
            .iter()
            .any(|v| v.instance_path == instance_path)
    }
}
