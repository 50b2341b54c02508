//! Error types shared across the Spate workspace.
//!
//! Subsystem crates define their own error enums (mesh, comm, eos,
//! executor); this module holds only the types that must cross crate
//! boundaries: the task fault payload and the index-range violation.

use std::error::Error;
use std::fmt;

use crate::range::IndexRange;

/// Fault payload carried by a failed task.
///
/// Tasks report transient unavailability through an incomplete status
/// and hard failures as `Err(TaskFault)`. Domain crates convert their own error
/// enums into a `TaskFault` at the task boundary; the executor never
/// retries a fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskFault {
    /// The task's work function failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A contract the task relies on was violated (out-of-order comm
    /// call, invalid index range, malformed input).
    ConstraintViolation {
        /// Description of the violated constraint.
        constraint: String,
    },
}

impl TaskFault {
    /// Wrap an arbitrary error as an execution failure.
    pub fn execution(err: impl fmt::Display) -> Self {
        Self::ExecutionFailed {
            reason: err.to_string(),
        }
    }

    /// Wrap an arbitrary error as a constraint violation.
    pub fn constraint(err: impl fmt::Display) -> Self {
        Self::ConstraintViolation {
            constraint: err.to_string(),
        }
    }
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::ConstraintViolation { constraint } => {
                write!(f, "constraint violation: {constraint}")
            }
        }
    }
}

impl Error for TaskFault {}

impl From<RangeError> for TaskFault {
    fn from(e: RangeError) -> Self {
        Self::constraint(e)
    }
}

/// An invalid cell index range passed to a kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeError {
    /// A bound pair is inverted or empty (`il >= iu` on some axis).
    InvalidRange {
        /// The offending range.
        range: IndexRange,
    },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { range } => write!(
                f,
                "invalid index range [{},{})x[{},{})x[{},{})",
                range.il, range.iu, range.jl, range.ju, range.kl, range.ku
            ),
        }
    }
}

impl Error for RangeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_fault_display() {
        let fault = TaskFault::ExecutionFailed {
            reason: "kernel produced NaN".to_string(),
        };
        assert_eq!(format!("{fault}"), "execution failed: kernel produced NaN");

        let fault = TaskFault::constraint("receive before start_receiving");
        assert!(format!("{fault}").contains("constraint violation"));
    }

    #[test]
    fn range_error_converts_to_fault() {
        let err = RangeError::InvalidRange {
            range: IndexRange::new(5, 2, 0, 1, 0, 1),
        };
        let fault: TaskFault = err.into();
        assert!(matches!(fault, TaskFault::ConstraintViolation { .. }));
        assert!(format!("{fault}").contains("[5,2)"));
    }
}
