//! Graph construction and execution errors.

use std::error::Error;
use std::fmt;

use spate_core::TaskFault;

use crate::graph::TaskId;

/// Errors while building a task list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// A list may hold at most 64 tasks (the dependency bitmask width).
    ListFull,
    /// A dependency names a task that was never added to this list.
    UnknownDependency {
        /// The missing dependency.
        dep: TaskId,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListFull => write!(f, "task list is full (64 tasks max)"),
            Self::UnknownDependency { dep } => {
                write!(f, "dependency on unknown task {}", dep.index())
            }
        }
    }
}

impl Error for GraphError {}

/// Errors from region execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecError {
    /// A task returned a fault. The whole region aborts; this is the
    /// first failure observed.
    TaskFailed {
        /// Lane the task ran on.
        lane: usize,
        /// The failed task.
        task: TaskId,
        /// The task's label.
        label: &'static str,
        /// The underlying fault.
        fault: TaskFault,
    },
    /// A lane exhausted its attempt budget without completing.
    Stalled {
        /// The stalled lane.
        lane: usize,
        /// Attempts made before giving up.
        attempts: u64,
    },
    /// A lane was abandoned because another lane failed or stalled.
    Aborted {
        /// The abandoned lane.
        lane: usize,
    },
    /// The caller supplied a context count different from the lane
    /// count.
    LaneCountMismatch {
        /// Lanes in the region.
        lanes: usize,
        /// Contexts supplied.
        ctxs: usize,
    },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskFailed {
                lane,
                task,
                label,
                fault,
            } => write!(f, "task {label} ({}) on lane {lane} failed: {fault}", task.index()),
            Self::Stalled { lane, attempts } => {
                write!(f, "lane {lane} stalled after {attempts} attempts")
            }
            Self::Aborted { lane } => write!(f, "lane {lane} aborted"),
            Self::LaneCountMismatch { lanes, ctxs } => {
                write!(f, "{lanes} lanes but {ctxs} contexts")
            }
        }
    }
}

impl Error for ExecError {}
