//! Boundary communication errors.

use std::error::Error;
use std::fmt;

use spate_core::{BlockId, TaskFault};

use crate::state::{CommScope, CommState, Face};

/// Errors from the boundary exchange protocol.
///
/// Every variant is a programming error (fatal, never retried). A
/// receive that is merely waiting on neighbor data is not an error — it
/// reports an incomplete task status instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A protocol operation was called out of order.
    OutOfOrder {
        /// The operation that was attempted.
        op: &'static str,
        /// The state the machine was in.
        state: CommState,
    },
    /// `clear` was called for a scope that was never armed by
    /// `start_receiving`.
    ScopeNotArmed {
        /// The scope that was requested.
        scope: CommScope,
    },
    /// The transport has no mailbox registered for this destination.
    UnknownMailbox {
        /// The destination block.
        block: BlockId,
        /// The destination face.
        face: Face,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder { op, state } => {
                write!(f, "comm op '{op}' called in state {state:?}")
            }
            Self::ScopeNotArmed { scope } => {
                write!(f, "clear of scope {scope:?} which was never armed")
            }
            Self::UnknownMailbox { block, face } => {
                write!(f, "no mailbox for block {block} face {face:?}")
            }
        }
    }
}

impl Error for CommError {}

impl From<CommError> for TaskFault {
    fn from(e: CommError) -> Self {
        TaskFault::constraint(e)
    }
}
