//! Mesh and container errors.

use std::error::Error;
use std::fmt;

use spate_bvals::{CommError, Face};
use spate_core::TaskFault;

use crate::container::ContainerKey;

/// Errors from container lookup and stage bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// The requested container slot has never been populated.
    ContainerNotFound {
        /// The missing key.
        key: ContainerKey,
    },
    /// A stage index outside `1..=nstages`.
    StageOutOfRange {
        /// The offending stage.
        stage: usize,
        /// The configured stage count.
        nstages: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainerNotFound { key } => write!(f, "container {key} not found"),
            Self::StageOutOfRange { stage, nstages } => {
                write!(f, "stage {stage} out of range 1..={nstages}")
            }
        }
    }
}

impl Error for MeshError {}

impl From<MeshError> for TaskFault {
    fn from(e: MeshError) -> Self {
        TaskFault::constraint(e)
    }
}

/// Errors from the mesh-side half of the boundary exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// Container lookup or stage bookkeeping failed.
    Mesh(MeshError),
    /// The exchange protocol or transport rejected an operation.
    Comm(CommError),
    /// A received slab does not match the ghost band it should fill.
    SlabMismatch {
        /// Face the slab arrived on.
        face: Face,
        /// Received length.
        got: usize,
        /// Expected length.
        want: usize,
    },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesh(e) => e.fmt(f),
            Self::Comm(e) => e.fmt(f),
            Self::SlabMismatch { face, got, want } => {
                write!(f, "slab for {face:?} has {got} values, expected {want}")
            }
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mesh(e) => Some(e),
            Self::Comm(e) => Some(e),
            Self::SlabMismatch { .. } => None,
        }
    }
}

impl From<MeshError> for ExchangeError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<CommError> for ExchangeError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

impl From<ExchangeError> for TaskFault {
    fn from(e: ExchangeError) -> Self {
        TaskFault::constraint(e)
    }
}
