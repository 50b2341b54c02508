//! Equation-of-state errors.

use std::error::Error;
use std::fmt;

use spate_core::{IndexRange, RangeError, TaskFault};

/// Errors from conversion-range validation.
///
/// Conversion itself cannot fail: any state, however unphysical, is
/// floored into validity. Only the addressed range can be wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EosError {
    /// The range is not half-open in every dimension.
    InvalidRange(RangeError),
    /// The range reaches outside the arrays it addresses.
    RangeOutOfBounds {
        /// The offending range.
        range: IndexRange,
    },
}

impl fmt::Display for EosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange(e) => e.fmt(f),
            Self::RangeOutOfBounds { range } => {
                write!(f, "conversion range {range:?} exceeds array extents")
            }
        }
    }
}

impl Error for EosError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRange(e) => Some(e),
            Self::RangeOutOfBounds { .. } => None,
        }
    }
}

impl From<RangeError> for EosError {
    fn from(e: RangeError) -> Self {
        Self::InvalidRange(e)
    }
}

impl From<EosError> for TaskFault {
    fn from(e: EosError) -> Self {
        TaskFault::constraint(e)
    }
}
