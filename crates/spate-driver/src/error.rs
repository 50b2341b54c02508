//! Configuration and step-execution errors.

use std::error::Error;
use std::fmt;

use spate_core::Real;
use spate_mesh::MeshError;
use spate_task::ExecError;

/// Rejected configuration. Raised at construction time only; a driver
/// that constructs successfully never faults on its own configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A required parameter is absent.
    MissingRequired {
        /// Parameter domain.
        domain: &'static str,
        /// Parameter key.
        key: &'static str,
    },
    /// A parameter is present but unusable.
    InvalidValue {
        /// Parameter domain.
        domain: &'static str,
        /// Parameter key.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
    /// An integrator needs at least one stage.
    NoStages,
    /// A stage weight outside `(0, 1]`.
    BetaOutOfRange {
        /// 1-indexed stage.
        stage: usize,
        /// The rejected weight.
        beta: Real,
    },
    /// The time step must be finite and positive.
    InvalidDt {
        /// The rejected step.
        dt: Real,
    },
    /// Floors must be non-negative.
    NegativeFloor {
        /// Which floor ("dfloor" or "pfloor").
        which: &'static str,
        /// The rejected value.
        value: Real,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired { domain, key } => {
                write!(f, "required parameter {domain}/{key} is missing")
            }
            Self::InvalidValue { domain, key, value } => {
                write!(f, "parameter {domain}/{key} has invalid value {value:?}")
            }
            Self::NoStages => write!(f, "integrator needs at least one stage"),
            Self::BetaOutOfRange { stage, beta } => {
                write!(f, "stage {stage} weight {beta} outside (0, 1]")
            }
            Self::InvalidDt { dt } => write!(f, "time step {dt} is not finite and positive"),
            Self::NegativeFloor { which, value } => {
                write!(f, "{which} must be non-negative, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

/// A step that could not be completed.
#[derive(Clone, Debug, PartialEq)]
pub enum DriverError {
    /// A stage graph aborted (task fault, stall, or bad lane setup).
    Exec {
        /// The stage that aborted, 1-indexed.
        stage: usize,
        /// The executor's diagnosis.
        source: ExecError,
    },
    /// Container bookkeeping failed outside task execution.
    Mesh(MeshError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec { stage, source } => write!(f, "stage {stage} aborted: {source}"),
            Self::Mesh(e) => e.fmt(f),
        }
    }
}

impl Error for DriverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Exec { source, .. } => Some(source),
            Self::Mesh(e) => Some(e),
        }
    }
}

impl From<MeshError> for DriverError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}
