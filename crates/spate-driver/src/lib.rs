//! Multi-stage time integration driver for Spate.
//!
//! One step of the integrator runs `nstages` stages; every stage is the
//! same three-region task graph:
//!
//! - region A, one lane per block: arm receives and compute the local
//!   flux contribution;
//! - region B, a single mesh-wide lane: flux divergence, the stage
//!   update, and the send/receive/set half of the ghost exchange;
//! - region C, one lane per block: finish the exchange, physical
//!   boundaries, refresh primitives through the equation of state, and
//!   (final stage) propose the next time step.
//!
//! Region boundaries are strict barriers, so the mesh-wide lane of
//! region B sees every block's region-A writes and never races a
//! per-block lane.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod error;
pub mod integrator;
pub mod rhs;
pub mod step;

pub use config::{DriverConfig, InputParams, RhsChoice};
pub use driver::{StageMetrics, StageReport, StepDriver, StepReport};
pub use error::{ConfigError, DriverError};
pub use integrator::Integrator;
pub use rhs::{AdvectionRhs, RhsSolver, ZeroRhs};
pub use step::{StageLane, StageShared, StepTask};
