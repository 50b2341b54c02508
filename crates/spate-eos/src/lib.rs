//! Equation of state for Spate: conversions between conserved and
//! primitive state with floor enforcement.
//!
//! The variant is selected once at configuration time and dispatched by
//! a plain `match` on the per-cell path. Both conversion directions
//! guarantee the same postcondition over the requested range: density
//! at or above the density floor and pressure at or above the pressure
//! floor, with the companion representation re-synchronized whenever a
//! floor fires.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod eos;
pub mod error;

pub use eos::{EosKind, EquationOfState};
pub use error::EosError;
