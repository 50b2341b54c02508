//! Core types for the Spate block-structured integration framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Spate workspace:
//! the floating-point type alias, block identifiers, cell index ranges,
//! and the fault type carried by failed tasks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod range;

pub use error::{RangeError, TaskFault};
pub use id::BlockId;
pub use range::IndexRange;

/// The floating-point type used for all field data.
///
/// Fixed at `f64`; single-precision builds are out of scope for v1.
pub type Real = f64;
