//! Task graphs and their executor for Spate.
//!
//! A stage of the integrator is described as a [`TaskCollection`]:
//! ordered [`TaskRegion`]s, each a set of lanes that may run
//! concurrently, each lane an ordered [`TaskList`] with intra-list
//! dependencies expressed as a bitmask over earlier tasks. Region
//! boundaries are strict barriers.
//!
//! Tasks are data, not closures: a work item is a tagged union
//! implementing [`Work`], dispatched exhaustively by the lane's context
//! type. A task reports [`TaskStatus::Incomplete`] to request a retry
//! (waiting on a neighbor, typically); failure travels separately as
//! `Err(TaskFault)` and aborts the whole region.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod exec;
pub mod graph;

pub use error::{ExecError, GraphError};
pub use exec::{ExecOptions, RegionMetrics};
pub use graph::{
    DepSet, SweepError, TaskCollection, TaskId, TaskList, TaskRegion, TaskStatus, Work,
};
