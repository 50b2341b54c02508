//! Spate: a block-structured, task-parallel integration framework.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Spate sub-crates. For most users, adding `spate` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use spate::prelude::*;
//!
//! // Adiabatic gas, donor-cell advection, explicit CFL number.
//! let mut params = InputParams::new();
//! params.set("hydro", "eos", "adiabatic");
//! params.set("hydro", "cfl", "0.3");
//! params.set("hydro", "rhs", "advect");
//!
//! // Two-stage integrator over a two-block chain.
//! let mut driver =
//!     StepDriver::new(&params, Integrator::vl2(1e-3).unwrap(), 2).unwrap();
//!
//! // A uniform rightward-moving gas on [0, 2).
//! let dims = BlockDims::new(16, 1, 1, 2);
//! let mut mesh = Mesh::chain(2, dims, 0.0, 2.0, 2, |_| {
//!     [1.0, 1.0, 0.0, 0.0, 1.0]
//! });
//!
//! // Meshes start with primitives only; establish the conserved
//! // representation through the configured equation of state.
//! for block in &mut mesh.blocks {
//!     let range = block.dims.all();
//!     let Container { cons, prim, .. } =
//!         block.containers.get_mut(ContainerKey::Base).unwrap();
//!     driver
//!         .config()
//!         .eos
//!         .primitive_to_conserved(cons, prim, range)
//!         .unwrap();
//! }
//!
//! let report = driver.advance(&mut mesh).unwrap();
//! assert_eq!(report.stages.len(), 2);
//! assert!(report.dt_next > 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `spate-core` | `Real`, IDs, index ranges, task faults |
//! | [`bvals`] | `spate-bvals` | Exchange state machine and transports |
//! | [`mesh`] | `spate-mesh` | Blocks, containers, ghost-cell exchange |
//! | [`eos`] | `spate-eos` | Equation of state and floor enforcement |
//! | [`task`] | `spate-task` | Task graphs and the region executor |
//! | [`driver`] | `spate-driver` | Integrator, configuration, step driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the fault carried by failed tasks (`spate-core`).
///
/// Contains the [`types::Real`] alias, [`types::BlockId`],
/// [`types::IndexRange`], and [`types::TaskFault`].
pub use spate_core as types;

/// Boundary exchange state machine and transport contract
/// (`spate-bvals`).
///
/// The [`bvals::Transport`] trait is the seam for moving ghost-cell
/// slabs between blocks; [`bvals::ChannelTransport`] is the in-process
/// reference implementation.
pub use spate_bvals as bvals;

/// Blocks, state containers, and ghost-cell exchange (`spate-mesh`).
///
/// A [`mesh::Mesh`] is a chain of [`mesh::Block`]s, each with a slot
/// table of [`mesh::Container`]s keyed by [`mesh::ContainerKey`].
pub use spate_mesh as mesh;

/// Equation of state with floor enforcement (`spate-eos`).
///
/// Pick a [`eos::EosKind`] variant and wrap it in an
/// [`eos::EquationOfState`] with the configured floors.
pub use spate_eos as eos;

/// Task graphs and their worker-pool executor (`spate-task`).
///
/// Stages are [`task::TaskCollection`]s of [`task::TaskRegion`]s; the
/// [`task::Work`] trait is how a tagged-union task kind plugs in.
pub use spate_task as task;

/// Multi-stage time integration driver (`spate-driver`).
///
/// [`driver::StepDriver`] owns the integrator and the collaborators and
/// advances a mesh one step at a time.
pub use spate_driver as driver;

/// Common imports for typical Spate usage.
///
/// ```rust
/// use spate::prelude::*;
/// ```
///
/// This imports the most frequently used types: the step driver and
/// integrator, mesh building blocks, the equation of state, and the
/// executor knobs.
pub mod prelude {
    // Core
    pub use spate_core::{BlockId, IndexRange, Real, TaskFault};

    // Mesh
    pub use spate_mesh::{
        Block, BlockDims, BoundaryKind, ConsComp, Container, ContainerKey, Mesh, PrimComp,
    };

    // Exchange
    pub use spate_bvals::{ChannelTransport, Face, Slab, Transport};

    // Equation of state
    pub use spate_eos::{EosKind, EquationOfState};

    // Executor
    pub use spate_task::{ExecOptions, RegionMetrics, TaskStatus, Work};

    // Driver
    pub use spate_driver::{
        InputParams, Integrator, RhsSolver, StepDriver, StepReport,
    };
}
