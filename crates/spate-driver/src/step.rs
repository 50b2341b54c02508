//! The stage task union and its lane context.

use spate_bvals::{CommProgress, Transport};
use spate_core::{Real, TaskFault};
use spate_eos::EquationOfState;
use spate_mesh::{
    apply_physical_boundaries, exchange, Block, BoundaryKind, Container, ContainerKey, PrimComp,
};
use spate_task::{TaskStatus, Work};

use crate::rhs::{flux_divergence, RhsSolver};

/// Collaborators shared by every lane of a stage, immutable for its
/// duration.
pub struct StageShared<'a> {
    /// The configured equation of state.
    pub eos: EquationOfState,
    /// The RHS kernel.
    pub rhs: &'a dyn RhsSolver,
    /// The boundary-buffer transport.
    pub transport: &'a dyn Transport,
    /// Physical boundary condition at the domain edges.
    pub bc: BoundaryKind,
    /// CFL safety factor for timestep proposals.
    pub cfl: Real,
}

/// One lane's view of the mesh: a single block in the async regions,
/// every block in the mesh-wide region.
pub struct StageLane<'m, 's> {
    /// The blocks this lane owns exclusively while it runs.
    pub blocks: &'m mut [Block],
    /// Stage-wide collaborators.
    pub shared: &'s StageShared<'s>,
}

/// Every task kind a stage graph can schedule.
///
/// Data, not closures: the stage payload (container keys, the weighted
/// step) rides in the variant, and [`Work::run`] dispatches
/// exhaustively. Adding a task kind is a compile-visible change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepTask {
    /// Arm receives on the stage's output container.
    StartReceiving {
        /// Container the exchange rides on.
        key: ContainerKey,
    },
    /// Run the RHS kernel against the stage's input container.
    ComputeRhs {
        /// Container supplying the state.
        input: ContainerKey,
    },
    /// Accumulate flux divergence into `dUdt`.
    FluxDivergence,
    /// `stage_s = stage_{s-1} + beta * dt * dUdt` over the interior.
    ApplyUpdate {
        /// 1-indexed stage.
        stage: usize,
        /// The weighted step `beta[s] * dt`.
        beta_dt: Real,
    },
    /// Pack and post outgoing slabs.
    SendBoundaries {
        /// Container the exchange rides on.
        key: ContainerKey,
    },
    /// Poll for neighbor slabs; incomplete until all have arrived.
    ReceiveBoundaries {
        /// Container the exchange rides on.
        key: ContainerKey,
    },
    /// Unpack stashed slabs into ghost cells.
    SetBoundaries {
        /// Container the exchange rides on.
        key: ContainerKey,
    },
    /// Finish the exchange pass for the next stage.
    ClearBoundary {
        /// Container the exchange rides on.
        key: ContainerKey,
    },
    /// Fill domain-edge ghosts from the block interior.
    PhysicalBoundaries {
        /// Container to fill.
        key: ContainerKey,
    },
    /// Refresh primitives from conserved state, applying floors.
    FillDerived {
        /// Container to refresh.
        key: ContainerKey,
    },
    /// Propose the next time step from the block's interior state.
    EstimateTimestep {
        /// Container supplying primitives.
        key: ContainerKey,
    },
}

impl<'m, 's> Work<StageLane<'m, 's>> for StepTask {
    fn label(&self) -> &'static str {
        match self {
            StepTask::StartReceiving { .. } => "start_receiving",
            StepTask::ComputeRhs { .. } => "compute_rhs",
            StepTask::FluxDivergence => "flux_divergence",
            StepTask::ApplyUpdate { .. } => "apply_update",
            StepTask::SendBoundaries { .. } => "send_boundary_buffers",
            StepTask::ReceiveBoundaries { .. } => "receive_boundary_buffers",
            StepTask::SetBoundaries { .. } => "set_boundaries",
            StepTask::ClearBoundary { .. } => "clear_boundary",
            StepTask::PhysicalBoundaries { .. } => "physical_boundaries",
            StepTask::FillDerived { .. } => "fill_derived",
            StepTask::EstimateTimestep { .. } => "estimate_timestep",
        }
    }

    fn run(&self, ctx: &mut StageLane<'m, 's>) -> Result<TaskStatus, TaskFault> {
        let shared = ctx.shared;
        match *self {
            StepTask::StartReceiving { key } => {
                for block in ctx.blocks.iter_mut() {
                    exchange::start_receiving(block, key)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::ComputeRhs { input } => {
                for block in ctx.blocks.iter_mut() {
                    shared.rhs.compute_fluxes(block, input)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::FluxDivergence => {
                for block in ctx.blocks.iter_mut() {
                    flux_divergence(block)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::ApplyUpdate { stage, beta_dt } => {
                for block in ctx.blocks.iter_mut() {
                    let range = block.dims.interior();
                    block.containers.apply_update(stage, beta_dt, range)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::SendBoundaries { key } => {
                for block in ctx.blocks.iter_mut() {
                    exchange::send_boundary_buffers(block, key, shared.transport)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::ReceiveBoundaries { key } => {
                let mut waiting = false;
                for block in ctx.blocks.iter_mut() {
                    match exchange::receive_boundary_buffers(block, key, shared.transport)? {
                        CommProgress::Complete => {}
                        CommProgress::Incomplete => waiting = true,
                    }
                }
                if waiting {
                    Ok(TaskStatus::Incomplete)
                } else {
                    Ok(TaskStatus::Complete)
                }
            }
            StepTask::SetBoundaries { key } => {
                for block in ctx.blocks.iter_mut() {
                    exchange::set_boundaries(block, key)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::ClearBoundary { key } => {
                for block in ctx.blocks.iter_mut() {
                    exchange::clear_boundary(block, key)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::PhysicalBoundaries { key } => {
                for block in ctx.blocks.iter_mut() {
                    apply_physical_boundaries(block, key, shared.bc)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::FillDerived { key } => {
                for block in ctx.blocks.iter_mut() {
                    let range = block.dims.all();
                    let Container { cons, prim, .. } = block.containers.get_mut(key)?;
                    shared.eos.conserved_to_primitive(cons, prim, range)?;
                }
                Ok(TaskStatus::Complete)
            }
            StepTask::EstimateTimestep { key } => {
                for block in ctx.blocks.iter_mut() {
                    block.proposed_dt = shared.cfl * min_crossing_time(block, key, &shared.eos)?;
                }
                Ok(TaskStatus::Complete)
            }
        }
    }
}

/// Minimum interior cell-crossing time `dx / (|vx| + cs)`.
fn min_crossing_time(
    block: &Block,
    key: ContainerKey,
    eos: &EquationOfState,
) -> Result<Real, TaskFault> {
    let dims = block.dims;
    let container = block.containers.get(key)?;
    let (rho, vx, p) = (
        PrimComp::Rho.idx(),
        PrimComp::VelX.idx(),
        PrimComp::Pres.idx(),
    );
    let mut min_dt = Real::INFINITY;
    for k in 0..dims.nk() {
        for j in 0..dims.nj() {
            for i in dims.is()..dims.ie() {
                let cs = eos.sound_speed(
                    container.prim.at(rho, k, j, i),
                    container.prim.at(p, k, j, i),
                );
                let speed = container.prim.at(vx, k, j, i).abs() + cs;
                if speed > 0.0 {
                    min_dt = min_dt.min(block.dx / speed);
                }
            }
        }
    }
    Ok(min_dt)
}

// Stage tasks cross worker threads.
#[allow(dead_code)]
fn assert_send() {
    fn is_send<T: Send>() {}
    is_send::<StepTask>();
}
