//! The step driver: builds and runs the three-region stage graphs.

use std::time::Instant;

use spate_bvals::{ChannelTransport, Transport};
use spate_core::Real;
use spate_mesh::{ContainerKey, Mesh};
use spate_task::{
    DepSet, ExecOptions, RegionMetrics, TaskCollection, TaskList, TaskRegion,
};

use crate::config::{DriverConfig, InputParams, RhsChoice};
use crate::error::{ConfigError, DriverError};
use crate::integrator::Integrator;
use crate::rhs::{AdvectionRhs, RhsSolver, ZeroRhs};
use crate::step::{StageLane, StageShared, StepTask};

/// Timing and executor counters for one stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageMetrics {
    /// Wall-clock duration of the stage in microseconds.
    pub total_us: u64,
    /// Per-region executor counters, in region order.
    pub regions: [RegionMetrics; 3],
}

/// Outcome of one stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageReport {
    /// 1-indexed stage.
    pub stage: usize,
    /// Stage counters.
    pub metrics: StageMetrics,
    /// Mesh-wide minimum proposed time step; set on the final stage
    /// only.
    pub proposed_dt: Option<Real>,
}

/// Outcome of one full step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// The time step the stages integrated over.
    pub dt_used: Real,
    /// The time step adopted for the next step.
    pub dt_next: Real,
    /// One report per stage.
    pub stages: Vec<StageReport>,
}

/// Owns the integrator, the resolved configuration, and the
/// collaborators, and advances a mesh step by step.
pub struct StepDriver {
    integrator: Integrator,
    config: DriverConfig,
    rhs: Box<dyn RhsSolver>,
    transport: Box<dyn Transport>,
    exec: ExecOptions,
    warnings: Vec<String>,
}

impl StepDriver {
    /// Build a driver from a parameter table, validating everything up
    /// front. The RHS kernel comes from `hydro/rhs`; the transport is
    /// the in-process channel transport sized for `nblocks`.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from parameter resolution.
    pub fn new(
        params: &InputParams,
        integrator: Integrator,
        nblocks: usize,
    ) -> Result<Self, ConfigError> {
        let (config, warnings) = DriverConfig::from_params(params)?;
        let rhs: Box<dyn RhsSolver> = match config.rhs {
            RhsChoice::Advect => Box::new(AdvectionRhs),
            RhsChoice::Zero => Box::new(ZeroRhs),
        };
        Ok(Self {
            integrator,
            config,
            rhs,
            transport: Box::new(ChannelTransport::new(nblocks)),
            exec: ExecOptions::default(),
            warnings,
        })
    }

    /// Warnings recorded while resolving configuration (desired
    /// parameters that fell back to defaults).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The integrator in use.
    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// The resolved configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Replace the RHS kernel.
    pub fn set_rhs(&mut self, rhs: Box<dyn RhsSolver>) {
        self.rhs = rhs;
    }

    /// Replace the boundary-buffer transport.
    pub fn set_transport(&mut self, transport: Box<dyn Transport>) {
        self.transport = transport;
    }

    /// Replace the executor options.
    pub fn set_exec_options(&mut self, exec: ExecOptions) {
        self.exec = exec;
    }

    /// Build the three-region graph for `stage` over `nblocks` blocks.
    ///
    /// Region A (one lane per block) arms receives and computes the
    /// RHS; region B (one mesh-wide lane) applies the update and runs
    /// the send/receive/set half of the exchange; region C (one lane
    /// per block) finishes the exchange, applies boundaries, refreshes
    /// primitives, and proposes the next dt on the final stage.
    pub fn build_stage(&self, nblocks: usize, stage: usize) -> TaskCollection<StepTask> {
        let input = ContainerKey::stage_input(stage);
        let output = ContainerKey::stage_output(stage);
        let beta_dt = self.integrator.beta(stage) * self.integrator.dt();
        let final_stage = stage == self.integrator.nstages();
        // Every list below holds at most four tasks.
        let full = "stage graph exceeds the task list";

        let mut collection = TaskCollection::new();

        let mut region_a = TaskRegion::new();
        for _ in 0..nblocks {
            let mut list = TaskList::new();
            list.add(DepSet::NONE, StepTask::StartReceiving { key: output })
                .expect(full);
            list.add(DepSet::NONE, StepTask::ComputeRhs { input })
                .expect(full);
            region_a.add_lane(list);
        }
        collection.add_region(region_a);

        let mut list = TaskList::new();
        let div = list.add(DepSet::NONE, StepTask::FluxDivergence).expect(full);
        let upd = list
            .add(div, StepTask::ApplyUpdate { stage, beta_dt })
            .expect(full);
        let send = list
            .add(upd, StepTask::SendBoundaries { key: output })
            .expect(full);
        let recv = list
            .add(send, StepTask::ReceiveBoundaries { key: output })
            .expect(full);
        list.add(recv, StepTask::SetBoundaries { key: output })
            .expect(full);
        let mut region_b = TaskRegion::new();
        region_b.add_lane(list);
        collection.add_region(region_b);

        let mut region_c = TaskRegion::new();
        for _ in 0..nblocks {
            let mut list = TaskList::new();
            list.add(DepSet::NONE, StepTask::ClearBoundary { key: output })
                .expect(full);
            let phys = list
                .add(DepSet::NONE, StepTask::PhysicalBoundaries { key: output })
                .expect(full);
            let fill = list
                .add(phys, StepTask::FillDerived { key: output })
                .expect(full);
            if final_stage {
                list.add(fill, StepTask::EstimateTimestep { key: output })
                    .expect(full);
            }
            region_c.add_lane(list);
        }
        collection.add_region(region_c);

        collection
    }

    /// Run one stage to completion.
    ///
    /// # Errors
    ///
    /// `DriverError::Exec` wrapping the first task fault, stall, or
    /// abort; `DriverError::Mesh` if stage storage cannot be set up.
    pub fn execute_stage(&self, mesh: &mut Mesh, stage: usize) -> Result<StageReport, DriverError> {
        if stage == 1 {
            for block in &mut mesh.blocks {
                block.containers.ensure_stage_storage()?;
            }
        }

        let shared = StageShared {
            eos: self.config.eos,
            rhs: self.rhs.as_ref(),
            transport: self.transport.as_ref(),
            bc: self.config.bc,
            cfl: self.config.cfl,
        };

        let collection = self.build_stage(mesh.len(), stage);
        let start = Instant::now();
        let mut regions = [RegionMetrics::default(); 3];
        for (n, region) in collection.into_regions().enumerate() {
            // Region B is the single mesh-wide lane; A and C get one
            // block each.
            let ctxs: Vec<StageLane<'_, '_>> = if n == 1 {
                vec![StageLane {
                    blocks: &mut mesh.blocks,
                    shared: &shared,
                }]
            } else {
                mesh.blocks
                    .chunks_mut(1)
                    .map(|blocks| StageLane {
                        blocks,
                        shared: &shared,
                    })
                    .collect()
            };
            regions[n] = region
                .execute(&self.exec, ctxs)
                .map_err(|source| DriverError::Exec { stage, source })?;
        }

        let final_stage = stage == self.integrator.nstages();
        Ok(StageReport {
            stage,
            metrics: StageMetrics {
                total_us: start.elapsed().as_micros() as u64,
                regions,
            },
            proposed_dt: final_stage.then(|| mesh.min_proposed_dt()),
        })
    }

    /// Advance the mesh by one full step: run every stage, promote the
    /// final stage into `base`, and adopt the proposed time step.
    ///
    /// # Errors
    ///
    /// The first stage failure, with the mesh left as the failed stage
    /// left it.
    pub fn advance(&mut self, mesh: &mut Mesh) -> Result<StepReport, DriverError> {
        let dt_used = self.integrator.dt();
        let mut stages = Vec::with_capacity(self.integrator.nstages());
        for stage in 1..=self.integrator.nstages() {
            stages.push(self.execute_stage(mesh, stage)?);
        }
        mesh.promote_final_stage()?;

        let proposed = stages
            .last()
            .and_then(|r| r.proposed_dt)
            .unwrap_or(Real::INFINITY);
        let dt_next = if proposed.is_finite() && proposed > 0.0 {
            self.integrator
                .set_dt(proposed)
                .expect("proposed dt checked finite and positive");
            proposed
        } else {
            // Nothing moves (zero RHS on a static state); keep the
            // current step.
            dt_used
        };

        Ok(StepReport {
            dt_used,
            dt_next,
            stages,
        })
    }
}
