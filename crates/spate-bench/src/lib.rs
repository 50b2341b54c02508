//! Benchmark profiles for the Spate integration driver.
//!
//! Two pre-built profiles pair a configured [`StepDriver`] with a
//! matching mesh:
//!
//! - [`reference_profile`]: 8 blocks of 64 cells, two-stage integrator
//! - [`stress_profile`]: 64 blocks of 256 cells, same pipeline

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use spate_core::Real;
use spate_driver::{InputParams, Integrator, StepDriver};
use spate_mesh::{BlockDims, Mesh, PrimComp};

fn params() -> InputParams {
    let mut p = InputParams::new();
    p.set("hydro", "eos", "adiabatic");
    p.set("hydro", "cfl", "0.3");
    p.set("hydro", "rhs", "advect");
    p
}

fn build(nblocks: usize, nx: usize, dt: Real) -> (StepDriver, Mesh) {
    let driver = StepDriver::new(
        &params(),
        Integrator::vl2(dt).expect("preset dt is valid"),
        nblocks,
    )
    .expect("profile parameters are valid");

    // A smooth density wave over a uniform advecting background.
    let dims = BlockDims::new(nx, 1, 1, 2);
    let mesh = Mesh::chain(nblocks, dims, 0.0, nblocks as Real, 2, |x| {
        [
            1.0 + 0.1 * (2.0 * std::f64::consts::PI * x / nblocks as Real).sin(),
            1.0,
            0.0,
            0.0,
            1.0,
        ]
    });
    (driver, mesh)
}

/// 8 blocks of 64 cells: small enough to profile per-stage overhead.
pub fn reference_profile() -> (StepDriver, Mesh) {
    build(8, 64, 1e-3)
}

/// 64 blocks of 256 cells: enough work to expose executor scaling.
pub fn stress_profile() -> (StepDriver, Mesh) {
    build(64, 256, 1e-4)
}

/// Establish the conserved representation before stepping.
///
/// Profiles hand out meshes with primitives only; run this once before
/// the first [`StepDriver::advance`].
pub fn prepare(driver: &StepDriver, mesh: &mut Mesh) {
    for block in &mut mesh.blocks {
        let range = block.dims.all();
        let spate_mesh::Container { cons, prim, .. } = block
            .containers
            .get_mut(spate_mesh::ContainerKey::Base)
            .expect("base populated by construction");
        driver
            .config()
            .eos
            .primitive_to_conserved(cons, prim, range)
            .expect("full-block range is valid");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_steps() {
        let (mut driver, mut mesh) = reference_profile();
        prepare(&driver, &mut mesh);
        let report = driver.advance(&mut mesh).expect("reference profile steps");
        assert_eq!(report.stages.len(), 2);
        assert!(report.dt_next > 0.0);
    }

    #[test]
    fn profiles_start_physical() {
        let (_, mesh) = reference_profile();
        for block in &mesh.blocks {
            let base = block
                .containers
                .get(spate_mesh::ContainerKey::Base)
                .unwrap();
            for i in 0..block.dims.ni() {
                assert!(base.prim.at(PrimComp::Rho.idx(), 0, 0, i) > 0.0);
            }
        }
    }
}
