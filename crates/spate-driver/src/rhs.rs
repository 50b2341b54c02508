//! Right-hand-side kernels and the flux divergence.
//!
//! The driver treats the RHS as an opaque collaborator: given a block
//! and the stage's input container, fill the block's flux register. Two
//! reference kernels ship here; anything more elaborate plugs in
//! through [`RhsSolver`].

use spate_core::TaskFault;
use spate_mesh::{Block, ConsComp, ContainerKey, MeshError, PrimComp, NCONS};

/// Per-block flux computation.
///
/// Implementations are shared by reference across worker lanes and must
/// be stateless or internally synchronized.
pub trait RhsSolver: Send + Sync {
    /// Stable name for diagnostics.
    fn label(&self) -> &'static str;

    /// Fill `block.flux` from the state in container `key`.
    ///
    /// Ghost cells of `key` are valid when this runs; the register
    /// covers faces `0..=nx`.
    ///
    /// # Errors
    ///
    /// A fault aborts the stage.
    fn compute_fluxes(&self, block: &mut Block, key: ContainerKey) -> Result<(), TaskFault>;
}

/// Donor-cell upwind advection: each face takes the conserved state of
/// the upwind cell times the face-averaged x-velocity.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdvectionRhs;

impl RhsSolver for AdvectionRhs {
    fn label(&self) -> &'static str {
        "advect"
    }

    fn compute_fluxes(&self, block: &mut Block, key: ContainerKey) -> Result<(), TaskFault> {
        let dims = block.dims;
        let container = block.containers.get(key).map_err(TaskFault::from)?;
        let vx = PrimComp::VelX.idx();
        for c in 0..NCONS {
            for k in 0..dims.nk() {
                for j in 0..dims.nj() {
                    for f in 0..=dims.nx {
                        // Face f sits between cells il and ir; il is a
                        // ghost cell when f == 0.
                        let il = dims.is() + f - 1;
                        let ir = dims.is() + f;
                        let v = 0.5
                            * (container.prim.at(vx, k, j, il) + container.prim.at(vx, k, j, ir));
                        let upwind = if v >= 0.0 {
                            container.cons.at(c, k, j, il)
                        } else {
                            container.cons.at(c, k, j, ir)
                        };
                        block.flux.x.set(c, k, j, f, v * upwind);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Homogeneous right-hand side: zero flux everywhere. Used to exercise
/// the stage machinery without moving any state.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroRhs;

impl RhsSolver for ZeroRhs {
    fn label(&self) -> &'static str {
        "zero"
    }

    fn compute_fluxes(&self, block: &mut Block, _key: ContainerKey) -> Result<(), TaskFault> {
        block.flux.x.fill(0.0);
        Ok(())
    }
}

/// Accumulate the flux divergence into the `DuDt` container:
/// `dU/dt = -(F[i+1/2] - F[i-1/2]) / dx` over the interior.
pub fn flux_divergence(block: &mut Block) -> Result<(), MeshError> {
    let dims = block.dims;
    let dx = block.dx;
    let dudt = block.containers.get_mut(ContainerKey::DuDt)?;
    for c in 0..NCONS {
        for k in 0..dims.nk() {
            for j in 0..dims.nj() {
                for i in dims.is()..dims.ie() {
                    let f = i - dims.is();
                    let div = (block.flux.x.at(c, k, j, f + 1) - block.flux.x.at(c, k, j, f)) / dx;
                    dudt.cons.set(c, k, j, i, -div);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spate_core::BlockId;
    use spate_mesh::BlockDims;

    fn block() -> Block {
        let mut b = Block::new(BlockId(0), BlockDims::new(4, 1, 1, 2), 0.0, 0.25, 1);
        b.containers.ensure_stage_storage().unwrap();
        b
    }

    #[test]
    fn upwind_takes_the_left_state_for_positive_velocity() {
        let mut b = block();
        {
            let base = b.containers.get_mut(ContainerKey::Base).unwrap();
            for i in 0..8 {
                base.prim.set(PrimComp::VelX.idx(), 0, 0, i, 2.0);
                base.cons.set(ConsComp::Dens.idx(), 0, 0, i, i as f64);
            }
        }
        AdvectionRhs.compute_fluxes(&mut b, ContainerKey::Base).unwrap();
        let d = ConsComp::Dens.idx();
        // Face 0 is between cells 1 (ghost) and 2: upwind cell is 1.
        assert_eq!(b.flux.x.at(d, 0, 0, 0), 2.0 * 1.0);
        assert_eq!(b.flux.x.at(d, 0, 0, 4), 2.0 * 5.0);
    }

    #[test]
    fn upwind_takes_the_right_state_for_negative_velocity() {
        let mut b = block();
        {
            let base = b.containers.get_mut(ContainerKey::Base).unwrap();
            for i in 0..8 {
                base.prim.set(PrimComp::VelX.idx(), 0, 0, i, -1.0);
                base.cons.set(ConsComp::Dens.idx(), 0, 0, i, i as f64);
            }
        }
        AdvectionRhs.compute_fluxes(&mut b, ContainerKey::Base).unwrap();
        assert_eq!(b.flux.x.at(ConsComp::Dens.idx(), 0, 0, 0), -1.0 * 2.0);
    }

    #[test]
    fn zero_rhs_clears_a_dirty_register() {
        let mut b = block();
        b.flux.x.fill(9.0);
        ZeroRhs.compute_fluxes(&mut b, ContainerKey::Base).unwrap();
        assert!(b.flux.x.raw().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn divergence_of_linear_flux_is_constant() {
        let mut b = block();
        let d = ConsComp::Dens.idx();
        // F(f) = 3 * f across the register.
        for f in 0..=4 {
            b.flux.x.set(d, 0, 0, f, 3.0 * f as f64);
        }
        flux_divergence(&mut b).unwrap();
        let dudt = b.containers.get(ContainerKey::DuDt).unwrap();
        for i in 2..6 {
            assert_eq!(dudt.cons.at(d, 0, 0, i), -3.0 / 0.25);
        }
        // Ghost cells untouched.
        assert_eq!(dudt.cons.at(d, 0, 0, 0), 0.0);
    }
}
