//! The block chain owned by one processing element.

use spate_core::{BlockId, Real};

use crate::array::PrimComp;
use crate::block::Block;
use crate::container::ContainerKey;
use crate::dims::BlockDims;
use crate::error::MeshError;

/// A 1-D chain of blocks spanning `[x0, x1)`.
///
/// Block creation/destruction, refinement, and load balancing belong to
/// a larger runtime; this type only carries the block list and the
/// whole-mesh bookkeeping the stage driver needs.
#[derive(Debug)]
pub struct Mesh {
    /// The blocks, ordered low-x to high-x. `BlockId(n)` is `blocks[n]`.
    pub blocks: Vec<Block>,
}

impl Mesh {
    /// Build an `nblocks`-long chain with uniform block extents and a
    /// caller-supplied primitive initial condition.
    ///
    /// `init(x)` returns `[rho, vx, vy, vz, p]` for a cell centered at
    /// `x`; it is evaluated over every cell including ghosts. The
    /// conserved representation starts zeroed — callers establish it
    /// through the equation of state so `base` begins floor-consistent.
    pub fn chain(
        nblocks: usize,
        dims: BlockDims,
        x0: Real,
        x1: Real,
        nstages: usize,
        mut init: impl FnMut(Real) -> [Real; 5],
    ) -> Self {
        assert!(nblocks >= 1, "mesh needs at least one block");
        assert!(x1 > x0, "domain must have positive extent");
        let dx = (x1 - x0) / (nblocks * dims.nx) as Real;
        let block_width = dx * dims.nx as Real;

        let mut blocks = Vec::with_capacity(nblocks);
        for b in 0..nblocks {
            let id = BlockId(b as u32);
            let mut block = Block::new(id, dims, x0 + b as Real * block_width, dx, nstages);
            if b > 0 {
                block.neighbors.xlow = Some(BlockId((b - 1) as u32));
            }
            if b + 1 < nblocks {
                block.neighbors.xhigh = Some(BlockId((b + 1) as u32));
            }

            let base = block
                .containers
                .get_mut(ContainerKey::Base)
                .expect("base populated by construction");
            for k in 0..dims.nk() {
                for j in 0..dims.nj() {
                    for i in 0..dims.ni() {
                        let x = block.x0 + (i as Real - dims.is() as Real + 0.5) * dx;
                        let w = init(x);
                        base.prim.set(PrimComp::Rho.idx(), k, j, i, w[0]);
                        base.prim.set(PrimComp::VelX.idx(), k, j, i, w[1]);
                        base.prim.set(PrimComp::VelY.idx(), k, j, i, w[2]);
                        base.prim.set(PrimComp::VelZ.idx(), k, j, i, w[3]);
                        base.prim.set(PrimComp::Pres.idx(), k, j, i, w[4]);
                    }
                }
            }
            blocks.push(block);
        }
        Self { blocks }
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the mesh has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The mesh-wide minimum of per-block proposed time steps.
    pub fn min_proposed_dt(&self) -> Real {
        self.blocks
            .iter()
            .map(|b| b.proposed_dt)
            .fold(Real::INFINITY, Real::min)
    }

    /// Swap every block's final stage container into `base` at the end
    /// of a full step.
    pub fn promote_final_stage(&mut self) -> Result<(), MeshError> {
        for block in &mut self.blocks {
            block.containers.promote_final_stage()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::PrimComp;

    #[test]
    fn chain_links_neighbors() {
        let mesh = Mesh::chain(3, BlockDims::new(4, 1, 1, 2), 0.0, 3.0, 1, |_| {
            [1.0, 0.0, 0.0, 0.0, 1.0]
        });
        assert_eq!(mesh.len(), 3);
        assert_eq!(mesh.blocks[0].neighbors.xlow, None);
        assert_eq!(mesh.blocks[0].neighbors.xhigh, Some(BlockId(1)));
        assert_eq!(mesh.blocks[1].neighbors.xlow, Some(BlockId(0)));
        assert_eq!(mesh.blocks[1].neighbors.xhigh, Some(BlockId(2)));
        assert_eq!(mesh.blocks[2].neighbors.xhigh, None);
    }

    #[test]
    fn chain_tiles_the_domain() {
        let mesh = Mesh::chain(2, BlockDims::new(4, 1, 1, 2), 0.0, 2.0, 1, |_| {
            [1.0, 0.0, 0.0, 0.0, 1.0]
        });
        assert!((mesh.blocks[0].dx - 0.25).abs() < 1e-14);
        assert!((mesh.blocks[1].x0 - 1.0).abs() < 1e-14);
    }

    #[test]
    fn init_sees_physical_coordinates() {
        let mesh = Mesh::chain(2, BlockDims::new(4, 1, 1, 2), 0.0, 2.0, 1, |x| {
            [x, 0.0, 0.0, 0.0, 1.0]
        });
        let b1 = &mesh.blocks[1];
        let base = b1.containers.get(ContainerKey::Base).unwrap();
        let i0 = b1.dims.is();
        let got = base.prim.at(PrimComp::Rho.idx(), 0, 0, i0);
        assert!((got - b1.cell_x(i0)).abs() < 1e-14);
    }

    #[test]
    fn min_proposed_dt_starts_infinite() {
        let mut mesh = Mesh::chain(2, BlockDims::new(4, 1, 1, 2), 0.0, 1.0, 1, |_| {
            [1.0, 0.0, 0.0, 0.0, 1.0]
        });
        assert!(mesh.min_proposed_dt().is_infinite());
        mesh.blocks[0].proposed_dt = 0.5;
        mesh.blocks[1].proposed_dt = 0.2;
        assert_eq!(mesh.min_proposed_dt(), 0.2);
    }
}
