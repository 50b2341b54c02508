//! Mesh blocks and their per-block scratch.

use smallvec::SmallVec;

use spate_bvals::Face;
use spate_core::{BlockId, Real};

use crate::array::{CellArray, NCONS};
use crate::container::{Container, ContainerSet};
use crate::dims::BlockDims;

/// Neighbor links for a block in the 1-D chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// Block adjacent across the low-x face, if any.
    pub xlow: Option<BlockId>,
    /// Block adjacent across the high-x face, if any.
    pub xhigh: Option<BlockId>,
}

impl Neighbors {
    /// The faces that have a neighbor, with the neighbor's id.
    pub fn faces(&self) -> SmallVec<[(Face, BlockId); 2]> {
        let mut out = SmallVec::new();
        if let Some(id) = self.xlow {
            out.push((Face::XLow, id));
        }
        if let Some(id) = self.xhigh {
            out.push((Face::XHigh, id));
        }
        out
    }

    /// Just the faces that have a neighbor.
    pub fn exchange_faces(&self) -> SmallVec<[Face; 2]> {
        self.faces().iter().map(|(f, _)| *f).collect()
    }
}

/// Per-block x-face flux register, written by the RHS kernel and
/// consumed by the mesh-wide divergence task.
///
/// Faces are indexed `0..=nx` relative to the interior (face `f` sits
/// between interior cells `f-1` and `f`).
#[derive(Clone, Debug)]
pub struct FluxRegister {
    /// Face-centered fluxes of every conserved component.
    pub x: CellArray,
}

impl FluxRegister {
    /// Zero-filled register for a block.
    pub fn zeros(dims: &BlockDims) -> Self {
        Self {
            x: CellArray::zeros(NCONS, dims.nx + 1, dims.nj(), dims.nk()),
        }
    }
}

/// One spatial partition of the domain: the unit of per-lane
/// parallelism.
///
/// A block owns its containers and scratch exclusively; only the
/// mesh-wide synchronization region ever touches more than one block at
/// a time.
#[derive(Debug)]
pub struct Block {
    /// Stable identity for the lifetime of a step.
    pub id: BlockId,
    /// Interior extents and ghost width.
    pub dims: BlockDims,
    /// Physical x coordinate of the low edge of the interior.
    pub x0: Real,
    /// Cell width along x.
    pub dx: Real,
    /// Chain neighbor links.
    pub neighbors: Neighbors,
    /// Slot table of state containers.
    pub containers: ContainerSet,
    /// RHS flux scratch.
    pub flux: FluxRegister,
    /// This block's proposed next time step, written by the final
    /// stage's estimate task. Infinity until estimated.
    pub proposed_dt: Real,
}

impl Block {
    /// Build a block with a zeroed base container and empty stage slots.
    pub fn new(id: BlockId, dims: BlockDims, x0: Real, dx: Real, nstages: usize) -> Self {
        Self {
            id,
            dims,
            x0,
            dx,
            neighbors: Neighbors::default(),
            containers: ContainerSet::new(Container::zeros(&dims), nstages),
            flux: FluxRegister::zeros(&dims),
            proposed_dt: Real::INFINITY,
        }
    }

    /// Physical x coordinate of the center of interior cell `i`
    /// (`i` is a storage index including the ghost offset).
    pub fn cell_x(&self, i: usize) -> Real {
        let rel = i as Real - self.dims.is() as Real;
        self.x0 + (rel + 0.5) * self.dx
    }
}
