//! Physical boundary conditions at the outer edges of the chain.
//!
//! Applied after the neighbor exchange: faces with a neighbor got their
//! ghosts from the exchange, faces without one are filled here from the
//! block's own interior.

use spate_bvals::Face;

use crate::array::ConsComp;
use crate::block::Block;
use crate::container::ContainerKey;
use crate::error::MeshError;

/// Condition applied at domain-edge faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Zero-gradient: each ghost cell copies the nearest interior cell.
    Outflow,
    /// Solid wall: ghosts mirror the interior with the x-momentum
    /// negated.
    Reflect,
}

/// Fill the ghost bands of every face that has no neighbor.
///
/// Operates on the conserved state of `key`; primitives are refreshed
/// by the derived-fill step that follows.
pub fn apply_physical_boundaries(
    block: &mut Block,
    key: ContainerKey,
    kind: BoundaryKind,
) -> Result<(), MeshError> {
    let dims = block.dims;
    let neighbors = block.neighbors;
    let cons = &mut block.containers.get_mut(key)?.cons;

    for face in [Face::XLow, Face::XHigh] {
        let open = match face {
            Face::XLow => neighbors.xlow.is_none(),
            Face::XHigh => neighbors.xhigh.is_none(),
        };
        if !open {
            continue;
        }
        let ghosts: Vec<usize> = match face {
            Face::XLow => (0..dims.is()).collect(),
            Face::XHigh => (dims.ie()..dims.ni()).collect(),
        };
        for c in 0..cons.ncomp() {
            let flip = kind == BoundaryKind::Reflect && c == ConsComp::MomX.idx();
            for k in 0..dims.nk() {
                for j in 0..dims.nj() {
                    for &i in &ghosts {
                        let src = match (kind, face) {
                            (BoundaryKind::Outflow, Face::XLow) => dims.is(),
                            (BoundaryKind::Outflow, Face::XHigh) => dims.ie() - 1,
                            // Mirror image across the face.
                            (BoundaryKind::Reflect, Face::XLow) => 2 * dims.is() - 1 - i,
                            (BoundaryKind::Reflect, Face::XHigh) => 2 * dims.ie() - 1 - i,
                        };
                        let mut v = cons.at(c, k, j, src);
                        if flip {
                            v = -v;
                        }
                        cons.set(c, k, j, i, v);
                    }
                }
            }
        }
    }
    Ok(())
}
