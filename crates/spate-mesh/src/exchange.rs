//! Mesh-side half of the ghost-cell exchange: packing, posting,
//! polling, and unpacking slabs for one container of one block.
//!
//! The protocol ordering itself lives in [`spate_bvals::BoundaryComm`];
//! these functions drive it and move conserved data between interior
//! edge bands and ghost bands. Slabs are component-major over
//! `(c, k, j, g)` where `g` runs over the `nghost`-wide band in
//! increasing-x order, so a slab packed from a sender's interior edge
//! unpacks directly into the receiver's ghost band.

use smallvec::SmallVec;

use spate_bvals::{CommProgress, CommScope, Face, Slab, Transport};

use crate::array::NCONS;
use crate::block::Block;
use crate::container::ContainerKey;
use crate::dims::BlockDims;
use crate::error::ExchangeError;

/// Storage i-range of the interior edge band that gets sent across
/// `face`.
fn send_band(dims: &BlockDims, face: Face) -> std::ops::Range<usize> {
    match face {
        Face::XLow => dims.is()..dims.is() + dims.nghost,
        Face::XHigh => dims.ie() - dims.nghost..dims.ie(),
    }
}

/// Storage i-range of the ghost band that gets filled from `face`.
fn ghost_band(dims: &BlockDims, face: Face) -> std::ops::Range<usize> {
    match face {
        Face::XLow => 0..dims.is(),
        Face::XHigh => dims.ie()..dims.ni(),
    }
}

/// Arm receives on the container's comm machine for every face that has
/// a neighbor.
pub fn start_receiving(block: &mut Block, key: ContainerKey) -> Result<(), ExchangeError> {
    let faces = block.neighbors.exchange_faces();
    let comm = &mut block.containers.get_mut(key)?.comm;
    comm.start_receiving(CommScope::All, &faces)?;
    Ok(())
}

/// Pack and post one slab per neighbor face, then mark the container
/// sent.
///
/// Slabs are addressed to the matching face of the neighbor: our high-x
/// edge arrives at the neighbor's low-x ghost mailbox.
pub fn send_boundary_buffers(
    block: &mut Block,
    key: ContainerKey,
    transport: &dyn Transport,
) -> Result<(), ExchangeError> {
    let dims = block.dims;
    let faces = block.neighbors.faces();
    let container = block.containers.get_mut(key)?;
    for (face, neighbor) in faces {
        let band = send_band(&dims, face);
        let mut slab = Slab::with_capacity(NCONS * dims.slab_cells());
        for c in 0..NCONS {
            for k in 0..dims.nk() {
                for j in 0..dims.nj() {
                    for i in band.clone() {
                        slab.push(container.cons.at(c, k, j, i));
                    }
                }
            }
        }
        transport.post(neighbor, face.opposite(), slab)?;
    }
    container.comm.mark_sent()?;
    Ok(())
}

/// Poll the transport for every still-pending face and stash arrivals.
///
/// Returns [`CommProgress::Incomplete`] while any armed face is still
/// waiting; the caller retries later. Ghost data is untouched until
/// [`set_boundaries`].
pub fn receive_boundary_buffers(
    block: &mut Block,
    key: ContainerKey,
    transport: &dyn Transport,
) -> Result<CommProgress, ExchangeError> {
    let id = block.id;
    let container = block.containers.get_mut(key)?;
    let pending: SmallVec<[Face; 2]> = container.comm.pending_faces().iter().copied().collect();
    for face in pending {
        if let Some(slab) = transport.poll(id, face)? {
            container.comm.stash(face, slab)?;
        }
    }
    Ok(container.comm.try_complete_receive()?)
}

/// Unpack every stashed slab into its ghost band and mark the container
/// set.
pub fn set_boundaries(block: &mut Block, key: ContainerKey) -> Result<(), ExchangeError> {
    let dims = block.dims;
    let faces = block.neighbors.exchange_faces();
    let container = block.containers.get_mut(key)?;
    for face in faces {
        let slab = match container.comm.take_stash(face) {
            Some(slab) => slab,
            // A completed receive has a slab for every armed face.
            None => continue,
        };
        let want = NCONS * dims.slab_cells();
        if slab.len() != want {
            return Err(ExchangeError::SlabMismatch {
                face,
                got: slab.len(),
                want,
            });
        }
        let band = ghost_band(&dims, face);
        let mut it = slab.into_iter();
        for c in 0..NCONS {
            for k in 0..dims.nk() {
                for j in 0..dims.nj() {
                    for i in band.clone() {
                        // Length checked above, so the iterator cannot
                        // run dry.
                        if let Some(v) = it.next() {
                            container.cons.set(c, k, j, i, v);
                        }
                    }
                }
            }
        }
    }
    container.comm.mark_set()?;
    Ok(())
}

/// Finish the pass: transition the container's comm machine to cleared
/// so the next stage can re-arm it.
pub fn clear_boundary(block: &mut Block, key: ContainerKey) -> Result<(), ExchangeError> {
    let comm = &mut block.containers.get_mut(key)?.comm;
    comm.clear(CommScope::All)?;
    Ok(())
}
