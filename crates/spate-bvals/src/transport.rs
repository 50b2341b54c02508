//! Boundary-buffer transport contract and the in-process reference
//! implementation.
//!
//! The driver never sees how slabs move — only that they can be posted
//! to a (block, face) destination and polled without blocking. A
//! cross-node transport would implement [`Transport`] over its own
//! wire; [`ChannelTransport`] covers the single-process case with one
//! crossbeam mailbox per destination.

use crossbeam_channel::{unbounded, Receiver, Sender};
use indexmap::IndexMap;

use spate_core::{BlockId, Real};

use crate::error::CommError;
use crate::state::Face;

/// A packed boundary buffer: ghost-width slab of every conserved
/// component, flattened.
pub type Slab = Vec<Real>;

/// Non-blocking buffer movement between blocks.
///
/// Implementations must be shareable across lanes (`Send + Sync`);
/// `poll` returns `Ok(None)` when nothing has arrived yet, which the
/// caller reports as an incomplete task status.
pub trait Transport: Send + Sync {
    /// Post a slab to the given face of the destination block.
    fn post(&self, to: BlockId, face: Face, slab: Slab) -> Result<(), CommError>;

    /// Take the next slab posted to the given face of `to`, if any.
    fn poll(&self, to: BlockId, face: Face) -> Result<Option<Slab>, CommError>;
}

/// In-process transport: one unbounded crossbeam mailbox per
/// (block, face) destination.
///
/// Senders and receivers are both stored so either side of an exchange
/// can run on any lane; crossbeam channels take `&self` for both
/// operations, so the transport is shared by reference across the
/// worker pool.
#[derive(Debug)]
pub struct ChannelTransport {
    mailboxes: IndexMap<(BlockId, Face), (Sender<Slab>, Receiver<Slab>)>,
}

impl ChannelTransport {
    /// Create mailboxes for `nblocks` blocks (both faces each).
    pub fn new(nblocks: usize) -> Self {
        let mut mailboxes = IndexMap::new();
        for b in 0..nblocks {
            let id = BlockId(b as u32);
            for face in [Face::XLow, Face::XHigh] {
                mailboxes.insert((id, face), unbounded());
            }
        }
        Self { mailboxes }
    }
}

impl Transport for ChannelTransport {
    fn post(&self, to: BlockId, face: Face, slab: Slab) -> Result<(), CommError> {
        let (tx, _) = self
            .mailboxes
            .get(&(to, face))
            .ok_or(CommError::UnknownMailbox { block: to, face })?;
        // The receiver half lives in the same map, so send cannot fail.
        tx.send(slab)
            .map_err(|_| CommError::UnknownMailbox { block: to, face })
    }

    fn poll(&self, to: BlockId, face: Face) -> Result<Option<Slab>, CommError> {
        let (_, rx) = self
            .mailboxes
            .get(&(to, face))
            .ok_or(CommError::UnknownMailbox { block: to, face })?;
        Ok(rx.try_recv().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_then_poll_round_trips() {
        let t = ChannelTransport::new(2);
        t.post(BlockId(1), Face::XLow, vec![1.0, 2.0]).unwrap();
        assert_eq!(
            t.poll(BlockId(1), Face::XLow).unwrap(),
            Some(vec![1.0, 2.0])
        );
        // Mailbox drained.
        assert_eq!(t.poll(BlockId(1), Face::XLow).unwrap(), None);
    }

    #[test]
    fn poll_empty_mailbox_is_none_not_error() {
        let t = ChannelTransport::new(1);
        assert_eq!(t.poll(BlockId(0), Face::XHigh).unwrap(), None);
    }

    #[test]
    fn unknown_destination_is_fatal() {
        let t = ChannelTransport::new(1);
        assert!(matches!(
            t.post(BlockId(7), Face::XLow, vec![]),
            Err(CommError::UnknownMailbox { .. })
        ));
        assert!(t.poll(BlockId(7), Face::XLow).is_err());
    }

    #[test]
    fn mailboxes_are_fifo_per_destination() {
        let t = ChannelTransport::new(1);
        t.post(BlockId(0), Face::XLow, vec![1.0]).unwrap();
        t.post(BlockId(0), Face::XLow, vec![2.0]).unwrap();
        assert_eq!(t.poll(BlockId(0), Face::XLow).unwrap(), Some(vec![1.0]));
        assert_eq!(t.poll(BlockId(0), Face::XLow).unwrap(), Some(vec![2.0]));
    }

    #[test]
    fn faces_are_independent_mailboxes() {
        let t = ChannelTransport::new(1);
        t.post(BlockId(0), Face::XLow, vec![1.0]).unwrap();
        assert_eq!(t.poll(BlockId(0), Face::XHigh).unwrap(), None);
        assert_eq!(t.poll(BlockId(0), Face::XLow).unwrap(), Some(vec![1.0]));
    }
}
