//! Per-container boundary exchange state machine.
//!
//! Each (block, container) pair owns one [`BoundaryComm`]. The five
//! protocol operations form one pass per integration stage:
//!
//! 1. `start_receiving(scope, faces)` — arm receive buffers
//! 2. `mark_sent()` — after packing and posting outgoing slabs
//! 3. `stash()` / `try_complete_receive()` — accept neighbor slabs,
//!    reporting incomplete until every armed face has arrived
//! 4. `mark_set()` — after unpacking slabs into ghost cells
//! 5. `clear(scope)` — terminal transition before the next stage reuses
//!    the container
//!
//! Out-of-order calls are fatal ([`CommError`]); a pending receive is
//! not. Retrying an incomplete receive never touches ghost data — slabs
//! accumulate in an internal stash until the unpack step.

use smallvec::SmallVec;

use crate::error::CommError;
use crate::transport::Slab;

/// The two exchange faces of a block in the 1-D chain decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    /// The low-x face.
    XLow,
    /// The high-x face.
    XHigh,
}

impl Face {
    /// The matching face on the neighboring block.
    pub fn opposite(self) -> Face {
        match self {
            Face::XLow => Face::XHigh,
            Face::XHigh => Face::XLow,
        }
    }

    fn slot(self) -> usize {
        match self {
            Face::XLow => 0,
            Face::XHigh => 1,
        }
    }
}

/// Which boundary types a communication pass covers.
///
/// v1 carries a single scope covering all boundaries; the enum keeps the
/// arming/clearing contract explicit (a scope must be armed before it
/// can be cleared).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommScope {
    /// All boundary types.
    All,
}

/// Protocol position of one container's exchange pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommState {
    /// No pass in flight (initial state).
    Idle,
    /// Receive buffers armed; sends not yet issued.
    Receiving,
    /// Outgoing slabs posted; awaiting neighbor slabs.
    Sent,
    /// Every armed face has arrived; ghosts not yet filled.
    Received,
    /// Ghost cells filled from the stash.
    Set,
    /// Pass finished; container ready for the next stage.
    Cleared,
}

/// Whether a protocol step finished or needs another attempt.
///
/// Mirrors the executor's task status: `Incomplete` means "retry me",
/// never "I failed".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommProgress {
    /// The step finished.
    Complete,
    /// Neighbor data has not yet arrived; retry later.
    Incomplete,
}

/// Boundary exchange state for one container.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryComm {
    state: CommState,
    armed: Option<CommScope>,
    pending: SmallVec<[Face; 2]>,
    stash: [Option<Slab>; 2],
}

impl Default for BoundaryComm {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryComm {
    /// Create a state machine in the idle state.
    pub fn new() -> Self {
        Self {
            state: CommState::Idle,
            armed: None,
            pending: SmallVec::new(),
            stash: [None, None],
        }
    }

    /// Current protocol state.
    pub fn state(&self) -> CommState {
        self.state
    }

    /// Arm receive buffers for `scope`, expecting one slab per face in
    /// `faces`. Must precede any send/receive for this stage.
    ///
    /// # Errors
    ///
    /// `OutOfOrder` unless the machine is `Idle` or `Cleared`.
    pub fn start_receiving(&mut self, scope: CommScope, faces: &[Face]) -> Result<(), CommError> {
        match self.state {
            CommState::Idle | CommState::Cleared => {
                self.state = CommState::Receiving;
                self.armed = Some(scope);
                self.pending = faces.iter().copied().collect();
                self.stash = [None, None];
                Ok(())
            }
            state => Err(CommError::OutOfOrder {
                op: "start_receiving",
                state,
            }),
        }
    }

    /// Record that this container's outgoing slabs have been posted.
    ///
    /// # Errors
    ///
    /// `OutOfOrder` unless receives were armed first.
    pub fn mark_sent(&mut self) -> Result<(), CommError> {
        match self.state {
            CommState::Receiving => {
                self.state = CommState::Sent;
                Ok(())
            }
            state => Err(CommError::OutOfOrder {
                op: "send_boundary_buffers",
                state,
            }),
        }
    }

    /// Faces still awaiting a neighbor slab.
    pub fn pending_faces(&self) -> &[Face] {
        &self.pending
    }

    /// Accept a neighbor slab for `face`.
    ///
    /// Stashing is idempotent with respect to ghost data — nothing is
    /// unpacked until [`take_stash`](Self::take_stash).
    ///
    /// # Errors
    ///
    /// `OutOfOrder` unless sends have been issued for this pass.
    pub fn stash(&mut self, face: Face, slab: Slab) -> Result<(), CommError> {
        match self.state {
            CommState::Sent => {
                self.pending.retain(|f| *f != face);
                self.stash[face.slot()] = Some(slab);
                Ok(())
            }
            state => Err(CommError::OutOfOrder {
                op: "receive_boundary_buffers",
                state,
            }),
        }
    }

    /// Check whether every armed face has arrived.
    ///
    /// Transitions to `Received` once the pending set is empty. Calling
    /// again after completion is a no-op returning `Complete` (the
    /// executor may re-sweep a lane whose receive already finished).
    ///
    /// # Errors
    ///
    /// `OutOfOrder` if sends were never issued for this pass.
    pub fn try_complete_receive(&mut self) -> Result<CommProgress, CommError> {
        match self.state {
            CommState::Sent => {
                if self.pending.is_empty() {
                    self.state = CommState::Received;
                    Ok(CommProgress::Complete)
                } else {
                    Ok(CommProgress::Incomplete)
                }
            }
            CommState::Received => Ok(CommProgress::Complete),
            state => Err(CommError::OutOfOrder {
                op: "receive_boundary_buffers",
                state,
            }),
        }
    }

    /// Take the stashed slab for `face`, if any, for unpacking.
    pub fn take_stash(&mut self, face: Face) -> Option<Slab> {
        self.stash[face.slot()].take()
    }

    /// Record that ghost cells have been filled from the stash.
    ///
    /// # Errors
    ///
    /// `OutOfOrder` unless the receive completed.
    pub fn mark_set(&mut self) -> Result<(), CommError> {
        match self.state {
            CommState::Received => {
                self.state = CommState::Set;
                Ok(())
            }
            state => Err(CommError::OutOfOrder {
                op: "set_boundaries",
                state,
            }),
        }
    }

    /// Terminal transition: mark the container ready for the next
    /// stage's pass.
    ///
    /// # Errors
    ///
    /// `ScopeNotArmed` if `scope` was never armed this pass (guards
    /// against clearing a scope that was never started), `OutOfOrder`
    /// unless ghosts were set.
    pub fn clear(&mut self, scope: CommScope) -> Result<(), CommError> {
        if self.armed != Some(scope) {
            return Err(CommError::ScopeNotArmed { scope });
        }
        match self.state {
            CommState::Set => {
                self.state = CommState::Cleared;
                self.armed = None;
                Ok(())
            }
            state => Err(CommError::OutOfOrder { op: "clear", state }),
        }
    }
}
