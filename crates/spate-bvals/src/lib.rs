//! Boundary exchange state machine and transport contract for Spate.
//!
//! Ghost-cell data moves between neighboring blocks through a five-step
//! protocol, one pass per integration stage: start receiving → send →
//! receive → set-from-buffer → clear. This crate owns the per-container
//! state machine that enforces the protocol ordering and the
//! [`Transport`] contract that carries the actual buffers. The buffer
//! mechanics (what a transport does with a slab) are deliberately
//! opaque; [`ChannelTransport`] is the in-process reference
//! implementation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod state;
pub mod transport;

pub use error::CommError;
pub use state::{BoundaryComm, CommProgress, CommScope, CommState, Face};
pub use transport::{ChannelTransport, Slab, Transport};
