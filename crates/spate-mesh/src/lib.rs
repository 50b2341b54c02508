//! Blocks, state containers, and ghost-cell exchange for Spate.
//!
//! A mesh is a 1-D chain of [`Block`]s (a pencil decomposition: ghost
//! zones along x only). Each block owns a fixed slot table of
//! [`Container`]s — named snapshots of all field data, one per
//! integration stage plus the accumulated rate-of-change — created once
//! at the first stage of the first step and overwritten in place every
//! step after that.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod block;
pub mod boundary;
pub mod container;
pub mod dims;
pub mod error;
pub mod exchange;
pub mod mesh;

pub use array::{CellArray, ConsComp, PrimComp, NCONS, NPRIM};
pub use block::{Block, FluxRegister, Neighbors};
pub use boundary::{apply_physical_boundaries, BoundaryKind};
pub use container::{Container, ContainerKey, ContainerSet};
pub use dims::BlockDims;
pub use error::{ExchangeError, MeshError};
pub use mesh::Mesh;
