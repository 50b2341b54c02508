//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a mesh block within one processing element.
///
/// Blocks are registered at mesh construction and assigned sequential
/// IDs. `BlockId(n)` corresponds to the n-th block in the mesh's block
/// list. Identity is stable for the lifetime of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BlockId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl BlockId {
    /// The block's position in the mesh block list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
