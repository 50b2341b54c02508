//! Block extents and derived index ranges.

use spate_core::IndexRange;

/// Interior extents of a block plus the ghost width.
///
/// Ghost zones exist along x only — blocks form a 1-D chain, so y and z
/// are purely local directions. Total storage extent along x is
/// `nx + 2 * nghost`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDims {
    /// Interior cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Cells along z.
    pub nz: usize,
    /// Ghost width on each x face.
    pub nghost: usize,
}

impl BlockDims {
    /// Build dims; `nx`, `ny`, `nz` must be ≥ 1 and `nghost` ≥ 1.
    pub fn new(nx: usize, ny: usize, nz: usize, nghost: usize) -> Self {
        assert!(nx >= 1 && ny >= 1 && nz >= 1, "empty block");
        assert!(nghost >= 1, "ghost width must be at least 1");
        Self { nx, ny, nz, nghost }
    }

    /// Total storage extent along x (interior plus both ghost bands).
    pub fn ni(&self) -> usize {
        self.nx + 2 * self.nghost
    }

    /// Storage extent along y.
    pub fn nj(&self) -> usize {
        self.ny
    }

    /// Storage extent along z.
    pub fn nk(&self) -> usize {
        self.nz
    }

    /// First interior i index.
    pub fn is(&self) -> usize {
        self.nghost
    }

    /// One past the last interior i index.
    pub fn ie(&self) -> usize {
        self.nghost + self.nx
    }

    /// The interior cell range (excludes ghost bands).
    pub fn interior(&self) -> IndexRange {
        IndexRange::new(self.is(), self.ie(), 0, self.nj(), 0, self.nk())
    }

    /// The full cell range including ghosts.
    pub fn all(&self) -> IndexRange {
        IndexRange::new(0, self.ni(), 0, self.nj(), 0, self.nk())
    }

    /// Cells in one ghost slab (`nghost * nj * nk`).
    pub fn slab_cells(&self) -> usize {
        self.nghost * self.nj() * self.nk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_extents() {
        let d = BlockDims::new(8, 4, 2, 2);
        assert_eq!(d.ni(), 12);
        assert_eq!(d.is(), 2);
        assert_eq!(d.ie(), 10);
        assert_eq!(d.interior().cell_count(), 8 * 4 * 2);
        assert_eq!(d.all().cell_count(), 12 * 4 * 2);
        assert_eq!(d.slab_cells(), 2 * 4 * 2);
    }

    #[test]
    #[should_panic(expected = "empty block")]
    fn zero_extent_panics() {
        let _ = BlockDims::new(0, 1, 1, 1);
    }
}
