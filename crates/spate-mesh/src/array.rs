//! Flat component-major cell arrays.

use spate_core::Real;

use crate::dims::BlockDims;

/// Number of conserved components.
pub const NCONS: usize = 5;
/// Number of primitive components.
pub const NPRIM: usize = 5;

/// Conserved field components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsComp {
    /// Mass density.
    Dens,
    /// x-momentum density.
    MomX,
    /// y-momentum density.
    MomY,
    /// z-momentum density.
    MomZ,
    /// Total energy density.
    Ener,
}

impl ConsComp {
    /// All components, in storage order.
    pub const ALL: [ConsComp; NCONS] = [
        ConsComp::Dens,
        ConsComp::MomX,
        ConsComp::MomY,
        ConsComp::MomZ,
        ConsComp::Ener,
    ];

    /// Storage index of the component.
    pub fn idx(self) -> usize {
        match self {
            ConsComp::Dens => 0,
            ConsComp::MomX => 1,
            ConsComp::MomY => 2,
            ConsComp::MomZ => 3,
            ConsComp::Ener => 4,
        }
    }
}

/// Primitive field components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimComp {
    /// Mass density.
    Rho,
    /// x-velocity.
    VelX,
    /// y-velocity.
    VelY,
    /// z-velocity.
    VelZ,
    /// Gas pressure.
    Pres,
}

impl PrimComp {
    /// Storage index of the component.
    pub fn idx(self) -> usize {
        match self {
            PrimComp::Rho => 0,
            PrimComp::VelX => 1,
            PrimComp::VelY => 2,
            PrimComp::VelZ => 3,
            PrimComp::Pres => 4,
        }
    }
}

/// A component-major flat array over `(comp, k, j, i)`.
///
/// One contiguous `Vec<Real>` per array, no per-cell allocation.
/// Used for conserved state, primitive state, rate-of-change storage,
/// and (with `ni = nx + 1`) face flux registers.
#[derive(Clone, Debug, PartialEq)]
pub struct CellArray {
    data: Vec<Real>,
    ncomp: usize,
    ni: usize,
    nj: usize,
    nk: usize,
}

impl CellArray {
    /// Zero-filled array with explicit extents.
    pub fn zeros(ncomp: usize, ni: usize, nj: usize, nk: usize) -> Self {
        Self {
            data: vec![0.0; ncomp * ni * nj * nk],
            ncomp,
            ni,
            nj,
            nk,
        }
    }

    /// Zero-filled cell-centered array covering a block (ghosts included).
    pub fn cells(ncomp: usize, dims: &BlockDims) -> Self {
        Self::zeros(ncomp, dims.ni(), dims.nj(), dims.nk())
    }

    /// An array with the same extents, zero-filled.
    pub fn like(&self) -> Self {
        Self::zeros(self.ncomp, self.ni, self.nj, self.nk)
    }

    /// Extent along i.
    pub fn ni(&self) -> usize {
        self.ni
    }

    /// Extent along j.
    pub fn nj(&self) -> usize {
        self.nj
    }

    /// Extent along k.
    pub fn nk(&self) -> usize {
        self.nk
    }

    /// Number of components.
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    #[inline]
    fn offset(&self, c: usize, k: usize, j: usize, i: usize) -> usize {
        debug_assert!(c < self.ncomp && k < self.nk && j < self.nj && i < self.ni);
        ((c * self.nk + k) * self.nj + j) * self.ni + i
    }

    /// Read one cell.
    #[inline]
    pub fn at(&self, c: usize, k: usize, j: usize, i: usize) -> Real {
        self.data[self.offset(c, k, j, i)]
    }

    /// Write one cell.
    #[inline]
    pub fn set(&mut self, c: usize, k: usize, j: usize, i: usize, v: Real) {
        let o = self.offset(c, k, j, i);
        self.data[o] = v;
    }

    /// Mutable reference to one cell.
    #[inline]
    pub fn at_mut(&mut self, c: usize, k: usize, j: usize, i: usize) -> &mut Real {
        let o = self.offset(c, k, j, i);
        &mut self.data[o]
    }

    /// Fill every cell of every component.
    pub fn fill(&mut self, v: Real) {
        self.data.fill(v);
    }

    /// Raw storage, for whole-array reductions in tests.
    pub fn raw(&self) -> &[Real] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_component_major() {
        let mut a = CellArray::zeros(2, 3, 2, 2);
        a.set(1, 1, 1, 2, 7.5);
        assert_eq!(a.at(1, 1, 1, 2), 7.5);
        assert_eq!(a.at(0, 1, 1, 2), 0.0);
        // Last element of the flat buffer is (ncomp-1, nk-1, nj-1, ni-1).
        assert_eq!(a.raw().len(), 2 * 3 * 2 * 2);
        assert_eq!(a.raw()[a.raw().len() - 1], a.at(1, 1, 1, 2));
    }

    #[test]
    fn like_preserves_extents_not_values() {
        let mut a = CellArray::zeros(1, 2, 2, 2);
        a.fill(3.0);
        let b = a.like();
        assert_eq!(b.ni(), 2);
        assert!(b.raw().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn comp_indices_are_dense() {
        for (n, c) in ConsComp::ALL.iter().enumerate() {
            assert_eq!(c.idx(), n);
        }
        assert_eq!(PrimComp::Pres.idx(), 4);
    }
}
