//! Named state containers and the per-block container set.

use std::fmt;

use spate_bvals::BoundaryComm;
use spate_core::{IndexRange, Real};

use crate::array::{CellArray, NCONS, NPRIM};
use crate::dims::BlockDims;
use crate::error::MeshError;

/// One named snapshot of all field data for a block at one stage.
///
/// Holds both representations of the state (conserved and primitive)
/// plus the boundary-exchange state machine for this container. Created
/// once and overwritten in place every subsequent step.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    /// Conserved state: density, momentum, total energy.
    pub cons: CellArray,
    /// Primitive state: density, velocity, pressure.
    pub prim: CellArray,
    /// Boundary exchange protocol state for this container.
    pub comm: BoundaryComm,
}

impl Container {
    /// Zero-filled container covering `dims`.
    pub fn zeros(dims: &BlockDims) -> Self {
        Self {
            cons: CellArray::cells(NCONS, dims),
            prim: CellArray::cells(NPRIM, dims),
            comm: BoundaryComm::new(),
        }
    }

    /// A container with the same layout, zero values, and a fresh comm
    /// state machine. Deep-copies shape, not contents.
    pub fn like(&self) -> Self {
        Self {
            cons: self.cons.like(),
            prim: self.prim.like(),
            comm: BoundaryComm::new(),
        }
    }
}

/// Key into a block's container slot table.
///
/// The driver addresses containers by role rather than by string name:
/// `Base` is the state at stage 0, `DuDt` the accumulated rate of
/// change, `Stage(s)` the working state after stage `s` (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKey {
    /// State at the start of the step.
    Base,
    /// Accumulated rate-of-change (stale until recomputed each stage).
    DuDt,
    /// Working state for stage `s`, `1 <= s <= nstages`.
    Stage(u16),
}

impl ContainerKey {
    /// The container holding the input state for stage `s`:
    /// `Base` when `s == 1`, otherwise `Stage(s - 1)`.
    pub fn stage_input(s: usize) -> ContainerKey {
        if s <= 1 {
            ContainerKey::Base
        } else {
            ContainerKey::Stage((s - 1) as u16)
        }
    }

    /// The container receiving stage `s`'s output.
    pub fn stage_output(s: usize) -> ContainerKey {
        ContainerKey::Stage(s as u16)
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::DuDt => write!(f, "dUdt"),
            Self::Stage(s) => write!(f, "stage_{s}"),
        }
    }
}

/// Fixed slot table of containers for one block.
///
/// Slots are sized once from the integrator's stage count: `Base`,
/// `DuDt`, and `Stage(1..=nstages)`. String-keyed lookup failure modes
/// are impossible by construction; an unpopulated slot is the only
/// lookup error.
#[derive(Clone, Debug)]
pub struct ContainerSet {
    slots: Vec<Option<Container>>,
    nstages: usize,
}

impl ContainerSet {
    /// Build a set with `base` populated and every other slot empty.
    pub fn new(base: Container, nstages: usize) -> Self {
        assert!(nstages >= 1, "nstages must be at least 1");
        let mut slots: Vec<Option<Container>> = Vec::with_capacity(nstages + 2);
        slots.push(Some(base));
        slots.resize_with(nstages + 2, || None);
        Self { slots, nstages }
    }

    fn slot_index(&self, key: ContainerKey) -> Result<usize, MeshError> {
        match key {
            ContainerKey::Base => Ok(0),
            ContainerKey::DuDt => Ok(1),
            ContainerKey::Stage(s) => {
                let s = s as usize;
                if s >= 1 && s <= self.nstages {
                    Ok(1 + s)
                } else {
                    Err(MeshError::StageOutOfRange {
                        stage: s,
                        nstages: self.nstages,
                    })
                }
            }
        }
    }

    /// Look up a container.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` if the slot was never populated.
    pub fn get(&self, key: ContainerKey) -> Result<&Container, MeshError> {
        let idx = self.slot_index(key)?;
        self.slots[idx]
            .as_ref()
            .ok_or(MeshError::ContainerNotFound { key })
    }

    /// Mutable container lookup.
    pub fn get_mut(&mut self, key: ContainerKey) -> Result<&mut Container, MeshError> {
        let idx = self.slot_index(key)?;
        self.slots[idx]
            .as_mut()
            .ok_or(MeshError::ContainerNotFound { key })
    }

    /// Populate a slot by deep-copying the layout of `Base`.
    ///
    /// Idempotent: a no-op when the slot is already populated, so the
    /// driver may call this at stage 1 of every step. Allocation only
    /// happens the first time.
    pub fn add(&mut self, key: ContainerKey) -> Result<(), MeshError> {
        let idx = self.slot_index(key)?;
        if self.slots[idx].is_none() {
            let fresh = self.get(ContainerKey::Base)?.like();
            self.slots[idx] = Some(fresh);
        }
        Ok(())
    }

    /// Create `DuDt` and `Stage(1..=nstages)` storage. Idempotent.
    pub fn ensure_stage_storage(&mut self) -> Result<(), MeshError> {
        self.add(ContainerKey::DuDt)?;
        for s in 1..=self.nstages {
            self.add(ContainerKey::Stage(s as u16))?;
        }
        Ok(())
    }

    /// Apply the stage update in place over `range`:
    /// `stage_s = stage_{s-1} + beta_dt * dUdt` for every conserved
    /// component.
    pub fn apply_update(
        &mut self,
        stage: usize,
        beta_dt: Real,
        range: IndexRange,
    ) -> Result<(), MeshError> {
        let dst_idx = self.slot_index(ContainerKey::stage_output(stage))?;
        // Take the destination out so the source and dUdt can be read
        // through shared borrows while it is written.
        let mut dst = self.slots[dst_idx]
            .take()
            .ok_or(MeshError::ContainerNotFound {
                key: ContainerKey::stage_output(stage),
            })?;
        let result = (|| {
            let src = self.get(ContainerKey::stage_input(stage))?;
            let dudt = self.get(ContainerKey::DuDt)?;
            for c in 0..dst.cons.ncomp() {
                for k in range.kl..range.ku {
                    for j in range.jl..range.ju {
                        for i in range.il..range.iu {
                            let v = src.cons.at(c, k, j, i) + beta_dt * dudt.cons.at(c, k, j, i);
                            dst.cons.set(c, k, j, i, v);
                        }
                    }
                }
            }
            Ok(())
        })();
        self.slots[dst_idx] = Some(dst);
        result
    }

    /// Swap `Stage(nstages)` into `Base` at the end of a full step.
    ///
    /// No copy: the final stage's storage becomes next step's base and
    /// the old base becomes the final stage's scratch.
    pub fn promote_final_stage(&mut self) -> Result<(), MeshError> {
        let last = self.slot_index(ContainerKey::Stage(self.nstages as u16))?;
        if self.slots[last].is_none() {
            return Err(MeshError::ContainerNotFound {
                key: ContainerKey::Stage(self.nstages as u16),
            });
        }
        self.slots.swap(0, last);
        Ok(())
    }

    /// Configured stage count.
    pub fn nstages(&self) -> usize {
        self.nstages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ConsComp;

    fn dims() -> BlockDims {
        BlockDims::new(4, 1, 1, 2)
    }

    fn set_with_stages(nstages: usize) -> ContainerSet {
        let mut set = ContainerSet::new(Container::zeros(&dims()), nstages);
        set.ensure_stage_storage().unwrap();
        set
    }

    #[test]
    fn get_missing_slot_fails() {
        let set = ContainerSet::new(Container::zeros(&dims()), 2);
        assert_eq!(
            set.get(ContainerKey::DuDt),
            Err(MeshError::ContainerNotFound {
                key: ContainerKey::DuDt
            })
        );
    }

    #[test]
    fn stage_zero_and_overflow_rejected() {
        let set = set_with_stages(2);
        assert!(matches!(
            set.get(ContainerKey::Stage(0)),
            Err(MeshError::StageOutOfRange { .. })
        ));
        assert!(matches!(
            set.get(ContainerKey::Stage(3)),
            Err(MeshError::StageOutOfRange { .. })
        ));
    }

    #[test]
    fn add_is_idempotent_and_reuses_storage() {
        let mut set = set_with_stages(2);
        // Scribble on stage_1, then re-add: values must survive (no-op).
        set.get_mut(ContainerKey::Stage(1))
            .unwrap()
            .cons
            .set(ConsComp::Dens.idx(), 0, 0, 2, 9.0);
        set.add(ContainerKey::Stage(1)).unwrap();
        assert_eq!(
            set.get(ContainerKey::Stage(1))
                .unwrap()
                .cons
                .at(ConsComp::Dens.idx(), 0, 0, 2),
            9.0
        );
    }

    #[test]
    fn apply_update_blends_with_beta_dt() {
        let mut set = set_with_stages(2);
        let d = ConsComp::Dens.idx();
        set.get_mut(ContainerKey::Base).unwrap().cons.fill(1.0);
        set.get_mut(ContainerKey::DuDt).unwrap().cons.fill(2.0);

        let range = dims().interior();
        set.apply_update(1, 0.1, range).unwrap();

        let s1 = set.get(ContainerKey::Stage(1)).unwrap();
        // Interior: 1.0 + 0.1 * 2.0
        assert_eq!(s1.cons.at(d, 0, 0, dims().is()), 1.2);
        // Ghost cells untouched by the update (filled by exchange later).
        assert_eq!(s1.cons.at(d, 0, 0, 0), 0.0);
    }

    #[test]
    fn stage_input_chains_from_base() {
        assert_eq!(ContainerKey::stage_input(1), ContainerKey::Base);
        assert_eq!(ContainerKey::stage_input(2), ContainerKey::Stage(1));
        assert_eq!(ContainerKey::stage_output(2), ContainerKey::Stage(2));
    }

    #[test]
    fn promote_swaps_final_stage_into_base() {
        let mut set = set_with_stages(2);
        set.get_mut(ContainerKey::Stage(2)).unwrap().cons.fill(5.0);
        set.promote_final_stage().unwrap();
        assert_eq!(set.get(ContainerKey::Base).unwrap().cons.at(0, 0, 0, 0), 5.0);
        assert_eq!(
            set.get(ContainerKey::Stage(2)).unwrap().cons.at(0, 0, 0, 0),
            0.0
        );
    }

    #[test]
    fn display_names_match_roles() {
        assert_eq!(ContainerKey::Base.to_string(), "base");
        assert_eq!(ContainerKey::DuDt.to_string(), "dUdt");
        assert_eq!(ContainerKey::Stage(3).to_string(), "stage_3");
    }
}
