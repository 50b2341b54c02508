//! Shared fixtures and mock collaborators for Spate tests.
//!
//! Mesh builders produce floor-consistent initial states; the mock RHS
//! kernels and transports inject delays and failures at the seams the
//! driver exposes for them.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use spate_bvals::{ChannelTransport, CommError, Face, Slab, Transport};
use spate_core::{BlockId, Real, TaskFault};
use spate_driver::{InputParams, RhsSolver, ZeroRhs};
use spate_eos::{EosKind, EquationOfState};
use spate_mesh::{Block, BlockDims, Container, ContainerKey, Mesh, NCONS};

// ── Parameter and mesh fixtures ──────────────────────────────

/// A minimal valid parameter table: adiabatic gas, explicit CFL so
/// construction records no warnings.
pub fn uniform_params() -> InputParams {
    let mut params = InputParams::new();
    params.set("hydro", "eos", "adiabatic");
    params.set("hydro", "cfl", "0.3");
    params
}

fn sync_conserved(mesh: &mut Mesh) {
    // Fixture meshes are gamma-law with no floors; tests that exercise
    // floors inject them through the driver configuration instead.
    let eos = EquationOfState::new(EosKind::Adiabatic { gamma: 5.0 / 3.0 }, 0.0, 0.0);
    for block in &mut mesh.blocks {
        let range = block.dims.all();
        let Container { cons, prim, .. } = block
            .containers
            .get_mut(ContainerKey::Base)
            .expect("base populated by construction");
        eos.primitive_to_conserved(cons, prim, range)
            .expect("full-block range is valid");
    }
}

/// A chain over `[0, nblocks)` with spatially uniform state, conserved
/// representation established.
pub fn uniform_mesh(
    nblocks: usize,
    dims: BlockDims,
    rho: Real,
    vx: Real,
    pres: Real,
    nstages: usize,
) -> Mesh {
    let mut mesh = Mesh::chain(nblocks, dims, 0.0, nblocks as Real, nstages, |_| {
        [rho, vx, 0.0, 0.0, pres]
    });
    sync_conserved(&mut mesh);
    mesh
}

/// A chain with deterministic noise on density and pressure around 1.0.
///
/// The same seed always produces the same mesh. `amplitude` must stay
/// below 1.0 so the state remains physical without floors.
pub fn perturbed_mesh(
    nblocks: usize,
    dims: BlockDims,
    nstages: usize,
    seed: u64,
    amplitude: Real,
) -> Mesh {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut mesh = Mesh::chain(nblocks, dims, 0.0, nblocks as Real, nstages, move |_| {
        let d: Real = rng.random_range(-1.0..1.0);
        let p: Real = rng.random_range(-1.0..1.0);
        [1.0 + amplitude * d, 0.0, 0.0, 0.0, 1.0 + amplitude * p]
    });
    sync_conserved(&mut mesh);
    mesh
}

// ── Mock RHS kernels ─────────────────────────────────────────

/// Zero RHS that counts how many times it ran.
#[derive(Debug, Default)]
pub struct CountingRhs {
    calls: Arc<AtomicU64>,
}

impl CountingRhs {
    /// Handle to the call counter; stays valid after the kernel moves
    /// into the driver.
    pub fn calls(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.calls)
    }
}

impl RhsSolver for CountingRhs {
    fn label(&self) -> &'static str {
        "counting"
    }

    fn compute_fluxes(&self, block: &mut Block, key: ContainerKey) -> Result<(), TaskFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ZeroRhs.compute_fluxes(block, key)
    }
}

/// Zero RHS that fails on one block after a number of successes there.
#[derive(Debug)]
pub struct FailingRhs {
    block: BlockId,
    after: u64,
    seen: AtomicU64,
}

impl FailingRhs {
    /// Fail on `block` once it has succeeded `after` times.
    pub fn new(block: BlockId, after: u64) -> Self {
        Self {
            block,
            after,
            seen: AtomicU64::new(0),
        }
    }
}

impl RhsSolver for FailingRhs {
    fn label(&self) -> &'static str {
        "failing"
    }

    fn compute_fluxes(&self, block: &mut Block, key: ContainerKey) -> Result<(), TaskFault> {
        if block.id == self.block {
            let seen = self.seen.fetch_add(1, Ordering::SeqCst);
            if seen >= self.after {
                return Err(TaskFault::execution(format!(
                    "injected rhs failure on block {}",
                    block.id
                )));
            }
        }
        ZeroRhs.compute_fluxes(block, key)
    }
}

/// RHS that writes a face-linear flux `F(f) = slope * f` into every
/// component, for a constant divergence `slope / dx` on every interior
/// cell. Updates it drives are exactly predictable.
#[derive(Clone, Copy, Debug)]
pub struct RampFluxRhs {
    slope: Real,
}

impl RampFluxRhs {
    /// Ramp with the given per-face increment.
    pub fn new(slope: Real) -> Self {
        Self { slope }
    }
}

impl RhsSolver for RampFluxRhs {
    fn label(&self) -> &'static str {
        "ramp"
    }

    fn compute_fluxes(&self, block: &mut Block, _key: ContainerKey) -> Result<(), TaskFault> {
        let dims = block.dims;
        for c in 0..NCONS {
            for k in 0..dims.nk() {
                for j in 0..dims.nj() {
                    for f in 0..=dims.nx {
                        block.flux.x.set(c, k, j, f, self.slope * f as Real);
                    }
                }
            }
        }
        Ok(())
    }
}

/// RHS that sleeps on one block before delegating, making its lane
/// finish last.
pub struct SlowRhs {
    block: BlockId,
    delay: Duration,
    inner: Box<dyn RhsSolver>,
}

impl SlowRhs {
    /// Sleep for `delay` whenever `block`'s flux is computed, then run
    /// the zero kernel.
    pub fn new(block: BlockId, delay: Duration) -> Self {
        Self::wrapping(block, delay, Box::new(ZeroRhs))
    }

    /// Like [`SlowRhs::new`] but delegating to `inner` after the nap,
    /// so the delayed lane produces an observable flux.
    pub fn wrapping(block: BlockId, delay: Duration, inner: Box<dyn RhsSolver>) -> Self {
        Self {
            block,
            delay,
            inner,
        }
    }
}

impl RhsSolver for SlowRhs {
    fn label(&self) -> &'static str {
        "slow"
    }

    fn compute_fluxes(&self, block: &mut Block, key: ContainerKey) -> Result<(), TaskFault> {
        if block.id == self.block {
            std::thread::sleep(self.delay);
        }
        self.inner.compute_fluxes(block, key)
    }
}

// ── Mock transport ───────────────────────────────────────────

/// A channel transport whose first `delay_polls` polls come back empty,
/// forcing receive tasks down their retry path.
#[derive(Debug)]
pub struct DelayedTransport {
    inner: ChannelTransport,
    remaining: AtomicU64,
}

impl DelayedTransport {
    /// Mailboxes for `nblocks` blocks; the first `delay_polls` polls
    /// across all destinations report nothing.
    pub fn new(nblocks: usize, delay_polls: u64) -> Self {
        Self {
            inner: ChannelTransport::new(nblocks),
            remaining: AtomicU64::new(delay_polls),
        }
    }
}

impl Transport for DelayedTransport {
    fn post(&self, to: BlockId, face: Face, slab: Slab) -> Result<(), CommError> {
        self.inner.post(to, face, slab)
    }

    fn poll(&self, to: BlockId, face: Face) -> Result<Option<Slab>, CommError> {
        if self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Ok(None);
        }
        self.inner.poll(to, face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perturbed_mesh_is_deterministic() {
        let dims = BlockDims::new(4, 1, 1, 2);
        let a = perturbed_mesh(2, dims, 1, 42, 0.1);
        let b = perturbed_mesh(2, dims, 1, 42, 0.1);
        let c = perturbed_mesh(2, dims, 1, 43, 0.1);
        let base =
            |m: &Mesh, n: usize| m.blocks[n].containers.get(ContainerKey::Base).unwrap().cons.clone();
        assert_eq!(base(&a, 0), base(&b, 0));
        assert_ne!(base(&a, 0), base(&c, 0));
    }

    #[test]
    fn uniform_mesh_has_consistent_conserved_state() {
        let dims = BlockDims::new(4, 1, 1, 2);
        let mesh = uniform_mesh(1, dims, 2.0, 0.5, 1.0, 1);
        let base = mesh.blocks[0].containers.get(ContainerKey::Base).unwrap();
        use spate_mesh::ConsComp;
        assert_eq!(base.cons.at(ConsComp::Dens.idx(), 0, 0, 3), 2.0);
        assert_eq!(base.cons.at(ConsComp::MomX.idx(), 0, 0, 3), 1.0);
    }

    #[test]
    fn delayed_transport_eventually_delivers() {
        let t = DelayedTransport::new(1, 2);
        t.post(BlockId(0), Face::XLow, vec![1.0]).unwrap();
        assert_eq!(t.poll(BlockId(0), Face::XLow).unwrap(), None);
        assert_eq!(t.poll(BlockId(0), Face::XLow).unwrap(), None);
        assert_eq!(t.poll(BlockId(0), Face::XLow).unwrap(), Some(vec![1.0]));
    }

    #[test]
    fn ramp_flux_is_linear_in_the_face_index() {
        let mut b = Block::new(BlockId(0), BlockDims::new(4, 1, 1, 2), 0.0, 0.25, 1);
        RampFluxRhs::new(0.5)
            .compute_fluxes(&mut b, ContainerKey::Base)
            .unwrap();
        assert_eq!(b.flux.x.at(0, 0, 0, 0), 0.0);
        assert_eq!(b.flux.x.at(0, 0, 0, 4), 2.0);
        assert_eq!(b.flux.x.at(NCONS - 1, 0, 0, 1), 0.5);
    }

    #[test]
    fn failing_rhs_spares_other_blocks() {
        let rhs = FailingRhs::new(BlockId(1), 0);
        let mut b0 = Block::new(BlockId(0), BlockDims::new(4, 1, 1, 2), 0.0, 0.25, 1);
        let mut b1 = Block::new(BlockId(1), BlockDims::new(4, 1, 1, 2), 1.0, 0.25, 1);
        assert!(rhs.compute_fluxes(&mut b0, ContainerKey::Base).is_ok());
        assert!(rhs.compute_fluxes(&mut b1, ContainerKey::Base).is_err());
    }
}
