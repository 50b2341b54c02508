//! Gamma-law and isothermal state conversions.

use spate_core::{IndexRange, Real};
use spate_mesh::{CellArray, ConsComp, PrimComp};

use crate::error::EosError;

/// Which closure relation is in effect.
///
/// Chosen once from configuration; every per-cell conversion dispatches
/// with a plain `match`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EosKind {
    /// Fixed sound speed; pressure is derived as `cs^2 * rho` and the
    /// energy component is carried but ignored.
    Isothermal {
        /// The constant sound speed.
        cs: Real,
    },
    /// Ideal gas with constant adiabatic index.
    Adiabatic {
        /// Ratio of specific heats.
        gamma: Real,
    },
    /// Placeholder for tabulated closures; currently evaluates as a
    /// gamma-law gas.
    General {
        /// Effective ratio of specific heats.
        gamma: Real,
    },
}

/// The configured equation of state plus its floors.
///
/// Floors of `0.0` are inert. Negative floors are rejected by the
/// driver's configuration validation before this type is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquationOfState {
    /// The closure relation.
    pub kind: EosKind,
    /// Minimum admissible density.
    pub density_floor: Real,
    /// Minimum admissible pressure (ignored for isothermal).
    pub pressure_floor: Real,
}

impl EquationOfState {
    /// Build an equation of state. Floors must be non-negative.
    pub fn new(kind: EosKind, density_floor: Real, pressure_floor: Real) -> Self {
        Self {
            kind,
            density_floor,
            pressure_floor,
        }
    }

    fn check_range(range: IndexRange, cons: &CellArray, prim: &CellArray) -> Result<(), EosError> {
        range.validate()?;
        let ni = cons.ni().min(prim.ni());
        let nj = cons.nj().min(prim.nj());
        let nk = cons.nk().min(prim.nk());
        if !range.fits(ni, nj, nk) {
            return Err(EosError::RangeOutOfBounds { range });
        }
        Ok(())
    }

    /// Fill `prim` from `cons` over `range`, flooring both
    /// representations in place.
    ///
    /// When the density floor fires the conserved density is raised and
    /// velocities are computed against the raised value (momentum is
    /// preserved). When the pressure floor fires the total energy is
    /// rebuilt from the floored pressure plus the kinetic energy.
    ///
    /// # Errors
    ///
    /// Only for an invalid or out-of-bounds range. Unphysical state
    /// values never fail; they are floored.
    pub fn conserved_to_primitive(
        &self,
        cons: &mut CellArray,
        prim: &mut CellArray,
        range: IndexRange,
    ) -> Result<(), EosError> {
        Self::check_range(range, cons, prim)?;
        let (d, m1, m2, m3, e) = cons_indices();
        let (rho, v1, v2, v3, p) = prim_indices();

        for k in range.kl..range.ku {
            for j in range.jl..range.ju {
                for i in range.il..range.iu {
                    let mut u_d = cons.at(d, k, j, i);
                    if u_d < self.density_floor {
                        u_d = self.density_floor;
                        cons.set(d, k, j, i, u_d);
                    }
                    let di = 1.0 / u_d;
                    let u_m1 = cons.at(m1, k, j, i);
                    let u_m2 = cons.at(m2, k, j, i);
                    let u_m3 = cons.at(m3, k, j, i);
                    prim.set(rho, k, j, i, u_d);
                    prim.set(v1, k, j, i, u_m1 * di);
                    prim.set(v2, k, j, i, u_m2 * di);
                    prim.set(v3, k, j, i, u_m3 * di);

                    match self.kind {
                        EosKind::Isothermal { cs } => {
                            prim.set(p, k, j, i, cs * cs * u_d);
                        }
                        EosKind::Adiabatic { gamma } | EosKind::General { gamma } => {
                            let gm1 = gamma - 1.0;
                            let e_k = 0.5 * di * (u_m1 * u_m1 + u_m2 * u_m2 + u_m3 * u_m3);
                            let mut w_p = gm1 * (cons.at(e, k, j, i) - e_k);
                            if w_p < self.pressure_floor {
                                w_p = self.pressure_floor;
                                cons.set(e, k, j, i, w_p / gm1 + e_k);
                            }
                            prim.set(p, k, j, i, w_p);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Fill `cons` from `prim` over `range`, flooring both
    /// representations in place.
    ///
    /// Momentum is rebuilt from the floored density so the two
    /// representations leave the call consistent.
    ///
    /// # Errors
    ///
    /// Only for an invalid or out-of-bounds range.
    pub fn primitive_to_conserved(
        &self,
        cons: &mut CellArray,
        prim: &mut CellArray,
        range: IndexRange,
    ) -> Result<(), EosError> {
        Self::check_range(range, cons, prim)?;
        let (d, m1, m2, m3, e) = cons_indices();
        let (rho, v1, v2, v3, p) = prim_indices();

        for k in range.kl..range.ku {
            for j in range.jl..range.ju {
                for i in range.il..range.iu {
                    let mut w_d = prim.at(rho, k, j, i);
                    if w_d < self.density_floor {
                        w_d = self.density_floor;
                        prim.set(rho, k, j, i, w_d);
                    }
                    let w_v1 = prim.at(v1, k, j, i);
                    let w_v2 = prim.at(v2, k, j, i);
                    let w_v3 = prim.at(v3, k, j, i);
                    cons.set(d, k, j, i, w_d);
                    cons.set(m1, k, j, i, w_d * w_v1);
                    cons.set(m2, k, j, i, w_d * w_v2);
                    cons.set(m3, k, j, i, w_d * w_v3);

                    match self.kind {
                        EosKind::Isothermal { cs } => {
                            prim.set(p, k, j, i, cs * cs * w_d);
                        }
                        EosKind::Adiabatic { gamma } | EosKind::General { gamma } => {
                            let mut w_p = prim.at(p, k, j, i);
                            if w_p < self.pressure_floor {
                                w_p = self.pressure_floor;
                                prim.set(p, k, j, i, w_p);
                            }
                            let e_k = 0.5 * w_d * (w_v1 * w_v1 + w_v2 * w_v2 + w_v3 * w_v3);
                            cons.set(e, k, j, i, w_p / (gamma - 1.0) + e_k);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Adiabatic sound speed at the given state (the constant `cs` for
    /// isothermal).
    pub fn sound_speed(&self, rho: Real, pres: Real) -> Real {
        match self.kind {
            EosKind::Isothermal { cs } => cs,
            EosKind::Adiabatic { gamma } | EosKind::General { gamma } => {
                (gamma * pres / rho).sqrt()
            }
        }
    }
}

fn cons_indices() -> (usize, usize, usize, usize, usize) {
    (
        ConsComp::Dens.idx(),
        ConsComp::MomX.idx(),
        ConsComp::MomY.idx(),
        ConsComp::MomZ.idx(),
        ConsComp::Ener.idx(),
    )
}

fn prim_indices() -> (usize, usize, usize, usize, usize) {
    (
        PrimComp::Rho.idx(),
        PrimComp::VelX.idx(),
        PrimComp::VelY.idx(),
        PrimComp::VelZ.idx(),
        PrimComp::Pres.idx(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use spate_mesh::{BlockDims, NCONS, NPRIM};

    fn arrays() -> (CellArray, CellArray, IndexRange) {
        let dims = BlockDims::new(4, 1, 1, 2);
        (
            CellArray::cells(NCONS, &dims),
            CellArray::cells(NPRIM, &dims),
            dims.all(),
        )
    }

    fn adiabatic() -> EquationOfState {
        EquationOfState::new(EosKind::Adiabatic { gamma: 5.0 / 3.0 }, 0.0, 0.0)
    }

    // ── Conversion round trips ───────────────────────────────

    #[test]
    fn adiabatic_round_trip_preserves_state() {
        let eos = adiabatic();
        let (mut cons, mut prim, range) = arrays();
        prim.set(PrimComp::Rho.idx(), 0, 0, 3, 2.0);
        prim.set(PrimComp::VelX.idx(), 0, 0, 3, 0.5);
        prim.set(PrimComp::Pres.idx(), 0, 0, 3, 1.5);
        // Other cells need physical density for the reverse pass.
        for i in 0..8 {
            if i != 3 {
                prim.set(PrimComp::Rho.idx(), 0, 0, i, 1.0);
                prim.set(PrimComp::Pres.idx(), 0, 0, i, 1.0);
            }
        }

        eos.primitive_to_conserved(&mut cons, &mut prim, range)
            .unwrap();
        assert_eq!(cons.at(ConsComp::Dens.idx(), 0, 0, 3), 2.0);
        assert_eq!(cons.at(ConsComp::MomX.idx(), 0, 0, 3), 1.0);

        let mut prim2 = prim.like();
        eos.conserved_to_primitive(&mut cons, &mut prim2, range)
            .unwrap();
        assert!((prim2.at(PrimComp::Rho.idx(), 0, 0, 3) - 2.0).abs() < 1e-14);
        assert!((prim2.at(PrimComp::VelX.idx(), 0, 0, 3) - 0.5).abs() < 1e-14);
        assert!((prim2.at(PrimComp::Pres.idx(), 0, 0, 3) - 1.5).abs() < 1e-14);
    }

    // ── Floors ───────────────────────────────────────────────

    #[test]
    fn density_floor_raises_both_representations() {
        let eos = EquationOfState::new(EosKind::Adiabatic { gamma: 5.0 / 3.0 }, 0.5, 0.0);
        let (mut cons, mut prim, range) = arrays();
        cons.fill(0.0);
        cons.set(ConsComp::Dens.idx(), 0, 0, 2, 0.2);
        for i in 0..8 {
            if i != 2 {
                cons.set(ConsComp::Dens.idx(), 0, 0, i, 1.0);
            }
        }

        eos.conserved_to_primitive(&mut cons, &mut prim, range)
            .unwrap();
        assert_eq!(prim.at(PrimComp::Rho.idx(), 0, 0, 2), 0.5);
        assert_eq!(cons.at(ConsComp::Dens.idx(), 0, 0, 2), 0.5);
    }

    #[test]
    fn pressure_floor_rebuilds_total_energy() {
        let gamma = 5.0 / 3.0;
        let eos = EquationOfState::new(EosKind::Adiabatic { gamma }, 0.0, 0.1);
        let (mut cons, mut prim, range) = arrays();
        cons.fill(0.0);
        for i in 0..8 {
            cons.set(ConsComp::Dens.idx(), 0, 0, i, 1.0);
        }
        cons.set(ConsComp::MomX.idx(), 0, 0, 4, 2.0);
        // Energy below kinetic: raw pressure would be negative.
        cons.set(ConsComp::Ener.idx(), 0, 0, 4, 1.0);

        eos.conserved_to_primitive(&mut cons, &mut prim, range)
            .unwrap();
        assert_eq!(prim.at(PrimComp::Pres.idx(), 0, 0, 4), 0.1);
        let e_k = 0.5 * 2.0 * 2.0;
        let want = 0.1 / (gamma - 1.0) + e_k;
        assert!((cons.at(ConsComp::Ener.idx(), 0, 0, 4) - want).abs() < 1e-14);
    }

    #[test]
    fn zero_floor_is_inert() {
        let eos = adiabatic();
        let (mut cons, mut prim, range) = arrays();
        cons.fill(0.0);
        for i in 0..8 {
            cons.set(ConsComp::Dens.idx(), 0, 0, i, 1e-12);
            cons.set(ConsComp::Ener.idx(), 0, 0, i, 1e-12);
        }
        eos.conserved_to_primitive(&mut cons, &mut prim, range)
            .unwrap();
        assert_eq!(prim.at(PrimComp::Rho.idx(), 0, 0, 0), 1e-12);
    }

    // ── Isothermal ───────────────────────────────────────────

    #[test]
    fn isothermal_pressure_tracks_density() {
        let eos = EquationOfState::new(EosKind::Isothermal { cs: 2.0 }, 0.0, 0.0);
        let (mut cons, mut prim, range) = arrays();
        for i in 0..8 {
            cons.set(ConsComp::Dens.idx(), 0, 0, i, 3.0);
        }
        eos.conserved_to_primitive(&mut cons, &mut prim, range)
            .unwrap();
        assert_eq!(prim.at(PrimComp::Pres.idx(), 0, 0, 0), 4.0 * 3.0);
        assert_eq!(eos.sound_speed(3.0, 12.0), 2.0);
    }

    // ── Sound speed ──────────────────────────────────────────

    #[test]
    fn adiabatic_sound_speed() {
        let eos = adiabatic();
        let got = eos.sound_speed(1.0, 0.6);
        assert!((got - 1.0_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn general_kind_matches_gamma_law() {
        let a = EquationOfState::new(EosKind::Adiabatic { gamma: 1.4 }, 0.0, 0.0);
        let g = EquationOfState::new(EosKind::General { gamma: 1.4 }, 0.0, 0.0);
        assert_eq!(a.sound_speed(1.2, 0.7), g.sound_speed(1.2, 0.7));
    }

    // ── Range validation ─────────────────────────────────────

    #[test]
    fn out_of_bounds_range_is_fatal() {
        let eos = adiabatic();
        let (mut cons, mut prim, _) = arrays();
        let too_big = IndexRange::new(0, 100, 0, 1, 0, 1);
        assert!(matches!(
            eos.conserved_to_primitive(&mut cons, &mut prim, too_big),
            Err(EosError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn inverted_range_is_fatal() {
        let eos = adiabatic();
        let (mut cons, mut prim, _) = arrays();
        let inverted = IndexRange::new(4, 2, 0, 1, 0, 1);
        assert!(matches!(
            eos.conserved_to_primitive(&mut cons, &mut prim, inverted),
            Err(EosError::InvalidRange(_))
        ));
    }

    // ── Floor postcondition holds for arbitrary states ───────

    proptest! {
        #[test]
        fn floors_hold_after_conversion(
            d in -1.0f64..2.0,
            m in -3.0f64..3.0,
            en in -2.0f64..4.0,
            dfloor in 0.01f64..1.0,
            pfloor in 0.01f64..1.0,
        ) {
            let eos = EquationOfState::new(
                EosKind::Adiabatic { gamma: 5.0 / 3.0 },
                dfloor,
                pfloor,
            );
            let (mut cons, mut prim, range) = arrays();
            cons.fill(0.0);
            for i in 0..8 {
                cons.set(ConsComp::Dens.idx(), 0, 0, i, d);
                cons.set(ConsComp::MomX.idx(), 0, 0, i, m);
                cons.set(ConsComp::Ener.idx(), 0, 0, i, en);
            }
            eos.conserved_to_primitive(&mut cons, &mut prim, range).unwrap();

            for i in 0..8 {
                prop_assert!(prim.at(PrimComp::Rho.idx(), 0, 0, i) >= dfloor);
                prop_assert!(prim.at(PrimComp::Pres.idx(), 0, 0, i) >= pfloor);
                prop_assert_eq!(
                    prim.at(PrimComp::Rho.idx(), 0, 0, i),
                    cons.at(ConsComp::Dens.idx(), 0, 0, i)
                );
            }

            // A second pass must be a fixed point: floored state is valid.
            let cons_before = cons.clone();
            eos.conserved_to_primitive(&mut cons, &mut prim, range).unwrap();
            prop_assert_eq!(cons, cons_before);
        }
    }
}
