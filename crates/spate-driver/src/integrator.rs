//! The multi-stage integrator descriptor.

use spate_core::Real;

use crate::error::ConfigError;

/// Stage count, per-stage weights, and the current time step.
///
/// Validated once at construction; a constructed integrator is always
/// usable. The stage update applied per stage `s` is
/// `stage_s = stage_{s-1} + beta[s] * dt * dUdt`.
#[derive(Clone, Debug, PartialEq)]
pub struct Integrator {
    beta: Vec<Real>,
    dt: Real,
}

impl Integrator {
    /// Build from explicit stage weights.
    ///
    /// # Errors
    ///
    /// `NoStages` for an empty weight list, `BetaOutOfRange` for any
    /// weight outside `(0, 1]`, `InvalidDt` unless `dt` is finite and
    /// positive.
    pub fn new(beta: Vec<Real>, dt: Real) -> Result<Self, ConfigError> {
        if beta.is_empty() {
            return Err(ConfigError::NoStages);
        }
        for (n, &b) in beta.iter().enumerate() {
            if !(b > 0.0 && b <= 1.0) {
                return Err(ConfigError::BetaOutOfRange { stage: n + 1, beta: b });
            }
        }
        check_dt(dt)?;
        Ok(Self { beta, dt })
    }

    /// Forward Euler: one stage, full weight.
    pub fn rk1(dt: Real) -> Result<Self, ConfigError> {
        Self::new(vec![1.0], dt)
    }

    /// Two-stage van Leer predictor/corrector: a half step then a full
    /// step.
    pub fn vl2(dt: Real) -> Result<Self, ConfigError> {
        Self::new(vec![0.5, 1.0], dt)
    }

    /// Number of stages.
    pub fn nstages(&self) -> usize {
        self.beta.len()
    }

    /// The weight for 1-indexed `stage`.
    ///
    /// # Panics
    ///
    /// If `stage` is 0 or exceeds the stage count; driver-internal
    /// callers only iterate `1..=nstages`.
    pub fn beta(&self, stage: usize) -> Real {
        self.beta[stage - 1]
    }

    /// The current time step.
    pub fn dt(&self) -> Real {
        self.dt
    }

    /// Replace the time step between steps.
    ///
    /// # Errors
    ///
    /// `InvalidDt` unless finite and positive.
    pub fn set_dt(&mut self, dt: Real) -> Result<(), ConfigError> {
        check_dt(dt)?;
        self.dt = dt;
        Ok(())
    }
}

fn check_dt(dt: Real) -> Result<(), ConfigError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDt { dt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn presets() {
        let rk1 = Integrator::rk1(0.1).unwrap();
        assert_eq!(rk1.nstages(), 1);
        assert_eq!(rk1.beta(1), 1.0);

        let vl2 = Integrator::vl2(0.1).unwrap();
        assert_eq!(vl2.nstages(), 2);
        assert_eq!(vl2.beta(1), 0.5);
        assert_eq!(vl2.beta(2), 1.0);
    }

    #[test]
    fn empty_weights_rejected() {
        assert_eq!(
            Integrator::new(vec![], 0.1).unwrap_err(),
            ConfigError::NoStages
        );
    }

    #[test]
    fn out_of_range_weight_names_its_stage() {
        assert_eq!(
            Integrator::new(vec![0.5, 1.5], 0.1).unwrap_err(),
            ConfigError::BetaOutOfRange {
                stage: 2,
                beta: 1.5
            }
        );
        assert!(Integrator::new(vec![0.0], 0.1).is_err());
    }

    #[test]
    fn bad_dt_rejected_everywhere() {
        assert!(Integrator::rk1(0.0).is_err());
        assert!(Integrator::rk1(-1.0).is_err());
        assert!(Integrator::rk1(Real::NAN).is_err());
        assert!(Integrator::rk1(Real::INFINITY).is_err());

        let mut ig = Integrator::rk1(0.1).unwrap();
        assert!(ig.set_dt(Real::NAN).is_err());
        assert_eq!(ig.dt(), 0.1);
        ig.set_dt(0.05).unwrap();
        assert_eq!(ig.dt(), 0.05);
    }

    proptest! {
        #[test]
        fn constructed_integrators_are_always_valid(
            beta in proptest::collection::vec(0.0f64..1.5, 0..5),
            dt in -1.0f64..1.0,
        ) {
            match Integrator::new(beta.clone(), dt) {
                Ok(ig) => {
                    prop_assert!(ig.nstages() >= 1);
                    prop_assert!(ig.dt() > 0.0);
                    for s in 1..=ig.nstages() {
                        prop_assert!(ig.beta(s) > 0.0 && ig.beta(s) <= 1.0);
                    }
                }
                Err(_) => {
                    let bad_beta = beta.is_empty()
                        || beta.iter().any(|&b| !(b > 0.0 && b <= 1.0));
                    let bad_dt = !(dt.is_finite() && dt > 0.0);
                    prop_assert!(bad_beta || bad_dt);
                }
            }
        }
    }
}
