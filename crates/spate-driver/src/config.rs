//! Input parameter table and driver configuration.

use indexmap::IndexMap;

use spate_core::Real;
use spate_eos::{EosKind, EquationOfState};
use spate_mesh::BoundaryKind;

use crate::error::ConfigError;

/// Which RHS kernel the driver runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RhsChoice {
    /// Donor-cell upwind advection.
    Advect,
    /// Homogeneous (zero) right-hand side.
    Zero,
}

/// `(domain, key) → value` parameter table.
///
/// Insertion order is preserved so diagnostics list parameters the way
/// the caller supplied them.
#[derive(Clone, Debug, Default)]
pub struct InputParams {
    table: IndexMap<(String, String), String>,
}

impl InputParams {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter.
    pub fn set(&mut self, domain: &str, key: &str, value: &str) {
        self.table
            .insert((domain.to_string(), key.to_string()), value.to_string());
    }

    /// Look up a parameter.
    pub fn get(&self, domain: &str, key: &str) -> Option<&str> {
        self.table
            .get(&(domain.to_string(), key.to_string()))
            .map(String::as_str)
    }

    /// Look up a parameter that must exist.
    ///
    /// # Errors
    ///
    /// `MissingRequired` when absent.
    pub fn require(&self, domain: &'static str, key: &'static str) -> Result<&str, ConfigError> {
        self.get(domain, key)
            .ok_or(ConfigError::MissingRequired { domain, key })
    }

    /// Look up an optional parameter; `None` means "use the default and
    /// record a warning".
    pub fn desired(&self, domain: &str, key: &str) -> Option<&str> {
        self.get(domain, key)
    }

    fn parse_real(
        &self,
        domain: &'static str,
        key: &'static str,
        default: Real,
    ) -> Result<Real, ConfigError> {
        match self.get(domain, key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                domain,
                key,
                value: raw.to_string(),
            }),
        }
    }
}

/// Validated driver configuration, resolved from an [`InputParams`].
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// The configured equation of state, floors included.
    pub eos: EquationOfState,
    /// CFL safety factor for timestep estimation.
    pub cfl: Real,
    /// Which RHS kernel to run.
    pub rhs: RhsChoice,
    /// Physical boundary condition at the domain edges.
    pub bc: BoundaryKind,
}

impl DriverConfig {
    /// Resolve and validate the `hydro` parameter block.
    ///
    /// `hydro/eos` is required; `hydro/cfl` is desired (default 0.3,
    /// with a recorded warning when defaulted). Everything else
    /// defaults silently.
    ///
    /// # Errors
    ///
    /// `MissingRequired`, `InvalidValue`, or `NegativeFloor`.
    pub fn from_params(params: &InputParams) -> Result<(Self, Vec<String>), ConfigError> {
        let mut warnings = Vec::new();

        let kind = match params.require("hydro", "eos")? {
            "adiabatic" => EosKind::Adiabatic {
                gamma: params.parse_real("hydro", "gamma", 5.0 / 3.0)?,
            },
            "isothermal" => {
                let raw = params.require("hydro", "iso_cs")?;
                let cs: Real = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    domain: "hydro",
                    key: "iso_cs",
                    value: raw.to_string(),
                })?;
                EosKind::Isothermal { cs }
            }
            "general" => EosKind::General {
                gamma: params.parse_real("hydro", "gamma", 5.0 / 3.0)?,
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    domain: "hydro",
                    key: "eos",
                    value: other.to_string(),
                })
            }
        };

        let cfl = match params.desired("hydro", "cfl") {
            Some(_) => params.parse_real("hydro", "cfl", 0.3)?,
            None => {
                warnings.push("hydro/cfl not set, defaulting to 0.3".to_string());
                0.3
            }
        };
        if !(cfl > 0.0 && cfl.is_finite()) {
            return Err(ConfigError::InvalidValue {
                domain: "hydro",
                key: "cfl",
                value: cfl.to_string(),
            });
        }

        let dfloor = params.parse_real("hydro", "dfloor", 0.0)?;
        if dfloor < 0.0 {
            return Err(ConfigError::NegativeFloor {
                which: "dfloor",
                value: dfloor,
            });
        }
        let pfloor = params.parse_real("hydro", "pfloor", 0.0)?;
        if pfloor < 0.0 {
            return Err(ConfigError::NegativeFloor {
                which: "pfloor",
                value: pfloor,
            });
        }

        let rhs = match params.desired("hydro", "rhs").unwrap_or("advect") {
            "advect" => RhsChoice::Advect,
            "zero" => RhsChoice::Zero,
            other => {
                return Err(ConfigError::InvalidValue {
                    domain: "hydro",
                    key: "rhs",
                    value: other.to_string(),
                })
            }
        };

        let bc = match params.desired("hydro", "bc").unwrap_or("outflow") {
            "outflow" => BoundaryKind::Outflow,
            "reflect" => BoundaryKind::Reflect,
            other => {
                return Err(ConfigError::InvalidValue {
                    domain: "hydro",
                    key: "bc",
                    value: other.to_string(),
                })
            }
        };

        Ok((
            Self {
                eos: EquationOfState::new(kind, dfloor, pfloor),
                cfl,
                rhs,
                bc,
            },
            warnings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> InputParams {
        let mut p = InputParams::new();
        p.set("hydro", "eos", "adiabatic");
        p
    }

    #[test]
    fn missing_eos_is_fatal() {
        let p = InputParams::new();
        assert_eq!(
            DriverConfig::from_params(&p).unwrap_err(),
            ConfigError::MissingRequired {
                domain: "hydro",
                key: "eos"
            }
        );
    }

    #[test]
    fn missing_cfl_defaults_with_warning() {
        let (cfg, warnings) = DriverConfig::from_params(&minimal()).unwrap();
        assert_eq!(cfg.cfl, 0.3);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("hydro/cfl"));
    }

    #[test]
    fn explicit_cfl_has_no_warning() {
        let mut p = minimal();
        p.set("hydro", "cfl", "0.5");
        let (cfg, warnings) = DriverConfig::from_params(&p).unwrap();
        assert_eq!(cfg.cfl, 0.5);
        assert!(warnings.is_empty());
    }

    #[test]
    fn gamma_defaults_to_five_thirds() {
        let (cfg, _) = DriverConfig::from_params(&minimal()).unwrap();
        assert_eq!(
            cfg.eos.kind,
            EosKind::Adiabatic { gamma: 5.0 / 3.0 }
        );
    }

    #[test]
    fn isothermal_requires_sound_speed() {
        let mut p = InputParams::new();
        p.set("hydro", "eos", "isothermal");
        assert_eq!(
            DriverConfig::from_params(&p).unwrap_err(),
            ConfigError::MissingRequired {
                domain: "hydro",
                key: "iso_cs"
            }
        );
        p.set("hydro", "iso_cs", "1.5");
        let (cfg, _) = DriverConfig::from_params(&p).unwrap();
        assert_eq!(cfg.eos.kind, EosKind::Isothermal { cs: 1.5 });
    }

    #[test]
    fn unknown_eos_rejected() {
        let mut p = InputParams::new();
        p.set("hydro", "eos", "polytropic");
        assert!(matches!(
            DriverConfig::from_params(&p).unwrap_err(),
            ConfigError::InvalidValue { key: "eos", .. }
        ));
    }

    #[test]
    fn negative_floor_rejected() {
        let mut p = minimal();
        p.set("hydro", "dfloor", "-0.1");
        assert_eq!(
            DriverConfig::from_params(&p).unwrap_err(),
            ConfigError::NegativeFloor {
                which: "dfloor",
                value: -0.1
            }
        );
    }

    #[test]
    fn unparseable_value_rejected() {
        let mut p = minimal();
        p.set("hydro", "gamma", "five thirds");
        assert!(matches!(
            DriverConfig::from_params(&p).unwrap_err(),
            ConfigError::InvalidValue { key: "gamma", .. }
        ));
    }

    #[test]
    fn rhs_and_bc_selections() {
        let mut p = minimal();
        p.set("hydro", "rhs", "zero");
        p.set("hydro", "bc", "reflect");
        let (cfg, _) = DriverConfig::from_params(&p).unwrap();
        assert_eq!(cfg.rhs, RhsChoice::Zero);
        assert_eq!(cfg.bc, BoundaryKind::Reflect);
    }

    #[test]
    fn floors_flow_into_the_eos() {
        let mut p = minimal();
        p.set("hydro", "dfloor", "0.5");
        p.set("hydro", "pfloor", "0.01");
        let (cfg, _) = DriverConfig::from_params(&p).unwrap();
        assert_eq!(cfg.eos.density_floor, 0.5);
        assert_eq!(cfg.eos.pressure_floor, 0.01);
    }
}
