//! Run configuration for the rupture subsystem, loaded from TOML.
//!
//! ```toml
//! friction_law = "aging"
//! order = 3
//!
//! [rate_and_state]
//! f0 = 0.6
//! sr0 = 1e-6
//!
//! [thermal_pressurization]
//! thermal_diffusivity = 1e-6
//! heat_capacity = 2.7e6
//! undrained_response = 0.1e6
//! initial_temperature = 483.15
//! initial_pressure = 10e6
//! ```

use std::fs;
use std::path::Path;

use rupture_store::StoreConfig;
use serde::Deserialize;

use crate::error::ConfigError;

/// Default slip-rate magnitude above which a point counts as ruptured.
pub const DEFAULT_RUPTURE_THRESHOLD: f64 = 0.001;

/// Default number of fixed-point passes between state and slip rate.
pub const DEFAULT_STATE_ITERATIONS: usize = 2;

fn default_order() -> u32 {
    4
}

fn default_threshold() -> f64 {
    DEFAULT_RUPTURE_THRESHOLD
}

/// Friction law family, chosen once per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionLawKind {
    /// Linear slip weakening.
    LinearSlipWeakening,
    /// Rate-and-state friction with the aging law.
    Aging,
    /// Rate-and-state friction with the slip law.
    Slip,
}

impl FrictionLawKind {
    /// Config name of the law.
    pub fn name(self) -> &'static str {
        match self {
            Self::LinearSlipWeakening => "linear_slip_weakening",
            Self::Aging => "aging",
            Self::Slip => "slip",
        }
    }

    /// Whether the law is a rate-and-state family.
    pub fn is_rate_and_state(self) -> bool {
        matches!(self, Self::Aging | Self::Slip)
    }
}

/// Top-level rupture configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuptureConfig {
    /// Active friction law.
    pub friction_law: FrictionLawKind,
    /// Polynomial order of the wave solver. Fault faces carry
    /// `(order + 1)²` quadrature points unless overridden.
    #[serde(default = "default_order")]
    pub order: u32,
    /// Explicit quadrature point count per face.
    #[serde(default)]
    pub quadrature_points: Option<usize>,
    /// Slip-rate magnitude above which a point counts as ruptured.
    #[serde(default = "default_threshold")]
    pub rupture_velocity_threshold: f64,
    /// Linear slip weakening options.
    #[serde(default)]
    pub linear_slip_weakening: LinearSlipWeakeningConfig,
    /// Rate-and-state constants. Required for `aging` and `slip`.
    #[serde(default)]
    pub rate_and_state: Option<RateAndStateConfig>,
    /// Thermal pressurization. Only valid with rate-and-state laws.
    #[serde(default)]
    pub thermal_pressurization: Option<ThermalPressurizationConfig>,
    /// Slip-rate solver settings.
    #[serde(default)]
    pub newton: NewtonConfig,
}

/// Options for linear slip weakening.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearSlipWeakeningConfig {
    /// Apply time-forced weakening from `forced_rupture_time` and `t_0`.
    #[serde(default)]
    pub forced_rupture: bool,
}

/// Rate-and-state constants as written in the config file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateAndStateConfig {
    /// Reference friction coefficient `f0`.
    pub f0: Option<f64>,
    /// Reference slip rate `V0`.
    pub sr0: Option<f64>,
    /// Evolution-effect parameter `b`, used to seed the per-point `rs_b`.
    pub b: Option<f64>,
    /// Fixed-point passes between state and slip rate per step.
    pub state_iterations: Option<usize>,
}

/// Thermal pressurization constants as written in the config file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThermalPressurizationConfig {
    /// Thermal diffusivity `α_th`.
    pub thermal_diffusivity: Option<f64>,
    /// Volumetric heat capacity `ρc`.
    pub heat_capacity: Option<f64>,
    /// Undrained pressure response `Λ`.
    pub undrained_response: Option<f64>,
    /// Ambient temperature.
    pub initial_temperature: Option<f64>,
    /// Ambient pore pressure.
    pub initial_pressure: Option<f64>,
}

/// Safeguarded Newton settings for the rate-and-state slip-rate solve.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewtonConfig {
    /// Relative convergence tolerance on the slip rate.
    #[serde(default = "NewtonConfig::default_tolerance")]
    pub tolerance: f64,
    /// Iteration cap; the last iterate is kept if it is reached.
    #[serde(default = "NewtonConfig::default_max_iterations")]
    pub max_iterations: usize,
}

impl NewtonConfig {
    fn default_tolerance() -> f64 {
        1e-10
    }

    fn default_max_iterations() -> usize {
        100
    }
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::default_tolerance(),
            max_iterations: Self::default_max_iterations(),
        }
    }
}

/// Validated rate-and-state constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateAndStateParams {
    /// Reference friction coefficient.
    pub f0: f64,
    /// Reference slip rate.
    pub sr0: f64,
    /// Default for the per-point `rs_b`, if configured.
    pub b: Option<f64>,
    /// Fixed-point passes per step.
    pub state_iterations: usize,
    /// Relative Newton tolerance.
    pub tolerance: f64,
    /// Newton iteration cap.
    pub max_iterations: usize,
}

/// Validated thermal pressurization constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalPressurizationParams {
    /// Thermal diffusivity.
    pub thermal_diffusivity: f64,
    /// Volumetric heat capacity.
    pub heat_capacity: f64,
    /// Undrained pressure response.
    pub undrained_response: f64,
    /// Ambient temperature.
    pub initial_temperature: f64,
    /// Ambient pore pressure.
    pub initial_pressure: f64,
}

fn require(
    value: Option<f64>,
    law: &'static str,
    parameter: &'static str,
) -> Result<f64, ConfigError> {
    value.ok_or(ConfigError::MissingParameter { law, parameter })
}

fn positive(value: f64, parameter: &'static str) -> Result<f64, ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

impl RuptureConfig {
    /// Parse a config from TOML text. The result is not yet validated.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read, parse, and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            tracing::warn!(?path, %source, "failed to read rupture config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Fault quadrature points per face.
    pub fn quadrature_points(&self) -> usize {
        self.quadrature_points
            .unwrap_or_else(|| ((self.order + 1) * (self.order + 1)) as usize)
    }

    /// Store configuration matching this run.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.quadrature_points())
    }

    /// Check that the selected law has everything it needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quadrature_points() == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "quadrature_points",
                reason: "must be at least 1".into(),
            });
        }
        positive(self.rupture_velocity_threshold, "rupture_velocity_threshold")?;
        positive(self.newton.tolerance, "newton.tolerance")?;
        if self.newton.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "newton.max_iterations",
                reason: "must be at least 1".into(),
            });
        }

        if self.friction_law.is_rate_and_state() {
            self.rate_and_state_params()?;
        } else if self.rate_and_state.is_some() {
            tracing::warn!(
                law = self.friction_law.name(),
                "ignoring [rate_and_state] for a non rate-and-state law"
            );
        }

        if self.thermal_pressurization.is_some() {
            if !self.friction_law.is_rate_and_state() {
                return Err(ConfigError::Unsupported {
                    reason: format!(
                        "thermal pressurization requires a rate-and-state law, not '{}'",
                        self.friction_law.name()
                    ),
                });
            }
            self.thermal_pressurization_params()?;
        }

        if self.linear_slip_weakening.forced_rupture
            && self.friction_law != FrictionLawKind::LinearSlipWeakening
        {
            tracing::warn!(
                law = self.friction_law.name(),
                "forced_rupture only applies to linear slip weakening"
            );
        }
        Ok(())
    }

    /// Resolve the rate-and-state constants, filling defaults.
    pub fn rate_and_state_params(&self) -> Result<RateAndStateParams, ConfigError> {
        let law = self.friction_law.name();
        let rs = self
            .rate_and_state
            .as_ref()
            .ok_or(ConfigError::MissingParameter {
                law,
                parameter: "rate_and_state",
            })?;
        let f0 = require(rs.f0, law, "rate_and_state.f0")?;
        let sr0 = positive(require(rs.sr0, law, "rate_and_state.sr0")?, "rate_and_state.sr0")?;
        let state_iterations = match rs.state_iterations {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    parameter: "rate_and_state.state_iterations",
                    reason: "must be at least 1".into(),
                })
            }
            Some(n) => n,
            None => {
                tracing::warn!(
                    default = DEFAULT_STATE_ITERATIONS,
                    "rate_and_state.state_iterations not set, using default"
                );
                DEFAULT_STATE_ITERATIONS
            }
        };
        Ok(RateAndStateParams {
            f0,
            sr0,
            b: rs.b,
            state_iterations,
            tolerance: self.newton.tolerance,
            max_iterations: self.newton.max_iterations,
        })
    }

    /// Resolve the thermal pressurization constants, if enabled.
    pub fn thermal_pressurization_params(
        &self,
    ) -> Result<Option<ThermalPressurizationParams>, ConfigError> {
        let Some(tp) = self.thermal_pressurization.as_ref() else {
            return Ok(None);
        };
        let law = self.friction_law.name();
        Ok(Some(ThermalPressurizationParams {
            thermal_diffusivity: positive(
                require(tp.thermal_diffusivity, law, "thermal_pressurization.thermal_diffusivity")?,
                "thermal_pressurization.thermal_diffusivity",
            )?,
            heat_capacity: positive(
                require(tp.heat_capacity, law, "thermal_pressurization.heat_capacity")?,
                "thermal_pressurization.heat_capacity",
            )?,
            undrained_response: require(
                tp.undrained_response,
                law,
                "thermal_pressurization.undrained_response",
            )?,
            initial_temperature: require(
                tp.initial_temperature,
                law,
                "thermal_pressurization.initial_temperature",
            )?,
            initial_pressure: require(
                tp.initial_pressure,
                law,
                "thermal_pressurization.initial_pressure",
            )?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGING_TP: &str = r#"
        friction_law = "aging"
        order = 3

        [rate_and_state]
        f0 = 0.6
        sr0 = 1e-6
        b = 0.012
        state_iterations = 3

        [thermal_pressurization]
        thermal_diffusivity = 1e-6
        heat_capacity = 2.7e6
        undrained_response = 0.1e6
        initial_temperature = 483.15
        initial_pressure = 10e6
    "#;

    #[test]
    fn parses_full_rate_and_state_config() {
        let config = RuptureConfig::from_toml_str(AGING_TP).unwrap();
        config.validate().unwrap();
        assert_eq!(config.friction_law, FrictionLawKind::Aging);
        assert_eq!(config.quadrature_points(), 16);
        let rs = config.rate_and_state_params().unwrap();
        assert_eq!(rs.state_iterations, 3);
        assert_eq!(rs.b, Some(0.012));
        let tp = config.thermal_pressurization_params().unwrap().unwrap();
        assert_eq!(tp.initial_pressure, 10e6);
        assert_eq!(config.rupture_velocity_threshold, DEFAULT_RUPTURE_THRESHOLD);
    }

    #[test]
    fn minimal_linear_slip_weakening() {
        let config = RuptureConfig::from_toml_str("friction_law = \"linear_slip_weakening\"").unwrap();
        config.validate().unwrap();
        assert_eq!(config.quadrature_points(), 25);
        assert!(!config.linear_slip_weakening.forced_rupture);
        assert_eq!(config.newton, NewtonConfig::default());
    }

    #[test]
    fn rate_and_state_without_table_is_missing_parameter() {
        let config = RuptureConfig::from_toml_str("friction_law = \"slip\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingParameter {
                law: "slip",
                parameter: "rate_and_state"
            })
        ));
    }

    #[test]
    fn missing_sr0_is_named() {
        let config = RuptureConfig::from_toml_str(
            "friction_law = \"aging\"\n[rate_and_state]\nf0 = 0.6\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingParameter {
                parameter: "rate_and_state.sr0",
                ..
            })
        ));
    }

    #[test]
    fn thermal_pressurization_needs_rate_and_state() {
        let text = "friction_law = \"linear_slip_weakening\"\n[thermal_pressurization]\n";
        let config = RuptureConfig::from_toml_str(text).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unsupported { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            RuptureConfig::from_toml_str("friction_law = \"aging\"\nspeed = 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RuptureConfig::from_toml_str("friction_law = \"velocity\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn negative_threshold_rejected() {
        let config = RuptureConfig::from_toml_str(
            "friction_law = \"linear_slip_weakening\"\nrupture_velocity_threshold = -1.0\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                parameter: "rupture_velocity_threshold",
                ..
            })
        ));
    }

    #[test]
    fn explicit_point_count_overrides_order() {
        let config = RuptureConfig::from_toml_str(
            "friction_law = \"linear_slip_weakening\"\nquadrature_points = 7\n",
        )
        .unwrap();
        assert_eq!(config.store_config().quadrature_points, 7);
    }
}
