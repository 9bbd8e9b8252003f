//! Runtime selection of the friction law from a [`RuptureConfig`].
//!
//! The law is chosen once per run. [`DynamicRupture`] holds one concrete
//! solver, so the per-face update is monomorphised and dispatch happens
//! once per layer step.

use rupture_core::Layer;
use rupture_store::{
    FaceRecord, LayeredStore, LinearSlipWeakeningRecord, RateAndStateRecord, RuptureRecord, Schema,
};

use crate::config::{FrictionLawKind, RuptureConfig};
use crate::error::FrictionError;
use crate::evolution::{AgingLaw, SlipLaw, StateEvolution};
use crate::law::{FrictionLaw, LinearSlipWeakeningLaw, RateAndStateLaw};
use crate::solver::{FrictionSolver, StepSummary};
use crate::stress::StressInput;
use crate::thermal::{NoPressurization, ThermalPressurization};

/// Rate-and-state solver with evolution `E` and pore-pressure model `P`.
pub type RateAndStateSolver<E, P> = FrictionSolver<RateAndStateLaw<E, P>>;

/// The configured friction law and its solver.
#[derive(Clone, Debug)]
pub enum DynamicRupture {
    /// Linear slip weakening.
    LinearSlipWeakening(FrictionSolver<LinearSlipWeakeningLaw>),
    /// Aging-law rate-and-state.
    Aging(RateAndStateSolver<AgingLaw, NoPressurization>),
    /// Aging-law rate-and-state with thermal pressurization.
    AgingTp(RateAndStateSolver<AgingLaw, ThermalPressurization>),
    /// Slip-law rate-and-state.
    Slip(RateAndStateSolver<SlipLaw, NoPressurization>),
    /// Slip-law rate-and-state with thermal pressurization.
    SlipTp(RateAndStateSolver<SlipLaw, ThermalPressurization>),
}

macro_rules! dispatch {
    ($self:expr, $solver:ident => $body:expr) => {
        match $self {
            DynamicRupture::LinearSlipWeakening($solver) => $body,
            DynamicRupture::Aging($solver) => $body,
            DynamicRupture::AgingTp($solver) => $body,
            DynamicRupture::Slip($solver) => $body,
            DynamicRupture::SlipTp($solver) => $body,
        }
    };
}

fn rate_and_state<E: StateEvolution>(
    config: &RuptureConfig,
    schema: &mut Schema,
    evolution: E,
    plain: fn(RateAndStateSolver<E, NoPressurization>) -> DynamicRupture,
    pressurized: fn(RateAndStateSolver<E, ThermalPressurization>) -> DynamicRupture,
) -> Result<DynamicRupture, FrictionError> {
    let params = config.rate_and_state_params()?;
    let threshold = config.rupture_velocity_threshold;
    let record = RateAndStateRecord::register(schema)?;
    Ok(match config.thermal_pressurization_params()? {
        Some(tp) => {
            let pressure = ThermalPressurization::register(schema, tp)?;
            pressurized(FrictionSolver::new(RateAndStateLaw::new(
                record, params, threshold, evolution, pressure,
            )))
        }
        None => plain(FrictionSolver::new(RateAndStateLaw::new(
            record,
            params,
            threshold,
            evolution,
            NoPressurization,
        ))),
    })
}

impl DynamicRupture {
    /// Validate `config`, register the law's fields into `schema`, and
    /// build its solver.
    pub fn from_config(config: &RuptureConfig, schema: &mut Schema) -> Result<Self, FrictionError> {
        config.validate()?;
        let rupture = match config.friction_law {
            FrictionLawKind::LinearSlipWeakening => {
                let record = LinearSlipWeakeningRecord::register(schema)?;
                Self::LinearSlipWeakening(FrictionSolver::new(LinearSlipWeakeningLaw::new(
                    record,
                    config.rupture_velocity_threshold,
                    config.linear_slip_weakening.forced_rupture,
                )))
            }
            FrictionLawKind::Aging => {
                rate_and_state(config, schema, AgingLaw, Self::Aging, Self::AgingTp)?
            }
            FrictionLawKind::Slip => {
                rate_and_state(config, schema, SlipLaw, Self::Slip, Self::SlipTp)?
            }
        };
        tracing::info!(
            law = rupture.name(),
            quadrature_points = config.quadrature_points(),
            fields = schema.len(),
            "configured dynamic rupture"
        );
        Ok(rupture)
    }

    /// Config name of the law, with a `_tp` suffix under thermal
    /// pressurization.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LinearSlipWeakening(_) => "linear_slip_weakening",
            Self::Aging(_) => "aging",
            Self::AgingTp(_) => "aging_tp",
            Self::Slip(_) => "slip",
            Self::SlipTp(_) => "slip_tp",
        }
    }

    /// Base fields of the active law.
    pub fn base(&self) -> &RuptureRecord {
        dispatch!(self, s => s.law().base())
    }

    /// Derive initial friction state for every face of `layer`.
    pub fn initialise(&self, store: &mut LayeredStore, layer: Layer) -> Result<(), FrictionError> {
        dispatch!(self, s => s.initialise(store, layer))
    }

    /// Initialise every layer that holds fault state.
    pub fn initialise_all(&self, store: &mut LayeredStore) -> Result<(), FrictionError> {
        for layer in [Layer::Copy, Layer::Interior] {
            if store.contains(layer, self.base().mu) {
                self.initialise(store, layer)?;
            }
        }
        Ok(())
    }

    /// Advance every face of `layer` by one step.
    pub fn step(
        &self,
        store: &mut LayeredStore,
        layer: Layer,
        stress: &StressInput,
        time: f64,
        dt: f64,
    ) -> Result<StepSummary, FrictionError> {
        dispatch!(self, s => s.step(store, layer, stress, time, dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(text: &str) -> RuptureConfig {
        RuptureConfig::from_toml_str(text).unwrap()
    }

    #[test]
    fn builds_linear_slip_weakening() {
        let mut schema = Schema::new();
        let rupture =
            DynamicRupture::from_config(&config("friction_law = \"linear_slip_weakening\""), &mut schema)
                .unwrap();
        assert_eq!(rupture.name(), "linear_slip_weakening");
        assert_eq!(schema.len(), 30);
    }

    #[test]
    fn builds_slip_law_with_thermal_pressurization() {
        let mut schema = Schema::new();
        let text = r#"
            friction_law = "slip"
            [rate_and_state]
            f0 = 0.6
            sr0 = 1e-6
            state_iterations = 2
            [thermal_pressurization]
            thermal_diffusivity = 1e-6
            heat_capacity = 2.7e6
            undrained_response = 0.1e6
            initial_temperature = 483.15
            initial_pressure = 10e6
        "#;
        let rupture = DynamicRupture::from_config(&config(text), &mut schema).unwrap();
        assert_eq!(rupture.name(), "slip_tp");
        assert_eq!(schema.len(), 22 + 6);
        assert!(schema.id("tp_theta").is_some());
    }

    #[test]
    fn rate_and_state_without_constants_fails() {
        let mut schema = Schema::new();
        assert!(matches!(
            DynamicRupture::from_config(&config("friction_law = \"aging\""), &mut schema),
            Err(FrictionError::Config(_))
        ));
    }
}
