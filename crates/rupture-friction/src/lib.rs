//! Friction laws and per-face rupture updates.
//!
//! Each time step, the wave solver hands over the stress and velocity on
//! both sides of every fault face ([`StressInput`]). A [`FrictionSolver`]
//! resolves the Godunov state at each quadrature point, applies the
//! friction law, integrates slip, and writes the imposed state back into
//! the [`LayeredStore`](rupture_store::LayeredStore).
//!
//! # Laws
//!
//! - [`LinearSlipWeakeningLaw`]: slip weakening with optional forced rupture.
//! - [`RateAndStateLaw`]: rate-and-state with a pluggable
//!   [`StateEvolution`] ([`AgingLaw`], [`SlipLaw`]) and
//!   [`PressureModel`] ([`NoPressurization`], [`ThermalPressurization`]).
//!
//! [`DynamicRupture`] picks one of these from a [`RuptureConfig`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod access;
pub mod common;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod evolution;
pub mod kernel;
pub mod law;
pub mod solver;
pub mod stress;
pub mod thermal;

pub use access::{FaceReader, FaceWriter};
pub use common::StepInfo;
pub use config::{FrictionLawKind, RuptureConfig};
pub use dynamic::DynamicRupture;
pub use error::{ConfigError, FrictionError, KernelError};
pub use evolution::{AgingLaw, SlipLaw, StateEvolution};
pub use kernel::{FluxProjector, KernelFn, KernelTable, Prefetch, Shape};
pub use law::{FrictionLaw, LinearSlipWeakeningLaw, RateAndStateLaw};
pub use solver::{FrictionSolver, StepSummary};
pub use stress::{Side, StressInput};
pub use thermal::{NoPressurization, PressureModel, ThermalPressurization};
